//! Ranked search ordering tests
//!
//! Tier precedence, deduplication, stability and the fuzzy word threshold,
//! against hand-built catalogs and the built-in catalog.

use animedex::prelude::*;
use animedex::search::match_tier;

mod common;
use common::{record, titan_catalog, titles};

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_exact_title_then_fuzzy_parody() {
        let catalog = titan_catalog();
        let results = ranked_search("Attack on Titan", &catalog);
        assert_eq!(
            titles(&results),
            ["Attack on Titan", "Attack no Titan Parody"]
        );
    }

    #[test]
    fn test_synonym_only_match() {
        let catalog = titan_catalog();
        let results = ranked_search("AoT", &catalog);
        assert_eq!(titles(&results), ["Attack on Titan"]);
    }

    #[test]
    fn test_year_match() {
        let catalog = titan_catalog();
        let results = ranked_search("2013", &catalog);
        assert_eq!(titles(&results), ["Attack on Titan"]);
    }

    #[test]
    fn test_empty_query() {
        let catalog = titan_catalog();
        assert!(ranked_search("", &catalog).is_empty());
    }

    #[test]
    fn test_studio_match() {
        let catalog = titan_catalog();
        let results = ranked_search("wit", &catalog);
        assert_eq!(titles(&results), ["Attack on Titan"]);
    }

    #[test]
    fn test_short_word_never_fuzzy_matches() {
        let catalog = vec![
            record("1", "Bleach", &["Burichi"], "Supernatural", "Pierrot", Some(2004)),
            record("2", "Death Note", &[], "Mystery", "Madhouse", Some(2006)),
        ];
        assert!(ranked_search("on", &catalog).is_empty());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;

    #[test]
    fn test_exact_match_precedes_substring_match() {
        let catalog = vec![
            record("1", "Naruto Shippuden", &[], "", "", None),
            record("2", "Naruto", &[], "", "", None),
        ];
        let results = ranked_search("naruto", &catalog);
        assert_eq!(titles(&results), ["Naruto", "Naruto Shippuden"]);
    }

    #[test]
    fn test_no_repeated_ids() {
        let mut catalog = titan_catalog();
        // Same id as the exact match, appearing earlier at a weaker tier
        catalog.insert(0, record("1", "Titan Chronicles", &[], "", "", None));

        for query in ["attack on titan", "titan", "attack", "2013", "drama"] {
            let results = ranked_search(query, &catalog);
            let mut ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
            let total = ids.len();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), total, "duplicate id for query {:?}", query);
        }

        // The id keeps its best tier: the exact title wins
        let results = ranked_search("Attack on Titan", &catalog);
        assert_eq!(results[0].title, "Attack on Titan");
    }

    #[test]
    fn test_whitespace_query_matches_nothing() {
        let catalog = LocalCatalog::builtin();
        assert!(ranked_search("   ", catalog.records()).is_empty());
        assert!(ranked_search("\t\n", catalog.records()).is_empty());
    }

    #[test]
    fn test_stable_within_tier() {
        let catalog = vec![
            record("a", "Dragon Ball Z", &[], "", "", None),
            record("b", "Mystery", &["Ball"], "", "", None),
            record("c", "Dragon Ball Super", &[], "", "", None),
        ];
        let results = ranked_search("dragon ball", &catalog);
        assert_eq!(titles(&results), ["Dragon Ball Z", "Dragon Ball Super"]);

        let reversed: Vec<AnimeRecord> = catalog.into_iter().rev().collect();
        let results = ranked_search("dragon ball", &reversed);
        assert_eq!(titles(&results), ["Dragon Ball Super", "Dragon Ball Z"]);
    }

    #[test]
    fn test_case_insensitive() {
        let catalog = titan_catalog();
        assert_eq!(
            ranked_search("ATTACK", &catalog),
            ranked_search("attack", &catalog)
        );
        assert!(!ranked_search("ATTACK", &catalog).is_empty());
    }

    #[test]
    fn test_fuzzy_threshold() {
        let catalog = vec![record("1", "Tokyo Ghoul", &[], "Horror", "Pierrot", None)];
        // "to" only fuzzy-matches if it also matches an earlier tier
        assert_eq!(match_tier("to", &catalog[0]), Some(MatchTier::Title));
        assert_eq!(match_tier("to xy", &catalog[0]), None);
        assert_eq!(match_tier("ghoul xy", &catalog[0]), Some(MatchTier::Fuzzy));
    }
}

#[cfg(test)]
mod builtin_catalog_tests {
    use super::*;

    #[test]
    fn test_synonym_abbreviations() {
        let catalog = LocalCatalog::builtin();

        let results = ranked_search("JJK", catalog.records());
        assert_eq!(titles(&results), ["Jujutsu Kaisen"]);

        let results = ranked_search("hxh", catalog.records());
        assert_eq!(titles(&results), ["Hunter x Hunter"]);
    }

    #[test]
    fn test_genre_matches_keep_catalog_order() {
        let catalog = LocalCatalog::builtin();
        let results = ranked_search("comedy", catalog.records());
        assert_eq!(
            titles(&results),
            ["My Hero Academia", "One Piece", "Spy x Family"]
        );
    }

    #[test]
    fn test_synonym_tier_precedes_year_tier() {
        let catalog = LocalCatalog::builtin();
        // "HxH 2011" is a synonym; Steins;Gate only matches on its year
        let results = ranked_search("2011", catalog.records());
        assert_eq!(titles(&results), ["Hunter x Hunter", "Steins;Gate"]);
    }

    #[test]
    fn test_fuzzy_word_match() {
        let catalog = LocalCatalog::builtin();
        // Neither phrase appears anywhere, but "hunter" does
        let results = ranked_search("hunter chronicles", catalog.records());
        assert_eq!(titles(&results), ["Hunter x Hunter"]);
    }
}
