//! Animedex CLI - search and browse the anime catalog from a terminal
//!
//! ```text
//! animedex search <query...>
//! animedex top [category] [sort]
//! animedex browse <genre|year|studio|status> <value>
//! animedex categories
//! ```
//!
//! Logging is controlled through `RUST_LOG` (default `warn`).

use animedex::browse::{CategoryFilter, CategoryOptions, filter_by_category, top_anime};
use animedex::config::Config;
use animedex::prelude::*;
use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
Usage:
  animedex search <query...>
  animedex top [category] [sort]
  animedex browse <genre|year|studio|status> <value>
  animedex categories

Top categories: trending, highest-rated, most-watched, completed, ongoing, recent, all
Top sorts:      rating, views, year, episodes, title";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn print_records<'a>(records: impl IntoIterator<Item = &'a AnimeRecord>) {
    let mut count = 0;
    for anime in records {
        count += 1;
        let year = anime
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "----".to_string());
        println!(
            "{:>3}. {} ({}) [{}] {:.1}  {}",
            count, anime.title, year, anime.status, anime.rating, anime.genre
        );
    }
    if count == 0 {
        println!("No results");
    }
}

fn parse_filter(kind: &str, value: &str) -> Result<CategoryFilter> {
    Ok(match kind {
        "genre" => CategoryFilter::Genre(value.to_string()),
        "year" => CategoryFilter::Year(
            value
                .parse()
                .wrap_err_with(|| format!("invalid year '{}'", value))?,
        ),
        "studio" => CategoryFilter::Studio(value.to_string()),
        "status" => CategoryFilter::Status(
            value
                .parse()
                .map_err(|_| eyre!("unknown status '{}'", value))?,
        ),
        other => bail!("unknown category '{}'\n\n{}", other, USAGE),
    })
}

async fn search(config: &Config, catalog: LocalCatalog, query: &str) {
    let mut sources = Sources::new();
    sources.set_fallback(catalog);

    #[cfg(feature = "source-consumet")]
    sources.add(ConsumetSource::from_config(config));

    let outcome = sources
        .search(query)
        .limit(config.page_size)
        .execute()
        .await;

    if outcome.is_fallback() {
        info!("showing local catalog results");
    }
    print_records(outcome.results());
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let config = Config::from_env().wrap_err("invalid configuration")?;
    let catalog = LocalCatalog::builtin().with_page_size(config.page_size);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    match command.as_str() {
        "search" => {
            let query = args[1..].join(" ");
            if query.trim().is_empty() {
                bail!("search needs a query\n\n{}", USAGE);
            }
            search(&config, catalog, &query).await;
        }
        "top" => {
            let category: TopCategory = match args.get(1) {
                Some(raw) => raw.parse().map_err(|_| eyre!("unknown category '{}'", raw))?,
                None => TopCategory::default(),
            };
            let sort: TopSort = match args.get(2) {
                Some(raw) => raw.parse().map_err(|_| eyre!("unknown sort '{}'", raw))?,
                None => TopSort::default(),
            };
            print_records(top_anime(catalog.records(), category, sort));
        }
        "browse" => {
            if args.len() < 3 {
                bail!("browse needs a category and a value\n\n{}", USAGE);
            }
            let filter = parse_filter(&args[1], &args[2..].join(" "))?;
            print_records(filter_by_category(catalog.records(), &filter));
        }
        "categories" => {
            let options = CategoryOptions::from_catalog(catalog.records());
            println!("Genres:   {}", options.genres.join(", "));
            let years: Vec<String> = options.years.iter().map(u32::to_string).collect();
            println!("Years:    {}", years.join(", "));
            println!("Studios:  {}", options.studios.join(", "));
            let statuses: Vec<String> = options.statuses.iter().map(|s| s.to_string()).collect();
            println!("Statuses: {}", statuses.join(", "));
        }
        "help" | "-h" | "--help" => println!("{}", USAGE),
        other => bail!("unknown command '{}'\n\n{}", other, USAGE),
    }

    Ok(())
}
