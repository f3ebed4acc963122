//! Query OMDb through the app's client and print the decoded fields.
//! Usage:
//!   cargo run --bin omdb_props -- search <query>
//!   cargo run --bin omdb_props -- detail <imdb_id>
//! Requires OMDB_API_KEY in the environment (.env supported).

use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use popcorn::config::Config;
use popcorn::omdb::{OmdbApi, OmdbClient};
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Lookup {
    Search,
    Detail,
}

impl FromStr for Lookup {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "search" => Ok(Lookup::Search),
            "detail" => Ok(Lookup::Detail),
            _ => Err(anyhow!("lookup must be 'search' or 'detail'")),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv().ok();

    let mut args = env::args().skip(1);
    let lookup: Lookup = args
        .next()
        .context("usage: omdb_props <search|detail> <value>")?
        .parse()?;
    let value = args.collect::<Vec<_>>().join(" ");
    if value.is_empty() {
        anyhow::bail!("usage: omdb_props <search|detail> <value>");
    }

    let config = Config::from_env()?;
    let client = OmdbClient::from_config(&config)?;

    match lookup {
        Lookup::Search => {
            let results = client.search(&value).await?;
            println!("{} results for '{}'", results.len(), value);
            for r in results {
                println!(
                    "{}\t{}\t{}\t{}",
                    r.id,
                    r.title,
                    r.year,
                    r.poster_url.as_deref().unwrap_or("-")
                );
            }
        }
        Lookup::Detail => {
            let d = client.fetch_detail(&value).await?;
            println!("Title:    {}", d.title);
            println!("Year:     {}", d.year);
            println!("Released: {}", d.release_date);
            println!(
                "Runtime:  {} ({:?} min)",
                d.runtime_label, d.runtime_minutes
            );
            println!("Rating:   {:?}", d.external_rating);
            println!("Genre:    {}", d.genre);
            println!("Director: {}", d.director);
            println!("Actors:   {}", d.actors);
            println!("Poster:   {}", d.poster_url.as_deref().unwrap_or("-"));
            println!("Plot:     {}", d.plot);
        }
    }
    Ok(())
}
