use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use clipscout_common::{format_count, Config, RankedRecord};
use clipscout_discovery::Agent;

#[derive(Parser)]
#[command(name = "clipscout", about = "Find the best short-form videos for a topic")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search all configured platforms and print the ranked results
    Search {
        /// Topic to search for (multiple words are joined with spaces)
        #[arg(required = true)]
        topic: Vec<String>,

        /// Number of results to return (defaults to TOP_N_RESULTS)
        #[arg(long)]
        top_n: Option<usize>,

        /// Skip the result cache for this search
        #[arg(long)]
        no_cache: bool,

        /// Print raw records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove cached results for one topic, or all topics
    ClearCache { topic: Option<String> },
    /// Remove expired cache entries
    ClearExpired,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `--json` output stays parseable.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("clipscout=info,ai_client=info,apify_client=info,youtube_client=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let agent = Agent::from_config(&config).await?;

    match cli.command {
        Command::Search {
            topic,
            top_n,
            no_cache,
            json,
        } => {
            let topic = topic.join(" ");
            let top_n = top_n.unwrap_or(agent.settings().default_top_n);
            info!(topic = topic.as_str(), top_n, no_cache, "clipscout search");

            let results = if no_cache {
                agent.search_uncached(&topic, top_n).await?
            } else {
                agent.search(&topic, top_n).await?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_results(&topic, &results);
            }
        }
        Command::ClearCache { topic } => {
            let removed = agent.clear_cache(topic.as_deref()).await?;
            println!("Removed {removed} cache entries");
        }
        Command::ClearExpired => {
            let removed = agent.clear_expired_cache().await?;
            println!("Removed {removed} expired cache entries");
        }
    }

    Ok(())
}

fn print_results(topic: &str, results: &[RankedRecord]) {
    if results.is_empty() {
        println!("No videos found for \"{topic}\".");
        return;
    }

    println!("Top {} videos for \"{topic}\":\n", results.len());
    for r in results {
        let c = r.candidate();
        println!("{}. [{}] {}", r.final_rank, c.platform, c.title);
        println!(
            "   {} | {} views | {} days ago",
            c.author,
            format_count(c.view_count),
            c.age_days
        );
        println!("   {}", c.url);
        if let Some(score) = r.scored.relevance_score {
            match r.scored.relevance_reason {
                Some(ref reason) => println!("   Relevance {score}: {reason}"),
                None => println!("   Relevance {score}"),
            }
        }
        if let Some(ref reason) = r.recommendation_reason {
            println!("   Why: {reason}");
        }
        if let Some(ref takeaway) = r.key_takeaway {
            println!("   Takeaway: {takeaway}");
        }
        println!();
    }
}
