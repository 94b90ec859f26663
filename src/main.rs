use clap::{Parser, Subcommand};
use handlers::HandlerResponse;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "stonks=info,handlers=info,reddit_client=info,sentiment_client=info,cache=info,database=info";

#[derive(Parser, Debug)]
#[command(name = "stonks", about = "WallStreetBets snapshot and sentiment jobs")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print the body on one line instead of pretty JSON
    #[arg(long, global = true)]
    compact: bool,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Cache the current r/wallstreetbets hot posts in Redis
    FetchRedditCache,
    /// Import the Tradestie sentiment feed into Supabase
    RedditSentiment,
    /// Read the cached hot posts back as a ranked feed
    WsbPosts,
    /// List the most mentioned tickers of the last 24 hours
    Trending,
}

async fn dispatch(command: Command) -> HandlerResponse {
    match command {
        Command::FetchRedditCache => handlers::fetch_reddit_cache_from_env().await,
        Command::RedditSentiment => handlers::reddit_sentiment_from_env().await,
        Command::WsbPosts => handlers::wsb_posts_from_env().await,
        Command::Trending => handlers::trending_from_env().await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::info!("Running {:?}", cli.command);

    let response = dispatch(cli.command).await;
    let rendered = if cli.compact {
        serde_json::to_string(&response)?
    } else {
        serde_json::to_string_pretty(&response)?
    };
    println!("{rendered}");

    if response.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        tracing::error!("{:?} finished with status {}", cli.command, response.status_code);
        Ok(ExitCode::FAILURE)
    }
}
