//! modgate daemon — entry point for running the moderation bot.

use clap::Parser;
use std::path::PathBuf;

use modgate_bot::{Bot, BotConfig};
use modgate_platform::ReportSink;
use modgate_reddit::{RedditClient, RedditConfig};
use modgate_store_lmdb::LmdbGrantQueue;
use modgate_types::{AccountHandle, Timestamp};

#[derive(Parser)]
#[command(name = "modgate", about = "Community posting-eligibility bot")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "modgate.toml", env = "MODGATE_CONFIG")]
    config: PathBuf,

    /// Turn on verbose logging.
    #[arg(long)]
    debug: bool,

    /// Verify a single account and print the report.
    #[arg(long, value_name = "handle")]
    verify: Option<String>,

    /// Run verifications for handles read from stdin, one per line.
    #[arg(long)]
    from_list: bool,

    /// Print the accounts currently holding the contributor permission.
    #[arg(long)]
    contributors: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = BotConfig::from_toml_file(&cli.config)?;
    let level = if cli.debug { "debug" } else { &config.log_level };
    modgate_utils::init_tracing(level);

    let credentials = RedditConfig::from_env()?;
    let client = RedditClient::new(
        credentials,
        config.community.clone(),
        config.bot_handle.clone(),
        config.failed_report_conversation.clone(),
        &config.user_agent,
    )?;
    let queue = LmdbGrantQueue::open(&config.data_dir.join("grant_queue"))?;

    let now = Timestamp::now();
    let thresholds = config.thresholds(now);
    let user_agent = config.user_agent.clone();
    let mut bot = Bot::new(config, thresholds, &client, &client, &client, &queue);

    if let Some(handle) = cli.verify {
        let (passed, report) = bot.process(&AccountHandle::new(handle), now)?;
        println!("{report}");
        std::process::exit(if passed { 0 } else { 1 });
    }

    if cli.contributors {
        for contributor in client.list_contributors()? {
            println!("{contributor}");
        }
        return Ok(());
    }

    if cli.from_list {
        let stdin = std::io::stdin();
        bot.process_from_list(stdin.lock(), now)?;
        return Ok(());
    }

    tracing::info!("{user_agent} started");
    bot.run();
    Ok(())
}
