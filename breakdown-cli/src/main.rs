use std::process::ExitCode;

use anyhow::Context;
use breakdown_core::config::DEFAULT_DECK;
use breakdown_core::RunConfig;
use clap::Parser;
use tokio::runtime::Builder;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Adds one Anki note per new Hatena Bookmark feed item through AnkiConnect.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Feed to read, e.g. https://b.hatena.ne.jp/ikeikeikeike/bookmark.rss
    #[arg(long)]
    url: String,

    /// Deck the notes are filed under
    #[arg(long, default_value = DEFAULT_DECK)]
    deck: String,
}

const SINGLE_DASH_FLAGS: [&str; 2] = ["url", "deck"];

/// Rewrites `-url`, `-deck`, `-url=..` and `-deck=..` to their `--` forms so
/// both spellings are accepted.
fn normalize_flags<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    args.into_iter()
        .map(|arg| {
            let single_dash = arg
                .strip_prefix('-')
                .filter(|rest| !rest.starts_with('-'))
                .map(|rest| rest.split('=').next().unwrap_or(rest))
                .is_some_and(|name| SINGLE_DASH_FLAGS.contains(&name));
            if single_dash {
                format!("-{arg}")
            } else {
                arg
            }
        })
        .collect()
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse_from(normalize_flags(std::env::args()));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = RunConfig::new(cli.url, cli.deck).context("failed to resolve the store path")?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to initialise Tokio runtime")?;

    runtime
        .block_on(breakdown_core::run(&config))
        .with_context(|| format!("run over {} aborted", config.feed_url))?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
