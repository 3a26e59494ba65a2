// hoopcast entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log file under logs/, stderr too with --verbose)
// 3. Load config (copying defaults/ into config/ on first run)
// 4. Dispatch the subcommand

mod cli;
mod render;

use anyhow::{bail, Context};
use chrono::{Local, Utc};
use clap::Parser;
use tracing::{info, warn};

use hoopcast_api::BallDontLieClient;
use hoopcast_app::{analyze, find_players, resolve_outcomes, AnalysisRequest, Session};
use hoopcast_core::config::{self, Config, API_KEY_ENV};
use hoopcast_core::ledger::Ledger;
use hoopcast_core::teams::{find_by_abbreviation, NBA_TEAMS};

use cli::{AnalyzeArgs, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;
    info!("hoopcast starting");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: season={}, last_n={}, ledger={}",
        config.analysis.season,
        config.analysis.last_n,
        config.ledger_path.display()
    );

    match cli.command {
        Command::Teams => println!("{}", render::teams(&NBA_TEAMS)),
        Command::Search { query } => {
            let client = client(&config)?;
            let found = find_players(&client, &query).await;
            println!("{}", render::players(&found));
        }
        Command::Analyze(args) => run_analyze(&config, args).await?,
        Command::Props => {
            let ledger = Ledger::load(&config.ledger_path);
            if ledger.skipped() > 0 {
                warn!("{} ledger row(s) could not be read", ledger.skipped());
            }
            println!("{}", render::props(&ledger.newest_first()));
        }
        Command::Resolve => {
            let client = client(&config)?;
            let mut ledger = Ledger::load(&config.ledger_path);
            let summary = resolve_outcomes(&client, &mut ledger)
                .await
                .context("failed to update the prop ledger")?;
            println!("{}", render::resolve_summary(&summary));
        }
    }

    info!("hoopcast finished");
    Ok(())
}

fn client(config: &Config) -> anyhow::Result<BallDontLieClient> {
    let client = BallDontLieClient::from_config(config).context("failed to build API client")?;
    if !client.has_api_key() {
        eprintln!(
            "warning: no API key configured (set {API_KEY_ENV} or config/credentials.toml); \
             requests will likely be rejected"
        );
    }
    Ok(client)
}

async fn run_analyze(config: &Config, args: AnalyzeArgs) -> anyhow::Result<()> {
    let Some(team) = find_by_abbreviation(&args.opponent) else {
        bail!(
            "unknown opponent '{}'; run `hoopcast teams` for the list",
            args.opponent
        );
    };

    let client = client(config)?;
    let found = find_players(&client, &args.player).await;
    if found.is_empty() {
        bail!("no active player matches '{}'", args.player);
    }
    let Some(player) = args.pick.checked_sub(1).and_then(|i| found.get(i)) else {
        bail!(
            "--pick {} is out of range; '{}' matched:\n{}",
            args.pick,
            args.player,
            render::players(&found)
        );
    };
    if found.len() > 1 && args.pick == 1 {
        info!("{} players matched '{}', using the first", found.len(), args.player);
    }

    let request = AnalysisRequest {
        player: player.clone(),
        stat: args.stat,
        line: args.line,
        odds: args.odds,
        opponent: team.abbreviation.to_string(),
        season: args.season.unwrap_or(config.analysis.season),
        venue: args.venue,
    };
    let today = Local::now().date_naive();
    let report = analyze(&client, config, request, today).await?;
    println!("{}", render::analysis(&report));

    if args.save {
        let mut session = Session::new();
        session.record(report);
        let mut ledger = Ledger::load(&config.ledger_path);
        let prop = session
            .save_pending(&mut ledger, Utc::now())
            .context("failed to save prop")?;
        println!();
        println!("Saved to {}:", ledger.path().display());
        println!("{}", render::saved_prop(&prop));
    }
    Ok(())
}

/// Initialize tracing to a log file; stdout is reserved for command output.
fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("hoopcast.log"))?;

    let writer = if verbose {
        BoxMakeWriter::new(log_file.and(std::io::stderr))
    } else {
        BoxMakeWriter::new(log_file)
    };

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hoopcast=info,warn")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
