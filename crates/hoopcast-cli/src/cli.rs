// Command-line surface.

use clap::{Args, Parser, Subcommand};

use hoopcast_analysis::Venue;
use hoopcast_core::stat::StatKind;

#[derive(Debug, Parser)]
#[command(name = "hoopcast")]
#[command(version)]
#[command(about = "NBA player-prop analysis: split averages, hit rates and a simple projection", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Also write log output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the team abbreviations accepted as opponents
    Teams,
    /// Search active players by name
    Search {
        /// Full or partial player name
        query: String,
    },
    /// Analyze a player prop against a line
    Analyze(AnalyzeArgs),
    /// List saved props, newest first
    Props,
    /// Settle pending props whose games have finished
    Resolve,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Player name to search for
    #[arg(short, long)]
    pub player: String,

    /// Which search result to use when several players match (1-based)
    #[arg(long, default_value_t = 1)]
    pub pick: usize,

    /// Statistic: points, rebounds, assists, threes, steals, blocks, turnovers, minutes
    #[arg(short, long)]
    pub stat: StatKind,

    /// Prop line, a multiple of 0.5 (e.g. 22.5)
    #[arg(short, long)]
    pub line: f64,

    /// Odds as quoted by the book (e.g. -115), stored verbatim
    #[arg(short, long, default_value = "", allow_hyphen_values = true)]
    pub odds: String,

    /// Opponent team abbreviation (see `hoopcast teams`)
    #[arg(long)]
    pub opponent: String,

    /// Force the venue instead of taking it from the schedule
    #[arg(long)]
    pub venue: Option<Venue>,

    /// Season start year; defaults to [analysis] season in hoopcast.toml
    #[arg(long)]
    pub season: Option<i32>,

    /// Append the result to the prop ledger
    #[arg(long)]
    pub save: bool,
}
