// Application layer: runs analyses, holds the pending save, and resolves
// saved props against final box scores.

pub mod outcomes;
pub mod session;

pub use outcomes::{resolve_outcomes, ResolveSummary};
pub use session::{
    analyze, find_players, AnalysisReport, AnalysisRequest, Session, VenueSource,
};

use hoopcast_core::ledger::LedgerError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid line {line}: {reason}")]
    InvalidLine { line: f64, reason: &'static str },

    #[error("no analysis is waiting to be saved")]
    NothingToSave,

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
