// Prop analysis: normalize a player's game log, aggregate it over splits,
// rate the opponent's defense and blend everything into a projection.

pub mod aggregate;
pub mod defense;
pub mod normalize;
pub mod projection;
pub mod schedule;

pub use aggregate::{HitRate, Split, SplitReport, SplitSummary};
pub use defense::{DefensiveRating, OpponentSeason};
pub use normalize::GameStatRow;
pub use projection::{ProjectionInputs, Venue};
pub use schedule::UpcomingGame;
