// Shared foundations for hoopcast: configuration, the stat and team
// vocabularies, and the saved-prop ledger.

pub mod config;
pub mod ledger;
pub mod stat;
pub mod teams;
