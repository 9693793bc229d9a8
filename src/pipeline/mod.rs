//! Pipeline entry points for watcher operations.
//!
//! - `Watcher::run_once`: one pass over every configured site
//! - `run_scheduled`: repeat `run_once` on a fixed interval
//! - `check_site`: fetch and extract a single site without side effects

pub mod schedule;
pub mod watch;

#[cfg(test)]
mod fakes;

pub use schedule::run_scheduled;
pub use watch::{SiteOutcome, TickSummary, Watcher, check_site};
