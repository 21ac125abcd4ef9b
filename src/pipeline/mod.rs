//! Pipeline entry points for the relay.
//!
//! - `scrape_plan`: Download, extract and parse the current plan
//! - `Announcer`: Render a cycle result and reconcile it into the channel
//! - `Scheduler`: Repeat cycles until shutdown

pub mod announce;
pub mod reconcile;
pub mod scheduler;
pub mod scrape;

pub use announce::{Announcer, PlanSink};
pub use reconcile::{ChannelReconciler, HISTORY_LIMIT, ReconcileOutcome};
pub use scheduler::Scheduler;
pub use scrape::scrape_plan;
