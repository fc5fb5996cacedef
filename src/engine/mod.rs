//! Pure computation over retrieved ledger events.

pub mod reconcile;
pub mod velocity;

pub use reconcile::{refund_totals, AggregateStats, ReconcileParams, Reconciler, Reconciliation};
pub use velocity::VelocityReport;
