pub mod extract;
pub mod fetch;
pub mod index;
pub mod reconcile;
pub mod report;
pub mod resolve;
pub mod writer;

pub use reconcile::Reconciler;
pub use report::RunSummary;
