//! Stock core: pure catalog state, change detection and recovery policy.
mod backoff;
mod cycle;
mod detect;
mod filter;
mod index;
mod product;

pub use backoff::{Backoff, BackoffPolicy};
pub use cycle::{CycleState, Headers};
pub use detect::{ChangeDetector, Transition};
pub use filter::KeywordFilter;
pub use index::{AvailabilityIndex, ProductKey, StockKey};
pub use product::{AvailableSize, Product, Variant};
