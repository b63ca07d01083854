//! History: calculation records, immutable history snapshots and file-backed
//! persistence.
//!
//! # Invariants
//! - A `Calculation` never changes after construction.
//! - A `CalculatorMemento` owns its own copy of the history it captured.
//! - Loading a record recomputes its result and rejects a mismatch.

pub mod calculation;
pub mod memento;
pub mod store;
mod timestamp;

pub use calculation::{Calculation, CalculationRecord};
pub use memento::{CalculatorMemento, MementoRecord};
pub use store::{HistoryStore, StoreError};
