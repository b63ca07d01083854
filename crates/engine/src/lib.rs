//! Calculator engine: executes operations, keeps the live history and the
//! undo/redo memento stacks, and notifies observers.
//!
//! # Invariants
//! - The redo stack is empty after every successful operation.
//! - A failed command leaves history and both stacks untouched.
//! - Observer failures are logged and never roll back engine state.

pub mod calculator;
pub mod error;
pub mod observer;

pub use calculator::Calculator;
pub use error::CalculatorError;
pub use observer::{
    AutoSaveObserver, HistoryObserver, LoggingObserver, ObserverError, ObserverHandle,
};
