//! Operations: the `execute(a, b)` capability, the built-in arithmetic
//! variants and the name-keyed registry the engine resolves them through.
//!
//! # Invariants
//! - Operations are stateless; a registered prototype is shared freely.
//! - Registry keys are lowercase.

pub mod operation;
pub mod registry;

pub use operation::{
    Addition, Division, Multiplication, Operation, OperationError, Power, Root, Subtraction,
};
pub use registry::OperationRegistry;
