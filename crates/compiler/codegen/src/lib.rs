//! # Basalt Stack Lowering Helpers
//!
//! This crate computes how typed values materialize on the target stack
//! machine. The core is [`stack_size`], which maps a monomorphic type
//! term to the number of abstract stack slots it occupies; on top of it,
//! [`IrVariable`] names the group of slots a lowered value lives in so
//! the statement generator can emit slot lists textually.
//!
//! ## Architecture
//!
//! 1. **Footprint calculation**: structural recursion over a resolved
//!    type term, monomorphizing user-declared constructors through their
//!    generic underlying definitions on the way
//! 2. **Slot naming**: deterministic suffix scheme for multi-slot values
//!
//! Both steps are pure; all state lives in the type environment and the
//! constructor registry passed in by the caller.

pub mod ir_variable;
pub mod layout;

pub use ir_variable::IrVariable;
pub use layout::{stack_size, LayoutError};

/// Result type for stack lowering operations
pub type LayoutResult<T> = Result<T, LayoutError>;
