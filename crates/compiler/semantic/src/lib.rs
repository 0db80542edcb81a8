//! # Basalt Type System
//!
//! This crate implements the structural type system the Basalt backend
//! lowers against: type terms built from primitive and user-declared
//! constructors, a substitution-based type environment with unification,
//! and the registry of underlying definitions for user-declared
//! constructors.
//!
//! ## Architecture
//!
//! - [`TypeTerm`]: a type is either a variable or a constructor applied
//!   to argument terms
//! - [`TypeEnvironment`]: substitution map with resolution, unification
//!   and a fresh-variable factory; cloneable for speculative unification
//! - [`UnderlyingTypes`]: maps a user-declared constructor to its generic
//!   underlying definition
//!
//! ## Design Notes
//!
//! Type terms are plain owned values. There is no interning layer and no
//! incremental database behind this crate; structural equality is cheap
//! at the sizes the backend deals with, and owned terms keep the
//! environment free of lifetimes.

pub mod env;
pub mod types;

pub use env::{TypeEnvironment, UnifyError};
pub use types::{Constructor, PrimitiveType, TypeTerm, UnderlyingTypes};

index_vec::define_index_type! {
    /// Unique identifier for a user-declared type constructor
    pub struct ConstructorId = usize;
}

index_vec::define_index_type! {
    /// Unique identifier for a type variable within an environment family
    pub struct TypeVariable = usize;
}
