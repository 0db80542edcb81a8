//! # IR Variables
//!
//! An `IrVariable` refers to the group of target-level slots that a
//! typed source value or expression occupies. A single-slot value maps
//! to one named slot; a multi-slot value fans out into suffixed slot
//! names that are emitted as comma-separated lists in the generated
//! text. Tuple components project out of the right-nested pair encoding
//! with their own derived names.

use basalt_compiler_semantic::{PrimitiveType, TypeEnvironment, TypeTerm, UnderlyingTypes};
use smallvec::SmallVec;

use crate::layout::{stack_size, LayoutError};
use crate::LayoutResult;

/// A named group of stack slots holding a value of a known type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrVariable {
    base_name: String,
    ty: TypeTerm,
    stack_size: usize,
}

impl IrVariable {
    /// Creates a variable with an explicit base name, computing its
    /// footprint from the type.
    pub fn new(
        env: &TypeEnvironment,
        underlying_types: &UnderlyingTypes,
        base_name: impl Into<String>,
        ty: TypeTerm,
    ) -> LayoutResult<Self> {
        let stack_size = stack_size(env, underlying_types, &ty)?;
        Ok(Self {
            base_name: base_name.into(),
            ty,
            stack_size,
        })
    }

    /// Creates a variable with a precomputed footprint. The caller is
    /// responsible for the size matching the type.
    pub fn with_stack_size(base_name: impl Into<String>, ty: TypeTerm, stack_size: usize) -> Self {
        Self {
            base_name: base_name.into(),
            ty,
            stack_size,
        }
    }

    /// Creates the variable for a named source local.
    pub fn local(
        env: &TypeEnvironment,
        underlying_types: &UnderlyingTypes,
        name: &str,
        ty: TypeTerm,
    ) -> LayoutResult<Self> {
        Self::new(env, underlying_types, format!("v_{name}"), ty)
    }

    /// Creates the variable for an expression, keyed by its node id.
    pub fn expression(
        env: &TypeEnvironment,
        underlying_types: &UnderlyingTypes,
        id: usize,
        ty: TypeTerm,
    ) -> LayoutResult<Self> {
        Self::new(env, underlying_types, format!("expr_{id}"), ty)
    }

    /// The type of the variable.
    pub const fn ty(&self) -> &TypeTerm {
        &self.ty
    }

    /// The stack footprint of the variable in slots.
    pub const fn stack_size(&self) -> usize {
        self.stack_size
    }

    /// The name of the variable, if it occupies exactly one stack slot.
    pub fn name(&self) -> LayoutResult<&str> {
        if self.stack_size != 1 {
            return Err(LayoutError::InvariantViolation(format!(
                "`{}` occupies {} slots and has no single name",
                self.base_name, self.stack_size
            )));
        }
        Ok(&self.base_name)
    }

    /// The names of the stack slots of the variable. A single-slot
    /// variable uses its base name unchanged; wider variables fan out
    /// into numbered suffixes.
    pub fn stack_slots(&self) -> SmallVec<[String; 4]> {
        match self.stack_size {
            0 => SmallVec::new(),
            1 => SmallVec::from_iter([self.base_name.clone()]),
            wide => (1..=wide)
                .map(|slot| self.suffixed_name(&slot.to_string()))
                .collect(),
        }
    }

    /// A comma-separated list of the stack slots of the variable.
    pub fn comma_separated_list(&self) -> String {
        self.stack_slots().join(", ")
    }

    /// A comma-separated list of the stack slots, prefixed with a comma
    /// unless the variable occupies no slots.
    pub fn comma_separated_list_prefixed(&self) -> String {
        let list = self.comma_separated_list();
        if list.is_empty() {
            list
        } else {
            format!(", {list}")
        }
    }

    /// The variable referring to component `index` of this tuple
    /// variable, following the right-nested pair encoding.
    pub fn tuple_component(
        &self,
        env: &TypeEnvironment,
        underlying_types: &UnderlyingTypes,
        index: usize,
    ) -> LayoutResult<Self> {
        let mut current = env.resolve(&self.ty);
        let mut remaining = index;
        loop {
            if current.is_primitive(PrimitiveType::Pair) {
                let (first, second) = match current.arguments() {
                    [first, second] => (first.clone(), second.clone()),
                    _ => {
                        return Err(LayoutError::InvariantViolation(format!(
                            "pair type `{current}` must have exactly two arguments"
                        )))
                    }
                };
                if remaining == 0 {
                    return Self::new(
                        env,
                        underlying_types,
                        self.suffixed_name(&index.to_string()),
                        first,
                    );
                }
                remaining -= 1;
                current = env.resolve(&second);
            } else {
                if remaining == 0 {
                    return Self::new(
                        env,
                        underlying_types,
                        self.suffixed_name(&index.to_string()),
                        current,
                    );
                }
                return Err(LayoutError::InvariantViolation(format!(
                    "tuple component {index} of `{}` is out of bounds",
                    self.ty
                )));
            }
        }
    }

    /// The base name appended with an underscore and `suffix`, or the
    /// base name itself when the suffix is empty.
    fn suffixed_name(&self, suffix: &str) -> String {
        if suffix.is_empty() {
            self.base_name.clone()
        } else {
            format!("{}_{suffix}", self.base_name)
        }
    }
}
