//! # Type Terms
//!
//! This module defines the term representation of Basalt types. A type is
//! either a type variable or a constructor applied to argument terms; the
//! constructor is one of a fixed set of primitives or a user-declared
//! named constructor.
//!
//! Tuples and functions are not separate syntactic forms: a tuple is a
//! right-nested chain of `Pair` applications and a function is a
//! two-argument `Function` application. Keeping the term grammar this
//! small makes unification a plain structural walk.

use crate::{ConstructorId, TypeVariable};
use index_vec::IndexVec;

/// The primitive type constructors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    /// The uninhabited type; has no values and no stack form
    Void,

    /// The empty tuple; occupies no stack slots
    Unit,

    /// Placeholder for a self-reference inside a declaration; occupies no
    /// stack slots
    Itself,

    /// Boolean type
    Bool,

    /// A single machine word
    Word,

    /// Compile-time integer literals; never materialized on the stack
    Integer,

    /// Binary product; `Pair(a, b)` concatenates the stack forms of its
    /// components
    Pair,

    /// Value-level function type `Function(argument, result)`
    Function,

    /// Type-level function `TypeFunction(argument, result)`, the shape of
    /// a generic underlying definition
    TypeFunction,

    /// Binary sum; declared but not yet lowered
    Sum,
}

/// A type constructor: primitive or user-declared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constructor {
    Primitive(PrimitiveType),
    Named(ConstructorId),
}

/// A structural type term
///
/// Terms are plain owned values; equality is structural. Variables are
/// meaningful only relative to a [`crate::TypeEnvironment`], which binds
/// them during unification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTerm {
    /// A type variable, resolved through an environment
    Variable(TypeVariable),

    /// A constructor applied to zero or more argument terms
    Constant {
        constructor: Constructor,
        arguments: Vec<TypeTerm>,
    },
}

impl TypeTerm {
    /// Creates a constant term from a primitive constructor and its
    /// arguments.
    pub const fn primitive(kind: PrimitiveType, arguments: Vec<Self>) -> Self {
        Self::Constant {
            constructor: Constructor::Primitive(kind),
            arguments,
        }
    }

    /// Creates a constant term from a user-declared constructor.
    pub const fn named(constructor: ConstructorId, arguments: Vec<Self>) -> Self {
        Self::Constant {
            constructor: Constructor::Named(constructor),
            arguments,
        }
    }

    /// Creates the unit type
    pub const fn unit() -> Self {
        Self::primitive(PrimitiveType::Unit, Vec::new())
    }

    /// Creates the void type
    pub const fn void() -> Self {
        Self::primitive(PrimitiveType::Void, Vec::new())
    }

    /// Creates the self-reference placeholder type
    pub const fn itself() -> Self {
        Self::primitive(PrimitiveType::Itself, Vec::new())
    }

    /// Creates the boolean type
    pub const fn bool() -> Self {
        Self::primitive(PrimitiveType::Bool, Vec::new())
    }

    /// Creates the word type
    pub const fn word() -> Self {
        Self::primitive(PrimitiveType::Word, Vec::new())
    }

    /// Creates the literal-integer type
    pub const fn integer() -> Self {
        Self::primitive(PrimitiveType::Integer, Vec::new())
    }

    /// Creates a pair type
    pub fn pair(first: Self, second: Self) -> Self {
        Self::primitive(PrimitiveType::Pair, vec![first, second])
    }

    /// Creates a sum type
    pub fn sum(left: Self, right: Self) -> Self {
        Self::primitive(PrimitiveType::Sum, vec![left, right])
    }

    /// Creates a value-level function type
    pub fn function(argument: Self, result: Self) -> Self {
        Self::primitive(PrimitiveType::Function, vec![argument, result])
    }

    /// Creates a type-level function, the shape of a generic underlying
    /// definition.
    pub fn type_function(argument: Self, result: Self) -> Self {
        Self::primitive(PrimitiveType::TypeFunction, vec![argument, result])
    }

    /// Encodes a component list as a tuple: the empty tuple is `Unit`, a
    /// single component is the component itself, anything longer is a
    /// right-nested chain of pairs.
    pub fn tuple(mut components: Vec<Self>) -> Self {
        match components.len() {
            0 => Self::unit(),
            1 => components.remove(0),
            _ => {
                let mut result = components.pop().unwrap_or_else(Self::unit);
                while let Some(component) = components.pop() {
                    result = Self::pair(component, result);
                }
                result
            }
        }
    }

    /// Returns true if this term is a type variable.
    pub const fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// Returns true if this term is a constructor application.
    pub const fn is_constant(&self) -> bool {
        matches!(self, Self::Constant { .. })
    }

    /// Returns true if this term applies the given primitive constructor.
    pub const fn is_primitive(&self, kind: PrimitiveType) -> bool {
        matches!(
            self,
            Self::Constant {
                constructor: Constructor::Primitive(found),
                ..
            } if *found as usize == kind as usize
        )
    }

    /// Returns true if this term is a value-level function type.
    pub const fn is_function_type(&self) -> bool {
        self.is_primitive(PrimitiveType::Function)
    }

    /// Returns the constructor if this term is a constant.
    pub const fn constructor(&self) -> Option<Constructor> {
        match self {
            Self::Constant { constructor, .. } => Some(*constructor),
            Self::Variable(_) => None,
        }
    }

    /// Returns the argument terms if this term is a constant.
    pub fn arguments(&self) -> &[Self] {
        match self {
            Self::Constant { arguments, .. } => arguments,
            Self::Variable(_) => &[],
        }
    }

    /// Splits a type-level function into its argument and result terms.
    pub fn as_type_function(&self) -> Option<(&Self, &Self)> {
        match self {
            Self::Constant {
                constructor: Constructor::Primitive(PrimitiveType::TypeFunction),
                arguments,
            } => match arguments.as_slice() {
                [argument, result] => Some((argument, result)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Preorder walk over this term and all of its subterms.
    pub fn walk(&self, visit: &mut dyn FnMut(&Self)) {
        visit(self);
        if let Self::Constant { arguments, .. } = self {
            for argument in arguments {
                argument.walk(visit);
            }
        }
    }

    /// Returns true if the given variable occurs anywhere in this term.
    pub fn mentions_variable(&self, variable: TypeVariable) -> bool {
        let mut found = false;
        self.walk(&mut |term| {
            if matches!(term, Self::Variable(v) if *v == variable) {
                found = true;
            }
        });
        found
    }
}

impl std::fmt::Display for TypeTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Variable(variable) => write!(f, "'{}", variable.index()),
            Self::Constant {
                constructor,
                arguments,
            } => {
                match constructor {
                    Constructor::Primitive(PrimitiveType::Void) => write!(f, "void")?,
                    Constructor::Primitive(PrimitiveType::Unit) => return write!(f, "()"),
                    Constructor::Primitive(PrimitiveType::Itself) => write!(f, "itself")?,
                    Constructor::Primitive(PrimitiveType::Bool) => write!(f, "bool")?,
                    Constructor::Primitive(PrimitiveType::Word) => write!(f, "word")?,
                    Constructor::Primitive(PrimitiveType::Integer) => write!(f, "integer")?,
                    Constructor::Primitive(PrimitiveType::Pair) => write!(f, "pair")?,
                    Constructor::Primitive(PrimitiveType::Function) => write!(f, "fn")?,
                    Constructor::Primitive(PrimitiveType::TypeFunction) => write!(f, "tfn")?,
                    Constructor::Primitive(PrimitiveType::Sum) => write!(f, "sum")?,
                    Constructor::Named(id) => write!(f, "c{}", id.index())?,
                }
                if !arguments.is_empty() {
                    write!(f, "(")?;
                    for (i, argument) in arguments.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{argument}")?;
                    }
                    write!(f, ")")?;
                }
                Ok(())
            }
        }
    }
}

/// Registry of user-declared type constructors and their generic
/// underlying definitions.
///
/// Variables inside an underlying definition must come from the same
/// environment family that later resolves against the registry, so that
/// fresh variables minted during monomorphization can never collide with
/// them.
#[derive(Debug, Clone, Default)]
pub struct UnderlyingTypes {
    definitions: IndexVec<ConstructorId, UnderlyingDefinition>,
}

#[derive(Debug, Clone)]
struct UnderlyingDefinition {
    name: String,
    underlying: TypeTerm,
}

impl UnderlyingTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a constructor with its generic underlying definition and
    /// returns its identity.
    pub fn declare(&mut self, name: impl Into<String>, underlying: TypeTerm) -> ConstructorId {
        self.definitions.push(UnderlyingDefinition {
            name: name.into(),
            underlying,
        })
    }

    /// The generic underlying definition of a constructor.
    pub fn underlying(&self, constructor: ConstructorId) -> Option<&TypeTerm> {
        self.definitions
            .get(constructor)
            .map(|definition| &definition.underlying)
    }

    /// The declared name of a constructor.
    pub fn name(&self, constructor: ConstructorId) -> Option<&str> {
        self.definitions
            .get(constructor)
            .map(|definition| definition.name.as_str())
    }
}
