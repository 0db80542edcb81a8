//! # Type Environment
//!
//! A substitution from type variables to type terms, together with the
//! operations the backend needs: shallow and deep resolution, occurs-
//! checked unification, and a fresh-variable factory.
//!
//! Unification accumulates failures instead of stopping at the first
//! one: `unify` returns the residual errors and an empty vector means
//! the two terms were made equal under the substitution. Cloning the
//! environment snapshots the substitution, so callers can unify
//! speculatively and throw the clone away.

use rustc_hash::FxHashMap;

use crate::types::TypeTerm;
use crate::TypeVariable;

/// A failed unification step
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnifyError {
    /// Two constructor applications disagree on the constructor or arity
    #[error("cannot unify `{left}` with `{right}`")]
    TypeMismatch { left: TypeTerm, right: TypeTerm },

    /// Binding the variable would make it contain itself
    #[error("recursive type: variable `'{}` occurs in `{term}`", variable.index())]
    RecursiveType {
        variable: TypeVariable,
        term: TypeTerm,
    },
}

/// Substitution mapping type variables to type terms
///
/// Environments form a family: every clone shares the variable counter
/// state it was cloned with, so variables minted before the split stay
/// meaningful in both copies and fresh variables never collide with
/// them.
#[derive(Debug, Clone, Default)]
pub struct TypeEnvironment {
    substitutions: FxHashMap<TypeVariable, TypeTerm>,
    next_variable: usize,
}

impl TypeEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints a variable unused anywhere in this environment family.
    pub fn fresh_type_variable(&mut self) -> TypeTerm {
        let variable = TypeVariable::from_raw(self.next_variable);
        self.next_variable += 1;
        TypeTerm::Variable(variable)
    }

    /// Resolves the outermost variables of `term` to normal form: the
    /// result is either a constructor application or an unbound
    /// variable. Resolution is idempotent and does not descend into
    /// arguments.
    pub fn resolve(&self, term: &TypeTerm) -> TypeTerm {
        let mut current = term.clone();
        while let TypeTerm::Variable(variable) = &current {
            match self.substitutions.get(variable) {
                Some(bound) => current = bound.clone(),
                None => break,
            }
        }
        current
    }

    /// Fully substitutes `term`: every bound variable at any depth is
    /// replaced. The result contains only unbound variables, if any.
    pub fn resolve_recursive(&self, term: &TypeTerm) -> TypeTerm {
        match self.resolve(term) {
            TypeTerm::Variable(variable) => TypeTerm::Variable(variable),
            TypeTerm::Constant {
                constructor,
                arguments,
            } => TypeTerm::Constant {
                constructor,
                arguments: arguments
                    .iter()
                    .map(|argument| self.resolve_recursive(argument))
                    .collect(),
            },
        }
    }

    /// Makes `left` and `right` equal under the substitution where
    /// possible and returns the residual failures. An empty result means
    /// full success; on failure the environment keeps the bindings made
    /// before and after the failing step.
    pub fn unify(&mut self, left: &TypeTerm, right: &TypeTerm) -> Vec<UnifyError> {
        let mut failures = Vec::new();
        self.unify_inner(left, right, &mut failures);
        failures
    }

    fn unify_inner(&mut self, left: &TypeTerm, right: &TypeTerm, failures: &mut Vec<UnifyError>) {
        let left = self.resolve(left);
        let right = self.resolve(right);

        match (&left, &right) {
            (TypeTerm::Variable(a), TypeTerm::Variable(b)) if a == b => {}
            (TypeTerm::Variable(variable), _) => self.instantiate(*variable, &right, failures),
            (_, TypeTerm::Variable(variable)) => self.instantiate(*variable, &left, failures),
            (
                TypeTerm::Constant {
                    constructor: left_constructor,
                    arguments: left_arguments,
                },
                TypeTerm::Constant {
                    constructor: right_constructor,
                    arguments: right_arguments,
                },
            ) => {
                if left_constructor != right_constructor
                    || left_arguments.len() != right_arguments.len()
                {
                    failures.push(UnifyError::TypeMismatch { left, right });
                    return;
                }
                for (left_argument, right_argument) in left_arguments.iter().zip(right_arguments) {
                    self.unify_inner(left_argument, right_argument, failures);
                }
            }
        }
    }

    /// Binds `variable` to `term`, rejecting bindings that would make the
    /// variable contain itself.
    fn instantiate(
        &mut self,
        variable: TypeVariable,
        term: &TypeTerm,
        failures: &mut Vec<UnifyError>,
    ) {
        if self.occurs_in(variable, term) {
            failures.push(UnifyError::RecursiveType {
                variable,
                term: term.clone(),
            });
            return;
        }
        tracing::debug!(variable = variable.index(), term = %term, "binding type variable");
        self.substitutions.insert(variable, term.clone());
    }

    /// Occurs check through the current substitution.
    fn occurs_in(&self, variable: TypeVariable, term: &TypeTerm) -> bool {
        match self.resolve(term) {
            TypeTerm::Variable(found) => found == variable,
            TypeTerm::Constant { arguments, .. } => arguments
                .iter()
                .any(|argument| self.occurs_in(variable, argument)),
        }
    }
}
