//! # Stack Footprint Calculation
//!
//! This module computes the number of abstract stack slots a value of a
//! given type occupies on the target machine. The footprint is what the
//! statement generator sizes every lowered variable with, so the rules
//! here define the machine-level shape of the whole type system:
//!
//! | type                         | slots                               |
//! |------------------------------|-------------------------------------|
//! | unit, itself                 | 0                                   |
//! | bool, word                   | 1                                   |
//! | functions                    | 1                                   |
//! | pair(a, b)                   | footprint(a) + footprint(b)         |
//! | integer, void, type function | no stack form (error)               |
//! | user-declared constructor    | footprint of its underlying type    |
//!
//! A user-declared constructor applied to arguments is monomorphized on
//! the fly: the generic underlying definition is unified against a
//! candidate type function built from the argument list, in a clone of
//! the caller's environment so the speculative bindings never leak out.

use basalt_compiler_semantic::{
    Constructor, PrimitiveType, TypeEnvironment, TypeTerm, UnderlyingTypes,
};

/// Represents an error in footprint calculation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// The type is valid but has no stack form (literals, void, type
    /// functions)
    #[error("type `{0}` has no stack representation")]
    InvalidStackRepresentation(String),

    /// The type is declared but not lowered yet
    #[error("unsupported type: {0}")]
    Unsupported(&'static str),

    /// A compiler invariant was violated upstream: the input was not
    /// monomorphized, or a registry entry is missing or malformed
    #[error("layout invariant violated: {0}")]
    InvariantViolation(String),
}

/// Computes the stack footprint of `ty` in slots.
///
/// `ty` must resolve to a constructor application under `env`; an
/// unresolved variable means the front-end failed to monomorphize and is
/// reported as an invariant violation. `underlying_types` supplies the
/// generic definitions of user-declared constructors.
pub fn stack_size(
    env: &TypeEnvironment,
    underlying_types: &UnderlyingTypes,
    ty: &TypeTerm,
) -> Result<usize, LayoutError> {
    let ty = env.resolve(ty);
    let TypeTerm::Constant {
        constructor,
        arguments,
    } = &ty
    else {
        return Err(LayoutError::InvariantViolation(format!(
            "type `{ty}` was not monomorphized"
        )));
    };

    match constructor {
        Constructor::Primitive(PrimitiveType::Unit | PrimitiveType::Itself) => Ok(0),

        Constructor::Primitive(PrimitiveType::Bool | PrimitiveType::Word) => {
            if !arguments.is_empty() {
                return Err(LayoutError::InvariantViolation(format!(
                    "primitive type `{ty}` must not have arguments"
                )));
            }
            Ok(1)
        }

        Constructor::Primitive(PrimitiveType::Function) => Ok(1),

        Constructor::Primitive(
            PrimitiveType::Integer | PrimitiveType::Void | PrimitiveType::TypeFunction,
        ) => Err(LayoutError::InvalidStackRepresentation(ty.to_string())),

        Constructor::Primitive(PrimitiveType::Pair) => match arguments.as_slice() {
            [first, second] => Ok(stack_size(env, underlying_types, first)?
                + stack_size(env, underlying_types, second)?),
            _ => Err(LayoutError::InvariantViolation(format!(
                "pair type `{ty}` must have exactly two arguments"
            ))),
        },

        Constructor::Primitive(PrimitiveType::Sum) => {
            Err(LayoutError::Unsupported("sum types are not lowered yet"))
        }

        Constructor::Named(constructor_id) => {
            let Some(generic) = underlying_types.underlying(*constructor_id) else {
                return Err(LayoutError::InvariantViolation(format!(
                    "no underlying definition for constructor `{ty}`"
                )));
            };
            let generic = env.resolve(generic);
            if generic.is_constant() {
                return stack_size(env, underlying_types, &generic);
            }

            // The definition is still generic: monomorphize it against
            // the applied arguments in a speculative environment.
            let mut speculative = env.clone();
            let fresh_result = speculative.fresh_type_variable();
            let candidate =
                TypeTerm::type_function(TypeTerm::tuple(arguments.clone()), fresh_result);

            let residual = speculative.unify(&candidate, &generic);
            if !residual.is_empty() {
                return Err(LayoutError::InvariantViolation(format!(
                    "unification against the underlying type of `{ty}` left {} residual constraints",
                    residual.len()
                )));
            }

            let resolved = speculative.resolve_recursive(&candidate);
            let Some((_, result)) = resolved.as_type_function() else {
                return Err(LayoutError::InvariantViolation(format!(
                    "monomorphized underlying type of `{ty}` is not a type function"
                )));
            };
            tracing::debug!(constructor = %ty, result = %result, "monomorphized underlying type");
            stack_size(env, underlying_types, result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn context() -> (TypeEnvironment, UnderlyingTypes) {
        (TypeEnvironment::new(), UnderlyingTypes::new())
    }

    #[test]
    fn zero_slot_types() {
        let (env, registry) = context();
        assert_eq!(stack_size(&env, &registry, &TypeTerm::unit()), Ok(0));
        assert_eq!(stack_size(&env, &registry, &TypeTerm::itself()), Ok(0));
    }

    #[test]
    fn single_slot_types() {
        let (env, registry) = context();
        assert_eq!(stack_size(&env, &registry, &TypeTerm::bool()), Ok(1));
        assert_eq!(stack_size(&env, &registry, &TypeTerm::word()), Ok(1));
        assert_eq!(
            stack_size(
                &env,
                &registry,
                &TypeTerm::function(TypeTerm::word(), TypeTerm::word())
            ),
            Ok(1)
        );
    }

    #[test]
    fn pairs_are_additive() {
        let (env, registry) = context();
        let pair = TypeTerm::pair(
            TypeTerm::word(),
            TypeTerm::pair(TypeTerm::bool(), TypeTerm::unit()),
        );
        assert_eq!(stack_size(&env, &registry, &pair), Ok(2));
    }

    #[test]
    fn stackless_types_are_rejected() {
        let (env, registry) = context();
        for ty in [TypeTerm::integer(), TypeTerm::void()] {
            assert!(matches!(
                stack_size(&env, &registry, &ty),
                Err(LayoutError::InvalidStackRepresentation(_))
            ));
        }
        let tfn = TypeTerm::type_function(TypeTerm::word(), TypeTerm::word());
        assert!(matches!(
            stack_size(&env, &registry, &tfn),
            Err(LayoutError::InvalidStackRepresentation(_))
        ));
    }

    #[test]
    fn sum_types_are_unsupported() {
        let (env, registry) = context();
        let sum = TypeTerm::sum(TypeTerm::word(), TypeTerm::bool());
        assert_eq!(
            stack_size(&env, &registry, &sum),
            Err(LayoutError::Unsupported("sum types are not lowered yet"))
        );
    }

    #[test]
    fn unresolved_variable_is_an_invariant_violation() {
        let (mut env, registry) = context();
        let variable = env.fresh_type_variable();
        assert!(matches!(
            stack_size(&env, &registry, &variable),
            Err(LayoutError::InvariantViolation(_))
        ));
    }

    #[test]
    fn constructor_with_constant_underlying() {
        let (env, mut registry) = context();
        let flag = registry.declare("Flag", TypeTerm::bool());

        let applied = TypeTerm::named(flag, vec![]);
        assert_eq!(stack_size(&env, &registry, &applied), Ok(1));
    }

    #[test]
    fn nested_constructors_follow_the_chain() {
        let (env, mut registry) = context();
        let flag = registry.declare("Flag", TypeTerm::bool());
        let wrapped = registry.declare("Wrapped", TypeTerm::named(flag, vec![]));

        let applied = TypeTerm::named(wrapped, vec![]);
        assert_eq!(stack_size(&env, &registry, &applied), Ok(1));
    }

    #[test]
    fn generic_constructor_is_monomorphized() {
        let (mut env, mut registry) = context();

        // type Duplicated(t) = pair(t, word)
        let parameter = env.fresh_type_variable();
        let duplicated = registry.declare(
            "Duplicated",
            TypeTerm::type_function(
                parameter.clone(),
                TypeTerm::pair(parameter, TypeTerm::word()),
            ),
        );

        let applied = TypeTerm::named(duplicated, vec![TypeTerm::word()]);
        assert_eq!(stack_size(&env, &registry, &applied), Ok(2));

        // The speculative bindings never leak into the caller's
        // environment.
        let another = TypeTerm::named(duplicated, vec![TypeTerm::unit()]);
        assert_eq!(stack_size(&env, &registry, &another), Ok(1));
    }

    #[test]
    fn generic_constructor_with_two_parameters() {
        let (mut env, mut registry) = context();

        // type Both(a, b) = pair(a, b)
        let a = env.fresh_type_variable();
        let b = env.fresh_type_variable();
        let both = registry.declare(
            "Both",
            TypeTerm::type_function(
                TypeTerm::tuple(vec![a.clone(), b.clone()]),
                TypeTerm::pair(a, b),
            ),
        );

        let applied = TypeTerm::named(
            both,
            vec![TypeTerm::word(), TypeTerm::pair(TypeTerm::word(), TypeTerm::bool())],
        );
        assert_eq!(stack_size(&env, &registry, &applied), Ok(3));
    }

    #[test]
    fn missing_registry_entry_is_an_invariant_violation() {
        let (env, registry) = context();
        let applied = TypeTerm::named(basalt_compiler_semantic::ConstructorId::from_raw(0), vec![]);
        assert!(matches!(
            stack_size(&env, &registry, &applied),
            Err(LayoutError::InvariantViolation(_))
        ));
    }

    fn ground_type_strategy() -> impl Strategy<Value = TypeTerm> {
        let leaf = prop_oneof![
            Just(TypeTerm::unit()),
            Just(TypeTerm::bool()),
            Just(TypeTerm::word()),
            Just(TypeTerm::function(TypeTerm::word(), TypeTerm::bool())),
        ];
        leaf.prop_recursive(4, 32, 2, |inner| {
            (inner.clone(), inner).prop_map(|(first, second)| TypeTerm::pair(first, second))
        })
    }

    /// Footprint of a ground term by naive recursion, used as the test
    /// oracle.
    fn expected_footprint(ty: &TypeTerm) -> usize {
        match ty {
            TypeTerm::Constant { arguments, .. } if ty.is_primitive(PrimitiveType::Pair) => {
                arguments.iter().map(expected_footprint).sum()
            }
            _ if ty.is_primitive(PrimitiveType::Unit) => 0,
            _ => 1,
        }
    }

    proptest! {
        #[test]
        fn footprint_of_ground_terms(ty in ground_type_strategy()) {
            let (env, registry) = context();
            prop_assert_eq!(
                stack_size(&env, &registry, &ty),
                Ok(expected_footprint(&ty))
            );
        }

        #[test]
        fn pair_footprint_is_additive(
            first in ground_type_strategy(),
            second in ground_type_strategy(),
        ) {
            let (env, registry) = context();
            let combined = stack_size(
                &env,
                &registry,
                &TypeTerm::pair(first.clone(), second.clone()),
            ).unwrap();
            let first_size = stack_size(&env, &registry, &first).unwrap();
            let second_size = stack_size(&env, &registry, &second).unwrap();
            prop_assert_eq!(combined, first_size + second_size);
        }
    }
}
