//! Macros for the LP solver module
//!
//! Convenient syntax for creating model builders and constraints.

/// Create a new LP model builder with a unique brand
///
/// Each invocation defines a fresh brand type, so variables of one builder
/// cannot be mixed into another.
///
/// # Examples
///
/// ```rust
/// use blendplan::lp_model_builder;
///
/// // Anonymous brand (each call creates unique anonymous type)
/// let mut builder = lp_model_builder!();
/// let x = builder.add_variable("x", 0.0, 10.0);
///
/// // Named brand (easier to identify in type errors)
/// let mut purchasing = lp_model_builder!(Purchasing);
/// let mut storage = lp_model_builder!(Storage);
///
/// let bought = purchasing.add_variable("b", 0.0, 100.0);
/// let stored = storage.add_variable("s", 0.0, 1000.0);
///
/// // This would cause a compile-time error due to different brands:
/// // storage.add_constraint(constraint!((bought) <= 50.0)); // ERROR!
/// ```
#[macro_export]
macro_rules! lp_model_builder {
    // Named brand - user provides the brand name
    ($brand_name:ident) => {{
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        struct $brand_name;
        $crate::lp_solver::LPModelBuilder::<$brand_name>::new()
    }};

    // Anonymous brand - the `UniqueBrand` struct is defined locally within the `{{ ... }}` block,
    // so each macro invocation creates a fresh scope with its own distinct `UniqueBrand` type
    () => {{
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        struct UniqueBrand;
        $crate::lp_solver::LPModelBuilder::<UniqueBrand>::new()
    }};
}

/// Create constraints using natural comparison syntax
///
/// The left-hand side must be in parentheses. The optional first argument
/// names the constraint; unnamed constraints get an empty name.
///
/// # Examples
///
/// ```rust
/// use blendplan::constraint;
/// use blendplan::lp_model_builder;
///
/// let mut builder = lp_model_builder!(Blend);
/// let x = builder.add_variable("x", 0.0, 10.0);
/// let y = builder.add_variable("y", 0.0, 10.0);
///
/// let c1 = constraint!((x + y) == 10.0);
/// let c2 = constraint!((2.0 * x) <= 5.0);
/// let c3 = constraint!("ordering", (x - y) >= 0.0);
///
/// builder.add_constraint(c1);
/// builder.add_constraint(c2);
/// builder.add_constraint(c3);
/// builder.add_constraint(constraint!(format!("cap[{}]", "VEG"), (x) <= 8));
/// ```
#[macro_export]
macro_rules! constraint {
    // Unnamed constraints
    (($lhs:expr) == $rhs:expr) => {
        $crate::constraint!("", ($lhs) == $rhs)
    };
    (($lhs:expr) <= $rhs:expr) => {
        $crate::constraint!("", ($lhs) <= $rhs)
    };
    (($lhs:expr) >= $rhs:expr) => {
        $crate::constraint!("", ($lhs) >= $rhs)
    };

    // Named constraints
    ($name:expr, ($lhs:expr) == $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            $name,
            $lhs,
            $crate::lp_solver::ConstraintSense::Equal,
            $rhs as f64,
        )
    };
    ($name:expr, ($lhs:expr) <= $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            $name,
            $lhs,
            $crate::lp_solver::ConstraintSense::LessEqual,
            $rhs as f64,
        )
    };
    ($name:expr, ($lhs:expr) >= $rhs:expr) => {
        $crate::lp_solver::Constraint::new(
            $name,
            $lhs,
            $crate::lp_solver::ConstraintSense::GreaterEqual,
            $rhs as f64,
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::lp_solver::ConstraintSense;

    #[test]
    fn test_named_brand_lp_model_builder() {
        let mut model1 = lp_model_builder!(TestModel1);
        let mut model2 = lp_model_builder!(TestModel2);

        let x1 = model1.add_variable("x1", 0.0, 10.0);
        let x2 = model2.add_variable("x2", 0.0, 10.0);

        let _expr1 = x1 + 5.0;
        let _expr2 = x2 + 5.0;

        // This would NOT compile if uncommented (different brands):
        // let _mixed = x1 + x2; // ERROR: different brands
    }

    #[test]
    fn test_branded_constraints_work() {
        let mut model = lp_model_builder!(ConstraintTestModel);
        let x = model.add_variable("x", 0.0, 10.0);
        let y = model.add_variable("y", 0.0, 10.0);

        model.add_constraint(constraint!((x + y) == 10.0));
        model.add_constraint(constraint!("double", (x * 2.0) <= 20));

        let formulation = model.build();
        assert_eq!(formulation.num_constraints(), 2);
        assert_eq!(formulation.constraints()[0].name(), "");

        let double = formulation.constraint_named("double").unwrap();
        assert_eq!(double.sense(), ConstraintSense::LessEqual);
        assert_eq!(double.rhs(), 20.0);
    }

    #[test]
    fn test_owned_string_names() {
        let mut model = lp_model_builder!();
        let x = model.add_variable("x", 0.0, 10.0);

        let name = format!("cap[{}]", "OIL");
        let c = constraint!(name, (x) >= 1.0);
        assert_eq!(c.name(), "cap[OIL]");
    }
}
