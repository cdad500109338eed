#[cfg(test)]
mod tests {
    use rowmap_core::{
        AsValue, BindingMode, ConstructorDef, EntityDef, FieldDescriptor, Mapped, MappingError,
        MemberDef, ParamDef, RowFields, ShapeFingerprint, TypeDef, ValueType, analyze_parameters,
        analyze_row, row_fields,
    };

    #[derive(Debug, Default, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
        label: Option<String>,
    }

    impl Point {
        fn new(x: i32, y: i32) -> Self {
            Self {
                x,
                y,
                ..Default::default()
            }
        }
    }

    impl Mapped for Point {
        fn type_def() -> TypeDef<Self> {
            TypeDef::Entity(
                EntityDef::new("Point")
                    .constructor(ConstructorDef::new("default", vec![], |_| Ok(Point::default())))
                    .constructor(ConstructorDef::new(
                        "new",
                        vec![ParamDef::of::<i32>("x"), ParamDef::of::<i32>("y")],
                        |args| Ok(Point::new(args.take(0)?, args.take(1)?)),
                    ))
                    .constructor(ConstructorDef::new(
                        "with_label",
                        vec![
                            ParamDef::of::<i32>("x"),
                            ParamDef::of::<i32>("y"),
                            ParamDef::of::<Option<String>>("label"),
                        ],
                        |args| {
                            Ok(Point {
                                x: args.take(0)?,
                                y: args.take(1)?,
                                label: args.take(2)?,
                            })
                        },
                    ))
                    .member(
                        MemberDef::new::<i32>("x", |p: &Point| p.x.as_value()).with_setter(
                            |p, v| {
                                p.x = AsValue::try_from_value(v)?;
                                Ok(())
                            },
                        ),
                    )
                    .member(
                        MemberDef::new::<i32>("y", |p: &Point| p.y.as_value()).with_setter(
                            |p, v| {
                                p.y = AsValue::try_from_value(v)?;
                                Ok(())
                            },
                        ),
                    )
                    .member(
                        MemberDef::new::<Option<String>>("label", |p: &Point| {
                            p.label.clone().as_value()
                        })
                        .mapped("point_label")
                        .with_setter(|p, v| {
                            p.label = AsValue::try_from_value(v)?;
                            Ok(())
                        }),
                    ),
            )
        }
    }

    /// Only has a constructor with parameters.
    struct Pair {
        left: i64,
    }

    impl Mapped for Pair {
        fn type_def() -> TypeDef<Self> {
            TypeDef::Entity(
                EntityDef::new("Pair")
                    .constructor(ConstructorDef::new(
                        "new",
                        vec![ParamDef::of::<i64>("left")],
                        |args| Ok(Pair { left: args.take(0)? }),
                    ))
                    .member(MemberDef::new::<i64>("left", |p: &Pair| p.left.as_value())),
            )
        }
    }

    fn fields(names: &[(&str, ValueType)]) -> RowFields {
        row_fields(
            names
                .iter()
                .map(|(name, value_type)| FieldDescriptor::new(*name, *value_type)),
        )
    }

    fn analyze<T: Mapped>(fields: RowFields) -> Result<rowmap_core::ShapeAnalysis, MappingError> {
        analyze_row(&T::type_def(), &ShapeFingerprint::row_to_object::<T>(fields))
    }

    #[test]
    fn selects_largest_satisfied_constructor() {
        let analysis = analyze::<Point>(fields(&[
            ("X", ValueType::Int32),
            ("y", ValueType::Int32),
            ("label", ValueType::Varchar),
        ]))
        .unwrap();
        assert_eq!(analysis.mode, BindingMode::ConstructorArgs);
        assert_eq!(analysis.constructor, Some(2));
        assert_eq!(analysis.arguments.len(), 3);
        assert!(analysis.assignments.is_empty());

        let analysis = analyze::<Point>(fields(&[
            ("x", ValueType::Int32),
            ("y", ValueType::Int32),
            ("point_label", ValueType::Varchar),
        ]))
        .unwrap();
        assert_eq!(analysis.constructor, Some(2), "label is found through its mapped name");

        let analysis = analyze::<Point>(fields(&[
            ("y", ValueType::Int64),
            ("x", ValueType::Int64),
        ]))
        .unwrap();
        assert_eq!(analysis.constructor, Some(1));
        assert_eq!(analysis.arguments[0].field, 1);
        assert_eq!(analysis.arguments[1].field, 0);
    }

    #[test]
    fn falls_back_to_member_init() {
        let analysis = analyze::<Point>(fields(&[
            ("x", ValueType::Int32),
            ("other", ValueType::Varchar),
        ]))
        .unwrap();
        assert_eq!(analysis.mode, BindingMode::MemberInit);
        assert_eq!(analysis.constructor, Some(0));
        assert_eq!(analysis.assignments.len(), 1);
        assert_eq!(analysis.assignments[0].field, 0);
    }

    #[test]
    fn scalar_needs_one_field() {
        let error = analyze::<i32>(fields(&[
            ("a", ValueType::Int32),
            ("b", ValueType::Int32),
        ]))
        .unwrap_err();
        assert!(error.is_shape_mismatch());
        let analysis = analyze::<i32>(fields(&[("a", ValueType::Int64)])).unwrap();
        assert_eq!(analysis.mode, BindingMode::Scalar);
    }

    #[test]
    fn binding_errors() {
        let error = analyze::<Point>(fields(&[("unrelated", ValueType::Int32)])).unwrap_err();
        assert!(error.is_binding_error(), "{error}");
        assert!(error.to_string().contains("no bindings found"), "{error}");
        // No constructor has its parameters in the shape
        let error = analyze::<Pair>(fields(&[("right", ValueType::Int64)])).unwrap_err();
        assert!(error.is_binding_error(), "{error}");
        assert!(error.to_string().contains("no bindings found"), "{error}");
        let analysis = analyze::<Pair>(fields(&[("LEFT", ValueType::Int64)])).unwrap();
        assert_eq!(analysis.mode, BindingMode::ConstructorArgs);
    }

    #[test]
    fn empty_shape() {
        let error = analyze::<Point>(RowFields::from([])).unwrap_err();
        assert!(error.is_binding_error(), "{error}");
        assert!(error.to_string().contains("no bindings found"), "{error}");
        let error = analyze::<Pair>(RowFields::from([])).unwrap_err();
        assert!(error.is_binding_error(), "{error}");
        let error = analyze::<i32>(RowFields::from([])).unwrap_err();
        assert!(error.is_shape_mismatch(), "{error}");
    }

    #[test]
    fn duplicate_fields() {
        let error = analyze::<Point>(fields(&[
            ("x", ValueType::Int32),
            ("X", ValueType::Int32),
        ]))
        .unwrap_err();
        assert!(error.is_shape_mismatch(), "{error}");
    }

    #[test]
    fn parameters_follow_store_order() {
        let store = fields(&[
            ("point_label", ValueType::Varchar),
            ("y", ValueType::Int32),
        ]);
        let fingerprint = ShapeFingerprint::object_to_parameters::<Point, Point>(store);
        let bindings =
            analyze_parameters(&Point::type_def(), &Point::type_def(), &fingerprint).unwrap();
        let members: Vec<_> = bindings.iter().map(|b| b.member).collect();
        assert_eq!(members, [2, 1, 0]);
        assert_eq!(bindings[2].field, None);

        let fingerprint = ShapeFingerprint::object_to_parameters::<i32, i32>(RowFields::from([]));
        let error =
            analyze_parameters(&i32::type_def(), &i32::type_def(), &fingerprint).unwrap_err();
        assert!(error.is_shape_mismatch());
    }

    #[test]
    fn fingerprint_ignores_name_case() {
        use std::collections::HashSet;
        let a = ShapeFingerprint::row_to_object::<Point>(fields(&[("Id", ValueType::Int32)]));
        let b = ShapeFingerprint::row_to_object::<Point>(fields(&[("ID", ValueType::Int32)]));
        let c = ShapeFingerprint::row_to_object::<Point>(fields(&[("ID", ValueType::Int64)]));
        let d = ShapeFingerprint::row_to_object::<Pair>(fields(&[("ID", ValueType::Int32)]));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        let set: HashSet<_> = [a, b, c, d].into_iter().collect();
        assert_eq!(set.len(), 3);
    }
}
