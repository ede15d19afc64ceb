#[cfg(test)]
mod tests {
    use dataminer::model::{DataType, Operator, OperatorValue, Value};
    use dataminer::Error;

    fn pair() -> Vec<Value> {
        vec![Value::from(1), Value::from(2)]
    }

    #[test]
    fn test_valid_operators() {
        let valids = [
            "=", ">=", "<=", "<>", ">", "<", "between", "starts_with", "ends_with", "contains",
            "in", "in_or_null", "not_null", "is_null", "match_or_null",
        ];
        for op in valids {
            assert!(OperatorValue::new(op, pair(), DataType::String).is_ok(), "{}", op);
        }
        for op in ["12", "www", "isnt", "==", "like"] {
            let err = OperatorValue::new(op, pair(), DataType::String).unwrap_err();
            assert!(matches!(err, Error::Argument(_)));
            assert!(err.to_string().contains("Invalid operator"));
        }
    }

    #[test]
    fn test_operator_for_sql() {
        let cases = [
            ("=", "="),
            (">=", ">="),
            ("<=", "<="),
            ("<>", "<>"),
            (">", ">"),
            ("<", "<"),
            ("between", "between"),
            ("in", "in"),
            ("in_or_null", "in_or_null"),
            ("match_or_null", "match_or_null"),
            ("is_null", "is"),
            ("not_null", "is not"),
            ("starts_with", "~~"),
            ("ends_with", "~~"),
            ("contains", "~~"),
        ];
        for (input, expected) in cases {
            let ov = OperatorValue::new(input, pair(), DataType::String).unwrap();
            assert_eq!(ov.operator_for_sql(), expected);
        }
    }

    #[test]
    fn test_operator_for_text() {
        assert_eq!(Operator::Between.for_text(), "between");
        assert_eq!(Operator::In.for_text(), "is any of");
        assert_eq!(Operator::IsNull.for_text(), "is blank");
        assert_eq!(Operator::NotNull.for_text(), "is not blank");
        assert_eq!(Operator::Gte.for_text(), "greater than or equal to");
    }

    #[test]
    fn test_boolean_values_for_sql() {
        for (input, expected) in [(true, "'t'"), (false, "'f'")] {
            let ov = OperatorValue::new("=", vec![input.into()], DataType::String).unwrap();
            assert_eq!(ov.values_for_sql(), vec![expected]);
        }
    }

    #[test]
    fn test_like_operator_values_for_sql() {
        for (op, expected) in [
            ("starts_with", "'VAL%'"),
            ("contains", "'%VAL%'"),
            ("ends_with", "'%VAL'"),
        ] {
            let ov = OperatorValue::new(op, vec!["VAL".into()], DataType::String).unwrap();
            assert_eq!(ov.values_for_sql(), vec![expected]);
        }
    }

    #[test]
    fn test_null_test_values_for_sql() {
        for op in ["is_null", "not_null"] {
            let ov = OperatorValue::new(op, vec!["xxx".into()], DataType::String).unwrap();
            assert_eq!(ov.values_for_sql(), vec!["NULL"]);
        }
    }

    #[test]
    fn test_values_for_sql_by_type() {
        let cases: Vec<(Vec<Value>, DataType, Vec<&str>)> = vec![
            (vec!["123".into()], DataType::String, vec!["'123'"]),
            (vec!["123".into(), "456".into()], DataType::String, vec!["'123'", "'456'"]),
            (vec!["123".into()], DataType::Integer, vec!["123"]),
            (vec![123.into()], DataType::Integer, vec!["123"]),
            (vec!["123".into(), 456.into()], DataType::Integer, vec!["123", "456"]),
            (vec!["123.45".into()], DataType::Number, vec!["123.45"]),
            (vec![123.into()], DataType::String, vec!["'123'"]),
        ];
        for (values, data_type, expected) in cases {
            let ov = OperatorValue::new("=", values, data_type).unwrap();
            assert_eq!(ov.values_for_sql(), expected);
        }
    }

    #[test]
    fn test_strings_including_quotes() {
        let cases: Vec<(&str, Vec<Value>, Vec<&str>)> = vec![
            ("=", vec!["O'Reilly".into()], vec!["'O''Reilly'"]),
            ("in", vec!["O'Reilly".into(), "Smith".into()], vec!["'O''Reilly'", "'Smith'"]),
            ("starts_with", vec!["O'R".into()], vec!["'O''R%'"]),
            ("contains", vec!["O'R".into()], vec!["'%O''R%'"]),
            ("ends_with", vec!["O'R".into()], vec!["'%O''R'"]),
        ];
        for (op, values, expected) in cases {
            let ov = OperatorValue::new(op, values, DataType::String).unwrap();
            assert_eq!(ov.values_for_sql(), expected);
        }
    }

    #[test]
    fn test_invalid_between_operator() {
        let cases: Vec<Vec<Value>> = vec![
            vec!["2015-08-01".into()],
            vec!["2015-08-01".into(), "".into()],
            vec!["2015-08-01".into(), "2015-01-01".into()],
            vec!["2020-01-01".into(), "2019-01-01".into()],
        ];
        for values in cases {
            let result = OperatorValue::new("between", values, DataType::Date);
            assert!(matches!(result, Err(Error::Argument(_))));
        }
    }

    #[test]
    fn test_between_compares_numbers_numerically() {
        assert!(OperatorValue::new("between", vec![9.into(), 10.into()], DataType::Integer).is_ok());
        assert!(OperatorValue::new("between", vec![10.into(), 9.into()], DataType::Integer).is_err());
    }

    #[test]
    fn test_between_compares_numeric_text_numerically() {
        for data_type in [DataType::Integer, DataType::Number] {
            let ok = OperatorValue::new("between", vec!["9".into(), "10".into()], data_type);
            assert!(ok.is_ok(), "{}", data_type);
            let reversed = OperatorValue::new("between", vec!["10".into(), "9".into()], data_type);
            assert!(matches!(reversed, Err(Error::Argument(_))), "{}", data_type);
        }
        let mixed = OperatorValue::new("between", vec!["2.5".into(), 10.into()], DataType::Number);
        assert_eq!(mixed.unwrap().values_for_sql(), vec!["2.5", "10"]);
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        for text in ["NaN", "inf", "-Infinity"] {
            let err = OperatorValue::new("=", vec![text.into()], DataType::Number).unwrap_err();
            assert!(err.to_string().contains("is not a valid"), "{}", text);
        }
        assert!(OperatorValue::new("=", vec![f64::NAN.into()], DataType::Number).is_err());
    }

    #[test]
    fn test_out_of_range_integer_rejected() {
        for text in ["1e30", "-1e30", "99999999999999999999"] {
            let result = OperatorValue::new("=", vec![text.into()], DataType::Integer);
            assert!(matches!(result, Err(Error::Argument(_))), "{}", text);
        }
        let max = OperatorValue::new("=", vec![i64::MAX.into()], DataType::Integer).unwrap();
        assert_eq!(max.values_for_sql(), vec![i64::MAX.to_string()]);
    }

    #[test]
    fn test_empty_in_list_allowed() {
        for op in ["in", "in_or_null"] {
            let ov = OperatorValue::new(op, vec![], DataType::Integer).unwrap();
            assert!(ov.values_for_sql().is_empty());
        }
    }

    #[test]
    fn test_accessors() {
        let ov = OperatorValue::new("IN", vec![1.into()], DataType::Integer).unwrap();
        assert_eq!(ov.operator(), Operator::In);
        assert_eq!(ov.values(), &[Value::Int(1)]);
        assert_eq!(ov.data_type(), DataType::Integer);
    }
}
