#[cfg(test)]
mod tests {
    use dataminer::model::{DataType, OperatorValue, QueryParameter, Report, Value};
    use dataminer::sql::Dialect;
    use dataminer::Error;
    use insta::assert_snapshot;

    fn report(sql: &str) -> Report {
        let mut report = Report::new();
        report.set_sql(sql).unwrap();
        report
    }

    fn param(col: &str, op: &str, values: Vec<Value>, data_type: DataType) -> QueryParameter {
        QueryParameter::new(col, OperatorValue::new(op, values, data_type).unwrap())
    }

    fn eq(col: &str, value: &str) -> QueryParameter {
        param(col, "=", vec![value.into()], DataType::String)
    }

    fn column_names(report: &Report) -> Vec<&str> {
        report.columns().iter().map(|c| c.name()).collect()
    }

    // ========================================================================
    // Parameters
    // ========================================================================

    #[test]
    fn test_replace_where() {
        let mut report = report("SELECT id, name FROM users WHERE id = 2");
        report.replace_where(&[eq("name", "Fred")]).unwrap();
        assert_snapshot!(report.runnable_sql().unwrap(), @"SELECT id, name FROM users WHERE name = 'Fred'");
    }

    #[test]
    fn test_replace_where_without_params_drops_filter() {
        let mut report = report("SELECT id, name FROM users WHERE id = 2");
        report.replace_where(&[]).unwrap();
        assert_eq!(report.runnable_sql().unwrap(), "SELECT id, name FROM users");
    }

    #[test]
    fn test_apply_params_without_where() {
        let mut report = report("SELECT id, name FROM users");
        let logins = param("logins", "=", vec![12.into()], DataType::Integer);
        report.apply_params(&[eq("name", "Fred"), logins]).unwrap();
        assert_snapshot!(report.runnable_sql().unwrap(), @"SELECT id, name FROM users WHERE name = 'Fred' AND logins = 12");
    }

    #[test]
    fn test_apply_params_to_existing_where() {
        let cases = [
            ("id = 2", "id = 2 AND name = 'John'"),
            ("id IS NULL", "id IS NULL AND name = 'John'"),
            ("active", "active AND name = 'John'"),
            ("NOT active", "NOT active AND name = 'John'"),
            ("id = 3 AND name <> 'Fred'", "id = 3 AND name <> 'Fred' AND name = 'John'"),
        ];
        for (existing, expected) in cases {
            let mut report = report(&format!("SELECT id, name FROM users WHERE {}", existing));
            report.apply_params(&[eq("name", "John")]).unwrap();
            assert_eq!(
                report.runnable_sql().unwrap(),
                format!("SELECT id, name FROM users WHERE {}", expected)
            );
        }
    }

    #[test]
    fn test_apply_params_respects_data_type() {
        let cases = [
            (DataType::String, "logins = '12'"),
            (DataType::Integer, "logins = 12"),
        ];
        for (data_type, expected) in cases {
            let mut report = report("SELECT id FROM users");
            report
                .apply_params(&[param("logins", "=", vec!["12".into()], data_type)])
                .unwrap();
            assert_eq!(
                report.runnable_sql().unwrap(),
                format!("SELECT id FROM users WHERE {}", expected)
            );
        }
    }

    #[test]
    fn test_apply_params_is_repeatable() {
        let mut report = report("SELECT id, name FROM users WHERE id = 2");
        report.apply_params(&[eq("name", "John")]).unwrap();
        let first = report.runnable_sql().unwrap();
        report.apply_params(&[eq("name", "John")]).unwrap();
        assert_eq!(report.runnable_sql().unwrap(), first);
        assert_eq!(report.sql(), Some("SELECT id, name FROM users WHERE id = 2"));
    }

    #[test]
    fn test_empty_in_list_filters_everything() {
        let mut report = report("SELECT id FROM users WHERE id > 2");
        report
            .apply_params(&[param("id", "in", vec![], DataType::Integer)])
            .unwrap();
        assert_eq!(
            report.runnable_sql().unwrap(),
            "SELECT id FROM users WHERE id > 2 AND (1 = 2)"
        );
    }

    #[test]
    fn test_apply_params_applies_limit_and_offset() {
        let mut report = report("SELECT id FROM users LIMIT 3");
        report.limit = Some(10);
        report.offset = Some(20);
        report.apply_params(&[eq("name", "x")]).unwrap();
        assert_eq!(
            report.runnable_sql().unwrap(),
            "SELECT id FROM users WHERE name = 'x' LIMIT 10 OFFSET 20"
        );

        report.limit = None;
        report.offset = Some(0);
        report.apply_params(&[]).unwrap();
        assert_eq!(report.runnable_sql().unwrap(), "SELECT id FROM users WHERE name = 'x'");
    }

    #[test]
    fn test_empty_apply_params_is_stable() {
        let sql = "SELECT id, name FROM users WHERE id = 2";
        let mut report = report(sql);
        report.apply_params(&[]).unwrap();
        let first = report.runnable_sql().unwrap();
        report.apply_params(&[]).unwrap();
        assert_eq!(report.runnable_sql().unwrap(), first);

        let mut fresh = Report::new();
        fresh.set_sql(sql).unwrap();
        fresh.limit = None;
        fresh.offset = None;
        fresh.apply_params(&[]).unwrap();
        assert_eq!(fresh.runnable_sql().unwrap(), first);
        assert_eq!(first, sql);
    }

    #[test]
    fn test_empty_apply_params_keeps_applied_filter() {
        let mut report = report("SELECT id, name FROM users WHERE id = 2");
        report.apply_params(&[eq("name", "John")]).unwrap();
        let applied = report.runnable_sql().unwrap();
        report.apply_params(&[]).unwrap();
        assert_eq!(report.runnable_sql().unwrap(), applied);

        report.limit = Some(5);
        report.apply_params(&[]).unwrap();
        assert_snapshot!(report.runnable_sql().unwrap(), @"SELECT id, name FROM users WHERE id = 2 AND name = 'John' LIMIT 5");

        report.apply_params(&[eq("name", "Fred")]).unwrap();
        assert_snapshot!(report.runnable_sql().unwrap(), @"SELECT id, name FROM users WHERE id = 2 AND name = 'Fred' LIMIT 5");
    }

    #[test]
    fn test_apply_params_requires_sql() {
        let mut report = Report::new();
        assert!(matches!(report.apply_params(&[]), Err(Error::State(_))));
        assert!(matches!(report.runnable_sql(), Err(Error::State(_))));
    }

    #[test]
    fn test_set_sql_discards_applied_params() {
        let mut report = report("SELECT id FROM users");
        report.apply_params(&[eq("name", "x")]).unwrap();
        report.set_sql("SELECT id FROM people").unwrap();
        assert_eq!(report.runnable_sql().unwrap(), "SELECT id FROM people");
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    #[test]
    fn test_order_by_replaces_existing() {
        let mut report = report("SELECT id, name FROM users ORDER BY name");
        report.set_order_by(Some("id DESC")).unwrap();
        assert_snapshot!(report.runnable_sql().unwrap(), @"SELECT id, name FROM users ORDER BY id DESC");
    }

    #[test]
    fn test_blank_order_by_clears() {
        let mut report = report("SELECT id, name FROM users ORDER BY name");
        report.set_order_by(Some("  ")).unwrap();
        assert_eq!(report.runnable_sql().unwrap(), "SELECT id, name FROM users");
        assert!(report.order().is_none());
    }

    #[test]
    fn test_bad_order_by_is_syntax_error() {
        let mut report = report("SELECT id FROM users ORDER BY id");
        assert!(matches!(report.set_order_by(Some("id DESC DESC")), Err(Error::Syntax(_))));
        assert_eq!(report.order().map(<[_]>::len), Some(1));
    }

    // ========================================================================
    // Column surgery
    // ========================================================================

    #[test]
    fn test_remove_column() {
        let mut report = report("SELECT id, name, email FROM users");
        report.remove_columns(&["email"]).unwrap();
        assert_eq!(column_names(&report), vec!["id", "name"]);
        assert_eq!(report.sql(), Some("SELECT id, name FROM users"));
    }

    #[test]
    fn test_remove_columns() {
        let mut report = report("SELECT id, name, email FROM users");
        report.remove_columns(&["email", "id"]).unwrap();
        assert_eq!(column_names(&report), vec!["name"]);
        assert_eq!(report.runnable_sql().unwrap(), "SELECT name FROM users");
    }

    #[test]
    fn test_remove_columns_with_group_and_order() {
        let mut report = report(
            "SELECT id, name, email FROM users GROUP BY id, name, email ORDER BY email, name",
        );
        report.remove_columns(&["email"]).unwrap();
        assert_snapshot!(report.runnable_sql().unwrap(), @"SELECT id, name FROM users GROUP BY id, name ORDER BY name");
    }

    #[test]
    fn test_remove_only_sort_key_clears_order() {
        let mut report = report("SELECT id, email FROM users ORDER BY email");
        report.remove_columns(&["email"]).unwrap();
        assert!(report.order().is_none());
        assert_eq!(report.runnable_sql().unwrap(), "SELECT id FROM users");
    }

    #[test]
    fn test_remove_unknown_column_fails() {
        let mut report = report("SELECT id, name FROM users");
        assert!(matches!(report.remove_columns(&["nope"]), Err(Error::Argument(_))));
        assert_eq!(column_names(&report), vec!["id", "name"]);
    }

    #[test]
    fn test_convert_columns_to_array() {
        let mut report = report("SELECT id, name, email FROM users");
        report.convert_columns_to_array("combin", &["id", "name"]).unwrap();
        assert_snapshot!(report.sql().unwrap(), @"SELECT ARRAY[id, name] AS combin, email FROM users");
        assert_eq!(column_names(&report), vec!["combin", "email"]);
        assert_eq!(report.column("combin").unwrap().sequence_no, 1);
    }

    #[test]
    fn test_convert_keeps_customizations_of_remaining_columns() {
        let mut report = report("SELECT id, name, email FROM users");
        report.column_mut("email").unwrap().caption = "Mail".into();
        report.convert_columns_to_array("combin", &["id", "name"]).unwrap();
        assert_eq!(report.column("email").unwrap().caption, "Mail");
    }

    // ========================================================================
    // Derived SQL
    // ========================================================================

    #[test]
    fn test_count_query() {
        let mut report = report("SELECT id, name FROM users WHERE id > 2 ORDER BY id LIMIT 4");
        assert_eq!(
            report.count_query().unwrap(),
            "SELECT count(*) FROM users WHERE id > 2"
        );

        report.apply_params(&[eq("name", "x")]).unwrap();
        assert_eq!(
            report.count_query().unwrap(),
            "SELECT count(*) FROM users WHERE id > 2 AND name = 'x'"
        );
    }

    #[test]
    fn test_count_query_wraps_distinct() {
        let report = report("SELECT DISTINCT dept FROM users");
        assert_snapshot!(report.count_query().unwrap(), @"SELECT count(*) FROM (SELECT DISTINCT dept FROM users) AS counted_rows");
    }

    #[test]
    fn test_tsql_limit_becomes_top() {
        let mut report = report(r#"SELECT "id", name FROM "users""#);
        report.limit = Some(10);
        report.apply_params(&[]).unwrap();
        assert_eq!(
            report.runnable_sql_delimited(Dialect::TSql).unwrap(),
            "SELECT TOP 10 id, name FROM users"
        );
        assert_eq!(
            report.runnable_sql_delimited(Dialect::Postgres).unwrap(),
            r#"SELECT "id", name FROM "users" LIMIT 10"#
        );
    }

    #[test]
    fn test_tsql_rejects_offset() {
        let mut report = report("SELECT id FROM users");
        report.offset = Some(5);
        report.apply_params(&[]).unwrap();
        assert!(matches!(
            report.runnable_sql_delimited(Dialect::TSql),
            Err(Error::Syntax(_))
        ));
    }
}
