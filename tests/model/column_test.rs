#[cfg(test)]
mod tests {
    use dataminer::model::{Column, ColumnAttributes, ColumnOptions, DataType};
    use dataminer::sql::{parse_fragment, rewrite};
    use dataminer::Error;
    use sqlparser::ast::SelectItem;

    fn first_col(sql: &str) -> SelectItem {
        let query = parse_fragment(sql).unwrap();
        rewrite::select(&query).unwrap().projection[0].clone()
    }

    #[test]
    fn test_column_caption() {
        let column = Column::new(1, &first_col("SELECT b.name FROM users b")).unwrap();
        assert_eq!(column.caption, "Name");
    }

    #[test]
    fn test_column_namespaced_name_no_alias() {
        let column = Column::new(1, &first_col("SELECT name FROM users")).unwrap();
        assert_eq!(column.namespaced_name(), Some("name"));
    }

    #[test]
    fn test_column_namespaced_name() {
        let column = Column::new(1, &first_col("SELECT b.name FROM users b")).unwrap();
        assert_eq!(column.name(), "name");
        assert_eq!(column.namespaced_name(), Some("b.name"));
    }

    #[test]
    fn test_column_alias_overrides_name_and_caption() {
        let column = Column::new(1, &first_col("SELECT b.name AS surname FROM users b")).unwrap();
        assert_eq!(column.name(), "surname");
        assert_eq!(column.caption, "Surname");
        assert_eq!(column.namespaced_name(), Some("b.name"));
    }

    #[test]
    fn test_column_function() {
        let sql = "SELECT to_char(ps.created_at, 'IYYY--IW'::text) AS packed_week FROM tabs ps";
        let column = Column::new(1, &first_col(sql)).unwrap();
        assert_eq!(column.name(), "packed_week");
        assert_eq!(column.namespaced_name(), None);
        assert_eq!(column.function_name(), Some("to_char"));
        assert!(!column.is_aggregate());
    }

    #[test]
    fn test_unaliased_function_takes_function_name() {
        let column = Column::new(1, &first_col("SELECT sum(amount) FROM sales")).unwrap();
        assert_eq!(column.name(), "sum");
        assert!(column.is_aggregate());
    }

    #[test]
    fn test_wildcard_rejected() {
        for sql in ["SELECT * FROM users", "SELECT u.* FROM users u"] {
            let err = Column::new(1, &first_col(sql)).unwrap_err();
            assert!(matches!(err, Error::Argument(ref msg) if msg.contains('*')));
        }
    }

    #[test]
    fn test_options() {
        let item = first_col("SELECT b.name FROM users b");
        let plain = Column::new(1, &item).unwrap();
        assert_eq!(plain.width, None);
        assert_eq!(plain.format, None);
        assert_eq!(plain.group_by_seq, None);
        assert_eq!(plain.data_type, DataType::String);

        let column = Column::with_options(
            1,
            &item,
            ColumnOptions {
                width: Some(40),
                format: Some("delimited".into()),
                group_by_seq: Some(2),
                data_type: DataType::Integer,
                ..ColumnOptions::default()
            },
        )
        .unwrap();
        assert_eq!(column.width, Some(40));
        assert_eq!(column.format.as_deref(), Some("delimited"));
        assert_eq!(column.group_by_seq, Some(2));
        assert_eq!(column.data_type, DataType::Integer);
    }

    #[test]
    fn test_boolean_options_default_false() {
        let column = Column::new(1, &first_col("SELECT b.name FROM users b")).unwrap();
        assert!(!column.hide);
        assert!(!column.pinned);
        assert!(!column.groupable);
        assert!(!column.group_sum);
        assert!(!column.group_avg);
        assert!(!column.group_min);
        assert!(!column.group_max);

        let column = Column::with_options(
            1,
            &first_col("SELECT b.name FROM users b"),
            ColumnOptions {
                hide: true,
                pinned: true,
                group_max: true,
                ..ColumnOptions::default()
            },
        )
        .unwrap();
        assert!(column.hide && column.pinned && column.group_max);
    }

    #[test]
    fn test_case_values() {
        let cases: [(&[&str], &str); 7] = [
            (&["one", "two"], "SELECT CASE WHEN active THEN 'one' WHEN no = 1 THEN 'two' ELSE NULL END AS col"),
            (&["one", "two", "def"], "SELECT CASE WHEN active THEN 'one' WHEN no = 1 THEN 'two' ELSE 'def' END AS col"),
            (&["one", "two", "def"], "SELECT CASE WHEN active THEN 'one' WHEN no = 1 THEN 'two' ELSE CASE WHEN passed THEN 'def' ELSE NULL END END AS col"),
            (&["one", "two"], "SELECT CASE WHEN active THEN 'one' WHEN no = 1 THEN 'two' WHEN no = 3 THEN 'one' END AS col"),
            (&["one", "two"], "SELECT CASE WHEN act THEN CASE WHEN a = 1 THEN 'one' WHEN b = 1 THEN 'two' END WHEN d = 3 THEN 'one' END AS col"),
            (&["one", "two", "three"], "SELECT CASE WHEN act THEN CASE WHEN a = 1 THEN 'one' WHEN b = 1 THEN 'two' END WHEN d = 3 THEN 'three' END AS col"),
            (&[], "SELECT col"),
        ];
        for (expect, sql) in cases {
            let column = Column::new(1, &first_col(sql)).unwrap();
            assert_eq!(column.case_string_values(), expect, "{}", sql);
        }
    }

    #[test]
    fn test_case_values_include_numbers() {
        let sql = "SELECT CASE status WHEN 'a' THEN 1 WHEN 'b' THEN 2 ELSE 1 END AS code FROM t";
        let column = Column::new(1, &first_col(sql)).unwrap();
        assert_eq!(column.case_string_values(), vec!["1", "2"]);
    }

    #[test]
    fn test_update_from_copies_editable_attributes() {
        let item = first_col("SELECT b.name FROM users b");
        let mut previous = Column::new(4, &item).unwrap();
        previous.caption = "Login".into();
        previous.hide = true;
        previous.width = Some(12);
        previous.group_sum = true;

        let mut column = Column::new(1, &item).unwrap();
        column.update_from(Some(&previous));
        assert_eq!(column.caption, "Login");
        assert!(column.hide);
        assert_eq!(column.width, Some(12));
        assert!(column.group_sum);
        assert_eq!(column.sequence_no, 1);

        let before = column.clone();
        column.update_from(None);
        assert_eq!(column, before);
    }

    #[test]
    fn test_hash_round_trip() {
        let item = first_col("SELECT b.name FROM users b");
        let mut column = Column::new(1, &item).unwrap();
        column.caption = "Surname".into();
        column.format = Some("upper".into());

        let attrs = column.to_hash();
        let mut other = Column::new(2, &item).unwrap();
        other.modify_from_hash(&attrs);
        assert_eq!(other.to_hash(), attrs);
        assert_eq!(other.sequence_no, 1);
    }

    #[test]
    fn test_attributes_deserialize_with_defaults() {
        let attrs: ColumnAttributes = serde_json::from_str(r#"{"caption": "Id", "hide": true}"#).unwrap();
        assert_eq!(attrs.caption, "Id");
        assert!(attrs.hide);
        assert_eq!(attrs.data_type, DataType::String);
        assert_eq!(attrs.width, None);
    }

    #[test]
    fn test_fingerprint_distinguishes_structure() {
        let a = Column::new(1, &first_col("SELECT coalesce(a.x, 0) AS v FROM t a")).unwrap();
        let b = Column::new(1, &first_col("SELECT coalesce(a.x, 1) AS v FROM t a")).unwrap();
        let c = Column::new(1, &first_col("SELECT coalesce(a.x, 0) AS other FROM t a")).unwrap();
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint(), c.fingerprint());
        assert!(a.matches_node(c.source()));
    }

    #[test]
    fn test_fingerprint_separates_identifiers_from_strings() {
        let ident = Column::new(1, &first_col("SELECT coalesce(name, 'x') AS v FROM t")).unwrap();
        let text = Column::new(1, &first_col("SELECT coalesce('name', 'x') AS v FROM t")).unwrap();
        assert_ne!(ident.fingerprint(), text.fingerprint());
    }

    #[test]
    fn test_fingerprint_includes_call_modifiers() {
        let sqls = [
            "SELECT count(id) AS n FROM t",
            "SELECT count(DISTINCT id) AS n FROM t",
            "SELECT count(id) OVER (PARTITION BY dept) AS n FROM t",
            "SELECT count(id) FILTER (WHERE active) AS n FROM t",
        ];
        let prints: Vec<Option<String>> = sqls
            .iter()
            .map(|sql| Column::new(1, &first_col(sql)).unwrap().fingerprint().map(String::from))
            .collect();
        for (i, a) in prints.iter().enumerate() {
            assert!(a.is_some(), "{}", sqls[i]);
            for b in &prints[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
