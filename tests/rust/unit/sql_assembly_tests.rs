//! Lowering of built structures into SQL
//!
//! These tests run the structure builder with plain string tokens and
//! `DisplayNames`, so SQL names equal the tokens.

#[cfg(test)]
mod sql_assembly_tests {
    use std::collections::HashSet;

    use aggregate_sql::render_plan::render_expr::RenderExpr;
    use aggregate_sql::render_plan::{AliasKey, DisplayNames, FromTable, StructureToSelect};
    use aggregate_sql::sql_generator::ToSql;
    use aggregate_sql::{AnalyticStructure, AnalyticStructureBuilder};

    type Structure = AnalyticStructure<&'static str, &'static str>;

    fn parent_with_child() -> Structure {
        AnalyticStructureBuilder::new()
            .add_table("parent", |td| td.with_id("parent_id"))
            .unwrap()
            .add_child_to(&"parent", "child", |td| td.with_columns(["name"]))
            .unwrap()
            .build()
            .unwrap()
    }

    fn granny_parent_child() -> Structure {
        AnalyticStructureBuilder::new()
            .add_table("granny", |td| td.with_id("granny_id"))
            .unwrap()
            .add_child_to(&"granny", "parent", |td| td.with_id("parent_id").with_columns(["name"]))
            .unwrap()
            .add_child_to(&"parent", "child", |td| td.with_columns(["value"]))
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn single_table_is_a_plain_select() {
        let structure: Structure = AnalyticStructureBuilder::new()
            .add_table("dummy_entity", |td| td.with_id("id").with_columns(["a_column"]))
            .unwrap()
            .build()
            .unwrap();

        let sql = StructureToSelect::new(&structure, &DisplayNames)
            .create_select()
            .unwrap()
            .to_sql();

        assert_eq!(
            sql,
            "SELECT T0001_DUMMYENTITY.id AS C0001_ID, T0001_DUMMYENTITY.a_column AS C0002_ACOLUMN \
             FROM dummy_entity AS T0001_DUMMYENTITY"
        );
    }

    #[test]
    fn parent_with_child_renders_full_outer_join() {
        let structure = parent_with_child();
        let sql = StructureToSelect::new(&structure, &DisplayNames)
            .create_select()
            .unwrap()
            .to_sql();

        assert_eq!(
            sql,
            "SELECT T0001_PARENT.parent_id AS C0002_PARENTID, V0001.C0001_NAME, \
             V0001.FK0001_PARENTID, V0001.RN0001, \
             GREATEST(T0001_PARENT.parent_id, V0001.FK0001_PARENTID) AS GT0001_FK, \
             GREATEST(1, V0001.RN0001) AS GT0002_RN \
             FROM parent AS T0001_PARENT \
             FULL OUTER JOIN (SELECT T0002_CHILD.name AS C0001_NAME, \
             T0002_CHILD.parent_id AS FK0001_PARENTID, \
             ROW_NUMBER() OVER (PARTITION BY T0002_CHILD.parent_id) AS RN0001 \
             FROM child AS T0002_CHILD) AS V0001 \
             ON T0001_PARENT.parent_id = V0001.FK0001_PARENTID AND 1 = V0001.RN0001 \
             ORDER BY GT0001_FK ASC, GT0002_RN ASC"
        );
    }

    #[test]
    fn nested_child_columns_reach_the_top_level() {
        let structure = granny_parent_child();
        let mut to_select = StructureToSelect::new(&structure, &DisplayNames);
        let select = to_select.create_select().unwrap();

        let outputs: HashSet<&str> = select.output_names().into_iter().collect();
        for column in ["granny_id", "parent_id", "name", "value"] {
            let alias = to_select.alias_for(AliasKey::ColumnToken(column)).unwrap();
            assert!(
                outputs.contains(alias.as_str()),
                "{} ({}) missing from {:?}",
                column,
                alias,
                outputs
            );
        }
    }

    #[test]
    fn middle_join_is_an_inline_query() {
        let structure = granny_parent_child();
        let select = StructureToSelect::new(&structure, &DisplayNames)
            .create_select()
            .unwrap();

        assert_eq!(
            select.from,
            FromTable::Table {
                name: "granny".to_string(),
                alias: "T0001_GRANNY".to_string()
            }
        );
        let FromTable::Subquery { query, alias } = &select.joins.0[0].source else {
            panic!("the parent branch must be an inline query");
        };
        assert!(alias.starts_with('J'));
        assert!(matches!(query.from, FromTable::Table { ref name, .. } if name == "parent"));
        assert!(matches!(
            query.joins.0[0].source,
            FromTable::Subquery { ref alias, .. } if alias.starts_with('V')
        ));
        // nested levels carry no ordering
        assert!(query.order_by.0.is_empty());
        assert_eq!(select.order_by.0.len(), 2);
    }

    #[test]
    fn foreign_key_towards_granny_is_a_window_max() {
        let structure = granny_parent_child();
        let select = StructureToSelect::new(&structure, &DisplayNames)
            .create_select()
            .unwrap();
        let FromTable::Subquery { query, .. } = &select.joins.0[0].source else {
            panic!("the parent branch must be an inline query");
        };

        let max_over: Vec<_> = query
            .select
            .0
            .iter()
            .filter(|item| {
                matches!(&item.expression, RenderExpr::WindowFnCall(call) if call.name == "MAX")
            })
            .collect();
        assert_eq!(max_over.len(), 1);
        assert!(max_over[0]
            .col_alias
            .as_ref()
            .is_some_and(|alias| alias.0.starts_with("MO")));

        let sql = select.to_sql();
        assert!(sql.contains("MAX(T0002_PARENT.granny_id) OVER (PARTITION BY GREATEST("));
    }

    #[test]
    fn top_join_is_ordered_by_composite_id_then_row_number() {
        let structure = granny_parent_child();
        let mut to_select = StructureToSelect::new(&structure, &DisplayNames);
        let select = to_select.create_select().unwrap();
        let granny_id = to_select.alias_for(AliasKey::ColumnToken("granny_id")).unwrap();

        let order_by: Vec<&str> = select
            .order_by
            .0
            .iter()
            .map(|item| match &item.expression {
                RenderExpr::ColumnAlias(alias) => alias.0.as_str(),
                other => panic!("expected an alias, got {:?}", other),
            })
            .collect();
        assert_eq!(order_by.len(), 2);
        assert!(order_by[0].starts_with("GT") && order_by[0].ends_with("_FK"));
        assert!(order_by[1].starts_with("GT") && order_by[1].ends_with("_RN"));

        // the raw root id is selected but never used for ordering
        let outputs = select.output_names();
        assert!(order_by.iter().all(|alias| outputs.contains(alias)));
        assert!(outputs.contains(&granny_id.as_str()));
        assert!(!order_by.contains(&granny_id.as_str()));
    }

    #[test]
    fn aliases_are_stable_across_lookups() {
        let structure = parent_with_child();
        let mut to_select = StructureToSelect::new(&structure, &DisplayNames);
        to_select.create_select().unwrap();

        let first = to_select.alias_for(AliasKey::Table("child")).unwrap();
        let second = to_select.alias_for(AliasKey::Table("child")).unwrap();
        assert_eq!(first, "T0002_CHILD");
        assert_eq!(first, second);
    }
}
