//! End-to-end tests: aggregate definition in, SQL text out
//!
//! These tests drive the public generator API with YAML definitions and
//! check the rendered statements.

#[cfg(test)]
mod aggregate_sql_tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use anyhow::Result;
    use test_case::test_case;

    use aggregate_sql::aggregate_catalog::{AggregateConfig, CatalogError, ColumnRef, EntityPath};
    use aggregate_sql::render_plan::{AliasKey, StructureToSelect};
    use aggregate_sql::sql_generator::generator_cache::{GeneratorCacheConfig, SqlGeneratorSource};
    use aggregate_sql::sql_generator::GeneratorError;
    use aggregate_sql::{AggregateSchema, AnalyticSqlGenerator, GeneratorConfig};

    const PERSON: &str = r#"
name: person
root:
  table: person
  id_column: person_id
  columns: [value]
"#;

    const PARENT_WITH_CHILDREN: &str = r#"
name: parent
root:
  table: parent
  id_column: id
  children:
    - property: children
      table: child
      columns: [name]
"#;

    const KEYED_WITHOUT_ID: &str = r#"
name: granny
root:
  table: granny
  id_column: id
  children:
    - property: parents
      table: parent
      key_column: parent_key
      columns: [name]
      children:
        - property: children
          table: child
          back_reference: parent_ref
          columns: [value]
"#;

    fn init_logging() {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
            .is_test(true)
            .try_init();
    }

    fn customer_fixture() -> Result<AggregateSchema> {
        init_logging();
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/customer.yaml");
        Ok(AggregateSchema::build(AggregateConfig::from_yaml_file(path)?)?)
    }

    #[test_case(GeneratorConfig::default(),
        "SELECT T0001_PERSON.person_id AS C0001_PERSONID, T0001_PERSON.value AS C0002_VALUE \
         FROM person AS T0001_PERSON" ; "default aliases")]
    #[test_case(GeneratorConfig { name_hints: false, ..Default::default() },
        "SELECT T0001.person_id AS C0001, T0001.value AS C0002 FROM person AS T0001" ; "without hints")]
    #[test_case(GeneratorConfig { alias_counter_width: 2, max_name_hint_length: 3, ..Default::default() },
        "SELECT T01_PER.person_id AS C01_PER, T01_PER.value AS C02_VAL FROM person AS T01_PER" ; "short aliases")]
    fn single_entity_sql(config: GeneratorConfig, expected: &str) -> Result<()> {
        let schema = AggregateSchema::from_yaml_str(PERSON)?;
        let sql = AnalyticSqlGenerator::try_new(config)?.find_all(&schema)?;
        assert_eq!(sql, expected);
        Ok(())
    }

    #[test]
    fn one_to_many_child_sql() -> Result<()> {
        let schema = AggregateSchema::from_yaml_str(PARENT_WITH_CHILDREN)?;
        let sql = AnalyticSqlGenerator::default().find_all(&schema)?;

        assert_eq!(
            sql,
            "SELECT T0001_PARENT.id AS C0002_ID, V0001.C0001_NAME, V0001.FK0001_PARENTID, \
             V0001.RN0001, GREATEST(T0001_PARENT.id, V0001.FK0001_PARENTID) AS GT0001_FK, \
             GREATEST(1, V0001.RN0001) AS GT0002_RN \
             FROM parent AS T0001_PARENT \
             FULL OUTER JOIN (SELECT T0002_CHILD.name AS C0001_NAME, \
             T0002_CHILD.parent_id AS FK0001_PARENTID, \
             ROW_NUMBER() OVER (PARTITION BY T0002_CHILD.parent_id) AS RN0001 \
             FROM child AS T0002_CHILD) AS V0001 \
             ON T0001_PARENT.id = V0001.FK0001_PARENTID AND 1 = V0001.RN0001 \
             ORDER BY GT0001_FK ASC, GT0002_RN ASC"
        );
        Ok(())
    }

    #[test]
    fn keyed_middle_entity_without_id() -> Result<()> {
        let schema = AggregateSchema::from_yaml_str(KEYED_WITHOUT_ID)?;
        let sql = AnalyticSqlGenerator::default().find_all(&schema)?;

        // the child stores the granny id under its own back reference, next
        // to a copy of the parent key
        assert!(sql.contains(
            "ROW_NUMBER() OVER (PARTITION BY T0003_CHILD.parent_ref, T0003_CHILD.parent_parent_key)"
        ));
        assert!(!sql.contains("T0003_CHILD.granny_id"));
        assert!(sql.contains("T0002_PARENT.granny_id"));
        assert!(sql.contains("T0002_PARENT.parent_key"));
        assert_eq!(sql.matches("FULL OUTER JOIN").count(), 2);
        Ok(())
    }

    #[test]
    fn fixture_aggregate_selects_every_column() -> Result<()> {
        let schema = customer_fixture()?;
        let generator = AnalyticSqlGenerator::default();
        let structure = generator.create_structure(&schema)?;
        let mut to_select = StructureToSelect::new(&structure, &schema);
        let select = to_select.create_select()?;

        let outputs: HashSet<&str> = select.output_names().into_iter().collect();
        for entity in schema.entities() {
            for column in entity
                .id_column
                .iter()
                .chain(entity.columns.iter())
                .chain(entity.key_column.iter())
            {
                let alias =
                    to_select.alias_for(AliasKey::ColumnToken(ColumnRef::new(&entity.path, column)))?;
                assert!(
                    outputs.contains(alias.as_str()),
                    "{}.{} ({}) missing from the result columns",
                    entity.path,
                    column,
                    alias
                );
            }
        }
        Ok(())
    }

    #[test]
    fn fixture_aggregate_sql_shape() -> Result<()> {
        let schema = customer_fixture()?;
        let generated = AnalyticSqlGenerator::default().generate(&schema)?;

        assert_eq!(generated.aggregate, "customer");
        assert!(generated.sql.starts_with("SELECT "));
        assert!(generated.sql.contains("FROM customer AS T0001_CUSTOMER"));
        assert_eq!(generated.sql.matches("FULL OUTER JOIN").count(), 4);
        assert!(generated.sql.ends_with(" ASC"));
        // explicit back reference of the orders
        assert!(generated.sql.contains(".customer_ref"));
        // default back reference of the addresses
        assert!(generated.sql.contains(".customer_id"));
        assert_eq!(generated.select.order_by.0.len(), 2);
        Ok(())
    }

    #[test]
    fn schema_paths_resolve() -> Result<()> {
        let schema = customer_fixture()?;
        let items = schema.require_entity(&EntityPath::parse("orders.items"))?;
        assert_eq!(items.table, "order_item");
        assert!(matches!(
            schema.require_entity(&EntityPath::parse("orders.missing")),
            Err(CatalogError::UnknownEntity { .. })
        ));
        Ok(())
    }

    #[test]
    fn root_without_id_cannot_have_children() {
        let yaml = r#"
name: broken
root:
  table: broken
  children:
    - property: parts
      table: part
"#;
        assert!(matches!(
            AggregateSchema::from_yaml_str(yaml),
            Err(CatalogError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn invalid_generator_config_is_rejected() {
        let config = GeneratorConfig {
            max_name_hint_length: 0,
            ..Default::default()
        };
        assert!(AnalyticSqlGenerator::try_new(config).is_err());
    }

    #[test]
    fn cached_source_serves_each_aggregate_once() -> Result<()> {
        let source = SqlGeneratorSource::new(
            AnalyticSqlGenerator::default(),
            GeneratorCacheConfig { enabled: true },
        );
        let person = AggregateSchema::from_yaml_str(PERSON)?;
        let parent = AggregateSchema::from_yaml_str(PARENT_WITH_CHILDREN)?;

        let first = source.get_or_generate(&person)?;
        source.get_or_generate(&parent)?;
        let again = source.get_or_generate(&person)?;

        assert!(Arc::ptr_eq(&first, &again));
        let metrics = source.metrics();
        assert_eq!((metrics.hits, metrics.misses, metrics.size), (1, 2, 2));
        Ok(())
    }

    #[test]
    fn generator_errors_carry_their_source() {
        let error: GeneratorError = CatalogError::ConfigParseError {
            error: "bad yaml".to_string(),
        }
        .into();
        assert!(error.to_string().contains("bad yaml"));
    }
}
