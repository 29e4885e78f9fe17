//! Introspection tests against scripted SQL Server catalog output.
//!
//! Tests verify that:
//! - sp_columns rows are normalized into column descriptors
//! - sp_statistics rows are grouped into indexes, primary keys excluded
//! - name listings drop empty rows and strip name formats
//! - catalog failures surface as CatalogQueryFailure with their SQL

mod common;

use common::ScriptedExecutor;
use db_schema_manager::config::SchemaOptions;
use db_schema_manager::db::{Platform, SchemaManager};
use db_schema_manager::error::DbErrorKind;
use db_schema_manager::types::{NormalizedType, TypeRegistry};
use serde_json::json;
use std::sync::Arc;

fn manager(executor: ScriptedExecutor) -> SchemaManager<ScriptedExecutor> {
    SchemaManager::new(
        executor,
        Arc::new(Platform::sqlserver()),
        Arc::new(TypeRegistry::with_defaults()),
        SchemaOptions::default(),
    )
}

#[tokio::test]
async fn test_list_table_columns() {
    let executor = ScriptedExecutor::new().rows(
        "sp_columns",
        vec![
            json!({"TABLE_NAME": "userlist", "COLUMN_NAME": "id", "TYPE_NAME": "int identity", "LENGTH": 4, "IS_NULLABLE": "NO", "COLUMN_DEF": null}),
            json!({"TABLE_NAME": "userlist", "COLUMN_NAME": "name", "TYPE_NAME": "varchar", "LENGTH": 50, "IS_NULLABLE": "NO", "COLUMN_DEF": null}),
            json!({"TABLE_NAME": "userlist", "COLUMN_NAME": "bio", "TYPE_NAME": "nvarchar", "LENGTH": null, "IS_NULLABLE": "YES", "COLUMN_DEF": null}),
            json!({"TABLE_NAME": "userlist", "COLUMN_NAME": "active", "TYPE_NAME": "bit", "LENGTH": 1, "IS_NULLABLE": "NO", "COLUMN_DEF": "((1))"}),
            json!({"TABLE_NAME": "userlist", "COLUMN_NAME": null, "TYPE_NAME": "int", "LENGTH": 4, "IS_NULLABLE": "YES"}),
        ],
    );
    let manager = manager(executor);

    let columns = manager.list_table_columns("userlist").await.unwrap();

    assert_eq!(
        manager.executor().statements(),
        vec!["EXEC sp_columns @table_name = [userlist]"]
    );
    let names: Vec<_> = columns.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["id", "name", "bio", "active"]);

    let id = &columns["id"];
    assert_eq!(id.column_type, NormalizedType::Integer);
    assert!(id.primary);
    assert!(id.notnull);

    let name = &columns["name"];
    assert_eq!(name.column_type, NormalizedType::Text);
    assert_eq!(name.native_type, "varchar(50)");
    assert_eq!(name.length, Some(50));
    assert!(name.notnull);
    assert!(name.default.is_none());
    assert!(!name.primary);

    let bio = &columns["bio"];
    assert_eq!(bio.native_type, "nvarchar(max)");
    assert!(!bio.notnull);

    let active = &columns["active"];
    assert_eq!(active.column_type, NormalizedType::Boolean);
    assert_eq!(active.default.as_deref(), Some("((1))"));
}

#[tokio::test]
async fn test_list_table_indexes_excludes_primary_key() {
    let executor = ScriptedExecutor::new()
        .rows(
            "sp_statistics",
            vec![
                json!({"INDEX_NAME": null, "COLUMN_NAME": null, "NON_UNIQUE": null, "SEQ_IN_INDEX": null}),
                json!({"INDEX_NAME": "PK__userlist", "COLUMN_NAME": "id", "NON_UNIQUE": 0, "SEQ_IN_INDEX": 1}),
                json!({"INDEX_NAME": "email_idx", "COLUMN_NAME": "email", "NON_UNIQUE": 0, "SEQ_IN_INDEX": 1}),
                json!({"INDEX_NAME": "fullname_idx", "COLUMN_NAME": "last_name", "NON_UNIQUE": 1, "SEQ_IN_INDEX": 2}),
                json!({"INDEX_NAME": "fullname_idx", "COLUMN_NAME": "first_name", "NON_UNIQUE": 1, "SEQ_IN_INDEX": 1}),
            ],
        )
        .rows(
            "sp_pkeys",
            vec![json!({"TABLE_NAME": "userlist", "COLUMN_NAME": "id", "KEY_SEQ": 1, "PK_NAME": "PK__userlist"})],
        );
    let manager = manager(executor);

    let indexes = manager.list_table_indexes("userlist").await.unwrap();

    assert_eq!(indexes.len(), 2);
    assert_eq!(indexes[0].name, "email");
    assert!(indexes[0].unique);
    assert_eq!(indexes[1].name, "fullname");
    assert!(!indexes[1].unique);
    assert_eq!(indexes[1].columns, vec!["first_name", "last_name"]);

    assert_eq!(
        manager.executor().statements(),
        vec![
            "EXEC sp_statistics @table_name = 'userlist'",
            "EXEC sp_pkeys @table_name = 'userlist'",
        ]
    );
}

#[tokio::test]
async fn test_primary_key_exclusion_is_case_sensitive() {
    let executor = ScriptedExecutor::new()
        .rows(
            "sp_statistics",
            vec![json!({"INDEX_NAME": "PK_USERS", "COLUMN_NAME": "id", "NON_UNIQUE": 0, "SEQ_IN_INDEX": 1})],
        )
        .rows("sp_pkeys", vec![json!({"PK_NAME": "pk_users"})]);

    let indexes = manager(executor).list_table_indexes("users").await.unwrap();

    assert_eq!(indexes.len(), 1);
    assert_eq!(indexes[0].name, "PK_USERS");
}

#[tokio::test]
async fn test_name_listings() {
    let executor = ScriptedExecutor::new()
        .rows("dtproperties", vec![json!({"name": "orders"}), json!({"name": "userlist"})])
        .rows(
            "xtype = 'U'",
            vec![json!({"name": "orders_seq"}), json!({"name": "userlist"}), json!({"name": null})],
        )
        .rows("parent_obj", vec![json!({"name": "trg_userlist_audit"})])
        .rows("xtype = 'TR'", vec![json!({"name": "trg_userlist_audit"}), json!({"name": "trg_orders"})])
        .rows("xtype = 'V'", vec![json!({"name": "active_users"}), json!({"name": ""})])
        .rows("sys.views", vec![json!({"name": "active_users"})]);
    let manager = manager(executor);

    assert_eq!(manager.list_tables(None).await.unwrap(), vec!["orders", "userlist"]);
    assert_eq!(
        manager.list_sequences(None).await.unwrap(),
        vec!["orders", "userlist"]
    );
    assert_eq!(manager.list_views(None).await.unwrap(), vec!["active_users"]);
    assert_eq!(
        manager.list_triggers(None).await.unwrap(),
        vec!["trg_userlist_audit", "trg_orders"]
    );
    assert_eq!(
        manager.list_table_triggers("userlist").await.unwrap(),
        vec!["trg_userlist_audit"]
    );
    assert_eq!(
        manager.list_table_views("userlist").await.unwrap(),
        vec!["active_users"]
    );

    let statements = manager.executor().statements();
    assert!(statements[4].ends_with("object_name(parent_obj) = 'userlist'"));
}

#[tokio::test]
async fn test_catalog_failure_carries_sql() {
    let executor = ScriptedExecutor::new().fail("sp_columns", "Invalid object name 'missing'");
    let err = manager(executor)
        .list_table_columns("missing")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), DbErrorKind::CatalogQueryFailure);
    assert_eq!(err.sql(), Some("EXEC sp_columns @table_name = [missing]"));
    assert!(err.to_string().contains("missing"));
}

#[tokio::test]
async fn test_describe_table() {
    let executor = ScriptedExecutor::new()
        .rows(
            "sp_columns",
            vec![json!({"COLUMN_NAME": "id", "TYPE_NAME": "int identity", "IS_NULLABLE": "NO"})],
        )
        .rows(
            "sp_statistics",
            vec![json!({"INDEX_NAME": "PK_t", "COLUMN_NAME": "id", "NON_UNIQUE": 0, "SEQ_IN_INDEX": 1})],
        )
        .rows("sp_pkeys", vec![json!({"PK_NAME": "PK_t"})]);

    let table = manager(executor).describe_table("t").await.unwrap();

    assert_eq!(table.name, "t");
    assert_eq!(table.primary_columns(), vec!["id"]);
    assert!(table.indexes.is_empty());
}
