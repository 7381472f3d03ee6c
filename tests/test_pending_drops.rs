//! Tests for deferring and finalizing destructive changes

use tidemark::migration::{
    AddHistoryTable, ChangeSet, CreateTable, DropColumn, DropTable, Migration, MigrationError,
    MigrationVersion,
};
use tidemark::model::{Column, Model};

fn version(raw: &str) -> MigrationVersion {
    MigrationVersion::parse(raw).unwrap()
}

fn order_model() -> Model {
    let mut model = Model::new();
    let migration = Migration::new().with_change_set(ChangeSet::apply([
        CreateTable::new(
            "order",
            [
                Column::new("id", "bigint").primary_key(),
                Column::new("status", "varchar(10)"),
            ],
        )
        .into(),
        AddHistoryTable::new("order").into(),
    ]));
    model.apply(&migration, &version("1.0")).unwrap();
    model
}

fn defer_status_drop() -> Migration {
    Migration::new().with_change_set(ChangeSet::pending_drops([
        DropColumn::new("order", "status").into(),
    ]))
}

fn finalize_status_drop(pending: &str) -> Migration {
    Migration::new().with_change_set(ChangeSet::drops_for(
        pending,
        [DropColumn::new("order", "status").into()],
    ))
}

fn column_names(model: &Model, table: &str) -> Vec<String> {
    model
        .get_table(table)
        .unwrap()
        .column_names()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_end_to_end_deferred_column_drop() {
    let mut model = order_model();
    assert!(model.get_table("order").unwrap().with_history());
    assert_eq!(column_names(&model, "order"), ["id", "status"]);

    model.apply(&defer_status_drop(), &version("1.1")).unwrap();
    assert_eq!(column_names(&model, "order"), ["id", "status"]);
    assert_eq!(model.pending_drops(), ["1.1"]);
    assert!(model.has_pending_drops());

    model.apply(&finalize_status_drop("1.1"), &version("1.2")).unwrap();
    assert_eq!(column_names(&model, "order"), ["id"]);
    assert!(model.pending_drops().is_empty());
    assert!(!model.has_pending_drops());
}

#[test]
fn test_pending_drops_never_touch_the_model() {
    let mut model = order_model();
    let migration = Migration::new().with_change_set(ChangeSet::pending_drops([
        DropColumn::new("order", "status").into(),
        DropTable::new("order").into(),
        // would fail if it were applied
        DropTable::new("missing").into(),
    ]));

    model.apply(&migration, &version("1.1")).unwrap();
    assert!(model.get_table("order").is_some());
    assert_eq!(model.pending_drops(), ["1.1"]);
}

#[test]
fn test_finalizing_unknown_version_still_applies() {
    let mut model = order_model();
    model.apply(&finalize_status_drop("0.9"), &version("1.1")).unwrap();
    assert_eq!(column_names(&model, "order"), ["id"]);
    assert!(model.pending_drops().is_empty());
}

#[test]
fn test_finalizing_only_clears_referenced_version() {
    let mut model = order_model();
    model.apply(&defer_status_drop(), &version("1.1")).unwrap();

    let defer_table = Migration::new().with_change_set(ChangeSet::pending_drops([
        DropTable::new("order").into(),
    ]));
    model.apply(&defer_table, &version("1.2")).unwrap();
    assert_eq!(model.pending_drops(), ["1.1", "1.2"]);

    model.apply(&finalize_status_drop("1.1"), &version("1.3")).unwrap();
    assert_eq!(model.pending_drops(), ["1.2"]);
}

#[test]
fn test_finalizing_changeset_is_validated() {
    let mut model = order_model();
    model.apply(&defer_status_drop(), &version("1.1")).unwrap();
    model.apply(&finalize_status_drop("1.1"), &version("1.2")).unwrap();

    // the column is already gone, so replaying the finalization fails
    let err = model
        .apply(&finalize_status_drop("1.1"), &version("1.3"))
        .unwrap_err();
    assert!(matches!(err, MigrationError::ColumnNotFound { .. }));
}

#[test]
fn test_opaque_version_pending_drops() {
    let mut model = order_model();
    model.apply(&defer_status_drop(), &version("hotfix-a")).unwrap();
    assert_eq!(model.pending_drops(), ["hotfix-a"]);

    let finalizing = model.migration_for_pending_drop("hotfix-a").unwrap();
    assert_eq!(finalizing.change_sets()[0].finalizes(), Some("hotfix-a"));

    model.apply(&finalizing, &version("hotfix-b")).unwrap();
    assert!(!model.has_pending_drops());
    assert_eq!(column_names(&model, "order"), ["id"]);
}

#[test]
fn test_unmatched_drops_for_reference_is_ignored() {
    let mut model = order_model();
    model.apply(&defer_status_drop(), &version("1.1")).unwrap();

    for (pending, at) in [("1.0-rc1", "1.2"), ("", "1.3")] {
        let migration = Migration::new().with_change_set(ChangeSet::drops_for(
            pending,
            [AddHistoryTable::new("order").into()],
        ));
        model.apply(&migration, &version(at)).unwrap();
    }

    assert_eq!(model.pending_drops(), ["1.1"]);
    assert_eq!(column_names(&model, "order"), ["id", "status"]);

    model
        .apply(&finalize_status_drop("not-a-version"), &version("1.4"))
        .unwrap();
    assert_eq!(model.pending_drops(), ["1.1"]);
    assert_eq!(column_names(&model, "order"), ["id"]);
}

#[test]
fn test_mixed_changesets_in_one_migration() {
    let mut model = order_model();
    let migration = Migration::new()
        .with_change_set(ChangeSet::apply([tidemark::migration::AddColumn::new(
            "order",
            Column::new("total", "decimal(10,2)"),
        )
        .into()]))
        .with_change_set(ChangeSet::pending_drops([
            DropColumn::new("order", "status").into(),
        ]));

    model.apply(&migration, &version("1.1")).unwrap();
    assert_eq!(column_names(&model, "order"), ["id", "status", "total"]);
    assert_eq!(model.pending_drops(), ["1.1"]);
}

#[test]
fn test_migration_for_pending_drop_round_trips() {
    let mut model = order_model();
    model.apply(&defer_status_drop(), &version("1.1")).unwrap();

    let finalizing = model.migration_for_pending_drop("next").unwrap();
    assert_eq!(finalizing.change_sets()[0].finalizes(), Some("1.1"));

    model.apply(&finalizing, &version("1.2")).unwrap();
    assert_eq!(column_names(&model, "order"), ["id"]);
    assert!(!model.has_pending_drops());
}

#[test]
fn test_register_pending_history_drop_columns() {
    let mut history = order_model();
    history.apply(&defer_status_drop(), &version("1.1")).unwrap();

    // a candidate model built independently, e.g. from current metadata
    let mut candidate = order_model();
    history
        .register_pending_history_drop_columns(&mut candidate)
        .unwrap();

    let order = candidate.get_table("order").unwrap();
    assert!(order.is_pending_drop_column("status"));
    assert!(order.column("status").is_some());
    assert_eq!(order.pending_drop_columns().collect::<Vec<_>>(), ["status"]);
}

#[test]
fn test_register_skips_tables_without_history() {
    let mut history = Model::new();
    let create = Migration::new().with_change_set(ChangeSet::apply([CreateTable::new(
        "audit_free",
        [Column::new("id", "bigint"), Column::new("note", "text")],
    )
    .into()]));
    history.apply(&create, &version("1.0")).unwrap();
    let defer = Migration::new().with_change_set(ChangeSet::pending_drops([
        DropColumn::new("audit_free", "note").into(),
        DropColumn::new("unknown", "note").into(),
    ]));
    history.apply(&defer, &version("1.1")).unwrap();

    let mut candidate = history.clone();
    history
        .register_pending_history_drop_columns(&mut candidate)
        .unwrap();
    assert!(!candidate
        .get_table("audit_free")
        .unwrap()
        .is_pending_drop_column("note"));
}

#[test]
fn test_register_flagged_drop_on_missing_table_fails() {
    let mut history = order_model();
    let mut drop = DropColumn::new("order", "status");
    drop.with_history = Some(true);
    let defer = Migration::new().with_change_set(ChangeSet::pending_drops([drop.into()]));
    history.apply(&defer, &version("1.1")).unwrap();

    let mut empty = Model::new();
    let err = history
        .register_pending_history_drop_columns(&mut empty)
        .unwrap_err();
    assert!(matches!(err, MigrationError::TableNotFound(ref name) if name == "order"));
}
