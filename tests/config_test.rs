// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 验证租户 → global → 默认值的查找顺序、写入校验与快照
// ==========================================


use genset_tracker::config::{config_keys, ConfigManager, MaintenanceConfigReader, StatusThresholds, GLOBAL_SCOPE};
use genset_tracker::db::{init_schema, open_sqlite_connection};
use genset_tracker::repository::error::RepositoryError;
use test_helpers::create_test_db;

fn setup_manager() -> (tempfile::NamedTempFile, String, ConfigManager) {
    let (temp_file, db_path) = create_test_db();
    let conn = open_sqlite_connection(&db_path).expect("Failed to open db");
    init_schema(&conn).expect("Failed to init schema");
    let manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    (temp_file, db_path, manager)
}

#[test]
fn test_默认值() {
    let (_temp_file, _db_path, manager) = setup_manager();

    assert_eq!(manager.get_plan_warning_pct("t1").unwrap(), 90);
    assert_eq!(manager.get_days_per_month("t1").unwrap(), 30);
    assert_eq!(manager.get_stock_low_margin("t1").unwrap(), 0);
    assert_eq!(manager.get_status_thresholds("t1").unwrap(), StatusThresholds::default());
}

#[test]
fn test_租户优先_回退global() {
    let (_temp_file, _db_path, manager) = setup_manager();

    manager
        .set_value(GLOBAL_SCOPE, config_keys::PLAN_WARNING_PCT, "80")
        .expect("Failed to set global value");
    manager
        .set_value("t1", config_keys::PLAN_WARNING_PCT, "95")
        .expect("Failed to set tenant value");

    assert_eq!(manager.get_plan_warning_pct("t1").unwrap(), 95);
    assert_eq!(manager.get_plan_warning_pct("t2").unwrap(), 80, "无租户覆写时取 global");
    assert_eq!(
        manager.get_effective_value("t2", config_keys::PLAN_WARNING_PCT).unwrap(),
        Some("80".to_string())
    );
    assert_eq!(manager.get_scoped_value("t2", config_keys::PLAN_WARNING_PCT).unwrap(), None);

    // UPSERT 覆盖
    manager.set_value("t1", config_keys::PLAN_WARNING_PCT, "85").unwrap();
    assert_eq!(manager.get_plan_warning_pct("t1").unwrap(), 85);
}

#[test]
fn test_写入校验() {
    let (_temp_file, _db_path, manager) = setup_manager();

    assert!(matches!(
        manager.set_value("t1", config_keys::PLAN_WARNING_PCT, "abc"),
        Err(RepositoryError::FieldValueError { .. })
    ));
    assert!(matches!(
        manager.set_value("t1", config_keys::PLAN_WARNING_PCT, "0"),
        Err(RepositoryError::ValidationError(_))
    ));
    assert!(matches!(
        manager.set_value("t1", config_keys::PLAN_DAYS_PER_MONTH, "32"),
        Err(RepositoryError::ValidationError(_))
    ));
    assert!(matches!(
        manager.set_value("t1", config_keys::STOCK_LOW_MARGIN, "-1"),
        Err(RepositoryError::ValidationError(_))
    ));

    // 未知键不校验取值
    manager.set_value("t1", "ui_theme", "dark").unwrap();
    assert_eq!(manager.get_scoped_value("t1", "ui_theme").unwrap(), Some("dark".to_string()));
}

#[test]
fn test_非法存量值回退默认() {
    let (_temp_file, db_path, manager) = setup_manager();

    // 绕过 set_value 直接写入非法值
    let conn = open_sqlite_connection(&db_path).unwrap();
    conn.execute(
        "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('t1', ?1, 'nove', datetime('now'))",
        [config_keys::PLAN_DAYS_PER_MONTH],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('t1', ?1, '500', datetime('now'))",
        [config_keys::PLAN_WARNING_PCT],
    )
    .unwrap();

    assert_eq!(manager.get_days_per_month("t1").unwrap(), 30);
    assert_eq!(manager.get_plan_warning_pct("t1").unwrap(), 90);
}

#[test]
fn test_配置快照() {
    let (_temp_file, _db_path, manager) = setup_manager();

    manager.set_value("t1", config_keys::STOCK_LOW_MARGIN, "3").unwrap();
    manager.set_value("t1", config_keys::PLAN_WARNING_PCT, "75").unwrap();
    manager.set_value("t2", config_keys::PLAN_WARNING_PCT, "60").unwrap();

    let snapshot = manager.get_config_snapshot("t1").unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&snapshot).unwrap();
    assert_eq!(parsed[config_keys::STOCK_LOW_MARGIN], "3");
    assert_eq!(parsed[config_keys::PLAN_WARNING_PCT], "75");
    assert_eq!(parsed.as_object().unwrap().len(), 2, "快照只含本作用域");

    assert_eq!(manager.get_config_snapshot("empty").unwrap(), "{}");
}
