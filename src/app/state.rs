// ==========================================
// 机组部件追踪系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// 约束: 所有仓储 / 引擎共享同一个数据库连接
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::{AssetApi, ComponentApi, InventoryApi, MaintenanceApi};
use crate::config::{ConfigManager, MaintenanceConfigReader};
use crate::db::{open_sqlite_connection, prepare_database};
use crate::engine::{MaintenanceEventProcessor, SlotProvisioner, SlotRegistry};
use crate::repository::{
    ComponentSlotRepository, EngineRepository, InventoryRepository, MaintenanceEventRepository,
    PreventivePlanRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 机组资产API
    pub asset_api: Arc<AssetApi>,

    /// 部件槽位 / 预防性计划API
    pub component_api: Arc<ComponentApi>,

    /// 库存API
    pub inventory_api: Arc<InventoryApi>,

    /// 维护事件API
    pub maintenance_api: Arc<MaintenanceApi>,

    /// 槽位登记（直接操作安装 / 润滑）
    pub slot_registry: Arc<SlotRegistry>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 1. 打开数据库并应用统一 PRAGMA
    /// 2. 初始化 schema（幂等）
    /// 3. 初始化 Repository / Engine / API
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        prepare_database(&conn).map_err(|e| format!("无法初始化schema: {}", e))?;

        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let engine_repo = Arc::new(EngineRepository::new(conn.clone()));
        let slot_repo = Arc::new(ComponentSlotRepository::new(conn.clone()));
        let plan_repo = Arc::new(PreventivePlanRepository::new(conn.clone()));
        let inventory_repo = Arc::new(InventoryRepository::new(conn.clone()));
        let event_repo = Arc::new(MaintenanceEventRepository::new(conn.clone()));

        // ==========================================
        // 初始化Engine层
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone()).map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let config_reader: Arc<dyn MaintenanceConfigReader> = config_manager.clone();

        let provisioner = Arc::new(SlotProvisioner::new(conn.clone()));
        let slot_registry = Arc::new(SlotRegistry::new(conn.clone()));
        let processor = Arc::new(MaintenanceEventProcessor::new(conn.clone()));

        // ==========================================
        // 初始化API层
        // ==========================================
        let asset_api = Arc::new(AssetApi::new(engine_repo.clone(), provisioner.clone()));
        let component_api = Arc::new(ComponentApi::new(
            engine_repo.clone(),
            slot_repo.clone(),
            plan_repo,
            inventory_repo.clone(),
            provisioner,
            config_reader.clone(),
        ));
        let inventory_api = Arc::new(InventoryApi::new(inventory_repo, engine_repo.clone(), config_reader));
        let maintenance_api = Arc::new(MaintenanceApi::new(processor, event_repo, engine_repo, slot_repo));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            asset_api,
            component_api,
            inventory_api,
            maintenance_api,
            slot_registry,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// 顺序: GENSET_TRACKER_DB_PATH 环境变量 → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var("GENSET_TRACKER_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./genset_tracker.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("genset-tracker");
        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join("genset_tracker.db"),
            Err(e) => tracing::warn!("无法创建数据目录 {}: {}，使用当前目录", dir.display(), e),
        }
    }

    path.to_string_lossy().to_string()
}
