use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::Config;
use crate::db::DbService;
use crate::inventory::InventoryService;
use crate::orders::OrdersManager;

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是平台后端的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc 实现浅拷贝，clone 成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | orders | Arc<OrdersManager> | 订单生命周期管理 |
/// | inventory | Arc<InventoryService> | 库存服务 (原子扣减) |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// 订单生命周期管理器
    pub orders: Arc<OrdersManager>,
    /// 库存服务
    pub inventory: Arc<InventoryService>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保目录存在)
    /// 2. 数据库 (work_dir/database/shoplink.db)
    /// 3. 各服务 (Inventory, OrdersManager)
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("shoplink.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");
        let db = db_service.db;

        Self::with_db(config.clone(), db)
    }

    /// 用现有数据库连接构造 (测试用 kv-mem 也走这里)
    pub fn with_db(config: Config, db: Surreal<Db>) -> Self {
        let inventory = Arc::new(InventoryService::new(db.clone()));
        let orders = Arc::new(OrdersManager::new(db.clone(), inventory.clone()));
        Self {
            config,
            db,
            orders,
            inventory,
        }
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }
}
