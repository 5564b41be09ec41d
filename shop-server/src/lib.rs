//! Shoplink Server - 多租户网店平台后端
//!
//! # 架构概述
//!
//! 本模块是平台后端的主入口，提供以下核心功能：
//!
//! - **订单生命周期** (`orders`): 状态机流转、历史追加、付款凭证流程
//! - **库存** (`inventory`): 规格库存的原子检查扣减
//! - **计费** (`pricing`): 结账运费/折扣纯函数计算
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! shop-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层
//! ├── orders/        # 订单生命周期管理
//! ├── inventory/     # 库存服务
//! ├── pricing/       # 结账计费
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod inventory;
pub mod orders;
pub mod pricing;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use inventory::InventoryService;
pub use orders::OrdersManager;
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   _____ __
  / ___// /_  ____  ____
  \__ \/ __ \/ __ \/ __ \
 ___/ / / / / /_/ / /_/ /
/____/_/ /_/\____/ .___/
    __    _      /_/
   / /   (_)___  / /__
  / /   / / __ \/ //_/
 / /___/ / / / / ,<
/_____/_/_/ /_/_/|_|
    "#
    );
}
