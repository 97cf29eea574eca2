//! Stock Engine - 零售后台库存批次分配与冲销引擎
//!
//! # 架构概述
//!
//! 本 crate 是销售系统的库存子系统，提供两个对外操作：
//!
//! - **FIFO 分配** (`stock::allocator`): 按最早进货批次优先消耗库存，
//!   返回各批次的消耗明细与加权平均成本
//! - **冲销** (`stock::reversal`): 取消销售时将消耗量还回原批次，
//!   并在同一事务内删除销售记录
//!
//! 订单录入、报表、权限等均为外部协作者，只通过 `shared` crate 的类型
//! 与本引擎交互。
//!
//! # 模块结构
//!
//! ```text
//! stock-engine/src/
//! ├── config.rs      # 环境变量配置
//! ├── db/            # 嵌入式 SurrealDB 存储层 (models + repositories)
//! └── stock/         # 排序策略、包装换算、分配器、冲销引擎
//! ```

pub mod config;
pub mod db;
pub mod stock;

// Re-export 公共类型
pub use config::EngineConfig;
pub use db::repository::{
    BatchRepository, MovementRepository, RepoError, RepoResult, SaleRepository,
};
pub use stock::{
    Allocator, ReversalEngine, StockError, StockResult, StockService, StockStore, StockWrite,
    SurrealStockStore,
};
