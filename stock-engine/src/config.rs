/// 库存引擎配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | STOCK_WORK_DIR | /var/lib/stock-engine | 数据目录 (RocksDB 文件) |
/// | STOCK_DB_NAMESPACE | retail | SurrealDB namespace |
/// | STOCK_DB_DATABASE | stock | SurrealDB database |
/// | STOCK_DEFAULT_UNITS_PER_PACKAGE | 1 | 批次池无换算信息时的默认件/箱比 |
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// 数据目录，存放嵌入式数据库文件
    pub work_dir: String,
    /// SurrealDB namespace
    pub namespace: String,
    /// SurrealDB database
    pub database: String,
    /// Fallback units-per-package ratio when no batch in a product's pool
    /// carries one (see `stock::packaging::infer_units_per_package`).
    pub default_units_per_package: i64,
}

impl EngineConfig {
    /// 从环境变量加载配置；未设置时使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("STOCK_WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/stock-engine".into()),
            namespace: std::env::var("STOCK_DB_NAMESPACE").unwrap_or_else(|_| "retail".into()),
            database: std::env::var("STOCK_DB_DATABASE").unwrap_or_else(|_| "stock".into()),
            default_units_per_package: std::env::var("STOCK_DEFAULT_UNITS_PER_PACKAGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
        }
    }

    /// 覆盖数据目录，常用于测试场景
    pub fn with_work_dir(work_dir: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config
    }
}
