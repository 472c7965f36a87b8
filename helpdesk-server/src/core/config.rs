use std::path::PathBuf;
use std::str::FromStr;

use chrono_tz::Tz;
use shared::models::catalog::DEFAULT_OFFICERS;

use crate::auth::JwtConfig;
use crate::core::{Result, ServerError};

/// Default business time zone (Malawi, CAT)
pub const DEFAULT_TIMEZONE: &str = "Africa/Blantyre";

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// JSON 文档存放在 SQLite 单表中
    Sqlite,
    /// 进程内存储，重启后数据丢失
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreBackend::Sqlite),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(ServerError::Config(format!(
                "STORE_BACKEND must be 'sqlite' or 'memory', got '{}'",
                other
            ))),
        }
    }
}

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 8080 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | WORK_DIR | ./data | 工作目录 |
/// | STORE_BACKEND | sqlite | sqlite \| memory |
/// | DATABASE_PATH | {WORK_DIR}/helpdesk.db | SQLite 文件 |
/// | OFFICERS | manyeka,mazy,agg,chime | 可分配的 ICT 人员 |
/// | BUSINESS_TIMEZONE | Africa/Blantyre | 仪表盘月份统计时区 |
/// | ALLOW_ICT_REGISTRATION | true | 是否允许自助注册 ICT 账号 |
///
/// JWT 相关变量见 [`JwtConfig::from_env`]。
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/helpdesk HTTP_PORT=9000 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存放数据库和日志
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub store_backend: StoreBackend,
    /// 显式指定的数据库路径
    pub database_path: Option<PathBuf>,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// Officer roster, in display order
    pub officers: Vec<String>,
    pub business_timezone: Tz,
    pub allow_ict_registration: bool,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 未设置的变量使用默认值；无法解析的值视为配置错误。
    pub fn from_env() -> Result<Self> {
        let http_port = match std::env::var("HTTP_PORT") {
            Ok(p) => p
                .parse()
                .map_err(|_| ServerError::Config(format!("HTTP_PORT is not a port: {}", p)))?,
            Err(_) => 8080,
        };

        let store_backend = match std::env::var("STORE_BACKEND") {
            Ok(v) => v.parse()?,
            Err(_) => StoreBackend::Sqlite,
        };

        let business_timezone = std::env::var("BUSINESS_TIMEZONE")
            .unwrap_or_else(|_| DEFAULT_TIMEZONE.into())
            .parse::<Tz>()
            .map_err(|e| ServerError::Config(format!("BUSINESS_TIMEZONE: {}", e)))?;

        Ok(Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            store_backend,
            database_path: std::env::var("DATABASE_PATH").ok().map(PathBuf::from),
            jwt: JwtConfig::from_env()?,
            officers: std::env::var("OFFICERS")
                .ok()
                .map(|v| parse_officers(&v))
                .filter(|list| !list.is_empty())
                .unwrap_or_else(default_officers),
            business_timezone,
            allow_ict_registration: std::env::var("ALLOW_ICT_REGISTRATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        })
    }

    /// In-memory configuration for tests
    pub fn for_tests(jwt: JwtConfig) -> Self {
        Self {
            work_dir: "./data".into(),
            http_port: 0,
            environment: "test".into(),
            store_backend: StoreBackend::Memory,
            database_path: None,
            jwt,
            officers: default_officers(),
            business_timezone: chrono_tz::Africa::Blantyre,
            allow_ict_registration: true,
        }
    }

    /// SQLite 文件路径
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.work_dir).join("helpdesk.db"))
    }
}

fn default_officers() -> Vec<String> {
    DEFAULT_OFFICERS.iter().map(|s| s.to_string()).collect()
}

/// Comma-separated roster; blanks and duplicates dropped
fn parse_officers(value: &str) -> Vec<String> {
    let mut officers: Vec<String> = Vec::new();
    for name in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !officers.iter().any(|o| o == name) {
            officers.push(name.to_string());
        }
    }
    officers
}
