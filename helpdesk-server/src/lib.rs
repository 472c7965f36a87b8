//! ICT Helpdesk Server
//!
//! Users submit support tickets; ICT staff assign, resolve and delete them;
//! both roles read a dashboard of ticket volume and resolution status.
//!
//! # 模块结构
//!
//! ```text
//! helpdesk-server/src/
//! ├── core/          # 配置、状态、错误、后台任务
//! ├── auth/          # JWT、会话提取器、权限表
//! ├── identity/      # 身份提供者 (argon2 + JWT)
//! ├── store/         # 文档存储 (SQLite / 内存)
//! ├── services/      # 角色解析、工单生命周期、账号
//! ├── stats/         # 仪表盘统计 (纯函数)
//! ├── api/           # HTTP 处理器
//! ├── routes/        # 路由与 tower 中间件
//! ├── middleware/    # 请求日志
//! └── utils/         # 日志、校验、错误类型
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod identity;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod stats;
pub mod store;
pub mod utils;

// Re-export 公共类型
pub use auth::{JwtService, Session};
pub use core::{Config, Server, ServerState};
pub use routes::build_app;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置环境: 加载 .env、初始化日志
pub fn setup_environment() -> anyhow::Result<()> {
    if let Err(e) = dotenv::dotenv() {
        // .env 是可选的
        eprintln!("No .env loaded: {}", e);
    }

    let log_config = utils::logger::LogConfig::from_env();
    utils::logger::init_logger(&log_config)?;
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    __  __     __          __          __
   / / / /__  / /___  ____/ /__  _____/ /__
  / /_/ / _ \/ / __ \/ __  / _ \/ ___/ //_/
 / __  /  __/ / /_/ / /_/ /  __(__  ) ,<
/_/ /_/\___/_/ .___/\__,_/\___/____/_/|_|
            /_/          ICT Helpdesk
    "#
    );
}
