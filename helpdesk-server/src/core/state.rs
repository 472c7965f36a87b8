use std::sync::Arc;
use std::time::Duration;

use shared::models::Catalog;

use crate::auth::JwtService;
use crate::core::config::StoreBackend;
use crate::core::tasks::BackgroundTasks;
use crate::core::{Config, Result, ServerError};
use crate::identity::{IdentityProvider, LocalIdentityProvider, RevocationList};
use crate::services::{AccountService, RoleResolver, TicketService};
use crate::store::{DocumentStore, MemoryStore, SqliteStore};

/// Interval of the revocation list purge
const REVOCATION_PURGE_INTERVAL: Duration = Duration::from_secs(300);

/// 服务器状态 - 持有所有服务的共享引用
///
/// 所有字段都是 `Arc` 或内部持有 `Arc`，克隆成本极低。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | store | 文档存储 (SQLite 或内存) |
/// | identity | 身份提供者 |
/// | jwt_service | JWT 签发与校验 |
/// | revocations | 已注销令牌 |
/// | roles | 角色解析 |
/// | tickets | 工单生命周期服务 |
/// | accounts | 注册 / 登录 / 注销 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub jwt_service: Arc<JwtService>,
    pub revocations: Arc<RevocationList>,
    pub roles: RoleResolver,
    pub tickets: TicketService,
    pub accounts: AccountService,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按 `STORE_BACKEND` 打开存储并组装所有服务。
    pub async fn initialize(config: &Config) -> Result<Self> {
        let store: Arc<dyn DocumentStore> = match config.store_backend {
            StoreBackend::Sqlite => {
                let path = config.database_path();
                if let Some(parent) = path.parent()
                    && !parent.as_os_str().is_empty()
                {
                    std::fs::create_dir_all(parent)?;
                }
                let path_str = path.to_str().ok_or_else(|| {
                    ServerError::Config(format!("Database path is not UTF-8: {}", path.display()))
                })?;
                Arc::new(SqliteStore::open(path_str).await?)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        Ok(Self::with_store(config.clone(), store))
    }

    /// Assemble services on top of an existing store
    pub fn with_store(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let revocations = Arc::new(RevocationList::new());
        let identity: Arc<dyn IdentityProvider> = Arc::new(LocalIdentityProvider::new(
            store.clone(),
            jwt_service.clone(),
            revocations.clone(),
        ));
        let roles = RoleResolver::new(store.clone());
        let tickets = TicketService::new(store.clone(), config.officers.clone());
        let accounts = AccountService::new(
            identity.clone(),
            store.clone(),
            roles.clone(),
            config.allow_ict_registration,
        );

        Self {
            config,
            store,
            identity,
            jwt_service,
            revocations,
            roles,
            tickets,
            accounts,
        }
    }

    /// Form catalogues and the configured officer roster
    pub fn catalog(&self) -> Catalog {
        Catalog::new(&self.config.officers)
    }

    /// 启动后台任务
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let revocations = self.revocations.clone();
        tasks.spawn_periodic("revocation_purge", REVOCATION_PURGE_INTERVAL, move || {
            let revocations = revocations.clone();
            async move {
                let purged = revocations.purge_expired(chrono::Utc::now().timestamp());
                if purged > 0 {
                    tracing::debug!(purged, remaining = revocations.len(), "Purged revoked tokens");
                }
            }
        });

        tasks.log_summary();
        tasks
    }
}
