//! 服务层
//!
//! - [`RoleResolver`] - identity id → role
//! - [`TicketService`] - 工单生命周期
//! - [`AccountService`] - 注册 / 登录 / 注销

pub mod accounts;
pub mod roles;
pub mod tickets;

pub use accounts::AccountService;
pub use roles::RoleResolver;
pub use tickets::TicketService;
