//! API 路由模块
//!
//! - [`health`] - 健康检查
//! - [`catalog`] - 工单表单选项
//! - [`auth`] - 注册、登录、注销
//! - [`tickets`] - 工单生命周期
//! - [`dashboard`] - 仪表盘统计

pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod health;
pub mod tickets;
