//! Dashboard Model

use serde::{Deserialize, Serialize};

/// Month labels, January first
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Ticket count for one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub month: String,
    pub count: u64,
}

/// Figures shown on both dashboards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total: u64,
    pub open: u64,
    pub assigned: u64,
    pub resolved: u64,
    /// Tickets stored without any status
    pub unknown: u64,
    /// Tickets created within the last seven days
    pub recent_week: u64,
    pub monthly: Vec<MonthlyBucket>,
}
