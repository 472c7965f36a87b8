//! Aggregation Engine
//!
//! Pure functions over ticket snapshots; no I/O. Status matching is exact and
//! case-sensitive, so a stored `"Resolved"` is not counted as `resolved`.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use shared::models::{DashboardSummary, MONTH_LABELS, MonthlyBucket, Ticket};

/// Window used for the "recent" dashboard figure
pub const RECENT_WINDOW_DAYS: f64 = 7.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Number of tickets whose status equals `status` exactly.
/// Tickets without a status never match.
pub fn count_by_status(tickets: &[Ticket], status: &str) -> u64 {
    tickets
        .iter()
        .filter(|t| t.status_str() == Some(status))
        .count() as u64
}

/// Tickets per calendar month (UTC), January first.
pub fn monthly_counts(tickets: &[Ticket]) -> Vec<MonthlyBucket> {
    monthly_counts_in(tickets, &Utc)
}

/// Tickets per calendar month in `tz`, January first. Tickets without a
/// creation timestamp are skipped.
pub fn monthly_counts_in<Tz: TimeZone>(tickets: &[Ticket], tz: &Tz) -> Vec<MonthlyBucket> {
    let mut counts = [0u64; 12];
    for created in tickets.iter().filter_map(|t| t.created_at) {
        let month0 = created.with_timezone(tz).month0() as usize;
        counts[month0] += 1;
    }

    MONTH_LABELS
        .iter()
        .zip(counts)
        .map(|(label, count)| MonthlyBucket {
            month: (*label).to_string(),
            count,
        })
        .collect()
}

/// Whether the ticket was created at most `days` (fractional) days before
/// `now`. A missing timestamp is never recent.
pub fn recent_within_days(ticket: &Ticket, now: DateTime<Utc>, days: f64) -> bool {
    match ticket.created_at {
        Some(created) => {
            let elapsed = now.signed_duration_since(created);
            let elapsed_days = elapsed.num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY;
            elapsed_days <= days
        }
        None => false,
    }
}

/// Dashboard figures for a ticket snapshot
pub fn summarize<Tz: TimeZone>(tickets: &[Ticket], now: DateTime<Utc>, tz: &Tz) -> DashboardSummary {
    DashboardSummary {
        total: tickets.len() as u64,
        open: count_by_status(tickets, "open"),
        assigned: count_by_status(tickets, "assigned"),
        resolved: count_by_status(tickets, "resolved"),
        unknown: tickets.iter().filter(|t| t.status.is_none()).count() as u64,
        recent_week: tickets
            .iter()
            .filter(|t| recent_within_days(t, now, RECENT_WINDOW_DAYS))
            .count() as u64,
        monthly: monthly_counts_in(tickets, tz),
    }
}
