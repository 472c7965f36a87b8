//! Ticket form catalogues
//!
//! Fixed enumerations offered by the ticket form. A ticket's location,
//! department and issue must each be a member of the matching list.

use serde::{Deserialize, Serialize};

/// Northern-region district offices
pub const LOCATIONS: &[&str] = &["Nkhatabay", "Mzuzu", "Rumphi", "Karonga", "Mzimba", "Chitipa"];

pub const DEPARTMENTS: &[&str] = &[
    "Finance Department",
    "Human Resources (HR) Department",
    "Customer Service Department",
    "Technical Services Department",
    "Operations and Maintenance Department",
    "Planning and Development Department",
    "Water Quality and Laboratory Services Department",
    "Commercial Services Department",
    "Procurement and Stores Department",
    "Internal Audit Department",
    "Information and Communication Technology (ICT) Department",
    "Legal and Compliance Department",
    "Public Relations and Communications Department",
    "Transport and Logistics Department",
    "Security Services Department",
    "Metering and Billing Department",
    "Board Secretariat or Corporate Affairs Department",
];

pub const ISSUES: &[&str] = &[
    "System downtime or server outages",
    "Slow or unstable internet connection",
    "Errors in billing or customer management system",
    "ERP modules not functioning properly",
    "Failure of water meter reading sync tools",
    "Mobile app or field tools crashing",
    "Incompatibility between field devices and main systems",
    "No access to system for new staff",
    "Forgotten passwords or locked accounts",
    "Insufficient training on new software",
    "Printer and scanner malfunctions",
    "Computer or laptop breakdowns",
    "Incorrect or delayed reports",
    "Loss of local data with no backup",
    "System modules not integrating properly",
];

/// Officer roster used when `OFFICERS` is not configured
pub const DEFAULT_OFFICERS: &[&str] = &["manyeka", "mazy", "agg", "chime"];

pub fn is_location(value: &str) -> bool {
    LOCATIONS.contains(&value)
}

pub fn is_department(value: &str) -> bool {
    DEPARTMENTS.contains(&value)
}

pub fn is_issue(value: &str) -> bool {
    ISSUES.contains(&value)
}

/// Catalogue payload served to the ticket form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub locations: Vec<String>,
    pub departments: Vec<String>,
    pub issues: Vec<String>,
    pub officers: Vec<String>,
}

impl Catalog {
    pub fn new(officers: &[String]) -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            locations: owned(LOCATIONS),
            departments: owned(DEPARTMENTS),
            issues: owned(ISSUES),
            officers: officers.to_vec(),
        }
    }
}
