//! Ticket Model
//!
//! Tickets live in the `tickets` collection as schemaless JSON documents with
//! camelCase field names. Reading is lenient: older or hand-edited records may
//! lack a status, carry a non-canonical status string, or store `createdAt`
//! as epoch milliseconds.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use validator::{Validate, ValidationError};

use super::catalog;

/// Collection holding ticket documents
pub const TICKETS_COLLECTION: &str = "tickets";

// Stored field names
pub const FIELD_NAME: &str = "name";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_LOCATION: &str = "location";
pub const FIELD_DEPARTMENT: &str = "department";
pub const FIELD_ISSUE: &str = "issue";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_STATUS: &str = "status";
pub const FIELD_ASSIGNED_TO: &str = "assignedTo";
pub const FIELD_CREATED_AT: &str = "createdAt";

/// Ticket status
///
/// The service only writes the three lowercase canonical values. Anything
/// else read back from the store is preserved verbatim in `Other`, so
/// `"Resolved"` never compares equal to `Resolved`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TicketStatus {
    Open,
    Assigned,
    Resolved,
    Other(String),
}

impl TicketStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::Assigned => "assigned",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Other(s) => s,
        }
    }
}

impl From<String> for TicketStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "open" => TicketStatus::Open,
            "assigned" => TicketStatus::Assigned,
            "resolved" => TicketStatus::Resolved,
            _ => TicketStatus::Other(s),
        }
    }
}

impl From<&str> for TicketStatus {
    fn from(s: &str) -> Self {
        TicketStatus::from(s.to_string())
    }
}

impl From<TicketStatus> for String {
    fn from(status: TicketStatus) -> Self {
        match status {
            TicketStatus::Other(s) => s,
            canonical => canonical.as_str().to_string(),
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticket as read from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub name: String,
    pub email: String,
    pub location: String,
    pub department: String,
    pub issue: String,
    pub description: String,
    pub status: Option<TicketStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Build a ticket from a stored document, tolerating missing or
    /// malformed fields
    pub fn from_document(id: impl Into<String>, doc: &Value) -> Self {
        let text = |field: &str| {
            doc.get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Self {
            id: id.into(),
            name: text(FIELD_NAME),
            email: text(FIELD_EMAIL),
            location: text(FIELD_LOCATION),
            department: text(FIELD_DEPARTMENT),
            issue: text(FIELD_ISSUE),
            description: text(FIELD_DESCRIPTION),
            status: doc
                .get(FIELD_STATUS)
                .and_then(Value::as_str)
                .map(TicketStatus::from),
            assigned_to: doc
                .get(FIELD_ASSIGNED_TO)
                .and_then(Value::as_str)
                .map(str::to_string),
            created_at: doc.get(FIELD_CREATED_AT).and_then(parse_timestamp),
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_to.is_some()
    }

    /// Raw status string, if any
    pub fn status_str(&self) -> Option<&str> {
        self.status.as_ref().map(TicketStatus::as_str)
    }
}

/// Parse a stored timestamp: RFC 3339 string or integer epoch milliseconds
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}

/// Ordering for ticket listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketOrder {
    /// Store order
    #[default]
    Unordered,
    /// Newest first by `createdAt`
    CreatedDesc,
}

/// Create ticket payload
///
/// Field checks run after [`TicketCreate::trimmed`], so whitespace-only
/// values are rejected as empty. Absent fields decode as empty strings and
/// fail the same checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TicketCreate {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(custom(function = "validate_location"))]
    pub location: String,
    #[validate(custom(function = "validate_department"))]
    pub department: String,
    #[validate(custom(function = "validate_issue"))]
    pub issue: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
}

impl TicketCreate {
    /// Copy with every field trimmed
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            location: self.location.trim().to_string(),
            department: self.department.trim().to_string(),
            issue: self.issue.trim().to_string(),
            description: self.description.trim().to_string(),
        }
    }
}

fn catalogue_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn validate_location(value: &str) -> Result<(), ValidationError> {
    if catalog::is_location(value) {
        Ok(())
    } else {
        Err(catalogue_error("location", "location is not a known office"))
    }
}

fn validate_department(value: &str) -> Result<(), ValidationError> {
    if catalog::is_department(value) {
        Ok(())
    } else {
        Err(catalogue_error("department", "department is not a known department"))
    }
}

fn validate_issue(value: &str) -> Result<(), ValidationError> {
    if catalog::is_issue(value) {
        Ok(())
    } else {
        Err(catalogue_error("issue", "issue is not a known issue type"))
    }
}

/// Assign ticket payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssignRequest {
    pub officer: String,
}

/// Query string for ticket listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub order: TicketOrder,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_create() -> TicketCreate {
        TicketCreate {
            name: "Thoko Banda".into(),
            email: "thoko@example.org".into(),
            location: "Mzuzu".into(),
            department: "Finance Department".into(),
            issue: "Forgotten passwords or locked accounts".into(),
            description: "Cannot log in to the ERP".into(),
        }
    }

    #[test]
    fn test_status_round_trip_preserves_casing() {
        assert_eq!(TicketStatus::from("open"), TicketStatus::Open);
        assert_eq!(
            TicketStatus::from("Resolved"),
            TicketStatus::Other("Resolved".into())
        );
        assert_eq!(String::from(TicketStatus::Other("Resolved".into())), "Resolved");
        assert_eq!(serde_json::to_value(TicketStatus::Assigned).unwrap(), json!("assigned"));
    }

    #[test]
    fn test_from_document_full() {
        let doc = json!({
            "name": "Thoko",
            "email": "thoko@example.org",
            "location": "Mzuzu",
            "department": "Finance Department",
            "issue": "Incorrect or delayed reports",
            "description": "Month-end report missing",
            "status": "assigned",
            "assignedTo": "mazy",
            "createdAt": "2025-03-04T08:30:00Z"
        });
        let ticket = Ticket::from_document("t1", &doc);
        assert_eq!(ticket.id, "t1");
        assert_eq!(ticket.status, Some(TicketStatus::Assigned));
        assert_eq!(ticket.assigned_to.as_deref(), Some("mazy"));
        assert_eq!(
            ticket.created_at.map(|t| t.to_rfc3339()),
            Some("2025-03-04T08:30:00+00:00".to_string())
        );
    }

    #[test]
    fn test_from_document_lenient() {
        let ticket = Ticket::from_document("t2", &json!({"createdAt": "not a date"}));
        assert_eq!(ticket.status, None);
        assert_eq!(ticket.created_at, None);
        assert_eq!(ticket.name, "");
        assert!(!ticket.is_assigned());

        let ticket = Ticket::from_document("t3", &json!({"createdAt": 1_700_000_000_000i64}));
        assert_eq!(ticket.created_at.map(|t| t.timestamp()), Some(1_700_000_000));
    }

    #[test]
    fn test_ticket_serializes_camel_case() {
        let ticket = Ticket::from_document("t4", &json!({"status": "open", "assignedTo": "agg"}));
        let value = serde_json::to_value(&ticket).unwrap();
        assert_eq!(value["assignedTo"], "agg");
        assert_eq!(value["status"], "open");
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_create_validation_accepts_catalogue_values() {
        assert!(valid_create().validate().is_ok());
    }

    #[test]
    fn test_create_validation_rejects_blank_after_trim() {
        let mut input = valid_create();
        input.description = "   ".into();
        let errors = input.trimmed().validate().unwrap_err();
        assert!(errors.field_errors().contains_key("description"));
    }

    #[test]
    fn test_create_validation_rejects_unknown_catalogue_values() {
        let mut input = valid_create();
        input.location = "Lilongwe".into();
        input.email = "not-an-email".into();
        let errors = input.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("location"));
        assert!(fields.contains_key("email"));
    }

    #[test]
    fn test_create_missing_field_decodes_empty() {
        let mut body = serde_json::to_value(valid_create()).unwrap();
        body.as_object_mut().unwrap().remove("description");
        let input: TicketCreate = serde_json::from_value(body).unwrap();
        assert_eq!(input.description, "");
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 1);
        assert!(errors.field_errors().contains_key("description"));
    }

    #[test]
    fn test_list_query_default() {
        let query: ListQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(query.order, TicketOrder::Unordered);
        let query: ListQuery = serde_json::from_value(json!({"order": "created_desc"})).unwrap();
        assert_eq!(query.order, TicketOrder::CreatedDesc);
    }
}
