//! Ticket Lifecycle Service
//!
//! Validates and creates tickets and applies the open → assigned → resolved
//! transitions. Every operation authorizes the session first; a denied call
//! never reaches the store. Each mutation is followed by a re-read.

use std::sync::Arc;

use chrono::{SecondsFormat, TimeZone, Utc};
use serde_json::{Value, json};
use shared::models::ticket::{
    FIELD_ASSIGNED_TO, FIELD_CREATED_AT, FIELD_STATUS, TICKETS_COLLECTION,
};
use shared::models::{DashboardSummary, Ticket, TicketCreate, TicketOrder, TicketStatus};
use validator::Validate;

use crate::auth::{Operation, Session, authorize};
use crate::stats;
use crate::store::{Direction, DocumentStore, Fields, Record, StoreError};
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, from_validation_errors,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

#[derive(Clone)]
pub struct TicketService {
    store: Arc<dyn DocumentStore>,
    officers: Arc<Vec<String>>,
}

impl TicketService {
    pub fn new(store: Arc<dyn DocumentStore>, officers: Vec<String>) -> Self {
        Self {
            store,
            officers: Arc::new(officers),
        }
    }

    /// Officer roster accepted by [`assign_ticket`](Self::assign_ticket)
    pub fn officers(&self) -> &[String] {
        &self.officers
    }

    pub async fn create_ticket(&self, session: &Session, input: TicketCreate) -> AppResult<Ticket> {
        authorize(session, Operation::CreateTicket)?;

        let input = input.trimmed();
        input.validate().map_err(|e| from_validation_errors(&e))?;
        validate_required_text(&input.name, "name", MAX_NAME_LEN)?;
        validate_required_text(&input.email, "email", MAX_EMAIL_LEN)?;
        validate_required_text(&input.description, "description", MAX_NOTE_LEN)?;

        let doc = json!({
            "name": input.name,
            "email": input.email,
            "location": input.location,
            "department": input.department,
            "issue": input.issue,
            "description": input.description,
            FIELD_STATUS: TicketStatus::Open.as_str(),
            FIELD_CREATED_AT: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        });
        let id = self.store.create(TICKETS_COLLECTION, into_fields(doc)).await?;

        tracing::info!(
            ticket_id = %id,
            identity_id = %session.identity_id,
            location = %input.location,
            issue = %input.issue,
            "Ticket created"
        );
        self.fetch(&id).await
    }

    pub async fn assign_ticket(
        &self,
        session: &Session,
        ticket_id: &str,
        officer: &str,
    ) -> AppResult<Ticket> {
        authorize(session, Operation::AssignTicket)?;

        let officer = officer.trim();
        validate_required_text(officer, "officer", MAX_SHORT_TEXT_LEN)?;
        if !self.officers.iter().any(|o| o == officer) {
            return Err(AppError::with_message(
                ErrorCode::UnknownOfficer,
                format!("'{}' is not on the officer roster", officer),
            )
            .with_detail("officer", officer));
        }

        let ticket = self.fetch(ticket_id).await?;
        if let Some(current) = &ticket.assigned_to {
            return Err(AppError::with_message(
                ErrorCode::TicketAlreadyAssigned,
                format!("Ticket {} is already assigned to {}", ticket_id, current),
            )
            .with_detail("ticket_id", ticket_id)
            .with_detail("assigned_to", current.as_str()));
        }

        let expected = into_fields(json!({ FIELD_ASSIGNED_TO: null }));
        let patch = into_fields(json!({
            FIELD_ASSIGNED_TO: officer,
            FIELD_STATUS: TicketStatus::Assigned.as_str(),
        }));
        self.store
            .update_fields_if(TICKETS_COLLECTION, ticket_id, &expected, patch)
            .await
            .map_err(|e| ticket_error(e, ticket_id))?;

        tracing::info!(
            ticket_id = %ticket_id,
            officer = %officer,
            by = %session.identity_id,
            "Ticket assigned"
        );
        self.fetch(ticket_id).await
    }

    /// Mark a ticket resolved. Allowed from any status, including `open`;
    /// the assigned officer is kept.
    pub async fn resolve_ticket(&self, session: &Session, ticket_id: &str) -> AppResult<Ticket> {
        authorize(session, Operation::ResolveTicket)?;

        let ticket = self.fetch(ticket_id).await?;
        let observed = ticket
            .status_str()
            .map(|s| Value::String(s.to_string()))
            .unwrap_or(Value::Null);

        let mut expected = Fields::new();
        expected.insert(FIELD_STATUS.to_string(), observed);
        let patch = into_fields(json!({ FIELD_STATUS: TicketStatus::Resolved.as_str() }));
        self.store
            .update_fields_if(TICKETS_COLLECTION, ticket_id, &expected, patch)
            .await
            .map_err(|e| ticket_error(e, ticket_id))?;

        tracing::info!(
            ticket_id = %ticket_id,
            previous = ?ticket.status_str(),
            by = %session.identity_id,
            "Ticket resolved"
        );
        self.fetch(ticket_id).await
    }

    pub async fn delete_ticket(&self, session: &Session, ticket_id: &str) -> AppResult<()> {
        authorize(session, Operation::DeleteTicket)?;

        self.store
            .delete(TICKETS_COLLECTION, ticket_id)
            .await
            .map_err(|e| ticket_error(e, ticket_id))?;

        tracing::info!(ticket_id = %ticket_id, by = %session.identity_id, "Ticket deleted");
        Ok(())
    }

    pub async fn list_tickets(&self, session: &Session, order: TicketOrder) -> AppResult<Vec<Ticket>> {
        authorize(session, Operation::ListTickets)?;
        self.load(order).await
    }

    pub async fn get_ticket(&self, session: &Session, ticket_id: &str) -> AppResult<Ticket> {
        authorize(session, Operation::ViewTicket)?;
        self.fetch(ticket_id).await
    }

    /// Resolved tickets, newest first. Only the exact status `resolved`
    /// qualifies.
    pub async fn ticket_history(&self, session: &Session) -> AppResult<Vec<Ticket>> {
        authorize(session, Operation::ListTickets)?;
        let tickets = self.load(TicketOrder::CreatedDesc).await?;
        Ok(tickets
            .into_iter()
            .filter(|t| t.status == Some(TicketStatus::Resolved))
            .collect())
    }

    /// Dashboard figures with months taken in `tz`
    pub async fn dashboard<Tz: TimeZone>(
        &self,
        session: &Session,
        tz: &Tz,
    ) -> AppResult<DashboardSummary> {
        authorize(session, Operation::ViewDashboard)?;
        let tickets = self.load(TicketOrder::Unordered).await?;
        Ok(stats::summarize(&tickets, Utc::now(), tz))
    }

    async fn load(&self, order: TicketOrder) -> AppResult<Vec<Ticket>> {
        let records = match order {
            TicketOrder::CreatedDesc => {
                self.store
                    .query_ordered(TICKETS_COLLECTION, FIELD_CREATED_AT, Direction::Desc)
                    .await?
            }
            TicketOrder::Unordered => self.store.get_all(TICKETS_COLLECTION).await?,
        };
        Ok(records.into_iter().map(to_ticket).collect())
    }

    async fn fetch(&self, ticket_id: &str) -> AppResult<Ticket> {
        self.store
            .get_by_id(TICKETS_COLLECTION, ticket_id)
            .await
            .map(to_ticket)
            .map_err(|e| ticket_error(e, ticket_id))
    }
}

fn to_ticket(record: Record) -> Ticket {
    let Record { id, fields } = record;
    Ticket::from_document(id, &Value::Object(fields))
}

fn into_fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}

fn ticket_error(err: StoreError, ticket_id: &str) -> AppError {
    match err {
        StoreError::NotFound { .. } => AppError::ticket_not_found(ticket_id),
        StoreError::Conflict { .. } => AppError::conflict(format!(
            "Ticket {} changed while it was being updated",
            ticket_id
        ))
        .with_detail("ticket_id", ticket_id),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreResult};
    use async_trait::async_trait;
    use shared::models::Role;

    fn user() -> Session {
        Session::new("u-1", "thoko@example.org", "Thoko", Role::User)
    }

    fn ict() -> Session {
        Session::new("i-1", "chime@example.org", "Chime", Role::Ict)
    }

    fn roster() -> Vec<String> {
        ["manyeka", "mazy", "agg", "chime"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn service() -> (TicketService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (TicketService::new(store.clone(), roster()), store)
    }

    fn mzuzu_finance() -> TicketCreate {
        TicketCreate {
            name: "  Thoko Banda ".into(),
            email: "thoko@example.org".into(),
            location: "Mzuzu".into(),
            department: "Finance Department".into(),
            issue: "Errors in billing or customer management system".into(),
            description: "Invoices show the wrong tariff".into(),
        }
    }

    /// Fails every call, so any store access surfaces as a database error
    struct UntouchableStore;

    #[async_trait]
    impl DocumentStore for UntouchableStore {
        async fn create(&self, _: &str, _: Fields) -> StoreResult<String> {
            Err(StoreError::Backend("touched".into()))
        }
        async fn put(&self, _: &str, _: &str, _: Fields) -> StoreResult<()> {
            Err(StoreError::Backend("touched".into()))
        }
        async fn get_all(&self, _: &str) -> StoreResult<Vec<Record>> {
            Err(StoreError::Backend("touched".into()))
        }
        async fn get_by_id(&self, _: &str, _: &str) -> StoreResult<Record> {
            Err(StoreError::Backend("touched".into()))
        }
        async fn update_fields(&self, _: &str, _: &str, _: Fields) -> StoreResult<()> {
            Err(StoreError::Backend("touched".into()))
        }
        async fn update_fields_if(&self, _: &str, _: &str, _: &Fields, _: Fields) -> StoreResult<()> {
            Err(StoreError::Backend("touched".into()))
        }
        async fn delete(&self, _: &str, _: &str) -> StoreResult<()> {
            Err(StoreError::Backend("touched".into()))
        }
        async fn query_ordered(&self, _: &str, _: &str, _: Direction) -> StoreResult<Vec<Record>> {
            Err(StoreError::Backend("touched".into()))
        }
    }

    /// Memory store whose conditional updates always lose the race
    struct RacingStore(MemoryStore);

    #[async_trait]
    impl DocumentStore for RacingStore {
        async fn create(&self, c: &str, f: Fields) -> StoreResult<String> {
            self.0.create(c, f).await
        }
        async fn put(&self, c: &str, id: &str, f: Fields) -> StoreResult<()> {
            self.0.put(c, id, f).await
        }
        async fn get_all(&self, c: &str) -> StoreResult<Vec<Record>> {
            self.0.get_all(c).await
        }
        async fn get_by_id(&self, c: &str, id: &str) -> StoreResult<Record> {
            self.0.get_by_id(c, id).await
        }
        async fn update_fields(&self, c: &str, id: &str, f: Fields) -> StoreResult<()> {
            self.0.update_fields(c, id, f).await
        }
        async fn update_fields_if(&self, c: &str, id: &str, _: &Fields, _: Fields) -> StoreResult<()> {
            Err(StoreError::conflict(c, id))
        }
        async fn delete(&self, c: &str, id: &str) -> StoreResult<()> {
            self.0.delete(c, id).await
        }
        async fn query_ordered(&self, c: &str, f: &str, d: Direction) -> StoreResult<Vec<Record>> {
            self.0.query_ordered(c, f, d).await
        }
    }

    #[tokio::test]
    async fn test_create_ticket_defaults() {
        let (svc, store) = service();
        let ticket = svc.create_ticket(&user(), mzuzu_finance()).await.unwrap();

        assert_eq!(ticket.name, "Thoko Banda");
        assert_eq!(ticket.status, Some(TicketStatus::Open));
        assert_eq!(ticket.assigned_to, None);
        assert!(ticket.created_at.is_some());

        // Status is persisted explicitly
        let raw = store.get_by_id(TICKETS_COLLECTION, &ticket.id).await.unwrap();
        assert_eq!(raw.fields.get("status"), Some(&json!("open")));
        assert!(!raw.fields.contains_key("assignedTo"));
    }

    #[tokio::test]
    async fn test_create_ticket_validation() {
        let (svc, store) = service();

        let mut blank = mzuzu_finance();
        blank.description = "   ".into();
        let err = svc.create_ticket(&user(), blank).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);

        let mut bad = mzuzu_finance();
        bad.location = "Blantyre".into();
        bad.email = "thoko-at-example".into();
        let err = svc.create_ticket(&user(), bad).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);

        assert!(store.get_all(TICKETS_COLLECTION).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mzuzu_finance_lifecycle() {
        let (svc, _store) = service();
        let created = svc.create_ticket(&user(), mzuzu_finance()).await.unwrap();
        assert_eq!(created.location, "Mzuzu");
        assert_eq!(created.department, "Finance Department");

        let assigned = svc.assign_ticket(&ict(), &created.id, "mazy").await.unwrap();
        assert_eq!(assigned.status, Some(TicketStatus::Assigned));
        assert_eq!(assigned.assigned_to.as_deref(), Some("mazy"));

        let resolved = svc.resolve_ticket(&ict(), &created.id).await.unwrap();
        assert_eq!(resolved.status, Some(TicketStatus::Resolved));
        assert_eq!(resolved.assigned_to.as_deref(), Some("mazy"));

        let history = svc.ticket_history(&user()).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, created.id);

        let summary = svc.dashboard(&user(), &Utc).await.unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.resolved, 1);
        assert_eq!(summary.open, 0);
    }

    #[tokio::test]
    async fn test_assign_already_assigned_leaves_record_unchanged() {
        let (svc, store) = service();
        let created = svc.create_ticket(&user(), mzuzu_finance()).await.unwrap();
        svc.assign_ticket(&ict(), &created.id, "agg").await.unwrap();
        let before = store.get_by_id(TICKETS_COLLECTION, &created.id).await.unwrap();

        let err = svc.assign_ticket(&ict(), &created.id, "mazy").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TicketAlreadyAssigned);

        let after = store.get_by_id(TICKETS_COLLECTION, &created.id).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_assign_unknown_officer_and_missing_ticket() {
        let (svc, _store) = service();
        let created = svc.create_ticket(&user(), mzuzu_finance()).await.unwrap();

        let err = svc.assign_ticket(&ict(), &created.id, "nobody").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownOfficer);

        let err = svc.assign_ticket(&ict(), "missing", "mazy").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TicketNotFound);
        let err = svc.resolve_ticket(&ict(), "missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TicketNotFound);
        let err = svc.delete_ticket(&ict(), "missing").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TicketNotFound);
    }

    #[tokio::test]
    async fn test_resolve_directly_from_open() {
        let (svc, _store) = service();
        let created = svc.create_ticket(&user(), mzuzu_finance()).await.unwrap();
        let resolved = svc.resolve_ticket(&ict(), &created.id).await.unwrap();
        assert_eq!(resolved.status, Some(TicketStatus::Resolved));
        assert_eq!(resolved.assigned_to, None);
    }

    #[tokio::test]
    async fn test_user_denied_without_store_access() {
        let svc = TicketService::new(Arc::new(UntouchableStore), roster());

        for err in [
            svc.assign_ticket(&user(), "t1", "mazy").await.unwrap_err(),
            svc.resolve_ticket(&user(), "t1").await.unwrap_err(),
            svc.delete_ticket(&user(), "t1").await.map(|_| ()).unwrap_err(),
        ] {
            assert_eq!(err.code, ErrorCode::PermissionDenied);
        }
    }

    #[tokio::test]
    async fn test_user_denied_leaves_ticket_intact() {
        let (svc, store) = service();
        let created = svc.create_ticket(&user(), mzuzu_finance()).await.unwrap();
        let before = store.get_by_id(TICKETS_COLLECTION, &created.id).await.unwrap();

        assert!(svc.assign_ticket(&user(), &created.id, "mazy").await.is_err());
        assert!(svc.resolve_ticket(&user(), &created.id).await.is_err());
        assert!(svc.delete_ticket(&user(), &created.id).await.is_err());

        let after = store.get_by_id(TICKETS_COLLECTION, &created.id).await.unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_lost_race_reports_conflict() {
        let svc = TicketService::new(Arc::new(RacingStore(MemoryStore::new())), roster());
        let created = svc.create_ticket(&user(), mzuzu_finance()).await.unwrap();

        let err = svc.assign_ticket(&ict(), &created.id, "mazy").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TicketConflict);
        let err = svc.resolve_ticket(&ict(), &created.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TicketConflict);
    }

    #[tokio::test]
    async fn test_list_created_desc() {
        let (svc, store) = service();
        for (name, created_at) in [
            ("old", "2025-01-01T00:00:00.000Z"),
            ("new", "2025-03-01T00:00:00.000Z"),
            ("mid", "2025-02-01T00:00:00.000Z"),
        ] {
            store
                .create(
                    TICKETS_COLLECTION,
                    into_fields(json!({"name": name, "status": "open", "createdAt": created_at})),
                )
                .await
                .unwrap();
        }

        let names = |tickets: Vec<Ticket>| tickets.into_iter().map(|t| t.name).collect::<Vec<_>>();
        assert_eq!(
            names(svc.list_tickets(&user(), TicketOrder::CreatedDesc).await.unwrap()),
            ["new", "mid", "old"]
        );
        assert_eq!(
            names(svc.list_tickets(&user(), TicketOrder::Unordered).await.unwrap()),
            ["old", "new", "mid"]
        );
    }

    #[tokio::test]
    async fn test_history_is_exact_match() {
        let (svc, store) = service();
        for status in ["resolved", "Resolved", "open"] {
            store
                .create(TICKETS_COLLECTION, into_fields(json!({"status": status})))
                .await
                .unwrap();
        }
        let history = svc.ticket_history(&ict()).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status_str(), Some("resolved"));
    }

    #[tokio::test]
    async fn test_ict_delete() {
        let (svc, _store) = service();
        let created = svc.create_ticket(&user(), mzuzu_finance()).await.unwrap();
        svc.delete_ticket(&ict(), &created.id).await.unwrap();
        let err = svc.get_ticket(&user(), &created.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::TicketNotFound);
    }
}
