//! 请求日志中间件
//!
//! 每个请求记录一条开始日志和一条完成日志。完成日志带上认证后的
//! 身份和角色 (由 `Session` 提取器回填)。

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use shared::models::Role;

use crate::auth::Session;

/// Who made the request, filled once the session has been resolved
#[derive(Clone, Default)]
pub struct RequestIdentity(Arc<OnceLock<(String, Role)>>);

impl RequestIdentity {
    pub fn record(&self, session: &Session) {
        let _ = self.0.set((session.identity_id.clone(), session.role));
    }

    pub fn get(&self) -> Option<(&str, Role)> {
        self.0.get().map(|(id, role)| (id.as_str(), *role))
    }
}

pub async fn logging_middleware(mut req: Request, next: Next) -> Response {
    let start = Instant::now();

    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let method = req.method().clone();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let identity = RequestIdentity::default();
    req.extensions_mut().insert(identity.clone());

    tracing::debug!(request_id = %request_id, method = %method, route = %route, "Request started");

    let response = next.run(req).await;

    let status = response.status();
    let latency_ms = start.elapsed().as_millis() as u64;
    let (caller, role) = match identity.get() {
        Some((id, role)) => (id, role.as_str()),
        None => ("anonymous", "-"),
    };

    match outcome(status) {
        Outcome::Failed => tracing::warn!(
            request_id = %request_id, method = %method, route = %route,
            status = status.as_u16(), latency_ms, caller, role,
            "Request failed"
        ),
        Outcome::Rejected => tracing::info!(
            request_id = %request_id, method = %method, route = %route,
            status = status.as_u16(), latency_ms, caller, role,
            "Request rejected"
        ),
        Outcome::Served => tracing::info!(
            request_id = %request_id, method = %method, route = %route,
            status = status.as_u16(), latency_ms, caller, role,
            "Request served"
        ),
    }

    response
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Served,
    Rejected,
    Failed,
}

fn outcome(status: StatusCode) -> Outcome {
    if status.is_server_error() {
        Outcome::Failed
    } else if status.is_client_error() {
        Outcome::Rejected
    } else {
        Outcome::Served
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Extension, Router, body::Body, routing::get};
    use tower::ServiceExt;

    #[test]
    fn test_outcome_by_status() {
        assert_eq!(outcome(StatusCode::OK), Outcome::Served);
        assert_eq!(outcome(StatusCode::CONFLICT), Outcome::Rejected);
        assert_eq!(outcome(StatusCode::SERVICE_UNAVAILABLE), Outcome::Failed);
    }

    #[test]
    fn test_identity_recorded_once() {
        let identity = RequestIdentity::default();
        assert!(identity.get().is_none());

        identity.record(&Session::new("uid-1", "agg@example.org", "Agg", Role::Ict));
        identity.record(&Session::new("uid-2", "x@example.org", "X", Role::User));
        assert_eq!(identity.get(), Some(("uid-1", Role::Ict)));
    }

    #[tokio::test]
    async fn test_middleware_shares_identity_slot_with_handlers() {
        let app = Router::new()
            .route(
                "/whoami",
                get(|Extension(identity): Extension<RequestIdentity>| async move {
                    identity.record(&Session::new("uid-1", "agg@example.org", "Agg", Role::Ict));
                    "ok"
                }),
            )
            .layer(axum::middleware::from_fn(logging_middleware));

        let response = app
            .oneshot(http::Request::builder().uri("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
