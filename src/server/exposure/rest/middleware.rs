//! Gate middleware
//!
//! Resolves the session, asks the [`AuthorizationGate`](crate::core::gate::AuthorizationGate)
//! for a decision and turns it into a response. Allowed requests carry the
//! resolved [`SessionContext`] as a request extension.

use crate::core::auth::SessionContext;
use crate::core::gate::GateDecision;
use crate::server::host::DashboardHost;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

/// Query parameter naming the page to return to after signing in
pub const CALLBACK_PARAM: &str = "callbackUrl";

/// Login challenge target for a denied request
pub fn login_redirect(login_path: &str, requested: &str) -> String {
    format!(
        "{}?{}={}",
        login_path,
        CALLBACK_PARAM,
        urlencoding::encode(requested)
    )
}

pub async fn authorize(
    State(host): State<Arc<DashboardHost>>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let headers = request.headers().clone();

    // A provider failure must never open the protected area
    let session = match host.sessions.resolve(&headers).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(%path, error = %e, "session resolution failed, treating as anonymous");
            SessionContext::Anonymous
        }
    };

    match host.gate.decide(session.is_authenticated(), &path) {
        GateDecision::Allow => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        GateDecision::Deny => {
            let requested = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or(&path);
            tracing::debug!(%path, "gate denied anonymous request");
            Redirect::to(&login_redirect(&host.routes.login_path, requested)).into_response()
        }
        GateDecision::Redirect(target) => {
            tracing::debug!(%path, %target, "gate redirected signed-in request");
            Redirect::to(&target).into_response()
        }
    }
}
