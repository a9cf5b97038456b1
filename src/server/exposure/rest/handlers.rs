//! HTTP handlers for the dashboard routes
//!
//! Read handlers return JSON views; mutation handlers delegate to
//! [`InvoiceActions`](crate::core::actions::InvoiceActions) and turn its
//! [`ActionState`] into a response.

use crate::core::actions::{ActionState, FailureReason};
use crate::core::auth::SessionContext;
use crate::core::error::{DashboardError, DashboardResult, InvoiceError, RequestError};
use crate::core::invoice::{CardData, Customer, Invoice, MonthlyRevenue};
use crate::core::query::{InvoiceListItem, InvoiceQuery};
use crate::core::store::LATEST_INVOICES;
use crate::core::validation::FormSubmission;
use crate::server::host::DashboardHost;
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

/// Reports whether a listing came from the view cache (`hit`/`miss`)
pub const VIEW_CACHE_HEADER: HeaderName = HeaderName::from_static("x-view-cache");

type HostState = State<Arc<DashboardHost>>;

impl IntoResponse for ActionState {
    fn into_response(self) -> Response {
        let status = match &self {
            ActionState::Success {
                redirect: Some(target),
            } => return Redirect::to(target).into_response(),
            ActionState::Success { redirect: None } => StatusCode::OK,
            ActionState::Error {
                reason: FailureReason::Validation,
                ..
            } => StatusCode::UNPROCESSABLE_ENTITY,
            ActionState::Error {
                reason: FailureReason::Persistence,
                ..
            } => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

/// Fallback for unmatched paths; still runs behind the gate
pub async fn route_not_found(uri: Uri) -> DashboardError {
    RequestError::RouteNotFound {
        path: uri.path().to_string(),
    }
    .into()
}

/// Health check endpoint handler
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "invoice-dashboard"
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPage {
    pub page: &'static str,
    pub callback_url: Option<String>,
}

/// Sign-in page placeholder; the login UI lives elsewhere
pub async fn login_page(Query(query): Query<LoginQuery>) -> Json<LoginPage> {
    Json(LoginPage {
        page: "login",
        callback_url: query.callback_url,
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub revenue: Vec<MonthlyRevenue>,
    pub cards: CardData,
    pub latest_invoices: Vec<InvoiceListItem>,
}

/// Dashboard overview: monthly revenue, card totals and the latest invoices
pub async fn overview(State(host): HostState) -> DashboardResult<Json<Overview>> {
    let revenue = host.store.revenue().await?;
    let latest_invoices = host.store.latest(LATEST_INVOICES).await?;
    let cards = host.store.card_data().await?;
    Ok(Json(Overview {
        revenue,
        cards,
        latest_invoices,
    }))
}

/// Invoice listing, read through the view cache
///
/// Keyed by route plus normalized page and term; invalidating the listing
/// route drops every variant.
pub async fn list_invoices(
    State(host): HostState,
    uri: Uri,
    Query(query): Query<InvoiceQuery>,
) -> DashboardResult<Response> {
    let key = query.view_key(uri.path());

    if let Some(view) = host.cache.get(&key) {
        return Ok(cached(view, "hit"));
    }

    let page = host.store.search(&query).await?;
    let view = serde_json::to_value(&page)?;
    host.cache.insert(key, view.clone());
    Ok(cached(view, "miss"))
}

fn cached(view: Value, status: &'static str) -> Response {
    (
        [(VIEW_CACHE_HEADER, HeaderValue::from_static(status))],
        Json(view),
    )
        .into_response()
}

pub async fn get_invoice(
    State(host): HostState,
    Path(id): Path<String>,
) -> DashboardResult<Json<Invoice>> {
    let invoice = host
        .store
        .get(&id)
        .await?
        .ok_or(InvoiceError::NotFound { id })?;
    Ok(Json(invoice))
}

pub async fn create_invoice(
    State(host): HostState,
    Extension(session): Extension<SessionContext>,
    form: FormSubmission,
) -> ActionState {
    tracing::debug!(user = ?session.user_id(), "create invoice submitted");
    host.actions.create_invoice(&form).await
}

pub async fn update_invoice(
    State(host): HostState,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
    form: FormSubmission,
) -> ActionState {
    tracing::debug!(user = ?session.user_id(), invoice_id = %id, "update invoice submitted");
    host.actions.update_invoice(&id, &form).await
}

pub async fn delete_invoice(
    State(host): HostState,
    Extension(session): Extension<SessionContext>,
    Path(id): Path<String>,
) -> ActionState {
    tracing::debug!(user = ?session.user_id(), invoice_id = %id, "delete invoice submitted");
    host.actions.delete_invoice(&id).await
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CustomersResponse {
    pub data: Vec<Customer>,
}

pub async fn list_customers(State(host): HostState) -> DashboardResult<Json<CustomersResponse>> {
    let data = host.store.customers().await?;
    Ok(Json(CustomersResponse { data }))
}
