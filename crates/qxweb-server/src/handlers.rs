use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use qxweb_compare::diff::{
    canonical_value, filter_features, filter_services, service_highlight, should_highlight,
};
use qxweb_compare::share::QUERY_PARAM;
use qxweb_compare::{export, AddOutcome, AddressBar, CategoryFilter};
use qxweb_core::Route;

use crate::server::AppState;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

pub async fn list_companies(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.catalog.all())
}

pub async fn get_company(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.catalog.find_by_id(&id) {
        Some(company) => (StatusCode::OK, Json(json!(company))),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("unknown company: {id}") })),
        ),
    }
}

pub async fn get_selection(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "companies": state.manager.selection(),
        "count": state.manager.count(),
        "visible": state.manager.is_panel_visible(),
    }))
}

pub async fn add_to_selection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let Some(company) = state.catalog.find_by_id(&id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("unknown company: {id}") })),
        );
    };

    let outcome = match state.manager.add(company) {
        AddOutcome::Added => "added",
        AddOutcome::AlreadyPresent => "already_present",
        AddOutcome::CapacityExceeded => "capacity_exceeded",
    };
    (
        StatusCode::OK,
        Json(json!({ "outcome": outcome, "count": state.manager.count() })),
    )
}

pub async fn remove_from_selection(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let removed = state.manager.remove(&id);
    Json(json!({ "removed": removed, "count": state.manager.count() }))
}

pub async fn clear_selection(State(state): State<AppState>) -> impl IntoResponse {
    state.manager.clear();
    Json(json!({ "count": 0 }))
}

#[derive(Deserialize)]
pub struct NavigateBody {
    pub path: String,
    /// Query parameter value arriving with the page load, if any.
    pub companies: Option<String>,
}

/// Simulate a page mount: update the tab's query string, then run the
/// manager's hydration protocol for the new route.
pub async fn navigate(
    State(state): State<AppState>,
    Json(body): Json<NavigateBody>,
) -> impl IntoResponse {
    match &body.companies {
        Some(value) => state.address_bar.replace_query_param(QUERY_PARAM, value),
        None => state.address_bar.remove_query_param(QUERY_PARAM),
    }

    let route = Route::from_path(&body.path);
    state.manager.navigate(route.clone());

    Json(json!({
        "route": route.path(),
        "count": state.manager.count(),
        "visible": state.manager.is_panel_visible(),
    }))
}

#[derive(Deserialize)]
pub struct TableQuery {
    pub filter: Option<String>,
    pub highlight: Option<bool>,
}

/// The features × companies grid plus the service rows.
pub async fn comparison_table(
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> impl IntoResponse {
    let filter = query
        .filter
        .as_deref()
        .unwrap_or("all")
        .parse::<CategoryFilter>()
        .unwrap_or(CategoryFilter::All);
    let highlight = query.highlight.unwrap_or(false);
    let selection = state.manager.selection();

    let features: Vec<serde_json::Value> = filter_features(&state.registry, filter)
        .into_iter()
        .map(|feature| {
            let values: Vec<String> =
                selection.iter().map(|c| canonical_value(feature, c)).collect();
            json!({
                "id": feature.id,
                "label": feature.label,
                "category": feature.category.to_string(),
                "values": values,
                "highlight": should_highlight(feature, &selection, highlight),
            })
        })
        .collect();

    let services: Vec<serde_json::Value> = filter_services(&selection, filter)
        .into_iter()
        .map(|tag| {
            let values: Vec<&str> = selection
                .iter()
                .map(|c| if c.has_service(&tag) { "Yes" } else { "No" })
                .collect();
            json!({
                "tag": tag,
                "values": values,
                "highlight": service_highlight(&tag, &selection, highlight),
            })
        })
        .collect();

    Json(json!({
        "companies": selection.iter().map(|c| c.name.clone()).collect::<Vec<_>>(),
        "features": features,
        "services": services,
    }))
}

pub async fn share_link(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "url": state.manager.sharing_link() }))
}

pub async fn export_csv(State(state): State<AppState>) -> impl IntoResponse {
    let csv = export::export_csv(&state.manager.selection(), &state.registry);
    ([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], csv)
}
