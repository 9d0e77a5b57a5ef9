//! Dashboard page and publication grid fragment.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use serde::Deserialize;

use crate::api::dto::filter::FilterParams;
use crate::domain::filter::FilterState;
use crate::state::AppState;
use crate::web::handlers::error_page;
use crate::web::views::{CardView, SidebarView, Tab, TabLink, tab_links};

#[derive(Debug, Default, Deserialize)]
pub struct TabParams {
    pub tab: Option<String>,
}

/// Template for the dashboard.
///
/// Renders `templates/dashboard.html`: header, filter sidebar, tab bar and
/// the active tab. The publications tab includes `grid.html`, so the grid
/// fields below are shared with [`GridTemplate`].
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub backend: &'static str,
    pub sidebar: SidebarView,
    pub tabs: Vec<TabLink>,
    pub show_publications: bool,
    pub show_graph: bool,
    pub show_analytics: bool,
    pub grid_query: String,

    // grid.html
    pub cards: Vec<CardView>,
    pub load_error: Option<String>,
    pub seq: u64,
    pub revision: u64,
}

/// Template for the publication grid fragment.
///
/// Renders `templates/grid.html`. Served alone by `GET /dashboard/grid` for
/// in-place refreshes and included by the dashboard on first render.
#[derive(Template, WebTemplate)]
#[template(path = "grid.html")]
pub struct GridTemplate {
    pub cards: Vec<CardView>,
    pub load_error: Option<String>,
    pub seq: u64,
    pub revision: u64,
}

struct GridData {
    cards: Vec<CardView>,
    load_error: Option<String>,
    revision: u64,
}

/// Loads the cards visible under `filter`.
///
/// A load failure is returned as data, not as an error, so the grid can
/// render its error state next to a still-working sidebar.
async fn load_grid(state: &AppState, filter: &FilterState) -> GridData {
    let service = &state.publication_service;
    let revision = service.revision();

    match service.list(filter).await {
        Ok(publications) => GridData {
            cards: publications.iter().map(CardView::from).collect(),
            load_error: None,
            revision,
        },
        Err(e) => {
            tracing::error!(error = %e, "Failed to load publications");
            GridData {
                cards: Vec::new(),
                load_error: Some(e.message().to_string()),
                revision,
            }
        }
    }
}

/// Renders the dashboard.
///
/// # Endpoint
///
/// `GET /dashboard?tab=publications&species=Humans&missions=ISS&year_min=2015&year_max=2025`
///
/// Knowledge-graph and analytics tabs are static placeholders and do not
/// touch storage.
pub async fn dashboard_handler(
    State(state): State<AppState>,
    Query(tab): Query<TabParams>,
    Query(params): Query<FilterParams>,
) -> Response {
    let filter = match params.to_filter_state() {
        Ok(filter) => filter,
        Err(e) => return error_page(e),
    };
    let tab = Tab::parse(tab.tab.as_deref());

    let grid = if tab == Tab::Publications {
        load_grid(&state, &filter).await
    } else {
        GridData {
            cards: Vec::new(),
            load_error: None,
            revision: state.publication_service.revision(),
        }
    };

    DashboardTemplate {
        backend: state.publication_service.backend(),
        sidebar: SidebarView::new(&filter),
        tabs: tab_links(tab, &params),
        show_publications: tab == Tab::Publications,
        show_graph: tab == Tab::KnowledgeGraph,
        show_analytics: tab == Tab::Analytics,
        grid_query: params.to_query_string(),
        cards: grid.cards,
        load_error: grid.load_error,
        seq: params.seq.unwrap_or(0),
        revision: grid.revision,
    }
    .into_response()
}

/// Renders only the publication grid.
///
/// # Endpoint
///
/// `GET /dashboard/grid?species=Plants&seq=12`
///
/// The fragment carries `data-seq` and `data-revision` attributes so the
/// page script can drop responses older than the newest request. A load
/// failure renders the error state with 502.
pub async fn grid_handler(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Response {
    let filter = match params.to_filter_state() {
        Ok(filter) => filter,
        Err(e) => return error_page(e),
    };

    let grid = load_grid(&state, &filter).await;
    let status = if grid.load_error.is_some() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };

    let fragment = GridTemplate {
        cards: grid.cards,
        load_error: grid.load_error,
        seq: params.seq.unwrap_or(0),
        revision: grid.revision,
    };

    (status, fragment).into_response()
}
