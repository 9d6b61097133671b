//! Navigation API endpoint.
//!
//! Returns the navigation tree for the documentation site.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use dx_tree::{NavItem, NodeKind};
use serde::Serialize;

use crate::handlers::to_url_path;
use crate::state::AppState;

/// Response for GET /api/navigation.
#[derive(Serialize)]
pub(crate) struct NavigationResponse {
    /// Current site generation.
    generation: u64,
    items: Vec<NavItemResponse>,
}

/// Navigation entry with a URL path.
#[derive(Serialize)]
struct NavItemResponse {
    kind: NodeKind,
    title: String,
    path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<NavItemResponse>,
}

impl From<&NavItem> for NavItemResponse {
    fn from(item: &NavItem) -> Self {
        Self {
            kind: item.kind,
            title: item.title.clone(),
            path: to_url_path(&item.path),
            children: item.children.iter().map(Self::from).collect(),
        }
    }
}

/// Handle GET /api/navigation.
pub(crate) async fn get_navigation(State(state): State<Arc<AppState>>) -> Json<NavigationResponse> {
    let current = state.site.state();
    Json(NavigationResponse {
        generation: current.generation(),
        items: current
            .navigation()
            .items
            .iter()
            .map(NavItemResponse::from)
            .collect(),
    })
}
