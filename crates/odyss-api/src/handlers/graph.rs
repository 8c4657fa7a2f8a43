use axum::{extract::State, Json};
use serde::Deserialize;

use odyss_core::{GraphData, LinkRepository};

use crate::extract::ApiQuery;
use crate::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct GraphQuery {
    pub vault_id: Option<i64>,
}

/// Nodes and edges of the wikilink graph, optionally for one vault.
pub async fn get_graph(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<GraphQuery>,
) -> Result<Json<GraphData>, ApiError> {
    let graph = state.db.links.graph(query.vault_id).await?;
    Ok(Json(graph))
}
