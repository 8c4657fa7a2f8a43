//! Link repository implementation.
//!
//! Outbound links are derived from `[[Title]]` references and stored in
//! `note_links`. Writers call [`PgLinkRepository::replace_outgoing_tx`] inside
//! the transaction that writes the note, so content and links commit together.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Transaction};
use tracing::debug;

use odyss_core::{
    build_graph, extract_wikilinks, resolve_links, Error, GraphData, GraphEdge, GraphNode,
    LinkRepository, NoteLinkInfo, Result, TitleIndex,
};

/// Outbound and inbound link sets keyed by note id.
#[derive(Debug, Default)]
pub struct LinkSets {
    pub outgoing: HashMap<i64, Vec<NoteLinkInfo>>,
    pub incoming: HashMap<i64, Vec<NoteLinkInfo>>,
}

impl LinkSets {
    /// Take both sets for one note, empty when it has none.
    pub fn take(&mut self, note_id: i64) -> (Vec<NoteLinkInfo>, Vec<NoteLinkInfo>) {
        (
            self.outgoing.remove(&note_id).unwrap_or_default(),
            self.incoming.remove(&note_id).unwrap_or_default(),
        )
    }
}

#[derive(sqlx::FromRow)]
struct KeyedLink {
    key: i64,
    id: i64,
    title: String,
}

fn group(rows: Vec<KeyedLink>) -> HashMap<i64, Vec<NoteLinkInfo>> {
    let mut map: HashMap<i64, Vec<NoteLinkInfo>> = HashMap::new();
    for row in rows {
        map.entry(row.key).or_default().push(NoteLinkInfo {
            id: row.id,
            title: row.title,
        });
    }
    map
}

/// PostgreSQL implementation of LinkRepository.
#[derive(Clone)]
pub struct PgLinkRepository {
    pool: Pool<Postgres>,
}

impl PgLinkRepository {
    /// Create a new PgLinkRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Recompute a note's outbound link set from its content.
    ///
    /// Titles are looked up once, the previous set is deleted and the
    /// resolved set inserted. Returns the number of links stored.
    pub async fn replace_outgoing_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        note_id: i64,
        content: &str,
    ) -> Result<usize> {
        let referenced: Vec<String> = extract_wikilinks(content)
            .into_iter()
            .map(str::to_string)
            .collect();

        let index = if referenced.is_empty() {
            TitleIndex::default()
        } else {
            let rows: Vec<(i64, String)> =
                sqlx::query_as("SELECT id, title FROM notes WHERE title = ANY($1)")
                    .bind(&referenced)
                    .fetch_all(&mut **tx)
                    .await
                    .map_err(Error::Database)?;
            TitleIndex::from_titles(rows)
        };

        let targets: Vec<i64> = resolve_links(note_id, content, &index).into_iter().collect();

        sqlx::query("DELETE FROM note_links WHERE source_id = $1")
            .bind(note_id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        if !targets.is_empty() {
            sqlx::query(
                "INSERT INTO note_links (source_id, target_id)
                 SELECT $1, UNNEST($2::BIGINT[])
                 ON CONFLICT DO NOTHING",
            )
            .bind(note_id)
            .bind(&targets)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        }

        debug!(
            subsystem = "database",
            component = "links",
            op = "replace_outgoing",
            note_id,
            link_count = referenced.len(),
            resolved_count = targets.len(),
            "Recomputed outbound links"
        );
        Ok(targets.len())
    }

    pub async fn get_outgoing_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        note_id: i64,
    ) -> Result<Vec<NoteLinkInfo>> {
        sqlx::query_as(
            "SELECT n.id, n.title
             FROM note_links l
             JOIN notes n ON n.id = l.target_id
             WHERE l.source_id = $1
             ORDER BY n.id",
        )
        .bind(note_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(Error::Database)
    }

    pub async fn get_incoming_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        note_id: i64,
    ) -> Result<Vec<NoteLinkInfo>> {
        sqlx::query_as(
            "SELECT n.id, n.title
             FROM note_links l
             JOIN notes n ON n.id = l.source_id
             WHERE l.target_id = $1
             ORDER BY n.id",
        )
        .bind(note_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(Error::Database)
    }

    /// Link sets for many notes in two queries.
    pub async fn link_sets_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        note_ids: &[i64],
    ) -> Result<LinkSets> {
        if note_ids.is_empty() {
            return Ok(LinkSets::default());
        }

        let outgoing: Vec<KeyedLink> = sqlx::query_as(
            "SELECT l.source_id AS key, n.id, n.title
             FROM note_links l
             JOIN notes n ON n.id = l.target_id
             WHERE l.source_id = ANY($1)
             ORDER BY l.source_id, n.id",
        )
        .bind(note_ids)
        .fetch_all(&mut **tx)
        .await
        .map_err(Error::Database)?;

        let incoming: Vec<KeyedLink> = sqlx::query_as(
            "SELECT l.target_id AS key, n.id, n.title
             FROM note_links l
             JOIN notes n ON n.id = l.source_id
             WHERE l.target_id = ANY($1)
             ORDER BY l.target_id, n.id",
        )
        .bind(note_ids)
        .fetch_all(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(LinkSets {
            outgoing: group(outgoing),
            incoming: group(incoming),
        })
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn graph(&self, vault_id: Option<i64>) -> Result<GraphData> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let nodes: Vec<GraphNode> = sqlx::query_as(
            "SELECT id, title, folder_id FROM notes
             WHERE ($1::BIGINT IS NULL OR vault_id = $1)
             ORDER BY id",
        )
        .bind(vault_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let edges: Vec<GraphEdge> = sqlx::query_as(
            "SELECT l.source_id AS source, l.target_id AS target
             FROM note_links l
             JOIN notes n ON n.id = l.source_id
             WHERE ($1::BIGINT IS NULL OR n.vault_id = $1)
             ORDER BY l.source_id, l.target_id",
        )
        .bind(vault_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        let graph = build_graph(nodes, edges);
        debug!(
            subsystem = "database",
            component = "links",
            op = "graph",
            vault_id = ?vault_id,
            node_count = graph.nodes.len(),
            edge_count = graph.edges.len(),
            "Built link graph"
        );
        Ok(graph)
    }
}
