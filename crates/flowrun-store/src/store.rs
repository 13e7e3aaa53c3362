use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use flowrun_core::error::{FlowError, Result};
use flowrun_core::traits::WorkflowStore;
use flowrun_core::types::Workflow;

use crate::sample::sample_workflow;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS workflows (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL DEFAULT '',
        nodes TEXT NOT NULL DEFAULT '[]',
        edges TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );";

fn db_err(e: impl std::fmt::Display) -> FlowError {
    FlowError::Database(e.to_string())
}

/// SQLite-backed store of workflow definitions.
///
/// Nodes and edges are kept as two separate JSON array columns.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a database at the given path and ensure the schema.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    FlowError::Database(format!("Failed to create db directory: {}", e))
                })?;
            }
        }

        let conn = Connection::open(path).map_err(db_err)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(db_err)?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        debug!(path = %path.display(), "Workflow store opened");
        Ok(store)
    }

    /// Open an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create the `workflows` table if it does not exist.
    pub fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().map_err(db_err)?;
        conn.execute_batch(SCHEMA).map_err(db_err)
    }

    /// Insert the sample workflow unless a row with its id already exists.
    ///
    /// Returns whether a row was inserted.
    pub fn seed(&self) -> Result<bool> {
        let wf = sample_workflow();
        let nodes = serde_json::to_string(&wf.nodes)?;
        let edges = serde_json::to_string(&wf.edges)?;
        let now = Utc::now().to_rfc3339();

        let conn = self.conn.lock().map_err(db_err)?;
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO workflows (id, name, nodes, edges, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![wf.id, wf.name, nodes, edges, now],
            )
            .map_err(db_err)?;

        if inserted > 0 {
            info!(workflow_id = %wf.id, "Seeded sample workflow");
        }
        Ok(inserted > 0)
    }

    /// Insert or replace a definition. `created_at` survives replacement.
    pub fn save(&self, workflow: &Workflow) -> Result<()> {
        let nodes = serde_json::to_string(&workflow.nodes)?;
        let edges = serde_json::to_string(&workflow.edges)?;
        let now = Utc::now().to_rfc3339();

        let conn = self.conn.lock().map_err(db_err)?;
        conn.execute(
            "INSERT INTO workflows (id, name, nodes, edges, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                nodes = excluded.nodes,
                edges = excluded.edges,
                updated_at = excluded.updated_at",
            params![workflow.id, workflow.name, nodes, edges, now],
        )
        .map_err(db_err)?;

        debug!(workflow_id = %workflow.id, "Workflow saved");
        Ok(())
    }

    /// Load a definition by id. An unknown id is `Ok(None)`.
    pub fn load(&self, id: &str) -> Result<Option<Workflow>> {
        let conn = self.conn.lock().map_err(db_err)?;
        let row = conn
            .query_row(
                "SELECT id, name, nodes, edges, created_at, updated_at
                 FROM workflows WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()
            .map_err(db_err)?;

        let Some((id, name, nodes, edges, created_at, updated_at)) = row else {
            return Ok(None);
        };

        let mut wf = Workflow::new(id, name);
        wf.nodes = serde_json::from_str(&nodes)
            .map_err(|e| FlowError::Database(format!("unmarshal nodes: {}", e)))?;
        wf.edges = serde_json::from_str(&edges)
            .map_err(|e| FlowError::Database(format!("unmarshal edges: {}", e)))?;
        wf.created_at = parse_timestamp(&created_at);
        wf.updated_at = parse_timestamp(&updated_at);
        Ok(Some(wf))
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl WorkflowStore for SqliteStore {
    fn get(&self, id: &str) -> BoxFuture<'_, Result<Option<Workflow>>> {
        let id = id.to_string();
        Box::pin(async move { self.load(&id) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SAMPLE_WORKFLOW_ID;
    use flowrun_core::types::{Edge, Node};

    fn row_count(store: &SqliteStore) -> i64 {
        let conn = store.conn.lock().unwrap();
        conn.query_row("SELECT COUNT(*) FROM workflows", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_init_schema_is_idempotent() {
        let store = SqliteStore::in_memory().unwrap();
        store.init_schema().unwrap();
        store.init_schema().unwrap();
        assert_eq!(row_count(&store), 0);
    }

    #[test]
    fn test_seed_once() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.seed().unwrap());
        assert!(!store.seed().unwrap());
        assert_eq!(row_count(&store), 1);
        assert!(store.load(SAMPLE_WORKFLOW_ID).unwrap().is_some());
    }

    #[test]
    fn test_seeded_workflow_round_trips() {
        let store = SqliteStore::in_memory().unwrap();
        store.seed().unwrap();

        let wf = store.load(SAMPLE_WORKFLOW_ID).unwrap().unwrap();
        assert_eq!(wf.name, "Weather Alert Workflow");
        assert_eq!(wf.nodes, sample_workflow().nodes);
        assert_eq!(wf.edges, sample_workflow().edges);
        assert!(wf.created_at.is_some());
        assert_eq!(wf.created_at, wf.updated_at);
    }

    #[test]
    fn test_load_unknown_is_none() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.load("does-not-exist").unwrap().is_none());
    }

    #[test]
    fn test_save_replaces_graph() {
        let store = SqliteStore::in_memory().unwrap();
        let wf = Workflow::new("wf-1", "First")
            .with_node(Node::new("s", "start", "Start"))
            .with_node(Node::new("e", "end", "End"))
            .with_edge(Edge::new("e1", "s", "e"));
        store.save(&wf).unwrap();

        let renamed = Workflow::new("wf-1", "Renamed").with_node(Node::new("s", "start", "Start"));
        store.save(&renamed).unwrap();

        let loaded = store.load("wf-1").unwrap().unwrap();
        assert_eq!(loaded.name, "Renamed");
        assert_eq!(loaded.nodes.len(), 1);
        assert!(loaded.edges.is_empty());
        assert!(loaded.updated_at >= loaded.created_at);
    }

    #[test]
    fn test_corrupt_nodes_is_database_error() {
        let store = SqliteStore::in_memory().unwrap();
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO workflows (id, name, nodes, edges, created_at, updated_at)
                 VALUES ('bad', 'Bad', 'not json', '[]', 'x', 'x')",
                [],
            )
            .unwrap();
        }
        let err = store.load("bad").unwrap_err();
        assert!(matches!(err, FlowError::Database(ref m) if m.contains("nodes")));
    }

    #[tokio::test]
    async fn test_trait_get() {
        let store = SqliteStore::in_memory().unwrap();
        store.seed().unwrap();
        let found = WorkflowStore::get(&store, SAMPLE_WORKFLOW_ID).await.unwrap();
        assert_eq!(found.unwrap().nodes.len(), 6);
        assert!(WorkflowStore::get(&store, "missing").await.unwrap().is_none());
    }
}
