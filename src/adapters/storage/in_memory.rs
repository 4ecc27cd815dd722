use crate::adapters::storage::table::Table;
use crate::domain::model::{Id, Page};
use crate::domain::ports::{Entity, RecordStore};
use crate::utils::error::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Record store held in process memory. Clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<HashMap<&'static str, Table>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently in `table`.
    pub async fn count(&self, table: &str) -> usize {
        let tables = self.tables.lock().await;
        tables.get(table).map(Table::len).unwrap_or(0)
    }
}

impl RecordStore for InMemoryStore {
    async fn insert<E: Entity>(&self, entity: E) -> Result<E> {
        let mut tables = self.tables.lock().await;
        tables.entry(E::TABLE).or_default().insert(entity)
    }

    async fn get_by_id<E: Entity>(&self, id: Id) -> Result<Option<E>> {
        let tables = self.tables.lock().await;
        match tables.get(E::TABLE) {
            Some(table) => table.get(id),
            None => Ok(None),
        }
    }

    async fn update_by_id<E: Entity>(&self, entity: &E) -> Result<()> {
        let mut tables = self.tables.lock().await;
        tables.entry(E::TABLE).or_default().update(entity)
    }

    async fn find_one<E, P>(&self, predicate: P) -> Result<Option<E>>
    where
        E: Entity,
        P: Fn(&E) -> bool + Send,
    {
        let tables = self.tables.lock().await;
        match tables.get(E::TABLE) {
            Some(table) => table.find_one(predicate),
            None => Ok(None),
        }
    }

    async fn find_page<E: Entity>(&self, page: u64, size: u64) -> Result<Page<E>> {
        let tables = self.tables.lock().await;
        match tables.get(E::TABLE) {
            Some(table) => table.page(page, size),
            None => Ok(Page::new(Vec::new(), 0, size, page)),
        }
    }

    async fn find_all<E: Entity>(&self) -> Result<Vec<E>> {
        let tables = self.tables.lock().await;
        match tables.get(E::TABLE) {
            Some(table) => table.all(),
            None => Ok(Vec::new()),
        }
    }
}
