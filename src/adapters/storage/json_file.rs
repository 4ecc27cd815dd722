use crate::adapters::storage::table::Table;
use crate::domain::model::{Id, Page};
use crate::domain::ports::{Entity, RecordStore};
use crate::utils::error::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Record store persisting each table as `<data_dir>/<table>.json`.
///
/// Tables are loaded on first use and rewritten in full after every write.
/// A write goes to a temporary file first and is renamed into place.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    base_path: PathBuf,
    tables: Arc<Mutex<HashMap<&'static str, Table>>>,
}

impl JsonFileStore {
    /// Opens (creating if needed) a store rooted at `base_path`.
    pub async fn open(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        tokio::fs::create_dir_all(&base_path).await?;
        tracing::debug!("Opened JSON record store at {}", base_path.display());
        Ok(Self {
            base_path,
            tables: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", table))
    }

    async fn load(&self, table: &'static str) -> Result<Table> {
        let path = self.table_path(table);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Table::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn persist(&self, table: &'static str, data: &Table) -> Result<()> {
        let path = self.table_path(table);
        let tmp = self.base_path.join(format!("{}.json.tmp", table));
        let bytes = serde_json::to_vec_pretty(data)?;
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::debug!("Persisted {} rows to {}", data.len(), path.display());
        Ok(())
    }
}

/// Loads `$table` into the cache if needed and evaluates to `&mut Table`.
macro_rules! cached_table {
    ($store:expr, $tables:expr, $table:expr) => {{
        if !$tables.contains_key($table) {
            let loaded = $store.load($table).await?;
            $tables.insert($table, loaded);
        }
        $tables.entry($table).or_default()
    }};
}

impl RecordStore for JsonFileStore {
    async fn insert<E: Entity>(&self, entity: E) -> Result<E> {
        let mut tables = self.tables.lock().await;
        let table = cached_table!(self, tables, E::TABLE);

        // work on a copy so a failed write leaves the cache matching the file
        let mut next = table.clone();
        let stored = next.insert(entity)?;
        self.persist(E::TABLE, &next).await?;
        *table = next;
        Ok(stored)
    }

    async fn get_by_id<E: Entity>(&self, id: Id) -> Result<Option<E>> {
        let mut tables = self.tables.lock().await;
        let table = cached_table!(self, tables, E::TABLE);
        table.get(id)
    }

    async fn update_by_id<E: Entity>(&self, entity: &E) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let table = cached_table!(self, tables, E::TABLE);

        let mut next = table.clone();
        next.update(entity)?;
        self.persist(E::TABLE, &next).await?;
        *table = next;
        Ok(())
    }

    async fn find_one<E, P>(&self, predicate: P) -> Result<Option<E>>
    where
        E: Entity,
        P: Fn(&E) -> bool + Send,
    {
        let mut tables = self.tables.lock().await;
        let table = cached_table!(self, tables, E::TABLE);
        table.find_one(predicate)
    }

    async fn find_page<E: Entity>(&self, page: u64, size: u64) -> Result<Page<E>> {
        let mut tables = self.tables.lock().await;
        let table = cached_table!(self, tables, E::TABLE);
        table.page(page, size)
    }

    async fn find_all<E: Entity>(&self) -> Result<Vec<E>> {
        let mut tables = self.tables.lock().await;
        let table = cached_table!(self, tables, E::TABLE);
        table.all()
    }
}
