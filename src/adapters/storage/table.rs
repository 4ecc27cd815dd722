//! Row storage shared by the store adapters.
//!
//! Rows are kept as JSON values keyed by id, so one `Table` type serves every
//! entity and serializes straight to disk.

use crate::domain::model::{Id, Page};
use crate::domain::ports::Entity;
use crate::utils::error::{CustomsError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    next_id: Id,
    rows: BTreeMap<Id, serde_json::Value>,
    #[serde(default)]
    unique: BTreeMap<String, Id>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
            unique: BTreeMap::new(),
        }
    }
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn insert<E: Entity>(&mut self, mut entity: E) -> Result<E> {
        let key = entity.unique_key();
        if let Some(key) = &key {
            if self.unique.contains_key(key) {
                return Err(CustomsError::Conflict {
                    table: E::TABLE,
                    key: key.clone(),
                });
            }
        }

        let id = self.next_id;
        entity.set_id(id);
        let value = serde_json::to_value(&entity)?;

        self.next_id += 1;
        self.rows.insert(id, value);
        if let Some(key) = key {
            self.unique.insert(key, id);
        }
        Ok(entity)
    }

    pub fn get<E: Entity>(&self, id: Id) -> Result<Option<E>> {
        self.rows
            .get(&id)
            .map(|value| E::deserialize(value).map_err(CustomsError::from))
            .transpose()
    }

    pub fn update<E: Entity>(&mut self, entity: &E) -> Result<()> {
        let id = entity.id().ok_or_else(|| CustomsError::StoreError {
            message: format!("cannot update {} row without an id", E::TABLE),
        })?;
        if !self.rows.contains_key(&id) {
            return Err(CustomsError::NotFound {
                entity: E::TABLE,
                id,
            });
        }

        let key = entity.unique_key();
        if let Some(key) = &key {
            if matches!(self.unique.get(key), Some(owner) if *owner != id) {
                return Err(CustomsError::Conflict {
                    table: E::TABLE,
                    key: key.clone(),
                });
            }
        }

        let value = serde_json::to_value(entity)?;
        self.rows.insert(id, value);
        self.unique.retain(|_, owner| *owner != id);
        if let Some(key) = key {
            self.unique.insert(key, id);
        }
        Ok(())
    }

    pub fn find_one<E, P>(&self, predicate: P) -> Result<Option<E>>
    where
        E: Entity,
        P: Fn(&E) -> bool,
    {
        for value in self.rows.values() {
            let entity = E::deserialize(value)?;
            if predicate(&entity) {
                return Ok(Some(entity));
            }
        }
        Ok(None)
    }

    pub fn page<E: Entity>(&self, page: u64, size: u64) -> Result<Page<E>> {
        let total = self.rows.len() as u64;
        let offset = page.saturating_sub(1).saturating_mul(size);
        let records = self
            .rows
            .values()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(size).unwrap_or(usize::MAX))
            .map(|value| E::deserialize(value))
            .collect::<std::result::Result<Vec<E>, _>>()?;
        Ok(Page::new(records, total, size, page))
    }

    pub fn all<E: Entity>(&self) -> Result<Vec<E>> {
        self.rows
            .values()
            .map(|value| E::deserialize(value).map_err(CustomsError::from))
            .collect()
    }
}
