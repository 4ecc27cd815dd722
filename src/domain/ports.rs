use crate::domain::model::{Id, Page, TransitionPolicy};
use crate::utils::error::Result;
use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;

/// A row type the record store knows how to keep.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const TABLE: &'static str;

    fn id(&self) -> Option<Id>;
    fn set_id(&mut self, id: Id);

    /// Key for the table's unique index, if the table has one.
    fn unique_key(&self) -> Option<String> {
        None
    }
}

/// Key-based access to the `cargo`, `declaration` and `orders` tables.
pub trait RecordStore: Send + Sync {
    /// Stores a new row and returns it with its generated id.
    fn insert<E: Entity>(&self, entity: E) -> impl Future<Output = Result<E>> + Send;

    fn get_by_id<E: Entity>(&self, id: Id) -> impl Future<Output = Result<Option<E>>> + Send;

    /// Overwrites an existing row. Fails with `NotFound` when the id is unknown.
    fn update_by_id<E: Entity>(&self, entity: &E) -> impl Future<Output = Result<()>> + Send;

    fn find_one<E, P>(&self, predicate: P) -> impl Future<Output = Result<Option<E>>> + Send
    where
        E: Entity,
        P: Fn(&E) -> bool + Send;

    /// One page of rows in id order. `page` is 1-based.
    fn find_page<E: Entity>(
        &self,
        page: u64,
        size: u64,
    ) -> impl Future<Output = Result<Page<E>>> + Send;

    fn find_all<E: Entity>(&self) -> impl Future<Output = Result<Vec<E>>> + Send;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

pub trait ConfigProvider: Send + Sync {
    fn transition_policy(&self) -> TransitionPolicy;
    fn compensate_on_failure(&self) -> bool;
}
