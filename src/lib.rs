pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::Cli;
pub use crate::config::AppConfig;

pub use crate::adapters::storage::{InMemoryStore, JsonFileStore};
pub use crate::core::clock::{FixedClock, SystemClock};
pub use crate::core::service::DeclarationService;
pub use crate::domain::model::{
    Cargo, CargoStatus, Declaration, DeclarationStatus, Id, Order, OrderStatus, Page,
    TransitionPolicy,
};
pub use crate::domain::ports::{Clock, ConfigProvider, Entity, RecordStore};
pub use crate::domain::result::{ApiResult, ResultCode};
pub use crate::utils::error::{CustomsError, Result};
