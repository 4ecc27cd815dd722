pub mod clock;
pub mod service;

pub use crate::domain::model::{Cargo, Declaration, Id, Order, Page};
pub use crate::domain::ports::{Clock, ConfigProvider, Entity, RecordStore};
pub use crate::domain::result::{ApiResult, ResultCode};
pub use crate::utils::error::Result;
