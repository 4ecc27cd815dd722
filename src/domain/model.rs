use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::ports::Entity;

/// Surrogate key assigned by the record store.
pub type Id = i64;

const NUMBER_TIME_FORMAT: &str = "%Y%m%d%H%M%S";

/// Builds a human-readable record number: the owner id followed by a
/// `YYYYMMDDhhmmss` timestamp.
pub fn timestamped_number(prefix: Id, at: NaiveDateTime) -> String {
    format!("{}{}", prefix, at.format(NUMBER_TIME_FORMAT))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CargoStatus {
    #[default]
    Created,
    Declared,
    PendingOutbound,
    PendingCustomsClearance,
}

impl CargoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CargoStatus::Created => "created",
            CargoStatus::Declared => "declared",
            CargoStatus::PendingOutbound => "pending-outbound",
            CargoStatus::PendingCustomsClearance => "pending-customs-clearance",
        }
    }

    /// Whether moving from `self` to `next` is in the lifecycle table.
    pub fn can_transition_to(&self, next: CargoStatus) -> bool {
        matches!(
            (self, next),
            (CargoStatus::Created, CargoStatus::Declared)
                | (CargoStatus::Declared, CargoStatus::PendingCustomsClearance)
                | (CargoStatus::Declared, CargoStatus::PendingOutbound)
                | (CargoStatus::PendingOutbound, CargoStatus::PendingCustomsClearance)
        )
    }
}

impl fmt::Display for CargoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CargoStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "created" => Ok(CargoStatus::Created),
            "declared" => Ok(CargoStatus::Declared),
            "pending-outbound" => Ok(CargoStatus::PendingOutbound),
            "pending-customs-clearance" => Ok(CargoStatus::PendingCustomsClearance),
            other => Err(format!("unknown cargo status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DeclarationStatus {
    #[default]
    Declared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    PendingOutbound,
}

/// What the workflow does with a cargo status change outside the lifecycle table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Overwrite the status and log a warning.
    #[default]
    Permissive,
    /// Reject the operation before anything is written.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Cargo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub weight_kg: f64,
    #[serde(default)]
    pub status: CargoStatus,
}

impl Cargo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: CargoStatus) -> Self {
        self.status = status;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub declaration_no: String,
    pub declaration_time: NaiveDateTime,
    pub cargo_id: Id,
    pub status: DeclarationStatus,
}

impl Declaration {
    pub fn new(cargo_id: Id, at: NaiveDateTime) -> Self {
        Self {
            id: None,
            declaration_no: timestamped_number(cargo_id, at),
            declaration_time: at,
            cargo_id,
            status: DeclarationStatus::Declared,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub order_no: String,
    pub customer_id: Id,
    pub cargo_id: Id,
    pub order_time: NaiveDateTime,
    pub status: OrderStatus,
}

impl Order {
    pub fn new(cargo_id: Id, customer_id: Id, at: NaiveDateTime) -> Self {
        Self {
            id: None,
            order_no: timestamped_number(customer_id, at),
            customer_id,
            cargo_id,
            order_time: at,
            status: OrderStatus::PendingOutbound,
        }
    }
}

impl Entity for Cargo {
    const TABLE: &'static str = "cargo";

    fn id(&self) -> Option<Id> {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = Some(id);
    }
}

impl Entity for Declaration {
    const TABLE: &'static str = "declaration";

    fn id(&self) -> Option<Id> {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = Some(id);
    }

    // unique index on declaration.cargo_id
    fn unique_key(&self) -> Option<String> {
        Some(self.cargo_id.to_string())
    }
}

impl Entity for Order {
    const TABLE: &'static str = "orders";

    fn id(&self) -> Option<Id> {
        self.id
    }

    fn set_id(&mut self, id: Id) {
        self.id = Some(id);
    }
}

/// One page of rows plus pagination metadata. `current` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub total: u64,
    pub size: u64,
    pub current: u64,
    pub pages: u64,
}

impl<T> Page<T> {
    pub fn new(records: Vec<T>, total: u64, size: u64, current: u64) -> Self {
        let pages = if size == 0 { 0 } else { total.div_ceil(size) };
        Self {
            records,
            total,
            size,
            current,
            pages,
        }
    }
}
