use crate::config::toml_config::{AppConfig, StoreBackend};
use crate::domain::model::{Cargo, CargoStatus, Id};
use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "customs-clearance")]
#[command(about = "Register, declare and order cargo through customs")]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory for the JSON record store (implies the json backend)
    #[arg(long)]
    pub data_dir: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Register a cargo record
    CreateGoods {
        #[arg(long)]
        name: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        origin: Option<String>,
        #[arg(long, default_value = "0")]
        quantity: u32,
        #[arg(long, default_value = "0")]
        weight_kg: f64,
        /// Initial status, stored as given
        #[arg(long, default_value = "created")]
        status: CargoStatus,
    },
    /// Declare a cargo to customs
    Declare {
        #[arg(long)]
        cargo_id: Id,
    },
    /// Place a customer order against a cargo
    Order {
        #[arg(long)]
        cargo_id: Id,
        #[arg(long)]
        customer_id: Id,
    },
    /// List one page of declarations
    ListDeclarations {
        #[arg(long, default_value = "1")]
        page: u64,
        #[arg(long, default_value = "10")]
        size: u64,
    },
    /// List every declaration
    ListAllDeclarations,
}

impl Cli {
    /// 套用命令列覆蓋設定
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.data_dir {
            config.store.backend = StoreBackend::Json;
            config.store.data_dir = Some(dir.clone());
        }
    }
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateGoods { .. } => "create-goods",
            Command::Declare { .. } => "declare",
            Command::Order { .. } => "order",
            Command::ListDeclarations { .. } => "list-declarations",
            Command::ListAllDeclarations => "list-all-declarations",
        }
    }
}

/// Builds the cargo record for `create-goods`; `None` for any other command.
pub fn cargo_from_command(command: &Command) -> Option<Cargo> {
    match command {
        Command::CreateGoods {
            name,
            category,
            origin,
            quantity,
            weight_kg,
            status,
        } => Some(Cargo {
            id: None,
            name: name.clone(),
            category: category.clone(),
            origin: origin.clone(),
            quantity: *quantity,
            weight_kg: *weight_kg,
            status: *status,
        }),
        _ => None,
    }
}
