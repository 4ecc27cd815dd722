use anyhow::Context;
use clap::Parser;
use customs_clearance::config::cli::cargo_from_command;
use customs_clearance::config::{Command, LogFormat, StoreBackend};
use customs_clearance::utils::{logger, validation::Validate};
use customs_clearance::{
    AppConfig, Cli, DeclarationService, InMemoryStore, JsonFileStore, RecordStore, ResultCode,
    SystemClock,
};
use serde::Serialize;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 載入配置
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load config file '{}'", path))?,
        None => AppConfig::default(),
    };
    cli.apply_overrides(&mut config);

    // 初始化日誌
    match config.logging.format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
        tracing::debug!("Effective config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("{}", e.user_friendly_message());
        std::process::exit(1);
    }

    let code = match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; nothing will be kept after exit");
            let service =
                DeclarationService::from_config(InMemoryStore::new(), SystemClock, &config);
            run(&service, &cli.command).await?
        }
        StoreBackend::Json => {
            let dir = config.data_dir().unwrap_or("./data");
            let store = JsonFileStore::open(dir)
                .await
                .with_context(|| format!("failed to open record store at '{}'", dir))?;
            let service = DeclarationService::from_config(store, SystemClock, &config);
            run(&service, &cli.command).await?
        }
    };

    // 根據結果代碼決定退出碼
    let exit_code = match code {
        ResultCode::Success => 0,
        ResultCode::DuplicateDeclaration | ResultCode::NotFound | ResultCode::InvalidTransition => 2,
        ResultCode::Error => 1,
    };
    if exit_code > 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run<S: RecordStore>(
    service: &DeclarationService<S>,
    command: &Command,
) -> anyhow::Result<ResultCode> {
    tracing::debug!("Running command: {}", command.name());

    match command {
        Command::CreateGoods { .. } => {
            let cargo = cargo_from_command(command).context("create-goods without cargo fields")?;
            print_envelope(&service.create_goods(cargo).await)
        }
        Command::Declare { cargo_id } => print_envelope(&service.declare_goods(*cargo_id).await),
        Command::Order {
            cargo_id,
            customer_id,
        } => print_envelope(&service.create_order(*cargo_id, *customer_id).await),
        Command::ListDeclarations { page, size } => {
            print_envelope(&service.find_declaration(*page, *size).await)
        }
        Command::ListAllDeclarations => print_envelope(&service.find_all_declaration().await),
    }
}

fn print_envelope<T: Serialize>(
    envelope: &customs_clearance::ApiResult<T>,
) -> anyhow::Result<ResultCode> {
    let json = serde_json::to_string_pretty(envelope).context("failed to encode result")?;
    println!("{}", json);
    Ok(envelope.code)
}
