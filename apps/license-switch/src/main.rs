use anyhow::{anyhow, Result};
use clap::{ArgGroup, Args, Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use license_switch::contract::client::LicenseSwitchApi;
use license_switch::contract::model::{RunOptions, SwitchRequest};
use license_switch::domain::ports::ConfirmPort;
use license_switch::domain::report::{CatalogTable, Summary};
use license_switch::domain::service::{Service, ServiceConfig};
use license_switch::gateways::local::LicenseSwitchLocalClient;
use license_switch::infra::confirm::{AutoConfirm, TerminalConfirm};
use license_switch::infra::export::CsvExporter;
use license_switch::infra::graph::GraphDirectory;
use license_switch::{LicenseSwitchConfig, MODULE_NAME};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// License Switch - move every user of one Microsoft 365 license to another
#[derive(Parser)]
#[command(name = "license-switch")]
#[command(about = "License Switch - move every user of one Microsoft 365 license to another")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print current configuration and exit
    #[arg(long, global = true)]
    print_config: bool,

    /// Log verbosity (-v debug with per-user messages, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tenant's subscribed SKUs with unit counts
    Skus(TenantArgs),
    /// Move all holders of the source license to the destination license
    Switch(SwitchArgs),
    /// Check configuration
    Check,
}

#[derive(Args)]
struct TenantArgs {
    /// Tenant id or verified domain (overrides config)
    #[arg(long)]
    tenant: Option<String>,
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("mode")
        .required(true)
        .args(["source_license_name", "source_license_id"])
))]
struct SwitchArgs {
    /// Source license part number, e.g. ENTERPRISEPACK
    #[arg(long, requires = "destination_license_name")]
    source_license_name: Option<String>,

    /// Destination license part number
    #[arg(long, requires = "source_license_name")]
    destination_license_name: Option<String>,

    /// Source SKU id
    #[arg(long, requires = "destination_license_id")]
    source_license_id: Option<String>,

    /// Destination SKU id
    #[arg(
        long,
        requires = "source_license_id",
        conflicts_with = "destination_license_name"
    )]
    destination_license_id: Option<String>,

    /// Audit CSV location (default: timestamped file in switch.export_dir)
    #[arg(long)]
    export_path: Option<PathBuf>,

    /// Export and report only; change nothing
    #[arg(long)]
    preview: bool,

    #[command(flatten)]
    tenant: TenantArgs,

    /// Process only the first --max-test-users discovered users
    #[arg(long)]
    test_mode: bool,

    /// User cap in test mode (overrides config, default 5)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    max_test_users: Option<u64>,

    /// Add a UsageLocation column to the export
    #[arg(long)]
    include_usage_location: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    yes: bool,
}

impl SwitchArgs {
    fn request(&self) -> Result<SwitchRequest> {
        let request = match (
            &self.source_license_name,
            &self.destination_license_name,
            &self.source_license_id,
            &self.destination_license_id,
        ) {
            (Some(src), Some(dst), None, None) => SwitchRequest::by_name(src, dst)?,
            (None, None, Some(src), Some(dst)) => SwitchRequest::by_id(src, dst)?,
            _ => {
                return Err(anyhow!(
                    "use either --source-license-name/--destination-license-name or --source-license-id/--destination-license-id"
                ))
            }
        };
        Ok(request)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.home_dir));
    tracing::debug!(home_dir = %config.home_dir, "license-switch starting");

    let mut module_cfg: LicenseSwitchConfig = config.module_config(MODULE_NAME)?;
    match &cli.command {
        Some(Commands::Skus(t)) => apply_tenant(&mut module_cfg, t),
        Some(Commands::Switch(s)) => {
            apply_tenant(&mut module_cfg, &s.tenant);
            if let Some(n) = s.max_test_users {
                module_cfg.switch.max_test_users = usize::try_from(n)?;
            }
            if s.include_usage_location {
                module_cfg.switch.include_usage_location = true;
            }
        }
        Some(Commands::Check) | None => {}
    }
    config
        .modules
        .insert(MODULE_NAME.to_string(), serde_json::to_value(&module_cfg)?);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command {
        Some(Commands::Skus(_)) => list_skus(&module_cfg).await,
        Some(Commands::Switch(s)) => switch(&module_cfg, s).await,
        Some(Commands::Check) => check_config(&config, &module_cfg),
        None => Err(anyhow!("no command given; run with --help for usage")),
    }
}

fn apply_tenant(cfg: &mut LicenseSwitchConfig, args: &TenantArgs) {
    if let Some(tenant) = &args.tenant {
        cfg.graph.tenant = tenant.clone();
    }
}

fn build_client(
    cfg: &LicenseSwitchConfig,
    confirm: Arc<dyn ConfirmPort>,
) -> Result<Arc<dyn LicenseSwitchApi>> {
    cfg.validate()?;
    let directory = Arc::new(GraphDirectory::from_config(&cfg.graph)?);
    let exporter = Arc::new(CsvExporter::new(cfg.switch.include_usage_location));
    let service = Arc::new(Service::new(
        directory,
        exporter,
        confirm,
        ServiceConfig::from(&cfg.switch),
    ));
    Ok(Arc::new(LicenseSwitchLocalClient::new(service)))
}

async fn list_skus(cfg: &LicenseSwitchConfig) -> Result<()> {
    let client = build_client(cfg, Arc::new(AutoConfirm(false)))?;
    let licenses = client.list_licenses().await?;
    println!("{}", CatalogTable(&licenses));
    Ok(())
}

async fn switch(cfg: &LicenseSwitchConfig, args: SwitchArgs) -> Result<()> {
    let request = args.request()?;
    let confirm: Arc<dyn ConfirmPort> = if args.yes {
        Arc::new(AutoConfirm(true))
    } else {
        Arc::new(TerminalConfirm)
    };
    let client = build_client(cfg, confirm)?;

    let options = RunOptions {
        preview: args.preview,
        test_mode: args.test_mode,
        max_test_users: cfg.switch.max_test_users,
        export_path: args.export_path,
    };
    let result = client.switch_licenses(request, options).await?;
    println!("{}", Summary(&result));
    Ok(())
}

fn check_config(config: &AppConfig, cfg: &LicenseSwitchConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    cfg.validate()?;
    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}
