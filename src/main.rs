//! travel-providers - Hotel, flight and activity supplier CLI
//!
//! This tool manages supplier credentials and runs searches through:
//! - Hotelbeds (hotels)
//! - Duffel (flights)
//! - Viator (activities)

use anyhow::{bail, Context};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use travel_providers::cli::{
    ActivitySearchArgs, CliArgs, Command, ConfigureArgs, FlightSearchArgs, HotelSearchArgs,
};
use travel_providers::domain::{
    ActivitySearchCriteria, CapabilityType, FlightSearchCriteria, HotelSearchCriteria, ProviderConfig, Tenant,
};
use travel_providers::error::AppError;
use travel_providers::factory::ProviderFactory;
use travel_providers::output::{create_formatter, OutputConfig, OutputFormatter};
use travel_providers::progress::Progress;
use travel_providers::registry::ProviderRegistry;
use travel_providers::settings::{AppSettings, DEFAULT_SETTINGS_FILE};
use travel_providers::store::FileStore;

/// Exit code when a connection test reports the provider unreachable
const EXIT_UNREACHABLE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    match run(args).await {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Main application logic
async fn run(args: CliArgs) -> anyhow::Result<ExitCode> {
    let settings_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    let settings = AppSettings::load(&settings_path)?;
    init_logging(&settings.log_level, args.verbose);

    let (factory, tenant) = open_factory(&args, &settings).await?;
    let formatter = create_formatter(OutputConfig::from_cli(args.json));
    let mut progress = Progress::for_terminal(args.json);
    let mut stdout = io::stdout();

    let exit_code = match args.command {
        Command::Providers { capability } => {
            let capabilities = match capability {
                Some(capability) => vec![capability],
                None => CapabilityType::all().to_vec(),
            };
            let providers: Vec<_> = capabilities
                .into_iter()
                .flat_map(|capability| factory.available_providers(capability))
                .collect();
            formatter.format_providers(&providers, &mut stdout)?;
            ExitCode::SUCCESS
        }
        Command::Configure(configure) => {
            configure_provider(&factory, &tenant, configure, formatter.as_ref(), &mut stdout)
                .await?;
            ExitCode::SUCCESS
        }
        Command::Activate { capability, name } => {
            factory.set_active_provider(capability, &name, &tenant)?;
            factory.save_configurations(&tenant).await?;
            formatter.format_activation(capability, &name, &tenant, &mut stdout)?;
            ExitCode::SUCCESS
        }
        Command::Test { capability, name } => {
            progress.spinner(&format!("Testing {}", name));
            let reachable = factory.test_provider(capability, &name).await;
            progress.finish_and_clear();
            formatter.format_test(capability, &name, reachable, &mut stdout)?;
            if reachable {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_UNREACHABLE)
            }
        }
        Command::SearchHotels(search) => {
            search_hotels(&factory, &tenant, search, &mut progress, formatter.as_ref(), &mut stdout)
                .await?;
            ExitCode::SUCCESS
        }
        Command::SearchFlights(search) => {
            search_flights(&factory, &tenant, search, &mut progress, formatter.as_ref(), &mut stdout)
                .await?;
            ExitCode::SUCCESS
        }
        Command::SearchActivities(search) => {
            search_activities(&factory, &tenant, search, &mut progress, formatter.as_ref(), &mut stdout)
                .await?;
            ExitCode::SUCCESS
        }
    };

    stdout.flush()?;
    Ok(exit_code)
}

/// Install the stderr log subscriber
///
/// `-v` forces debug; otherwise `RUST_LOG` wins over the settings file.
fn init_logging(level: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Build the factory over the file store and load the tenant's configuration
async fn open_factory(
    args: &CliArgs,
    settings: &AppSettings,
) -> Result<(ProviderFactory, Tenant), AppError> {
    let store_dir = args
        .store
        .clone()
        .unwrap_or_else(|| settings.store_dir.clone());
    let tenant = Tenant::from(args.user.clone().or_else(|| settings.default_user.clone()));

    let factory = ProviderFactory::new(
        ProviderRegistry::with_defaults(),
        Arc::new(FileStore::new(store_dir)),
    )
    .with_default_settings(settings.provider_defaults());
    factory.load_configurations(&tenant).await?;
    Ok((factory, tenant))
}

async fn configure_provider(
    factory: &ProviderFactory,
    tenant: &Tenant,
    args: ConfigureArgs,
    formatter: &dyn OutputFormatter,
    writer: &mut dyn Write,
) -> anyhow::Result<()> {
    if factory.registry().capabilities_of(&args.name).is_empty() {
        bail!("unknown provider '{}'", args.name);
    }

    let mut config = factory
        .provider_config(&args.name)
        .unwrap_or_else(|| ProviderConfig::new(args.name.clone()));
    for (key, value) in args.credentials {
        config.credentials.insert(key, value);
    }
    for (key, value) in &args.settings {
        config
            .settings
            .apply(key, value)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid setting '{}'", key))?;
    }
    config.enabled = !args.disabled;

    factory.set_provider_config(&args.name, config);
    factory.save_configurations(tenant).await?;

    if let Some(description) = factory.describe_provider(&args.name) {
        formatter.format_provider(&description, writer)?;
    }
    Ok(())
}

async fn search_hotels(
    factory: &ProviderFactory,
    tenant: &Tenant,
    args: HotelSearchArgs,
    progress: &mut Progress,
    formatter: &dyn OutputFormatter,
    writer: &mut dyn Write,
) -> anyhow::Result<()> {
    let provider = factory.get_hotel_provider(args.provider.as_deref(), tenant)?;
    let mut criteria = HotelSearchCriteria::new(args.destination, args.check_in, args.check_out);
    criteria.rooms = args.rooms;
    criteria.adults = args.adults;
    criteria.children = args.children;

    progress.spinner(&format!("Searching {}", provider.name()));
    let result = provider.search(&criteria).await;
    progress.finish_and_clear();

    formatter.format_hotels(&result?, writer)?;
    Ok(())
}

async fn search_flights(
    factory: &ProviderFactory,
    tenant: &Tenant,
    args: FlightSearchArgs,
    progress: &mut Progress,
    formatter: &dyn OutputFormatter,
    writer: &mut dyn Write,
) -> anyhow::Result<()> {
    let provider = factory.get_flight_provider(args.provider.as_deref(), tenant)?;
    let mut criteria = match args.return_date {
        Some(return_date) => {
            FlightSearchCriteria::round_trip(args.origin, args.destination, args.departure, return_date)
        }
        None => FlightSearchCriteria::one_way(args.origin, args.destination, args.departure),
    };
    criteria.adults = args.adults;
    criteria.children = args.children;
    criteria.seniors = args.seniors;
    criteria.cabin_class = args.cabin;

    progress.spinner(&format!("Searching {}", provider.name()));
    let result = provider.search(&criteria).await;
    progress.finish_and_clear();

    formatter.format_flights(&result?, writer)?;
    Ok(())
}

async fn search_activities(
    factory: &ProviderFactory,
    tenant: &Tenant,
    args: ActivitySearchArgs,
    progress: &mut Progress,
    formatter: &dyn OutputFormatter,
    writer: &mut dyn Write,
) -> anyhow::Result<()> {
    let provider = factory.get_activity_provider(args.provider.as_deref(), tenant)?;
    let mut criteria = ActivitySearchCriteria::new(args.destination);
    criteria.start_date = args.start;
    criteria.end_date = args.end;

    progress.spinner(&format!("Searching {}", provider.name()));
    let result = provider.search(&criteria).await;
    progress.finish_and_clear();

    formatter.format_activities(&result?, writer)?;
    Ok(())
}
