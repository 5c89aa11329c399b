use anyhow::{Context, Result};
use clap::Parser;
use fuel_finder_usability::{
    cli::{Cli, Commands},
    error::{Level, UserFriendly},
    fuel::{FuelType, ResultLimit},
    render::{self, ResultsMode, ResultsView},
    ui::{self, Terminal},
    wizard::{Notice, SearchForm, Services},
    Config, Wizard,
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(cli.verbose)
        .and_then(|_| run(cli))
        .user_friendly()
    {
        e.display();
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Some(Commands::Init { output }) => {
            info!("Writing default configuration");
            init_command(output.clone())
        }
        Some(Commands::Lookup {
            location,
            fuel_types,
            limit,
            map,
        }) => {
            info!("Looking up stations near {}", location);
            lookup_command(&cli, location, fuel_types, *limit, *map)
        }
        None => run_wizard(&cli),
    }
}

fn setup_logging(verbosity: u8) -> Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn load_services(cli: &Cli) -> Result<Services> {
    info!("Loading configuration");
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    Services::new(&config).context("Failed to create API clients")
}

fn run_wizard(cli: &Cli) -> Result<()> {
    let services = load_services(cli)?;
    let mut wizard = Wizard::new(services);

    Terminal::new().run(&mut wizard)?;

    if let Some(record) = wizard.submitted() {
        info!(
            "Recorded feedback from {} (age {}, {}): durations {:?}, successes {:?}, {} chars of comment",
            record.name(),
            record.age().get(),
            record.difficulty(),
            record.durations(),
            record.successes(),
            record.comment().chars().count()
        );
    }
    Ok(())
}

fn lookup_command(
    cli: &Cli,
    location: &str,
    fuel_types: &[FuelType],
    limit: u32,
    map: bool,
) -> Result<()> {
    let services = load_services(cli)?;
    let form = SearchForm::new(location, fuel_types.to_vec(), ResultLimit::new(limit)?);

    let results = match services.lookup(&form) {
        Ok(results) => results,
        Err(e) if e.level() == Level::Error => return Err(e.into()),
        Err(e) => {
            ui::print_notice(&Notice::from(&e));
            return Ok(());
        }
    };

    let mode = if map { ResultsMode::Map } else { ResultsMode::Table };
    let view = ResultsView::new(form.location.trim(), &results);
    print!("{}", render::render_results(&view, mode)?);

    Ok(())
}

fn init_command(output: Option<PathBuf>) -> Result<()> {
    let config_path = match output {
        Some(path) => path,
        None => Config::default_config_path()?,
    };

    if config_path.exists() {
        warn!("Configuration already exists at {:?}", config_path);
        println!("Configuration file already exists at: {:?}", config_path);
        println!("Please remove it first if you want to regenerate.");
        return Ok(());
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let config_str =
        toml::to_string_pretty(&Config::default()).context("Failed to serialize config")?;

    std::fs::write(&config_path, config_str)
        .with_context(|| format!("Failed to write config to {:?}", config_path))?;

    println!("✓ Configuration created at: {:?}", config_path);

    println!("\nNext steps:");
    println!("1. Set the spreadsheet that collects feedback:");
    println!("   export FUEL_SHEET_ID='your-spreadsheet-id'");
    println!("   export GOOGLE_SHEETS_TOKEN='your-access-token'");
    println!("2. Optionally set your own station API key:");
    println!("   export NREL_API_KEY='your-key-here'");
    println!("3. Run 'fuel-usability' to start the usability test");

    Ok(())
}
