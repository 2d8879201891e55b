use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use clap::{Parser, Subcommand};
use family_santa::config::Settings;
use family_santa::report::AssignmentReport;
use family_santa::routes::{self, AppState};
use family_santa::services::{export_to_file, load_roster};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Family Santa - assign a gift giver to every member of the family
#[derive(Debug, Parser)]
#[command(name = "family-santa")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compute the assignment, print it and export the workbook
    Run {
        /// Roster file (.toml or .json)
        #[arg(short, long)]
        roster: Option<PathBuf>,

        /// Workbook output path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the spreadsheet export
        #[arg(long)]
        no_export: bool,
    },

    /// Serve the HTTP API
    Serve,
}

fn init_logging(settings: &Settings) {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn main() -> std::process::ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return std::process::ExitCode::FAILURE;
        }
    };

    init_logging(&settings);
    info!("Configuration loaded successfully");

    let outcome = match cli.command.unwrap_or(Command::Run {
        roster: None,
        output: None,
        no_export: false,
    }) {
        Command::Run { roster, output, no_export } => run_once(&settings, roster, output, no_export),
        Command::Serve => serve(settings),
    };

    match outcome {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

fn run_once(
    settings: &Settings,
    roster_path: Option<PathBuf>,
    output: Option<PathBuf>,
    no_export: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let roster_path = roster_path.unwrap_or_else(|| settings.roster_path());
    let roster = load_roster(&roster_path)?;
    info!("Roster loaded from {} ({} families)", roster_path.display(), roster.families.len());

    let assigner = settings.assigner();
    let result = assigner.assign(&roster)?;
    let report = AssignmentReport::from_assignment(&result.assignment);

    print!("{}", report);

    if !no_export && settings.export.enabled {
        let path = output.unwrap_or_else(|| PathBuf::from(&settings.export.path));
        export_to_file(&report, &path)?;
        println!();
        println!("Results exported to {}", path.display());
    }

    Ok(())
}

fn serve(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let roster = load_roster(settings.roster_path())?;
    info!("Roster loaded ({} families)", roster.families.len());

    let app_state = AppState {
        roster: Arc::new(roster),
        assigner: settings.assigner(),
        max_participants: settings.search.max_participants,
    };

    info!("Assigner initialized with weights: {:?}", app_state.assigner.weights());

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            let cors = Cors::permissive();

            App::new()
                .app_data(web::Data::new(app_state.clone()))
                .app_data(routes::json_config())
                .wrap(cors)
                .wrap(middleware::Logger::default())
                .wrap(middleware::Compress::default())
                .configure(routes::configure_routes)
        })
        .workers(workers)
        .bind((host, port))?
        .run()
        .await
    })?;

    Ok(())
}
