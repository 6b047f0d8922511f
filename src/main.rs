mod ui;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use egui::Vec2;
use log::{error, info, warn};

use race_replay::api::{HttpReplayApi, ReplayApi};
use race_replay::ReplayError;
use race_replay::session::{
    Session, SessionRequest, SessionType, load_session_file, save_session_file,
};
use ui::ReplayApp;
use ui::config::AppConfig;

const WINDOW_TITLE: &str = "Race Replay";

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Browse the sessions served by a replay API
    View {
        /// Base URL of the replay API
        #[arg(short, long)]
        server: Option<String>,

        /// Season to load on start, requires --round
        #[arg(short, long, requires = "round")]
        year: Option<i32>,

        #[arg(short, long, requires = "year")]
        round: Option<u32>,

        /// R for the race, S for the sprint
        #[arg(short = 't', long, default_value_t = SessionType::Race)]
        session_type: SessionType,
    },
    /// Replay a session saved to disk
    Open {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Download a session to disk without opening a window
    Fetch {
        #[arg(short, long)]
        year: i32,

        #[arg(short, long)]
        round: u32,

        #[arg(short = 't', long, default_value_t = SessionType::Race)]
        session_type: SessionType,

        #[arg(short, long)]
        output: PathBuf,

        #[arg(short, long)]
        server: Option<String>,
    },
}

fn load_config(server: Option<&str>) -> AppConfig {
    let mut app_config = AppConfig::from_local_file().unwrap_or_default();
    if let Some(server) = server {
        app_config.server_url = server.to_string();
    }
    app_config
}

fn replay_api(app_config: &AppConfig) -> Result<Arc<dyn ReplayApi>, ReplayError> {
    info!("Using replay API at {}", app_config.server_url);
    let api = HttpReplayApi::new(&app_config.server_url, app_config.request_timeout())?;
    Ok(Arc::new(api))
}

fn run_viewer(
    app_config: AppConfig,
    request: Option<SessionRequest>,
    session: Option<Session>,
) -> Result<(), ReplayError> {
    let api = replay_api(&app_config)?;

    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_title(WINDOW_TITLE)
        .with_inner_size(Vec2::new(1280., 800.))
        .with_min_inner_size(Vec2::new(640., 400.));

    eframe::run_native(
        WINDOW_TITLE,
        native_options,
        Box::new(move |cc| {
            let mut app = ReplayApp::new(cc, app_config, api);
            if let Some(session) = session {
                app = app.with_session(session);
            }
            if let Some(request) = request {
                app = app.with_request(request);
            }
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| ReplayError::GuiError {
        reason: e.to_string(),
    })
}

fn view(
    server: Option<&str>,
    year: Option<i32>,
    round: Option<u32>,
    session_type: SessionType,
) -> Result<(), ReplayError> {
    let request = match (year, round) {
        (None, None) => None,
        _ => Some(SessionRequest::from_selection(year, round, session_type)?),
    };
    run_viewer(load_config(server), request, None)
}

fn open(input: &Path) -> Result<(), ReplayError> {
    let session = load_session_file(input)?;
    run_viewer(load_config(None), None, Some(session))
}

fn fetch(request: SessionRequest, output: &Path, server: Option<&str>) -> Result<(), ReplayError> {
    let app_config = load_config(server);
    let api = replay_api(&app_config)?;

    info!(
        "Fetching {} round {} ({})",
        request.year,
        request.round_number,
        request.session_type.label()
    );
    let session = api.session(&request)?;
    save_session_file(output, &session)?;
    println!(
        "Saved {} ({} frames) to {}",
        session.session_info.event_name,
        session.frames.len(),
        output.display()
    );
    Ok(())
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    }) {
        warn!("Could not set Ctrl-C handler: {}", e);
    }

    let result = match &cli.command {
        Commands::View {
            server,
            year,
            round,
            session_type,
        } => view(server.as_deref(), *year, *round, *session_type),
        Commands::Open { input } => open(input),
        Commands::Fetch {
            year,
            round,
            session_type,
            output,
            server,
        } => SessionRequest::from_selection(Some(*year), Some(*round), *session_type)
            .and_then(|request| fetch(request, output, server.as_deref())),
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
