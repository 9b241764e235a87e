mod commands;
mod config;
mod ingest;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use generation_client::{GenerationClient, HttpGenerationClient, MissingGenerationClient};
use session_core::{
    AlwaysConfirm, ConfirmationPrompt, GenerationOutcome, SessionController, SessionEvent,
    SessionOptions, SkipReason,
};
use shared::domain::ViewMode;
use tokio::{runtime::Runtime, sync::broadcast::error::RecvError};
use tracing::{info, warn};

use crate::{
    commands::{parse_command, StudioCommand, HELP},
    config::load_settings,
};

#[derive(Parser, Debug)]
#[command(about = "Regenerate an image from a new viewpoint")]
struct Args {
    /// Settings file (defaults to ./studio.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Image to open right away
    #[arg(long)]
    image: Option<PathBuf>,
    /// Answer yes to confirmation prompts
    #[arg(long)]
    yes: bool,
}

struct StdinPrompt;

impl ConfirmationPrompt for StdinPrompt {
    fn confirm(&self, message: &str) -> bool {
        print!("{message} [y/N] ");
        let _ = io::stdout().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(args.config.as_deref())?;
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.as_str())
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build studio runtime")?;

    let client: Arc<dyn GenerationClient> = match &settings.endpoint {
        Some(endpoint) => {
            info!(endpoint = %endpoint, "studio: using generation endpoint");
            Arc::new(HttpGenerationClient::new(
                endpoint.clone(),
                settings.api_key.clone(),
                settings.request_timeout(),
            )?)
        }
        None => {
            warn!("studio: no generation endpoint configured; every generation will fail");
            Arc::new(MissingGenerationClient)
        }
    };
    let confirmation: Arc<dyn ConfirmationPrompt> = if args.yes {
        Arc::new(AlwaysConfirm)
    } else {
        Arc::new(StdinPrompt)
    };
    let session = SessionController::new_with_options(
        client,
        confirmation,
        SessionOptions {
            thumbnail_max_edge: settings.thumbnail_max_edge,
        },
    );

    spawn_notification_printer(&runtime, &session);

    if let Some(path) = &args.image {
        let payload = runtime.block_on(ingest::read_image(path))?;
        runtime.block_on(session.upload(payload));
        println!("opened {}", path.display());
    }

    println!("{HELP}");
    let stdin = io::stdin();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        if command == StudioCommand::Quit {
            break;
        }
        if let Err(err) = run_command(&runtime, &session, command) {
            println!("error: {err:#}");
        }
    }

    Ok(())
}

fn run_command(
    runtime: &Runtime,
    session: &Arc<SessionController>,
    command: StudioCommand,
) -> Result<()> {
    match command {
        StudioCommand::Upload(path) => {
            let payload = runtime.block_on(ingest::read_image(&path))?;
            runtime.block_on(session.upload(payload));
            println!("opened {}", path.display());
        }
        StudioCommand::Preset(preset) => {
            let session = Arc::clone(session);
            runtime.spawn(async move { report_outcome(session.apply_preset(preset).await) });
        }
        StudioCommand::Generate => {
            let session = Arc::clone(session);
            runtime.spawn(async move { report_outcome(session.generate().await) });
        }
        StudioCommand::Set { field, value } => {
            let current = runtime.block_on(session.snapshot()).active_transformation;
            if !runtime.block_on(session.adjust_transformation(field.apply(current, value))) {
                println!("upload an image first");
            }
        }
        StudioCommand::Transform(transformation) => {
            if !runtime.block_on(session.adjust_transformation(transformation)) {
                println!("upload an image first");
            }
        }
        StudioCommand::History => {
            let snapshot = runtime.block_on(session.snapshot());
            if snapshot.history.is_empty() {
                println!("no generated views yet");
            }
            for item in &snapshot.history {
                println!(
                    "{:>15}  {}  {}",
                    item.id,
                    item.timestamp.format("%H:%M:%S"),
                    item.description
                );
            }
        }
        StudioCommand::Select(id) => {
            if !runtime.block_on(session.select_history_by_id(id)) {
                println!("no generated view with id {id}");
            }
        }
        StudioCommand::Clear => {
            if runtime.block_on(session.clear_history()) {
                println!("history cleared");
            }
        }
        StudioCommand::Home => runtime.block_on(session.go_home()),
        StudioCommand::Status => print_status(runtime, session),
        StudioCommand::Project(name) => {
            let project = runtime.block_on(session.project(name));
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        StudioCommand::Help => println!("{HELP}"),
        StudioCommand::Quit => {}
    }
    Ok(())
}

fn print_status(runtime: &Runtime, session: &SessionController) {
    let snapshot = runtime.block_on(session.snapshot());
    let t = snapshot.active_transformation;
    let mode = match snapshot.view_mode {
        ViewMode::Landing => "landing",
        ViewMode::Editor => "editor",
    };
    println!("mode: {mode}");
    println!(
        "controls: rx={} ry={} rz={} zoom={} distortion={} light={}",
        t.rotate_x, t.rotate_y, t.rotate_z, t.zoom, t.distortion, t.lighting_angle
    );
    println!(
        "result: {}",
        if snapshot.current_result.is_some() {
            "generated view"
        } else if snapshot.source_image.is_some() {
            "original image"
        } else {
            "none"
        }
    );
    println!("history: {} view(s)", snapshot.history.len());
    if snapshot.is_generating {
        println!("generation in progress...");
    }
}

fn report_outcome(outcome: GenerationOutcome) {
    match outcome {
        GenerationOutcome::Completed(item) => {
            println!("\n{} ready (id {})", item.description, item.id)
        }
        GenerationOutcome::Skipped(SkipReason::AlreadyGenerating) => {
            println!("\na generation is already in progress")
        }
        GenerationOutcome::Skipped(SkipReason::NoSourceImage | SkipReason::NotInEditor) => {
            println!("\nupload an image first")
        }
        // reported through the failure notification
        GenerationOutcome::Failed => {}
    }
}

fn spawn_notification_printer(runtime: &Runtime, session: &SessionController) {
    let mut events = session.subscribe_events();
    runtime.spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::GenerationFailed { message }) => eprintln!("\n{message}"),
                Ok(SessionEvent::GenerationStarted { preset }) => match preset {
                    Some(preset) => println!("generating {preset} view..."),
                    None => println!("generating custom view..."),
                },
                Ok(_) => {}
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });
}
