mod cli;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use pagewin::fetch::{ImageFileProviderBuilder, ImagePayload};
use pagewin::scanner::collect_images;
use pagewin::{
    BackAction, DataSet, FetchState, ProviderConfig, Session, SessionBuilder, SessionConfig,
};
use tracing::{error, info, warn};

use crate::cli::{Cli, Command};

/// Upper bound for the `wait` command.
const WAIT_LIMIT: Duration = Duration::from_secs(10);

type Gallery = Session<PathBuf, pagewin::fetch::ImageFileProvider>;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pagewin=info".parse().unwrap()),
        )
        .init();

    if let Err(e) = run(Cli::parse()) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let files = collect_images(&cli.paths, cli.file_list.as_deref(), &cli.scan_config())?;
    if files.is_empty() {
        warn!("No image files found.");
        return Ok(());
    }

    let provider_config = ProviderConfig::from_env();
    let provider = ImageFileProviderBuilder::new()
        .workers(cli.workers.unwrap_or(provider_config.workers))
        .memory_entries(provider_config.memory_entries)
        .build()?;

    let env_config = SessionConfig::from_env();
    let config = SessionConfig {
        start_index: cli.start,
        radius: cli.radius.unwrap_or(env_config.radius),
        boundary: cli.boundary,
        zoom_allowed: !cli.no_zoom,
        swipe_to_dismiss_allowed: !cli.no_swipe_dismiss,
    };

    let data = DataSet::with_formatter(files, |p: &PathBuf| p.to_string_lossy().into_owned());
    let mut session = SessionBuilder::new(data)
        .config(config)
        .on_image_change(|position| info!(position, "Image changed"))
        .on_dismiss(|| info!("Viewer dismissed"))
        .build(provider)
        .context("Failed to open gallery")?;

    session.on_ready(|event| match &event.outcome {
        Ok(image) => info!(
            identifier = %event.identifier,
            indices = ?event.indices,
            width = image.width,
            height = image.height,
            "Image ready"
        ),
        Err(e) => warn!(identifier = %event.identifier, cause = %e.cause, "Image failed"),
    });

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    print_status(&mut stdout, &session)?;

    for line in stdin.lock().lines() {
        let line = line.context("Failed to read command")?;
        if line.trim().is_empty() {
            continue;
        }
        session.pump();

        let command = match line.parse::<Command>() {
            Ok(c) => c,
            Err(e) => {
                writeln!(stdout, "error: {e}")?;
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        if let Err(e) = execute(&mut session, &command) {
            writeln!(stdout, "error: {e}")?;
        }
        print_status(&mut stdout, &session)?;

        if !session.is_showing() {
            break;
        }
    }

    Ok(())
}

fn execute(session: &mut Gallery, command: &Command) -> Result<()> {
    let current = session.current_index();
    match *command {
        Command::Next => {
            session.move_by(1)?;
        }
        Command::Prev => {
            session.move_by(-1)?;
        }
        Command::Goto(index) => {
            session.move_to(index)?;
        }
        Command::Step(delta) => {
            session.move_by(delta)?;
        }
        Command::Zoom(scale) => {
            session.set_scale(current, scale)?;
        }
        Command::Reset => {
            session.reset_scale(current);
        }
        Command::Back => {
            if session.handle_back() == BackAction::ResetScale {
                info!(index = current, "Zoom reset");
            }
        }
        Command::Swipe => {
            if !session.swipe_dismiss() {
                info!("Swipe ignored");
            }
        }
        Command::Retry => {
            session.retry(current)?;
        }
        Command::Wait => wait_for_current(session),
        Command::State | Command::Quit => {}
    }
    session.pump();
    Ok(())
}

fn wait_for_current(session: &mut Gallery) {
    let deadline = Instant::now() + WAIT_LIMIT;
    while session.state().is_pending() {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            warn!("Timed out waiting for {}", session.current_identifier());
            break;
        }
        session.pump_timeout(remaining);
    }
}

fn print_status(out: &mut impl Write, session: &Gallery) -> Result<()> {
    let index = session.current_index();
    let detail = match session.state() {
        FetchState::Ready(image) => dimensions(&image),
        FetchState::Failed(e) => e.cause,
        _ => String::new(),
    };
    writeln!(
        out,
        "{}/{} {} scale={:.2} cached={} {} {}",
        index + 1,
        session.len(),
        session.state().label(),
        session.get_scale(index),
        session.cache().entry_count(),
        session.current_identifier(),
        detail,
    )?;
    Ok(())
}

fn dimensions(image: &ImagePayload) -> String {
    format!("{}x{}", image.width, image.height)
}
