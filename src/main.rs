//! Spiral Shapes - randomized parametric curves, drawn progressively
//!
//! CLI commands:
//! - gui: Launch native viewer
//! - play: Run one curve headless, optionally saving a snapshot / PNG
//! - actions: List dispatchable action names

mod commands;
mod config;
mod curve;
mod gui;
mod logging;
mod playback;
mod session;
mod sink;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{Action, ACTIONS};
use crate::curve::{AxisInfluence, Dimension, Projection, ShapeInfluence};
use crate::session::Session;
use crate::sink::export::{export_png, ExportOptions};
use crate::sink::persist::save_snapshot;
use crate::sink::TracingSink;

#[derive(Parser)]
#[command(name = "spiral_shapes")]
#[command(about = "Randomized spiral curves, drawn batch by batch")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to shapes.yaml config
    #[arg(short, long, default_value = "shapes.yaml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch native viewer
    Gui,

    /// Generate and play one curve without a window
    Play {
        /// RNG seed for a reproducible curve
        #[arg(long)]
        seed: Option<u64>,

        /// circle | square | triangle
        #[arg(long)]
        shape: Option<String>,

        /// spiral | random
        #[arg(long)]
        axis: Option<String>,

        /// 2d | 3d
        #[arg(long)]
        dimension: Option<String>,

        /// Pause after this many batches (stays paused unless --resume)
        #[arg(long)]
        pause_after: Option<usize>,

        /// Resume after pausing and play to the end
        #[arg(long)]
        resume: bool,

        /// Undo this many batches at the end
        #[arg(long, default_value = "0")]
        undo: usize,

        /// Actions to dispatch before playing, by name
        #[arg(long = "action")]
        actions: Vec<String>,

        /// Restore a saved snapshot before playing
        #[arg(long)]
        load: Option<PathBuf>,

        /// Write a JSON snapshot here
        #[arg(long)]
        save: Option<PathBuf>,

        /// Write a PNG here
        #[arg(long)]
        png: Option<PathBuf>,

        /// Zoom factor for the PNG (0.1 - 2.0)
        #[arg(long, default_value = "1.0")]
        zoom: f64,
    },

    /// List dispatchable action names
    Actions,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::Config::load_or_default(&cli.config)?;
    let _guard = logging::init_logging(&config.log_dir)?;
    tracing::info!("Spiral Shapes starting up");
    tracing::info!(
        "Config: {} samples over {}π, batch size {}",
        config.sample_count,
        config.turns,
        config.batch_size()
    );

    match cli.command {
        Commands::Gui => {
            tracing::info!("Launching native viewer");
            gui::run_viewer(config)?;
        }

        Commands::Play {
            seed,
            shape,
            axis,
            dimension,
            pause_after,
            resume,
            undo,
            actions,
            load,
            save,
            png,
            zoom,
        } => {
            let mut session = match seed {
                Some(seed) => Session::with_seed(&config, seed),
                None => Session::new(&config),
            };

            if let Some(path) = load {
                session.load_from(&path)?;
            }

            let mut plan: Vec<Action> = Vec::new();
            if let Some(name) = dimension {
                let dim = Dimension::from_string(&name)
                    .ok_or_else(|| anyhow::anyhow!("Unknown dimension: {}", name))?;
                if dim != session.state().dimension {
                    plan.push(Action::ToggleDimension);
                }
            }
            if let Some(name) = shape {
                let shape = ShapeInfluence::from_string(&name)
                    .ok_or_else(|| anyhow::anyhow!("Unknown shape: {}", name))?;
                if shape != ShapeInfluence::None {
                    plan.push(Action::Shape(shape));
                }
            }
            if let Some(name) = axis {
                let axis = AxisInfluence::from_string(&name)
                    .ok_or_else(|| anyhow::anyhow!("Unknown axis mode: {}", name))?;
                if axis != AxisInfluence::Spiral {
                    plan.push(Action::Axis(axis));
                }
            }
            if let Some(name) = actions.iter().find(|name| Action::from_name(name).is_none()) {
                anyhow::bail!("Unknown action: {} (see `actions`)", name);
            }

            for action in plan {
                let outcome = session.dispatch(action);
                tracing::debug!("{} -> {:?}", action.name(), outcome);
            }
            for name in &actions {
                let outcome = session.dispatch_named(name);
                tracing::debug!("{} -> {:?}", name, outcome);
            }
            if session.playback().params().is_none() {
                session.next_pattern();
            }

            let mut sink = TracingSink {
                pause_after,
                ..TracingSink::default()
            };
            let batches = session.run(&mut sink);
            println!("Played {} batches ({} points)", batches, sink.points);

            if let Some(angle) = session.state().last_emitted_angle {
                println!("Paused at theta = {:.4}", angle);
                if resume {
                    sink.pause_after = None;
                    session.resume();
                    let more = session.run(&mut sink);
                    println!("Resumed: {} more batches ({} points total)", more, sink.points);
                }
            }

            for _ in 0..undo {
                if session.undo_into(&mut sink).is_none() {
                    break;
                }
            }
            if undo > 0 {
                println!("Render log after undo: {} batches", session.playback().render_log().len());
            }

            if let Some(params) = session.playback().params() {
                println!(
                    "Curve: k={} shape={} axis={} dimension={:?}",
                    params.frequency_multiplier,
                    params.shape.name(),
                    params.axis.name(),
                    session.state().dimension
                );
            }

            if let Some(path) = save {
                save_snapshot(&session.snapshot(), &path)?;
                println!("Snapshot -> {:?}", path);
            }

            if let Some(path) = png {
                let options = ExportOptions {
                    zoom,
                    projection: Projection::default(),
                    ..ExportOptions::default()
                };
                if let Err(e) = export_png(
                    &path,
                    session.playback().render_log(),
                    session.playback().curve(),
                    &session.view(),
                    &options,
                ) {
                    log_error!(e, path = ?path);
                    return Err(e.into());
                }
                println!("PNG -> {:?}", path);
            }
        }

        Commands::Actions => {
            println!("Available actions ({}):", ACTIONS.len());
            for (name, _) in ACTIONS {
                println!("  - {}", name);
            }
        }
    }

    Ok(())
}
