use anyhow::{Context, Result, bail};
use clap::Parser;
use evo_drive::simulation::evolution::Population;
use evo_drive::simulation::generation::Generation;
use evo_drive::simulation::params::Params;
use evo_drive::simulation::session::Session;
use evo_drive::simulation::track::TrackMask;
use image::RgbaImage;
use macroquad::prelude::*;
use tracing::{error, info, warn};

mod graphics;
mod ui;

/// Evolve neural-network drivers on a bitmap race track.
#[derive(Debug, Parser)]
#[command(name = "evo-drive", version)]
struct Cli {
    /// JSON parameter file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<String>,
    /// Track image; pixels of the boundary colour are walls.
    #[arg(short, long, default_value = "map.png")]
    track: String,
    /// Maximum number of generations to run.
    #[arg(short, long, default_value_t = 1000)]
    generations: u32,
    /// Run without a window, as fast as possible.
    #[arg(long)]
    headless: bool,
    /// Save the population here after every generation.
    #[arg(long)]
    checkpoint: Option<String>,
    /// Resume from a previously saved population.
    #[arg(long)]
    resume: Option<String>,
    /// Write per-generation statistics here when training ends.
    #[arg(long)]
    stats: Option<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let params = match &cli.config {
        Some(path) => Params::load_from_file(path)
            .with_context(|| format!("failed to load parameters from {path}"))?,
        None => Params::default(),
    };

    let track_image = image::open(&cli.track)
        .with_context(|| format!("failed to open track image {}", cli.track))?
        .to_rgba8();
    let track = TrackMask::from_image(&track_image, params.boundary_color)
        .context("failed to build track mask")?;
    if track.boundary_count() == 0 {
        warn!(
            color = ?params.boundary_color,
            "track has no boundary pixels; only the tick budget will end generations"
        );
    }
    info!(
        width = track.width(),
        height = track.height(),
        population = params.population_size,
        "loaded track"
    );

    let session = match &cli.resume {
        Some(path) => {
            params.validate()?;
            let population = Population::load_from_file(path)
                .with_context(|| format!("failed to resume from {path}"))?;
            info!(genomes = population.len(), path = %path, "resumed population");
            Session::with_population(params, track, population)?
        }
        None => Session::new(params, track)?,
    };

    if cli.headless {
        run_headless(session, &cli)
    } else {
        let conf = Conf {
            window_title: "Evo Drive".to_owned(),
            window_width: 1280,
            window_height: 720,
            window_resizable: true,
            ..Default::default()
        };
        macroquad::Window::from_config(conf, run_windowed(session, track_image, cli));
        Ok(())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

fn run_headless(mut session: Session, cli: &Cli) -> Result<()> {
    if cli.generations == 0 {
        bail!("--generations must be at least 1");
    }
    for _ in 0..cli.generations {
        let report = session.run_generation()?;
        save_checkpoint(&session, cli.checkpoint.as_deref());

        let solved = session
            .params()
            .fitness_threshold
            .is_some_and(|threshold| report.best_fitness >= threshold);
        if solved {
            info!(generation = report.generation, "fitness threshold reached");
            break;
        }
    }
    if let Some(best) = session.statistics().best_ever() {
        info!(best_fitness = best, "training finished");
    }
    save_statistics(&session, cli.stats.as_deref());
    Ok(())
}

fn save_checkpoint(session: &Session, path: Option<&str>) {
    let Some(path) = path else {
        return;
    };
    if let Err(e) = session.save_checkpoint(path) {
        warn!(path, error = %e, "failed to save checkpoint");
    }
}

fn save_statistics(session: &Session, path: Option<&str>) {
    let Some(path) = path else {
        return;
    };
    match session.statistics().save_to_file(path) {
        Ok(()) => info!(path, "saved statistics"),
        Err(e) => warn!(path, error = %e, "failed to save statistics"),
    }
}

async fn run_windowed(mut session: Session, track_image: RgbaImage, cli: Cli) {
    let texture = Texture2D::from_rgba8(
        track_image.width() as u16,
        track_image.height() as u16,
        track_image.as_raw(),
    );
    let mut ui_state = ui::UIState::new();
    let mut generation = session.begin_generation();

    loop {
        if is_key_pressed(KeyCode::Escape) {
            info!("quit requested");
            save_statistics(&session, cli.stats.as_deref());
            std::process::exit(0);
        }

        for _ in 0..ui_state.ticks_per_frame {
            match session.advance(&mut generation) {
                Ok(outcome) if outcome.is_running() => {}
                Ok(_) => {
                    let finished = std::mem::replace(
                        &mut generation,
                        Generation::with_vehicles(0, Vec::new()),
                    );
                    let report = session.complete_generation(finished);
                    save_checkpoint(&session, cli.checkpoint.as_deref());
                    ui_state.status_message = Some(format!(
                        "Generation {} best fitness {:.0}",
                        report.generation, report.best_fitness
                    ));

                    let solved = session
                        .params()
                        .fitness_threshold
                        .is_some_and(|threshold| report.best_fitness >= threshold);
                    if solved || session.generation_number() >= cli.generations {
                        info!(generation = report.generation, "training finished");
                        save_statistics(&session, cli.stats.as_deref());
                        std::process::exit(0);
                    }
                    generation = session.begin_generation();
                    break;
                }
                Err(e) => {
                    error!(error = %e, "simulation step failed");
                    std::process::exit(1);
                }
            }
        }

        clear_background(WHITE);
        let viewport = graphics::Viewport::fit(session.track());
        if ui_state.rendering_enabled {
            graphics::draw_track(&texture, &viewport);
            graphics::draw_vehicles(&generation, &viewport);
        }
        graphics::draw_hud(&generation, &viewport);

        ui::draw_ui(&mut ui_state, &session, &generation);
        egui_macroquad::draw();

        next_frame().await;
    }
}
