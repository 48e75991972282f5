use egui_macroquad::egui;
use evo_drive::simulation::generation::Generation;
use evo_drive::simulation::session::Session;

use super::events::draw_events_panel;
use super::stats::draw_fitness_plot;

pub struct UIState {
    pub stats_panel_width: f32,
    pub status_message: Option<String>,
    /// Simulation ticks advanced per rendered frame.
    pub ticks_per_frame: usize,
    pub rendering_enabled: bool,
    pub show_events: bool,
}

impl UIState {
    pub fn new() -> Self {
        Self {
            stats_panel_width: 300.0,
            status_message: None,
            ticks_per_frame: 1, // real time at 60 fps
            rendering_enabled: true,
            show_events: true,
        }
    }
}

pub fn draw_ui(state: &mut UIState, session: &Session, generation: &Generation) {
    egui_macroquad::ui(|egui_ctx| {
        let mut visuals = egui::Visuals::dark();
        visuals.override_text_color = Some(egui::Color32::from_rgb(240, 240, 240));
        egui_ctx.set_visuals(visuals);

        draw_stats_panel(egui_ctx, state, session, generation);

        if state.show_events {
            draw_events_panel(egui_ctx, session.event_log());
        }
    });
}

fn draw_stats_panel(
    egui_ctx: &egui::Context,
    state: &mut UIState,
    session: &Session,
    generation: &Generation,
) {
    let params = session.params();

    egui::SidePanel::right("stats_panel")
        .default_width(state.stats_panel_width)
        .resizable(true)
        .show(egui_ctx, |ui| {
            ui.heading("Training");
            ui.separator();

            ui.horizontal(|ui| {
                let button_text = if state.rendering_enabled {
                    "🎨 Rendering: ON"
                } else {
                    "🎨 Rendering: OFF"
                };
                if ui.button(button_text).clicked() {
                    state.rendering_enabled = !state.rendering_enabled;
                }
                ui.checkbox(&mut state.show_events, "Events");
            });

            if let Some(ref msg) = state.status_message {
                ui.label(msg);
            }

            ui.separator();

            ui.label("Simulation Speed");
            ui.add(egui::Slider::new(&mut state.ticks_per_frame, 1..=100).text("ticks/frame"));

            ui.separator();

            let seconds = generation.tick() as f32 / params.ticks_per_second.max(1) as f32;
            ui.label(format!("Generation: {}", generation.number()));
            ui.label(format!(
                "Tick: {}/{} ({:.1}s)",
                generation.tick(),
                params.tick_budget,
                seconds
            ));
            ui.label(format!(
                "Still alive: {}/{}",
                generation.still_alive(),
                generation.vehicles().len()
            ));

            if let Some(leader) = generation.vehicles().get(generation.best_index()) {
                ui.label(format!(
                    "Leader: car {} ({:.0} px, speed {:.0})",
                    leader.id, leader.distance_traveled, leader.speed
                ));
            }

            ui.separator();

            let statistics = session.statistics();
            if let Some(best) = statistics.best_ever() {
                ui.label(format!("Best fitness ever: {:.0}", best));
            }
            if let Some(last) = statistics.last() {
                ui.label(format!(
                    "Last generation: best {:.0}, mean {:.0}, {} survivors ({})",
                    last.best_fitness, last.mean_fitness, last.survivors, last.termination
                ));
            }

            ui.collapsing("📈 Fitness", |ui| {
                draw_fitness_plot(ui, statistics);
            });

            ui.collapsing("⚙ Parameters", |ui| {
                ui.label(format!("Population: {}", session.population().len()));
                ui.label(format!("Network layout: {:?}", params.layer_sizes()));
                ui.label(format!("Elitism: {}", params.elitism));
                ui.label(format!("Survival threshold: {:.2}", params.survival_threshold));
                ui.label(format!(
                    "Mutation scale: {}..{}",
                    params.mutation_scale_min, params.mutation_scale_max
                ));
            });
        });
}
