use egui_macroquad::egui;
use evo_drive::simulation::event_log::{EventKind, EventLog};

/// Draws a transparent panel showing recent events
pub fn draw_events_panel(egui_ctx: &egui::Context, event_log: &EventLog) {
    let screen_height = egui_ctx.screen_rect().height();
    let panel_height = 300.0;

    egui::Window::new("Recent Events")
        .fixed_pos(egui::pos2(10.0, screen_height - panel_height - 10.0))
        .fixed_size(egui::vec2(320.0, panel_height))
        .frame(
            egui::Frame::window(&egui_ctx.style())
                .fill(egui::Color32::from_rgba_premultiplied(20, 20, 30, 200))
                .stroke(egui::Stroke::new(
                    1.0,
                    egui::Color32::from_rgb(100, 100, 120),
                )),
        )
        .show(egui_ctx, |ui| {
            ui.vertical(|ui| {
                ui.spacing_mut().item_spacing.y = 4.0;

                if event_log.is_empty() {
                    ui.label(
                        egui::RichText::new("No events yet...")
                            .color(egui::Color32::from_rgb(150, 150, 150))
                            .size(12.0),
                    );
                    return;
                }

                for event in event_log.events() {
                    let color = match event.kind {
                        EventKind::Crash => egui::Color32::from_rgb(255, 100, 100),
                        EventKind::Generation => egui::Color32::from_rgb(100, 200, 255),
                        EventKind::Record => egui::Color32::from_rgb(100, 255, 100),
                    };

                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new(format!("[G{} t{}]", event.generation, event.tick))
                                .color(egui::Color32::from_rgb(180, 180, 200))
                                .size(11.0)
                                .monospace(),
                        );
                        ui.label(
                            egui::RichText::new(&event.description)
                                .color(color)
                                .size(11.0),
                        );
                    });
                }
            });
        });
}
