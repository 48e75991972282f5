use egui_macroquad::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};
use evo_drive::simulation::statistics::Statistics;

pub(super) fn draw_fitness_plot(ui: &mut egui::Ui, statistics: &Statistics) {
    if statistics.reports().is_empty() {
        ui.label("Waiting for the first generation...");
        return;
    }

    let best: PlotPoints = statistics.best_fitness_series().into_iter().collect();
    let mean: PlotPoints = statistics.mean_fitness_series().into_iter().collect();

    Plot::new("fitness_plot")
        .height(180.0)
        .show_axes([true, true])
        .legend(Legend::default())
        .label_formatter(|name, value| {
            format!("{}\nGeneration: {:.0}\nFitness: {:.0}", name, value.x, value.y)
        })
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(best)
                    .color(egui::Color32::from_rgb(100, 200, 100))
                    .name("Best"),
            );
            plot_ui.line(
                Line::new(mean)
                    .color(egui::Color32::from_rgb(100, 150, 255))
                    .name("Mean"),
            );
        });
}
