// UI module - egui panels drawn on top of the track

mod events;
mod stats;
mod ui;

// Re-export the public interface
pub use ui::{UIState, draw_ui};
