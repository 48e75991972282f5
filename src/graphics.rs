use evo_drive::simulation::generation::Generation;
use evo_drive::simulation::geometric_utils::project;
use evo_drive::simulation::track::TrackMask;
use evo_drive::simulation::vehicle::Vehicle;
use geo::Coord;
use macroquad::prelude::*;

const RAY_COLOR: Color = Color::new(0.0, 1.0, 0.0, 1.0);
const CAR_COLOR: Color = Color::new(0.85, 0.2, 0.2, 1.0);
const LEADER_COLOR: Color = Color::new(0.1, 0.3, 0.9, 1.0);

/// Uniform scale fitting the track into the window, anchored top-left.
pub struct Viewport {
    scale: f32,
}

impl Viewport {
    pub fn fit(track: &TrackMask) -> Self {
        let track_w = track.width() as f32;
        let track_h = track.height() as f32;
        let scale = (screen_width() / track_w).min(screen_height() / track_h);
        Self { scale }
    }
}

trait ToScreen {
    type Output;
    fn to_screen(&self, viewport: &Viewport) -> Self::Output;
}

impl ToScreen for Coord<f32> {
    type Output = Vec2;
    fn to_screen(&self, viewport: &Viewport) -> Vec2 {
        vec2(self.x, self.y) * viewport.scale
    }
}

impl ToScreen for f32 {
    type Output = f32;
    fn to_screen(&self, viewport: &Viewport) -> f32 {
        self * viewport.scale
    }
}

pub fn draw_track(texture: &Texture2D, viewport: &Viewport) {
    draw_texture_ex(
        texture,
        0.0,
        0.0,
        WHITE,
        DrawTextureParams {
            dest_size: Some(vec2(texture.width(), texture.height()) * viewport.scale),
            ..Default::default()
        },
    );
}

pub fn draw_vehicles(generation: &Generation, viewport: &Viewport) {
    let leader = generation.best_index();
    for (i, vehicle) in generation.vehicles().iter().enumerate() {
        if !vehicle.is_alive() {
            continue;
        }
        let color = if i == leader { LEADER_COLOR } else { CAR_COLOR };
        draw_body(vehicle, color, viewport);
        draw_sensors(vehicle, viewport);
    }
}

fn draw_body(vehicle: &Vehicle, color: Color, viewport: &Viewport) {
    // corners are in angular order, so the quad is convex
    let [a, b, c, d] = vehicle.corners.map(|corner| corner.to_screen(viewport));
    draw_triangle(a, b, c, color);
    draw_triangle(a, c, d, color);

    // nose marker along the heading
    let center = vehicle.center().to_screen(viewport);
    let nose = project(vehicle.center(), vehicle.heading, vehicle.speed.clamp(1.0, 30.0))
        .to_screen(viewport);
    draw_line(center.x, center.y, nose.x, nose.y, 2.0, BLACK);
}

fn draw_sensors(vehicle: &Vehicle, viewport: &Viewport) {
    let center = vehicle.center().to_screen(viewport);
    let dot_radius = 5.0_f32.to_screen(viewport).max(1.5);
    for reading in &vehicle.sensors {
        let hit = reading.hit_point.to_screen(viewport);
        draw_line(center.x, center.y, hit.x, hit.y, 1.0, RAY_COLOR);
        draw_circle(hit.x, hit.y, dot_radius, RAY_COLOR);
    }
}

/// Generation number and survivor count, centred near the middle of the track.
pub fn draw_hud(generation: &Generation, viewport: &Viewport) {
    let lines = [
        (
            format!("Generation: {}", generation.number()),
            30.0_f32,
            Coord { x: 900.0, y: 450.0 },
        ),
        (
            format!("Still Alive: {}", generation.still_alive()),
            20.0,
            Coord { x: 900.0, y: 490.0 },
        ),
    ];
    for (text, size, anchor) in lines {
        let font_size = size.to_screen(viewport).max(10.0);
        let dims = measure_text(&text, None, font_size as u16, 1.0);
        let at = anchor.to_screen(viewport);
        draw_text(
            &text,
            at.x - dims.width / 2.0,
            at.y + dims.height / 2.0,
            font_size,
            BLACK,
        );
    }
}
