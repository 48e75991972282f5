//! Geometric helpers in screen space.
//!
//! Headings are in degrees and unbounded; they are only ever consumed through
//! `cos`/`sin`, so no normalization is needed. Screen space has y growing
//! downward, which is why every direction is taken at `360 - angle`: a positive
//! heading change turns the car counter-clockwise on screen.

use geo::Coord;

/// Heading offsets of the four body corners around the car's centre, in degrees.
pub const CORNER_OFFSETS: [f32; 4] = [30.0, 150.0, 210.0, 330.0];

/// Unit direction vector for a screen-space heading in degrees.
pub fn heading_vector(heading_degrees: f32) -> Coord<f32> {
    let radians = (360.0 - heading_degrees).to_radians();
    Coord {
        x: radians.cos(),
        y: radians.sin(),
    }
}

/// Point at `distance` from `origin` along a screen-space heading.
pub fn project(origin: Coord<f32>, heading_degrees: f32, distance: f32) -> Coord<f32> {
    origin + heading_vector(heading_degrees) * distance
}

/// The four body corners of a car centred at `center`, `radius` away from it.
pub fn body_corners(center: Coord<f32>, heading_degrees: f32, radius: f32) -> [Coord<f32>; 4] {
    CORNER_OFFSETS.map(|offset| project(center, heading_degrees + offset, radius))
}

/// Clamps a value into `[min, max]` without panicking: `min` wins if the
/// bounds cross, and NaN collapses to `min`.
pub fn clamp_lenient(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max.max(min))
}
