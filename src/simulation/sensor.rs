//! Distance sensors and collision against the track mask.
//!
//! A car carries five rays spread over its forward half-plane. Each ray walks
//! outward one pixel at a time until it reaches a boundary cell or its maximum
//! range. The order of [`SENSOR_ANGLES`] is the order of the controller inputs.

use geo::Coord;

use super::geometric_utils::heading_vector;
use super::track::TrackMask;

/// Number of distance sensors per car.
pub const SENSOR_COUNT: usize = 5;

/// Sensor offsets relative to the car heading, in degrees.
pub const SENSOR_ANGLES: [f32; SENSOR_COUNT] = [-90.0, -45.0, 0.0, 45.0, 90.0];

/// Quantized distances fed to a controller, one slot per sensor angle.
pub type SensorVector = [f32; SENSOR_COUNT];

/// Result of a single ray cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Where the ray stopped.
    pub hit_point: Coord<f32>,
    /// Distance from the ray origin to `hit_point`.
    pub distance: f32,
}

impl SensorReading {
    /// Distance in whole `quantum` units, as seen by the controller.
    pub fn quantized(&self, quantum: f32) -> f32 {
        (self.distance / quantum).floor()
    }
}

/// Casts a ray from `origin` at `heading + offset` degrees.
///
/// The ray advances in unit steps and stops on the first boundary cell or once
/// `max_range` is reached. The direction is a unit vector, so the step count is
/// the Euclidean distance to the returned point.
pub fn cast_ray(
    origin: Coord<f32>,
    heading_degrees: f32,
    offset_degrees: f32,
    track: &TrackMask,
    max_range: f32,
) -> SensorReading {
    let direction = heading_vector(heading_degrees + offset_degrees);
    let mut length = 0.0_f32;
    let mut point = origin;

    while !track.is_boundary(point.x, point.y) && length < max_range {
        length += 1.0;
        point = origin + direction * length;
    }

    SensorReading {
        hit_point: point,
        distance: length,
    }
}

/// Casts all sensor rays of a car, in [`SENSOR_ANGLES`] order, into `readings`.
///
/// `readings` is cleared first; it never accumulates across ticks.
pub fn scan(
    readings: &mut Vec<SensorReading>,
    origin: Coord<f32>,
    heading_degrees: f32,
    track: &TrackMask,
    max_range: f32,
) {
    readings.clear();
    readings.extend(
        SENSOR_ANGLES
            .iter()
            .map(|&offset| cast_ray(origin, heading_degrees, offset, track, max_range)),
    );
}

/// Builds the controller input from the latest readings.
///
/// Slots without a reading stay 0.
pub fn quantize(readings: &[SensorReading], quantum: f32) -> SensorVector {
    let mut vector = [0.0; SENSOR_COUNT];
    for (slot, reading) in vector.iter_mut().zip(readings) {
        *slot = reading.quantized(quantum);
    }
    vector
}

/// Whether any body corner sits on a boundary cell.
pub fn corners_collide(corners: &[Coord<f32>; 4], track: &TrackMask) -> bool {
    corners
        .iter()
        .any(|corner| track.is_boundary(corner.x, corner.y))
}
