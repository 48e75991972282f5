//! Car state, discrete actions and per-tick kinematics.
//!
//! A car lives for one generation. It starts alive, moves every tick along its
//! heading, and dies the first time one of its body corners touches a boundary
//! cell. A dead car is frozen: neither actions nor ticks change it again.

use geo::Coord;
use serde::{Deserialize, Serialize};

use super::geometric_utils::{body_corners, clamp_lenient, heading_vector};
use super::params::Params;
use super::sensor::{self, SensorReading, SensorVector};
use super::track::TrackMask;

/// Number of discrete actions a controller chooses between.
pub const ACTION_COUNT: usize = 4;

/// Discrete driving action, indexed by controller output position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Increase the heading by one turn step.
    TurnLeft,
    /// Decrease the heading by one turn step.
    TurnRight,
    /// Lose one speed step unless that would drop below the minimum speed.
    SlowDown,
    /// Gain one speed step. There is no upper limit.
    SpeedUp,
}

impl Action {
    /// All actions in controller output order.
    pub const ALL: [Action; ACTION_COUNT] = [
        Action::TurnLeft,
        Action::TurnRight,
        Action::SlowDown,
        Action::SpeedUp,
    ];

    /// Position of this action in the controller output vector.
    pub fn index(self) -> usize {
        match self {
            Action::TurnLeft => 0,
            Action::TurnRight => 1,
            Action::SlowDown => 2,
            Action::SpeedUp => 3,
        }
    }

    /// The action at `index`, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Picks the action with the strictly greatest output.
    ///
    /// Ties go to the lowest index, and NaN outputs never win.
    pub fn select(outputs: &[f32; ACTION_COUNT]) -> Self {
        let mut best = 0;
        for (i, &value) in outputs.iter().enumerate().skip(1) {
            if value > outputs[best] || (outputs[best].is_nan() && !value.is_nan()) {
                best = i;
            }
        }
        Self::ALL[best]
    }
}

/// A single car driven by one controller for one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    /// Index of the car within its generation.
    pub id: usize,
    /// Top-left anchor of the car body.
    pub position: Coord<f32>,
    /// Heading in degrees, unbounded.
    pub heading: f32,
    /// Distance moved per tick.
    pub speed: f32,
    /// Latest sensor readings in sensor-angle order; empty before the first tick.
    pub sensors: Vec<SensorReading>,
    /// Body corners from the latest tick.
    pub corners: [Coord<f32>; 4],
    /// Total distance moved while alive.
    pub distance_traveled: f32,
    /// Ticks this car was integrated; the crash tick for a dead car.
    pub ticks_alive: u32,
    alive: bool,
    extent: f32,
}

impl Vehicle {
    /// Creates a car at the configured spawn point.
    pub fn new(id: usize, params: &Params) -> Self {
        let [x, y] = params.spawn_position;
        Self::spawn_at(id, Coord { x, y }, params.spawn_heading, params)
    }

    /// Creates a car at an explicit anchor and heading.
    pub fn spawn_at(id: usize, position: Coord<f32>, heading: f32, params: &Params) -> Self {
        let extent = params.vehicle_extent;
        let center = position + Coord {
            x: extent / 2.0,
            y: extent / 2.0,
        };
        Self {
            id,
            position,
            heading,
            speed: params.initial_speed,
            sensors: Vec::with_capacity(sensor::SENSOR_COUNT),
            corners: body_corners(center, heading, extent / 2.0),
            distance_traveled: 0.0,
            ticks_alive: 0,
            alive: true,
            extent,
        }
    }

    /// Whether the car is still driving.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Centre of the car body.
    pub fn center(&self) -> Coord<f32> {
        self.position
            + Coord {
                x: self.extent / 2.0,
                y: self.extent / 2.0,
            }
    }

    /// Applies a controller decision. Ignored once the car is dead.
    pub fn apply_action(&mut self, action: Action, params: &Params) {
        if !self.alive {
            return;
        }
        match action {
            Action::TurnLeft => self.heading += params.turn_step,
            Action::TurnRight => self.heading -= params.turn_step,
            Action::SlowDown => {
                if self.speed - params.speed_step >= params.min_speed {
                    self.speed -= params.speed_step;
                }
            }
            Action::SpeedUp => self.speed += params.speed_step,
        }
    }

    /// Advances the car by one tick: move, clamp, collide, re-sense.
    ///
    /// Does nothing once the car is dead.
    pub fn tick(&mut self, track: &TrackMask, params: &Params) {
        if !self.alive {
            return;
        }

        self.position = self.position + heading_vector(self.heading) * self.speed;
        self.position.x = clamp_lenient(self.position.x, params.position_min, track.width() as f32);
        self.position.y =
            clamp_lenient(self.position.y, params.position_min, track.height() as f32);

        self.distance_traveled += self.speed;
        self.ticks_alive += 1;

        let center = self.center();
        self.corners = body_corners(center, self.heading, self.extent / 2.0);

        if sensor::corners_collide(&self.corners, track) {
            self.alive = false;
        }

        sensor::scan(
            &mut self.sensors,
            center,
            self.heading,
            track,
            params.sensor_range,
        );
    }

    /// Quantized sensor distances for the controller.
    pub fn sensor_vector(&self, params: &Params) -> SensorVector {
        sensor::quantize(&self.sensors, params.sensor_quantum)
    }

    /// Reward earned for the current tick: distance so far in half-body units.
    pub fn fitness_contribution(&self) -> f64 {
        f64::from(self.distance_traveled) / (f64::from(self.extent) / 2.0)
    }
}
