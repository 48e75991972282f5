use serde::{Deserialize, Serialize};
use tracing::warn;

use super::errors::ConfigError;
use super::sensor::SENSOR_COUNT;
use super::vehicle::ACTION_COUNT;

/// Simulation parameters that control vehicles, sensors and evolution.
///
/// Missing fields fall back to [`Params::default`] when loading from JSON, so a
/// config file only needs to list what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Side length of the square car body in pixels.
    pub vehicle_extent: f32,
    /// Speed every car starts a generation with.
    pub initial_speed: f32,
    /// Lowest speed a `SlowDown` action may reach.
    pub min_speed: f32,
    /// Speed change per `SlowDown`/`SpeedUp` action.
    pub speed_step: f32,
    /// Heading change per `TurnLeft`/`TurnRight` action, in degrees.
    pub turn_step: f32,
    /// Top-left anchor every car spawns at.
    pub spawn_position: [f32; 2],
    /// Heading every car spawns with, in degrees.
    pub spawn_heading: f32,
    /// Lower clamp applied to both position components after each move.
    pub position_min: f32,
    /// Maximum ray length of a sensor in pixels.
    pub sensor_range: f32,
    /// Pixels per unit of the quantized sensor value.
    pub sensor_quantum: f32,
    /// Hard cap on ticks per generation.
    pub tick_budget: u32,
    /// Nominal simulation rate, used for reporting elapsed time.
    pub ticks_per_second: u32,
    /// RGBA colour marking impassable track pixels.
    pub boundary_color: [u8; 4],
    /// Number of genomes per generation.
    pub population_size: usize,
    /// Hidden layer widths between the sensor inputs and the action outputs.
    pub hidden_layers: Vec<usize>,
    /// Half-width of the uniform distribution for initial weights.
    pub weight_scale: f32,
    /// Number of top genomes copied unchanged into the next generation.
    pub elitism: usize,
    /// Top fraction of the ranked population allowed to reproduce.
    pub survival_threshold: f32,
    /// Probability that an offspring is produced by crossover instead of cloning.
    pub crossover_rate: f32,
    /// Lower bound of the log-uniform mutation scale.
    pub mutation_scale_min: f32,
    /// Upper bound of the log-uniform mutation scale.
    pub mutation_scale_max: f32,
    /// Stop training once a generation's best fitness reaches this value.
    pub fitness_threshold: Option<f64>,
    /// Number of events kept in the recent-event log.
    pub event_log_size: usize,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            vehicle_extent: 60.0,
            initial_speed: 20.0,
            min_speed: 12.0,
            speed_step: 2.0,
            turn_step: 10.0,
            spawn_position: [830.0, 920.0],
            spawn_heading: 0.0,
            position_min: 20.0,
            sensor_range: 300.0,
            sensor_quantum: 30.0,
            tick_budget: 1200,
            ticks_per_second: 60,
            boundary_color: [255, 255, 255, 255],
            population_size: 30,
            hidden_layers: vec![6],
            weight_scale: 1.0,
            elitism: 2,
            survival_threshold: 0.2,
            crossover_rate: 0.5,
            mutation_scale_min: 0.002,
            mutation_scale_max: 0.5,
            fitness_threshold: None,
            event_log_size: 20,
        }
    }
}

impl Params {
    /// Full network layout: sensor inputs, hidden layers, action outputs.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden_layers.len() + 2);
        sizes.push(SENSOR_COUNT);
        sizes.extend(self.hidden_layers.iter().copied());
        sizes.push(ACTION_COUNT);
        sizes
    }

    /// Checks that every value is usable by the simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.vehicle_extent > 0.0) {
            return Err(ConfigError::invalid("vehicle_extent", "must be positive"));
        }
        if !(self.min_speed >= 0.0) {
            return Err(ConfigError::invalid("min_speed", "must not be negative"));
        }
        if self.initial_speed < self.min_speed {
            return Err(ConfigError::invalid(
                "initial_speed",
                format!("{} is below min_speed {}", self.initial_speed, self.min_speed),
            ));
        }
        if !(self.sensor_range >= 0.0) {
            return Err(ConfigError::invalid("sensor_range", "must not be negative"));
        }
        if !(self.sensor_quantum > 0.0) {
            return Err(ConfigError::invalid("sensor_quantum", "must be positive"));
        }
        if self.tick_budget == 0 {
            return Err(ConfigError::invalid("tick_budget", "must be at least 1"));
        }
        if self.population_size < 2 {
            return Err(ConfigError::invalid("population_size", "must be at least 2"));
        }
        if self.hidden_layers.contains(&0) {
            return Err(ConfigError::invalid(
                "hidden_layers",
                "hidden layers must have at least one neuron",
            ));
        }
        if !(self.weight_scale > 0.0) {
            return Err(ConfigError::invalid("weight_scale", "must be positive"));
        }
        if self.elitism >= self.population_size {
            return Err(ConfigError::invalid(
                "elitism",
                "must leave room for at least one offspring",
            ));
        }
        if !(self.survival_threshold > 0.0 && self.survival_threshold <= 1.0) {
            return Err(ConfigError::invalid("survival_threshold", "must be in (0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(ConfigError::invalid("crossover_rate", "must be in [0, 1]"));
        }
        if !(self.mutation_scale_min > 0.0 && self.mutation_scale_min < self.mutation_scale_max) {
            return Err(ConfigError::invalid(
                "mutation_scale_min",
                "must be positive and below mutation_scale_max",
            ));
        }
        if self.spawn_position[0] < self.position_min || self.spawn_position[1] < self.position_min
        {
            warn!(
                spawn = ?self.spawn_position,
                position_min = self.position_min,
                "spawn position lies below the position clamp; cars will jump on the first tick"
            );
        }
        Ok(())
    }

    /// Loads parameters from a JSON file and validates them.
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let params: Self = serde_json::from_str(&json)?;
        params.validate()?;
        Ok(params)
    }

    /// Saves the parameters to a JSON file.
    pub fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
