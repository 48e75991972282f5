//! # Evo Drive - Neuroevolution of Top-Down Driving Controllers
//!
//! A population of cars, each driven by its own neural network, races around a
//! bitmap track. Every car senses the track edges with five distance rays,
//! turns or changes speed according to its controller, and dies on contact
//! with the track boundary. The distance covered becomes the controller's
//! fitness, and the fittest controllers breed the next generation.
//!
//! ## Features
//!
//! - Bitmap track mask with edge-clamped sampling
//! - Five-ray distance sensors and corner-based collision
//! - Discrete-action kinematic car model
//! - Lockstep generation evaluator with a tick budget
//! - MLP controllers evolved by selection, crossover and mutation
//! - Per-generation statistics and a recent-event log
//! - Headless runs or real-time visualization with macroquad/egui
//!
//! ## Core Modules
//!
//! - [`simulation::track`] - Track mask loaded from an image
//! - [`simulation::sensor`] - Ray casting and collision tests
//! - [`simulation::vehicle`] - Car state, actions and per-tick update
//! - [`simulation::generation`] - Lockstep evaluation of one generation
//! - [`simulation::brain`] - Controller trait and neural network brains
//! - [`simulation::evolution`] - Population of genomes and reproduction
//! - [`simulation::session`] - Generation counter and the outer training loop

/// Core simulation logic and data structures.
pub mod simulation {
    /// Controller contract and neural network implementation.
    pub mod brain;
    /// Error types for configuration, track loading and simulation.
    pub mod errors;
    /// Recent-event log for display.
    pub mod event_log;
    /// Genomes, population and reproduction.
    pub mod evolution;
    /// Lockstep evaluation of a population for one generation.
    pub mod generation;
    /// Heading and rotation helpers in screen-space degrees.
    pub mod geometric_utils;
    /// Simulation parameters.
    pub mod params;
    /// Ray casting sensors and corner collision.
    pub mod sensor;
    /// Training session owning the generation counter.
    pub mod session;
    /// Per-generation reports and fitness history.
    pub mod statistics;
    /// Boundary mask of the race track.
    pub mod track;
    /// Car state and kinematics.
    pub mod vehicle;
}
