//! Error types for the simulation library.
//!
//! Only configuration and track loading are fatal; everything that can go
//! wrong inside a generation is handled locally by the simulation itself.

use thiserror::Error;

/// Failure to load, save or validate simulation parameters.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The parameter file could not be read or written.
    #[error("failed to access parameter file: {0}")]
    Io(#[from] std::io::Error),
    /// The parameter file is not valid JSON for [`super::params::Params`].
    #[error("failed to parse parameters: {0}")]
    Parse(#[from] serde_json::Error),
    /// A parameter holds a value the simulation cannot run with.
    #[error("invalid parameter `{name}`: {reason}")]
    Invalid {
        /// Name of the offending field.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            name,
            reason: reason.into(),
        }
    }
}

/// Failure to build a track mask.
#[derive(Debug, Error)]
pub enum TrackError {
    /// The track image could not be opened or decoded.
    #[error("failed to load track image: {0}")]
    Image(#[from] image::ImageError),
    /// The track has no pixels.
    #[error("track mask must not be empty (got {width}x{height})")]
    Empty {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },
    /// A raw pixel buffer does not match the declared dimensions.
    #[error("pixel buffer holds {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferSize {
        /// Declared width.
        width: usize,
        /// Declared height.
        height: usize,
        /// Expected number of bytes.
        expected: usize,
        /// Number of bytes supplied.
        actual: usize,
    },
}

/// Failure while stepping a generation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimulationError {
    /// The number of controllers does not match the number of vehicles.
    #[error("generation has {expected} vehicles but {actual} controllers were supplied")]
    ControllerCountMismatch {
        /// Number of vehicles in the generation.
        expected: usize,
        /// Number of controllers passed to the step.
        actual: usize,
    },
}

/// Failure to save or restore a population checkpoint.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// The checkpoint file could not be read or written.
    #[error("failed to access checkpoint: {0}")]
    Io(#[from] std::io::Error),
    /// The checkpoint is not valid JSON for a population.
    #[error("failed to (de)serialize checkpoint: {0}")]
    Json(#[from] serde_json::Error),
    /// The checkpoint contains no genomes.
    #[error("checkpoint contains no genomes")]
    Empty,
    /// A genome's network does not map the sensor inputs to the action outputs.
    #[error("genome {id} has layer sizes {sizes:?}, expected {inputs} inputs and {outputs} outputs")]
    Layout {
        /// Identifier of the offending genome.
        id: usize,
        /// Layer sizes found in the checkpoint.
        sizes: Vec<usize>,
        /// Required input width.
        inputs: usize,
        /// Required output width.
        outputs: usize,
    },
}
