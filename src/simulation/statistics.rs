//! Per-generation reports and the fitness history across a session.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::CheckpointError;

/// Why a generation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// No car was left alive.
    AllCrashed,
    /// The tick budget ran out with cars still driving.
    TickBudget,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::AllCrashed => write!(f, "all crashed"),
            Termination::TickBudget => write!(f, "tick budget"),
        }
    }
}

/// Summary of one finished generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Generation number, starting at 1.
    pub generation: u32,
    /// Ticks simulated.
    pub ticks: u32,
    /// Cars still alive at the end.
    pub survivors: usize,
    /// Which exit ended the generation.
    pub termination: Termination,
    /// Highest accumulated fitness.
    pub best_fitness: f64,
    /// Mean accumulated fitness.
    pub mean_fitness: f64,
    /// Longest distance any car travelled.
    pub best_distance: f32,
    /// Index of the car that travelled furthest.
    pub best_vehicle: usize,
}

impl GenerationReport {
    /// Builds a report from raw fitness values.
    pub fn from_fitness(
        generation: u32,
        ticks: u32,
        survivors: usize,
        termination: Termination,
        fitness: &[f64],
        best_distance: f32,
        best_vehicle: usize,
    ) -> Self {
        let best_fitness = fitness.iter().copied().fold(0.0_f64, f64::max);
        let mean_fitness = if fitness.is_empty() {
            0.0
        } else {
            fitness.iter().sum::<f64>() / fitness.len() as f64
        };
        Self {
            generation,
            ticks,
            survivors,
            termination,
            best_fitness,
            mean_fitness,
            best_distance,
            best_vehicle,
        }
    }
}

/// History of generation reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Statistics {
    reports: Vec<GenerationReport>,
    best_ever: Option<f64>,
}

impl Statistics {
    /// Records a report. Returns `true` if it set a new best fitness.
    pub fn record(&mut self, report: GenerationReport) -> bool {
        let improved = self.best_ever.is_none_or(|best| report.best_fitness > best);
        if improved {
            self.best_ever = Some(report.best_fitness);
        }
        self.reports.push(report);
        improved
    }

    /// All reports in generation order.
    pub fn reports(&self) -> &[GenerationReport] {
        &self.reports
    }

    /// The most recent report.
    pub fn last(&self) -> Option<&GenerationReport> {
        self.reports.last()
    }

    /// Best fitness across every recorded generation.
    pub fn best_ever(&self) -> Option<f64> {
        self.best_ever
    }

    /// `(generation, best fitness)` pairs for plotting.
    pub fn best_fitness_series(&self) -> Vec<[f64; 2]> {
        self.reports
            .iter()
            .map(|r| [r.generation as f64, r.best_fitness])
            .collect()
    }

    /// `(generation, mean fitness)` pairs for plotting.
    pub fn mean_fitness_series(&self) -> Vec<[f64; 2]> {
        self.reports
            .iter()
            .map(|r| [r.generation as f64, r.mean_fitness])
            .collect()
    }

    /// Saves the history to a JSON file.
    pub fn save_to_file(&self, path: &str) -> Result<(), CheckpointError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
