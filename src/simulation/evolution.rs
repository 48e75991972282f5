//! Population of genomes and generational reproduction.
//!
//! After each generation the genomes are ranked by fitness. The best few are
//! carried over unchanged, and the rest of the next population is bred from the
//! top fraction by crossover or by cloning with mutation.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::brain::{Brain, Controller};
use super::errors::CheckpointError;
use super::params::Params;
use super::sensor::{SENSOR_COUNT, SensorVector};
use super::vehicle::ACTION_COUNT;

/// One candidate controller and its fitness for the current generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    /// Unique identifier within the population's lifetime.
    pub id: usize,
    /// Network that drives the car.
    pub brain: Brain,
    /// Fitness accumulated during the current generation.
    pub fitness: f64,
    /// Generation this genome was bred in (0 for the initial population).
    pub birth_generation: u32,
}

impl Controller for Genome {
    fn evaluate(&self, sensors: &SensorVector) -> [f32; ACTION_COUNT] {
        self.brain.evaluate(sensors)
    }
}

/// How a genome of the next generation was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reproduction {
    /// Copied unchanged from the previous generation.
    Elite,
    /// Blend of two parents, lightly mutated.
    Crossover,
    /// Mutated copy of one parent.
    Clone,
}

/// The set of genomes evaluated together each generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Population {
    genomes: Vec<Genome>,
    next_id: usize,
}

impl Population {
    /// Creates `population_size` genomes with random brains.
    pub fn new(params: &Params) -> Self {
        let layer_sizes = params.layer_sizes();
        let genomes = (0..params.population_size)
            .map(|id| Genome {
                id,
                brain: Brain::new(&layer_sizes, params.weight_scale),
                fitness: 0.0,
                birth_generation: 0,
            })
            .collect();

        Self {
            genomes,
            next_id: params.population_size,
        }
    }

    /// Wraps existing genomes, e.g. from a checkpoint.
    pub fn from_genomes(genomes: Vec<Genome>) -> Self {
        let next_id = genomes.iter().map(|g| g.id + 1).max().unwrap_or(0);
        Self { genomes, next_id }
    }

    /// Genomes in car order.
    pub fn genomes(&self) -> &[Genome] {
        &self.genomes
    }

    /// Number of genomes.
    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    /// Whether the population is empty.
    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    /// Sets every fitness back to zero.
    pub fn reset_fitness(&mut self) {
        for genome in &mut self.genomes {
            genome.fitness = 0.0;
        }
    }

    /// Writes per-car fitness back onto the genomes, in car order.
    pub fn assign_fitness(&mut self, fitness: &[f64]) {
        for (genome, &value) in self.genomes.iter_mut().zip(fitness) {
            genome.fitness = value;
        }
    }

    /// The fittest genome of the current generation.
    pub fn champion(&self) -> Option<&Genome> {
        self.genomes
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
    }

    /// Replaces the population with the next generation.
    ///
    /// Returns how each new genome was produced, in population order.
    pub fn evolve(&mut self, generation: u32, params: &Params) -> Vec<Reproduction> {
        let mut ranked = std::mem::take(&mut self.genomes);
        ranked.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));

        let size = ranked.len();
        let elite_count = params.elitism.min(size);
        let parent_count = ((size as f32 * params.survival_threshold).ceil() as usize)
            .max(2)
            .min(size);

        let mut rng = rand::rng();
        let mut next = Vec::with_capacity(size);
        let mut methods = Vec::with_capacity(size);

        for elite in ranked.iter().take(elite_count) {
            let mut genome = elite.clone();
            genome.fitness = 0.0;
            next.push(genome);
            methods.push(Reproduction::Elite);
        }

        while next.len() < size {
            let mutation_scale =
                sample_mutation_scale(params.mutation_scale_min, params.mutation_scale_max);
            let first = rng.random_range(0..parent_count);

            let (brain, method) = if parent_count >= 2 && rng.random::<f32>() < params.crossover_rate
            {
                let mut second = rng.random_range(0..parent_count);
                while second == first {
                    second = rng.random_range(0..parent_count);
                }
                let weight = rng.random::<f32>();
                let mut brain =
                    Brain::crossover_weighted(&ranked[first].brain, &ranked[second].brain, weight);
                brain.mutate(mutation_scale * 0.5);
                (brain, Reproduction::Crossover)
            } else {
                let mut brain = ranked[first].brain.clone();
                brain.mutate(mutation_scale);
                (brain, Reproduction::Clone)
            };

            next.push(Genome {
                id: self.next_id,
                brain,
                fitness: 0.0,
                birth_generation: generation,
            });
            methods.push(method);
            self.next_id += 1;
        }

        debug!(
            generation,
            elites = elite_count,
            parents = parent_count,
            "bred next population"
        );

        self.genomes = next;
        methods
    }

    /// Saves the population to a JSON checkpoint.
    pub fn save_to_file(&self, path: &str) -> Result<(), CheckpointError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Loads a population from a JSON checkpoint.
    pub fn load_from_file(path: &str) -> Result<Self, CheckpointError> {
        let json = std::fs::read_to_string(path)?;
        let population: Self = serde_json::from_str(&json)?;
        if population.genomes.is_empty() {
            return Err(CheckpointError::Empty);
        }
        population.check_layout()?;
        Ok(population)
    }

    /// Fails on the first genome whose brain cannot drive a car.
    pub fn check_layout(&self) -> Result<(), CheckpointError> {
        match self
            .genomes
            .iter()
            .find(|genome| !genome.brain.fits(SENSOR_COUNT, ACTION_COUNT))
        {
            Some(genome) => Err(CheckpointError::Layout {
                id: genome.id,
                sizes: genome.brain.layer_sizes(),
                inputs: SENSOR_COUNT,
                outputs: ACTION_COUNT,
            }),
            None => Ok(()),
        }
    }
}

/// Samples a mutation scale log-uniformly from `[min, max)`.
fn sample_mutation_scale(min: f32, max: f32) -> f32 {
    let log_min = min.ln();
    let log_max = max.ln();
    rand::rng().random_range(log_min..log_max).exp()
}
