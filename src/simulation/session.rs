//! Training session: the outer loop around generations.
//!
//! The session owns everything that outlives a single generation: the
//! parameters, the track, the population, the statistics and the generation
//! counter. A headless run calls [`Session::run`]; a renderer instead calls
//! [`Session::begin_generation`], then [`Session::advance`] once or more per
//! frame, then [`Session::complete_generation`].

use tracing::{debug, info};

use super::errors::{CheckpointError, ConfigError, SimulationError};
use super::event_log::{EventKind, EventLog};
use super::evolution::Population;
use super::generation::{Generation, TickOutcome};
use super::params::Params;
use super::statistics::{GenerationReport, Statistics};
use super::track::TrackMask;

/// State carried across generations.
#[derive(Debug, Clone)]
pub struct Session {
    params: Params,
    track: TrackMask,
    population: Population,
    statistics: Statistics,
    event_log: EventLog,
    generation: u32,
}

impl Session {
    /// Starts a session with a fresh random population.
    pub fn new(params: Params, track: TrackMask) -> Result<Self, ConfigError> {
        params.validate()?;
        let population = Population::new(&params);
        Ok(Self::from_parts(params, track, population))
    }

    /// Starts a session from an existing population, e.g. a checkpoint.
    ///
    /// Every genome must map the sensor inputs to the action outputs.
    pub fn with_population(
        params: Params,
        track: TrackMask,
        population: Population,
    ) -> Result<Self, CheckpointError> {
        population.check_layout()?;
        Ok(Self::from_parts(params, track, population))
    }

    fn from_parts(params: Params, track: TrackMask, population: Population) -> Self {
        let event_log = EventLog::new(params.event_log_size);
        Self {
            params,
            track,
            population,
            statistics: Statistics::default(),
            event_log,
            generation: 0,
        }
    }

    /// Parameters in use.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// The shared track mask.
    pub fn track(&self) -> &TrackMask {
        &self.track
    }

    /// The current population.
    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Reports of every completed generation.
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Recent events, newest first.
    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    /// Number of the most recently started generation; 0 before the first.
    pub fn generation_number(&self) -> u32 {
        self.generation
    }

    /// Bumps the generation counter and spawns one car per genome.
    pub fn begin_generation(&mut self) -> Generation {
        self.generation += 1;
        self.population.reset_fitness();
        self.event_log.log(
            self.generation,
            0,
            format!("Generation {} started", self.generation),
            EventKind::Generation,
        );
        Generation::new(self.generation, self.population.len(), &self.params)
    }

    /// Runs one tick of `generation` against the population's genomes.
    pub fn advance(&mut self, generation: &mut Generation) -> Result<TickOutcome, SimulationError> {
        let outcome = generation.step(self.population.genomes(), &self.track, &self.params)?;

        for &car in generation.last_crashes() {
            let tick = generation.tick();
            debug!(generation = generation.number(), car, tick, "car crashed");
            self.event_log.log(
                generation.number(),
                tick,
                format!("Car {} crashed", car),
                EventKind::Crash,
            );
        }

        Ok(outcome)
    }

    /// Hands the fitness back to the population, records the report and
    /// breeds the next population.
    pub fn complete_generation(&mut self, generation: Generation) -> GenerationReport {
        let outcome = generation.finish();
        self.population.assign_fitness(&outcome.fitness);
        let report = outcome.report;

        let seconds = report.ticks as f32 / self.params.ticks_per_second.max(1) as f32;
        info!(
            generation = report.generation,
            ticks = report.ticks,
            seconds,
            survivors = report.survivors,
            termination = %report.termination,
            best_fitness = report.best_fitness,
            mean_fitness = report.mean_fitness,
            best_distance = report.best_distance,
            "generation finished"
        );

        self.event_log.log(
            report.generation,
            report.ticks,
            format!(
                "Generation {} ended ({}), best fitness {:.0}",
                report.generation, report.termination, report.best_fitness
            ),
            EventKind::Generation,
        );
        if self.statistics.record(report.clone()) {
            self.event_log.log(
                report.generation,
                report.ticks,
                format!("New best fitness {:.0}", report.best_fitness),
                EventKind::Record,
            );
        }

        self.population.evolve(self.generation, &self.params);
        report
    }

    /// Runs one generation to completion without rendering.
    pub fn run_generation(&mut self) -> Result<GenerationReport, SimulationError> {
        let mut generation = self.begin_generation();
        while self.advance(&mut generation)?.is_running() {}
        Ok(self.complete_generation(generation))
    }

    /// Runs up to `max_generations` generations, stopping early once a
    /// generation's best fitness reaches the configured threshold.
    pub fn run(&mut self, max_generations: u32) -> Result<Vec<GenerationReport>, SimulationError> {
        let mut reports = Vec::new();
        for _ in 0..max_generations {
            let report = self.run_generation()?;
            let solved = self
                .params
                .fitness_threshold
                .is_some_and(|threshold| report.best_fitness >= threshold);
            reports.push(report);
            if solved {
                info!(generation = self.generation, "fitness threshold reached");
                break;
            }
        }
        Ok(reports)
    }

    /// Saves the current population to a JSON checkpoint.
    pub fn save_checkpoint(&self, path: &str) -> Result<(), CheckpointError> {
        self.population.save_to_file(path)
    }
}
