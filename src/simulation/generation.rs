//! Lockstep evaluation of a whole population for one generation.
//!
//! Every tick, each living car asks its controller for a decision, applies
//! it, moves, and earns fitness if it survived the move. The generation ends as
//! soon as no car is left alive, or unconditionally once the tick budget is
//! spent. Cars never interact, so the per-car work runs in parallel; the
//! outcome does not depend on scheduling.

use rayon::prelude::*;

use super::brain::Controller;
use super::errors::SimulationError;
use super::params::Params;
use super::statistics::{GenerationReport, Termination};
use super::track::TrackMask;
use super::vehicle::{Action, Vehicle};

/// Result of a single [`Generation::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// At least one car is alive and ticks remain.
    Running,
    /// The generation is over.
    Finished(Termination),
}

impl TickOutcome {
    /// Whether the generation should keep stepping.
    pub fn is_running(self) -> bool {
        matches!(self, TickOutcome::Running)
    }
}

/// Final fitness values and summary of a finished generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOutcome {
    /// Accumulated fitness, one entry per car, in car order.
    pub fitness: Vec<f64>,
    /// Summary of the run.
    pub report: GenerationReport,
}

/// State of one generation in progress.
#[derive(Debug, Clone)]
pub struct Generation {
    number: u32,
    vehicles: Vec<Vehicle>,
    fitness: Vec<f64>,
    tick: u32,
    still_alive: usize,
    best_index: usize,
    termination: Option<Termination>,
    last_crashes: Vec<usize>,
}

impl Generation {
    /// Spawns `population_size` cars at the configured spawn point.
    pub fn new(number: u32, population_size: usize, params: &Params) -> Self {
        let vehicles = (0..population_size)
            .map(|id| Vehicle::new(id, params))
            .collect();
        Self::with_vehicles(number, vehicles)
    }

    /// Starts a generation from pre-placed cars.
    pub fn with_vehicles(number: u32, vehicles: Vec<Vehicle>) -> Self {
        let still_alive = vehicles.iter().filter(|v| v.is_alive()).count();
        Self {
            number,
            fitness: vec![0.0; vehicles.len()],
            vehicles,
            tick: 0,
            still_alive,
            best_index: 0,
            termination: None,
            last_crashes: Vec::new(),
        }
    }

    /// Generation number.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Ticks simulated so far.
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Cars alive after the latest tick.
    pub fn still_alive(&self) -> usize {
        self.still_alive
    }

    /// Index of the car with the greatest distance travelled so far.
    pub fn best_index(&self) -> usize {
        self.best_index
    }

    /// All cars, alive or not, in controller order.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Fitness accumulated so far, in controller order.
    pub fn fitness(&self) -> &[f64] {
        &self.fitness
    }

    /// Cars that crashed during the latest tick.
    pub fn last_crashes(&self) -> &[usize] {
        &self.last_crashes
    }

    /// Why the generation ended, if it has.
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Whether the generation has ended.
    pub fn is_finished(&self) -> bool {
        self.termination.is_some()
    }

    /// Advances every living car by one tick.
    ///
    /// `controllers[i]` drives car `i`. Stepping a finished generation is a
    /// no-op that reports the same termination again.
    pub fn step<C: Controller>(
        &mut self,
        controllers: &[C],
        track: &TrackMask,
        params: &Params,
    ) -> Result<TickOutcome, SimulationError> {
        if controllers.len() != self.vehicles.len() {
            return Err(SimulationError::ControllerCountMismatch {
                expected: self.vehicles.len(),
                actual: controllers.len(),
            });
        }
        if let Some(termination) = self.termination {
            return Ok(TickOutcome::Finished(termination));
        }
        if self.still_alive == 0 {
            return Ok(self.finish_with(Termination::AllCrashed));
        }

        let was_alive: Vec<bool> = self.vehicles.iter().map(Vehicle::is_alive).collect();

        self.vehicles
            .par_iter_mut()
            .zip(self.fitness.par_iter_mut())
            .zip(controllers.par_iter())
            .filter(|((vehicle, _), _)| vehicle.is_alive())
            .for_each(|((vehicle, fitness), controller)| {
                let outputs = controller.evaluate(&vehicle.sensor_vector(params));
                vehicle.apply_action(Action::select(&outputs), params);
                vehicle.tick(track, params);
                if vehicle.is_alive() {
                    *fitness += vehicle.fitness_contribution();
                }
            });

        self.tick += 1;
        self.last_crashes.clear();
        for (i, vehicle) in self.vehicles.iter().enumerate() {
            if !was_alive[i] {
                continue;
            }
            if !vehicle.is_alive() {
                self.last_crashes.push(i);
            }
            if vehicle.distance_traveled > self.vehicles[self.best_index].distance_traveled {
                self.best_index = i;
            }
        }
        self.still_alive = self.vehicles.iter().filter(|v| v.is_alive()).count();

        if self.still_alive == 0 {
            Ok(self.finish_with(Termination::AllCrashed))
        } else if self.tick >= params.tick_budget {
            Ok(self.finish_with(Termination::TickBudget))
        } else {
            Ok(TickOutcome::Running)
        }
    }

    /// Steps until the generation ends and returns how it ended.
    pub fn run<C: Controller>(
        &mut self,
        controllers: &[C],
        track: &TrackMask,
        params: &Params,
    ) -> Result<Termination, SimulationError> {
        loop {
            if let TickOutcome::Finished(termination) = self.step(controllers, track, params)? {
                return Ok(termination);
            }
        }
    }

    /// Consumes the generation and hands back its fitness values and report.
    ///
    /// A generation that never finished is reported as stopped by its budget.
    pub fn finish(self) -> GenerationOutcome {
        let termination = self.termination.unwrap_or(Termination::TickBudget);
        let best_distance = self
            .vehicles
            .get(self.best_index)
            .map_or(0.0, |v| v.distance_traveled);
        let report = GenerationReport::from_fitness(
            self.number,
            self.tick,
            self.still_alive,
            termination,
            &self.fitness,
            best_distance,
            self.best_index,
        );
        GenerationOutcome {
            fitness: self.fitness,
            report,
        }
    }

    fn finish_with(&mut self, termination: Termination) -> TickOutcome {
        self.termination = Some(termination);
        TickOutcome::Finished(termination)
    }
}
