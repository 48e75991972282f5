#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use evo_drive::simulation::brain::{Brain, Controller};
use evo_drive::simulation::errors::SimulationError;
use evo_drive::simulation::generation::{Generation, TickOutcome};
use evo_drive::simulation::params::Params;
use evo_drive::simulation::sensor::SensorVector;
use evo_drive::simulation::statistics::Termination;
use evo_drive::simulation::track::TrackMask;
use evo_drive::simulation::vehicle::{ACTION_COUNT, Vehicle};
use geo::Coord;

/// Always prefers one fixed action.
#[derive(Debug, Clone, Copy)]
struct Fixed(usize);

impl Controller for Fixed {
    fn evaluate(&self, _sensors: &SensorVector) -> [f32; ACTION_COUNT] {
        let mut outputs = [0.0; ACTION_COUNT];
        outputs[self.0] = 1.0;
        outputs
    }
}

const BRAKE: Fixed = Fixed(2);
const ACCELERATE: Fixed = Fixed(3);

#[test]
fn test_single_car_on_open_track_runs_full_budget() {
    let params = Params::default();
    let track = TrackMask::open(1920, 1080).unwrap();
    let mut generation = Generation::new(1, 1, &params);

    for tick in 1..=1200 {
        let outcome = generation.step(&[ACCELERATE], &track, &params).unwrap();
        assert_eq!(generation.tick(), tick);
        assert_eq!(generation.still_alive(), 1);
        if tick < 1200 {
            assert_eq!(outcome, TickOutcome::Running);
        } else {
            assert_eq!(outcome, TickOutcome::Finished(Termination::TickBudget));
        }
    }

    let car = &generation.vehicles()[0];
    assert_eq!(car.distance_traveled, 1_465_200.0);
    assert_eq!(car.speed, 2420.0);
    assert!(car.is_alive());

    // fitness adds distance / 30 once per surviving tick
    let expected: f64 = (1..=1200_u64)
        .map(|k| (k * k + 21 * k) as f64 / 30.0)
        .sum();
    let fitness = generation.fitness()[0];
    assert!((fitness - expected).abs() < 1e-6, "{fitness} vs {expected}");

    let outcome = generation.finish();
    assert_eq!(outcome.report.ticks, 1200);
    assert_eq!(outcome.report.survivors, 1);
    assert_eq!(outcome.report.termination, Termination::TickBudget);
    assert_eq!(outcome.report.best_distance, 1_465_200.0);
}

/// Wall occupying the top-right of a 1400x1080 track.
fn corner_wall_track() -> TrackMask {
    TrackMask::from_fn(1400, 1080, |x, y| x >= 1000 && y < 400).unwrap()
}

#[test]
fn test_cars_crash_in_lockstep_and_generation_ends_on_budget() {
    let params = Params::default();
    let track = corner_wall_track();
    let vehicles = vec![
        Vehicle::spawn_at(0, Coord { x: 818.0, y: 100.0 }, 0.0, &params),
        Vehicle::spawn_at(1, Coord { x: 338.0, y: 250.0 }, 0.0, &params),
        Vehicle::spawn_at(2, Coord { x: 338.0, y: 500.0 }, 0.0, &params),
    ];
    let mut generation = Generation::with_vehicles(1, vehicles);
    let controllers = [BRAKE; 3];

    let mut crash_fitness = None;
    loop {
        let outcome = generation.step(&controllers, &track, &params).unwrap();
        match generation.tick() {
            1..=9 => assert_eq!(generation.still_alive(), 3),
            10 => {
                assert_eq!(generation.still_alive(), 2);
                assert_eq!(generation.last_crashes(), &[0]);
                crash_fitness = Some(generation.fitness()[0]);
            }
            11..=49 => {
                assert_eq!(generation.still_alive(), 2);
                assert!(generation.last_crashes().is_empty());
            }
            50 => {
                assert_eq!(generation.still_alive(), 1);
                assert_eq!(generation.last_crashes(), &[1]);
            }
            _ => assert_eq!(generation.still_alive(), 1),
        }
        if !outcome.is_running() {
            assert_eq!(outcome, TickOutcome::Finished(Termination::TickBudget));
            break;
        }
    }

    assert_eq!(generation.tick(), 1200);
    assert_eq!(generation.vehicles()[0].ticks_alive, 10);
    assert_eq!(generation.vehicles()[1].ticks_alive, 50);
    assert!(generation.vehicles()[2].is_alive());
    assert_eq!(generation.best_index(), 2);

    // a crashed car keeps what it earned before the crash tick
    let fitness = generation.fitness();
    assert_eq!(Some(fitness[0]), crash_fitness);
    assert!(fitness[0] < fitness[1]);
    assert!(fitness[1] < fitness[2]);
}

#[test]
fn test_speed_floor_holds_while_braking() {
    let params = Params::default();
    let track = TrackMask::open(1920, 1080).unwrap();
    let mut generation = Generation::new(1, 2, &params);

    for _ in 0..10 {
        generation.step(&[BRAKE; 2], &track, &params).unwrap();
    }
    for car in generation.vehicles() {
        assert_eq!(car.speed, 12.0);
        assert_eq!(car.distance_traveled, 18.0 + 16.0 + 14.0 + 12.0 * 7.0);
    }
}

#[test]
fn test_population_spawned_in_wall_finishes_on_first_tick() {
    let params = Params::default();
    let track = TrackMask::from_fn(1920, 1080, |x, _| x < 1000).unwrap();
    let mut generation = Generation::new(4, 5, &params);

    let outcome = generation.step(&[ACCELERATE; 5], &track, &params).unwrap();
    assert_eq!(outcome, TickOutcome::Finished(Termination::AllCrashed));
    assert_eq!(generation.tick(), 1);
    assert_eq!(generation.still_alive(), 0);
    assert_eq!(generation.last_crashes(), &[0, 1, 2, 3, 4]);
    assert!(generation.fitness().iter().all(|&f| f == 0.0));

    // stepping a finished generation changes nothing
    let again = generation.step(&[ACCELERATE; 5], &track, &params).unwrap();
    assert_eq!(again, outcome);
    assert_eq!(generation.tick(), 1);

    let report = generation.finish().report;
    assert_eq!(report.generation, 4);
    assert_eq!(report.best_fitness, 0.0);
    assert_eq!(report.mean_fitness, 0.0);
    assert_eq!(report.termination, Termination::AllCrashed);
}

#[test]
fn test_empty_population_ends_immediately() {
    let params = Params::default();
    let track = TrackMask::open(100, 100).unwrap();
    let mut generation = Generation::new(1, 0, &params);
    let controllers: [Fixed; 0] = [];

    let outcome = generation.step(&controllers, &track, &params).unwrap();
    assert_eq!(outcome, TickOutcome::Finished(Termination::AllCrashed));
    assert_eq!(generation.tick(), 0);
}

#[test]
fn test_controller_count_must_match() {
    let params = Params::default();
    let track = TrackMask::open(1920, 1080).unwrap();
    let mut generation = Generation::new(1, 3, &params);

    let err = generation.step(&[BRAKE; 2], &track, &params).unwrap_err();
    assert_eq!(
        err,
        SimulationError::ControllerCountMismatch {
            expected: 3,
            actual: 2
        }
    );
    assert_eq!(generation.tick(), 0);
}

#[test]
fn test_random_brains_follow_lockstep_rules() {
    let params = Params {
        tick_budget: 300,
        ..Params::default()
    };
    let track = TrackMask::from_fn(1920, 1080, |x, y| {
        x < 100 || x >= 1800 || y < 100 || y >= 1000
    })
    .unwrap();
    let brains: Vec<Brain> = (0..12)
        .map(|_| Brain::new(&params.layer_sizes(), params.weight_scale))
        .collect();
    let mut generation = Generation::new(1, brains.len(), &params);

    let mut previous_alive = generation.still_alive();
    let mut previous: Vec<Vehicle> = generation.vehicles().to_vec();
    let mut previous_fitness = generation.fitness().to_vec();

    loop {
        let outcome = generation.step(&brains, &track, &params).unwrap();
        assert!(generation.still_alive() <= previous_alive);
        assert!(generation.tick() <= params.tick_budget);

        for (i, car) in generation.vehicles().iter().enumerate() {
            assert!(generation.fitness()[i] >= previous_fitness[i]);
            if !previous[i].is_alive() {
                assert!(!car.is_alive());
                assert_eq!(car, &previous[i]);
                assert_eq!(generation.fitness()[i], previous_fitness[i]);
            }
        }

        previous_alive = generation.still_alive();
        previous = generation.vehicles().to_vec();
        previous_fitness = generation.fitness().to_vec();
        if !outcome.is_running() {
            break;
        }
    }

    match generation.termination() {
        Some(Termination::AllCrashed) => assert_eq!(generation.still_alive(), 0),
        Some(Termination::TickBudget) => assert_eq!(generation.tick(), 300),
        None => panic!("generation did not finish"),
    }
}

#[test]
fn test_results_do_not_depend_on_scheduling() {
    let params = Params {
        tick_budget: 200,
        ..Params::default()
    };
    let track = corner_wall_track();
    let brains: Vec<Brain> = (0..16)
        .map(|_| Brain::new(&params.layer_sizes(), params.weight_scale))
        .collect();

    let mut first = Generation::new(1, brains.len(), &params);
    let mut second = Generation::new(1, brains.len(), &params);
    first.run(&brains, &track, &params).unwrap();
    second.run(&brains, &track, &params).unwrap();

    assert_eq!(first.fitness(), second.fitness());
    assert_eq!(first.vehicles(), second.vehicles());
    assert_eq!(first.tick(), second.tick());
}
