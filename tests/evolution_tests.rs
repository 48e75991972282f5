#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use std::collections::HashSet;

use evo_drive::simulation::brain::Brain;
use evo_drive::simulation::errors::{CheckpointError, ConfigError};
use evo_drive::simulation::event_log::EventKind;
use evo_drive::simulation::evolution::{Genome, Population, Reproduction};
use evo_drive::simulation::params::Params;
use evo_drive::simulation::session::Session;
use evo_drive::simulation::statistics::Termination;
use evo_drive::simulation::track::TrackMask;

fn small_params() -> Params {
    Params {
        population_size: 6,
        tick_budget: 30,
        ..Params::default()
    }
}

fn temp_path(name: &str) -> String {
    std::env::temp_dir()
        .join(format!("evo_drive_{}_{}", std::process::id(), name))
        .to_string_lossy()
        .into_owned()
}

#[test]
fn test_new_population_matches_params() {
    let params = Params::default();
    let population = Population::new(&params);

    assert_eq!(population.len(), 30);
    for genome in population.genomes() {
        assert_eq!(genome.brain.layer_sizes(), vec![5, 6, 4]);
        assert_eq!(genome.fitness, 0.0);
        assert_eq!(genome.birth_generation, 0);
    }
}

#[test]
fn test_evolve_keeps_size_and_elites() {
    let params = Params::default();
    let mut population = Population::new(&params);
    let fitness: Vec<f64> = (0..30).map(f64::from).collect();
    population.assign_fitness(&fitness);

    let best = population.genomes()[29].clone();
    let runner_up = population.genomes()[28].clone();
    assert_eq!(population.champion().map(|g| g.id), Some(best.id));

    let methods = population.evolve(1, &params);

    assert_eq!(population.len(), 30);
    assert_eq!(methods.len(), 30);
    assert_eq!(&methods[..2], &[Reproduction::Elite, Reproduction::Elite]);
    assert!(methods[2..].iter().all(|m| *m != Reproduction::Elite));

    let genomes = population.genomes();
    assert_eq!(genomes[0].id, best.id);
    assert_eq!(genomes[0].brain, best.brain);
    assert_eq!(genomes[1].id, runner_up.id);
    assert!(genomes.iter().all(|g| g.fitness == 0.0));
    assert!(genomes[2..].iter().all(|g| g.birth_generation == 1));

    let ids: HashSet<usize> = genomes.iter().map(|g| g.id).collect();
    assert_eq!(ids.len(), 30);
    assert!(genomes[2..].iter().all(|g| g.id >= 30));
}

#[test]
fn test_checkpoint_round_trip() {
    let params = small_params();
    let population = Population::new(&params);
    let path = temp_path("population.json");

    population.save_to_file(&path).unwrap();
    let loaded = Population::load_from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.genomes(), population.genomes());
}

#[test]
fn test_empty_checkpoint_is_rejected() {
    let path = temp_path("empty.json");
    std::fs::write(&path, r#"{"genomes": [], "next_id": 0}"#).unwrap();
    let result = Population::load_from_file(&path);
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(result, Err(CheckpointError::Empty)));
    assert!(matches!(
        Population::load_from_file("no-such-checkpoint.json"),
        Err(CheckpointError::Io(_))
    ));
}

fn population_with_layout(layer_sizes: &[usize]) -> Population {
    let genomes = (0..3)
        .map(|id| Genome {
            id,
            brain: Brain::new(layer_sizes, 1.0),
            fitness: 0.0,
            birth_generation: 0,
        })
        .collect();
    Population::from_genomes(genomes)
}

#[test]
fn test_checkpoint_with_wrong_layout_is_rejected() {
    for layout in [vec![3, 4], vec![5, 6, 2], vec![5, 6, 4, 7]] {
        let path = temp_path("layout.json");
        population_with_layout(&layout).save_to_file(&path).unwrap();
        let result = Population::load_from_file(&path);
        std::fs::remove_file(&path).unwrap();

        match result {
            Err(CheckpointError::Layout {
                id,
                sizes,
                inputs,
                outputs,
            }) => {
                assert_eq!(id, 0);
                assert_eq!(sizes, layout);
                assert_eq!((inputs, outputs), (5, 4));
            }
            other => panic!("layout {layout:?} loaded as {other:?}"),
        }
    }
}

#[test]
fn test_session_rejects_population_that_cannot_drive() {
    let track = TrackMask::open(1920, 1080).unwrap();
    let result = Session::with_population(small_params(), track, population_with_layout(&[3, 4]));
    assert!(matches!(result, Err(CheckpointError::Layout { id: 0, .. })));

    let track = TrackMask::open(1920, 1080).unwrap();
    let mut session =
        Session::with_population(small_params(), track, population_with_layout(&[5, 8, 4]))
            .unwrap();
    let report = session.run_generation().unwrap();
    assert_eq!(report.ticks, 30);
}

#[test]
fn test_session_rejects_invalid_params() {
    let params = Params {
        population_size: 0,
        ..Params::default()
    };
    let track = TrackMask::open(100, 100).unwrap();
    assert!(matches!(
        Session::new(params, track),
        Err(ConfigError::Invalid {
            name: "population_size",
            ..
        })
    ));
}

#[test]
fn test_session_counts_generations_and_records_reports() {
    let params = small_params();
    let track = TrackMask::open(1920, 1080).unwrap();
    let mut session = Session::new(params, track).unwrap();
    assert_eq!(session.generation_number(), 0);

    let reports = session.run(3).unwrap();

    assert_eq!(session.generation_number(), 3);
    assert_eq!(reports.len(), 3);
    for (i, report) in reports.iter().enumerate() {
        assert_eq!(report.generation, i as u32 + 1);
        // nothing to hit, so every car drives until the budget runs out
        assert_eq!(report.termination, Termination::TickBudget);
        assert_eq!(report.ticks, 30);
        assert_eq!(report.survivors, 6);
        assert!(report.best_fitness > 0.0);
    }
    assert_eq!(session.statistics().reports(), reports.as_slice());
    assert_eq!(session.population().len(), 6);
    assert!(
        session
            .event_log()
            .events()
            .iter()
            .any(|e| e.kind == EventKind::Record)
    );
}

#[test]
fn test_all_wall_track_gives_zero_fitness() {
    let params = small_params();
    let track = TrackMask::from_fn(1920, 1080, |_, _| true).unwrap();
    let mut session = Session::new(params, track).unwrap();

    let reports = session.run(2).unwrap();

    assert_eq!(reports.len(), 2);
    for report in &reports {
        assert_eq!(report.termination, Termination::AllCrashed);
        assert_eq!(report.ticks, 1);
        assert_eq!(report.best_fitness, 0.0);
    }
    assert!(
        session
            .event_log()
            .events()
            .iter()
            .any(|e| e.kind == EventKind::Crash)
    );
}

#[test]
fn test_run_stops_at_fitness_threshold() {
    let params = Params {
        fitness_threshold: Some(0.0),
        ..small_params()
    };
    let track = TrackMask::open(1920, 1080).unwrap();
    let mut session = Session::new(params, track).unwrap();

    let reports = session.run(10).unwrap();

    assert_eq!(reports.len(), 1);
    assert_eq!(session.generation_number(), 1);
}

#[test]
fn test_stepwise_generation_matches_headless_flow() {
    let params = small_params();
    let track = TrackMask::open(1920, 1080).unwrap();
    let mut session = Session::new(params, track).unwrap();

    let mut generation = session.begin_generation();
    assert_eq!(generation.number(), 1);
    let mut ticks = 0;
    while session.advance(&mut generation).unwrap().is_running() {
        ticks += 1;
    }
    assert_eq!(ticks + 1, 30);

    let report = session.complete_generation(generation);
    assert_eq!(report.generation, 1);
    assert_eq!(session.statistics().best_ever(), Some(report.best_fitness));
    assert!(session.population().genomes()[2..].iter().all(|g| g.birth_generation == 1));
}

#[test]
fn test_statistics_are_saved_as_json() {
    let params = small_params();
    let track = TrackMask::open(1920, 1080).unwrap();
    let mut session = Session::new(params, track).unwrap();
    session.run(2).unwrap();

    let path = temp_path("statistics.json");
    session.statistics().save_to_file(&path).unwrap();
    let json = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["reports"].as_array().map(Vec::len), Some(2));
}
