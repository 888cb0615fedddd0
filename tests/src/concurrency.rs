use std::sync::Arc;
use std::thread;

use ors_engine::{RiskEngine, ScoringConfig};
use pretty_assertions::assert_eq;

use crate::*;

const THREADS: usize = 8;
const ROUNDS: usize = 200;

#[test]
fn one_engine_serves_many_threads_without_locking() {
    let engine = RiskEngine::new(ScoringConfig::default()).unwrap();
    let cases = [
        (reference_profile(), reference_vitals()),
        (extreme_profile(), extreme_vitals()),
        (minimal_profile(), minimal_vitals()),
    ];
    let expected: Vec<_> = cases
        .iter()
        .map(|(p, v)| engine.assess(p, v).unwrap())
        .collect();

    thread::scope(|s| {
        for worker in 0..THREADS {
            let engine = &engine;
            let cases = &cases;
            let expected = &expected;
            s.spawn(move || {
                for round in 0..ROUNDS {
                    let i = (worker + round) % cases.len();
                    let (p, v) = &cases[i];
                    assert_eq!(&engine.assess(p, v).unwrap(), &expected[i]);
                }
            });
        }
    });
}

#[test]
fn recalibration_builds_a_new_engine_beside_the_old_one() {
    let shipped = Arc::new(RiskEngine::new(ScoringConfig::default()).unwrap());
    let mut config = ScoringConfig::default();
    config.sensitivity.steepness = 3.0;
    let steep = Arc::new(RiskEngine::new(config).unwrap());

    let handles: Vec<_> = [Arc::clone(&shipped), Arc::clone(&steep)]
        .into_iter()
        .map(|engine| {
            thread::spawn(move || {
                engine
                    .assess(&reference_profile(), &reference_vitals())
                    .map(|a| a.ors)
            })
        })
        .collect();
    let ors: Vec<f64> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();

    assert_eq!(ors[0], 0.499);
    assert!(ors[1] < ors[0]);
    assert_eq!(shipped.config().sensitivity.steepness, 0.25);
}
