//! Integration tests for the laugh round
//!
//! Rounds run on a paused Tokio clock against the synthetic microphone and
//! scripted classifiers, so a full 12 s round finishes instantly.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{drain, until_finished, Rig};
use fun_meter::engine::{FinishCause, RoundEvent, RoundPhase, StatusLevel};
use fun_meter::platform::SensorKind;
use fun_meter::storage::GameMode;
use fun_meter::testing::{ScriptedClassifier, ScriptedLoader, SyntheticMicrophone};
use fun_meter::{AppConfig, RoundError};

fn phases(events: &[RoundEvent]) -> Vec<RoundPhase> {
    events
        .iter()
        .filter_map(|event| match event {
            RoundEvent::Phase { phase, .. } => Some(*phase),
            _ => None,
        })
        .collect()
}

fn has_status(events: &[RoundEvent], wanted: StatusLevel) -> bool {
    events
        .iter()
        .any(|event| matches!(event, RoundEvent::Status { level, .. } if *level == wanted))
}

fn finished_count(events: &[RoundEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, RoundEvent::Finished(_)))
        .count()
}

#[tokio::test(start_paused = true)]
async fn test_round_runs_to_completion_and_persists_once() {
    let mic = Arc::new(SyntheticMicrophone::tone(440.0, 0.05));
    let engine = Rig::new().microphone(mic.clone()).engine();
    let mut rx = engine.subscribe();

    engine.start(GameMode::Laugh, "Ann").await.unwrap();
    assert_eq!(engine.phase(GameMode::Laugh), RoundPhase::Calibrating);

    let (events, summary) = until_finished(&mut rx).await;
    assert_eq!(summary.cause, FinishCause::Completed);
    assert_eq!(summary.player, "Ann");
    // 100 * 0.7 plus ten streak bonuses of 2
    assert_eq!(summary.score, 90);
    assert!(summary.persisted);
    assert!(summary.personal_best);
    assert_eq!(summary.rank, Some(1));

    assert_eq!(
        phases(&events),
        vec![
            RoundPhase::Calibrating,
            RoundPhase::Active,
            RoundPhase::Finished
        ]
    );
    let scores: Vec<u64> = events
        .iter()
        .filter_map(|event| match event {
            RoundEvent::Score { elapsed_ms, .. } => Some(*elapsed_ms),
            _ => None,
        })
        .collect();
    assert_eq!(scores.len(), 40);
    assert_eq!(scores.last(), Some(&10_000));

    let after = drain(&mut rx);
    assert_eq!(phases(&after), vec![RoundPhase::Idle]);
    assert!(after.iter().any(|event| matches!(
        event,
        RoundEvent::Controls {
            start_enabled: true,
            stop_enabled: false,
            ..
        }
    )));

    assert_eq!(engine.phase(GameMode::Laugh), RoundPhase::Idle);
    assert_eq!(mic.active_streams(), 0);
    assert_eq!(engine.stop(GameMode::Laugh).unwrap(), None);

    let board = engine.leaderboard(GameMode::Laugh);
    assert_eq!(board.len(), 1);
    assert_eq!(board.entries()[0].score, 90);
    assert!(engine.leaderboard(GameMode::Shake).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_calibration_releases_microphone() {
    let mic = Arc::new(SyntheticMicrophone::tone(440.0, 0.05));
    let engine = Rig::new().microphone(mic.clone()).engine();
    let mut rx = engine.subscribe();

    engine.start(GameMode::Laugh, "Ann").await.unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(engine.phase(GameMode::Laugh), RoundPhase::Calibrating);
    assert_eq!(mic.active_streams(), 1);

    let summary = engine.stop(GameMode::Laugh).unwrap().unwrap();
    assert_eq!(summary.cause, FinishCause::Stopped);
    assert_eq!(summary.score, 0);
    assert!(summary.persisted);

    // released before stop() returned
    assert_eq!(mic.active_streams(), 0);
    assert_eq!(engine.phase(GameMode::Laugh), RoundPhase::Idle);
    assert_eq!(engine.stop(GameMode::Laugh).unwrap(), None);

    // the aborted task never finalizes a second time
    tokio::time::sleep(Duration::from_secs(15)).await;
    let events = drain(&mut rx);
    assert_eq!(finished_count(&events), 1);
    assert_eq!(engine.leaderboard(GameMode::Laugh).len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stop_while_active_scores_zero() {
    let mic = Arc::new(SyntheticMicrophone::tone(440.0, 0.05));
    let engine = Rig::new().microphone(mic.clone()).engine();

    engine.start(GameMode::Laugh, "Ann").await.unwrap();
    tokio::time::sleep(Duration::from_millis(4_000)).await;
    assert_eq!(engine.phase(GameMode::Laugh), RoundPhase::Active);

    let summary = engine.stop(GameMode::Laugh).unwrap().unwrap();
    assert_eq!(summary.score, 0);
    assert_eq!(summary.cause, FinishCause::Stopped);
    assert_eq!(mic.active_streams(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_microphone_permission_denied() {
    let mic = Arc::new(SyntheticMicrophone::tone(440.0, 0.05));
    mic.deny_permission();
    let engine = Rig::new().microphone(mic.clone()).engine();
    let mut rx = engine.subscribe();

    let err = engine.start(GameMode::Laugh, "Ann").await.unwrap_err();
    assert_eq!(
        err,
        RoundError::PermissionDenied {
            sensor: SensorKind::Microphone
        }
    );
    assert_eq!(engine.phase(GameMode::Laugh), RoundPhase::Idle);
    assert_eq!(mic.active_streams(), 0);

    let events = drain(&mut rx);
    assert!(has_status(&events, StatusLevel::Error));
    assert!(events.iter().any(|event| matches!(
        event,
        RoundEvent::Controls {
            start_enabled: true,
            stop_enabled: false,
            ..
        }
    )));
    assert!(engine.leaderboard(GameMode::Laugh).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_classifier_unavailable_aborts_before_microphone() {
    let mic = Arc::new(SyntheticMicrophone::tone(440.0, 0.05));
    let loader = Arc::new(ScriptedLoader::unavailable());
    let engine = Rig::new()
        .microphone(mic.clone())
        .loader(loader.clone())
        .engine();

    let err = engine.start(GameMode::Laugh, "Ann").await.unwrap_err();
    assert!(matches!(err, RoundError::ServiceUnavailable { .. }));
    assert_eq!(mic.opens(), 0);
    assert_eq!(
        loader.attempts(),
        AppConfig::default().classifier.endpoints
    );
    assert_eq!(engine.phase(GameMode::Laugh), RoundPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_classifier_falls_back_to_next_endpoint() {
    let endpoints = AppConfig::default().classifier.endpoints;
    let loader = Arc::new(
        ScriptedLoader::new(Arc::new(ScriptedClassifier::constant(0.7))).failing(&endpoints[0]),
    );
    let engine = Rig::new().loader(loader.clone()).engine();

    engine.start(GameMode::Laugh, "Ann").await.unwrap();
    assert_eq!(loader.attempts(), endpoints);
    assert!(engine.stop(GameMode::Laugh).unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_classifier_is_loaded_once_across_rounds() {
    let loader = Arc::new(ScriptedLoader::new(Arc::new(ScriptedClassifier::constant(
        0.7,
    ))));
    let engine = Rig::new().loader(loader.clone()).engine();

    engine.start(GameMode::Laugh, "Ann").await.unwrap();
    engine.stop(GameMode::Laugh).unwrap();
    engine.start(GameMode::Laugh, "Bob").await.unwrap();
    engine.stop(GameMode::Laugh).unwrap();

    assert_eq!(loader.attempts().len(), 1);
    assert_eq!(engine.leaderboard(GameMode::Laugh).len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_insecure_context_is_rejected_before_any_access() {
    let mic = Arc::new(SyntheticMicrophone::tone(440.0, 0.05));
    let loader = Arc::new(ScriptedLoader::new(Arc::new(ScriptedClassifier::constant(
        0.7,
    ))));
    let engine = Rig::new()
        .microphone(mic.clone())
        .loader(loader.clone())
        .insecure()
        .engine();

    let err = engine.start(GameMode::Laugh, "Ann").await.unwrap_err();
    assert!(matches!(err, RoundError::PreconditionFailed { .. }));
    assert_eq!(mic.opens(), 0);
    assert!(loader.attempts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_invalid_names_are_rejected() {
    let mic = Arc::new(SyntheticMicrophone::tone(440.0, 0.05));
    let engine = Rig::new().microphone(mic.clone()).engine();

    let too_long = "a".repeat(17);
    for name in ["", "   ", too_long.as_str(), "bad!name", "ünïcode"] {
        let err = engine.start(GameMode::Laugh, name).await.unwrap_err();
        assert!(
            matches!(err, RoundError::PreconditionFailed { .. }),
            "{name:?} should be rejected, got {err:?}"
        );
    }
    assert_eq!(mic.opens(), 0);

    engine.start(GameMode::Laugh, "  Ann_2  ").await.unwrap();
    let summary = engine.stop(GameMode::Laugh).unwrap().unwrap();
    assert_eq!(summary.player, "Ann_2");
}

#[tokio::test(start_paused = true)]
async fn test_transient_classifier_failure_counts_as_zero() {
    let classifier = Arc::new(ScriptedClassifier::constant(0.7));
    classifier.push_failure("inference timed out");
    let loader = Arc::new(ScriptedLoader::new(classifier.clone()));
    let engine = Rig::new().loader(loader).engine();
    let mut rx = engine.subscribe();

    engine.start(GameMode::Laugh, "Ann").await.unwrap();
    let (_, summary) = until_finished(&mut rx).await;

    assert_eq!(summary.cause, FinishCause::Completed);
    assert_eq!(classifier.calls(), 40);
    assert!(summary.score > 0);
    assert!(summary.score < 90);
}

#[tokio::test(start_paused = true)]
async fn test_silent_calibration_uses_fallback_baseline() {
    let mic = Arc::new(SyntheticMicrophone::starved());
    let engine = Rig::new().microphone(mic.clone()).engine();
    let mut rx = engine.subscribe();

    engine.start(GameMode::Laugh, "Ann").await.unwrap();
    let (events, summary) = until_finished(&mut rx).await;

    assert!(has_status(&events, StatusLevel::Warning));
    assert_eq!(summary.cause, FinishCause::Completed);
    assert!(summary.persisted);
}

#[tokio::test(start_paused = true)]
async fn test_restart_tears_down_previous_round_without_recording() {
    let mic = Arc::new(SyntheticMicrophone::tone(440.0, 0.05));
    let engine = Rig::new().microphone(mic.clone()).engine();

    engine.start(GameMode::Laugh, "First").await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    engine.start(GameMode::Laugh, "Second").await.unwrap();

    assert_eq!(mic.opens(), 2);
    assert_eq!(mic.active_streams(), 1);

    let summary = engine.stop(GameMode::Laugh).unwrap().unwrap();
    assert_eq!(summary.player, "Second");

    let board = engine.leaderboard(GameMode::Laugh);
    assert_eq!(board.len(), 1);
    assert_eq!(board.entries()[0].name, "Second");
}

#[tokio::test(start_paused = true)]
async fn test_failed_restart_still_releases_previous_round() {
    let mic = Arc::new(SyntheticMicrophone::tone(440.0, 0.05));
    let engine = Rig::new().microphone(mic.clone()).engine();

    engine.start(GameMode::Laugh, "First").await.unwrap();
    assert_eq!(mic.active_streams(), 1);

    assert!(engine.start(GameMode::Laugh, "").await.is_err());
    assert_eq!(mic.active_streams(), 0);
    assert_eq!(engine.phase(GameMode::Laugh), RoundPhase::Idle);
    assert!(engine.leaderboard(GameMode::Laugh).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_slow_classifier_delays_but_never_skips_ticks() {
    let classifier =
        Arc::new(ScriptedClassifier::constant(0.7).with_latency(Duration::from_millis(400)));
    let loader = Arc::new(ScriptedLoader::new(classifier.clone()));
    let engine = Rig::new().loader(loader).engine();
    let mut rx = engine.subscribe();

    let started = tokio::time::Instant::now();
    engine.start(GameMode::Laugh, "Ann").await.unwrap();
    let (events, summary) = until_finished(&mut rx).await;

    let elapsed: Vec<u64> = events
        .iter()
        .filter_map(|event| match event {
            RoundEvent::Score { elapsed_ms, .. } => Some(*elapsed_ms),
            _ => None,
        })
        .collect();
    assert_eq!(classifier.calls(), 40);
    assert_eq!(elapsed.len(), 40);
    assert_eq!(elapsed.last(), Some(&10_000));
    assert_eq!(summary.cause, FinishCause::Completed);
    assert_eq!(summary.score, 90);
    // each tick waits out the 400 ms inference
    assert!(started.elapsed() >= Duration::from_millis(40 * 400));
}

#[tokio::test(start_paused = true)]
async fn test_zero_tick_interval_still_completes() {
    let mut config = AppConfig::default();
    config.audio.tick_interval_ms = 0;
    config.audio.round_duration_ms = 50;
    let mic = Arc::new(SyntheticMicrophone::tone(440.0, 0.05));
    let classifier = Arc::new(ScriptedClassifier::constant(0.7));
    let engine = Rig::new()
        .config(config)
        .microphone(mic.clone())
        .loader(Arc::new(ScriptedLoader::new(classifier.clone())))
        .engine();
    let mut rx = engine.subscribe();

    engine.start(GameMode::Laugh, "Ann").await.unwrap();
    let (_, summary) = until_finished(&mut rx).await;

    assert_eq!(summary.cause, FinishCause::Completed);
    assert!(summary.persisted);
    // clamped to 1 ms per tick
    assert_eq!(classifier.calls(), 50);
    assert_eq!(mic.active_streams(), 0);
    assert_eq!(engine.phase(GameMode::Laugh), RoundPhase::Idle);
    assert_eq!(engine.leaderboard(GameMode::Laugh).len(), 1);
}
