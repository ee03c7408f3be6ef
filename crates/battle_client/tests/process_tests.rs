//! Tests that spawn real child processes through stub engine scripts.

#![cfg(unix)]

use std::time::{Duration, Instant};

use battle_client::{BattleEngine, CancelToken, ClientConfig, Engine, ProcessEngine};
use battle_core::prelude::*;
use battle_test_utils::fixtures::{fleet, two_kind_table};
use battle_test_utils::scripts::ScriptDir;

fn rosters() -> (Vec<Combatant>, Vec<Combatant>) {
    (
        vec![fleet(&[(UnitKind::new(0), 1)])],
        vec![fleet(&[(UnitKind::new(1), 1)])],
    )
}

/// Wait until the script has recorded its pid.
fn read_pid(pidfile: &std::path::Path) -> Option<u32> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Ok(text) = std::fs::read_to_string(pidfile) {
            if let Ok(pid) = text.trim().parse() {
                return Some(pid);
            }
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    None
}

#[test]
fn test_engine_receives_seed_and_payload() {
    let scripts = ScriptDir::new();
    let capture = scripts.path().join("stdin.txt");
    let engine = scripts.capture_input("engine", &capture, "0");
    let client = BattleEngine::new(&engine, two_kind_table()).unwrap();
    let (attackers, defenders) = rosters();

    let outcome = client.battle(&attackers, &defenders, 31337, None).unwrap();
    assert_eq!(outcome.seed, 31337);
    assert_eq!(outcome.num_rounds, 0);

    let written = std::fs::read(&capture).unwrap();
    assert_eq!(written, client.prepare(&attackers, &defenders).unwrap().bytes());
}

#[test]
fn test_seed_argument_reaches_engine() {
    let scripts = ScriptDir::new();
    let engine = scripts.echo_seed("engine", "", "");
    let engine = ProcessEngine::new(engine).unwrap();

    let output = engine.run(4242, b"ignored", None).unwrap();
    assert_eq!(output.stdout, b"4242");
    assert!(output.stderr.is_empty());
}

#[test]
fn test_nonzero_exit_carries_status_and_stderr() {
    let scripts = ScriptDir::new();
    let engine = scripts.failing("engine", "units attributes are broken", 3);
    let client = BattleEngine::new(&engine, two_kind_table()).unwrap();
    let (attackers, defenders) = rosters();

    let err = client.battle(&attackers, &defenders, 1, None).unwrap_err();
    assert_eq!(
        err,
        BattleError::EngineFailure {
            status: Some(3),
            message: "units attributes are broken".into(),
        }
    );
}

#[test]
fn test_diagnostics_on_success_are_kept() {
    let scripts = ScriptDir::new();
    let engine = scripts.script("engine", "cat > /dev/null\necho 'warning: slow' >&2\nprintf 0");
    let engine = ProcessEngine::new(engine).unwrap();

    let output = engine.run(1, b"", None).unwrap();
    assert_eq!(output.stdout, b"0");
    assert_eq!(output.stderr, "warning: slow\n");
}

#[test]
fn test_timeout_kills_engine() {
    let scripts = ScriptDir::new();
    let pidfile = scripts.path().join("engine.pid");
    let engine = scripts.sleeping("engine", &pidfile, 30);
    let client = BattleEngine::new(&engine, two_kind_table()).unwrap();
    let (attackers, defenders) = rosters();

    let started = Instant::now();
    let err = client
        .battle(&attackers, &defenders, 1, Some(Duration::from_millis(50)))
        .unwrap_err();

    assert_eq!(
        err,
        BattleError::EngineTimeout {
            timeout: Duration::from_millis(50)
        }
    );
    assert!(started.elapsed() < Duration::from_secs(10));

    // The engine may be killed before it records its pid.
    #[cfg(target_os = "linux")]
    {
        let recorded = std::fs::read_to_string(&pidfile)
            .ok()
            .and_then(|text| text.trim().parse::<u32>().ok());
        if let Some(pid) = recorded {
            let alive = battle_test_utils::scripts::process_alive(pid);
            assert!(!alive, "engine {pid} survived its timeout");
        }
    }
}

#[test]
fn test_killed_engine_is_reaped() {
    let scripts = ScriptDir::new();
    let pidfile = scripts.path().join("engine.pid");
    let engine = scripts.sleeping("engine", &pidfile, 30);
    let client = BattleEngine::new(&engine, two_kind_table()).unwrap();
    let (attackers, defenders) = rosters();

    let err = client
        .battle(&attackers, &defenders, 1, Some(Duration::from_millis(500)))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EngineTimeout);

    #[cfg(target_os = "linux")]
    {
        let pid = read_pid(&pidfile).expect("engine should have recorded its pid");
        assert!(!battle_test_utils::scripts::process_alive(pid));
    }
}

#[test]
fn test_default_timeout_from_config() {
    let scripts = ScriptDir::new();
    let pidfile = scripts.path().join("engine.pid");
    let engine = scripts.sleeping("engine", &pidfile, 30);
    let config = ClientConfig::default().with_default_timeout(Duration::from_millis(200));
    let client = BattleEngine::with_config(&engine, two_kind_table(), config).unwrap();
    let (attackers, defenders) = rosters();

    let err = client.battle(&attackers, &defenders, 1, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EngineTimeout);
}

#[test]
fn test_batch_timeout_cancels_other_runs() {
    let scripts = ScriptDir::new();
    let pidfile = scripts.path().join("engine.pid");
    let engine = scripts.sleeping("engine", &pidfile, 30);
    let config = ClientConfig::default().with_parallel_runs(4);
    let client = BattleEngine::with_config(&engine, two_kind_table(), config).unwrap();
    let (attackers, defenders) = rosters();

    let started = Instant::now();
    let err = client
        .simulate(&attackers, &defenders, 7, 12, Some(Duration::from_millis(200)))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EngineTimeout);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn test_batch_outcomes_in_run_order() {
    // One round; the engine reports its seed as the first attacker group's shot count.
    let scripts = ScriptDir::new();
    let engine = scripts.echo_seed(
        "engine",
        "1 ",
        " 0 0 0 0 0 1  0 0 0 0 0 0 0  0 0 0 0 0 0 0  0 0 0 0 0 0 1",
    );
    let client = BattleEngine::with_config(
        &engine,
        two_kind_table(),
        ClientConfig::default().with_parallel_runs(3),
    )
    .unwrap()
    .with_seed_source(battle_test_utils::seeds::SeedSequence::new([5, 4, 3, 2, 1]));
    let (attackers, defenders) = rosters();

    let outcomes = client.simulate(&attackers, &defenders, 0, 5, None).unwrap();
    let reported: Vec<u64> = outcomes
        .iter()
        .map(|o| o.attackers()[0].round_stats(0).unwrap()[&UnitKind::new(0)].times_fired)
        .collect();
    assert_eq!(reported, vec![5, 4, 3, 2, 1]);
    assert!(outcomes.iter().all(|o| u64::from(o.seed) == o.attackers()[0]
        .round_stats(0)
        .unwrap()[&UnitKind::new(0)]
        .times_fired));
}

#[test]
fn test_cancel_token_stops_running_engine() {
    let scripts = ScriptDir::new();
    let pidfile = scripts.path().join("engine.pid");
    let engine = ProcessEngine::new(scripts.sleeping("engine", &pidfile, 30)).unwrap();
    let cancel = CancelToken::new();

    let canceller = {
        let cancel = cancel.clone();
        let pidfile = pidfile.clone();
        std::thread::spawn(move || {
            read_pid(&pidfile);
            cancel.cancel();
        })
    };

    let started = Instant::now();
    let err = engine.run_cancellable(1, b"", None, &cancel).unwrap_err();
    canceller.join().unwrap();

    assert_eq!(err.kind(), ErrorKind::EngineFailure);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn test_missing_engine_binary() {
    let scripts = ScriptDir::new();
    let client = BattleEngine::new(scripts.path().join("missing"), two_kind_table()).unwrap();
    let (attackers, defenders) = rosters();

    let err = client.battle(&attackers, &defenders, 1, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EngineFailure);
}
