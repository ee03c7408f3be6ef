//! End-to-end tests of the `battle-sim` binary.

use std::path::{Path, PathBuf};
use std::process::Command;

fn battle_sim() -> Command {
    Command::new(env!("CARGO_BIN_EXE_battle-sim"))
}

fn data(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../data")
        .join(name)
}

#[test]
fn test_validate_bundled_data() {
    let output = battle_sim()
        .arg("validate")
        .arg("--units")
        .arg(data("ogame_units.ron"))
        .arg("--scenario")
        .arg(data("deathstar_siege.ron"))
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["num_kinds"], 22);
    assert_eq!(report["num_attackers"], 2);
    assert_eq!(report["num_defenders"], 1);
}

#[test]
fn test_validate_rejects_unknown_kind() {
    let dir = tempfile::tempdir().unwrap();
    let scenario = dir.path().join("bad.ron");
    std::fs::write(&scenario, "Scenario(defenders: [Combatant(unit_groups: {99: 1})])").unwrap();

    let output = battle_sim()
        .arg("validate")
        .arg("--units")
        .arg(data("ogame_units.ron"))
        .arg("--scenario")
        .arg(&scenario)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("UnitKind(99)"));
}

#[cfg(unix)]
mod with_stub_engine {
    use super::*;
    use battle_test_utils::scripts::ScriptDir;

    /// Zero-round output for a scenario with three combatants.
    const NO_ROUNDS: &str = "0";

    #[test]
    fn test_simulate_writes_report() {
        let scripts = ScriptDir::new();
        let engine = scripts.echo("engine", NO_ROUNDS);
        let out = scripts.path().join("report.json");

        let output = battle_sim()
            .args(["simulate", "--count", "4", "--parallel", "2", "--seed", "17"])
            .arg("--engine")
            .arg(&engine)
            .arg("--units")
            .arg(data("ogame_units.ron"))
            .arg("--scenario")
            .arg(data("deathstar_siege.ron"))
            .arg("--output")
            .arg(&out)
            .output()
            .unwrap();

        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(report["seeds"], serde_json::json!([17, 17, 17, 17]));
        assert_eq!(report["summary"]["runs"], 4);
        // No rounds fought: every group keeps its initial count.
        assert_eq!(report["summary"]["defenders"][0]["kinds"]["12"]["max"], 250);

        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("Death Star"), "{stdout}");
    }

    #[test]
    fn test_engine_failure_exits_nonzero() {
        let scripts = ScriptDir::new();
        let engine = scripts.failing("engine", "bad input", 3);

        let output = battle_sim()
            .args(["battle", "--seed", "5"])
            .arg("--engine")
            .arg(&engine)
            .arg("--units")
            .arg(data("ogame_units.ron"))
            .arg("--scenario")
            .arg(data("deathstar_siege.ron"))
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("status 3"), "{stderr}");
        assert!(stderr.contains("bad input"), "{stderr}");
    }

    #[test]
    fn test_negative_seed_rejected() {
        let scripts = ScriptDir::new();
        let engine = scripts.echo("engine", NO_ROUNDS);

        let output = battle_sim()
            .args(["battle", "--seed", "-4"])
            .arg("--engine")
            .arg(&engine)
            .arg("--scenario")
            .arg(data("deathstar_siege.ron"))
            .arg("--units")
            .arg(data("ogame_units.ron"))
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid seed -4"));
    }
}
