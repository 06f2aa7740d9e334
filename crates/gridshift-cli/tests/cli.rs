use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::tempdir;

fn gridshift() -> Command {
    Command::cargo_bin("gridshift-cli").unwrap()
}

#[test]
fn graph_stats_for_builtin_case() {
    gridshift()
        .args(["graph", "stats", "case33bw"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Buses    : 33"))
        .stdout(predicate::str::contains("Leaves   : 5"))
        .stdout(predicate::str::contains("Radial   : true"));
}

#[test]
fn graph_critical_lists_feeder_leaves_as_movable() {
    let output = gridshift()
        .args(["graph", "critical", "case33bw", "--detector", "removal"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    let movable: Vec<&str> = text
        .lines()
        .skip(1)
        .filter(|line| line.trim_end().ends_with("false"))
        .map(|line| line.split_whitespace().next().unwrap())
        .collect();
    assert_eq!(movable, vec!["0", "17", "21", "24", "32"]);
}

#[test]
fn graph_islands_from_file() {
    let dir = tempdir().unwrap();
    let grid = dir.path().join("split.json");
    fs::write(&grid, r#"{"buses": [0, 1, 2, 3], "lines": [[0, 1], [2, 3]]}"#).unwrap();
    gridshift()
        .args(["graph", "islands", grid.to_str().unwrap(), "--emit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Island 0: 2 bus(es) [0-1]"))
        .stdout(predicate::str::contains("Island 1: 2 bus(es) [2-3]"));
}

#[test]
fn mutate_writes_connected_topology_and_report() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("mutated.json");
    let report = dir.path().join("report.json");
    gridshift()
        .args([
            "mutate",
            "case33bw",
            "--seed",
            "42",
            "-o",
            out.to_str().unwrap(),
            "--report",
            report.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("connected: true"));

    let topology = gridshift_core::io::load_topology(&out).unwrap();
    assert_eq!(topology.bus_count(), 33);
    assert!(gridshift_core::is_connected(&topology));

    let report: Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(report["outcomes"].as_array().unwrap().len(), 3);
    assert_eq!(report["policy"], "continue");
}

#[test]
fn mutate_dot_highlights_relocated_buses() {
    let dir = tempdir().unwrap();
    let dot = dir.path().join("mutated.dot");
    let report = dir.path().join("report.json");
    gridshift()
        .args([
            "mutate",
            "case33bw",
            "--seed",
            "3",
            "--dot",
            dot.to_str().unwrap(),
            "--report",
            report.to_str().unwrap(),
        ])
        .assert()
        .success();

    let dot = fs::read_to_string(&dot).unwrap();
    let report: Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    let outcomes = report["outcomes"].as_array().unwrap();
    let committed: Vec<u64> = outcomes
        .iter()
        .filter(|o| o["status"] == "committed")
        .map(|o| o["bus"].as_u64().unwrap())
        .collect();
    assert_eq!(dot.matches("fillcolor=orange").count(), committed.len());
    for bus in committed {
        assert!(dot.contains(&format!("b{bus} [label=\"{bus}\", style=filled")));
    }
}

#[test]
fn mutate_reads_config_file() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("gridshift.toml");
    let report = dir.path().join("report.json");
    fs::write(&config, "[mutation]\nnodes_to_move = 2\nseed = 5\n").unwrap();
    gridshift()
        .args([
            "mutate",
            "case33bw-meshed",
            "--config",
            config.to_str().unwrap(),
            "--report",
            report.to_str().unwrap(),
        ])
        .assert()
        .success();
    let report: Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(report["outcomes"].as_array().unwrap().len(), 2);
}

#[test]
fn mutate_refuses_too_many_buses() {
    gridshift()
        .args(["mutate", "case33bw", "-k", "6"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("non-critical buses available"));
}

#[test]
fn mutate_refuses_islanded_input() {
    let dir = tempdir().unwrap();
    let grid = dir.path().join("split.json");
    fs::write(&grid, r#"{"lines": [[0, 1], [1, 2], [3, 4], [4, 5]]}"#).unwrap();
    gridshift()
        .args(["mutate", grid.to_str().unwrap(), "-k", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("disconnected"));
}

#[test]
fn unknown_grid_is_reported() {
    gridshift()
        .args(["graph", "stats", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("builtin case"));
}
