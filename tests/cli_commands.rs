use clap::Parser;
use qlearn::{
    cli::commands::{
        inspect::{self, InspectArgs},
        rollout::{self, RolloutArgs},
        train::{self, TrainArgs},
    },
    load_snapshot,
};
use serde_json::Value;
use tempfile::tempdir;

fn read_json(path: &std::path::Path) -> Value {
    let contents = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&contents).unwrap()
}

#[test]
fn train_grid_writes_snapshot_rollout_and_summary() {
    let tmp = tempdir().unwrap();
    let snapshot = tmp.path().join("q.json");
    let rollout_path = tmp.path().join("path.json");
    let summary = tmp.path().join("summary.json");
    let observations = tmp.path().join("episodes.jsonl");

    let args = TrainArgs::parse_from([
        "qlearn-train",
        "grid",
        "--episodes",
        "500",
        "--seed",
        "42",
        "--output",
        snapshot.to_str().unwrap(),
        "--rollout",
        rollout_path.to_str().unwrap(),
        "--summary",
        summary.to_str().unwrap(),
        "--observations",
        observations.to_str().unwrap(),
    ]);
    train::execute(args).expect("grid training should succeed");

    let q = load_snapshot(&snapshot).unwrap();
    assert!(q.contains_key(r#"{"x":0,"y":0}"#), "keys: {:?}", q.keys());

    let rollout = read_json(&rollout_path);
    assert_eq!(rollout["width"], 3);
    assert_eq!(rollout["goal"], serde_json::json!({"x": 2, "y": 2}));
    let path = rollout["path"].as_array().unwrap();
    assert_eq!(path.first(), Some(&serde_json::json!({"x": 0, "y": 0})));
    assert_eq!(path.last(), Some(&serde_json::json!({"x": 2, "y": 2})));

    let summary = read_json(&summary);
    assert_eq!(summary["training"]["episodes"], 500);
    assert_eq!(summary["config"]["seed"], 42);

    let lines = std::fs::read_to_string(&observations).unwrap();
    assert_eq!(lines.lines().count(), 500);
    let first: Value = serde_json::from_str(lines.lines().next().unwrap()).unwrap();
    assert_eq!(first["episode"], 0);
    assert_eq!(first["epsilon"], 1.0);
}

#[test]
fn rollout_replays_a_saved_snapshot() {
    let tmp = tempdir().unwrap();
    let snapshot = tmp.path().join("q.msgpack");

    let args = TrainArgs::parse_from([
        "qlearn-train",
        "grid",
        "--width",
        "4",
        "--height",
        "2",
        "--episodes",
        "400",
        "--seed",
        "3",
        "--output",
        snapshot.to_str().unwrap(),
    ]);
    train::execute(args).unwrap();

    let replayed = tmp.path().join("replay.json");
    let args = RolloutArgs::parse_from([
        "qlearn-rollout",
        "grid",
        "--width",
        "4",
        "--height",
        "2",
        "--snapshot",
        snapshot.to_str().unwrap(),
        "--output",
        replayed.to_str().unwrap(),
    ]);
    rollout::execute(args).unwrap();

    let file = read_json(&replayed);
    assert_eq!(file["goal"], serde_json::json!({"x": 3, "y": 1}));
    assert_eq!(
        file["path"].as_array().unwrap().last(),
        Some(&serde_json::json!({"x": 3, "y": 1}))
    );
}

#[test]
fn train_knight_writes_tour_layout() {
    let tmp = tempdir().unwrap();
    let tour = tmp.path().join("tour.json");

    let args = TrainArgs::parse_from([
        "qlearn-train",
        "knight",
        "--board-size",
        "5",
        "--episodes",
        "50",
        "--max-steps",
        "0",
        "--shaping",
        "--seed",
        "1",
        "--rollout",
        tour.to_str().unwrap(),
    ]);
    train::execute(args).unwrap();

    let file = read_json(&tour);
    assert_eq!(file["board_size"], 5);
    assert_eq!(file["start"], serde_json::json!({"x": 0, "y": 0}));
    assert_eq!(file["path"][0], serde_json::json!({"x": 0, "y": 0}));
    let path = file["path"].as_array().unwrap();
    assert!(path.len() >= 2);
    assert_eq!(file["total_squares"], 25);
    // A greedy tour never revisits, so every path entry is a distinct square
    assert_eq!(file["visited_squares"], path.len());
    assert_eq!(file["complete"], path.len() == 25);
}

#[test]
fn config_file_is_overridden_by_flags() {
    let tmp = tempdir().unwrap();
    let config = tmp.path().join("run.json");
    let saved = tmp.path().join("resolved.json");
    std::fs::write(
        &config,
        r#"{"episodes": 10, "max_steps_per_episode": 25, "seed": 5,
            "epsilon": {"kind": "constant", "epsilon": 0.3}}"#,
    )
    .unwrap();

    let args = TrainArgs::parse_from([
        "qlearn-train",
        "grid",
        "--config",
        config.to_str().unwrap(),
        "--episodes",
        "20",
        "--save-config",
        saved.to_str().unwrap(),
    ]);
    train::execute(args).unwrap();

    let resolved = read_json(&saved);
    assert_eq!(resolved["episodes"], 20);
    assert_eq!(resolved["max_steps_per_episode"], 25);
    assert_eq!(resolved["seed"], 5);
    assert_eq!(resolved["epsilon"]["kind"], "constant");
}

#[test]
fn invalid_arguments_are_reported() {
    let args = TrainArgs::parse_from(["qlearn-train", "grid", "--learning-rate", "0"]);
    assert!(train::execute(args).is_err());

    let args = TrainArgs::parse_from(["qlearn-train", "grid", "--start", "9,9"]);
    assert!(train::execute(args).is_err());

    let args = TrainArgs::parse_from(["qlearn-train", "knight", "--board-size", "9"]);
    assert!(train::execute(args).is_err());

    assert!(TrainArgs::try_parse_from(["qlearn-train", "maze"]).is_err());
}

#[test]
fn inspect_writes_state_values() {
    let tmp = tempdir().unwrap();
    let snapshot = tmp.path().join("q.json");
    std::fs::write(&snapshot, r#"{"s1": {"0": 5.0, "1": 3.0}, "s2": {"0": -1.0}}"#).unwrap();
    let values = tmp.path().join("values.json");

    let args = InspectArgs::parse_from([
        "qlearn-inspect",
        snapshot.to_str().unwrap(),
        "--state-values",
        values.to_str().unwrap(),
    ]);
    inspect::execute(args).unwrap();

    assert_eq!(read_json(&values), serde_json::json!({"s1": 5.0, "s2": -1.0}));
}

#[test]
fn inspect_reports_missing_file() {
    let tmp = tempdir().unwrap();
    let args = InspectArgs::parse_from([
        "qlearn-inspect",
        tmp.path().join("missing.json").to_str().unwrap(),
    ]);
    assert!(inspect::execute(args).is_err());
}
