//! Policy snapshots written by one agent and read back by another

use std::fs;

use noughts::{
    Error,
    config::{Hyperparameters, TrainingConfig},
    opponents::RandomOpponent,
    q_learning::{QLearningAgent, QTable, load_snapshot, save_snapshot},
    training::TrainingPipeline,
};
use tempfile::TempDir;

fn trained_agent() -> QLearningAgent {
    let mut agent = QLearningAgent::new(Hyperparameters::default()).expect("valid parameters");
    let mut opponent = RandomOpponent::new();
    TrainingPipeline::new(TrainingConfig::new(300).with_seed(21))
        .train_against(&mut agent, &mut opponent)
        .expect("training should succeed");
    agent
}

#[test]
fn test_trained_policy_roundtrip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("q_policy.bin");

    let agent = trained_agent();
    assert!(!agent.table().is_empty());
    agent.save_policy(&path).expect("Failed to save policy");

    let mut restored = QLearningAgent::new(Hyperparameters::default()).unwrap();
    let count = restored.load_policy(&path).expect("Failed to load policy");

    assert_eq!(count, agent.table().len());
    assert_eq!(restored.table(), agent.table());

    // Count word, then per entry a length word, the key and nine values
    let expected_len = 8 + agent.table().len() * (8 + 9 + 9 * 8);
    assert_eq!(fs::metadata(&path).unwrap().len() as usize, expected_len);
}

#[test]
fn test_empty_table_roundtrip() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("empty.bin");

    save_snapshot(&path, &QTable::new(0.1, 1.0)).unwrap();
    assert_eq!(fs::read(&path).unwrap(), vec![0u8; 8]);
    assert!(load_snapshot(&path).unwrap().is_empty());
}

#[test]
fn test_extreme_values_survive_bit_exact() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("extremes.bin");

    let row = [
        f64::MAX,
        f64::MIN,
        f64::MIN_POSITIVE,
        f64::EPSILON,
        -0.0,
        5e-324,
        1.0 / 3.0,
        -123_456.789,
        0.0,
    ];
    let mut table = QTable::new(0.1, 1.0);
    table.insert("100000000", row);
    save_snapshot(&path, &table).unwrap();

    let loaded = load_snapshot(&path).unwrap();
    let restored = loaded["100000000"];
    for (a, b) in row.iter().zip(restored.iter()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

#[test]
fn test_save_overwrites_previous_snapshot() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("q_policy.bin");

    let agent = trained_agent();
    agent.save_policy(&path).unwrap();

    let mut small = QTable::new(0.1, 1.0);
    small.insert("000000000", [0.0; 9]);
    save_snapshot(&path, &small).unwrap();

    let loaded = load_snapshot(&path).unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(loaded.contains_key("000000000"));
}

#[test]
fn test_corrupt_file_keeps_current_table() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("q_policy.bin");

    let mut agent = trained_agent();
    agent.save_policy(&path).unwrap();
    let before = agent.table().clone();

    let mut bytes = fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 3);
    fs::write(&path, bytes).unwrap();

    let err = agent.load_policy(&path).unwrap_err();
    assert!(matches!(err, Error::MalformedSnapshot { .. }), "{err}");
    assert_eq!(agent.table(), &before);
}

#[test]
fn test_missing_file_and_directory_report_io_errors() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let missing = temp_dir.path().join("nope.bin");
    assert!(matches!(load_snapshot(&missing), Err(Error::Io { .. })));

    let unwritable = temp_dir.path().join("no_such_dir").join("q_policy.bin");
    let result = save_snapshot(&unwritable, &QTable::new(0.1, 1.0));
    assert!(matches!(result, Err(Error::Io { .. })));
    assert!(!unwritable.exists());
}
