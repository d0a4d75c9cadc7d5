// Saving and loading data files
mod common;

use common::reference_recording;
use gaze_core::{load_file, save_file, GazeDataFile, GazeError, MatchMode, Region, RegionQuery};

#[test]
fn test_round_trip_preserves_queries() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let data = GazeDataFile::new(vec![reference_recording()])
        .with_additional_data(serde_json::json!({"screen": [1600, 1000]}));
    save_file(&path, &data).unwrap();

    let loaded = load_file(&path).unwrap();
    assert_eq!(loaded, data);

    let rec = loaded.recording(0).unwrap();
    assert_eq!(
        rec.find_message_indices("刺激の場所は 860 .*", MatchMode::Regex).unwrap(),
        vec![3, 9, 11]
    );
    let query = RegionQuery::new(Region::circle(800.0, 500.0, 200.0).unwrap());
    assert_eq!(rec.fixations_in_region(&query).unwrap().len(), 18);
    assert_eq!(rec.chain(), reference_recording().chain());
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.asc");
    std::fs::write(&path, "MSG 0 start").unwrap();
    assert!(matches!(load_file(&path), Err(GazeError::LoadError(_))));
}

#[test]
fn test_chain_is_not_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    save_file(&path, &GazeDataFile::new(vec![reference_recording()])).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let recording = &raw["recordings"][0];
    assert!(recording.get("chain").is_none());
    assert!(recording.get("sac").is_some());
    assert_eq!(recording["label"], "reference");
}
