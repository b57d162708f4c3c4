use std::collections::HashMap;
use std::path::Path;

use serde_json::json;
use survey_targeting::config::{AppConfig, UnknownCategoryPolicy};
use survey_targeting::data::export::to_csv_bytes;
use survey_targeting::data::loader::read_csv;
use survey_targeting::data::model::{CellValue, DataTable};
use survey_targeting::{TargetingContext, TargetingError, TargetingOutcome};

const HEADER: &str = "NPI,State,Login Time,Logout Time,Usage Time (mins),Region,Speciality";

/// Positive only for hour 8: `hour <= 7.5` → negative, `hour <= 8.5` → positive.
fn eight_oclock_forest() -> serde_json::Value {
    json!({
        "n_features": 5,
        "classes": [0, 1],
        "trees": [{
            "children_left":  [1, -1, 3, -1, -1],
            "children_right": [2, -1, 4, -1, -1],
            "feature":   [0, -2, 0, -2, -2],
            "threshold": [7.5, -2.0, 8.5, -2.0, -2.0],
            "value": [[5.0, 5.0], [4.0, 0.0], [1.0, 5.0], [0.0, 3.0], [2.0, 1.0]]
        }]
    })
}

/// Single leaf that always says positive.
fn always_positive_forest() -> serde_json::Value {
    json!({
        "n_features": 5,
        "classes": [0, 1],
        "trees": [{
            "children_left": [-1],
            "children_right": [-1],
            "feature": [-2],
            "threshold": [-2.0],
            "value": [[0.0, 1.0]]
        }]
    })
}

fn encoders() -> serde_json::Value {
    json!({
        "State": ["CA", "FL", "NY"],
        "Region": ["Central", "East"],
        "Speciality": ["Dermatology", "Neurology", "Oncology", "Pediatrics", "Radiology", "Cardiology"]
    })
}

fn write_artifacts(
    dir: &Path,
    forest: &serde_json::Value,
    rows: &[&str],
    policy: UnknownCategoryPolicy,
) -> AppConfig {
    let config = AppConfig {
        model_path: dir.join("random_forest_model.json"),
        encoders_path: dir.join("label_encoders.json"),
        dataset_path: dir.join("dummy_npi_data.csv"),
        unknown_category: policy,
        ..AppConfig::default()
    };
    std::fs::write(&config.model_path, forest.to_string()).unwrap();
    std::fs::write(&config.encoders_path, encoders().to_string()).unwrap();

    let mut csv = String::from(HEADER);
    for row in rows {
        csv.push('\n');
        csv.push_str(row);
    }
    csv.push('\n');
    std::fs::write(&config.dataset_path, csv).unwrap();
    config
}

fn load(forest: &serde_json::Value, rows: &[&str]) -> TargetingContext {
    let dir = tempfile::tempdir().unwrap();
    let config = write_artifacts(dir.path(), forest, rows, UnknownCategoryPolicy::FailRequest);
    TargetingContext::load(&config).unwrap()
}

fn ids(outcome: &TargetingOutcome) -> Vec<i64> {
    outcome
        .table()
        .map(|t| {
            t.rows
                .iter()
                .map(|r| match r[0] {
                    CellValue::Integer(i) => i,
                    ref other => panic!("unexpected id {other:?}"),
                })
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn single_doctor_matches_only_their_hour() {
    let ctx = load(
        &eight_oclock_forest(),
        &["1000000001,NY,08:15,09:00,30,East,Cardiology"],
    );

    let outcome = ctx.run(8).unwrap();
    let table = outcome.table().expect("one match");
    assert_eq!(table.columns, vec!["NPI", "State", "Region", "Speciality"]);
    assert_eq!(
        table.rows,
        vec![vec![
            CellValue::Integer(1000000001),
            CellValue::Text("NY".into()),
            CellValue::Text("East".into()),
            CellValue::Text("Cardiology".into()),
        ]]
    );

    assert_eq!(ctx.run(9).unwrap(), TargetingOutcome::NoMatches);
}

#[test]
fn unparseable_login_never_matches() {
    let ctx = load(
        &always_positive_forest(),
        &[
            "1,NY,not a time,09:00,30,East,Cardiology",
            "2,CA,,09:00,30,East,Cardiology",
            "3,FL,2024-03-08 14:10:00,2024-03-08 15:00:00,45,Central,Oncology",
        ],
    );

    for hour in 0..24 {
        let outcome = ctx.run(hour).unwrap();
        let found = ids(&outcome);
        assert!(!found.contains(&1) && !found.contains(&2), "hour {hour}");
        assert_eq!(found == vec![3], hour == 14, "hour {hour}");
    }
}

#[test]
fn unseen_category_fails_the_request() {
    let ctx = load(
        &always_positive_forest(),
        &[
            "1,NY,08:15,09:00,30,East,Cardiology",
            "2,WA,11:00,12:00,30,East,Cardiology",
        ],
    );

    match ctx.run(8) {
        Err(TargetingError::UnknownCategory { column, value }) => {
            assert_eq!(column, "State");
            assert_eq!(value, "WA");
        }
        other => panic!("expected UnknownCategory, got {other:?}"),
    }
}

#[test]
fn unseen_category_can_be_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_artifacts(
        dir.path(),
        &always_positive_forest(),
        &[
            "1,NY,08:15,09:00,30,East,Cardiology",
            "2,WA,08:20,12:00,30,East,Cardiology",
        ],
        UnknownCategoryPolicy::SkipRow,
    );
    let ctx = TargetingContext::load(&config).unwrap();
    assert_eq!(ids(&ctx.run(8).unwrap()), vec![1]);
}

#[test]
fn results_hold_hour_and_positive_for_every_hour() {
    let rows: Vec<String> = (0..48)
        .map(|i| {
            format!(
                "{},{},2024-03-08 {:02}:{:02}:00,,{},{},Cardiology",
                i,
                ["CA", "FL", "NY"][i % 3],
                (i * 7) % 24,
                i % 60,
                10 + i,
                ["Central", "East"][i % 2],
            )
        })
        .collect();
    let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
    let hour_of: HashMap<i64, u32> = (0..48).map(|i| (i as i64, ((i * 7) % 24) as u32)).collect();

    let positive = load(&always_positive_forest(), &rows);
    let eight = load(&eight_oclock_forest(), &rows);

    let mut total = 0;
    for hour in 0..24 {
        let found = ids(&positive.run(hour).unwrap());
        assert!(found.iter().all(|id| hour_of[id] == hour));
        total += found.len();

        let found = ids(&eight.run(hour).unwrap());
        assert!(found.iter().all(|id| hour_of[id] == hour));
        if hour != 8 {
            assert!(found.is_empty());
        }
    }
    assert_eq!(total, 48);
}

#[test]
fn repeated_requests_are_identical() {
    let ctx = load(
        &eight_oclock_forest(),
        &[
            "1,NY,08:15,09:00,30,East,Cardiology",
            "2,CA,08:45,09:00,12,Central,Oncology",
            "3,FL,10:00,11:00,50,East,Radiology",
        ],
    );
    let first = ctx.run(8).unwrap();
    let second = ctx.run(8).unwrap();
    assert_eq!(first, second);
    assert_eq!(ids(&first), vec![1, 2]);
}

#[test]
fn export_parses_back_to_the_result_set() {
    let ctx = load(
        &eight_oclock_forest(),
        &[
            "1,NY,08:15,09:00,30,East,Cardiology",
            "2,CA,08:45,09:00,12,Central,Oncology",
        ],
    );
    let outcome = ctx.run(8).unwrap();
    let table = outcome.table().unwrap();

    let bytes = to_csv_bytes(table).unwrap();
    assert!(bytes.starts_with(b"NPI,State,Region,Speciality\n"));
    let parsed = read_csv(csv::Reader::from_reader(bytes.as_slice())).unwrap();
    // Type guessing on re-read may differ (`"0012"` comes back as 12), so
    // compare what a reader of the file sees.
    let rendered = |t: &DataTable| -> Vec<Vec<String>> {
        t.rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect()
    };
    assert_eq!(parsed.columns, table.columns);
    assert_eq!(rendered(&parsed), rendered(table));
}

#[test]
fn missing_or_corrupt_artifacts_fail_startup() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_artifacts(
        dir.path(),
        &eight_oclock_forest(),
        &["1,NY,08:15,09:00,30,East,Cardiology"],
        UnknownCategoryPolicy::FailRequest,
    );

    let mut missing = config.clone();
    missing.model_path = dir.path().join("absent.json");
    let err = TargetingContext::load(&missing).err().unwrap();
    assert!(format!("{err:#}").contains("loading classifier"));

    std::fs::write(&config.encoders_path, "{ not json").unwrap();
    let err = TargetingContext::load(&config).err().unwrap();
    assert!(format!("{err:#}").contains("loading encoders"));

    std::fs::write(&config.encoders_path, encoders().to_string()).unwrap();
    std::fs::write(&config.dataset_path, "NPI,State\n1,NY\n").unwrap();
    let err = TargetingContext::load(&config).err().unwrap();
    assert!(format!("{err:#}").contains("dataset has no column"));
}
