//! Write a sample dataset, encoder set and classifier so the app can be run
//! without the real artifacts.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use survey_targeting::config::AppConfig;
use survey_targeting::model::forest::{DecisionTree, LEAF, RandomForest};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

const STATES: &[&str] = &["CA", "FL", "GA", "IL", "NY", "OH", "PA", "TX"];
const REGIONS: &[&str] = &["Midwest", "Northeast", "South", "West"];
const SPECIALITIES: &[&str] = &[
    "Cardiology",
    "Dermatology",
    "Neurology",
    "Oncology",
    "Orthopedics",
    "Pediatrics",
    "Radiology",
];

fn sorted(items: &[&str]) -> Vec<String> {
    let mut v: Vec<String> = items.iter().map(|s| s.to_string()).collect();
    v.sort();
    v
}

/// Hand-built forest: doctors logged in during working hours with long
/// sessions are predicted to respond.
fn sample_forest() -> RandomForest {
    // Features: 0 hour, 1 state, 2 region, 3 speciality, 4 usage.
    let working_hours = DecisionTree {
        children_left: vec![1, LEAF, 3, 4, LEAF, LEAF, LEAF],
        children_right: vec![2, LEAF, 6, 5, LEAF, LEAF, LEAF],
        feature: vec![0, -2, 0, 4, -2, -2, -2],
        threshold: vec![7.5, -2.0, 18.5, 20.0, -2.0, -2.0, -2.0],
        value: vec![
            vec![50.0, 50.0],
            vec![30.0, 2.0],
            vec![20.0, 48.0],
            vec![12.0, 46.0],
            vec![9.0, 3.0],
            vec![3.0, 43.0],
            vec![8.0, 2.0],
        ],
    };
    let long_sessions = DecisionTree {
        children_left: vec![1, LEAF, LEAF],
        children_right: vec![2, LEAF, LEAF],
        feature: vec![4, -2, -2],
        threshold: vec![35.0, -2.0, -2.0],
        value: vec![vec![50.0, 50.0], vec![36.0, 14.0], vec![14.0, 36.0]],
    };
    let afternoons = DecisionTree {
        children_left: vec![1, LEAF, LEAF],
        children_right: vec![2, LEAF, LEAF],
        feature: vec![0, -2, -2],
        threshold: vec![12.5, -2.0, -2.0],
        value: vec![vec![50.0, 50.0], vec![28.0, 22.0], vec![22.0, 28.0]],
    };

    RandomForest {
        n_features: 5,
        classes: vec![0, 1],
        trees: vec![working_hours, long_sessions, afternoons],
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let config = AppConfig::default();
    let mut rng = SimpleRng::new(42);

    // Dataset
    let mut writer = csv::Writer::from_path(&config.dataset_path)
        .with_context(|| format!("creating {}", config.dataset_path.display()))?;
    writer.write_record([
        "NPI",
        "State",
        "Login Time",
        "Logout Time",
        "Usage Time (mins)",
        "Region",
        "Speciality",
        "Count of Survey Attempts",
    ])?;

    let n_rows = 1000;
    for i in 0..n_rows {
        let hour = rng.below(24);
        let minute = rng.below(60);
        let usage = 5 + rng.below(115);
        let logout_total = hour * 60 + minute + usage;
        let login = format!("2024-03-08 {hour:02}:{minute:02}:00");
        let logout = format!(
            "2024-03-{:02} {:02}:{:02}:00",
            8 + logout_total / (24 * 60),
            (logout_total / 60) % 24,
            logout_total % 60
        );
        writer.write_record([
            (1_000_000_000u64 + i).to_string(),
            rng.pick(STATES).to_string(),
            login,
            logout,
            usage.to_string(),
            rng.pick(REGIONS).to_string(),
            rng.pick(SPECIALITIES).to_string(),
            rng.below(10).to_string(),
        ])?;
    }
    writer.flush()?;

    // Encoders
    let encoders: BTreeMap<&str, Vec<String>> = BTreeMap::from([
        ("State", sorted(STATES)),
        ("Region", sorted(REGIONS)),
        ("Speciality", sorted(SPECIALITIES)),
    ]);
    std::fs::write(
        &config.encoders_path,
        serde_json::to_string_pretty(&encoders)?,
    )
    .with_context(|| format!("writing {}", config.encoders_path.display()))?;

    // Classifier
    let forest = sample_forest();
    forest.validate()?;
    std::fs::write(&config.model_path, serde_json::to_string_pretty(&forest)?)
        .with_context(|| format!("writing {}", config.model_path.display()))?;

    println!(
        "Wrote {n_rows} doctors to {}, encoders to {}, classifier to {}",
        config.dataset_path.display(),
        config.encoders_path.display(),
        config.model_path.display()
    );
    Ok(())
}
