use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// LabelEncoder – one categorical column
// ---------------------------------------------------------------------------

/// Bijection between category strings and integer codes.
///
/// The code of a class is its position in `classes`, exactly as a fitted
/// label encoder stores it.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelEncoder {
    /// Build an encoder from its ordered class list.  Duplicates are rejected.
    pub fn new(classes: Vec<String>) -> Result<Self> {
        let mut index = HashMap::with_capacity(classes.len());
        for (code, class) in classes.iter().enumerate() {
            if index.insert(class.clone(), code).is_some() {
                bail!("duplicate class '{class}'");
            }
        }
        Ok(LabelEncoder { classes, index })
    }

    /// Forward mapping.  `None` for a value not seen at training time.
    pub fn encode(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    /// Inverse mapping.
    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

// ---------------------------------------------------------------------------
// EncoderSet – column name → encoder
// ---------------------------------------------------------------------------

/// All encoders shipped with the model, keyed by column name.
#[derive(Debug, Clone, Default)]
pub struct EncoderSet {
    encoders: BTreeMap<String, LabelEncoder>,
}

/// On-disk layout: `{ "State": ["CA", "NY", ...], ... }`.
#[derive(Deserialize)]
#[serde(transparent)]
struct EncoderFile(BTreeMap<String, Vec<String>>);

impl EncoderSet {
    /// Load the encoder artifact from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading encoders {}", path.display()))?;
        let set = Self::from_json(&text)
            .with_context(|| format!("parsing encoders {}", path.display()))?;
        log::info!(
            "Loaded encoders for {:?} from {}",
            set.columns().collect::<Vec<_>>(),
            path.display()
        );
        Ok(set)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let EncoderFile(raw) = serde_json::from_str(text).context("parsing encoder JSON")?;
        let mut encoders = BTreeMap::new();
        for (column, classes) in raw {
            let encoder =
                LabelEncoder::new(classes).with_context(|| format!("encoder for '{column}'"))?;
            encoders.insert(column, encoder);
        }
        Ok(EncoderSet { encoders })
    }

    pub fn get(&self, column: &str) -> Option<&LabelEncoder> {
        self.encoders.get(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }
}
