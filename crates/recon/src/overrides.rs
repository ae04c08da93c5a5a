//! Per-item overrides, one CSV per content source.
//!
//! A source file is named after the plugin that authored the items it
//! corrects (`Armorsmith Extended.esp.csv` overrides items whose master record
//! lives in `Armorsmith Extended.esp`).

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::slots::{parse_slot_list, SlotMask};
use crate::taxonomy::is_truth_marker;

/// Authoritative corrections for one item. `None` means "derive it".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverrideRecord {
    pub item_id: String,
    pub slot_keyword: Option<String>,
    pub class_keyword: Option<String>,
    pub slot_mask: Option<SlotMask>,
    pub adds_carry_capacity: Option<bool>,
    pub is_high_tech: Option<bool>,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OverrideRow {
    #[serde(rename = "armorEditorID")]
    armor_editor_id: String,
    #[serde(rename = "slotKeyword", default)]
    slot_keyword: String,
    #[serde(rename = "classKeyword", default)]
    class_keyword: String,
    #[serde(rename = "slotMask", default)]
    slot_mask: String,
    #[serde(rename = "addsCarryWeight", default)]
    adds_carry_weight: String,
    #[serde(rename = "isHighTech", default)]
    is_high_tech: String,
    #[serde(default)]
    name: String,
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn flag(value: &str) -> Option<bool> {
    if value.is_empty() {
        None
    } else {
        Some(is_truth_marker(value))
    }
}

/// A source that could not be used; its items fall back to derived values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source_file: String,
    pub message: String,
}

/// Overrides keyed by (source file, item editor ID).
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    sources: BTreeMap<String, HashMap<String, OverrideRecord>>,
    failures: Vec<SourceFailure>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse one source. Later rows for the same item replace earlier ones.
    pub fn parse_source(
        source_file: &str,
        csv_data: &str,
    ) -> Result<HashMap<String, OverrideRecord>, ReconError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(csv_data.as_bytes());

        let mut records = HashMap::new();
        for row in reader.deserialize::<OverrideRow>() {
            let row = row.map_err(|e| ReconError::csv(source_file, e))?;
            if row.armor_editor_id.is_empty() {
                continue;
            }
            let slot_mask = if row.slot_mask.is_empty() {
                None
            } else {
                Some(parse_slot_list(&row.slot_mask).map_err(|e| {
                    ReconError::csv(source_file, format!("item '{}': {e}", row.armor_editor_id))
                })?)
            };
            let record = OverrideRecord {
                slot_mask,
                adds_carry_capacity: flag(&row.adds_carry_weight),
                is_high_tech: flag(&row.is_high_tech),
                slot_keyword: non_empty(row.slot_keyword),
                class_keyword: non_empty(row.class_keyword),
                display_name: non_empty(row.name),
                item_id: row.armor_editor_id,
            };
            if records.insert(record.item_id.clone(), record).is_some() {
                tracing::debug!(file = source_file, "duplicate override row, keeping the last");
            }
        }
        Ok(records)
    }

    pub fn insert_source(&mut self, source_file: impl Into<String>, records: HashMap<String, OverrideRecord>) {
        self.sources.insert(source_file.into(), records);
    }

    pub fn record_failure(&mut self, source_file: impl Into<String>, err: &ReconError) {
        let source_file = source_file.into();
        tracing::warn!(file = %source_file, error = %err, "override source unavailable");
        self.failures.push(SourceFailure {
            source_file,
            message: err.to_string(),
        });
    }

    /// Load every `*.csv` in `dir`, reading the files concurrently.
    ///
    /// A missing directory or an unreadable/malformed file is recorded as a
    /// failure for that source only.
    pub fn load_dir(dir: &Path) -> Self {
        let mut table = Self::new();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                let err = ReconError::Io(format!("cannot list {}: {e}", dir.display()));
                table.record_failure(dir.display().to_string(), &err);
                return table;
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
            })
            .collect();
        paths.sort();

        let loaded: Vec<(String, Result<HashMap<String, OverrideRecord>, ReconError>)> = paths
            .par_iter()
            .map(|path| {
                let source_file = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_default();
                tracing::debug!(file = %source_file, path = %path.display(), "loading overrides");
                let result = std::fs::read_to_string(path)
                    .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))
                    .and_then(|data| Self::parse_source(&source_file, &data));
                (source_file, result)
            })
            .collect();

        for (source_file, result) in loaded {
            match result {
                Ok(records) => {
                    tracing::info!(file = %source_file, overrides = records.len(), "loaded overrides");
                    table.insert_source(source_file, records);
                }
                Err(err) => table.record_failure(source_file, &err),
            }
        }

        table
    }

    pub fn get(&self, source_file: &str, item_id: &str) -> Option<&OverrideRecord> {
        self.sources.get(source_file)?.get(item_id)
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Total override rows across all sources.
    pub fn len(&self) -> usize {
        self.sources.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn failures(&self) -> &[SourceFailure] {
        &self.failures
    }
}
