//! Report of items skipped for lacking a slot keyword, with the heuristic
//! pick for each. Meant to be reviewed and folded back into override sources.

use std::path::Path;

use serde::Serialize;

use crate::error::ReconError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuessEntry {
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "armorEditorID")]
    pub armor_editor_id: String,
    #[serde(rename = "slotKeyword")]
    pub slot_keyword: String,
}

#[derive(Debug, Clone, Default)]
pub struct GuessLog {
    entries: Vec<GuessEntry>,
}

impl GuessLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: GuessEntry) {
        self.entries.push(entry);
    }

    pub fn into_entries(self) -> Vec<GuessEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Header row plus one CRLF-terminated row per guess.
pub fn to_csv(entries: &[GuessEntry]) -> Result<String, ReconError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    if entries.is_empty() {
        writer
            .write_record(["fileName", "armorEditorID", "slotKeyword"])
            .map_err(|e| ReconError::csv("guesses", e))?;
    }
    for entry in entries {
        writer
            .serialize(entry)
            .map_err(|e| ReconError::csv("guesses", e))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ReconError::csv("guesses", e.error()))?;
    String::from_utf8(bytes).map_err(|e| ReconError::csv("guesses", e))
}

pub fn write_guesses(path: &Path, entries: &[GuessEntry]) -> Result<(), ReconError> {
    let data = to_csv(entries)?;
    std::fs::write(path, data)
        .map_err(|e| ReconError::Io(format!("cannot write {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(file: &str, item: &str, keyword: &str) -> GuessEntry {
        GuessEntry {
            file_name: file.into(),
            armor_editor_id: item.into(),
            slot_keyword: keyword.into(),
        }
    }

    #[test]
    fn csv_has_header_and_crlf() {
        let mut log = GuessLog::new();
        log.push(entry("Mod.esp", "Hat_Red", "_ClothingSlotHat_Slot30"));
        log.push(entry("Mod, Extra.esp", "Trinket", "_ClothingSlotDevice"));

        let csv = to_csv(&log.into_entries()).unwrap();
        assert_eq!(
            csv,
            "fileName,armorEditorID,slotKeyword\r\n\
             Mod.esp,Hat_Red,_ClothingSlotHat_Slot30\r\n\
             \"Mod, Extra.esp\",Trinket,_ClothingSlotDevice\r\n"
        );
    }

    #[test]
    fn empty_log_is_header_only() {
        assert_eq!(
            to_csv(&[]).unwrap(),
            "fileName,armorEditorID,slotKeyword\r\n"
        );
    }

    #[test]
    fn write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guesses.csv");
        write_guesses(&path, &[entry("Mod.esp", "Hat_Red", "_ClothingSlotHat_Slot30")]).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("fileName,armorEditorID,slotKeyword\r\n"));
    }
}
