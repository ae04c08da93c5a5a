use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ReconError;
use crate::slots::{parse_slot_list, SlotMask};

/// Slot keyword used when nothing in the taxonomy identifies an item.
pub const DEVICE_SLOT_KEYWORD: &str = "_ClothingSlotDevice";

/// One row of the slot taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotDescriptor {
    pub keyword: String,
    /// Bits an item must cover to be guessed as this slot. Empty never matches.
    pub identify_mask: SlotMask,
    pub mandatory_mask: SlotMask,
    pub allowed_mask: SlotMask,
    pub is_armored: bool,
    pub is_outfit: bool,
}

impl SlotDescriptor {
    /// Target coverage for an item classified as this slot.
    ///
    /// An override is used verbatim; otherwise coverage outside the allowed
    /// mask is dropped and the mandatory bits are forced on.
    pub fn target_mask(&self, current: SlotMask, override_mask: Option<SlotMask>) -> SlotMask {
        match override_mask {
            Some(mask) => mask,
            None => (current & self.allowed_mask) | self.mandatory_mask,
        }
    }

    fn identifies(&self, mask: SlotMask) -> bool {
        !self.identify_mask.is_empty() && mask.contains(self.identify_mask)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SlotDataRow {
    keyword: String,
    #[serde(default)]
    identify_slots: String,
    #[serde(default)]
    mandatory_slots: String,
    #[serde(default)]
    allowed_slots: String,
    #[serde(default)]
    is_armored: String,
    #[serde(default)]
    is_outfit: String,
}

pub(crate) fn is_truth_marker(value: &str) -> bool {
    value.trim() == "Y"
}

/// Slot descriptors in file order, indexed by keyword.
#[derive(Debug, Clone, Default)]
pub struct SlotTaxonomy {
    descriptors: Vec<SlotDescriptor>,
    by_keyword: HashMap<String, usize>,
}

impl SlotTaxonomy {
    pub fn new(descriptors: Vec<SlotDescriptor>) -> Result<Self, ReconError> {
        let mut by_keyword = HashMap::with_capacity(descriptors.len());
        for (index, descriptor) in descriptors.iter().enumerate() {
            if descriptor.keyword.is_empty() {
                return Err(ReconError::Taxonomy(format!("row {}: empty keyword", index + 1)));
            }
            if by_keyword.insert(descriptor.keyword.clone(), index).is_some() {
                return Err(ReconError::Taxonomy(format!(
                    "duplicate keyword '{}'",
                    descriptor.keyword
                )));
            }
        }
        Ok(Self {
            descriptors,
            by_keyword,
        })
    }

    pub fn from_csv(source_name: &str, csv_data: &str) -> Result<Self, ReconError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(csv_data.as_bytes());

        let mut descriptors = Vec::new();
        for row in reader.deserialize::<SlotDataRow>() {
            let row = row.map_err(|e| ReconError::csv(source_name, e))?;
            let slots = |value: &str| {
                parse_slot_list(value).map_err(|e| {
                    ReconError::Taxonomy(format!("{source_name}: keyword '{}': {e}", row.keyword))
                })
            };
            descriptors.push(SlotDescriptor {
                identify_mask: slots(&row.identify_slots)?,
                mandatory_mask: slots(&row.mandatory_slots)?,
                allowed_mask: slots(&row.allowed_slots)?,
                is_armored: is_truth_marker(&row.is_armored),
                is_outfit: is_truth_marker(&row.is_outfit),
                keyword: row.keyword,
            });
        }

        Self::new(descriptors)
    }

    pub fn load(path: &Path) -> Result<Self, ReconError> {
        let csv_data = std::fs::read_to_string(path)
            .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))?;
        Self::from_csv(&path.display().to_string(), &csv_data)
    }

    pub fn get(&self, keyword: &str) -> Option<&SlotDescriptor> {
        self.by_keyword.get(keyword).map(|&i| &self.descriptors[i])
    }

    pub fn is_slot_keyword(&self, keyword: &str) -> bool {
        self.by_keyword.contains_key(keyword)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Best-effort slot keyword for an item that carries none.
    ///
    /// Candidates are descriptors whose identify mask is covered by `current`.
    /// The first candidate whose armored flag matches `armored` wins, then the
    /// first candidate at all, then [`DEVICE_SLOT_KEYWORD`].
    pub fn guess_slot_keyword(&self, current: SlotMask, armored: bool) -> &str {
        let mut candidates = self.descriptors.iter().filter(|d| d.identifies(current));
        let first = candidates.clone().next();
        candidates
            .find(|d| d.is_armored == armored)
            .or(first)
            .map_or(DEVICE_SLOT_KEYWORD, |d| d.keyword.as_str())
    }
}
