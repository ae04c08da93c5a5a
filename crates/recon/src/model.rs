use std::collections::BTreeSet;

use serde::Serialize;

use crate::guesses::GuessEntry;
use crate::naming::NamingRule;
use crate::slots::SlotMask;

// ---------------------------------------------------------------------------
// Decisions
// ---------------------------------------------------------------------------

/// Sparse set of corrections for one item. Empty means "leave it alone".
///
/// No member is ever in both the added and removed set of the same kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchDecision {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_mask: Option<SlotMask>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub added_keywords: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub removed_keywords: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub added_attach_points: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub removed_attach_points: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub naming_rule: Option<NamingRule>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub add_object_template: bool,
}

impl PatchDecision {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.slot_mask.is_none()
            && self.added_keywords.is_empty()
            && self.removed_keywords.is_empty()
            && self.added_attach_points.is_empty()
            && self.removed_attach_points.is_empty()
            && self.naming_rule.is_none()
            && !self.add_object_template
    }
}

/// Outcome of deciding one eligible item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDecision {
    pub item_id: String,
    pub source_file: String,
    pub slot_keyword: String,
    pub class_keyword: Option<String>,
    /// Final coverage, whether or not it changed. Feeds model propagation.
    pub target_mask: SlotMask,
    pub models: Vec<String>,
    pub patch: Option<PatchDecision>,
}

/// Why an item was left out of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    NotPlayable,
    PowerArmor,
    Blacklisted,
    WrongRace { race: String },
    MissingName,
    MissingRace,
    /// No slot keyword from overrides or tags; `guess` is the heuristic pick.
    NoSlotKeyword { guess: String },
    UnknownSlotKeyword { keyword: String },
}

impl SkipReason {
    /// Items the patcher is not meant to touch at all, as opposed to items
    /// it could not handle.
    pub fn is_ignored(&self) -> bool {
        matches!(
            self,
            Self::NotPlayable | Self::PowerArmor | Self::Blacklisted | Self::WrongRace { .. }
        )
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPlayable => write!(f, "not playable"),
            Self::PowerArmor => write!(f, "power armor"),
            Self::Blacklisted => write!(f, "blacklisted"),
            Self::WrongRace { race } => write!(f, "race is {race}"),
            Self::MissingName => write!(f, "no display name"),
            Self::MissingRace => write!(f, "no race"),
            Self::NoSlotKeyword { guess } => write!(f, "no slot keyword, but it could be {guess}"),
            Self::UnknownSlotKeyword { keyword } => write!(f, "no slot data for {keyword}"),
        }
    }
}

/// Crafting corrections for one recipe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeAdjustment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_count: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub added_perks: Vec<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub removed_perks: BTreeSet<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ensure_produces_one_unit: bool,
}

impl RecipeAdjustment {
    pub fn is_empty(&self) -> bool {
        self.material_count.is_none()
            && self.added_perks.is_empty()
            && self.removed_perks.is_empty()
            && !self.ensure_produces_one_unit
    }
}

/// Union of target coverage over every item referencing one model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelGroup {
    pub model_id: String,
    pub unioned_slot_mask: SlotMask,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    pub item_id: String,
    pub source_file: String,
    pub slot_keyword: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_keyword: Option<String>,
    #[serde(flatten)]
    pub decision: PatchDecision,
    /// Non-critical writes that failed; the rest of the item was patched.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePatch {
    pub recipe_id: String,
    pub created_object: String,
    #[serde(flatten)]
    pub adjustment: RecipeAdjustment,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedItem {
    pub item_id: String,
    pub source_file: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Item,
    Model,
    Recipe,
}

/// A record whose patch could not be written.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyFailure {
    pub kind: RecordKind,
    pub record_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchSummary {
    pub items_considered: usize,
    pub items_ignored: usize,
    pub items_skipped: usize,
    pub items_unchanged: usize,
    pub items_patched: usize,
    pub items_degraded: usize,
    pub items_failed: usize,
    pub guesses: usize,
    pub models_updated: usize,
    pub recipes_patched: usize,
    pub recipes_failed: usize,
    pub override_sources: usize,
    pub override_source_failures: usize,
}

impl PatchSummary {
    pub fn has_failures(&self) -> bool {
        self.items_failed > 0 || self.recipes_failed > 0
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchMeta {
    pub patch_file_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchReport {
    pub meta: PatchMeta,
    pub summary: PatchSummary,
    pub items: Vec<ItemPatch>,
    pub models: Vec<ModelGroup>,
    pub recipes: Vec<RecipePatch>,
    pub skipped: Vec<SkippedItem>,
    pub guesses: Vec<GuessEntry>,
    pub failures: Vec<ApplyFailure>,
}
