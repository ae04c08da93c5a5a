//! Host record shapes, as read from and written back to a record snapshot.
//!
//! Only the fields the patcher reads or writes are modelled. Field names
//! follow the snapshot's camelCase JSON.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::slots::SlotMask;

pub const HAS_PERK: &str = "HasPerk";

fn default_true() -> bool {
    true
}

fn mask_absent(mask: &SlotMask) -> bool {
    mask.is_empty()
}

/// An equipment item (armor or clothing) in its winning state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub editor_id: String,
    /// Plugin that owns the master record; scopes override lookups.
    pub source_file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_true")]
    pub playable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race: Option<String>,
    #[serde(default)]
    pub keywords: BTreeSet<String>,
    #[serde(default)]
    pub attach_points: BTreeSet<String>,
    /// Zero means the coverage field is absent.
    #[serde(default, skip_serializing_if = "mask_absent")]
    pub slot_mask: SlotMask,
    /// `None` when the item has no armor data block at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub armor_rating: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naming_rules: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_template: Option<ObjectTemplate>,
    /// Editor IDs of the model sub-records this item references.
    #[serde(default)]
    pub models: Vec<String>,
}

impl ItemRecord {
    pub fn is_armored(&self) -> bool {
        self.armor_rating.is_some_and(|rating| rating > 0)
    }

    pub fn has_template_combination(&self) -> bool {
        self.object_template
            .as_ref()
            .is_some_and(|t| !t.combinations.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectTemplate {
    #[serde(default)]
    pub combinations: Vec<Combination>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combination {
    pub addon_index: i32,
    #[serde(default)]
    pub default: bool,
}

impl Combination {
    /// The catch-all combination: no addon, selected by default.
    pub const DEFAULT: Combination = Combination {
        addon_index: -1,
        default: true,
    };
}

/// A model sub-record shared by one or more items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRecord {
    pub editor_id: String,
    #[serde(default, skip_serializing_if = "mask_absent")]
    pub slot_mask: SlotMask,
}

/// A crafting recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRecord {
    pub editor_id: String,
    /// Editor ID of the produced item; `None` when the recipe produces nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_object: Option<String>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_count: Option<u32>,
}

impl RecipeRecord {
    pub fn component_count(&self, component: &str) -> Option<u32> {
        self.components
            .iter()
            .find(|c| c.component == component)
            .map(|c| c.count)
    }

    /// Perk editor IDs referenced by `HasPerk` conditions, in record order.
    pub fn perk_conditions(&self) -> impl Iterator<Item = &str> {
        self.conditions
            .iter()
            .filter(|c| c.function == HAS_PERK)
            .filter_map(|c| c.parameter.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub component: String,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Comparison {
    #[default]
    EqualTo,
    NotEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunOn {
    #[default]
    Subject,
    Target,
    Reference,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub function: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    #[serde(default)]
    pub comparison: Comparison,
    #[serde(default)]
    pub value: f32,
    #[serde(default)]
    pub run_on: RunOn,
}

impl Condition {
    /// `HasPerk <perk> == 1`, run on the subject.
    pub fn has_perk(perk: impl Into<String>) -> Self {
        Self {
            function: HAS_PERK.into(),
            parameter: Some(perk.into()),
            comparison: Comparison::EqualTo,
            value: 1.0,
            run_on: RunOn::Subject,
        }
    }

    pub fn is_perk(&self, perk: &str) -> bool {
        self.function == HAS_PERK && self.parameter.as_deref() == Some(perk)
    }
}

/// A full record snapshot, or the patched subset of one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSet {
    #[serde(default)]
    pub items: Vec<ItemRecord>,
    #[serde(default)]
    pub models: Vec<ModelRecord>,
    #[serde(default)]
    pub recipes: Vec<RecipeRecord>,
}

impl RecordSet {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.models.is_empty() && self.recipes.is_empty()
    }
}
