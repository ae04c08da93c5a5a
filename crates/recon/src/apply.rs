//! Writing decisions back through the record store.

use crate::crafting::FIBER_COMPONENT;
use crate::error::ReconError;
use crate::model::{PatchDecision, RecipeAdjustment};
use crate::store::RecordStore;

/// What happened to the optional parts of an applied patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Non-critical writes that failed.
    pub degraded: Vec<String>,
}

/// Apply one item decision.
///
/// Any failed write aborts the item except the default object template,
/// which only degrades it: naming rules may then not take effect in game,
/// but the rest of the patch is still valid.
pub fn apply_item<S: RecordStore + ?Sized>(
    store: &mut S,
    item_id: &str,
    patch: &PatchDecision,
) -> Result<ApplyOutcome, ReconError> {
    let mut outcome = ApplyOutcome::default();

    if let Some(name) = &patch.display_name {
        store.set_display_name(item_id, name)?;
    }
    for keyword in &patch.removed_keywords {
        store.remove_keyword(item_id, keyword)?;
    }
    for keyword in &patch.added_keywords {
        store.add_keyword(item_id, keyword)?;
    }
    for attach_point in &patch.removed_attach_points {
        store.remove_attach_point(item_id, attach_point)?;
    }
    for attach_point in &patch.added_attach_points {
        store.add_attach_point(item_id, attach_point)?;
    }
    if let Some(mask) = patch.slot_mask {
        store.set_item_slot_mask(item_id, mask)?;
    }
    if let Some(rule) = patch.naming_rule {
        store.set_naming_rules(item_id, rule.editor_id())?;
    }
    if patch.add_object_template {
        if let Err(err) = store.add_default_object_template(item_id) {
            tracing::warn!(
                item = item_id,
                error = %err,
                "failed to add default object template, instance naming rules may not work"
            );
            outcome.degraded.push(format!("object template: {err}"));
        }
    }

    Ok(outcome)
}

pub fn apply_recipe<S: RecordStore + ?Sized>(
    store: &mut S,
    recipe_id: &str,
    adjustment: &RecipeAdjustment,
) -> Result<(), ReconError> {
    if adjustment.ensure_produces_one_unit {
        store.set_created_count(recipe_id, 1)?;
    }
    if let Some(count) = adjustment.material_count {
        store.set_component_count(recipe_id, FIBER_COMPONENT, count)?;
    }
    for perk in &adjustment.removed_perks {
        store.remove_perk_condition(recipe_id, perk)?;
    }
    for perk in &adjustment.added_perks {
        store.add_perk_condition(recipe_id, perk)?;
    }
    Ok(())
}
