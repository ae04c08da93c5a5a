//! Per-item decision: which keywords, attach points, coverage and naming
//! rules an item should end up with.
//!
//! Deciding is pure. It reads the item and the loaded tables and never
//! touches the store.

use std::collections::BTreeSet;

use crate::delta::SetDelta;
use crate::model::{ItemDecision, PatchDecision, SkipReason};
use crate::naming::select_naming_rule;
use crate::overrides::{OverrideRecord, OverrideTable};
use crate::records::ItemRecord;
use crate::rules::{self, RuleSlot};
use crate::taxonomy::SlotTaxonomy;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOptions {
    /// Name of the artifact the patched records are written to.
    pub patch_file_name: String,
    /// Strip the ballistic weave slot from armor pieces.
    pub ballistic_weave_only_for_clothes: bool,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            patch_file_name: "zPatch.esp".into(),
            ballistic_weave_only_for_clothes: true,
        }
    }
}

/// Read-only tables and settings shared by every decision in a run.
#[derive(Debug, Clone, Default)]
pub struct PatchContext {
    pub taxonomy: SlotTaxonomy,
    pub overrides: OverrideTable,
    pub options: PatchOptions,
}

/// Filter out items the patcher must not touch or cannot name.
pub fn check_eligibility(item: &ItemRecord) -> Result<(), SkipReason> {
    if !item.playable {
        return Err(SkipReason::NotPlayable);
    }
    if item.name.is_none() {
        return Err(SkipReason::MissingName);
    }
    let race = item.race.as_deref().ok_or(SkipReason::MissingRace)?;
    if race != rules::REQUIRED_RACE {
        return Err(SkipReason::WrongRace { race: race.into() });
    }
    if item.keywords.contains(rules::POWER_ARMOR_KEYWORD) {
        return Err(SkipReason::PowerArmor);
    }
    if rules::BLACKLIST.contains(&item.editor_id.as_str()) {
        return Err(SkipReason::Blacklisted);
    }
    Ok(())
}

pub fn decide_item(ctx: &PatchContext, item: &ItemRecord) -> Result<ItemDecision, SkipReason> {
    check_eligibility(item)?;

    let overrides = ctx.overrides.get(&item.source_file, &item.editor_id);
    let field = |f: fn(&OverrideRecord) -> Option<&String>| overrides.and_then(f).cloned();

    let slot_candidates: BTreeSet<String> = item
        .keywords
        .iter()
        .filter(|k| ctx.taxonomy.is_slot_keyword(k))
        .cloned()
        .collect();
    let class_candidates: BTreeSet<String> = item
        .keywords
        .iter()
        .filter(|k| rules::is_class_keyword(k))
        .cloned()
        .collect();

    let slot_keyword = match field(|o| o.slot_keyword.as_ref())
        .or_else(|| slot_candidates.first().cloned())
    {
        Some(keyword) => keyword,
        None => {
            let guess = ctx
                .taxonomy
                .guess_slot_keyword(item.slot_mask, item.is_armored());
            return Err(SkipReason::NoSlotKeyword {
                guess: guess.to_string(),
            });
        }
    };
    let class_keyword =
        field(|o| o.class_keyword.as_ref()).or_else(|| class_candidates.first().cloned());

    let descriptor = ctx
        .taxonomy
        .get(&slot_keyword)
        .ok_or_else(|| SkipReason::UnknownSlotKeyword {
            keyword: slot_keyword.clone(),
        })?;

    let mut patch = PatchDecision::default();

    if let Some(name) = field(|o| o.display_name.as_ref()) {
        if item.name.as_deref() != Some(name.as_str()) {
            patch.display_name = Some(name);
        }
    }

    let current_mask = item.slot_mask;
    let target_mask = descriptor.target_mask(current_mask, overrides.and_then(|o| o.slot_mask));
    if target_mask != current_mask {
        patch.slot_mask = Some(target_mask);
    }

    let mut keywords = SetDelta::new(&item.keywords);
    let mut attach_points = SetDelta::new(&item.attach_points);

    keywords.apply_exclusive(&slot_keyword, &slot_candidates);
    if let Some(class_keyword) = &class_keyword {
        keywords.apply_exclusive(class_keyword, &class_candidates);
    }

    keywords.remove(rules::FORBIDDEN_KEYWORDS);
    attach_points.remove(rules::FORBIDDEN_ATTACH_POINTS);
    attach_points.ensure(rules::GLOBAL_ATTACH_POINTS);

    let rule_slots = target_mask
        .slots()
        .into_iter()
        .map(RuleSlot::Body)
        .chain(descriptor.is_outfit.then_some(RuleSlot::Outfit));
    for slot_rule in rule_slots.filter_map(rules::slot_rule) {
        keywords.ensure(slot_rule.keywords);
        attach_points.ensure(slot_rule.attach_points);
    }

    let carry_capacity = overrides.and_then(|o| o.adds_carry_capacity) == Some(true)
        || rules::grants_extra_carry_weight(&slot_keyword);
    if carry_capacity {
        keywords.ensure(rules::CARRY_WEIGHT_KEYWORDS);
        attach_points.ensure(rules::CARRY_WEIGHT_ATTACH_POINTS);
    } else {
        keywords.remove(rules::CARRY_WEIGHT_KEYWORDS);
        attach_points.remove(rules::CARRY_WEIGHT_ATTACH_POINTS);
    }

    let high_tech = overrides.and_then(|o| o.is_high_tech) == Some(true)
        || class_keyword.as_deref() == Some(rules::THERMOPTIC_CLASS);
    if high_tech {
        keywords.ensure(rules::THERMOPTIC_KEYWORDS);
        attach_points.ensure(rules::THERMOPTIC_ATTACH_POINTS);
    } else {
        keywords.remove(rules::THERMOPTIC_KEYWORDS);
        attach_points.remove(rules::THERMOPTIC_ATTACH_POINTS);
    }

    if ctx.options.ballistic_weave_only_for_clothes && rules::is_armor(&slot_keyword) {
        keywords.remove(rules::BALLISTIC_WEAVE_KEYWORDS);
        attach_points.remove(rules::BALLISTIC_WEAVE_ATTACH_POINTS);
    }

    let naming_rule = select_naming_rule(&slot_keyword, class_keyword.as_deref());
    if item.naming_rules.as_deref() != Some(naming_rule.editor_id()) {
        patch.naming_rule = Some(naming_rule);
    }

    patch.add_object_template = !item.has_template_combination();

    (patch.added_keywords, patch.removed_keywords) = keywords.into_parts();
    (patch.added_attach_points, patch.removed_attach_points) = attach_points.into_parts();

    Ok(ItemDecision {
        item_id: item.editor_id.clone(),
        source_file: item.source_file.clone(),
        slot_keyword,
        class_keyword,
        target_mask,
        models: item.models.clone(),
        patch: (!patch.is_empty()).then_some(patch),
    })
}
