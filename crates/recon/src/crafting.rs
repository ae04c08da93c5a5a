//! Crafting requirements derived from an item's defense rating.
//!
//! Better armor needs more ballistic fiber and more perk ranks. Perk
//! conditions are read as `<Family><two-digit rank>` (`Armorer02`); the ranks
//! of every such perk on a recipe add up toward the requirement.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::model::RecipeAdjustment;
use crate::records::{ItemRecord, RecipeRecord};

pub const FIBER_COMPONENT: &str = "c_AntiBallisticFiber";

/// Families raised to cover a shortfall, in order.
pub const PERK_FAMILIES: [&str; 2] = ["Armorer", "Science"];

pub const MAX_PERK_LEVEL: u32 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PerkRequirement {
    pub family: String,
    pub level: u32,
}

impl fmt::Display for PerkRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}", self.family, self.level)
    }
}

/// Split `Armorer03` into family and rank. `None` unless it ends in two digits.
pub fn parse_perk(editor_id: &str) -> Option<PerkRequirement> {
    let split = editor_id.len().checked_sub(2)?;
    if !editor_id.is_char_boundary(split) {
        return None;
    }
    let (family, digits) = editor_id.split_at(split);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(PerkRequirement {
        family: family.to_string(),
        level: digits.parse().ok()?,
    })
}

/// Fiber count for a defense rating, `floor(rating * 3 / 10)`. Computed wide
/// so any snapshot rating is accepted.
pub fn required_material_count(armor_rating: u32) -> u32 {
    let count = u64::from(armor_rating) * 3 / 10;
    u32::try_from(count).unwrap_or(u32::MAX)
}

pub fn required_perk_level(armor_rating: u32) -> u32 {
    armor_rating / 10 + 1
}

/// Perk edits that raise a recipe's total rank to at least `required`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PerkAllocation {
    pub added: Vec<String>,
    pub removed: BTreeSet<String>,
}

/// Cover the gap between `required` and the ranks already on the recipe.
///
/// Families in [`PERK_FAMILIES`] are raised in turn, each capped at
/// [`MAX_PERK_LEVEL`]. A raised family's existing perk is replaced. A family
/// already at the cap is passed over. If both saturate the gap stays open.
pub fn allocate_perks<'a, I>(present: I, required: u32) -> PerkAllocation
where
    I: IntoIterator<Item = &'a str>,
{
    let mut total = 0u32;
    let mut by_family: HashMap<String, (String, u32)> = HashMap::new();
    for editor_id in present {
        if let Some(perk) = parse_perk(editor_id) {
            total += perk.level;
            by_family.insert(perk.family, (editor_id.to_string(), perk.level));
        }
    }

    let mut allocation = PerkAllocation::default();
    let mut missing = required.saturating_sub(total);

    for family in PERK_FAMILIES {
        if missing == 0 {
            break;
        }
        let mut level = 0;
        if let Some((existing, existing_level)) = by_family.get(family) {
            if *existing_level >= MAX_PERK_LEVEL {
                continue;
            }
            level = *existing_level;
            allocation.removed.insert(existing.clone());
        }
        let raise = missing.min(MAX_PERK_LEVEL - level);
        level += raise;
        missing -= raise;
        allocation.added.push(
            PerkRequirement {
                family: family.to_string(),
                level,
            }
            .to_string(),
        );
    }

    allocation
}

/// Crafting corrections for a recipe producing `item`, if any are needed.
pub fn decide_recipe(recipe: &RecipeRecord, item: &ItemRecord) -> Option<RecipeAdjustment> {
    let mut adjustment = RecipeAdjustment::default();

    if let Some(rating) = item.armor_rating {
        let count = required_material_count(rating);
        let needs_update = match recipe.component_count(FIBER_COMPONENT) {
            Some(current) => current != count,
            None => count != 0,
        };
        if needs_update {
            adjustment.material_count = Some(count);
        }

        let perks = allocate_perks(recipe.perk_conditions(), required_perk_level(rating));
        adjustment.added_perks = perks.added;
        adjustment.removed_perks = perks.removed;
    }

    adjustment.ensure_produces_one_unit = recipe.created_count.is_none();

    (!adjustment.is_empty()).then_some(adjustment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{Component, Condition};
    use proptest::prelude::*;

    fn item(rating: Option<u32>) -> ItemRecord {
        serde_json::from_value(serde_json::json!({
            "editorId": "Armor_Test",
            "sourceFile": "Mod.esp",
            "armorRating": rating,
        }))
        .unwrap()
    }

    fn recipe(perks: &[&str]) -> RecipeRecord {
        RecipeRecord {
            editor_id: "co_Armor_Test".into(),
            created_object: Some("Armor_Test".into()),
            components: Vec::new(),
            conditions: perks.iter().map(|p| Condition::has_perk(*p)).collect(),
            created_count: Some(1),
        }
    }

    #[test]
    fn parse_perk_names() {
        assert_eq!(
            parse_perk("Armorer03"),
            Some(PerkRequirement {
                family: "Armorer".into(),
                level: 3
            })
        );
        assert_eq!(parse_perk("Science10").unwrap().level, 10);
        assert_eq!(parse_perk("Gunsmith"), None);
        assert_eq!(parse_perk("7"), None);
        assert_eq!(parse_perk("Perk1a"), None);
    }

    #[test]
    fn requirement_formulas() {
        assert_eq!(required_material_count(25), 7);
        assert_eq!(required_material_count(3), 0);
        assert_eq!(required_perk_level(0), 1);
        assert_eq!(required_perk_level(25), 3);
        assert_eq!(required_perk_level(39), 4);
    }

    #[test]
    fn huge_rating_does_not_overflow() {
        assert_eq!(required_material_count(2_000_000_000), 600_000_000);
        assert_eq!(required_material_count(u32::MAX), 1_288_490_188);
        assert_eq!(required_perk_level(u32::MAX), 429_496_730);

        let adjustment = decide_recipe(&recipe(&[]), &item(Some(u32::MAX))).unwrap();
        assert_eq!(adjustment.material_count, Some(1_288_490_188));
        assert_eq!(adjustment.added_perks, vec!["Armorer04", "Science04"]);
    }

    #[test]
    fn both_families_saturate_above_eight() {
        let allocation = allocate_perks([], 12);
        assert_eq!(allocation.added, vec!["Armorer04", "Science04"]);
        assert!(allocation.removed.is_empty());

        let allocation = allocate_perks(["Armorer02", "Science01"], 9);
        assert_eq!(allocation.added, vec!["Armorer04", "Science04"]);
        assert_eq!(
            allocation.removed,
            BTreeSet::from(["Armorer02".to_string(), "Science01".to_string()])
        );
    }

    #[test]
    fn rating_25_without_perks() {
        let adjustment = decide_recipe(&recipe(&[]), &item(Some(25))).unwrap();
        assert_eq!(adjustment.material_count, Some(7));
        assert_eq!(adjustment.added_perks, vec!["Armorer03"]);
        assert!(adjustment.removed_perks.is_empty());
        assert!(!adjustment.ensure_produces_one_unit);
    }

    #[test]
    fn raising_replaces_existing_perk() {
        let allocation = allocate_perks(["Armorer01"], 3);
        assert_eq!(allocation.added, vec!["Armorer03"]);
        assert_eq!(allocation.removed, BTreeSet::from(["Armorer01".to_string()]));
    }

    #[test]
    fn overflow_spills_into_science() {
        let allocation = allocate_perks(["Armorer02"], 7);
        assert_eq!(allocation.added, vec!["Armorer04", "Science03"]);
        assert_eq!(allocation.removed, BTreeSet::from(["Armorer02".to_string()]));
    }

    #[test]
    fn saturated_family_is_skipped() {
        let allocation = allocate_perks(["Armorer04"], 6);
        assert_eq!(allocation.added, vec!["Science02"]);
        assert!(allocation.removed.is_empty());

        let allocation = allocate_perks(["Armorer04", "Science04"], 10);
        assert_eq!(allocation, PerkAllocation::default());
    }

    #[test]
    fn other_perks_count_toward_total() {
        let allocation = allocate_perks(["Gunsmith02", "Armorer01"], 3);
        assert_eq!(allocation, PerkAllocation::default());
    }

    #[test]
    fn satisfied_recipe_needs_nothing() {
        let mut r = recipe(&["Armorer03"]);
        r.components.push(Component {
            component: FIBER_COMPONENT.into(),
            count: 7,
        });
        assert_eq!(decide_recipe(&r, &item(Some(25))), None);
    }

    #[test]
    fn zero_fibers_not_added() {
        let r = recipe(&["Armorer01"]);
        assert_eq!(decide_recipe(&r, &item(Some(2))), None);
    }

    #[test]
    fn missing_created_count_without_rating() {
        let mut r = recipe(&[]);
        r.created_count = None;
        let adjustment = decide_recipe(&r, &item(None)).unwrap();
        assert!(adjustment.ensure_produces_one_unit);
        assert_eq!(adjustment.material_count, None);
        assert!(adjustment.added_perks.is_empty());
    }

    fn arb_perk() -> impl Strategy<Value = String> {
        (
            prop_oneof![Just("Armorer"), Just("Science"), Just("Gunsmith")],
            0u32..=5,
        )
            .prop_map(|(family, level)| format!("{family}{level:02}"))
    }

    proptest! {
        #[test]
        fn allocation_caps_and_covers(
            present in proptest::collection::btree_set(arb_perk(), 0..4),
            rating in 0u32..200,
        ) {
            let required = required_perk_level(rating);
            let allocation = allocate_perks(present.iter().map(String::as_str), required);

            for added in &allocation.added {
                let perk = parse_perk(added).unwrap();
                prop_assert!(perk.level >= 1 && perk.level <= MAX_PERK_LEVEL);
                prop_assert!(PERK_FAMILIES.contains(&perk.family.as_str()));
            }
            for removed in &allocation.removed {
                prop_assert!(present.contains(removed));
            }

            // Total after applying the allocation.
            let mut after: Vec<String> = present
                .iter()
                .filter(|p| !allocation.removed.contains(*p))
                .cloned()
                .collect();
            after.extend(allocation.added.iter().cloned());
            let total: u32 = after.iter().filter_map(|p| parse_perk(p)).map(|p| p.level).sum();

            let before: u32 = present.iter().filter_map(|p| parse_perk(p)).map(|p| p.level).sum();
            if before >= required {
                prop_assert!(allocation.added.is_empty());
            } else {
                prop_assert!(total >= before);
            }

            if required <= 2 * MAX_PERK_LEVEL {
                prop_assert!(total >= required, "total {} below required {}", total, required);
            }
            if total < required {
                // Only possible once both families are at the cap.
                for family in PERK_FAMILIES {
                    let capped = after
                        .iter()
                        .filter_map(|p| parse_perk(p))
                        .any(|p| p.family == family && p.level >= MAX_PERK_LEVEL);
                    prop_assert!(capped, "{} not saturated", family);
                }
            }

            // Re-allocating after applying asks for nothing new.
            let again = allocate_perks(after.iter().map(String::as_str), required);
            prop_assert!(again.added.is_empty());
        }
    }
}
