//! Static keyword and attach-point rules.

/// Keywords that must never stay on a patched item.
pub const FORBIDDEN_KEYWORDS: &[&str] = &[
    "ma_armor_lining",
    "ma_VaultSuit",
    "ma_armor_Metal_Torso",
    "ma_armor_Lining_Leather_LimbArm",
    "ma_armor_Lining_Leather_LimbLeg",
];

pub const FORBIDDEN_ATTACH_POINTS: &[&str] = &["ap_armor_Lining"];

/// Attach points every patched item carries.
pub const GLOBAL_ATTACH_POINTS: &[&str] = &["ap_Legendary"];

pub const CARRY_WEIGHT_KEYWORDS: &[&str] = &["AEC_ma_armor_CarryWeight"];
pub const CARRY_WEIGHT_ATTACH_POINTS: &[&str] =
    &["AEC_ap_CarryWeightBaseEffect", "AEC_ap_CarryWeightModifier"];

/// Slot keywords that always grant carry capacity.
pub const EXTRA_CARRY_WEIGHT_SLOTS: &[&str] = &[
    "_ClothingSlotBackpack_Slot54",
    "_ClothingSlotBandolier_Slot56",
    "_ClothingSlotBelt_Slot57",
    "_ClothingSlotPack_Slot54",
    "_ClothingSlotSatchel_Slot55",
    "_ClothingSlotTacticalVest_Slot57",
];

pub const THERMOPTIC_CLASS: &str = "_ArmorClassThermOptics";
pub const THERMOPTIC_KEYWORDS: &[&str] = &["AEC_ma_armor_ThermOptics"];
pub const THERMOPTIC_ATTACH_POINTS: &[&str] = &["AEC_ap_ThermOptics"];

pub const BALLISTIC_WEAVE_KEYWORDS: &[&str] = &["ma_Railroad_ClothingArmor"];
pub const BALLISTIC_WEAVE_ATTACH_POINTS: &[&str] = &["ap_Railroad_ClothingArmor"];

pub const VAULT_SUIT_SLOT: &str = "_ClothesTypeUnderarmor_Slot33";
pub const VAULT_SUIT_CLASS: &str = "_ClothingClassVault-Tec";

pub const POWER_ARMOR_KEYWORD: &str = "ArmorTypePower";
pub const REQUIRED_RACE: &str = "HumanRace";

/// Items that are deliberately left alone.
pub const BLACKLIST: &[&str] = &[
    "AEC_One_Ring_To_Nude_Them_All",
    "AEC_One_Ring_To_Soil_Them_All",
    "AEC_One_Ring_For_The_Ghoulish",
];

/// A slot that carries its own keyword/attach-point requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSlot {
    Body(u8),
    /// Pseudo-slot for outfit-like descriptors.
    Outfit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRule {
    pub keywords: &'static [&'static str],
    pub attach_points: &'static [&'static str],
}

const ADDON_LINING: SlotRule = SlotRule {
    keywords: &["AEC_ma_armor_Addon", "AEC_ma_armor_Lining", "ma_Railroad_ClothingArmor"],
    attach_points: &["AEC_ap_Addon", "AEC_ap_Lining", "ap_Railroad_ClothingArmor"],
};

const HEADGEAR: SlotRule = SlotRule {
    keywords: &["AEC_ma_armor_Lining", "AEC_ma_armor_Headgear_Addon", "ma_Railroad_ClothingArmor"],
    attach_points: &["AEC_ap_AddonHeadgear", "AEC_ap_Lining", "ap_Railroad_ClothingArmor"],
};

const EYEWEAR: SlotRule = SlotRule {
    keywords: &["AEC_ma_armor_Eyewear"],
    attach_points: &["AEC_ap_Eyewear"],
};

const GLOVE: SlotRule = SlotRule {
    keywords: &["AEC_ma_armor_Glove"],
    attach_points: &["AEC_ap_Glove"],
};

const ARMOR_PIECE_LINING: SlotRule = SlotRule {
    keywords: &["ma_armor_lining"],
    attach_points: &["ap_armor_Lining"],
};

pub fn slot_rule(slot: RuleSlot) -> Option<&'static SlotRule> {
    match slot {
        RuleSlot::Outfit | RuleSlot::Body(38) => Some(&ADDON_LINING),
        RuleSlot::Body(30) => Some(&HEADGEAR),
        RuleSlot::Body(34) => Some(&GLOVE),
        RuleSlot::Body(47) => Some(&EYEWEAR),
        RuleSlot::Body(41..=45) => Some(&ARMOR_PIECE_LINING),
        RuleSlot::Body(_) => None,
    }
}

pub fn is_class_keyword(keyword: &str) -> bool {
    keyword.contains("_ArmorClass") || keyword.contains("_ClothingClass")
}

pub fn is_armor(slot_keyword: &str) -> bool {
    slot_keyword.starts_with("_ArmorSlot")
}

pub fn is_helmet(slot_keyword: &str) -> bool {
    is_armor(slot_keyword) && slot_keyword.ends_with("30")
}

pub fn is_vault_suit(slot_keyword: &str, class_keyword: Option<&str>) -> bool {
    slot_keyword == VAULT_SUIT_SLOT && class_keyword == Some(VAULT_SUIT_CLASS)
}

pub fn grants_extra_carry_weight(slot_keyword: &str) -> bool {
    EXTRA_CARRY_WEIGHT_SLOTS.contains(&slot_keyword)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_table() {
        assert_eq!(slot_rule(RuleSlot::Body(34)).unwrap().keywords, &["AEC_ma_armor_Glove"]);
        assert_eq!(slot_rule(RuleSlot::Outfit), slot_rule(RuleSlot::Body(38)));
        for slot in 41..=45 {
            assert_eq!(slot_rule(RuleSlot::Body(slot)), Some(&ARMOR_PIECE_LINING));
        }
        assert!(slot_rule(RuleSlot::Body(33)).is_none());
        assert!(slot_rule(RuleSlot::Body(46)).is_none());
    }

    #[test]
    fn classification() {
        assert!(is_class_keyword("_ArmorClassLeather"));
        assert!(is_class_keyword("_ClothingClassVault-Tec"));
        assert!(!is_class_keyword("_ArmorSlotHelmet_Slot30"));

        assert!(is_armor("_ArmorSlotHelmet_Slot30"));
        assert!(is_helmet("_ArmorSlotHelmet_Slot30"));
        assert!(!is_helmet("_ArmorSlotGloves_Slot34"));
        assert!(!is_helmet("_ClothingSlotHat_Slot30"));

        assert!(is_vault_suit(VAULT_SUIT_SLOT, Some(VAULT_SUIT_CLASS)));
        assert!(!is_vault_suit(VAULT_SUIT_SLOT, None));
        assert!(grants_extra_carry_weight("_ClothingSlotSatchel_Slot55"));
    }
}
