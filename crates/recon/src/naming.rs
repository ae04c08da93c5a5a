use serde::Serialize;

use crate::rules::{is_armor, is_helmet, is_vault_suit};

/// Instance-naming rule set an item should reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NamingRule {
    #[serde(rename = "dn_VaultSuit")]
    VaultSuit,
    #[serde(rename = "dn_Clothes")]
    Clothes,
    #[serde(rename = "dn_CommonArmor")]
    CommonArmor,
}

impl NamingRule {
    pub fn editor_id(self) -> &'static str {
        match self {
            Self::VaultSuit => "dn_VaultSuit",
            Self::Clothes => "dn_Clothes",
            Self::CommonArmor => "dn_CommonArmor",
        }
    }
}

impl std::fmt::Display for NamingRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.editor_id())
    }
}

/// Helmets name like clothes; every other armor piece uses the armor rules.
pub fn select_naming_rule(slot_keyword: &str, class_keyword: Option<&str>) -> NamingRule {
    if is_vault_suit(slot_keyword, class_keyword) {
        NamingRule::VaultSuit
    } else if is_armor(slot_keyword) && !is_helmet(slot_keyword) {
        NamingRule::CommonArmor
    } else {
        NamingRule::Clothes
    }
}
