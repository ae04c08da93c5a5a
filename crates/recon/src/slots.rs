//! Body-coverage bitmasks.
//!
//! Slot number `n` (30..=61) occupies bit `n - 30`. A mask of zero means the
//! record carries no coverage field at all.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::error::ReconError;

pub const FIRST_SLOT: u8 = 30;
pub const LAST_SLOT: u8 = 61;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotMask(u32);

impl SlotMask {
    pub const EMPTY: SlotMask = SlotMask(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Mask with the single bit for `slot`, or `None` outside 30..=61.
    pub fn slot(slot: u8) -> Option<Self> {
        if (FIRST_SLOT..=LAST_SLOT).contains(&slot) {
            Some(Self(1 << (slot - FIRST_SLOT)))
        } else {
            None
        }
    }

    pub fn from_slots<I: IntoIterator<Item = u8>>(slots: I) -> Result<Self, ReconError> {
        let mut mask = Self::EMPTY;
        for slot in slots {
            mask |= Self::slot(slot).ok_or_else(|| ReconError::SlotList {
                value: slot.to_string(),
                reason: format!("slot {slot} is outside {FIRST_SLOT}-{LAST_SLOT}"),
            })?;
        }
        Ok(mask)
    }

    pub fn has_slot(self, slot: u8) -> bool {
        Self::slot(slot).is_some_and(|bit| self.contains(bit))
    }

    /// True when every bit of `other` is also set here.
    pub const fn contains(self, other: SlotMask) -> bool {
        self.0 & other.0 == other.0
    }

    /// Slot numbers set in this mask, ascending.
    pub fn slots(self) -> Vec<u8> {
        (FIRST_SLOT..=LAST_SLOT)
            .filter(|&slot| self.has_slot(slot))
            .collect()
    }
}

impl BitOr for SlotMask {
    type Output = SlotMask;

    fn bitor(self, rhs: SlotMask) -> SlotMask {
        SlotMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for SlotMask {
    fn bitor_assign(&mut self, rhs: SlotMask) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for SlotMask {
    type Output = SlotMask;

    fn bitand(self, rhs: SlotMask) -> SlotMask {
        SlotMask(self.0 & rhs.0)
    }
}

impl fmt::Display for SlotMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list: Vec<String> = self.slots().iter().map(u8::to_string).collect();
        f.write_str(&list.join(","))
    }
}

/// Parse a comma-separated slot list such as `"30,31,46"`.
///
/// Blank input is the empty mask. Whitespace around entries is ignored.
pub fn parse_slot_list(value: &str) -> Result<SlotMask, ReconError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(SlotMask::EMPTY);
    }

    let mut mask = SlotMask::EMPTY;
    for part in trimmed.split(',') {
        let part = part.trim();
        let slot: u8 = part.parse().map_err(|_| ReconError::SlotList {
            value: value.into(),
            reason: format!("'{part}' is not a slot number"),
        })?;
        mask |= SlotMask::slot(slot).ok_or_else(|| ReconError::SlotList {
            value: value.into(),
            reason: format!("slot {slot} is outside {FIRST_SLOT}-{LAST_SLOT}"),
        })?;
    }
    Ok(mask)
}
