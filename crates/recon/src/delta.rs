use std::collections::BTreeSet;

/// Pending additions/removals against one present set.
///
/// `ensure` and `remove` cancel each other, so a later rule always wins over
/// an earlier one for the same member. A member is never pending in both
/// directions at once.
#[derive(Debug, Clone)]
pub struct SetDelta<'a> {
    present: &'a BTreeSet<String>,
    added: BTreeSet<String>,
    removed: BTreeSet<String>,
}

impl<'a> SetDelta<'a> {
    pub fn new(present: &'a BTreeSet<String>) -> Self {
        Self {
            present,
            added: BTreeSet::new(),
            removed: BTreeSet::new(),
        }
    }

    fn mark_added(&mut self, member: &str) {
        self.removed.remove(member);
        if !self.present.contains(member) {
            self.added.insert(member.to_string());
        }
    }

    fn mark_removed(&mut self, member: &str) {
        self.added.remove(member);
        if self.present.contains(member) {
            self.removed.insert(member.to_string());
        }
    }

    pub fn ensure<I, S>(&mut self, members: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for member in members {
            self.mark_added(member.as_ref());
        }
    }

    pub fn remove<I, S>(&mut self, members: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for member in members {
            self.mark_removed(member.as_ref());
        }
    }

    /// Make `target` the only member of `candidates` left on the record.
    pub fn apply_exclusive(&mut self, target: &str, candidates: &BTreeSet<String>) {
        self.mark_added(target);
        for other in candidates.iter().filter(|c| c.as_str() != target) {
            self.mark_removed(other);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub fn added(&self) -> &BTreeSet<String> {
        &self.added
    }

    pub fn removed(&self) -> &BTreeSet<String> {
        &self.removed
    }

    pub fn into_parts(self) -> (BTreeSet<String>, BTreeSet<String>) {
        (self.added, self.removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(members: &[&str]) -> BTreeSet<String> {
        members.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn ensure_adds_only_absent() {
        let present = set(&["a", "b"]);
        let mut delta = SetDelta::new(&present);
        delta.ensure(["a", "c"]);
        assert_eq!(delta.added(), &set(&["c"]));
        assert!(delta.removed().is_empty());
    }

    #[test]
    fn remove_drops_only_present() {
        let present = set(&["a", "b"]);
        let mut delta = SetDelta::new(&present);
        delta.remove(["b", "z"]);
        assert_eq!(delta.removed(), &set(&["b"]));
        assert!(delta.added().is_empty());
    }

    #[test]
    fn later_rule_wins() {
        let present = set(&["lining"]);
        let mut delta = SetDelta::new(&present);
        delta.remove(["lining"]);
        delta.ensure(["lining"]);
        assert!(delta.is_empty());

        let mut delta = SetDelta::new(&present);
        delta.ensure(["weave"]);
        delta.remove(["weave"]);
        assert!(delta.is_empty());
    }

    #[test]
    fn exclusive_keeps_target_drops_others() {
        let present = set(&["slot_a", "slot_b", "other"]);
        let candidates = set(&["slot_a", "slot_b"]);
        let mut delta = SetDelta::new(&present);
        delta.apply_exclusive("slot_a", &candidates);
        assert!(delta.added().is_empty());
        assert_eq!(delta.removed(), &set(&["slot_b"]));
    }

    #[test]
    fn exclusive_adds_missing_target() {
        let present = set(&["slot_b"]);
        let candidates = set(&["slot_b"]);
        let mut delta = SetDelta::new(&present);
        delta.apply_exclusive("slot_a", &candidates);
        assert_eq!(delta.added(), &set(&["slot_a"]));
        assert_eq!(delta.removed(), &set(&["slot_b"]));
    }

    #[test]
    fn exclusive_settles_in_one_pass() {
        let present = set(&["_ClothingSlotHat_Slot30"]);
        let candidates = set(&["_ClothingSlotHat_Slot30"]);
        let mut delta = SetDelta::new(&present);
        delta.apply_exclusive("_ArmorSlotHelmet_Slot30", &candidates);
        let (added, removed) = delta.into_parts();

        let after: BTreeSet<String> = present
            .difference(&removed)
            .cloned()
            .chain(added)
            .collect();
        assert_eq!(after, set(&["_ArmorSlotHelmet_Slot30"]));

        let candidates = set(&["_ArmorSlotHelmet_Slot30"]);
        let mut again = SetDelta::new(&after);
        again.apply_exclusive("_ArmorSlotHelmet_Slot30", &candidates);
        assert!(again.is_empty());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Ensure(Vec<String>),
        Remove(Vec<String>),
        Exclusive(String, Vec<String>),
    }

    fn arb_member() -> impl Strategy<Value = String> {
        prop_oneof![Just("a"), Just("b"), Just("c"), Just("d"), Just("e")].prop_map(String::from)
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        let members = || proptest::collection::vec(arb_member(), 0..4);
        prop_oneof![
            members().prop_map(Op::Ensure),
            members().prop_map(Op::Remove),
            (arb_member(), members()).prop_map(|(t, c)| Op::Exclusive(t, c)),
        ]
    }

    proptest! {
        #[test]
        fn added_and_removed_never_overlap(
            present in proptest::collection::btree_set(arb_member(), 0..5),
            ops in proptest::collection::vec(arb_op(), 0..12),
        ) {
            let mut delta = SetDelta::new(&present);
            for op in ops {
                match op {
                    Op::Ensure(m) => delta.ensure(m),
                    Op::Remove(m) => delta.remove(m),
                    Op::Exclusive(t, c) => delta.apply_exclusive(&t, &c.into_iter().collect()),
                }
            }
            prop_assert!(delta.added().is_disjoint(delta.removed()));
            prop_assert!(delta.added().is_disjoint(&present));
            prop_assert!(delta.removed().is_subset(&present));
        }
    }
}
