//! Shared model sub-records must cover every slot any referencing item
//! covers. Unions are collected over the whole batch and written once.

use std::collections::BTreeMap;

use crate::error::ReconError;
use crate::model::ModelGroup;
use crate::slots::SlotMask;
use crate::store::RecordStore;

#[derive(Debug, Clone, Default)]
pub struct ModelSlotPropagator {
    groups: BTreeMap<String, SlotMask>,
}

/// Result of writing the collected unions.
#[derive(Debug, Default)]
pub struct Propagation {
    pub updated: Vec<ModelGroup>,
    pub failed: Vec<(String, ReconError)>,
}

impl ModelSlotPropagator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one item's final coverage into each model it references.
    pub fn record<S: AsRef<str>>(&mut self, models: &[S], target: SlotMask) {
        for model in models {
            *self.groups.entry(model.as_ref().to_string()).or_default() |= target;
        }
    }

    pub fn groups(&self) -> impl Iterator<Item = ModelGroup> + '_ {
        self.groups.iter().map(|(model_id, mask)| ModelGroup {
            model_id: model_id.clone(),
            unioned_slot_mask: *mask,
        })
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Widen every model whose stored mask does not already contain its
    /// union. Empty unions are left alone.
    pub fn finish<S: RecordStore + ?Sized>(self, store: &mut S) -> Propagation {
        let mut propagation = Propagation::default();

        for (model_id, union) in self.groups {
            if union.is_empty() {
                continue;
            }
            let stored = match store.model(&model_id) {
                Some(model) => model.slot_mask,
                None => {
                    tracing::warn!(model = %model_id, "referenced model not found");
                    propagation
                        .failed
                        .push((model_id.clone(), ReconError::RecordNotFound(model_id)));
                    continue;
                }
            };
            if stored.contains(union) {
                continue;
            }

            tracing::debug!(model = %model_id, from = %stored, to = %union, "widening model coverage");
            match store.set_model_slot_mask(&model_id, union) {
                Ok(()) => propagation.updated.push(ModelGroup {
                    model_id,
                    unioned_slot_mask: union,
                }),
                Err(err) => {
                    tracing::warn!(model = %model_id, error = %err, "failed to update model");
                    propagation.failed.push((model_id, err));
                }
            }
        }

        propagation
    }
}
