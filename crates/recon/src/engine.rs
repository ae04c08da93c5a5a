use std::collections::HashSet;
use std::path::Path;

use crate::apply::{apply_item, apply_recipe};
use crate::crafting::decide_recipe;
use crate::decide::{decide_item, PatchContext, PatchOptions};
use crate::error::ReconError;
use crate::guesses::{GuessEntry, GuessLog};
use crate::model::{
    ApplyFailure, ItemPatch, PatchMeta, PatchReport, PatchSummary, RecipePatch, RecordKind,
    SkipReason, SkippedItem,
};
use crate::overrides::OverrideTable;
use crate::propagate::ModelSlotPropagator;
use crate::store::RecordStore;
use crate::taxonomy::SlotTaxonomy;

/// Tables read before a run. The taxonomy is kept as a result so callers
/// can report a failed load; overrides record their failures per source.
#[derive(Debug)]
pub struct LoadedTables {
    pub taxonomy: Result<SlotTaxonomy, ReconError>,
    pub overrides: OverrideTable,
}

impl LoadedTables {
    /// Build the run context. A failed taxonomy load leaves the taxonomy
    /// empty, so every item is skipped rather than the run aborting.
    pub fn into_context(self, options: PatchOptions) -> PatchContext {
        let taxonomy = match self.taxonomy {
            Ok(taxonomy) => taxonomy,
            Err(err) => {
                tracing::error!(error = %err, "slot taxonomy unavailable, no item can be classified");
                SlotTaxonomy::default()
            }
        };
        PatchContext {
            taxonomy,
            overrides: self.overrides,
            options,
        }
    }
}

/// Read the slot taxonomy and every override source concurrently.
pub fn load_tables(slot_data: &Path, overrides_dir: &Path) -> LoadedTables {
    let (taxonomy, overrides) = rayon::join(
        || SlotTaxonomy::load(slot_data),
        || OverrideTable::load_dir(overrides_dir),
    );
    if let Ok(taxonomy) = &taxonomy {
        tracing::info!(descriptors = taxonomy.len(), "loaded slot taxonomy");
    }
    LoadedTables {
        taxonomy,
        overrides,
    }
}

/// Run the batch: decide every item, apply, widen shared models, then fix up
/// recipes for the items that were patched.
///
/// Nothing here is fatal. Skipped items and failed writes are logged and
/// reported, and the batch carries on.
pub fn run<S: RecordStore + ?Sized>(ctx: &PatchContext, store: &mut S) -> PatchReport {
    let mut summary = PatchSummary {
        override_sources: ctx.overrides.source_count(),
        override_source_failures: ctx.overrides.failures().len(),
        ..PatchSummary::default()
    };
    let mut skipped = Vec::new();
    let mut guesses = GuessLog::new();
    let mut failures = Vec::new();
    let mut propagator = ModelSlotPropagator::new();

    // Decide
    let mut decisions = Vec::new();
    for item in store.items() {
        summary.items_considered += 1;
        match decide_item(ctx, item) {
            Ok(decision) => {
                propagator.record(&decision.models, decision.target_mask);
                decisions.push(decision);
            }
            Err(reason) if reason.is_ignored() => {
                tracing::debug!(item = %item.editor_id, %reason, "ignoring item");
                summary.items_ignored += 1;
            }
            Err(reason) => {
                match &reason {
                    SkipReason::UnknownSlotKeyword { .. } => {
                        tracing::error!(item = %item.editor_id, file = %item.source_file, %reason, "skipping item");
                    }
                    SkipReason::NoSlotKeyword { guess } => {
                        tracing::warn!(item = %item.editor_id, file = %item.source_file, %reason, "skipping item");
                        guesses.push(GuessEntry {
                            file_name: item.source_file.clone(),
                            armor_editor_id: item.editor_id.clone(),
                            slot_keyword: guess.clone(),
                        });
                    }
                    _ => {
                        tracing::warn!(item = %item.editor_id, file = %item.source_file, %reason, "skipping item");
                    }
                }
                summary.items_skipped += 1;
                skipped.push(SkippedItem {
                    item_id: item.editor_id.clone(),
                    source_file: item.source_file.clone(),
                    reason,
                });
            }
        }
    }

    // Apply
    let mut items = Vec::new();
    let mut patched: HashSet<String> = HashSet::new();
    for decision in decisions {
        let Some(patch) = decision.patch else {
            summary.items_unchanged += 1;
            continue;
        };
        match apply_item(store, &decision.item_id, &patch) {
            Ok(outcome) => {
                tracing::debug!(item = %decision.item_id, "patched item");
                if !outcome.degraded.is_empty() {
                    summary.items_degraded += 1;
                }
                patched.insert(decision.item_id.clone());
                items.push(ItemPatch {
                    item_id: decision.item_id,
                    source_file: decision.source_file,
                    slot_keyword: decision.slot_keyword,
                    class_keyword: decision.class_keyword,
                    decision: patch,
                    degraded: outcome.degraded,
                });
            }
            Err(err) => {
                tracing::error!(item = %decision.item_id, error = %err, "failed to patch item");
                failures.push(ApplyFailure {
                    kind: RecordKind::Item,
                    record_id: decision.item_id,
                    message: err.to_string(),
                });
            }
        }
    }
    summary.items_patched = patched.len();
    summary.items_failed = failures.len();
    tracing::info!(
        considered = summary.items_considered,
        patched = summary.items_patched,
        unchanged = summary.items_unchanged,
        skipped = summary.items_skipped,
        ignored = summary.items_ignored,
        "items processed"
    );

    // Models
    let propagation = propagator.finish(store);
    summary.models_updated = propagation.updated.len();
    for (model_id, err) in propagation.failed {
        failures.push(ApplyFailure {
            kind: RecordKind::Model,
            record_id: model_id,
            message: err.to_string(),
        });
    }
    tracing::info!(updated = summary.models_updated, "models processed");

    // Recipes
    let adjustments: Vec<_> = store
        .recipes()
        .into_iter()
        .filter_map(|recipe| {
            let Some(target) = recipe.created_object.as_deref() else {
                tracing::debug!(recipe = %recipe.editor_id, "recipe creates nothing");
                return None;
            };
            if !patched.contains(target) {
                return None;
            }
            let item = store.item(target)?;
            let adjustment = decide_recipe(recipe, item)?;
            Some((recipe.editor_id.clone(), target.to_string(), adjustment))
        })
        .collect();

    let mut recipes = Vec::new();
    for (recipe_id, created_object, adjustment) in adjustments {
        match apply_recipe(store, &recipe_id, &adjustment) {
            Ok(()) => recipes.push(RecipePatch {
                recipe_id,
                created_object,
                adjustment,
            }),
            Err(err) => {
                tracing::error!(recipe = %recipe_id, error = %err, "failed to patch recipe");
                summary.recipes_failed += 1;
                failures.push(ApplyFailure {
                    kind: RecordKind::Recipe,
                    record_id: recipe_id,
                    message: err.to_string(),
                });
            }
        }
    }
    summary.recipes_patched = recipes.len();
    summary.guesses = guesses.len();
    tracing::info!(patched = summary.recipes_patched, "recipes processed");

    PatchReport {
        meta: PatchMeta {
            patch_file_name: ctx.options.patch_file_name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        items,
        models: propagation.updated,
        recipes,
        skipped,
        guesses: guesses.into_entries(),
        failures,
    }
}
