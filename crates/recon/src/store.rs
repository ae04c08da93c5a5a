//! The host record store the engine reads from and writes to.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use crate::error::ReconError;
use crate::records::{
    Combination, Component, Condition, ItemRecord, ModelRecord, ObjectTemplate, RecipeRecord,
    RecordSet,
};
use crate::slots::SlotMask;

/// Winning-record access plus the field writes the patcher issues.
///
/// Every write is idempotent: repeating it leaves the record unchanged.
/// Writes against an unknown editor ID fail with [`ReconError::RecordNotFound`].
pub trait RecordStore {
    fn items(&self) -> Vec<&ItemRecord>;
    fn item(&self, editor_id: &str) -> Option<&ItemRecord>;
    fn model(&self, editor_id: &str) -> Option<&ModelRecord>;
    fn recipes(&self) -> Vec<&RecipeRecord>;
    fn recipe(&self, editor_id: &str) -> Option<&RecipeRecord>;

    fn set_display_name(&mut self, item: &str, name: &str) -> Result<(), ReconError>;
    fn add_keyword(&mut self, item: &str, keyword: &str) -> Result<(), ReconError>;
    fn remove_keyword(&mut self, item: &str, keyword: &str) -> Result<(), ReconError>;
    fn add_attach_point(&mut self, item: &str, attach_point: &str) -> Result<(), ReconError>;
    fn remove_attach_point(&mut self, item: &str, attach_point: &str) -> Result<(), ReconError>;
    /// An empty mask removes the coverage field.
    fn set_item_slot_mask(&mut self, item: &str, mask: SlotMask) -> Result<(), ReconError>;
    fn set_naming_rules(&mut self, item: &str, naming_rules: &str) -> Result<(), ReconError>;
    /// Create the object template if needed and give it a default combination
    /// when it has none.
    fn add_default_object_template(&mut self, item: &str) -> Result<(), ReconError>;

    fn set_model_slot_mask(&mut self, model: &str, mask: SlotMask) -> Result<(), ReconError>;

    /// Set the count of `component`, appending the component when missing.
    fn set_component_count(
        &mut self,
        recipe: &str,
        component: &str,
        count: u32,
    ) -> Result<(), ReconError>;
    fn remove_perk_condition(&mut self, recipe: &str, perk: &str) -> Result<(), ReconError>;
    /// Append a `HasPerk` condition unless an identical one exists.
    fn add_perk_condition(&mut self, recipe: &str, perk: &str) -> Result<(), ReconError>;
    fn set_created_count(&mut self, recipe: &str, count: u32) -> Result<(), ReconError>;
}

trait Keyed {
    const KIND: &'static str;
    fn key(&self) -> &str;
}

impl Keyed for ItemRecord {
    const KIND: &'static str = "item";
    fn key(&self) -> &str {
        &self.editor_id
    }
}

impl Keyed for ModelRecord {
    const KIND: &'static str = "model";
    fn key(&self) -> &str {
        &self.editor_id
    }
}

impl Keyed for RecipeRecord {
    const KIND: &'static str = "recipe";
    fn key(&self) -> &str {
        &self.editor_id
    }
}

/// Records of one kind in snapshot order, with change tracking.
#[derive(Debug, Clone)]
struct Table<R> {
    records: Vec<R>,
    index: HashMap<String, usize>,
    touched: BTreeSet<usize>,
}

impl<R: Keyed + Clone> Table<R> {
    fn new(records: Vec<R>) -> Result<Self, ReconError> {
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if index.insert(record.key().to_string(), i).is_some() {
                return Err(ReconError::Store {
                    record: record.key().to_string(),
                    field: "editorId",
                    message: format!("duplicate {} record in snapshot", R::KIND),
                });
            }
        }
        Ok(Self {
            records,
            index,
            touched: BTreeSet::new(),
        })
    }

    fn get(&self, key: &str) -> Option<&R> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    fn all(&self) -> Vec<&R> {
        self.records.iter().collect()
    }

    /// Run `edit`; the record counts as touched when it reports a change.
    fn update(&mut self, key: &str, edit: impl FnOnce(&mut R) -> bool) -> Result<(), ReconError> {
        let &i = self
            .index
            .get(key)
            .ok_or_else(|| ReconError::RecordNotFound(format!("{} '{key}'", R::KIND)))?;
        if edit(&mut self.records[i]) {
            self.touched.insert(i);
        }
        Ok(())
    }

    fn touched(&self) -> Vec<R> {
        self.touched.iter().map(|&i| self.records[i].clone()).collect()
    }
}

/// In-memory store over a JSON record snapshot.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    items: Table<ItemRecord>,
    models: Table<ModelRecord>,
    recipes: Table<RecipeRecord>,
}

impl MemoryStore {
    pub fn new(records: RecordSet) -> Result<Self, ReconError> {
        Ok(Self {
            items: Table::new(records.items)?,
            models: Table::new(records.models)?,
            recipes: Table::new(records.recipes)?,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, ReconError> {
        let records: RecordSet = serde_json::from_str(json)?;
        Self::new(records)
    }

    pub fn load(path: &Path) -> Result<Self, ReconError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ReconError::Io(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Every record that at least one write changed, in snapshot order.
    pub fn to_patch(&self) -> RecordSet {
        RecordSet {
            items: self.items.touched(),
            models: self.models.touched(),
            recipes: self.recipes.touched(),
        }
    }

    /// Current state of every record.
    pub fn snapshot(&self) -> RecordSet {
        RecordSet {
            items: self.items.records.clone(),
            models: self.models.records.clone(),
            recipes: self.recipes.records.clone(),
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

impl RecordStore for MemoryStore {
    fn items(&self) -> Vec<&ItemRecord> {
        self.items.all()
    }

    fn item(&self, editor_id: &str) -> Option<&ItemRecord> {
        self.items.get(editor_id)
    }

    fn model(&self, editor_id: &str) -> Option<&ModelRecord> {
        self.models.get(editor_id)
    }

    fn recipes(&self) -> Vec<&RecipeRecord> {
        self.recipes.all()
    }

    fn recipe(&self, editor_id: &str) -> Option<&RecipeRecord> {
        self.recipes.get(editor_id)
    }

    fn set_display_name(&mut self, item: &str, name: &str) -> Result<(), ReconError> {
        self.items
            .update(item, |r| replace(&mut r.name, Some(name.to_string())))
    }

    fn add_keyword(&mut self, item: &str, keyword: &str) -> Result<(), ReconError> {
        self.items
            .update(item, |r| r.keywords.insert(keyword.to_string()))
    }

    fn remove_keyword(&mut self, item: &str, keyword: &str) -> Result<(), ReconError> {
        self.items.update(item, |r| r.keywords.remove(keyword))
    }

    fn add_attach_point(&mut self, item: &str, attach_point: &str) -> Result<(), ReconError> {
        self.items
            .update(item, |r| r.attach_points.insert(attach_point.to_string()))
    }

    fn remove_attach_point(&mut self, item: &str, attach_point: &str) -> Result<(), ReconError> {
        self.items.update(item, |r| r.attach_points.remove(attach_point))
    }

    fn set_item_slot_mask(&mut self, item: &str, mask: SlotMask) -> Result<(), ReconError> {
        self.items.update(item, |r| replace(&mut r.slot_mask, mask))
    }

    fn set_naming_rules(&mut self, item: &str, naming_rules: &str) -> Result<(), ReconError> {
        self.items.update(item, |r| {
            replace(&mut r.naming_rules, Some(naming_rules.to_string()))
        })
    }

    fn add_default_object_template(&mut self, item: &str) -> Result<(), ReconError> {
        self.items.update(item, |r| {
            let template = r.object_template.get_or_insert_with(ObjectTemplate::default);
            if template.combinations.is_empty() {
                template.combinations.push(Combination::DEFAULT);
                true
            } else {
                false
            }
        })
    }

    fn set_model_slot_mask(&mut self, model: &str, mask: SlotMask) -> Result<(), ReconError> {
        self.models.update(model, |r| replace(&mut r.slot_mask, mask))
    }

    fn set_component_count(
        &mut self,
        recipe: &str,
        component: &str,
        count: u32,
    ) -> Result<(), ReconError> {
        self.recipes.update(recipe, |r| {
            match r.components.iter_mut().find(|c| c.component == component) {
                Some(existing) => replace(&mut existing.count, count),
                None => {
                    r.components.push(Component {
                        component: component.to_string(),
                        count,
                    });
                    true
                }
            }
        })
    }

    fn remove_perk_condition(&mut self, recipe: &str, perk: &str) -> Result<(), ReconError> {
        self.recipes.update(recipe, |r| {
            let before = r.conditions.len();
            r.conditions.retain(|c| !c.is_perk(perk));
            r.conditions.len() != before
        })
    }

    fn add_perk_condition(&mut self, recipe: &str, perk: &str) -> Result<(), ReconError> {
        let condition = Condition::has_perk(perk);
        self.recipes.update(recipe, |r| {
            if r.conditions.contains(&condition) {
                false
            } else {
                r.conditions.push(condition);
                true
            }
        })
    }

    fn set_created_count(&mut self, recipe: &str, count: u32) -> Result<(), ReconError> {
        self.recipes
            .update(recipe, |r| replace(&mut r.created_count, Some(count)))
    }
}
