use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use crate::geometry::midnight;

pub type ItemId = i64;

/// Manually chosen lane per item, kept apart from the item's own attributes.
pub type LaneOverrides = BTreeMap<ItemId, usize>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Item {
    pub fn new(id: ItemId, name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            id,
            name: name.into(),
            start,
            end,
        }
    }

    pub fn start_at(&self) -> NaiveDateTime {
        midnight(self.start)
    }

    pub fn end_at(&self) -> NaiveDateTime {
        midnight(self.end)
    }

    /// Distance between the start and end midnights; zero for a single-day item.
    pub fn duration(&self) -> Duration {
        self.end_at() - self.start_at()
    }

    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn with_dates(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            ..self.clone()
        }
    }
}

/// The item collection plus the lane overrides the user has committed by dragging.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    items: Vec<Item>,
    overrides: LaneOverrides,
}

impl Timeline {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            overrides: LaneOverrides::new(),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn overrides(&self) -> &LaneOverrides {
        &self.overrides
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn lane_override(&self, id: ItemId) -> Option<usize> {
        self.overrides.get(&id).copied()
    }

    /// Swaps in the stored value with the same id. Returns false when no such item exists.
    pub fn replace_item(&mut self, item: Item) -> bool {
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub fn set_lane_override(&mut self, id: ItemId, lane: usize) -> bool {
        if self.item(id).is_none() {
            return false;
        }
        self.overrides.insert(id, lane);
        true
    }

    /// Applies a trimmed, non-empty name. Blank names are dropped.
    pub fn rename(&mut self, id: ItemId, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }

        let Some(renamed) = self.item(id).map(|item| item.with_name(name)) else {
            return false;
        };
        self.replace_item(renamed)
    }

    /// Replaces the whole collection, keeping overrides only for ids that survive.
    pub fn replace_items(&mut self, items: Vec<Item>) {
        self.overrides
            .retain(|id, _| items.iter().any(|item| item.id == *id));
        self.items = items;
    }
}
