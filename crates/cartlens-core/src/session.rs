// Per-session owned state: the active list, its expand/edit bookkeeping,
// and the guard that keeps late analysis results out of the wrong list.
use std::collections::HashSet;

use tracing::debug;
use uuid::Uuid;

use crate::models::{Item, NutritionInfo};

pub const DEFAULT_LIST_NAME: &str = "My List";

/// Handed out when a submission starts. A result committed with a stale
/// ticket (the dialog was closed, another list was loaded) is dropped
/// instead of mutating a collection it no longer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket(u64);

/// The active shopping list and its UI state. One session owns one
/// collection; every mutation goes through here, in order.
pub struct Session {
    list_name: String,
    items: Vec<Item>,
    expanded: HashSet<Uuid>,
    editing: Option<Uuid>,
    submission_seq: u64,
}

impl Session {
    pub fn new() -> Self {
        Self {
            list_name: DEFAULT_LIST_NAME.to_string(),
            items: Vec::new(),
            expanded: HashSet::new(),
            editing: None,
            submission_seq: 0,
        }
    }

    pub fn list_name(&self) -> &str {
        &self.list_name
    }

    pub fn set_list_name(&mut self, name: impl Into<String>) {
        self.list_name = name.into();
    }

    /// Items in insertion order
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Remove an item by id, keeping the rest in order. Clears any edit
    /// or expansion state the item held.
    pub fn delete_item(&mut self, id: Uuid) {
        self.items.retain(|item| item.id != id);
        self.expanded.remove(&id);
        if self.editing == Some(id) {
            self.editing = None;
        }
    }

    pub fn is_expanded(&self, id: Uuid) -> bool {
        self.expanded.contains(&id)
    }

    /// Expand or collapse one card. At most one card is open at a time,
    /// and the card being edited refuses to collapse.
    pub fn toggle_expand(&mut self, id: Uuid) {
        if self.editing == Some(id) {
            return;
        }
        if !self.items.iter().any(|item| item.id == id) {
            return;
        }
        if self.expanded.contains(&id) {
            self.expanded.clear();
        } else {
            self.expanded.clear();
            self.expanded.insert(id);
        }
    }

    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    /// Start editing an item's nutrition facts. Editing implies expanded.
    pub fn begin_edit(&mut self, id: Uuid) -> bool {
        if !self.items.iter().any(|item| item.id == id) {
            return false;
        }
        self.editing = Some(id);
        self.expanded.clear();
        self.expanded.insert(id);
        true
    }

    /// Apply edited nutrition facts. The card stays expanded afterwards.
    pub fn save_nutrition(&mut self, id: Uuid, info: NutritionInfo) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        item.nutrition_info = Some(info);
        self.editing = None;
        self.expanded.clear();
        self.expanded.insert(id);
        true
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Open a submission. The ticket must come back with the finished
    /// item for it to land in this collection.
    pub fn begin_submission(&mut self) -> SubmissionTicket {
        self.submission_seq += 1;
        SubmissionTicket(self.submission_seq)
    }

    /// The submission dialog was closed; whatever its analysis returns
    /// later must not touch the collection.
    pub fn abandon_submission(&mut self) {
        self.submission_seq += 1;
    }

    /// Adopt a finished item if its submission is still current. Returns
    /// false when the result arrived too late and was dropped.
    pub fn commit_submission(&mut self, ticket: SubmissionTicket, item: Item) -> bool {
        if ticket.0 != self.submission_seq {
            debug!("Dropping stale submission result '{}'", item.name);
            return false;
        }
        self.add_item(item);
        true
    }

    /// Swap in a loaded list. Expansion, edit, and any in-flight
    /// submission all belong to the old collection and are invalidated.
    pub fn replace_items(&mut self, name: impl Into<String>, items: Vec<Item>) {
        self.list_name = name.into();
        self.items = items;
        self.expanded.clear();
        self.editing = None;
        self.submission_seq += 1;
    }

    /// Empty the session for a brand-new list
    pub fn start_new_list(&mut self, name: impl Into<String>) {
        self.replace_items(name, Vec::new());
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
