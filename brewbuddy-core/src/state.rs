//! Transient view/edit state for the entry panel.
//!
//! At most one of the detail view and the edit form is active at a time:
//! entering either one implicitly cancels the other. Saving is
//! fire-and-forget from this state machine's perspective - the draft is
//! handed off and the panel returns to idle without waiting for the store.

use std::mem;

use crate::models::BrewEntry;

/// What the entry panel is currently showing.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    /// Nothing open.
    Idle,
    /// Detail popup for a persisted entry.
    Viewing(BrewEntry),
    /// Edit form holding a draft: a blank one for "add new", a copy of an
    /// existing entry for "edit".
    Editing(BrewEntry),
}

/// The entry panel state machine. Starts idle, lives as long as the view.
pub struct EntryPanel {
    state: PanelState,
}

impl EntryPanel {
    pub fn new() -> Self {
        Self {
            state: PanelState::Idle,
        }
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == PanelState::Idle
    }

    /// Open the detail view for an entry from the cache.
    pub fn show_details(&mut self, entry: BrewEntry) {
        self.state = PanelState::Viewing(entry);
    }

    /// Open the edit form with a blank draft.
    pub fn begin_add(&mut self) {
        self.state = PanelState::Editing(BrewEntry::default());
    }

    /// Open the edit form with a copy of an existing entry. The copy keeps
    /// its key so a later save updates rather than creates.
    pub fn begin_edit(&mut self, entry: BrewEntry) {
        self.state = PanelState::Editing(entry);
    }

    /// Close whatever is open.
    pub fn dismiss(&mut self) {
        self.state = PanelState::Idle;
    }

    /// Take the draft for dispatch and return to idle. Returns `None` when
    /// no edit is in progress.
    pub fn take_submission(&mut self) -> Option<BrewEntry> {
        match mem::replace(&mut self.state, PanelState::Idle) {
            PanelState::Editing(draft) => Some(draft),
            other => {
                self.state = other;
                None
            }
        }
    }

    pub fn viewing(&self) -> Option<&BrewEntry> {
        match &self.state {
            PanelState::Viewing(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn editing(&self) -> Option<&BrewEntry> {
        match &self.state {
            PanelState::Editing(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn editing_mut(&mut self) -> Option<&mut BrewEntry> {
        match &mut self.state {
            PanelState::Editing(draft) => Some(draft),
            _ => None,
        }
    }
}

impl Default for EntryPanel {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persisted(name: &str) -> BrewEntry {
        let mut entry = BrewEntry::draft(name, "notes", 4.0);
        entry.key = Some(format!("key-{name}"));
        entry
    }

    #[test]
    fn test_starts_idle() {
        let panel = EntryPanel::new();
        assert!(panel.is_idle());
    }

    #[test]
    fn test_show_details_then_dismiss() {
        let mut panel = EntryPanel::new();
        panel.show_details(persisted("Ethiopia"));
        assert_eq!(panel.viewing().map(|e| e.name.as_str()), Some("Ethiopia"));

        panel.dismiss();
        assert!(panel.is_idle());
    }

    #[test]
    fn test_begin_add_opens_blank_draft() {
        let mut panel = EntryPanel::new();
        panel.begin_add();

        let draft = panel.editing().unwrap();
        assert_eq!(draft.key, None);
        assert!(draft.name.is_empty());
        assert_eq!(draft.rating, 0.0);
    }

    #[test]
    fn test_begin_edit_keeps_key() {
        let mut panel = EntryPanel::new();
        panel.begin_edit(persisted("Kenya"));
        assert_eq!(
            panel.editing().and_then(|e| e.key.as_deref()),
            Some("key-Kenya")
        );
    }

    #[test]
    fn test_editing_cancels_viewing() {
        let mut panel = EntryPanel::new();
        panel.show_details(persisted("Ethiopia"));
        panel.begin_edit(persisted("Kenya"));

        assert!(panel.viewing().is_none());
        assert!(panel.editing().is_some());
    }

    #[test]
    fn test_viewing_cancels_editing() {
        let mut panel = EntryPanel::new();
        panel.begin_add();
        panel.show_details(persisted("Ethiopia"));

        assert!(panel.editing().is_none());
        assert!(panel.viewing().is_some());
    }

    #[test]
    fn test_take_submission_returns_draft_and_resets() {
        let mut panel = EntryPanel::new();
        panel.begin_add();
        if let Some(draft) = panel.editing_mut() {
            draft.name = "Ethiopia".to_string();
            draft.rating = 4.5;
        }

        let draft = panel.take_submission().unwrap();
        assert_eq!(draft.name, "Ethiopia");
        assert!(panel.is_idle());
    }

    #[test]
    fn test_take_submission_without_edit_is_none() {
        let mut panel = EntryPanel::new();
        panel.show_details(persisted("Ethiopia"));

        assert!(panel.take_submission().is_none());
        // the detail view stays open
        assert!(panel.viewing().is_some());
    }
}
