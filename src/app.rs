//! Dashboard state and key handling.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyModifiers};
use tracing::{debug, info, warn};

use crate::roadmap::Roadmap;
use crate::store::{RoadmapStore, Slot};

/// Dashboard over the saved roadmaps.
pub struct App<S: Slot> {
    store: RoadmapStore<S>,
    /// Newest first.
    pub roadmaps: Vec<Roadmap>,
    /// Index of the highlighted roadmap.
    pub selected: usize,
    /// First roadmap shown in the list.
    pub list_scroll: usize,
    /// Scroll offset of the detail pane.
    pub detail_scroll: u16,
    /// Largest useful detail scroll, updated on every draw.
    pub detail_max_scroll: u16,
    /// Height of the detail pane, updated on every draw.
    pub detail_height: u16,
    /// Set when the collection could not be loaded.
    pub load_error: Option<String>,
    /// One-line feedback for the last action.
    pub notice: Option<String>,
    /// Title waiting for delete confirmation.
    pub pending_delete: Option<String>,
    pub should_quit: bool,
    pub session_id: Option<String>,
    pub log_directory: Option<PathBuf>,
}

impl<S: Slot> App<S> {
    pub fn new(
        store: RoadmapStore<S>,
        session_id: Option<String>,
        log_directory: Option<PathBuf>,
    ) -> Self {
        let mut app = Self {
            store,
            roadmaps: Vec::new(),
            selected: 0,
            list_scroll: 0,
            detail_scroll: 0,
            detail_max_scroll: 0,
            detail_height: 0,
            load_error: None,
            notice: None,
            pending_delete: None,
            should_quit: false,
            session_id,
            log_directory,
        };
        app.reload();
        app
    }

    /// Re-reads the collection, keeping the selection in range.
    pub fn reload(&mut self) {
        let loaded = self.store.list();
        self.roadmaps = loaded.roadmaps;
        self.load_error = loaded.error.map(|e| e.to_string());
        self.selected = self.selected.min(self.roadmaps.len().saturating_sub(1));
        self.detail_scroll = 0;
        debug!(count = self.roadmaps.len(), "dashboard_reloaded");
    }

    pub fn selected_roadmap(&self) -> Option<&Roadmap> {
        self.roadmaps.get(self.selected)
    }

    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.detail_scroll = 0;
        }
    }

    pub fn select_next(&mut self) {
        if !self.roadmaps.is_empty() && self.selected < self.roadmaps.len() - 1 {
            self.selected += 1;
            self.detail_scroll = 0;
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.detail_scroll = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.roadmaps.len().saturating_sub(1);
        self.detail_scroll = 0;
    }

    pub fn scroll_detail_up(&mut self, amount: u16) {
        self.detail_scroll = self.detail_scroll.saturating_sub(amount);
    }

    pub fn scroll_detail_down(&mut self, amount: u16) {
        self.detail_scroll = self
            .detail_scroll
            .saturating_add(amount)
            .min(self.detail_max_scroll);
    }

    /// Ensure selected item is visible, adjusting list_scroll if needed.
    pub fn ensure_visible(&mut self, visible_items: usize) {
        if self.selected < self.list_scroll {
            self.list_scroll = self.selected;
        } else if visible_items > 0 && self.selected >= self.list_scroll + visible_items {
            self.list_scroll = self.selected - visible_items + 1;
        }
    }

    /// Asks for confirmation before deleting the selected roadmap.
    pub fn request_delete(&mut self) {
        if let Some(roadmap) = self.selected_roadmap() {
            self.pending_delete = Some(roadmap.title.clone());
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Deletes every roadmap with the pending title.
    pub fn confirm_delete(&mut self) {
        let Some(title) = self.pending_delete.take() else {
            return;
        };

        match self.store.delete_by_title(&title) {
            Ok(removed) => {
                info!(title = %title, removed, "dashboard_delete");
                self.notice = Some(format!("Deleted \"{}\"", title));
                self.reload();
            }
            Err(e) => {
                warn!(title = %title, error = %e, "dashboard_delete_failed");
                self.notice = Some(format!("Failed to delete roadmap: {}", e));
            }
        }
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if self.pending_delete.is_some() {
            match code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => self.cancel_delete(),
                _ => {}
            }
            return;
        }

        self.notice = None;
        let half_page = (self.detail_height / 2).max(1);

        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char('k') | KeyCode::Up => self.select_prev(),
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('g') | KeyCode::Home => self.select_first(),
            KeyCode::Char('G') | KeyCode::End => self.select_last(),
            KeyCode::Char('K') | KeyCode::PageUp => self.scroll_detail_up(half_page),
            KeyCode::Char('J') | KeyCode::PageDown => self.scroll_detail_down(half_page),
            KeyCode::Char('d') => self.request_delete(),
            KeyCode::Char('r') => {
                self.reload();
                self.notice = Some("Reloaded".to_string());
            }
            _ => {}
        }
    }
}
