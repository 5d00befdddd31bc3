//! The transient type-ahead box shown over a list control.
//!
//! An overlay only exists while it is active. Creating one posts the seed
//! text; dropping it through [`SearchOverlay::dismiss`] posts `ClearSearch`.

use crate::notify::{EventBus, ListEvent};

/// Whether a control currently shows its overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Dismissed,
    Active,
}

#[derive(Debug)]
pub struct SearchOverlay {
    text: String,
    events: EventBus<ListEvent>,
}

impl SearchOverlay {
    /// Show the overlay with `seed` already typed.
    pub fn new(seed: impl Into<String>, events: EventBus<ListEvent>) -> Self {
        let text = seed.into();
        log::debug!("list search overlay opened with {:?}", text);
        events.post(ListEvent::SearchText(text.clone()));
        Self { text, events }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.text = text;
            self.events.post(ListEvent::SearchText(self.text.clone()));
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.text.push(c);
        self.events.post(ListEvent::SearchText(self.text.clone()));
    }

    pub fn backspace(&mut self) {
        if self.text.pop().is_some() {
            self.events.post(ListEvent::SearchText(self.text.clone()));
        }
    }

    pub fn dismiss(self) {
        log::debug!("list search overlay dismissed");
        self.events.post(ListEvent::ClearSearch);
    }
}
