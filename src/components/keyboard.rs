use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct KeyboardConfig {
    pub skip_link_selector: String,
    /// Body class that turns on focus outlines while the visitor uses the keyboard.
    pub keyboard_class: String,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            skip_link_selector: ".skip-link".to_string(),
            keyboard_class: "keyboard-navigation".to_string(),
        }
    }
}

/// Tracks whether the visitor is currently navigating by keyboard.
///
/// Tab switches to keyboard mode; any mouse press switches back. Each method
/// returns the new mode only when it changed, so the caller touches the DOM
/// once per switch.
#[derive(Debug, Default)]
pub struct InputModality {
    keyboard: bool,
}

impl InputModality {
    pub fn is_keyboard(&self) -> bool {
        self.keyboard
    }

    pub fn on_key(&mut self, key: &str) -> Option<bool> {
        if key == "Tab" {
            self.switch(true)
        } else {
            None
        }
    }

    pub fn on_pointer(&mut self) -> Option<bool> {
        self.switch(false)
    }

    fn switch(&mut self, keyboard: bool) -> Option<bool> {
        if self.keyboard == keyboard {
            return None;
        }
        self.keyboard = keyboard;
        Some(keyboard)
    }
}
