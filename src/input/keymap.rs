//! Key names and the key → action table.

use crate::error::{LinepickError, Result};
use crate::input::action::Action;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// A key combination (key code + modifiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Parse a key name like "C-a", "M-v", "S-Tab", "Enter" or "x".
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s == "-" {
            return Some(Self::new(KeyCode::Char('-'), KeyModifiers::NONE));
        }

        let mut modifiers = KeyModifiers::NONE;
        let mut parts: Vec<&str> = s.split('-').collect();
        while parts.len() > 1 {
            let modifier = parts.remove(0).to_lowercase();
            match modifier.as_str() {
                "c" | "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "m" | "alt" | "meta" => modifiers |= KeyModifiers::ALT,
                "s" | "shift" => modifiers |= KeyModifiers::SHIFT,
                _ => return None,
            }
        }

        let mut code = parse_key_code(parts[0])?;
        // Match what from_event produces: shifted characters arrive already
        // shifted, and shift-tab arrives as BackTab
        if modifiers.contains(KeyModifiers::SHIFT) {
            match code {
                KeyCode::Char(c) => {
                    code = KeyCode::Char(c.to_uppercase().next().unwrap_or(c));
                    modifiers.remove(KeyModifiers::SHIFT);
                }
                KeyCode::Tab | KeyCode::BackTab => {
                    code = KeyCode::BackTab;
                    modifiers.remove(KeyModifiers::SHIFT);
                }
                _ => {}
            }
        }
        Some(Self::new(code, modifiers))
    }

    /// Normalize a terminal key event for lookup. Shifted characters already
    /// carry their case, so SHIFT is dropped for them.
    pub fn from_event(event: &KeyEvent) -> Self {
        let mut modifiers = event.modifiers
            & (KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SHIFT);
        if matches!(event.code, KeyCode::Char(_)) {
            modifiers.remove(KeyModifiers::SHIFT);
        }
        // Terminals report S-Tab as BackTab, sometimes with SHIFT still set
        if event.code == KeyCode::BackTab {
            modifiers.remove(KeyModifiers::SHIFT);
        }
        Self::new(event.code, modifiers)
    }
}

fn parse_key_code(s: &str) -> Option<KeyCode> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }

    match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "backtab" => Some(KeyCode::BackTab),
        "backspace" | "bs" => Some(KeyCode::Backspace),
        "delete" | "del" => Some(KeyCode::Delete),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "pageup" | "pgup" => Some(KeyCode::PageUp),
        "pagedown" | "pgdn" => Some(KeyCode::PageDown),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    }
}

const DEFAULT_BINDINGS: &[(&str, Action)] = &[
    ("Esc", Action::Cancel),
    ("C-c", Action::Cancel),
    ("Enter", Action::Finish),
    ("C-f", Action::ForwardChar),
    ("Right", Action::ForwardChar),
    ("C-b", Action::BackwardChar),
    ("Left", Action::BackwardChar),
    ("C-a", Action::BeginningOfLine),
    ("Home", Action::BeginningOfLine),
    ("C-e", Action::EndOfLine),
    ("End", Action::EndOfLine),
    ("Backspace", Action::DeleteBackwardChar),
    ("C-h", Action::DeleteBackwardChar),
    ("Delete", Action::DeleteForwardChar),
    ("C-d", Action::DeleteForwardChar),
    ("C-k", Action::KillEndOfLine),
    ("C-u", Action::KillBeginningOfLine),
    ("M-d", Action::DeleteAll),
    ("C-n", Action::SelectNextLine),
    ("Down", Action::SelectNextLine),
    ("C-p", Action::SelectPreviousLine),
    ("Up", Action::SelectPreviousLine),
    ("C-v", Action::SelectNextPage),
    ("PageDown", Action::SelectNextPage),
    ("M-v", Action::SelectPreviousPage),
    ("PageUp", Action::SelectPreviousPage),
    ("C-Space", Action::ToggleSelectionAndSelectNext),
    ("Tab", Action::ToggleSelectionAndSelectNext),
    ("M-Space", Action::ToggleSelection),
    ("M-a", Action::SelectAll),
    ("C-g", Action::SelectNone),
    ("C-t", Action::ToggleRangeMode),
    ("M-t", Action::CancelRangeMode),
    ("C-r", Action::RotateMatcher),
    ("C-l", Action::RefreshScreen),
];

/// Maps key combinations to actions.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<KeyCombo, Action>,
}

impl Default for Keymap {
    fn default() -> Self {
        let bindings = DEFAULT_BINDINGS
            .iter()
            .filter_map(|&(key, action)| KeyCombo::parse(key).map(|combo| (combo, action)))
            .collect();
        Self { bindings }
    }
}

impl Keymap {
    /// The default bindings with `overrides` (key name → action name) applied.
    pub fn with_overrides<'a, I>(overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut keymap = Self::default();
        for (key, action) in overrides {
            let combo = KeyCombo::parse(key)
                .ok_or_else(|| LinepickError::config(format!("unknown key name '{key}'")))?;
            let action: Action = action.parse()?;
            keymap.bind(combo, action);
        }
        Ok(keymap)
    }

    pub fn bind(&mut self, combo: KeyCombo, action: Action) {
        self.bindings.insert(combo, action);
    }

    /// The action for a key event. Unbound printable characters insert
    /// themselves; anything else is unhandled.
    pub fn resolve(&self, event: &KeyEvent) -> Option<Action> {
        let combo = KeyCombo::from_event(event);
        if let Some(action) = self.bindings.get(&combo) {
            return Some(*action);
        }
        match combo.code {
            KeyCode::Char(c)
                if !combo
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                Some(Action::InsertChar(c))
            }
            _ => None,
        }
    }
}
