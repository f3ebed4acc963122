//! Named key bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("unknown key name '{0}'")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    code: KeyCode,
    ctrl: bool,
}

impl KeySpec {
    /// Parses names like `Escape`, `ArrowDown`, `F3`, `a` or `Ctrl+C`, ignoring case.
    pub fn parse(name: &str) -> Result<Self, KeyError> {
        let trimmed = name.trim();
        let lower = trimmed.to_ascii_lowercase();
        let (ctrl, rest) = match lower.strip_prefix("ctrl+") {
            Some(rest) => (true, rest),
            None => (false, lower.as_str()),
        };
        let code = match rest {
            "escape" | "esc" => KeyCode::Esc,
            "enter" | "return" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backspace" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "up" | "arrowup" => KeyCode::Up,
            "down" | "arrowdown" => KeyCode::Down,
            "left" | "arrowleft" => KeyCode::Left,
            "right" | "arrowright" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "space" => KeyCode::Char(' '),
            other => {
                if let Some(n) = other.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                    if (1..=12).contains(&n) {
                        KeyCode::F(n)
                    } else {
                        return Err(KeyError::Unknown(trimmed.to_string()));
                    }
                } else {
                    let mut chars = other.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => KeyCode::Char(c),
                        _ => return Err(KeyError::Unknown(trimmed.to_string())),
                    }
                }
            }
        };
        Ok(Self { code, ctrl })
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        if event.kind == KeyEventKind::Release {
            return false;
        }
        if event.modifiers.contains(KeyModifiers::CONTROL) != self.ctrl {
            return false;
        }
        match (self.code, event.code) {
            (KeyCode::Char(want), KeyCode::Char(got)) => want.eq_ignore_ascii_case(&got),
            (want, got) => want == got,
        }
    }
}

#[derive(Debug, Clone)]
pub struct KeyBinding<A> {
    spec: KeySpec,
    action: A,
}

impl<A: Clone> KeyBinding<A> {
    pub fn new(name: &str, action: A) -> Result<Self, KeyError> {
        Ok(Self {
            spec: KeySpec::parse(name)?,
            action,
        })
    }

    /// Like `new`, and runs `setup` once the binding is active.
    pub fn with_setup<F: FnOnce()>(name: &str, action: A, setup: F) -> Result<Self, KeyError> {
        let binding = Self::new(name, action)?;
        setup();
        Ok(binding)
    }

    pub fn dispatch(&self, event: &KeyEvent) -> Option<A> {
        self.spec.matches(event).then(|| self.action.clone())
    }
}

/// Ordered bindings; the first match wins.
#[derive(Debug, Clone)]
pub struct Keymap<A> {
    bindings: Vec<KeyBinding<A>>,
}

impl<A: Clone> Keymap<A> {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    pub fn bind(&mut self, name: &str, action: A) -> Result<&mut Self, KeyError> {
        self.bindings.push(KeyBinding::new(name, action)?);
        Ok(self)
    }

    pub fn bind_with_setup<F: FnOnce()>(
        &mut self,
        name: &str,
        action: A,
        setup: F,
    ) -> Result<&mut Self, KeyError> {
        self.bindings
            .push(KeyBinding::with_setup(name, action, setup)?);
        Ok(self)
    }

    pub fn resolve(&self, event: &KeyEvent) -> Option<A> {
        self.bindings.iter().find_map(|b| b.dispatch(event))
    }
}

impl<A: Clone> Default for Keymap<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn key_names_are_case_insensitive() {
        let binding = KeyBinding::new("escape", "close").expect("parse");
        assert_eq!(binding.dispatch(&press(KeyCode::Esc)), Some("close"));
        let binding = KeyBinding::new("ESCAPE", "close").expect("parse");
        assert_eq!(binding.dispatch(&press(KeyCode::Esc)), Some("close"));
        let binding = KeyBinding::new("A", "add").expect("parse");
        assert_eq!(binding.dispatch(&press(KeyCode::Char('a'))), Some("add"));
    }

    #[test]
    fn setup_runs_once_on_activation() {
        let mut runs = 0;
        let binding = KeyBinding::with_setup("Enter", 1u8, || runs += 1).expect("parse");
        binding.dispatch(&press(KeyCode::Enter));
        binding.dispatch(&press(KeyCode::Enter));
        assert_eq!(runs, 1);
    }

    #[test]
    fn ctrl_bindings_require_the_modifier() {
        let mut keymap = Keymap::new();
        keymap
            .bind("Ctrl+C", "quit")
            .and_then(|k| k.bind("c", "char"))
            .expect("bind");
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(keymap.resolve(&ctrl_c), Some("quit"));
        assert_eq!(keymap.resolve(&press(KeyCode::Char('c'))), Some("char"));
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(
            KeySpec::parse("Hyper"),
            Err(KeyError::Unknown("Hyper".to_string()))
        );
        assert!(KeySpec::parse("F13").is_err());
        assert_eq!(
            KeySpec::parse("f3").map(|s| s.code),
            Ok(KeyCode::F(3))
        );
    }
}
