use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use mathplay_core::model::ExerciseId;
use thiserror::Error;

use crate::host::HostSurface;

//
// ─── KEY TOKENS ────────────────────────────────────────────────────────────────
//

/// Key token the host's keypad sends to the registered exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyToken {
    Digit(u8),
    /// `.` or `,`
    DecimalSeparator(char),
    Minus,
    Backspace,
    Check,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown key: {0}")]
pub struct UnknownKey(pub String);

impl FromStr for KeyToken {
    type Err = UnknownKey;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "backspace" => Ok(Self::Backspace),
            "check" => Ok(Self::Check),
            "-" => Ok(Self::Minus),
            "." => Ok(Self::DecimalSeparator('.')),
            "," => Ok(Self::DecimalSeparator(',')),
            _ => match raw.as_bytes() {
                [digit @ b'0'..=b'9'] => Ok(Self::Digit(digit - b'0')),
                _ => Err(UnknownKey(raw.to_string())),
            },
        }
    }
}

//
// ─── INPUT BUFFER ──────────────────────────────────────────────────────────────
//

/// Text typed on the keypad for the current challenge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
    max_len: usize,
}

impl InputBuffer {
    #[must_use]
    pub fn new(max_len: usize) -> Self {
        Self {
            text: String::new(),
            max_len,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Applies an editing key. Returns `true` if the text changed.
    ///
    /// Only one decimal separator is kept, a minus sign only as the first character, and
    /// nothing beyond `max_len` characters.
    pub fn apply(&mut self, key: KeyToken) -> bool {
        let full = self.text.chars().count() >= self.max_len;
        match key {
            KeyToken::Digit(digit) if !full => {
                self.text.push(char::from(b'0' + digit.min(9)));
                true
            }
            KeyToken::DecimalSeparator(sep) if !full && !self.text.contains(['.', ',']) => {
                self.text.push(sep);
                true
            }
            KeyToken::Minus if self.text.is_empty() && self.max_len > 0 => {
                self.text.push('-');
                true
            }
            KeyToken::Backspace => self.text.pop().is_some(),
            _ => false,
        }
    }
}

//
// ─── REGISTRATION ──────────────────────────────────────────────────────────────
//

/// Which input channel an exercise claims from the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputMode {
    /// Answers arrive through the exercise's own widgets.
    #[default]
    Text,
    /// The host's numeric keypad forwards key tokens.
    Keypad,
    /// Option buttons rendered in the host's keypad area.
    Options,
}

/// Option buttons an exercise hands to the host's keypad area.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeypadLayout {
    pub options: Vec<String>,
}

impl KeypadLayout {
    #[must_use]
    pub fn new(options: Vec<String>) -> Self {
        Self { options }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Claim {
    Keypad,
    CustomContent,
}

/// Scoped claim on a host input channel; dropping it releases the channel.
pub struct InputRegistration {
    host: Rc<dyn HostSurface>,
    claim: Claim,
}

impl InputRegistration {
    /// Routes the host keypad to `owner` until the registration is dropped.
    #[must_use]
    pub fn keypad(host: Rc<dyn HostSurface>, owner: ExerciseId) -> Self {
        host.register_keypad_handler(Some(owner));
        Self {
            host,
            claim: Claim::Keypad,
        }
    }

    /// Places option buttons in the host keypad area until the registration is dropped.
    #[must_use]
    pub fn custom_content(host: Rc<dyn HostSurface>, layout: KeypadLayout) -> Self {
        host.set_custom_keypad_content(Some(layout));
        Self {
            host,
            claim: Claim::CustomContent,
        }
    }

    /// Swaps the option buttons. Returns `false` for keypad registrations.
    pub fn replace_layout(&self, layout: KeypadLayout) -> bool {
        if self.claim != Claim::CustomContent {
            return false;
        }
        self.host.set_custom_keypad_content(Some(layout));
        true
    }

    #[must_use]
    pub fn is_keypad(&self) -> bool {
        self.claim == Claim::Keypad
    }
}

impl Drop for InputRegistration {
    fn drop(&mut self) {
        match self.claim {
            Claim::Keypad => self.host.register_keypad_handler(None),
            Claim::CustomContent => self.host.set_custom_keypad_content(None),
        }
    }
}

impl fmt::Debug for InputRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputRegistration")
            .field("claim", &self.claim)
            .finish_non_exhaustive()
    }
}
