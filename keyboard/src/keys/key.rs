// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Functional key codes.
//!
//! A [`Key`] is any key that is not a printable character. There are two families:
//!
//! | Family          | Bytes on the wire                 | How it is recognized            |
//! | :-------------- | :-------------------------------- | :------------------------------ |
//! | Single byte     | `0x00..=0x20` and `0x7F`          | [`Key::from_control_byte()`]    |
//! | Escape sequence | `ESC` followed by 1 or more bytes | [`EscapeTable`] lookup          |
//!
//! In raw mode the line discipline does not translate anything, so `Enter` arrives as
//! `CR` (`0x0D`), `Backspace` usually arrives as `DEL` (`0x7F`, [`Key::Backspace2`]) and
//! `Ctrl+H` arrives as `BS` (`0x08`, [`Key::Backspace`]).
//!
//! [`EscapeTable`]: crate::EscapeTable

use std::fmt::{Display, Formatter, Result as FmtResult};

/// The escape byte (`ESC`, `0x1B`) that starts every escape sequence.
pub const ESC_BYTE: u8 = 0x1B;

/// The highest byte value that maps to a single byte functional key ([`Key::Space`]).
pub const SPACE_BYTE: u8 = 0x20;

/// The secondary backspace byte (`DEL`, `0x7F`) sent by most terminals for `Backspace`.
pub const BACKSPACE2_BYTE: u8 = 0x7F;

const CTRL_LETTER_BASE: u8 = b'a' - 1;

/// A functional (non printable) key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// `0x00`, sent by `Ctrl+Space`, `Ctrl+2` and `Ctrl+~`.
    CtrlSpace,
    /// `Ctrl+<letter>` (`0x01..=0x1A`), except the letters that have a dedicated
    /// variant: `h` ([`Key::Backspace`]), `i` ([`Key::Tab`]), `m` ([`Key::Enter`]).
    /// Holds the lowercase ASCII letter.
    Ctrl(char),
    /// `0x08`, also `Ctrl+H`.
    Backspace,
    /// `0x09`, also `Ctrl+I`.
    Tab,
    /// `0x0D`, also `Ctrl+M`.
    Enter,
    /// `0x1B`, also `Ctrl+[`. Also produced for an unrecognized escape sequence.
    Esc,
    /// `0x1C`, also `Ctrl+4`.
    CtrlBackslash,
    /// `0x1D`, also `Ctrl+5`.
    CtrlRightBracket,
    /// `0x1E`, also `Ctrl+6`.
    CtrlCaret,
    /// `0x1F`, also `Ctrl+7` and `Ctrl+/`.
    CtrlUnderscore,
    /// `0x20`.
    Space,
    /// `0x7F`.
    Backspace2,
    /// Function keys `F1` through `F12`.
    F(u8),
    Insert,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

impl Key {
    /// Maps a single byte to its functional key.
    ///
    /// Returns [`None`] for every byte above [`SPACE_BYTE`] except [`BACKSPACE2_BYTE`],
    /// since those start printable text.
    #[must_use]
    pub const fn from_control_byte(byte: u8) -> Option<Self> {
        let key = match byte {
            0x00 => Self::CtrlSpace,
            0x08 => Self::Backspace,
            0x09 => Self::Tab,
            0x0D => Self::Enter,
            0x01..=0x1A => Self::Ctrl((CTRL_LETTER_BASE + byte) as char),
            ESC_BYTE => Self::Esc,
            0x1C => Self::CtrlBackslash,
            0x1D => Self::CtrlRightBracket,
            0x1E => Self::CtrlCaret,
            0x1F => Self::CtrlUnderscore,
            SPACE_BYTE => Self::Space,
            BACKSPACE2_BYTE => Self::Backspace2,
            _ => return None,
        };
        Some(key)
    }

    /// The inverse of [`Key::from_control_byte()`].
    ///
    /// Returns [`None`] for keys that only exist as escape sequences, and for a
    /// [`Key::Ctrl`] that does not hold a lowercase ASCII letter.
    #[must_use]
    pub fn control_byte(self) -> Option<u8> {
        match self {
            Self::CtrlSpace => Some(0x00),
            Self::Backspace => Some(0x08),
            Self::Tab => Some(0x09),
            Self::Enter => Some(0x0D),
            Self::Ctrl(letter) if letter.is_ascii_lowercase() => {
                // Checked above: always ASCII.
                let byte = u8::try_from(letter).ok()?;
                Some(byte - CTRL_LETTER_BASE)
            }
            Self::Esc => Some(ESC_BYTE),
            Self::CtrlBackslash => Some(0x1C),
            Self::CtrlRightBracket => Some(0x1D),
            Self::CtrlCaret => Some(0x1E),
            Self::CtrlUnderscore => Some(0x1F),
            Self::Space => Some(SPACE_BYTE),
            Self::Backspace2 => Some(BACKSPACE2_BYTE),
            _ => None,
        }
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::CtrlSpace => write!(f, "Ctrl+Space"),
            Self::Ctrl(letter) => write!(f, "Ctrl+{}", letter.to_ascii_uppercase()),
            Self::CtrlBackslash => write!(f, "Ctrl+\\"),
            Self::CtrlRightBracket => write!(f, "Ctrl+]"),
            Self::CtrlCaret => write!(f, "Ctrl+^"),
            Self::CtrlUnderscore => write!(f, "Ctrl+_"),
            Self::F(n) => write!(f, "F{n}"),
            other => write!(f, "{other:?}"),
        }
    }
}
