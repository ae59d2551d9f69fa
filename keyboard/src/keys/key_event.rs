// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::Key;
use crate::ReadError;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// One decoded key press, or the terminal error that ended the input stream.
///
/// Exactly one payload is meaningful per event, and the variant says which one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    /// A functional key: control byte or recognized escape sequence.
    Key(Key),
    /// A printable Unicode scalar value.
    Char(char),
    /// The input stream terminated. This is always the last event of a sequence.
    Error(ReadError),
}

impl KeyEvent {
    #[must_use]
    pub fn is_error(&self) -> bool { matches!(self, Self::Error(_)) }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self { Self::Key(key) }
}

impl From<char> for KeyEvent {
    fn from(ch: char) -> Self { Self::Char(ch) }
}

impl Display for KeyEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Key(key) => write!(f, "{key}"),
            Self::Char(ch) => write!(f, "{ch:?}"),
            Self::Error(error) => write!(f, "{error}"),
        }
    }
}
