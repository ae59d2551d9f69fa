// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words rxvt eterm terminfo

//! Ordered table of escape sequences and the keys they stand for.
//!
//! The table is normally filled from the terminal's terminfo entry by the caller (see
//! [`EscapeTable::new()`]). When no such data is at hand, [`EscapeTable::for_terminal()`]
//! picks one of the built-in tables for the common terminal families, using the same
//! `$TERM` substring matching that terminfo-less terminal libraries fall back to.
//!
//! # Matching
//!
//! [`EscapeTable::lookup()`] is the matcher used by the [decoder]. Given the bytes at the
//! front of the accumulation buffer (which start with `ESC`):
//!
//! 1. The longest entry that is a prefix of the buffer is the candidate. Entries with
//!    the same literal resolve to the one that comes first in table order.
//! 2. If the buffer is itself a strict prefix of some longer entry, a longer match is
//!    still possible, so the answer is [`EscapeMatch::Pending`].
//! 3. Otherwise the candidate wins, or [`EscapeMatch::NoMatch`] if there is none.
//!
//! ```text
//! table:  ESC O      → X
//!         ESC O P    → F1
//!
//! buffer: ESC O          → Pending   (ESC O P may still arrive)
//! buffer: ESC O P        → F1, 3 bytes
//! buffer: ESC O a        → X, 2 bytes
//! buffer: ESC Z          → NoMatch
//! ```
//!
//! [decoder]: crate::decode

use super::Key;

/// One `(literal bytes, key)` pair. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscapeEntry {
    bytes: Box<[u8]>,
    key: Key,
}

impl EscapeEntry {
    pub fn new(bytes: impl Into<Box<[u8]>>, key: Key) -> Self {
        Self {
            bytes: bytes.into(),
            key,
        }
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] { &self.bytes }

    #[must_use]
    pub fn key(&self) -> Key { self.key }
}

/// Result of [`EscapeTable::lookup()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeMatch {
    /// `len` leading bytes of the buffer spell `key`.
    Matched { key: Key, len: usize },
    /// The buffer could still grow into a (longer) entry. Wait for more bytes.
    Pending,
    /// No entry matches now, and none can match with more bytes.
    NoMatch,
}

/// Ordered list of escape sequences. Order only matters between entries with identical
/// literals: the first one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EscapeTable {
    entries: Vec<EscapeEntry>,
}

impl EscapeTable {
    pub fn new(entries: impl IntoIterator<Item = EscapeEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[EscapeEntry] { &self.entries }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    #[must_use]
    pub fn len(&self) -> usize { self.entries.len() }

    /// Length of the longest literal, `0` for an empty table.
    #[must_use]
    pub fn max_sequence_len(&self) -> usize {
        self.entries
            .iter()
            .map(|entry| entry.bytes.len())
            .max()
            .unwrap_or(0)
    }

    /// Matches the front of `buffer` against the table. See the [module docs] for the
    /// rules.
    ///
    /// [module docs]: self#matching
    #[must_use]
    pub fn lookup(&self, buffer: &[u8]) -> EscapeMatch {
        let mut candidate: Option<&EscapeEntry> = None;
        let mut longer_is_plausible = false;

        for entry in &self.entries {
            let literal = &*entry.bytes;
            if buffer.starts_with(literal) {
                // Strictly longer only, so the first of equal literals is kept.
                if candidate.is_none_or(|best| literal.len() > best.bytes.len()) {
                    candidate = Some(entry);
                }
            } else if literal.len() > buffer.len() && literal.starts_with(buffer) {
                longer_is_plausible = true;
            }
        }

        match (longer_is_plausible, candidate) {
            (true, _) => EscapeMatch::Pending,
            (false, Some(entry)) => EscapeMatch::Matched {
                key: entry.key,
                len: entry.bytes.len(),
            },
            (false, None) => EscapeMatch::NoMatch,
        }
    }

    /// The literal of the first entry for `key`, if any.
    #[must_use]
    pub fn sequence_for(&self, key: Key) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(EscapeEntry::bytes)
    }

    /// Picks a built-in table from a `$TERM` value.
    ///
    /// Exact names are tried first, then substring compatibility (`xterm-256color` is an
    /// xterm, `tmux-256color` is a screen, ...). Unknown terminals get the xterm table,
    /// which is what nearly every modern emulator speaks.
    #[must_use]
    pub fn for_terminal(term_name: &str) -> Self {
        let family = TerminalFamily::from_term_name(term_name);
        tracing::debug!(
            message = "escape table selected",
            term = term_name,
            family = ?family
        );
        family.table()
    }

    #[must_use]
    pub fn xterm() -> Self { TerminalFamily::Xterm.table() }
}

impl FromIterator<(Vec<u8>, Key)> for EscapeTable {
    fn from_iter<I: IntoIterator<Item = (Vec<u8>, Key)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(bytes, key)| EscapeEntry::new(bytes, key)))
    }
}

impl<'a> FromIterator<(&'a [u8], Key)> for EscapeTable {
    fn from_iter<I: IntoIterator<Item = (&'a [u8], Key)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(bytes, key)| EscapeEntry::new(bytes, key)))
    }
}

/// Terminal families with a built-in table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalFamily {
    Xterm,
    Rxvt,
    Linux,
    Screen,
}

impl TerminalFamily {
    #[must_use]
    pub fn from_term_name(term_name: &str) -> Self {
        match term_name {
            "xterm" => return Self::Xterm,
            "rxvt-unicode" | "rxvt" | "Eterm" => return Self::Rxvt,
            "linux" => return Self::Linux,
            "screen" | "tmux" => return Self::Screen,
            _ => {}
        }

        // Order matters: `rxvt-xterm` style names are rxvt first.
        let compat: [(&str, Self); 6] = [
            ("rxvt", Self::Rxvt),
            ("Eterm", Self::Rxvt),
            ("xterm", Self::Xterm),
            ("linux", Self::Linux),
            ("screen", Self::Screen),
            ("tmux", Self::Screen),
        ];
        compat
            .into_iter()
            .find(|(needle, _)| term_name.contains(needle))
            .map_or(Self::Xterm, |(_, family)| family)
    }

    #[must_use]
    pub fn table(self) -> EscapeTable {
        let specific: &[(&[u8], Key)] = match self {
            Self::Xterm => XTERM_KEYS,
            Self::Rxvt => RXVT_KEYS,
            Self::Linux => LINUX_KEYS,
            Self::Screen => SCREEN_KEYS,
        };
        specific
            .iter()
            .chain(COMMON_CSI_KEYS)
            .map(|&(bytes, key)| (bytes, key))
            .collect()
    }
}

const XTERM_KEYS: &[(&[u8], Key)] = &[
    (b"\x1bOP", Key::F(1)),
    (b"\x1bOQ", Key::F(2)),
    (b"\x1bOR", Key::F(3)),
    (b"\x1bOS", Key::F(4)),
    (b"\x1b[15~", Key::F(5)),
    (b"\x1b[17~", Key::F(6)),
    (b"\x1b[18~", Key::F(7)),
    (b"\x1b[19~", Key::F(8)),
    (b"\x1b[20~", Key::F(9)),
    (b"\x1b[21~", Key::F(10)),
    (b"\x1b[23~", Key::F(11)),
    (b"\x1b[24~", Key::F(12)),
    (b"\x1b[2~", Key::Insert),
    (b"\x1b[3~", Key::Delete),
    (b"\x1bOH", Key::Home),
    (b"\x1bOF", Key::End),
    (b"\x1b[5~", Key::PageUp),
    (b"\x1b[6~", Key::PageDown),
    (b"\x1bOA", Key::ArrowUp),
    (b"\x1bOB", Key::ArrowDown),
    (b"\x1bOD", Key::ArrowLeft),
    (b"\x1bOC", Key::ArrowRight),
];

const RXVT_KEYS: &[(&[u8], Key)] = &[
    (b"\x1b[11~", Key::F(1)),
    (b"\x1b[12~", Key::F(2)),
    (b"\x1b[13~", Key::F(3)),
    (b"\x1b[14~", Key::F(4)),
    (b"\x1b[15~", Key::F(5)),
    (b"\x1b[17~", Key::F(6)),
    (b"\x1b[18~", Key::F(7)),
    (b"\x1b[19~", Key::F(8)),
    (b"\x1b[20~", Key::F(9)),
    (b"\x1b[21~", Key::F(10)),
    (b"\x1b[23~", Key::F(11)),
    (b"\x1b[24~", Key::F(12)),
    (b"\x1b[2~", Key::Insert),
    (b"\x1b[3~", Key::Delete),
    (b"\x1b[7~", Key::Home),
    (b"\x1b[8~", Key::End),
    (b"\x1b[5~", Key::PageUp),
    (b"\x1b[6~", Key::PageDown),
];

const LINUX_KEYS: &[(&[u8], Key)] = &[
    (b"\x1b[[A", Key::F(1)),
    (b"\x1b[[B", Key::F(2)),
    (b"\x1b[[C", Key::F(3)),
    (b"\x1b[[D", Key::F(4)),
    (b"\x1b[[E", Key::F(5)),
    (b"\x1b[17~", Key::F(6)),
    (b"\x1b[18~", Key::F(7)),
    (b"\x1b[19~", Key::F(8)),
    (b"\x1b[20~", Key::F(9)),
    (b"\x1b[21~", Key::F(10)),
    (b"\x1b[23~", Key::F(11)),
    (b"\x1b[24~", Key::F(12)),
    (b"\x1b[2~", Key::Insert),
    (b"\x1b[3~", Key::Delete),
    (b"\x1b[1~", Key::Home),
    (b"\x1b[4~", Key::End),
    (b"\x1b[5~", Key::PageUp),
    (b"\x1b[6~", Key::PageDown),
];

const SCREEN_KEYS: &[(&[u8], Key)] = &[
    (b"\x1bOP", Key::F(1)),
    (b"\x1bOQ", Key::F(2)),
    (b"\x1bOR", Key::F(3)),
    (b"\x1bOS", Key::F(4)),
    (b"\x1b[15~", Key::F(5)),
    (b"\x1b[17~", Key::F(6)),
    (b"\x1b[18~", Key::F(7)),
    (b"\x1b[19~", Key::F(8)),
    (b"\x1b[20~", Key::F(9)),
    (b"\x1b[21~", Key::F(10)),
    (b"\x1b[23~", Key::F(11)),
    (b"\x1b[24~", Key::F(12)),
    (b"\x1b[2~", Key::Insert),
    (b"\x1b[3~", Key::Delete),
    (b"\x1b[1~", Key::Home),
    (b"\x1b[4~", Key::End),
    (b"\x1b[5~", Key::PageUp),
    (b"\x1b[6~", Key::PageDown),
    (b"\x1bOA", Key::ArrowUp),
    (b"\x1bOB", Key::ArrowDown),
    (b"\x1bOD", Key::ArrowLeft),
    (b"\x1bOC", Key::ArrowRight),
];

/// Normal cursor key mode sequences. Terminals only switch to the `ESC O` forms after
/// the application sends `smkx`, which this crate never does, so every family also
/// accepts these.
const COMMON_CSI_KEYS: &[(&[u8], Key)] = &[
    (b"\x1b[A", Key::ArrowUp),
    (b"\x1b[B", Key::ArrowDown),
    (b"\x1b[D", Key::ArrowLeft),
    (b"\x1b[C", Key::ArrowRight),
    (b"\x1b[H", Key::Home),
    (b"\x1b[F", Key::End),
];
