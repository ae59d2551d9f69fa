// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words multibyte

//! Pure decoder: the front of a byte buffer to at most one [`KeyEvent`].
//!
//! [`decode()`] only ever looks at the head of the buffer and never mutates anything.
//! The [event producer] calls it in a loop, consuming [`Decoded::consumed()`] bytes after
//! each event, until it reports that more bytes are needed.
//!
//! ```text
//! first byte          rule                                 result
//! ──────────────────────────────────────────────────────────────────────────────
//! (empty buffer)      wait                                 Incomplete
//! 0x1B                EscapeTable::lookup()                Key / Incomplete / Esc
//! 0x00..=0x20, 0x7F   single byte functional key           Key, 1 byte
//! anything else       one UTF-8 scalar                     Char / Incomplete / Invalid
//! ```
//!
//! An `ESC` run that no table entry matches (and none can match with more bytes) is
//! reported as a single [`Key::Esc`] that swallows the *whole* buffer. It is never
//! partially consumed.
//!
//! A lone `ESC` is [`Decoded::Incomplete`] whenever the table has escape sequences,
//! because the bytes seen so far cannot tell the Esc key from the start of a sequence.
//! The [event producer] settles it using the reader's `more` flag on each chunk.
//!
//! [event producer]: crate::EventProducer

use super::{ESC_BYTE, EscapeMatch, EscapeTable, Key, KeyEvent};

/// UTF-8 never needs more than this many bytes for one scalar value.
const UTF8_MAX_LEN: usize = 4;

/// Outcome of [`decode()`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// The first `consumed` bytes of the buffer decode to `event`.
    Event { consumed: usize, event: KeyEvent },
    /// The buffer is empty, or holds the valid beginning of an escape sequence or UTF-8
    /// scalar. Retry once more bytes have arrived.
    Incomplete,
    /// The buffer starts with bytes that can never become valid UTF-8. What to do is up
    /// to the caller (see [`InvalidInputPolicy`]).
    ///
    /// [`InvalidInputPolicy`]: crate::InvalidInputPolicy
    Invalid,
}

impl Decoded {
    /// Bytes to remove from the head of the buffer. `0` unless an event was decoded.
    #[must_use]
    pub fn consumed(&self) -> usize {
        match self {
            Self::Event { consumed, .. } => *consumed,
            Self::Incomplete | Self::Invalid => 0,
        }
    }

    #[must_use]
    pub fn event(&self) -> Option<&KeyEvent> {
        match self {
            Self::Event { event, .. } => Some(event),
            Self::Incomplete | Self::Invalid => None,
        }
    }

    fn key(consumed: usize, key: Key) -> Self {
        Self::Event {
            consumed,
            event: KeyEvent::Key(key),
        }
    }
}

/// Decodes at most one event from the front of `buffer`.
///
/// Deterministic: the same bytes and table always give the same answer. The returned
/// `consumed` count never exceeds `buffer.len()`.
#[must_use]
pub fn decode(buffer: &[u8], table: &EscapeTable) -> Decoded {
    let Some(&first) = buffer.first() else {
        return Decoded::Incomplete;
    };

    if first == ESC_BYTE {
        return match table.lookup(buffer) {
            EscapeMatch::Matched { key, len } => Decoded::key(len, key),
            EscapeMatch::Pending => Decoded::Incomplete,
            EscapeMatch::NoMatch => Decoded::key(buffer.len(), Key::Esc),
        };
    }

    if let Some(key) = Key::from_control_byte(first) {
        return Decoded::key(1, key);
    }

    decode_utf8_scalar(buffer)
}

fn decode_utf8_scalar(buffer: &[u8]) -> Decoded {
    let head = &buffer[..buffer.len().min(UTF8_MAX_LEN)];
    let valid = match std::str::from_utf8(head) {
        Ok(text) => text,
        // Anything after the first scalar is irrelevant here.
        Err(error) if error.valid_up_to() > 0 => {
            // `valid_up_to()` is always a char boundary.
            match std::str::from_utf8(&head[..error.valid_up_to()]) {
                Ok(text) => text,
                Err(_) => return Decoded::Invalid,
            }
        }
        // `error_len() == None` means the input ended mid-sequence.
        Err(error) if error.error_len().is_none() => return Decoded::Incomplete,
        Err(_) => return Decoded::Invalid,
    };

    match valid.chars().next() {
        Some(ch) => Decoded::Event {
            consumed: ch.len_utf8(),
            event: KeyEvent::Char(ch),
        },
        None => Decoded::Incomplete,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReadError;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn function_key_table() -> EscapeTable {
        [
            (b"\x1bOP".to_vec(), Key::F(1)),
            (b"\x1bOQ".to_vec(), Key::F(2)),
        ]
        .into_iter()
        .collect()
    }

    /// Decodes until the decoder asks for more bytes, like the producer does.
    fn decode_all(mut buffer: &[u8], table: &EscapeTable) -> (Vec<KeyEvent>, usize) {
        let mut events = vec![];
        while let Decoded::Event { consumed, event } = decode(buffer, table) {
            events.push(event);
            buffer = &buffer[consumed..];
        }
        (events, buffer.len())
    }

    #[test]
    fn test_empty_buffer_is_incomplete() {
        let decoded = decode(b"", &function_key_table());
        assert_eq!(decoded, Decoded::Incomplete);
        assert_eq!(decoded.consumed(), 0);
        assert_eq!(decoded.event(), None);
    }

    #[test]
    fn test_function_key_then_char() {
        let (events, leftover) = decode_all(b"\x1bOPa", &function_key_table());
        assert_eq!(events, vec![KeyEvent::Key(Key::F(1)), KeyEvent::Char('a')]);
        assert_eq!(leftover, 0);
    }

    #[test]
    fn test_unmatched_escape_swallows_whole_buffer() {
        assert_eq!(
            decode(b"\x1bZ", &function_key_table()),
            Decoded::Event {
                consumed: 2,
                event: KeyEvent::Key(Key::Esc)
            }
        );
        assert_eq!(decode(b"\x1bZabc", &function_key_table()).consumed(), 5);
    }

    #[test]
    fn test_lone_escape_waits_for_more_bytes() {
        assert_eq!(decode(b"\x1b", &function_key_table()), Decoded::Incomplete);
        assert_eq!(decode(b"\x1bO", &function_key_table()), Decoded::Incomplete);
    }

    #[test]
    fn test_lone_escape_with_empty_table() {
        assert_eq!(
            decode(b"\x1b", &EscapeTable::default()),
            Decoded::Event {
                consumed: 1,
                event: KeyEvent::Key(Key::Esc)
            }
        );
    }

    #[test_case(b"\r", Key::Enter)]
    #[test_case(b"\t", Key::Tab)]
    #[test_case(b" ", Key::Space)]
    #[test_case(b"\x7f", Key::Backspace2)]
    #[test_case(b"\x03", Key::Ctrl('c'))]
    #[test_case(b"\x00", Key::CtrlSpace)]
    fn test_single_byte_functional_keys(bytes: &[u8], key: Key) {
        assert_eq!(
            decode(bytes, &function_key_table()),
            Decoded::Event {
                consumed: 1,
                event: KeyEvent::Key(key)
            }
        );
    }

    #[test_case("a", 1 ; "one byte scalar")]
    #[test_case("é", 2 ; "two byte scalar")]
    #[test_case("€", 3 ; "three byte scalar")]
    #[test_case("😀", 4 ; "four byte scalar")]
    fn test_utf8_scalar(text: &str, len: usize) {
        let ch = text.chars().next().unwrap();
        assert_eq!(
            decode(text.as_bytes(), &EscapeTable::default()),
            Decoded::Event {
                consumed: len,
                event: KeyEvent::Char(ch)
            }
        );
    }

    #[test]
    fn test_utf8_followed_by_garbage_still_decodes_first_scalar() {
        assert_eq!(
            decode(b"a\xff\xff", &EscapeTable::default()),
            Decoded::Event {
                consumed: 1,
                event: KeyEvent::Char('a')
            }
        );
    }

    #[test]
    fn test_incomplete_utf8_prefixes() {
        let euro = "€".as_bytes();
        assert_eq!(decode(&euro[..1], &EscapeTable::default()), Decoded::Incomplete);
        assert_eq!(decode(&euro[..2], &EscapeTable::default()), Decoded::Incomplete);
    }

    #[test_case(b"\xff" ; "never valid byte")]
    #[test_case(b"\x80abc" ; "stray continuation byte")]
    #[test_case(b"\xe2\x28\xa1" ; "bad continuation byte")]
    fn test_invalid_utf8(bytes: &[u8]) {
        let decoded = decode(bytes, &EscapeTable::default());
        assert_eq!(decoded, Decoded::Invalid);
        assert_eq!(decoded.consumed(), 0);
    }

    #[test]
    fn test_consumed_never_exceeds_buffer_len() {
        let table = EscapeTable::xterm();
        let samples: [&[u8]; 9] = [
            b"",
            b"\x1b",
            b"\x1b[",
            b"\x1b[1",
            b"\x1b[15~",
            b"\x1bZZ",
            "€".as_bytes(),
            b"\xf0\x9f",
            b"\x7fq",
        ];
        for sample in samples {
            for end in 0..=sample.len() {
                let prefix = &sample[..end];
                assert!(decode(prefix, &table).consumed() <= prefix.len());
            }
        }
    }

    #[test]
    fn test_decode_is_deterministic() {
        let table = EscapeTable::xterm();
        let buffer = b"\x1b[A\xe2\x82";
        assert_eq!(decode(buffer, &table), decode(buffer, &table));
    }

    #[test]
    fn test_round_trip_through_implied_bytes() {
        let table = EscapeTable::xterm();
        let original = "h\x1b[15~é\r\x1bOA😀\x7f\x03".as_bytes();
        let (events, leftover) = decode_all(original, &table);
        assert_eq!(leftover, 0);

        let mut implied = vec![];
        for event in &events {
            match event {
                KeyEvent::Char(ch) => {
                    implied.extend_from_slice(ch.encode_utf8(&mut [0; 4]).as_bytes());
                }
                KeyEvent::Key(key) => match key.control_byte() {
                    Some(byte) => implied.push(byte),
                    None => implied.extend_from_slice(table.sequence_for(*key).unwrap()),
                },
                KeyEvent::Error(_) => unreachable!(),
            }
        }

        let (round_tripped, _) = decode_all(&implied, &table);
        assert_eq!(round_tripped, events);
    }

    #[test]
    fn test_error_events_are_never_decoded() {
        let (events, _) = decode_all(b"abc", &EscapeTable::default());
        assert!(!events.iter().any(KeyEvent::is_error));
        let error_event = KeyEvent::Error(ReadError {
            kind: std::io::ErrorKind::Other,
            message: "boom".into(),
        });
        assert!(error_event.is_error());
    }
}
