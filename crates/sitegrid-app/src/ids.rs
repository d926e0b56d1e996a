// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a stored record. An empty id marks a draft that has not been
/// stored yet.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub const fn unassigned() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_assigned(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Monotonic `<prefix><zero-padded number>` id generator. The counter never
/// moves backwards, so removing records cannot cause an id to be handed out
/// twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSequence {
    prefix: &'static str,
    width: usize,
    next: u64,
}

impl IdSequence {
    pub const fn new(prefix: &'static str, width: usize) -> Self {
        Self {
            prefix,
            width,
            next: 1,
        }
    }

    pub const fn prefix(&self) -> &'static str {
        self.prefix
    }

    pub const fn peek(&self) -> u64 {
        self.next
    }

    /// Advances the counter past `id` when it belongs to this sequence.
    pub fn observe(&mut self, id: &RecordId) {
        if let Some(number) = self.number_of(id) {
            self.next = self.next.max(number.saturating_add(1));
        }
    }

    pub fn number_of(&self, id: &RecordId) -> Option<u64> {
        let digits = id.as_str().strip_prefix(self.prefix)?;
        if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    pub fn format(&self, number: u64) -> RecordId {
        RecordId(format!(
            "{}{:0width$}",
            self.prefix,
            number,
            width = self.width
        ))
    }

    pub fn next_id(&mut self) -> RecordId {
        let id = self.format(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::{IdSequence, RecordId};

    #[test]
    fn sequence_pads_to_width() {
        let mut sequence = IdSequence::new("PO", 3);
        assert_eq!(sequence.next_id(), RecordId::from("PO001"));
        assert_eq!(sequence.next_id(), RecordId::from("PO002"));
        assert_eq!(sequence.peek(), 3);
    }

    #[test]
    fn observe_only_moves_forward() {
        let mut sequence = IdSequence::new("MR", 3);
        sequence.observe(&RecordId::from("MR007"));
        sequence.observe(&RecordId::from("MR002"));
        assert_eq!(sequence.next_id(), RecordId::from("MR008"));
    }

    #[test]
    fn foreign_ids_are_ignored() {
        let mut sequence = IdSequence::new("PO", 3);
        sequence.observe(&RecordId::from("PO-2024-001"));
        sequence.observe(&RecordId::from("TRF009"));
        sequence.observe(&RecordId::from("PO"));
        assert_eq!(sequence.peek(), 1);
    }

    #[test]
    fn wide_numbers_overflow_padding_instead_of_truncating() {
        let sequence = IdSequence::new("ISS", 3);
        assert_eq!(sequence.format(1234), RecordId::from("ISS1234"));
    }

    #[test]
    fn blank_ids_are_unassigned() {
        assert!(!RecordId::unassigned().is_assigned());
        assert!(!RecordId::from("  ").is_assigned());
        assert!(RecordId::from("A").is_assigned());
    }
}
