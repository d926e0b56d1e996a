// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{FieldValue, Record};

/// Option value that stands for "no constraint" in every filter control.
pub const ALL_SENTINEL: &str = "all";

/// Describes one filter control: which field it constrains and what it offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub key: &'static str,
    pub label: &'static str,
    pub options: Vec<String>,
    pub multiple: bool,
}

impl FilterOption {
    pub fn single(key: &'static str, label: &'static str, options: &[&str]) -> Self {
        Self {
            key,
            label,
            options: options.iter().map(|option| (*option).to_owned()).collect(),
            multiple: false,
        }
    }

    pub fn multiple(key: &'static str, label: &'static str, options: &[&str]) -> Self {
        Self {
            multiple: true,
            ..Self::single(key, label, options)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterSelection {
    #[default]
    All,
    One(String),
    Any(BTreeSet<String>),
}

impl FilterSelection {
    pub fn is_constraint(&self) -> bool {
        match self {
            Self::All => false,
            Self::One(value) => value != ALL_SENTINEL,
            Self::Any(values) => !values.is_empty(),
        }
    }

    fn admits(&self, value: &FieldValue) -> bool {
        match self {
            Self::All => true,
            Self::One(wanted) => wanted == ALL_SENTINEL || value.matches_value(wanted),
            Self::Any(wanted) => {
                wanted.is_empty() || wanted.iter().any(|wanted| value.matches_value(wanted))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::All => ALL_SENTINEL.to_owned(),
            Self::One(value) => value.clone(),
            Self::Any(values) => values.iter().cloned().collect::<Vec<_>>().join("|"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    search: String,
    selections: BTreeMap<String, FilterSelection>,
}

impl FilterState {
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn push_search(&mut self, ch: char) {
        self.search.push(ch);
    }

    pub fn pop_search(&mut self) {
        self.search.pop();
    }

    pub fn selection(&self, key: &str) -> &FilterSelection {
        static UNCONSTRAINED: FilterSelection = FilterSelection::All;
        self.selections.get(key).unwrap_or(&UNCONSTRAINED)
    }

    /// Single-select. Selecting the sentinel removes the constraint.
    pub fn select(&mut self, key: &str, value: &str) {
        if value == ALL_SENTINEL {
            self.selections.remove(key);
        } else {
            self.selections
                .insert(key.to_owned(), FilterSelection::One(value.to_owned()));
        }
    }

    /// Multi-select. Toggling the last value off removes the constraint.
    pub fn toggle(&mut self, key: &str, value: &str) {
        if value == ALL_SENTINEL {
            self.selections.remove(key);
            return;
        }
        let mut values = match self.selections.remove(key) {
            Some(FilterSelection::Any(values)) => values,
            Some(FilterSelection::One(existing)) if existing != ALL_SENTINEL => {
                BTreeSet::from([existing])
            }
            _ => BTreeSet::new(),
        };
        if !values.remove(value) {
            values.insert(value.to_owned());
        }
        if !values.is_empty() {
            self.selections
                .insert(key.to_owned(), FilterSelection::Any(values));
        }
    }

    pub fn clear(&mut self, key: &str) {
        self.selections.remove(key);
    }

    pub fn clear_all(&mut self) {
        self.search.clear();
        self.selections.clear();
    }

    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || self.active_count() > 0
    }

    pub fn active_count(&self) -> usize {
        self.selections
            .values()
            .filter(|selection| selection.is_constraint())
            .count()
    }

    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.search.is_empty() {
            parts.push(format!("/{}", self.search));
        }
        for (key, selection) in &self.selections {
            if selection.is_constraint() {
                parts.push(format!("{key}={}", selection.describe()));
            }
        }
        parts.join(" ")
    }

    pub fn matches<R: Record>(&self, record: &R, search_keys: &[&str]) -> bool {
        self.matches_search(record, search_keys) && self.matches_selections(record)
    }

    /// The query is matched as typed, surrounding spaces included.
    fn matches_search<R: Record>(&self, record: &R, search_keys: &[&str]) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        search_keys
            .iter()
            .filter_map(|key| record.field(key))
            .any(|value| value.contains_text(&needle))
    }

    fn matches_selections<R: Record>(&self, record: &R) -> bool {
        self.selections
            .iter()
            .filter(|(_, selection)| selection.is_constraint())
            .all(|(key, selection)| {
                record
                    .field(key)
                    .is_some_and(|value| selection.admits(&value))
            })
    }
}

/// Order-preserving view of `records` that satisfy `state`.
pub fn apply_filters<'a, R: Record>(
    records: &'a [R],
    search_keys: &[&str],
    state: &FilterState,
) -> Vec<&'a R> {
    records
        .iter()
        .filter(|record| state.matches(*record, search_keys))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{ALL_SENTINEL, FilterSelection, FilterState, apply_filters};
    use crate::ids::RecordId;
    use crate::model::{FieldValue, Record};

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: RecordId,
        vendor: &'static str,
        status: &'static str,
        tags: Vec<String>,
    }

    impl Record for Row {
        fn id(&self) -> &RecordId {
            &self.id
        }

        fn set_id(&mut self, id: RecordId) {
            self.id = id;
        }

        fn field(&self, key: &str) -> Option<FieldValue> {
            match key {
                "vendor" => Some(FieldValue::Text(self.vendor.to_owned())),
                "status" => Some(FieldValue::Text(self.status.to_owned())),
                "tags" => Some(FieldValue::Tags(self.tags.clone())),
                _ => None,
            }
        }
    }

    fn row(id: &str, vendor: &'static str, status: &'static str, tags: &[&str]) -> Row {
        Row {
            id: RecordId::from(id),
            vendor,
            status,
            tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
        }
    }

    fn sample() -> Vec<Row> {
        vec![
            row("PO001", "Steel Corp Ltd", "sent", &["Steel"]),
            row("PO002", "Cement Works", "delivered", &["Cement", "Bulk"]),
        ]
    }

    fn ids(rows: &[&Row]) -> Vec<String> {
        rows.iter().map(|row| row.id.to_string()).collect()
    }

    #[test]
    fn status_filter_keeps_only_matching_rows() {
        let rows = sample();
        let mut state = FilterState::default();
        state.select("status", "delivered");
        assert_eq!(ids(&apply_filters(&rows, &["vendor"], &state)), ["PO002"]);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let rows = sample();
        let mut state = FilterState::default();
        state.set_search("steel");
        assert_eq!(ids(&apply_filters(&rows, &["vendor"], &state)), ["PO001"]);
    }

    #[test]
    fn search_keeps_surrounding_spaces() {
        let rows = sample();
        let mut state = FilterState::default();
        state.set_search(" works");
        assert_eq!(ids(&apply_filters(&rows, &["vendor"], &state)), ["PO002"]);

        state.set_search("ltd ");
        assert!(apply_filters(&rows, &["vendor"], &state).is_empty());
        assert!(state.is_active());
    }

    #[test]
    fn unmatched_search_yields_empty_view() {
        let rows = sample();
        let mut state = FilterState::default();
        state.set_search("zzz");
        assert!(apply_filters(&rows, &["vendor"], &state).is_empty());
    }

    #[test]
    fn search_without_searchable_keys_matches_nothing() {
        let rows = sample();
        let mut state = FilterState::default();
        state.set_search("steel");
        assert!(apply_filters(&rows, &[], &state).is_empty());
    }

    #[test]
    fn sentinel_selection_clears_constraint() {
        let mut state = FilterState::default();
        state.select("status", "sent");
        assert_eq!(state.active_count(), 1);
        state.select("status", ALL_SENTINEL);
        assert_eq!(state.active_count(), 0);
        assert_eq!(state.selection("status"), &FilterSelection::All);
    }

    #[test]
    fn multi_select_uses_membership() {
        let rows = sample();
        let mut state = FilterState::default();
        state.toggle("tags", "Bulk");
        state.toggle("tags", "Steel");
        assert_eq!(
            ids(&apply_filters(&rows, &[], &state)),
            ["PO001", "PO002"]
        );
        state.toggle("tags", "Steel");
        assert_eq!(ids(&apply_filters(&rows, &[], &state)), ["PO002"]);
        state.toggle("tags", "Bulk");
        assert!(!state.is_active());
    }

    #[test]
    fn missing_field_under_active_filter_does_not_match() {
        let rows = sample();
        let mut state = FilterState::default();
        state.select("location", "Warehouse A");
        assert!(apply_filters(&rows, &[], &state).is_empty());
    }

    #[test]
    fn describe_lists_search_and_constraints() {
        let mut state = FilterState::default();
        state.set_search("cement");
        state.select("status", "delivered");
        assert_eq!(state.describe(), "/cement status=delivered");
        state.clear_all();
        assert_eq!(state.describe(), "");
    }
}
