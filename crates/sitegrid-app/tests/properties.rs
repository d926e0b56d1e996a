// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use proptest::prelude::*;
use proptest::test_runner::Config;
use sitegrid_app::{
    FieldValue, FilterState, FormDialog, FormDraft, IdSequence, Record, RecordId, RecordStore,
    apply_filters,
};

#[derive(Debug, Clone, PartialEq)]
struct Row {
    id: RecordId,
    name: String,
    status: String,
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
            "name" => Some(FieldValue::Text(self.name.clone())),
            "status" => Some(FieldValue::Text(self.status.clone())),
            "tags" => Some(FieldValue::Tags(self.tags.clone())),
            _ => None,
        }
    }
}

const STATUSES: &[&str] = &["open", "closed", "held"];
const TAGS: &[&str] = &["a", "b", "c", "d"];

fn row_strategy() -> impl Strategy<Value = (String, usize, Vec<usize>)> {
    (
        "[a-zA-Z ]{0,12}",
        0..STATUSES.len(),
        prop::collection::vec(0..TAGS.len(), 0..3),
    )
}

fn rows_strategy() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(row_strategy(), 0..24).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(index, (name, status, tags))| Row {
                id: RecordId::new(format!("R{index:03}")),
                name,
                status: STATUSES[status].to_owned(),
                tags: tags.into_iter().map(|tag| TAGS[tag].to_owned()).collect(),
            })
            .collect()
    })
}

fn filter_strategy() -> impl Strategy<Value = FilterState> {
    (
        "[a-z]{0,2}",
        prop::option::of(0..STATUSES.len()),
        prop::collection::vec(0..TAGS.len(), 0..3),
    )
        .prop_map(|(search, status, tags)| {
            let mut state = FilterState::default();
            state.set_search(search);
            if let Some(status) = status {
                state.select("status", STATUSES[status]);
            }
            for tag in tags {
                state.toggle("tags", TAGS[tag]);
            }
            state
        })
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn filtered_view_is_an_ordered_subsequence(rows in rows_strategy(), state in filter_strategy()) {
        let view = apply_filters(&rows, &["name"], &state);
        let mut cursor = rows.iter();
        for kept in &view {
            prop_assert!(cursor.any(|row| row.id == kept.id));
        }
        prop_assert!(view.len() <= rows.len());
    }

    #[test]
    fn unconstrained_filter_is_identity(rows in rows_strategy()) {
        let view = apply_filters(&rows, &["name"], &FilterState::default());
        let kept: Vec<&RecordId> = view.iter().map(|row| &row.id).collect();
        let all: Vec<&RecordId> = rows.iter().map(|row| &row.id).collect();
        prop_assert_eq!(kept, all);
    }

    #[test]
    fn every_result_satisfies_active_filters(rows in rows_strategy(), state in filter_strategy()) {
        let search = state.search().to_lowercase();
        for row in apply_filters(&rows, &["name"], &state) {
            prop_assert!(row.name.to_lowercase().contains(&search));
            if let sitegrid_app::FilterSelection::One(status) = state.selection("status") {
                prop_assert_eq!(&row.status, status);
            }
            if let sitegrid_app::FilterSelection::Any(tags) = state.selection("tags") {
                prop_assert!(row.tags.iter().any(|tag| tags.contains(tag)));
            }
        }
    }

    #[test]
    fn upsert_of_blank_id_appends_one_fresh_record(rows in rows_strategy(), name in "[a-z]{1,8}") {
        let mut store = RecordStore::with_records(IdSequence::new("R", 3), rows.clone())
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        let before = store.len();
        let outcome = store
            .upsert(Row {
                id: RecordId::unassigned(),
                name,
                status: "open".to_owned(),
                tags: Vec::new(),
            })
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        prop_assert_eq!(store.len(), before + 1);
        let new_id = outcome.id().clone();
        prop_assert!(!rows.iter().any(|row| row.id == new_id));
        prop_assert_eq!(store.iter().filter(|row| row.id == new_id).count(), 1);
    }

    #[test]
    fn upsert_of_existing_id_keeps_length(rows in rows_strategy(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!rows.is_empty());
        let target = rows[pick.index(rows.len())].clone();
        let mut store = RecordStore::with_records(IdSequence::new("R", 3), rows.clone())
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        store
            .upsert(Row { name: "changed".to_owned(), ..target.clone() })
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        prop_assert_eq!(store.len(), rows.len());
        prop_assert_eq!(store.get(&target.id).map(|row| row.name.as_str()), Some("changed"));
    }

    #[test]
    fn remove_is_idempotent(rows in rows_strategy(), pick in 0usize..32) {
        let mut store = RecordStore::with_records(IdSequence::new("R", 3), rows.clone())
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        let id = RecordId::new(format!("R{pick:03}"));
        let present = rows.iter().any(|row| row.id == id);
        prop_assert_eq!(store.remove_by_id(&id), present);
        prop_assert_eq!(store.len(), rows.len() - usize::from(present));
        prop_assert!(!store.remove_by_id(&id));
        prop_assert_eq!(store.len(), rows.len() - usize::from(present));
    }

    #[test]
    fn dialog_never_yields_negative_quantities(quantity in -1000i64..1000) {
        let mut dialog = FormDialog::open(
            <sitegrid_app::InventoryItem as sitegrid_app::FormRecord>::schema(),
            FormDraft::default()
                .with("name", "Safety helmets")
                .with("category", "Safety Equipment")
                .with("quantity", quantity.to_string())
                .with("unit", "pcs")
                .with("location", "Warehouse A")
                .with("reorder_level", "0")
                .with("max_stock", "0"),
        );
        let submitted = dialog.submit();
        prop_assert_eq!(submitted.is_ok(), quantity >= 0);
        if let Ok(form) = submitted {
            prop_assert_eq!(form.values.optional_integer("quantity"), Some(quantity));
        }
    }
}
