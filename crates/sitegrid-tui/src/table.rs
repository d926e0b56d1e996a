// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use sitegrid_app::{FilterOption, FilterState, Record, RecordId, RowAction, RowActionRequest};
use std::cell::Cell;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

pub const EMPTY_PLACEHOLDER: &str = "no records found";
pub const RENDER_ERROR_MARK: &str = "⚠ render error";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Badge,
    Actions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Good,
    Warn,
    Bad,
    Muted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    pub text: String,
    pub tone: Tone,
}

impl TableCell {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Plain,
        }
    }

    pub fn badge(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    fn render_error() -> Self {
        Self::badge(RENDER_ERROR_MARK, Tone::Bad)
    }
}

pub type CellRenderer<R> = fn(&R) -> Result<TableCell>;
pub type DetailRenderer<R> = fn(&R) -> Result<Vec<(&'static str, String)>>;

pub struct ColumnSpec<R> {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: ColumnKind,
    /// Falls back to the record's field display when absent.
    pub render: Option<CellRenderer<R>>,
}

impl<R> ColumnSpec<R> {
    pub const fn text(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            kind: ColumnKind::Text,
            render: None,
        }
    }

    pub const fn custom(key: &'static str, label: &'static str, render: CellRenderer<R>) -> Self {
        Self {
            key,
            label,
            kind: ColumnKind::Text,
            render: Some(render),
        }
    }

    pub const fn badge(key: &'static str, label: &'static str, render: CellRenderer<R>) -> Self {
        Self {
            key,
            label,
            kind: ColumnKind::Badge,
            render: Some(render),
        }
    }

    pub const fn actions() -> Self {
        Self {
            key: "actions",
            label: "actions",
            kind: ColumnKind::Actions,
            render: None,
        }
    }
}

/// Everything a page hands the table: columns, filter controls, searchable
/// fields, the expansion panel, and the actions its rows offer.
pub struct TableSpec<R> {
    pub columns: Vec<ColumnSpec<R>>,
    pub filters: Vec<FilterOption>,
    pub search_keys: &'static [&'static str],
    pub detail: DetailRenderer<R>,
    pub actions: &'static [RowAction],
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableUiState {
    pub filters: FilterState,
    pub expanded: BTreeSet<RecordId>,
    /// Index into the filtered records, not into the rendered lines.
    pub selected: usize,
}

impl TableUiState {
    pub fn toggle_expanded(&mut self, id: &RecordId) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.clone());
            true
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Drops expansion for ids no longer present and keeps the cursor in range.
    pub fn reconcile(&mut self, all_ids: &[RecordId], visible: usize) {
        self.expanded.retain(|id| all_ids.contains(id));
        self.selected = self.selected.min(visible.saturating_sub(1));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableLine {
    Record {
        id: RecordId,
        cells: Vec<TableCell>,
        expanded: bool,
        selected: bool,
    },
    Detail {
        id: RecordId,
        label: String,
        value: String,
    },
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableProjection {
    pub headers: Vec<&'static str>,
    pub lines: Vec<TableLine>,
    pub visible_ids: Vec<RecordId>,
    pub total: usize,
}

impl TableProjection {
    pub fn is_empty(&self) -> bool {
        self.visible_ids.is_empty()
    }
}

/// Flat rows of the filtered view for spreadsheet export.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportSheet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn filtered<'a, R: Record>(
    records: &'a [R],
    spec: &TableSpec<R>,
    ui: &TableUiState,
) -> Vec<&'a R> {
    sitegrid_app::apply_filters(records, spec.search_keys, &ui.filters)
}

pub fn project<R: Record>(records: &[R], spec: &TableSpec<R>, ui: &TableUiState) -> TableProjection {
    let view = filtered(records, spec, ui);
    let headers = spec.columns.iter().map(|column| column.label).collect();
    let visible_ids: Vec<RecordId> = view.iter().map(|record| record.id().clone()).collect();

    let mut lines = Vec::with_capacity(view.len() + ui.expanded.len());
    for (index, record) in view.iter().enumerate() {
        let id = record.id().clone();
        let expanded = ui.expanded.contains(&id);
        let cells = spec
            .columns
            .iter()
            .map(|column| render_column(column, spec.actions, *record))
            .collect();
        lines.push(TableLine::Record {
            id: id.clone(),
            cells,
            expanded,
            selected: index == ui.selected,
        });
        if expanded {
            for (label, value) in render_detail(spec.detail, *record) {
                lines.push(TableLine::Detail {
                    id: id.clone(),
                    label,
                    value,
                });
            }
        }
    }
    if lines.is_empty() {
        lines.push(TableLine::Placeholder);
    }

    TableProjection {
        headers,
        lines,
        visible_ids,
        total: records.len(),
    }
}

pub fn export_sheet<R: Record>(records: &[R], spec: &TableSpec<R>, ui: &TableUiState) -> ExportSheet {
    let columns: Vec<&ColumnSpec<R>> = spec
        .columns
        .iter()
        .filter(|column| column.kind != ColumnKind::Actions)
        .collect();
    ExportSheet {
        headers: columns.iter().map(|column| column.label.to_owned()).collect(),
        rows: filtered(records, spec, ui)
            .into_iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| render_column(column, spec.actions, record).text)
                    .collect()
            })
            .collect(),
    }
}

/// Builds the request for `action` on the selected row. The table never
/// applies it.
pub fn request_action(
    actions: &[RowAction],
    visible_ids: &[RecordId],
    selected: usize,
    action: RowAction,
) -> Result<RowActionRequest> {
    if !actions.contains(&action) {
        bail!("{} is not available on this page", action.label());
    }
    let Some(id) = visible_ids.get(selected) else {
        bail!("no record selected");
    };
    Ok(RowActionRequest::new(action, id.clone()))
}

pub fn render_detail<R: Record>(detail: DetailRenderer<R>, record: &R) -> Vec<(String, String)> {
    match isolate(record.id(), "detail", || detail(record)) {
        Some(entries) => entries
            .into_iter()
            .map(|(label, value)| (label.to_owned(), value))
            .collect(),
        None => vec![(String::new(), RENDER_ERROR_MARK.to_owned())],
    }
}

fn render_column<R: Record>(column: &ColumnSpec<R>, actions: &[RowAction], record: &R) -> TableCell {
    if column.kind == ColumnKind::Actions {
        let keys: Vec<String> = actions.iter().map(|action| action.key().to_string()).collect();
        return TableCell::badge(keys.join(" "), Tone::Muted);
    }
    match column.render {
        Some(render) => {
            isolate(record.id(), column.key, || render(record)).unwrap_or_else(TableCell::render_error)
        }
        None => TableCell::plain(
            record
                .field(column.key)
                .map(|value| value.display())
                .unwrap_or_default(),
        ),
    }
}

thread_local! {
    static ISOLATING: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

/// Wraps the current panic hook once per process. Panics raised while a
/// renderer is isolated go to the log instead of stderr, which the TUI owns.
fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if ISOLATING.with(Cell::get) {
                tracing::debug!(%info, "isolated renderer panic");
            } else {
                previous(info);
            }
        }));
    });
}

/// Runs a caller renderer so that an error or panic only costs its own cell.
fn isolate<T>(id: &RecordId, key: &str, render: impl FnOnce() -> Result<T>) -> Option<T> {
    install_quiet_hook();
    let was_isolating = ISOLATING.with(|flag| flag.replace(true));
    let outcome = panic::catch_unwind(AssertUnwindSafe(render));
    ISOLATING.with(|flag| flag.set(was_isolating));
    match outcome {
        Ok(Ok(value)) => Some(value),
        Ok(Err(error)) => {
            let error = format!("{error:#}");
            tracing::warn!(record = %id, column = key, %error, "cell render failed");
            None
        }
        Err(_) => {
            tracing::warn!(record = %id, column = key, "cell renderer panicked");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ColumnSpec, EMPTY_PLACEHOLDER, ISOLATING, RENDER_ERROR_MARK, TableCell, TableLine,
        TableSpec, TableUiState, Tone, export_sheet, isolate, project, request_action,
    };
    use std::cell::Cell;
    use anyhow::anyhow;
    use sitegrid_app::{FieldValue, FilterOption, Record, RecordId, RowAction};

    #[derive(Debug, Clone)]
    struct Item {
        id: RecordId,
        name: &'static str,
        status: &'static str,
    }

    impl Record for Item {
        fn id(&self) -> &RecordId {
            &self.id
        }

        fn set_id(&mut self, id: RecordId) {
            self.id = id;
        }

        fn field(&self, key: &str) -> Option<FieldValue> {
            match key {
                "name" => Some(FieldValue::Text(self.name.to_owned())),
                "status" => Some(FieldValue::Text(self.status.to_owned())),
                _ => None,
            }
        }
    }

    fn items() -> Vec<Item> {
        vec![
            Item {
                id: RecordId::from("A1"),
                name: "Steel Corp Ltd",
                status: "sent",
            },
            Item {
                id: RecordId::from("A2"),
                name: "Cement Industries",
                status: "delivered",
            },
        ]
    }

    fn status_badge(item: &Item) -> anyhow::Result<TableCell> {
        Ok(TableCell::badge(item.status, Tone::Good))
    }

    fn spec() -> TableSpec<Item> {
        TableSpec {
            columns: vec![
                ColumnSpec::text("name", "name"),
                ColumnSpec::badge("status", "status", status_badge),
                ColumnSpec::actions(),
            ],
            filters: vec![FilterOption::single("status", "status", &["sent", "delivered"])],
            search_keys: &["name"],
            detail: |item| Ok(vec![("status", item.status.to_owned())]),
            actions: &[RowAction::View, RowAction::Delete],
        }
    }

    fn record_ids(lines: &[TableLine]) -> Vec<String> {
        lines
            .iter()
            .filter_map(|line| match line {
                TableLine::Record { id, .. } => Some(id.to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn placeholder_only_when_view_is_empty() {
        let mut ui = TableUiState::default();
        let projection = project(&items(), &spec(), &ui);
        assert!(!projection.lines.contains(&TableLine::Placeholder));

        ui.filters.set_search("zzz");
        let projection = project(&items(), &spec(), &ui);
        assert_eq!(projection.lines, vec![TableLine::Placeholder]);
        assert!(projection.is_empty());
        assert_eq!(projection.total, 2);
        assert_eq!(EMPTY_PLACEHOLDER, "no records found");
    }

    #[test]
    fn rows_follow_filters_and_column_order() {
        let mut ui = TableUiState::default();
        ui.filters.select("status", "delivered");
        let projection = project(&items(), &spec(), &ui);
        assert_eq!(record_ids(&projection.lines), ["A2"]);
        assert_eq!(projection.headers, ["name", "status", "actions"]);
        let TableLine::Record { cells, .. } = &projection.lines[0] else {
            panic!("expected a record line");
        };
        assert_eq!(cells[0], TableCell::plain("Cement Industries"));
        assert_eq!(cells[2], TableCell::badge("v d", Tone::Muted));
    }

    #[test]
    fn expansion_is_per_row_and_survives_refiltering() {
        let mut ui = TableUiState::default();
        assert!(ui.toggle_expanded(&RecordId::from("A1")));
        assert!(ui.toggle_expanded(&RecordId::from("A2")));

        let projection = project(&items(), &spec(), &ui);
        let details = projection
            .lines
            .iter()
            .filter(|line| matches!(line, TableLine::Detail { .. }))
            .count();
        assert_eq!(details, 2);

        ui.filters.set_search("cement");
        ui.filters.set_search("");
        let projection = project(&items(), &spec(), &ui);
        assert!(matches!(
            projection.lines[0],
            TableLine::Record { expanded: true, .. }
        ));

        assert!(!ui.toggle_expanded(&RecordId::from("A1")));
        ui.collapse_all();
        assert!(ui.expanded.is_empty());
    }

    #[test]
    fn reconcile_prunes_vanished_ids_and_clamps_cursor() {
        let mut ui = TableUiState {
            selected: 5,
            ..TableUiState::default()
        };
        ui.toggle_expanded(&RecordId::from("A1"));
        ui.toggle_expanded(&RecordId::from("GONE"));
        ui.reconcile(&[RecordId::from("A1")], 1);
        assert_eq!(ui.expanded.len(), 1);
        assert_eq!(ui.selected, 0);
    }

    #[test]
    fn failing_renderer_is_isolated_to_its_cell() {
        let mut spec = spec();
        spec.columns[1].render = Some(|item| {
            if item.status == "sent" {
                Err(anyhow!("bad status"))
            } else {
                Ok(TableCell::plain(item.status))
            }
        });
        let projection = project(&items(), &spec, &TableUiState::default());
        let cells: Vec<&str> = projection
            .lines
            .iter()
            .filter_map(|line| match line {
                TableLine::Record { cells, .. } => Some(cells[1].text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(cells, [RENDER_ERROR_MARK, "delivered"]);
    }

    #[test]
    fn panicking_renderer_is_isolated_to_its_cell() {
        let mut spec = spec();
        spec.columns[0].render = Some(|item| {
            assert!(item.name != "Steel Corp Ltd", "renderer blew up");
            Ok(TableCell::plain(item.name))
        });
        spec.detail = |_| panic!("detail blew up");
        let mut ui = TableUiState::default();
        ui.toggle_expanded(&RecordId::from("A2"));
        let projection = project(&items(), &spec, &ui);
        assert!(matches!(
            &projection.lines[0],
            TableLine::Record { cells, .. } if cells[0].text == RENDER_ERROR_MARK
        ));
        assert!(matches!(
            &projection.lines[1],
            TableLine::Record { cells, .. } if cells[0].text == "Cement Industries"
        ));
        assert!(matches!(
            &projection.lines[2],
            TableLine::Detail { value, .. } if value == RENDER_ERROR_MARK
        ));
    }

    #[test]
    fn isolation_silences_only_the_renderer_panic() {
        let id = RecordId::from("A1");
        let caught: Option<()> = isolate(&id, "name", || panic!("quiet please"));
        assert!(caught.is_none());
        assert!(!ISOLATING.with(Cell::get));

        assert_eq!(isolate(&id, "name", || Ok(7)), Some(7));
        assert!(!ISOLATING.with(Cell::get));
    }

    #[test]
    fn actions_produce_requests_for_the_selected_row() -> anyhow::Result<()> {
        let ids = [RecordId::from("A1"), RecordId::from("A2")];
        let request = request_action(&[RowAction::Delete], &ids, 1, RowAction::Delete)?;
        assert_eq!(request.record_id, RecordId::from("A2"));
        assert_eq!(request.action, RowAction::Delete);

        assert!(request_action(&[RowAction::Delete], &ids, 1, RowAction::Approve).is_err());
        assert!(request_action(&[RowAction::Delete], &[], 0, RowAction::Delete).is_err());
        Ok(())
    }

    #[test]
    fn export_skips_actions_and_keeps_filtered_rows() {
        let mut ui = TableUiState::default();
        ui.filters.set_search("steel");
        let sheet = export_sheet(&items(), &spec(), &ui);
        assert_eq!(sheet.headers, ["name", "status"]);
        assert_eq!(sheet.rows, vec![vec!["Steel Corp Ltd".to_owned(), "sent".to_owned()]]);
    }
}
