// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod form;
pub mod pages;
pub mod table;

pub use pages::{PageSnapshot, actions_for, schema_for};
pub use table::{ExportSheet, TableUiState};

use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use pages::{FilterEntry, filter_entries};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use sitegrid_app::{
    AppCommand, AppEvent, AppState, FieldKind, FormDialog, FormDraft, Notice, NoticeLevel,
    PageKind, RecordId, RowAction, RowActionRequest, SubmittedForm, UiMode,
};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use table::{EMPTY_PLACEHOLDER, TableLine, Tone};

const FILTER_MARK_ACTIVE: &str = "▼";
const EXPANDED_MARK: &str = "▾";
const COLLAPSED_MARK: &str = "▸";
const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(4);

static UNTOUCHED_TABLE: LazyLock<TableUiState> = LazyLock::new(TableUiState::default);

/// Everything the UI needs from the data layer. The UI never mutates records
/// itself: it asks the runtime and then reloads the page.
pub trait AppRuntime {
    fn load_page_snapshot(&mut self, page: PageKind) -> Result<PageSnapshot>;
    fn blank_draft(&mut self, page: PageKind) -> Result<FormDraft>;
    fn edit_draft(&mut self, page: PageKind, id: &RecordId) -> Result<FormDraft>;
    fn submit_form(&mut self, page: PageKind, form: SubmittedForm) -> Result<Notice>;
    fn apply_row_action(
        &mut self,
        page: PageKind,
        request: &RowActionRequest,
    ) -> Result<ActionOutcome>;
    fn export_page(&mut self, page: PageKind, sheet: &ExportSheet) -> Result<PathBuf>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub notice: Notice,
    pub follow_up: Option<FollowUp>,
}

impl ActionOutcome {
    pub fn notice(notice: Notice) -> Self {
        Self {
            notice,
            follow_up: None,
        }
    }

    pub fn then(mut self, follow_up: FollowUp) -> Self {
        self.follow_up = Some(follow_up);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    /// Switch to `page` and open its create dialog with `draft` prefilled.
    OpenForm { page: PageKind, draft: FormDraft },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewOptions {
    pub status_timeout: Duration,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            status_timeout: DEFAULT_STATUS_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Overlay {
    #[default]
    None,
    Search,
    FilterPicker {
        cursor: usize,
    },
    Help,
    Detail(RecordId),
}

#[derive(Debug, Clone)]
struct ViewData {
    snapshot: Option<PageSnapshot>,
    tables: HashMap<PageKind, TableUiState>,
    dialog: Option<FormDialog>,
    overlay: Overlay,
    status_token: u64,
    status_timeout: Duration,
}

impl Default for ViewData {
    fn default() -> Self {
        Self {
            snapshot: None,
            tables: HashMap::new(),
            dialog: None,
            overlay: Overlay::None,
            status_token: 0,
            status_timeout: DEFAULT_STATUS_TIMEOUT,
        }
    }
}

impl ViewData {
    fn table(&self, page: PageKind) -> &TableUiState {
        self.tables.get(&page).unwrap_or(&*UNTOUCHED_TABLE)
    }

    fn table_mut(&mut self, page: PageKind) -> &mut TableUiState {
        self.tables.entry(page).or_default()
    }

    fn snapshot_for(&self, page: PageKind) -> Option<&PageSnapshot> {
        self.snapshot
            .as_ref()
            .filter(|snapshot| snapshot.page() == page)
    }

    fn visible_ids(&self, page: PageKind) -> Vec<RecordId> {
        self.snapshot_for(page)
            .map(|snapshot| snapshot.projection(self.table(page)).visible_ids)
            .unwrap_or_default()
    }

    fn selected_id(&self, page: PageKind) -> Option<RecordId> {
        self.visible_ids(page)
            .get(self.table(page).selected)
            .cloned()
    }

    fn reconcile(&mut self, page: PageKind) {
        let Some(snapshot) = self.snapshot_for(page) else {
            return;
        };
        let ids = snapshot.ids();
        let visible = snapshot.projection(self.table(page)).visible_ids.len();
        self.table_mut(page).reconcile(&ids, visible);
    }
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    options: ViewOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData {
        status_timeout: options.status_timeout,
        ..ViewData::default()
    };
    let (internal_tx, internal_rx) = mpsc::channel();

    reload(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        match next_key() {
            Ok(Some(key)) => {
                if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                    break;
                }
            }
            Ok(None) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn next_key() -> Result<Option<KeyEvent>> {
    if !event::poll(Duration::from_millis(120)).context("poll event")? {
        return Ok(None);
    }
    match event::read().context("read event")? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
        _ => Ok(None),
    }
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64, after: Duration) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(after);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn dispatch(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) -> Vec<AppEvent> {
    let events = state.dispatch(command);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token, view_data.status_timeout);
    }
    events
}

fn notify(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    notice: Notice,
) {
    dispatch(state, view_data, internal_tx, AppCommand::Notify(notice));
}

fn dispatch_and_refresh<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = dispatch(state, view_data, internal_tx, command);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::PageChanged(_)))
    {
        view_data.overlay = Overlay::None;
        reload(state, runtime, view_data, internal_tx);
    }
}

fn reload<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if let Err(error) = refresh_view_data(state, runtime, view_data) {
        let error = format!("{error:#}");
        tracing::warn!(page = state.active_page.slug(), %error, "page load failed");
        notify(
            state,
            view_data,
            internal_tx,
            Notice::error(format!("load failed: {error}")),
        );
    }
}

fn refresh_view_data<R: AppRuntime>(
    state: &AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
) -> Result<()> {
    let page = state.active_page;
    let snapshot = runtime
        .load_page_snapshot(page)
        .with_context(|| format!("load {}", page.label()))?;
    tracing::debug!(page = page.slug(), records = snapshot.len(), "page loaded");
    view_data.snapshot = Some(snapshot);
    view_data.reconcile(page);
    Ok(())
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('q') {
        return true;
    }

    match state.mode.clone() {
        UiMode::Creating(page) | UiMode::Editing(page, _) => {
            handle_dialog_key(state, runtime, view_data, internal_tx, page, key);
        }
        UiMode::Confirming(..) => handle_confirm_key(state, runtime, view_data, internal_tx, key),
        UiMode::Browsing => handle_browse_key(state, runtime, view_data, internal_tx, key),
    }
    false
}

fn handle_dialog_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    page: PageKind,
    key: KeyEvent,
) {
    let Some(dialog) = view_data.dialog.as_mut() else {
        dispatch(state, view_data, internal_tx, AppCommand::CloseOverlay);
        return;
    };
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    let on_tags = matches!(
        dialog.focused_field().map(|field| field.kind),
        Some(FieldKind::Tags(_))
    );

    match key.code {
        KeyCode::Esc => {
            view_data.dialog = None;
            dispatch(state, view_data, internal_tx, AppCommand::CloseOverlay);
        }
        KeyCode::Enter => submit_dialog(state, runtime, view_data, internal_tx, page),
        KeyCode::Tab | KeyCode::Down => dialog.move_focus(1),
        KeyCode::BackTab | KeyCode::Up => dialog.move_focus(-1),
        KeyCode::Left => dialog.cycle_choice(-1),
        KeyCode::Right => dialog.cycle_choice(1),
        KeyCode::Backspace => dialog.backspace(),
        KeyCode::Char('u') if control => dialog.clear_field(),
        KeyCode::Char(' ') if on_tags => dialog.toggle_tag(),
        KeyCode::Char(ch) if !control => dialog.input_char(ch),
        _ => {}
    }
}

fn submit_dialog<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    page: PageKind,
) {
    let Some(dialog) = view_data.dialog.as_mut() else {
        return;
    };
    let form = match dialog.submit() {
        Ok(form) => form,
        Err(errors) => {
            notify(
                state,
                view_data,
                internal_tx,
                Notice::error(format!("fix {} field(s) before saving", errors.len())),
            );
            return;
        }
    };

    match runtime.submit_form(page, form) {
        Ok(notice) => {
            view_data.dialog = None;
            dispatch(state, view_data, internal_tx, AppCommand::CloseOverlay);
            reload(state, runtime, view_data, internal_tx);
            notify(state, view_data, internal_tx, notice);
        }
        Err(error) => {
            let error = format!("{error:#}");
            tracing::warn!(page = page.slug(), %error, "save rejected");
            notify(
                state,
                view_data,
                internal_tx,
                Notice::error(format!("save failed: {error}")),
            );
        }
    }
}

fn handle_confirm_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let UiMode::Confirming(action, page, id) = state.mode.clone() else {
        return;
    };
    match key.code {
        KeyCode::Char('y' | 'Y') => {
            dispatch(state, view_data, internal_tx, AppCommand::CloseOverlay);
            let request = RowActionRequest::new(action, id);
            apply_action(state, runtime, view_data, internal_tx, page, &request);
        }
        KeyCode::Char('n' | 'N') | KeyCode::Esc => {
            dispatch(state, view_data, internal_tx, AppCommand::CloseOverlay);
            notify(
                state,
                view_data,
                internal_tx,
                Notice::info(format!("{} cancelled", action.label())),
            );
        }
        _ => {}
    }
}

fn handle_browse_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let page = state.active_page;
    match view_data.overlay {
        Overlay::Search => {
            handle_search_key(view_data, page, key);
            return;
        }
        Overlay::FilterPicker { cursor } => {
            handle_filter_key(view_data, page, cursor, key);
            return;
        }
        Overlay::Help | Overlay::Detail(_) => {
            view_data.overlay = Overlay::None;
            return;
        }
        Overlay::None => {}
    }

    match key.code {
        KeyCode::Tab => {
            dispatch_and_refresh(state, runtime, view_data, internal_tx, AppCommand::NextPage);
        }
        KeyCode::BackTab => {
            dispatch_and_refresh(state, runtime, view_data, internal_tx, AppCommand::PrevPage);
        }
        KeyCode::Char('j') | KeyCode::Down => move_selection(view_data, page, 1),
        KeyCode::Char('k') | KeyCode::Up => move_selection(view_data, page, -1),
        KeyCode::Char('g') | KeyCode::Home => view_data.table_mut(page).selected = 0,
        KeyCode::Char('G') | KeyCode::End => {
            let last = view_data.visible_ids(page).len().saturating_sub(1);
            view_data.table_mut(page).selected = last;
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(id) = view_data.selected_id(page) {
                view_data.table_mut(page).toggle_expanded(&id);
            }
        }
        KeyCode::Char('E') => view_data.table_mut(page).collapse_all(),
        KeyCode::Char('/') => view_data.overlay = Overlay::Search,
        KeyCode::Char('f') => view_data.overlay = Overlay::FilterPicker { cursor: 0 },
        KeyCode::Char('F') => {
            view_data.table_mut(page).filters.clear_all();
            view_data.reconcile(page);
            notify(state, view_data, internal_tx, Notice::info("filters cleared"));
        }
        KeyCode::Char('a') => open_create(state, runtime, view_data, internal_tx, page),
        KeyCode::Char('x') => export_active_page(state, runtime, view_data, internal_tx),
        KeyCode::Char('?') => view_data.overlay = Overlay::Help,
        KeyCode::Char(ch) => {
            if let Some(action) = RowAction::from_key(ch) {
                handle_row_action(state, runtime, view_data, internal_tx, action);
            }
        }
        _ => {}
    }
}

fn move_selection(view_data: &mut ViewData, page: PageKind, delta: isize) {
    let visible = view_data.visible_ids(page).len();
    let table = view_data.table_mut(page);
    table.selected = table
        .selected
        .saturating_add_signed(delta)
        .min(visible.saturating_sub(1));
}

fn handle_search_key(view_data: &mut ViewData, page: PageKind, key: KeyEvent) {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => view_data.overlay = Overlay::None,
        KeyCode::Esc => {
            view_data.table_mut(page).filters.set_search("");
            view_data.overlay = Overlay::None;
        }
        KeyCode::Backspace => view_data.table_mut(page).filters.pop_search(),
        KeyCode::Char(ch) if !control => view_data.table_mut(page).filters.push_search(ch),
        _ => return,
    }
    view_data.table_mut(page).selected = 0;
    view_data.reconcile(page);
}

fn handle_filter_key(view_data: &mut ViewData, page: PageKind, cursor: usize, key: KeyEvent) {
    let entries = view_data
        .snapshot_for(page)
        .map(|snapshot| filter_entries(&snapshot.filter_options()))
        .unwrap_or_default();
    let last = entries.len().saturating_sub(1);

    match key.code {
        KeyCode::Esc | KeyCode::Char('f') => view_data.overlay = Overlay::None,
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.overlay = Overlay::FilterPicker {
                cursor: (cursor + 1).min(last),
            };
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.overlay = Overlay::FilterPicker {
                cursor: cursor.saturating_sub(1),
            };
        }
        KeyCode::Char('F') => {
            view_data.table_mut(page).filters.clear_all();
            view_data.reconcile(page);
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(entry) = entries.get(cursor) {
                apply_filter_entry(view_data.table_mut(page), entry);
                view_data.reconcile(page);
            }
        }
        _ => {}
    }
}

fn apply_filter_entry(table: &mut TableUiState, entry: &FilterEntry) {
    if entry.multiple {
        table.filters.toggle(entry.key, &entry.value);
    } else {
        table.filters.select(entry.key, &entry.value);
    }
    table.selected = 0;
}

fn open_dialog(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
    dialog: FormDialog,
) {
    let events = dispatch(state, view_data, internal_tx, command);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::ModeChanged(_)))
    {
        view_data.overlay = Overlay::None;
        view_data.dialog = Some(dialog);
    }
}

fn open_create<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    page: PageKind,
) {
    match runtime.blank_draft(page) {
        Ok(draft) => open_dialog(
            state,
            view_data,
            internal_tx,
            AppCommand::OpenCreate,
            FormDialog::open(schema_for(page), draft),
        ),
        Err(error) => notify(
            state,
            view_data,
            internal_tx,
            Notice::error(format!("cannot open form: {error:#}")),
        ),
    }
}

fn handle_row_action<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    action: RowAction,
) {
    let page = state.active_page;
    let request = match view_data.snapshot_for(page) {
        Some(snapshot) => table::request_action(
            snapshot.actions(),
            &view_data.visible_ids(page),
            view_data.table(page).selected,
            action,
        ),
        None => Err(anyhow!("{} are not loaded", page.label())),
    };
    let request = match request {
        Ok(request) => request,
        Err(error) => {
            notify(
                state,
                view_data,
                internal_tx,
                Notice::error(format!("{error:#}")),
            );
            return;
        }
    };

    match action {
        RowAction::View => view_data.overlay = Overlay::Detail(request.record_id),
        RowAction::Edit => match runtime.edit_draft(page, &request.record_id) {
            Ok(draft) => open_dialog(
                state,
                view_data,
                internal_tx,
                AppCommand::OpenEdit(request.record_id),
                FormDialog::open(schema_for(page), draft),
            ),
            Err(error) => notify(
                state,
                view_data,
                internal_tx,
                Notice::error(format!("cannot edit: {error:#}")),
            ),
        },
        _ if action.requires_confirmation() => {
            dispatch(
                state,
                view_data,
                internal_tx,
                AppCommand::Confirm(action, request.record_id),
            );
        }
        _ => apply_action(state, runtime, view_data, internal_tx, page, &request),
    }
}

fn apply_action<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    page: PageKind,
    request: &RowActionRequest,
) {
    let result = runtime.apply_row_action(page, request);
    reload(state, runtime, view_data, internal_tx);
    match result {
        Ok(outcome) => {
            notify(state, view_data, internal_tx, outcome.notice);
            if let Some(FollowUp::OpenForm { page, draft }) = outcome.follow_up {
                dispatch_and_refresh(
                    state,
                    runtime,
                    view_data,
                    internal_tx,
                    AppCommand::SetPage(page),
                );
                open_dialog(
                    state,
                    view_data,
                    internal_tx,
                    AppCommand::OpenCreate,
                    FormDialog::open(schema_for(page), draft),
                );
            }
        }
        Err(error) => notify(
            state,
            view_data,
            internal_tx,
            Notice::error(format!("{} failed: {error:#}", request.action.label())),
        ),
    }
}

fn export_active_page<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let page = state.active_page;
    let sheet = view_data
        .snapshot_for(page)
        .map(|snapshot| snapshot.export_sheet(view_data.table(page)))
        .unwrap_or_default();
    if sheet.is_empty() {
        notify(
            state,
            view_data,
            internal_tx,
            Notice::error("no data available to export"),
        );
        return;
    }

    let notice = match runtime.export_page(page, &sheet) {
        Ok(path) => Notice::success(format!(
            "exported {} {} to {}",
            sheet.rows.len(),
            page.label(),
            path.display()
        )),
        Err(error) => Notice::error(format!("export failed: {error:#}")),
    };
    notify(state, view_data, internal_tx, notice);
}

fn tab_title(page: PageKind, view_data: &ViewData) -> String {
    if view_data.table(page).filters.is_active() {
        format!(" {} {} ", page.label(), FILTER_MARK_ACTIVE)
    } else {
        format!(" {} ", page.label())
    }
}

fn table_title(page: PageKind, table: &TableUiState, visible: usize, total: usize) -> String {
    let mut title = format!("{} {visible}/{total}", page.label());
    if table.filters.is_active() {
        title.push_str(" | ");
        title.push_str(&table.filters.describe());
    }
    title
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let selected = PageKind::ALL
        .iter()
        .position(|page| *page == state.active_page)
        .unwrap_or(0);
    let tab_titles = PageKind::ALL
        .iter()
        .map(|page| tab_title(*page, view_data))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title("sitegrid").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    render_table(frame, layout[1], state, view_data);

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(status_style(state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status_widget, layout[2]);

    match &view_data.overlay {
        Overlay::Help => popup(frame, (80, 60), "help", help_overlay_text().to_owned()),
        Overlay::Detail(id) => popup(frame, (64, 50), "details", detail_overlay_text(view_data, id)),
        Overlay::FilterPicker { cursor } => popup(
            frame,
            (50, 60),
            "filters",
            filter_overlay_text(state, view_data, *cursor),
        ),
        Overlay::Search => popup(
            frame,
            (50, 12),
            "search",
            format!("/{}▏", view_data.table(state.active_page).filters.search()),
        ),
        Overlay::None => {}
    }

    if let Some(dialog) = &view_data.dialog {
        form::render_dialog(frame, centered_rect(70, 75, frame.area()), dialog);
    }

    if let UiMode::Confirming(action, _, id) = &state.mode {
        popup(frame, (44, 20), "confirm", confirm_text(view_data, *action, id));
    }
}

fn popup(frame: &mut ratatui::Frame<'_>, size: (u16, u16), title: &str, text: String) {
    let area = centered_rect(size.0, size.1, frame.area());
    frame.render_widget(Clear, area);
    let body = Paragraph::new(text).block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(body, area);
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view_data: &ViewData,
) {
    let page = state.active_page;
    let Some(snapshot) = view_data.snapshot_for(page) else {
        let empty = Paragraph::new(String::new())
            .block(Block::default().borders(Borders::ALL).title(page.label()));
        frame.render_widget(empty, area);
        return;
    };

    let table_state = view_data.table(page);
    let projection = snapshot.projection(table_state);
    let title = table_title(
        page,
        table_state,
        projection.visible_ids.len(),
        projection.total,
    );

    if projection.is_empty() {
        let placeholder = Paragraph::new(EMPTY_PLACEHOLDER)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(placeholder, area);
        return;
    }

    let mut widths = vec![Constraint::Min(8); projection.headers.len()];
    widths.insert(0, Constraint::Length(1));

    let header_cells = std::iter::once("")
        .chain(projection.headers.iter().copied())
        .map(|label| {
            Cell::from(label).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        });
    let header = Row::new(header_cells);

    let rows = projection.lines.iter().map(|line| match line {
        TableLine::Record {
            cells,
            expanded,
            selected,
            ..
        } => {
            let mark = if *expanded {
                EXPANDED_MARK
            } else {
                COLLAPSED_MARK
            };
            let row = Row::new(
                std::iter::once(Cell::from(mark)).chain(
                    cells
                        .iter()
                        .map(|cell| Cell::from(cell.text.clone()).style(tone_style(cell.tone))),
                ),
            );
            if *selected {
                row.style(Style::default().bg(Color::DarkGray))
            } else {
                row
            }
        }
        TableLine::Detail { label, value, .. } => Row::new([
            Cell::from(""),
            Cell::from(label.clone()).style(Style::default().fg(Color::DarkGray)),
            Cell::from(value.clone()),
        ]),
        TableLine::Placeholder => Row::new([Cell::from(""), Cell::from(EMPTY_PLACEHOLDER)]),
    });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Plain => Style::default(),
        Tone::Good => Style::default().fg(Color::Green),
        Tone::Warn => Style::default().fg(Color::Yellow),
        Tone::Bad => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        Tone::Muted => Style::default().fg(Color::DarkGray),
    }
}

fn status_style(state: &AppState) -> Style {
    let color = match state.status.as_ref().map(|notice| notice.level) {
        Some(NoticeLevel::Success) => Color::Green,
        Some(NoticeLevel::Info) => Color::Cyan,
        Some(NoticeLevel::Error) => Color::Red,
        None => Color::Yellow,
    };
    Style::default().fg(color)
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let mode = match state.mode {
        UiMode::Browsing => "NAV",
        UiMode::Creating(_) => "NEW",
        UiMode::Editing(..) => "EDIT",
        UiMode::Confirming(..) => "CONFIRM",
    };
    let hints = match (&state.mode, &view_data.overlay) {
        (UiMode::Creating(_) | UiMode::Editing(..), _) => {
            "tab field | enter save | esc cancel".to_owned()
        }
        (UiMode::Confirming(..), _) => "y confirm | n cancel".to_owned(),
        (UiMode::Browsing, Overlay::Search) => "type to search | enter keep | esc clear".to_owned(),
        (UiMode::Browsing, Overlay::FilterPicker { .. }) => {
            "j/k move | enter/space pick | F clear | esc close".to_owned()
        }
        (UiMode::Browsing, _) => browse_hints(state.active_page),
    };
    match &state.status {
        Some(notice) => format!("{mode} | {} | {hints}", notice.message),
        None => format!("{mode} | {hints}"),
    }
}

fn browse_hints(page: PageKind) -> String {
    let actions = actions_for(page)
        .iter()
        .map(|action| format!("{} {}", action.key(), action.label()))
        .collect::<Vec<_>>()
        .join(" ");
    format!("j/k g/G | tab page | enter expand | / f F | a add | {actions} | x export | ? help | ctrl+q")
}

fn detail_overlay_text(view_data: &ViewData, id: &RecordId) -> String {
    let Some(snapshot) = &view_data.snapshot else {
        return String::new();
    };
    let Some(entries) = snapshot.detail(id) else {
        return format!("{id} is no longer available");
    };
    let mut lines = vec![snapshot.label_of(id), String::new()];
    lines.extend(
        entries
            .into_iter()
            .map(|(label, value)| format!("{label}: {value}")),
    );
    lines.push(String::new());
    lines.push("any key closes".to_owned());
    lines.join("\n")
}

fn filter_overlay_text(state: &AppState, view_data: &ViewData, cursor: usize) -> String {
    let page = state.active_page;
    let Some(snapshot) = view_data.snapshot_for(page) else {
        return String::new();
    };
    let table_state = view_data.table(page);
    filter_entries(&snapshot.filter_options())
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let pointer = if index == cursor { ">" } else { " " };
            let mark = match (entry.multiple, entry.is_selected(table_state)) {
                (true, true) => "[x]",
                (true, false) => "[ ]",
                (false, true) => "(•)",
                (false, false) => "( )",
            };
            format!("{pointer} {}: {mark} {}", entry.key, entry.value)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn confirm_text(view_data: &ViewData, action: RowAction, id: &RecordId) -> String {
    let label = view_data
        .snapshot
        .as_ref()
        .map_or_else(|| id.to_string(), |snapshot| snapshot.label_of(id));
    format!("{} {label}?\n\ny confirm | n cancel", action.label())
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit\n\
nav: j/k rows | g/G first/last | tab/shift+tab pages | enter/space expand | E collapse all\n\
find: / search | f filter picker | F clear filters\n\
rows: v view | e edit | n flag | d delete | A approve | R reject | P create po | r resolve | ! escalate | m log maintenance\n\
page: a add | x export | ? help\n\
form: tab/shift+tab field | type to edit | ctrl+u clear | left/right choose | space toggle tag | enter save | esc cancel\n\
confirm: y yes | n no\n\
help and details: any key closes"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
