// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::action::RowAction;
use crate::ids::RecordId;
use crate::model::PageKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// At most one overlay is open at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiMode {
    Browsing,
    Creating(PageKind),
    Editing(PageKind, RecordId),
    Confirming(RowAction, PageKind, RecordId),
}

impl UiMode {
    pub const fn is_browsing(&self) -> bool {
        matches!(self, Self::Browsing)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub mode: UiMode,
    pub active_page: PageKind,
    pub status: Option<Notice>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: UiMode::Browsing,
            active_page: PageKind::PurchaseOrders,
            status: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NextPage,
    PrevPage,
    SetPage(PageKind),
    OpenCreate,
    OpenEdit(RecordId),
    Confirm(RowAction, RecordId),
    CloseOverlay,
    Notify(Notice),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ModeChanged(UiMode),
    PageChanged(PageKind),
    StatusUpdated(Notice),
    StatusCleared,
}

impl AppState {
    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NextPage => self.rotate_page(1),
            AppCommand::PrevPage => self.rotate_page(-1),
            AppCommand::SetPage(page) => {
                if !self.mode.is_browsing() || page == self.active_page {
                    return Vec::new();
                }
                self.active_page = page;
                vec![AppEvent::PageChanged(page)]
            }
            AppCommand::OpenCreate => self.open_overlay(UiMode::Creating(self.active_page)),
            AppCommand::OpenEdit(id) => self.open_overlay(UiMode::Editing(self.active_page, id)),
            AppCommand::Confirm(action, id) => {
                self.open_overlay(UiMode::Confirming(action, self.active_page, id))
            }
            AppCommand::CloseOverlay => {
                if self.mode.is_browsing() {
                    return Vec::new();
                }
                self.mode = UiMode::Browsing;
                vec![AppEvent::ModeChanged(UiMode::Browsing)]
            }
            AppCommand::Notify(notice) => vec![self.set_status(notice)],
            AppCommand::ClearStatus => {
                self.status = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn open_overlay(&mut self, mode: UiMode) -> Vec<AppEvent> {
        if !self.mode.is_browsing() {
            return vec![self.set_status(Notice::error(
                "another dialog is open -- finish or cancel it first",
            ))];
        }
        self.mode = mode.clone();
        vec![AppEvent::ModeChanged(mode)]
    }

    fn rotate_page(&mut self, delta: isize) -> Vec<AppEvent> {
        if !self.mode.is_browsing() {
            return Vec::new();
        }
        let pages = PageKind::ALL;
        let current = pages
            .iter()
            .position(|page| *page == self.active_page)
            .unwrap_or(0) as isize;
        let len = pages.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.active_page = pages[next];
        vec![AppEvent::PageChanged(self.active_page)]
    }

    fn set_status(&mut self, notice: Notice) -> AppEvent {
        self.status = Some(notice.clone());
        AppEvent::StatusUpdated(notice)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppState, Notice, NoticeLevel, UiMode};
    use crate::action::RowAction;
    use crate::ids::RecordId;
    use crate::model::PageKind;

    #[test]
    fn page_rotation_wraps() {
        let mut state = AppState {
            active_page: PageKind::Maintenance,
            ..AppState::default()
        };

        let events = state.dispatch(AppCommand::NextPage);
        assert_eq!(state.active_page, PageKind::PurchaseOrders);
        assert_eq!(events, vec![AppEvent::PageChanged(PageKind::PurchaseOrders)]);

        state.dispatch(AppCommand::PrevPage);
        assert_eq!(state.active_page, PageKind::Maintenance);
    }

    #[test]
    fn overlays_are_exclusive() {
        let mut state = AppState::default();

        state.dispatch(AppCommand::OpenCreate);
        assert_eq!(state.mode, UiMode::Creating(PageKind::PurchaseOrders));

        let events = state.dispatch(AppCommand::OpenEdit(RecordId::from("PO001")));
        assert_eq!(state.mode, UiMode::Creating(PageKind::PurchaseOrders));
        assert!(matches!(
            events.as_slice(),
            [AppEvent::StatusUpdated(Notice {
                level: NoticeLevel::Error,
                ..
            })]
        ));
    }

    #[test]
    fn pages_stay_put_while_an_overlay_is_open() {
        let mut state = AppState::default();
        state.dispatch(AppCommand::Confirm(
            RowAction::Delete,
            RecordId::from("PO001"),
        ));

        assert!(state.dispatch(AppCommand::NextPage).is_empty());
        assert_eq!(state.active_page, PageKind::PurchaseOrders);

        let events = state.dispatch(AppCommand::CloseOverlay);
        assert_eq!(events, vec![AppEvent::ModeChanged(UiMode::Browsing)]);
        assert!(state.dispatch(AppCommand::CloseOverlay).is_empty());
    }

    #[test]
    fn notices_set_and_clear_status() {
        let mut state = AppState::default();

        state.dispatch(AppCommand::Notify(Notice::success("saved")));
        assert_eq!(state.status, Some(Notice::success("saved")));

        let events = state.dispatch(AppCommand::ClearStatus);
        assert_eq!(state.status, None);
        assert_eq!(events, vec![AppEvent::StatusCleared]);
    }
}
