// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use sitegrid_app::{DialogMode, FieldKind, FieldSpec, FormDialog};

const CURSOR: &str = "▏";

pub fn dialog_title(dialog: &FormDialog) -> String {
    match dialog.mode() {
        DialogMode::Create => format!("new {}", dialog.schema().title.to_lowercase()),
        DialogMode::Edit(id) => format!("edit {} {id}", dialog.schema().title.to_lowercase()),
    }
}

/// Plain-text rendering of every field, one line each, with the focused
/// field marked and errors inlined.
pub fn dialog_lines(dialog: &FormDialog) -> Vec<String> {
    let mut lines = Vec::with_capacity(dialog.schema().fields.len() + 2);
    for (index, field) in dialog.schema().fields.iter().enumerate() {
        let focused = index == dialog.focus();
        let marker = if focused { ">" } else { " " };
        let required = if field.required { "*" } else { " " };
        let mut line = format!(
            "{marker} {}{required} {}",
            field.label,
            field_value(dialog, field, focused)
        );
        if let Some(error) = dialog.errors().get(field.key) {
            line.push_str(&format!("  ! {error}"));
        }
        lines.push(line);
    }
    lines.push(String::new());
    lines.push(hint_for(dialog.focused_field()).to_owned());
    lines
}

fn field_value(dialog: &FormDialog, field: &FieldSpec, focused: bool) -> String {
    let value = dialog.value(field.key);
    match field.kind {
        FieldKind::Choice(_) => format!("‹ {} ›", if value.is_empty() { "-" } else { value }),
        FieldKind::Tags(options) => {
            let chosen: Vec<&str> = value.split(',').map(str::trim).collect();
            options
                .iter()
                .enumerate()
                .map(|(index, option)| {
                    let mark = if chosen.contains(option) { "x" } else { " " };
                    let cursor = if focused && index == dialog.tag_cursor() {
                        ">"
                    } else {
                        ""
                    };
                    format!("{cursor}[{mark}] {option}")
                })
                .collect::<Vec<_>>()
                .join("  ")
        }
        _ if focused => format!("{value}{CURSOR}"),
        _ => value.to_owned(),
    }
}

fn hint_for(field: Option<&FieldSpec>) -> &'static str {
    match field.map(|field| field.kind) {
        Some(FieldKind::Choice(_)) => "left/right choose | tab/shift+tab field | enter save | esc cancel",
        Some(FieldKind::Tags(_)) => {
            "left/right move | space toggle | tab/shift+tab field | enter save | esc cancel"
        }
        Some(FieldKind::Date) => "yyyy-mm-dd | tab/shift+tab field | enter save | esc cancel",
        _ => "type to edit | ctrl+u clear | tab/shift+tab field | enter save | esc cancel",
    }
}

pub fn render_dialog(frame: &mut ratatui::Frame<'_>, area: Rect, dialog: &FormDialog) {
    frame.render_widget(Clear, area);
    let lines = dialog_lines(dialog)
        .into_iter()
        .enumerate()
        .map(|(index, text)| {
            let key = dialog.schema().fields.get(index).map(|field| field.key);
            let style = match key {
                Some(key) if dialog.errors().get(key).is_some() => Style::default().fg(Color::Red),
                Some(_) if index == dialog.focus() => Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
                Some(_) => Style::default(),
                None => Style::default().fg(Color::DarkGray),
            };
            Line::from(Span::styled(text, style))
        })
        .collect::<Vec<_>>();
    let body = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .title(dialog_title(dialog))
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::White)),
    );
    frame.render_widget(body, area);
}
