// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow};
use thiserror::Error;
use time::Date;
use time::macros::format_description;

use crate::ids::RecordId;
use crate::model::FieldValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text { min_len: usize },
    Integer { min: Option<i64> },
    /// Rupees typed by the user, stored in paise.
    Money { allow_negative: bool },
    Date,
    Choice(&'static [&'static str]),
    Tags(&'static [&'static str]),
}

impl FieldKind {
    pub const fn options(self) -> &'static [&'static str] {
        match self {
            Self::Choice(options) | Self::Tags(options) => options,
            _ => &[],
        }
    }

    pub const fn accepts_typing(self) -> bool {
        !matches!(self, Self::Choice(_) | Self::Tags(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: true,
        }
    }

    pub const fn optional(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: false,
        }
    }
}

pub type RecordCheck = fn(&FormValues) -> Vec<(&'static str, FieldError)>;

/// Field list plus an optional cross-field check that runs only once every
/// field parses.
#[derive(Debug, Clone, Copy)]
pub struct FormSchema {
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
    pub check: Option<RecordCheck>,
}

impl FormSchema {
    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|field| field.key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("is required")]
    Required,
    #[error("must be at least {min} characters")]
    TooShort { min: usize },
    #[error("must be a whole number")]
    NotAnInteger,
    #[error("must be an amount like 1250.50")]
    NotAnAmount,
    #[error("must be {min} or greater")]
    BelowMinimum { min: i64 },
    #[error("must be a date like 2026-01-31")]
    InvalidDate,
    #[error("must be one of: {options}")]
    UnknownChoice { options: String },
    #[error("{0}")]
    Rule(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldErrors(BTreeMap<&'static str, FieldError>);

impl FieldErrors {
    pub fn get(&self, key: &str) -> Option<&FieldError> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldError)> {
        self.0.iter().map(|(key, error)| (*key, error))
    }

    fn insert(&mut self, key: &'static str, error: FieldError) {
        self.0.entry(key).or_insert(error);
    }
}

/// Raw text per field, keyed by field key. An assigned id means the draft
/// edits a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormDraft {
    pub id: RecordId,
    values: BTreeMap<String, String>,
}

impl FormDraft {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            values: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_owned(), value.into());
    }

    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map_or("", String::as_str)
    }

    fn entry(&mut self, key: &str) -> &mut String {
        self.values.entry(key.to_owned()).or_default()
    }
}

/// Parsed, validated field values. Blank optional fields are absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormValues(BTreeMap<&'static str, FieldValue>);

impl FormValues {
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn text(&self, key: &str) -> String {
        match self.0.get(key) {
            Some(FieldValue::Text(value)) => value.clone(),
            Some(other) => other.display(),
            None => String::new(),
        }
    }

    pub fn integer(&self, key: &str) -> Result<i64> {
        self.optional_integer(key)
            .with_context(|| format!("form value {key} is missing or not an integer"))
    }

    pub fn optional_integer(&self, key: &str) -> Option<i64> {
        match self.0.get(key) {
            Some(FieldValue::Integer(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn money(&self, key: &str) -> Result<i64> {
        self.optional_money(key)
            .with_context(|| format!("form value {key} is missing or not an amount"))
    }

    pub fn optional_money(&self, key: &str) -> Option<i64> {
        match self.0.get(key) {
            Some(FieldValue::Money(value)) => Some(*value),
            _ => None,
        }
    }

    pub fn date(&self, key: &str) -> Result<Date> {
        self.optional_date(key)
            .with_context(|| format!("form value {key} is missing or not a date"))
    }

    pub fn optional_date(&self, key: &str) -> Option<Date> {
        match self.0.get(key) {
            Some(FieldValue::Date(value)) => Some(*value),
            _ => None,
        }
    }

    /// Parses a choice field into its typed enum.
    pub fn choice<T>(&self, key: &str, parse: fn(&str) -> Option<T>) -> Result<T> {
        let raw = self.text(key);
        parse(&raw).ok_or_else(|| anyhow!("form value {key} has unknown choice {raw:?}"))
    }

    pub fn tags(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(FieldValue::Tags(values)) => values.clone(),
            Some(FieldValue::Text(value)) => vec![value.clone()],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogMode {
    Create,
    Edit(RecordId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedForm {
    pub mode: DialogMode,
    pub values: FormValues,
}

/// Records that can be edited through a [`FormDialog`].
pub trait FormRecord: Sized {
    fn schema() -> &'static FormSchema;

    /// Create-mode defaults.
    fn blank_draft(today: Date) -> FormDraft;

    fn to_draft(&self) -> FormDraft;

    fn from_values(id: RecordId, values: &FormValues) -> Result<Self>;
}

/// Modal form bound to a schema. Never touches a store: a successful submit
/// hands validated values back to the caller.
#[derive(Debug, Clone)]
pub struct FormDialog {
    schema: &'static FormSchema,
    mode: DialogMode,
    draft: FormDraft,
    focus: usize,
    tag_cursor: usize,
    errors: FieldErrors,
}

impl FormDialog {
    pub fn open(schema: &'static FormSchema, draft: FormDraft) -> Self {
        let mode = if draft.id.is_assigned() {
            DialogMode::Edit(draft.id.clone())
        } else {
            DialogMode::Create
        };
        Self {
            schema,
            mode,
            draft,
            focus: 0,
            tag_cursor: 0,
            errors: FieldErrors::default(),
        }
    }

    pub fn create(schema: &'static FormSchema) -> Self {
        Self::open(schema, FormDraft::default())
    }

    pub fn schema(&self) -> &'static FormSchema {
        self.schema
    }

    pub fn mode(&self) -> &DialogMode {
        &self.mode
    }

    pub fn draft(&self) -> &FormDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn tag_cursor(&self) -> usize {
        self.tag_cursor
    }

    pub fn focused_field(&self) -> Option<&'static FieldSpec> {
        self.schema.fields.get(self.focus)
    }

    pub fn value(&self, key: &str) -> &str {
        self.draft.get(key)
    }

    pub fn move_focus(&mut self, delta: isize) {
        let len = self.schema.fields.len();
        if len == 0 {
            return;
        }
        self.focus = (self.focus as isize + delta).rem_euclid(len as isize) as usize;
        self.tag_cursor = 0;
    }

    pub fn set_value(&mut self, key: &str, value: impl Into<String>) {
        self.draft.set(key, value);
    }

    pub fn input_char(&mut self, ch: char) {
        let Some(field) = self.focused_field() else {
            return;
        };
        if field.kind.accepts_typing() {
            self.draft.entry(field.key).push(ch);
        }
    }

    pub fn backspace(&mut self) {
        let Some(field) = self.focused_field() else {
            return;
        };
        if field.kind.accepts_typing() {
            self.draft.entry(field.key).pop();
        }
    }

    pub fn clear_field(&mut self) {
        if let Some(field) = self.focused_field() {
            self.draft.entry(field.key).clear();
        }
    }

    /// Steps a choice field through its options, or moves the tag cursor on a
    /// tag field.
    pub fn cycle_choice(&mut self, delta: isize) {
        let Some(field) = self.focused_field() else {
            return;
        };
        let options = field.kind.options();
        if options.is_empty() {
            return;
        }
        let len = options.len() as isize;
        match field.kind {
            FieldKind::Choice(_) => {
                let next = match options.iter().position(|option| *option == self.value(field.key)) {
                    Some(current) => (current as isize + delta).rem_euclid(len),
                    None if delta < 0 => len - 1,
                    None => 0,
                };
                self.draft.set(field.key, options[next as usize]);
            }
            FieldKind::Tags(_) => {
                self.tag_cursor = (self.tag_cursor as isize + delta).rem_euclid(len) as usize;
            }
            _ => {}
        }
    }

    /// Adds or removes the tag under the cursor.
    pub fn toggle_tag(&mut self) {
        let Some(field) = self.focused_field() else {
            return;
        };
        let FieldKind::Tags(options) = field.kind else {
            return;
        };
        let Some(option) = options.get(self.tag_cursor) else {
            return;
        };
        let mut tags = split_tags(self.value(field.key));
        if let Some(index) = tags.iter().position(|tag| tag == option) {
            tags.remove(index);
        } else {
            tags.push((*option).to_owned());
        }
        self.draft.set(field.key, tags.join(", "));
    }

    pub fn validate(&self) -> Result<FormValues, FieldErrors> {
        let mut values = BTreeMap::new();
        let mut errors = FieldErrors::default();
        for field in self.schema.fields {
            match parse_field(field, self.draft.get(field.key)) {
                Ok(Some(value)) => {
                    values.insert(field.key, value);
                }
                Ok(None) => {}
                Err(error) => errors.insert(field.key, error),
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        let values = FormValues(values);
        if let Some(check) = self.schema.check {
            for (key, error) in check(&values) {
                errors.insert(key, error);
            }
        }
        if errors.is_empty() {
            Ok(values)
        } else {
            Err(errors)
        }
    }

    /// Validates the draft. On failure the errors stay on the dialog so it can
    /// be shown again; on success the caller closes it.
    pub fn submit(&mut self) -> Result<SubmittedForm, FieldErrors> {
        match self.validate() {
            Ok(values) => {
                self.errors = FieldErrors::default();
                Ok(SubmittedForm {
                    mode: self.mode.clone(),
                    values,
                })
            }
            Err(errors) => {
                if let Some(index) = self
                    .schema
                    .fields
                    .iter()
                    .position(|field| errors.get(field.key).is_some())
                {
                    self.focus = index;
                }
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }
}

fn parse_field(field: &FieldSpec, raw: &str) -> Result<Option<FieldValue>, FieldError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return if field.required {
            Err(FieldError::Required)
        } else {
            Ok(None)
        };
    }

    let value = match field.kind {
        FieldKind::Text { min_len } => {
            if raw.chars().count() < min_len {
                return Err(FieldError::TooShort { min: min_len });
            }
            FieldValue::Text(raw.to_owned())
        }
        FieldKind::Integer { min } => {
            let value: i64 = raw.parse().map_err(|_| FieldError::NotAnInteger)?;
            if let Some(min) = min
                && value < min
            {
                return Err(FieldError::BelowMinimum { min });
            }
            FieldValue::Integer(value)
        }
        FieldKind::Money { allow_negative } => {
            let paise = parse_money(raw).ok_or(FieldError::NotAnAmount)?;
            if !allow_negative && paise < 0 {
                return Err(FieldError::BelowMinimum { min: 0 });
            }
            FieldValue::Money(paise)
        }
        FieldKind::Date => FieldValue::Date(parse_date(raw).ok_or(FieldError::InvalidDate)?),
        FieldKind::Choice(options) => {
            if !options.contains(&raw) {
                return Err(unknown_choice(options));
            }
            FieldValue::Text(raw.to_owned())
        }
        FieldKind::Tags(options) => {
            let tags = split_tags(raw);
            if tags.iter().any(|tag| !options.contains(&tag.as_str())) {
                return Err(unknown_choice(options));
            }
            if tags.is_empty() && field.required {
                return Err(FieldError::Required);
            }
            FieldValue::Tags(tags)
        }
    };
    Ok(Some(value))
}

fn unknown_choice(options: &[&str]) -> FieldError {
    FieldError::UnknownChoice {
        options: options.join(", "),
    }
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect()
}

pub fn parse_date(raw: &str) -> Option<Date> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]")).ok()
}

/// Parses `1,250.5`, `₹1250.50` or `-3` into paise.
pub fn parse_money(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .chars()
        .filter(|ch| !matches!(ch, '₹' | ',' | ' '))
        .collect();
    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    let all_digits = |part: &str| part.bytes().all(|byte| byte.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) || fraction.len() > 2 {
        return None;
    }
    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };
    let paise = whole.checked_mul(100)?.checked_add(fraction)?;
    Some(if negative { -paise } else { paise })
}

/// Formats paise the way the dialog expects them typed back in.
pub fn money_input(paise: i64) -> String {
    let sign = if paise < 0 { "-" } else { "" };
    let paise = paise.unsigned_abs();
    format!("{sign}{}.{:02}", paise / 100, paise % 100)
}

#[cfg(test)]
mod tests {
    use super::{
        DialogMode, FieldError, FieldKind, FieldSpec, FormDialog, FormDraft, FormSchema,
        FormValues, parse_money,
    };
    use crate::ids::RecordId;
    use crate::model::FieldValue;

    const SIZES: &[&str] = &["small", "large"];
    const TAGS: &[&str] = &["red", "blue", "green"];

    fn window_check(values: &FormValues) -> Vec<(&'static str, FieldError)> {
        match (values.optional_date("start"), values.optional_date("end")) {
            (Some(start), Some(end)) if end < start => vec![(
                "end",
                FieldError::Rule("end cannot be before start".to_owned()),
            )],
            _ => Vec::new(),
        }
    }

    static SCHEMA: FormSchema = FormSchema {
        title: "Widget",
        fields: &[
            FieldSpec::required("name", "Name", FieldKind::Text { min_len: 2 }),
            FieldSpec::required("count", "Count", FieldKind::Integer { min: Some(0) }),
            FieldSpec::optional("price", "Price", FieldKind::Money { allow_negative: false }),
            FieldSpec::required("size", "Size", FieldKind::Choice(SIZES)),
            FieldSpec::optional("tags", "Tags", FieldKind::Tags(TAGS)),
            FieldSpec::optional("start", "Start", FieldKind::Date),
            FieldSpec::optional("end", "End", FieldKind::Date),
        ],
        check: Some(window_check),
    };

    fn filled() -> FormDialog {
        FormDialog::open(
            &SCHEMA,
            FormDraft::default()
                .with("name", "Bolt")
                .with("count", "12")
                .with("size", "small"),
        )
    }

    #[test]
    fn mode_follows_id_presence() {
        assert_eq!(FormDialog::create(&SCHEMA).mode(), &DialogMode::Create);
        let dialog = FormDialog::open(&SCHEMA, FormDraft::new(RecordId::from("W001")));
        assert_eq!(
            dialog.mode(),
            &DialogMode::Edit(RecordId::from("W001"))
        );
    }

    #[test]
    fn required_fields_block_submit() {
        let mut dialog = FormDialog::create(&SCHEMA);
        let errors = dialog.submit().expect_err("empty form must not submit");
        assert_eq!(errors.get("name"), Some(&FieldError::Required));
        assert_eq!(errors.get("count"), Some(&FieldError::Required));
        assert_eq!(errors.get("price"), None);
        assert_eq!(dialog.errors(), &errors);
        assert_eq!(dialog.focus(), 0);
    }

    #[test]
    fn numeric_text_is_coerced_before_validation() -> anyhow::Result<()> {
        let mut dialog = filled();
        dialog.set_value("price", "1,250.5");
        let submitted = dialog.submit().map_err(|errors| anyhow::anyhow!("{errors:?}"))?;
        assert_eq!(submitted.values.integer("count")?, 12);
        assert_eq!(submitted.values.money("price")?, 125_050);
        assert_eq!(submitted.mode, DialogMode::Create);
        Ok(())
    }

    #[test]
    fn non_numeric_and_negative_values_are_field_errors() {
        let mut dialog = filled();
        dialog.set_value("count", "twelve");
        dialog.set_value("price", "-5");
        let errors = dialog.submit().expect_err("bad numbers must not submit");
        assert_eq!(errors.get("count"), Some(&FieldError::NotAnInteger));
        assert_eq!(errors.get("price"), Some(&FieldError::BelowMinimum { min: 0 }));
        assert_eq!(dialog.focus(), 1);
    }

    #[test]
    fn minimum_message_reads_naturally() {
        assert_eq!(
            FieldError::BelowMinimum { min: 0 }.to_string(),
            "must be 0 or greater"
        );
        assert_eq!(
            FieldError::TooShort { min: 2 }.to_string(),
            "must be at least 2 characters"
        );
    }

    #[test]
    fn record_check_runs_after_fields_parse() {
        let mut dialog = filled();
        dialog.set_value("start", "2026-03-10");
        dialog.set_value("end", "2026-03-01");
        let errors = dialog.submit().expect_err("inverted window must not submit");
        assert!(matches!(errors.get("end"), Some(FieldError::Rule(_))));
    }

    #[test]
    fn choice_cycling_wraps_and_typing_is_ignored() {
        let mut dialog = filled();
        dialog.move_focus(3);
        dialog.input_char('x');
        assert_eq!(dialog.value("size"), "small");
        dialog.cycle_choice(1);
        assert_eq!(dialog.value("size"), "large");
        dialog.cycle_choice(1);
        assert_eq!(dialog.value("size"), "small");
        dialog.cycle_choice(-1);
        assert_eq!(dialog.value("size"), "large");
    }

    #[test]
    fn tags_toggle_under_cursor() -> anyhow::Result<()> {
        let mut dialog = filled();
        dialog.move_focus(4);
        dialog.toggle_tag();
        dialog.cycle_choice(2);
        dialog.toggle_tag();
        assert_eq!(dialog.value("tags"), "red, green");
        dialog.cycle_choice(1);
        dialog.toggle_tag();
        assert_eq!(dialog.value("tags"), "green");
        let submitted = dialog.submit().map_err(|errors| anyhow::anyhow!("{errors:?}"))?;
        assert_eq!(
            submitted.values.get("tags"),
            Some(&FieldValue::Tags(vec!["green".to_owned()]))
        );
        Ok(())
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let mut dialog = filled();
        dialog.set_value("tags", "red, purple");
        let errors = dialog.submit().expect_err("unknown tag must not submit");
        assert!(matches!(
            errors.get("tags"),
            Some(FieldError::UnknownChoice { .. })
        ));
    }

    #[test]
    fn typing_edits_the_focused_field() {
        let mut dialog = FormDialog::create(&SCHEMA);
        for ch in "Nut".chars() {
            dialog.input_char(ch);
        }
        dialog.backspace();
        assert_eq!(dialog.value("name"), "Nu");
        dialog.clear_field();
        assert_eq!(dialog.value("name"), "");
        dialog.move_focus(-1);
        assert_eq!(dialog.focused_field().map(|field| field.key), Some("end"));
    }

    #[test]
    fn money_parsing_handles_common_shapes() {
        assert_eq!(parse_money("₹2,50,000"), Some(25_000_000));
        assert_eq!(parse_money("12.5"), Some(1_250));
        assert_eq!(parse_money(".75"), Some(75));
        assert_eq!(parse_money("-3"), Some(-300));
        assert_eq!(parse_money("1.234"), None);
        assert_eq!(parse_money("abc"), None);
        assert_eq!(parse_money("."), None);
    }
}
