// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::config::ExportFormat;
use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use sitegrid_app::PageKind;
use sitegrid_tui::ExportSheet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use time::Date;

pub fn file_name(page: PageKind, today: Date, format: ExportFormat) -> String {
    format!("{}-{today}.{}", page.slug(), format.extension())
}

/// Writes `sheet` into `dir` and returns the file path.
pub fn write_sheet(
    dir: &Path,
    page: PageKind,
    today: Date,
    format: ExportFormat,
    sheet: &ExportSheet,
) -> Result<PathBuf> {
    if sheet.is_empty() {
        bail!("no data available to export");
    }
    fs::create_dir_all(dir).with_context(|| format!("create export directory {}", dir.display()))?;
    let path = dir.join(file_name(page, today, format));
    match format {
        ExportFormat::Csv => write_csv(&path, sheet),
        ExportFormat::Json => write_json(&path, sheet),
    }
    .with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

fn write_csv(path: &Path, sheet: &ExportSheet) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(&sheet.headers)?;
    for row in &sheet.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_json(path: &Path, sheet: &ExportSheet) -> Result<()> {
    let rows: Vec<Value> = sheet
        .rows
        .iter()
        .map(|row| {
            let object: Map<String, Value> = sheet
                .headers
                .iter()
                .zip(row)
                .map(|(header, value)| (json_key(header), Value::String(value.clone())))
                .collect();
            Value::Object(object)
        })
        .collect();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &rows)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Blank headers (the flag column) still need a stable key.
fn json_key(header: &str) -> String {
    if header.is_empty() {
        "flag".to_owned()
    } else {
        header.to_owned()
    }
}
