//! Delimited impact-test tables.
//!
//! Acquisition software exports impact tests as delimited text with a
//! free-form preamble, a header line and numeric rows. Headers are matched
//! against known aliases (English and Spanish, with or without units);
//! files without a recognizable header are read positionally as
//! `time, force, accel_x, accel_y, accel_z`.

use crate::{Error, Result};
use dynstiff_analysis::{Axis, ImpactRecord};
use std::fmt;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Field separator of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// Tabs (runs of tabs count as one separator).
    Tab,
    /// Semicolons; commas inside fields are decimal commas.
    Semicolon,
    /// Commas.
    Comma,
}

impl Separator {
    /// Detect the separator from a single line.
    ///
    /// A tab wins outright, otherwise semicolons are chosen when they
    /// outnumber commas.
    pub fn detect(line: &str) -> Self {
        if line.contains('\t') {
            Separator::Tab
        } else if line.matches(';').count() > line.matches(',').count() {
            Separator::Semicolon
        } else {
            Separator::Comma
        }
    }

    fn split(self, line: &str) -> Vec<&str> {
        match self {
            Separator::Tab => line
                .split('\t')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .collect(),
            Separator::Semicolon => line.split(';').map(str::trim).collect(),
            Separator::Comma => line.split(',').map(str::trim).collect(),
        }
    }

    fn parse(self, field: &str) -> Option<f64> {
        let field = field.trim().trim_matches('"');
        if field.is_empty() {
            return None;
        }
        match self {
            Separator::Semicolon if field.contains(',') => field.replace(',', ".").parse().ok(),
            _ => field.parse().ok(),
        }
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Separator::Tab => "tab",
            Separator::Semicolon => "semicolon",
            Separator::Comma => "comma",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Time,
    Force,
    Accel(Axis),
}

const TIME_ALIASES: &[&str] = &["time", "tiempo", "t"];
const FORCE_ALIASES: &[&str] = &["force", "fuerza", "f"];
const ACCEL_ALIASES: [(Axis, &[&str]); 3] = [
    (
        Axis::X,
        &[
            "accel_x", "acc_x", "acel_x", "aceleracion_x", "ax", "acc x", "aceleracion x",
            "aceleración x", "acceleration x",
        ],
    ),
    (
        Axis::Y,
        &[
            "accel_y", "acc_y", "acel_y", "aceleracion_y", "ay", "acc y", "aceleracion y",
            "aceleración y", "acceleration y",
        ],
    ),
    (
        Axis::Z,
        &[
            "accel_z", "acc_z", "acel_z", "aceleracion_z", "az", "acc z", "aceleracion z",
            "aceleración z", "acceleration z",
        ],
    ),
];

/// Map a header field to a column, ignoring case, quotes and a unit suffix
/// such as `(s)` or `[g]`.
fn column_for(name: &str) -> Option<Column> {
    let lower = name.trim().trim_matches(|c: char| c == '"' || c == '\'').to_lowercase();
    let base = lower
        .split(['(', '['])
        .next()
        .unwrap_or_default()
        .trim();

    if TIME_ALIASES.contains(&base) {
        return Some(Column::Time);
    }
    if FORCE_ALIASES.contains(&base) {
        return Some(Column::Force);
    }
    ACCEL_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&base))
        .map(|(axis, _)| Column::Accel(*axis))
}

fn is_comment(line: &str) -> bool {
    line.is_empty() || line.starts_with('#') || line.starts_with("//")
}

/// Column layout found in the table: `(field index, column)` pairs.
struct Layout {
    separator: Separator,
    columns: Vec<(usize, Column)>,
    /// Index of the first line that may hold data.
    data_start: usize,
}

fn header_layout(fields: &[&str]) -> Vec<(usize, Column)> {
    let mut columns: Vec<(usize, Column)> = Vec::new();
    for (i, field) in fields.iter().enumerate() {
        if let Some(col) = column_for(field)
            && !columns.iter().any(|(_, c)| *c == col)
        {
            columns.push((i, col));
        }
    }
    columns
}

fn positional_layout(count: usize) -> Vec<(usize, Column)> {
    [
        Column::Time,
        Column::Force,
        Column::Accel(Axis::X),
        Column::Accel(Axis::Y),
        Column::Accel(Axis::Z),
    ]
    .into_iter()
    .take(count)
    .enumerate()
    .collect()
}

fn find_layout(lines: &[&str]) -> Result<Layout> {
    for (i, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        if is_comment(line) {
            continue;
        }
        let separator = Separator::detect(line);
        let fields = separator.split(line);

        if fields.first().and_then(|f| separator.parse(f)).is_some() {
            if fields.len() < 2 {
                return Err(Error::Parse {
                    line: i + 1,
                    reason: "expected at least time and force columns".to_string(),
                });
            }
            return Ok(Layout {
                separator,
                columns: positional_layout(fields.len()),
                data_start: i,
            });
        }

        let columns = header_layout(&fields);
        if columns.is_empty() {
            // Preamble line
            continue;
        }
        for (required, name) in [(Column::Time, "time"), (Column::Force, "force")] {
            if !columns.iter().any(|(_, c)| *c == required) {
                return Err(Error::MissingColumn(name.to_string()));
            }
        }
        return Ok(Layout {
            separator,
            columns,
            data_start: i + 1,
        });
    }
    Err(Error::NoData)
}

/// Parse an impact-test table from text.
///
/// Comment lines (`#`, `//`), preamble text and rows with non-numeric
/// fields are skipped. Rows whose time is negative or non-finite are
/// dropped. At least a time and a force column are required.
pub fn parse_table(text: &str) -> Result<ImpactRecord> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text.lines().collect();
    let layout = find_layout(&lines)?;

    let mut time = Vec::new();
    let mut force = Vec::new();
    let mut accel: [Option<Vec<f64>>; 3] = [None, None, None];
    for (_, col) in &layout.columns {
        if let Column::Accel(axis) = col {
            accel[axis_slot(*axis)] = Some(Vec::new());
        }
    }

    let mut skipped = 0usize;
    let mut dropped = 0usize;
    let mut row = Vec::with_capacity(layout.columns.len());

    for raw in &lines[layout.data_start..] {
        let line = raw.trim();
        if is_comment(line) {
            continue;
        }
        let fields = layout.separator.split(line);

        row.clear();
        for (idx, col) in &layout.columns {
            match fields.get(*idx).and_then(|f| layout.separator.parse(f)) {
                Some(v) => row.push((*col, v)),
                None => break,
            }
        }
        if row.len() != layout.columns.len() {
            skipped += 1;
            continue;
        }

        let t = row
            .iter()
            .find(|(c, _)| *c == Column::Time)
            .map_or(f64::NAN, |(_, v)| *v);
        if !t.is_finite() || t < 0.0 {
            dropped += 1;
            continue;
        }

        for &(col, v) in &row {
            match col {
                Column::Time => time.push(v),
                Column::Force => force.push(v),
                Column::Accel(axis) => {
                    if let Some(samples) = accel[axis_slot(axis)].as_mut() {
                        samples.push(v);
                    }
                }
            }
        }
    }

    if time.is_empty() {
        return Err(Error::NoData);
    }

    tracing::debug!(
        rows = time.len(),
        skipped,
        dropped,
        separator = %layout.separator,
        "table parsed"
    );

    let mut record = ImpactRecord::new(time, force)?;
    for axis in Axis::ALL {
        if let Some(samples) = accel[axis_slot(axis)].take() {
            record.set_axis(axis, samples)?;
        }
    }
    Ok(record)
}

fn axis_slot(axis: Axis) -> usize {
    match axis {
        Axis::X => 0,
        Axis::Y => 1,
        Axis::Z => 2,
    }
}

/// Read an impact-test table from a file.
///
/// Bytes that are not valid UTF-8 are replaced, so exports in legacy
/// code pages still load as long as the header and numbers are ASCII.
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<ImpactRecord> {
    let bytes = std::fs::read(path.as_ref())?;
    let text = String::from_utf8_lossy(&bytes);
    parse_table(&text)
}

/// Write a record as comma-separated text with a `time,force,accel_*` header.
///
/// Only the acceleration axes present in the record are written.
pub fn write_table<P: AsRef<Path>>(path: P, record: &ImpactRecord) -> Result<()> {
    let file = std::fs::File::create(path.as_ref())?;
    let mut w = BufWriter::new(file);

    let axes = record.axes();
    let mut header = String::from("time,force");
    for axis in &axes {
        header.push(',');
        header.push_str(axis.column_name());
    }
    writeln!(w, "{header}")?;

    let columns: Vec<&[f64]> = axes.iter().filter_map(|&a| record.axis(a)).collect();
    for i in 0..record.len() {
        write!(w, "{},{}", record.time[i], record.force[i])?;
        for col in &columns {
            write!(w, ",{}", col[i])?;
        }
        writeln!(w)?;
    }
    w.flush()?;
    Ok(())
}
