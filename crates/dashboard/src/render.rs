use std::{borrow::Cow, fmt::Write};

use chrono::{DateTime, Utc};
use crossterm::style::{Color, Stylize};
use itertools::Itertools;
use thiserror::Error;

use crate::utils::{parse_hex_colour, string_to_hex_colour, truncate_hash};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{component}: {reason}")]
    Invalid {
        component: &'static str,
        reason: String,
    },

    #[error("formatting failed")]
    Fmt(#[from] std::fmt::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct RenderContext {
    pub color: bool,
    pub now: DateTime<Utc>,
}

impl RenderContext {
    pub fn new(color: bool) -> Self {
        Self {
            color,
            now: Utc::now(),
        }
    }

    pub fn plain_at(now: DateTime<Utc>) -> Self {
        Self { color: false, now }
    }

    pub fn bold(&self, text: &str) -> String {
        let text = printable(text);
        if self.color {
            (&*text).bold().to_string()
        } else {
            text.into_owned()
        }
    }

    pub fn paint(&self, text: &str, color: Color) -> String {
        let text = printable(text);
        if self.color {
            (&*text).with(color).to_string()
        } else {
            text.into_owned()
        }
    }

    /// Truncated root coloured by its own hash.
    pub fn root(&self, root: Option<&str>) -> Cell {
        let text = truncate_hash(root);
        let color = root
            .and_then(|root| parse_hex_colour(&string_to_hex_colour(root)))
            .map(|(r, g, b)| Color::Rgb { r, g, b });
        Cell { text, color }
    }
}

/// Anything that can draw itself as a block of text.
pub trait Component {
    fn name(&self) -> &'static str;

    fn render(&self, ctx: &RenderContext) -> Result<String, RenderError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub color: Option<Color>,
}

impl Cell {
    pub fn colored(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color: Some(color),
        }
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Self { text, color: None }
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        text.to_string().into()
    }
}

/// Left-aligned columns, padded on the visible text so colour codes do not
/// skew the layout.
#[derive(Debug, Default)]
pub struct TextTable {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl TextTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        let row = row
            .into_iter()
            .map(|cell| Cell {
                text: printable(&cell.text).into_owned(),
                ..cell
            })
            .collect();
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn render(&self, ctx: &RenderContext) -> Result<String, RenderError> {
        let widths: Vec<usize> = (0..self.headers.len())
            .map(|column| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(column))
                    .map(|cell| cell.text.chars().count())
                    .chain(std::iter::once(self.headers[column].chars().count()))
                    .max()
                    .unwrap_or_default()
            })
            .collect();

        let mut out = String::new();
        let header = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(header, width)| ctx.bold(&format!("{header:<width$}")))
            .join("  ");
        writeln!(out, "{}", header.trim_end())?;
        writeln!(out, "{}", widths.iter().map(|width| "-".repeat(*width)).join("  "))?;

        for row in &self.rows {
            let line = widths
                .iter()
                .enumerate()
                .map(|(column, width)| {
                    let cell = row.get(column);
                    let text = cell.map_or("", |cell| cell.text.as_str());
                    let padded = format!("{text:<width$}");
                    match cell.and_then(|cell| cell.color) {
                        Some(color) => ctx.paint(&padded, color),
                        None => padded,
                    }
                })
                .join("  ");
            writeln!(out, "{}", line.trim_end())?;
        }
        Ok(out)
    }
}

/// Coarse relative time, e.g. `5 minutes ago`.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(then);
    let (amount, unit, suffix) = if delta.num_seconds() < 0 {
        let ahead = -delta;
        let (amount, unit) = largest_unit(ahead.num_seconds());
        (amount, unit, "from now")
    } else {
        let (amount, unit) = largest_unit(delta.num_seconds());
        (amount, unit, "ago")
    };
    if amount == 0 {
        return "just now".to_string();
    }
    let plural = if amount == 1 { "" } else { "s" };
    format!("{amount} {unit}{plural} {suffix}")
}

fn largest_unit(seconds: i64) -> (i64, &'static str) {
    const UNITS: [(i64, &str); 6] = [
        (365 * 24 * 3600, "year"),
        (30 * 24 * 3600, "month"),
        (7 * 24 * 3600, "week"),
        (24 * 3600, "day"),
        (3600, "hour"),
        (60, "minute"),
    ];
    UNITS
        .iter()
        .find(|(size, _)| seconds >= *size)
        .map_or((seconds, "second"), |(size, unit)| (seconds / size, *unit))
}

/// Control characters in `text` replaced by their escaped form, so text from
/// the server cannot drive the terminal.
pub fn printable(text: &str) -> Cow<'_, str> {
    if !text.chars().any(char::is_control) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_control() {
            out.extend(c.escape_default());
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Centered notice used for loading and failure states.
pub fn notice(ctx: &RenderContext, text: &str) -> String {
    format!("  {}\n", ctx.bold(text))
}
