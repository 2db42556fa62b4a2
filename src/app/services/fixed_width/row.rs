//! Input rows handed to row schemas
//!
//! Fixed-width submissions produce [`RawRow`]s, one per decoded line.
//! Delimited submissions are pre-split into [`TupleRow`]s whose fields are
//! addressed by column index.

use crate::constants::record_types::{HEADER, TOKEN_WIDTH, TRAILER};
use super::position::Position;
use std::borrow::Cow;
use std::hash::{DefaultHasher, Hash, Hasher};

/// One decoded line of a fixed-width file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawRow {
    text: String,
    line_number: usize,
}

impl RawRow {
    pub fn new(text: impl Into<String>, line_number: usize) -> Self {
        Self {
            text: text.into(),
            line_number,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Decoded length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Leading record-type token
    pub fn record_type(&self) -> String {
        if self.text.starts_with(HEADER) {
            return HEADER.to_string();
        }
        if self.text.starts_with(TRAILER) {
            return TRAILER.to_string();
        }
        self.text
            .chars()
            .take(TOKEN_WIDTH)
            .collect::<String>()
            .trim()
            .to_string()
    }

    /// Characters covered by `position`, or `None` when the line is too short
    pub fn slice(&self, position: Position) -> Option<&str> {
        if self.text.is_ascii() {
            return self.text.get(position.start..position.end);
        }
        let mut bounds = self
            .text
            .char_indices()
            .map(|(index, _)| index)
            .chain(std::iter::once(self.text.len()));
        let start = bounds.nth(position.start)?;
        let end = bounds.nth(position.len() - 1)?;
        self.text.get(start..end)
    }
}

/// One pre-split row of a delimited file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TupleRow {
    values: Vec<String>,
    record_type: String,
    line_number: usize,
}

impl TupleRow {
    pub fn new(values: Vec<String>, record_type: impl Into<String>, line_number: usize) -> Self {
        Self {
            values,
            record_type: record_type.into(),
            line_number,
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn get(&self, column: usize) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

/// Row of either kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Row {
    Raw(RawRow),
    Tuple(TupleRow),
}

impl Row {
    pub fn line_number(&self) -> usize {
        match self {
            Row::Raw(row) => row.line_number(),
            Row::Tuple(row) => row.line_number(),
        }
    }

    pub fn record_type(&self) -> String {
        match self {
            Row::Raw(row) => row.record_type(),
            Row::Tuple(row) => row.record_type().to_string(),
        }
    }

    /// Characters in a raw row, columns in a tuple row
    pub fn len(&self) -> usize {
        match self {
            Row::Raw(row) => row.len(),
            Row::Tuple(row) => row.values().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn slice(&self, position: Position) -> Option<Cow<'_, str>> {
        match self {
            Row::Raw(row) => row.slice(position).map(Cow::Borrowed),
            Row::Tuple(row) => row.get(position.start).map(Cow::Borrowed),
        }
    }

    /// The whole row as text, columns joined by commas
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Row::Raw(row) => Cow::Borrowed(row.text()),
            Row::Tuple(row) => Cow::Owned(row.values().join(",")),
        }
    }

    /// Hash identifying an exact duplicate of this row
    pub fn content_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        match self {
            Row::Raw(row) => row.text().hash(&mut hasher),
            Row::Tuple(row) => (row.record_type(), row.values()).hash(&mut hasher),
        }
        hasher.finish()
    }
}

impl From<RawRow> for Row {
    fn from(row: RawRow) -> Self {
        Row::Raw(row)
    }
}

impl From<TupleRow> for Row {
    fn from(row: TupleRow) -> Self {
        Row::Tuple(row)
    }
}
