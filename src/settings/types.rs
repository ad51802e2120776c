//! Settings Data Structures and the Line-Format Parser.
//!
//! This module defines [`Record`], the parsed representation of one line
//! of a settings file, and [`parse_document`], which turns the full text
//! of a settings file into the ordered record list (the "settings
//! document").
//!
//! # File format
//!
//! Plain UTF-8 text, one logical record per `\n`-separated line:
//!
//! - A line is a comment and ignored iff its **first character** is `#`.
//!   A line with whitespace before the `#` is *not* a comment and parses
//!   as an ordinary record; this asymmetry with the blank-line check is
//!   part of the on-disk compatibility contract.
//! - A line is blank and ignored if it is empty after trimming
//!   whitespace from both ends.
//! - Any other line is split on literal `,` characters and each field is
//!   trimmed independently. There is no escaping mechanism for `,` or
//!   `#` inside a field; this is a deliberate limitation of the format.
//!
//! Parsing has no failure path: any input text produces some (possibly
//! empty) document.

/// One parsed line of a settings file: an ordered sequence of trimmed
/// string fields. The first field is the record's lookup key; the
/// remaining fields are positional values. Records are not required to
/// have a uniform field count, and several records may share a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    /// Creates a record from already-split, already-trimmed fields.
    pub fn new(fields: Vec<String>) -> Self {
        Record { fields }
    }

    /// The record's lookup key: its first field, or `""` for a record
    /// with no fields (which the parser never produces — a non-blank
    /// line split on `,` always yields at least one field).
    pub fn key(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or("")
    }

    /// Returns the field at `index`, if present.
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// All fields, in line order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of fields in the record.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Record {
    fn from(fields: [S; N]) -> Self {
        Record::new(fields.into_iter().map(Into::into).collect())
    }
}

/// Parses the full text of a settings file into the ordered record list.
///
/// Lines are processed in input order; comment and blank lines are
/// skipped, every other line becomes one [`Record`]. No schema or
/// field-count validation is performed and no error can occur.
pub fn parse_document(text: &str) -> Vec<Record> {
    let mut records = Vec::new();
    for line in text.split('\n') {
        // Comment check inspects the very first character only.
        if line.starts_with('#') {
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }
        let fields = line.split(',').map(|field| field.trim().to_string()).collect();
        records.push(Record::new(fields));
    }
    records
}
