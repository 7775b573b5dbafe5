//! Parent contact sheet: loading and lookup.
//!
//! The sheet is a CSV file with (at least) a `Student_Name` and a
//! `Parent_Phone` column, usually exported from the school's spreadsheet.
//! Extra columns are ignored and empty cells are allowed; a row with an empty
//! name can simply never match.
//!
//! Phone numbers are kept as text, exactly as written. Reading them as
//! numbers would drop leading zeros and `+` prefixes.

use crate::error::Report2MsgError;
use crate::output::ResolvedContact;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// One row of the contact sheet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContactRecord {
    #[serde(rename = "Student_Name", default)]
    pub student_name: String,
    #[serde(rename = "Parent_Phone", default)]
    pub parent_phone: String,
}

impl ContactRecord {
    pub fn new(student_name: impl Into<String>, parent_phone: impl Into<String>) -> Self {
        Self {
            student_name: student_name.into(),
            parent_phone: parent_phone.into(),
        }
    }
}

/// The loaded contact sheet. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct ContactBook {
    records: Vec<ContactRecord>,
}

impl ContactBook {
    /// A book with no contacts; every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<ContactRecord>) -> Self {
        Self { records }
    }

    /// Load a contact sheet from a CSV file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Report2MsgError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| Report2MsgError::ContactsRead {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        let book = Self::from_reader(file).map_err(|e| match e {
            Report2MsgError::ContactsRead { detail, .. } => Report2MsgError::ContactsRead {
                path: path.to_path_buf(),
                detail,
            },
            other => other,
        })?;
        info!("Loaded {} contacts from {}", book.len(), path.display());
        Ok(book)
    }

    /// Parse a contact sheet from any CSV source.
    ///
    /// Fails when the header lacks `Student_Name` or `Parent_Phone`, or when
    /// a row cannot be read.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, Report2MsgError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = reader.headers().map_err(read_error)?.clone();
        for required in ["Student_Name", "Parent_Phone"] {
            if !headers.iter().any(|h| h == required) {
                return Err(Report2MsgError::ContactsRead {
                    path: "<csv>".into(),
                    detail: format!("missing required column '{required}'"),
                });
            }
        }

        let mut records = Vec::new();
        for row in reader.deserialize::<ContactRecord>() {
            records.push(row.map_err(read_error)?);
        }
        debug!("Parsed {} contact rows", records.len());
        Ok(Self { records })
    }

    pub fn records(&self) -> &[ContactRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First contact whose name contains `student_name`.
    ///
    /// See [`crate::pipeline::resolve::resolve`] for the matching rules.
    pub fn find(&self, student_name: &str) -> Option<ResolvedContact> {
        crate::pipeline::resolve::resolve(student_name, &self.records)
    }
}

fn read_error(e: csv::Error) -> Report2MsgError {
    Report2MsgError::ContactsRead {
        path: "<csv>".into(),
        detail: e.to_string(),
    }
}
