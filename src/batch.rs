use std::{fmt, str::FromStr};

use crate::row::FormattedRow;

/// What to emit for an input with a header but no data rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyPolicy {
    /// Write an empty output file.
    EmptyFile,
    /// Fail the conversion.
    Error,
}

impl Default for EmptyPolicy {
    fn default() -> Self {
        EmptyPolicy::EmptyFile
    }
}

impl FromStr for EmptyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "empty-file" => Ok(EmptyPolicy::EmptyFile),
            "error" => Ok(EmptyPolicy::Error),
            _ => Err(format!(
                "unknown empty-input policy {:?} (expected empty-file or error)",
                s
            )),
        }
    }
}

/// All rows of one entity, destined for a single `INSERT` statement.
#[derive(Debug)]
pub struct SqlBatch<'a> {
    table: &'a str,
    columns: &'a [String],
    rows: Vec<FormattedRow>,
}

impl<'a> SqlBatch<'a> {
    pub fn new(table: &'a str, columns: &'a [String]) -> Self {
        SqlBatch {
            table,
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: FormattedRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Renders the statement. An empty batch renders as nothing at all, since a
/// `VALUES` clause without rows is not valid SQL.
impl<'a> fmt::Display for SqlBatch<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let last = match self.rows.len().checked_sub(1) {
            Some(last) => last,
            None => return Ok(()),
        };
        writeln!(
            f,
            "INSERT INTO {} ({}) VALUES",
            self.table,
            self.columns.join(", ")
        )?;
        for (i, row) in self.rows.iter().enumerate() {
            let terminator = if i == last { ';' } else { ',' };
            writeln!(f, "{}{}", row, terminator)?;
        }
        Ok(())
    }
}
