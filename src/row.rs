use std::{fmt, str::FromStr};

use crate::{
    config::Field,
    error::{Error, ValidationError},
    source::SourceRow,
    ConversionConfig,
};

/// What to do with quotes and backslashes inside text values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotePolicy {
    /// Insert text unchanged. Values containing `"` yield broken SQL.
    Verbatim,
    /// Double embedded `"` and `\`.
    Escape,
    /// Refuse values containing `"` or `\`.
    Reject,
}

impl Default for QuotePolicy {
    fn default() -> Self {
        QuotePolicy::Escape
    }
}

impl FromStr for QuotePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "verbatim" => Ok(QuotePolicy::Verbatim),
            "escape" => Ok(QuotePolicy::Escape),
            "reject" => Ok(QuotePolicy::Reject),
            _ => Err(format!(
                "unknown quoting policy {:?} (expected verbatim, escape or reject)",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// A row rendered as a tuple literal, e.g. `(1101, 11, "Kab. Simeulue")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedRow {
    values: Vec<Value>,
}

impl FormattedRow {
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl fmt::Display for FormattedRow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str(")")
    }
}

pub struct RowMapper<'a> {
    fields: &'a [Field],
    quoting: QuotePolicy,
}

impl<'a> RowMapper<'a> {
    pub fn new(config: &'a ConversionConfig, quoting: QuotePolicy) -> Self {
        RowMapper {
            fields: &config.fields,
            quoting,
        }
    }

    /// Maps a row, reporting the failing column index on error.
    pub fn map(&self, row: &SourceRow) -> Result<FormattedRow, (usize, ValidationError)> {
        let values = self
            .fields
            .iter()
            .map(|&field| {
                let index = field.index();
                let raw = row.get(index).ok_or((
                    index,
                    ValidationError::MissingColumn {
                        len: row.field_count(),
                    },
                ))?;
                match field {
                    Field::Integer(_) => raw.parse::<i64>().map(Value::Integer).map_err(|_| {
                        (
                            index,
                            ValidationError::NotAnInteger {
                                value: raw.to_owned(),
                            },
                        )
                    }),
                    Field::Text(_) => self.text(raw).map_err(|e| (index, e)),
                }
            })
            .collect::<Result<_, _>>()?;
        Ok(FormattedRow { values })
    }

    pub(crate) fn map_in(
        &self,
        path: &std::path::Path,
        row: &SourceRow,
    ) -> Result<FormattedRow, Error> {
        self.map(row).map_err(|(column, kind)| Error::Validation {
            path: path.to_owned(),
            line: row.line,
            column,
            kind,
        })
    }

    fn text(&self, raw: &str) -> Result<Value, ValidationError> {
        let unsafe_text = raw.contains(|c: char| c == '"' || c == '\\');
        let text = match self.quoting {
            QuotePolicy::Verbatim => raw.to_owned(),
            QuotePolicy::Escape if unsafe_text => raw.replace('\\', "\\\\").replace('"', "\"\""),
            QuotePolicy::Escape => raw.to_owned(),
            QuotePolicy::Reject if unsafe_text => {
                return Err(ValidationError::UnsafeText {
                    value: raw.to_owned(),
                })
            }
            QuotePolicy::Reject => raw.to_owned(),
        };
        Ok(Value::Text(text))
    }
}
