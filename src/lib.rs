//! Conversion of administrative-region reference tables from CSV files into
//! batched SQL `INSERT` statements.
//!
//! Every entity goes through the same pipeline: [`CsvSource`] reads the data
//! rows, [`RowMapper`] turns each into a tuple literal, [`SqlBatch`] joins them
//! into one statement and a [`Sink`] stores the result.

use std::path::PathBuf;

use tracing::{debug, info};

pub mod batch;
pub mod config;
mod error;
pub mod row;
pub mod sink;
pub mod source;

pub use batch::{EmptyPolicy, SqlBatch};
pub use config::{ConversionConfig, Field, DEFAULT_ENTITIES};
pub use error::{Error, ParseError, ValidationError};
pub use row::{FormattedRow, QuotePolicy, RowMapper, Value};
pub use sink::{DirSink, Sink, StreamSink};
pub use source::{CsvSource, SourceRow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub entity: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub rows: usize,
}

#[derive(Debug, Clone)]
pub struct Converter {
    data_dir: PathBuf,
    quoting: QuotePolicy,
    on_empty: EmptyPolicy,
}

impl Converter {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Converter {
            data_dir: data_dir.into(),
            quoting: QuotePolicy::default(),
            on_empty: EmptyPolicy::default(),
        }
    }

    pub fn quoting(mut self, quoting: QuotePolicy) -> Self {
        self.quoting = quoting;
        self
    }

    pub fn on_empty(mut self, on_empty: EmptyPolicy) -> Self {
        self.on_empty = on_empty;
        self
    }

    /// Runs one entity through the pipeline.
    ///
    /// The statement is built completely before anything is handed to the
    /// sink; a failing row leaves the output untouched.
    pub fn convert(&self, config: &ConversionConfig, sink: &mut impl Sink) -> Result<Summary, Error> {
        config.validate()?;
        let input = self.data_dir.join(&config.input);
        debug!(entity = %config.name, input = %input.display(), "reading");

        let mut source = CsvSource::open(&input)?;
        let mapper = RowMapper::new(config, self.quoting);
        let mut batch = SqlBatch::new(&config.table, &config.columns);
        for row in source.rows() {
            let row = row?;
            batch.push(mapper.map_in(&input, &row)?);
        }
        debug!(entity = %config.name, rows = batch.len(), "mapped");

        if batch.is_empty() && self.on_empty == EmptyPolicy::Error {
            return Err(Error::Empty { path: input });
        }
        sink.write_output(&config.output, batch.to_string().as_bytes())?;

        let summary = Summary {
            entity: config.name.clone(),
            input: config.input.clone(),
            output: config.output.clone(),
            rows: batch.len(),
        };
        info!(
            entity = %summary.entity,
            rows = summary.rows,
            "converted {} to {}",
            summary.input.display(),
            summary.output.display()
        );
        Ok(summary)
    }

    /// Converts each entity in turn, stopping at the first failure.
    pub fn convert_all<'a>(
        &self,
        configs: impl IntoIterator<Item = &'a ConversionConfig>,
        sink: &mut impl Sink,
    ) -> Result<Vec<Summary>, Error> {
        configs
            .into_iter()
            .map(|config| self.convert(config, sink))
            .collect()
    }
}
