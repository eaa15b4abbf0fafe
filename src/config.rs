use std::{fs, path::Path, path::PathBuf};

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::Error;

/// A column taken from each source row, in tuple order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Integer(usize),
    Text(usize),
}

impl Field {
    pub fn index(self) -> usize {
        match self {
            Field::Integer(i) | Field::Text(i) => i,
        }
    }
}

/// How a single entity is converted: where to read, what to pick, and where
/// to put it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConversionConfig {
    pub name: String,
    pub input: PathBuf,
    pub output: PathBuf,
    pub table: String,
    pub columns: Vec<String>,
    pub fields: Vec<Field>,
}

impl ConversionConfig {
    /// Hierarchical layout shared by cities, districts and villages: the
    /// parent code in column 0, the entity code in column 2, its name in
    /// column 3.
    fn child(name: &str, file: &str, table: &str, parent_column: &str) -> Self {
        ConversionConfig {
            name: name.to_owned(),
            input: PathBuf::from(format!("{}.csv", file)),
            output: PathBuf::from(format!("{}.sql", file)),
            table: table.to_owned(),
            columns: vec!["id".into(), parent_column.into(), "name".into()],
            fields: vec![Field::Integer(2), Field::Integer(0), Field::Text(3)],
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.table.is_empty() {
            return Err(Error::Config(format!("{}: empty table name", self.name)));
        }
        if self.fields.is_empty() {
            return Err(Error::Config(format!("{}: no fields configured", self.name)));
        }
        if self.fields.len() != self.columns.len() {
            return Err(Error::Config(format!(
                "{}: {} fields but {} columns",
                self.name,
                self.fields.len(),
                self.columns.len()
            )));
        }
        Ok(())
    }
}

pub static DEFAULT_ENTITIES: Lazy<Vec<ConversionConfig>> = Lazy::new(|| {
    vec![
        ConversionConfig {
            name: "province".into(),
            input: "provinsi.csv".into(),
            output: "provinsi.sql".into(),
            table: "provinces".into(),
            columns: vec!["id".into(), "name".into()],
            fields: vec![Field::Integer(0), Field::Text(1)],
        },
        ConversionConfig::child("city", "kabupaten-kota", "cities", "province_id"),
        ConversionConfig::child("district", "kecamatan", "districts", "city_id"),
        ConversionConfig::child("village", "kelurahan-desa", "villages", "district_id"),
    ]
});

#[derive(Debug, Deserialize)]
struct ConfigFile {
    entities: Vec<ConversionConfig>,
}

pub fn load_config(path: impl AsRef<Path>) -> Result<Vec<ConversionConfig>, Error> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_config(&text)
}

pub fn parse_config(text: &str) -> Result<Vec<ConversionConfig>, Error> {
    let file: ConfigFile = serde_json::from_str(text)?;
    for entity in &file.entities {
        entity.validate()?;
    }
    Ok(file.entities)
}

/// Restricts `entities` to those named in `only`, keeping their original
/// order. An empty `only` selects everything.
pub fn select<'a>(
    entities: &'a [ConversionConfig],
    only: &[String],
) -> Result<Vec<&'a ConversionConfig>, Error> {
    if let Some(unknown) = only
        .iter()
        .find(|name| !entities.iter().any(|e| &e.name == *name))
    {
        return Err(Error::Config(format!("unknown entity {:?}", unknown)));
    }
    Ok(entities
        .iter()
        .filter(|e| only.is_empty() || only.contains(&e.name))
        .collect())
}
