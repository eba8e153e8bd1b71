//! Packaged lookup resources and the loaders that read them.

pub mod csv;
pub mod tables;

pub use self::csv::{parse_csv_line, write_csv_values, CsvError};
pub use tables::{HistologyPairs, HistologyTable, LookupTables, RowMatch, SamePrimaryGroups, SiteTable};

use indexmap::IndexMap;
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Where CSV tables are read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResourceSource {
    /// Tables compiled into the binary.
    #[default]
    Packaged,
    /// A directory holding files with the packaged names, used to override them.
    Directory(PathBuf),
}

impl ResourceSource {
    pub fn read(&self, name: &str) -> Result<Cow<'static, str>, ResourceError> {
        match self {
            ResourceSource::Packaged => packaged(name)
                .map(Cow::Borrowed)
                .ok_or_else(|| ResourceError::Missing {
                    name: name.to_string(),
                }),
            ResourceSource::Directory(dir) => match fs::read_to_string(dir.join(name)) {
                Ok(text) => Ok(Cow::Owned(text)),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Err(ResourceError::Missing {
                    name: name.to_string(),
                }),
                Err(source) => Err(ResourceError::Io {
                    name: name.to_string(),
                    source,
                }),
            },
        }
    }

    /// Data rows of a resource, header excluded.
    pub fn load_rows(&self, name: &str) -> Result<Vec<Vec<String>>, ResourceError> {
        let text = self.read(name)?;
        self::csv::parse_rows(&text).map_err(|source| ResourceError::Malformed {
            name: name.to_string(),
            source,
        })
    }

    /// Data rows grouped by `key_column`, in the order keys first appear.
    pub fn load_grouped_records(
        &self,
        name: &str,
        key_column: usize,
    ) -> Result<IndexMap<String, Vec<Vec<String>>>, ResourceError> {
        let rows = self.load_rows(name)?;
        self::csv::group_rows(rows, key_column).map_err(|source| ResourceError::Malformed {
            name: name.to_string(),
            source,
        })
    }
}

fn packaged(name: &str) -> Option<&'static str> {
    let text = match name {
        "hematopoietic_1998.csv" => include_str!("../../data/hematopoietic_1998.csv"),
        "hematopoietic_2001.csv" => include_str!("../../data/hematopoietic_2001.csv"),
        "hematopoietic_2010.csv" => include_str!("../../data/hematopoietic_2010.csv"),
        "histology_2018_head_and_neck.csv" => {
            include_str!("../../data/histology_2018_head_and_neck.csv")
        }
        "histology_2018_colon.csv" => include_str!("../../data/histology_2018_colon.csv"),
        "histology_2018_lung.csv" => include_str!("../../data/histology_2018_lung.csv"),
        "histology_2018_breast.csv" => include_str!("../../data/histology_2018_breast.csv"),
        "histology_2018_kidney.csv" => include_str!("../../data/histology_2018_kidney.csv"),
        "histology_2018_urinary.csv" => include_str!("../../data/histology_2018_urinary.csv"),
        "histology_2018_malignant_cns.csv" => {
            include_str!("../../data/histology_2018_malignant_cns.csv")
        }
        "histology_2018_non_malignant_cns.csv" => {
            include_str!("../../data/histology_2018_non_malignant_cns.csv")
        }
        _ => return None,
    };
    Some(text)
}

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("resource '{name}' not found")]
    Missing { name: String },
    #[error("failed to read resource '{name}'")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("resource '{name}' is malformed: {source}")]
    Malformed {
        name: String,
        #[source]
        source: CsvError,
    },
    #[error("resource '{name}' data row {row}: {detail}")]
    InvalidValue {
        name: String,
        row: usize,
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packaged_tables_load_with_headers_stripped() {
        let rows = ResourceSource::Packaged
            .load_rows("hematopoietic_1998.csv")
            .expect("packaged table");
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|row| row.len() == 2));
        assert_ne!(rows[0][0], "first");
    }

    #[test]
    fn unknown_packaged_resource_is_missing() {
        let err = ResourceSource::Packaged
            .load_rows("nope.csv")
            .expect_err("no such resource");
        assert!(matches!(err, ResourceError::Missing { ref name } if name == "nope.csv"));
    }

    #[test]
    fn grouped_records_keep_catalog_order() {
        let grouped = ResourceSource::Packaged
            .load_grouped_records("hematopoietic_2010.csv", 0)
            .expect("grouped");
        let first = grouped.keys().next().expect("at least one group");
        assert_eq!(first, "Diffuse large B-cell lymphoma");
        assert_eq!(grouped[first].len(), 5);
    }
}
