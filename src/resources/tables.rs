//! Immutable histology tables built once from packaged CSV resources.

use super::{ResourceError, ResourceSource};
use crate::domain::{Tumor, TumorSide};
use crate::matching::{different_range_category, Ranges};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::info;

static PACKAGED: OnceLock<Arc<LookupTables>> = OnceLock::new();

/// Symmetric list of histology range pairs that denote the same disease.
#[derive(Debug, Clone, Default)]
pub struct HistologyPairs {
    pairs: Vec<(Ranges, Ranges)>,
}

impl HistologyPairs {
    fn from_rows(name: &str, rows: Vec<Vec<String>>) -> Result<Self, ResourceError> {
        let pairs = rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let parse = |expression: &str| {
                    Ranges::parse(expression, false).map_err(|err| ResourceError::InvalidValue {
                        name: name.to_string(),
                        row: index + 1,
                        detail: err.to_string(),
                    })
                };
                Ok((
                    parse(column(name, index + 1, row, 0)?)?,
                    parse(column(name, index + 1, row, 1)?)?,
                ))
            })
            .collect::<Result<Vec<_>, ResourceError>>()?;

        Ok(Self { pairs })
    }

    /// True if some pair holds one histology on each side, in either order.
    pub fn contains(&self, histology1: i32, histology2: i32) -> bool {
        self.pairs
            .iter()
            .any(|(x, y)| different_range_category(histology1, histology2, x, y))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Named groups of histologies considered one primary.
#[derive(Debug, Clone, Default)]
pub struct SamePrimaryGroups {
    groups: IndexMap<String, Vec<i32>>,
}

impl SamePrimaryGroups {
    fn from_grouped(
        name: &str,
        grouped: IndexMap<String, Vec<Vec<String>>>,
    ) -> Result<Self, ResourceError> {
        let mut groups = IndexMap::with_capacity(grouped.len());
        let mut row = 0;
        for (group, records) in grouped {
            let mut codes = Vec::with_capacity(records.len());
            for record in records {
                row += 1;
                let code = column(name, row, &record, 1)?.trim();
                let value = code.parse::<i32>().map_err(|_| ResourceError::InvalidValue {
                    name: name.to_string(),
                    row,
                    detail: format!("histology '{code}' is not numeric"),
                })?;
                codes.push(value);
            }
            groups.insert(group, codes);
        }
        Ok(Self { groups })
    }

    pub fn group_of(&self, histology: i32) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, codes)| codes.contains(&histology))
            .map(|(group, _)| group.as_str())
    }

    /// First group listing both histologies.
    pub fn shared_group(&self, histology1: i32, histology2: i32) -> Option<&str> {
        self.groups
            .iter()
            .find(|(_, codes)| codes.contains(&histology1) && codes.contains(&histology2))
            .map(|(group, _)| group.as_str())
    }

    pub fn same_group(&self, histology1: i32, histology2: i32) -> bool {
        self.shared_group(histology1, histology2).is_some()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TableEntry {
    row: String,
    subtype: Option<String>,
}

/// Outcome of placing two tumors on a histology table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowMatch {
    SameRow,
    DifferentRows,
    /// The named tumor's histology is absent from the table.
    NotClassified { side: TumorSide },
}

/// Per-site table mapping a histology (or histology/behavior) code to its row
/// and, for specific terms, a subtype within that row.
#[derive(Debug, Clone, Default)]
pub struct HistologyTable {
    name: String,
    entries: HashMap<String, TableEntry>,
}

impl HistologyTable {
    fn from_rows(name: &str, rows: Vec<Vec<String>>) -> Result<Self, ResourceError> {
        let mut entries = HashMap::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            let invalid = |detail: String| ResourceError::InvalidValue {
                name: name.to_string(),
                row: index + 1,
                detail,
            };

            let code = column(name, index + 1, &row, 2)?.trim().to_string();
            if !is_table_code(&code) {
                return Err(invalid(format!("'{code}' is not a histology code")));
            }
            let entry = TableEntry {
                row: column(name, index + 1, &row, 0)?.trim().to_string(),
                subtype: Some(column(name, index + 1, &row, 1)?.trim())
                    .filter(|subtype| !subtype.is_empty())
                    .map(str::to_string),
            };
            if entry.row.is_empty() {
                return Err(invalid(format!("code '{code}' has no row")));
            }
            if entries.insert(code.clone(), entry).is_some() {
                return Err(invalid(format!("code '{code}' is listed twice")));
            }
        }

        Ok(Self {
            name: name.to_string(),
            entries,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn entry(&self, histology: &str, icd_code: &str) -> Option<&TableEntry> {
        self.entries
            .get(icd_code)
            .or_else(|| self.entries.get(histology))
    }

    /// Row for a histology, preferring an exact histology/behavior match.
    pub fn row_of(&self, histology: &str, icd_code: &str) -> Option<&str> {
        self.entry(histology, icd_code).map(|entry| entry.row.as_str())
    }

    pub fn subtype_of(&self, histology: &str, icd_code: &str) -> Option<&str> {
        self.entry(histology, icd_code)
            .and_then(|entry| entry.subtype.as_deref())
    }

    fn row_for(&self, tumor: &Tumor) -> Option<&str> {
        self.row_of(&tumor.histology_code(), &tumor.icd_code())
    }

    fn subtype_for(&self, tumor: &Tumor) -> Option<&str> {
        self.subtype_of(&tumor.histology_code(), &tumor.icd_code())
    }

    pub fn compare_rows(&self, first: &Tumor, second: &Tumor) -> RowMatch {
        match (self.row_for(first), self.row_for(second)) {
            (None, _) => RowMatch::NotClassified {
                side: TumorSide::First,
            },
            (_, None) => RowMatch::NotClassified {
                side: TumorSide::Second,
            },
            (Some(row1), Some(row2)) if row1 == row2 => RowMatch::SameRow,
            _ => RowMatch::DifferentRows,
        }
    }

    /// Both tumors carry a known subtype and the subtypes differ.
    pub fn different_subtypes(&self, first: &Tumor, second: &Tumor) -> bool {
        matches!(
            (self.subtype_for(first), self.subtype_for(second)),
            (Some(subtype1), Some(subtype2)) if subtype1 != subtype2
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn column<'a>(
    name: &str,
    row: usize,
    record: &'a [String],
    index: usize,
) -> Result<&'a str, ResourceError> {
    record
        .get(index)
        .map(String::as_str)
        .ok_or_else(|| ResourceError::InvalidValue {
            name: name.to_string(),
            row,
            detail: format!("expected at least {} columns", index + 1),
        })
}

fn is_table_code(code: &str) -> bool {
    let (histology, behavior) = match code.split_once('/') {
        Some((histology, behavior)) => (histology, Some(behavior)),
        None => (code, None),
    };
    let digits = |text: &str, len: usize| text.len() == len && text.bytes().all(|b| b.is_ascii_digit());
    digits(histology, 4) && behavior.map_or(true, |behavior| digits(behavior, 1))
}

/// Site-specific histology tables of the 2018 solid tumor rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteTable {
    HeadAndNeck,
    Colon,
    Lung,
    Breast,
    Kidney,
    Urinary,
    MalignantCns,
    NonMalignantCns,
}

impl SiteTable {
    pub const ALL: [SiteTable; 8] = [
        SiteTable::HeadAndNeck,
        SiteTable::Colon,
        SiteTable::Lung,
        SiteTable::Breast,
        SiteTable::Kidney,
        SiteTable::Urinary,
        SiteTable::MalignantCns,
        SiteTable::NonMalignantCns,
    ];

    pub const fn resource(self) -> &'static str {
        match self {
            SiteTable::HeadAndNeck => "histology_2018_head_and_neck.csv",
            SiteTable::Colon => "histology_2018_colon.csv",
            SiteTable::Lung => "histology_2018_lung.csv",
            SiteTable::Breast => "histology_2018_breast.csv",
            SiteTable::Kidney => "histology_2018_kidney.csv",
            SiteTable::Urinary => "histology_2018_urinary.csv",
            SiteTable::MalignantCns => "histology_2018_malignant_cns.csv",
            SiteTable::NonMalignantCns => "histology_2018_non_malignant_cns.csv",
        }
    }
}

/// Every table the rule catalogs consult, loaded together.
#[derive(Debug, Clone, Default)]
pub struct LookupTables {
    pub hematopoietic_1998: HistologyPairs,
    pub hematopoietic_2001: HistologyPairs,
    pub hematopoietic_2010: SamePrimaryGroups,
    site_tables: HashMap<SiteTable, HistologyTable>,
}

impl LookupTables {
    pub fn load(source: &ResourceSource) -> Result<Self, ResourceError> {
        let hematopoietic_1998 = HistologyPairs::from_rows(
            "hematopoietic_1998.csv",
            source.load_rows("hematopoietic_1998.csv")?,
        )?;
        let hematopoietic_2001 = HistologyPairs::from_rows(
            "hematopoietic_2001.csv",
            source.load_rows("hematopoietic_2001.csv")?,
        )?;
        let hematopoietic_2010 = SamePrimaryGroups::from_grouped(
            "hematopoietic_2010.csv",
            source.load_grouped_records("hematopoietic_2010.csv", 0)?,
        )?;

        let mut site_tables = HashMap::with_capacity(SiteTable::ALL.len());
        for table in SiteTable::ALL {
            let name = table.resource();
            site_tables.insert(table, HistologyTable::from_rows(name, source.load_rows(name)?)?);
        }

        let tables = Self {
            hematopoietic_1998,
            hematopoietic_2001,
            hematopoietic_2010,
            site_tables,
        };
        info!(
            hematopoietic_1998 = tables.hematopoietic_1998.len(),
            hematopoietic_2001 = tables.hematopoietic_2001.len(),
            hematopoietic_2010 = tables.hematopoietic_2010.len(),
            site_tables = tables.site_tables.len(),
            "lookup tables loaded"
        );
        Ok(tables)
    }

    /// Packaged tables, built on first use and shared for the process lifetime.
    ///
    /// Concurrent first callers may each parse the resources, but only one
    /// result is ever stored and every caller receives that one.
    pub fn packaged() -> Result<Arc<LookupTables>, ResourceError> {
        if let Some(tables) = PACKAGED.get() {
            return Ok(Arc::clone(tables));
        }
        let loaded = Arc::new(Self::load(&ResourceSource::Packaged)?);
        Ok(Arc::clone(PACKAGED.get_or_init(|| loaded)))
    }

    /// Table for a 2018 site group; absent only for hand-built fixtures.
    pub fn site(&self, table: SiteTable) -> Option<&HistologyTable> {
        self.site_tables.get(&table)
    }
}
