use crate::dates::PartialDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Topography code reserved for "unknown primary site"; never accepted as input.
pub const UNKNOWN_PRIMARY_SITE: &str = "C809";

/// Raw tumor abstract as supplied by a registry.
///
/// Every field is kept as text because that is how abstracts arrive; blank or
/// malformed month/day values are treated as unknown rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TumorInput {
    pub primary_site: String,
    pub histology: String,
    pub behavior: String,
    pub laterality: String,
    pub dx_year: String,
    pub dx_month: String,
    pub dx_day: String,
}

impl TumorInput {
    pub fn new(primary_site: &str, histology: &str, behavior: &str, dx_year: &str) -> Self {
        Self {
            primary_site: primary_site.to_string(),
            histology: histology.to_string(),
            behavior: behavior.to_string(),
            dx_year: dx_year.to_string(),
            ..Self::default()
        }
    }

    pub fn with_laterality(mut self, laterality: &str) -> Self {
        self.laterality = laterality.to_string();
        self
    }

    pub fn with_dx_date(mut self, year: &str, month: &str, day: &str) -> Self {
        self.dx_year = year.to_string();
        self.dx_month = month.to_string();
        self.dx_day = day.to_string();
        self
    }

    pub fn dx_date(&self) -> PartialDate {
        PartialDate::from_parts(&self.dx_year, &self.dx_month, &self.dx_day)
    }

    pub fn is_valid(&self, current_year: i32) -> bool {
        self.validate(current_year).is_ok()
    }

    /// Checks site, histology, behavior and year, producing the typed view
    /// that rules operate on.
    pub fn validate(&self, current_year: i32) -> Result<Tumor, InvalidField> {
        let primary_site = self.primary_site.clone();
        let site_code = parse_site(&primary_site).ok_or(InvalidField::PrimarySite)?;

        let histology_code = parse_histology(&self.histology).ok_or(InvalidField::Histology)?;

        let behavior = Behavior::from_code(self.behavior.trim()).ok_or(InvalidField::Behavior)?;

        let dx_date = self.dx_date();
        match dx_date.year() {
            Some(year) if (0..=current_year).contains(&year) => {}
            _ => return Err(InvalidField::DiagnosisYear),
        }

        Ok(Tumor {
            primary_site,
            site_code,
            histology: histology_code,
            behavior,
            laterality: Laterality::from_code(self.laterality.trim()),
            dx_date,
        })
    }
}

fn parse_site(site: &str) -> Option<i32> {
    let digits = site.strip_prefix('C')?;
    if digits.len() != 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if site == UNKNOWN_PRIMARY_SITE {
        return None;
    }
    digits.parse().ok()
}

fn parse_histology(histology: &str) -> Option<i32> {
    if histology.len() != 4 || !histology.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    histology
        .parse::<i32>()
        .ok()
        .filter(|code| (8000..=9999).contains(code))
}

/// Field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidField {
    PrimarySite,
    Histology,
    Behavior,
    DiagnosisYear,
}

impl InvalidField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PrimarySite => "primary site (C000-C999 excluding C809)",
            Self::Histology => "histology (8000-9999)",
            Self::Behavior => "behavior (0, 1, 2, 3 or 6)",
            Self::DiagnosisYear => "diagnosis year (not later than the current year)",
        }
    }
}

impl fmt::Display for InvalidField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Validated tumor, built only through [`TumorInput::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tumor {
    pub primary_site: String,
    pub site_code: i32,
    pub histology: i32,
    pub behavior: Behavior,
    pub laterality: Laterality,
    pub dx_date: PartialDate,
}

impl Tumor {
    /// Histology/behavior pair in ICD-O notation, e.g. `8140/3`.
    pub fn icd_code(&self) -> String {
        format!("{}/{}", self.histology, self.behavior.code())
    }

    pub fn histology_code(&self) -> String {
        self.histology.to_string()
    }

    pub fn is_in_situ(&self) -> bool {
        self.behavior == Behavior::InSitu
    }

    pub fn is_malignant(&self) -> bool {
        self.behavior == Behavior::Malignant
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    Benign,
    Borderline,
    InSitu,
    Malignant,
    MetastaticUncertain,
}

impl Behavior {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(Self::Benign),
            "1" => Some(Self::Borderline),
            "2" => Some(Self::InSitu),
            "3" => Some(Self::Malignant),
            "6" => Some(Self::MetastaticUncertain),
            _ => None,
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Benign => "0",
            Self::Borderline => "1",
            Self::InSitu => "2",
            Self::Malignant => "3",
            Self::MetastaticUncertain => "6",
        }
    }
}

/// Laterality vocabulary for paired organs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Laterality {
    NotPaired,
    Right,
    Left,
    OneSideUnspecified,
    Bilateral,
    Midline,
    PairedNoInformation,
    Unknown,
}

impl Laterality {
    pub fn from_code(code: &str) -> Self {
        match code {
            "0" => Self::NotPaired,
            "1" => Self::Right,
            "2" => Self::Left,
            "3" => Self::OneSideUnspecified,
            "4" => Self::Bilateral,
            "5" => Self::Midline,
            "9" => Self::PairedNoInformation,
            _ => Self::Unknown,
        }
    }

    pub const fn is_known_side(self) -> bool {
        matches!(self, Self::Right | Self::Left)
    }
}

/// Final classification of a tumor pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryResult {
    SinglePrimary,
    MultiplePrimaries,
    Questionable,
    InvalidInput,
    DifferentGroups,
}

impl PrimaryResult {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SinglePrimary => "Single Primary",
            Self::MultiplePrimaries => "Multiple Primaries",
            Self::Questionable => "Questionable",
            Self::InvalidInput => "Invalid Input",
            Self::DifferentGroups => "Different Groups",
        }
    }
}

/// Identifies one side of the pair in messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TumorSide {
    First,
    Second,
}

impl TumorSide {
    pub const fn label(self) -> &'static str {
        match self {
            Self::First => "first tumor",
            Self::Second => "second tumor",
        }
    }
}
