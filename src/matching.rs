//! Code ranges, category membership and laterality checks shared by groups and rules.

use crate::domain::Laterality;
use serde::Serialize;

/// Inclusive numeric range of site or histology codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CodeRange {
    pub min: i32,
    pub max: i32,
}

impl CodeRange {
    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Parsed range expression such as `C180-C189,C199,C209` or `8000-8799`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ranges(Vec<CodeRange>);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("range expression '{expression}' contains an empty token")]
    EmptyToken { expression: String },
    #[error("invalid code '{token}' in range expression '{expression}'")]
    InvalidCode { expression: String, token: String },
    #[error("range '{token}' has a lower bound above its upper bound")]
    Inverted { token: String },
}

impl Ranges {
    /// Parses comma separated values and hyphenated ranges. Site tokens carry a
    /// leading `C` that is stripped before the number is read.
    pub fn parse(expression: &str, is_site: bool) -> Result<Self, RangeError> {
        let mut ranges = Vec::new();

        for token in expression.split(',').map(str::trim) {
            if token.is_empty() {
                return Err(RangeError::EmptyToken {
                    expression: expression.to_string(),
                });
            }

            let parse_bound = |raw: &str| {
                parse_code(raw.trim(), is_site).ok_or_else(|| RangeError::InvalidCode {
                    expression: expression.to_string(),
                    token: token.to_string(),
                })
            };

            let range = match token.split_once('-') {
                Some((low, high)) => CodeRange {
                    min: parse_bound(low)?,
                    max: parse_bound(high)?,
                },
                None => {
                    let value = parse_bound(token)?;
                    CodeRange {
                        min: value,
                        max: value,
                    }
                }
            };

            if range.min > range.max {
                return Err(RangeError::Inverted {
                    token: token.to_string(),
                });
            }
            ranges.push(range);
        }

        Ok(Self(ranges))
    }

    pub fn from_pairs(pairs: &[(i32, i32)]) -> Self {
        Self(
            pairs
                .iter()
                .map(|&(min, max)| CodeRange { min, max })
                .collect(),
        )
    }

    /// True if the value falls in any range; a missing value never matches.
    pub fn contains(&self, value: Option<i32>) -> bool {
        match value {
            Some(value) => self.0.iter().any(|range| range.contains(value)),
            None => false,
        }
    }

    pub fn contains_site(&self, site: &str) -> bool {
        self.contains(parse_code(site.trim(), true))
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.contains(parse_code(code.trim(), false))
    }

    /// Every individual code covered by the expression, in expression order.
    pub fn expand(&self) -> Vec<i32> {
        self.0
            .iter()
            .flat_map(|range| range.min..=range.max)
            .collect()
    }

    pub fn ranges(&self) -> &[CodeRange] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn parse_code(raw: &str, is_site: bool) -> Option<i32> {
    let digits = if is_site {
        raw.strip_prefix('C').or_else(|| raw.strip_prefix('c'))?
    } else {
        raw
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Expands a range expression into the site codes it covers (`C180`, `C181`, ...).
pub fn expand_sites(expression: &str) -> Result<Vec<String>, RangeError> {
    Ok(Ranges::parse(expression, true)?
        .expand()
        .into_iter()
        .map(|code| format!("C{code:03}"))
        .collect())
}

/// True iff one value belongs to `x` and the other to `y`, in either order.
pub fn different_category<T: PartialEq>(a: &T, b: &T, x: &[T], y: &[T]) -> bool {
    (x.contains(a) && y.contains(b)) || (y.contains(a) && x.contains(b))
}

/// Range-based counterpart of [`different_category`].
pub fn different_range_category(a: i32, b: i32, x: &Ranges, y: &Ranges) -> bool {
    (x.contains(Some(a)) && y.contains(Some(b))) || (y.contains(Some(a)) && x.contains(Some(b)))
}

/// Sites differ at the second or third character (`C18x` vs `C20x`).
pub fn sites_differ_at_second_or_third(site1: &str, site2: &str) -> bool {
    site1.get(1..3) != site2.get(1..3)
}

/// Sites share the first three characters but differ at the fourth.
pub fn sites_differ_only_at_fourth(site1: &str, site2: &str) -> bool {
    !sites_differ_at_second_or_third(site1, site2) && site1.get(3..4) != site2.get(3..4)
}

/// Histology codes differ within their first three digits (`814x` vs `850x`).
pub fn histologies_differ_at_first_three(histology1: i32, histology2: i32) -> bool {
    histology1 / 10 != histology2 / 10
}

/// Sites for which laterality is collected (C079-C081, C090-C099, C300, ...).
const PAIRED_SITES: &[(i32, i32)] = &[
    (79, 81),
    (90, 99),
    (300, 300),
    (310, 310),
    (312, 312),
    (340, 349),
    (384, 384),
    (400, 403),
    (413, 414),
    (441, 447),
    (471, 472),
    (491, 492),
    (500, 509),
    (569, 570),
    (620, 631),
    (649, 649),
    (659, 659),
    (669, 669),
    (690, 700),
    (710, 714),
    (722, 725),
    (740, 749),
    (754, 754),
];

/// Whether laterality is meaningful for the site.
pub fn is_paired_site(site: &str) -> bool {
    Ranges::from_pairs(PAIRED_SITES).contains_site(site)
}

pub fn are_opposite_sides(lat1: Laterality, lat2: Laterality) -> bool {
    matches!(
        (lat1, lat2),
        (Laterality::Right, Laterality::Left) | (Laterality::Left, Laterality::Right)
    )
}

pub fn are_same_side(lat1: Laterality, lat2: Laterality) -> bool {
    matches!(
        (lat1, lat2),
        (Laterality::Right, Laterality::Right) | (Laterality::Left, Laterality::Left)
    )
}

/// Both tumors carry a definite side (right or left).
pub fn valid_paired_site_laterality(lat1: Laterality, lat2: Laterality) -> bool {
    lat1.is_known_side() && lat2.is_known_side()
}

/// Outcome of comparing the sides of two tumors on a paired site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SideComparison {
    SameSide,
    OppositeSides,
    InsufficientInformation,
}

pub fn compare_sides(lat1: Laterality, lat2: Laterality) -> SideComparison {
    if !valid_paired_site_laterality(lat1, lat2) {
        SideComparison::InsufficientInformation
    } else if are_opposite_sides(lat1, lat2) {
        SideComparison::OppositeSides
    } else {
        SideComparison::SameSide
    }
}
