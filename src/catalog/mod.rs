//! Rule group catalog and the resolver that assigns a tumor pair to a group.

mod hematopoietic;
mod solid_2004;
mod solid_2007;
mod solid_2018;

use crate::domain::{Behavior, InvalidField, Tumor, TumorInput, TumorSide};
use crate::matching::RangeError;
use crate::rules::RuleGroup;
use tracing::debug;

const HEMATOPOIETIC: &str = "9590-9993";
const SPECIFIC_EXCLUDED: &str = "9140,9590-9993";
const BRAIN_SITES: &str = "C700-C729,C751-C753";
const HEAD_AND_NECK_SITES: &str = "C000-C148,C300-C329";
const URINARY_SITES: &str = "C659,C669,C670-C679,C680-C689";
const INVASIVE: &[Behavior] = &[Behavior::InSitu, Behavior::Malignant];

/// Group assignment for a pair of abstracts.
#[derive(Debug)]
pub enum Resolution<'c> {
    Group {
        group: &'c RuleGroup,
        first: Tumor,
        second: Tumor,
    },
    /// The tumors fall in different groups; `None` means no group claims it.
    DifferentGroups {
        first: Option<&'c RuleGroup>,
        second: Option<&'c RuleGroup>,
    },
    InvalidInput {
        side: TumorSide,
        field: InvalidField,
    },
}

/// Ordered rule groups of every era.
#[derive(Debug)]
pub struct Catalog {
    groups: Vec<RuleGroup>,
}

impl Catalog {
    pub fn standard() -> Result<Self, RangeError> {
        let mut groups = hematopoietic::groups()?;
        groups.extend(solid_2004::groups()?);
        groups.extend(solid_2007::groups()?);
        groups.extend(solid_2018::groups()?);
        Ok(Self { groups })
    }

    pub fn from_groups(groups: Vec<RuleGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[RuleGroup] {
        &self.groups
    }

    pub fn group(&self, id: &str) -> Option<&RuleGroup> {
        self.groups.iter().find(|group| group.id() == id)
    }

    /// First group, in catalog order, that claims the tumor for `year`.
    pub fn find_group(&self, tumor: &Tumor, year: i32) -> Option<&RuleGroup> {
        self.groups.iter().find(|group| {
            group.is_applicable(&tumor.primary_site, tumor.histology, tumor.behavior, year)
        })
    }

    /// Validates both abstracts and finds the one group claiming both.
    ///
    /// Both tumors are looked up with the later of the two diagnosis years so
    /// that a pair spanning an era boundary is judged by the newer rules.
    pub fn resolve(
        &self,
        first: &TumorInput,
        second: &TumorInput,
        current_year: i32,
    ) -> Resolution<'_> {
        let first = match first.validate(current_year) {
            Ok(tumor) => tumor,
            Err(field) => {
                return Resolution::InvalidInput {
                    side: TumorSide::First,
                    field,
                }
            }
        };
        let second = match second.validate(current_year) {
            Ok(tumor) => tumor,
            Err(field) => {
                return Resolution::InvalidInput {
                    side: TumorSide::Second,
                    field,
                }
            }
        };

        // validate() guarantees a year on both tumors
        let year = first
            .dx_date
            .year()
            .max(second.dx_date.year())
            .unwrap_or(current_year);

        let first_group = self.find_group(&first, year);
        let second_group = self.find_group(&second, year);
        debug!(
            year,
            first = first_group.map(RuleGroup::id),
            second = second_group.map(RuleGroup::id),
            "resolved rule groups"
        );

        match (first_group, second_group) {
            (Some(group), Some(other)) if group.id() == other.id() => Resolution::Group {
                group,
                first,
                second,
            },
            (first, second) => Resolution::DifferentGroups { first, second },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::standard().expect("standard catalog builds")
    }

    fn group_id(resolution: &Resolution<'_>) -> Option<&'static str> {
        match resolution {
            Resolution::Group { group, .. } => Some(group.id()),
            _ => None,
        }
    }

    #[test]
    fn group_ids_are_unique() {
        let catalog = catalog();
        let mut ids: Vec<_> = catalog.groups().iter().map(RuleGroup::id).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn at_most_one_group_claims_any_tumor() {
        let catalog = catalog();
        let sites = ["C000", "C021", "C180", "C199", "C209", "C341", "C440", "C504", "C619", "C649", "C659", "C710", "C739", "C751", "C809"];
        let histologies = [8000, 8070, 8140, 8500, 8720, 9140, 9440, 9530, 9680, 9823];
        let behaviors = [
            Behavior::Benign,
            Behavior::Borderline,
            Behavior::InSitu,
            Behavior::Malignant,
        ];

        for site in sites {
            for histology in histologies {
                for behavior in behaviors {
                    for year in [1999, 2005, 2012, 2020] {
                        let claiming = catalog
                            .groups()
                            .iter()
                            .filter(|group| group.is_applicable(site, histology, behavior, year))
                            .count();
                        assert!(
                            claiming <= 1,
                            "{site} {histology} {behavior:?} {year} claimed by {claiming} groups"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn generic_groups_yield_to_specific_ones() {
        let catalog = catalog();
        let other = catalog.group("other_sites_2018").expect("other sites");
        assert!(other.is_generic());
        assert!(!other.is_applicable("C341", 8140, Behavior::Malignant, 2020));
        assert!(other.is_applicable("C619", 8140, Behavior::Malignant, 2020));
        assert!(other.is_applicable("C441", 8070, Behavior::Malignant, 2020));
        assert!(!other.is_applicable("C441", 8720, Behavior::Malignant, 2020));
    }

    #[test]
    fn resolve_uses_later_diagnosis_year() {
        let catalog = catalog();
        let early = TumorInput::new("C341", "8140", "3", "2016");
        let late = TumorInput::new("C342", "8140", "3", "2019");
        assert_eq!(
            group_id(&catalog.resolve(&early, &late, 2024)),
            Some("lung_2018")
        );
        assert_eq!(
            group_id(&catalog.resolve(&early, &early, 2024)),
            Some("lung_2007")
        );
    }

    #[test]
    fn resolve_reports_invalid_and_mismatched_pairs() {
        let catalog = catalog();
        let lung = TumorInput::new("C341", "8140", "3", "2019");
        let breast = TumorInput::new("C504", "8500", "3", "2019");
        let invalid = TumorInput::new("C504", "99999", "3", "2019");

        assert!(matches!(
            catalog.resolve(&lung, &invalid, 2024),
            Resolution::InvalidInput {
                side: TumorSide::Second,
                field: InvalidField::Histology
            }
        ));
        match catalog.resolve(&lung, &breast, 2024) {
            Resolution::DifferentGroups { first, second } => {
                assert_eq!(first.map(RuleGroup::id), Some("lung_2018"));
                assert_eq!(second.map(RuleGroup::id), Some("breast_2018"));
            }
            other => panic!("expected different groups, got {other:?}"),
        }

        let benign_skin = TumorInput::new("C441", "8070", "0", "2019");
        assert!(matches!(
            catalog.resolve(&benign_skin, &benign_skin, 2024),
            Resolution::DifferentGroups {
                first: None,
                second: None
            }
        ));
    }
}
