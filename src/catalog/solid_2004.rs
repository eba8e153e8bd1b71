//! Solid tumor rules in force before the 2007 site-specific rules.

use super::{BRAIN_SITES, HEMATOPOIETIC};
use crate::domain::{Behavior, PrimaryResult};
use crate::matching::RangeError;
use crate::rules::{shared, GroupFilter, Rule, RuleGroup};

pub(super) fn groups() -> Result<Vec<RuleGroup>, RangeError> {
    Ok(vec![solid_malignant()?, benign_brain()?])
}

fn solid_malignant() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::site_differs_at_second_or_third("M1").reason(
            "Tumors in sites with topography codes that differ at the second or third character are multiple primaries.",
        ),
        shared::opposite_sides("M2", PrimaryResult::MultiplePrimaries)
            .reason("Tumors on opposite sides of a paired organ are multiple primaries.")
            .note("Bilateral ovarian tumors and bilateral retinoblastomas were exceptions in the coding manual."),
        shared::histology_differs_at_first_three("M3").reason(
            "Tumors whose histology codes differ at the first three digits are multiple primaries.",
        ),
        shared::invasive_after_in_situ("M4", 60).reason(
            "An invasive tumor diagnosed more than two months after an in situ tumor is a separate primary.",
        ),
    ];

    Ok(RuleGroup::new(
        "solid_malignant_2004",
        "Solid Malignant 2004",
        GroupFilter::new(
            "C000-C999",
            None,
            Some(HEMATOPOIETIC),
            &[Behavior::InSitu, Behavior::Malignant],
            "0000-2006",
        )?,
        rules,
        Rule::always("M5", PrimaryResult::SinglePrimary)
            .question("Do the tumors share site and histology?")
            .reason("Tumors in the same site with the same histology are a single primary."),
    ))
}

fn benign_brain() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::site_differs_at_second_or_third("M1")
            .reason("Benign brain tumors in different sites are multiple primaries."),
        shared::opposite_sides("M2", PrimaryResult::MultiplePrimaries)
            .reason("Benign tumors on both sides of a paired cranial structure are multiple primaries."),
        shared::histology_differs_at_first_three("M3").reason(
            "Benign brain tumors whose histology codes differ at the first three digits are multiple primaries.",
        ),
    ];

    Ok(RuleGroup::new(
        "benign_brain_2004",
        "Benign Brain 2004",
        GroupFilter::new(
            BRAIN_SITES,
            None,
            Some(HEMATOPOIETIC),
            &[Behavior::Benign, Behavior::Borderline],
            "2004-2006",
        )?,
        rules,
        Rule::always("M4", PrimaryResult::SinglePrimary)
            .question("Does the pair not meet any of the above criteria?")
            .reason("Benign brain tumors that do not meet any of the above criteria are a single primary."),
    ))
}
