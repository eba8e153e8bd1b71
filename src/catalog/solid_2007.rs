//! Site-specific solid tumor rules for diagnoses 2007 through 2017.

use super::{
    BRAIN_SITES, HEAD_AND_NECK_SITES, HEMATOPOIETIC, INVASIVE, SPECIFIC_EXCLUDED, URINARY_SITES,
};
use crate::domain::{Behavior, PrimaryResult};
use crate::matching::RangeError;
use crate::rules::{shared, GroupFilter, Rule, RuleGroup};

const YEARS: &str = "2007-2017";
const FOURTH_CHARACTER_SITES: &str = "C210-C218,C400-C419,C440-C449,C470-C479,C490-C499";

pub(super) fn groups() -> Result<Vec<RuleGroup>, RangeError> {
    let specific = vec![
        head_and_neck()?,
        colon()?,
        lung()?,
        melanoma()?,
        breast()?,
        kidney()?,
        urinary()?,
        malignant_brain()?,
        benign_brain()?,
    ];
    let precedence = specific.iter().map(|group| group.filter().clone()).collect();

    let mut groups = specific;
    groups.push(other_sites()?.deferring_to(precedence));
    Ok(groups)
}

fn site_filter(sites: &str) -> Result<GroupFilter, RangeError> {
    GroupFilter::new(sites, None, Some(SPECIFIC_EXCLUDED), INVASIVE, YEARS)
}

fn single_fallback(step: &'static str) -> Rule {
    Rule::always(step, PrimaryResult::SinglePrimary)
        .question("Does the pair not meet any of the above criteria?")
        .reason("Tumors that do not meet any of the above criteria are a single primary.")
}

fn head_and_neck() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::opposite_sides("M3", PrimaryResult::MultiplePrimaries).reason(
            "Tumors on both the right side and the left side of a paired site are multiple primaries.",
        ),
        shared::site_category_pair("M4", &[0, 3], &[1, 4], PrimaryResult::MultiplePrimaries)
            .question("Is there a tumor on the upper lip and a tumor on the lower lip?")
            .reason("Tumors on the upper lip (C000 or C003) and the lower lip (C001 or C004) are multiple primaries."),
        shared::site_category_pair("M5", &[30], &[31], PrimaryResult::MultiplePrimaries)
            .question("Is there a tumor on the upper gum and a tumor on the lower gum?")
            .reason("Tumors on the upper gum (C030) and the lower gum (C031) are multiple primaries."),
        shared::site_category_pair("M6", &[300], &[301], PrimaryResult::MultiplePrimaries)
            .question("Is there a tumor in the nasal cavity and a tumor in the middle ear?")
            .reason("Tumors in the nasal cavity (C300) and the middle ear (C301) are multiple primaries."),
        shared::site_differs_at_second_or_third("M7").reason(
            "Tumors in sites with topography codes that differ at the second and/or third character are multiple primaries.",
        ),
        shared::years_apart("M8", 5)
            .reason("Tumors diagnosed more than five (5) years apart are multiple primaries."),
        shared::invasive_after_in_situ("M9", 60).reason(
            "An invasive tumor following an in situ tumor more than 60 days after diagnosis is a multiple primary.",
        ),
        shared::histology_differs_at_first_three("M10").reason(
            "Tumors with histology codes that are different at the first, second or third number are multiple primaries.",
        ),
    ];

    Ok(RuleGroup::new(
        "head_and_neck_2007",
        "Head and Neck 2007",
        site_filter(HEAD_AND_NECK_SITES)?,
        rules,
        single_fallback("M11"),
    ))
}

fn colon() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::both_in("M3", None, "8220-8221", PrimaryResult::SinglePrimary)?
            .question("Is this adenocarcinoma in adenomatous polyposis coli (familial polyposis)?")
            .reason("Adenocarcinoma in adenomatous polyposis coli with one or more malignant polyps is a single primary."),
        shared::site_differs("M4").reason(
            "Tumors in sites with topography codes that are different at the second, third or fourth character are multiple primaries.",
        ),
        shared::years_apart("M5", 1)
            .reason("Tumors diagnosed more than one (1) year apart are multiple primaries."),
        shared::invasive_after_in_situ("M6", 60).reason(
            "An invasive tumor following an in situ tumor more than 60 days after diagnosis is a multiple primary.",
        ),
        shared::histology_differs_at_first_three("M7").reason(
            "Tumors with histology codes that are different at the first, second or third number are multiple primaries.",
        ),
    ];

    Ok(RuleGroup::new(
        "colon_2007",
        "Colon 2007",
        site_filter("C180-C189")?,
        rules,
        single_fallback("M8"),
    ))
}

fn lung() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::category_pair(
            "M4",
            "8046",
            "8041-8045",
            PrimaryResult::MultiplePrimaries,
        )?
        .question("Is there a non-small cell carcinoma and a small cell carcinoma?")
        .reason("Non-small cell carcinoma (8046) and small cell carcinoma (8041-8045) are multiple primaries."),
        shared::histology_differs_at_first_three("M5").reason(
            "Tumors with histology codes that are different at the first, second or third number are multiple primaries.",
        ),
        shared::years_apart("M6", 3)
            .reason("Tumors diagnosed more than three (3) years apart are multiple primaries."),
        shared::invasive_after_in_situ("M7", 60).reason(
            "An invasive tumor following an in situ tumor more than 60 days after diagnosis is a multiple primary.",
        ),
        shared::opposite_sides("M8", PrimaryResult::MultiplePrimaries)
            .question("Is there a single tumor in each lung?")
            .reason("A single tumor in each lung is multiple primaries."),
    ];

    Ok(RuleGroup::new(
        "lung_2007",
        "Lung 2007",
        site_filter("C340-C349")?,
        rules,
        single_fallback("M9"),
    ))
}

fn melanoma() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::site_differs("M3").reason(
            "Melanomas in sites that are different at the second, third or fourth character are multiple primaries.",
        ),
        shared::opposite_sides("M4", PrimaryResult::MultiplePrimaries)
            .reason("Melanomas with different laterality are multiple primaries."),
        shared::histology_differs_at_first_three("M5").reason(
            "Melanomas with histology codes that are different at the first, second or third number are multiple primaries.",
        ),
        shared::invasive_after_in_situ("M6", 60).reason(
            "An invasive melanoma that follows an in situ melanoma more than 60 days after diagnosis is a multiple primary.",
        ),
        shared::days_apart("M7", 60)
            .reason("Melanomas diagnosed more than 60 days apart are multiple primaries."),
    ];

    Ok(RuleGroup::new(
        "melanoma_2007",
        "Cutaneous Melanoma 2007",
        GroupFilter::new("C440-C449", Some("8720-8780"), None, INVASIVE, YEARS)?,
        rules,
        single_fallback("M8"),
    ))
}

fn breast() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::opposite_sides("M4", PrimaryResult::MultiplePrimaries)
            .reason("Tumors on both sides (right and left breast) are multiple primaries."),
        shared::years_apart("M5", 5)
            .reason("Tumors diagnosed more than five (5) years apart are multiple primaries."),
        shared::invasive_after_in_situ("M6", 60).reason(
            "An invasive tumor following an in situ tumor more than 60 days after diagnosis is a multiple primary.",
        ),
        shared::category_pair("M7", "8520", "8500-8508", PrimaryResult::SinglePrimary)?
            .question("Is there a lobular carcinoma and an intraductal or duct carcinoma?")
            .reason("Tumors that are lobular (8520) and intraductal or duct (8500-8508) are a single primary."),
        shared::histology_differs_at_first_three("M8").reason(
            "Tumors with histology codes that are different at the first, second or third number are multiple primaries.",
        ),
    ];

    Ok(RuleGroup::new(
        "breast_2007",
        "Breast 2007",
        site_filter("C500-C509")?,
        rules,
        single_fallback("M9"),
    ))
}

fn kidney() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::both_in("M3", None, "8960", PrimaryResult::SinglePrimary)?
            .question("Are both tumors Wilms tumors?")
            .reason("Wilms tumors are a single primary."),
        shared::opposite_sides("M4", PrimaryResult::MultiplePrimaries).reason(
            "Tumors in both the right kidney and the left kidney are multiple primaries.",
        ),
        shared::years_apart("M5", 3)
            .reason("Tumors diagnosed more than three (3) years apart are multiple primaries."),
        shared::invasive_after_in_situ("M6", 60).reason(
            "An invasive tumor following an in situ tumor more than 60 days after diagnosis is a multiple primary.",
        ),
        shared::category_pair(
            "M7",
            "8312",
            "8260,8310,8316-8320,8510",
            PrimaryResult::SinglePrimary,
        )?
        .question("Is one tumor renal cell carcinoma, NOS and the other a specific renal cell type?")
        .reason("Renal cell carcinoma, NOS (8312) and a specific renal cell type are a single primary."),
        shared::histology_differs_at_first_three("M8").reason(
            "Tumors with histology codes that are different at the first, second or third number are multiple primaries.",
        ),
    ];

    Ok(RuleGroup::new(
        "kidney_2007",
        "Kidney 2007",
        site_filter("C649")?,
        rules,
        single_fallback("M9"),
    ))
}

fn urinary() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::opposite_sides("M3", PrimaryResult::MultiplePrimaries).reason(
            "Tumors in both the right and the left renal pelvis or ureter are multiple primaries.",
        ),
        shared::years_apart("M4", 3)
            .reason("Tumors diagnosed more than three (3) years apart are multiple primaries."),
        shared::invasive_after_in_situ("M5", 60).reason(
            "An invasive tumor following an in situ tumor more than 60 days after diagnosis is a multiple primary.",
        ),
        shared::both_in("M6", None, "8120-8131", PrimaryResult::SinglePrimary)?
            .question("Are there urothelial carcinomas in multiple urinary organs?")
            .reason("Urothelial carcinomas in multiple urinary organs are a single primary."),
        shared::histology_differs_at_first_three("M7").reason(
            "Tumors with histology codes that are different at the first, second or third number are multiple primaries.",
        ),
        shared::site_differs_at_second_or_third("M8").reason(
            "Tumors in sites with topography codes that differ at the second and/or third character are multiple primaries.",
        ),
    ];

    Ok(RuleGroup::new(
        "urinary_2007",
        "Urinary 2007",
        site_filter(URINARY_SITES)?,
        rules,
        single_fallback("M9"),
    ))
}

fn malignant_brain() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::site_differs_at_second_or_third("M4").reason(
            "Tumors in sites with topography codes that differ at the second and/or third character are multiple primaries.",
        ),
        shared::follows("M5", "9440", "9380-9460", PrimaryResult::SinglePrimary)?
            .question("Is there a glioblastoma following a glial tumor?")
            .reason("A glioblastoma (9440) following a glial tumor is a single primary."),
        shared::histology_differs_at_first_three("M6").reason(
            "Tumors with histology codes that are different at the first, second or third number are multiple primaries.",
        ),
    ];

    Ok(RuleGroup::new(
        "malignant_brain_2007",
        "Malignant Brain 2007",
        GroupFilter::new(
            BRAIN_SITES,
            None,
            Some(SPECIFIC_EXCLUDED),
            &[Behavior::Malignant],
            YEARS,
        )?,
        rules,
        single_fallback("M7"),
    ))
}

fn benign_brain() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::site_differs("M3").reason(
            "Tumors in sites with topography codes that are different at the second, third or fourth character are multiple primaries.",
        ),
        shared::opposite_sides("M4", PrimaryResult::MultiplePrimaries).reason(
            "Tumors on both the right side and the left side of a paired site are multiple primaries.",
        ),
        shared::histology_differs_at_first_three("M5").reason(
            "Tumors with histology codes that are different at the first, second or third number are multiple primaries.",
        ),
    ];

    Ok(RuleGroup::new(
        "benign_brain_2007",
        "Benign Brain 2007",
        GroupFilter::new(
            BRAIN_SITES,
            None,
            Some(SPECIFIC_EXCLUDED),
            &[Behavior::Benign, Behavior::Borderline],
            YEARS,
        )?,
        rules,
        single_fallback("M6"),
    ))
}

fn other_sites() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::both_in("M2", Some("C619"), "8140", PrimaryResult::SinglePrimary)?
            .question("Are both tumors adenocarcinoma of the prostate?")
            .reason("Adenocarcinoma of the prostate is always a single primary."),
        shared::both_in("M3", None, "9510-9514", PrimaryResult::SinglePrimary)?
            .question("Are both tumors retinoblastoma?")
            .reason("Retinoblastoma is always a single primary (unilateral or bilateral)."),
        shared::both_in("M4", None, "9140", PrimaryResult::SinglePrimary)?
            .question("Are both tumors Kaposi sarcoma?")
            .reason("Kaposi sarcoma (any site or sites) is always a single primary."),
        shared::both_in_within_days("M5", "C739", "8330-8340,8050,8260", 60)?
            .question("Are there follicular and papillary tumors in the thyroid diagnosed within 60 days?")
            .reason("Follicular and papillary tumors in the thyroid within 60 days of diagnosis are a single primary."),
        shared::both_in_within_days("M6", "C569", "8000-8799", 60)?
            .question("Are there bilateral epithelial tumors of the ovary diagnosed within 60 days?")
            .reason("Bilateral epithelial tumors (8000-8799) of the ovary within 60 days are a single primary."),
        shared::opposite_sides("M7", PrimaryResult::MultiplePrimaries).reason(
            "Tumors on both sides (right and left) of a paired site are multiple primaries.",
        ),
        shared::years_apart("M8", 1)
            .reason("Tumors diagnosed more than one (1) year apart are multiple primaries."),
        shared::site_differs_at_second_or_third("M9").reason(
            "Tumors in sites with topography codes that differ at the second and/or third character are multiple primaries.",
        ),
        shared::site_differs_only_at_fourth_within("M10", FOURTH_CHARACTER_SITES)?
            .reason("Tumors that differ only at the fourth character in anus, bone, skin, peripheral nerves or connective tissue are multiple primaries."),
        shared::invasive_after_in_situ("M11", 60).reason(
            "An invasive tumor following an in situ tumor more than 60 days after diagnosis is a multiple primary.",
        ),
        shared::category_pair("M12", "8000", "8001-9989", PrimaryResult::SinglePrimary)?
        .question("Is one tumor cancer/malignant neoplasm, NOS and the other a specific histology?")
        .reason("Cancer/malignant neoplasm, NOS (8000) and a more specific histology are a single primary."),
        shared::histology_differs_at_first_three("M13").reason(
            "Tumors with histology codes that are different at the first, second or third number are multiple primaries.",
        ),
    ];

    Ok(RuleGroup::new(
        "other_sites_2007",
        "Other Sites 2007",
        GroupFilter::new("C000-C999", None, Some(HEMATOPOIETIC), INVASIVE, YEARS)?,
        rules,
        single_fallback("M14"),
    ))
}
