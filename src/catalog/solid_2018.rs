//! Solid tumor rules for diagnoses from 2018 on. Most site groups defer
//! histology questions to the site tables in [`crate::resources::tables`].

use super::{
    BRAIN_SITES, HEAD_AND_NECK_SITES, HEMATOPOIETIC, INVASIVE, SPECIFIC_EXCLUDED, URINARY_SITES,
};
use crate::domain::{Behavior, PrimaryResult};
use crate::matching::RangeError;
use crate::resources::SiteTable;
use crate::rules::{shared, GroupFilter, Rule, RuleGroup};

const YEARS: &str = "2018-9999";
const FOURTH_CHARACTER_SITES: &str = "C210-C218,C400-C419,C440-C449,C470-C479,C490-C499";

pub(super) fn groups() -> Result<Vec<RuleGroup>, RangeError> {
    let specific = vec![
        head_and_neck()?,
        colon()?,
        lung()?,
        breast()?,
        kidney()?,
        urinary()?,
        malignant_cns()?,
        non_malignant_cns()?,
        cutaneous_melanoma()?,
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
        .question("Does this not meet any of the above criteria?")
        .reason("Abstract a single primary when the tumors do not meet any of the above criteria.")
}

fn different_rows(step: &'static str, table: SiteTable) -> Rule {
    shared::different_rows(step, table, PrimaryResult::MultiplePrimaries)
        .reason("Abstract multiple primaries when separate/non-contiguous tumors are on different rows in the site histology table.")
}

fn head_and_neck() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::opposite_sides("M3", PrimaryResult::MultiplePrimaries).reason(
            "Abstract multiple primaries when separate/non-contiguous tumors are on both the right side and the left side of a paired site.",
        ),
        shared::site_category_pair("M4", &[0, 3], &[1, 4], PrimaryResult::MultiplePrimaries)
            .question("Are there separate tumors on the upper lip and the lower lip?")
            .reason("Abstract multiple primaries when separate/non-contiguous tumors are on the upper lip (C000 or C003) and the lower lip (C001 or C004)."),
        shared::site_category_pair("M5", &[30], &[31], PrimaryResult::MultiplePrimaries)
            .question("Are there separate tumors on the upper gum and the lower gum?")
            .reason("Abstract multiple primaries when separate/non-contiguous tumors are on the upper gum (C030) and the lower gum (C031)."),
        shared::site_category_pair("M6", &[300], &[301], PrimaryResult::MultiplePrimaries)
            .question("Are there separate tumors in the nasal cavity and the middle ear?")
            .reason("Abstract multiple primaries when separate/non-contiguous tumors are in the nasal cavity (C300) and the middle ear (C301)."),
        shared::site_differs_at_second_or_third("M7").reason(
            "Abstract multiple primaries when separate/non-contiguous tumors are in topographic sites with ICD-O site codes that differ at the second and/or third character.",
        ),
        different_rows("M8", SiteTable::HeadAndNeck),
        shared::years_apart("M9", 5).reason(
            "Abstract multiple primaries when the patient has a subsequent tumor after being clinically disease-free for greater than five years.",
        ),
        shared::invasive_after_in_situ("M10", 60).reason(
            "Abstract multiple primaries when an invasive tumor occurs more than 60 days after an in situ tumor.",
        ),
    ];

    Ok(RuleGroup::new(
        "head_and_neck_2018",
        "Head and Neck 2018",
        site_filter(HEAD_AND_NECK_SITES)?,
        rules,
        single_fallback("M11"),
    ))
}

fn colon() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        Rule::placeholder(
            "M3",
            PrimaryResult::SinglePrimary,
            "anastomosis and prior resection are not recorded in the tumor abstract",
        )
        .question("Is there a tumor in the anastomosis following a resection of the primary tumor?")
        .reason("Abstract a single primary when a tumor recurs in the anastomosis of a previously resected primary.")
        .note("The criteria depend on surgical history and cannot be derived from site, histology, behavior, laterality or date."),
        shared::site_differs_at_second_or_third("M4")
            .reason("Abstract multiple primaries when separate/non-contiguous tumors are in sites with topography codes that differ at the second and/or third character.")
            .example("A tumor in the cecum (C180) and a tumor in the rectum (C209)."),
        different_rows("M5", SiteTable::Colon),
        shared::years_apart("M6", 1).reason(
            "Abstract multiple primaries when the patient has a subsequent tumor after being clinically disease-free for greater than one year.",
        ),
        shared::invasive_after_in_situ("M7", 60).reason(
            "Abstract multiple primaries when an invasive tumor occurs more than 60 days after an in situ tumor.",
        ),
        shared::different_subtypes("M8", SiteTable::Colon).reason(
            "Abstract multiple primaries when separate/non-contiguous tumors are two or more different subtypes/variants in the colon histology table.",
        ),
    ];

    Ok(RuleGroup::new(
        "colon_2018",
        "Colon and Rectum 2018",
        site_filter("C180-C189,C199,C209")?,
        rules,
        single_fallback("M9"),
    ))
}

fn lung() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::opposite_sides("M3", PrimaryResult::MultiplePrimaries)
            .question("Is there a single tumor in each lung?")
            .reason("Abstract multiple primaries when there is a single tumor in each lung."),
        shared::category_pair(
            "M4",
            "8046",
            "8041-8045",
            PrimaryResult::MultiplePrimaries,
        )?
        .question("Is at least one tumor non-small cell carcinoma and another small cell carcinoma?")
        .reason("Abstract multiple primaries when at least one tumor is non-small cell carcinoma (8046) and another tumor is small cell carcinoma (8041-8045)."),
        different_rows("M5", SiteTable::Lung),
        shared::years_apart("M6", 3).reason(
            "Abstract multiple primaries when tumors are diagnosed more than three years apart.",
        ),
        shared::invasive_after_in_situ("M7", 60).reason(
            "Abstract multiple primaries when an invasive tumor occurs more than 60 days after an in situ tumor.",
        ),
        shared::different_subtypes("M8", SiteTable::Lung).reason(
            "Abstract multiple primaries when separate/non-contiguous tumors are two or more different subtypes/variants in the lung histology table.",
        ),
    ];

    Ok(RuleGroup::new(
        "lung_2018",
        "Lung 2018",
        site_filter("C340-C349")?,
        rules,
        single_fallback("M9"),
    ))
}

fn breast() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::opposite_sides("M3", PrimaryResult::MultiplePrimaries).reason(
            "Abstract multiple primaries when there are separate/non-contiguous tumors in both the right breast and the left breast.",
        ),
        shared::years_apart("M4", 5).reason(
            "Abstract multiple primaries when the patient has a subsequent tumor after being clinically disease-free for greater than five years.",
        ),
        shared::both_in("M5", None, "8530", PrimaryResult::SinglePrimary)?
            .question("Is there inflammatory carcinoma in one or both breasts?")
            .reason("Abstract a single primary when there is inflammatory carcinoma in one or both breasts."),
        shared::invasive_after_in_situ("M6", 60).reason(
            "Abstract multiple primaries when an invasive tumor occurs more than 60 days after an in situ tumor.",
        ),
        shared::in_situ_with_invasive("M7", 60).reason(
            "Abstract a single primary when an in situ tumor is diagnosed after an invasive tumor, or the two are diagnosed within 60 days.",
        ),
        shared::category_pair("M8", "8520", "8500-8508", PrimaryResult::SinglePrimary)?
            .question("Are both lobular and duct carcinoma present?")
            .reason("Abstract a single primary when both lobular (8520) and intraductal or duct carcinoma are present."),
        shared::category_pair("M9", "8540", "8500-8508", PrimaryResult::SinglePrimary)?
            .question("Is there Paget disease and an underlying duct carcinoma?")
            .reason("Abstract a single primary when there is Paget disease (8540) and an underlying intraductal or duct carcinoma."),
        different_rows("M10", SiteTable::Breast),
    ];

    Ok(RuleGroup::new(
        "breast_2018",
        "Breast 2018",
        site_filter("C500-C509")?,
        rules,
        single_fallback("M11"),
    ))
}

fn kidney() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::both_in("M3", None, "8960", PrimaryResult::SinglePrimary)?
            .question("Are there bilateral nephroblastomas?")
            .reason("Abstract a single primary when there are bilateral nephroblastomas (Wilms tumors)."),
        shared::opposite_sides("M4", PrimaryResult::MultiplePrimaries).reason(
            "Abstract multiple primaries when there are tumors in both the right kidney and the left kidney.",
        ),
        shared::years_apart("M5", 3).reason(
            "Abstract multiple primaries when the patient has a subsequent tumor after being clinically disease-free for greater than three years.",
        ),
        different_rows("M6", SiteTable::Kidney),
        shared::different_subtypes("M7", SiteTable::Kidney).reason(
            "Abstract multiple primaries when separate/non-contiguous tumors are two or more different subtypes/variants in the kidney histology table.",
        ),
    ];

    Ok(RuleGroup::new(
        "kidney_2018",
        "Kidney 2018",
        site_filter("C649")?,
        rules,
        single_fallback("M8"),
    ))
}

fn urinary() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        Rule::when("M3", PrimaryResult::SinglePrimary, |ctx| {
            ctx.both(|tumor| tumor.icd_code() == "8120/2")
        })
        .question("Is there urothelial carcinoma in situ in multiple urinary organs?")
        .reason("Abstract a single primary when there is flat urothelial carcinoma in situ (8120/2) in multiple urinary organs."),
        shared::opposite_sides("M4", PrimaryResult::MultiplePrimaries).reason(
            "Abstract multiple primaries when there are tumors in both the right and the left renal pelvis or ureter.",
        ),
        shared::years_apart("M5", 3).reason(
            "Abstract multiple primaries when the patient has a subsequent tumor after being clinically disease-free for greater than three years.",
        ),
        shared::invasive_after_in_situ("M6", 60).reason(
            "Abstract multiple primaries when an invasive tumor occurs more than 60 days after an in situ tumor.",
        ),
        different_rows("M7", SiteTable::Urinary),
    ];

    Ok(RuleGroup::new(
        "urinary_2018",
        "Urinary Sites 2018",
        site_filter(URINARY_SITES)?,
        rules,
        single_fallback("M8"),
    ))
}

fn malignant_cns() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::follows("M3", "9440", "9380-9460", PrimaryResult::SinglePrimary)?
            .question("Does a glioblastoma follow a glial tumor?")
            .reason("Abstract a single primary when a glioblastoma (9440) follows a glial tumor."),
        different_rows("M4", SiteTable::MalignantCns),
        shared::opposite_sides("M5", PrimaryResult::MultiplePrimaries).reason(
            "Abstract multiple primaries when there are separate/non-contiguous tumors on both the right side and the left side of a paired site.",
        ),
        shared::different_subtypes("M6", SiteTable::MalignantCns).reason(
            "Abstract multiple primaries when separate/non-contiguous tumors are two or more different subtypes/variants in the malignant CNS histology table.",
        ),
    ];

    Ok(RuleGroup::new(
        "malignant_cns_2018",
        "Malignant CNS and Peripheral Nerves 2018",
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

fn non_malignant_cns() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::site_differs("M3").reason(
            "Abstract multiple primaries when separate/non-contiguous tumors are in sites with topography codes that differ at the second, third or fourth character.",
        ),
        shared::opposite_sides("M4", PrimaryResult::MultiplePrimaries).reason(
            "Abstract multiple primaries when separate/non-contiguous tumors are on both the right side and the left side of a paired site.",
        ),
        different_rows("M5", SiteTable::NonMalignantCns),
        shared::different_subtypes("M6", SiteTable::NonMalignantCns).reason(
            "Abstract multiple primaries when separate/non-contiguous tumors are two or more different subtypes/variants in the non-malignant CNS histology table.",
        ),
    ];

    Ok(RuleGroup::new(
        "non_malignant_cns_2018",
        "Non-Malignant CNS 2018",
        GroupFilter::new(
            BRAIN_SITES,
            None,
            Some(SPECIFIC_EXCLUDED),
            &[Behavior::Benign, Behavior::Borderline],
            YEARS,
        )?,
        rules,
        single_fallback("M7"),
    ))
}

fn cutaneous_melanoma() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::site_differs("M3").reason(
            "Abstract multiple primaries when melanomas occur in topographic sites with ICD-O site codes that differ at the second, third or fourth character.",
        ),
        shared::opposite_sides("M4", PrimaryResult::MultiplePrimaries).reason(
            "Abstract multiple primaries when melanomas occur on both the right and the left side of the body.",
        ),
        shared::invasive_after_in_situ("M5", 60).reason(
            "Abstract multiple primaries when an invasive melanoma occurs more than 60 days after an in situ melanoma.",
        ),
        shared::days_apart("M6", 60).reason(
            "Abstract multiple primaries when melanomas are diagnosed more than 60 days apart.",
        ),
    ];

    Ok(RuleGroup::new(
        "cutaneous_melanoma_2018",
        "Cutaneous Melanoma 2018",
        GroupFilter::new("C440-C449", Some("8720-8790"), None, INVASIVE, YEARS)?,
        rules,
        single_fallback("M7"),
    ))
}

fn other_sites() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::both_in("M2", Some("C619"), "8140", PrimaryResult::SinglePrimary)?
            .question("Are both tumors adenocarcinoma of the prostate?")
            .reason("Abstract a single primary for adenocarcinoma of the prostate."),
        shared::both_in("M3", None, "9510-9514", PrimaryResult::SinglePrimary)?
            .question("Are both tumors retinoblastoma?")
            .reason("Abstract a single primary for retinoblastoma, unilateral or bilateral."),
        shared::both_in("M4", None, "9140", PrimaryResult::SinglePrimary)?
            .question("Are both tumors Kaposi sarcoma?")
            .reason("Abstract a single primary for Kaposi sarcoma in any site or sites."),
        shared::both_in_within_days("M5", "C739", "8330-8340,8050,8260", 60)?
            .question("Are there follicular and papillary tumors in the thyroid diagnosed within 60 days?")
            .reason("Abstract a single primary when follicular and papillary tumors of the thyroid are diagnosed within 60 days."),
        shared::both_in_within_days("M6", "C569", "8000-8799", 60)?
            .question("Are there bilateral epithelial tumors of the ovary diagnosed within 60 days?")
            .reason("Abstract a single primary when there are bilateral epithelial tumors (8000-8799) of the ovary within 60 days."),
        shared::opposite_sides("M7", PrimaryResult::MultiplePrimaries).reason(
            "Abstract multiple primaries when there are tumors on both sides (right and left) of a paired site.",
        ),
        shared::site_differs_at_second_or_third("M8").reason(
            "Abstract multiple primaries when separate/non-contiguous tumors are in sites with topography codes that differ at the second and/or third character.",
        ),
        shared::site_differs_only_at_fourth_within("M9", FOURTH_CHARACTER_SITES)?.reason(
            "Abstract multiple primaries when topography codes differ only at the fourth character in anus, bone, skin, peripheral nerves or connective tissue.",
        ),
        shared::years_apart("M10", 1).reason(
            "Abstract multiple primaries when the patient has a subsequent tumor after being clinically disease-free for greater than one year.",
        ),
        shared::invasive_after_in_situ("M11", 60).reason(
            "Abstract multiple primaries when an invasive tumor occurs more than 60 days after an in situ tumor.",
        ),
        shared::category_pair("M12", "8000", "8001-9989", PrimaryResult::SinglePrimary)?
            .question("Is one tumor cancer/malignant neoplasm, NOS and the other a specific histology?")
            .reason("Abstract a single primary when one tumor is cancer/malignant neoplasm, NOS (8000) and the other is a specific histology."),
        shared::histology_differs_at_first_three("M13").reason(
            "Abstract multiple primaries when separate/non-contiguous tumors have histology codes that differ at the first, second or third number.",
        ),
    ];

    Ok(RuleGroup::new(
        "other_sites_2018",
        "Other Sites 2018",
        GroupFilter::new("C000-C999", None, Some(HEMATOPOIETIC), INVASIVE, YEARS)?,
        rules,
        single_fallback("M14"),
    ))
}
