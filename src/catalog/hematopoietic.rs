//! Lymphoma and leukemia groups, one per era of hematopoietic rules.

use super::HEMATOPOIETIC;
use crate::domain::{Behavior, PrimaryResult};
use crate::matching::RangeError;
use crate::rules::{shared, GroupFilter, Outcome, Rule, RuleGroup, Verdict};

pub(super) fn groups() -> Result<Vec<RuleGroup>, RangeError> {
    Ok(vec![
        hematopoietic_1998()?,
        hematopoietic_2001()?,
        hematopoietic_2010()?,
    ])
}

fn filter(years: &str) -> Result<GroupFilter, RangeError> {
    GroupFilter::new(
        "C000-C999",
        Some(HEMATOPOIETIC),
        None,
        &[Behavior::Malignant],
        years,
    )
}

fn hematopoietic_1998() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::same_histology("M1").reason(
            "Identical histologies are a single primary based on the SEER 1998 multiple primary rules for lymphoma and leukemia.",
        ),
        Rule::when("M2", PrimaryResult::SinglePrimary, |ctx| {
            ctx.tables
                .hematopoietic_1998
                .contains(ctx.first.histology, ctx.second.histology)
        })
        .question("Are the histologies listed as the same disease in the 1998 hematopoietic table?")
        .reason(
            "Histologies listed as the same disease are a single primary based on the SEER 1998 multiple primary rules for lymphoma and leukemia.",
        ),
    ];

    Ok(RuleGroup::new(
        "hematopoietic_1998",
        "Hematopoietic 1998",
        filter("0000-2000")?,
        rules,
        Rule::always("M3", PrimaryResult::MultiplePrimaries)
            .question("Are the histologies different and not listed as the same disease?")
            .reason(
                "Histologies not listed as the same disease are multiple primaries based on the SEER 1998 multiple primary rules for lymphoma and leukemia.",
            ),
    ))
}

fn hematopoietic_2001() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::same_histology("M1").reason(
            "Identical histologies are a single primary based on the 2001 hematopoietic primaries table.",
        ),
        Rule::when("M2", PrimaryResult::SinglePrimary, |ctx| {
            ctx.tables
                .hematopoietic_2001
                .contains(ctx.first.histology, ctx.second.histology)
        })
        .question("Is the pair of histologies listed in the 2001 hematopoietic primaries table?")
        .reason("The histology pair is a single primary based on the 2001 hematopoietic primaries table.")
        .note("The table lists a disease and the diseases it may transform into."),
    ];

    Ok(RuleGroup::new(
        "hematopoietic_2001",
        "Hematopoietic 2001",
        filter("2001-2009")?,
        rules,
        Rule::always("M3", PrimaryResult::MultiplePrimaries)
            .question("Is the pair of histologies absent from the 2001 hematopoietic primaries table?")
            .reason("The histology pair is multiple primaries based on the 2001 hematopoietic primaries table."),
    ))
}

fn hematopoietic_2010() -> Result<RuleGroup, RangeError> {
    let rules = vec![
        shared::same_histology("M1")
            .reason("Neoplasms with the same histology are a single primary."),
        Rule::custom("M2", PrimaryResult::SinglePrimary, |ctx| {
            match ctx
                .tables
                .hematopoietic_2010
                .shared_group(ctx.first.histology, ctx.second.histology)
            {
                Some(group) => Verdict::Final(Outcome::with_message(
                    PrimaryResult::SinglePrimary,
                    format!("Both histologies belong to the {group} group."),
                )),
                None => Verdict::NotFired,
            }
        })
        .question("Do both histologies belong to one same-primary group of the hematopoietic database?")
        .reason("Neoplasms listed as the same primary in the hematopoietic database are a single primary.")
        .example("Chronic lymphocytic leukemia (9823) and small lymphocytic lymphoma (9670)."),
    ];

    Ok(RuleGroup::new(
        "hematopoietic_2010",
        "Hematopoietic 2010+",
        filter("2010-9999")?,
        rules,
        Rule::always("M3", PrimaryResult::MultiplePrimaries)
            .question("Are the neoplasms listed as different primaries in the hematopoietic database?")
            .reason("Neoplasms not listed as the same primary are multiple primaries."),
    ))
}
