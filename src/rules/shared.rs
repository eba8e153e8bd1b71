//! Rule constructors that recur across site groups and eras.
//!
//! Each returns a [`Rule`] with a generic question already attached; catalogs
//! add the era-specific reason, notes and examples.

use super::{Outcome, Rule, RuleContext, Verdict};
use crate::dates::{same_valid_dates, Apart, DateOrder};
use crate::domain::{PrimaryResult, Tumor, TumorSide};
use crate::matching::{
    compare_sides, different_category, different_range_category,
    histologies_differ_at_first_three, is_paired_site, sites_differ_at_second_or_third,
    sites_differ_only_at_fourth, RangeError, Ranges, SideComparison,
};
use crate::resources::{RowMatch, SiteTable};

const UNKNOWN_DATES: &str = "known diagnosis date is required";
const UNKNOWN_LATERALITY: &str = "known laterality is required";

/// Multiple primaries when the diagnoses are more than `years` apart.
pub fn years_apart(step: &'static str, years: u32) -> Rule {
    Rule::custom(step, PrimaryResult::MultiplePrimaries, move |ctx| {
        match ctx.years_apart(years) {
            Apart::Apart => Verdict::decide(PrimaryResult::MultiplePrimaries),
            Apart::Within => Verdict::NotFired,
            Apart::Unknown => ctx.unable(step, UNKNOWN_DATES),
        }
    })
    .question("Are the tumors diagnosed more than the allowed number of years apart?")
}

/// Multiple primaries when the diagnoses are more than `days` apart.
pub fn days_apart(step: &'static str, days: i64) -> Rule {
    Rule::custom(step, PrimaryResult::MultiplePrimaries, move |ctx| {
        match ctx.days_apart(days) {
            Apart::Apart => Verdict::decide(PrimaryResult::MultiplePrimaries),
            Apart::Within => Verdict::NotFired,
            Apart::Unknown => ctx.unable(step, UNKNOWN_DATES),
        }
    })
    .question("Are the tumors diagnosed more than the allowed number of days apart?")
}

fn in_situ_and_invasive(ctx: &RuleContext<'_>) -> Option<InSituSide> {
    if ctx.first.is_in_situ() && ctx.second.is_malignant() {
        Some(InSituSide::First)
    } else if ctx.second.is_in_situ() && ctx.first.is_malignant() {
        Some(InSituSide::Second)
    } else {
        None
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum InSituSide {
    First,
    Second,
}

/// Whether the invasive tumor of an in situ/invasive pair was diagnosed
/// later; `None` when the order cannot be told.
fn invasive_is_later(ctx: &RuleContext<'_>, in_situ: InSituSide) -> Option<bool> {
    if same_valid_dates(&ctx.first.dx_date, &ctx.second.dx_date) {
        return Some(false);
    }
    match ctx.date_order() {
        DateOrder::FirstLater => Some(in_situ == InSituSide::Second),
        DateOrder::SecondLater => Some(in_situ == InSituSide::First),
        DateOrder::Same => Some(false),
        DateOrder::Unknown => None,
    }
}

/// Multiple primaries for an invasive tumor diagnosed more than `days` after
/// an in situ tumor.
pub fn invasive_after_in_situ(step: &'static str, days: i64) -> Rule {
    Rule::custom(step, PrimaryResult::MultiplePrimaries, move |ctx| {
        let Some(in_situ) = in_situ_and_invasive(ctx) else {
            return Verdict::NotFired;
        };
        match (invasive_is_later(ctx, in_situ), ctx.days_apart(days)) {
            (Some(false), _) | (_, Apart::Within) => Verdict::NotFired,
            (Some(true), Apart::Apart) => Verdict::decide(PrimaryResult::MultiplePrimaries),
            (None, _) | (_, Apart::Unknown) => ctx.unable(step, UNKNOWN_DATES),
        }
    })
    .question("Is there an invasive tumor following an in situ tumor more than 60 days after diagnosis?")
}

/// Single primary for an in situ/invasive pair when the in situ tumor came
/// second or the two were diagnosed within `days` of each other.
pub fn in_situ_with_invasive(step: &'static str, days: i64) -> Rule {
    Rule::custom(step, PrimaryResult::SinglePrimary, move |ctx| {
        let Some(in_situ) = in_situ_and_invasive(ctx) else {
            return Verdict::NotFired;
        };
        if invasive_is_later(ctx, in_situ) == Some(false) || ctx.days_apart(days) == Apart::Within {
            Verdict::decide(PrimaryResult::SinglePrimary)
        } else {
            Verdict::NotFired
        }
    })
    .question("Is an in situ tumor diagnosed after, or within 60 days of, an invasive tumor?")
}

pub fn site_differs_at_second_or_third(step: &'static str) -> Rule {
    Rule::when(step, PrimaryResult::MultiplePrimaries, |ctx| {
        sites_differ_at_second_or_third(&ctx.first.primary_site, &ctx.second.primary_site)
    })
    .question("Are there tumors in sites with ICD-O-3 topography codes that are different at the second (Cxxx) and/or third (Cxxx) character?")
}

/// Multiple primaries for topography codes differing at the second, third or
/// fourth character.
pub fn site_differs(step: &'static str) -> Rule {
    Rule::when(step, PrimaryResult::MultiplePrimaries, |ctx| {
        ctx.first.primary_site != ctx.second.primary_site
    })
    .question("Are there tumors in sites with ICD-O-3 topography codes that are different at the second (Cxxx), third (Cxxx) or fourth (Cxxx) character?")
}

/// Multiple primaries for codes differing only at the fourth character, when
/// both sites fall in `sites`.
pub fn site_differs_only_at_fourth_within(
    step: &'static str,
    sites: &str,
) -> Result<Rule, RangeError> {
    let sites = Ranges::parse(sites, true)?;
    Ok(Rule::when(step, PrimaryResult::MultiplePrimaries, move |ctx| {
        ctx.both(|tumor| sites.contains(Some(tumor.site_code)))
            && sites_differ_only_at_fourth(&ctx.first.primary_site, &ctx.second.primary_site)
    })
    .question("Are there tumors with ICD-O-3 topography codes that differ only at the fourth character (Cxxx) in one of the listed sites?"))
}

/// `result` when the tumors are on opposite sides of a paired site. Unknown
/// laterality leaves a tentative questionable outcome.
pub fn opposite_sides(step: &'static str, result: PrimaryResult) -> Rule {
    Rule::custom(step, result, move |ctx| {
        if !ctx.both(|tumor| is_paired_site(&tumor.primary_site)) {
            return Verdict::NotFired;
        }
        match compare_sides(ctx.first.laterality, ctx.second.laterality) {
            SideComparison::OppositeSides => Verdict::decide(result),
            SideComparison::SameSide => Verdict::NotFired,
            SideComparison::InsufficientInformation => ctx.unable(step, UNKNOWN_LATERALITY),
        }
    })
    .question("Are there tumors on both the right side and the left side of a paired site?")
}

pub fn histology_differs_at_first_three(step: &'static str) -> Rule {
    Rule::when(step, PrimaryResult::MultiplePrimaries, |ctx| {
        histologies_differ_at_first_three(ctx.first.histology, ctx.second.histology)
    })
    .question("Do the tumors have ICD-O-3 histology codes that are different at the first (xxxx), second (xxxx), or third (xxxx) number?")
}

pub fn same_histology(step: &'static str) -> Rule {
    Rule::when(step, PrimaryResult::SinglePrimary, |ctx| {
        ctx.first.histology == ctx.second.histology
    })
    .question("Do the tumors have the same four-digit histology code?")
}

/// `result` when one tumor falls in `x` and the other in `y`, in either order.
pub fn category_pair(
    step: &'static str,
    x: &str,
    y: &str,
    result: PrimaryResult,
) -> Result<Rule, RangeError> {
    let (x, y) = (Ranges::parse(x, false)?, Ranges::parse(y, false)?);
    Ok(Rule::when(step, result, move |ctx| {
        different_range_category(ctx.first.histology, ctx.second.histology, &x, &y)
    })
    .question("Is one tumor in the first histology category and the other in the second?"))
}

/// `result` when both tumors match the site (if given) and histology ranges.
pub fn both_in(
    step: &'static str,
    sites: Option<&str>,
    histologies: &str,
    result: PrimaryResult,
) -> Result<Rule, RangeError> {
    let sites = sites.map(|sites| Ranges::parse(sites, true)).transpose()?;
    let histologies = Ranges::parse(histologies, false)?;
    Ok(Rule::when(step, result, move |ctx| {
        ctx.both(|tumor: &Tumor| {
            sites
                .as_ref()
                .map_or(true, |sites| sites.contains(Some(tumor.site_code)))
                && histologies.contains(Some(tumor.histology))
        })
    })
    .question("Do both tumors have the listed site and histology?"))
}

/// Single primary when both tumors match the site and histology ranges and
/// were diagnosed within `days` of each other.
pub fn both_in_within_days(
    step: &'static str,
    sites: &str,
    histologies: &str,
    days: i64,
) -> Result<Rule, RangeError> {
    let sites = Ranges::parse(sites, true)?;
    let histologies = Ranges::parse(histologies, false)?;
    Ok(Rule::custom(step, PrimaryResult::SinglePrimary, move |ctx| {
        let eligible = ctx.both(|tumor| {
            sites.contains(Some(tumor.site_code)) && histologies.contains(Some(tumor.histology))
        });
        if !eligible {
            return Verdict::NotFired;
        }
        match ctx.days_apart(days) {
            Apart::Within => Verdict::decide(PrimaryResult::SinglePrimary),
            Apart::Apart => Verdict::NotFired,
            Apart::Unknown => ctx.unable(step, UNKNOWN_DATES),
        }
    })
    .question("Are both tumors of the listed site and histology, diagnosed within 60 days?"))
}

/// `result` when one site is in `x` and the other in `y`, in either order.
pub fn site_category_pair(
    step: &'static str,
    x: &'static [i32],
    y: &'static [i32],
    result: PrimaryResult,
) -> Rule {
    Rule::when(step, result, move |ctx| {
        different_category(&ctx.first.site_code, &ctx.second.site_code, x, y)
    })
    .question("Is one tumor in the first site category and the other in the second?")
}

/// `result` when a tumor of the `later` histologies was diagnosed after one
/// of the `earlier` histologies.
pub fn follows(
    step: &'static str,
    later: &str,
    earlier: &str,
    result: PrimaryResult,
) -> Result<Rule, RangeError> {
    let (later, earlier) = (Ranges::parse(later, false)?, Ranges::parse(earlier, false)?);
    Ok(Rule::custom(step, result, move |ctx| {
        let (first, second) = (Some(ctx.first.histology), Some(ctx.second.histology));
        let second_follows = earlier.contains(first) && later.contains(second);
        let first_follows = earlier.contains(second) && later.contains(first);
        if !(second_follows || first_follows) {
            return Verdict::NotFired;
        }
        if second_follows && first_follows {
            return Verdict::decide(result);
        }
        match ctx.date_order() {
            DateOrder::SecondLater if second_follows => Verdict::decide(result),
            DateOrder::FirstLater if first_follows => Verdict::decide(result),
            DateOrder::Unknown => ctx.unable(step, UNKNOWN_DATES),
            _ => Verdict::NotFired,
        }
    })
    .question("Was a tumor of the later histology diagnosed after a tumor of the earlier one?"))
}

fn not_classified(ctx: &RuleContext<'_>, step: &'static str, table: SiteTable) -> Verdict {
    ctx.unable(
        step,
        &format!("histologies must be listed in the {table:?} histology table"),
    )
}

fn unlisted(ctx: &RuleContext<'_>, step: &'static str, side: TumorSide, table: &str) -> Verdict {
    Verdict::Tentative(Outcome::with_message(
        PrimaryResult::Questionable,
        format!(
            "Unable to apply Rule {step} of {}: histology of the {} is not classified in {table}.",
            ctx.group_name,
            side.label()
        ),
    ))
}

/// Final `result` when both histologies sit on the same row of `table`.
pub fn same_row(step: &'static str, table: SiteTable, result: PrimaryResult) -> Rule {
    Rule::custom(step, result, move |ctx| {
        let Some(histology_table) = ctx.site_table(table) else {
            return not_classified(ctx, step, table);
        };
        match histology_table.compare_rows(ctx.first, ctx.second) {
            RowMatch::SameRow => Verdict::decide(result),
            RowMatch::DifferentRows => Verdict::NotFired,
            RowMatch::NotClassified { side } => unlisted(ctx, step, side, histology_table.name()),
        }
    })
    .question("Are the histologies on the same row of the site histology table?")
}

/// Final `result` when the histologies sit on different rows of `table`.
pub fn different_rows(step: &'static str, table: SiteTable, result: PrimaryResult) -> Rule {
    Rule::custom(step, result, move |ctx| {
        let Some(histology_table) = ctx.site_table(table) else {
            return not_classified(ctx, step, table);
        };
        match histology_table.compare_rows(ctx.first, ctx.second) {
            RowMatch::DifferentRows => Verdict::decide(result),
            RowMatch::SameRow => Verdict::NotFired,
            RowMatch::NotClassified { side } => unlisted(ctx, step, side, histology_table.name()),
        }
    })
    .question("Are the histologies on different rows of the site histology table?")
}

/// Multiple primaries for two different subtypes/variants of one table.
pub fn different_subtypes(step: &'static str, table: SiteTable) -> Rule {
    Rule::when(step, PrimaryResult::MultiplePrimaries, move |ctx| {
        ctx.site_table(table)
            .is_some_and(|histology_table| histology_table.different_subtypes(ctx.first, ctx.second))
    })
    .question("Are the tumors two or more different subtypes/variants in the site histology table?")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::test_support::{context, tables, tumor};
    use crate::domain::TumorInput;

    #[test]
    fn opposite_sides_decides_or_asks_for_laterality() {
        let tables = tables();
        let rule = opposite_sides("M4", PrimaryResult::MultiplePrimaries);

        let right = tumor(TumorInput::new("C504", "8500", "3", "2019").with_laterality("1"));
        let left = tumor(TumorInput::new("C502", "8500", "3", "2019").with_laterality("2"));
        assert_eq!(
            rule.apply(&context(&right, &left, &tables)),
            Verdict::decide(PrimaryResult::MultiplePrimaries)
        );
        assert_eq!(rule.apply(&context(&right, &right, &tables)), Verdict::NotFired);

        let unknown = tumor(TumorInput::new("C504", "8500", "3", "2019").with_laterality("9"));
        assert!(matches!(
            rule.apply(&context(&right, &unknown, &tables)),
            Verdict::Tentative(Outcome {
                result: PrimaryResult::Questionable,
                ..
            })
        ));

        let colon = tumor(TumorInput::new("C180", "8140", "3", "2019"));
        assert_eq!(rule.apply(&context(&colon, &colon, &tables)), Verdict::NotFired);
    }

    #[test]
    fn invasive_after_in_situ_needs_ordering_and_gap() {
        let tables = tables();
        let rule = invasive_after_in_situ("M6", 60);

        let in_situ = tumor(TumorInput::new("C504", "8500", "2", "2019").with_dx_date("2019", "1", "10"));
        let late = tumor(TumorInput::new("C504", "8500", "3", "2019").with_dx_date("2019", "6", "1"));
        let soon = tumor(TumorInput::new("C504", "8500", "3", "2019").with_dx_date("2019", "2", "1"));
        let undated = tumor(TumorInput::new("C504", "8500", "3", "2019"));

        assert_eq!(
            rule.apply(&context(&in_situ, &late, &tables)),
            Verdict::decide(PrimaryResult::MultiplePrimaries)
        );
        assert_eq!(
            rule.apply(&context(&late, &in_situ, &tables)),
            Verdict::decide(PrimaryResult::MultiplePrimaries)
        );
        assert_eq!(rule.apply(&context(&in_situ, &soon, &tables)), Verdict::NotFired);
        let same_month = tumor(TumorInput::new("C504", "8500", "2", "2019").with_dx_date("2019", "6", ""));
        assert_eq!(rule.apply(&context(&same_month, &late, &tables)), Verdict::NotFired);
        let earlier_month = tumor(TumorInput::new("C504", "8500", "2", "2019").with_dx_date("2019", "1", ""));
        assert_eq!(
            rule.apply(&context(&earlier_month, &late, &tables)),
            Verdict::decide(PrimaryResult::MultiplePrimaries)
        );
        assert_eq!(rule.apply(&context(&late, &late, &tables)), Verdict::NotFired);
        assert!(matches!(
            rule.apply(&context(&in_situ, &undated, &tables)),
            Verdict::Tentative(_)
        ));
    }

    #[test]
    fn years_apart_is_three_valued() {
        let tables = tables();
        let rule = years_apart("M5", 3);
        let early = tumor(TumorInput::new("C340", "8140", "3", "2012"));
        let late = tumor(TumorInput::new("C340", "8140", "3", "2019"));
        let near = tumor(TumorInput::new("C340", "8140", "3", "2013"));
        let boundary = tumor(TumorInput::new("C340", "8140", "3", "2015"));

        assert_eq!(
            rule.apply(&context(&early, &late, &tables)),
            Verdict::decide(PrimaryResult::MultiplePrimaries)
        );
        assert_eq!(rule.apply(&context(&early, &near, &tables)), Verdict::NotFired);
        assert!(matches!(
            rule.apply(&context(&early, &boundary, &tables)),
            Verdict::Tentative(_)
        ));
    }

    #[test]
    fn row_rules_report_unclassified_histology() {
        let tables = tables();
        let same = same_row("M11", SiteTable::Lung, PrimaryResult::SinglePrimary);
        let different = different_rows("M5", SiteTable::Lung, PrimaryResult::MultiplePrimaries);

        let adeno = tumor(TumorInput::new("C341", "8140", "3", "2019"));
        let acinar = tumor(TumorInput::new("C342", "8551", "3", "2019"));
        let squamous = tumor(TumorInput::new("C343", "8070", "3", "2019"));
        let sarcoma = tumor(TumorInput::new("C343", "8800", "3", "2019"));

        assert_eq!(
            same.apply(&context(&adeno, &acinar, &tables)),
            Verdict::decide(PrimaryResult::SinglePrimary)
        );
        assert_eq!(
            different.apply(&context(&adeno, &squamous, &tables)),
            Verdict::decide(PrimaryResult::MultiplePrimaries)
        );
        let Verdict::Tentative(outcome) = different.apply(&context(&adeno, &sarcoma, &tables)) else {
            panic!("expected tentative verdict");
        };
        let message = outcome.message.expect("message");
        assert!(message.contains("second tumor"));
        assert!(message.contains("histology_2018_lung.csv"));

        let subtypes = different_subtypes("M8", SiteTable::Lung);
        let papillary = tumor(TumorInput::new("C341", "8260", "3", "2019"));
        assert_eq!(
            subtypes.apply(&context(&acinar, &papillary, &tables)),
            Verdict::decide(PrimaryResult::MultiplePrimaries)
        );
        assert_eq!(subtypes.apply(&context(&adeno, &papillary, &tables)), Verdict::NotFired);
    }

    #[test]
    fn category_pair_matches_in_either_order() {
        let tables = tables();
        let rule = category_pair("M4", "8046", "8041-8045", PrimaryResult::MultiplePrimaries)
            .expect("valid ranges");
        let non_small = tumor(TumorInput::new("C341", "8046", "3", "2019"));
        let small = tumor(TumorInput::new("C341", "8041", "3", "2019"));

        assert_eq!(
            rule.apply(&context(&non_small, &small, &tables)),
            Verdict::decide(PrimaryResult::MultiplePrimaries)
        );
        assert_eq!(
            rule.apply(&context(&small, &non_small, &tables)),
            Verdict::decide(PrimaryResult::MultiplePrimaries)
        );
        assert_eq!(rule.apply(&context(&small, &small, &tables)), Verdict::NotFired);
    }

    #[test]
    fn follows_depends_on_diagnosis_order() {
        let tables = tables();
        let rule = follows("M5", "9440", "9380-9460", PrimaryResult::SinglePrimary)
            .expect("valid ranges");
        let glioma = tumor(TumorInput::new("C710", "9400", "3", "2015").with_dx_date("2015", "3", ""));
        let glioblastoma = tumor(TumorInput::new("C711", "9440", "3", "2017"));
        let undated = tumor(TumorInput::new("C711", "9440", "3", "2015"));

        assert_eq!(
            rule.apply(&context(&glioma, &glioblastoma, &tables)),
            Verdict::decide(PrimaryResult::SinglePrimary)
        );
        assert_eq!(
            rule.apply(&context(&glioblastoma, &glioma, &tables)),
            Verdict::decide(PrimaryResult::SinglePrimary)
        );
        assert!(matches!(
            rule.apply(&context(&glioma, &undated, &tables)),
            Verdict::Tentative(_)
        ));

        let second_glioblastoma =
            tumor(TumorInput::new("C710", "9440", "3", "2017").with_dx_date("2017", "5", "10"));
        assert_eq!(
            rule.apply(&context(&undated, &second_glioblastoma, &tables)),
            Verdict::decide(PrimaryResult::SinglePrimary)
        );
        assert_eq!(
            rule.apply(&context(&second_glioblastoma, &second_glioblastoma, &tables)),
            Verdict::decide(PrimaryResult::SinglePrimary)
        );

        let lips = site_category_pair("M4", &[0, 3], &[1, 4], PrimaryResult::MultiplePrimaries);
        let upper = tumor(TumorInput::new("C000", "8070", "3", "2015"));
        let lower = tumor(TumorInput::new("C004", "8070", "3", "2015"));
        assert_eq!(
            lips.apply(&context(&lower, &upper, &tables)),
            Verdict::decide(PrimaryResult::MultiplePrimaries)
        );
        assert_eq!(lips.apply(&context(&upper, &upper, &tables)), Verdict::NotFired);
    }

    #[test]
    fn malformed_range_expressions_are_rejected() {
        assert!(both_in("M2", Some("C61X"), "8140", PrimaryResult::SinglePrimary).is_err());
        assert!(category_pair("M4", "8046", "", PrimaryResult::MultiplePrimaries).is_err());
    }
}
