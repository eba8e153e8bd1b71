//! Documented rule predicates and the verdicts they produce.
//!
//! A rule is plain data: audit text plus a boxed predicate. Catalogs are
//! ordered lists of rules, so adding a rule never means adding a type.

pub mod group;
pub mod shared;

pub use group::{GroupFilter, RuleGroup};

use crate::dates::{compare_dx_date, verify_days_apart, verify_years_apart, Apart, DateOrder};
use crate::domain::{PrimaryResult, Tumor};
use crate::resources::{HistologyTable, LookupTables, SiteTable};
use serde::Serialize;
use std::fmt;

/// Result kind plus an optional message explaining it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub result: PrimaryResult,
    pub message: Option<String>,
}

impl Outcome {
    pub fn new(result: PrimaryResult) -> Self {
        Self {
            result,
            message: None,
        }
    }

    pub fn with_message(result: PrimaryResult, message: impl Into<String>) -> Self {
        Self {
            result,
            message: Some(message.into()),
        }
    }
}

/// What a single rule concluded about a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    NotFired,
    /// The rule's criteria cannot be derived from abstract fields.
    NotComputable { reason: &'static str },
    /// Kept only if no later rule reaches a final verdict.
    Tentative(Outcome),
    /// Stops evaluation.
    Final(Outcome),
}

impl Verdict {
    pub fn decide(result: PrimaryResult) -> Self {
        Self::Final(Outcome::new(result))
    }

    pub fn status(&self) -> RuleStatus {
        match self {
            Verdict::NotFired => RuleStatus::NotFired,
            Verdict::NotComputable { .. } => RuleStatus::NotComputable,
            Verdict::Tentative(_) => RuleStatus::Tentative,
            Verdict::Final(_) => RuleStatus::Final,
        }
    }
}

/// Verdict kind recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    NotFired,
    NotComputable,
    Tentative,
    Final,
}

/// Everything a predicate may consult for one pair.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub group_name: &'a str,
    pub first: &'a Tumor,
    pub second: &'a Tumor,
    pub tables: &'a LookupTables,
    pub current_year: i32,
}

impl<'a> RuleContext<'a> {
    pub fn both(&self, predicate: impl Fn(&Tumor) -> bool) -> bool {
        predicate(self.first) && predicate(self.second)
    }

    pub fn either(&self, predicate: impl Fn(&Tumor) -> bool) -> bool {
        predicate(self.first) || predicate(self.second)
    }

    pub fn date_order(&self) -> DateOrder {
        compare_dx_date(&self.first.dx_date, &self.second.dx_date, self.current_year)
    }

    pub fn years_apart(&self, years: u32) -> Apart {
        verify_years_apart(
            &self.first.dx_date,
            &self.second.dx_date,
            years,
            self.current_year,
        )
    }

    pub fn days_apart(&self, days: i64) -> Apart {
        verify_days_apart(
            &self.first.dx_date,
            &self.second.dx_date,
            days,
            self.current_year,
        )
    }

    pub fn site_table(&self, table: SiteTable) -> Option<&'a HistologyTable> {
        self.tables.site(table)
    }

    /// Tentative questionable outcome naming the information `step` lacks.
    pub fn unable(&self, step: &str, requirement: &str) -> Verdict {
        Verdict::Tentative(Outcome::with_message(
            PrimaryResult::Questionable,
            format!(
                "Unable to apply Rule {step} of {}: {requirement}.",
                self.group_name
            ),
        ))
    }
}

type Predicate = Box<dyn Fn(&RuleContext<'_>) -> Verdict + Send + Sync>;

/// One documented step of a rule group.
pub struct Rule {
    step: &'static str,
    result: PrimaryResult,
    question: &'static str,
    reason: &'static str,
    notes: Vec<&'static str>,
    examples: Vec<&'static str>,
    predicate: Predicate,
}

impl Rule {
    /// Final `result` whenever `condition` holds.
    pub fn when<F>(step: &'static str, result: PrimaryResult, condition: F) -> Self
    where
        F: Fn(&RuleContext<'_>) -> bool + Send + Sync + 'static,
    {
        Self::custom(step, result, move |ctx| {
            if condition(ctx) {
                Verdict::decide(result)
            } else {
                Verdict::NotFired
            }
        })
    }

    /// Predicate that builds its own verdict; `result` documents the answer
    /// the rule gives when its question is answered yes.
    pub fn custom<F>(step: &'static str, result: PrimaryResult, predicate: F) -> Self
    where
        F: Fn(&RuleContext<'_>) -> Verdict + Send + Sync + 'static,
    {
        Self {
            step,
            result,
            question: "",
            reason: "",
            notes: Vec::new(),
            examples: Vec::new(),
            predicate: Box::new(predicate),
        }
    }

    /// Documented rule whose criteria are not encoded in the abstract fields.
    pub fn placeholder(step: &'static str, result: PrimaryResult, missing: &'static str) -> Self {
        Self::custom(step, result, move |_| Verdict::NotComputable { reason: missing })
    }

    /// Terminal rule of a group.
    pub fn always(step: &'static str, result: PrimaryResult) -> Self {
        Self::custom(step, result, move |_| Verdict::decide(result))
    }

    pub fn question(mut self, question: &'static str) -> Self {
        self.question = question;
        self
    }

    pub fn reason(mut self, reason: &'static str) -> Self {
        self.reason = reason;
        self
    }

    pub fn note(mut self, note: &'static str) -> Self {
        self.notes.push(note);
        self
    }

    pub fn example(mut self, example: &'static str) -> Self {
        self.examples.push(example);
        self
    }

    pub fn apply(&self, ctx: &RuleContext<'_>) -> Verdict {
        (self.predicate)(ctx)
    }

    pub fn step(&self) -> &'static str {
        self.step
    }

    pub fn result(&self) -> PrimaryResult {
        self.result
    }

    pub fn question_text(&self) -> &'static str {
        self.question
    }

    /// Reason text, falling back to the question when none was written.
    pub fn reason_text(&self) -> &'static str {
        if self.reason.is_empty() {
            self.question
        } else {
            self.reason
        }
    }

    pub fn notes(&self) -> &[&'static str] {
        &self.notes
    }

    pub fn examples(&self) -> &[&'static str] {
        &self.examples
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("step", &self.step)
            .field("result", &self.result)
            .field("question", &self.question)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::RuleContext;
    use crate::domain::{Tumor, TumorInput};
    use crate::resources::LookupTables;
    use std::sync::Arc;

    pub const YEAR: i32 = 2024;

    pub fn tumor(input: TumorInput) -> Tumor {
        input.validate(YEAR).expect("valid test tumor")
    }

    pub fn tables() -> Arc<LookupTables> {
        LookupTables::packaged().expect("packaged tables")
    }

    pub fn context<'a>(first: &'a Tumor, second: &'a Tumor, tables: &'a LookupTables) -> RuleContext<'a> {
        RuleContext {
            group_name: "Test Group",
            first,
            second,
            tables,
            current_year: YEAR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::{context, tables, tumor};
    use super::*;
    use crate::domain::TumorInput;

    #[test]
    fn when_rules_fire_final_only_on_condition() {
        let tables = tables();
        let first = tumor(TumorInput::new("C340", "8140", "3", "2019"));
        let second = tumor(TumorInput::new("C341", "8070", "3", "2019"));
        let ctx = context(&first, &second, &tables);

        let fires = Rule::when("M1", PrimaryResult::MultiplePrimaries, |ctx| {
            ctx.first.histology != ctx.second.histology
        });
        let quiet = Rule::when("M2", PrimaryResult::SinglePrimary, |ctx| {
            ctx.both(|tumor| tumor.histology == 8140)
        });

        assert_eq!(
            fires.apply(&ctx),
            Verdict::decide(PrimaryResult::MultiplePrimaries)
        );
        assert_eq!(quiet.apply(&ctx), Verdict::NotFired);
    }

    #[test]
    fn placeholders_never_fire() {
        let tables = tables();
        let first = tumor(TumorInput::new("C180", "8140", "3", "2019"));
        let ctx = context(&first, &first, &tables);

        let rule = Rule::placeholder("M3", PrimaryResult::SinglePrimary, "no anastomosis field")
            .question("Is the tumor in an anastomosis?");
        assert_eq!(
            rule.apply(&ctx),
            Verdict::NotComputable {
                reason: "no anastomosis field"
            }
        );
        assert_eq!(rule.apply(&ctx).status(), RuleStatus::NotComputable);
    }

    #[test]
    fn unable_names_step_and_group() {
        let tables = tables();
        let first = tumor(TumorInput::new("C180", "8140", "3", "2019"));
        let ctx = context(&first, &first, &tables);

        let Verdict::Tentative(outcome) = ctx.unable("M7", "known laterality is required") else {
            panic!("expected tentative verdict");
        };
        assert_eq!(outcome.result, PrimaryResult::Questionable);
        assert_eq!(
            outcome.message.as_deref(),
            Some("Unable to apply Rule M7 of Test Group: known laterality is required.")
        );
    }

    #[test]
    fn reason_text_falls_back_to_question() {
        let rule = Rule::always("M9", PrimaryResult::SinglePrimary)
            .question("Does not meet any of the above criteria?")
            .note("Terminal rule.")
            .example("Two adenocarcinomas of the sigmoid colon.");
        assert_eq!(rule.reason_text(), "Does not meet any of the above criteria?");
        assert_eq!(rule.notes().len(), 1);
        assert_eq!(rule.examples().len(), 1);

        let rule = rule.reason("Tumors that do not meet any of the above criteria are a single primary.");
        assert!(rule.reason_text().starts_with("Tumors that"));
    }
}
