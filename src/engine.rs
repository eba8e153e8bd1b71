//! Public entry point: resolves the rule group for a pair and evaluates it.

use crate::catalog::{Catalog, Resolution};
use crate::config::{system_year, EngineConfig};
use crate::domain::{PrimaryResult, TumorInput};
use crate::error::EngineError;
use crate::resources::{LookupTables, ResourceSource};
use crate::rules::{Outcome, Rule, RuleContext, RuleGroup, RuleStatus, Verdict};
use serde::Serialize;
use std::ops::ControlFlow;
use std::sync::Arc;
use tracing::{debug, warn};

/// Step of the audit trail: a rule that was run and what it concluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedRule {
    pub step: &'static str,
    pub status: RuleStatus,
}

/// Decision for one group, with the rule that produced it.
#[derive(Debug)]
pub struct Evaluation<'g> {
    pub rule: &'g Rule,
    pub outcome: Outcome,
    pub applied: Vec<AppliedRule>,
}

#[derive(Default)]
struct Pending<'g> {
    tentative: Option<(&'g Rule, Outcome)>,
    applied: Vec<AppliedRule>,
}

/// Runs the group's rules in order. The first final verdict wins; otherwise
/// the last tentative one; otherwise the fallback rule.
pub fn evaluate<'g>(group: &'g RuleGroup, ctx: &RuleContext<'_>) -> Evaluation<'g> {
    let flow = group
        .rules()
        .iter()
        .try_fold(Pending::default(), |mut pending, rule| {
            let verdict = rule.apply(ctx);
            debug!(group = group.id(), step = rule.step(), status = ?verdict.status(), "applied rule");
            pending.applied.push(AppliedRule {
                step: rule.step(),
                status: verdict.status(),
            });

            match verdict {
                Verdict::Final(outcome) => ControlFlow::Break(Evaluation {
                    rule,
                    outcome,
                    applied: pending.applied,
                }),
                Verdict::Tentative(outcome) => {
                    pending.tentative = Some((rule, outcome));
                    ControlFlow::Continue(pending)
                }
                Verdict::NotComputable { reason } => {
                    warn!(
                        group = group.id(),
                        step = rule.step(),
                        reason,
                        "rule cannot be computed from abstract fields; treated as not fired"
                    );
                    ControlFlow::Continue(pending)
                }
                Verdict::NotFired => ControlFlow::Continue(pending),
            }
        });

    let mut pending = match flow {
        ControlFlow::Break(evaluation) => return evaluation,
        ControlFlow::Continue(pending) => pending,
    };

    if let Some((rule, outcome)) = pending.tentative {
        return Evaluation {
            rule,
            outcome,
            applied: pending.applied,
        };
    }

    let fallback = group.fallback();
    let verdict = fallback.apply(ctx);
    pending.applied.push(AppliedRule {
        step: fallback.step(),
        status: verdict.status(),
    });
    let outcome = match verdict {
        Verdict::Final(outcome) | Verdict::Tentative(outcome) => outcome,
        Verdict::NotFired | Verdict::NotComputable { .. } => Outcome::new(fallback.result()),
    };

    Evaluation {
        rule: fallback,
        outcome,
        applied: pending.applied,
    }
}

/// Result of classifying a pair of abstracts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub result: PrimaryResult,
    pub reason: String,
    pub group_id: Option<&'static str>,
    pub group_name: Option<&'static str>,
    pub step: Option<&'static str>,
    /// Notes and examples documented on the deciding rule.
    pub notes: Vec<&'static str>,
    pub examples: Vec<&'static str>,
    pub applied_rules: Vec<AppliedRule>,
}

impl Classification {
    fn unresolved(result: PrimaryResult, reason: String) -> Self {
        Self {
            result,
            reason,
            group_id: None,
            group_name: None,
            step: None,
            notes: Vec::new(),
            examples: Vec::new(),
            applied_rules: Vec::new(),
        }
    }
}

fn rationale(rule: &Rule, outcome: &Outcome) -> String {
    match (&outcome.message, outcome.result) {
        (Some(message), PrimaryResult::Questionable) => message.clone(),
        (Some(message), _) => format!("{} {message}", rule.reason_text()),
        (None, _) => rule.reason_text().to_string(),
    }
}

fn group_label(group: Option<&RuleGroup>) -> &'static str {
    group.map_or("no group", RuleGroup::name)
}

/// Multiple primary rules engine over a catalog and its lookup tables.
pub struct MphEngine {
    catalog: Catalog,
    tables: Arc<LookupTables>,
    fixed_year: Option<i32>,
}

impl MphEngine {
    /// Builds the standard catalog and loads tables from the configured
    /// source; packaged tables are shared process-wide.
    pub fn new(config: &EngineConfig) -> Result<Self, EngineError> {
        let tables = match &config.resources.directory {
            Some(directory) => Arc::new(LookupTables::load(&ResourceSource::Directory(
                directory.clone(),
            ))?),
            None => LookupTables::packaged()?,
        };
        let engine = Self::with_tables(Catalog::standard()?, tables);

        Ok(match config.fixed_year {
            Some(year) => engine.current_year(year),
            None => engine,
        })
    }

    pub fn with_tables(catalog: Catalog, tables: Arc<LookupTables>) -> Self {
        Self {
            catalog,
            tables,
            fixed_year: None,
        }
    }

    /// Pins the year used to reject future diagnoses.
    pub fn current_year(mut self, year: i32) -> Self {
        self.fixed_year = Some(year);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn year(&self) -> i32 {
        self.fixed_year.unwrap_or_else(system_year)
    }

    pub fn compute(&self, first: &TumorInput, second: &TumorInput) -> Classification {
        let current_year = self.year();

        match self.catalog.resolve(first, second, current_year) {
            Resolution::InvalidInput { side, field } => {
                debug!(side = side.label(), %field, "invalid tumor input");
                Classification::unresolved(
                    PrimaryResult::InvalidInput,
                    format!(
                        "Unable to identify cancer group: the {} has an invalid {field}.",
                        side.label()
                    ),
                )
            }
            Resolution::DifferentGroups {
                first: first_group,
                second: second_group,
            } => Classification::unresolved(
                PrimaryResult::DifferentGroups,
                format!(
                    "The tumors belong to different cancer groups: first tumor in {}, second tumor in {}.",
                    group_label(first_group),
                    group_label(second_group)
                ),
            ),
            Resolution::Group {
                group,
                first,
                second,
            } => {
                let ctx = RuleContext {
                    group_name: group.name(),
                    first: &first,
                    second: &second,
                    tables: &self.tables,
                    current_year,
                };
                let evaluation = evaluate(group, &ctx);
                debug!(
                    group = group.id(),
                    step = evaluation.rule.step(),
                    result = evaluation.outcome.result.label(),
                    "classified tumor pair"
                );

                Classification {
                    result: evaluation.outcome.result,
                    reason: rationale(evaluation.rule, &evaluation.outcome),
                    group_id: Some(group.id()),
                    group_name: Some(group.name()),
                    step: Some(evaluation.rule.step()),
                    notes: evaluation.rule.notes().to_vec(),
                    examples: evaluation.rule.examples().to_vec(),
                    applied_rules: evaluation.applied,
                }
            }
        }
    }
}
