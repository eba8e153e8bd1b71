use super::Rule;
use crate::domain::Behavior;
use crate::matching::{RangeError, Ranges};

/// Applicability test of a rule group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFilter {
    sites: Ranges,
    include: Option<Ranges>,
    exclude: Option<Ranges>,
    behaviors: Vec<Behavior>,
    years: Ranges,
}

impl GroupFilter {
    pub fn new(
        sites: &str,
        include: Option<&str>,
        exclude: Option<&str>,
        behaviors: &[Behavior],
        years: &str,
    ) -> Result<Self, RangeError> {
        Ok(Self {
            sites: Ranges::parse(sites, true)?,
            include: include.map(|expr| Ranges::parse(expr, false)).transpose()?,
            exclude: exclude.map(|expr| Ranges::parse(expr, false)).transpose()?,
            behaviors: behaviors.to_vec(),
            years: Ranges::parse(years, false)?,
        })
    }

    pub fn matches(&self, site: &str, histology: i32, behavior: Behavior, year: i32) -> bool {
        self.sites.contains_site(site)
            && self
                .include
                .as_ref()
                .map_or(true, |include| include.contains(Some(histology)))
            && !self
                .exclude
                .as_ref()
                .is_some_and(|exclude| exclude.contains(Some(histology)))
            && self.behaviors.contains(&behavior)
            && self.years.contains(Some(year))
    }
}

/// Ordered rules for one site category and era.
///
/// A generic group lists the filters of the specific groups that take
/// precedence over it and refuses any tumor one of them would claim.
#[derive(Debug)]
pub struct RuleGroup {
    id: &'static str,
    name: &'static str,
    filter: GroupFilter,
    precedence: Vec<GroupFilter>,
    rules: Vec<Rule>,
    fallback: Rule,
}

impl RuleGroup {
    pub fn new(
        id: &'static str,
        name: &'static str,
        filter: GroupFilter,
        rules: Vec<Rule>,
        fallback: Rule,
    ) -> Self {
        Self {
            id,
            name,
            filter,
            precedence: Vec::new(),
            rules,
            fallback,
        }
    }

    pub fn deferring_to(mut self, specific: Vec<GroupFilter>) -> Self {
        self.precedence = specific;
        self
    }

    pub fn is_applicable(&self, site: &str, histology: i32, behavior: Behavior, year: i32) -> bool {
        self.filter.matches(site, histology, behavior, year)
            && !self
                .precedence
                .iter()
                .any(|specific| specific.matches(site, histology, behavior, year))
    }

    pub fn is_generic(&self) -> bool {
        !self.precedence.is_empty()
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn filter(&self) -> &GroupFilter {
        &self.filter
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn fallback(&self) -> &Rule {
        &self.fallback
    }
}
