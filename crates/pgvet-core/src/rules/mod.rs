//! Validation rules
//!
//! Each category module exposes a single pure `check` over the completed
//! schema model. Rules never observe each other's output and never abort;
//! a rule that cannot evaluate a table simply emits nothing for it.

mod constraints;
mod indexes;
mod naming;
mod rls;
mod syntax;

use crate::error::Finding;
use crate::schema::SchemaModel;

/// Runs every registered rule against a completed schema model.
pub struct RuleEngine<'a> {
    model: &'a SchemaModel,
}

impl<'a> RuleEngine<'a> {
    pub fn new(model: &'a SchemaModel) -> Self {
        Self { model }
    }

    /// Evaluate all rule categories and collect their findings.
    pub fn run(&self) -> Vec<Finding> {
        let mut findings = syntax::check(self.model);
        findings.extend(naming::check(self.model));
        findings.extend(constraints::check(self.model));
        findings.extend(indexes::check(self.model));
        findings.extend(rls::check(self.model));
        findings
    }
}
