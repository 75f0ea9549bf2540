//! Eligibility checks, independent of override values.

use crate::catalog::{Constraint, ToggleDefinition};
use crate::core::{CapabilityContext, EvaluationTarget};

/// Outcome of checking a definition against a capability context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// The toggle may be enabled.
    Eligible,
    /// The first failing constraint, in evaluation order.
    Denied(Constraint),
}

impl Eligibility {
    /// Whether the toggle may be enabled.
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }
}

/// Decides whether a toggle may be enabled at all.
///
/// An ineligible toggle resolves disabled no matter what its default or any
/// override says. Rules run in [`Constraint::EVALUATION_ORDER`]; adding a
/// constraint kind means adding a variant there and an arm in
/// [`ConstraintEvaluator::is_satisfied`].
///
/// # Examples
///
/// ```rust
/// use hotswap_toggles::catalog::{Constraint, ToggleDefinition};
/// use hotswap_toggles::core::{CapabilityContext, ConstraintEvaluator, Eligibility};
///
/// let def = ToggleDefinition::new("alpha").requires_license();
/// let ctx = CapabilityContext::backend().with_license(false);
///
/// assert_eq!(
///     ConstraintEvaluator::evaluate(&def, &ctx),
///     Eligibility::Denied(Constraint::License)
/// );
/// ```
pub struct ConstraintEvaluator;

impl ConstraintEvaluator {
    /// Check every constraint of `def` against `ctx`.
    pub fn evaluate(def: &ToggleDefinition, ctx: &CapabilityContext) -> Eligibility {
        Constraint::EVALUATION_ORDER
            .into_iter()
            .filter(|c| def.has_constraint(*c))
            .find(|c| !Self::is_satisfied(*c, ctx))
            .map_or(Eligibility::Eligible, Eligibility::Denied)
    }

    /// Whether a single constraint holds in `ctx`.
    pub fn is_satisfied(constraint: Constraint, ctx: &CapabilityContext) -> bool {
        match constraint {
            Constraint::FrontendOnly => ctx.target != EvaluationTarget::Backend,
            Constraint::License => ctx.licensed,
            Constraint::DevMode => ctx.dev_mode,
        }
    }
}
