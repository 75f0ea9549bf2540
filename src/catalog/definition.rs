//! Toggle definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Maturity of a toggle. Informational only, it never gates enablement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Maturity {
    /// Early prototype, may change or disappear.
    #[default]
    #[serde(alias = "alpha")]
    Experimental,
    /// Feature complete but still being hardened.
    Beta,
    /// Generally available.
    Stable,
}

impl fmt::Display for Maturity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Experimental => "experimental",
            Self::Beta => "beta",
            Self::Stable => "stable",
        };
        f.write_str(label)
    }
}

/// A gating rule attached to a toggle.
///
/// Variant order is the evaluation order: when several constraints fail, the
/// first one in this order is reported as the denial reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Constraint {
    /// No backend effect; only resolved by clients.
    FrontendOnly,
    /// Needs a valid license.
    License,
    /// Needs the process to run in development mode.
    DevMode,
}

impl Constraint {
    /// All constraints in evaluation order.
    pub const EVALUATION_ORDER: [Constraint; 3] =
        [Constraint::FrontendOnly, Constraint::License, Constraint::DevMode];

    /// The reason reported when this constraint denies a toggle.
    pub fn denial_reason(&self) -> &'static str {
        match self {
            Self::FrontendOnly => "frontend-only",
            Self::License => "license-required",
            Self::DevMode => "dev-mode-required",
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.denial_reason())
    }
}

/// Immutable description of one toggle.
///
/// # Examples
///
/// ```rust
/// use hotswap_toggles::catalog::{Maturity, ToggleDefinition};
///
/// let def = ToggleDefinition::new("publicDashboardsEmailSharing")
///     .with_description("Restrict public dashboard sharing to allowed emails")
///     .with_maturity(Maturity::Beta)
///     .with_owner("dashboards")
///     .requires_license();
///
/// assert!(def.is_license_gated());
/// assert!(!def.default_enabled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleDefinition {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    maturity: Maturity,
    #[serde(default)]
    owner: String,
    #[serde(default)]
    expression: Option<bool>,
    #[serde(default)]
    constraints: BTreeSet<Constraint>,
    #[serde(default)]
    requires_restart: bool,
}

impl ToggleDefinition {
    /// Create a definition with no constraints and no default expression.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            maturity: Maturity::default(),
            owner: String::new(),
            expression: None,
            constraints: BTreeSet::new(),
            requires_restart: false,
        }
    }

    /// Set the human-readable description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the maturity.
    pub fn with_maturity(mut self, maturity: Maturity) -> Self {
        self.maturity = maturity;
        self
    }

    /// Set the owning team.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Set the static default expression.
    pub fn default_expression(mut self, enabled: bool) -> Self {
        self.expression = Some(enabled);
        self
    }

    /// Shorthand for `default_expression(true)`.
    pub fn enabled_by_default(self) -> Self {
        self.default_expression(true)
    }

    /// Attach a constraint.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.insert(constraint);
        self
    }

    /// Mark the toggle as having no backend effect.
    pub fn frontend_only(self) -> Self {
        self.with_constraint(Constraint::FrontendOnly)
    }

    /// Require a license.
    pub fn requires_license(self) -> Self {
        self.with_constraint(Constraint::License)
    }

    /// Require development mode.
    pub fn requires_dev_mode(self) -> Self {
        self.with_constraint(Constraint::DevMode)
    }

    /// Pin the value for the process lifetime once resolved.
    pub fn requires_restart(mut self) -> Self {
        self.requires_restart = true;
        self
    }

    /// Unique toggle name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description text.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Maturity of the toggle.
    pub fn maturity(&self) -> Maturity {
        self.maturity
    }

    /// Owning team.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The static default expression, if any.
    pub fn expression(&self) -> Option<bool> {
        self.expression
    }

    /// Default value; absence of an expression means disabled.
    pub fn default_enabled(&self) -> bool {
        self.expression.unwrap_or(false)
    }

    /// Constraints in evaluation order.
    pub fn constraints(&self) -> impl Iterator<Item = Constraint> + '_ {
        self.constraints.iter().copied()
    }

    /// Whether the toggle carries the given constraint.
    pub fn has_constraint(&self, constraint: Constraint) -> bool {
        self.constraints.contains(&constraint)
    }

    /// Whether the toggle is frontend-only.
    pub fn is_frontend_only(&self) -> bool {
        self.has_constraint(Constraint::FrontendOnly)
    }

    /// Whether the toggle needs a license.
    pub fn is_license_gated(&self) -> bool {
        self.has_constraint(Constraint::License)
    }

    /// Whether the toggle needs development mode.
    pub fn is_dev_mode_gated(&self) -> bool {
        self.has_constraint(Constraint::DevMode)
    }

    /// Whether value changes are deferred until restart.
    pub fn is_restart_required(&self) -> bool {
        self.requires_restart
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_order() {
        let def = ToggleDefinition::new("x")
            .requires_dev_mode()
            .requires_license()
            .frontend_only();

        let order: Vec<_> = def.constraints().collect();
        assert_eq!(
            order,
            vec![Constraint::FrontendOnly, Constraint::License, Constraint::DevMode]
        );
    }

    #[test]
    fn test_default_expression() {
        assert!(!ToggleDefinition::new("a").default_enabled());
        assert!(ToggleDefinition::new("b").enabled_by_default().default_enabled());
        assert_eq!(ToggleDefinition::new("c").expression(), None);
    }

    #[test]
    fn test_descriptive_fields() {
        let def = ToggleDefinition::new("storage")
            .with_description("Unified storage")
            .with_maturity(Maturity::Experimental)
            .with_owner("grafana-app-platform");

        assert_eq!(def.description(), "Unified storage");
        assert_eq!(def.maturity(), Maturity::Experimental);
        assert_eq!(def.owner(), "grafana-app-platform");

        let bare = ToggleDefinition::new("scenes");
        assert_eq!(bare.description(), "");
        assert_eq!(bare.maturity(), Maturity::default());
        assert_eq!(bare.owner(), "");
    }

    #[test]
    fn test_maturity_alias() {
        let m: Maturity = serde_json::from_str("\"alpha\"").unwrap();
        assert_eq!(m, Maturity::Experimental);
        assert_eq!(Maturity::Stable.to_string(), "stable");
    }
}
