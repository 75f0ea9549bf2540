//! Merges defaults, override layers and constraints into a snapshot.

use crate::catalog::{Catalog, ToggleDefinition};
use crate::core::{
    CapabilityContext, ConstraintEvaluator, Eligibility, OverrideLayer, ResolutionSource,
    ResolvedToggle, Snapshot,
};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Resolves every catalog toggle against a set of override layers.
///
/// Resolution is a pure function of its inputs: the same catalog, layers,
/// context and previous snapshot always produce an equal snapshot.
///
/// Per toggle:
/// 1. A failing constraint resolves it disabled, tagged with the reason.
/// 2. Otherwise the highest-ranked layer holding a value wins over the default.
/// 3. A restart-required toggle already present in `previous` keeps its
///    previous value; a differing new value is recorded as pending.
///
/// # Examples
///
/// ```rust
/// use hotswap_toggles::catalog::{Catalog, ToggleDefinition};
/// use hotswap_toggles::core::{CapabilityContext, OverrideLayer, Resolver};
/// use std::sync::Arc;
///
/// let catalog = Catalog::new(vec![ToggleDefinition::new("x")]).unwrap();
/// let resolver = Resolver::new(Arc::new(catalog));
///
/// let layers = vec![
///     OverrideLayer::new("low", 1).with_value("x", true),
///     OverrideLayer::new("high", 2).with_value("x", false),
/// ];
///
/// let snapshot = resolver.resolve(&layers, &CapabilityContext::backend(), None);
/// assert!(!snapshot.is_enabled("x"));
/// ```
#[derive(Debug, Clone)]
pub struct Resolver {
    catalog: Arc<Catalog>,
}

impl Resolver {
    /// Create a resolver over a validated catalog.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    /// The catalog being resolved.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Produce a new snapshot.
    ///
    /// `layers` may come in any order; they are consulted by descending rank.
    pub fn resolve(
        &self,
        layers: &[OverrideLayer],
        ctx: &CapabilityContext,
        previous: Option<&Snapshot>,
    ) -> Snapshot {
        let mut ordered: Vec<&OverrideLayer> = layers.iter().collect();
        ordered.sort_by_key(|layer| Reverse(layer.rank()));

        let toggles: BTreeMap<_, _> = self
            .catalog
            .iter()
            .map(|def| {
                let retained = previous.and_then(|p| p.get(def.name()));
                let resolved = resolve_toggle(def, &ordered, ctx, retained);
                (def.name().to_string(), resolved)
            })
            .collect();

        Snapshot::from_toggles(toggles)
    }
}

fn resolve_toggle(
    def: &ToggleDefinition,
    layers: &[&OverrideLayer],
    ctx: &CapabilityContext,
    previous: Option<&ResolvedToggle>,
) -> ResolvedToggle {
    let requires_restart = def.is_restart_required();

    if let Eligibility::Denied(constraint) = ConstraintEvaluator::evaluate(def, ctx) {
        return ResolvedToggle {
            enabled: false,
            requires_restart,
            source: ResolutionSource::ConstraintDenied(constraint),
            pending: None,
        };
    }

    let (enabled, source) = layers
        .iter()
        .find_map(|layer| {
            layer
                .get(def.name())
                .map(|v| (v, ResolutionSource::Override(layer.source_id().to_string())))
        })
        .unwrap_or((def.default_enabled(), ResolutionSource::Default));

    match previous {
        Some(prev) if requires_restart => ResolvedToggle {
            enabled: prev.enabled,
            requires_restart,
            source: prev.source.clone(),
            pending: (enabled != prev.enabled).then_some(enabled),
        },
        _ => ResolvedToggle {
            enabled,
            requires_restart,
            source,
            pending: None,
        },
    }
}
