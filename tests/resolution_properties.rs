//! Property tests for resolution: constraint gating, precedence and
//! determinism hold for any combination of overrides and context.

use hotswap_toggles::catalog::{Catalog, Constraint, ToggleDefinition};
use hotswap_toggles::core::{
    CapabilityContext, EvaluationTarget, OverrideLayer, ResolutionSource, Resolver,
};
use proptest::prelude::*;
use std::sync::Arc;

const NAMES: [&str; 6] = ["a", "b", "c", "d", "e", "f"];

/// A definition with random default, constraints and restart flag.
fn arb_definition(name: &'static str) -> impl Strategy<Value = ToggleDefinition> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        move |(default, license, dev_mode, frontend, restart)| {
            let mut def = ToggleDefinition::new(name).default_expression(default);
            if license {
                def = def.requires_license();
            }
            if dev_mode {
                def = def.requires_dev_mode();
            }
            if frontend {
                def = def.frontend_only();
            }
            if restart {
                def = def.requires_restart();
            }
            def
        },
    )
}

fn arb_catalog() -> impl Strategy<Value = Catalog> {
    NAMES
        .iter()
        .map(|&name| arb_definition(name))
        .collect::<Vec<_>>()
        .prop_map(|defs| Catalog::new(defs).unwrap())
}

/// Layers with distinct ranks and arbitrary values for known names.
fn arb_layers() -> impl Strategy<Value = Vec<OverrideLayer>> {
    prop::collection::vec(
        prop::collection::vec((0..NAMES.len(), any::<bool>()), 0..8),
        0..4,
    )
    .prop_map(|layers| {
        layers
            .into_iter()
            .enumerate()
            .map(|(index, values)| {
                let mut layer = OverrideLayer::new(format!("layer-{}", index), index as i32 * 100);
                for (name, value) in values {
                    layer = layer.with_value(NAMES[name], value);
                }
                layer
            })
            .collect()
    })
}

fn arb_context() -> impl Strategy<Value = CapabilityContext> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(licensed, dev_mode, frontend)| {
        CapabilityContext::backend()
            .with_license(licensed)
            .with_dev_mode(dev_mode)
            .with_target(if frontend {
                EvaluationTarget::Frontend
            } else {
                EvaluationTarget::Backend
            })
    })
}

proptest! {
    /// Unmet license or dev-mode requirements always resolve disabled.
    #[test]
    fn unmet_requirements_never_enable(
        catalog in arb_catalog(),
        layers in arb_layers(),
        previous_layers in arb_layers(),
        ctx in arb_context(),
    ) {
        let resolver = Resolver::new(Arc::new(catalog));
        let previous = resolver.resolve(&previous_layers, &ctx, None);
        let snapshot = resolver.resolve(&layers, &ctx, Some(&previous));

        for def in resolver.catalog().iter() {
            let resolved = snapshot.get(def.name()).unwrap();
            if def.is_license_gated() && !ctx.licensed {
                prop_assert!(!resolved.enabled);
            }
            if def.is_dev_mode_gated() && !ctx.dev_mode {
                prop_assert!(!resolved.enabled);
            }
            if def.is_frontend_only() && ctx.target == EvaluationTarget::Backend {
                prop_assert!(!resolved.enabled);
            }
        }
    }

    /// Denials report the first failing constraint in evaluation order.
    #[test]
    fn denial_names_first_failing_constraint(
        catalog in arb_catalog(),
        layers in arb_layers(),
        ctx in arb_context(),
    ) {
        let resolver = Resolver::new(Arc::new(catalog));
        let snapshot = resolver.resolve(&layers, &ctx, None);

        for def in resolver.catalog().iter() {
            let expected = Constraint::EVALUATION_ORDER.into_iter().find(|c| {
                def.has_constraint(*c)
                    && match c {
                        Constraint::FrontendOnly => ctx.target == EvaluationTarget::Backend,
                        Constraint::License => !ctx.licensed,
                        Constraint::DevMode => !ctx.dev_mode,
                    }
            });

            let source = &snapshot.get(def.name()).unwrap().source;
            match expected {
                Some(constraint) => {
                    prop_assert_eq!(source, &ResolutionSource::ConstraintDenied(constraint));
                }
                None => prop_assert!(!matches!(source, ResolutionSource::ConstraintDenied(_))),
            }
        }
    }

    /// Without a previous snapshot, eligible toggles take the value of the
    /// highest-ranked layer that sets them, else their default.
    #[test]
    fn highest_rank_wins(
        catalog in arb_catalog(),
        layers in arb_layers(),
        ctx in arb_context(),
    ) {
        let resolver = Resolver::new(Arc::new(catalog));
        let forward = resolver.resolve(&layers, &ctx, None);
        let reversed: Vec<_> = layers.iter().rev().cloned().collect();
        let backward = resolver.resolve(&reversed, &ctx, None);
        prop_assert_eq!(&forward, &backward);

        for def in resolver.catalog().iter() {
            let resolved = forward.get(def.name()).unwrap();
            if matches!(resolved.source, ResolutionSource::ConstraintDenied(_)) {
                continue;
            }

            let winner = layers
                .iter()
                .filter(|layer| layer.get(def.name()).is_some())
                .max_by_key(|layer| layer.rank());

            match winner {
                Some(layer) => {
                    prop_assert_eq!(Some(resolved.enabled), layer.get(def.name()));
                    prop_assert_eq!(
                        &resolved.source,
                        &ResolutionSource::Override(layer.source_id().to_string())
                    );
                }
                None => {
                    prop_assert_eq!(resolved.enabled, def.default_enabled());
                    prop_assert_eq!(&resolved.source, &ResolutionSource::Default);
                }
            }
        }
    }

    /// Same inputs, same snapshot, byte for byte.
    #[test]
    fn resolution_is_deterministic(
        catalog in arb_catalog(),
        layers in arb_layers(),
        ctx in arb_context(),
    ) {
        let resolver = Resolver::new(Arc::new(catalog));
        let first = resolver.resolve(&layers, &ctx, None);
        let second = resolver.resolve(&layers, &ctx, Some(&first));
        let third = resolver.resolve(&layers, &ctx, Some(&second));

        prop_assert_eq!(&second, &third);
        prop_assert_eq!(
            serde_json::to_string(&second).unwrap(),
            serde_json::to_string(&third).unwrap()
        );
        prop_assert!(third.changed_since(&second).is_empty());
    }

    /// Restart-required toggles never change value once resolved, unless a
    /// constraint now denies them.
    #[test]
    fn restart_required_values_are_retained(
        catalog in arb_catalog(),
        before in arb_layers(),
        after in arb_layers(),
        ctx in arb_context(),
    ) {
        let resolver = Resolver::new(Arc::new(catalog));
        let previous = resolver.resolve(&before, &ctx, None);
        let next = resolver.resolve(&after, &ctx, Some(&previous));

        for def in resolver.catalog().iter().filter(|d| d.is_restart_required()) {
            let old = previous.get(def.name()).unwrap();
            let new = next.get(def.name()).unwrap();
            prop_assert_eq!(old.enabled, new.enabled);
            if let Some(pending) = new.pending {
                prop_assert_ne!(pending, new.enabled);
            }
        }
    }

    /// Names outside the catalog are disabled and absent.
    #[test]
    fn unknown_names_are_disabled(
        catalog in arb_catalog(),
        layers in arb_layers(),
        ctx in arb_context(),
        name in "[g-z][a-zA-Z]{0,12}",
    ) {
        let resolver = Resolver::new(Arc::new(catalog));
        let snapshot = resolver.resolve(&layers, &ctx, None);

        prop_assert!(!snapshot.is_enabled(&name));
        prop_assert!(snapshot.get(&name).is_none());
        prop_assert_eq!(snapshot.len(), NAMES.len());
    }
}
