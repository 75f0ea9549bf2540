//! Example demonstrating polled reloads of a toggle file.
//!
//! This example shows how to:
//! - Declare a toggle catalog with constraints and restart-required toggles
//! - Layer a hot-reloadable file over static defaults
//! - Subscribe to changes and poll for new values
//!
//! Run with: cargo run --example hot_reload
//!
//! While running, edit the printed file path to see toggles change.

use hotswap_toggles::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Hot Reload Example ===\n");

    let path = std::env::temp_dir().join("hotswap_toggles_demo.toml");
    std::fs::write(
        &path,
        r#"[feature_toggles]
enable = "storage"
scenes = false
"#,
    )?;
    println!("Wrote {}", path.display());

    let registry = ResolverRegistry::builder()
        .with_catalog(vec![
            ToggleDefinition::new("topnav")
                .with_description("New navigation")
                .with_maturity(Maturity::Stable)
                .enabled_by_default(),
            ToggleDefinition::new("storage").with_owner("grafana-app-platform"),
            ToggleDefinition::new("scenes").with_maturity(Maturity::Beta),
            ToggleDefinition::new("publicDashboardsEmailSharing").requires_license(),
            ToggleDefinition::new("useCachingService").requires_restart(),
        ])
        .with_source(FileSource::new(&path).with_rank(150).with_hot_reload(true))
        .with_env_overrides("GF_FEATURE_TOGGLES")
        .build()
        .await?;

    print_snapshot(&registry);

    let reload_count = Arc::new(AtomicUsize::new(0));
    let reload_count_clone = Arc::clone(&reload_count);
    let _subscription = registry
        .subscribe(move |changed: &[String]| {
            let count = reload_count_clone.fetch_add(1, Ordering::SeqCst) + 1;
            println!("\n[Event] Toggles changed (#{}): {:?}", count, changed);
        })
        .await;

    let _poller = registry.spawn_poller(Duration::from_secs(2), Duration::from_secs(1));
    println!("\nPolling every 2s. Try adding `useCachingService = true` or `scenes = true`.");

    for _ in 0..15 {
        tokio::time::sleep(Duration::from_secs(2)).await;
        for name in ["scenes", "useCachingService"] {
            if let Some(meta) = registry.metadata(name) {
                if let Some(pending) = meta.pending {
                    println!("  {} changes to {} after restart", name, pending);
                }
            }
        }
    }

    print_snapshot(&registry);
    println!(
        "\nFrontend manifest: {}",
        registry.frontend_manifest().to_json()?
    );
    println!("Total change events: {}", reload_count.load(Ordering::SeqCst));

    Ok(())
}

fn print_snapshot(registry: &ResolverRegistry) {
    println!("\nGeneration {}:", registry.generation());
    for (name, toggle) in registry.current().iter() {
        println!("  {:<30} {:<5} ({})", name, toggle.enabled, toggle.source);
    }
}
