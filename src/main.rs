//! EdgeOS blacklist - Entry point.
//!
//! Loads settings and a saved configuration dump, reports what each view
//! would hand to the dnsmasq writers and prints the rendered tree.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use edgeos_blacklist::loader::FileLoader;
use edgeos_blacklist::{Settings, ViewFactory, ViewKind};

fn load_settings() -> Result<Settings> {
    match std::env::var("SETTINGS_PATH") {
        Ok(path) => Settings::load(&path).with_context(|| format!("Failed to load settings from {path}")),
        Err(_) => {
            debug!("SETTINGS_PATH not set, using default settings");
            Ok(Settings::default())
        }
    }
}

async fn run() -> Result<()> {
    let settings = load_settings()?;

    info!("Reading configuration from {}", settings.config_file.display());
    let mut tree = FileLoader::load(&settings.config_file)
        .await
        .context("Failed to load configuration")?;

    info!("Parsed {} configuration nodes", tree.len());

    let fallback_ip = settings
        .blackhole_ip
        .map(|ip| ip.to_string())
        .unwrap_or_default();
    for node in &settings.nodes {
        match tree.get(node) {
            Some(n) if n.is_disabled() => warn!(node = %node, "node is disabled"),
            Some(_) => info!(
                node = %node,
                ip = tree.resolve_ip_or(node, &fallback_ip),
                "effective blackhole IP"
            ),
            None => warn!(node = %node, "node not present in configuration"),
        }
    }

    let factory = ViewFactory::new(&tree, &settings);
    for kind in ViewKind::ALL {
        let view = factory.build(kind);
        info!(kind = %kind, objects = view.len(), "view ready");
        for object in &view {
            debug!(
                kind = %kind,
                name = object.name(),
                location = object.location(),
                ip = object.ip(),
                "view object"
            );
        }
    }

    let resolved = tree.resolve_source_ips();
    debug!(resolved, "resolved source blackhole IPs");

    println!("{tree}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    run().await
}
