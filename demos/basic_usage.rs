//! Basic logger usage example
//!
//! Loads `resources/logger.properties` and shows how classes and namespaces
//! resolve to loggers.
//!
//! Run with: cargo run --example basic_usage

use rust_logger_registry::prelude::*;
use rust_logger_registry::{debug, error, info, warning};

fn main() -> Result<()> {
    println!("=== Rust Logger Registry - Basic Usage Example ===\n");

    let manager = LogManager::builder()
        .config_path("resources/logger.properties")
        .build();

    println!("1. Default logger (root handlers, root level):");
    let root = manager.get_logger(None);
    debug!(root, "Debug message (hidden at INFO)");
    info!(root, "Application started");
    warning!(root, "Using default settings for some options");

    println!("\n2. Namespace configured at DEBUG:");
    let gateway = manager.get_logger(Some("demo::payments::Gateway"));
    debug!(gateway, "Connecting to provider {}", "acme");
    info!(gateway, "Payment {} authorized", 1001);

    println!("\n3. Class configured at ERROR:");
    let poller = manager.get_logger(Some("demo::payments::Poller"));
    info!(poller, "Polling (hidden)");
    error!(poller, "Provider timed out after {}s", 30);

    println!("\n4. Class without configuration shares the default logger:");
    let search = manager.get_logger(Some("demo::catalog::Search"));
    println!("   logger name: {}", search.name());
    info!(search, "Search index warmed up");

    println!("\n5. Repeated lookups hit the cache:");
    let again = manager.get_logger(Some("demo::payments::Gateway"));
    println!(
        "   same instance: {}, cached loggers: {}",
        std::sync::Arc::ptr_eq(&gateway, &again),
        manager.cached_logger_count()
    );

    manager.flush()?;
    println!("\n=== Example completed successfully! ===");
    Ok(())
}
