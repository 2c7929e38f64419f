//! File logging example
//!
//! Configures a console handler and two file handlers in code, one with a
//! line format and one with JSON plus call-site information.
//!
//! Run with: cargo run --example file_logging

use rust_logger_registry::prelude::*;
use rust_logger_registry::{error, info, warning};

fn main() -> Result<()> {
    println!("=== Rust Logger Registry - File Logging Example ===\n");

    let properties = Properties::parse(
        "rootLogger = DEBUG\n\
         rootLogger.name = inventory\n\
         rootLogger.handlers = console, text\n\
         \n\
         logger.console.handlerLoader = ConsoleHandler\n\
         logger.console.constructor.level = WARNING\n\
         \n\
         logger.text.handlerLoader = FileHandler\n\
         logger.text.constructor.path = logs/%module%-%datetime%.log\n\
         logger.text.formatter = LineFormatter\n\
         logger.text.formatter.constructor.format = %datetime% %level_name% [%channel%] %message%\\n\n\
         \n\
         logger.json.handlerLoader = FileHandler\n\
         logger.json.constructor.path = logs/%module%.json\n\
         logger.json.formatter = JsonFormatter\n\
         logger.json.processor = IntrospectionProcessor, ThreadProcessor\n\
         \n\
         logger.inventory::sync = INFO\n\
         logger.inventory::sync.handlers = console, json\n",
    )?;

    let manager = LogManager::from_properties(properties);

    println!("1. Default logger: everything to logs/inventory-<date>.log, warnings to the console:");
    let root = manager.get_logger(None);
    root.debug("Loading configuration...");
    info!(root, "Configuration loaded with {} warehouses", 3);
    warning!(root, "Using default settings for some options");

    println!("\n2. inventory::sync classes log JSON with call-site details:");
    let sync = manager.get_logger(Some("inventory::sync::Worker"));
    sync.debug("Filtered out below INFO");
    info!(sync, "Synchronized {} items", 1250);
    error!(sync, "Warehouse {} unreachable", "north");

    let context = LogContext::new()
        .with_field("warehouse", "south")
        .with_field("retry_in_seconds", 30);
    sync.log_with_context(LogLevel::Warning, "Partial sync", context);

    manager.flush()?;

    println!("\n3. Handler metrics:");
    for logger in [&root, &sync] {
        for handler in logger.handlers() {
            println!(
                "   {:<24} {:<8} handled={} failed={}",
                logger.name(),
                handler.name(),
                handler.metrics().handled_count(),
                handler.metrics().failed_count()
            );
        }
    }

    println!("\n=== Example completed successfully! ===");
    println!("Check logs/ for the output files.");
    Ok(())
}
