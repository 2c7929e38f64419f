//! Component injection example
//!
//! Components implementing `Loggable` receive their logger from a
//! `LoadHook` at the composition root, and may run one-time setup.
//!
//! Run with: cargo run --example component_injection

use rust_logger_registry::prelude::*;
use rust_logger_registry::{info, logger_slot, warning};
use std::sync::atomic::{AtomicBool, Ordering};

static MAILER_READY: AtomicBool = AtomicBool::new(false);

struct Mailer;

impl Loggable for Mailer {
    fn class_name() -> &'static str {
        "notify::Mailer"
    }

    logger_slot!();

    fn after_load() {
        MAILER_READY.store(true, Ordering::SeqCst);
    }
}

impl Mailer {
    fn send(&self, to: &str) {
        if let Some(logger) = LoadHook::logger_of::<Self>() {
            info!(logger, "Sending mail to {}", to);
        }
    }
}

struct Scheduler;

impl Loggable for Scheduler {
    fn class_name() -> &'static str {
        "jobs::Scheduler"
    }

    logger_slot!();
}

fn main() {
    println!("=== Rust Logger Registry - Component Injection Example ===\n");

    let manager = LogManager::from_properties(Properties::from_pairs([
        ("rootLogger", "WARNING"),
        ("rootLogger.handlers", "console"),
        ("logger.console.handlerLoader", "ConsoleHandler"),
        ("logger.notify", "DEBUG"),
    ]));
    let hook = LoadHook::new(&manager);

    println!("1. Materialize components:");
    hook.materialize::<Mailer>();
    hook.materialize::<Scheduler>();
    println!("   Mailer ready: {}", MAILER_READY.load(Ordering::SeqCst));

    println!("\n2. Mailer logs from DEBUG (namespace `notify` is configured):");
    Mailer.send("ops@example.com");

    println!("\n3. Scheduler has no level of its own and uses the default logger:");
    if let Some(logger) = LoadHook::logger_of::<Scheduler>() {
        println!("   injected logger: {}", logger.name());
        info!(logger, "Hidden below WARNING");
        warning!(logger, "Job queue is {}% full", 90);
    }

    println!("\n=== Example completed successfully! ===");
}
