//! Logger injection for components
//!
//! A component opts in by implementing [`Loggable`]. Declaring a slot with
//! [`logger_slot!`](crate::logger_slot) lets a [`LoadHook`] store the
//! component's logger in it, and `after_load` runs one-time setup once
//! the logger is in place. Slots and `after_load` are process-wide: a type
//! is set up once no matter how many hooks materialize it.
//!
//! ```
//! use rust_logger_registry::{logger_slot, LoadHook, LogManager, Loggable, Properties};
//!
//! struct Mailer;
//!
//! impl Loggable for Mailer {
//!     logger_slot!();
//! }
//!
//! let manager = LogManager::from_properties(Properties::new());
//! let hook = LoadHook::new(&manager);
//! hook.materialize::<Mailer>();
//! assert!(LoadHook::logger_of::<Mailer>().is_some());
//! ```

use crate::core::Logger;
use crate::manager::LogManager;
use parking_lot::Mutex;
use std::any::TypeId;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

/// A component that receives its logger from a [`LoadHook`]
pub trait Loggable: Sized + 'static {
    /// Identifier the logger is resolved for
    fn class_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Storage for the injected logger; `None` disables injection
    fn logger_slot() -> Option<&'static OnceLock<Arc<Logger>>> {
        None
    }

    /// One-time initialization, run after the logger has been injected
    fn after_load() {}
}

/// Declare the logger slot of a [`Loggable`] implementation.
///
/// Expands to a `logger_slot` function backed by a function-local static,
/// so it must be used inside the `impl Loggable for ...` block. All
/// instantiations of a generic type share the one slot.
#[macro_export]
macro_rules! logger_slot {
    () => {
        fn logger_slot() -> ::std::option::Option<
            &'static ::std::sync::OnceLock<::std::sync::Arc<$crate::Logger>>,
        > {
            static SLOT: ::std::sync::OnceLock<::std::sync::Arc<$crate::Logger>> =
                ::std::sync::OnceLock::new();
            ::std::option::Option::Some(&SLOT)
        }
    };
}

/// Types whose `after_load` has run in this process
fn initialized_types() -> &'static Mutex<HashSet<TypeId>> {
    static INITIALIZED: OnceLock<Mutex<HashSet<TypeId>>> = OnceLock::new();
    INITIALIZED.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Injects loggers into [`Loggable`] components
pub struct LoadHook<'m> {
    manager: &'m LogManager,
    loaded: Mutex<HashSet<TypeId>>,
}

impl<'m> LoadHook<'m> {
    pub fn new(manager: &'m LogManager) -> Self {
        Self {
            manager,
            loaded: Mutex::new(HashSet::new()),
        }
    }

    /// Hook bound to [`LogManager::global`]
    pub fn global() -> &'static LoadHook<'static> {
        static HOOK: OnceLock<LoadHook<'static>> = OnceLock::new();
        HOOK.get_or_init(|| LoadHook::new(LogManager::global()))
    }

    /// Inject the logger of `T` and run its `after_load` once per process.
    ///
    /// A slot that already holds a logger keeps it. Returns the logger in
    /// the slot, or `None` when `T` declares no slot.
    pub fn materialize<T: Loggable>(&self) -> Option<Arc<Logger>> {
        let logger = T::logger_slot().map(|slot| {
            Arc::clone(slot.get_or_init(|| self.manager.get_logger(Some(T::class_name()))))
        });

        if self.loaded.lock().insert(TypeId::of::<T>()) {
            self.manager
                .bootstrap_logger()
                .trace(format!("loaded component {}", T::class_name()));
        }

        // The lock is released before `after_load`, which may materialize other types
        let first_in_process = initialized_types().lock().insert(TypeId::of::<T>());
        if first_in_process {
            T::after_load();
        }

        logger
    }

    /// Whether `materialize::<T>()` already ran on this hook
    pub fn is_loaded<T: Loggable>(&self) -> bool {
        self.loaded.lock().contains(&TypeId::of::<T>())
    }

    /// The logger injected into `T`, if any
    pub fn logger_of<T: Loggable>() -> Option<Arc<Logger>> {
        T::logger_slot().and_then(|slot| slot.get().cloned())
    }
}

impl std::fmt::Debug for LoadHook<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadHook")
            .field("loaded", &self.loaded.lock().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Properties;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn manager() -> LogManager {
        LogManager::from_properties(Properties::from_pairs([
            ("logger.null.handlerLoader", "NullHandler"),
            ("logger.orders", "ERROR"),
        ]))
    }

    static SETUP_CALLS: AtomicUsize = AtomicUsize::new(0);

    struct Checkout;

    impl Loggable for Checkout {
        fn class_name() -> &'static str {
            "orders::Checkout"
        }

        logger_slot!();

        fn after_load() {
            SETUP_CALLS.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Plain;

    impl Loggable for Plain {}

    static REFUND_SETUP_CALLS: AtomicUsize = AtomicUsize::new(0);

    struct Refunds;

    impl Loggable for Refunds {
        fn class_name() -> &'static str {
            "orders::Refunds"
        }

        logger_slot!();

        fn after_load() {
            REFUND_SETUP_CALLS.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_materialize_injects_once() {
        let m = manager();
        let hook = LoadHook::new(&m);

        let first = hook.materialize::<Checkout>().expect("slot declared");
        let second = hook.materialize::<Checkout>().expect("slot declared");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "orders::Checkout");
        assert_eq!(SETUP_CALLS.load(Ordering::SeqCst), 1);
        assert!(hook.is_loaded::<Checkout>());

        let injected = LoadHook::logger_of::<Checkout>().expect("injected");
        assert!(Arc::ptr_eq(&first, &injected));
    }

    #[test]
    fn test_component_without_slot() {
        let m = manager();
        let hook = LoadHook::new(&m);
        assert!(!hook.is_loaded::<Plain>());
        assert!(hook.materialize::<Plain>().is_none());
        assert!(hook.is_loaded::<Plain>());
        assert!(LoadHook::logger_of::<Plain>().is_none());
    }

    #[test]
    fn test_after_load_runs_once_across_hooks() {
        let first_manager = manager();
        let second_manager = manager();
        let first_hook = LoadHook::new(&first_manager);
        let second_hook = LoadHook::new(&second_manager);

        let first = first_hook.materialize::<Refunds>().expect("slot declared");
        let second = second_hook.materialize::<Refunds>().expect("slot declared");

        assert_eq!(REFUND_SETUP_CALLS.load(Ordering::SeqCst), 1);
        // the slot is process-wide, so the first injected logger stays
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first_hook.is_loaded::<Refunds>());
        assert!(second_hook.is_loaded::<Refunds>());
    }
}
