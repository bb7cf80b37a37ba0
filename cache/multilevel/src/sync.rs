//! Synchronization primitives with optional loom support.
//!
//! Production builds use `parking_lot` locks and std atomics. With the `loom`
//! feature enabled the same names resolve to loom's model-checked versions so
//! the shared cache can be explored exhaustively.

#[cfg(not(feature = "loom"))]
pub use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "loom")]
pub use loom::sync::atomic::{AtomicU64, Ordering};

#[cfg(not(feature = "loom"))]
pub use parking_lot::Mutex;

#[cfg(feature = "loom")]
pub use self::loom_mutex::Mutex;

#[cfg(feature = "loom")]
mod loom_mutex {
    use loom::sync::MutexGuard;

    /// Loom mutex with the non-poisoning `lock()` signature of `parking_lot`.
    pub struct Mutex<T> {
        inner: loom::sync::Mutex<T>,
    }

    impl<T> Mutex<T> {
        /// Create a new mutex holding `value`.
        pub fn new(value: T) -> Self {
            Self {
                inner: loom::sync::Mutex::new(value),
            }
        }

        /// Acquire the lock, ignoring poisoning.
        pub fn lock(&self) -> MutexGuard<'_, T> {
            self.inner
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }
}
