//! Live-instance accounting for matrices.
//!
//! Each [`Matrix`](crate::math::Matrix) holds an [`InstanceToken`] obtained
//! from the counter it was created under. The token increments the count when
//! issued and decrements it when dropped, so the count always equals the
//! number of live matrices, including those left without storage.
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<InstanceCounter> = OnceLock::new();

/// Shared handle over a live-instance count. Clones observe the same count.
#[derive(Clone, Default)]
pub struct InstanceCounter {
    live: Arc<AtomicUsize>,
}

impl InstanceCounter {
    /// A fresh counter starting at zero, independent of every other counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide counter used by the plain `Matrix` constructors.
    pub fn global() -> &'static InstanceCounter {
        GLOBAL.get_or_init(InstanceCounter::new)
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    /// Count one more live instance until the returned token is dropped.
    pub fn track(&self) -> InstanceToken {
        let now = self.live.fetch_add(1, Ordering::AcqRel) + 1;
        log::trace!("live matrix instances: {}", now);
        InstanceToken {
            live: Arc::clone(&self.live),
        }
    }

    /// True when both handles share the same underlying count.
    pub fn same_as(&self, other: &InstanceCounter) -> bool {
        Arc::ptr_eq(&self.live, &other.live)
    }
}

impl fmt::Debug for InstanceCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceCounter")
            .field("live", &self.live())
            .finish()
    }
}

/// Proof of one live instance; decrements its counter on drop.
pub struct InstanceToken {
    live: Arc<AtomicUsize>,
}

impl InstanceToken {
    /// Handle to the counter this token is registered with.
    pub fn counter(&self) -> InstanceCounter {
        InstanceCounter {
            live: Arc::clone(&self.live),
        }
    }

    /// A second token on the same counter.
    pub fn duplicate(&self) -> InstanceToken {
        self.counter().track()
    }
}

impl Drop for InstanceToken {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::AcqRel);
    }
}

impl fmt::Debug for InstanceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceToken")
            .field("live", &self.live.load(Ordering::Acquire))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_balance_the_count() {
        let counter = InstanceCounter::new();
        assert_eq!(counter.live(), 0);
        let a = counter.track();
        let b = a.duplicate();
        assert_eq!(counter.live(), 2);
        drop(a);
        assert_eq!(counter.live(), 1);
        drop(b);
        assert_eq!(counter.live(), 0);
    }

    #[test]
    fn counters_are_isolated() {
        let first = InstanceCounter::new();
        let second = InstanceCounter::new();
        let _token = first.track();
        assert_eq!(first.live(), 1);
        assert_eq!(second.live(), 0);
        assert!(!first.same_as(&second));
        assert!(first.same_as(&first.clone()));
    }

    #[test]
    fn global_is_a_single_counter() {
        assert!(InstanceCounter::global().same_as(InstanceCounter::global()));
    }
}
