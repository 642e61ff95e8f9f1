//! Wall-clock time source used to stamp orders on admission.
//!
//! The matching engine never calls `Utc::now()` directly; every timestamp
//! comes from a `Clock`, so tests can substitute a deterministic one and
//! still exercise real time-priority behaviour.

use chrono::{DateTime, Utc};

/// A source of monotonic wall-clock instants.
///
/// Implementations are not required to be strictly monotonic across
/// threads; the book only relies on timestamps being non-decreasing for
/// orders admitted through a single serialized caller (see the
/// concurrency notes on `OrderBook`).
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Default clock backed by the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::StepClock;
    use super::*;

    #[test]
    fn system_clock_produces_increasing_instants() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn step_clock_is_strictly_increasing() {
        let clock = StepClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b > a);
    }
}
