//! Client-side identifier generation.
//!
//! Ids look like `tx_6f1c…` or `item_6f1c…`: a short prefix and a UUID v4.
//! The random source is probed once at start-up. If it is unusable the
//! generator falls back to `<prefix>_<millis>_<hex>`, which is unique
//! enough for a single terminal but has far lower collision resistance.
//!
//! The fallback suffix is 64 random bits from a non-cryptographic PRNG.
//! Without the OS source it is seeded from the clock, the process id, a
//! stack address and a per-process sequence, so it is unpredictable only
//! to the extent those are.

use std::panic;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

static SEED_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Prefix for transaction ids.
pub const TRANSACTION_PREFIX: &str = "tx";

/// Prefix for catalog item ids.
pub const ITEM_PREFIX: &str = "item";

/// Which strategy the generator settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStrategy {
    /// UUID v4 from the OS random source.
    Uuid,
    /// Timestamp plus a seeded random suffix.
    Fallback,
}

#[derive(Debug)]
pub struct IdGenerator {
    strategy: IdStrategy,
    rng: Mutex<StdRng>,
}

impl IdGenerator {
    /// Probes the random source and picks a strategy.
    pub fn detect() -> Self {
        let probe = panic::catch_unwind(Uuid::new_v4);
        let strategy = match probe {
            Ok(id) if !id.is_nil() => IdStrategy::Uuid,
            _ => IdStrategy::Fallback,
        };
        IdGenerator::with_strategy(strategy)
    }

    pub fn with_strategy(strategy: IdStrategy) -> Self {
        IdGenerator {
            strategy,
            rng: Mutex::new(StdRng::seed_from_u64(fallback_seed())),
        }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Generates a new id.
    ///
    /// `now` is only read by the fallback strategy.
    ///
    /// ```rust
    /// use chrono::Utc;
    /// use tally_core::ids::{IdGenerator, IdStrategy};
    ///
    /// let ids = IdGenerator::with_strategy(IdStrategy::Uuid);
    /// let id = ids.generate("tx", Utc::now());
    /// assert!(id.starts_with("tx_"));
    /// assert_eq!(id.len(), 3 + 36);
    /// ```
    pub fn generate(&self, prefix: &str, now: DateTime<Utc>) -> String {
        match self.strategy {
            IdStrategy::Uuid => format!("{}_{}", prefix, Uuid::new_v4()),
            IdStrategy::Fallback => {
                let millis = now.timestamp_millis();
                let suffix: u64 = self
                    .rng
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .gen();
                format!("{}_{}_{:016x}", prefix, millis, suffix)
            }
        }
    }

    pub fn transaction_id(&self, now: DateTime<Utc>) -> String {
        self.generate(TRANSACTION_PREFIX, now)
    }

    pub fn item_id(&self, now: DateTime<Utc>) -> String {
        self.generate(ITEM_PREFIX, now)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        IdGenerator::detect()
    }
}

// Seed for the fallback PRNG. Two generators in one process never share it.
fn fallback_seed() -> u64 {
    let marker = 0u8;
    let address = &marker as *const u8 as usize as u64;
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64;
    let sequence = SEED_SEQUENCE.fetch_add(1, Ordering::Relaxed);

    nanos
        ^ (u64::from(std::process::id()) << 32)
        ^ address.rotate_left(17)
        ^ sequence.wrapping_mul(0x9e37_79b9_7f4a_7c15)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    #[test]
    fn test_detect_prefers_uuid() {
        assert_eq!(IdGenerator::detect().strategy(), IdStrategy::Uuid);
    }

    #[test]
    fn test_uuid_ids_are_unique() {
        let ids = IdGenerator::with_strategy(IdStrategy::Uuid);
        let now = Utc::now();
        let set: HashSet<String> = (0..500).map(|_| ids.transaction_id(now)).collect();
        assert_eq!(set.len(), 500);
        assert!(set.iter().all(|id| id.starts_with("tx_")));
    }

    #[test]
    fn test_fallback_shape_and_uniqueness_within_one_millisecond() {
        let ids = IdGenerator::with_strategy(IdStrategy::Fallback);
        let now = Utc.timestamp_millis_opt(1_741_510_800_000).unwrap();

        let id = ids.item_id(now);
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts[0], "item");
        assert_eq!(parts[1], "1741510800000");
        assert_eq!(parts[2].len(), 16);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));

        let set: HashSet<String> = (0..500).map(|_| ids.item_id(now)).collect();
        assert_eq!(set.len(), 500);
    }

    #[test]
    fn test_fallback_generators_draw_independent_suffixes() {
        let now = Utc.timestamp_millis_opt(1_741_510_800_000).unwrap();
        let first = IdGenerator::with_strategy(IdStrategy::Fallback);
        let second = IdGenerator::with_strategy(IdStrategy::Fallback);

        let a: Vec<String> = (0..4).map(|_| first.transaction_id(now)).collect();
        let b: Vec<String> = (0..4).map(|_| second.transaction_id(now)).collect();
        assert!(a.iter().all(|id| !b.contains(id)));
    }
}
