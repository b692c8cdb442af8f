//! Snowflake identifier generator.
//!
//! Mints time-ordered 64-bit identifiers without a central sequence. Every
//! primary key, attendance record id and login token in the application comes
//! from here.
//!
//! ## Layout
//!
//! ```text
//!  63 62                                     22 21     17 16     12 11          0
//! ┌──┬────────────────────────────────────────┬─────────┬─────────┬─────────────┐
//! │0 │ timestamp delta (41 bits, ms)          │ dc (5)  │ wkr (5) │ seq (12)    │
//! └──┴────────────────────────────────────────┴─────────┴─────────┴─────────────┘
//! ```
//!
//! The top bit is never set, so identifiers always fit a signed SQLite
//! `INTEGER`.
//!
//! ## Usage
//!
//! ```rust
//! use attend::libs::snowflake::Snowflake;
//!
//! let generator = Snowflake::new(1, 1)?;
//! let a = generator.next_id()?;
//! let b = generator.next_id()?;
//! assert!(b > a);
//! # Ok::<(), attend::libs::snowflake::SnowflakeError>(())
//! ```

use chrono::Utc;
use parking_lot::Mutex;
use thiserror::Error;

/// Reference point for the timestamp field: 2010-11-04T01:42:54.657Z.
pub const EPOCH: u64 = 1_288_834_974_657;

pub const TIMESTAMP_BITS: u32 = 41;
pub const DATACENTER_ID_BITS: u32 = 5;
pub const WORKER_ID_BITS: u32 = 5;
pub const SEQUENCE_BITS: u32 = 12;

pub const WORKER_ID_SHIFT: u32 = SEQUENCE_BITS;
pub const DATACENTER_ID_SHIFT: u32 = SEQUENCE_BITS + WORKER_ID_BITS;
pub const TIMESTAMP_SHIFT: u32 = SEQUENCE_BITS + WORKER_ID_BITS + DATACENTER_ID_BITS;

pub const MAX_WORKER_ID: u64 = (1 << WORKER_ID_BITS) - 1;
pub const MAX_DATACENTER_ID: u64 = (1 << DATACENTER_ID_BITS) - 1;
pub const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;
pub const MAX_TIMESTAMP_DELTA: u64 = (1 << TIMESTAMP_BITS) - 1;

/// Failures raised while building a generator or minting an id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnowflakeError {
    /// A worker or datacenter id outside `0..=31`.
    #[error("{field} must be between 0 and {max}, got {value}")]
    Configuration { field: &'static str, value: u64, max: u64 },

    /// The clock reported a time earlier than the last id issued.
    #[error("clock moved backwards, refusing to generate id for {} milliseconds", .last - .now)]
    ClockRegression { last: u64, now: u64 },

    /// The clock is before [`EPOCH`] or past the 41-bit range.
    #[error("timestamp {0} is outside the range representable by a snowflake id")]
    TimestampOutOfRange(u64),
}

/// Source of wall-clock milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

/// The system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        // Before 1970 is as unusable as before EPOCH; next_id rejects both.
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

/// The fields packed into an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdParts {
    /// Absolute Unix time in milliseconds.
    pub timestamp: u64,
    pub datacenter_id: u64,
    pub worker_id: u64,
    pub sequence: u64,
}

impl IdParts {
    /// Splits an identifier back into its fields.
    pub fn from_id(id: u64) -> Self {
        Self {
            timestamp: (id >> TIMESTAMP_SHIFT) + EPOCH,
            datacenter_id: (id >> DATACENTER_ID_SHIFT) & MAX_DATACENTER_ID,
            worker_id: (id >> WORKER_ID_SHIFT) & MAX_WORKER_ID,
            sequence: id & SEQUENCE_MASK,
        }
    }
}

#[derive(Debug)]
struct State {
    last_timestamp: Option<u64>,
    sequence: u64,
}

/// Thread-safe Snowflake generator for one (datacenter, worker) identity.
///
/// Construct it once at startup and share it behind an `Arc`. The
/// read-compare-update of the last timestamp and sequence happens under a
/// single lock, so concurrent callers never receive the same id.
pub struct Snowflake<C: Clock = SystemClock> {
    worker_id: u64,
    datacenter_id: u64,
    clock: C,
    state: Mutex<State>,
}

impl Snowflake<SystemClock> {
    /// Creates a generator driven by the system clock.
    pub fn new(worker_id: u64, datacenter_id: u64) -> Result<Self, SnowflakeError> {
        Self::with_clock(worker_id, datacenter_id, SystemClock)
    }
}

impl<C: Clock> Snowflake<C> {
    /// Creates a generator reading time from `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`SnowflakeError::Configuration`] when either id exceeds 31.
    pub fn with_clock(worker_id: u64, datacenter_id: u64, clock: C) -> Result<Self, SnowflakeError> {
        if worker_id > MAX_WORKER_ID {
            return Err(SnowflakeError::Configuration {
                field: "worker_id",
                value: worker_id,
                max: MAX_WORKER_ID,
            });
        }
        if datacenter_id > MAX_DATACENTER_ID {
            return Err(SnowflakeError::Configuration {
                field: "datacenter_id",
                value: datacenter_id,
                max: MAX_DATACENTER_ID,
            });
        }

        Ok(Self {
            worker_id,
            datacenter_id,
            clock,
            state: Mutex::new(State {
                last_timestamp: None,
                sequence: 0,
            }),
        })
    }

    pub fn worker_id(&self) -> u64 {
        self.worker_id
    }

    /// Generates the next identifier.
    ///
    /// When more than 4096 ids are requested within one millisecond the call
    /// busy-waits for the clock to tick over. The wait is bounded by the
    /// clock's resolution and never sleeps.
    ///
    /// # Errors
    ///
    /// - [`SnowflakeError::ClockRegression`] if the clock moved backward since
    ///   the last id. Generator state is left as it was; the caller must not
    ///   retry until the clock is corrected.
    /// - [`SnowflakeError::TimestampOutOfRange`] if the clock is before
    ///   [`EPOCH`] or beyond the 41-bit window.
    pub fn next_id(&self) -> Result<u64, SnowflakeError> {
        let mut state = self.state.lock();
        let mut timestamp = self.clock.now_millis();
        let mut sequence = 0;

        if let Some(last) = state.last_timestamp {
            if timestamp < last {
                tracing::error!(last, now = timestamp, "clock moved backwards");
                return Err(SnowflakeError::ClockRegression { last, now: timestamp });
            }
            if timestamp == last {
                sequence = (state.sequence + 1) & SEQUENCE_MASK;
                if sequence == 0 {
                    timestamp = self.wait_next_millis(last);
                }
            }
        }

        let delta = timestamp
            .checked_sub(EPOCH)
            .filter(|delta| *delta <= MAX_TIMESTAMP_DELTA)
            .ok_or(SnowflakeError::TimestampOutOfRange(timestamp))?;

        state.last_timestamp = Some(timestamp);
        state.sequence = sequence;

        Ok((delta << TIMESTAMP_SHIFT)
            | (self.datacenter_id << DATACENTER_ID_SHIFT)
            | (self.worker_id << WORKER_ID_SHIFT)
            | sequence)
    }

    fn wait_next_millis(&self, last: u64) -> u64 {
        let mut timestamp = self.clock.now_millis();
        while timestamp <= last {
            std::hint::spin_loop();
            timestamp = self.clock.now_millis();
        }
        timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct FixedClock(AtomicU64);

    impl Clock for FixedClock {
        fn now_millis(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn test_rejects_out_of_range_ids() {
        let err = Snowflake::new(32, 0).err().unwrap();
        assert_eq!(
            err,
            SnowflakeError::Configuration {
                field: "worker_id",
                value: 32,
                max: 31
            }
        );
        assert!(matches!(
            Snowflake::new(0, 40),
            Err(SnowflakeError::Configuration { field: "datacenter_id", .. })
        ));
        assert!(Snowflake::new(31, 31).is_ok());
    }

    #[test]
    fn test_packs_fields() {
        let now = EPOCH + 1_000;
        let generator = Snowflake::with_clock(7, 3, FixedClock(AtomicU64::new(now))).unwrap();

        let first = generator.next_id().unwrap();
        assert_eq!(first, (1_000 << 22) | (3 << 17) | (7 << 12));

        let second = generator.next_id().unwrap();
        let parts = IdParts::from_id(second);
        assert_eq!(
            parts,
            IdParts {
                timestamp: now,
                datacenter_id: 3,
                worker_id: 7,
                sequence: 1
            }
        );
    }

    #[test]
    fn test_sequence_resets_on_new_millisecond() {
        let clock = FixedClock(AtomicU64::new(EPOCH + 5));
        let generator = Snowflake::with_clock(0, 0, clock).unwrap();

        generator.next_id().unwrap();
        generator.next_id().unwrap();
        generator.clock.0.store(EPOCH + 6, Ordering::SeqCst);
        let id = generator.next_id().unwrap();

        assert_eq!(IdParts::from_id(id).sequence, 0);
    }

    #[test]
    fn test_clock_before_epoch_is_out_of_range() {
        let generator = Snowflake::with_clock(0, 0, FixedClock(AtomicU64::new(EPOCH - 1))).unwrap();
        assert_eq!(generator.next_id(), Err(SnowflakeError::TimestampOutOfRange(EPOCH - 1)));
    }

    #[test]
    fn test_top_bit_never_set() {
        let generator = Snowflake::with_clock(31, 31, FixedClock(AtomicU64::new(EPOCH + MAX_TIMESTAMP_DELTA))).unwrap();
        let id = generator.next_id().unwrap();
        assert!(i64::try_from(id).is_ok());
    }
}
