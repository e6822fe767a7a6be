//! Types to generate SCRU64 IDs.

#[cfg(not(feature = "std"))]
use core as std;

use crate::{MAX_TIMESTAMP, NODE_CTR_SIZE, NodeSpec, Scru64Id};
use std::{error, fmt};

pub mod counter_mode;
use counter_mode::{CounterMode, DefaultCounterMode, RenewContext};

#[cfg(test)]
mod tests;

/// The default timestamp rollback allowance (in milliseconds) applied by the methods that
/// obtain the current time from the system clock.
pub const DEFAULT_ROLLBACK_ALLOWANCE: u64 = 10_000; // 10 seconds

/// Represents a SCRU64 ID generator.
///
/// The generator comes with several different methods that generate a SCRU64 ID:
///
/// | Flavor                     | Timestamp | On big clock rewind |
/// | -------------------------- | --------- | ------------------- |
/// | [`generate`]               | Now       | Returns error       |
/// | [`generate_or_reset`]      | Now       | Resets generator    |
/// | [`generate_or_sleep`]      | Now       | Sleeps (blocking)   |
/// | [`generate_or_await`]      | Now       | Sleeps (async)      |
/// | [`generate_or_abort_core`] | Argument  | Returns error       |
/// | [`generate_or_reset_core`] | Argument  | Resets generator    |
///
/// All of these methods return a monotonically increasing ID by reusing the previous
/// `timestamp` even if the one provided is smaller than the immediately preceding ID's,
/// unless such a clock rollback is considered significant (by default, more than ten
/// seconds). A clock rollback may also be detected if a generator has generated too many IDs
/// within a certain unit of time, because this implementation increments the previous
/// `timestamp` when the counter reaches the limit to continue instant monotonic generation.
/// When a significant clock rollback is detected:
///
/// 1. `generate` and the `core` primitive fail, returning the error to the caller;
/// 2. `or_reset` variants reset the generator and return a new ID based on the given
///    `timestamp`, breaking the increasing order of IDs;
/// 3. `or_sleep` and `or_await` variants sleep and wait for the next timestamp tick.
///
/// The `core` methods are low-level primitives that take an arbitrary Unix timestamp as an
/// argument and never read the system clock.
///
/// # Examples
///
/// ```rust
/// use scru64::generator::Scru64Generator;
///
/// let mut g = Scru64Generator::new("42/8".parse()?);
///
/// let x = g.generate()?;
/// let y = g.generate()?;
/// assert!(x < y);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// [`generate`]: Scru64Generator::generate
/// [`generate_or_reset`]: Scru64Generator::generate_or_reset
/// [`generate_or_sleep`]: Scru64Generator::generate_or_sleep
/// [`generate_or_await`]: Scru64Generator::generate_or_await
/// [`generate_or_abort_core`]: Scru64Generator::generate_or_abort_core
/// [`generate_or_reset_core`]: Scru64Generator::generate_or_reset_core
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Scru64Generator<C = DefaultCounterMode> {
    prev: Scru64Id,
    counter_size: u8,
    counter_mode: C,
}

impl Scru64Generator {
    /// Creates a new generator with the given node configuration and the default counter mode.
    pub const fn new(node_spec: NodeSpec) -> Self {
        Self::with_counter_mode(node_spec, DefaultCounterMode)
    }
}

impl<C> Scru64Generator<C> {
    /// Creates a new generator with the given node configuration and counter mode.
    pub const fn with_counter_mode(node_spec: NodeSpec, counter_mode: C) -> Self {
        Self {
            prev: node_spec.node_prev_raw(),
            counter_size: NODE_CTR_SIZE - node_spec.node_id_size(),
            counter_mode,
        }
    }

    /// Returns the `node_id` of the generator.
    pub const fn node_id(&self) -> u32 {
        self.prev.node_ctr() >> self.counter_size
    }

    /// Returns the size in bits of the `node_id` adopted by the generator.
    pub const fn node_id_size(&self) -> u8 {
        NODE_CTR_SIZE - self.counter_size
    }

    /// Returns the node configuration specifier describing the current generator state.
    ///
    /// The returned node spec carries the ID issued last (if any) as the `node_prev` value, so
    /// it can be persisted and passed to a new generator to resume the monotonic order of IDs
    /// across process restarts.
    pub const fn node_spec(&self) -> NodeSpec {
        NodeSpec::from_raw_parts(self.prev, self.node_id_size())
    }

    const fn counter_mask(&self) -> u32 {
        (1u32 << self.counter_size) - 1
    }
}

impl<C: CounterMode> Scru64Generator<C> {
    /// Calculates the combined `node_ctr` field value for the next `timestamp` tick.
    fn renew_node_ctr(&mut self, timestamp: u64) -> u32 {
        let node_id = self.node_id();
        let context = RenewContext { timestamp, node_id };
        let counter = self.counter_mode.renew(self.counter_size, &context);
        node_id << self.counter_size | counter & self.counter_mask()
    }

    /// Generates a new SCRU64 ID object from a Unix timestamp in milliseconds, guaranteeing
    /// the monotonic order of generated IDs despite a significant timestamp rollback.
    ///
    /// See the [`Scru64Generator`] type documentation for the description.
    ///
    /// `rollback_allowance` specifies the amount of `unix_ts_ms` rollback (in milliseconds)
    /// that is considered significant. A suggested value is `10_000` (milliseconds), which is
    /// also the bound on how far the generator lets the `timestamp` field drift ahead of
    /// `unix_ts_ms` when the counter overflows: after every successful call,
    /// `self.node_spec().node_prev()` embeds a `timestamp` that is less than `(unix_ts_ms +
    /// rollback_allowance) >> 8`.
    ///
    /// # Panics
    ///
    /// Panics if `unix_ts_ms` is so small (less than 256) that the `timestamp` field value
    /// rounds down to zero.
    pub fn generate_or_abort_core(
        &mut self,
        unix_ts_ms: u64,
        rollback_allowance: u64,
    ) -> Result<Scru64Id, GenerateError> {
        let timestamp = unix_ts_ms >> 8;
        let allowance = rollback_allowance >> 8;
        if timestamp == 0 {
            panic!("`timestamp` out of range");
        } else if timestamp > MAX_TIMESTAMP {
            return Err(GenerateError::TimestampOverflow { timestamp });
        }

        let prev_timestamp = self.prev.timestamp();
        if timestamp > prev_timestamp {
            self.prev = Scru64Id::from_parts(timestamp, self.renew_node_ctr(timestamp));
        } else if timestamp + allowance > prev_timestamp {
            // go on with the previous timestamp if the new one is not much smaller
            let prev_node_ctr = self.prev.node_ctr();
            if (prev_node_ctr & self.counter_mask()) < self.counter_mask() {
                self.prev = Scru64Id::from_parts(prev_timestamp, prev_node_ctr + 1);
            } else if prev_timestamp + 1 < timestamp + allowance {
                // increment the previous timestamp at counter overflow
                if prev_timestamp >= MAX_TIMESTAMP {
                    return Err(GenerateError::TimestampOverflow {
                        timestamp: prev_timestamp + 1,
                    });
                }
                let next_timestamp = prev_timestamp + 1;
                self.prev =
                    Scru64Id::from_parts(next_timestamp, self.renew_node_ctr(next_timestamp));
            } else {
                // abort if the incremented timestamp would leave the rollback allowance window
                return Err(GenerateError::CounterExhausted {
                    timestamp,
                    prev_timestamp,
                });
            }
        } else {
            // abort if the clock went backwards to an unbearable extent
            return Err(GenerateError::ClockRegressed {
                timestamp,
                prev_timestamp,
            });
        }
        Ok(self.prev)
    }

    /// Generates a new SCRU64 ID object from a Unix timestamp in milliseconds, returning an
    /// ID based on the given `timestamp` (instead of one based on the previous ID) if a
    /// significant timestamp rollback is detected.
    ///
    /// See the [`Scru64Generator`] type documentation and [`generate_or_abort_core`] for the
    /// description. Note that this method breaks the increasing order of IDs when a
    /// significant rollback is detected; use [`generate_or_abort_core`] to keep the guarantee.
    ///
    /// # Panics
    ///
    /// Panics if `unix_ts_ms` is so small (less than 256) that the `timestamp` field value
    /// rounds down to zero.
    ///
    /// [`generate_or_abort_core`]: Scru64Generator::generate_or_abort_core
    pub fn generate_or_reset_core(
        &mut self,
        unix_ts_ms: u64,
        rollback_allowance: u64,
    ) -> Result<Scru64Id, GenerateError> {
        match self.generate_or_abort_core(unix_ts_ms, rollback_allowance) {
            Err(err) if err.is_recoverable() => {
                // reset state and resume
                let timestamp = unix_ts_ms >> 8;
                self.prev = Scru64Id::from_parts(timestamp, self.renew_node_ctr(timestamp));
                #[cfg(feature = "log")]
                log::warn!("scru64: reset generator state and resumed ({})", err);
                Ok(self.prev)
            }
            result => result,
        }
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl<C: CounterMode> Scru64Generator<C> {
    /// Generates a new SCRU64 ID object from the current `timestamp`.
    ///
    /// See the [`Scru64Generator`] type documentation for the description.
    pub fn generate(&mut self) -> Result<Scru64Id, GenerateError> {
        self.generate_or_abort_core(unix_ts_ms(), DEFAULT_ROLLBACK_ALLOWANCE)
    }

    /// Generates a new SCRU64 ID object from the current `timestamp`, resetting the generator
    /// state if a significant timestamp rollback is detected.
    ///
    /// See the [`Scru64Generator`] type documentation for the description.
    pub fn generate_or_reset(&mut self) -> Result<Scru64Id, GenerateError> {
        self.generate_or_reset_core(unix_ts_ms(), DEFAULT_ROLLBACK_ALLOWANCE)
    }

    /// Returns a new SCRU64 ID object, or synchronously sleeps and waits for one if a
    /// significant timestamp rollback is detected.
    ///
    /// See the [`Scru64Generator`] type documentation for the description.
    pub fn generate_or_sleep(&mut self) -> Result<Scru64Id, GenerateError> {
        loop {
            match self.generate() {
                Err(err) if err.is_recoverable() => std::thread::sleep(SLEEP_DELAY),
                result => break result,
            }
        }
    }

    /// Returns a new SCRU64 ID object, or asynchronously sleeps and waits for one if a
    /// significant timestamp rollback is detected.
    ///
    /// See the [`Scru64Generator`] type documentation for the description.
    #[cfg(feature = "tokio")]
    #[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
    pub async fn generate_or_await(&mut self) -> Result<Scru64Id, GenerateError> {
        loop {
            match self.generate() {
                Err(err) if err.is_recoverable() => tokio::time::sleep(SLEEP_DELAY).await,
                result => break result,
            }
        }
    }
}

/// The delay between retries by the sleep-based methods.
#[cfg(feature = "std")]
pub(crate) const SLEEP_DELAY: std::time::Duration = std::time::Duration::from_millis(64);

/// Returns the current Unix timestamp in milliseconds.
#[cfg(feature = "std")]
fn unix_ts_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock may have gone backwards")
        .as_millis() as u64
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl<C: CounterMode> Iterator for Scru64Generator<C> {
    type Item = Scru64Id;

    /// Returns a new SCRU64 ID for each call, sleeping and waiting for one if not immediately
    /// available, until the `timestamp` field reaches the end of its range.
    fn next(&mut self) -> Option<Self::Item> {
        self.generate_or_sleep().ok()
    }
}

/// An error reported when a generator fails to generate a monotonically ordered ID.
///
/// The `timestamp` values carried by the variants are in the generator's internal
/// 256-millisecond unit.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[non_exhaustive]
pub enum GenerateError {
    /// The wall clock reading went backwards beyond the rollback allowance, so the generator
    /// could not continue from the previous `timestamp` without issuing an ID too far ahead of
    /// the clock.
    ClockRegressed {
        /// The `timestamp` value derived from the clock reading of the failed call.
        timestamp: u64,
        /// The `timestamp` field value of the immediately preceding ID.
        prev_timestamp: u64,
    },

    /// The counter reached its maximum value and the `timestamp` field could not be
    /// incremented without leaving the rollback allowance window.
    CounterExhausted {
        /// The `timestamp` value derived from the clock reading of the failed call.
        timestamp: u64,
        /// The `timestamp` field value of the immediately preceding ID.
        prev_timestamp: u64,
    },

    /// The `timestamp` field reached its maximum value, so the generator can no longer issue
    /// any meaningful ID.
    TimestampOverflow {
        /// The `timestamp` value that did not fit in the field.
        timestamp: u64,
    },
}

impl GenerateError {
    /// Returns `true` if the error is transient and a later call may succeed once the wall
    /// clock moves on, or `false` if the error is permanent.
    ///
    /// Retrying is a caller policy; the generator itself never retries except within the
    /// explicitly named sleep-based methods.
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ClockRegressed { .. } | Self::CounterExhausted { .. }
        )
    }
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not generate SCRU64 ID: ")?;
        match *self {
            Self::ClockRegressed {
                timestamp,
                prev_timestamp,
            } => write!(
                f,
                "clock went backwards beyond the allowance (timestamp: {}, previous: {})",
                timestamp, prev_timestamp
            ),
            Self::CounterExhausted {
                timestamp,
                prev_timestamp,
            } => write!(
                f,
                "counter exhausted and timestamp drift limit reached (timestamp: {}, previous: {})",
                timestamp, prev_timestamp
            ),
            Self::TimestampOverflow { timestamp } => {
                write!(f, "timestamp ({}) exceeded the end of the field range", timestamp)
            }
        }
    }
}

impl error::Error for GenerateError {}
