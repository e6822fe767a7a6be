//! Types to customize the counter behavior of [`Scru64Generator`].
//!
//! [`Scru64Generator`]: super::Scru64Generator

use rand_core09::RngCore;

/// A trait to customize the initial counter value for each new `timestamp`.
///
/// [`Scru64Generator`] calls `renew()` to obtain the initial counter value when the `timestamp`
/// field has changed since the immediately preceding ID. Types implementing this trait may
/// apply their respective logic to calculate the initial counter value.
///
/// [`Scru64Generator`]: super::Scru64Generator
pub trait CounterMode {
    /// Returns the next initial counter value of `counter_size` bits.
    ///
    /// [`Scru64Generator`] passes the `counter_size` (from 1 to 23) and other context
    /// information that may be useful for counter renewal. The returned value must be within
    /// the range of `counter_size`-bit unsigned integer; the generator truncates any excess
    /// bits to keep the `node_id` field intact.
    ///
    /// [`Scru64Generator`]: super::Scru64Generator
    fn renew(&mut self, counter_size: u8, context: &RenewContext) -> u32;
}

/// Represents the context information provided by [`Scru64Generator`] to
/// [`CounterMode::renew()`].
///
/// [`Scru64Generator`]: super::Scru64Generator
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[non_exhaustive]
pub struct RenewContext {
    /// The `timestamp` value for the new ID.
    pub timestamp: u64,

    /// The `node_id` of the generator.
    pub node_id: u32,
}

/// The default counter mode that restarts the counter at zero for each new `timestamp` tick.
///
/// This mode spends the whole counter space on the monotonic order of IDs, at the cost of
/// exposing the exact number of IDs generated within each `timestamp` tick.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct DefaultCounterMode;

impl CounterMode for DefaultCounterMode {
    fn renew(&mut self, _counter_size: u8, _context: &RenewContext) -> u32 {
        0
    }
}

/// The "initialize a portion counter" mode that restarts the counter at a random number for
/// each new `timestamp` tick, with the specified number of leading guard bits set to zero to
/// reserve space as the counter overflow guard.
///
/// Note that the random number generator employed does not need to be cryptographically
/// strong; this mode does not pay for security because a small random number is insecure
/// anyway.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct BiasedCounterMode<R> {
    overflow_guard_size: u8,
    rng: R,
}

impl<R: RngCore> BiasedCounterMode<R> {
    /// Creates a new instance with the size (in bits) of overflow guard bits and a random
    /// number generator that sources the counter bias.
    pub const fn with_rng(overflow_guard_size: u8, rng: R) -> Self {
        Self {
            overflow_guard_size,
            rng,
        }
    }
}

#[cfg(feature = "default_rng")]
impl BiasedCounterMode<rand09::rngs::StdRng> {
    /// Creates a new instance with the size (in bits) of overflow guard bits, sourcing the
    /// counter bias from an operating-system-seeded random number generator.
    #[cfg_attr(docsrs, doc(cfg(feature = "default_rng")))]
    pub fn new(overflow_guard_size: u8) -> Self {
        use rand09::SeedableRng as _;
        Self::with_rng(overflow_guard_size, rand09::rngs::StdRng::from_os_rng())
    }
}

impl<R: RngCore> CounterMode for BiasedCounterMode<R> {
    /// Returns the next initial counter value of `counter_size` bits, or zero if `counter_size`
    /// does not exceed the overflow guard size.
    fn renew(&mut self, counter_size: u8, _context: &RenewContext) -> u32 {
        if counter_size > self.overflow_guard_size {
            let n_filled_bits = counter_size - self.overflow_guard_size;
            self.rng.next_u32() >> (32 - n_filled_bits)
        } else {
            0
        }
    }
}
