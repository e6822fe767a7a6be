#![cfg(feature = "shared_gen")]

use crate::generator::counter_mode::{CounterMode, DefaultCounterMode};
use crate::generator::{GenerateError, SLEEP_DELAY, Scru64Generator};
use crate::{NodeSpec, Scru64Id};
use std::sync::{Mutex, MutexGuard};

/// A thread-safe handle to a [`Scru64Generator`] shared among threads.
///
/// This handle serializes concurrent `generate` calls through a mutex so that no two callers
/// observe the same generator state and receive duplicate IDs. It is usually constructed once
/// per process from an externally resolved node configuration and then shared by reference or
/// within an [`Arc`](std::sync::Arc).
///
/// # Examples
///
/// ```rust
/// use scru64::SharedGenerator;
///
/// // resolve the node configuration outside the library, e.g., from an environment variable
/// # std::env::set_var("SCRU64_NODE_SPEC", "42/8");
/// let node_spec = std::env::var("SCRU64_NODE_SPEC")?.parse()?;
/// let g = SharedGenerator::new(node_spec);
///
/// let x = g.generate()?;
/// let y = g.generate()?;
/// assert!(x < y);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[cfg_attr(docsrs, doc(cfg(feature = "shared_gen")))]
#[derive(Debug)]
pub struct SharedGenerator<C = DefaultCounterMode> {
    inner: Mutex<Scru64Generator<C>>,
}

impl SharedGenerator {
    /// Creates a new shared generator with the given node configuration and the default
    /// counter mode.
    pub const fn new(node_spec: NodeSpec) -> Self {
        Self::with_counter_mode(node_spec, DefaultCounterMode)
    }
}

impl<C> SharedGenerator<C> {
    /// Creates a new shared generator with the given node configuration and counter mode.
    pub const fn with_counter_mode(node_spec: NodeSpec, counter_mode: C) -> Self {
        Self {
            inner: Mutex::new(Scru64Generator::with_counter_mode(node_spec, counter_mode)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Scru64Generator<C>> {
        self.inner
            .lock()
            .expect("scru64: could not lock shared generator")
    }

    /// Returns the `node_id` of the generator.
    pub fn node_id(&self) -> u32 {
        self.lock().node_id()
    }

    /// Returns the size in bits of the `node_id` adopted by the generator.
    pub fn node_id_size(&self) -> u8 {
        self.lock().node_id_size()
    }

    /// Returns the node configuration specifier describing the current generator state.
    ///
    /// The returned node spec changes as the generator issues new IDs; see
    /// [`Scru64Generator::node_spec`] for how to use it to resume the monotonic order across
    /// process restarts.
    pub fn node_spec(&self) -> NodeSpec {
        self.lock().node_spec()
    }
}

impl<C: CounterMode> SharedGenerator<C> {
    /// Generates a new SCRU64 ID object from the current `timestamp`.
    ///
    /// See the [`Scru64Generator`] type documentation for the behavior on significant clock
    /// rollbacks.
    pub fn generate(&self) -> Result<Scru64Id, GenerateError> {
        self.lock().generate()
    }

    /// Generates a new SCRU64 ID object from the current `timestamp`, resetting the generator
    /// state if a significant timestamp rollback is detected.
    ///
    /// See the [`Scru64Generator`] type documentation for the description.
    pub fn generate_or_reset(&self) -> Result<Scru64Id, GenerateError> {
        self.lock().generate_or_reset()
    }

    /// Returns a new SCRU64 ID object, or synchronously sleeps and waits for one if a
    /// significant timestamp rollback is detected.
    ///
    /// The lock is released while sleeping so that other threads are not blocked for the
    /// duration of the wait.
    pub fn generate_or_sleep(&self) -> Result<Scru64Id, GenerateError> {
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
    /// The lock is released while sleeping so that other tasks and threads are not blocked for
    /// the duration of the wait.
    #[cfg(feature = "tokio")]
    #[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
    pub async fn generate_or_await(&self) -> Result<Scru64Id, GenerateError> {
        loop {
            match self.generate() {
                Err(err) if err.is_recoverable() => tokio::time::sleep(SLEEP_DELAY).await,
                result => break result,
            }
        }
    }

    /// Generates a new SCRU64 ID encoded in the 12-digit canonical string representation.
    ///
    /// Use this to quickly get a new SCRU64 ID as a string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use scru64::SharedGenerator;
    ///
    /// let g = SharedGenerator::new("42/8".parse()?);
    /// let x = g.generate_string()?; // e.g., "0u2r85hm2pt3"
    ///
    /// assert!(regex::Regex::new(r"^[0-9a-z]{12}$").unwrap().is_match(&x));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn generate_string(&self) -> Result<String, GenerateError> {
        self.generate().map(Into::into)
    }
}
