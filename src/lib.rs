//! # SCRU64: Sortable, Clock-based, Realm-specifically Unique identifier
//!
//! SCRU64 ID offers compact, time-ordered unique identifiers generated by distributed nodes.
//! SCRU64 has the following features:
//!
//! - ~62-bit non-negative integer storable as signed/unsigned 64-bit integer
//! - Sortable by generation time (as integer and as text)
//! - 12-digit case-insensitive textual representation (Base36)
//! - ~38-bit Unix epoch-based timestamp that ensures useful life until year 4261
//! - Variable-length node/machine ID and counter fields that share 24 bits
//!
//! ```rust
//! use scru64::SharedGenerator;
//!
//! // the node configuration is resolved by the application, e.g., from an environment
//! // variable, and is passed in explicitly
//! let g = SharedGenerator::new("42/8".parse()?);
//!
//! // generate a new identifier object
//! let x = g.generate()?;
//! println!("{x}"); // e.g., "0u2r85hm2pt3"
//! println!("{}", x.to_u64()); // as a 64-bit unsigned integer
//!
//! // generate a textual representation directly
//! println!("{}", g.generate_string()?); // e.g., "0u2r85hm2pt4"
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Unlike its cousins that fill their low-order bits with randomness, SCRU64 relies on a
//! centrally assigned node ID to guarantee uniqueness, so it is *realm-specifically* unique:
//! two IDs never collide as long as they are generated within the administrative domain that
//! assigns a distinct node ID to each generator. See [`NodeSpec`] for how a node configuration
//! is expressed and [`generator::Scru64Generator`] for the clock-rollback and
//! counter-overflow behaviors.
//!
//! ## Crate features
//!
//! Default features:
//!
//! - `shared_gen`: Enables [`SharedGenerator`], a mutex-guarded handle to a generator shared
//!   among threads.
//! - `std` (enabled by `shared_gen`): Enables the system-clock-based generator methods and
//!   the integration with [`String`]. Without `std`, this crate provides the primary types
//!   and the clock-agnostic `core` generator methods in a `no_std` environment.
//!
//! Optional features:
//!
//! - `default_rng`: Enables [`generator::counter_mode::BiasedCounterMode::new`], which
//!   sources the counter bias from an operating-system-seeded random number generator.
//! - `serde`: Enables the serialization and deserialization of [`Scru64Id`] and [`NodeSpec`].
//! - `log`: Enables logging through the `log` facade when a generator resets its state.
//! - `tokio`: Enables the asynchronous `generate_or_await` methods backed by the Tokio timer.

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod id;
mod node_spec;
mod shared_gen;

pub mod generator;

pub use id::{ParseError, RangeError, Scru64Id};
pub use node_spec::{NodeSpec, NodeSpecError};

#[cfg(feature = "shared_gen")]
#[cfg_attr(docsrs, doc(cfg(feature = "shared_gen")))]
pub use shared_gen::SharedGenerator;

/// The total size in bits of the `node_id` and `counter` fields.
const NODE_CTR_SIZE: u8 = 24;

/// The maximum valid value of a SCRU64 ID (i.e., `zzzzzzzzzzzz`).
const MAX_SCRU64_INT: u64 = 36u64.pow(12) - 1;

/// The maximum valid value of the `timestamp` field.
const MAX_TIMESTAMP: u64 = MAX_SCRU64_INT >> NODE_CTR_SIZE;

/// The maximum valid value of the combined `node_ctr` field.
const MAX_NODE_CTR: u32 = (1 << NODE_CTR_SIZE) - 1;
