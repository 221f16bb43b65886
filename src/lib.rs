//! A sharded, lock-free generator of RFC 9562 UUIDs
//!
//! ```rust
//! use uuid_pool::{uuid4, uuid7};
//!
//! let uuid = uuid7()?;
//! println!("{}", uuid); // e.g. "01809424-3e59-7c05-9219-566f82fff672"
//! println!("{:?}", uuid.as_bytes()); // as 16-byte big-endian array
//!
//! let uuid = uuid4()?;
//! println!("{}", uuid); // e.g. "2ca4b2ce-6c13-40d4-bccf-37d222820f6f"
//! # Ok::<(), uuid_pool::GenerateError>(())
//! ```
//!
//! See [RFC 9562](https://www.rfc-editor.org/rfc/rfc9562).
//!
//! # Design
//!
//! A [`ShardPool`] owns a power-of-two array of cache-padded shards, at least one per unit of
//! available parallelism. Each calling thread is routed to one shard, where:
//!
//! - random bytes are served from a 1 KiB buffer that is refilled wholesale from the operating
//!   system only when exhausted, so one system call pays for dozens of UUIDs;
//! - UUIDv7 timestamps and 12-bit counters advance through compare-and-swap loops on a single
//!   atomic word, without locks. The counter is randomly seeded per millisecond and, once
//!   exhausted, the caller yields until the clock ticks over.
//!
//! UUIDv7s stamped by one shard are strictly increasing; those stamped by different shards in
//! the same millisecond are not ordered against each other.
//!
//! The [`uuid7`] and [`uuid4`] functions use a lazily created process-wide pool. Construct a
//! [`ShardPool`] directly to inject a custom [`RandSource`] or [`TimeSource`]:
//!
//! ```rust
//! use uuid_pool::{ShardPool, StdSystemTime};
//!
//! let pool = ShardPool::with_rand08(rand::rngs::OsRng::default, StdSystemTime);
//! let uuid = pool.generate_v7()?;
//! assert_eq!(uuid.version(), 7);
//! # Ok::<(), uuid_pool::GenerateError>(())
//! ```
//!
//! # Crate features
//!
//! Default features:
//!
//! - `global_gen`: enables the process-wide pool behind [`uuid7`] and [`uuid4`].
//!
//! Optional features:
//!
//! - `serde`: enables serialization/deserialization of [`Uuid`] and [`NullUuid`].
//! - `uuid`: enables conversion from/to the [uuid] crate's [`Uuid`](uuid::Uuid) type.

#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
pub use error::{GenerateError, ParseError};

mod id;
pub use id::{Uuid, Variant};

pub mod generator;
#[doc(no_inline)]
pub use generator::{RandSource, ShardPool, StdSystemTime, TimeSource};

mod sql;
pub use sql::{NullUuid, SqlValue};

mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::{global_pool, uuid4, uuid7};
