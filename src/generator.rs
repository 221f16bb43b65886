//! Sharded UUID generator and related types.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::{fmt, thread, time};

use crossbeam_utils::CachePadded;
use rand::rngs::OsRng;

use crate::{GenerateError, Uuid, Variant};
use shard::Shard;

mod shard;
pub mod with_rand08;


/// Largest value of the 48-bit `unix_ts_ms` field.
const MAX_TIMESTAMP: u64 = (1 << 48) - 1;

/// Mask for the 62 random bits that follow the variant field.
const MAX_RAND_B: u64 = (1 << 62) - 1;

/// A trait that defines the random number generator interface for [`ShardPool`].
///
/// Each shard owns one instance and calls it only to refill its entropy buffer, so the source
/// may be slow (e.g., a system call) without hurting per-UUID cost.
pub trait RandSource {
    /// Fills the whole of `dest` with cryptographically strong random data.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot supply the bytes. `dest` must then be treated as
    /// garbage.
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), GenerateError>;
}

/// A trait that defines the system clock interface for [`ShardPool`].
pub trait TimeSource {
    /// Returns the current Unix time in milliseconds.
    fn unix_ts_ms(&self) -> u64;
}

/// [`TimeSource`] backed by [`std::time::SystemTime`].
///
/// A clock set before the Unix epoch reads as zero.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct StdSystemTime;

impl TimeSource for StdSystemTime {
    fn unix_ts_ms(&self) -> u64 {
        time::SystemTime::now()
            .duration_since(time::UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64)
    }
}

/// The default random source: the operating system's CSPRNG through `rand`.
pub type DefaultRandSource = with_rand08::Adapter<OsRng>;

/// Represents a generator of UUIDv4 and UUIDv7 that spreads concurrent callers over an array of
/// independent shards.
///
/// Every shard buffers a block of random bytes so that the underlying random source is called
/// once per block instead of once per UUID. Each shard also keeps its own UUIDv7 timestamp and
/// 12-bit counter, updated with lock-free compare-and-swap loops, and guarantees the monotonic
/// order of the UUIDv7s it stamps:
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          unix_ts_ms                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          unix_ts_ms           |  ver  |        counter        |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |var|                        rand                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             rand                              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// The counter is randomly initialized whenever a shard moves to a new millisecond and is
/// incremented for each UUID stamped within the same millisecond. When it is exhausted, the
/// calling thread yields until the clock advances. A clock that moves backwards does not break
/// the order: the shard keeps using its last timestamp.
///
/// # Shard affinity
///
/// Each thread is assigned a ticket on first use and always lands on shard `ticket & mask`. This
/// is best-effort locality only: threads alias once there are more threads than shards, and the
/// monotonic order holds per shard, not per thread nor across the pool. Two UUIDv7s stamped by
/// different shards within the same millisecond may compare either way.
///
/// # Examples
///
/// ```rust
/// use std::{sync::Arc, thread};
/// use uuid_pool::ShardPool;
///
/// let pool = Arc::new(ShardPool::new());
/// thread::scope(|s| {
///     for i in 0..4 {
///         let pool = Arc::clone(&pool);
///         s.spawn(move || {
///             for _ in 0..8 {
///                 println!("{} by thread {}", pool.generate_v7().unwrap(), i);
///             }
///         });
///     }
/// });
/// ```
pub struct ShardPool<R = DefaultRandSource, T = StdSystemTime> {
    shards: Box<[CachePadded<Shard<R>>]>,
    mask: usize,
    time: T,
}

impl ShardPool {
    /// Creates a pool backed by the OS random source and the system clock, with one shard per
    /// unit of available parallelism (rounded up to a power of two).
    pub fn new() -> Self {
        Self::with_sources(|| with_rand08::Adapter(OsRng), StdSystemTime)
    }
}

impl Default for ShardPool {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RandSource, T: TimeSource> ShardPool<R, T> {
    /// Creates a pool with custom sources and one shard per unit of available parallelism.
    ///
    /// `make_rand` is called once per shard so that no two shards share a random stream.
    pub fn with_sources(make_rand: impl FnMut() -> R, time: T) -> Self {
        let parallelism = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        Self::with_shard_count(parallelism, make_rand, time)
    }

    /// Creates a pool with custom sources and at least `count` shards.
    ///
    /// The actual shard count is the smallest power of two not less than `count` (and at least
    /// one).
    pub fn with_shard_count(count: usize, mut make_rand: impl FnMut() -> R, time: T) -> Self {
        let len = count.max(1).next_power_of_two();
        let shards = (0..len)
            .map(|_| CachePadded::new(Shard::new(make_rand())))
            .collect::<Box<[_]>>();
        tracing::debug!(shards = len, "initialized uuid shard pool");
        Self {
            shards,
            mask: len - 1,
            time,
        }
    }

    /// Returns the number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Returns the index of the shard that the calling thread uses.
    pub fn shard_index(&self) -> usize {
        thread_ticket() & self.mask
    }

    fn select(&self) -> &Shard<R> {
        &self.shards[self.shard_index()]
    }

    /// Generates a new UUIDv4 object.
    ///
    /// # Errors
    ///
    /// Returns an error if the shard needed to refill its entropy buffer and the random source
    /// failed.
    pub fn generate_v4(&self) -> Result<Uuid, GenerateError> {
        let mut bytes = [0u8; 16];
        self.select().take_bytes(&mut bytes)?;
        let mut uuid = Uuid::from(bytes);
        uuid.set_version(4);
        uuid.set_variant(Variant::Rfc9562);
        Ok(uuid)
    }

    /// Generates a new UUIDv7 object, monotonically increasing within the selected shard.
    ///
    /// This may yield the calling thread if the shard has used up all 4096 counter values of
    /// the current millisecond.
    ///
    /// # Errors
    ///
    /// Returns an error if the shard needed to refill its entropy buffer and the random source
    /// failed.
    pub fn generate_v7(&self) -> Result<Uuid, GenerateError> {
        let shard = self.select();
        let (unix_ts_ms, counter) =
            shard.next_stamp(|| self.time.unix_ts_ms() & MAX_TIMESTAMP)?;

        let mut tail = [0u8; 8];
        shard.take_bytes(&mut tail)?;
        Ok(Uuid::from_fields_v7(
            unix_ts_ms,
            counter,
            u64::from_be_bytes(tail) & MAX_RAND_B,
        ))
    }
}

impl<R, T: fmt::Debug> fmt::Debug for ShardPool<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardPool")
            .field("shards", &self.shards.len())
            .field("time", &self.time)
            .finish_non_exhaustive()
    }
}

/// Returns a small number fixed per thread, assigned in order of first use.
fn thread_ticket() -> usize {
    static NEXT_TICKET: AtomicUsize = AtomicUsize::new(0);
    thread_local! {
        static TICKET: usize = NEXT_TICKET.fetch_add(1, Ordering::Relaxed);
    }
    // during thread-local teardown any shard will do
    TICKET.try_with(|ticket| *ticket).unwrap_or(0)
}
