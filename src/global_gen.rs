//! Default generator and entry point functions.

#![cfg(feature = "global_gen")]
#![cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]

use std::sync;

use crate::{GenerateError, ShardPool, Uuid};

/// Returns the process-wide global pool, creating one if none exists.
pub fn global_pool() -> &'static ShardPool {
    static G: sync::OnceLock<ShardPool> = sync::OnceLock::new();
    G.get_or_init(ShardPool::new)
}

/// Generates a UUIDv7 object.
///
/// This function employs the global [`ShardPool`] and guarantees the monotonic order of UUIDs
/// stamped by the same shard. A thread sticks to one shard, so a single thread observes
/// increasing values, but UUIDs from different threads generated within the same millisecond
/// are not ordered.
///
/// # Errors
///
/// Returns an error if the operating system's random source fails.
///
/// # Examples
///
/// ```rust
/// let uuid = uuid_pool::uuid7()?;
/// println!("{uuid}"); // e.g., "01809424-3e59-7c05-9219-566f82fff672"
/// println!("{:?}", uuid.as_bytes()); // as 16-byte big-endian array
///
/// let uuid_string: String = uuid_pool::uuid7()?.to_string();
/// # Ok::<(), uuid_pool::GenerateError>(())
/// ```
pub fn uuid7() -> Result<Uuid, GenerateError> {
    global_pool().generate_v7()
}

/// Generates a UUIDv4 object.
///
/// # Errors
///
/// Returns an error if the operating system's random source fails.
///
/// # Examples
///
/// ```rust
/// let uuid = uuid_pool::uuid4()?;
/// println!("{uuid}"); // e.g., "2ca4b2ce-6c13-40d4-bccf-37d222820f6f"
/// # Ok::<(), uuid_pool::GenerateError>(())
/// ```
pub fn uuid4() -> Result<Uuid, GenerateError> {
    global_pool().generate_v4()
}

#[cfg(test)]
mod tests {
    use super::{global_pool, uuid4, uuid7};
    use crate::Variant;

    /// Shares a single pool across calls
    #[test]
    fn shares_a_single_pool_across_calls() {
        assert!(std::ptr::eq(global_pool(), global_pool()));
        assert!(global_pool().shard_count().is_power_of_two());
    }

    /// Generates increasing UUIDv7s within a thread
    #[test]
    fn generates_increasing_uuidv7s_within_a_thread() {
        let mut prev = uuid7().unwrap();
        for _ in 0..10_000 {
            let curr = uuid7().unwrap();
            assert!(prev < curr);
            prev = curr;
        }
    }

    /// Sets correct variant and version bits
    #[test]
    fn sets_correct_variant_and_version_bits() {
        for _ in 0..1_000 {
            let e = uuid7().unwrap();
            assert_eq!(e.variant(), Variant::Rfc9562);
            assert_eq!(e.version(), 7);

            let e = uuid4().unwrap();
            assert_eq!(e.variant(), Variant::Rfc9562);
            assert_eq!(e.version(), 4);
        }
    }

    /// Generates no IDs sharing same timestamp and counters under multithreading
    #[test]
    fn generates_no_ids_sharing_same_timestamp_and_counters_under_multithreading(
    ) -> Result<(), Box<dyn std::error::Error>> {
        use std::{collections::HashSet, sync::mpsc, thread};

        let (tx, rx) = mpsc::channel();
        for _ in 0..4 {
            let tx = tx.clone();
            thread::Builder::new()
                .spawn(move || {
                    for _ in 0..10_000 {
                        tx.send((global_pool().shard_index(), uuid7().unwrap()))
                            .unwrap();
                    }
                })
                .map_err(|err| format!("failed to spawn thread: {:?}", err))?;
        }
        drop(tx);

        let mut s = HashSet::new();
        while let Ok((shard, e)) = rx.recv() {
            s.insert((shard, <[u8; 8]>::try_from(&e.as_bytes()[..8])?));
        }

        assert_eq!(s.len(), 4 * 10_000);
        Ok(())
    }
}
