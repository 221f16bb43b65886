//! Per-shard state: buffered entropy and the UUIDv7 timestamp/counter pair.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

use super::RandSource;
use crate::GenerateError;

/// Size of the entropy block fetched from the random source at a time.
pub(crate) const BUFFER_SIZE: usize = 1024;

const COUNTER_BITS: u32 = 12;
const COUNTER_MASK: u64 = (1 << COUNTER_BITS) - 1;
#[cfg(test)]
pub(crate) const MAX_COUNTER: u16 = COUNTER_MASK as u16;

pub(crate) struct Shard<R> {
    /// `unix_ts_ms << 12 | counter` of the latest UUIDv7 stamped by this shard.
    state: AtomicU64,
    entropy: Mutex<EntropyBuffer<R>>,
}

impl<R: RandSource> Shard<R> {
    pub(crate) fn new(rng: R) -> Self {
        Self {
            state: AtomicU64::new(0),
            entropy: Mutex::new(EntropyBuffer::new(rng)),
        }
    }

    /// Copies `dest.len()` bytes that no caller has received before, refilling the buffer first
    /// if not enough bytes remain.
    pub(crate) fn take_bytes(&self, dest: &mut [u8]) -> Result<(), GenerateError> {
        // the buffer is never left half-updated, so a poisoned lock is still usable
        self.entropy
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take(dest)
    }

    /// Reserves the next `(unix_ts_ms, counter)` pair of this shard.
    ///
    /// `clock` is read once up front and again after every wait for a counter overflow.
    pub(crate) fn next_stamp(
        &self,
        mut clock: impl FnMut() -> u64,
    ) -> Result<(u64, u16), GenerateError> {
        let mut now = clock();
        let mut seed = None;
        let mut waiting = false;
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let (last, counter) = unpack(current);
            let next = if now > last {
                // drawn at most once per call, even if the swap below loses a race
                let counter = match seed {
                    Some(counter) => counter,
                    None => {
                        let counter = self.random_counter()?;
                        seed = Some(counter);
                        counter
                    }
                };
                pack(now, counter)
            } else if counter < COUNTER_MASK {
                // same millisecond, or the clock went backwards
                current + 1
            } else {
                if !waiting {
                    tracing::trace!(unix_ts_ms = last, "counter exhausted; waiting for clock");
                    waiting = true;
                }
                thread::yield_now();
                now = clock();
                current = self.state.load(Ordering::Acquire);
                continue;
            };

            match self
                .state
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    let (unix_ts_ms, counter) = unpack(next);
                    return Ok((unix_ts_ms, counter as u16));
                }
                Err(actual) => current = actual,
            }
        }
    }

    /// Draws a random starting counter for a new millisecond.
    fn random_counter(&self) -> Result<u64, GenerateError> {
        let mut seed = [0u8; 2];
        self.take_bytes(&mut seed)?;
        Ok(u64::from(u16::from_be_bytes(seed)) & COUNTER_MASK)
    }
}

const fn pack(unix_ts_ms: u64, counter: u64) -> u64 {
    (unix_ts_ms << COUNTER_BITS) | counter
}

const fn unpack(state: u64) -> (u64, u64) {
    (state >> COUNTER_BITS, state & COUNTER_MASK)
}

struct EntropyBuffer<R> {
    rng: R,
    bytes: [u8; BUFFER_SIZE],
    /// Offset of the first unused byte; bytes before it have been handed out.
    cursor: usize,
    /// Process that last filled the buffer, so that a forked child never replays its parent's
    /// entropy.
    #[cfg(unix)]
    pid: u32,
}

impl<R: RandSource> EntropyBuffer<R> {
    fn new(rng: R) -> Self {
        Self {
            rng,
            bytes: [0; BUFFER_SIZE],
            cursor: BUFFER_SIZE,
            #[cfg(unix)]
            pid: std::process::id(),
        }
    }

    fn take(&mut self, dest: &mut [u8]) -> Result<(), GenerateError> {
        debug_assert!(dest.len() <= BUFFER_SIZE);
        if self.cursor + dest.len() > BUFFER_SIZE || self.forked() {
            self.refill()?;
        }
        let end = self.cursor + dest.len();
        dest.copy_from_slice(&self.bytes[self.cursor..end]);
        self.cursor = end;
        Ok(())
    }

    fn refill(&mut self) -> Result<(), GenerateError> {
        // stays exhausted if the source fails midway
        self.cursor = BUFFER_SIZE;
        if let Err(err) = self.rng.try_fill_bytes(&mut self.bytes) {
            tracing::warn!(error = %err, "random source failed to refill entropy buffer");
            return Err(err);
        }
        self.cursor = 0;
        #[cfg(unix)]
        {
            self.pid = std::process::id();
        }
        tracing::trace!(bytes = BUFFER_SIZE, "refilled entropy buffer");
        Ok(())
    }

    #[cfg(unix)]
    fn forked(&self) -> bool {
        self.pid != std::process::id()
    }

    #[cfg(not(unix))]
    fn forked(&self) -> bool {
        false
    }
}
