//! Integration with `rand` (v0.8) crate.

use rand::RngCore;

use super::{RandSource, ShardPool, TimeSource};
use crate::GenerateError;

/// An adapter that implements [`RandSource`] for [`RngCore`] types.
///
/// Failures reported through [`RngCore::try_fill_bytes`] surface as
/// [`GenerateError::RandSource`].
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct Adapter<T>(/** The wrapped [`RngCore`] type. */ pub T);

impl<T: RngCore> RandSource for Adapter<T> {
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), GenerateError> {
        self.0.try_fill_bytes(dest).map_err(GenerateError::rand_source)
    }
}

impl<T: RngCore, S: TimeSource> ShardPool<Adapter<T>, S> {
    /// Creates a pool whose shards each draw from an RNG built by `make_rng`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rand::rngs::OsRng;
    /// use uuid_pool::{ShardPool, StdSystemTime};
    ///
    /// let pool = ShardPool::with_rand08(|| OsRng, StdSystemTime);
    /// println!("{}", pool.generate_v7()?);
    /// # Ok::<(), uuid_pool::GenerateError>(())
    /// ```
    pub fn with_rand08(mut make_rng: impl FnMut() -> T, time: S) -> Self {
        Self::with_sources(|| Adapter(make_rng()), time)
    }
}
