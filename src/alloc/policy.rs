use std::{collections::TryReserveError, mem::size_of, num::NonZeroU32, thread, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Interval between two allocation attempts under the default policy.
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(30);

/// Returned when a bounded [`AllocPolicy`] runs out of attempts.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    #[error("allocation of {bytes} bytes failed after {attempts} attempt(s)")]
    Exhausted { bytes: usize, attempts: u32 },
}

/// How a container reacts when the allocator refuses memory.
///
/// A failed reservation is retried after `backoff`. With `max_attempts` unset
/// the retries never stop and the calling thread blocks until memory frees up.
/// With a bound, the last failure is surfaced as an [`AllocError`].
///
/// # Examples
/// ```
/// use lsbucket::alloc::AllocPolicy;
///
/// let mut buffer: Vec<u64> = Vec::new();
/// AllocPolicy::fail_fast().reserve_exact(&mut buffer, 12).unwrap();
/// assert!(buffer.capacity() >= 12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocPolicy {
    pub backoff: Duration,
    pub max_attempts: Option<NonZeroU32>,
}

impl AllocPolicy {
    /// Retries forever, sleeping `backoff` between attempts.
    pub const fn blocking(backoff: Duration) -> Self {
        AllocPolicy {
            backoff,
            max_attempts: None,
        }
    }

    /// Gives up after `attempts` failed reservations.
    pub const fn bounded(backoff: Duration, attempts: NonZeroU32) -> Self {
        AllocPolicy {
            backoff,
            max_attempts: Some(attempts),
        }
    }

    /// Reports the first failure without sleeping.
    pub const fn fail_fast() -> Self {
        AllocPolicy {
            backoff: Duration::ZERO,
            max_attempts: Some(NonZeroU32::MIN),
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.max_attempts.is_none()
    }

    /// Amortized reservation, same growth rules as [`Vec::reserve`].
    pub fn reserve<T>(&self, buffer: &mut Vec<T>, additional: usize) -> Result<(), AllocError> {
        self.retry(bytes_for::<T>(additional), || buffer.try_reserve(additional))
    }

    /// Reserves room for exactly `additional` more elements.
    pub fn reserve_exact<T>(
        &self,
        buffer: &mut Vec<T>,
        additional: usize,
    ) -> Result<(), AllocError> {
        self.retry(bytes_for::<T>(additional), || {
            buffer.try_reserve_exact(additional)
        })
    }

    /// Allocates a boxed slice of `len` copies of `value`.
    pub fn filled<T: Clone>(&self, len: usize, value: T) -> Result<Box<[T]>, AllocError> {
        let mut buffer = Vec::new();
        self.reserve_exact(&mut buffer, len)?;
        buffer.resize(len, value);
        Ok(buffer.into_boxed_slice())
    }

    fn retry<F>(&self, bytes: usize, mut attempt: F) -> Result<(), AllocError>
    where
        F: FnMut() -> Result<(), TryReserveError>,
    {
        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);
            let err = match attempt() {
                Ok(()) => return Ok(()),
                Err(err) => err,
            };

            if let Some(max) = self.max_attempts {
                if attempts >= max.get() {
                    return Err(AllocError::Exhausted { bytes, attempts });
                }
            }

            tracing::warn!(
                bytes,
                attempts,
                backoff = ?self.backoff,
                error = %err,
                "allocation refused, backing off"
            );
            thread::sleep(self.backoff);
        }
    }
}

impl Default for AllocPolicy {
    fn default() -> Self {
        AllocPolicy::blocking(DEFAULT_BACKOFF)
    }
}

fn bytes_for<T>(count: usize) -> usize {
    count.saturating_mul(size_of::<T>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_blocks_with_thirty_second_backoff() {
        let policy = AllocPolicy::default();
        assert!(policy.is_blocking());
        assert_eq!(policy.backoff, Duration::from_secs(30));
    }

    #[test]
    fn reserve_exact_grows_buffer() {
        let mut buffer: Vec<u32> = Vec::new();
        AllocPolicy::fail_fast()
            .reserve_exact(&mut buffer, 100)
            .unwrap();
        assert!(buffer.capacity() >= 100);
        assert!(buffer.is_empty());
    }

    #[test]
    fn reserve_keeps_existing_contents() {
        let mut buffer = vec![1u8, 2, 3];
        AllocPolicy::fail_fast().reserve(&mut buffer, 64).unwrap();
        assert_eq!(buffer, vec![1, 2, 3]);
        assert!(buffer.capacity() >= 67);
    }

    #[test]
    fn filled_allocates_exact_length() {
        let slots = AllocPolicy::default().filled(10, 0u64).unwrap();
        assert_eq!(slots.len(), 10);
        assert!(slots.iter().all(|&slot| slot == 0));
    }

    #[test]
    fn fail_fast_reports_impossible_reservation() {
        let mut buffer: Vec<u64> = Vec::new();
        let err = AllocPolicy::fail_fast()
            .reserve_exact(&mut buffer, usize::MAX / 2)
            .unwrap_err();
        assert_eq!(
            err,
            AllocError::Exhausted {
                bytes: usize::MAX,
                attempts: 1
            }
        );
    }

    #[test]
    fn bounded_policy_counts_every_attempt() {
        let policy = AllocPolicy::bounded(Duration::ZERO, NonZeroU32::new(3).unwrap());
        let mut buffer: Vec<u64> = Vec::new();
        match policy.reserve(&mut buffer, usize::MAX / 2) {
            Err(AllocError::Exhausted { attempts, .. }) => assert_eq!(attempts, 3),
            Ok(()) => panic!("reservation of half the address space should fail"),
        }
    }

    #[test]
    fn policy_round_trips_through_json() {
        let policy = AllocPolicy::bounded(Duration::from_millis(5), NonZeroU32::new(7).unwrap());
        let json = serde_json::to_string(&policy).unwrap();
        let back: AllocPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, policy);
    }
}
