use std::{io::Write, mem::size_of};

use crate::{
    alloc::AllocPolicy,
    error::LsbError,
    kmer::{Kmer, decode, symbol_at},
};

/// Longest k-mer whose bucket labels fit in 64 bits.
pub const MAX_BUCKET_K: usize = 30;

/// Name of the file a bucket table for `k` is written to.
pub fn bucket_file_name(k: usize) -> String {
    format!("buckets-{k}.txt")
}

/// Number of buckets used for k-mers of length `k`: one per k-mer and
/// position holding an `A`, which comes to `k * 4^(k-1)`.
pub fn bucket_count(k: usize) -> Option<usize> {
    (1..=MAX_BUCKET_K).contains(&k).then(|| k << (2 * (k - 1)))
}

fn check_bucket_k(k: usize) -> Result<(), LsbError> {
    if k == 0 || k > MAX_BUCKET_K {
        return Err(LsbError::configuration(format!(
            "bucket labels need k between 1 and {MAX_BUCKET_K}, got {k}"
        )));
    }
    Ok(())
}

/// Labels of the `k` buckets the k-mer `x` falls into.
///
/// A bucket gathers the four k-mers that agree everywhere except at one
/// position, so two k-mers share a bucket exactly when they differ by at most
/// one substitution. Buckets are labelled from 1 in the order a scan of all
/// k-mers in increasing key order creates them, each k-mer opening one bucket
/// per `A` it carries, leftmost position first.
///
/// The labels are computed directly from the symbols of `x` without the
/// scan. Those for positions holding `C`, `G` or `T` come first, left to
/// right, followed by those for positions holding `A`.
///
/// Fails with [`LsbError::Configuration`] when `k` exceeds [`MAX_BUCKET_K`].
///
/// # Examples
/// ```
/// use lsbucket::kmer::{assign_buckets, encode};
///
/// assert_eq!(assign_buckets(encode(b"AAA").unwrap(), 3).unwrap(), vec![1, 2, 3]);
/// assert_eq!(assign_buckets(encode(b"TTT").unwrap(), 3).unwrap(), vec![24, 45, 48]);
/// ```
pub fn assign_buckets(x: Kmer, k: usize) -> Result<Vec<usize>, LsbError> {
    check_bucket_k(k)?;

    // intermediate terms may wrap, the final labels fit in 64 bits
    let mut num_a = vec![0u64; k];
    let mut val = vec![0u64; k];
    let mut mu = vec![0u64; k];

    let top = 2 * (k - 1);
    let mut mask: u64 = 3 << top;
    let mut p: u64 = 1 << top;
    let mut cur = x & mask;
    val[0] = x.wrapping_sub(cur);
    mu[0] = if cur != 0 {
        p.wrapping_add((cur >> 2).wrapping_mul(k as u64 - 1))
    } else {
        val[0]
    };
    let mut sum_mu = mu[0];

    for i in 1..k {
        num_a[i] = num_a[i - 1] + u64::from(cur == 0);
        mask >>= 2;
        cur = x & mask;
        p >>= 2;

        val[i] = val[i - 1].wrapping_sub(cur);
        mu[i] = if cur != 0 {
            p.wrapping_add((cur >> 2).wrapping_mul((k - i - 1) as u64))
        } else {
            val[i]
        };
        sum_mu = sum_mu.wrapping_add(mu[i]);
    }

    let mut labels = vec![0; k];
    let mut front = 0;
    let mut tail = (0..k).filter(|&position| symbol_at(x, position) != 0).count();
    let mut mask: u64 = 3 << top;
    for i in 0..k {
        let cur = x & mask;
        mask >>= 2;
        let label = sum_mu
            .wrapping_sub(mu[i])
            .wrapping_add(val[i])
            .wrapping_sub(num_a[i].wrapping_mul(cur))
            .wrapping_add(1 + num_a[i]) as usize;
        if cur != 0 {
            labels[front] = label;
            front += 1;
        } else {
            labels[tail] = label;
            tail += 1;
        }
    }
    Ok(labels)
}

/// Bucket labels of every k-mer of one length, built by scanning all k-mers
/// and opening buckets in label order.
///
/// This is the reference the closed form of [`assign_buckets`] is checked
/// against. It holds `k * 4^k` labels.
pub struct BucketTable {
    k: usize,
    labels: Box<[usize]>,
}

impl BucketTable {
    pub fn enumerate(k: usize, policy: AllocPolicy) -> Result<Self, LsbError> {
        check_bucket_k(k)?;
        let len = 1usize
            .checked_shl(2 * k as u32)
            .and_then(|kmers| kmers.checked_mul(k))
            .filter(|len| {
                len.checked_mul(size_of::<usize>())
                    .is_some_and(|bytes| bytes <= isize::MAX as usize)
            })
            .ok_or_else(|| {
                LsbError::configuration(format!("a bucket table for k = {k} does not fit in memory"))
            })?;

        let mut table = BucketTable {
            k,
            labels: policy.filled(len, 0)?,
        };
        let mut label = 1;
        for x in 0..table.kmers() {
            for position in (0..k).rev() {
                if symbol_at(x, position) != 0 {
                    continue;
                }
                let shift = position * 2;
                for symbol in 0..4u64 {
                    table.add(x | (symbol << shift), label);
                }
                label += 1;
            }
        }
        tracing::debug!(k, buckets = label - 1, "bucket table enumerated");
        Ok(table)
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of k-mers covered, `4^k`.
    pub fn kmers(&self) -> Kmer {
        1 << (2 * self.k)
    }

    pub fn buckets(&self, x: Kmer) -> &[usize] {
        let start = x as usize * self.k;
        &self.labels[start..start + self.k]
    }

    fn add(&mut self, x: Kmer, label: usize) {
        let start = x as usize * self.k;
        if let Some(slot) = self.labels[start..start + self.k]
            .iter_mut()
            .find(|slot| **slot == 0)
        {
            *slot = label;
        }
    }

    /// Compares every entry with [`assign_buckets`] and returns how many
    /// labels disagree. Each disagreement is logged.
    pub fn verify(&self) -> Result<usize, LsbError> {
        let mut wrong = 0;
        for x in 0..self.kmers() {
            let assigned = assign_buckets(x, self.k)?;
            for (&expected, &got) in self.buckets(x).iter().zip(&assigned) {
                if expected != got {
                    tracing::error!(
                        kmer = %decode(x, self.k),
                        expected,
                        assigned = got,
                        "wrong bucket"
                    );
                    wrong += 1;
                }
            }
        }
        Ok(wrong)
    }

    /// Writes one line per k-mer: the sequence, a colon, then its labels.
    pub fn write_to<W: Write>(&self, mut out: W) -> Result<(), LsbError> {
        for x in 0..self.kmers() {
            write!(out, "{}:", decode(x, self.k))?;
            for label in self.buckets(x) {
                write!(out, " {label}")?;
            }
            writeln!(out)?;
        }
        out.flush()?;
        Ok(())
    }
}
