use std::{io::Write, mem, mem::size_of};

use crate::{
    alloc::AllocPolicy,
    error::LsbError,
    kmer::{Kmer, MAX_K, decode, symbol_at},
};

/// Name of the file a D1 sample for `k` is written to.
pub fn sample_file_name(k: usize) -> String {
    format!("{k:02}01.sample")
}

/// Whether the k-mer `x` belongs to the sample that is guaranteed to hit
/// every substitution neighborhood of radius one.
///
/// Membership is decided by the last symbol minus the sum of all the others,
/// taken mod 4: a k-mer is sampled when that residue is zero. Changing a
/// single symbol moves the residue through all four values, so exactly one
/// variant at each position is sampled and the sample holds `4^(k-1)` of the
/// `4^k` k-mers.
pub fn is_in_sample_d1(x: Kmer, k: usize) -> bool {
    let residue = (1..k).fold(symbol_at(x, 0), |residue, position| {
        (residue + 4 - symbol_at(x, position)) & 3
    });
    residue == 0
}

/// Builds the whole D1 sample for length `k`, in increasing key order.
///
/// All k-mers split into four classes by the residue [`is_in_sample_d1`]
/// tests, and the sample is class zero. Starting from the four single
/// symbols, class `q` of the (i+1)-mers is symbol `a` prepended to each
/// member of class `(q + a) mod 4` of the i-mers, for `a` in `A C G T` order.
pub fn generate_sample_d1(k: usize, policy: AllocPolicy) -> Result<Vec<Kmer>, LsbError> {
    if k == 0 || k > MAX_K {
        return Err(LsbError::configuration(format!(
            "k must be between 1 and {MAX_K}, got {k}"
        )));
    }
    let size = 1usize << (2 * (k - 1));
    if size
        .checked_mul(size_of::<Kmer>())
        .is_none_or(|bytes| bytes > isize::MAX as usize)
    {
        return Err(LsbError::configuration(format!(
            "a D1 sample for k = {k} does not fit in memory"
        )));
    }

    let mut classes: [Vec<Kmer>; 4] = [vec![0], vec![1], vec![2], vec![3]];
    for length in 1..k {
        let shift = 2 * length;
        let class_len = 1usize << (2 * (length - 1));
        let mut next: [Vec<Kmer>; 4] = Default::default();
        for (q, class) in next.iter_mut().enumerate() {
            policy.reserve_exact(class, 4 * class_len)?;
            for symbol in 0..4u64 {
                let source = &classes[(q + symbol as usize) % 4];
                class.extend(source.iter().map(|&x| (symbol << shift) | x));
            }
        }
        classes = next;
    }

    let sample = mem::take(&mut classes[0]);
    tracing::debug!(k, size = sample.len(), "D1 sample generated");
    Ok(sample)
}

/// Writes the sample size on the first line, then one k-mer per line.
pub fn write_sample<W: Write>(mut out: W, k: usize, sample: &[Kmer]) -> Result<(), LsbError> {
    writeln!(out, "{}", sample.len())?;
    for &x in sample {
        writeln!(out, "{}", decode(x, k))?;
    }
    out.flush()?;
    Ok(())
}
