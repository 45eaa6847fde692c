use rand::{Rng, seq::SliceRandom, seq::index::sample};

use crate::kmer::{Kmer, MAX_K, edit_distance, low_mask, symbol_at};

/// Uniformly random k-mer.
pub fn random_kmer<R: Rng + ?Sized>(rng: &mut R, k: usize) -> Kmer {
    rng.random::<u64>() & low_mask(k)
}

/// Random k-mer at edit distance exactly `d` from `s`.
///
/// Each attempt applies an even number of random indels, paired up as a
/// deletion followed by an insertion so the length stays `k`, then fills the
/// remaining budget with substitutions at untouched positions. When `d == k`
/// every position is substituted instead. Attempts whose true distance falls
/// short of `d` are discarded.
///
/// # Panics
/// Panics if `d > k` or `k > MAX_K`.
pub fn random_edit<R: Rng + ?Sized>(rng: &mut R, s: Kmer, k: usize, d: usize) -> Kmer {
    assert!(d <= k, "cannot edit a {k}-mer at distance {d}");
    assert!(k <= MAX_K, "sequence of length {k} exceeds {MAX_K}");
    loop {
        let t = if d == k {
            (0..k).fold(s, |t, position| substitute(rng, t, position))
        } else {
            mixed_edit(rng, s, k, d)
        };
        if edit_distance(t, k, s, k, None) == d as u32 {
            return t;
        }
    }
}

fn mixed_edit<R: Rng + ?Sized>(rng: &mut R, s: Kmer, k: usize, d: usize) -> Kmer {
    let indels = rng.random_range(0..=d / 2) * 2;
    let mut positions = sample(rng, k, indels).into_vec();
    positions.shuffle(rng);

    let mut changed = [false; MAX_K];
    let mut t = s;
    for pair in positions.chunks_exact(2) {
        let (deleted, inserted) = (pair[0] * 2, pair[1] * 2);
        t = ((t >> (deleted + 2)) << deleted) | (t & low_mask(pair[0]));

        changed[pair[1]] = true;
        let base = rng.random_range(0..4u64);
        t = ((t >> inserted) << (inserted + 2)) | (base << inserted) | (t & low_mask(pair[1]));
    }

    for _ in indels..d {
        let position = loop {
            let position = rng.random_range(0..k);
            if !changed[position] {
                break position;
            }
        };
        changed[position] = true;
        t = substitute(rng, t, position);
    }
    t
}

/// Replaces the symbol at `position` with a different one.
fn substitute<R: Rng + ?Sized>(rng: &mut R, t: Kmer, position: usize) -> Kmer {
    let old = symbol_at(t, position);
    let mut new = rng.random_range(0..3u64);
    if new >= old {
        new += 1;
    }
    let shift = position * 2;
    (t & !(3 << shift)) | (new << shift)
}

/// Classifies how a pair at edit distance `d` is most plausibly reached.
///
/// For `d == 2`: `0` for two substitutions (exactly two mismatching
/// positions), `1` for an indel pair. For `d == 4`: `0` for four
/// substitutions, `1` when some single substitution of `s` (taking a symbol
/// of `t` at the same or an adjacent position) leaves the pair at distance
/// three, `2` otherwise. Other distances have no classes.
pub fn indel_pairs(s: Kmer, t: Kmer, k: usize, d: usize) -> Option<usize> {
    let mismatches = (0..k)
        .filter(|&position| symbol_at(s, position) != symbol_at(t, position))
        .count();
    match d {
        2 => Some(if mismatches == 2 { 0 } else { 1 }),
        4 if mismatches == 4 => Some(0),
        4 if closer_by_one_substitution(s, t, k) => Some(1),
        4 => Some(2),
        _ => None,
    }
}

fn closer_by_one_substitution(s: Kmer, t: Kmer, k: usize) -> bool {
    (0..k).any(|position| {
        let shift = position * 2;
        (position.saturating_sub(1)..(position + 2).min(k)).any(|source| {
            let symbol = symbol_at(t, source);
            symbol != symbol_at(s, position)
                && edit_distance((s & !(3 << shift)) | (symbol << shift), k, t, k, Some(4)) == 3
        })
    })
}
