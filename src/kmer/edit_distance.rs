use crate::kmer::{Kmer, MAX_K};

/// Levenshtein distance between the low `k1` symbols of `s1` and the low `k2`
/// symbols of `s2`.
///
/// With a `cap`, the computation stops as soon as the answer is known to be at
/// least `cap`; the value returned is then some lower bound that is itself
/// `>= cap`. Without one the exact distance is returned.
///
/// # Panics
/// Panics if either length exceeds [`MAX_K`].
pub fn edit_distance(s1: Kmer, k1: usize, s2: Kmer, k2: usize, cap: Option<u32>) -> u32 {
    if k1 > k2 {
        return edit_distance(s2, k2, s1, k1, cap);
    }
    assert!(k2 <= MAX_K, "sequence of length {k2} exceeds {MAX_K}");

    // The answer lies on the diagonal ending in the bottom-right cell; the
    // values along a diagonal never decrease.
    let mut diagonal = k2 - k1;
    if cap.is_some_and(|cap| diagonal as u32 >= cap) {
        return diagonal as u32;
    }

    let mut row = [0u32; MAX_K + 1];
    for (j, cell) in row.iter_mut().enumerate().take(k2 + 1) {
        *cell = j as u32;
    }

    let mut rest1 = s1;
    for i in 1..=k1 {
        diagonal += 1;
        let mut above_left = row[0];
        row[0] = i as u32;

        let mut rest2 = s2;
        for j in 1..=k2 {
            let substitution = above_left + u32::from(rest1 & 3 != rest2 & 3);
            let cell = substitution.min(row[j] + 1).min(row[j - 1] + 1);
            above_left = row[j];
            row[j] = cell;
            rest2 >>= 2;
        }
        rest1 >>= 2;

        if cap.is_some_and(|cap| row[diagonal] >= cap) {
            break;
        }
    }

    row[diagonal]
}
