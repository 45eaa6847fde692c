use rand::Rng;

use crate::{
    error::LsbError,
    kmer::{indel_pairs, random_edit, random_kmer},
    search::{NeighborhoodParams, explore_neighborhood, has_collision},
    sets::visited::KeySet,
    statistics::Stats,
};

/// Runs one collision trial and records it into `stats`.
///
/// A random k-mer `s` and a random `t` at edit distance exactly `distance` are
/// drawn, both neighborhoods are explored, and the pair counts as a collision
/// when the neighborhoods intersect. Distances 2 and 4 are also recorded
/// under the edit class of the pair.
///
/// # Returns
/// Whether the pair collided
///
/// # Panics
/// Panics if `distance` exceeds `params.k`.
pub fn run_trial<R: Rng + ?Sized>(
    rng: &mut R,
    params: &NeighborhoodParams,
    distance: usize,
    stats: &mut Stats,
) -> Result<bool, LsbError> {
    let k = params.k;
    let s = random_kmer(rng, k);
    let t = random_edit(rng, s, k, distance);

    let hs = explore_neighborhood::<KeySet>(s, params, stats)?;
    let ht = explore_neighborhood::<KeySet>(t, params, stats)?;
    let collided = has_collision(&hs, &ht);

    stats.record_trial(distance, indel_pairs(s, t, k, distance), collided);
    Ok(collided)
}
