use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    alloc::AllocPolicy,
    error::LsbError,
    kmer::{Kmer, MAX_K, SHORT_FLAG, is_in_sample_d1, low_mask},
    sets::{
        layers::{DEFAULT_LAYER_CAPACITY, DynamicArray},
        ordered::OrderedSet,
        visited::VisitorSet,
    },
    statistics::Stats,
};

/// Which of the discovered k-mers make it into a neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    /// Every k-mer within the radius.
    Whole,
    /// Only k-mers accepted by [`is_in_sample_d1`].
    SampleD1,
}

impl Membership {
    pub fn admits(self, kmer: Kmer, k: usize) -> bool {
        match self {
            Membership::Whole => true,
            Membership::SampleD1 => is_in_sample_d1(kmer, k),
        }
    }
}

impl FromStr for Membership {
    type Err = LsbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "w" | "whole" => Ok(Membership::Whole),
            "s" | "sample" | "sample_d1" => Ok(Membership::SampleD1),
            _ => Err(LsbError::configuration(format!(
                "unknown membership {s:?}, expected whole or sample"
            ))),
        }
    }
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Membership::Whole => write!(f, "whole"),
            Membership::SampleD1 => write!(f, "sample"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborhoodParams {
    pub k: usize,
    pub radius: usize,
    pub membership: Membership,
    #[serde(default)]
    pub alloc: AllocPolicy,
}

impl NeighborhoodParams {
    pub fn new(k: usize, radius: usize, membership: Membership) -> Result<Self, LsbError> {
        let params = NeighborhoodParams {
            k,
            radius,
            membership,
            alloc: AllocPolicy::default(),
        };
        params.validate()?;
        Ok(params)
    }

    pub fn with_alloc(mut self, alloc: AllocPolicy) -> Self {
        self.alloc = alloc;
        self
    }

    pub fn validate(&self) -> Result<(), LsbError> {
        if self.k == 0 || self.k > MAX_K {
            return Err(LsbError::configuration(format!(
                "k must be between 1 and {MAX_K}, got {}",
                self.k
            )));
        }
        Ok(())
    }
}

/// Collects every k-mer within edit distance `params.radius` of `center` that
/// `params.membership` admits, the center included.
///
/// The search walks the edit graph breadth-first, one layer per unit of
/// distance. A k-mer expands by substitution into k-mers and by deletion into
/// (k-1)-mers flagged with [`SHORT_FLAG`]; a (k-1)-mer expands by insertion
/// back into k-mers. Every key is expanded at most once, which `V` tracks.
/// Only k-mers are ever collected.
///
/// # Arguments
/// * `center` - k-mer to start from, packed in the low `2 * params.k` bits
/// * `params` - length, radius, membership filter and allocation policy
/// * `stats` - receives one exploration and the number of keys expanded
///
/// # Returns
/// The admitted neighbors in increasing key order, or the allocation failure
/// that interrupted the search
pub fn explore_neighborhood<V: VisitorSet>(
    center: Kmer,
    params: &NeighborhoodParams,
    stats: &mut Stats,
) -> Result<OrderedSet<Kmer>, LsbError> {
    params.validate()?;
    debug_assert_eq!(center & !low_mask(params.k), 0, "center is not a k-mer");

    let k = params.k;
    let mut found = OrderedSet::new().with_policy(params.alloc);
    if params.membership.admits(center, k) {
        found.insert(center)?;
    }

    let mut visited = V::empty(params.alloc)?;
    visited.set(center)?;

    let mut current = DynamicArray::with_policy(DEFAULT_LAYER_CAPACITY, params.alloc)?;
    let mut next = DynamicArray::with_policy(DEFAULT_LAYER_CAPACITY, params.alloc)?;
    current.push(center)?;

    let mut expanded = 0;
    for depth in 1..=params.radius {
        for &key in &current {
            if key & SHORT_FLAG != 0 {
                for position in 0..k {
                    let shift = position * 2;
                    let head = (key >> shift) << (shift + 2);
                    let tail = key & low_mask(position);
                    for symbol in 0..4 {
                        let neighbor = head | (symbol << shift) | tail;
                        discover(neighbor, true, params, &mut visited, &mut next, &mut found)?;
                    }
                }
            } else {
                for position in 0..k {
                    let shift = position * 2;
                    let head = (key >> (shift + 2)) << shift;
                    let neighbor = head | (key & low_mask(position)) | SHORT_FLAG;
                    discover(neighbor, false, params, &mut visited, &mut next, &mut found)?;
                }
                for position in 0..k {
                    let shift = position * 2;
                    let head = (key >> (shift + 2)) << (shift + 2);
                    let tail = key & low_mask(position);
                    for symbol in 0..4 {
                        let neighbor = head | (symbol << shift) | tail;
                        discover(neighbor, true, params, &mut visited, &mut next, &mut found)?;
                    }
                }
            }
        }
        expanded += current.len();
        tracing::trace!(depth, layer = current.len(), discovered = next.len(), "expanded layer");

        current.clear();
        current.swap(&mut next);
        if current.is_empty() {
            break;
        }
    }

    stats.bump_bfs_calls();
    stats.bump_expanded(expanded);
    tracing::debug!(
        center,
        radius = params.radius,
        visited = visited.visited(),
        found = found.len(),
        "neighborhood explored"
    );
    Ok(found)
}

/// Queues `neighbor` for the next layer unless it was seen before, collecting
/// it when it is a k-mer the membership filter admits.
fn discover<V: VisitorSet>(
    neighbor: Kmer,
    collectable: bool,
    params: &NeighborhoodParams,
    visited: &mut V,
    next: &mut DynamicArray<Kmer>,
    found: &mut OrderedSet<Kmer>,
) -> Result<(), LsbError> {
    if visited.get(neighbor) {
        return Ok(());
    }
    next.push(neighbor)?;
    visited.set(neighbor)?;
    if collectable && params.membership.admits(neighbor, params.k) {
        found.insert(neighbor)?;
    }
    Ok(())
}
