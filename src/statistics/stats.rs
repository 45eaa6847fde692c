use std::{collections::BTreeMap, io::Write};

use serde::{Deserialize, Serialize};

use crate::error::LsbError;

/// Trials and collisions counted for one bucket of trials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub trials: usize,
    pub collisions: usize,
}

impl Tally {
    fn record(&mut self, collided: bool) {
        self.trials += 1;
        self.collisions += usize::from(collided);
    }

    fn merge(&mut self, other: &Tally) {
        self.trials += other.trials;
        self.collisions += other.collisions;
    }

    /// Percentage of trials that collided, `0` when there were none.
    pub fn rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.collisions as f64 * 100.0 / self.trials as f64
        }
    }
}

/// Everything recorded for pairs at a single edit distance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceStats {
    pub total: Tally,
    /// Indexed by edit class, see [`indel_pairs`](crate::kmer::indel_pairs).
    pub classes: Vec<Tally>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    bfs_calls: usize,
    keys_expanded: usize,
    distances: BTreeMap<usize, DistanceStats>,
}

impl Stats {
    pub fn new() -> Self {
        Stats {
            bfs_calls: 0,
            keys_expanded: 0,
            distances: BTreeMap::new(),
        }
    }

    /// Record into the statistics object that a new neighborhood exploration has been performed
    pub fn bump_bfs_calls(&mut self) {
        self.bfs_calls += 1
    }

    /// Record into the statistics object that a bunch of keys were expanded into their
    /// neighbors during the exploration
    pub fn bump_expanded(&mut self, key_amount: usize) {
        self.keys_expanded += key_amount
    }

    /// Record the outcome of one trial at edit `distance`, optionally under an edit class.
    pub fn record_trial(&mut self, distance: usize, class: Option<usize>, collided: bool) {
        let entry = self.distances.entry(distance).or_default();
        entry.total.record(collided);
        if let Some(class) = class {
            if entry.classes.len() <= class {
                entry.classes.resize(class + 1, Tally::default());
            }
            entry.classes[class].record(collided);
        }
    }

    pub fn get_bfs_calls(&self) -> usize {
        self.bfs_calls
    }

    pub fn get_keys_expanded(&self) -> usize {
        self.keys_expanded
    }

    pub fn get_distance(&self, distance: usize) -> Option<&DistanceStats> {
        self.distances.get(&distance)
    }

    pub fn merge(mut self, other: &Stats) -> Stats {
        self.bfs_calls += other.bfs_calls;
        self.keys_expanded += other.keys_expanded;
        for (&distance, theirs) in &other.distances {
            let ours = self.distances.entry(distance).or_default();
            ours.total.merge(&theirs.total);
            if ours.classes.len() < theirs.classes.len() {
                ours.classes.resize(theirs.classes.len(), Tally::default());
            }
            for (ours, theirs) in ours.classes.iter_mut().zip(&theirs.classes) {
                ours.merge(theirs);
            }
        }
        self
    }

    /// Writes the collision table, one row per distance, followed by the
    /// breakdown by edit class for distances 2 and 4.
    ///
    /// Classes are labelled `s+i*2`: `s` substitutions plus `i` indel pairs.
    pub fn write_report<W: Write>(&self, out: &mut W) -> Result<(), LsbError> {
        writeln!(out, "edit\t#col\tcol%")?;
        for (distance, entry) in &self.distances {
            writeln!(
                out,
                "{distance}\t{}\t{:.2}%",
                entry.total.collisions,
                entry.total.rate()
            )?;
        }

        writeln!(out)?;
        writeln!(out, "edit\tedit_type\t#\t#col\tcol%")?;
        for distance in [2, 4] {
            let Some(entry) = self.distances.get(&distance) else {
                continue;
            };
            for pairs in 0..=distance / 2 {
                let tally = entry.classes.get(pairs).copied().unwrap_or_default();
                writeln!(
                    out,
                    "{distance}\t{}+{pairs}*2\t\t{}\t{}\t{:.2}%",
                    distance - pairs * 2,
                    tally.trials,
                    tally.collisions,
                    tally.rate()
                )?;
            }
        }
        Ok(())
    }

    pub fn write_json<W: Write>(&self, out: W) -> Result<(), LsbError> {
        serde_json::to_writer_pretty(out, self)?;
        Ok(())
    }
}
