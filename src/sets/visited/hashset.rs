use hashbrown::HashSet;

use crate::{
    alloc::{AllocError, AllocPolicy},
    sets::visited::VisitorSet,
};

/// Growth goes through hashbrown's own allocator path, so the policy is not
/// consulted here.
impl VisitorSet for HashSet<u64> {
    fn empty(_policy: AllocPolicy) -> Result<Self, AllocError> {
        Ok(HashSet::new())
    }

    fn get(&self, key: u64) -> bool {
        self.contains(&key)
    }

    fn set(&mut self, key: u64) -> Result<bool, AllocError> {
        Ok(self.insert(key))
    }

    fn visited(&self) -> usize {
        self.len()
    }
}
