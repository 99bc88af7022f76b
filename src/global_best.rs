//! The best solution found so far by any worker of a run.

use crate::problem::Cost;
use crate::solution::Solution;
use log::debug;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

/// Shared best-solution record: an atomic cost for cheap checks and a mutex-guarded solution.
///
/// The stored cost only ever decreases. It is written exclusively while holding the
/// solution lock, so the cost and the solution always describe the same candidate.
#[derive(Debug)]
pub struct GlobalBest {
    cost: AtomicI64,
    solution: Mutex<Option<Solution>>,
}

impl GlobalBest {
    pub fn new() -> Self {
        GlobalBest {
            cost: AtomicI64::new(Cost::MAX),
            solution: Mutex::new(None),
        }
    }

    /// Current best cost, `Cost::MAX` while nothing has been published.
    pub fn cost(&self) -> Cost {
        self.cost.load(Ordering::Acquire)
    }

    /// Offer a candidate. Returns `true` if it replaced the stored solution.
    ///
    /// Candidates that are not strictly cheaper than the current cost are rejected without
    /// locking. Survivors are checked again under the lock, since another worker may have
    /// published in between.
    pub fn try_publish(&self, solution: &Solution, cost: Cost) -> bool {
        if cost >= self.cost.load(Ordering::Acquire) {
            return false;
        }

        let mut stored = self.solution.lock();
        let current = self.cost.load(Ordering::Acquire);
        if cost >= current {
            return false;
        }

        *stored = Some(solution.clone());
        self.cost.store(cost, Ordering::Release);
        debug!("global best improved: {} -> {}", current, cost);
        true
    }

    /// Copy of the stored solution and its cost.
    pub fn snapshot(&self) -> Option<(Solution, Cost)> {
        let stored = self.solution.lock();
        stored
            .as_ref()
            .map(|solution| (solution.clone(), self.cost.load(Ordering::Acquire)))
    }

    pub fn into_inner(self) -> Option<(Solution, Cost)> {
        let cost = self.cost.into_inner();
        self.solution.into_inner().map(|solution| (solution, cost))
    }
}

impl Default for GlobalBest {
    fn default() -> Self {
        GlobalBest::new()
    }
}
