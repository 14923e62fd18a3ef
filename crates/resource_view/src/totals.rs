//! Resource aggregation: per-worker scratch buffers filled during the
//! classification pass (scatter), merged into four role-total tables under
//! one guard per role (gather), and exposed to reporting consumers through
//! a copy-out snapshot that takes the same guards.

use std::sync::{Mutex, MutexGuard, PoisonError};

use bevy::prelude::*;
use bevy::utils::Parallel;

use crate::economy::{ResourceKind, Role};

/// Starting capacity for a worker buffer with no recorded peak.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8;

/// Aggregate amounts indexed by [`ResourceKind::index`].
pub type ResourceTable = [i64; ResourceKind::COUNT];

/// One (resource, amount) record forwarded by the classification pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerForward {
    pub resource: ResourceKind,
    pub amount: i32,
}

/// Append-only scratch of one worker, one buffer per role.
#[derive(Debug, Default)]
pub struct RoleBuffers {
    requires: Vec<LedgerForward>,
    produces: Vec<LedgerForward>,
    sells: Vec<LedgerForward>,
    stores: Vec<LedgerForward>,
}

impl RoleBuffers {
    /// Record a forward. Zero amounts are dropped here so they never reach
    /// the merged totals.
    pub fn save(&mut self, role: Role, resource: ResourceKind, amount: i32) {
        if amount == 0 {
            return;
        }
        self.role_mut(role).push(LedgerForward { resource, amount });
    }

    /// Grow each buffer to the capacity hint recorded by the previous
    /// merge. Growth past the hint doubles, so meeting the hint up front
    /// avoids repeated reallocation within a pass.
    pub fn reserve_hints(&mut self, hints: RoleCapacityHints) {
        reserve_to(&mut self.requires, hints.requires);
        reserve_to(&mut self.produces, hints.produces);
        reserve_to(&mut self.sells, hints.sells);
        reserve_to(&mut self.stores, hints.stores);
    }

    pub fn len(&self, role: Role) -> usize {
        match role {
            Role::Requires => self.requires.len(),
            Role::Produces => self.produces.len(),
            Role::Sells => self.sells.len(),
            Role::Stores => self.stores.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.requires.is_empty()
            && self.produces.is_empty()
            && self.sells.is_empty()
            && self.stores.is_empty()
    }

    fn role_mut(&mut self, role: Role) -> &mut Vec<LedgerForward> {
        match role {
            Role::Requires => &mut self.requires,
            Role::Produces => &mut self.produces,
            Role::Sells => &mut self.sells,
            Role::Stores => &mut self.stores,
        }
    }
}

fn reserve_to(buffer: &mut Vec<LedgerForward>, capacity: usize) {
    if buffer.capacity() < capacity {
        buffer.reserve(capacity - buffer.len());
    }
}

/// Largest worker-buffer length observed per role in the previous merge,
/// floored at [`DEFAULT_BUFFER_CAPACITY`].
#[derive(Debug, Clone, Copy)]
pub struct RoleCapacityHints {
    pub requires: usize,
    pub produces: usize,
    pub sells: usize,
    pub stores: usize,
}

impl Default for RoleCapacityHints {
    fn default() -> Self {
        Self {
            requires: DEFAULT_BUFFER_CAPACITY,
            produces: DEFAULT_BUFFER_CAPACITY,
            sells: DEFAULT_BUFFER_CAPACITY,
            stores: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

/// The scatter side of the aggregation: one [`RoleBuffers`] per worker
/// thread, reached through thread-local storage, plus the capacity hints
/// for the next pass.
#[derive(Resource, Default)]
pub struct ScatterBuffers {
    pub buffers: Parallel<RoleBuffers>,
    pub hints: RoleCapacityHints,
}

impl ScatterBuffers {
    /// Gather every worker buffer into `totals`, one role at a time under
    /// that role's guard, and record the observed peaks as next pass's
    /// capacity hints. Buffers are left empty, shrunk back to the new hint.
    pub fn gather_into(&mut self, totals: &RoleTotals) {
        self.hints = RoleCapacityHints {
            requires: gather_role(&mut self.buffers, Role::Requires, &totals.requires),
            produces: gather_role(&mut self.buffers, Role::Produces, &totals.produces),
            sells: gather_role(&mut self.buffers, Role::Sells, &totals.sells),
            stores: gather_role(&mut self.buffers, Role::Stores, &totals.stores),
        };
    }
}

fn gather_role(
    buffers: &mut Parallel<RoleBuffers>,
    role: Role,
    table: &Mutex<ResourceTable>,
) -> usize {
    let mut table = lock_table(table);
    table.fill(0);

    let mut peak = DEFAULT_BUFFER_CAPACITY;
    for worker in buffers.iter_mut() {
        let buffer = worker.role_mut(role);
        peak = peak.max(buffer.len());
        for forward in buffer.drain(..) {
            table[forward.resource.index()] += i64::from(forward.amount);
        }
    }
    for worker in buffers.iter_mut() {
        worker.role_mut(role).shrink_to(peak);
    }
    peak
}

fn lock_table(table: &Mutex<ResourceTable>) -> MutexGuard<'_, ResourceTable> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-wide role totals, rebuilt from scratch at every merge.
///
/// Each role sits behind its own guard; the merge writer and every reader
/// go through the same guards, so a partially-merged total is never
/// observed.
#[derive(Resource, Debug, Default)]
pub struct RoleTotals {
    requires: Mutex<ResourceTable>,
    produces: Mutex<ResourceTable>,
    sells: Mutex<ResourceTable>,
    stores: Mutex<ResourceTable>,
}

impl RoleTotals {
    /// Copy out all four tables under their guards.
    pub fn snapshot(&self) -> TotalsSnapshot {
        TotalsSnapshot {
            requires: *lock_table(&self.requires),
            produces: *lock_table(&self.produces),
            sells: *lock_table(&self.sells),
            stores: *lock_table(&self.stores),
        }
    }
}

/// A consistent copy of the four role totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalsSnapshot {
    pub requires: ResourceTable,
    pub produces: ResourceTable,
    pub sells: ResourceTable,
    pub stores: ResourceTable,
}

impl TotalsSnapshot {
    pub fn amount(&self, role: Role, kind: ResourceKind) -> i64 {
        let table = match role {
            Role::Requires => &self.requires,
            Role::Produces => &self.produces,
            Role::Sells => &self.sells,
            Role::Stores => &self.stores,
        };
        table[kind.index()]
    }
}

/// Merge system: runs once the classification pass has fully completed, so
/// the totals always reflect exactly one frame's classification.
pub fn merge_ledger_totals(mut scatter: ResMut<ScatterBuffers>, totals: Res<RoleTotals>) {
    scatter.gather_into(&totals);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_drops_zero_amounts() {
        let mut buffers = RoleBuffers::default();
        buffers.save(Role::Stores, ResourceKind::Food, 0);
        assert!(buffers.is_empty());

        buffers.save(Role::Stores, ResourceKind::Food, 10);
        buffers.save(Role::Stores, ResourceKind::Food, -3);
        assert_eq!(buffers.len(Role::Stores), 2);
    }

    #[test]
    fn gather_sums_per_resource_and_role() {
        let mut scatter = ScatterBuffers::default();
        scatter.buffers.scope(|buf| {
            buf.save(Role::Stores, ResourceKind::Coal, 500);
            buf.save(Role::Stores, ResourceKind::Coal, 250);
            buf.save(Role::Requires, ResourceKind::Coal, 40);
            buf.save(Role::Produces, ResourceKind::Metals, 7);
        });
        let totals = RoleTotals::default();
        scatter.gather_into(&totals);

        let snapshot = totals.snapshot();
        assert_eq!(snapshot.amount(Role::Stores, ResourceKind::Coal), 750);
        assert_eq!(snapshot.amount(Role::Requires, ResourceKind::Coal), 40);
        assert_eq!(snapshot.amount(Role::Produces, ResourceKind::Metals), 7);
        assert_eq!(snapshot.amount(Role::Sells, ResourceKind::Coal), 0);
    }

    #[test]
    fn gather_rebuilds_totals_from_scratch() {
        let mut scatter = ScatterBuffers::default();
        let totals = RoleTotals::default();

        scatter.buffers.scope(|buf| {
            buf.save(Role::Sells, ResourceKind::Mail, 12);
        });
        scatter.gather_into(&totals);
        assert_eq!(totals.snapshot().amount(Role::Sells, ResourceKind::Mail), 12);

        // An empty next pass must zero the previous totals.
        scatter.gather_into(&totals);
        assert_eq!(totals.snapshot().amount(Role::Sells, ResourceKind::Mail), 0);
    }

    #[test]
    fn gather_leaves_buffers_empty() {
        let mut scatter = ScatterBuffers::default();
        scatter.buffers.scope(|buf| {
            buf.save(Role::Stores, ResourceKind::Oil, 5);
        });
        scatter.gather_into(&RoleTotals::default());
        for worker in scatter.buffers.iter_mut() {
            assert!(worker.is_empty());
        }
    }

    #[test]
    fn hints_track_observed_peak_with_default_floor() {
        let mut scatter = ScatterBuffers::default();
        scatter.buffers.scope(|buf| {
            for _ in 0..20 {
                buf.save(Role::Stores, ResourceKind::Oil, 1);
            }
            buf.save(Role::Requires, ResourceKind::Coal, 1);
        });
        scatter.gather_into(&RoleTotals::default());

        assert_eq!(scatter.hints.stores, 20);
        // A single entry stays below the floor.
        assert_eq!(scatter.hints.requires, DEFAULT_BUFFER_CAPACITY);
        assert_eq!(scatter.hints.produces, DEFAULT_BUFFER_CAPACITY);
    }

    #[test]
    fn reserve_hints_meets_requested_capacity() {
        let mut buffers = RoleBuffers::default();
        buffers.reserve_hints(RoleCapacityHints {
            requires: 32,
            produces: 8,
            sells: 8,
            stores: 64,
        });
        assert!(buffers.requires.capacity() >= 32);
        assert!(buffers.stores.capacity() >= 64);
    }

    #[test]
    fn snapshot_starts_zeroed() {
        let snapshot = RoleTotals::default().snapshot();
        for kind in ResourceKind::ALL {
            assert_eq!(snapshot.amount(Role::Requires, kind), 0);
            assert_eq!(snapshot.amount(Role::Stores, kind), 0);
        }
    }
}
