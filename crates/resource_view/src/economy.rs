//! Economy-side data the color pass reads: the closed set of tracked
//! resource kinds, the four economic roles, and the per-entity resource
//! ledger.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Resource kinds tracked by the overlay.
///
/// The set is closed: ledgers may only hold these kinds, and the aggregated
/// totals are indexed by [`ResourceKind::index`]. Kinds the overlay never
/// highlights (e.g. `Garbage` held by recycling plants) still pass through
/// the aggregation unchanged; consumers ignore what they do not chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Grain,
    Vegetables,
    Livestock,
    Fish,
    ConvenienceFood,
    Food,
    Beverages,
    Wood,
    Timber,
    Paper,
    Furniture,
    Stone,
    Concrete,
    Minerals,
    Metals,
    Steel,
    Coal,
    Oil,
    Petrochemicals,
    Plastics,
    Chemicals,
    Pharmaceuticals,
    Textiles,
    Machinery,
    Electronics,
    Vehicles,
    Garbage,
    Mail,
}

impl ResourceKind {
    pub const COUNT: usize = 28;

    /// All kinds in index order.
    pub const ALL: [ResourceKind; Self::COUNT] = [
        ResourceKind::Grain,
        ResourceKind::Vegetables,
        ResourceKind::Livestock,
        ResourceKind::Fish,
        ResourceKind::ConvenienceFood,
        ResourceKind::Food,
        ResourceKind::Beverages,
        ResourceKind::Wood,
        ResourceKind::Timber,
        ResourceKind::Paper,
        ResourceKind::Furniture,
        ResourceKind::Stone,
        ResourceKind::Concrete,
        ResourceKind::Minerals,
        ResourceKind::Metals,
        ResourceKind::Steel,
        ResourceKind::Coal,
        ResourceKind::Oil,
        ResourceKind::Petrochemicals,
        ResourceKind::Plastics,
        ResourceKind::Chemicals,
        ResourceKind::Pharmaceuticals,
        ResourceKind::Textiles,
        ResourceKind::Machinery,
        ResourceKind::Electronics,
        ResourceKind::Vehicles,
        ResourceKind::Garbage,
        ResourceKind::Mail,
    ];

    /// Stable index into the per-role total tables.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// The four economic roles a building can play for a resource.
///
/// Doubles as the display mode selected in the reporting UI and as the axis
/// the aggregated totals are broken out by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Requires,
    Produces,
    Sells,
    Stores,
}

/// One (resource, amount) holding in a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceAmount {
    pub resource: ResourceKind,
    pub amount: i32,
}

/// Current resource holdings of a building or company.
///
/// At most one entry per kind; maintained by the host simulation and
/// read-only from the color pass.
#[derive(Component, Debug, Clone, Default)]
pub struct ResourceLedger(pub Vec<ResourceAmount>);

impl ResourceLedger {
    pub fn new(entries: impl IntoIterator<Item = (ResourceKind, i32)>) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(resource, amount)| ResourceAmount { resource, amount })
                .collect(),
        )
    }

    pub fn entries(&self) -> impl Iterator<Item = ResourceAmount> + '_ {
        self.0.iter().copied()
    }

    /// Amount held of `kind`, or `None` when the ledger has no entry for it.
    pub fn amount_of(&self, kind: ResourceKind) -> Option<i32> {
        self.0
            .iter()
            .find(|entry| entry.resource == kind)
            .map(|entry| entry.amount)
    }

    pub fn contains(&self, kind: ResourceKind) -> bool {
        self.0.iter().any(|entry| entry.resource == kind)
    }
}
