//! Active-filter registry: which resources the reporting UI currently
//! highlights, and which display slot each maps to. Rebuilt once per frame.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::economy::ResourceKind;

/// Coarse building category a filter record is tagged with.
///
/// Used only to order active filters deterministically; a building matches
/// at most one classification path, so the order carries no other weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BuildingKind {
    CargoTerminal,
    Commercial,
    PowerProducer,
    EmergencyShelter,
    GarbageFacility,
    Hospital,
    Industrial,
    ResourceProducer,
}

impl BuildingKind {
    /// Kinds handled structurally by the special-case classifier rather
    /// than through the filter list.
    pub fn is_special_case(self) -> bool {
        matches!(
            self,
            BuildingKind::CargoTerminal
                | BuildingKind::PowerProducer
                | BuildingKind::EmergencyShelter
                | BuildingKind::GarbageFacility
                | BuildingKind::Hospital
        )
    }
}

/// Resource metadata on a filter record entity.
#[derive(Component, Debug, Clone, Copy)]
pub struct ResourceInfomode {
    pub resource: ResourceKind,
    pub kind: BuildingKind,
}

/// Present while the filter is switched on; carries its display slot.
#[derive(Component, Debug, Clone, Copy)]
pub struct InfomodeActive {
    pub index: u8,
}

/// One currently-highlighted resource and the display slot it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveFilter {
    pub resource: ResourceKind,
    pub index: u8,
    pub kind: BuildingKind,
}

/// Priority-ordered list of active filters, rebuilt every pass.
#[derive(Resource, Debug, Default)]
pub struct ActiveFilters {
    pub entries: Vec<ActiveFilter>,
}

impl ActiveFilters {
    /// Display slot of the first filter matching either candidate, in
    /// filter-list order.
    pub fn slot_for(
        &self,
        candidate1: Option<ResourceKind>,
        candidate2: Option<ResourceKind>,
    ) -> Option<u8> {
        self.entries
            .iter()
            .find(|filter| {
                candidate1 == Some(filter.resource) || candidate2 == Some(filter.resource)
            })
            .map(|filter| filter.index)
    }
}

/// Rebuild [`ActiveFilters`] from the filter records currently switched on.
/// Special-case kinds never register; the list is sorted by building kind
/// so enumeration order cannot leak into the result.
pub fn build_active_filters(
    mut filters: ResMut<ActiveFilters>,
    records: Query<(&ResourceInfomode, &InfomodeActive)>,
) {
    filters.entries.clear();
    for (infomode, active) in &records {
        if infomode.kind.is_special_case() {
            continue;
        }
        filters.entries.push(ActiveFilter {
            resource: infomode.resource,
            index: active.index,
            kind: infomode.kind,
        });
    }
    filters.entries.sort_by_key(|filter| filter.kind);
}
