//! Building-side components: category markers, lifecycle state, district
//! membership, the occupant list the company resolution scans, and the
//! prefab link carrying the lot-colorizable flag.

use bevy::prelude::*;

use crate::companies::Company;

/// Marker for every building entity.
#[derive(Component, Debug, Default)]
pub struct Building;

// ---------------------------------------------------------------------------
// Category markers
// ---------------------------------------------------------------------------

#[derive(Component, Debug, Default)]
pub struct CargoTerminal;

#[derive(Component, Debug, Default)]
pub struct CommercialProperty;

#[derive(Component, Debug, Default)]
pub struct ElectricityProducer;

#[derive(Component, Debug, Default)]
pub struct EmergencyShelter;

#[derive(Component, Debug, Default)]
pub struct GarbageFacility;

#[derive(Component, Debug, Default)]
pub struct Hospital;

/// Industrial and office properties share this marker.
#[derive(Component, Debug, Default)]
pub struct IndustrialProperty;

/// A facility that produces resources without a company occupying it.
/// Together with [`GarbageFacility`] this identifies a recycling plant.
#[derive(Component, Debug, Default)]
pub struct ResourceProducer;

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[derive(Component, Debug, Default)]
pub struct Abandoned;

#[derive(Component, Debug, Default)]
pub struct Condemned;

/// Destroyed building awaiting clearance. `cleared` is negative while the
/// collapse is still playing out and counts up from zero afterwards.
#[derive(Component, Debug, Clone, Copy)]
pub struct Destroyed {
    pub cleared: f32,
}

/// Building site. `replacement` is set when the construction upgrades an
/// existing building rather than erecting a new one.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct UnderConstruction {
    pub replacement: Option<Entity>,
}

/// Building that represents a connection to the world outside the map.
#[derive(Component, Debug, Default)]
pub struct OutsideConnection;

// ---------------------------------------------------------------------------
// Links
// ---------------------------------------------------------------------------

/// District the building currently belongs to.
#[derive(Component, Debug, Clone, Copy)]
pub struct CurrentDistrict(pub Entity);

/// Link to the prefab entity this building was instantiated from.
#[derive(Component, Debug, Clone, Copy)]
pub struct PrefabRef(pub Entity);

/// Prefab-level building data the color pass reads.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct BuildingPrefabData {
    pub colorize_lot: bool,
}

/// Entities renting space in this building, in move-in order.
#[derive(Component, Debug, Clone, Default)]
pub struct Occupants(pub Vec<Entity>);

/// The building's economic actor: the first occupant that is a company.
pub fn resolve_company(
    occupants: Option<&Occupants>,
    companies: &Query<(), With<Company>>,
) -> Option<Entity> {
    occupants?
        .0
        .iter()
        .copied()
        .find(|&occupant| companies.contains(occupant))
}
