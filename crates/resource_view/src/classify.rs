//! Primary coloring pass: reset every color to the default, then classify
//! each main building, assign its display color from the active filters,
//! and scatter its ledger amounts into the per-worker aggregation buffers.
//!
//! Color writes are partitioned disjointly across workers; everything else
//! the pass touches (companies, prefabs, filters) is read-only, so the
//! parallel iteration never write-conflicts.

use bevy::ecs::query::Has;
use bevy::prelude::*;

use crate::buildings::{
    resolve_company, Abandoned, Building, BuildingPrefabData, CargoTerminal, CommercialProperty,
    Condemned, CurrentDistrict, Destroyed, ElectricityProducer, EmergencyShelter, GarbageFacility,
    Hospital, IndustrialProperty, Occupants, OutsideConnection, PrefabRef, ResourceProducer,
    UnderConstruction,
};
use crate::companies::{
    classify_roles, BehaviorTags, Company, ExtractorCompany, IndustrialProcess, ProcessingCompany,
    ServiceAvailable, StorageCompany, StoredResource,
};
use crate::economy::{ResourceKind, ResourceLedger, Role};
use crate::infomode::ActiveFilters;
use crate::objects::{Attachment, Hidden, ObjectColor, ObjectOwner, PreviewOf};
use crate::totals::{RoleBuffers, ScatterBuffers};
use crate::view::{OverlaySettings, ResourceViewState};

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Main buildings: no derived entities (those are handled by the
/// propagation stages) and no abandoned or condemned buildings. Hidden
/// buildings stay in: their ledgers must keep contributing to the totals.
type BuildingFilter = (
    With<Building>,
    Without<Abandoned>,
    Without<Condemned>,
    Without<ObjectOwner>,
    Without<Attachment>,
    Without<PreviewOf>,
);

type BuildingData = (
    (
        &'static mut ObjectColor,
        Option<&'static Occupants>,
        Option<&'static PrefabRef>,
        Option<&'static CurrentDistrict>,
        Option<&'static Destroyed>,
        Option<&'static UnderConstruction>,
        Option<&'static ResourceLedger>,
    ),
    CategoryData,
);

type CategoryData = (
    Has<CargoTerminal>,
    Has<CommercialProperty>,
    Has<ElectricityProducer>,
    Has<EmergencyShelter>,
    Has<GarbageFacility>,
    Has<Hospital>,
    Has<IndustrialProperty>,
    Has<ResourceProducer>,
    Has<OutsideConnection>,
);

type CompanyData = (
    Has<ServiceAvailable>,
    Has<ProcessingCompany>,
    Has<ExtractorCompany>,
    Has<StorageCompany>,
    Option<&'static StoredResource>,
    Option<&'static IndustrialProcess>,
    Option<&'static ResourceLedger>,
);

/// Category membership of one building, unpacked from the query row.
struct Categories {
    cargo_terminal: bool,
    commercial: bool,
    electricity_producer: bool,
    emergency_shelter: bool,
    garbage_facility: bool,
    hospital: bool,
    industrial: bool,
    resource_producer: bool,
    outside_connection: bool,
}

#[allow(clippy::type_complexity)]
impl From<(bool, bool, bool, bool, bool, bool, bool, bool, bool)> for Categories {
    fn from(
        (
            cargo_terminal,
            commercial,
            electricity_producer,
            emergency_shelter,
            garbage_facility,
            hospital,
            industrial,
            resource_producer,
            outside_connection,
        ): (bool, bool, bool, bool, bool, bool, bool, bool, bool),
    ) -> Self {
        Self {
            cargo_terminal,
            commercial,
            electricity_producer,
            emergency_shelter,
            garbage_facility,
            hospital,
            industrial,
            resource_producer,
            outside_connection,
        }
    }
}

impl Categories {
    /// Whether the building belongs to any category this overlay colors.
    /// Lets the pass skip the classification ladder for everything else.
    fn is_tracked(&self) -> bool {
        self.cargo_terminal
            || self.commercial
            || self.electricity_producer
            || self.emergency_shelter
            || self.garbage_facility
            || self.hospital
            || self.industrial
    }
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// Stage 0: reset every visible color to the default, so anything untouched
/// by the later stages is guaranteed to end up at the invalid color.
pub fn reset_object_colors(mut colors: Query<&mut ObjectColor, Without<Hidden>>) {
    colors.par_iter_mut().for_each(|mut color| {
        *color = ObjectColor::default();
    });
}

/// Stage 1: classify and color every main building, scattering ledger
/// amounts into the per-worker buffers as it goes.
pub fn classify_buildings(
    view: Res<ResourceViewState>,
    settings: Res<OverlaySettings>,
    filters: Res<ActiveFilters>,
    scatter: Res<ScatterBuffers>,
    mut buildings: Query<BuildingData, BuildingFilter>,
    company_tags: Query<(), With<Company>>,
    companies: Query<CompanyData, With<Company>>,
    prefabs: Query<&BuildingPrefabData>,
) {
    let view = *view;
    let settings = *settings;
    let filters = &*filters;
    let hints = scatter.hints;

    buildings.par_iter_mut().for_each_init(
        || {
            let mut buffer = scatter.buffers.borrow_local_mut();
            buffer.reserve_hints(hints);
            buffer
        },
        |buffer,
         (
            (mut color, occupants, prefab_ref, district, destroyed, under_construction, ledger),
            categories,
        )| {
            let buffer = &mut **buffer;
            let categories = Categories::from(categories);

            if categories.is_tracked() && district_matches(view.selected_district, district) {
                match resolve_company(occupants, &company_tags) {
                    Some(company) => color_company_building(
                        &mut color,
                        company,
                        &companies,
                        view,
                        filters,
                        buffer,
                    ),
                    None => color_special_case_building(
                        &mut color,
                        &categories,
                        ledger,
                        view,
                        settings,
                        filters,
                        buffer,
                    ),
                }
            }

            let prefab = prefab_ref.and_then(|prefab| prefabs.get(prefab.0).ok());
            if wants_lot_color(prefab, destroyed, under_construction) {
                color.sub_color = true;
            }
        },
    );
}

// ---------------------------------------------------------------------------
// Company buildings
// ---------------------------------------------------------------------------

fn color_company_building(
    color: &mut ObjectColor,
    company: Entity,
    companies: &Query<CompanyData, With<Company>>,
    view: ResourceViewState,
    filters: &ActiveFilters,
    buffer: &mut RoleBuffers,
) {
    let Ok((service, processing, extractor, storage, stored, process, ledger)) =
        companies.get(company)
    else {
        return;
    };
    // A company without a declared process or a ledger routes to the
    // default color; that is data incompleteness, not an error.
    let (Some(process), Some(ledger)) = (process, ledger) else {
        return;
    };

    let roles = classify_roles(
        process,
        BehaviorTags {
            service,
            processing,
            extractor,
            storage,
        },
        stored.map(|stored| stored.0),
    );

    let slot = match view.display {
        Role::Requires => filters.slot_for(roles.requires1, roles.requires2),
        Role::Produces => filters.slot_for(roles.produces, None),
        Role::Sells => filters.slot_for(roles.sells, None),
        Role::Stores => filters.slot_for(roles.stores, None),
    };
    if let Some(index) = slot {
        color.set_slot(index);
    }

    // Ledger amounts feed the totals for every resolved role, independent
    // of the displayed one. Repeated requires slots forward twice.
    for entry in ledger.entries() {
        if Some(entry.resource) == roles.requires1 {
            buffer.save(Role::Requires, entry.resource, entry.amount);
        }
        if Some(entry.resource) == roles.requires2 {
            buffer.save(Role::Requires, entry.resource, entry.amount);
        }
        if Some(entry.resource) == roles.produces {
            buffer.save(Role::Produces, entry.resource, entry.amount);
        }
        if Some(entry.resource) == roles.sells {
            buffer.save(Role::Sells, entry.resource, entry.amount);
        }
        if Some(entry.resource) == roles.stores {
            buffer.save(Role::Stores, entry.resource, entry.amount);
        }
    }
}

// ---------------------------------------------------------------------------
// Special-case buildings
// ---------------------------------------------------------------------------

/// Buildings without a company but with fixed economic behavior. The
/// category checks are mutually exclusive; the first match is terminal.
fn color_special_case_building(
    color: &mut ObjectColor,
    categories: &Categories,
    ledger: Option<&ResourceLedger>,
    view: ResourceViewState,
    settings: OverlaySettings,
    filters: &ActiveFilters,
    buffer: &mut RoleBuffers,
) {
    if categories.outside_connection {
        return;
    }
    let Some(ledger) = ledger else {
        return;
    };

    // Recycling plant: produces whatever its ledger holds. The filter
    // match goes by presence, not quantity.
    if categories.garbage_facility && categories.resource_producer {
        if settings.include_recycling_center {
            for entry in ledger.entries() {
                buffer.save(Role::Produces, entry.resource, entry.amount);
            }
            if view.display == Role::Produces {
                let slot = filters
                    .entries
                    .iter()
                    .find(|filter| ledger.contains(filter.resource))
                    .map(|filter| filter.index);
                if let Some(index) = slot {
                    color.set_slot(index);
                }
            }
        }
        return;
    }

    // Power plants store fuel. An incineration plant reaches this branch
    // through its electricity-producer marker and matches neither fuel.
    if categories.electricity_producer {
        if settings.include_coal_power_plant {
            color_stored_resource(color, ledger, ResourceKind::Coal, view, filters, buffer);
        }
        if settings.include_gas_power_plant {
            color_stored_resource(
                color,
                ledger,
                ResourceKind::Petrochemicals,
                view,
                filters,
                buffer,
            );
        }
        return;
    }

    if categories.hospital {
        if settings.include_medical_facility {
            color_stored_resource(
                color,
                ledger,
                ResourceKind::Pharmaceuticals,
                view,
                filters,
                buffer,
            );
        }
        return;
    }

    if categories.emergency_shelter {
        if settings.include_emergency_shelter {
            color_stored_resource(color, ledger, ResourceKind::Food, view, filters, buffer);
        }
        return;
    }

    if categories.cargo_terminal {
        if settings.include_cargo_station {
            for entry in ledger.entries() {
                buffer.save(Role::Stores, entry.resource, entry.amount);
            }
            if view.display == Role::Stores {
                // Unlike recycling, a filter only matches a terminal that
                // actually holds a nonzero amount of its resource.
                let slot = filters
                    .entries
                    .iter()
                    .find(|filter| {
                        ledger
                            .amount_of(filter.resource)
                            .is_some_and(|amount| amount != 0)
                    })
                    .map(|filter| filter.index);
                if let Some(index) = slot {
                    color.set_slot(index);
                }
            }
        }
    }
}

/// Single-resource stores check shared by the power, medical, and shelter
/// cases: a nonzero ledger amount of `kind` forwards to the stores total
/// and, in stores mode, colors the building through the active filters.
fn color_stored_resource(
    color: &mut ObjectColor,
    ledger: &ResourceLedger,
    kind: ResourceKind,
    view: ResourceViewState,
    filters: &ActiveFilters,
    buffer: &mut RoleBuffers,
) {
    let Some(amount) = ledger.amount_of(kind) else {
        return;
    };
    if amount == 0 {
        return;
    }
    if view.display == Role::Stores {
        if let Some(index) = filters.slot_for(Some(kind), None) {
            color.set_slot(index);
        }
    }
    buffer.save(Role::Stores, kind, amount);
}

// ---------------------------------------------------------------------------
// Lot coloring
// ---------------------------------------------------------------------------

/// Whether the lot-coloring flag applies, independent of resource matching
/// and district selection.
fn wants_lot_color(
    prefab: Option<&BuildingPrefabData>,
    destroyed: Option<&Destroyed>,
    under_construction: Option<&UnderConstruction>,
) -> bool {
    prefab.is_some_and(|data| data.colorize_lot)
        || destroyed.is_some_and(|destroyed| destroyed.cleared >= 0.0)
        || under_construction.is_some_and(|site| site.replacement.is_none())
}

fn district_matches(selected: Option<Entity>, district: Option<&CurrentDistrict>) -> bool {
    match selected {
        None => true,
        Some(selected) => district.is_some_and(|current| current.0 == selected),
    }
}
