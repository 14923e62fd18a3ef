//! Externally-owned view state: which infoview the host currently shows,
//! which role the reporting UI displays, the selected district, and the
//! toggles gating the special-case building categories.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::economy::Role;

/// Name under which this overlay's infoview is registered with the host.
pub const RESOURCE_VIEW: &str = "ResourceView";

/// The infoview the host currently displays, if any. Host-owned; the
/// coloring strategy defers to the engine default unless this names the
/// resource view.
#[derive(Resource, Debug, Default)]
pub struct ActiveInfoview {
    pub name: Option<String>,
}

impl ActiveInfoview {
    pub fn is_resource_view(&self) -> bool {
        self.name.as_deref() == Some(RESOURCE_VIEW)
    }
}

/// Selections the reporting UI owns: the displayed role and the district
/// scope (`None` means the entire city).
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ResourceViewState {
    pub display: Role,
    pub selected_district: Option<Entity>,
}

/// Toggles for the special-case building categories. All enabled by
/// default; each gates both the coloring and the totals contribution of
/// its category.
#[derive(Resource, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OverlaySettings {
    pub include_recycling_center: bool,
    pub include_coal_power_plant: bool,
    pub include_gas_power_plant: bool,
    pub include_medical_facility: bool,
    pub include_emergency_shelter: bool,
    pub include_cargo_station: bool,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            include_recycling_center: true,
            include_coal_power_plant: true,
            include_gas_power_plant: true,
            include_medical_facility: true,
            include_emergency_shelter: true,
            include_cargo_station: true,
        }
    }
}
