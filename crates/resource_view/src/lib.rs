//! Building resource overlay core.
//!
//! Once per frame — while the host shows the resource view — this crate
//! classifies every building by its economic role (what it requires,
//! produces, sells, or stores), assigns a display color from the active
//! filter list, aggregates ledger quantities into four role totals, and
//! propagates the computed colors onto derived entities (sub buildings,
//! attachments, preview mirrors, and owned sub-objects).
//!
//! The host decides when any of this runs: the frame driver
//! ([`ObjectColorDriverPlugin`]) consults its strategy registry each frame,
//! and this overlay's strategy defers to the engine default whenever
//! another infoview is active.

use bevy::prelude::*;

pub mod buildings;
pub mod classify;
pub mod companies;
pub mod economy;
pub mod infomode;
pub mod objects;
pub mod propagate;
pub mod strategy;
pub mod totals;
pub mod view;


pub use strategy::{
    ObjectColorDriverPlugin, ObjectColoringStrategies, ObjectColoringStrategy, ResourceColorPass,
};

/// Wires the full classify-color-propagate-aggregate pipeline into the
/// color-pass schedule and registers the overlay's strategy with the frame
/// driver. Requires [`ObjectColorDriverPlugin`] to be installed first.
pub struct ResourceViewPlugin;

impl Plugin for ResourceViewPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<view::ActiveInfoview>()
            .init_resource::<view::ResourceViewState>()
            .init_resource::<view::OverlaySettings>()
            .init_resource::<infomode::ActiveFilters>()
            .init_resource::<totals::ScatterBuffers>()
            .init_resource::<totals::RoleTotals>();

        // One chain: every stage starts only after the previous stage's
        // writes are visible. The merge runs once classification has fully
        // completed, so totals never mix two frames.
        app.add_systems(
            ResourceColorPass,
            (
                infomode::build_active_filters,
                classify::reset_object_colors,
                classify::classify_buildings,
                totals::merge_ledger_totals,
                propagate::propagate_owned_building_colors,
                propagate::propagate_attachment_colors,
                propagate::propagate_preview_colors,
                propagate::propagate_sub_object_colors,
            )
                .chain(),
        );

        strategy::install_resource_view_strategy(app);
    }
}
