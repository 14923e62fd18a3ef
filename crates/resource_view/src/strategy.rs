//! Strategy seam between the frame driver and the coloring
//! implementations. The driver owns a registry of strategies and runs them
//! in order each frame until one handles the coloring; the engine's own
//! default path sits at the end of the list. This overlay registers itself
//! ahead of that default and handles the frame only while the host shows
//! the resource view.

use bevy::ecs::schedule::ScheduleLabel;
use bevy::prelude::*;

use crate::view::{ActiveInfoview, RESOURCE_VIEW};

/// Schedule holding the full classify-color-propagate-aggregate chain. Run
/// by [`ResourceViewStrategy`] when it handles a frame.
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceColorPass;

/// A per-frame object coloring implementation.
pub trait ObjectColoringStrategy: Send + Sync + 'static {
    /// Color the frame's objects. Returns `true` when this strategy handled
    /// coloring; the driver then skips the remaining strategies.
    fn try_color(&self, world: &mut World) -> bool;
}

struct StrategyEntry {
    name: &'static str,
    strategy: Box<dyn ObjectColoringStrategy>,
}

/// Registry of coloring strategies, consulted in order by the frame
/// driver. The engine default is registered last and always handles.
#[derive(Resource, Default)]
pub struct ObjectColoringStrategies {
    entries: Vec<StrategyEntry>,
}

impl ObjectColoringStrategies {
    /// Register `strategy` ahead of the engine default (the last entry).
    pub fn register_before_default(
        &mut self,
        name: &'static str,
        strategy: Box<dyn ObjectColoringStrategy>,
    ) {
        let at = self.entries.len().saturating_sub(1);
        self.entries.insert(at, StrategyEntry { name, strategy });
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    /// Registered strategy names, in consultation order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }
}

pub const ENGINE_DEFAULT: &str = "EngineDefault";

/// Terminal fallback standing in for the engine's own coloring path, which
/// lives outside this crate. Always handles.
pub struct EngineDefaultColoring;

impl ObjectColoringStrategy for EngineDefaultColoring {
    fn try_color(&self, _world: &mut World) -> bool {
        true
    }
}

/// This overlay's strategy: runs the color-pass schedule iff the host
/// currently shows the resource view, and defers otherwise.
pub struct ResourceViewStrategy;

impl ObjectColoringStrategy for ResourceViewStrategy {
    fn try_color(&self, world: &mut World) -> bool {
        let active = world
            .get_resource::<ActiveInfoview>()
            .is_some_and(|view| view.is_resource_view());
        if !active {
            return false;
        }
        world.run_schedule(ResourceColorPass);
        true
    }
}

/// The frame driver: consults the registry in order, stopping at the first
/// strategy that handles the frame.
pub fn drive_object_coloring(world: &mut World) {
    world.resource_scope(|world, strategies: Mut<ObjectColoringStrategies>| {
        for entry in &strategies.entries {
            if entry.strategy.try_color(world) {
                break;
            }
        }
    });
}

/// Installs the strategy registry (with the engine default as its terminal
/// entry) and the per-frame driver. Hosted by the app, not by the overlay.
pub struct ObjectColorDriverPlugin;

impl Plugin for ObjectColorDriverPlugin {
    fn build(&self, app: &mut App) {
        let mut strategies = ObjectColoringStrategies::default();
        strategies.entries.push(StrategyEntry {
            name: ENGINE_DEFAULT,
            strategy: Box::new(EngineDefaultColoring),
        });
        app.insert_resource(strategies);
        app.add_systems(PostUpdate, drive_object_coloring);
    }
}

/// Register this overlay's strategy ahead of the engine default. On
/// failure the host's coloring path is left fully intact; both failure
/// modes are reported once and never retried.
pub(crate) fn install_resource_view_strategy(app: &mut App) {
    let Some(mut strategies) = app
        .world_mut()
        .get_resource_mut::<ObjectColoringStrategies>()
    else {
        error!(
            "object coloring driver is not installed; \
             the resource view cannot supersede the engine coloring path"
        );
        return;
    };
    if strategies.contains(RESOURCE_VIEW) {
        error!("resource view coloring strategy is already registered; skipping install");
        return;
    }
    strategies.register_before_default(RESOURCE_VIEW, Box::new(ResourceViewStrategy));
}
