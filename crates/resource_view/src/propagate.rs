//! Propagation stages: after the primary pass, push computed colors onto
//! derived entities. Four stages, strictly ordered — owned buildings,
//! attachments, preview mirrors, then the general sub-object
//! ownership-chain walk. Later stages read colors written by earlier ones.

use bevy::ecs::query::Has;
use bevy::prelude::*;

use crate::buildings::Building;
use crate::objects::{
    Attachment, Creature, Elevation, Hidden, ObjectColor, ObjectOwner, PreviewOf, TreeObject,
    UtilityObject, Vehicle,
};

/// Stage 2: a building owned by another entity (a sub building placed
/// around the main lot) takes its owner's slot verbatim. The lot-coloring
/// flag is not carried over.
pub fn propagate_owned_building_colors(
    owned: Query<(Entity, &ObjectOwner), (With<Building>, Without<Attachment>, Without<Hidden>)>,
    mut colors: Query<&mut ObjectColor>,
) {
    for (entity, owner) in &owned {
        let Ok(owner_color) = colors.get(owner.0).copied() else {
            continue;
        };
        if let Ok(mut color) = colors.get_mut(entity) {
            color.index = owner_color.index;
            color.value = owner_color.value;
        }
    }
}

/// Stage 3: an attachment building (a lot augmenting a hub) takes the
/// color of the entity it is attached to, same rule as stage 2.
pub fn propagate_attachment_colors(
    attachments: Query<(Entity, &Attachment), (With<Building>, Without<ObjectOwner>, Without<Hidden>)>,
    mut colors: Query<&mut ObjectColor>,
) {
    for (entity, attachment) in &attachments {
        let Ok(attached_color) = colors.get(attachment.0).copied() else {
            continue;
        };
        if let Ok(mut color) = colors.get_mut(entity) {
            color.index = attached_color.index;
            color.value = attached_color.value;
        }
    }
}

/// Stage 4: a preview entity mirrors the whole color of its original,
/// lot-coloring flag included.
pub fn propagate_preview_colors(
    previews: Query<(Entity, &PreviewOf), Without<Hidden>>,
    mut colors: Query<&mut ObjectColor>,
) {
    for (entity, preview) in &previews {
        let Ok(original) = colors.get(preview.0).copied() else {
            continue;
        };
        if let Ok(mut color) = colors.get_mut(entity) {
            *color = original;
        }
    }
}

/// Stage 5: every remaining owned object (building extensions, props,
/// trees on lots) walks its ownership chain up to the first building or
/// vehicle ancestor and takes that ancestor's whole color.
///
/// Tree-like objects only take the color when the chain stayed above
/// ground the whole way up, or when the ancestor carries the lot-coloring
/// flag. The above-ground accumulator is sticky-false: one grounded
/// intermediate invalidates the shortcut for the rest of the walk, and
/// nothing can restore it.
pub fn propagate_sub_object_colors(
    sub_objects: Query<
        (Entity, &ObjectOwner, Option<&Elevation>, Has<TreeObject>),
        (
            Without<Building>,
            Without<Vehicle>,
            Without<Creature>,
            Without<UtilityObject>,
            Without<Hidden>,
        ),
    >,
    owners: Query<&ObjectOwner>,
    buildings: Query<(), With<Building>>,
    vehicles: Query<(), With<Vehicle>>,
    elevations: Query<&Elevation>,
    mut colors: Query<&mut ObjectColor>,
) {
    for (entity, owner, elevation, is_tree) in &sub_objects {
        let mut target = owner.0;

        if is_tree {
            let mut above_ground = elevation.is_some_and(|elevation| !elevation.on_ground);
            // The accumulator only matters until a colored intermediate is
            // found; from there the walk just looks for the terminal owner.
            let mut tracking = above_ground && !colors.contains(target);

            while let Ok(next) = owners.get(target) {
                if buildings.contains(target) || vehicles.contains(target) {
                    break;
                }
                if tracking {
                    if colors.contains(target) {
                        tracking = false;
                    } else {
                        above_ground &= elevations
                            .get(target)
                            .is_ok_and(|elevation| !elevation.on_ground);
                    }
                }
                target = next.0;
            }

            let Ok(ancestor) = colors.get(target).copied() else {
                continue;
            };
            if above_ground || ancestor.sub_color {
                if let Ok(mut color) = colors.get_mut(entity) {
                    *color = ancestor;
                }
            }
        } else {
            while let Ok(next) = owners.get(target) {
                if buildings.contains(target) || vehicles.contains(target) {
                    break;
                }
                target = next.0;
            }
            if let Ok(ancestor) = colors.get(target).copied() {
                if let Ok(mut color) = colors.get_mut(entity) {
                    *color = ancestor;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with<M>(system: impl IntoSystemConfigs<M>) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_systems(Update, system);
        app
    }

    #[test]
    fn owned_building_copies_owner_slot() {
        let mut app = app_with(propagate_owned_building_colors);
        let owner = app.world_mut().spawn((Building, ObjectColor::slot(5))).id();
        let sub = app
            .world_mut()
            .spawn((Building, ObjectOwner(owner), ObjectColor::default()))
            .id();
        app.update();

        let color = *app.world().get::<ObjectColor>(sub).unwrap();
        assert_eq!(color.index, 5);
        assert!(color.is_valid());
    }

    #[test]
    fn owned_building_does_not_copy_lot_flag() {
        let mut app = app_with(propagate_owned_building_colors);
        let owner_color = ObjectColor {
            sub_color: true,
            ..ObjectColor::slot(2)
        };
        let owner = app.world_mut().spawn((Building, owner_color)).id();
        let sub = app
            .world_mut()
            .spawn((Building, ObjectOwner(owner), ObjectColor::default()))
            .id();
        app.update();

        let color = *app.world().get::<ObjectColor>(sub).unwrap();
        assert_eq!(color.index, 2);
        assert!(!color.sub_color);
    }

    #[test]
    fn owned_building_without_colored_owner_keeps_color() {
        let mut app = app_with(propagate_owned_building_colors);
        let owner = app.world_mut().spawn(Building).id();
        let sub = app
            .world_mut()
            .spawn((Building, ObjectOwner(owner), ObjectColor::slot(9)))
            .id();
        app.update();

        assert_eq!(app.world().get::<ObjectColor>(sub).unwrap().index, 9);
    }

    #[test]
    fn attachment_copies_attached_slot() {
        let mut app = app_with(propagate_attachment_colors);
        let hub = app.world_mut().spawn((Building, ObjectColor::slot(4))).id();
        let lot = app
            .world_mut()
            .spawn((Building, Attachment(hub), ObjectColor::default()))
            .id();
        app.update();

        assert_eq!(app.world().get::<ObjectColor>(lot).unwrap().index, 4);
    }

    #[test]
    fn preview_copies_whole_color_including_lot_flag() {
        let mut app = app_with(propagate_preview_colors);
        let original_color = ObjectColor {
            sub_color: true,
            ..ObjectColor::slot(6)
        };
        let original = app.world_mut().spawn((Building, original_color)).id();
        let preview = app
            .world_mut()
            .spawn((PreviewOf(original), ObjectColor::default()))
            .id();
        app.update();

        assert_eq!(
            *app.world().get::<ObjectColor>(preview).unwrap(),
            original_color
        );
    }

    #[test]
    fn sub_object_walks_chain_to_building_ancestor() {
        let mut app = app_with(propagate_sub_object_colors);
        let building = app.world_mut().spawn((Building, ObjectColor::slot(3))).id();
        // Non-terminal intermediate without a color of its own.
        let extension = app.world_mut().spawn(ObjectOwner(building)).id();
        let prop = app
            .world_mut()
            .spawn((ObjectOwner(extension), ObjectColor::default()))
            .id();
        app.update();

        assert_eq!(app.world().get::<ObjectColor>(prop).unwrap().index, 3);
    }

    #[test]
    fn grounded_tree_needs_lot_flag_on_ancestor() {
        let mut app = app_with(propagate_sub_object_colors);
        let building = app.world_mut().spawn((Building, ObjectColor::slot(5))).id();
        let intermediate = app.world_mut().spawn(ObjectOwner(building)).id();
        let tree = app
            .world_mut()
            .spawn((
                TreeObject,
                ObjectOwner(intermediate),
                Elevation { on_ground: true },
                ObjectColor::default(),
            ))
            .id();
        app.update();

        // On the ground and the ancestor has no lot flag: stays default.
        assert_eq!(
            *app.world().get::<ObjectColor>(tree).unwrap(),
            ObjectColor::default()
        );
    }

    #[test]
    fn grounded_tree_takes_color_when_ancestor_has_lot_flag() {
        let mut app = app_with(propagate_sub_object_colors);
        let ancestor_color = ObjectColor {
            sub_color: true,
            ..ObjectColor::slot(5)
        };
        let building = app.world_mut().spawn((Building, ancestor_color)).id();
        let intermediate = app.world_mut().spawn(ObjectOwner(building)).id();
        let tree = app
            .world_mut()
            .spawn((
                TreeObject,
                ObjectOwner(intermediate),
                Elevation { on_ground: true },
                ObjectColor::default(),
            ))
            .id();
        app.update();

        assert_eq!(*app.world().get::<ObjectColor>(tree).unwrap(), ancestor_color);
    }

    #[test]
    fn elevated_tree_takes_color_without_lot_flag() {
        let mut app = app_with(propagate_sub_object_colors);
        let building = app.world_mut().spawn((Building, ObjectColor::slot(7))).id();
        let intermediate = app
            .world_mut()
            .spawn((ObjectOwner(building), Elevation { on_ground: false }))
            .id();
        let tree = app
            .world_mut()
            .spawn((
                TreeObject,
                ObjectOwner(intermediate),
                Elevation { on_ground: false },
                ObjectColor::default(),
            ))
            .id();
        app.update();

        assert_eq!(app.world().get::<ObjectColor>(tree).unwrap().index, 7);
    }

    #[test]
    fn grounded_intermediate_invalidates_above_ground_shortcut() {
        // The accumulator is sticky-false: one grounded hop kills the
        // shortcut even though the tree itself is elevated.
        let mut app = app_with(propagate_sub_object_colors);
        let building = app.world_mut().spawn((Building, ObjectColor::slot(7))).id();
        let intermediate = app
            .world_mut()
            .spawn((ObjectOwner(building), Elevation { on_ground: true }))
            .id();
        let tree = app
            .world_mut()
            .spawn((
                TreeObject,
                ObjectOwner(intermediate),
                Elevation { on_ground: false },
                ObjectColor::default(),
            ))
            .id();
        app.update();

        assert_eq!(
            *app.world().get::<ObjectColor>(tree).unwrap(),
            ObjectColor::default()
        );
    }

    #[test]
    fn chain_stops_at_vehicle_ancestor() {
        let mut app = app_with(propagate_sub_object_colors);
        let depot = app.world_mut().spawn((Building, ObjectColor::slot(1))).id();
        let truck = app
            .world_mut()
            .spawn((Vehicle, ObjectOwner(depot), ObjectColor::slot(8)))
            .id();
        let trailer = app
            .world_mut()
            .spawn((ObjectOwner(truck), ObjectColor::default()))
            .id();
        app.update();

        // The walk stops at the vehicle, not the depot behind it.
        assert_eq!(app.world().get::<ObjectColor>(trailer).unwrap().index, 8);
    }

    #[test]
    fn utility_objects_are_never_propagated_to() {
        let mut app = app_with(propagate_sub_object_colors);
        let building = app.world_mut().spawn((Building, ObjectColor::slot(2))).id();
        let pole = app
            .world_mut()
            .spawn((UtilityObject, ObjectOwner(building), ObjectColor::default()))
            .id();
        app.update();

        assert_eq!(
            *app.world().get::<ObjectColor>(pole).unwrap(),
            ObjectColor::default()
        );
    }
}
