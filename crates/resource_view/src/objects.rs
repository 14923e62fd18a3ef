//! Object-level components shared by every colorable entity: the display
//! color itself and the derived-entity relations the propagation stages
//! walk (ownership chains, attachments, preview mirrors).

use bevy::prelude::*;

/// Per-entity display color consumed by the rendering layer.
///
/// `index` selects the display slot of the matched active filter and is only
/// meaningful while `value` is nonzero; the all-zero default is the
/// "invalid" color every entity is reset to at the start of a pass.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectColor {
    pub index: u8,
    pub value: u8,
    /// Lot-coloring flag. Set independently of the slot (see the
    /// classification pass); preview mirrors and ownership-chain walks copy
    /// it along with the slot, the other propagation stages do not.
    pub sub_color: bool,
}

impl ObjectColor {
    /// A valid color pointing at `index`.
    pub const fn slot(index: u8) -> Self {
        Self {
            index,
            value: 255,
            sub_color: false,
        }
    }

    /// Point this color at `index`, leaving the lot-coloring flag alone.
    pub fn set_slot(&mut self, index: u8) {
        self.index = index;
        self.value = 255;
    }

    pub const fn is_valid(self) -> bool {
        self.value != 0
    }
}

/// Link to the entity that owns this one. Ownership may chain through
/// several non-terminal intermediates before reaching a building or
/// vehicle; chains are kept acyclic by the host simulation.
#[derive(Component, Debug, Clone, Copy)]
pub struct ObjectOwner(pub Entity);

/// Link to the lot this entity augments.
#[derive(Component, Debug, Clone, Copy)]
pub struct Attachment(pub Entity);

/// Link from a temporary preview entity to the original it mirrors while
/// the cursor hovers over it.
#[derive(Component, Debug, Clone, Copy)]
pub struct PreviewOf(pub Entity);

/// Host-managed visibility flag. Hidden entities keep their previous color
/// (the reset and propagation stages skip them) but still contribute to the
/// aggregated totals.
#[derive(Component, Debug, Default)]
pub struct Hidden;

/// Placement elevation of an object.
#[derive(Component, Debug, Clone, Copy)]
pub struct Elevation {
    pub on_ground: bool,
}

/// Tree-like sub-object; gets the above-ground treatment in the
/// ownership-chain walk.
#[derive(Component, Debug, Default)]
pub struct TreeObject;

#[derive(Component, Debug, Default)]
pub struct Vehicle;

#[derive(Component, Debug, Default)]
pub struct Creature;

/// Utility poles, pipes and the like; never colored through ownership.
#[derive(Component, Debug, Default)]
pub struct UtilityObject;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_color_is_invalid() {
        let color = ObjectColor::default();
        assert!(!color.is_valid());
        assert_eq!(color.index, 0);
        assert!(!color.sub_color);
    }

    #[test]
    fn slot_color_is_valid() {
        assert!(ObjectColor::slot(3).is_valid());
        assert_eq!(ObjectColor::slot(3).index, 3);
    }

    #[test]
    fn set_slot_keeps_lot_flag() {
        let mut color = ObjectColor {
            sub_color: true,
            ..Default::default()
        };
        color.set_slot(7);
        assert_eq!(color.index, 7);
        assert!(color.is_valid());
        assert!(color.sub_color);
    }
}
