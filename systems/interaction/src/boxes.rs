use last_bus_core::{metrics::BLOCK_SIZE, ObjectKind, Rect};
use last_bus_world::Obj;

/// Region of an object that reacts to the player's box.
///
/// Ropes react to the player's hand instead and use the full block here.
#[must_use]
pub fn contact_box(obj: &Obj) -> Rect {
    let (half_width, height) = match obj.kind {
        ObjectKind::SilverCoin | ObjectKind::GoldCoin => (8.0, 16.0),
        ObjectKind::Peel => (12.0, 8.0),
        ObjectKind::GeyserCrack => (12.0, 4.0),
        ObjectKind::Spring => (16.0, 16.0),
        _ => (BLOCK_SIZE / 2.0, BLOCK_SIZE),
    };
    Rect::new(obj.x - half_width, obj.y - height, obj.x + half_width, obj.y)
}
