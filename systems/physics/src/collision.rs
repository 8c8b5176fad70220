//! Axis-separated resolution of the player box against static solids.
//!
//! Horizontal resolution runs first on the old feet height, vertical
//! resolution then runs on the horizontally resolved box.

use last_bus_core::{
    metrics::{PLAYER_BOX_OFFSET_X, PLAYER_BOX_WIDTH},
    PhysicsParams, Rect, SolidKind,
};
use last_bus_world::{Player, Solid};

/// Tolerance used when comparing edges that should coincide.
pub const EPSILON: f32 = 0.01;

/// Speeds below this magnitude count as standing still.
const STILL_SPEED: f32 = 1.0;

/// Result of horizontal resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Horizontal {
    /// Resolved horizontal centre.
    pub x: f32,
    /// Whether a solid stopped the motion.
    pub blocked: bool,
}

/// Result of vertical resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertical {
    /// Resolved feet position.
    pub y: f32,
    /// Whether the feet came to rest on a floor.
    pub landed: bool,
    /// Whether the head hit a ceiling.
    pub bonked: bool,
    /// Horizontal position forced by the ledge heuristic.
    pub snap_x: Option<f32>,
}

/// Moves the player toward `target_x`, stopping at the nearest full solid.
///
/// Only solids whose vertical span strictly overlaps the player's box and
/// whose blocking edge lies at or beyond the box's leading edge take part.
pub fn resolve_horizontal<'a>(
    solids: impl IntoIterator<Item = &'a Solid>,
    player: &Player,
    target_x: f32,
) -> Horizontal {
    let old = player.bounding_box();
    let moved = player.box_at(target_x, player.y);
    let mut x = target_x;

    for solid in solids {
        if !solid.kind.blocks_horizontally() || !old.overlaps_vertically(&solid.rect) {
            continue;
        }
        let rect = &solid.rect;
        if target_x > player.x {
            if rect.left >= old.right - EPSILON && rect.left < moved.right {
                x = x.min(rect.left - PLAYER_BOX_WIDTH - PLAYER_BOX_OFFSET_X);
            }
        } else if target_x < player.x && rect.right <= old.left + EPSILON && rect.right > moved.left
        {
            x = x.max(rect.right - PLAYER_BOX_OFFSET_X);
        }
    }

    Horizontal {
        x,
        blocked: x != target_x,
    }
}

/// Floor height a solid offers to a box overlapping it horizontally.
///
/// Slopes interpolate across their span: a rising slope samples the box's
/// right edge, a falling slope its left edge. Other kinds offer their top.
#[must_use]
pub fn floor_height(solid: &Solid, body: &Rect) -> f32 {
    let rect = &solid.rect;
    match solid.kind {
        SolidKind::SlopeUp => {
            let t = ((body.right - rect.left) / rect.width()).clamp(0.0, 1.0);
            rect.bottom - t * rect.height()
        }
        SolidKind::SlopeDown => {
            let t = ((body.left - rect.left) / rect.width()).clamp(0.0, 1.0);
            rect.top + t * rect.height()
        }
        _ => rect.top,
    }
}

fn acts_as_floor(kind: SolidKind) -> bool {
    !matches!(kind, SolidKind::PassagewayEntry)
}

fn acts_as_ceiling(kind: SolidKind, vy: f32, params: &PhysicsParams) -> bool {
    match kind {
        SolidKind::Full | SolidKind::Vertical | SolidKind::PassagewayEntry => true,
        SolidKind::PassagewayExit => vy >= -params.exit_speed_threshold,
        SolidKind::KeepOnTop | SolidKind::SlopeUp | SolidKind::SlopeDown => false,
    }
}

/// Moves the player's feet toward `target_y`, landing on floors and
/// stopping at ceilings.
///
/// `player.x` must already be horizontally resolved.
pub fn resolve_vertical<'a, I>(
    solids: I,
    player: &Player,
    target_y: f32,
    params: &PhysicsParams,
) -> Vertical
where
    I: IntoIterator<Item = &'a Solid>,
{
    let old = player.bounding_box();
    let moved = player.box_at(player.x, target_y);
    let mut result = Vertical {
        y: target_y,
        landed: false,
        bonked: false,
        snap_x: None,
    };

    if target_y >= player.y {
        let reach = if player.on_floor {
            target_y + params.floor_stick_down
        } else {
            target_y
        };
        let mut floor: Option<f32> = None;
        let mut supports: Vec<Rect> = Vec::new();
        for solid in solids {
            if !acts_as_floor(solid.kind) || !moved.overlaps_horizontally(&solid.rect) {
                continue;
            }
            let height = floor_height(solid, &moved);
            let step_up = if solid.kind.is_slope() {
                params.slope_step_up
            } else {
                EPSILON
            };
            if height < old.bottom - step_up || height > reach + EPSILON {
                continue;
            }
            match floor {
                Some(best) if height > best + EPSILON => {}
                Some(best) if height < best - EPSILON => {
                    floor = Some(height);
                    supports.clear();
                    supports.push(solid.rect);
                }
                Some(_) => supports.push(solid.rect),
                None => {
                    floor = Some(height);
                    supports.push(solid.rect);
                }
            }
        }

        if let Some(height) = floor {
            let landing = !player.on_floor;
            let foot_supported = supports
                .iter()
                .any(|rect| player.x >= rect.left && player.x <= rect.right);
            if landing && player.vx.abs() < STILL_SPEED && !foot_supported {
                result.snap_x = ledge_snap(&supports, player.x);
            }
            if result.snap_x.is_none() {
                result.y = height;
                result.landed = true;
            }
        }
    } else {
        let mut ceiling: Option<f32> = None;
        for solid in solids {
            if !acts_as_ceiling(solid.kind, player.vy, params)
                || !moved.overlaps_horizontally(&solid.rect)
            {
                continue;
            }
            let bottom = solid.rect.bottom;
            if bottom <= old.top + EPSILON && bottom > moved.top {
                ceiling = Some(ceiling.map_or(bottom, |best: f32| best.max(bottom)));
            }
        }
        if let Some(bottom) = ceiling {
            result.y = bottom + player.height;
            result.bonked = true;
        }
    }

    result
}

/// Horizontal centre that moves the box just clear of the supporting edge.
fn ledge_snap(supports: &[Rect], foot_x: f32) -> Option<f32> {
    let rect = supports.first()?;
    if foot_x < rect.left {
        Some(rect.left - PLAYER_BOX_WIDTH - PLAYER_BOX_OFFSET_X)
    } else {
        Some(rect.right - PLAYER_BOX_OFFSET_X)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use last_bus_core::metrics::{GROUND_Y, PLAYER_HEIGHT};

    fn solid(kind: SolidKind, left: f32, top: f32, right: f32, bottom: f32) -> Solid {
        Solid {
            rect: Rect::new(left, top, right, bottom),
            kind,
        }
    }

    fn falling(x: f32, y: f32, vy: f32) -> Player {
        let mut player = Player::new(x, y);
        player.on_floor = false;
        player.vy = vy;
        player
    }

    #[test]
    fn moving_left_stops_at_the_right_edge() {
        let wall = solid(SolidKind::Full, 0.0, GROUND_Y - 48.0, 48.0, GROUND_Y);
        let player = Player::new(70.0, GROUND_Y);
        let resolved = resolve_horizontal([&wall], &player, 50.0);
        assert_eq!(resolved.x, 48.0 - PLAYER_BOX_OFFSET_X);
        assert!(resolved.blocked);
    }

    #[test]
    fn vertical_solids_never_block_sideways() {
        let post = solid(SolidKind::Vertical, 100.0, GROUND_Y - 112.0, 108.0, GROUND_Y);
        let player = Player::new(80.0, GROUND_Y);
        let resolved = resolve_horizontal([&post], &player, 110.0);
        assert_eq!(resolved.x, 110.0);
        assert!(!resolved.blocked);
    }

    #[test]
    fn standing_on_a_floor_does_not_block_walking() {
        let street = solid(SolidKind::Full, 0.0, GROUND_Y, 960.0, GROUND_Y + 32.0);
        let player = Player::new(100.0, GROUND_Y);
        assert!(!resolve_horizontal([&street], &player, 120.0).blocked);
    }

    #[test]
    fn falling_lands_on_the_highest_reached_floor() {
        let params = PhysicsParams::default();
        let street = solid(SolidKind::Full, 0.0, GROUND_Y, 960.0, GROUND_Y + 32.0);
        let roof = solid(SolidKind::KeepOnTop, 80.0, GROUND_Y - 32.0, 160.0, GROUND_Y);
        let player = falling(120.0, GROUND_Y - 40.0, 300.0);
        let resolved = resolve_vertical([&street, &roof], &player, GROUND_Y - 20.0, &params);
        assert!(resolved.landed);
        assert_eq!(resolved.y, GROUND_Y - 32.0);
    }

    #[test]
    fn one_way_floors_let_the_player_rise_through() {
        let params = PhysicsParams::default();
        let roof = solid(SolidKind::KeepOnTop, 80.0, GROUND_Y - 32.0, 160.0, GROUND_Y);
        let player = falling(120.0, GROUND_Y, -400.0);
        let resolved = resolve_vertical([&roof], &player, GROUND_Y - 20.0, &params);
        assert!(!resolved.bonked);
        assert_eq!(resolved.y, GROUND_Y - 20.0);
    }

    #[test]
    fn entry_lids_are_ignored_while_falling() {
        let params = PhysicsParams::default();
        let entry = solid(SolidKind::PassagewayEntry, 96.0, GROUND_Y, 144.0, GROUND_Y + 32.0);
        let mut player = Player::new(120.0, GROUND_Y);
        player.vy = 20.0;
        let resolved = resolve_vertical([&entry], &player, GROUND_Y + 1.0, &params);
        assert!(!resolved.landed);
    }

    #[test]
    fn exit_lids_give_way_to_fast_launches_only() {
        let params = PhysicsParams::default();
        let exit = solid(SolidKind::PassagewayExit, 96.0, GROUND_Y, 144.0, GROUND_Y + 32.0);
        let below = GROUND_Y + 32.0 + PLAYER_HEIGHT;

        let jump = falling(120.0, below, -params.jump_speed);
        let resolved = resolve_vertical([&exit], &jump, below - 10.0, &params);
        assert!(resolved.bonked);
        assert_eq!(resolved.y, below);

        let spring = falling(120.0, below, -params.spring_speed);
        let resolved = resolve_vertical([&exit], &spring, below - 10.0, &params);
        assert!(!resolved.bonked);
    }

    #[test]
    fn landing_beside_a_ledge_snaps_clear_of_it() {
        let params = PhysicsParams::default();
        let crate_top = solid(SolidKind::Full, 100.0, GROUND_Y - 48.0, 148.0, GROUND_Y);
        // Foot hangs 6 px left of the crate while the box still overlaps it.
        let player = falling(94.0, GROUND_Y - 52.0, 200.0);
        let resolved = resolve_vertical([&crate_top], &player, GROUND_Y - 46.0, &params);
        assert!(!resolved.landed);
        assert_eq!(resolved.snap_x, Some(100.0 - PLAYER_BOX_WIDTH - PLAYER_BOX_OFFSET_X));
        assert_eq!(resolved.y, GROUND_Y - 46.0);
    }

    #[test]
    fn rising_slope_floor_is_monotonic_and_continuous() {
        let slope = solid(SolidKind::SlopeUp, 200.0, GROUND_Y - 48.0, 296.0, GROUND_Y);
        let rise_per_step = 0.5 * 48.0 / 96.0;
        let mut previous = GROUND_Y;
        let mut left = 150.0;
        while left < 320.0 {
            let body = Rect::new(left, GROUND_Y - PLAYER_HEIGHT, left + PLAYER_BOX_WIDTH, GROUND_Y);
            let height = floor_height(&slope, &body);
            assert!(height <= previous + EPSILON);
            assert!(previous - height <= rise_per_step + EPSILON);
            previous = height;
            left += 0.5;
        }
        assert_eq!(previous, GROUND_Y - 48.0);
    }

    #[test]
    fn walking_sticks_to_descending_floors() {
        let params = PhysicsParams::default();
        let slope = solid(SolidKind::SlopeDown, 100.0, GROUND_Y - 32.0, 124.0, GROUND_Y);
        let mut player = Player::new(125.5, GROUND_Y - 20.0);
        player.vy = 40.0;
        let resolved = resolve_vertical([&slope], &player, GROUND_Y - 19.0, &params);
        assert!(resolved.landed);
        let expected = floor_height(&slope, &player.box_at(125.5, GROUND_Y - 19.0));
        assert_eq!(resolved.y, expected);
        assert!(resolved.y > GROUND_Y - 19.0);
    }
}
