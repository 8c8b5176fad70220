use last_bus_core::{
    metrics::{BLOCK_SIZE, FLOOR_THICKNESS, GROUND_Y, PASSAGE_CAMERA_Y},
    Event, HoleKind, PhysicsParams, SlotId, SoundId,
};
use last_bus_world::{Hole, ParticleKind, World};

/// Feet this far below the street mean the player dropped into an entry.
const ENTRY_DEPTH: f32 = 8.0;

/// Feet this far above the street mean the player has cleared an exit.
const CLEAR_HEIGHT: f32 = 16.0;

const CRACK_PARTICLES: usize = 12;

/// Tracks the player through passageway entries and exits.
pub(crate) fn detect(world: &mut World, params: &PhysicsParams, out_events: &mut Vec<Event>) {
    let player = *world.player();
    let body = player.bounding_box();
    let passageways: Vec<(SlotId, Hole)> = world
        .holes()
        .iter()
        .filter(|(_, hole)| hole.kind.is_passageway())
        .map(|(id, hole)| (id, *hole))
        .collect();

    for (id, hole) in passageways {
        let entry = (hole.x, hole.x + BLOCK_SIZE);
        if player.passageway.is_none()
            && player.y > GROUND_Y + ENTRY_DEPTH
            && body.left >= entry.0
            && body.right <= entry.1
        {
            world.player_mut().passageway = Some(id);
            world.camera_mut().dest_y = PASSAGE_CAMERA_Y;
            log::debug!("player entered passageway {}", id.get());
        }

        let exit = (hole.right() - BLOCK_SIZE, hole.right());
        if hole.kind == HoleKind::PassagewayClosed
            && player.x > exit.0
            && player.x < exit.1
            && player.vy < -params.exit_speed_threshold
            && body.top < GROUND_Y + FLOOR_THICKNESS
        {
            if let Some(hole) = world.holes_mut().get_mut(id) {
                hole.kind = HoleKind::PassagewayOpen;
            }
            world.emit_particles(
                ParticleKind::Crack,
                exit.0 + BLOCK_SIZE / 2.0,
                GROUND_Y,
                CRACK_PARTICLES,
            );
            out_events.push(Event::SoundRequested {
                sound: SoundId::Crack,
            });
            out_events.push(Event::PassagewayOpened { hole: id });
            log::debug!("passageway {} burst open", id.get());
        }
    }

    let player = world.player_mut();
    if player.passageway.is_some() && player.y < GROUND_Y - CLEAR_HEIGHT {
        player.passageway = None;
        world.camera_mut().dest_y = 0.0;
    }
}
