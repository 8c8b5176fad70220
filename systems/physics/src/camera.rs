use last_bus_core::PhysicsParams;
use last_bus_world::World;

/// Share of the view kept to the left of a followed player.
const LEAD: f32 = 0.4;

/// Eases the camera toward its destination and clamps it to the level.
pub(crate) fn follow(world: &mut World, params: &PhysicsParams, dt: f32) {
    let player_x = world.player().x;
    let camera = world.camera_mut();

    if camera.follow {
        camera.dest_x = camera.clamp_x(player_x - LEAD * camera.view_width);
    }
    camera.vx = ((camera.dest_x - camera.x) * params.camera_gain)
        .clamp(-params.camera_max_speed, params.camera_max_speed);
    camera.x = camera.clamp_x(camera.x + camera.vx * dt);

    let remaining = camera.dest_y - camera.y;
    let step = params.camera_vertical_speed * dt;
    if remaining.abs() <= step {
        camera.y = camera.dest_y;
        camera.vy = 0.0;
    } else {
        camera.vy = params.camera_vertical_speed.copysign(remaining);
        camera.y += step.copysign(remaining);
    }
    camera.y = camera.clamp_y(camera.y);
}
