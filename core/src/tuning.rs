//! Physics tuning scalars consumed by the frame systems.

use serde::Deserialize;

/// Movement and timing parameters of the simulation.
///
/// Speeds are pixels per second, accelerations pixels per second squared and
/// durations seconds. Every field falls back to its default when omitted from a
/// configuration file.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysicsParams {
    /// Upper bound applied to every frame delta.
    pub max_frame_dt: f32,
    /// Horizontal acceleration while walking on a floor.
    pub walk_accel: f32,
    /// Horizontal deceleration on a floor without held input.
    pub walk_decel: f32,
    /// Horizontal acceleration while airborne.
    pub air_accel: f32,
    /// Maximum horizontal walking speed.
    pub max_walk_speed: f32,
    /// Downward acceleration.
    pub gravity: f32,
    /// Terminal falling speed.
    pub max_fall_speed: f32,
    /// Upward speed of a jump.
    pub jump_speed: f32,
    /// How long a jump press stays buffered while airborne.
    pub jump_buffer: f32,
    /// Time spent sliding after stepping on a peel.
    pub slip_duration: f32,
    /// Horizontal deceleration while sliding.
    pub slip_decel: f32,
    /// Time spent standing back up.
    pub get_up_duration: f32,
    /// Backward speed imparted by a geyser.
    pub throw_back_speed_x: f32,
    /// Upward speed imparted by a geyser.
    pub throw_back_speed_y: f32,
    /// Invulnerability blink after a respawn.
    pub flicker_duration: f32,
    /// Upward speed imparted by a spring.
    pub spring_speed: f32,
    /// Upward speed above which passageway lids are ignored.
    pub exit_speed_threshold: f32,
    /// Window in which the rope just released cannot be grabbed again.
    pub rope_regrab_window: f32,
    /// Restoring stiffness of a grabbed rope's swing.
    pub rope_stiffness: f32,
    /// Acceleration added to the swing by held input.
    pub rope_push: f32,
    /// Largest horizontal swing offset of a rope.
    pub rope_swing_limit: f32,
    /// Continuous push time needed before a crate slides.
    pub push_duration: f32,
    /// Sliding speed of a pushed crate.
    pub crate_slide_speed: f32,
    /// Largest upward step a slope may lift the player per frame.
    pub slope_step_up: f32,
    /// Largest drop the player sticks to while walking down a floor.
    pub floor_stick_down: f32,
    /// Proportional gain of the camera's horizontal follow.
    pub camera_gain: f32,
    /// Fastest horizontal camera speed.
    pub camera_max_speed: f32,
    /// Vertical camera speed when moving between street and passageway.
    pub camera_vertical_speed: f32,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            max_frame_dt: 1.0 / 30.0,
            walk_accel: 720.0,
            walk_decel: 960.0,
            air_accel: 480.0,
            max_walk_speed: 150.0,
            gravity: 1200.0,
            max_fall_speed: 600.0,
            jump_speed: 420.0,
            jump_buffer: 0.1,
            slip_duration: 0.8,
            slip_decel: 240.0,
            get_up_duration: 0.4,
            throw_back_speed_x: 150.0,
            throw_back_speed_y: 300.0,
            flicker_duration: 1.5,
            spring_speed: 660.0,
            exit_speed_threshold: 500.0,
            rope_regrab_window: 0.5,
            rope_stiffness: 9.87,
            rope_push: 160.0,
            rope_swing_limit: 48.0,
            push_duration: 0.75,
            crate_slide_speed: 60.0,
            slope_step_up: 12.0,
            floor_stick_down: 8.0,
            camera_gain: 6.0,
            camera_max_speed: 480.0,
            camera_vertical_speed: 240.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PhysicsParams;

    #[test]
    fn omitted_fields_keep_defaults() {
        let params: PhysicsParams = toml::from_str("gravity = 900.0").expect("parse");
        assert_eq!(params.gravity, 900.0);
        assert_eq!(params.jump_speed, PhysicsParams::default().jump_speed);
    }

    #[test]
    fn spring_clears_the_exit_threshold_but_a_jump_does_not() {
        let params = PhysicsParams::default();
        assert!(params.spring_speed > params.exit_speed_threshold);
        assert!(params.jump_speed < params.exit_speed_threshold);
    }
}
