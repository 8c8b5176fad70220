//! Geometry constants and pool capacities shared by every component.
//!
//! Positions are pixels with y growing downward. Level files express
//! horizontal positions in level-blocks, which the loader converts with
//! [`BLOCK_SIZE`].

/// Side length of a single tile in pixels.
pub const TILE_SIZE: f32 = 16.0;

/// Width of one level-block (three tiles) in pixels.
pub const BLOCK_SIZE: f32 = TILE_SIZE * 3.0;

/// Number of level-blocks that span one screen width.
pub const SCREEN_BLOCKS: u32 = 10;

/// Width of one screen in pixels.
pub const SCREEN_WIDTH: f32 = SCREEN_BLOCKS as f32 * BLOCK_SIZE;

/// Level-blocks contributed by each unit of the `level-size` directive.
pub const LEVEL_SIZE_UNIT_BLOCKS: u32 = SCREEN_BLOCKS;

/// Level-blocks reserved at the right end of every level for the bus stop.
pub const RIGHT_MARGIN_BLOCKS: u32 = SCREEN_BLOCKS;

/// Default viewport width in pixels.
pub const DEFAULT_VIEW_WIDTH: f32 = 480.0;

/// Default viewport height in pixels.
pub const DEFAULT_VIEW_HEIGHT: f32 = 270.0;

/// Top edge of the street surface.
pub const GROUND_Y: f32 = 224.0;

/// Thickness of the street slab.
pub const FLOOR_THICKNESS: f32 = 32.0;

/// Top edge of a passageway's corridor floor.
pub const PASSAGE_FLOOR_Y: f32 = 352.0;

/// Feet below this line mean the player fell out through a deep hole.
pub const FALL_LIMIT_Y: f32 = 480.0;

/// Vertical camera position used while the player is underground.
pub const PASSAGE_CAMERA_Y: f32 = 128.0;

/// Lowest point the camera may ever reveal.
pub const WORLD_BOTTOM_Y: f32 = PASSAGE_FLOOR_Y + FLOOR_THICKNESS + 16.0;

/// Horizontal offset from the player's x to the left edge of its box.
pub const PLAYER_BOX_OFFSET_X: f32 = -12.0;

/// Width of the player's collision box.
pub const PLAYER_BOX_WIDTH: f32 = 24.0;

/// Box height while standing.
pub const PLAYER_HEIGHT: f32 = 44.0;

/// Box height while lying on the street after a slip.
pub const PLAYER_SLIP_HEIGHT: f32 = 20.0;

/// Feet height an inactive player is pinned to, above the top of the view.
pub const PLAYER_OFFSTAGE_Y: f32 = -PLAYER_HEIGHT - BLOCK_SIZE;

/// Distance from the feet to the hand used as the rope probe point.
pub const PLAYER_HAND_HEIGHT: f32 = 36.0;

/// Horizontal position the player starts a level at.
pub const PLAYER_START_X: f32 = -24.0;

/// Horizontal position the scripted approach walks the player to.
pub const PLAYER_APPROACH_X: f32 = 96.0;

/// Length of the bus.
pub const BUS_LENGTH: f32 = 288.0;

/// Distance from the rear of the bus to its door.
pub const BUS_DOOR_OFFSET: f32 = 240.0;

/// Distance from the left edge of the reserved final screen to the bus rear.
pub const BUS_STOP_OFFSET: f32 = 96.0;

/// Position of the bus at the start of a level, before it pulls away.
pub const BUS_START_X: f32 = 144.0;

/// Height of the overhead beam ropes hang from.
pub const ROPE_TOP_Y: f32 = GROUND_Y - 176.0;

/// Lower end of a hanging rope.
pub const ROPE_BOTTOM_Y: f32 = GROUND_Y - 64.0;

/// Minimum spacing between triggers, in level-blocks.
pub const TRIGGER_MIN_SPACING_BLOCKS: u32 = 10;

/// Maximum distance, in level-blocks, between a respawn point and its hole.
pub const RESPAWN_MAX_DISTANCE_BLOCKS: u32 = 4;

/// Pool capacities; load fails rather than exceeding any of them.
pub mod capacity {
    /// Generic objects.
    pub const OBJECTS: usize = 160;
    /// Static solids.
    pub const SOLIDS: usize = 256;
    /// Holes of any kind.
    pub const HOLES: usize = 32;
    /// Respawn points, one per deep hole.
    pub const RESPAWN_POINTS: usize = 32;
    /// Crate blocks.
    pub const CRATE_BLOCKS: usize = 32;
    /// Position triggers.
    pub const TRIGGERS: usize = 8;
    /// Active geysers.
    pub const GEYSERS: usize = 16;
    /// Passageways, each owning one pushable crate.
    pub const PASSAGEWAYS: usize = 4;
    /// Peels in flight.
    pub const MOVING_PEELS: usize = 16;
    /// Debris particles; the oldest slot is recycled when full.
    pub const PARTICLES: usize = 64;
    /// Sprite animations.
    pub const ANIMATIONS: usize = 16;
    /// Springs, bounded so every spring can animate at once.
    pub const SPRINGS: usize = 8;
    /// Object slots held back for peels thrown by scripted scenes.
    pub const SCRIPTED_OBJECTS: usize = 1;
    /// Animation slots held back for scripted actors.
    pub const SCRIPTED_ANIMATIONS: usize = ANIMATIONS - SPRINGS;
}
