//! Game tuning constants - arena geometry, speeds, timers
//!
//! Positions are expressed on the nominal 800x600 screen clients render,
//! with the arena centered on it. All speeds are pixels per second and all
//! timers are seconds.

/// Nominal screen width
pub const SCREEN_WIDTH: f64 = 800.0;
/// Nominal screen height
pub const SCREEN_HEIGHT: f64 = 600.0;

/// Center of the circular arena
pub const ARENA_CENTER: (f64, f64) = (SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0);
/// Arena radius
pub const ARENA_RADIUS: f64 = 200.0;

/// Player body radius
pub const PLAYER_RADIUS: f64 = 25.0;
/// Orbit radius for a player standing on the arena surface
pub const PLAYER_SURFACE_RADIUS: f64 = ARENA_RADIUS + PLAYER_RADIUS + 5.0;
/// Orbit radius for a player sunk into a dodge
pub const PLAYER_DODGE_RADIUS: f64 = ARENA_RADIUS - PLAYER_RADIUS / 2.0;
/// Slot colors (red, green, blue, yellow) as RGB
pub const PLAYER_COLORS: [[u8; 3]; 4] = [
    [255, 0, 0],
    [0, 255, 0],
    [0, 100, 255],
    [255, 255, 0],
];

/// Room capacity; the game starts when this many players are seated
pub const MAX_PLAYERS: usize = 4;

/// Maximum distance from a player at which a swing can strike the ball
pub const HIT_RANGE: f64 = 60.0;
/// Length of the swing animation
pub const SWING_DURATION: f64 = 0.3;
/// Minimum delay between swings
pub const HIT_COOLDOWN: f64 = 0.5;
/// How long a dodge keeps the player sunk
pub const DODGE_DURATION: f64 = 1.0;

/// Ball radius
pub const BALL_RADIUS: f64 = 10.0;
/// Ball speed at spawn and after every elimination
pub const INITIAL_BALL_SPEED: f64 = 100.0;
/// Speed multiplier applied on every effective hit
pub const BALL_ACCELERATION: f64 = 1.2;
/// Countdown before a freshly spawned ball becomes active
pub const BALL_SPAWN_DELAY: f64 = 3.0;
/// How far outside the arena the ball orbits
pub const BALL_ORBIT_OFFSET: f64 = 35.0;
/// Radius of the ball's orbit
pub const BALL_ORBIT_RADIUS: f64 = ARENA_RADIUS + BALL_ORBIT_OFFSET;

/// Launch speed of an eliminated player
pub const FLY_OFF_SPEED: f64 = 300.0;
/// Upward bias added to the launch velocity
pub const FLY_OFF_LIFT: f64 = 150.0;
/// Downward acceleration while flying off
pub const FLY_OFF_GRAVITY: f64 = 400.0;
/// A flying player this far past the screen edge is out for good
pub const OFFSCREEN_MARGIN: f64 = 100.0;
