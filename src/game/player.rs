//! Player state machine - standing, dodging, swinging, elimination

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use super::ball::Ball;
use super::constants::{
    ARENA_CENTER, DODGE_DURATION, FLY_OFF_GRAVITY, FLY_OFF_LIFT, FLY_OFF_SPEED, HIT_COOLDOWN,
    HIT_RANGE, OFFSCREEN_MARGIN, PLAYER_COLORS, PLAYER_DODGE_RADIUS, PLAYER_SURFACE_RADIUS,
    SCREEN_HEIGHT, SCREEN_WIDTH, SWING_DURATION,
};

/// Player motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    /// On the arena surface, able to act
    Standing,
    /// Sunk toward the arena center, untouchable by the ball
    Dodging,
    /// Swing animation in progress
    Swinging,
    /// Out of the game for good
    Eliminated,
    /// Knocked off the arena, flying ballistically
    FlyingOff,
}

/// A player on the arena rim (authoritative)
#[derive(Debug, Clone)]
pub struct Player {
    /// Slot index, 0..3
    pub id: u8,
    /// Fixed angular position of the slot
    pub angle: f64,
    pub color: [u8; 3],
    pub state: PlayerState,
    pub x: f64,
    pub y: f64,

    // Timers, all clamped at zero
    pub dodge_timer: f64,
    pub swing_timer: f64,
    pub hit_cooldown: f64,

    // Swing bookkeeping
    /// Peak stick deflection for the active swing, radians
    pub swing_target: f64,
    /// Swing animation progress, 0..1
    pub swing_progress: f64,
    /// Current stick deflection, radians (degrees on the wire)
    pub stick_angle: f64,

    // Ballistic velocity while flying off
    pub vel_x: f64,
    pub vel_y: f64,
}

impl Player {
    pub fn new(id: u8) -> Self {
        let mut player = Self {
            id,
            angle: id as f64 * FRAC_PI_2,
            color: PLAYER_COLORS[id as usize % PLAYER_COLORS.len()],
            state: PlayerState::Standing,
            x: 0.0,
            y: 0.0,
            dodge_timer: 0.0,
            swing_timer: 0.0,
            hit_cooldown: 0.0,
            swing_target: 0.0,
            swing_progress: 0.0,
            stick_angle: 0.0,
            vel_x: 0.0,
            vel_y: 0.0,
        };
        player.update_position();
        player
    }

    /// Rest orientation of the stick for this slot
    fn base_stick_angle(&self) -> f64 {
        match self.id {
            0 => 0.0,
            1 => FRAC_PI_2,
            2 => PI,
            _ => -FRAC_PI_2,
        }
    }

    /// Recompute (x, y) from the slot angle and the state's radius
    fn update_position(&mut self) {
        let radius = match self.state {
            PlayerState::Dodging => PLAYER_DODGE_RADIUS,
            _ => PLAYER_SURFACE_RADIUS,
        };
        let (cx, cy) = ARENA_CENTER;
        self.x = cx + self.angle.cos() * radius;
        self.y = cy + self.angle.sin() * radius;
    }

    /// Begin a dodge; only possible while standing
    pub fn dodge(&mut self) {
        if self.state != PlayerState::Standing {
            return;
        }
        self.state = PlayerState::Dodging;
        self.dodge_timer = DODGE_DURATION;
        self.update_position();
    }

    /// Attempt to hit the ball. The swing animation always plays when the
    /// action is legal; the ball is only struck when it is active and within
    /// range at the moment the swing starts. Returns whether it was struck.
    pub fn attempt_hit(&mut self, ball: &mut Ball) -> bool {
        if self.state != PlayerState::Standing || self.hit_cooldown > 0.0 {
            return false;
        }

        let (ball_x, ball_y) = ball.position();
        let distance = ((ball_x - self.x).powi(2) + (ball_y - self.y).powi(2)).sqrt();
        let struck = ball.is_active && distance <= HIT_RANGE;

        // Swing toward the ball's bearing, clamped to the stick's arc
        let bearing = (ball_y - self.y).atan2(ball_x - self.x);
        let relative = wrap_angle(bearing - self.base_stick_angle());
        self.swing_target = relative.clamp(-FRAC_PI_2, FRAC_PI_2);
        self.swing_progress = 0.0;
        self.state = PlayerState::Swinging;
        self.swing_timer = SWING_DURATION;
        self.hit_cooldown = HIT_COOLDOWN;

        if struck {
            ball.reverse_direction();
            ball.increase_speed();
        }
        struck
    }

    /// Knock the player off the arena, away from the ball
    pub fn eliminate(&mut self, ball_x: f64, ball_y: f64) {
        let dx = self.x - ball_x;
        let dy = self.y - ball_y;
        let distance = (dx * dx + dy * dy).sqrt();
        let (dir_x, dir_y) = if distance > 0.0 {
            (dx / distance, dy / distance)
        } else {
            (0.0, -1.0)
        };

        self.vel_x = dir_x * FLY_OFF_SPEED;
        self.vel_y = dir_y * FLY_OFF_SPEED - FLY_OFF_LIFT;
        self.state = PlayerState::FlyingOff;
    }

    /// Advance timers and state by dt seconds
    pub fn update(&mut self, dt: f64) {
        self.hit_cooldown = (self.hit_cooldown - dt).max(0.0);

        match self.state {
            PlayerState::Standing | PlayerState::Eliminated => {}
            PlayerState::Dodging => {
                self.dodge_timer = (self.dodge_timer - dt).max(0.0);
                if self.dodge_timer <= 0.0 {
                    self.state = PlayerState::Standing;
                    self.update_position();
                }
            }
            PlayerState::Swinging => {
                self.swing_timer = (self.swing_timer - dt).max(0.0);
                self.swing_progress = 1.0 - self.swing_timer / SWING_DURATION;
                let intensity = (self.swing_progress * PI).sin();
                self.stick_angle = self.swing_target * intensity;

                if self.swing_timer <= 0.0 {
                    self.state = PlayerState::Standing;
                    self.stick_angle = 0.0;
                    self.swing_target = 0.0;
                    self.swing_progress = 0.0;
                }
            }
            PlayerState::FlyingOff => {
                self.x += self.vel_x * dt;
                self.y += self.vel_y * dt;
                self.vel_y += FLY_OFF_GRAVITY * dt;

                if self.x < -OFFSCREEN_MARGIN
                    || self.x > SCREEN_WIDTH + OFFSCREEN_MARGIN
                    || self.y > SCREEN_HEIGHT + OFFSCREEN_MARGIN
                {
                    self.state = PlayerState::Eliminated;
                }
            }
        }
    }
}

/// Wrap an angle difference into [-pi, pi)
fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}
