//! Ball state - orbits the arena, accelerates on hits

use std::f64::consts::{FRAC_PI_2, TAU};

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::constants::{
    ARENA_CENTER, BALL_ACCELERATION, BALL_ORBIT_RADIUS, BALL_SPAWN_DELAY, INITIAL_BALL_SPEED,
    MAX_PLAYERS,
};

/// The orbiting ball (authoritative)
#[derive(Debug, Clone)]
pub struct Ball {
    /// Angular position on the orbit, radians in [0, 2*pi)
    pub angle: f64,
    /// Scalar speed along the orbit, pixels per second
    pub speed: f64,
    /// Orbit direction, +1.0 or -1.0
    pub direction: f64,
    /// Countdown until the ball becomes active
    pub spawn_timer: f64,
    pub is_active: bool,
}

impl Ball {
    pub fn new(rng: &mut ChaCha8Rng) -> Self {
        let mut ball = Self {
            angle: 0.0,
            speed: INITIAL_BALL_SPEED,
            direction: 1.0,
            spawn_timer: BALL_SPAWN_DELAY,
            is_active: false,
        };
        ball.respawn(rng);
        ball
    }

    /// Place the ball at the midpoint of a random adjacent slot gap,
    /// inactive, with a fresh spawn countdown. Speed is left alone.
    pub fn respawn(&mut self, rng: &mut ChaCha8Rng) {
        let pair = rng.gen_range(0..MAX_PLAYERS);
        let first = pair as f64 * FRAC_PI_2;
        // The last gap wraps back to slot 0; take the midpoint on the far side
        let second = if pair == MAX_PLAYERS - 1 {
            TAU
        } else {
            (pair + 1) as f64 * FRAC_PI_2
        };

        let mut angle = (first + second) / 2.0;
        if angle >= TAU {
            angle -= TAU;
        }

        self.angle = angle;
        self.direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        self.is_active = false;
        self.spawn_timer = BALL_SPAWN_DELAY;
    }

    /// Current position on the orbit
    pub fn position(&self) -> (f64, f64) {
        let (cx, cy) = ARENA_CENTER;
        (
            cx + self.angle.cos() * BALL_ORBIT_RADIUS,
            cy + self.angle.sin() * BALL_ORBIT_RADIUS,
        )
    }

    pub fn reverse_direction(&mut self) {
        self.direction = -self.direction;
    }

    pub fn increase_speed(&mut self) {
        self.speed *= BALL_ACCELERATION;
    }

    pub fn reset_speed(&mut self) {
        self.speed = INITIAL_BALL_SPEED;
    }

    /// Advance the ball by dt seconds. During the spawn countdown the ball
    /// does not move, and it stays put on the activation step itself.
    pub fn update(&mut self, dt: f64) {
        if !self.is_active {
            self.spawn_timer -= dt;
            if self.spawn_timer <= 0.0 {
                self.spawn_timer = 0.0;
                self.is_active = true;
            }
            return;
        }

        self.angle += (self.speed / BALL_ORBIT_RADIUS) * dt * self.direction;
        self.angle = self.angle.rem_euclid(TAU);
    }
}
