//! Snapshot assembly - simulation state to wire payload

use crate::net::protocol::{BallSnapshot, PlayerSnapshot, ServerMsg};

use super::simulation::Simulation;

/// Build the per-tick `game_state` broadcast
pub fn build_game_state(sim: &Simulation) -> ServerMsg {
    let players = sim
        .players
        .iter()
        .map(|p| PlayerSnapshot {
            id: p.id,
            x: p.x,
            y: p.y,
            state: p.state.into(),
            stick_angle: p.stick_angle.to_degrees(),
            color: p.color,
        })
        .collect();

    let (ball_x, ball_y) = sim.ball.position();
    ServerMsg::GameState {
        players,
        ball: BallSnapshot {
            x: ball_x,
            y: ball_y,
            is_active: sim.ball.is_active,
            spawn_timer: sim.ball.spawn_timer,
        },
        game_over: sim.game_over,
    }
}
