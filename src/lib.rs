//! Hit & Dodge game server library
//!
//! Authoritative server for a four-player arcade game: players stand on
//! fixed slots around a circular arena and hit or dodge a ball orbiting
//! its edge. Rooms are created and joined over a line-oriented TCP
//! protocol; each room runs the simulation at a fixed tick rate and
//! broadcasts state to its players.

pub mod app;
pub mod config;
pub mod game;
pub mod http;
pub mod net;
pub mod room;
pub mod util;
