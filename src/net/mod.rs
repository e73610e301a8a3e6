//! TCP gateway - protocol types, server handler, client connector

pub mod client;
pub mod handler;
pub mod protocol;
