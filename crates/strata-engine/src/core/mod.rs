//! Core engine-facing contracts.
//!
//! This module defines the stable interface between the host (the thread that
//! owns the loop) and games built on the engine. The host builds a
//! [`Platform`] explicitly and hands it to [`Game::init`]; nothing here is a
//! global.

mod game;
mod platform;

pub use game::Game;
pub use platform::{Platform, PlatformConfig};
