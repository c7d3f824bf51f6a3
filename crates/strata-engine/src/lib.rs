//! Strata engine crate.
//!
//! A backend-agnostic 2D substrate for games:
//! - `scene`: retained layer tree painted back to front
//! - `canvas`: stateful immediate-mode drawing over a `Backend`
//! - `raster`: CPU backend rendering into a `Pixmap`
//! - `time`: fixed/variable timestep `GameLoop`
//! - `core`: the `Game` contract and the host-built `Platform`
//!
//! Everything except `LoopHandle` and the asset channel is confined to the
//! thread that owns the loop.

pub mod assets;
pub mod canvas;
pub mod coords;
pub mod core;
pub mod image;
pub mod logging;
pub mod paint;
pub mod raster;
pub mod scene;
pub mod text;
pub mod time;
