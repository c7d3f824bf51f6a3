//! Time subsystem.
//!
//! Provides stable, testable frame timing without coupling to a runtime.
//! Intended usage:
//! - the host builds one `GameLoop` around its `Game` and `Platform`
//! - `tick()` once per frame (or `run()` to let the loop pace itself)
//! - tests drive the loop with a `ManualClock`

mod frame_clock;
mod game_loop;

pub use frame_clock::{Clock, FrameClock, FrameTime, ManualClock, SystemClock};
pub use game_loop::{GameLoop, LoopConfig, LoopHandle};
