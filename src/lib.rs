// Library surface for the play loop, headless simulation and integration tests.
// Terminal rendering stays in the binary.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod grade;
pub mod headless;
pub mod hit_object;
pub mod input_log;
pub mod judgment;
pub mod map;
pub mod runtime;
pub mod scheduler;
pub mod scoring;
pub mod session;
pub mod time_series;
pub mod training;
pub mod util;
pub mod window;

pub use error::{Error, Result};
