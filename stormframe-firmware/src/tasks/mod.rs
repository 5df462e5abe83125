//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod backlight;
pub mod display;
pub mod rotation;
pub mod update;

pub use backlight::{backlight_task, wake_task};
pub use display::display_task;
pub use rotation::rotation_task;
pub use update::update_task;
