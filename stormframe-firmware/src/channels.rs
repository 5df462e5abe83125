//! Inter-task communication channels
//!
//! Defines the static signals and channels used between Embassy tasks.
//!
//! ```text
//!   update ──GALLERY_REQUEST──► display
//!   update ◄──GALLERY_OUT────── display     (gallery moves to update)
//!   update ───GALLERY_BACK────► display     (gallery moves back, filled)
//!   update ───ROTATION_ARM────► rotation timer ──ROTATE──► display
//!   wake inputs ──WAKE──► backlight
//! ```
//!
//! The gallery is never shared: whichever task last received it owns it.

use alloc::boxed::Box;
use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use stormframe_core::config::MAX_IMAGES;
use stormframe_core::rotation::Gallery;

/// The gallery as sized for this board
pub type FrameGallery = Gallery<MAX_IMAGES>;

/// Gallery returned to the display task after a refresh cycle
pub struct Handback {
    pub gallery: Box<FrameGallery>,
    /// At least one slot decoded this cycle
    pub ready: bool,
}

/// Update task wants the gallery for a refresh cycle
pub static GALLERY_REQUEST: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Display task hands the gallery to the update task
pub static GALLERY_OUT: Channel<CriticalSectionRawMutex, Box<FrameGallery>, 1> = Channel::new();

/// Update task hands the filled gallery back
pub static GALLERY_BACK: Channel<CriticalSectionRawMutex, Handback, 1> = Channel::new();

/// Start (or restart) the rotation interval
pub static ROTATION_ARM: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Time to show the next image
pub static ROTATE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Touch or motion detected
pub static WAKE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Backlight state, written by the backlight task
pub static BACKLIGHT_ON: Mutex<CriticalSectionRawMutex, Cell<bool>> = Mutex::new(Cell::new(true));

/// Read the backlight state
pub fn backlight_is_on() -> bool {
    BACKLIGHT_ON.lock(|on| on.get())
}
