//! Panel output

pub mod painter;
pub mod panel;

pub use painter::{paint_frame, paint_message, Canvas};
pub use panel::{dpi_config, Panel, PanelError};
