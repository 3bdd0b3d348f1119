//! Output handling (highlighting, styling)

pub mod highlight;
pub mod options;
pub mod terminal;

pub use highlight::{highlight, DEFAULT_THEME};
pub use options::ColorMode;
pub use terminal::{colors, colorize, error, key, label, muted, value, RESET};
