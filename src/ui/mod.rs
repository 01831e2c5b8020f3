pub mod popup;

pub use popup::{Popup, PopupField, PopupTemplate};
