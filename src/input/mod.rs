pub mod events;

pub use events::{Cursor, HandlerId, Interaction, LayerEventHandler, PointerEvent, PointerEventKind};
