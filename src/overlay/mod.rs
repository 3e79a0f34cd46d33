pub mod renderer;
pub mod skeleton;

pub use renderer::{compose_overlay, DrawLoop, OverlayFrame};
pub use skeleton::{draw_hand, HAND_CONNECTIONS};
