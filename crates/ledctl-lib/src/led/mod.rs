//! LED control: colour names, register primitives, direct-mode switch.

mod color;
mod ops;

pub use color::{COLOR_NAMES, Rbg, parse_color};
pub use ops::{set_direct_control, write_byte, write_led_colour, write_word};
