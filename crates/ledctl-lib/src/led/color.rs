//! Colour names for the LED banks.
//!
//! The controllers take channels in **R, B, G** order, so [`Rbg`] keeps its
//! fields in that order and [`Rbg::block_payload`] emits them unchanged.

use std::fmt;

use serde::Serialize;

/// A colour as the banks expect it: red, blue, green.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rbg {
    pub r: u8,
    pub b: u8,
    pub g: u8,
}

impl Rbg {
    pub const fn new(r: u8, b: u8, g: u8) -> Self {
        Rbg { r, b, g }
    }

    /// Block-write payload for a colour register.
    pub const fn block_payload(self) -> [u8; 3] {
        [self.r, self.b, self.g]
    }
}

impl fmt::Display for Rbg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R={} B={} G={}", self.r, self.b, self.g)
    }
}

/// Accepted colour names, in the order they are listed to the user.
pub const COLOR_NAMES: &[&str] = &["red", "blue", "black"];

/// Resolve a colour name (case-insensitive) to its channel values.
pub fn parse_color(name: &str) -> crate::error::Result<Rbg> {
    let trimmed = name.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "red" => Ok(Rbg::new(0xFF, 0x00, 0x00)),
        "blue" => Ok(Rbg::new(0x00, 0xFF, 0x00)),
        "black" => Ok(Rbg::new(0x00, 0x00, 0x00)),
        _ => Err(crate::LedctlError::Color(format!(
            "Invalid colour '{trimmed}'. Use one of: {}.",
            COLOR_NAMES.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_named_red() {
        assert_eq!(parse_color("red").unwrap(), Rbg::new(0xFF, 0x00, 0x00));
    }

    #[test]
    fn parse_named_blue_sets_second_field() {
        let c = parse_color("blue").unwrap();
        assert_eq!((c.r, c.b, c.g), (0x00, 0xFF, 0x00));
    }

    #[test]
    fn parse_named_black() {
        assert_eq!(parse_color("black").unwrap(), Rbg::default());
    }

    #[test]
    fn parse_case_insensitive() {
        for name in ["RED", "Red", "rEd", "  red  "] {
            assert_eq!(parse_color(name).unwrap(), Rbg::new(0xFF, 0, 0), "{name}");
        }
        assert_eq!(parse_color("BLUE").unwrap(), Rbg::new(0, 0xFF, 0));
        assert_eq!(parse_color("Black").unwrap(), Rbg::new(0, 0, 0));
    }

    #[test]
    fn parse_unknown_names_fail() {
        for name in ["green", "", "white", "#FF0000", "redd", "re d"] {
            assert!(parse_color(name).is_err(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn parse_error_lists_valid_names() {
        let err = parse_color("green").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid colour 'green'. Use one of: red, blue, black."
        );
    }

    #[test]
    fn block_payload_is_rbg_order() {
        let c = Rbg::new(0x11, 0x22, 0x33);
        assert_eq!(c.block_payload(), [0x11, 0x22, 0x33]);
    }

    #[test]
    fn blue_payload_puts_ff_in_middle() {
        // [R, G, B] would put 0xFF last.
        assert_eq!(parse_color("blue").unwrap().block_payload(), [0, 0xFF, 0]);
    }

    #[test]
    fn display_channels() {
        assert_eq!(Rbg::new(255, 0, 0).to_string(), "R=255 B=0 G=0");
    }
}
