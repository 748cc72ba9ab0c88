//! Application configuration: TOML-based, platform-aware path.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::protocol::{BANK_ADDRESSES, PROBE_ADDRESS};

/// Lowest and highest non-reserved 7-bit addresses.
const ADDRESS_RANGE: std::ops::RangeInclusive<u8> = 0x03..=0x77;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Device nodes to consider as adapters. Default: "/dev/i2c-*".
    #[serde(default = "default_adapter_glob")]
    pub adapter_glob: String,

    /// Address probed on each adapter to pick the one carrying the banks.
    #[serde(default = "default_probe_address")]
    pub probe_address: u8,

    /// Bank addresses, written in this order.
    #[serde(default = "default_bank_addresses")]
    pub bank_addresses: Vec<u8>,
}

fn default_adapter_glob() -> String {
    "/dev/i2c-*".into()
}
fn default_probe_address() -> u8 {
    PROBE_ADDRESS
}
fn default_bank_addresses() -> Vec<u8> {
    BANK_ADDRESSES.to_vec()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            adapter_glob: default_adapter_glob(),
            probe_address: default_probe_address(),
            bank_addresses: default_bank_addresses(),
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ledctl"))
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("config.toml"))
    }

    /// Load config from an arbitrary path, returning the config and any parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Load config from the default path, returning the config and any parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Check the pattern and every address.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.adapter_glob.trim().is_empty() {
            return Err(crate::LedctlError::Config(
                "adapter_glob cannot be empty".into(),
            ));
        }
        if self.bank_addresses.is_empty() {
            return Err(crate::LedctlError::Config(
                "bank_addresses cannot be empty".into(),
            ));
        }
        let addresses = std::iter::once(("probe_address", self.probe_address)).chain(
            self.bank_addresses
                .iter()
                .map(|&a| ("bank_addresses", a)),
        );
        for (field, addr) in addresses {
            if !ADDRESS_RANGE.contains(&addr) {
                return Err(crate::LedctlError::Config(format!(
                    "{field}: 0x{addr:02x} is outside the 7-bit range 0x{:02x}..=0x{:02x}",
                    ADDRESS_RANGE.start(),
                    ADDRESS_RANGE.end()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.adapter_glob, "/dev/i2c-*");
        assert_eq!(c.probe_address, 0x70);
        assert_eq!(c.bank_addresses, vec![0x70, 0x71, 0x72, 0x73]);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn serialize_roundtrip() {
        let c = Config {
            adapter_glob: "/dev/i2c-1*".into(),
            probe_address: 0x50,
            bank_addresses: vec![0x50, 0x51],
        };
        let s = toml::to_string_pretty(&c).unwrap();
        let parsed: Config = toml::from_str(&s).unwrap();
        assert_eq!(parsed, c);
    }

    #[test]
    fn hex_literals_accepted() {
        let c: Config = toml::from_str("probe_address = 0x71\nbank_addresses = [0x71]").unwrap();
        assert_eq!(c.probe_address, 0x71);
        assert_eq!(c.bank_addresses, vec![0x71]);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let c: Config = toml::from_str("adapter_glob = \"/dev/i2c-9\"").unwrap();
        assert_eq!(c.adapter_glob, "/dev/i2c-9");
        assert_eq!(c.probe_address, 0x70);
        assert_eq!(c.bank_addresses.len(), 4);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let c: Config = toml::from_str("").unwrap();
        assert_eq!(c, Config::default());
    }

    #[test]
    fn load_from_missing_file_is_silent_default() {
        let dir = tempfile::tempdir().unwrap();
        let (c, warnings) = Config::load_from(&dir.path().join("nope.toml"));
        assert_eq!(c, Config::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn load_from_malformed_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "probe_address = \"seventy\"").unwrap();
        let (c, warnings) = Config::load_from(&path);
        assert_eq!(c, Config::default());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("config parse error"));
    }

    #[test]
    fn load_from_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "bank_addresses = [0x70, 0x72]\n").unwrap();
        let (c, warnings) = Config::load_from(&path);
        assert!(warnings.is_empty());
        assert_eq!(c.bank_addresses, vec![0x70, 0x72]);
    }

    #[test]
    fn out_of_range_address_is_rejected_at_parse() {
        assert!(toml::from_str::<Config>("probe_address = 300").is_err());
    }

    #[test]
    fn config_path_ends_with_toml() {
        if let Some(p) = Config::path() {
            assert!(p.ends_with("ledctl/config.toml"));
        }
    }

    #[test]
    fn validate_empty_glob() {
        let c = Config {
            adapter_glob: "  ".into(),
            ..Config::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn validate_empty_banks() {
        let c = Config {
            bank_addresses: vec![],
            ..Config::default()
        };
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("bank_addresses"));
    }

    #[test]
    fn validate_reserved_addresses() {
        for addr in [0x00, 0x02, 0x78, 0x7F] {
            let c = Config {
                bank_addresses: vec![0x70, addr],
                ..Config::default()
            };
            assert!(c.validate().is_err(), "0x{addr:02x}");
        }
        let c = Config {
            probe_address: 0x01,
            ..Config::default()
        };
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("probe_address"));
    }

    #[test]
    fn validate_range_bounds_ok() {
        let c = Config {
            probe_address: 0x03,
            bank_addresses: vec![0x03, 0x77],
            ..Config::default()
        };
        assert!(c.validate().is_ok());
    }
}
