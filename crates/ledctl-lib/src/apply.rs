//! Colour apply sequence over every bank of the selected adapter.

use serde::Serialize;

use crate::bus::{Functionality, SmbusAdapter};
use crate::led::{self, Rbg};
use crate::probe::has_device_at;
use crate::protocol;

/// Outcome of one LED colour write.
#[derive(Debug, Clone, Serialize)]
pub struct LedReport {
    /// 0-based LED index within the bank.
    pub index: u8,
    /// LED register address.
    pub address: u16,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome for one bank address.
#[derive(Debug, Clone, Serialize)]
pub struct BankReport {
    pub address: u8,
    pub present: bool,
    /// Failed direct-control switches, as `"0x2080: <error>"`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mode_errors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub leds: Vec<LedReport>,
}

/// Outcome of one run over the selected adapter.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    pub adapter: String,
    pub color: Rbg,
    pub banks: Vec<BankReport>,
}

impl ApplyReport {
    pub fn banks_present(&self) -> usize {
        self.banks.iter().filter(|b| b.present).count()
    }

    pub fn leds_set(&self) -> usize {
        self.banks
            .iter()
            .flat_map(|b| &b.leds)
            .filter(|l| l.ok)
            .count()
    }
}

/// Progress of a run, reported as it happens.
#[derive(Debug, Clone, Copy)]
pub enum ApplyEvent<'a> {
    /// `bank` acknowledged and is about to be switched to direct control.
    BankPresent { bank: u8 },
    /// One LED of `bank` has been written.
    Led { bank: u8, led: &'a LedReport },
}

/// Switch `bank` to direct control and write `color` to all of its LEDs.
///
/// Mode-switch failures are logged and recorded but do not stop the LED
/// writes; each LED is attempted regardless of earlier failures.
pub fn apply_to_bank(adapter: &impl SmbusAdapter, bank: u8, color: Rbg) -> BankReport {
    apply_to_bank_with(adapter, bank, color, &mut |_| {})
}

fn apply_to_bank_with(
    adapter: &impl SmbusAdapter,
    bank: u8,
    color: Rbg,
    on_event: &mut impl FnMut(ApplyEvent<'_>),
) -> BankReport {
    let mut mode_errors = Vec::new();
    for code in protocol::CONTROL_CODES {
        if let Err(e) = led::set_direct_control(adapter, bank, code) {
            log::warn!("direct control 0x{code:04X} failed on bank 0x{bank:02x}: {e}");
            mode_errors.push(format!("0x{code:04X}: {e}"));
        }
    }

    let mut leds = Vec::with_capacity(protocol::LEDS_PER_BANK as usize);
    for index in 0..protocol::LEDS_PER_BANK {
        let address = protocol::led_address(index);
        let led = match led::write_led_colour(adapter, bank, index, color) {
            Ok(()) => LedReport {
                index,
                address,
                ok: true,
                error: None,
            },
            Err(e) => {
                log::debug!("bank 0x{bank:02x} LED{}: {e}", index + 1);
                LedReport {
                    index,
                    address,
                    ok: false,
                    error: Some(e.to_string()),
                }
            }
        };
        on_event(ApplyEvent::Led { bank, led: &led });
        leds.push(led);
    }

    BankReport {
        address: bank,
        present: true,
        mode_errors,
        leds,
    }
}

/// Write `color` to every present bank in `banks`, in order.
///
/// Banks that do not acknowledge are logged and skipped.
pub fn apply_color(
    adapter: &impl SmbusAdapter,
    functionality: Functionality,
    banks: &[u8],
    color: Rbg,
) -> ApplyReport {
    apply_color_with(adapter, functionality, banks, color, |_| {})
}

/// [`apply_color`], calling `on_event` before each present bank is touched
/// and after each LED write.
pub fn apply_color_with(
    adapter: &impl SmbusAdapter,
    functionality: Functionality,
    banks: &[u8],
    color: Rbg,
    mut on_event: impl FnMut(ApplyEvent<'_>),
) -> ApplyReport {
    let banks = banks
        .iter()
        .map(|&bank| {
            if !has_device_at(adapter, functionality, bank) {
                log::warn!(
                    "No response from bank device at 0x{bank:02x} on {}; skipping.",
                    adapter.path()
                );
                return BankReport {
                    address: bank,
                    present: false,
                    mode_errors: Vec::new(),
                    leds: Vec::new(),
                };
            }
            on_event(ApplyEvent::BankPresent { bank });
            apply_to_bank_with(adapter, bank, color, &mut on_event)
        })
        .collect();

    ApplyReport {
        adapter: adapter.path().to_string(),
        color,
        banks,
    }
}
