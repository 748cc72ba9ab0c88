//! Bank register operations: primitives, direct-mode switch, colour write.

use crate::bus::{Result, SmbusAdapter};
use crate::protocol;

use super::color::Rbg;

// ── Primitives ──

/// Select `address` and write `value` to the mode-control byte command.
pub fn write_byte(adapter: &impl SmbusAdapter, address: u8, value: u8) -> Result<()> {
    log::debug!("write_byte: addr=0x{address:02X} data=0x{value:02X}");
    adapter.set_address(address)?;
    adapter.write_byte_data(protocol::CMD_MODE, value)
}

/// Select `address` and write `value` to the register-select word command.
pub fn write_word(adapter: &impl SmbusAdapter, address: u8, value: u16) -> Result<()> {
    log::debug!("write_word: addr=0x{address:02X} data=0x{value:04X}");
    adapter.set_address(address)?;
    adapter.write_word_data(protocol::CMD_REGISTER_SELECT, value)
}

// ── Mode switch ──

/// Select mode-control register `control_code` on `bank` and arm direct control.
///
/// The banks power up running a hardware breathing animation; colour writes
/// only stick after this has run for every entry of
/// [`protocol::CONTROL_CODES`]. Stops at the first failing write.
pub fn set_direct_control(adapter: &impl SmbusAdapter, bank: u8, control_code: u16) -> Result<()> {
    log::debug!("set_direct_control: bank=0x{bank:02X} control_code=0x{control_code:04X}");
    write_word(adapter, bank, control_code)?;
    write_byte(adapter, bank, protocol::DIRECT_MODE_ENABLE)?;
    Ok(())
}

// ── Colour write ──

/// Write `color` to LED `index` of `bank`.
///
/// Fails if the LED register cannot be selected. A failed block write of the
/// colour itself is logged and not reported to the caller.
pub fn write_led_colour(
    adapter: &impl SmbusAdapter,
    bank: u8,
    index: u8,
    color: Rbg,
) -> Result<()> {
    let led_addr = protocol::led_address(index);
    write_word(adapter, bank, led_addr)?;
    adapter.set_address(bank)?;

    if let Err(e) = adapter.write_block_data(protocol::CMD_COLOUR, &color.block_payload()) {
        log::error!("colour block write, bank 0x{bank:02x} LED @ 0x{led_addr:03X}: {e}");
    }
    Ok(())
}
