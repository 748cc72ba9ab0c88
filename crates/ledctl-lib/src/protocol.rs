//! Protocol constants for the Linux `i2c-dev` interface and the LED banks.
//!
//! Kernel values come from `<linux/i2c-dev.h>` and `<linux/i2c.h>`.
//! Bank register values were taken from bus captures of the controller chips.
//!
//! ## Register model
//!
//! Each bank exposes a 16-bit "register select" pointer written through SMBus
//! word command `0x00`. The next transaction then lands in the selected space:
//! - mode control (`CONTROL_CODES`) is armed with a byte write to command `0x01`
//! - LED colour registers take a 3-byte block write to command `0x03`

// ── ioctl request codes ──

/// Set the slave address for subsequent transactions.
pub const I2C_SLAVE: u32 = 0x0703;

/// Enable (non-zero) or disable 10-bit addressing.
pub const I2C_TENBIT: u32 = 0x0704;

/// Query the adapter functionality bitmask.
pub const I2C_FUNCS: u32 = 0x0705;

/// Perform one SMBus transaction.
pub const I2C_SMBUS: u32 = 0x0720;

// ── SMBus direction ──

pub const I2C_SMBUS_WRITE: u8 = 0;
pub const I2C_SMBUS_READ: u8 = 1;

// ── SMBus transaction sizes ──

pub const I2C_SMBUS_QUICK: u32 = 0;
pub const I2C_SMBUS_BYTE: u32 = 1;
pub const I2C_SMBUS_BYTE_DATA: u32 = 2;
pub const I2C_SMBUS_WORD_DATA: u32 = 3;
pub const I2C_SMBUS_PROC_CALL: u32 = 4;
pub const I2C_SMBUS_BLOCK_DATA: u32 = 5;
pub const I2C_SMBUS_I2C_BLOCK_DATA: u32 = 8;

/// Maximum SMBus block payload; the kernel buffer adds a length byte and a PEC slot.
pub const I2C_SMBUS_BLOCK_MAX: usize = 32;

/// Size of `union i2c_smbus_data` (`block[I2C_SMBUS_BLOCK_MAX + 2]`).
pub const SMBUS_DATA_SIZE: usize = I2C_SMBUS_BLOCK_MAX + 2;

// ── Functionality bits (I2C_FUNCS) ──

pub const I2C_FUNC_I2C: u64 = 0x0000_0001;
pub const I2C_FUNC_10BIT_ADDR: u64 = 0x0000_0002;
pub const I2C_FUNC_SMBUS_QUICK: u64 = 0x0001_0000;
pub const I2C_FUNC_SMBUS_READ_BYTE: u64 = 0x0002_0000;
pub const I2C_FUNC_SMBUS_WRITE_BYTE: u64 = 0x0004_0000;
pub const I2C_FUNC_SMBUS_WRITE_BYTE_DATA: u64 = 0x0010_0000;
pub const I2C_FUNC_SMBUS_WRITE_WORD_DATA: u64 = 0x0040_0000;
pub const I2C_FUNC_SMBUS_WRITE_BLOCK_DATA: u64 = 0x0200_0000;

// ── LED bank layout ──

/// Address probed on every adapter during discovery.
pub const PROBE_ADDRESS: u8 = 0x70;

/// Default bank addresses, in write order.
pub const BANK_ADDRESSES: [u8; 4] = [0x70, 0x71, 0x72, 0x73];

/// LEDs driven by one bank.
pub const LEDS_PER_BANK: u8 = 8;

/// Register address of LED 0.
pub const LED_ADDR_BASE: u16 = 0x0081;

/// Distance between consecutive LED register addresses.
pub const LED_ADDR_STRIDE: u16 = 0x0300;

/// Word command carrying the 16-bit register select pointer.
pub const CMD_REGISTER_SELECT: u8 = 0x00;

/// Byte command for mode control.
pub const CMD_MODE: u8 = 0x01;

/// Block command for the colour of the selected LED.
pub const CMD_COLOUR: u8 = 0x03;

/// Mode-control value that enables direct (software) LED control.
pub const DIRECT_MODE_ENABLE: u8 = 0x01;

/// Mode-control register selectors, written in this order on every bank
/// before any colour write. Each is followed by [`DIRECT_MODE_ENABLE`].
pub const CONTROL_CODES: [u16; 2] = [0x2080, 0xA080];

/// Register address of LED `index` (0-based).
pub const fn led_address(index: u8) -> u16 {
    LED_ADDR_BASE + index as u16 * LED_ADDR_STRIDE
}

/// Human-readable name of an SMBus transaction size.
pub fn size_name(size: u32) -> &'static str {
    match size {
        I2C_SMBUS_QUICK => "I2C_SMBUS_QUICK",
        I2C_SMBUS_BYTE => "I2C_SMBUS_BYTE",
        I2C_SMBUS_BYTE_DATA => "I2C_SMBUS_BYTE_DATA",
        I2C_SMBUS_WORD_DATA => "I2C_SMBUS_WORD_DATA",
        I2C_SMBUS_PROC_CALL => "I2C_SMBUS_PROC_CALL",
        I2C_SMBUS_BLOCK_DATA => "I2C_SMBUS_BLOCK_DATA",
        I2C_SMBUS_I2C_BLOCK_DATA => "I2C_SMBUS_I2C_BLOCK_DATA",
        _ => "UNKNOWN",
    }
}

/// Encode a block payload into the kernel `i2c_smbus_data` layout.
///
/// `block[0]` holds the length, `block[1..=len]` the data. Returns `None` if
/// `data` is longer than [`I2C_SMBUS_BLOCK_MAX`].
pub fn encode_block(data: &[u8]) -> Option<[u8; SMBUS_DATA_SIZE]> {
    if data.len() > I2C_SMBUS_BLOCK_MAX {
        return None;
    }
    let mut block = [0u8; SMBUS_DATA_SIZE];
    block[0] = data.len() as u8;
    block[1..=data.len()].copy_from_slice(data);
    Some(block)
}

/// The `i2c_smbus_data` buffer viewed as byte, word and block, for debug dumps.
///
/// The block length is clamped to [`I2C_SMBUS_BLOCK_MAX`].
pub fn data_views(data: &[u8; SMBUS_DATA_SIZE]) -> String {
    let word = u16::from_ne_bytes([data[0], data[1]]);
    let len = (data[0] as usize).min(I2C_SMBUS_BLOCK_MAX);
    let block: Vec<String> = data[1..=len].iter().map(|b| format!("0x{b:02X}")).collect();
    format!(
        "byte=0x{:02X} word=0x{word:04X} block[{len}]=[{}]",
        data[0],
        block.join(" ")
    )
}
