//! SMBus adapter access: trait + Linux `i2c-dev` backend.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use crate::protocol::*;

// ── Error type ──

/// Bus communication errors.
///
/// String payloads follow the convention **"context: details"** where *context*
/// identifies the operation (e.g. `"I2C_FUNCS"`, `"/dev/i2c-3"`) and *details*
/// describes what went wrong.
#[derive(Debug)]
pub enum BusError {
    OpenFailed(String),
    TransactFailed(String),
    Unsupported(String),
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusError::OpenFailed(e) => write!(f, "Failed to open adapter: {e}"),
            BusError::TransactFailed(e) => write!(f, "Transaction failed: {e}"),
            BusError::Unsupported(e) => write!(f, "Unsupported: {e}"),
        }
    }
}

impl std::error::Error for BusError {}

pub type Result<T> = std::result::Result<T, BusError>;

// ── Functionality ──

/// Adapter capability bitmask as reported by `I2C_FUNCS`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Functionality(pub u64);

const FUNC_NAMES: &[(u64, &str)] = &[
    (I2C_FUNC_I2C, "I2C"),
    (I2C_FUNC_10BIT_ADDR, "10BIT_ADDR"),
    (I2C_FUNC_SMBUS_QUICK, "QUICK"),
    (I2C_FUNC_SMBUS_READ_BYTE, "READ_BYTE"),
    (I2C_FUNC_SMBUS_WRITE_BYTE, "WRITE_BYTE"),
    (I2C_FUNC_SMBUS_WRITE_BYTE_DATA, "WRITE_BYTE_DATA"),
    (I2C_FUNC_SMBUS_WRITE_WORD_DATA, "WRITE_WORD_DATA"),
    (I2C_FUNC_SMBUS_WRITE_BLOCK_DATA, "WRITE_BLOCK_DATA"),
];

impl Functionality {
    pub const fn contains(self, flag: u64) -> bool {
        self.0 & flag == flag
    }

    /// Adapter can issue the no-data quick transaction.
    pub const fn supports_quick(self) -> bool {
        self.contains(I2C_FUNC_SMBUS_QUICK)
    }

    /// Adapter can receive a single byte without a command.
    pub const fn supports_read_byte(self) -> bool {
        self.contains(I2C_FUNC_SMBUS_READ_BYTE)
    }
}

impl fmt::Display for Functionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = FUNC_NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "0x{:08X} [{}]", self.0, names.join(", "))
    }
}

// ── Transactions ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Write,
    Read,
}

impl Direction {
    pub const fn as_raw(self) -> u8 {
        match self {
            Direction::Write => I2C_SMBUS_WRITE,
            Direction::Read => I2C_SMBUS_READ,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Write => write!(f, "WRITE"),
            Direction::Read => write!(f, "READ"),
        }
    }
}

/// One operation on an adapter, as issued by the backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    SetAddress(u8),
    SetTenBit(bool),
    Quick(Direction),
    ReceiveByte,
    WriteByteData { command: u8, value: u8 },
    WriteWordData { command: u8, value: u16 },
    WriteBlockData { command: u8, data: Vec<u8> },
}

impl Transaction {
    /// `(read_write, command, size)` of the `I2C_SMBUS` ioctl, or `None` for
    /// adapter-level operations.
    pub fn smbus_args(&self) -> Option<(u8, u8, u32)> {
        match self {
            Transaction::SetAddress(_) | Transaction::SetTenBit(_) => None,
            Transaction::Quick(dir) => Some((dir.as_raw(), 0, I2C_SMBUS_QUICK)),
            Transaction::ReceiveByte => Some((I2C_SMBUS_READ, 0, I2C_SMBUS_BYTE)),
            Transaction::WriteByteData { command, .. } => {
                Some((I2C_SMBUS_WRITE, *command, I2C_SMBUS_BYTE_DATA))
            }
            Transaction::WriteWordData { command, .. } => {
                Some((I2C_SMBUS_WRITE, *command, I2C_SMBUS_WORD_DATA))
            }
            Transaction::WriteBlockData { command, .. } => {
                Some((I2C_SMBUS_WRITE, *command, I2C_SMBUS_BLOCK_DATA))
            }
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transaction::SetAddress(addr) => return write!(f, "select address 0x{addr:02X}"),
            Transaction::SetTenBit(on) => {
                return write!(f, "ten-bit addressing {}", if *on { "on" } else { "off" });
            }
            _ => {}
        }
        let Some((rw, command, size)) = self.smbus_args() else {
            return Ok(());
        };
        let dir = if rw == I2C_SMBUS_READ { "READ" } else { "WRITE" };
        write!(
            f,
            "{dir} command=0x{command:02X} size={}",
            size_name(size)
        )?;
        match self {
            Transaction::WriteByteData { value, .. } => write!(f, " byte=0x{value:02X}"),
            Transaction::WriteWordData { value, .. } => write!(f, " word=0x{value:04X}"),
            Transaction::WriteBlockData { data, .. } => {
                write!(f, " block[{}]=", data.len())?;
                for (i, b) in data.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "0x{b:02X}")?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

// ── Trait ──

pub trait SmbusAdapter {
    fn open(path: &Path) -> Result<Self>
    where
        Self: Sized;
    /// Device node this adapter was opened from.
    fn path(&self) -> &str;
    fn functionality(&self) -> Result<Functionality>;
    fn set_ten_bit(&self, enabled: bool) -> Result<()>;
    /// Select the 7-bit slave address for subsequent transactions.
    fn set_address(&self, address: u8) -> Result<()>;
    fn quick(&self, direction: Direction) -> Result<()>;
    fn receive_byte(&self) -> Result<u8>;
    fn write_byte_data(&self, command: u8, value: u8) -> Result<()>;
    fn write_word_data(&self, command: u8, value: u16) -> Result<()>;
    /// SMBus block write; the backend adds the length prefix.
    fn write_block_data(&self, command: u8, data: &[u8]) -> Result<()>;
}

// ── Linux implementation ──

#[cfg(target_os = "linux")]
mod linux_impl {
    use super::*;
    use std::fs::{File, OpenOptions};
    use std::os::fd::AsRawFd;

    /// Argument block of the `I2C_SMBUS` ioctl (`struct i2c_smbus_ioctl_data`).
    #[repr(C)]
    pub(super) struct SmbusIoctlData {
        pub(super) read_write: u8,
        pub(super) command: u8,
        pub(super) size: u32,
        pub(super) data: *mut u8,
    }

    /// Adapter backed by an open `/dev/i2c-N` node. Dropping it closes the node.
    pub struct LinuxAdapter {
        file: File,
        path: String,
    }

    impl LinuxAdapter {
        fn ioctl_value(&self, op: &str, request: u32, arg: libc::c_ulong) -> Result<()> {
            // SAFETY: the fd is owned by `self.file`; these requests take a plain integer.
            let r = unsafe { libc::ioctl(self.file.as_raw_fd(), request as _, arg) };
            if r < 0 {
                return Err(BusError::TransactFailed(format!(
                    "{op}: {}",
                    std::io::Error::last_os_error()
                )));
            }
            Ok(())
        }

        /// Issue one SMBus transaction and return the data buffer afterwards.
        fn smbus(&self, txn: &Transaction) -> Result<[u8; SMBUS_DATA_SIZE]> {
            let (read_write, command, size) = txn.smbus_args().ok_or_else(|| {
                BusError::Unsupported(format!("I2C_SMBUS: not an SMBus transaction: {txn}"))
            })?;

            let mut data = [0u8; SMBUS_DATA_SIZE];
            match txn {
                Transaction::WriteByteData { value, .. } => data[0] = *value,
                Transaction::WriteWordData { value, .. } => {
                    data[..2].copy_from_slice(&value.to_ne_bytes())
                }
                Transaction::WriteBlockData { data: payload, .. } => {
                    data = encode_block(payload).ok_or_else(|| {
                        BusError::TransactFailed(format!(
                            "I2C_SMBUS: block of {} bytes exceeds {I2C_SMBUS_BLOCK_MAX}",
                            payload.len()
                        ))
                    })?;
                }
                _ => {}
            }

            let mut args = SmbusIoctlData {
                read_write,
                command,
                size,
                data: if size == I2C_SMBUS_QUICK {
                    std::ptr::null_mut()
                } else {
                    data.as_mut_ptr()
                },
            };

            if size == I2C_SMBUS_QUICK {
                log::debug!("{}: {txn} data=(null)", self.path);
            } else {
                log::debug!("{}: {txn} data: {}", self.path, data_views(&data));
            }
            // SAFETY: `args` and `data` outlive the call; `data` is sized like
            // `union i2c_smbus_data`.
            let r = unsafe {
                libc::ioctl(
                    self.file.as_raw_fd(),
                    I2C_SMBUS as _,
                    &mut args as *mut SmbusIoctlData,
                )
            };
            if r < 0 {
                return Err(BusError::TransactFailed(format!(
                    "I2C_SMBUS({}): {}",
                    size_name(size),
                    std::io::Error::last_os_error()
                )));
            }
            Ok(data)
        }
    }

    impl SmbusAdapter for LinuxAdapter {
        fn open(path: &Path) -> Result<Self> {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .open(path)
                .map_err(|e| BusError::OpenFailed(format!("{}: {e}", path.display())))?;
            Ok(LinuxAdapter {
                file,
                path: path.display().to_string(),
            })
        }

        fn path(&self) -> &str {
            &self.path
        }

        fn functionality(&self) -> Result<Functionality> {
            let mut funcs: libc::c_ulong = 0;
            // SAFETY: I2C_FUNCS writes one unsigned long through the pointer.
            let r = unsafe {
                libc::ioctl(
                    self.file.as_raw_fd(),
                    I2C_FUNCS as _,
                    &mut funcs as *mut libc::c_ulong,
                )
            };
            if r < 0 {
                return Err(BusError::TransactFailed(format!(
                    "I2C_FUNCS: {}",
                    std::io::Error::last_os_error()
                )));
            }
            let funcs = Functionality(funcs as u64);
            log::debug!("{}: functionality {funcs}", self.path);
            Ok(funcs)
        }

        fn set_ten_bit(&self, enabled: bool) -> Result<()> {
            log::debug!("{}: {}", self.path, Transaction::SetTenBit(enabled));
            self.ioctl_value("I2C_TENBIT", I2C_TENBIT, enabled as libc::c_ulong)
        }

        fn set_address(&self, address: u8) -> Result<()> {
            log::debug!("{}: {}", self.path, Transaction::SetAddress(address));
            self.ioctl_value("I2C_SLAVE", I2C_SLAVE, address as libc::c_ulong)
        }

        fn quick(&self, direction: Direction) -> Result<()> {
            self.smbus(&Transaction::Quick(direction))?;
            Ok(())
        }

        fn receive_byte(&self) -> Result<u8> {
            let data = self.smbus(&Transaction::ReceiveByte)?;
            Ok(data[0])
        }

        fn write_byte_data(&self, command: u8, value: u8) -> Result<()> {
            self.smbus(&Transaction::WriteByteData { command, value })?;
            Ok(())
        }

        fn write_word_data(&self, command: u8, value: u16) -> Result<()> {
            self.smbus(&Transaction::WriteWordData { command, value })?;
            Ok(())
        }

        fn write_block_data(&self, command: u8, data: &[u8]) -> Result<()> {
            self.smbus(&Transaction::WriteBlockData {
                command,
                data: data.to_vec(),
            })?;
            Ok(())
        }
    }
}

#[cfg(target_os = "linux")]
pub use linux_impl::LinuxAdapter;

// ── Stub adapter for unsupported platforms ──

/// Placeholder adapter whose `open` always fails.
/// Enables compilation and `cargo test` on non-Linux hosts.
#[cfg(not(target_os = "linux"))]
pub struct StubAdapter;

#[cfg(not(target_os = "linux"))]
impl SmbusAdapter for StubAdapter {
    fn open(path: &Path) -> Result<Self> {
        Err(BusError::Unsupported(format!(
            "{}: i2c-dev adapters are only available on Linux",
            path.display()
        )))
    }
    fn path(&self) -> &str {
        unreachable!()
    }
    fn functionality(&self) -> Result<Functionality> {
        unreachable!()
    }
    fn set_ten_bit(&self, _enabled: bool) -> Result<()> {
        unreachable!()
    }
    fn set_address(&self, _address: u8) -> Result<()> {
        unreachable!()
    }
    fn quick(&self, _direction: Direction) -> Result<()> {
        unreachable!()
    }
    fn receive_byte(&self) -> Result<u8> {
        unreachable!()
    }
    fn write_byte_data(&self, _command: u8, _value: u8) -> Result<()> {
        unreachable!()
    }
    fn write_word_data(&self, _command: u8, _value: u16) -> Result<()> {
        unreachable!()
    }
    fn write_block_data(&self, _command: u8, _data: &[u8]) -> Result<()> {
        unreachable!()
    }
}

/// Concrete adapter type for the current platform.
#[cfg(target_os = "linux")]
pub type PlatformAdapter = LinuxAdapter;
#[cfg(not(target_os = "linux"))]
pub type PlatformAdapter = StubAdapter;

/// Open the platform adapter at `path`.
pub fn open_adapter(path: &Path) -> Result<PlatformAdapter> {
    PlatformAdapter::open(path)
}

// ── Mock adapter for testing ──

/// In-memory adapter for unit and integration tests.
///
/// Always compiled, hidden from public docs.
#[doc(hidden)]
pub mod mock {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashSet;

    /// Records every transaction and answers presence checks from `responders`.
    /// Writes to an address outside `responders` fail like a missing ACK.
    pub struct MockAdapter {
        path: String,
        pub functionality: Cell<Functionality>,
        /// Addresses that acknowledge.
        pub responders: RefCell<HashSet<u8>>,
        /// Responders only acknowledge quick reads, not quick writes.
        pub read_quick_only: Cell<bool>,
        /// Currently selected address.
        pub address: Cell<Option<u8>>,
        /// Recorded transactions, failed ones included.
        pub transactions: RefCell<Vec<Transaction>>,
        pub fail_functionality: Cell<bool>,
        pub fail_set_address: Cell<bool>,
        pub fail_byte_writes: Cell<bool>,
        pub fail_block_writes: Cell<bool>,
        /// Word writes carrying one of these values fail.
        pub fail_word_values: RefCell<HashSet<u16>>,
    }

    impl Default for MockAdapter {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockAdapter {
        pub fn new() -> Self {
            Self::with_path("mock://i2c-0")
        }

        /// Fully capable adapter with all default banks responding.
        pub fn with_path(path: &str) -> Self {
            MockAdapter {
                path: path.into(),
                functionality: Cell::new(Functionality(
                    I2C_FUNC_I2C
                        | I2C_FUNC_SMBUS_QUICK
                        | I2C_FUNC_SMBUS_READ_BYTE
                        | I2C_FUNC_SMBUS_WRITE_BYTE
                        | I2C_FUNC_SMBUS_WRITE_BYTE_DATA
                        | I2C_FUNC_SMBUS_WRITE_WORD_DATA
                        | I2C_FUNC_SMBUS_WRITE_BLOCK_DATA,
                )),
                responders: RefCell::new(BANK_ADDRESSES.into_iter().collect()),
                read_quick_only: Cell::new(false),
                address: Cell::new(None),
                transactions: RefCell::new(Vec::new()),
                fail_functionality: Cell::new(false),
                fail_set_address: Cell::new(false),
                fail_byte_writes: Cell::new(false),
                fail_block_writes: Cell::new(false),
                fail_word_values: RefCell::new(HashSet::new()),
            }
        }

        /// Replace the set of acknowledging addresses.
        pub fn set_responders(&self, addresses: &[u8]) {
            *self.responders.borrow_mut() = addresses.iter().copied().collect();
        }

        /// Recorded SMBus transactions, without address selection or mode toggles.
        pub fn smbus_transactions(&self) -> Vec<Transaction> {
            self.transactions
                .borrow()
                .iter()
                .filter(|t| t.smbus_args().is_some())
                .cloned()
                .collect()
        }

        fn record(&self, txn: Transaction) {
            self.transactions.borrow_mut().push(txn);
        }

        fn acked(&self) -> Result<()> {
            match self.address.get() {
                Some(addr) if self.responders.borrow().contains(&addr) => Ok(()),
                Some(addr) => Err(BusError::TransactFailed(format!(
                    "mock: no ACK at 0x{addr:02X}"
                ))),
                None => Err(BusError::TransactFailed("mock: no address selected".into())),
            }
        }
    }

    impl SmbusAdapter for MockAdapter {
        fn open(path: &Path) -> Result<Self> {
            Ok(Self::with_path(&path.display().to_string()))
        }

        fn path(&self) -> &str {
            &self.path
        }

        fn functionality(&self) -> Result<Functionality> {
            if self.fail_functionality.get() {
                return Err(BusError::TransactFailed(
                    "I2C_FUNCS: mock failure injected".into(),
                ));
            }
            Ok(self.functionality.get())
        }

        fn set_ten_bit(&self, enabled: bool) -> Result<()> {
            self.record(Transaction::SetTenBit(enabled));
            Ok(())
        }

        fn set_address(&self, address: u8) -> Result<()> {
            self.record(Transaction::SetAddress(address));
            if self.fail_set_address.get() {
                return Err(BusError::TransactFailed(
                    "I2C_SLAVE: mock failure injected".into(),
                ));
            }
            self.address.set(Some(address));
            Ok(())
        }

        fn quick(&self, direction: Direction) -> Result<()> {
            self.record(Transaction::Quick(direction));
            if direction == Direction::Write && self.read_quick_only.get() {
                return Err(BusError::TransactFailed("mock: quick write ignored".into()));
            }
            self.acked()
        }

        fn receive_byte(&self) -> Result<u8> {
            self.record(Transaction::ReceiveByte);
            self.acked()?;
            Ok(0)
        }

        fn write_byte_data(&self, command: u8, value: u8) -> Result<()> {
            self.record(Transaction::WriteByteData { command, value });
            if self.fail_byte_writes.get() {
                return Err(BusError::TransactFailed(
                    "I2C_SMBUS(BYTE_DATA): mock failure injected".into(),
                ));
            }
            self.acked()
        }

        fn write_word_data(&self, command: u8, value: u16) -> Result<()> {
            self.record(Transaction::WriteWordData { command, value });
            if self.fail_word_values.borrow().contains(&value) {
                return Err(BusError::TransactFailed(format!(
                    "I2C_SMBUS(WORD_DATA): mock failure injected for 0x{value:04X}"
                )));
            }
            self.acked()
        }

        fn write_block_data(&self, command: u8, data: &[u8]) -> Result<()> {
            self.record(Transaction::WriteBlockData {
                command,
                data: data.to_vec(),
            });
            if self.fail_block_writes.get() {
                return Err(BusError::TransactFailed(
                    "I2C_SMBUS(BLOCK_DATA): mock failure injected".into(),
                ));
            }
            self.acked()
        }
    }
}
