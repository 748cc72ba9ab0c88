//! Integration tests: discovery followed by the full colour sequence, using
//! MockAdapter.
//!
//! These exercise the public API end to end and check the exact order of bus
//! transactions a bank sees.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use ledctl_lib::LedctlError;
use ledctl_lib::apply::apply_color;
use ledctl_lib::bus::mock::MockAdapter;
use ledctl_lib::bus::{Direction, Functionality, SmbusAdapter, Transaction};
use ledctl_lib::discovery::select_adapter;
use ledctl_lib::led::parse_color;
use ledctl_lib::protocol::*;

fn candidates() -> Vec<PathBuf> {
    vec!["/dev/i2c-0".into(), "/dev/i2c-1".into()]
}

/// Adapter 0 has nothing at 0x70, adapter 1 carries banks 0x70 and 0x71.
fn open_two_adapters(path: &Path) -> ledctl_lib::bus::Result<MockAdapter> {
    let adapter = MockAdapter::open(path)?;
    if path.ends_with("i2c-0") {
        adapter.set_responders(&[0x50]);
    } else {
        adapter.set_responders(&[0x70, 0x71]);
    }
    Ok(adapter)
}

#[test]
fn full_run_on_second_adapter() {
    let selected = select_adapter(&candidates(), PROBE_ADDRESS, open_two_adapters).unwrap();
    assert_eq!(selected.adapter.path(), "/dev/i2c-1");

    let color = parse_color("Red").unwrap();
    let report = apply_color(
        &selected.adapter,
        selected.functionality,
        &BANK_ADDRESSES,
        color,
    );

    assert_eq!(report.adapter, "/dev/i2c-1");
    assert_eq!(report.banks_present(), 2);
    assert_eq!(report.leds_set(), 16);
    assert!(!report.banks[2].present);
    assert!(!report.banks[3].present);
}

#[test]
fn bank_transaction_order() {
    let selected = select_adapter(&candidates(), PROBE_ADDRESS, open_two_adapters).unwrap();
    let adapter = &selected.adapter;
    adapter.transactions.borrow_mut().clear();

    let color = parse_color("blue").unwrap();
    apply_color(adapter, selected.functionality, &[0x71], color);

    let mut expected = vec![
        // presence
        Transaction::SetAddress(0x71),
        Transaction::Quick(Direction::Write),
    ];
    for code in [0x2080u16, 0xA080] {
        expected.extend([
            Transaction::SetAddress(0x71),
            Transaction::WriteWordData {
                command: 0x00,
                value: code,
            },
            Transaction::SetAddress(0x71),
            Transaction::WriteByteData {
                command: 0x01,
                value: 0x01,
            },
        ]);
    }
    for n in 0..8u8 {
        expected.extend([
            Transaction::SetAddress(0x71),
            Transaction::WriteWordData {
                command: 0x00,
                value: 0x0081 + n as u16 * 0x0300,
            },
            Transaction::SetAddress(0x71),
            Transaction::WriteBlockData {
                command: 0x03,
                data: vec![0x00, 0xFF, 0x00],
            },
        ]);
    }

    assert_eq!(*adapter.transactions.borrow(), expected);
}

/// Keeps a handle on every adapter discovery opens, so the test can inspect
/// adapters after discovery has dropped them.
struct Shared(Rc<MockAdapter>);

impl SmbusAdapter for Shared {
    fn open(path: &Path) -> ledctl_lib::bus::Result<Self> {
        Ok(Shared(Rc::new(MockAdapter::open(path)?)))
    }
    fn path(&self) -> &str {
        self.0.path()
    }
    fn functionality(&self) -> ledctl_lib::bus::Result<Functionality> {
        self.0.functionality()
    }
    fn set_ten_bit(&self, enabled: bool) -> ledctl_lib::bus::Result<()> {
        self.0.set_ten_bit(enabled)
    }
    fn set_address(&self, address: u8) -> ledctl_lib::bus::Result<()> {
        self.0.set_address(address)
    }
    fn quick(&self, direction: Direction) -> ledctl_lib::bus::Result<()> {
        self.0.quick(direction)
    }
    fn receive_byte(&self) -> ledctl_lib::bus::Result<u8> {
        self.0.receive_byte()
    }
    fn write_byte_data(&self, command: u8, value: u8) -> ledctl_lib::bus::Result<()> {
        self.0.write_byte_data(command, value)
    }
    fn write_word_data(&self, command: u8, value: u16) -> ledctl_lib::bus::Result<()> {
        self.0.write_word_data(command, value)
    }
    fn write_block_data(&self, command: u8, data: &[u8]) -> ledctl_lib::bus::Result<()> {
        self.0.write_block_data(command, data)
    }
}

#[test]
fn no_responder_never_touches_banks() {
    let opened: RefCell<Vec<Rc<MockAdapter>>> = RefCell::default();
    let err = select_adapter(&candidates(), PROBE_ADDRESS, |p| {
        let adapter = Shared::open(p)?;
        adapter.0.set_responders(&[]);
        opened.borrow_mut().push(Rc::clone(&adapter.0));
        Ok(adapter)
    })
    .err()
    .unwrap();

    assert!(matches!(err, LedctlError::NoResponder { address: 0x70 }));
    assert_eq!(opened.borrow().len(), 2);
    for adapter in opened.borrow().iter() {
        assert_eq!(
            *adapter.transactions.borrow(),
            vec![
                Transaction::SetTenBit(false),
                Transaction::SetAddress(PROBE_ADDRESS),
                Transaction::Quick(Direction::Write),
                Transaction::Quick(Direction::Read),
            ]
        );
    }
}

#[test]
fn receive_byte_only_adapter_is_selected() {
    let paths = vec![PathBuf::from("/dev/i2c-5")];
    let selected = select_adapter(&paths, PROBE_ADDRESS, |p| {
        let adapter = MockAdapter::open(p)?;
        adapter.functionality.set(Functionality(
            I2C_FUNC_SMBUS_READ_BYTE | I2C_FUNC_SMBUS_WRITE_BLOCK_DATA,
        ));
        Ok(adapter)
    })
    .unwrap();
    assert!(
        selected
            .adapter
            .smbus_transactions()
            .contains(&Transaction::ReceiveByte)
    );
}
