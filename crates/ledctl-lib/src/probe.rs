//! Device presence probe.
//!
//! Uses the least intrusive transaction the adapter supports: a quick
//! transaction if available, otherwise a single receive-byte. Adapters with
//! neither are never probed, since the remaining transaction types can change
//! device state.

use crate::bus::{Direction, Functionality, SmbusAdapter};

/// Whether a device acknowledges `address` on `adapter`.
pub fn has_device_at(
    adapter: &impl SmbusAdapter,
    functionality: Functionality,
    address: u8,
) -> bool {
    if let Err(e) = adapter.set_address(address) {
        log::debug!("{}: cannot select 0x{address:02x}: {e}", adapter.path());
        return false;
    }

    if functionality.supports_quick() {
        // Some devices only acknowledge a quick read.
        return adapter.quick(Direction::Write).is_ok() || adapter.quick(Direction::Read).is_ok();
    }

    if functionality.supports_read_byte() {
        return adapter.receive_byte().is_ok();
    }

    log::debug!(
        "{}: neither quick nor read-byte supported ({functionality}); not probing 0x{address:02x}",
        adapter.path()
    );
    false
}
