//! Console report of a colour run, printed as the run progresses.

use std::io::Write;

use ledctl_lib::apply::{ApplyEvent, LedReport};
use ledctl_lib::led::Rbg;
use ledctl_lib::protocol::LEDS_PER_BANK;

pub(super) fn bank_line(bank: u8, color_name: &str, color: Rbg) -> String {
    format!("Bank 0x{bank:02x} present; setting {LEDS_PER_BANK} LEDs to {color_name} ({color})")
}

/// `(ok, line)` for one LED; LEDs are numbered from 1.
pub(super) fn led_line(led: &LedReport) -> (bool, String) {
    let n = led.index + 1;
    if led.ok {
        (true, format!("  LED{n} @ 0x{:03X} set.", led.address))
    } else {
        (false, format!("  Failed setting LED{n} @ 0x{:03X}", led.address))
    }
}

/// Writes one event's line to `out`, or to `err` for a failed LED.
pub(super) fn write_event(
    out: &mut impl Write,
    err: &mut impl Write,
    event: ApplyEvent<'_>,
    color_name: &str,
    color: Rbg,
) -> std::io::Result<()> {
    match event {
        ApplyEvent::BankPresent { bank } => {
            writeln!(out, "{}", bank_line(bank, color_name, color))?;
            out.flush()
        }
        ApplyEvent::Led { led, .. } => match led_line(led) {
            (true, line) => {
                writeln!(out, "{line}")?;
                out.flush()
            }
            (false, line) => writeln!(err, "{line}"),
        },
    }
}

/// Print one event to stdout/stderr.
pub(super) fn print_event(event: ApplyEvent<'_>, color_name: &str, color: Rbg) {
    let result = write_event(
        &mut std::io::stdout().lock(),
        &mut std::io::stderr().lock(),
        event,
        color_name,
        color,
    );
    if let Err(e) = result {
        log::debug!("console write failed: {e}");
    }
}
