//! Adapter discovery: device-node enumeration and first-responder selection.

use std::path::{Path, PathBuf};

use crate::bus::{self, Functionality, SmbusAdapter};
use crate::error::{LedctlError, Result};
use crate::probe::has_device_at;

/// An adapter that acknowledged the probe address.
pub struct SelectedAdapter<A> {
    pub path: PathBuf,
    pub functionality: Functionality,
    pub adapter: A,
}

/// List the device nodes matching `pattern`, in lexical order.
///
/// Only the final path component may contain a `*`, which matches any run of
/// characters (e.g. `/dev/i2c-*`). A leading `*` does not match dot-files. A
/// pattern without a wildcard matches itself if it exists. A missing
/// directory yields no matches; any other listing failure is an error.
/// `?` and `[...]` are rejected rather than matched literally.
pub fn enumerate_adapters(pattern: &str) -> Result<Vec<PathBuf>> {
    if let Some(c) = pattern.chars().find(|c| matches!(c, '?' | '[' | ']')) {
        return Err(LedctlError::Config(format!(
            "unsupported wildcard '{c}' in adapter pattern (only '*' is supported): {pattern}"
        )));
    }
    let path = Path::new(pattern);
    let Some(name_pattern) = path.file_name().and_then(|n| n.to_str()) else {
        return Err(LedctlError::Config(format!(
            "adapter pattern has no file name: {pattern}"
        )));
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if dir.to_string_lossy().contains('*') {
        return Err(LedctlError::Config(format!(
            "wildcards are only supported in the last path component: {pattern}"
        )));
    }

    let Some((prefix, suffix)) = name_pattern.split_once('*') else {
        return Ok(if path.exists() {
            vec![path.to_path_buf()]
        } else {
            Vec::new()
        });
    };
    if suffix.contains('*') {
        return Err(LedctlError::Config(format!(
            "only one wildcard is supported: {pattern}"
        )));
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("cannot list {}: {e}", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut matches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_name().to_str().is_some_and(|name| {
                name_matches(name, prefix, suffix) && !(prefix.is_empty() && name.starts_with('.'))
            })
        })
        .map(|entry| dir.join(entry.file_name()))
        .collect();
    matches.sort();
    Ok(matches)
}

fn name_matches(name: &str, prefix: &str, suffix: &str) -> bool {
    name.len() >= prefix.len() + suffix.len() && name.starts_with(prefix) && name.ends_with(suffix)
}

/// Open each path in order and return the first adapter where a device
/// acknowledges `probe_address`.
///
/// Adapters that cannot be opened or queried are logged and skipped; every
/// rejected adapter is closed before the next one is tried.
pub fn select_adapter<A: SmbusAdapter>(
    paths: &[PathBuf],
    probe_address: u8,
    mut open: impl FnMut(&Path) -> bus::Result<A>,
) -> Result<SelectedAdapter<A>> {
    for path in paths {
        let adapter = match open(path) {
            Ok(adapter) => adapter,
            Err(e) => {
                log::warn!("cannot open {}: {e}", path.display());
                continue;
            }
        };

        let functionality = match adapter.functionality() {
            Ok(funcs) => funcs,
            Err(e) => {
                log::warn!("cannot query funcs on {}: {e}", path.display());
                continue;
            }
        };

        if let Err(e) = adapter.set_ten_bit(false) {
            log::debug!("{}: cannot force 7-bit addressing: {e}", path.display());
        }

        if has_device_at(&adapter, functionality, probe_address) {
            return Ok(SelectedAdapter {
                path: path.clone(),
                functionality,
                adapter,
            });
        }
        log::debug!(
            "{}: no response at 0x{probe_address:02x}",
            path.display()
        );
    }

    Err(LedctlError::NoResponder {
        address: probe_address,
    })
}

/// Enumerate `pattern` and select the first adapter answering at `probe_address`.
pub fn discover<A: SmbusAdapter>(
    pattern: &str,
    probe_address: u8,
    open: impl FnMut(&Path) -> bus::Result<A>,
) -> Result<SelectedAdapter<A>> {
    let paths = enumerate_adapters(pattern)?;
    if paths.is_empty() {
        return Err(LedctlError::NoAdapters {
            pattern: pattern.to_string(),
        });
    }
    log::debug!("adapter candidates: {paths:?}");
    select_adapter(&paths, probe_address, open)
}
