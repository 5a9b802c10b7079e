// SPDX-FileCopyrightText: The pushio authors
// SPDX-License-Identifier: MPL-2.0

use std::time::Duration;

use rusb::{Context, DeviceHandle, UsbContext as _};

use super::DisplayConnection;
use crate::{ConnectionError, Error, Result};

pub const VENDOR_ID: u16 = 0x2982;
pub const PRODUCT_ID: u16 = 0x1967;

const DISPLAY_INTERFACE: u8 = 0;
const DISPLAY_ENDPOINT: u8 = 0x01;

pub const DEFAULT_TRANSFER_TIMEOUT: Duration = Duration::from_millis(1000);

impl From<rusb::Error> for Error {
    fn from(err: rusb::Error) -> Self {
        Error::Transport {
            msg: err.to_string().into(),
        }
    }
}

/// The display, connected through [`rusb`].
///
/// The interface is released when dropped.
pub struct UsbDisplay {
    handle: DeviceHandle<Context>,
    timeout: Duration,
}

impl std::fmt::Debug for UsbDisplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsbDisplay")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl UsbDisplay {
    /// Open the first device that is found.
    pub fn open() -> Result<Self> {
        Self::open_with_timeout(DEFAULT_TRANSFER_TIMEOUT)
    }

    pub fn open_with_timeout(timeout: Duration) -> Result<Self> {
        let context = Context::new()?;
        let mut last_err = None;
        for device in context.devices()?.iter() {
            let Ok(descriptor) = device.device_descriptor() else {
                continue;
            };
            if descriptor.vendor_id() != VENDOR_ID || descriptor.product_id() != PRODUCT_ID {
                continue;
            }
            let handle = match device.open() {
                Ok(handle) => handle,
                Err(err) => {
                    log::warn!("Failed to open display device: {err}");
                    last_err = Some(err);
                    continue;
                }
            };
            if let Err(err) = handle.claim_interface(DISPLAY_INTERFACE) {
                log::warn!("Failed to claim interface {DISPLAY_INTERFACE} of display device: {err}");
                last_err = Some(err);
                continue;
            }
            log::info!(
                "Connected display on bus {bus} at address {address}",
                bus = device.bus_number(),
                address = device.address()
            );
            return Ok(Self { handle, timeout });
        }
        Err(last_err.map_or(ConnectionError::DeviceNotFound.into(), Into::into))
    }
}

impl DisplayConnection for UsbDisplay {
    fn write_bulk(&mut self, data: &[u8]) -> Result<()> {
        let written = self
            .handle
            .write_bulk(DISPLAY_ENDPOINT, data, self.timeout)?;
        if written != data.len() {
            return Err(Error::transport(format!(
                "incomplete bulk transfer: {written} of {len} bytes",
                len = data.len()
            )));
        }
        Ok(())
    }
}

impl Drop for UsbDisplay {
    fn drop(&mut self) {
        if let Err(err) = self.handle.release_interface(DISPLAY_INTERFACE) {
            log::warn!("Failed to release interface of display device: {err}");
        } else {
            log::info!("Disconnected display");
        }
    }
}
