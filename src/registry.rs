//! The process-wide device list.
//!
//! Enumeration sweeps hand the registry a fresh scan of the bus; it upserts a
//! [`Device`] per discovered adapter (matched by serial) and drops every
//! device the sweep did not see, releasing its buffer and transport. Presence
//! tracking uses a generation counter: each sweep bumps it and stamps the
//! devices it touched, so anything carrying a stale stamp afterwards has
//! disappeared from the bus.

use tracing::debug;

use crate::device::{AdapterType, Device, DeviceInfo};
use crate::error::{Error, Result};
use crate::transport::Transport;

/// Library configuration. Both options are advisory.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Emit extra debug tracing (full EDID record dumps).
    pub verbose: bool,
    /// Treat success-path warnings (restricted-subset mode selection) as
    /// errors.
    pub strict_checksum: bool,
}

/// One adapter found by a bus scan, with the transport to drive it through.
pub struct Discovered {
    pub serial: String,
    pub adapter: AdapterType,
    pub transport: Box<dyn Transport>,
}

/// Owns every known [`Device`] and reconciles enumeration sweeps against
/// them.
///
/// The registry itself is not synchronised; callers enumerating from multiple
/// threads must serialise access externally. Distinct devices may be driven
/// concurrently once claimed.
pub struct Registry {
    options: Options,
    generation: u64,
    devices: Vec<Device>,
}

impl Registry {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            generation: 0,
            devices: Vec::new(),
        }
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Reconcile a bus scan against the device list.
    ///
    /// Adapters already known (by serial) get their transport refreshed;
    /// new ones are inserted. Devices absent from `scan` are removed and
    /// their resources released. Returns the surviving devices' identities.
    pub fn enumerate(&mut self, scan: impl IntoIterator<Item = Discovered>) -> Vec<DeviceInfo> {
        self.generation += 1;
        let generation = self.generation;

        for found in scan {
            match self.devices.iter_mut().find(|d| d.serial() == found.serial) {
                Some(dev) => {
                    // The bus handle may have moved between sweeps.
                    dev.update_transport(found.transport);
                    dev.generation = generation;
                }
                None => {
                    debug!(serial = %found.serial, adapter = ?found.adapter, "discovered device");
                    self.devices.push(Device::new(
                        found.serial,
                        found.adapter,
                        found.transport,
                        generation,
                    ));
                }
            }
        }

        self.devices.retain_mut(|dev| {
            if dev.generation == generation {
                return true;
            }
            debug!(serial = %dev.serial(), "device disappeared from bus");
            dev.release();
            false
        });

        self.devices.iter().map(Device::info).collect()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    pub fn device(&self, serial: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.serial() == serial)
    }

    pub fn device_mut(&mut self, serial: &str) -> Option<&mut Device> {
        self.devices.iter_mut().find(|d| d.serial() == serial)
    }

    /// Serial of the first device nobody holds a claim on.
    pub fn first_unclaimed(&self) -> Option<&str> {
        self.devices
            .iter()
            .find(|d| !d.claimed())
            .map(Device::serial)
    }

    /// Claim exclusive use of a device.
    ///
    /// Allocates its command buffer, applies `timeout_ms` (zero selects the
    /// default), and seeds the supported-modes list with the full catalogue;
    /// feed [`Device::apply_edid`] afterwards to narrow it. Fails with
    /// [`Error::AlreadyClaimed`] if another holder got there first.
    pub fn claim(&mut self, serial: &str, timeout_ms: u32) -> Result<&mut Device> {
        let options = self.options;
        let dev = self
            .device_mut(serial)
            .ok_or_else(|| Error::UnknownDevice(serial.to_owned()))?;
        dev.claim(timeout_ms)?;
        dev.warnings_are_errors = options.strict_checksum;
        dev.verbose = options.verbose;
        Ok(dev)
    }

    /// Release a claimed device. Idempotent.
    pub fn release(&mut self, serial: &str) -> Result<()> {
        let dev = self
            .device_mut(serial)
            .ok_or_else(|| Error::UnknownDevice(serial.to_owned()))?;
        dev.release();
        Ok(())
    }
}
