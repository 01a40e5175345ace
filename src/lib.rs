//! User-space driver library for a family of USB-attached display adapters.
//!
//! The adapters speak a proprietary byte-stream command protocol over a bulk
//! USB endpoint. This crate implements the protocol and mode-negotiation
//! engine on top of an opaque transport:
//!
//! - a command-buffer framing layer that stages adapter register writes and
//!   flushes them atomically ([`Device::stage`], [`Device::flush`]),
//! - an EDID parser extracting the attached monitor's capabilities from its
//!   128-byte descriptor ([`edid`]),
//! - a fixed mode catalogue plus the resolver reconciling it with what the
//!   monitor advertises ([`Device::lookup_mode`], [`Device::supported_modes`]),
//! - the mode-select protocol that orders register reprogramming and
//!   mode-program blobs around a switch ([`Device::set_mode`]),
//! - a registry tracking adapter presence across enumeration sweeps
//!   ([`Registry::enumerate`]).
//!
//! The library creates no threads and performs I/O only through the
//! [`Transport`] trait; staging, EDID parsing and mode lookup are pure.
//! Callers must serialise access per device, but distinct devices can be
//! driven independently.
//!
//! # Example
//!
//! ```no_run
//! use udlkit::{Discovered, Mode, Options, Registry};
//! # fn scan_bus() -> Vec<Discovered> { Vec::new() }
//! # fn read_monitor_edid() -> Vec<u8> { vec![0; 128] }
//!
//! # fn main() -> udlkit::Result<()> {
//! let mut registry = Registry::new(Options::default());
//! registry.enumerate(scan_bus());
//!
//! let serial = registry.first_unclaimed().expect("no adapter attached").to_owned();
//! let dev = registry.claim(&serial, 0)?;
//! dev.apply_edid(&read_monitor_edid())?;
//!
//! let desired = Mode { width: 1024, height: 768, bpp: 24, base: 0, refresh: 60 };
//! dev.set_mode(Some(&desired))?;
//! # Ok(())
//! # }
//! ```

pub mod bytes;
mod catalogue;
mod cmd;
mod device;
pub mod edid;
mod error;
mod modeset;
mod registry;
mod transport;

pub use catalogue::{mode_from_number, Mode, ModeNumber, DL120_MODES, MODE_COUNT};
pub use cmd::{
    lfsr16, MODE_CHANNEL_SELECT, MODE_POSTAMBLE, STD_CHANNEL_SELECT, VIDREG_LOCK, VIDREG_UNLOCK,
};
pub use device::{
    AdapterType, Device, DeviceInfo, BUF_SIZE, DEFAULT_WRITE_TIMEOUT_MS, DEVICE_MEMORY_BYTES,
};
pub use error::{Error, Result, Warning};
pub use registry::{Discovered, Options, Registry};
pub use transport::{Transport, TransportError};
