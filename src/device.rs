//! Per-adapter state: identity, claim flag, the staged command buffer and the
//! transport it flushes through.

use tracing::debug;

use crate::catalogue::{Mode, ModeNumber, MODE_COUNT};
use crate::edid::EdidRecord;
use crate::error::{Error, Result};
use crate::modeset;
use crate::transport::Transport;

/// Default staging buffer capacity in bytes.
pub const BUF_SIZE: usize = 64 * 1024;

/// Default bulk-transfer timeout applied when a claim passes zero.
pub const DEFAULT_WRITE_TIMEOUT_MS: u32 = 10_000;

/// Total adapter memory in bytes. All known variants carry 16 MiB.
pub const DEVICE_MEMORY_BYTES: u32 = 16 * 1024 * 1024;

/// Adapter hardware variant, from the ID nibble the device reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterType {
    Unknown,
    Base,
    Alex,
    Ollie,
}

impl AdapterType {
    /// Decode the variant from the status byte the adapter returns.
    pub fn from_id(id: u8) -> Self {
        if id == 0xF1 {
            return AdapterType::Ollie;
        }
        match (id >> 4) & 0xF {
            0xB => AdapterType::Base,
            0xF => AdapterType::Alex,
            _ => AdapterType::Unknown,
        }
    }
}

/// Identity snapshot returned by enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub serial: String,
    pub adapter: AdapterType,
    pub claimed: bool,
}

/// One attached adapter.
///
/// Owned by the [`Registry`](crate::Registry); callers borrow it to stage
/// commands and drive mode changes. Commands staged via [`Device::stage`] sit
/// in the buffer until [`Device::flush`] delivers them in stage order, so a
/// logical command group hits the wire as one bulk transfer.
pub struct Device {
    serial: String,
    adapter: AdapterType,
    pub(crate) claimed: bool,
    /// Stamp of the enumeration sweep that last saw this device.
    pub(crate) generation: u64,
    pub(crate) timeout_ms: u32,
    memory: u32,
    buf: Vec<u8>,
    buf_cap: usize,
    transport: Box<dyn Transport>,
    pub(crate) mode: Mode,
    pub(crate) base8: u32,
    pub(crate) low_blank: bool,
    pub(crate) native: Option<Mode>,
    pub(crate) supported: Vec<ModeNumber>,
    edid: Option<EdidRecord>,
    pub(crate) warnings_are_errors: bool,
    pub(crate) verbose: bool,
}

impl Device {
    pub(crate) fn new(
        serial: String,
        adapter: AdapterType,
        transport: Box<dyn Transport>,
        generation: u64,
    ) -> Self {
        Self {
            serial,
            adapter,
            claimed: false,
            generation,
            timeout_ms: 0,
            memory: DEVICE_MEMORY_BYTES,
            buf: Vec::new(),
            buf_cap: 0,
            transport,
            mode: Mode::default(),
            base8: 0,
            low_blank: false,
            native: None,
            supported: Vec::new(),
            edid: None,
            warnings_are_errors: false,
            verbose: false,
        }
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn adapter(&self) -> AdapterType {
        self.adapter
    }

    pub fn claimed(&self) -> bool {
        self.claimed
    }

    pub fn info(&self) -> DeviceInfo {
        DeviceInfo {
            serial: self.serial.clone(),
            adapter: self.adapter,
            claimed: self.claimed,
        }
    }

    /// The current display mode. Zero width/height until a mode is set.
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Base address of the 8-bit fine-detail plane for the current mode.
    pub fn base8(&self) -> u32 {
        self.base8
    }

    pub fn low_blank(&self) -> bool {
        self.low_blank
    }

    /// The monitor's native mode, when EDID parsing found one in the
    /// catalogue.
    pub fn native_mode(&self) -> Option<&Mode> {
        self.native.as_ref()
    }

    /// Catalogue indices this device accepts, in match-priority order.
    pub fn supported_modes(&self) -> &[ModeNumber] {
        &self.supported
    }

    /// Total adapter memory in bytes.
    pub fn memory(&self) -> u32 {
        self.memory
    }

    pub fn edid(&self) -> Option<&EdidRecord> {
        self.edid.as_ref()
    }

    /// Staged, unsent bytes.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn claim(&mut self, timeout_ms: u32) -> Result<()> {
        if self.claimed {
            return Err(Error::AlreadyClaimed);
        }
        self.claimed = true;
        self.timeout_ms = if timeout_ms == 0 {
            DEFAULT_WRITE_TIMEOUT_MS
        } else {
            timeout_ms
        };
        if self.buf_cap == 0 {
            self.buf_cap = BUF_SIZE;
            self.buf = Vec::with_capacity(self.buf_cap);
        }
        // Until EDID narrows it down, every catalogue mode is fair game.
        self.use_default_modes();
        debug!(serial = %self.serial, timeout_ms = self.timeout_ms, "claimed device");
        Ok(())
    }

    /// Drop the claim and free the staging buffer. Harmless on an unclaimed
    /// device.
    pub(crate) fn release(&mut self) {
        if self.claimed {
            debug!(serial = %self.serial, "released device");
        }
        self.claimed = false;
        self.buf = Vec::new();
        self.buf_cap = 0;
    }

    /// Resize the staging buffer. Staged bytes beyond the new capacity are
    /// discarded.
    pub fn set_command_buffer_capacity(&mut self, cap: usize) {
        self.buf_cap = cap;
        self.buf.truncate(cap);
    }

    /// Mark every catalogue mode as supported, in table order. Used when no
    /// EDID is available.
    pub fn use_default_modes(&mut self) {
        self.supported = (0..MODE_COUNT).collect();
    }

    /// Parse an EDID block read from the attached monitor and rebuild the
    /// supported-modes list from it.
    pub fn apply_edid(&mut self, bytes: &[u8]) -> Result<()> {
        let record = crate::edid::parse(bytes)?;
        if self.verbose {
            debug!(serial = %self.serial, record = ?record, "EDID contents");
        }
        modeset::build_supported(self, &record);
        self.edid = Some(record);
        Ok(())
    }

    /// Append `bytes` to the command buffer.
    ///
    /// Fails with [`Error::BufferFull`] when the free space is smaller than
    /// `bytes`; nothing is appended in that case. The buffer is not flushed
    /// implicitly, so callers keep control over transfer atomicity.
    pub fn stage(&mut self, bytes: &[u8]) -> Result<()> {
        if !self.claimed {
            return Err(Error::Unclaimed);
        }
        if self.buf_cap - self.buf.len() < bytes.len() {
            return Err(Error::BufferFull);
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Stage a single video-register write (`AF 20 reg val`).
    pub fn stage_vreg(&mut self, reg: u8, val: u8) -> Result<()> {
        self.stage(&[0xAF, 0x20, reg, val])
    }

    /// Deliver all staged bytes to the bulk endpoint.
    ///
    /// The cursor is reset whether or not the transfer succeeds; no partial
    /// transmission state survives a failure.
    pub fn flush(&mut self) -> Result<()> {
        if !self.claimed {
            return Err(Error::Unclaimed);
        }
        if self.buf.is_empty() {
            return Ok(());
        }
        let result = self.transport.write(&self.buf, self.timeout_ms);
        self.buf.clear();
        result.map_err(Error::from)
    }

    /// Issue a channel-select control request.
    pub(crate) fn control(&mut self, bytes: &[u8]) -> Result<()> {
        if !self.claimed {
            return Err(Error::Unclaimed);
        }
        self.transport
            .control_channel(bytes, self.timeout_ms)
            .map_err(Error::from)
    }

    /// Stream a pre-framed block straight to the bulk endpoint.
    pub(crate) fn bulk(&mut self, bytes: &[u8]) -> Result<()> {
        if !self.claimed {
            return Err(Error::Unclaimed);
        }
        self.transport
            .bulk_write(bytes, self.timeout_ms)
            .map_err(Error::from)
    }

    /// Swap in a fresh transport handle after re-enumeration.
    pub(crate) fn update_transport(&mut self, transport: Box<dyn Transport>) {
        self.transport = transport;
    }
}
