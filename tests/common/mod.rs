#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use udlkit::{Transport, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Staged command buffer delivered via `Transport::write`.
    Write,
    /// Channel-select control request.
    Control,
    /// Direct bulk stream (mode-program blobs).
    Bulk,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Op {
    pub endpoint: Endpoint,
    pub bytes: Vec<u8>,
}

/// A transport that records every transfer and can be told to fail.
pub struct MockTransport {
    log: Rc<RefCell<Vec<Op>>>,
    fail: Rc<Cell<bool>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(Vec::new())),
            fail: Rc::new(Cell::new(false)),
        }
    }

    /// Handle to the recorded transfer log; survives moving the transport
    /// into a registry.
    pub fn log(&self) -> Rc<RefCell<Vec<Op>>> {
        Rc::clone(&self.log)
    }

    /// Handle to the failure switch; when set, every transfer errors.
    pub fn fail_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.fail)
    }

    fn record(&mut self, endpoint: Endpoint, bytes: &[u8]) -> Result<(), TransportError> {
        if self.fail.get() {
            return Err(TransportError::Io("injected failure".to_owned()));
        }
        self.log.borrow_mut().push(Op {
            endpoint,
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}

impl Transport for MockTransport {
    fn write(&mut self, bytes: &[u8], _timeout_ms: u32) -> Result<(), TransportError> {
        self.record(Endpoint::Write, bytes)
    }

    fn control_channel(&mut self, bytes: &[u8], _timeout_ms: u32) -> Result<(), TransportError> {
        self.record(Endpoint::Control, bytes)
    }

    fn bulk_write(&mut self, bytes: &[u8], _timeout_ms: u32) -> Result<(), TransportError> {
        self.record(Endpoint::Bulk, bytes)
    }
}

/// Build a 128-byte EDID block: valid header, EDID 1.3 version bytes and a
/// sane identity, everything else zero unless `configure` fills it in. The
/// checksum byte is computed last, so configured blocks always validate.
pub fn edid_block(configure: impl FnOnce(&mut [u8; 128])) -> [u8; 128] {
    let mut edid = [0u8; 128];
    edid[0..8].copy_from_slice(&[0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00]);
    // Manufacturer/product identity (arbitrary but stable).
    edid[8..10].copy_from_slice(&0x04B2u16.to_be_bytes());
    edid[10..12].copy_from_slice(&0x0001u16.to_le_bytes());
    // EDID version 1.3.
    edid[18] = 1;
    edid[19] = 3;
    // Gamma 2.20.
    edid[23] = 120;
    configure(&mut edid);
    let sum = edid[..127].iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    edid[127] = 0u8.wrapping_sub(sum);
    edid
}

/// VESA DMT 1280x1024@60 detailed timing descriptor.
pub const DTD_1280_1024_60: [u8; 18] = [
    0x30, 0x2A, 0x00, 0x98, 0x51, 0x00, 0x2A, 0x40, 0x30, 0x70, 0x13, 0x00, 0x54, 0x0E, 0x11,
    0x00, 0x00, 0x1E,
];

/// VESA DMT 1024x768@60 detailed timing descriptor.
pub const DTD_1024_768_60: [u8; 18] = [
    0x64, 0x19, 0x00, 0x40, 0x41, 0x00, 0x26, 0x30, 0x18, 0x88, 0x36, 0x00, 0x54, 0x0E, 0x11,
    0x00, 0x00, 0x18,
];
