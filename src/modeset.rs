//! Mode resolution and the mode-select protocol.
//!
//! The resolver reconciles what the monitor advertises (via EDID) with what
//! the adapter can raster (the catalogue), producing each device's ordered
//! supported-modes list and, when a detailed timing hits the catalogue, its
//! native mode. The mode-select protocol then drives an actual switch:
//! flush, base-address register block, mode-program channel dance, flush.

use tracing::debug;

use crate::catalogue::{self, Mode, ModeNumber, DL120_MODES, MODE_COUNT};
use crate::cmd::{self, MODE_POSTAMBLE, STD_CHANNEL_SELECT, VIDREG_LOCK, VIDREG_UNLOCK};
use crate::device::Device;
use crate::edid::{Descriptor, DetailTiming, EdidRecord};
use crate::error::{Error, Result, Warning};

/// Bytes per pixel of the wide colour plane.
const BYTES_PER_16BPP: u32 = 2;

/// The fixed menu of classical VGA modes indexed by established-timings bit
/// position. Zeroed rows are reserved bits with no assigned mode.
#[rustfmt::skip]
const EST_TIMINGS: [(u16, u16, u8); 24] = [
    ( 800,  600, 60), // bit 0
    ( 800,  600, 56),
    ( 640,  480, 75),
    ( 640,  480, 72),
    ( 640,  480, 67),
    ( 640,  480, 60),
    ( 720,  400, 88),
    ( 720,  400, 70),
    (1280, 1024, 75), // bit 8
    (1024,  768, 75),
    (1024,  768, 70),
    (1024,  768, 60),
    (1024,  768, 87),
    ( 832,  624, 75),
    ( 800,  600, 75),
    ( 800,  600, 72),
    (0, 0, 0),        // bits 16..22 reserved
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (0, 0, 0),
    (1152,  870, 75), // bit 23
];

/// Detailed-timing refresh rates probed against the catalogue, in Hz.
const DETAIL_REFRESH_RANGE: std::ops::Range<u8> = 50..100;

/// Walk `dev`'s supported list for the first entry matching the parameters.
/// Zero means "don't care" for `height`, `refresh` and `bpp`.
fn supported_lookup(
    dev: &Device,
    width: u16,
    height: u16,
    refresh: u8,
    bpp: u8,
) -> Option<ModeNumber> {
    let table = catalogue::catalogue();
    dev.supported.iter().copied().find(|&num| {
        let entry = &table[num];
        entry.width == width
            && (bpp == 0 || entry.bpp == bpp)
            && (height == 0 || entry.height == height)
            && (refresh == 0 || entry.refresh == refresh)
    })
}

/// Rebuild `dev.supported` (and `dev.native`) from a parsed EDID block.
///
/// Established-timing bits contribute first, in bit order; then each detailed
/// timing contributes every refresh rate in [50, 100) that the catalogue can
/// raster at its geometry. Duplicates are allowed; the list is a priority
/// order, not a set. The first detailed-timing hit becomes the native mode.
pub(crate) fn build_supported(dev: &mut Device, edid: &EdidRecord) {
    dev.native = None;
    let mut list: Vec<ModeNumber> = Vec::with_capacity(MODE_COUNT);

    let bits = edid.established.bits();
    for (bit, &(width, height, refresh)) in EST_TIMINGS.iter().enumerate() {
        if bits & (1 << bit) == 0 || width == 0 {
            continue;
        }
        if let Some(num) = catalogue::find(width, height, refresh, 24) {
            list.push(num);
        }
    }

    for desc in &edid.descriptors {
        let Descriptor::Detail(detail) = desc else {
            continue;
        };
        for hz in DETAIL_REFRESH_RANGE {
            let Some(num) = catalogue::find(detail.h_active, detail.v_active, hz, 24) else {
                continue;
            };
            list.push(num);
            if dev.native.is_none() {
                dev.native = catalogue::mode_from_number(num);
            }
        }
    }

    debug!(
        serial = %dev.serial(),
        supported = list.len(),
        native = ?dev.native.map(|m| (m.width, m.height, m.refresh)),
        "built supported-modes list from EDID"
    );
    dev.supported = list;
}

/// Stage and flush the base-address register block: wide-plane base into regs
/// 0x20..0x22, detail-plane base into 0x26..0x28, high byte first.
fn set_base(dev: &mut Device, base: u32, base8: u32) -> Result<()> {
    dev.stage(VIDREG_LOCK)?;
    dev.stage_vreg(0x20, (base >> 16) as u8)?;
    dev.stage_vreg(0x21, (base >> 8) as u8)?;
    dev.stage_vreg(0x22, base as u8)?;
    dev.stage_vreg(0x26, (base8 >> 16) as u8)?;
    dev.stage_vreg(0x27, (base8 >> 8) as u8)?;
    dev.stage_vreg(0x28, base8 as u8)?;
    dev.stage(VIDREG_UNLOCK)?;
    dev.flush()
}

impl Device {
    /// Resolve mode parameters against this device's supported list.
    ///
    /// Zero `height` or `refresh` matches the first available entry. Only
    /// 24 bpp is rasterable; any other depth misses outright.
    pub fn lookup_mode(&self, width: u16, height: u16, refresh: u8, bpp: u8) -> Option<ModeNumber> {
        if bpp != 24 {
            return None;
        }
        supported_lookup(self, width, height, refresh, bpp)
    }

    /// Switch the adapter into `desired`, resolving a catalogue index first
    /// if the caller did not supply one.
    ///
    /// On success the device's current mode reflects `desired` with the
    /// refresh rate of the catalogue entry actually programmed. Returns
    /// [`Warning::Dl160Mode`] when the entry belongs to the restricted
    /// subset.
    pub fn change_mode(
        &mut self,
        desired: &Mode,
        mode: Option<ModeNumber>,
    ) -> Result<Option<Warning>> {
        let num = match mode {
            Some(num) => num,
            None => supported_lookup(self, desired.width, desired.height, 0, desired.bpp)
                .ok_or(Error::BadMode)?,
        };
        if num >= MODE_COUNT {
            return Err(Error::BadMode);
        }
        if desired.base & 1 != 0 {
            return Err(Error::BadMode);
        }
        let extent = 3 * u32::from(desired.width) * u32::from(desired.height);
        if desired.base.checked_add(extent).is_none_or(|end| end > self.memory()) {
            return Err(Error::BadMode);
        }

        // Anything staged before the switch must not interleave with the
        // register blocks below.
        self.flush()?;

        self.mode.base = desired.base;
        self.base8 = desired.base
            + BYTES_PER_16BPP * u32::from(desired.width) * u32::from(desired.height);
        set_base(self, self.mode.base, self.base8)?;

        // Reprogram the raster only when the geometry changes; a matching
        // geometry shares blanking, so the low_blank flag is not compared.
        let geometry_changed = desired.width != self.mode.width
            || desired.height != self.mode.height
            || desired.bpp != self.mode.bpp;
        let entry = &catalogue::catalogue()[num];
        if geometry_changed {
            self.control(entry.enable)?;
            self.bulk(&entry.program)?;
            self.control(MODE_POSTAMBLE)?;
        }

        self.mode = *desired;
        self.mode.refresh = entry.refresh;
        self.low_blank = entry.low_blank;
        debug!(
            serial = %self.serial(),
            mode = num,
            width = self.mode.width,
            height = self.mode.height,
            refresh = self.mode.refresh,
            base = format_args!("{:#x}", self.mode.base),
            base8 = format_args!("{:#x}", self.base8),
            reprogrammed = geometry_changed,
            "mode change"
        );

        self.flush()?;

        Ok((num < DL120_MODES).then_some(Warning::Dl160Mode))
    }

    /// Program the monitor's preferred detailed timing directly, bypassing
    /// the catalogue.
    ///
    /// Fails with [`Error::InvalidMode`] when the EDID carried no usable
    /// detailed timing in its first descriptor slot.
    pub fn set_preferred_mode(&mut self, base: u32) -> Result<()> {
        let detail = match self.edid().and_then(EdidRecord::preferred_detail) {
            Some(detail) => *detail,
            None => return Err(Error::InvalidMode),
        };
        self.set_mode_from_detail(&detail, base)
    }

    fn set_mode_from_detail(&mut self, detail: &DetailTiming, base: u32) -> Result<()> {
        if base & 1 != 0 {
            return Err(Error::BadMode);
        }
        self.flush()?;
        self.control(STD_CHANNEL_SELECT)?;

        self.mode.base = base;
        self.base8 = base
            + BYTES_PER_16BPP * u32::from(detail.h_active) * u32::from(detail.v_active);
        set_base(self, self.mode.base, self.base8)?;

        self.stage(&cmd::raster_program(&detail.to_raster(), 24))?;
        self.flush()?;
        self.control(MODE_POSTAMBLE)?;

        self.mode.width = detail.h_active;
        self.mode.height = detail.v_active;
        self.mode.bpp = 24;
        self.mode.refresh = detail.refresh_hz();
        debug!(
            serial = %self.serial(),
            width = self.mode.width,
            height = self.mode.height,
            refresh = self.mode.refresh,
            base = format_args!("{:#x}", self.mode.base),
            base8 = format_args!("{:#x}", self.base8),
            "mode set from preferred timing"
        );
        Ok(())
    }

    /// Top-level mode set.
    ///
    /// A missing or zero-width descriptor, or one matching the monitor's
    /// preferred geometry, takes the direct preferred-timing path; everything
    /// else resolves against the supported list and runs the catalogue
    /// switch. With warnings upgraded to errors (strict options), a
    /// restricted-subset selection fails with [`Error::RestrictedMode`].
    pub fn set_mode(&mut self, desc: Option<&Mode>) -> Result<Option<Warning>> {
        let preferred_geometry = self
            .edid()
            .and_then(EdidRecord::preferred_detail)
            .map(|d| (d.h_active, d.v_active));
        let desc = match desc {
            None => {
                self.set_preferred_mode(0)?;
                return Ok(None);
            }
            Some(desc) => desc,
        };
        if desc.width == 0 || preferred_geometry == Some((desc.width, desc.height)) {
            self.set_preferred_mode(desc.base)?;
            return Ok(None);
        }

        debug!(
            serial = %self.serial(),
            width = desc.width,
            height = desc.height,
            refresh = desc.refresh,
            bpp = desc.bpp,
            "mode set request"
        );
        let num = self
            .lookup_mode(desc.width, desc.height, desc.refresh, desc.bpp)
            .ok_or(Error::BadMode)?;
        let warning = self.change_mode(desc, Some(num))?;
        if warning.is_some() && self.warnings_are_errors {
            return Err(Error::RestrictedMode);
        }
        Ok(warning)
    }
}
