//! The fixed catalogue of rasterable display modes.
//!
//! The adapter family cannot synthesize arbitrary timings on the fly; every
//! selectable mode comes from this ordered table. Each entry carries the
//! VESA DMT / CEA-861 raster parameters for its `(width, height, refresh)`
//! triple plus the pre-assembled register program and channel-select key the
//! mode switch sends. Entry order is fixed and observable: callers resolve
//! modes to indices and the resolver records indices in per-device supported
//! lists.

use std::sync::OnceLock;

use crate::cmd::{self, RasterTiming, MODE_CHANNEL_SELECT};

/// Index of a catalogue entry.
pub type ModeNumber = usize;

/// Number of catalogue entries.
pub const MODE_COUNT: usize = 35;

/// Entries below this index exceed the raster ceiling of the smaller adapter
/// variant; selecting one succeeds with a warning.
pub const DL120_MODES: usize = 2;

/// A raster mode as seen by callers: geometry, depth, framebuffer placement
/// and refresh rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mode {
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// Colour depth in bits per pixel (always 24).
    pub bpp: u8,
    /// Base address of the viewport in adapter memory. Must be two-byte
    /// aligned.
    pub base: u32,
    /// Refresh rate in Hz.
    pub refresh: u8,
}

/// One catalogue entry: the advertised triple, its raster parameters, and the
/// byte blobs the mode switch issues.
pub(crate) struct Entry {
    pub width: u16,
    pub height: u16,
    pub refresh: u8,
    pub bpp: u8,
    pub low_blank: bool,
    /// Register program streamed over the bulk endpoint during a mode switch.
    pub program: Vec<u8>,
    /// Channel-select key issued before the program.
    pub enable: &'static [u8],
}

struct ModeDef {
    width: u16,
    height: u16,
    refresh: u8,
    low_blank: bool,
    pclk_10khz: u16,
    h_blank: u16,
    h_sync_offset: u16,
    h_sync_width: u16,
    v_blank: u16,
    v_sync_offset: u16,
    v_sync_width: u16,
    h_sync_positive: bool,
    v_sync_positive: bool,
}

#[allow(clippy::too_many_arguments)]
const fn def(
    width: u16,
    height: u16,
    refresh: u8,
    pclk_10khz: u16,
    h_blank: u16,
    h_sync_offset: u16,
    h_sync_width: u16,
    v_blank: u16,
    v_sync_offset: u16,
    v_sync_width: u16,
    h_sync_positive: bool,
    v_sync_positive: bool,
    low_blank: bool,
) -> ModeDef {
    ModeDef {
        width,
        height,
        refresh,
        low_blank,
        pclk_10khz,
        h_blank,
        h_sync_offset,
        h_sync_width,
        v_blank,
        v_sync_offset,
        v_sync_width,
        h_sync_positive,
        v_sync_positive,
    }
}

/// The mode table, largest modes first. Index order is part of the API
/// surface: lookups return the first match in supported-list order, and the
/// first [`DL120_MODES`] indices form the restricted subset.
#[rustfmt::skip]
const MODE_DEFS: [ModeDef; MODE_COUNT] = [
    def(1920, 1080, 60, 14850, 280,  88,  44, 45,  4, 5, true,  true,  false),
    def(1600, 1200, 60, 16200, 560,  64, 192, 50,  1, 3, true,  true,  false),
    def(1400, 1050, 85, 17950, 512, 104, 152, 55,  3, 4, false, true,  false),
    def(1400, 1050, 75, 15600, 488,  96, 144, 49,  3, 4, false, true,  false),
    def(1400, 1050, 60, 12175, 464,  88, 144, 39,  3, 4, false, true,  false),
    def(1400, 1050, 60, 10100, 160,  48,  32, 30,  3, 4, true,  false, true),
    def(1366,  768, 60,  8550, 426,  70, 143, 30,  3, 3, true,  true,  false),
    def(1360,  768, 60,  8550, 432,  64, 112, 27,  3, 6, true,  true,  false),
    def(1280,  960, 85, 14850, 448,  64, 160, 51,  1, 3, true,  true,  false),
    def(1280,  960, 60, 10800, 520,  96, 112, 40,  1, 3, true,  true,  false),
    def(1280,  800, 60,  8350, 400,  72, 128, 31,  3, 6, false, true,  false),
    def(1280,  768, 85, 11750, 432,  80, 136, 37,  3, 7, false, true,  false),
    def(1280,  768, 75, 10225, 416,  80, 128, 37,  3, 7, false, true,  false),
    def(1280, 1024, 85, 15750, 448,  64, 160, 48,  1, 3, true,  true,  false),
    def(1280, 1024, 75, 13500, 408,  16, 144, 42,  1, 3, true,  true,  false),
    def(1280, 1024, 60, 10800, 408,  48, 112, 42,  1, 3, true,  true,  false),
    def(1280,  768, 60,  7950, 384,  64, 128, 30,  3, 7, false, true,  false),
    def(1152,  864, 75, 10800, 448,  64, 128, 36,  1, 3, true,  true,  false),
    def(1024,  768, 85,  9450, 352,  48,  96, 40,  1, 3, true,  true,  false),
    def(1024,  768, 75,  7875, 288,  16,  96, 32,  1, 3, true,  true,  false),
    def(1024,  768, 70,  7500, 304,  24, 136, 38,  3, 6, false, false, false),
    def(1024,  768, 60,  6500, 320,  24, 136, 38,  3, 6, false, false, false),
    def( 848,  480, 60,  3375, 240,  16, 112, 37,  6, 8, true,  true,  false),
    def( 800,  600, 85,  5625, 248,  32,  64, 31,  1, 3, true,  true,  false),
    def( 800,  600, 75,  4950, 256,  16,  80, 25,  1, 3, true,  true,  false),
    def( 800,  600, 72,  5000, 240,  56, 120, 66, 37, 6, true,  true,  false),
    def( 800,  600, 60,  4000, 256,  40, 128, 28,  1, 4, true,  true,  false),
    def( 800,  600, 56,  3600, 224,  24,  72, 25,  1, 2, true,  true,  false),
    def( 800,  480, 60,  2950, 192,  24,  72, 20,  3, 7, true,  true,  false),
    def( 720,  400, 85,  3550, 216,  36,  72, 46,  1, 3, false, true,  false),
    def( 720,  400, 70,  2832, 180,  18, 108, 49, 12, 2, false, true,  false),
    def( 640,  480, 85,  3600, 192,  56,  56, 29,  1, 3, false, false, false),
    def( 640,  480, 75,  3150, 200,  16,  64, 20,  1, 3, false, false, false),
    def( 640,  480, 73,  3150, 192,  24,  40, 40,  9, 3, false, false, false),
    def( 640,  480, 60,  2518, 160,  16,  96, 45, 10, 2, false, false, false),
];

static CATALOGUE: OnceLock<Vec<Entry>> = OnceLock::new();

/// The initialised mode table. Built on first use, immutable after.
pub(crate) fn catalogue() -> &'static [Entry] {
    CATALOGUE.get_or_init(|| {
        MODE_DEFS
            .iter()
            .map(|d| {
                let timing = RasterTiming {
                    h_active: d.width,
                    h_blank: d.h_blank,
                    h_sync_offset: d.h_sync_offset,
                    h_sync_width: d.h_sync_width,
                    v_active: d.height,
                    v_blank: d.v_blank,
                    v_sync_offset: d.v_sync_offset,
                    v_sync_width: d.v_sync_width,
                    pixel_clock_10khz: d.pclk_10khz,
                    h_sync_positive: d.h_sync_positive,
                    v_sync_positive: d.v_sync_positive,
                };
                Entry {
                    width: d.width,
                    height: d.height,
                    refresh: d.refresh,
                    bpp: 24,
                    low_blank: d.low_blank,
                    program: cmd::raster_program(&timing, 24),
                    enable: MODE_CHANNEL_SELECT,
                }
            })
            .collect()
    })
}

/// Return the mode record for a catalogue index, base address zero.
pub fn mode_from_number(num: ModeNumber) -> Option<Mode> {
    let entry = catalogue().get(num)?;
    Some(Mode {
        width: entry.width,
        height: entry.height,
        bpp: entry.bpp,
        base: 0,
        refresh: entry.refresh,
    })
}

/// First catalogue index matching the given parameters. Zero means
/// "don't care" for `height`, `refresh` and `bpp`; `width` is always exact.
pub(crate) fn find(width: u16, height: u16, refresh: u8, bpp: u8) -> Option<ModeNumber> {
    catalogue().iter().position(|entry| {
        entry.width == width
            && (bpp == 0 || entry.bpp == bpp)
            && (height == 0 || entry.height == height)
            && (refresh == 0 || entry.refresh == refresh)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_shape() {
        assert_eq!(catalogue().len(), MODE_COUNT);
        for entry in catalogue() {
            assert_eq!(entry.bpp, 24);
            assert!(!entry.program.is_empty());
            assert_eq!(entry.enable.len(), 16);
        }
    }

    #[test]
    fn well_known_indices() {
        let m21 = mode_from_number(21).unwrap();
        assert_eq!((m21.width, m21.height, m21.refresh), (1024, 768, 60));
        let m18 = mode_from_number(18).unwrap();
        assert_eq!((m18.width, m18.height, m18.refresh), (1024, 768, 85));
        let m34 = mode_from_number(34).unwrap();
        assert_eq!((m34.width, m34.height, m34.refresh), (640, 480, 60));
        assert_eq!(mode_from_number(MODE_COUNT), None);
    }

    #[test]
    fn find_honours_dont_cares() {
        // First 1024-wide entry wins when height/refresh are unconstrained.
        assert_eq!(find(1024, 0, 0, 24), Some(18));
        assert_eq!(find(1024, 768, 60, 24), Some(21));
        assert_eq!(find(1024, 768, 61, 24), None);
        assert_eq!(find(1920, 1080, 60, 24), Some(0));
    }

    #[test]
    fn reduced_blanking_entry_is_flagged() {
        let entry = &catalogue()[5];
        assert_eq!((entry.width, entry.height, entry.refresh), (1400, 1050, 60));
        assert!(entry.low_blank);
        // The non-reduced 1400x1050@60 entry shadows it in find() order.
        assert_eq!(find(1400, 1050, 60, 24), Some(4));
    }
}
