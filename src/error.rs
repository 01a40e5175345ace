use thiserror::Error;

use crate::transport::TransportError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The requested mode parameters match nothing the adapter can raster.
    #[error("unsupported mode parameters")]
    BadMode,

    /// The command buffer has no room for the staged bytes. Nothing was
    /// appended; flush and retry.
    #[error("command buffer is full")]
    BufferFull,

    /// The EDID block failed validation.
    #[error("invalid EDID block: {0}")]
    EdidFail(&'static str),

    /// No usable mode is available (e.g. the monitor advertises no detailed
    /// timing to derive a preferred mode from).
    #[error("no usable display mode available")]
    InvalidMode,

    #[error("device is already claimed")]
    AlreadyClaimed,

    /// The operation needs a claimed device.
    #[error("device is not claimed")]
    Unclaimed,

    #[error("unknown device serial {0:?}")]
    UnknownDevice(String),

    /// The selected mode belongs to the restricted subset and warnings were
    /// upgraded to errors via [`Options::strict_checksum`].
    ///
    /// [`Options::strict_checksum`]: crate::Options
    #[error("selected mode is restricted to newer adapter variants")]
    RestrictedMode,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Success-path note from a mode change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    /// The selected mode may not display correctly on the smaller adapter
    /// variant.
    Dl160Mode,
}
