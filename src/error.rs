use core::fmt;

/// Errors reported by the frame codec and the transaction engine.
///
/// "Busy" is deliberately absent: a `submit` while a transaction is in
/// flight, or a `poll` before the outcome is known, reports
/// `nb::Error::WouldBlock` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Recomputed CRC does not match the trailing frame bytes.
    Crc,
    /// No valid response arrived within the configured window.
    RxTimeout,
    /// The transport rejected the outgoing frame.
    TxFailed,
    /// Response carries an address other than the addressed device.
    InvalidSlaveId,
    /// Payload exceeds the protocol ceiling, or a received frame is shorter
    /// than the fixed overhead.
    InvalidFrame,
    /// Destination buffer too small for the encoded frame.
    BufferSize,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Error::Crc => "CRC mismatch",
            Error::RxTimeout => "response timeout",
            Error::TxFailed => "transmit failed",
            Error::InvalidSlaveId => "response from unexpected device",
            Error::InvalidFrame => "invalid frame",
            Error::BufferSize => "buffer too small",
        })
    }
}

pub type Result<T> = core::result::Result<T, Error>;
