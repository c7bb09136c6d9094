//! Wire encoding and validation of RTU frames.
//!
//! Both functions are pure over byte slices; how the receive buffer gets
//! filled (interrupt-driven, DMA) is none of their business, so they can be
//! exercised with literal byte arrays.

use byteorder::{ByteOrder, LittleEndian};
use log::warn;

use crate::{crc16, Error, FunctionCode, Result};

/// Protocol ceiling for one frame: address + function + payload + CRC.
pub const MAX_FRAME_SIZE: usize = 256;
/// Address byte, function code byte and the two CRC bytes.
pub const FRAME_OVERHEAD: usize = 4;
/// Longest payload that still fits a frame.
pub const MAX_PAYLOAD_SIZE: usize = MAX_FRAME_SIZE - FRAME_OVERHEAD;

static_assertions::const_assert_eq!(MAX_PAYLOAD_SIZE, 252);

/// Encode one RTU frame into `buf` as
/// `[address][function][payload..][crc_lo][crc_hi]`.
///
/// Returns the number of bytes to transmit, `payload.len() + 4`. When and
/// how the bytes go out is the transport's decision.
pub fn encode_frame(
    address: u8,
    function: FunctionCode,
    payload: &[u8],
    buf: &mut [u8],
) -> Result<usize> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(Error::InvalidFrame);
    }
    let total = payload.len() + FRAME_OVERHEAD;
    if buf.len() < total {
        return Err(Error::BufferSize);
    }

    buf[0] = address;
    buf[1] = function.into();
    buf[2..total - 2].copy_from_slice(payload);
    let crc = crc16(&buf[..total - 2]);
    LittleEndian::write_u16(&mut buf[total - 2..total], crc);

    Ok(total)
}

/// Validate a received frame and return its payload.
///
/// The address is checked before the CRC, so a frame addressed elsewhere is
/// reported as [`Error::InvalidSlaveId`] even when it is also corrupt.
pub fn validate_frame(frame: &[u8], expected_address: u8) -> Result<&[u8]> {
    if frame.len() < FRAME_OVERHEAD || frame.len() > MAX_FRAME_SIZE {
        return Err(Error::InvalidFrame);
    }

    if frame[0] != expected_address {
        warn!(
            "frame from device {} while waiting for {}",
            frame[0], expected_address
        );
        return Err(Error::InvalidSlaveId);
    }

    let crc_pos = frame.len() - 2;
    let received = LittleEndian::read_u16(&frame[crc_pos..]);
    let computed = crc16(&frame[..crc_pos]);
    if received != computed {
        warn!("CRC mismatch: frame {:04x}, computed {:04x}", received, computed);
        return Err(Error::Crc);
    }

    Ok(&frame[2..crc_pos])
}
