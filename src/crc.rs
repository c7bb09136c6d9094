//! Modbus CRC-16: polynomial `0xA001`, initial value `0xFFFF`, no final XOR.

/// Compute the Modbus CRC-16 over `data`.
///
/// The empty input yields the initial value `0xFFFF`. On the wire the
/// result is appended low byte first.
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = 0xFFFFu16;
    for byte in data {
        crc ^= u16::from(*byte);
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ 0xA001;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}
