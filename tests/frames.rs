//! Golden packet and edge-case tests for the frame codec.

use modbus_rtu::{
    encode_frame, validate_frame, Error, FunctionCode, FRAME_OVERHEAD, MAX_PAYLOAD_SIZE,
};

// Worked example from the Modbus specification: read 3 holding registers
// starting at 0x006B from device 0x11.
const READ_HOLDING_REQ: &[u8] = &[0x11, 0x03, 0x00, 0x6B, 0x00, 0x03, 0x76, 0x87];

#[test]
fn canonical_read_holding_registers_frame() {
    let mut buf = [0u8; 16];
    let len = encode_frame(
        0x11,
        FunctionCode::ReadHoldingRegisters,
        &[0x00, 0x6B, 0x00, 0x03],
        &mut buf,
    )
    .unwrap();
    assert_eq!(&buf[..len], READ_HOLDING_REQ);
}

#[test]
fn validate_returns_the_payload() {
    let payload = validate_frame(READ_HOLDING_REQ, 0x11).unwrap();
    assert_eq!(payload, &[0x00, 0x6B, 0x00, 0x03]);
}

#[test]
fn empty_payload_frame() {
    let mut buf = [0u8; 8];
    let len = encode_frame(0x01, FunctionCode::ReadCoils, &[], &mut buf).unwrap();
    assert_eq!(len, FRAME_OVERHEAD);
    assert_eq!(validate_frame(&buf[..len], 0x01).unwrap(), &[] as &[u8]);
}

#[test]
fn crc_byte_tamper_is_always_detected() {
    for bit in 0..16 {
        let mut frame = READ_HOLDING_REQ.to_vec();
        let pos = frame.len() - 2 + bit / 8;
        frame[pos] ^= 1 << (bit % 8);
        assert_eq!(validate_frame(&frame, 0x11), Err(Error::Crc), "bit {bit}");
    }
}

#[test]
fn payload_tamper_is_detected() {
    let mut frame = READ_HOLDING_REQ.to_vec();
    frame[3] ^= 0x01;
    assert_eq!(validate_frame(&frame, 0x11), Err(Error::Crc));
}

#[test]
fn address_mismatch_wins_over_crc() {
    assert_eq!(
        validate_frame(READ_HOLDING_REQ, 0x12),
        Err(Error::InvalidSlaveId)
    );

    // Reported even when the frame is also corrupt.
    let mut frame = READ_HOLDING_REQ.to_vec();
    frame[6] ^= 0xFF;
    assert_eq!(validate_frame(&frame, 0x12), Err(Error::InvalidSlaveId));
}

#[test]
fn payload_ceiling_is_exactly_252() {
    let mut buf = [0u8; 300];

    let payload = [0xA5u8; MAX_PAYLOAD_SIZE];
    let len = encode_frame(0x01, FunctionCode::WriteMultipleRegisters, &payload, &mut buf).unwrap();
    assert_eq!(len, MAX_PAYLOAD_SIZE + FRAME_OVERHEAD);
    assert_eq!(
        validate_frame(&buf[..len], 0x01).unwrap(),
        payload.as_slice()
    );

    let oversized = [0xA5u8; MAX_PAYLOAD_SIZE + 1];
    assert_eq!(
        encode_frame(0x01, FunctionCode::WriteMultipleRegisters, &oversized, &mut buf),
        Err(Error::InvalidFrame)
    );
}

#[test]
fn undersized_destination_buffer_rejected() {
    let mut buf = [0u8; 5];
    assert_eq!(
        encode_frame(0x01, FunctionCode::ReadCoils, &[0x00, 0x01], &mut buf),
        Err(Error::BufferSize)
    );
}

#[test]
fn runt_frame_rejected() {
    assert_eq!(validate_frame(&[0x11, 0x03, 0x76], 0x11), Err(Error::InvalidFrame));
    assert_eq!(validate_frame(&[], 0x11), Err(Error::InvalidFrame));
}
