//! Frame checksum algorithm
//!
//! From the module datasheet: the arithmetic sum of the packet identifier,
//! both length bytes and every payload byte. Overflowing bits are dropped and
//! the result is sent high byte first.

use tracing::trace;

/// Calculate a frame checksum
///
/// # Algorithm
///
/// ```text
/// sum = packet_type + length_hi + length_lo + payload[0] + ... + payload[n-1]
/// return sum mod 0x10000
/// ```
///
/// # Examples
///
/// ```
/// use fpsensor_core::checksum;
///
/// // GenImg command: type 0x01, length 0x0003, payload [0x01]
/// assert_eq!(checksum::calculate(0x01, 0x0003, &[0x01]), 0x0005);
/// ```
pub fn calculate(packet_type: u8, length: u16, payload: &[u8]) -> u16 {
    let [len_hi, len_lo] = length.to_be_bytes();

    let mut sum = u16::from(packet_type)
        .wrapping_add(u16::from(len_hi))
        .wrapping_add(u16::from(len_lo));

    for &byte in payload {
        sum = sum.wrapping_add(u16::from(byte));
    }

    trace!(
        packet_type = packet_type,
        length = length,
        payload_len = payload.len(),
        checksum = format!("0x{:04X}", sum),
        "Calculated checksum"
    );

    sum
}

/// Verify checksum
pub fn verify(packet_type: u8, length: u16, payload: &[u8], expected: u16) -> bool {
    calculate(packet_type, length, payload) == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_gen_img_command() {
        // EF 01 FF FF FF FF 01 00 03 01 00 05
        assert_eq!(calculate(0x01, 3, &[0x01]), 0x0005);
    }

    #[test]
    fn test_checksum_up_char_command() {
        // UpChar(slot 1): 01 00 04 08 01 -> 0x000E
        assert_eq!(calculate(0x01, 4, &[0x08, 0x01]), 0x000E);
    }

    #[test]
    fn test_checksum_sums_length_bytes_separately() {
        // 0x0102 contributes 0x01 + 0x02, not 0x0102
        assert_eq!(calculate(0x02, 0x0102, &[]), 0x0005);
    }

    #[test]
    fn test_checksum_wraps_at_16_bits() {
        // 0x08 + 0x01 + 0x02 + 258 * 0xFF = 0x10109 -> 0x0109
        let payload = vec![0xFF; 258];
        assert_eq!(calculate(0x08, 0x0102, &payload), 0x0109);
    }

    #[test]
    fn test_checksum_verify() {
        let payload = [0xAB, 0xCD];
        let checksum = calculate(0x07, 4, &payload);

        assert!(verify(0x07, 4, &payload, checksum));
        assert!(!verify(0x07, 4, &payload, checksum.wrapping_add(1)));
    }

    #[test]
    fn test_checksum_different_types() {
        assert_ne!(calculate(0x02, 4, &[1, 2]), calculate(0x08, 4, &[1, 2]));
    }
}
