use std::fmt;

pub fn nibble_split(word: u16) -> (u8, u8, u8, u8) {
    (
        ((word & 0xF000) >> 12) as u8,
        ((word & 0x0F00) >> 8) as u8,
        ((word & 0x00F0) >> 4) as u8,
        (word & 0x000F) as u8,
    )
}

pub fn low_byte(word: u16) -> u8 {
    (word & 0x00FF) as u8
}

pub fn low_address(word: u16) -> u16 {
    word & 0x0FFF
}

/// Writes `bytes` as rows of hexadecimal pairs, each row prefixed with its
/// starting offset.
pub fn hex_dump(f: &mut fmt::Formatter<'_>, bytes: &[u8], per_row: usize) -> fmt::Result {
    for (row, chunk) in bytes.chunks(per_row).enumerate() {
        write!(f, "{:03X}:", row * per_row)?;
        for byte in chunk {
            write!(f, " {:02X}", byte)?;
        }
        writeln!(f)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nibble_split() {
        assert_eq!(nibble_split(0xD01F), (0xD, 0x0, 0x1, 0xF));
        assert_eq!(nibble_split(0x8AB4), (0x8, 0xA, 0xB, 0x4));
    }

    #[test]
    fn test_operands_use_own_mask() {
        assert_eq!(low_address(0xB123), 0x123);
        assert_eq!(low_address(0x1FFF), 0xFFF);
        assert_eq!(low_byte(0x6AFE), 0xFE);
    }
}
