/// Maps a host keyboard character onto the hex keypad, using the
/// conventional layout on the left-hand side of a QWERTY keyboard:
///
/// ```text
/// 1 2 3 4      1 2 3 C
/// q w e r  ->  4 5 6 D
/// a s d f      7 8 9 E
/// z x c v      A 0 B F
/// ```
pub fn map_key(key: char) -> Option<u8> {
    match key.to_ascii_lowercase() {
        '1' => Some(0x1),
        '2' => Some(0x2),
        '3' => Some(0x3),
        '4' => Some(0xC),
        'q' => Some(0x4),
        'w' => Some(0x5),
        'e' => Some(0x6),
        'r' => Some(0xD),
        'a' => Some(0x7),
        's' => Some(0x8),
        'd' => Some(0x9),
        'f' => Some(0xE),
        'z' => Some(0xA),
        'x' => Some(0x0),
        'c' => Some(0xB),
        'v' => Some(0xF),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_keypad_digit_is_reachable() {
        let mut seen: Vec<u8> = "1234qwerasdfzxcv".chars().filter_map(map_key).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0x0..=0xF).collect::<Vec<u8>>());
    }

    #[test]
    fn test_case_insensitive_and_unmapped() {
        assert_eq!(map_key('V'), Some(0xF));
        assert_eq!(map_key('p'), None);
        assert_eq!(map_key('0'), None);
    }
}
