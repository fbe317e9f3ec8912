use crate::consts;
use crate::core::ram::DisplayBuffer;

/// Renders the frame as text, one line per pixel row. Used by the headless
/// runner in place of a window.
pub struct TextDisplay {
    lit: char,
    unlit: char,
}

impl Default for TextDisplay {
    fn default() -> Self {
        TextDisplay {
            lit: '#',
            unlit: '.',
        }
    }
}

impl TextDisplay {
    pub fn new(lit: char, unlit: char) -> Self {
        TextDisplay { lit, unlit }
    }

    pub fn render(&self, display_buffer: &DisplayBuffer) -> String {
        let mut frame = String::with_capacity((consts::DISPL_WIDTH + 1) * consts::DISPL_HEIGHT);
        for y in 0..consts::DISPL_HEIGHT {
            for x in 0..consts::DISPL_WIDTH {
                frame.push(if display_buffer.pixel(x, y) {
                    self.lit
                } else {
                    self.unlit
                });
            }
            frame.push('\n');
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_frame() {
        let frame = TextDisplay::default().render(&DisplayBuffer::default());
        assert_eq!(frame.lines().count(), consts::DISPL_HEIGHT);
        assert!(frame.lines().all(|l| l == ".".repeat(consts::DISPL_WIDTH)));
    }

    #[test]
    fn test_lit_pixels() {
        let mut buffer = DisplayBuffer::default();
        buffer.xor_byte(0, 0b1000_0001);
        buffer.xor_byte(consts::DISPL_BYTES - 1, 0b0000_0001);
        let frame = TextDisplay::new('X', ' ').render(&buffer);
        let lines: Vec<&str> = frame.lines().collect();
        assert!(lines[0].starts_with("X      X "));
        assert!(lines[31].ends_with(" X"));
    }
}
