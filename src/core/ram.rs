use crate::consts;
use crate::error::{Chip8Error, Result};
use crate::utils;
use std::fmt;

/// Flat, bounds-checked 4 KB address space. The font is baked in at
/// `FONT_OFFSET` on construction.
#[derive(Debug)]
pub struct Ram {
    buffer: [u8; consts::RAM_BYTES],
}

impl Default for Ram {
    fn default() -> Self {
        let mut ram = Ram {
            buffer: [0; consts::RAM_BYTES],
        };
        ram.buffer[consts::FONT_OFFSET..consts::FONT_OFFSET + consts::FONT_SET_SIZE]
            .copy_from_slice(&consts::FONT_SET);
        ram
    }
}

impl Ram {
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn get(&self, address: usize) -> Result<u8> {
        self.buffer
            .get(address)
            .copied()
            .ok_or(Chip8Error::OutOfRange { address })
    }

    pub fn set(&mut self, address: usize, value: u8) -> Result<()> {
        let byte = self
            .buffer
            .get_mut(address)
            .ok_or(Chip8Error::OutOfRange { address })?;
        *byte = value;
        Ok(())
    }

    /// big-endian instruction word at `address`
    pub fn get_word(&self, address: usize) -> Result<u16> {
        let bytes = self.read_slice(address, consts::OP_CODE_BYTES)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// The whole range is checked before anything is returned; the error
    /// names the first address past the end of memory.
    pub fn read_slice(&self, address: usize, len: usize) -> Result<&[u8]> {
        let end = self.checked_end(address, len)?;
        Ok(&self.buffer[address..end])
    }

    pub fn write_slice(&mut self, address: usize, bytes: &[u8]) -> Result<()> {
        let end = self.checked_end(address, bytes.len())?;
        self.buffer[address..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Copies opaque program bytes in at `start`. Nothing is written when
    /// the bytes would not fit.
    pub fn load_bulk(&mut self, bytes: &[u8], start: usize) -> Result<()> {
        let capacity = self.capacity().saturating_sub(start);
        if bytes.len() > capacity {
            return Err(Chip8Error::ProgramTooLarge {
                size: bytes.len(),
                capacity,
            });
        }
        self.write_slice(start, bytes)
    }

    fn checked_end(&self, address: usize, len: usize) -> Result<usize> {
        let end = address
            .checked_add(len)
            .ok_or(Chip8Error::OutOfRange { address })?;
        if end > self.capacity() {
            return Err(Chip8Error::OutOfRange {
                address: address.max(self.capacity()),
            });
        }
        Ok(end)
    }
}

impl fmt::Display for Ram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        utils::hex_dump(f, &self.buffer, 32)
    }
}

/// Packed 64x32 monochrome frame: 32 rows of 8 bytes, MSB is the leftmost
/// pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBuffer {
    buffer: [u8; consts::DISPL_BYTES],
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        DisplayBuffer {
            buffer: [0; consts::DISPL_BYTES],
        }
    }
}

impl DisplayBuffer {
    pub fn clear(&mut self) {
        self.buffer.iter_mut().for_each(|b| *b = 0);
    }

    /// XOR `bits` into byte `index`; true when a lit pixel went dark.
    /// `index` is always produced modulo the buffer size by the caller.
    pub fn xor_byte(&mut self, index: usize, bits: u8) -> bool {
        let byte = &mut self.buffer[index % consts::DISPL_BYTES];
        let collision = *byte & bits != 0;
        *byte ^= bits;
        collision
    }

    pub fn as_bytes(&self) -> &[u8; consts::DISPL_BYTES] {
        &self.buffer
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        if !(x < consts::DISPL_WIDTH && y < consts::DISPL_HEIGHT) {
            return false;
        }
        let byte = self.buffer[y * consts::DISPL_ROW_BYTES + x / 8];
        byte & (0x80 >> (x % 8)) != 0
    }
}

impl fmt::Display for DisplayBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        utils::hex_dump(f, &self.buffer, consts::DISPL_ROW_BYTES)
    }
}

/// Host-reported key state: the key currently held, if any.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardBuffer {
    held: Option<u8>,
}

impl KeyboardBuffer {
    pub fn press(&mut self, key: u8) {
        self.held = Some(key);
    }

    pub fn release(&mut self) {
        self.held = None;
    }

    /// Held key, restricted to the 16 keypad digits.
    pub fn held(&self) -> Option<u8> {
        self.held
            .filter(|key| (*key as usize) < consts::KEYBOARD_SIZE)
    }

    pub fn is_pressed(&self, key: u8) -> bool {
        self.held() == Some(key)
    }
}
