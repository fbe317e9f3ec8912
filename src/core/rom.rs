use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

use crate::consts;
use crate::error::{Chip8Error, Result};

/// A raw program image. No header and no validation: the bytes are copied
/// verbatim into memory at the load address.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Rom {
    pub buffer: Vec<u8>,
}

impl Rom {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut buffer = Vec::new();
        let mut file = File::open(path)?;
        file.read_to_end(&mut buffer)?;
        Self::from_bytes(&buffer)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > consts::MAX_ROM_BYTES {
            return Err(Chip8Error::ProgramTooLarge {
                size: bytes.len(),
                capacity: consts::MAX_ROM_BYTES,
            });
        }
        Ok(Rom {
            buffer: bytes.to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes() -> Result<()> {
        let rom = Rom::from_bytes(&[0x00, 0xE0])?;
        assert_eq!(rom.buffer, vec![0x00, 0xE0]);
        assert_eq!(rom.len(), 2);
        Ok(())
    }

    #[test]
    fn test_rejects_oversized_image() {
        let bytes = vec![0; consts::MAX_ROM_BYTES + 1];
        assert!(matches!(
            Rom::from_bytes(&bytes),
            Err(Chip8Error::ProgramTooLarge { .. })
        ));
    }

    #[test]
    fn test_reads_file() -> Result<()> {
        let path = std::env::temp_dir().join(format!("chip8-rom-{}.ch8", std::process::id()));
        std::fs::write(&path, [0x12, 0x00])?;
        let rom = Rom::new(&path);
        std::fs::remove_file(&path)?;
        assert_eq!(rom?.buffer, vec![0x12, 0x00]);
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Rom::new("/nonexistent/rom.ch8"),
            Err(Chip8Error::Io(_))
        ));
    }
}
