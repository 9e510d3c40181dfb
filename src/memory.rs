//! The addressable ram of the chip.
use crate::{
    definitions::{display::fontset, memory},
    MemoryError,
};

/// - `0x000-0x04F` - Used for the built in `4x5` pixel font set (`0-F`)
/// - `0x050-0x1FF` - Reserved for the interpreter
/// - `0x200-0xFFF` - Program ROM and work RAM
///
/// Every access is bounds checked, nothing wraps around.
#[derive(Clone, PartialEq, Eq)]
pub struct Memory {
    data: Vec<u8>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory").field("len", &self.data.len()).finish()
    }
}

impl Memory {
    /// Will create the zeroed ram with the font set already in place.
    pub fn new() -> Self {
        let mut data = vec![0; memory::SIZE];
        data[fontset::LOCATION..(fontset::LOCATION + fontset::FONTSET.len())]
            .copy_from_slice(&fontset::FONTSET);
        Self { data }
    }

    /// Copies the given image into memory starting at `origin`.
    pub fn load(&mut self, origin: usize, bytes: &[u8]) -> Result<(), MemoryError> {
        self.slice_mut(origin, bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    pub fn read(&self, address: usize) -> Result<u8, MemoryError> {
        self.data
            .get(address)
            .copied()
            .ok_or(MemoryError::OutOfBounds(address))
    }

    pub fn write(&mut self, address: usize, value: u8) -> Result<(), MemoryError> {
        let cell = self
            .data
            .get_mut(address)
            .ok_or(MemoryError::OutOfBounds(address))?;
        *cell = value;
        Ok(())
    }

    /// Returns the `count` bytes starting at `address`.
    ///
    /// # Example
    /// ```rust
    /// # use chip::memory::Memory;
    /// # use chip::MemoryError;
    /// let memory = Memory::new();
    /// // the glyph for the `0` is at the very start
    /// assert_eq!(memory.slice(0, 5), Ok(&[0xF0, 0x90, 0x90, 0x90, 0xF0][..]));
    /// assert_eq!(memory.slice(0xFFE, 3), Err(MemoryError::OutOfBounds(0x1000)));
    /// ```
    pub fn slice(&self, address: usize, count: usize) -> Result<&[u8], MemoryError> {
        let end = Self::end(address, count)?;
        Ok(&self.data[address..end])
    }

    pub fn slice_mut(&mut self, address: usize, count: usize) -> Result<&mut [u8], MemoryError> {
        let end = Self::end(address, count)?;
        Ok(&mut self.data[address..end])
    }

    /// The whole ram as a slice, used for printing.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Checks the range and returns its exclusive end.
    fn end(address: usize, count: usize) -> Result<usize, MemoryError> {
        let end = address
            .checked_add(count)
            .ok_or(MemoryError::OutOfBounds(address))?;
        if end > memory::SIZE {
            // report the first address that does not exist
            Err(MemoryError::OutOfBounds(address.max(memory::SIZE)))
        } else {
            Ok(end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::cpu;

    #[test]
    fn test_font_loaded() {
        let memory = Memory::new();
        assert_eq!(memory.len(), memory::SIZE);
        assert_eq!(
            &memory.as_slice()[..fontset::FONTSET.len()],
            &fontset::FONTSET[..]
        );
        // glyph `F` is the last one
        assert_eq!(memory.slice(15 * 5, 5), Ok(&[0xF0, 0x80, 0xF0, 0x80, 0x80][..]));
        // everything behind the font is empty
        assert!(memory.as_slice()[fontset::FONTSET.len()..]
            .iter()
            .all(|&b| b == 0));
    }

    #[test]
    fn test_load() {
        let mut memory = Memory::new();
        let rom = [0x12, 0x34, 0x56];
        assert_eq!(memory.load(cpu::PROGRAM_COUNTER, &rom), Ok(()));
        assert_eq!(memory.slice(cpu::PROGRAM_COUNTER, 3), Ok(&rom[..]));
        // trailing bytes keep their value
        assert_eq!(memory.read(cpu::PROGRAM_COUNTER + 3), Ok(0));
    }

    #[test]
    fn test_load_exact_fit_and_too_large() {
        let mut memory = Memory::new();
        let max = memory::SIZE - cpu::PROGRAM_COUNTER;
        assert_eq!(memory.load(cpu::PROGRAM_COUNTER, &vec![0xAB; max]), Ok(()));
        assert_eq!(memory.read(memory::SIZE - 1), Ok(0xAB));

        let mut memory = Memory::new();
        assert_eq!(
            memory.load(cpu::PROGRAM_COUNTER, &vec![0xAB; max + 1]),
            Err(MemoryError::OutOfBounds(memory::SIZE))
        );
        // nothing was written
        assert_eq!(memory.read(cpu::PROGRAM_COUNTER), Ok(0));
    }

    #[test]
    fn test_read_write_bounds() {
        let mut memory = Memory::new();
        assert_eq!(memory.write(0xFFF, 0x42), Ok(()));
        assert_eq!(memory.read(0xFFF), Ok(0x42));
        assert_eq!(memory.read(0x1000), Err(MemoryError::OutOfBounds(0x1000)));
        assert_eq!(
            memory.write(0x1000, 1),
            Err(MemoryError::OutOfBounds(0x1000))
        );
    }

    #[test]
    fn test_slice_bounds() {
        let memory = Memory::new();
        assert!(memory.slice(0xFFF, 1).is_ok());
        assert_eq!(memory.slice(0x1000, 0), Ok(&[][..]));
        assert_eq!(memory.slice(0x1001, 0), Err(MemoryError::OutOfBounds(0x1001)));
        assert_eq!(memory.slice(usize::MAX, 2), Err(MemoryError::OutOfBounds(usize::MAX)));
    }
}
