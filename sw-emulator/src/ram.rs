/*++

Licensed under the Apache-2.0 license.

File Name:

    ram.rs

Abstract:

    File contains implementation of RAM

--*/

/// Random Access Memory Device mapped at a fixed base address
pub struct Ram {
    base: usize,
    data: Vec<u8>,
}

impl Ram {
    /// Create new RAM
    ///
    /// # Arguments
    ///
    /// * `base` - Physical address of the first byte
    /// * `data` - Initial contents
    pub fn new(base: usize, data: Vec<u8>) -> Self {
        Self { base, data }
    }

    pub fn base(&self) -> usize {
        self.base
    }

    pub fn mmap_size(&self) -> usize {
        self.data.len()
    }

    /// True when `len` bytes starting at `addr` are backed by this RAM.
    pub fn contains(&self, addr: usize, len: usize) -> bool {
        addr >= self.base
            && addr
                .checked_add(len)
                .map_or(false, |end| end <= self.base + self.data.len())
    }

    /// Read a little-endian word. Unbacked addresses read as zero.
    pub fn read_u32(&self, addr: usize) -> u32 {
        if !self.contains(addr, 4) {
            return 0;
        }
        let offset = addr - self.base;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.data[offset..offset + 4]);
        u32::from_le_bytes(bytes)
    }

    /// Write a little-endian word. Returns false for unbacked addresses.
    pub fn write_u32(&mut self, addr: usize, val: u32) -> bool {
        if !self.contains(addr, 4) {
            return false;
        }
        let offset = addr - self.base;
        self.data[offset..offset + 4].copy_from_slice(&val.to_le_bytes());
        true
    }
}
