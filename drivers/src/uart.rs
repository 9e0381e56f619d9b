/*++

Licensed under the Apache-2.0 license.

File Name:

    uart.rs

Abstract:

    File contains API for writing to the SiFive UART0

References:
    https://os.phil-opp.com/vga-text-mode for output functionality.

--*/

use crate::memory_layout::UART0_ORG;

/// SiFive UART transmit port
#[derive(Default, Debug)]
pub struct Uart {}

impl Uart {
    const TXDATA: *mut u32 = UART0_ORG as *mut u32;
    const TXDATA_FULL: u32 = 1 << 31;

    /// Create an instance of the UART
    pub fn new() -> Self {
        Self {}
    }

    /// Write the string to UART
    ///
    /// # Arguments
    ///
    /// `str` - String to write to UART
    pub fn write(&mut self, str: &str) {
        for byte in str.bytes() {
            match byte {
                0x20..=0x7e | b'\n' | b'\t' => self.write_byte(byte),
                _ => self.write_byte(0xfe),
            }
        }
    }

    /// Write the byte to UART
    ///
    /// # Arguments
    ///
    /// `byte` - Byte to write to UART
    pub fn write_byte(&mut self, byte: u8) {
        unsafe {
            while core::ptr::read_volatile(Self::TXDATA) & Self::TXDATA_FULL != 0 {}
            core::ptr::write_volatile(Self::TXDATA, byte as u32);
        }
    }
}
