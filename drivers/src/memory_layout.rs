/*++
Licensed under the Apache-2.0 license.

File Name:

    memory_layout.rs

Abstract:

    The file contains the layout of memory. The constants defined
    in this file define the memory layout of the Arty FPGA E31 design
    the probe targets.

--*/

//
// Memory Addresses
//
pub const EXIT_CTRL_ORG: usize = 0x0010_0000;
pub const UART0_ORG: usize = 0x1001_3000;
pub const SPI_FLASH_ORG: usize = 0x4040_0000;
pub const DTIM0_ORG: usize = 0x8000_0000;
pub const DTIM1_ORG: usize = 0x8000_8000;

//
// Memory Sizes In Bytes
//
pub const DTIM0_SIZE: usize = 32 * 1024;
pub const DTIM1_SIZE: usize = 32 * 1024;

/// RAM word the probe writes to. Must be writable memory before protection
/// is enabled.
pub const TEST_TARGET_ADDR: usize = DTIM0_ORG + 0x100;

/// End of the memory covered by the PMP table.
pub const DTIM_END: usize = DTIM1_ORG + DTIM1_SIZE;

#[test]
#[allow(clippy::assertions_on_constants)]
fn mem_layout_test_target() {
    assert!(TEST_TARGET_ADDR >= DTIM0_ORG);
    assert!(TEST_TARGET_ADDR + 4 <= DTIM0_ORG + DTIM0_SIZE);
    assert_eq!(TEST_TARGET_ADDR % 4, 0);
}

#[test]
#[allow(clippy::assertions_on_constants)]
fn mem_layout_dtim() {
    assert_eq!(DTIM0_ORG + DTIM0_SIZE, DTIM1_ORG);
    assert_eq!(DTIM_END, 0x8001_0000);
    assert!(SPI_FLASH_ORG < DTIM0_ORG);
}
