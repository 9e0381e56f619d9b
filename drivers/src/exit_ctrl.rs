/*++

Licensed under the Apache-2.0 license.

File Name:

    exit_ctrl.rs

Abstract:

    File contains API for ending the probe with an exit status

--*/

use crate::memory_layout::EXIT_CTRL_ORG;

/// Exit control
pub enum ExitCtrl {}

impl ExitCtrl {
    const FINISHER_PASS: u32 = 0x5555;
    const FINISHER_FAIL: u32 = 0x3333;

    /// Value written to the test finisher for `exit_code`.
    pub const fn finisher_value(exit_code: u32) -> u32 {
        if exit_code == 0 {
            Self::FINISHER_PASS
        } else {
            (exit_code << 16) | Self::FINISHER_FAIL
        }
    }

    /// Exit the emulator
    ///
    /// # Arguments
    ///
    /// * `exit_code`: Code to exit the emulator process with
    ///
    /// # Returns
    ///
    /// This method does not return
    pub fn exit(exit_code: u32) -> ! {
        crate::cprintln!("Exit code: 0x{:X}", exit_code);

        if cfg!(feature = "emu") {
            const FINISHER: *mut u32 = EXIT_CTRL_ORG as *mut u32;
            unsafe {
                core::ptr::write_volatile(FINISHER, Self::finisher_value(exit_code));
            }
        }

        #[allow(clippy::empty_loop)]
        loop {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finisher_value() {
        assert_eq!(ExitCtrl::finisher_value(0), 0x5555);
        assert_eq!(ExitCtrl::finisher_value(0xFA), 0x00FA_3333);
        assert_eq!(ExitCtrl::finisher_value(0xFA17), 0xFA17_3333);
    }
}
