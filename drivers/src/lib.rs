/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the PMP probe drivers.

--*/

#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod exit_ctrl;
pub mod memory_layout;
pub mod pmp;
pub mod printer;

pub use exit_ctrl::ExitCtrl;
pub use pmp::{
    encode_addr, AddrMode, Permission, Pmp, PmpCfg, PmpCfgCsr, PmpCfgCsr32, PmpCfgCsr64,
    Region, RegionTable, VerifyReport,
};

cfg_if::cfg_if! {
    if #[cfg(feature = "uart")] {
        mod uart;

        pub use uart::Uart;
    }
}
