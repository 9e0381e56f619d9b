/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    Host model of a machine-mode RISC-V hart with PMP, used to run the
    probe without hardware.

--*/

mod hart;
mod pmp;
mod ram;

pub use hart::EmuHart;
pub use pmp::{Access, PmpCsrFile, PrivMode, Xlen};
pub use ram::Ram;
