// Licensed under the Apache-2.0 license

#![cfg_attr(not(test), no_std)]

pub mod csr;
pub mod hart;
pub mod trap;

pub use csr::{PmpCsrs, PMP_ADDR_COUNT, PMP_CFG_ENTRIES_PER_CSR};
pub use hart::{Diverted, Hart, Memory, TrapHandler};
pub use trap::{Exception, Interrupt, Trap, TrapRecord};

#[cfg(feature = "riscv")]
pub use csr::{read_trap_record, set_trap_vector, MachineCsrs};
#[cfg(feature = "riscv")]
pub use hart::{dispatch_trap, MachineHart, MachineMemory};
