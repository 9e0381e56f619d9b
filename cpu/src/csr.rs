// Licensed under the Apache-2.0 license

/// Number of `pmpaddr` registers defined by the privileged architecture.
pub const PMP_ADDR_COUNT: usize = 16;

/// Number of 8-bit PMP entries packed into one `pmpcfg` register.
pub const PMP_CFG_ENTRIES_PER_CSR: usize = core::mem::size_of::<usize>();

/// Indexed access to the PMP control and status registers.
///
/// `pmpcfg` indices are logical: index `i` holds entries
/// `i * PMP_CFG_ENTRIES_PER_CSR ..`. On RV64 that is `pmpcfg0`, `pmpcfg2`, ...
///
/// Writes are unsafe: a locked entry is immutable until reset, and a wrong
/// permission can remove access to the code or stack of the running hart.
pub trait PmpCsrs {
    fn read_pmpaddr(&self, index: usize) -> usize;

    /// # Safety
    ///
    /// See the trait documentation.
    unsafe fn write_pmpaddr(&mut self, index: usize, value: usize);

    fn read_pmpcfg(&self, index: usize) -> usize;

    /// # Safety
    ///
    /// See the trait documentation.
    unsafe fn write_pmpcfg(&mut self, index: usize, value: usize);
}

#[cfg(feature = "riscv")]
mod machine {
    use super::PmpCsrs;
    use crate::TrapRecord;
    use riscv::register::{
        mcause, mepc, mtval, mtvec, pmpaddr0, pmpaddr1, pmpaddr10, pmpaddr11, pmpaddr12,
        pmpaddr13, pmpaddr14, pmpaddr15, pmpaddr2, pmpaddr3, pmpaddr4, pmpaddr5, pmpaddr6,
        pmpaddr7, pmpaddr8, pmpaddr9, pmpcfg0, pmpcfg2,
    };
    #[cfg(target_arch = "riscv32")]
    use riscv::register::{pmpcfg1, pmpcfg3};

    /// The PMP registers of the hart executing this code.
    #[derive(Default)]
    pub struct MachineCsrs {}

    impl MachineCsrs {
        pub fn new() -> Self {
            Self {}
        }
    }

    impl PmpCsrs for MachineCsrs {
        fn read_pmpaddr(&self, index: usize) -> usize {
            match index {
                0 => pmpaddr0::read(),
                1 => pmpaddr1::read(),
                2 => pmpaddr2::read(),
                3 => pmpaddr3::read(),
                4 => pmpaddr4::read(),
                5 => pmpaddr5::read(),
                6 => pmpaddr6::read(),
                7 => pmpaddr7::read(),
                8 => pmpaddr8::read(),
                9 => pmpaddr9::read(),
                10 => pmpaddr10::read(),
                11 => pmpaddr11::read(),
                12 => pmpaddr12::read(),
                13 => pmpaddr13::read(),
                14 => pmpaddr14::read(),
                15 => pmpaddr15::read(),
                _ => 0,
            }
        }

        unsafe fn write_pmpaddr(&mut self, index: usize, value: usize) {
            match index {
                0 => pmpaddr0::write(value),
                1 => pmpaddr1::write(value),
                2 => pmpaddr2::write(value),
                3 => pmpaddr3::write(value),
                4 => pmpaddr4::write(value),
                5 => pmpaddr5::write(value),
                6 => pmpaddr6::write(value),
                7 => pmpaddr7::write(value),
                8 => pmpaddr8::write(value),
                9 => pmpaddr9::write(value),
                10 => pmpaddr10::write(value),
                11 => pmpaddr11::write(value),
                12 => pmpaddr12::write(value),
                13 => pmpaddr13::write(value),
                14 => pmpaddr14::write(value),
                15 => pmpaddr15::write(value),
                _ => {}
            }
        }

        #[cfg(target_arch = "riscv32")]
        fn read_pmpcfg(&self, index: usize) -> usize {
            match index {
                0 => pmpcfg0::read().bits,
                1 => pmpcfg1::read().bits,
                2 => pmpcfg2::read().bits,
                3 => pmpcfg3::read().bits,
                _ => 0,
            }
        }

        #[cfg(not(target_arch = "riscv32"))]
        fn read_pmpcfg(&self, index: usize) -> usize {
            match index {
                0 => pmpcfg0::read().bits,
                1 => pmpcfg2::read().bits,
                _ => 0,
            }
        }

        #[cfg(target_arch = "riscv32")]
        unsafe fn write_pmpcfg(&mut self, index: usize, value: usize) {
            match index {
                0 => pmpcfg0::write(value),
                1 => pmpcfg1::write(value),
                2 => pmpcfg2::write(value),
                3 => pmpcfg3::write(value),
                _ => {}
            }
        }

        #[cfg(not(target_arch = "riscv32"))]
        unsafe fn write_pmpcfg(&mut self, index: usize, value: usize) {
            match index {
                0 => pmpcfg0::write(value),
                1 => pmpcfg2::write(value),
                _ => {}
            }
        }
    }

    /// Read the trap CSRs. Only meaningful from a trap handler.
    pub fn read_trap_record() -> TrapRecord {
        TrapRecord {
            mcause: mcause::read().bits(),
            mepc: mepc::read(),
            mtval: mtval::read(),
        }
    }

    /// Point `mtvec` at `base` in direct (non-vectored) mode.
    ///
    /// # Safety
    ///
    /// `base` must be the 4-byte aligned address of trap entry code.
    pub unsafe fn set_trap_vector(base: usize) {
        mtvec::write(base, mtvec::TrapMode::Direct);
    }
}

#[cfg(feature = "riscv")]
pub use machine::{read_trap_record, set_trap_vector, MachineCsrs};
