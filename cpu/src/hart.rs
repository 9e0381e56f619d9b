/*++

Licensed under the Apache-2.0 license.

File Name:

    hart.rs

Abstract:

    Platform seams the probe runs against: word memory access, trap handler
    registration and PMP CSR access.

--*/

use crate::{PmpCsrs, TrapRecord};

/// Returned by a store that raised a synchronous exception. The platform has
/// already dispatched the trap to the registered handler and the handler has
/// ended the run; the caller must not continue its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diverted;

/// Word-sized physical memory access.
pub trait Memory {
    fn read_u32(&self, addr: usize) -> u32;

    /// Store `value` at `addr`.
    ///
    /// On hardware a faulting store never returns: the trap vector runs the
    /// registered handler, which terminates the program.
    fn write_u32(&mut self, addr: usize, value: u32) -> Result<(), Diverted>;
}

/// A trap handler registered with the platform.
pub trait TrapHandler {
    /// Decide the exit status for a trap. `memory` is the memory of the
    /// trapping hart, as seen from the handler.
    fn handle_trap(&self, record: &TrapRecord, memory: &dyn Memory) -> u32;
}

/// A hart the probe can configure and probe.
pub trait Hart<'h>: PmpCsrs + Memory {
    /// Install `handler` as the target of synchronous exceptions.
    fn register_trap_handler(&mut self, handler: &'h dyn TrapHandler);
}

#[cfg(feature = "riscv")]
mod machine {
    use super::{Diverted, Hart, Memory, TrapHandler};
    use crate::csr::{set_trap_vector, MachineCsrs};
    use crate::{PmpCsrs, TrapRecord};
    use core::cell::UnsafeCell;

    struct TrapSlot(UnsafeCell<Option<&'static dyn TrapHandler>>);

    // Single hart. The slot is written once, before the first store that can
    // trap, and only read from trap context afterwards.
    unsafe impl Sync for TrapSlot {}

    static TRAP_HANDLER: TrapSlot = TrapSlot(UnsafeCell::new(None));

    /// Volatile word access to physical memory.
    #[derive(Default)]
    pub struct MachineMemory {}

    impl Memory for MachineMemory {
        fn read_u32(&self, addr: usize) -> u32 {
            unsafe { core::ptr::read_volatile(addr as *const u32) }
        }

        fn write_u32(&mut self, addr: usize, value: u32) -> Result<(), Diverted> {
            unsafe { core::ptr::write_volatile(addr as *mut u32, value) };
            Ok(())
        }
    }

    /// The hart executing this code.
    pub struct MachineHart {
        csrs: MachineCsrs,
        memory: MachineMemory,
        vector_base: usize,
    }

    impl MachineHart {
        /// # Safety
        ///
        /// Only one instance may exist. `vector_base` must be the address of
        /// trap entry code that ends up in [`dispatch_trap`].
        pub unsafe fn new(vector_base: usize) -> Self {
            Self {
                csrs: MachineCsrs::new(),
                memory: MachineMemory::default(),
                vector_base,
            }
        }
    }

    impl PmpCsrs for MachineHart {
        fn read_pmpaddr(&self, index: usize) -> usize {
            self.csrs.read_pmpaddr(index)
        }

        unsafe fn write_pmpaddr(&mut self, index: usize, value: usize) {
            self.csrs.write_pmpaddr(index, value)
        }

        fn read_pmpcfg(&self, index: usize) -> usize {
            self.csrs.read_pmpcfg(index)
        }

        unsafe fn write_pmpcfg(&mut self, index: usize, value: usize) {
            self.csrs.write_pmpcfg(index, value)
        }
    }

    impl Memory for MachineHart {
        fn read_u32(&self, addr: usize) -> u32 {
            self.memory.read_u32(addr)
        }

        fn write_u32(&mut self, addr: usize, value: u32) -> Result<(), Diverted> {
            self.memory.write_u32(addr, value)
        }
    }

    impl Hart<'static> for MachineHart {
        fn register_trap_handler(&mut self, handler: &'static dyn TrapHandler) {
            unsafe {
                *TRAP_HANDLER.0.get() = Some(handler);
                set_trap_vector(self.vector_base);
            }
        }
    }

    /// Run the registered handler for `record`. Returns `None` when no
    /// handler was registered.
    pub fn dispatch_trap(record: &TrapRecord) -> Option<u32> {
        let handler = unsafe { *TRAP_HANDLER.0.get() }?;
        Some(handler.handle_trap(record, &MachineMemory::default()))
    }
}

#[cfg(feature = "riscv")]
pub use machine::{dispatch_trap, MachineHart, MachineMemory};
