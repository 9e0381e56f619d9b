/*++

Licensed under the Apache-2.0 license.

File Name:

    hart.rs

Abstract:

    Emulated machine-mode hart: PMP CSRs, RAM, and synchronous dispatch of
    store access faults to the registered trap handler.

--*/

use crate::pmp::{Access, PmpCsrFile, PrivMode, Xlen};
use crate::ram::Ram;
use pmp_probe_cpu::{
    Diverted, Exception, Hart, Memory, PmpCsrs, TrapHandler, TrapRecord, PMP_ADDR_COUNT,
};

pub struct EmuHart<'h> {
    csrs: PmpCsrFile,
    ram: Ram,
    trap_handler: Option<&'h dyn TrapHandler>,
    exit_code: Option<u32>,
    traps: Vec<TrapRecord>,

    // Fault injection
    pmp_enforced: bool,
    commit_faulting_stores: bool,
    fault_unmapped: bool,
    stuck_pmpaddr: Option<(usize, usize)>,
}

impl<'h> EmuHart<'h> {
    /// Create a hart with `ram_size` bytes of zeroed RAM at `ram_base`.
    pub fn new(xlen: Xlen, ram_base: usize, ram_size: usize) -> Self {
        Self {
            csrs: PmpCsrFile::new(xlen),
            ram: Ram::new(ram_base, vec![0; ram_size]),
            trap_handler: None,
            exit_code: None,
            traps: Vec::new(),
            pmp_enforced: true,
            commit_faulting_stores: false,
            fault_unmapped: false,
            stuck_pmpaddr: None,
        }
    }

    /// Hart with the memory map of the Arty E31 design: DTIM0 and DTIM1.
    pub fn arty(xlen: Xlen) -> Self {
        use pmp_probe_drivers::memory_layout::{DTIM0_ORG, DTIM0_SIZE, DTIM1_SIZE};
        Self::new(xlen, DTIM0_ORG, DTIM0_SIZE + DTIM1_SIZE)
    }

    /// Ignore the PMP when checking stores, as a core without PMP would.
    pub fn with_pmp_enforced(mut self, enforced: bool) -> Self {
        self.pmp_enforced = enforced;
        self
    }

    /// Let a store that violates the PMP reach memory before the fault is
    /// raised.
    pub fn with_commit_faulting_stores(mut self, commit: bool) -> Self {
        self.commit_faulting_stores = commit;
        self
    }

    /// Raise a store access fault for stores outside RAM instead of
    /// dropping them.
    pub fn with_fault_unmapped(mut self, fault: bool) -> Self {
        self.fault_unmapped = fault;
        self
    }

    /// `pmpaddr{index}` ignores writes and always reads `value`.
    pub fn with_stuck_pmpaddr(mut self, index: usize, value: usize) -> Self {
        self.stuck_pmpaddr = Some((index, value));
        self
    }

    /// Exit status reported by the trap handler, if it ran.
    pub fn exit_code(&self) -> Option<u32> {
        self.exit_code
    }

    /// Every trap raised so far, oldest first.
    pub fn traps(&self) -> &[TrapRecord] {
        &self.traps
    }

    pub fn csrs(&self) -> &PmpCsrFile {
        &self.csrs
    }

    /// Read RAM without a PMP check.
    pub fn peek(&self, addr: usize) -> u32 {
        self.ram.read_u32(addr)
    }

    fn raise(&mut self, exception_code: u32, mtval: usize) -> Diverted {
        let record = TrapRecord {
            mcause: exception_code as usize,
            mepc: 0,
            mtval,
        };
        self.traps.push(record);
        if let Some(handler) = self.trap_handler {
            self.exit_code = Some(handler.handle_trap(&record, &*self));
        }
        Diverted
    }
}

impl PmpCsrs for EmuHart<'_> {
    fn read_pmpaddr(&self, index: usize) -> usize {
        match self.stuck_pmpaddr {
            Some((stuck, value)) if stuck == index => value,
            _ => self.csrs.read_addr(index) as usize,
        }
    }

    unsafe fn write_pmpaddr(&mut self, index: usize, value: usize) {
        if index >= PMP_ADDR_COUNT || matches!(self.stuck_pmpaddr, Some((stuck, _)) if stuck == index)
        {
            return;
        }
        self.csrs.write_addr(index, value as u64);
    }

    fn read_pmpcfg(&self, index: usize) -> usize {
        self.csrs.read_cfg(index) as usize
    }

    unsafe fn write_pmpcfg(&mut self, index: usize, value: usize) {
        self.csrs.write_cfg(index, value as u64);
    }
}

impl Memory for EmuHart<'_> {
    /// Loads are not checked against the PMP.
    fn read_u32(&self, addr: usize) -> u32 {
        self.ram.read_u32(addr)
    }

    fn write_u32(&mut self, addr: usize, value: u32) -> Result<(), Diverted> {
        const STORE_ACCESS_FAULT: u32 = Exception::STORE_ACCESS_FAULT_CODE;

        let permitted = !self.pmp_enforced
            || self
                .csrs
                .check(addr as u64, 4, Access::Write, PrivMode::M);
        if !permitted {
            if self.commit_faulting_stores {
                self.ram.write_u32(addr, value);
            }
            return Err(self.raise(STORE_ACCESS_FAULT, addr));
        }

        if !self.ram.write_u32(addr, value) && self.fault_unmapped {
            return Err(self.raise(STORE_ACCESS_FAULT, addr));
        }
        Ok(())
    }
}

impl<'h> Hart<'h> for EmuHart<'h> {
    fn register_trap_handler(&mut self, handler: &'h dyn TrapHandler) {
        self.trap_handler = Some(handler);
    }
}
