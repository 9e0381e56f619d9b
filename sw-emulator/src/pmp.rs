/*++

Licensed under the Apache-2.0 license.

File Name:

    pmp.rs

Abstract:

    PMP CSR file and access check of the emulated hart.

--*/

use pmp_probe_cpu::PMP_ADDR_COUNT;
use pmp_probe_drivers::{AddrMode, PmpCfg};

/// Register width of the emulated hart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Xlen {
    Rv32,
    Rv64,
}

impl Xlen {
    /// PMP entries packed into one `pmpcfg` register.
    pub fn cfg_entries(&self) -> usize {
        match self {
            Xlen::Rv32 => 4,
            Xlen::Rv64 => 8,
        }
    }

    /// Number of `pmpcfg` registers holding the 16 entries.
    pub fn cfg_count(&self) -> usize {
        PMP_ADDR_COUNT / self.cfg_entries()
    }

    /// Implemented bits of a `pmpaddr` register.
    fn addr_mask(&self) -> u64 {
        match self {
            // Bits 33:2 of a 34-bit physical address.
            Xlen::Rv32 => 0xFFFF_FFFF,
            // Bits 55:2 of a 56-bit physical address.
            Xlen::Rv64 => (1 << 54) - 1,
        }
    }
}

/// Privilege mode of an access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivMode {
    U,
    M,
}

/// Memory access type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    Execute,
}

pub struct PmpCsrFile {
    xlen: Xlen,
    addr: [u64; PMP_ADDR_COUNT],
    cfg: [PmpCfg; PMP_ADDR_COUNT],
}

impl PmpCsrFile {
    pub fn new(xlen: Xlen) -> Self {
        Self {
            xlen,
            addr: [0; PMP_ADDR_COUNT],
            cfg: [PmpCfg::off(); PMP_ADDR_COUNT],
        }
    }

    pub fn xlen(&self) -> Xlen {
        self.xlen
    }

    pub fn entry(&self, index: usize) -> PmpCfg {
        self.cfg[index]
    }

    pub fn read_addr(&self, index: usize) -> u64 {
        self.addr.get(index).copied().unwrap_or(0)
    }

    /// Write `pmpaddr{index}`. Ignored when the entry is locked, or when the
    /// next entry is a locked top-of-range entry using it as its base.
    pub fn write_addr(&mut self, index: usize, val: u64) {
        if index >= PMP_ADDR_COUNT || self.addr_locked(index) {
            return;
        }
        self.addr[index] = val & self.xlen.addr_mask();
    }

    pub fn read_cfg(&self, index: usize) -> u64 {
        let count = self.xlen.cfg_entries();
        if index >= self.xlen.cfg_count() {
            return 0;
        }
        self.cfg[index * count..(index + 1) * count]
            .iter()
            .enumerate()
            .fold(0, |bits, (i, cfg)| bits | (u64::from(cfg.bits()) << (8 * i)))
    }

    /// Write the logical `pmpcfg{index}`. Locked entries keep their value.
    pub fn write_cfg(&mut self, index: usize, val: u64) {
        let count = self.xlen.cfg_entries();
        if index >= self.xlen.cfg_count() {
            return;
        }
        for i in 0..count {
            let entry = &mut self.cfg[index * count + i];
            if !entry.lock() {
                *entry = PmpCfg::from((val >> (8 * i)) as u8);
            }
        }
    }

    fn addr_locked(&self, index: usize) -> bool {
        if self.cfg[index].lock() {
            return true;
        }
        match self.cfg.get(index + 1) {
            Some(next) => next.lock() && next.addr_mode() == AddrMode::Tor,
            None => false,
        }
    }

    /// Byte range `[lo, hi)` covered by entry `index`, or `None` when off.
    fn range(&self, index: usize) -> Option<(u64, u64)> {
        let addr = self.addr[index];
        match self.cfg[index].addr_mode() {
            AddrMode::Off => None,
            AddrMode::Tor => {
                let lo = if index == 0 {
                    0
                } else {
                    self.addr[index - 1] << 2
                };
                Some((lo, addr << 2))
            }
            AddrMode::Na4 => Some((addr << 2, (addr << 2) + 4)),
            AddrMode::Napot => {
                let ones = addr.trailing_ones();
                let base = (addr & !((1u64 << ones) - 1)) << 2;
                Some((base, base + (8u64 << ones)))
            }
        }
    }

    /// Lowest-numbered entry matching any byte of `[addr, addr + len)`.
    /// The flag is true when the entry covers every byte.
    pub fn match_addr(&self, addr: u64, len: u64) -> Option<(usize, bool)> {
        let end = addr + len;
        (0..PMP_ADDR_COUNT).find_map(|index| {
            let (lo, hi) = self.range(index)?;
            if addr < hi && lo < end {
                Some((index, lo <= addr && end <= hi))
            } else {
                None
            }
        })
    }

    /// Whether an access of `len` bytes at `addr` is permitted.
    pub fn check(&self, addr: u64, len: u64, access: Access, priv_mode: PrivMode) -> bool {
        match self.match_addr(addr, len) {
            Some((_, false)) => false,
            Some((index, true)) => {
                let cfg = self.cfg[index];
                let allowed = match access {
                    Access::Read => cfg.read(),
                    Access::Write => cfg.write(),
                    Access::Execute => cfg.execute(),
                };
                allowed || (priv_mode == PrivMode::M && !cfg.lock())
            }
            None => priv_mode == PrivMode::M,
        }
    }
}
