/*++

Licensed under the Apache-2.0 license.

File Name:

    pmp.rs

Abstract:

    PMP configuration model and the routine that programs a region table
    into the PMP CSRs and verifies it.

--*/

use bitfield::bitfield;
use bitflags::bitflags;
use pmp_probe_cpu::{PmpCsrs, PMP_ADDR_COUNT};
use pmp_probe_error::{ProbeError, ProbeResult};

use crate::cprintln;

bitflags! {
    /// Access permissions of a PMP entry.
    pub struct Permission: u8 {
        const R = 1 << 0;
        const W = 1 << 1;
        const X = 1 << 2;
        const RW = Self::R.bits | Self::W.bits;
        const RX = Self::R.bits | Self::X.bits;
        const WX = Self::W.bits | Self::X.bits;
        const RWX = Self::R.bits | Self::W.bits | Self::X.bits;
    }
}

/// PMP address matching modes
#[derive(Debug, PartialOrd, Ord, PartialEq, Eq, Clone, Copy)]
pub enum AddrMode {
    /// PMP entry disabled
    Off = 0b00,

    /// Top of range
    Tor = 0b01,

    /// Naturally aligned 4-byte region
    Na4 = 0b10,

    /// Naturally-aligned power of 2, 8 bytes or larger
    Napot = 0b11,
}

impl From<u8> for AddrMode {
    fn from(val: u8) -> Self {
        match val & 0b11 {
            0b00 => AddrMode::Off,
            0b01 => AddrMode::Tor,
            0b10 => AddrMode::Na4,
            _ => AddrMode::Napot,
        }
    }
}

impl From<AddrMode> for u8 {
    fn from(val: AddrMode) -> u8 {
        val as u8
    }
}

bitfield! {
    /// Configuration byte of one PMP entry
    #[derive(Clone, Copy, PartialEq, Eq, Default)]
    pub struct PmpCfg(u8);
    impl Debug;

    u8;

    /// Read bit
    pub read, set_read: 0;

    /// Write bit
    pub write, set_write: 1;

    /// Execute bit
    pub execute, set_execute: 2;

    /// Address mode
    pub from into AddrMode, addr_mode, set_addr_mode: 4, 3;

    /// Lock bit. Clears only on reset, and applies the permissions to
    /// machine mode.
    pub lock, set_lock: 7;
}

impl PmpCfg {
    const PERMISSION_MASK: u8 = 0b111;
    const ADDR_MODE_SHIFT: u8 = 3;
    const LOCK: u8 = 1 << 7;

    pub const fn new(permission: Permission, mode: AddrMode, lock: bool) -> Self {
        let lock = if lock { Self::LOCK } else { 0 };
        PmpCfg(permission.bits() | (mode as u8) << Self::ADDR_MODE_SHIFT | lock)
    }

    pub const fn off() -> Self {
        PmpCfg(0)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub fn permission(&self) -> Permission {
        Permission::from_bits_truncate(self.0 & Self::PERMISSION_MASK)
    }
}

impl From<u8> for PmpCfg {
    fn from(val: u8) -> PmpCfg {
        PmpCfg(val)
    }
}

impl From<PmpCfg> for u8 {
    fn from(val: PmpCfg) -> u8 {
        val.0
    }
}

/// One `pmpcfg` register: `N` entry bytes, entry `i` in bits `8i+7:8i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PmpCfgCsr<const N: usize> {
    entries: [PmpCfg; N],
}

/// `pmpcfg` layout of RV32 targets.
pub type PmpCfgCsr32 = PmpCfgCsr<4>;

/// `pmpcfg` layout of RV64 targets.
pub type PmpCfgCsr64 = PmpCfgCsr<8>;

impl<const N: usize> PmpCfgCsr<N> {
    pub const fn new(entries: [PmpCfg; N]) -> Self {
        assert!(N == 4 || N == 8, "a pmpcfg register holds 4 or 8 entries");
        Self { entries }
    }

    /// Unpack a raw register value. Bits above `8 * N` are ignored.
    pub const fn from_bits(bits: u64) -> Self {
        let mut entries = [PmpCfg(0); N];
        let mut i = 0;
        while i < N {
            entries[i] = PmpCfg((bits >> (8 * i)) as u8);
            i += 1;
        }
        Self::new(entries)
    }

    /// Pack the entries into the raw register value.
    pub const fn bits(&self) -> u64 {
        let mut bits = 0u64;
        let mut i = 0;
        while i < N {
            bits |= (self.entries[i].0 as u64) << (8 * i);
            i += 1;
        }
        bits
    }

    pub fn entry(&self, index: usize) -> PmpCfg {
        self.entries[index]
    }

    pub fn entries(&self) -> &[PmpCfg; N] {
        &self.entries
    }
}

/// `pmpaddr` encoding of a physical address: bits 33:2.
pub const fn encode_addr(phys: usize) -> usize {
    phys >> 2
}

/// One PMP entry: the encoded address register value and its configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub addr: usize,
    pub cfg: PmpCfg,
}

impl Region {
    /// Top-of-range entry ending (exclusive) at physical address `end`.
    pub const fn tor(end: usize, permission: Permission, lock: bool) -> Self {
        Self {
            addr: encode_addr(end),
            cfg: PmpCfg::new(permission, AddrMode::Tor, lock),
        }
    }

    pub const fn off() -> Self {
        Self {
            addr: 0,
            cfg: PmpCfg::off(),
        }
    }

    pub const fn is_off(&self) -> bool {
        self.cfg.0 & (0b11 << PmpCfg::ADDR_MODE_SHIFT) == 0
    }

    /// Physical address the entry's address register points at.
    pub const fn phys(&self) -> u64 {
        (self.addr as u64) << 2
    }
}

/// Ordered PMP entries programmed into `pmpaddr0..N` and `pmpcfg0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionTable<const N: usize> {
    regions: [Region; N],
}

impl<const N: usize> RegionTable<N> {
    pub const fn new(regions: [Region; N]) -> Self {
        assert!(N <= PMP_ADDR_COUNT);
        Self { regions }
    }

    pub fn regions(&self) -> &[Region; N] {
        &self.regions
    }

    /// True when the address registers of all enabled entries strictly
    /// increase. OFF entries are skipped.
    pub const fn is_ascending(&self) -> bool {
        let mut prev: Option<usize> = None;
        let mut i = 0;
        while i < N {
            let region = &self.regions[i];
            if !region.is_off() {
                if let Some(prev) = prev {
                    if region.addr <= prev {
                        return false;
                    }
                }
                prev = Some(region.addr);
            }
            i += 1;
        }
        true
    }

    pub fn validate(&self) -> ProbeResult<()> {
        if self.is_ascending() {
            Ok(())
        } else {
            Err(ProbeError::PMP_REGIONS_NOT_ASCENDING)
        }
    }

    /// The packed configuration register for this table.
    pub const fn cfg_csr(&self) -> PmpCfgCsr<N> {
        let mut entries = [PmpCfg(0); N];
        let mut i = 0;
        while i < N {
            entries[i] = self.regions[i].cfg;
            i += 1;
        }
        PmpCfgCsr::new(entries)
    }

    /// Index and entry of the lowest-numbered top-of-range entry covering
    /// `phys`, the entry the hardware would apply.
    pub fn governing(&self, phys: u64) -> Option<(usize, &Region)> {
        let mut lo = 0u64;
        for (index, region) in self.regions.iter().enumerate() {
            let hi = region.phys();
            if region.cfg.addr_mode() == AddrMode::Tor && lo <= phys && phys < hi {
                return Some((index, region));
            }
            lo = hi;
        }
        None
    }
}

/// Registers whose readback differed from the programmed value.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VerifyReport {
    addr_mismatches: u16,
    cfg_mismatch: bool,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.addr_mismatches == 0 && !self.cfg_mismatch
    }

    pub fn addr_mismatch(&self, index: usize) -> bool {
        self.addr_mismatches & (1 << index) != 0
    }

    pub fn cfg_mismatch(&self) -> bool {
        self.cfg_mismatch
    }

    pub fn mismatch_count(&self) -> u32 {
        self.addr_mismatches.count_ones() + u32::from(self.cfg_mismatch)
    }
}

/// PMP programming on top of a CSR interface
pub struct Pmp<'a, C: PmpCsrs + ?Sized> {
    csrs: &'a mut C,
}

impl<'a, C: PmpCsrs + ?Sized> Pmp<'a, C> {
    pub fn new(csrs: &'a mut C) -> Self {
        Self { csrs }
    }

    /// Program `table` and read every register back.
    ///
    /// Address registers are written highest index first, then `pmpcfg0`.
    /// A readback mismatch is logged and recorded in the report; it does not
    /// stop programming.
    ///
    /// # Safety
    ///
    /// Locked entries cannot be changed until reset. The table must leave the
    /// running code, its stack and its data accessible.
    pub unsafe fn program<const N: usize>(&mut self, table: &RegionTable<N>) -> VerifyReport {
        for (index, region) in table.regions().iter().enumerate().rev() {
            self.csrs.write_pmpaddr(index, region.addr);
        }
        let mut report = self.verify_addrs(table);

        let cfg = table.cfg_csr();
        self.csrs.write_pmpcfg(0, cfg.bits() as usize);
        report.cfg_mismatch = !self.verify_cfg(&cfg);

        report
    }

    /// Compare the address registers against `table`.
    pub fn verify_addrs<const N: usize>(&self, table: &RegionTable<N>) -> VerifyReport {
        let mut report = VerifyReport::default();
        for (index, region) in table.regions().iter().enumerate() {
            let read = self.csrs.read_pmpaddr(index);
            if read != region.addr {
                cprintln!(
                    "pmpaddr{} NOT OK! Expected: 0x{:08X}, Read: 0x{:08X}",
                    index,
                    region.addr,
                    read
                );
                report.addr_mismatches |= 1 << index;
            }
        }
        report
    }

    /// Compare `pmpcfg0` against `cfg`.
    pub fn verify_cfg<const N: usize>(&self, cfg: &PmpCfgCsr<N>) -> bool {
        let read = self.csrs.read_pmpcfg(0);
        let expected = cfg.bits() as usize;
        if read != expected {
            cprintln!(
                "pmpcfg0 NOT OK! Expected: 0x{:08X}, Read: 0x{:08X}",
                expected,
                read
            );
            return false;
        }
        true
    }
}
