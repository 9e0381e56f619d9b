/*++

Licensed under the Apache-2.0 license.

File Name:

    regions.rs

Abstract:

    PMP region table of the probe.

    0x0000_0000 - 0x4040_0000  RWX  debug region and MMIO    (pmp0cfg)
    0x4040_0000 - 0x8000_0100  RX   code in SPI flash        (pmp1cfg)
    0x8000_0100 - 0x8000_8000  RX   DTIM0, write removed     (pmp2cfg)
    0x8000_8000 - 0x8001_0000  RWX  DTIM1, data and stack    (pmp3cfg)

    Every entry is locked so the permissions apply to machine mode.

--*/

use pmp_probe_drivers::memory_layout::{DTIM1_ORG, DTIM_END, SPI_FLASH_ORG, TEST_TARGET_ADDR};
use pmp_probe_drivers::{Permission, Region, RegionTable};

const DEBUG_MMIO: Region = Region::tor(SPI_FLASH_ORG, Permission::RWX, true);
const FLASH_CODE: Region = Region::tor(TEST_TARGET_ADDR, Permission::RX, true);
const DTIM0_PROTECTED: Region = Region::tor(DTIM1_ORG, Permission::RX, true);
const DTIM1_DATA: Region = Region::tor(DTIM_END, Permission::RWX, true);

/// One `pmpcfg0` worth of entries on RV32.
pub const PROBE_REGIONS_RV32: RegionTable<4> =
    RegionTable::new([DEBUG_MMIO, FLASH_CODE, DTIM0_PROTECTED, DTIM1_DATA]);

/// On RV64 `pmpcfg0` packs eight entries; the upper four stay off.
pub const PROBE_REGIONS_RV64: RegionTable<8> = RegionTable::new([
    DEBUG_MMIO,
    FLASH_CODE,
    DTIM0_PROTECTED,
    DTIM1_DATA,
    Region::off(),
    Region::off(),
    Region::off(),
    Region::off(),
]);

const _: () = assert!(PROBE_REGIONS_RV32.is_ascending());
const _: () = assert!(PROBE_REGIONS_RV64.is_ascending());

cfg_if::cfg_if! {
    if #[cfg(target_pointer_width = "32")] {
        pub const PMP_REGION_COUNT: usize = 4;
        pub const PROBE_REGIONS: RegionTable<PMP_REGION_COUNT> = PROBE_REGIONS_RV32;
    } else {
        pub const PMP_REGION_COUNT: usize = 8;
        pub const PROBE_REGIONS: RegionTable<PMP_REGION_COUNT> = PROBE_REGIONS_RV64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmp_probe_drivers::memory_layout::UART0_ORG;

    #[test]
    fn test_packed_cfg() {
        assert_eq!(PROBE_REGIONS_RV32.cfg_csr().bits(), 0x8F8D_8D8F);
        assert_eq!(PROBE_REGIONS_RV64.cfg_csr().bits(), 0x8F8D_8D8F);
    }

    #[test]
    fn test_target_is_write_protected() {
        for (index, region) in [
            PROBE_REGIONS_RV32.governing(TEST_TARGET_ADDR as u64),
            PROBE_REGIONS_RV64.governing(TEST_TARGET_ADDR as u64),
        ]
        .into_iter()
        .flatten()
        {
            assert_eq!(index, 2);
            assert!(region.cfg.read());
            assert!(!region.cfg.write());
            assert!(region.cfg.lock());
        }
        assert!(PROBE_REGIONS_RV32
            .governing(TEST_TARGET_ADDR as u64)
            .is_some());
    }

    #[test]
    fn test_region_coverage() {
        let covering = |phys: usize| {
            PROBE_REGIONS_RV32
                .governing(phys as u64)
                .map(|(_, region)| *region)
        };
        assert_eq!(covering(UART0_ORG), Some(DEBUG_MMIO));
        assert_eq!(covering(SPI_FLASH_ORG), Some(FLASH_CODE));
        assert_eq!(covering(TEST_TARGET_ADDR), Some(DTIM0_PROTECTED));
        assert_eq!(covering(DTIM1_ORG), Some(DTIM1_DATA));
        assert_eq!(covering(DTIM_END - 4), Some(DTIM1_DATA));
    }

    #[test]
    fn test_data_region_is_writable() {
        let (_, region) = PROBE_REGIONS_RV32.governing(DTIM1_ORG as u64).unwrap();
        assert!(region.cfg.write());
    }

    #[test]
    fn test_native_width() {
        assert_eq!(
            PMP_REGION_COUNT,
            pmp_probe_cpu::PMP_CFG_ENTRIES_PER_CSR
        );
        assert_eq!(PROBE_REGIONS.regions()[..4], PROBE_REGIONS_RV32.regions()[..]);
    }
}
