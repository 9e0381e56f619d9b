// Licensed under the Apache-2.0 license

use pmp_probe_common::memory_layout::{DTIM1_ORG, DTIM_END, SPI_FLASH_ORG, TEST_TARGET_ADDR};
use pmp_probe_common::{
    exit_code, Probe, ProbeConfig, ProbeContext, ProbeError, ProbeExit, ProbeState,
    StoreFaultHandler, PROBE_REGIONS_RV32, PROBE_REGIONS_RV64, PROTECTED_SENTINEL,
    UNPROTECTED_SENTINEL,
};
use pmp_probe_cpu::{Exception, Memory, PmpCsrs, Trap, TrapHandler};
use pmp_probe_drivers::{encode_addr, Permission, Region, RegionTable};
use pmp_probe_emu::{EmuHart, Xlen};

const UNMAPPED_TARGET: usize = 0x9000_0000;

fn run<'h, const N: usize>(
    hart: &mut EmuHart<'h>,
    handler: &'h dyn TrapHandler,
    ctx: &ProbeContext,
    regions: &RegionTable<N>,
    config: ProbeConfig,
) -> ProbeExit {
    Probe::new(ctx, regions, config).run(hart, handler)
}

#[test]
fn test_pass_rv32() {
    let ctx = ProbeContext::new(TEST_TARGET_ADDR);
    let handler = StoreFaultHandler::new(&ctx);
    let mut hart = EmuHart::arty(Xlen::Rv32);

    let exit = run(&mut hart, &handler, &ctx, &PROBE_REGIONS_RV32, ProbeConfig::new());

    assert_eq!(exit, ProbeExit::Trapped);
    assert_eq!(hart.exit_code(), Some(0));
    assert_eq!(ctx.state(), ProbeState::Pass);
    assert_eq!(ctx.result(), Ok(()));
    assert_eq!(hart.peek(TEST_TARGET_ADDR), UNPROTECTED_SENTINEL);

    let traps = hart.traps();
    assert_eq!(traps.len(), 1);
    assert_eq!(traps[0].trap(), Trap::Synchronous(Exception::StoreAccessFault));
    assert_eq!(traps[0].mtval, TEST_TARGET_ADDR);

    assert_eq!(hart.read_pmpaddr(0), 0x1010_0000);
    assert_eq!(hart.read_pmpaddr(1), 0x2000_0040);
    assert_eq!(hart.read_pmpaddr(2), 0x2000_2000);
    assert_eq!(hart.read_pmpaddr(3), 0x2000_4000);
    assert_eq!(hart.read_pmpcfg(0), 0x8F8D_8D8F);
}

#[test]
fn test_pass_rv64() {
    let ctx = ProbeContext::new(TEST_TARGET_ADDR);
    let handler = StoreFaultHandler::new(&ctx);
    let mut hart = EmuHart::arty(Xlen::Rv64);

    let exit = run(&mut hart, &handler, &ctx, &PROBE_REGIONS_RV64, ProbeConfig::new());

    assert_eq!(exit, ProbeExit::Trapped);
    assert_eq!(hart.exit_code(), Some(0));
    assert_eq!(ctx.state(), ProbeState::Pass);
    assert_eq!(hart.read_pmpaddr(0), 0x1010_0000);
    assert_eq!(hart.read_pmpaddr(1), 0x2000_0040);
    assert_eq!(hart.read_pmpaddr(2), 0x2000_2000);
    assert_eq!(hart.read_pmpaddr(3), 0x2000_4000);
    for index in 4..8 {
        assert_eq!(hart.read_pmpaddr(index), 0);
    }
    assert_eq!(hart.read_pmpcfg(0), 0x8F8D_8D8F);
    for index in 4..8 {
        assert!(!hart.csrs().entry(index).lock());
    }
}

#[test]
fn test_data_stays_writable() {
    let ctx = ProbeContext::new(TEST_TARGET_ADDR);
    let handler = StoreFaultHandler::new(&ctx);
    let mut hart = EmuHart::arty(Xlen::Rv32);
    run(&mut hart, &handler, &ctx, &PROBE_REGIONS_RV32, ProbeConfig::new());

    // DTIM1 holds the stack and data of the firmware.
    assert_eq!(hart.write_u32(DTIM1_ORG, 0x1234_5678), Ok(()));
    assert_eq!(hart.peek(DTIM1_ORG), 0x1234_5678);
    assert_eq!(hart.traps().len(), 1);
}

#[test]
fn test_pmp_not_enforced() {
    let ctx = ProbeContext::new(TEST_TARGET_ADDR);
    let handler = StoreFaultHandler::new(&ctx);
    let mut hart = EmuHart::arty(Xlen::Rv32).with_pmp_enforced(false);

    let exit = run(&mut hart, &handler, &ctx, &PROBE_REGIONS_RV32, ProbeConfig::new());

    assert_eq!(
        exit,
        ProbeExit::Finished(Err(ProbeError::PROBE_NOT_ENFORCED))
    );
    assert_eq!(ctx.state(), ProbeState::FailNotEnforced);
    assert_eq!(ctx.status(), 0xFA17);
    assert_eq!(hart.exit_code(), None);
    assert!(hart.traps().is_empty());
    assert_eq!(hart.peek(TEST_TARGET_ADDR), PROTECTED_SENTINEL);
}

#[test]
fn test_writable_target_region() {
    let regions = RegionTable::new([
        Region::tor(SPI_FLASH_ORG, Permission::RWX, true),
        Region::tor(TEST_TARGET_ADDR, Permission::RX, true),
        Region::tor(DTIM1_ORG, Permission::RWX, true),
        Region::tor(DTIM_END, Permission::RWX, true),
    ]);
    let ctx = ProbeContext::new(TEST_TARGET_ADDR);
    let handler = StoreFaultHandler::new(&ctx);
    let mut hart = EmuHart::arty(Xlen::Rv32);

    let exit = run(&mut hart, &handler, &ctx, &regions, ProbeConfig::new());

    assert_eq!(
        exit,
        ProbeExit::Finished(Err(ProbeError::PROBE_NOT_ENFORCED))
    );
    assert_eq!(exit_code(ctx.result()), 0xFA17);
}

#[test]
fn test_faulting_store_committed() {
    let ctx = ProbeContext::new(TEST_TARGET_ADDR);
    let handler = StoreFaultHandler::new(&ctx);
    let mut hart = EmuHart::arty(Xlen::Rv32).with_commit_faulting_stores(true);

    let exit = run(&mut hart, &handler, &ctx, &PROBE_REGIONS_RV32, ProbeConfig::new());

    assert_eq!(exit, ProbeExit::Trapped);
    assert_eq!(hart.exit_code(), Some(0xFF));
    assert_eq!(ctx.state(), ProbeState::FailUnprotected);
    assert_eq!(ctx.result(), Err(ProbeError::PROBE_WRITE_NOT_BLOCKED));
}

#[test]
fn test_unwritable_target() {
    let ctx = ProbeContext::new(UNMAPPED_TARGET);
    let handler = StoreFaultHandler::new(&ctx);
    let mut hart = EmuHart::arty(Xlen::Rv32);

    let exit = run(&mut hart, &handler, &ctx, &PROBE_REGIONS_RV32, ProbeConfig::new());

    assert_eq!(
        exit,
        ProbeExit::Finished(Err(ProbeError::PROBE_SETUP_FAILED))
    );
    assert_eq!(ctx.state(), ProbeState::FailSetup);
    assert_eq!(ctx.status(), 0xFA);
    // The PMP is never touched.
    assert_eq!(hart.read_pmpcfg(0), 0);
}

#[test]
fn test_trap_before_probing() {
    let ctx = ProbeContext::new(UNMAPPED_TARGET);
    let handler = StoreFaultHandler::new(&ctx);
    let mut hart = EmuHart::arty(Xlen::Rv32).with_fault_unmapped(true);

    let exit = run(&mut hart, &handler, &ctx, &PROBE_REGIONS_RV32, ProbeConfig::new());

    assert_eq!(exit, ProbeExit::Trapped);
    assert_eq!(hart.exit_code(), Some(0xFA));
    assert_eq!(ctx.state(), ProbeState::FailSetup);
}

#[test]
fn test_readback_mismatch_is_reported_only() {
    let ctx = ProbeContext::new(TEST_TARGET_ADDR);
    let handler = StoreFaultHandler::new(&ctx);
    let mut hart = EmuHart::arty(Xlen::Rv32).with_stuck_pmpaddr(0, 0);

    let config = ProbeConfig {
        strict_verify: false,
        ..ProbeConfig::new()
    };

    let exit = run(&mut hart, &handler, &ctx, &PROBE_REGIONS_RV32, config);

    assert_eq!(exit, ProbeExit::Trapped);
    assert_eq!(hart.exit_code(), Some(0));
    assert_eq!(ctx.state(), ProbeState::Pass);
    assert_eq!(hart.read_pmpaddr(0), 0);
}

#[test]
fn test_readback_mismatch_strict() {
    let ctx = ProbeContext::new(TEST_TARGET_ADDR);
    let handler = StoreFaultHandler::new(&ctx);
    let mut hart = EmuHart::arty(Xlen::Rv32).with_stuck_pmpaddr(0, 0);
    let config = ProbeConfig {
        strict_verify: true,
        ..ProbeConfig::new()
    };

    let exit = run(&mut hart, &handler, &ctx, &PROBE_REGIONS_RV32, config);

    assert_eq!(
        exit,
        ProbeExit::Finished(Err(ProbeError::PMP_VERIFY_MISMATCH))
    );
    assert_eq!(ctx.state(), ProbeState::FailSetup);
    assert_eq!(ctx.status(), 0xFB);
    assert!(hart.traps().is_empty());
}

#[test]
fn test_descending_table() {
    let regions = RegionTable::new([
        Region::tor(SPI_FLASH_ORG, Permission::RWX, true),
        Region::tor(DTIM1_ORG, Permission::RX, true),
        Region::tor(TEST_TARGET_ADDR, Permission::RX, true),
        Region::tor(DTIM_END, Permission::RWX, true),
    ]);
    let ctx = ProbeContext::new(TEST_TARGET_ADDR);
    let handler = StoreFaultHandler::new(&ctx);
    let mut hart = EmuHart::arty(Xlen::Rv32);

    let exit = run(&mut hart, &handler, &ctx, &regions, ProbeConfig::new());

    assert_eq!(
        exit,
        ProbeExit::Finished(Err(ProbeError::PMP_REGIONS_NOT_ASCENDING))
    );
    assert_eq!(ctx.state(), ProbeState::FailSetup);
    assert_eq!(ctx.status(), 0xFC);
    // Nothing written, the target included.
    assert_eq!(hart.peek(TEST_TARGET_ADDR), 0);
    assert_eq!(hart.read_pmpaddr(1), 0);
}

#[test]
fn test_locked_entries_survive_rerun() {
    let first = ProbeContext::new(TEST_TARGET_ADDR);
    let first_handler = StoreFaultHandler::new(&first);
    let second = ProbeContext::new(TEST_TARGET_ADDR);
    let second_handler = StoreFaultHandler::new(&second);
    let mut hart = EmuHart::arty(Xlen::Rv32);

    run(&mut hart, &first_handler, &first, &PROBE_REGIONS_RV32, ProbeConfig::new());
    assert_eq!(first.state(), ProbeState::Pass);

    // The target is still write protected, so the unprotected store traps.
    let exit = run(&mut hart, &second_handler, &second, &PROBE_REGIONS_RV32, ProbeConfig::new());

    assert_eq!(exit, ProbeExit::Trapped);
    assert_eq!(hart.exit_code(), Some(0xFA));
    assert_eq!(second.state(), ProbeState::FailSetup);
    assert_eq!(first.state(), ProbeState::Pass);
    assert_eq!(hart.read_pmpaddr(1), encode_addr(TEST_TARGET_ADDR));
}
