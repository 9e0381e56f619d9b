/*++

Licensed under the Apache-2.0 license.

File Name:

    pmp_baremetal.rs

Abstract:

    Bare-metal PMP probe. Writes the target word, locks the PMP table, then
    writes the target again; the store access fault decides the exit status.

--*/

#![no_std]
#![no_main]

use pmp_probe_common::{
    cprintln, exit_code, Probe, ProbeConfig, ProbeContext, ProbeError, ProbeExit,
    StoreFaultHandler, PROBE_REGIONS,
};
use pmp_probe_cpu::{dispatch_trap, read_trap_record, MachineHart};
use pmp_probe_drivers::ExitCtrl;
use riscv_rt::entry;

static CONTEXT: ProbeContext = ProbeContext::new(ProbeConfig::new().target);
static HANDLER: StoreFaultHandler<'static> = StoreFaultHandler::new(&CONTEXT);

extern "C" {
    // Trap entry of riscv-rt; saves the caller-saved registers and calls
    // `ExceptionHandler` for synchronous exceptions.
    fn _start_trap();
}

#[entry]
fn main() -> ! {
    cprintln!("PMP probe: target 0x{:08X}", CONTEXT.target());

    let mut hart = unsafe { MachineHart::new(_start_trap as usize) };
    let probe = Probe::new(&CONTEXT, &PROBE_REGIONS, ProbeConfig::new());

    match probe.run(&mut hart, &HANDLER) {
        ProbeExit::Finished(result) => ExitCtrl::exit(exit_code(result)),
        // Stores on hardware never return on a fault.
        ProbeExit::Trapped => ExitCtrl::exit(CONTEXT.status()),
    }
}

#[export_name = "ExceptionHandler"]
fn exception_handler(_trap_frame: &riscv_rt::TrapFrame) -> ! {
    let record = read_trap_record();
    match dispatch_trap(&record) {
        Some(code) => ExitCtrl::exit(code),
        None => {
            cprintln!(
                "EXCEPTION mcause=0x{:08X} mepc=0x{:08X} mtval=0x{:08X}",
                record.mcause,
                record.mepc,
                record.mtval
            );
            ExitCtrl::exit(exit_code(Err(ProbeError::PROBE_SETUP_FAILED)))
        }
    }
}

#[panic_handler]
#[inline(never)]
fn handle_panic(pi: &core::panic::PanicInfo) -> ! {
    if let Some(loc) = pi.location() {
        cprintln!("Panic at file {} line {}", loc.file(), loc.line());
    }
    ExitCtrl::exit(ProbeError::PROBE_FW_PANIC.into())
}
