/*++

Licensed under the Apache-2.0 license.

File Name:

    handler.rs

Abstract:

    Trap handler deciding the verdict of the protected store.

--*/

use crate::context::{ProbeContext, ProbeState, PROTECTED_SENTINEL};
use pmp_probe_cpu::{Memory, TrapHandler, TrapRecord};
use pmp_probe_drivers::cprintln;
use pmp_probe_error::{exit_code, ProbeError, ProbeResult};

/// Handles the store access fault raised by the protected store.
pub struct StoreFaultHandler<'a> {
    ctx: &'a ProbeContext,
}

impl<'a> StoreFaultHandler<'a> {
    pub const fn new(ctx: &'a ProbeContext) -> Self {
        Self { ctx }
    }

    fn verdict(&self, record: &TrapRecord, memory: &dyn Memory) -> ProbeResult<()> {
        let state = self.ctx.state();
        if state != ProbeState::Probing {
            cprintln!(
                "Exception in state {} mcause=0x{:08X} mtval=0x{:08X}. Check setup...",
                state.name(),
                record.mcause,
                record.mtval
            );
            return self
                .ctx
                .finish(ProbeState::FailSetup, Err(ProbeError::PROBE_SETUP_FAILED));
        }

        if memory.read_u32(self.ctx.target()) == PROTECTED_SENTINEL {
            cprintln!("Unexpected exception hit! PMP not enabled correctly - check setup...");
            return self.ctx.finish(
                ProbeState::FailUnprotected,
                Err(ProbeError::PROBE_WRITE_NOT_BLOCKED),
            );
        }

        cprintln!(
            "Exception hit as expected! Exception code: 0x{:02X}",
            record.cause_code()
        );
        self.ctx.finish(ProbeState::Pass, Ok(()))
    }
}

impl TrapHandler for StoreFaultHandler<'_> {
    fn handle_trap(&self, record: &TrapRecord, memory: &dyn Memory) -> u32 {
        let result = self.verdict(record, memory);
        cprintln!("Now exiting...");
        exit_code(result)
    }
}
