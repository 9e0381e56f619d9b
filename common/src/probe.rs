/*++

Licensed under the Apache-2.0 license.

File Name:

    probe.rs

Abstract:

    The probe sequence: prove the target is writable, program the PMP
    table, then store to the target again and expect a trap.

--*/

use crate::context::{ProbeContext, ProbeState, PROTECTED_SENTINEL, UNPROTECTED_SENTINEL};
use crate::ProbeConfig;
use pmp_probe_cpu::{Hart, TrapHandler};
use pmp_probe_drivers::{cprintln, Pmp, RegionTable};
use pmp_probe_error::{ProbeError, ProbeResult};

/// How a probe run ended, seen from the probe sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeExit {
    /// The sequence reached a verdict itself. Only failures end here.
    Finished(ProbeResult<()>),

    /// A store was diverted to the registered trap handler, which decided
    /// the verdict. Never observed on hardware, where the handler exits.
    Trapped,
}

pub struct Probe<'a, const N: usize> {
    ctx: &'a ProbeContext,
    regions: &'a RegionTable<N>,
    config: ProbeConfig,
}

impl<'a, const N: usize> Probe<'a, N> {
    pub fn new(ctx: &'a ProbeContext, regions: &'a RegionTable<N>, config: ProbeConfig) -> Self {
        Self {
            ctx,
            regions,
            config,
        }
    }

    /// Run the probe on `hart`, with `handler` registered for the trap the
    /// protected store is expected to raise.
    pub fn run<'h, H: Hart<'h>>(&self, hart: &mut H, handler: &'h dyn TrapHandler) -> ProbeExit {
        hart.register_trap_handler(handler);
        self.ctx.reset();

        if let Err(err) = self.regions.validate() {
            cprintln!("PMP region table is not ascending. Check setup...");
            return self.fail(ProbeState::FailSetup, Err(err));
        }

        let target = self.ctx.target();

        // Unprotected: the target must behave like RAM.
        if hart.write_u32(target, UNPROTECTED_SENTINEL).is_err() {
            return ProbeExit::Trapped;
        }
        if hart.read_u32(target) != UNPROTECTED_SENTINEL {
            cprintln!("Initial write did not succeed. Check setup...");
            return self.fail(ProbeState::FailSetup, Err(ProbeError::PROBE_SETUP_FAILED));
        }
        cprintln!("Initial write to location 0x{:08X} passes!", target);

        // Configured: readback mismatches are only reported.
        let report = unsafe { Pmp::new(hart).program(self.regions) };
        self.ctx.enter(ProbeState::Configured);
        if !report.is_clean() && self.config.strict_verify {
            cprintln!("PMP registers did not read back as programmed. Test failed!");
            return self.fail(ProbeState::FailSetup, Err(ProbeError::PMP_VERIFY_MISMATCH));
        }

        // Probing: from here on only the trap handler updates the context.
        self.ctx.enter(ProbeState::Probing);
        if hart.write_u32(target, PROTECTED_SENTINEL).is_err() {
            return ProbeExit::Trapped;
        }

        cprintln!("PMP protection not correct - check config! Test failed!");
        self.fail(
            ProbeState::FailNotEnforced,
            Err(ProbeError::PROBE_NOT_ENFORCED),
        )
    }

    fn fail(&self, state: ProbeState, result: ProbeResult<()>) -> ProbeExit {
        ProbeExit::Finished(self.ctx.finish(state, result))
    }
}
