/*++

Licensed under the Apache-2.0 license.

File Name:

    trap.rs

Abstract:

    File contains RISCV trap related types.

--*/

/// Interrupt flag of `mcause` on the running target.
pub const MCAUSE_INTR: usize = 1 << (usize::BITS - 1);

/// Exception code field of `mcause`.
pub const MCAUSE_CAUSE: usize = 0x3FF;

/// Trap Record
///
/// Snapshot of the machine trap CSRs taken on trap entry.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TrapRecord {
    pub mcause: usize,
    pub mepc: usize,
    pub mtval: usize,
}

impl TrapRecord {
    /// Exception code of the trap, with the interrupt flag stripped.
    pub fn cause_code(&self) -> usize {
        self.mcause & MCAUSE_CAUSE
    }

    pub fn trap(&self) -> Trap {
        Trap::from_mcause(self.mcause)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trap {
    Synchronous(Exception),
    Asynchronous(Interrupt),
}

impl Trap {
    /// Decode a raw `mcause` value of the running target's width.
    pub fn from_mcause(mcause: usize) -> Self {
        let code = (mcause & MCAUSE_CAUSE) as u32;
        if mcause & MCAUSE_INTR != 0 {
            Trap::Asynchronous(Interrupt::from(code))
        } else {
            Trap::Synchronous(Exception::from(code))
        }
    }
}

/// Exceptions are unusual conditions that occur at run time, associated with an instruction in the current RISC-V hart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    /// Instruction address misaligned
    InstructionMisaligned,
    /// Instruction access fault
    InstructionAccessFault,
    /// Illegal instruction
    IllegalInstruction,
    /// Breakpoint
    Breakpoint,
    /// Load address misaligned
    LoadMisaligned,
    /// Load access fault
    LoadAccessFault,
    /// Store/AMO address misaligned
    StoreMisaligned,
    /// Store/AMO access fault
    StoreAccessFault,
    /// Environment call from U-mode
    UserEnvCall,
    /// Environment call from M-mode
    MachineEnvCall,
    // Not Implemented
    NotImplemented,
}

impl Exception {
    pub const STORE_ACCESS_FAULT_CODE: u32 = 0x07;
}

// Convert machine cause register value to Exception
impl From<u32> for Exception {
    #[inline(always)]
    fn from(val: u32) -> Exception {
        match val {
            0x00 => Exception::InstructionMisaligned,
            0x01 => Exception::InstructionAccessFault,
            0x02 => Exception::IllegalInstruction,
            0x03 => Exception::Breakpoint,
            0x04 => Exception::LoadMisaligned,
            0x05 => Exception::LoadAccessFault,
            0x06 => Exception::StoreMisaligned,
            Exception::STORE_ACCESS_FAULT_CODE => Exception::StoreAccessFault,
            0x08 => Exception::UserEnvCall,
            0x0b => Exception::MachineEnvCall,
            _ => Exception::NotImplemented,
        }
    }
}

/// Interrupts are events that occur asynchronously outside any of the RISC-V harts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    MachineSoftwareInterrupt,
    MachineTimerInterrupt,
    MachineExternalInterrupt,
    NotImplemented,
}

impl From<u32> for Interrupt {
    #[inline(always)]
    fn from(val: u32) -> Self {
        match val {
            0x03 => Self::MachineSoftwareInterrupt,
            0x07 => Self::MachineTimerInterrupt,
            0x0b => Self::MachineExternalInterrupt,
            _ => Self::NotImplemented,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_access_fault() {
        let record = TrapRecord {
            mcause: 0x7,
            mepc: 0x4040_0120,
            mtval: 0x8000_0100,
        };
        assert_eq!(record.cause_code(), 0x7);
        assert_eq!(
            record.trap(),
            Trap::Synchronous(Exception::StoreAccessFault)
        );
    }

    #[test]
    fn test_interrupt_flag() {
        let mcause = MCAUSE_INTR | 0x7;
        assert_eq!(
            Trap::from_mcause(mcause),
            Trap::Asynchronous(Interrupt::MachineTimerInterrupt)
        );
        assert_eq!(
            TrapRecord {
                mcause,
                ..Default::default()
            }
            .cause_code(),
            0x7
        );
    }

    #[test]
    fn test_cause_mask() {
        // Bits above the cause field are not part of the code.
        let record = TrapRecord {
            mcause: 0x1000 | 0x5,
            ..Default::default()
        };
        assert_eq!(record.cause_code(), 0x5);
        assert_eq!(
            Trap::from_mcause(0x2),
            Trap::Synchronous(Exception::IllegalInstruction)
        );
        assert_eq!(
            Trap::from_mcause(0x3FF),
            Trap::Synchronous(Exception::NotImplemented)
        );
    }
}
