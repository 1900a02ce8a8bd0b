use serde::Deserialize;
use std::fmt::{self, Formatter};
use strum_macros::{Display, EnumString};

/// Trap (single-step) flag in the saved flags register.
pub const TRAP_FLAG: u32 = 1 << 8;
/// Resume flag in the saved flags register.
pub const RESUME_FLAG: u32 = 1 << 16;

/// Cause of the trap that suspended the program.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display, EnumString, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TrapCause {
    Debug,
    Breakpoint,
    PageFault,
    GeneralProtection,
    Syscall,
    Other,
}

impl TrapCause {
    /// Step control is only meaningful while suspended by the debug
    /// machinery itself.
    pub fn is_debug_trap(self) -> bool {
        matches!(self, TrapCause::Debug | TrapCause::Breakpoint)
    }
}

/// Saved processor state of a suspended program.
///
/// Owned by the trap delivery mechanism; the monitor holds it for one
/// session and may flip flag bits in place to change how the program
/// resumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TrapContext {
    pub pc: u32,
    pub flags: u32,
    pub frame_pointer: u32,
    pub cause: TrapCause,
}

impl TrapContext {
    pub fn single_stepping(&self) -> bool {
        self.flags & TRAP_FLAG != 0
    }
}

impl fmt::Display for TrapContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "TRAP frame:")?;
        writeln!(f, "  cause  {}", self.cause)?;
        writeln!(f, "  pc     {:#010x}", self.pc)?;
        writeln!(f, "  flags  {:#010x}", self.flags)?;
        write!(f, "  fp     {:#010x}", self.frame_pointer)
    }
}
