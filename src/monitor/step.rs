//! Single-step control over a suspended program's saved flags register.

use crate::error::Error;
use crate::monitor::context::{TrapContext, RESUME_FLAG, TRAP_FLAG};
use crate::monitor::Outcome;

/// Arm the trap flag so the program halts again after one instruction.
///
/// Requires the program to be suspended by a debug or breakpoint trap,
/// anything else is a misuse of the debug session and is fatal. Only the
/// trap and resume bits are touched.
pub fn enable_single_step(ctx: &mut TrapContext) -> Result<Outcome, Error> {
    if !ctx.cause.is_debug_trap() {
        return Err(Error::NotInDebugTrap(ctx.cause));
    }

    ctx.flags |= TRAP_FLAG;
    ctx.flags &= !RESUME_FLAG;

    Ok(Outcome::Resume)
}

/// Disarm the trap flag and let the program run freely on resumption.
///
/// Requires an active single-step session on top of the debug-trap
/// precondition shared with [`enable_single_step`].
pub fn disable_single_step(ctx: &mut TrapContext) -> Result<Outcome, Error> {
    if !ctx.cause.is_debug_trap() {
        return Err(Error::NotInDebugTrap(ctx.cause));
    }
    if !ctx.single_stepping() {
        return Err(Error::NotSingleStepping);
    }

    ctx.flags &= !TRAP_FLAG;
    ctx.flags |= RESUME_FLAG;

    Ok(Outcome::Resume)
}
