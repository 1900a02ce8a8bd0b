//! Operator commands and their handlers.
//!
//! A command is one whitespace-tokenized input line. The registry below is
//! static; its order is both the `help` display order and the dispatch
//! scan order (linear, first exact match wins).

pub mod backtrace;
pub mod help;
pub mod kerninfo;
pub mod parser;
pub mod step;

use crate::error::Error;
use crate::km_debug;
use crate::monitor::print::ConsolePrinter;
use crate::monitor::{Outcome, Session};

pub const HELP_COMMAND: &str = "help";
pub const KERNINFO_COMMAND: &str = "kerninfo";
pub const BACKTRACE_COMMAND: &str = "backtrace";
pub const STEP_COMMAND: &str = "step";
pub const EXITSTEP_COMMAND: &str = "exitstep";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandKind {
    Help,
    KernInfo,
    Backtrace,
    Step,
    ExitStep,
}

pub struct CommandDef {
    pub name: &'static str,
    pub description: &'static str,
    kind: CommandKind,
}

pub const COMMANDS: &[CommandDef] = &[
    CommandDef {
        name: HELP_COMMAND,
        description: "Display this list of commands",
        kind: CommandKind::Help,
    },
    CommandDef {
        name: KERNINFO_COMMAND,
        description: "Display information about the kernel",
        kind: CommandKind::KernInfo,
    },
    CommandDef {
        name: BACKTRACE_COMMAND,
        description: "Display all stack frames",
        kind: CommandKind::Backtrace,
    },
    CommandDef {
        name: STEP_COMMAND,
        description: "Single step when already in the debug console",
        kind: CommandKind::Step,
    },
    CommandDef {
        name: EXITSTEP_COMMAND,
        description: "Exit single stepping",
        kind: CommandKind::ExitStep,
    },
];

/// Tokenize one input line and run the matching command.
///
/// An empty line is a silent no-op. Unknown names and oversized token
/// lists are recoverable: the caller reports them and keeps reading.
/// Commands here take no operands; surplus tokens are ignored.
pub fn dispatch(
    session: &mut Session<'_>,
    printer: &ConsolePrinter,
    line: &str,
) -> Result<Outcome, Error> {
    let tokens = parser::tokenize(line)?;
    let Some(&name) = tokens.first() else {
        return Ok(Outcome::Continue);
    };

    let Some(cmd) = COMMANDS.iter().find(|cmd| cmd.name == name) else {
        return Err(Error::UnknownCommand(name.to_string()));
    };

    km_debug!(target: "monitor", "dispatch '{}'", cmd.name);
    match cmd.kind {
        CommandKind::Help => {
            printer.print(help::Handler::new().handle());
            Ok(Outcome::Continue)
        }
        CommandKind::KernInfo => {
            printer.print(kerninfo::Handler::new(session).handle());
            Ok(Outcome::Continue)
        }
        CommandKind::Backtrace => {
            backtrace::Handler::new(session).handle(printer)?;
            Ok(Outcome::Continue)
        }
        CommandKind::Step => step::Handler::new(session).handle(step::Command::Enable),
        CommandKind::ExitStep => step::Handler::new(session).handle(step::Command::Disable),
    }
}
