use crate::fs::proto::{ServerErrno, MAXPATHLEN, PGSIZE};
use crate::monitor::command::parser::MAX_TOKENS;
use crate::monitor::context::TrapCause;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // --------------------------------- operator input errors -------------------------------------
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("too many arguments (max {max})", max = MAX_TOKENS - 1)]
    TooManyArguments,

    // --------------------------------- debug session state ---------------------------------------
    #[error("no suspended program context in this session")]
    NoTrapContext,
    #[error("step control outside of a debug or breakpoint trap (cause: {0})")]
    NotInDebugTrap(TrapCause),
    #[error("not in single-step mode")]
    NotSingleStepping,

    // --------------------------------- stack unwind errors ---------------------------------------
    #[error("unreadable word at {0:#010x} while walking the frame chain")]
    UnreadableWord(u32),
    #[error("no debug information for return address {0:#010x}")]
    SymbolNotFound(u32),

    // --------------------------------- file protocol errors --------------------------------------
    #[error("path too long (limit {limit} bytes)", limit = MAXPATHLEN - 1)]
    BadPath,
    #[error("no free file descriptors")]
    MaxOpen,
    #[error("bad file descriptor {0}")]
    BadDescriptor(usize),
    #[error("file server error: {0}")]
    Server(ServerErrno),
    #[error("server returned {got} bytes for a {requested}-byte request (page is {page})", page = PGSIZE)]
    CountOverrun { got: u32, requested: u32 },

    // --------------------------------- transport errors ------------------------------------------
    #[error("file server not found")]
    ServerNotFound,
    #[error("transport: {0}")]
    Transport(anyhow::Error),

    // --------------------------------- console errors --------------------------------------------
    #[error(transparent)]
    Console(#[from] rustyline::error::ReadlineError),
}

impl Error {
    /// Return a hint to an interface - continue the monitor session after
    /// error or stop the whole process.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::UnknownCommand(_) => false,
            Error::TooManyArguments => false,
            Error::BadPath => false,
            Error::MaxOpen => false,
            Error::BadDescriptor(_) => false,
            Error::Server(_) => false,

            // a violated invariant means a corrupted address space or a
            // misused debug session, neither can be safely continued
            Error::NoTrapContext => true,
            Error::NotInDebugTrap(_) => true,
            Error::NotSingleStepping => true,
            Error::UnreadableWord(_) => true,
            Error::SymbolNotFound(_) => true,
            Error::CountOverrun { .. } => true,
            Error::ServerNotFound => true,
            Error::Transport(_) => true,
            Error::Console(_) => true,
        }
    }
}
