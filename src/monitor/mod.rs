//! Interactive debug monitor over a suspended program.
//!
//! One session, one operator. The monitor owns nothing of the machine it
//! inspects: memory and debug information arrive behind the [`StackView`]
//! and [`SymbolResolver`] seams, and the trap context is lent by whatever
//! delivered the trap.

pub mod command;
pub mod context;
pub mod editor;
pub mod print;
pub mod step;
pub mod unwind;

use crate::error::Error;
use crate::km_error;
use crate::monitor::command::HELP_COMMAND;
use crate::monitor::context::TrapContext;
use crate::monitor::editor::{create_editor, MonEditor};
use crate::monitor::print::style::{ErrorView, KeywordView};
use crate::monitor::print::ConsolePrinter;
use crate::monitor::unwind::{StackView, SymbolResolver};
use rustyline::error::ReadlineError;
use serde::Deserialize;

const WELCOME_TEXT: &str = "Welcome to the kmon kernel monitor!";
const PROMPT: &str = "K> ";

/// What a dispatched command asks the session to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Keep reading operator input.
    Continue,
    /// Leave the monitor.
    Exit,
    /// Hand control back to the suspended program (the context mutation is
    /// already applied).
    Resume,
}

/// How a monitor session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorExit {
    Quit,
    ResumeProgram,
}

/// Link-time layout of the inspected kernel image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct KernelLayout {
    /// Physical address of the boot entry.
    pub start: u32,
    pub entry: u32,
    pub etext: u32,
    pub edata: u32,
    pub end: u32,
    /// Virtual base the kernel is linked at, maps onto physical zero.
    pub kernbase: u32,
}

/// Per-session state shared by every dispatched command.
pub struct Session<'a> {
    stack: &'a dyn StackView,
    symbols: &'a dyn SymbolResolver,
    layout: KernelLayout,
    frame_pointer: u32,
    context: Option<TrapContext>,
}

impl<'a> Session<'a> {
    pub fn new(
        stack: &'a dyn StackView,
        symbols: &'a dyn SymbolResolver,
        layout: KernelLayout,
        frame_pointer: u32,
        context: Option<TrapContext>,
    ) -> Self {
        Self {
            stack,
            symbols,
            layout,
            frame_pointer,
            context,
        }
    }

    pub fn stack(&self) -> &dyn StackView {
        self.stack
    }

    pub fn symbols(&self) -> &dyn SymbolResolver {
        self.symbols
    }

    pub fn layout(&self) -> KernelLayout {
        self.layout
    }

    /// Frame pointer register at the moment the program was suspended.
    pub fn current_frame_pointer(&self) -> u32 {
        self.context
            .as_ref()
            .map(|ctx| ctx.frame_pointer)
            .unwrap_or(self.frame_pointer)
    }

    pub fn context(&self) -> Option<&TrapContext> {
        self.context.as_ref()
    }

    pub fn context_mut(&mut self) -> Result<&mut TrapContext, Error> {
        self.context.as_mut().ok_or(Error::NoTrapContext)
    }
}

/// The read-dispatch-repeat cycle around one [`Session`].
pub struct Monitor<'a> {
    session: Session<'a>,
    editor: MonEditor,
    printer: ConsolePrinter,
}

impl<'a> Monitor<'a> {
    pub fn new(session: Session<'a>) -> anyhow::Result<Self> {
        Ok(Self {
            session,
            editor: create_editor(PROMPT)?,
            printer: ConsolePrinter::new(),
        })
    }

    pub fn run(&mut self) -> Result<MonitorExit, Error> {
        self.printer.print(WELCOME_TEXT);
        self.printer.print(format!(
            "Type '{}' for a list of commands.",
            KeywordView::from(HELP_COMMAND)
        ));
        if let Some(ctx) = self.session.context() {
            self.printer.print(ctx);
        }

        loop {
            match self.editor.readline(PROMPT) {
                Ok(input) => {
                    if input == "q" || input == "quit" {
                        return Ok(MonitorExit::Quit);
                    }
                    _ = self.editor.add_history_entry(&input);

                    match command::dispatch(&mut self.session, &self.printer, &input) {
                        Ok(Outcome::Continue) => {}
                        Ok(Outcome::Exit) => return Ok(MonitorExit::Quit),
                        Ok(Outcome::Resume) => return Ok(MonitorExit::ResumeProgram),
                        Err(e) if e.is_fatal() => {
                            km_error!(target: "monitor", "fatal monitor error: {e:#}");
                            return Err(e);
                        }
                        Err(e) => self.printer.print(ErrorView::from(format!("error: {e}"))),
                    }
                }
                Err(ReadlineError::Eof | ReadlineError::Interrupted) => {
                    return Ok(MonitorExit::Quit)
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
