use crate::error::Error;
use crate::monitor::print::style::{AddressView, FilePathView, FunctionNameView};
use crate::monitor::print::ConsolePrinter;
use crate::monitor::unwind::{FrameWalk, StackFrame, SymbolInfo};
use crate::monitor::Session;
use itertools::Itertools;

pub struct Handler<'a, 's> {
    session: &'a Session<'s>,
}

impl<'a, 's> Handler<'a, 's> {
    pub fn new(session: &'a Session<'s>) -> Self {
        Self { session }
    }

    /// Walk the frame chain from the suspended frame pointer outwards,
    /// printing each frame as soon as it resolves. A failed symbol lookup
    /// or an unreadable chain link aborts the whole walk.
    pub fn handle(&self, printer: &ConsolePrinter) -> Result<(), Error> {
        printer.print("Stack backtrace:");

        let walk = FrameWalk::new(self.session.stack(), self.session.current_frame_pointer());
        for frame in walk {
            let frame = frame?;
            let info = self.session.symbols().resolve(frame.return_address)?;
            printer.print(render_frame(&frame, &info));
        }
        Ok(())
    }
}

fn render_frame(frame: &StackFrame, info: &SymbolInfo) -> String {
    let args = frame
        .args
        .iter()
        .format_with(" ", |arg, f| f(&format_args!("{arg:08x}")));

    format!(
        "  fp {}  ra {}  args {}\n         {}:{}: {}+{}",
        AddressView::from(format!("{:08x}", frame.frame_pointer)),
        AddressView::from(format!("{:08x}", frame.return_address)),
        args,
        FilePathView::from(&info.file),
        info.line,
        FunctionNameView::from(&info.function),
        frame.return_address.saturating_sub(info.function_start),
    )
}
