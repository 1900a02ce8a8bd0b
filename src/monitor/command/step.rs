use crate::error::Error;
use crate::monitor::step::{disable_single_step, enable_single_step};
use crate::monitor::{Outcome, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Enable,
    Disable,
}

pub struct Handler<'a, 's> {
    session: &'a mut Session<'s>,
}

impl<'a, 's> Handler<'a, 's> {
    pub fn new(session: &'a mut Session<'s>) -> Self {
        Self { session }
    }

    pub fn handle(&mut self, cmd: Command) -> Result<Outcome, Error> {
        let ctx = self.session.context_mut()?;
        match cmd {
            Command::Enable => enable_single_step(ctx),
            Command::Disable => disable_single_step(ctx),
        }
    }
}
