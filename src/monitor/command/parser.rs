use crate::error::Error;
use smallvec::SmallVec;

/// Upper bound on tokens in one input line, command name included.
pub const MAX_TOKENS: usize = 16;

pub type Tokens<'a> = SmallVec<[&'a str; MAX_TOKENS]>;

/// Split one input line on whitespace runs.
///
/// Tokens borrow from the line, nothing is copied. Lines that would
/// overflow the token list are rejected wholesale so that no command runs
/// with a truncated argument vector.
pub fn tokenize(line: &str) -> Result<Tokens<'_>, Error> {
    let mut tokens = Tokens::new();
    for token in line.split_whitespace() {
        if tokens.len() == MAX_TOKENS - 1 {
            return Err(Error::TooManyArguments);
        }
        tokens.push(token);
    }
    Ok(tokens)
}
