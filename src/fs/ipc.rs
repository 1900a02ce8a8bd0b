//! Request gateway between the file operations and the transport.

use crate::error::Error;
use crate::fs::proto::{IpcPage, RequestTag};
use crate::km_debug;
use once_cell::unsync::OnceCell;
use strum_macros::Display;

/// Identifier of another process reachable over the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EndpointId(pub u32);

/// Well-known server categories the transport can locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ServerKind {
    File,
}

/// Access rights granted to the server on the request page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagePerm(u32);

impl PagePerm {
    pub const READ: Self = Self(0x1);
    pub const WRITE: Self = Self(0x2);
    pub const USER: Self = Self(0x4);

    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn bits(self) -> u32 {
        self.0
    }
}

/// The message-passing primitive this client runs on.
///
/// `send` hands the tagged request page to the target with the given
/// access rights; `recv` blocks until the reply arrives, overwrites
/// `reply` with any reply page, and returns the server's raw result word.
/// Both waits are unbounded; a hung peer stalls the caller. That is the
/// transport's contract, not this crate's concern.
pub trait Transport {
    fn find_server(&self, kind: ServerKind) -> Result<EndpointId, Error>;

    fn send(
        &self,
        target: EndpointId,
        tag: RequestTag,
        page: &IpcPage,
        perm: PagePerm,
    ) -> Result<(), Error>;

    fn recv(&self, reply: &mut IpcPage) -> Result<i32, Error>;
}

/// Client context for one filesystem-server connection.
///
/// Owns the page-sized scratch every request and reply passes through and
/// the lazily-discovered server endpoint. `call` takes `&mut self`, so
/// "one outstanding request per client" is enforced by the borrow checker
/// instead of by convention.
pub struct FsConnection<T> {
    transport: T,
    server: OnceCell<EndpointId>,
    scratch: Box<IpcPage>,
}

impl<T: Transport> FsConnection<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            server: OnceCell::new(),
            scratch: IpcPage::zeroed(),
        }
    }

    /// Request page for the next call; encode into this.
    pub fn scratch(&mut self) -> &mut IpcPage {
        &mut self.scratch
    }

    /// Reply page of the last completed call.
    pub fn page(&self) -> &IpcPage {
        &self.scratch
    }

    /// One synchronous round trip: send the scratch page, block for the
    /// reply, return the server's raw result word (negative is an error
    /// code, the rest depends on the request). The server endpoint is
    /// discovered on first use and reused for the process lifetime.
    pub fn call(&mut self, tag: RequestTag) -> Result<i32, Error> {
        let server = *self
            .server
            .get_or_try_init(|| self.transport.find_server(ServerKind::File))?;

        self.transport.send(
            server,
            tag,
            &self.scratch,
            PagePerm::READ.or(PagePerm::WRITE).or(PagePerm::USER),
        )?;
        let ret = self.transport.recv(&mut self.scratch)?;
        km_debug!(target: "fsipc", "{tag} -> {ret}");
        Ok(ret)
    }
}
