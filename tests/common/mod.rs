//! In-memory filesystem server speaking the wire protocol.
//!
//! Implements [`Transport`] directly: `send` parks the request page,
//! `recv` serves it and writes the reply back, mimicking the synchronous
//! single-slot exchange of the real server. State is behind `Rc` so tests
//! can keep a handle for assertions after the client takes the transport.

use kmon::error::Error;
use kmon::fs::ipc::{EndpointId, PagePerm, ServerKind, Transport};
use kmon::fs::proto::{IpcPage, OpenMode, RequestTag, ServerErrno, PGSIZE};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Clone)]
pub struct TestServer {
    state: Rc<RefCell<ServerState>>,
}

#[derive(Default)]
struct ServerState {
    files: HashMap<String, Vec<u8>>,
    open: HashMap<u32, OpenFile>,
    next_id: u32,
    pending: Option<Pending>,
    log: Vec<RequestTag>,
    syncs: usize,
}

struct OpenFile {
    path: String,
    offset: usize,
}

struct Pending {
    tag: RequestTag,
    page: Box<IpcPage>,
}

impl TestServer {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(ServerState::default())),
        }
    }

    pub fn with_file(self, path: &str, content: &[u8]) -> Self {
        self.state
            .borrow_mut()
            .files
            .insert(path.to_string(), content.to_vec());
        self
    }

    /// Every request tag seen so far, in order.
    pub fn requests(&self) -> Vec<RequestTag> {
        self.state.borrow().log.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.borrow().log.len()
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state.borrow().files.get(path).cloned()
    }

    pub fn sync_count(&self) -> usize {
        self.state.borrow().syncs
    }
}

impl Transport for TestServer {
    fn find_server(&self, kind: ServerKind) -> Result<EndpointId, Error> {
        assert_eq!(kind, ServerKind::File);
        Ok(EndpointId(1))
    }

    fn send(
        &self,
        target: EndpointId,
        tag: RequestTag,
        page: &IpcPage,
        perm: PagePerm,
    ) -> Result<(), Error> {
        assert_eq!(target, EndpointId(1));
        assert!(perm.contains(PagePerm::READ.or(PagePerm::WRITE).or(PagePerm::USER)));

        let mut state = self.state.borrow_mut();
        assert!(
            state.pending.is_none(),
            "second request while one is in flight"
        );
        state.log.push(tag);
        state.pending = Some(Pending {
            tag,
            page: Box::new(page.clone()),
        });
        Ok(())
    }

    fn recv(&self, reply: &mut IpcPage) -> Result<i32, Error> {
        let mut state = self.state.borrow_mut();
        let Pending { tag, page } = state.pending.take().expect("receive without a request");
        Ok(state.serve(tag, &page, reply))
    }
}

impl ServerState {
    fn serve(&mut self, tag: RequestTag, req: &IpcPage, reply: &mut IpcPage) -> i32 {
        match tag {
            RequestTag::Open => {
                let (path, mode) = req.decode_open();
                if !self.files.contains_key(&path) {
                    if !mode.contains(OpenMode::CREATE) {
                        return -ServerErrno::NotFound.code();
                    }
                    self.files.insert(path.clone(), Vec::new());
                }
                if mode.contains(OpenMode::TRUNCATE) {
                    self.files.get_mut(&path).expect("just ensured").clear();
                }

                self.next_id += 1;
                let id = self.next_id;
                self.open.insert(id, OpenFile { path, offset: 0 });
                reply.encode_descriptor(id, mode);
                0
            }
            RequestTag::Read => {
                let (id, n) = req.decode_read();
                let Some(of) = self.open.get_mut(&id) else {
                    return -ServerErrno::Invalid.code();
                };
                let data = &self.files[&of.path];
                let n = (n as usize)
                    .min(PGSIZE)
                    .min(data.len().saturating_sub(of.offset));
                let chunk = data[of.offset..of.offset + n].to_vec();
                of.offset += n;
                reply.encode_read_reply(&chunk);
                n as i32
            }
            RequestTag::Write => {
                let (id, payload) = req.decode_write();
                let Some(of) = self.open.get_mut(&id) else {
                    return -ServerErrno::Invalid.code();
                };
                let data = self.files.get_mut(&of.path).expect("open file has data");
                if data.len() < of.offset + payload.len() {
                    data.resize(of.offset + payload.len(), 0);
                }
                data[of.offset..of.offset + payload.len()].copy_from_slice(payload);
                of.offset += payload.len();
                payload.len() as i32
            }
            RequestTag::Stat => {
                let id = req.decode_stat();
                let Some(of) = self.open.get(&id) else {
                    return -ServerErrno::Invalid.code();
                };
                let name = of.path.rsplit('/').next().unwrap_or(of.path.as_str());
                let size = self.files[&of.path].len() as u32;
                reply.encode_stat_reply(name, size, false);
                0
            }
            RequestTag::SetSize => {
                let (id, size) = req.decode_set_size();
                let Some(of) = self.open.get(&id) else {
                    return -ServerErrno::Invalid.code();
                };
                self.files
                    .get_mut(&of.path)
                    .expect("open file has data")
                    .resize(size as usize, 0);
                0
            }
            RequestTag::Flush => {
                let id = req.decode_flush();
                if !self.open.contains_key(&id) {
                    return -ServerErrno::Invalid.code();
                }
                0
            }
            RequestTag::Sync => {
                self.syncs += 1;
                0
            }
        }
    }
}
