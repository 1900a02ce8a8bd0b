//! Wire records exchanged with the filesystem server.
//!
//! Every request and reply lives inside one page-sized, page-aligned
//! buffer. Field layouts are fixed and little-endian; the server decodes
//! them byte-for-byte, so the offsets below are load-bearing and covered
//! by tests.

use strum_macros::Display;

pub const PGSIZE: usize = 4096;
pub const MAXPATHLEN: usize = 1024;
pub const MAXNAMELEN: usize = 128;

/// Bytes of the write record preceding its inline payload.
pub const WRITE_HEADER: usize = 8;
/// Largest payload one write request can carry.
pub const WRITE_PAYLOAD_MAX: usize = PGSIZE - WRITE_HEADER;

/// Request codes understood by the filesystem server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RequestTag {
    Open = 1,
    SetSize = 2,
    Read = 3,
    Write = 4,
    Stat = 5,
    Flush = 6,
    // 7 is reserved by the server for remove, which this client never issues
    Sync = 8,
}

/// Error codes the server replies with (as negated result words).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ServerErrno {
    Unspecified,
    Invalid,
    NoMemory,
    Eof,
    NoDisk,
    MaxOpen,
    NotFound,
    BadPath,
    FileExists,
    NotSupported,
    Other(i32),
}

impl ServerErrno {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => ServerErrno::Unspecified,
            3 => ServerErrno::Invalid,
            4 => ServerErrno::NoMemory,
            8 => ServerErrno::Eof,
            9 => ServerErrno::NoDisk,
            10 => ServerErrno::MaxOpen,
            11 => ServerErrno::NotFound,
            12 => ServerErrno::BadPath,
            13 => ServerErrno::FileExists,
            15 => ServerErrno::NotSupported,
            other => ServerErrno::Other(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            ServerErrno::Unspecified => 1,
            ServerErrno::Invalid => 3,
            ServerErrno::NoMemory => 4,
            ServerErrno::Eof => 8,
            ServerErrno::NoDisk => 9,
            ServerErrno::MaxOpen => 10,
            ServerErrno::NotFound => 11,
            ServerErrno::BadPath => 12,
            ServerErrno::FileExists => 13,
            ServerErrno::NotSupported => 15,
            ServerErrno::Other(code) => code,
        }
    }
}

/// Open flags carried in the open request, server-compatible values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenMode(u32);

impl OpenMode {
    pub const RDONLY: Self = Self(0x0000);
    pub const WRONLY: Self = Self(0x0001);
    pub const RDWR: Self = Self(0x0002);
    pub const CREATE: Self = Self(0x0100);
    pub const TRUNCATE: Self = Self(0x0200);
    pub const EXCLUSIVE: Self = Self(0x0400);

    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }
}

/// Metadata of one open file as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub name: String,
    pub size: u32,
    pub is_dir: bool,
}

/// The shared request/response scratch: exactly one page.
///
/// One request is in flight at a time; every call overwrites the previous
/// contents, replies land in the same storage.
#[derive(Clone)]
#[repr(C, align(4096))]
pub struct IpcPage([u8; PGSIZE]);

const _: () = assert!(std::mem::size_of::<IpcPage>() == PGSIZE);
const _: () = assert!(std::mem::align_of::<IpcPage>() == PGSIZE);

// write record
const WRITE_ID_OFF: usize = 0;
const WRITE_COUNT_OFF: usize = 4;
// read record
const READ_ID_OFF: usize = 0;
const READ_COUNT_OFF: usize = 4;
// open record
const OPEN_MODE_OFF: usize = MAXPATHLEN;
// stat reply record
const STAT_SIZE_OFF: usize = MAXNAMELEN;
const STAT_ISDIR_OFF: usize = MAXNAMELEN + 4;
// descriptor image (open reply)
const DESC_ID_OFF: usize = 0;
const DESC_MODE_OFF: usize = 4;
// set_size record
const SETSIZE_SIZE_OFF: usize = 4;

impl IpcPage {
    pub fn zeroed() -> Box<Self> {
        Box::new(Self([0; PGSIZE]))
    }

    pub fn bytes(&self) -> &[u8; PGSIZE] {
        &self.0
    }

    pub fn bytes_mut(&mut self) -> &mut [u8; PGSIZE] {
        &mut self.0
    }

    fn put_u32(&mut self, off: usize, value: u32) {
        self.0[off..off + 4].copy_from_slice(&value.to_le_bytes());
    }

    fn get_u32(&self, off: usize) -> u32 {
        u32::from_le_bytes(self.0[off..off + 4].try_into().expect("4 bytes"))
    }

    /// NUL-pad the whole `len`-byte region, then place `s` at its start.
    fn put_str(&mut self, off: usize, len: usize, s: &str) {
        debug_assert!(s.len() < len);
        self.0[off..off + len].fill(0);
        self.0[off..off + s.len()].copy_from_slice(s.as_bytes());
    }

    fn get_str(&self, off: usize, len: usize) -> String {
        let region = &self.0[off..off + len];
        let end = region.iter().position(|&b| b == 0).unwrap_or(len);
        String::from_utf8_lossy(&region[..end]).into_owned()
    }

    // ---- client-side encoders ----

    pub fn encode_open(&mut self, path: &str, mode: OpenMode) {
        self.put_str(0, MAXPATHLEN, path);
        self.put_u32(OPEN_MODE_OFF, mode.bits());
    }

    pub fn encode_read(&mut self, file_id: u32, count: u32) {
        self.put_u32(READ_ID_OFF, file_id);
        self.put_u32(READ_COUNT_OFF, count);
    }

    pub fn encode_write(&mut self, file_id: u32, payload: &[u8]) {
        debug_assert!(payload.len() <= WRITE_PAYLOAD_MAX);
        self.put_u32(WRITE_ID_OFF, file_id);
        self.put_u32(WRITE_COUNT_OFF, payload.len() as u32);
        self.0[WRITE_HEADER..WRITE_HEADER + payload.len()].copy_from_slice(payload);
    }

    pub fn encode_stat(&mut self, file_id: u32) {
        self.put_u32(0, file_id);
    }

    pub fn encode_set_size(&mut self, file_id: u32, size: u32) {
        self.put_u32(0, file_id);
        self.put_u32(SETSIZE_SIZE_OFF, size);
    }

    pub fn encode_flush(&mut self, file_id: u32) {
        self.put_u32(0, file_id);
    }

    pub fn encode_sync(&mut self) {
        // no payload
    }

    // ---- client-side decoders ----

    /// First `count` bytes of a read reply.
    pub fn read_payload(&self, count: usize) -> &[u8] {
        &self.0[..count]
    }

    pub fn decode_stat_reply(&self) -> FileStat {
        FileStat {
            name: self.get_str(0, MAXNAMELEN),
            size: self.get_u32(STAT_SIZE_OFF),
            is_dir: self.get_u32(STAT_ISDIR_OFF) != 0,
        }
    }

    pub fn decode_descriptor(&self) -> (u32, OpenMode) {
        (
            self.get_u32(DESC_ID_OFF),
            OpenMode::from_bits(self.get_u32(DESC_MODE_OFF)),
        )
    }

    // ---- server-side decoders ----

    pub fn decode_open(&self) -> (String, OpenMode) {
        (
            self.get_str(0, MAXPATHLEN),
            OpenMode::from_bits(self.get_u32(OPEN_MODE_OFF)),
        )
    }

    pub fn decode_read(&self) -> (u32, u32) {
        (self.get_u32(READ_ID_OFF), self.get_u32(READ_COUNT_OFF))
    }

    pub fn decode_write(&self) -> (u32, &[u8]) {
        let count = (self.get_u32(WRITE_COUNT_OFF) as usize).min(WRITE_PAYLOAD_MAX);
        (
            self.get_u32(WRITE_ID_OFF),
            &self.0[WRITE_HEADER..WRITE_HEADER + count],
        )
    }

    pub fn decode_stat(&self) -> u32 {
        self.get_u32(0)
    }

    pub fn decode_set_size(&self) -> (u32, u32) {
        (self.get_u32(0), self.get_u32(SETSIZE_SIZE_OFF))
    }

    pub fn decode_flush(&self) -> u32 {
        self.get_u32(0)
    }

    // ---- server-side encoders ----

    pub fn encode_read_reply(&mut self, data: &[u8]) {
        debug_assert!(data.len() <= PGSIZE);
        self.0[..data.len()].copy_from_slice(data);
    }

    pub fn encode_stat_reply(&mut self, name: &str, size: u32, is_dir: bool) {
        self.put_str(0, MAXNAMELEN, name);
        self.put_u32(STAT_SIZE_OFF, size);
        self.put_u32(STAT_ISDIR_OFF, is_dir as u32);
    }

    pub fn encode_descriptor(&mut self, file_id: u32, mode: OpenMode) {
        self.put_u32(DESC_ID_OFF, file_id);
        self.put_u32(DESC_MODE_OFF, mode.bits());
    }
}

impl Default for IpcPage {
    fn default() -> Self {
        Self([0; PGSIZE])
    }
}
