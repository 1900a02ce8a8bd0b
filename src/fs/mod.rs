//! User-space filesystem client.
//!
//! Every operation follows one pattern: fill the shared request page with
//! a type-specific record, run one synchronous round trip through the
//! gateway, interpret the result word. No operation returns before the
//! server replies.

pub mod fd;
pub mod ipc;
pub mod proto;

use crate::error::Error;
use crate::fs::fd::{FdTable, FileDescriptor};
use crate::fs::ipc::{FsConnection, Transport};
use crate::fs::proto::{
    FileStat, OpenMode, RequestTag, ServerErrno, MAXPATHLEN, PGSIZE, WRITE_PAYLOAD_MAX,
};
use crate::km_debug;

/// POSIX-like file operations multiplexed over one server connection.
pub struct FileClient<T: Transport> {
    conn: FsConnection<T>,
    fds: FdTable,
}

impl<T: Transport> FileClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            conn: FsConnection::new(transport),
            fds: FdTable::new(),
        }
    }

    /// Open (or create) the file at `path`, returning its descriptor
    /// index. Over-long paths are rejected before a descriptor is
    /// reserved or any request leaves the process.
    pub fn open(&mut self, path: &str, mode: OpenMode) -> Result<usize, Error> {
        if path.len() >= MAXPATHLEN {
            return Err(Error::BadPath);
        }

        let fd = self.fds.alloc()?;
        km_debug!(target: "file", "open {path} mode {:#x}", mode.bits());

        self.conn.scratch().encode_open(path, mode);
        match self.call(RequestTag::Open) {
            Ok(_) => {
                let (file_id, mode) = self.conn.page().decode_descriptor();
                self.fds.install(fd, FileDescriptor::new(file_id, mode));
                Ok(fd)
            }
            Err(e) => {
                // nothing reached the server under this descriptor, so
                // there is nothing to flush
                _ = self.fds.release(fd);
                Err(e)
            }
        }
    }

    /// Flush the file, then free the descriptor slot whatever the flush
    /// said; the flush result is the close result.
    pub fn close(&mut self, fd: usize) -> Result<(), Error> {
        let flushed = self.flush(fd);
        self.fds.release(fd)?;
        flushed
    }

    /// Tell the server this client is done mutating the file for now.
    /// Also how the server learns a reference went away on close.
    pub fn flush(&mut self, fd: usize) -> Result<(), Error> {
        let file_id = self.fds.get(fd)?.file_id();
        self.conn.scratch().encode_flush(file_id);
        self.call(RequestTag::Flush)?;
        Ok(())
    }

    /// Read up to `buf.len()` bytes at the file's current position.
    /// Returns how many bytes actually arrived, zero at end of file.
    pub fn read(&mut self, fd: usize, buf: &mut [u8]) -> Result<usize, Error> {
        let file_id = self.fds.get(fd)?.file_id();
        let requested = buf.len().min(PGSIZE) as u32;

        self.conn.scratch().encode_read(file_id, requested);
        let ret = self.call(RequestTag::Read)?;
        let count = reply_count(ret, requested)?;

        buf[..count].copy_from_slice(self.conn.page().read_payload(count));
        Ok(count)
    }

    /// Write from `buf` at the file's current position, returning how many
    /// bytes the server accepted. One request carries at most one page
    /// minus the record header; longer buffers are silently cut to that,
    /// transferring fewer bytes than asked is part of the contract, not an
    /// error. Re-invoke for the remainder.
    pub fn write(&mut self, fd: usize, buf: &[u8]) -> Result<usize, Error> {
        let file_id = self.fds.get(fd)?.file_id();
        let chunk = &buf[..buf.len().min(WRITE_PAYLOAD_MAX)];

        self.conn.scratch().encode_write(file_id, chunk);
        let ret = self.call(RequestTag::Write)?;
        reply_count(ret, chunk.len() as u32)
    }

    /// Fetch name, size and directory flag of the open file.
    pub fn stat(&mut self, fd: usize) -> Result<FileStat, Error> {
        let file_id = self.fds.get(fd)?.file_id();
        self.conn.scratch().encode_stat(file_id);
        self.call(RequestTag::Stat)?;
        Ok(self.conn.page().decode_stat_reply())
    }

    /// Grow or shrink the open file to exactly `size` bytes.
    pub fn truncate(&mut self, fd: usize, size: u32) -> Result<(), Error> {
        let file_id = self.fds.get(fd)?.file_id();
        self.conn.scratch().encode_set_size(file_id, size);
        self.call(RequestTag::SetSize)?;
        Ok(())
    }

    /// Ask the server to push every dirty cached block to disk.
    pub fn sync(&mut self) -> Result<(), Error> {
        self.conn.scratch().encode_sync();
        self.call(RequestTag::Sync)?;
        Ok(())
    }

    /// Round trip plus result-word interpretation: negative is a server
    /// error code, everything else passes through.
    fn call(&mut self, tag: RequestTag) -> Result<i32, Error> {
        let ret = self.conn.call(tag)?;
        if ret < 0 {
            return Err(Error::Server(ServerErrno::from_code(-ret)));
        }
        Ok(ret)
    }
}

/// A transfer count from the server may never exceed what was requested
/// or one page; a violation means the protocol state is corrupt.
fn reply_count(ret: i32, requested: u32) -> Result<usize, Error> {
    let got = ret as u32;
    if got > requested || got as usize > PGSIZE {
        return Err(Error::CountOverrun { got, requested });
    }
    Ok(got as usize)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_reply_count_bounds() {
        assert_eq!(reply_count(0, 0).unwrap(), 0);
        assert_eq!(reply_count(5, 10).unwrap(), 5);
        assert!(matches!(
            reply_count(11, 10).unwrap_err(),
            Error::CountOverrun {
                got: 11,
                requested: 10
            }
        ));
    }
}
