// Byte stream primitives used by the tag layout code
//
// Tags live at the tail of the file, so every structural edit (insert or
// remove) only has to move the bytes that follow the edited range. Those
// bytes are at most one APE tag plus one ID3v1 tag and are buffered whole.

use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// A seekable byte stream that can grow and shrink in place.
pub trait TagStream: Read + Write + Seek {
    /// Total stream length in bytes
    fn length(&mut self) -> io::Result<u64>;

    /// Cut the stream to `len` bytes
    fn truncate(&mut self, len: u64) -> io::Result<()>;

    /// Whether writes are refused
    fn is_read_only(&self) -> bool;

    /// Read up to `len` bytes starting at `offset`. Short reads happen at end of stream.
    fn read_block(&mut self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        self.seek(SeekFrom::Start(offset))?;
        let mut buffer = Vec::with_capacity(len);
        Read::take(&mut *self, len as u64).read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    /// Overwrite bytes at `offset` without changing the stream length
    /// (unless the write runs past the end).
    fn write_at(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
        self.seek(SeekFrom::Start(offset))?;
        self.write_all(data)?;
        self.flush()
    }

    /// Append `data` at end of stream and return the offset it was written at.
    fn append(&mut self, data: &[u8]) -> io::Result<u64> {
        let offset = self.seek(SeekFrom::End(0))?;
        self.write_all(data)?;
        self.flush()?;
        Ok(offset)
    }

    /// Replace `replace` bytes at `start` with `data`, shifting everything after.
    fn insert(&mut self, data: &[u8], start: u64, replace: u64) -> io::Result<()> {
        if data.len() as u64 == replace {
            return self.write_at(start, data);
        }

        let old_length = self.length()?;
        let tail_start = start.saturating_add(replace).min(old_length);
        let mut tail = Vec::new();
        self.seek(SeekFrom::Start(tail_start))?;
        self.read_to_end(&mut tail)?;

        self.seek(SeekFrom::Start(start))?;
        self.write_all(data)?;
        self.write_all(&tail)?;
        self.flush()?;

        let new_length = start + data.len() as u64 + tail.len() as u64;
        if new_length < old_length {
            self.truncate(new_length)?;
        }
        Ok(())
    }

    /// Remove `len` bytes at `start`.
    fn remove_block(&mut self, start: u64, len: u64) -> io::Result<()> {
        self.insert(&[], start, len)
    }
}

/// A file on disk
#[derive(Debug)]
pub struct FileStream {
    file: File,
    read_only: bool,
}

impl FileStream {
    /// Open for reading and writing, falling back to read-only when the file
    /// cannot be opened for writing.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref();
        match OpenOptions::new().read(true).write(true).open(path) {
            Ok(file) => Ok(FileStream { file, read_only: false }),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                log::debug!("{} is not writable, opening read-only", path.display());
                Self::open_read_only(path)
            }
            Err(e) => Err(e),
        }
    }

    pub fn open_read_only<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(FileStream { file, read_only: true })
    }
}

impl Read for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for FileStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Seek for FileStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl TagStream for FileStream {
    fn length(&mut self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.file.set_len(len)
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }
}

/// An in-memory stream
#[derive(Debug, Default, Clone)]
pub struct MemoryStream {
    cursor: Cursor<Vec<u8>>,
    read_only: bool,
}

impl MemoryStream {
    pub fn new(data: Vec<u8>) -> Self {
        MemoryStream { cursor: Cursor::new(data), read_only: false }
    }

    pub fn read_only(data: Vec<u8>) -> Self {
        MemoryStream { cursor: Cursor::new(data), read_only: true }
    }

    pub fn data(&self) -> &[u8] {
        self.cursor.get_ref()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.cursor.into_inner()
    }
}

impl Read for MemoryStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.read_only {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "stream is read-only"));
        }
        self.cursor.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemoryStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}

impl TagStream for MemoryStream {
    fn length(&mut self) -> io::Result<u64> {
        Ok(self.cursor.get_ref().len() as u64)
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        if self.read_only {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "stream is read-only"));
        }
        self.cursor.get_mut().truncate(len as usize);
        Ok(())
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }
}
