//! Streaming ZIP archive traversal
//!
//! Photogrammetry archives arrive as a byte stream from an object store, with
//! no random access and a member list that is not known in advance. This
//! module walks the archive's local file structures progressively: each call
//! to [`ArchiveReader::next_entry`] parses one local header and hands back an
//! [`Entry`] whose content can be read incrementally, without ever buffering
//! the whole archive.
//!
//! An [`Entry`] must be consumed exactly once before the reader can advance:
//! either drained with [`Entry::skip`] or read with [`Entry::read_to_vec`].
//! The borrow it holds on the reader makes requesting the next entry
//! impossible while one is alive, and dropping an unconsumed entry drains its
//! remaining bytes as a backstop. Skipping this drain would leave the stream
//! pointing into the middle of a member and stall everything after it.
//!
//! # Example
//!
//! ```no_run
//! use photoscene::ArchiveReader;
//! use std::fs::File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = File::open("all.zip")?;
//! let mut reader = ArchiveReader::new(file);
//!
//! while let Some(entry) = reader.next_entry()? {
//!     println!("{} ({:?})", entry.path(), entry.kind());
//!     entry.skip()?;
//! }
//! # Ok(())
//! # }
//! ```

mod header;

use crate::error::{Error, Result};
use crate::event;
use flate2::Crc;
use flate2::bufread::DeflateDecoder;
use header::{METHOD_DEFLATE, METHOD_STORED};
use std::io::{self, BufReader, Read};
use tracing::debug;

/// Classification of an archive member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file member
    File,
    /// A directory member (path ends with `/`, no content)
    Directory,
}

/// Pull-based reader over a ZIP byte stream
///
/// The reader requires only [`Read`], not `Seek`: it never consults the
/// central directory and instead parses each member's local header as it
/// arrives. Reaching the central directory (or a clean EOF) ends traversal.
pub struct ArchiveReader<R: Read> {
    inner: BufReader<R>,
    finished: bool,
    poisoned: bool,
}

impl<R: Read> ArchiveReader<R> {
    /// Create a reader over a byte stream known to contain a ZIP archive
    pub fn new(source: R) -> Self {
        ArchiveReader {
            inner: BufReader::new(source),
            finished: false,
            poisoned: false,
        }
    }

    /// Advance to the next member, or `None` after the last one
    ///
    /// Returns an error if the stream does not parse as a ZIP member list,
    /// or if an earlier entry failed in a way that lost stream alignment.
    /// Errors from `next_entry` are not recoverable: without random access
    /// there is no way to find the next member boundary.
    pub fn next_entry(&mut self) -> Result<Option<Entry<'_, R>>> {
        if self.finished {
            return Ok(None);
        }
        if self.poisoned {
            return Err(Error::archive(
                "stream desynchronized by an earlier member failure",
            ));
        }

        let ArchiveReader {
            inner,
            finished,
            poisoned,
        } = self;

        let header = match header::read_local_header(inner) {
            Ok(Some(header)) => header,
            Ok(None) => {
                *finished = true;
                return Ok(None);
            }
            Err(e) => {
                *poisoned = true;
                return Err(e);
            }
        };

        let path = normalize_entry_path(&header.raw_path);
        let kind = if path.ends_with('/') {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let declared_compressed = u64::from(header.compressed_size);
        let has_descriptor = header.has_data_descriptor();

        // A descriptor means the local header carries no sizes. That is fine
        // for DEFLATE (the compressed stream marks its own end) but fatal for
        // anything we cannot decode: the member's length is unknowable.
        if has_descriptor {
            let undecodable = header.is_encrypted() || header.method != METHOD_DEFLATE;
            if undecodable {
                *poisoned = true;
                return Err(Error::unsupported(format!(
                    "member '{path}' has a data descriptor but no decodable length"
                )));
            }
        }

        let body = if header.is_encrypted() {
            Body::Unsupported {
                inner,
                remaining: declared_compressed,
                detail: "encrypted member".to_string(),
            }
        } else {
            match header.method {
                METHOD_STORED => Body::Stored {
                    inner,
                    remaining: declared_compressed,
                },
                METHOD_DEFLATE => Body::Deflate {
                    decoder: DeflateDecoder::new(inner),
                    finished: false,
                },
                other => Body::Unsupported {
                    inner,
                    remaining: declared_compressed,
                    detail: format!("compression method {other}"),
                },
            }
        };

        Ok(Some(Entry {
            path,
            kind,
            crc32: header.crc32,
            declared_compressed,
            has_descriptor,
            done: false,
            body,
            poisoned,
        }))
    }
}

enum Body<'a, R: Read> {
    Stored {
        inner: &'a mut BufReader<R>,
        remaining: u64,
    },
    Deflate {
        decoder: DeflateDecoder<&'a mut BufReader<R>>,
        finished: bool,
    },
    Unsupported {
        inner: &'a mut BufReader<R>,
        remaining: u64,
        detail: String,
    },
}

/// One archive member, positioned at its content
///
/// The entry mutably borrows the [`ArchiveReader`], so it must be consumed
/// (via [`Entry::skip`] or [`Entry::read_to_vec`], or by dropping it) before
/// the next member can be requested. Content is decompressed incrementally;
/// an unselected entry costs decompression but never an allocation of its
/// full size.
pub struct Entry<'a, R: Read> {
    path: String,
    kind: EntryKind,
    crc32: u32,
    declared_compressed: u64,
    has_descriptor: bool,
    done: bool,
    body: Body<'a, R>,
    poisoned: &'a mut bool,
}

impl<'a, R: Read> Entry<'a, R> {
    /// The member's archive-relative path, percent-decoded, with `+`
    /// normalized to space and `\` to `/`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the member is a file or a directory
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Discard the member's content and advance past it
    pub fn skip(mut self) -> Result<()> {
        self.finish()
    }

    /// Read the member's full content into memory and advance past it
    ///
    /// Verifies the member's CRC-32 when the header declares one. On a
    /// content error the reader stays usable if the member's extent is
    /// known; otherwise subsequent `next_entry` calls report a
    /// desynchronized stream.
    pub fn read_to_vec(mut self) -> Result<Vec<u8>> {
        let mut contents = Vec::new();
        if let Err(e) = self.read_to_end(&mut contents) {
            if e.kind() == io::ErrorKind::Unsupported {
                let detail = self.unsupported_detail();
                self.finish()?;
                return Err(Error::unsupported(detail));
            }
            if self.recover_after_content_error() {
                return Err(Error::archive(format!(
                    "could not decompress '{}': {e}",
                    self.path
                )));
            }
            return Err(Error::Io(e));
        }

        self.finish()?;

        if !self.has_descriptor {
            let mut crc = Crc::new();
            crc.update(&contents);
            if crc.sum() != self.crc32 {
                return Err(Error::archive(format!(
                    "CRC mismatch for '{}': header declares {:#010x}, content is {:#010x}",
                    self.path,
                    self.crc32,
                    crc.sum()
                )));
            }
        }

        Ok(contents)
    }

    /// Drain any unread content and consume the member's trailer
    fn finish(&mut self) -> Result<()> {
        if self.done {
            return Ok(());
        }
        self.done = true;
        let result = self.finish_inner();
        if result.is_err() {
            *self.poisoned = true;
        }
        result
    }

    fn finish_inner(&mut self) -> Result<()> {
        let has_descriptor = self.has_descriptor;
        let declared = self.declared_compressed;
        match &mut self.body {
            Body::Stored { inner, remaining } => {
                header::skip_exact(inner, *remaining)?;
                *remaining = 0;
            }
            Body::Deflate { decoder, finished } => {
                if !*finished {
                    io::copy(&mut *decoder, &mut io::sink())?;
                    *finished = true;
                }
                if has_descriptor {
                    header::consume_data_descriptor(decoder.get_mut())?;
                } else {
                    // A compliant member consumes exactly its declared size;
                    // trailing slack is skipped, overrun means desync.
                    let consumed = decoder.total_in();
                    if consumed > declared {
                        return Err(Error::archive(format!(
                            "member '{}' overran its declared compressed size",
                            self.path
                        )));
                    }
                    header::skip_exact(decoder.get_mut(), declared - consumed)?;
                }
            }
            Body::Unsupported { inner, remaining, .. } => {
                header::skip_exact(inner, *remaining)?;
                *remaining = 0;
            }
        }
        Ok(())
    }

    /// Try to realign the stream after a content error
    ///
    /// Possible only when the header declared the compressed size: whatever
    /// the decoder consumed, the rest of the member can be skipped byte-wise.
    fn recover_after_content_error(&mut self) -> bool {
        self.done = true;
        let declared = self.declared_compressed;
        let recovered = !self.has_descriptor
            && match &mut self.body {
                Body::Deflate { decoder, finished } => {
                    *finished = true;
                    let consumed = decoder.total_in();
                    consumed <= declared
                        && header::skip_exact(decoder.get_mut(), declared - consumed).is_ok()
                }
                _ => false,
            };
        if !recovered {
            *self.poisoned = true;
        }
        recovered
    }

    fn unsupported_detail(&self) -> String {
        match &self.body {
            Body::Unsupported { detail, .. } => format!("{detail} ('{}')", self.path),
            _ => format!("unsupported member '{}'", self.path),
        }
    }
}

impl<'a, R: Read> Read for Entry<'a, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.done || buf.is_empty() {
            return Ok(0);
        }
        match &mut self.body {
            Body::Stored { inner, remaining } => {
                let cap = (*remaining).min(buf.len() as u64) as usize;
                if cap == 0 {
                    return Ok(0);
                }
                let n = inner.read(&mut buf[..cap])?;
                if n == 0 {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        "archive member truncated",
                    ));
                }
                *remaining -= n as u64;
                Ok(n)
            }
            Body::Deflate { decoder, finished } => {
                if *finished {
                    return Ok(0);
                }
                let n = decoder.read(buf)?;
                if n == 0 {
                    *finished = true;
                }
                Ok(n)
            }
            Body::Unsupported { detail, .. } => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                detail.clone(),
            )),
        }
    }
}

impl<'a, R: Read> Drop for Entry<'a, R> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Err(e) = self.finish() {
            debug!("entry '{}' was not cleanly drained: {e}", self.path);
        }
    }
}

fn normalize_entry_path(raw: &str) -> String {
    event::percent_decode(raw).replace('\\', "/")
}
