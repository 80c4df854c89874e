//! Raw ZIP record structures
//!
//! Little-endian field walks over the local file headers and the trailing
//! data descriptors of a ZIP stream. Central-directory records are only
//! recognized, never parsed: reaching one means every member has been seen.

use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Read;

pub(crate) const LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
pub(crate) const CENTRAL_DIR_SIG: u32 = 0x0201_4b50;
pub(crate) const END_OF_CENTRAL_DIR_SIG: u32 = 0x0605_4b50;
pub(crate) const DATA_DESCRIPTOR_SIG: u32 = 0x0807_4b50;

/// General-purpose flag bit 0: member is encrypted
pub(crate) const FLAG_ENCRYPTED: u16 = 0x0001;
/// General-purpose flag bit 3: sizes and CRC live in a trailing descriptor
pub(crate) const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;

pub(crate) const METHOD_STORED: u16 = 0;
pub(crate) const METHOD_DEFLATE: u16 = 8;

/// ZIP64 size sentinel in 32-bit size fields
const ZIP64_SENTINEL: u32 = u32::MAX;

/// One parsed local file header
#[derive(Debug, Clone)]
pub(crate) struct LocalHeader {
    pub flags: u16,
    pub method: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub raw_path: String,
}

impl LocalHeader {
    pub(crate) fn has_data_descriptor(&self) -> bool {
        self.flags & FLAG_DATA_DESCRIPTOR != 0
    }

    pub(crate) fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }
}

/// Read the next local file header, or `None` at the end of the member list
///
/// `None` is returned when the stream reaches the central directory, the
/// end-of-central-directory record, or a clean EOF (a degenerate archive
/// with no members and no directory).
pub(crate) fn read_local_header<R: Read>(reader: &mut R) -> Result<Option<LocalHeader>> {
    let signature = match read_signature(reader)? {
        Some(signature) => signature,
        None => return Ok(None),
    };

    match signature {
        LOCAL_HEADER_SIG => {}
        CENTRAL_DIR_SIG | END_OF_CENTRAL_DIR_SIG => return Ok(None),
        other => {
            return Err(Error::archive(format!(
                "unexpected record signature {other:#010x}"
            )));
        }
    }

    let _version_needed = reader.read_u16::<LittleEndian>()?;
    let flags = reader.read_u16::<LittleEndian>()?;
    let method = reader.read_u16::<LittleEndian>()?;
    let _mod_time = reader.read_u16::<LittleEndian>()?;
    let _mod_date = reader.read_u16::<LittleEndian>()?;
    let crc32 = reader.read_u32::<LittleEndian>()?;
    let compressed_size = reader.read_u32::<LittleEndian>()?;
    let uncompressed_size = reader.read_u32::<LittleEndian>()?;
    let name_len = reader.read_u16::<LittleEndian>()? as usize;
    let extra_len = reader.read_u16::<LittleEndian>()? as u64;

    let mut name = vec![0u8; name_len];
    reader.read_exact(&mut name)?;
    skip_exact(reader, extra_len)?;

    if compressed_size == ZIP64_SENTINEL || uncompressed_size == ZIP64_SENTINEL {
        return Err(Error::unsupported(format!(
            "ZIP64 member '{}'",
            String::from_utf8_lossy(&name)
        )));
    }

    // Entry names are UTF-8 when flag bit 11 is set and CP437 otherwise;
    // the markers this pipeline selects on are plain ASCII either way.
    let raw_path = String::from_utf8_lossy(&name).into_owned();

    Ok(Some(LocalHeader {
        flags,
        method,
        crc32,
        compressed_size,
        raw_path,
    }))
}

/// Consume a trailing data descriptor (12 bytes, or 16 with its optional
/// leading signature)
pub(crate) fn consume_data_descriptor<R: Read>(reader: &mut R) -> Result<()> {
    let first = reader.read_u32::<LittleEndian>()?;
    if first == DATA_DESCRIPTOR_SIG {
        // crc32, compressed size, uncompressed size
        skip_exact(reader, 12)?;
    } else {
        // `first` was the crc32; two size fields remain.
        skip_exact(reader, 8)?;
    }
    Ok(())
}

fn read_signature<R: Read>(reader: &mut R) -> Result<Option<u32>> {
    let mut buf = [0u8; 4];
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(Error::archive(
                "archive truncated inside a record signature",
            ));
        }
        filled += n;
    }
    Ok(Some(u32::from_le_bytes(buf)))
}

/// Discard exactly `count` bytes from the reader
pub(crate) fn skip_exact<R: Read>(reader: &mut R, count: u64) -> Result<()> {
    let copied = std::io::copy(&mut reader.by_ref().take(count), &mut std::io::sink())?;
    if copied != count {
        return Err(Error::archive(format!(
            "archive truncated: expected {count} more bytes, found {copied}"
        )));
    }
    Ok(())
}
