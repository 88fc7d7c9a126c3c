//! Ogg sync/decoder for reading Ogg streams back.

use std::io::{self, Read};

use super::page::{Page, OGG_MAGIC, PAGE_HEADER_SIZE};

fn u32_le(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

fn u64_le(b: &[u8]) -> u64 {
    u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]])
}

/// Ogg sync state for reading pages.
pub struct OggSync<R: Read> {
    reader: R,
}

impl<R: Read> OggSync<R> {
    /// Creates a new Ogg sync state.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads the next Ogg page.
    ///
    /// Returns `Ok(None)` at a clean end of stream.
    pub fn read_page(&mut self) -> io::Result<Option<Page>> {
        let mut header = [0u8; PAGE_HEADER_SIZE];
        match self.reader.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e),
        }

        if &header[0..4] != OGG_MAGIC {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "invalid Ogg magic"));
        }

        let mut segment_table = vec![0u8; header[26] as usize];
        self.reader.read_exact(&mut segment_table)?;

        let body_size: usize = segment_table.iter().map(|&s| s as usize).sum();
        let mut body = vec![0u8; body_size];
        self.reader.read_exact(&mut body)?;

        Ok(Some(Page {
            version: header[4],
            header_type: header[5],
            granule_position: u64_le(&header[6..14]),
            serial: u32_le(&header[14..18]),
            sequence: u32_le(&header[18..22]),
            checksum: u32_le(&header[22..26]),
            segment_table,
            body,
        }))
    }

    /// Returns the inner reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Iterator for OggSync<R> {
    type Item = io::Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_page().transpose()
    }
}

/// Reads every page of an in-memory Ogg stream.
pub fn read_pages(data: &[u8]) -> io::Result<Vec<Page>> {
    OggSync::new(data).collect()
}
