//! Chunk framing
//!
//! Every world-object and map file is a run of chunks:
//!
//! ```text
//! [token: 4 bytes][length: u32 LE][payload: length bytes]
//! ```
//!
//! The client reads the token as a little-endian `u32`, so on disk the four
//! characters appear reversed (`MVER` is stored as `REVM`). [`FourCC`] always
//! holds the readable order; the reversal happens only at the byte boundary.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use std::fmt;
use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Error, Result};

/// Size of a chunk header (token + length).
pub const CHUNK_HEADER_SIZE: usize = 8;

/// A four-character chunk token in readable order.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCC([u8; 4]);

impl FourCC {
    /// Build a token from a literal.
    ///
    /// # Panics
    /// Panics (at compile time in const contexts) if a byte is not ASCII.
    #[must_use]
    pub const fn new(token: &[u8; 4]) -> Self {
        let mut i = 0;
        while i < 4 {
            assert!(token[i].is_ascii(), "chunk tokens are ASCII");
            i += 1;
        }
        Self(*token)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Bytes as they appear in the file.
    #[must_use]
    pub const fn to_disk_bytes(self) -> [u8; 4] {
        [self.0[3], self.0[2], self.0[1], self.0[0]]
    }

    #[must_use]
    pub const fn from_disk_bytes(bytes: [u8; 4]) -> Self {
        Self([bytes[3], bytes[2], bytes[1], bytes[0]])
    }
}

impl TryFrom<&str> for FourCC {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        let bytes: [u8; 4] = value
            .as_bytes()
            .try_into()
            .map_err(|_| Error::InvalidChunkToken(value.to_string()))?;
        if !bytes.is_ascii() {
            return Err(Error::InvalidChunkToken(value.to_string()));
        }
        Ok(Self(bytes))
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC({self})")
    }
}

/// Frame `payload` as one chunk.
pub fn wrap_in_chunk(token: FourCC, payload: &[u8]) -> Result<Vec<u8>> {
    let length = u32::try_from(payload.len()).map_err(|_| Error::OffsetOverflow(payload.len()))?;
    let mut out = Vec::with_capacity(CHUNK_HEADER_SIZE + payload.len());
    out.extend_from_slice(&token.to_disk_bytes());
    out.extend_from_slice(&length.to_le_bytes());
    out.extend_from_slice(payload);
    Ok(out)
}

/// Accumulates chunks into one file buffer.
#[derive(Debug, Default)]
pub struct ChunkWriter {
    data: Vec<u8>,
}

impl ChunkWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one chunk.
    pub fn chunk(&mut self, token: FourCC, payload: &[u8]) -> Result<&mut Self> {
        self.data.extend_from_slice(&wrap_in_chunk(token, payload)?);
        Ok(self)
    }

    /// Append a `MVER` chunk.
    pub fn version(&mut self, version: u32) -> Result<&mut Self> {
        self.chunk(tokens::MVER, &version.to_le_bytes())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.data
    }
}

/// A parsed chunk borrowing its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub token: FourCC,
    /// Offset of the chunk header within the parsed buffer.
    pub offset: usize,
    pub payload: &'a [u8],
}

impl Chunk<'_> {
    /// Fail unless this chunk carries `expected`.
    pub fn expect_token(&self, expected: FourCC) -> Result<()> {
        if self.token == expected {
            Ok(())
        } else {
            Err(Error::UnexpectedChunk {
                expected: expected.to_string(),
                found: self.token.to_string(),
            })
        }
    }
}

/// Parse the chunk starting at `offset`.
pub fn read_chunk(data: &[u8], offset: usize) -> Result<Chunk<'_>> {
    let available = data.len().saturating_sub(offset);
    if available < CHUNK_HEADER_SIZE {
        return Err(Error::TruncatedChunk {
            offset,
            needed: CHUNK_HEADER_SIZE,
            available,
        });
    }
    let mut cursor = Cursor::new(&data[offset..]);
    let mut token = [0u8; 4];
    cursor.read_exact(&mut token)?;
    let length = cursor.read_u32::<LittleEndian>()? as usize;
    let start = offset + CHUNK_HEADER_SIZE;
    if available - CHUNK_HEADER_SIZE < length {
        return Err(Error::TruncatedChunk {
            offset,
            needed: CHUNK_HEADER_SIZE + length,
            available,
        });
    }
    Ok(Chunk {
        token: FourCC::from_disk_bytes(token),
        offset,
        payload: &data[start..start + length],
    })
}

/// Parse a buffer that consists entirely of chunks.
pub fn read_chunks(data: &[u8]) -> Result<Vec<Chunk<'_>>> {
    let mut chunks = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        let chunk = read_chunk(data, offset)?;
        offset += CHUNK_HEADER_SIZE + chunk.payload.len();
        chunks.push(chunk);
    }
    Ok(chunks)
}

/// Tokens used by the writers.
pub mod tokens {
    use super::FourCC;

    pub const MVER: FourCC = FourCC::new(b"MVER");

    // World-object root
    pub const MOHD: FourCC = FourCC::new(b"MOHD");
    pub const MOTX: FourCC = FourCC::new(b"MOTX");
    pub const MOMT: FourCC = FourCC::new(b"MOMT");
    pub const MOGN: FourCC = FourCC::new(b"MOGN");
    pub const MOGI: FourCC = FourCC::new(b"MOGI");
    pub const MOSB: FourCC = FourCC::new(b"MOSB");
    pub const MOPV: FourCC = FourCC::new(b"MOPV");
    pub const MOPT: FourCC = FourCC::new(b"MOPT");
    pub const MOPR: FourCC = FourCC::new(b"MOPR");
    pub const MOVV: FourCC = FourCC::new(b"MOVV");
    pub const MOVB: FourCC = FourCC::new(b"MOVB");
    pub const MOLT: FourCC = FourCC::new(b"MOLT");
    pub const MODS: FourCC = FourCC::new(b"MODS");
    pub const MODN: FourCC = FourCC::new(b"MODN");
    pub const MODD: FourCC = FourCC::new(b"MODD");
    pub const MFOG: FourCC = FourCC::new(b"MFOG");

    // World-object group
    pub const MOGP: FourCC = FourCC::new(b"MOGP");
    pub const MOPY: FourCC = FourCC::new(b"MOPY");
    pub const MOVI: FourCC = FourCC::new(b"MOVI");
    pub const MOVT: FourCC = FourCC::new(b"MOVT");
    pub const MONR: FourCC = FourCC::new(b"MONR");
    pub const MOTV: FourCC = FourCC::new(b"MOTV");
    pub const MOBA: FourCC = FourCC::new(b"MOBA");
    pub const MOCV: FourCC = FourCC::new(b"MOCV");
    pub const MOBN: FourCC = FourCC::new(b"MOBN");
    pub const MOBR: FourCC = FourCC::new(b"MOBR");

    // Map descriptors
    pub const MPHD: FourCC = FourCC::new(b"MPHD");
    pub const MAIN: FourCC = FourCC::new(b"MAIN");
    pub const MWMO: FourCC = FourCC::new(b"MWMO");
    pub const MODF: FourCC = FourCC::new(b"MODF");
    pub const MWID: FourCC = FourCC::new(b"MWID");
    pub const MAOF: FourCC = FourCC::new(b"MAOF");
}
