//! Animation track encoding (`M2Track<T>`)
//!
//! A track header is 20 bytes:
//!
//! ```text
//! u16 interpolation
//! i16 global_sequence      (-1 when not looping globally)
//! M2Array<M2Array<u32>>    timestamps, one inner array per sequence
//! M2Array<M2Array<T>>      values, one inner array per sequence
//! ```
//!
//! Inner arrays are appended to the data region before the outer arrays
//! that point at them.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT

use crate::common::ToBytes;
use crate::error::Result;
use crate::formats::offset::{OffsetArray, OffsetBuilder, Section};
use crate::geometry::KeyframeTrack;

/// Encoded size of a track header.
pub const TRACK_HEADER_SIZE: usize = 20;

/// Append the track's keyframes and return its 20-byte header.
///
/// A track with keyframes is stored as a single sequence; an empty track
/// has empty outer arrays.
pub fn write_track<T: ToBytes + Copy>(builder: &mut OffsetBuilder, track: &KeyframeTrack<T>) -> Result<Vec<u8>> {
    let (timestamps, values) = if track.keyframes.is_empty() {
        (OffsetArray::EMPTY, OffsetArray::EMPTY)
    } else {
        let times: Vec<u32> = track.keyframes.iter().map(|key| key.timestamp_ms).collect();
        let data: Vec<T> = track.keyframes.iter().map(|key| key.value).collect();
        let inner_times = builder.push_array(&times)?;
        let inner_values = builder.push_array(&data)?;
        (
            builder.push_array(&[inner_times])?,
            builder.push_array(&[inner_values])?,
        )
    };

    let mut header = Section::with_capacity(TRACK_HEADER_SIZE);
    header.write_u16(track.interpolation as u16);
    header.write_i16(track.global_sequence.map_or(-1, |g| g as i16));
    header.write(&timestamps);
    header.write(&values);
    Ok(header.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{OPACITY_OPAQUE, TransparencyTrack};

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn test_empty_track() {
        let mut builder = OffsetBuilder::new(0);
        let header = write_track(&mut builder, &TransparencyTrack::new(None)).unwrap();
        assert_eq!(header.len(), TRACK_HEADER_SIZE);
        assert_eq!(&header[2..4], &(-1i16).to_le_bytes());
        assert!(header[4..].iter().all(|&b| b == 0));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_nested_arrays_resolve() {
        let mut builder = OffsetBuilder::new(TRACK_HEADER_SIZE);
        let mut track = TransparencyTrack::new(Some(2));
        track.push(0, 0);
        track.push(250, OPACITY_OPAQUE);
        let header = write_track(&mut builder, &track).unwrap();
        let bytes = builder.finish(&header).unwrap();

        assert_eq!(&bytes[2..4], &2i16.to_le_bytes());
        // Outer timestamps array -> one inner array -> two timestamps.
        assert_eq!(read_u32(&bytes, 4), 1);
        let outer = read_u32(&bytes, 8) as usize;
        assert_eq!(read_u32(&bytes, outer), 2);
        let inner = read_u32(&bytes, outer + 4) as usize;
        assert_eq!(read_u32(&bytes, inner + 4), 250);

        // Outer values array -> one inner array -> fixed16 opacities.
        let outer = read_u32(&bytes, 16) as usize;
        let inner = read_u32(&bytes, outer + 4) as usize;
        assert_eq!(&bytes[inner + 2..inner + 4], &OPACITY_OPAQUE.to_le_bytes());
    }
}
