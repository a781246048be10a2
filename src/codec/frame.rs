// Copyright 2025 jonefeewang@gmail.com
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use bytes::{Buf, BufMut, BytesMut};

use crate::codec::FieldValue;
use crate::AppError::Incomplete;
use crate::{AppError, AppResult};

/// One decoded, tag-discriminated unit of the wire protocol: a length
/// prefix on the wire, a tag, and an ordered run of typed fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub tag: u16,
    pub fields: Vec<FieldValue>,
}

impl Frame {
    pub fn new(tag: u16, fields: Vec<FieldValue>) -> Frame {
        Frame { tag, fields }
    }

    /// Checks whether `buffer` starts with one complete frame.
    ///
    /// Returns the `Incomplete` marker when more bytes are needed, and a
    /// malformed-protocol error for a negative or oversized length prefix.
    /// The connection cannot recover from the latter: once the length
    /// prefix is untrustworthy the stream is desynchronized.
    pub fn check(buffer: &mut BytesMut, max_frame_size: usize) -> AppResult<()> {
        if buffer.remaining() < 4 {
            return Err(Incomplete);
        }
        let bytes_slice = buffer.get(0..4).unwrap();
        let body_size = i32::from_be_bytes(bytes_slice.try_into().unwrap());
        if body_size < 0 {
            return Err(AppError::MalformedProtocol(format!(
                "frame size {} less than 0",
                body_size
            )));
        }
        if body_size as usize > max_frame_size {
            return Err(AppError::FrameTooLarge(format!(
                "frame of length {} is too large",
                body_size
            )));
        }
        if buffer.remaining() < body_size as usize + 4 {
            buffer.reserve(body_size as usize + 4);
            return Err(Incomplete);
        }
        Ok(())
    }

    /// Parses one frame off the front of `buffer`, retaining any trailing
    /// partial frame for the next read. `Ok(None)` means not enough data yet.
    pub fn parse(buffer: &mut BytesMut, max_frame_size: usize) -> AppResult<Option<Frame>> {
        match Frame::check(buffer, max_frame_size) {
            Ok(_) => {
                let body_length = buffer.get_i32();
                let mut body = buffer.split_to(body_length as usize);
                let frame = Frame::read_body(&mut body)?;
                if !body.is_empty() {
                    return Err(AppError::MalformedProtocol(format!(
                        "{} trailing bytes after tag {} body",
                        body.len(),
                        frame.tag
                    )));
                }
                Ok(Some(frame))
            }
            Err(AppError::Incomplete) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn read_body(body: &mut BytesMut) -> AppResult<Frame> {
        if body.remaining() < 4 {
            return Err(AppError::MalformedProtocol(
                "frame body too short for tag and field count".into(),
            ));
        }
        let tag = body.get_u16();
        let field_count = body.get_u16();
        let mut fields = Vec::with_capacity(field_count as usize);
        for _ in 0..field_count {
            fields.push(FieldValue::decode(body)?);
        }
        Ok(Frame { tag, fields })
    }

    /// Encodes the frame, length prefix included.
    pub fn encode(&self) -> BytesMut {
        let body_size = self.body_size();
        let mut buffer = BytesMut::with_capacity(4 + body_size);
        buffer.put_i32(body_size as i32);
        buffer.put_u16(self.tag);
        buffer.put_u16(self.fields.len() as u16);
        for field in &self.fields {
            field.encode(&mut buffer);
        }
        buffer
    }

    fn body_size(&self) -> usize {
        4 + self
            .fields
            .iter()
            .map(FieldValue::wire_format_size)
            .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    const MAX: usize = 1024 * 1024;

    fn sample_frames() -> Vec<Frame> {
        vec![
            Frame::new(3, vec![FieldValue::Int(1_700_000_000)]),
            Frame::new(
                25,
                vec![
                    FieldValue::Int(7),
                    FieldValue::Int(0),
                    FieldValue::Int(0),
                    FieldValue::Int(1),
                    FieldValue::Float(101.25),
                    FieldValue::Decimal(dec!(300)),
                ],
            ),
            Frame::new(4, vec![
                FieldValue::Int(-1),
                FieldValue::Int(2104),
                FieldValue::Str("market data farm connection is ok".into()),
            ]),
        ]
    }

    #[test]
    fn test_frame_round_trip() {
        for frame in sample_frames() {
            let mut encoded = frame.encode();
            let decoded = Frame::parse(&mut encoded, MAX).unwrap().unwrap();
            assert_eq!(decoded, frame);
            assert!(encoded.is_empty());
        }
    }

    #[test]
    fn test_parse_returns_none_until_complete() {
        let frame = sample_frames().remove(1);
        let encoded = frame.encode();
        let mut buffer = BytesMut::new();
        for byte in &encoded[..encoded.len() - 1] {
            buffer.put_u8(*byte);
            assert!(Frame::parse(&mut buffer, MAX).unwrap().is_none());
        }
        buffer.put_u8(encoded[encoded.len() - 1]);
        let decoded = Frame::parse(&mut buffer, MAX).unwrap().unwrap();
        assert_eq!(decoded, frame);
    }

    /// Feeding one byte at a time must yield the same frame sequence as
    /// feeding the whole stream at once.
    #[test]
    fn test_byte_at_a_time_equivalence() {
        let frames = sample_frames();
        let mut stream = BytesMut::new();
        for frame in &frames {
            stream.extend_from_slice(&frame.encode());
        }

        let mut whole = stream.clone();
        let mut all_at_once = Vec::new();
        while let Some(frame) = Frame::parse(&mut whole, MAX).unwrap() {
            all_at_once.push(frame);
        }

        let mut trickled = Vec::new();
        let mut buffer = BytesMut::new();
        for byte in &stream {
            buffer.put_u8(*byte);
            while let Some(frame) = Frame::parse(&mut buffer, MAX).unwrap() {
                trickled.push(frame);
            }
        }

        assert_eq!(all_at_once, frames);
        assert_eq!(trickled, frames);
    }

    #[test]
    fn test_negative_length_is_malformed() {
        let mut buffer = BytesMut::new();
        buffer.put_i32(-5);
        let result = Frame::parse(&mut buffer, MAX);
        assert!(matches!(result, Err(AppError::MalformedProtocol(_))));
    }

    #[test]
    fn test_oversized_frame_is_rejected() {
        let mut buffer = BytesMut::new();
        buffer.put_i32(64 * 1024);
        let result = Frame::parse(&mut buffer, 1024);
        assert!(matches!(result, Err(AppError::FrameTooLarge(_))));
    }

    #[test]
    fn test_trailing_garbage_in_body_is_malformed() {
        let frame = Frame::new(3, vec![FieldValue::Int(0)]);
        let mut encoded = frame.encode();
        // grow the declared body without adding a decodable field
        let mut tampered = BytesMut::new();
        tampered.put_i32((encoded.len() - 4 + 1) as i32);
        tampered.extend_from_slice(&encoded.split_off(4));
        tampered.put_u8(0xff);
        let result = Frame::parse(&mut tampered, MAX);
        assert!(matches!(result, Err(AppError::MalformedProtocol(_))));
    }
}
