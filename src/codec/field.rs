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
use rust_decimal::Decimal;

use crate::{AppError, AppResult};

/// One typed field inside a frame body.
///
/// Quantities and sizes travel as `Decimal` so size arithmetic never
/// accumulates binary rounding drift; prices and computed analytics
/// stay `Float`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Decimal(Decimal),
    Float(f64),
    Bool(bool),
}

const FIELD_STR: u8 = 0;
const FIELD_INT: u8 = 1;
const FIELD_DECIMAL: u8 = 2;
const FIELD_FLOAT: u8 = 3;
const FIELD_BOOL: u8 = 4;

impl FieldValue {
    /// Decodes one field from a fully buffered frame body. Running out of
    /// bytes here is a protocol error, not a short read: the frame length
    /// prefix already promised the whole body.
    pub fn decode(body: &mut BytesMut) -> AppResult<FieldValue> {
        if body.remaining() < 1 {
            return Err(AppError::MalformedProtocol(
                "can not read a field discriminant".into(),
            ));
        }
        match body.get_u8() {
            FIELD_STR => {
                if body.remaining() < 4 {
                    return Err(AppError::MalformedProtocol(
                        "can not read a string length".into(),
                    ));
                }
                let length = body.get_u32() as usize;
                if body.remaining() < length {
                    return Err(AppError::MalformedProtocol(format!(
                        "string field of length {} overruns frame body",
                        length
                    )));
                }
                let raw = body.split_to(length);
                let value = String::from_utf8(raw.to_vec()).map_err(|e| {
                    AppError::MalformedProtocol(format!("string field is not utf-8: {}", e))
                })?;
                Ok(FieldValue::Str(value))
            }
            FIELD_INT => {
                if body.remaining() < 8 {
                    return Err(AppError::MalformedProtocol("can not read an i64".into()));
                }
                Ok(FieldValue::Int(body.get_i64()))
            }
            FIELD_DECIMAL => {
                if body.remaining() < 20 {
                    return Err(AppError::MalformedProtocol("can not read a decimal".into()));
                }
                let mantissa = body.get_i128();
                let scale = body.get_u32();
                let value = Decimal::try_from_i128_with_scale(mantissa, scale).map_err(|e| {
                    AppError::MalformedProtocol(format!("decimal field out of range: {}", e))
                })?;
                Ok(FieldValue::Decimal(value))
            }
            FIELD_FLOAT => {
                if body.remaining() < 8 {
                    return Err(AppError::MalformedProtocol("can not read an f64".into()));
                }
                Ok(FieldValue::Float(body.get_f64()))
            }
            FIELD_BOOL => {
                if body.remaining() < 1 {
                    return Err(AppError::MalformedProtocol("can not read a bool".into()));
                }
                Ok(FieldValue::Bool(body.get_u8() != 0))
            }
            other => Err(AppError::MalformedProtocol(format!(
                "unknown field discriminant: {}",
                other
            ))),
        }
    }

    pub fn encode(&self, writer: &mut BytesMut) {
        match self {
            FieldValue::Str(value) => {
                writer.put_u8(FIELD_STR);
                writer.put_u32(value.len() as u32);
                writer.put_slice(value.as_bytes());
            }
            FieldValue::Int(value) => {
                writer.put_u8(FIELD_INT);
                writer.put_i64(*value);
            }
            FieldValue::Decimal(value) => {
                writer.put_u8(FIELD_DECIMAL);
                writer.put_i128(value.mantissa());
                writer.put_u32(value.scale());
            }
            FieldValue::Float(value) => {
                writer.put_u8(FIELD_FLOAT);
                writer.put_f64(*value);
            }
            FieldValue::Bool(value) => {
                writer.put_u8(FIELD_BOOL);
                writer.put_u8(*value as u8);
            }
        }
    }

    pub fn wire_format_size(&self) -> usize {
        1 + match self {
            FieldValue::Str(value) => 4 + value.len(),
            FieldValue::Int(_) => 8,
            FieldValue::Decimal(_) => 20,
            FieldValue::Float(_) => 8,
            FieldValue::Bool(_) => 1,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}
impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}
impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}
impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Decimal(value)
    }
}
impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}
impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

/// Positional reader over a decoded frame's fields.
///
/// Event constructors consume fields strictly in wire order; a type or
/// arity mismatch surfaces as `MalformedProtocol` and the frame is
/// dropped by the dispatcher.
pub struct FieldCursor<'a> {
    fields: &'a [FieldValue],
    index: usize,
}

impl<'a> FieldCursor<'a> {
    pub fn new(fields: &'a [FieldValue]) -> Self {
        FieldCursor { fields, index: 0 }
    }

    fn next(&mut self) -> AppResult<&'a FieldValue> {
        let field = self.fields.get(self.index).ok_or_else(|| {
            AppError::MalformedProtocol(format!("frame body ends at field {}", self.index))
        })?;
        self.index += 1;
        Ok(field)
    }

    pub fn str(&mut self) -> AppResult<String> {
        match self.next()? {
            FieldValue::Str(value) => Ok(value.clone()),
            other => Err(type_mismatch("string", other)),
        }
    }

    pub fn int(&mut self) -> AppResult<i64> {
        match self.next()? {
            FieldValue::Int(value) => Ok(*value),
            other => Err(type_mismatch("int", other)),
        }
    }

    pub fn decimal(&mut self) -> AppResult<Decimal> {
        match self.next()? {
            FieldValue::Decimal(value) => Ok(*value),
            other => Err(type_mismatch("decimal", other)),
        }
    }

    pub fn float(&mut self) -> AppResult<f64> {
        match self.next()? {
            FieldValue::Float(value) => Ok(*value),
            other => Err(type_mismatch("float", other)),
        }
    }

    pub fn boolean(&mut self) -> AppResult<bool> {
        match self.next()? {
            FieldValue::Bool(value) => Ok(*value),
            other => Err(type_mismatch("bool", other)),
        }
    }
}

fn type_mismatch(expected: &str, got: &FieldValue) -> AppError {
    AppError::MalformedProtocol(format!("expected a {} field, got {:?}", expected, got))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    #[case(FieldValue::Str("MSFT".into()))]
    #[case(FieldValue::Str(String::new()))]
    #[case(FieldValue::Int(-42))]
    #[case(FieldValue::Decimal(dec!(100.25)))]
    #[case(FieldValue::Float(3.5))]
    #[case(FieldValue::Bool(true))]
    #[case(FieldValue::Bool(false))]
    fn test_field_round_trip(#[case] field: FieldValue) {
        let mut buffer = BytesMut::new();
        field.encode(&mut buffer);
        assert_eq!(buffer.len(), field.wire_format_size());
        let decoded = FieldValue::decode(&mut buffer).unwrap();
        assert_eq!(decoded, field);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_decimal_keeps_scale() {
        let mut buffer = BytesMut::new();
        FieldValue::Decimal(dec!(0.100)).encode(&mut buffer);
        let decoded = FieldValue::decode(&mut buffer).unwrap();
        match decoded {
            FieldValue::Decimal(d) => {
                assert_eq!(d, dec!(0.100));
                assert_eq!(d.scale(), 3);
            }
            other => panic!("unexpected field: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_discriminant_is_malformed() {
        let mut buffer = BytesMut::new();
        buffer.put_u8(9);
        let result = FieldValue::decode(&mut buffer);
        assert!(matches!(result, Err(AppError::MalformedProtocol(_))));
    }

    #[test]
    fn test_truncated_string_is_malformed() {
        let mut buffer = BytesMut::new();
        buffer.put_u8(0);
        buffer.put_u32(10);
        buffer.put_slice(b"abc");
        let result = FieldValue::decode(&mut buffer);
        assert!(matches!(result, Err(AppError::MalformedProtocol(_))));
    }

    #[test]
    fn test_cursor_reads_in_order() {
        let fields = vec![
            FieldValue::Int(7),
            FieldValue::Str("IBM".into()),
            FieldValue::Decimal(dec!(200)),
        ];
        let mut cursor = FieldCursor::new(&fields);
        assert_eq!(cursor.int().unwrap(), 7);
        assert_eq!(cursor.str().unwrap(), "IBM");
        assert_eq!(cursor.decimal().unwrap(), dec!(200));
        assert!(cursor.int().is_err());
    }

    #[test]
    fn test_cursor_type_mismatch() {
        let fields = vec![FieldValue::Int(7)];
        let mut cursor = FieldCursor::new(&fields);
        assert!(matches!(
            cursor.str(),
            Err(AppError::MalformedProtocol(_))
        ));
    }
}
