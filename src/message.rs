/*
 *  message.rs
 *
 *  wxface - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Weather payload decoding
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use arrayvec::ArrayString;
use log::{debug, warn};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{FieldError, Malformation, PayloadError};

/// Room for "-100°F" and friends
pub const TEMPERATURE_TEXT_CAP: usize = 16;
pub const LOCATION_TEXT_CAP: usize = 32;

pub type TemperatureText = ArrayString<TEMPERATURE_TEXT_CAP>;
pub type LocationText = ArrayString<LOCATION_TEXT_CAP>;

/// Tags the companion uses for each field of a weather message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageKey {
    TemperatureDisplay = 0,
    TemperatureCelsius = 1,
    IconId = 2,
    ErrorCode = 3,
    Location = 4,
}

impl MessageKey {
    pub const ALL: [MessageKey; 5] = [
        MessageKey::TemperatureDisplay,
        MessageKey::TemperatureCelsius,
        MessageKey::IconId,
        MessageKey::ErrorCode,
        MessageKey::Location,
    ];

    pub fn tag(self) -> u32 {
        self as u32
    }

    pub fn from_tag(tag: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.tag() == tag)
    }

    /// App key name, as written by the companion
    pub fn name(self) -> &'static str {
        match self {
            MessageKey::TemperatureDisplay => "temperature_f",
            MessageKey::TemperatureCelsius => "temperature_c",
            MessageKey::IconId => "icon",
            MessageKey::ErrorCode => "error",
            MessageKey::Location => "location",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.tag())
    }
}

/// A single tuple value as it arrives over the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireValue {
    Bytes(Vec<u8>),
    CString(String),
    UInt(u32),
    Int(i32),
}

impl WireValue {
    fn type_name(&self) -> &'static str {
        match self {
            WireValue::Bytes(_) => "byte-array",
            WireValue::CString(_) => "cstring",
            WireValue::UInt(_) => "uint",
            WireValue::Int(_) => "int",
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            WireValue::UInt(v) => Some(i64::from(*v)),
            WireValue::Int(v) => Some(i64::from(*v)),
            _ => None,
        }
    }
}

/// Untyped key/value bag delivered by the transport
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Payload {
    tuples: BTreeMap<u32, WireValue>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a tuple by message key
    pub fn with(mut self, key: MessageKey, value: WireValue) -> Self {
        self.tuples.insert(key.tag(), value);
        self
    }

    pub fn insert(&mut self, tag: u32, value: WireValue) {
        self.tuples.insert(tag, value);
    }

    pub fn get(&self, key: MessageKey) -> Option<&WireValue> {
        self.tuples.get(&key.tag())
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Parse one line of the JSON transport.
    ///
    /// Keys are decimal tags (`"2"`) or app key names (`"icon"`). Values that
    /// have no wire representation (floats, booleans, nested objects) are
    /// dropped with a warning.
    pub fn from_json(line: &str) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_str(line)?;
        let object = match value {
            Value::Object(map) => map,
            Value::Array(_) => return Err(PayloadError::NotAnObject("array")),
            Value::String(_) => return Err(PayloadError::NotAnObject("string")),
            Value::Number(_) => return Err(PayloadError::NotAnObject("number")),
            Value::Bool(_) => return Err(PayloadError::NotAnObject("bool")),
            Value::Null => return Err(PayloadError::NotAnObject("null")),
        };

        let mut payload = Payload::new();
        for (key, value) in object {
            let tag = match key.parse::<u32>() {
                Ok(tag) => tag,
                Err(_) => match MessageKey::from_name(&key) {
                    Some(k) => k.tag(),
                    None => {
                        debug!("ignoring unknown payload key {:?}", key);
                        continue;
                    }
                },
            };
            match wire_value(&value) {
                Some(v) => payload.insert(tag, v),
                None => warn!("payload key {:?} carries {} which has no wire form, dropped", key, value),
            }
        }
        Ok(payload)
    }
}

fn wire_value(value: &Value) -> Option<WireValue> {
    match value {
        Value::String(s) => Some(WireValue::CString(s.clone())),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                if let Ok(v) = i32::try_from(i) {
                    return Some(WireValue::Int(v));
                }
            }
            n.as_u64()
                .and_then(|u| u32::try_from(u).ok())
                .map(WireValue::UInt)
        }
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect::<Option<Vec<u8>>>()
            .map(WireValue::Bytes),
        _ => None,
    }
}

/// Outcome of decoding one field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Field<T> {
    /// Not in this message, nothing to update
    #[default]
    Absent,
    Present(T),
    Malformed(FieldError),
}

impl<T> Field<T> {
    pub fn present(&self) -> Option<&T> {
        match self {
            Field::Present(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    pub fn error(&self) -> Option<&FieldError> {
        match self {
            Field::Malformed(e) => Some(e),
            _ => None,
        }
    }
}

/// Typed view of a weather message, one entry per recognised key
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedFields {
    pub temperature_display: Field<TemperatureText>,
    pub temperature_celsius: Field<i32>,
    /// Raw id, checked against the catalog by the icon manager
    pub icon_id: Field<i8>,
    pub error_code: Field<i32>,
    pub location: Field<LocationText>,
}

impl DecodedFields {
    /// Every field that failed to decode, in tag order
    pub fn malformed(&self) -> Vec<&FieldError> {
        [
            self.temperature_display.error(),
            self.temperature_celsius.error(),
            self.icon_id.error(),
            self.error_code.error(),
            self.location.error(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Decode a payload field by field. A bad field never spoils the others.
pub fn decode(payload: &Payload) -> DecodedFields {
    DecodedFields {
        temperature_display: field(payload, MessageKey::TemperatureDisplay, text::<TEMPERATURE_TEXT_CAP>),
        temperature_celsius: field(payload, MessageKey::TemperatureCelsius, celsius),
        icon_id: field(payload, MessageKey::IconId, |v| integer::<i8>(v)),
        error_code: field(payload, MessageKey::ErrorCode, |v| integer::<i32>(v)),
        location: field(payload, MessageKey::Location, text::<LOCATION_TEXT_CAP>),
    }
}

fn field<T, F>(payload: &Payload, key: MessageKey, convert: F) -> Field<T>
where
    F: Fn(&WireValue) -> Result<T, Malformation>,
{
    match payload.get(key) {
        None => Field::Absent,
        Some(value) => match convert(value) {
            Ok(v) => Field::Present(v),
            Err(reason) => Field::Malformed(FieldError { key, reason }),
        },
    }
}

fn text<const CAP: usize>(value: &WireValue) -> Result<ArrayString<CAP>, Malformation> {
    match value {
        WireValue::CString(s) => ArrayString::from(s.as_str())
            .map_err(|_| Malformation::TooLong { len: s.len(), capacity: CAP }),
        other => Err(Malformation::WrongType(other.type_name())),
    }
}

fn integer<T: TryFrom<i64>>(value: &WireValue) -> Result<T, Malformation> {
    let v = value
        .as_integer()
        .ok_or(Malformation::WrongType(value.type_name()))?;
    T::try_from(v).map_err(|_| Malformation::OutOfRange(v))
}

// companion sends celsius through toFixed(0), so a decimal string is fine too
fn celsius(value: &WireValue) -> Result<i32, Malformation> {
    match value {
        WireValue::CString(s) => s.trim().parse::<i32>().map_err(|_| Malformation::NotANumber),
        other => integer::<i32>(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload_is_all_absent() {
        let fields = decode(&Payload::new());
        assert_eq!(fields, DecodedFields::default());
        assert!(fields.malformed().is_empty());
    }

    #[test]
    fn test_full_payload() {
        let payload = Payload::new()
            .with(MessageKey::TemperatureDisplay, WireValue::CString("72°".into()))
            .with(MessageKey::TemperatureCelsius, WireValue::Int(22))
            .with(MessageKey::IconId, WireValue::Int(3))
            .with(MessageKey::ErrorCode, WireValue::UInt(0))
            .with(MessageKey::Location, WireValue::CString("Leith".into()));
        let fields = decode(&payload);
        assert_eq!(fields.temperature_display.present().map(|t| t.as_str()), Some("72°"));
        assert_eq!(fields.temperature_celsius, Field::Present(22));
        assert_eq!(fields.icon_id, Field::Present(3));
        assert_eq!(fields.error_code, Field::Present(0));
        assert_eq!(fields.location.present().map(|l| l.as_str()), Some("Leith"));
    }

    #[test]
    fn test_icon_passed_through_unresolved() {
        let payload = Payload::new().with(MessageKey::IconId, WireValue::Int(99));
        assert_eq!(decode(&payload).icon_id, Field::Present(99));
        let payload = Payload::new().with(MessageKey::IconId, WireValue::Int(-1));
        assert_eq!(decode(&payload).icon_id, Field::Present(-1));
    }

    #[test]
    fn test_out_of_range_icon_keeps_temperature() {
        let payload = Payload::new()
            .with(MessageKey::TemperatureDisplay, WireValue::CString("72°".into()))
            .with(MessageKey::IconId, WireValue::UInt(300));
        let fields = decode(&payload);
        assert_eq!(
            fields.icon_id,
            Field::Malformed(FieldError { key: MessageKey::IconId, reason: Malformation::OutOfRange(300) })
        );
        assert_eq!(fields.temperature_display.present().map(|t| t.as_str()), Some("72°"));
        assert_eq!(fields.malformed().len(), 1);
    }

    #[test]
    fn test_wrong_wire_type() {
        let payload = Payload::new()
            .with(MessageKey::IconId, WireValue::CString("rain".into()))
            .with(MessageKey::TemperatureDisplay, WireValue::Int(72))
            .with(MessageKey::Location, WireValue::Bytes(vec![1, 2]));
        let fields = decode(&payload);
        assert_eq!(fields.icon_id.error().map(|e| e.reason), Some(Malformation::WrongType("cstring")));
        assert_eq!(fields.temperature_display.error().map(|e| e.reason), Some(Malformation::WrongType("int")));
        assert_eq!(fields.location.error().map(|e| e.reason), Some(Malformation::WrongType("byte-array")));
        assert!(fields.temperature_celsius.is_absent());
        assert_eq!(fields.malformed().len(), 3);
    }

    #[test]
    fn test_overlong_text_rejected() {
        let long = "x".repeat(TEMPERATURE_TEXT_CAP + 1);
        let payload = Payload::new().with(MessageKey::TemperatureDisplay, WireValue::CString(long));
        assert_eq!(
            decode(&payload).temperature_display.error().map(|e| e.reason),
            Some(Malformation::TooLong { len: TEMPERATURE_TEXT_CAP + 1, capacity: TEMPERATURE_TEXT_CAP })
        );
    }

    #[test]
    fn test_celsius_as_string() {
        let payload = Payload::new().with(MessageKey::TemperatureCelsius, WireValue::CString("-4".into()));
        assert_eq!(decode(&payload).temperature_celsius, Field::Present(-4));
        let payload = Payload::new().with(MessageKey::TemperatureCelsius, WireValue::CString("warm".into()));
        assert_eq!(
            decode(&payload).temperature_celsius.error().map(|e| e.reason),
            Some(Malformation::NotANumber)
        );
    }

    #[test]
    fn test_error_code_range() {
        let payload = Payload::new().with(MessageKey::ErrorCode, WireValue::UInt(u32::MAX));
        assert_eq!(
            decode(&payload).error_code.error().map(|e| e.reason),
            Some(Malformation::OutOfRange(i64::from(u32::MAX)))
        );
    }

    #[test]
    fn test_unknown_tags_ignored() {
        let mut payload = Payload::new().with(MessageKey::IconId, WireValue::Int(6));
        payload.insert(42, WireValue::CString("future".into()));
        let fields = decode(&payload);
        assert_eq!(fields.icon_id, Field::Present(6));
        assert!(fields.malformed().is_empty());
    }

    #[test]
    fn test_json_by_tag_and_name() {
        let payload = Payload::from_json(r#"{"0": "72°", "icon": 3, "temperature_c": "22", "mood": "sunny"}"#).unwrap();
        assert_eq!(payload.len(), 3);
        assert_eq!(payload.get(MessageKey::TemperatureDisplay), Some(&WireValue::CString("72°".into())));
        assert_eq!(payload.get(MessageKey::IconId), Some(&WireValue::Int(3)));
        assert_eq!(payload.get(MessageKey::TemperatureCelsius), Some(&WireValue::CString("22".into())));
    }

    #[test]
    fn test_json_wire_values() {
        let payload = Payload::from_json(r#"{"3": 4000000000, "4": [76, 101], "1": 21.5, "2": true}"#).unwrap();
        assert_eq!(payload.get(MessageKey::ErrorCode), Some(&WireValue::UInt(4_000_000_000)));
        assert_eq!(payload.get(MessageKey::Location), Some(&WireValue::Bytes(vec![76, 101])));
        assert_eq!(payload.get(MessageKey::TemperatureCelsius), None);
        assert_eq!(payload.get(MessageKey::IconId), None);
    }

    #[test]
    fn test_json_rejects_non_objects() {
        assert!(matches!(Payload::from_json("[1, 2]"), Err(PayloadError::NotAnObject("array"))));
        assert!(matches!(Payload::from_json("{nope"), Err(PayloadError::Json(_))));
    }

    #[test]
    fn test_key_names_round_trip() {
        for key in MessageKey::ALL {
            assert_eq!(MessageKey::from_tag(key.tag()), Some(key));
            assert_eq!(MessageKey::from_name(key.name()), Some(key));
        }
        assert_eq!(MessageKey::from_tag(5), None);
    }
}
