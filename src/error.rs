/*
 *  error.rs
 *
 *  wxface - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error types for the face engine and its surfaces
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

use thiserror::Error;

use crate::icons::ICON_COUNT;
use crate::message::MessageKey;

/// Errors raised by the display surface collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// Host could not allocate a bitmap or layer
    #[error("out of memory allocating {0}")]
    OutOfMemory(&'static str),

    /// Handle does not belong to this surface (or was already released)
    #[error("unknown {kind} handle #{serial}")]
    UnknownHandle { kind: &'static str, serial: u32 },
}

/// Icon update failures; none of them change what is on screen
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IconError {
    #[error("icon id {0} is outside the catalog (expected 0..{max})", max = ICON_COUNT)]
    InvalidIconId(i32),

    #[error("resource exhausted: {0}")]
    ResourceExhausted(#[from] SurfaceError),

    #[error("icon manager already torn down")]
    Released,
}

/// Why a single payload field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformation {
    /// Wire type does not match the key
    WrongType(&'static str),
    /// Numeric value does not fit the field
    OutOfRange(i64),
    /// String longer than the display buffer
    TooLong { len: usize, capacity: usize },
    /// String that should carry a number but does not
    NotANumber,
}

impl std::fmt::Display for Malformation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Malformation::WrongType(found) => write!(f, "unexpected wire type {}", found),
            Malformation::OutOfRange(v) => write!(f, "value {} out of range", v),
            Malformation::TooLong { len, capacity } =>
                write!(f, "{} bytes exceeds capacity of {}", len, capacity),
            Malformation::NotANumber => write!(f, "not a number"),
        }
    }
}

/// Per-field decode failure. Other fields of the same payload are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed field {key}: {reason}")]
pub struct FieldError {
    pub key: MessageKey,
    pub reason: Malformation,
}

/// Transport level failure turning a line of input into a payload
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}
