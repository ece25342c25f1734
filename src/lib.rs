/*
 *  lib.rs
 *
 *  wxface - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Clock face with current weather for small wearable displays
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

//! Display state engine for a weather clock face.
//!
//! A minute tick and weather payloads from a companion arrive independently;
//! [`WatchFace`] reconciles them into the time, date and temperature text
//! regions and the single weather icon, owning the icon bitmap across swaps.

pub mod clock;
pub mod compositor;
pub mod config;
pub mod error;
pub mod face;
pub mod icon_manager;
pub mod icons;
pub mod message;
pub mod state;
pub mod surface;

pub use clock::ClockStyle;
pub use error::{FieldError, IconError, PayloadError, SurfaceError};
pub use face::{MessageOutcome, WatchFace, WeatherReport};
pub use icon_manager::IconState;
pub use icons::{IconId, WeatherIcon};
pub use message::{MessageKey, Payload, WireValue};
pub use surface::{DisplaySurface, FaceLayout, FrameSurface, MockSurface, TextRegion};
