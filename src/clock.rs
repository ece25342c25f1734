/*
 *  clock.rs
 *
 *  wxface - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Clock text formatting
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
use chrono::{Datelike, Month, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// "00:00"
pub const TIME_TEXT_CAP: usize = 5;

/// "September 30"
pub const DATE_TEXT_CAP: usize = 12;

pub type TimeText = ArrayString<TIME_TEXT_CAP>;
pub type DateText = ArrayString<DATE_TEXT_CAP>;

/// Clock style as selected by the host locale setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClockStyle {
    #[default]
    #[serde(rename = "24h")]
    TwentyFourHour,
    #[serde(rename = "12h")]
    TwelveHour,
}

impl ClockStyle {
    pub fn from_24h(is_24h: bool) -> Self {
        if is_24h { ClockStyle::TwentyFourHour } else { ClockStyle::TwelveHour }
    }
}

/// Formatted text for the date and time regions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockText {
    pub date: DateText,
    pub time: TimeText,
}

/// Format a wall clock reading for the face.
///
/// Date is the long month name and the day without padding ("March 7").
/// Time is `HH:MM` in 24h style and `H:MM` in 12h style, no AM/PM suffix.
pub fn format<T>(now: &T, style: ClockStyle) -> ClockText
where
    T: Datelike + Timelike,
{
    ClockText {
        date: format_date(now),
        time: format_time(now, style),
    }
}

fn format_date<T: Datelike>(now: &T) -> DateText {
    let mut date = DateText::new();
    let month = u8::try_from(now.month())
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("");
    // longest is "September 30", fits DATE_TEXT_CAP
    let _ = write!(date, "{} {}", month, now.day());
    date
}

fn format_time<T: Timelike>(now: &T, style: ClockStyle) -> TimeText {
    let mut time = TimeText::new();
    let _ = match style {
        ClockStyle::TwentyFourHour => write!(time, "{:02}:{:02}", now.hour(), now.minute()),
        ClockStyle::TwelveHour => {
            let (_pm, hour) = now.hour12();
            write!(time, "{}:{:02}", hour, now.minute())
        }
    };
    time
}
