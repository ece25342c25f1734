/*
 *  state.rs
 *
 *  wxface - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  What the face is currently showing
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

use crate::clock::{ClockText, DateText, TimeText};
use crate::icons::IconId;
use crate::message::TemperatureText;
use crate::surface::TextRegion;

/// Display state aggregate
///
/// Time and date are replaced on every tick, the temperature and icon only
/// when a weather message carries them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    date_text: DateText,
    time_text: TimeText,
    temperature_text: TemperatureText,
    current_icon: Option<IconId>,
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_clock(&mut self, clock: ClockText) {
        self.date_text = clock.date;
        self.time_text = clock.time;
    }

    pub fn apply_temperature(&mut self, text: TemperatureText) {
        self.temperature_text = text;
    }

    pub fn apply_icon(&mut self, id: Option<IconId>) {
        self.current_icon = id;
    }

    pub fn date_text(&self) -> &str {
        &self.date_text
    }

    pub fn time_text(&self) -> &str {
        &self.time_text
    }

    pub fn temperature_text(&self) -> &str {
        &self.temperature_text
    }

    pub fn current_icon(&self) -> Option<IconId> {
        self.current_icon
    }

    pub fn text(&self, region: TextRegion) -> &str {
        match region {
            TextRegion::Time => self.time_text(),
            TextRegion::Date => self.date_text(),
            TextRegion::Temperature => self.temperature_text(),
        }
    }
}
