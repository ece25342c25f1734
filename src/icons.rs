/*
 *  icons.rs
 *
 *  wxface - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Weather icon catalog
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

use crate::error::IconError;

/// Icon identifier as carried on the wire, after catalog validation
pub type IconId = u8;

/// Number of catalog entries, the last one being the error icon
pub const ICON_COUNT: usize = 11;

/// Identifier of the error/unknown icon
pub const ERROR_ICON_ID: IconId = (ICON_COUNT - 1) as IconId;

/// Image resources known to the face, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherIcon {
    ClearDay = 0,
    ClearNight = 1,
    Cloudy = 2,
    Fog = 3,
    PartlyCloudyDay = 4,
    PartlyCloudyNight = 5,
    Rain = 6,
    Sleet = 7,
    Snow = 8,
    Wind = 9,
    Error = 10,
}

/// Catalog, indexed by icon id
static ICON_CATALOG: [WeatherIcon; ICON_COUNT] = [
    WeatherIcon::ClearDay,
    WeatherIcon::ClearNight,
    WeatherIcon::Cloudy,
    WeatherIcon::Fog,
    WeatherIcon::PartlyCloudyDay,
    WeatherIcon::PartlyCloudyNight,
    WeatherIcon::Rain,
    WeatherIcon::Sleet,
    WeatherIcon::Snow,
    WeatherIcon::Wind,
    WeatherIcon::Error,
];

/// Look up the image resource for a raw icon id.
///
/// Anything outside `0..ICON_COUNT` is rejected before it can index the table.
pub fn resolve(id: i32) -> Result<WeatherIcon, IconError> {
    usize::try_from(id)
        .ok()
        .and_then(|idx| ICON_CATALOG.get(idx))
        .copied()
        .ok_or(IconError::InvalidIconId(id))
}

impl WeatherIcon {
    pub fn id(self) -> IconId {
        self as IconId
    }

    /// Condition name used by the companion's weather provider
    pub fn condition(self) -> &'static str {
        match self {
            WeatherIcon::ClearDay => "clear-day",
            WeatherIcon::ClearNight => "clear-night",
            WeatherIcon::Cloudy => "cloudy",
            WeatherIcon::Fog => "fog",
            WeatherIcon::PartlyCloudyDay => "partly-cloudy-day",
            WeatherIcon::PartlyCloudyNight => "partly-cloudy-night",
            WeatherIcon::Rain => "rain",
            WeatherIcon::Sleet => "sleet",
            WeatherIcon::Snow => "snow",
            WeatherIcon::Wind => "wind",
            WeatherIcon::Error => "error",
        }
    }

    /// Short label stamped into the rasterised bitmap
    pub fn label(self) -> &'static str {
        match self {
            WeatherIcon::ClearDay => "SUN",
            WeatherIcon::ClearNight => "MOON",
            WeatherIcon::Cloudy => "CLDY",
            WeatherIcon::Fog => "FOG",
            WeatherIcon::PartlyCloudyDay => "PCLD",
            WeatherIcon::PartlyCloudyNight => "PCLN",
            WeatherIcon::Rain => "RAIN",
            WeatherIcon::Sleet => "SLT",
            WeatherIcon::Snow => "SNOW",
            WeatherIcon::Wind => "WIND",
            WeatherIcon::Error => "ERR",
        }
    }

    pub fn all() -> &'static [WeatherIcon] {
        &ICON_CATALOG
    }
}

impl std::fmt::Display for WeatherIcon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (#{})", self.condition(), self.id())
    }
}
