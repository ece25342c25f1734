/*
 *  face.rs
 *
 *  wxface - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Watch face entry points driven by the host
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

use chrono::{Datelike, Timelike};
use log::{debug, info, warn};

use crate::clock::{self, ClockStyle};
use crate::compositor::Compositor;
use crate::error::{FieldError, IconError, SurfaceError};
use crate::icon_manager::IconState;
use crate::icons::IconId;
use crate::message::{self, Field, LocationText, Payload};
use crate::state::DisplayState;
use crate::surface::{DisplaySurface, FaceLayout, TextRegion};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    Running,
    Stopped,
}

/// Companion diagnostics that never reach the screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeatherReport {
    pub temperature_celsius: Option<i32>,
    pub error_code: Option<i32>,
    pub location: Option<LocationText>,
}

/// What one weather message changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageOutcome {
    pub temperature_updated: bool,
    /// None when the message carried no usable icon id
    pub icon: Option<Result<IconId, IconError>>,
    pub malformed: Vec<FieldError>,
}

/// The face: display state, compositor and the surface it draws on.
///
/// The host drives it through four entry points, one event at a time.
pub struct WatchFace<S: DisplaySurface> {
    surface: S,
    state: DisplayState,
    compositor: Compositor<S>,
    report: WeatherReport,
    phase: Phase,
}

impl<S: DisplaySurface> WatchFace<S> {
    pub fn new(surface: S, layout: &FaceLayout) -> Self {
        Self {
            surface,
            state: DisplayState::new(),
            compositor: Compositor::new(layout.icon),
            report: WeatherReport::default(),
            phase: Phase::Created,
        }
    }

    /// Window loaded: put the (blank) regions on screen
    pub fn on_start(&mut self) -> Result<(), SurfaceError> {
        if self.phase != Phase::Created {
            warn!("on_start ignored, face is {:?}", self.phase);
            return Ok(());
        }
        self.phase = Phase::Running;
        self.compositor.apply(&mut self.surface, &self.state)?;
        info!("face started");
        Ok(())
    }

    /// Minute tick
    pub fn on_tick<T>(&mut self, now: &T, style: ClockStyle) -> Result<(), SurfaceError>
    where
        T: Datelike + Timelike,
    {
        if !self.running("tick") {
            return Ok(());
        }
        let text = clock::format(now, style);
        debug!("tick {} {}", text.date, text.time);
        self.state.apply_clock(text);
        self.compositor.apply_region(&mut self.surface, TextRegion::Date, self.state.date_text())?;
        self.compositor.apply_region(&mut self.surface, TextRegion::Time, self.state.time_text())
    }

    /// Weather payload from the companion.
    ///
    /// Each field is applied on its own, a bad field only loses itself.
    pub fn on_message(&mut self, payload: &Payload) -> MessageOutcome {
        let mut outcome = MessageOutcome::default();
        if !self.running("message") {
            return outcome;
        }
        let fields = message::decode(payload);
        for err in fields.malformed() {
            warn!("{}", err);
            outcome.malformed.push(err.clone());
        }

        if let Field::Present(text) = fields.temperature_display {
            self.state.apply_temperature(text);
            match self.compositor.apply_region(&mut self.surface, TextRegion::Temperature, self.state.temperature_text()) {
                Ok(()) => outcome.temperature_updated = true,
                Err(e) => warn!("temperature not drawn: {}", e),
            }
        }

        if let Field::Present(id) = fields.icon_id {
            let result = self.compositor.apply_icon(&mut self.surface, i32::from(id));
            if let Err(e) = &result {
                warn!("icon update rejected: {}", e);
            }
            self.state.apply_icon(self.compositor.current_icon());
            outcome.icon = Some(result);
        }

        if let Field::Present(c) = fields.temperature_celsius {
            self.report.temperature_celsius = Some(c);
        }
        if let Field::Present(code) = fields.error_code {
            warn!("companion reported error code {}", code);
            self.report.error_code = Some(code);
        }
        if let Field::Present(location) = fields.location {
            debug!("weather for {}", location);
            self.report.location = Some(location);
        }
        outcome
    }

    /// Window unloading: free the icon pair. Safe to call twice.
    pub fn on_stop(&mut self) {
        if self.phase == Phase::Stopped {
            return;
        }
        self.compositor.teardown(&mut self.surface);
        self.state.apply_icon(None);
        self.phase = Phase::Stopped;
        info!("face stopped");
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn icon_state(&self) -> IconState {
        self.compositor.icon_state()
    }

    pub fn report(&self) -> &WeatherReport {
        &self.report
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    fn running(&self, event: &str) -> bool {
        match self.phase {
            Phase::Running => true,
            phase => {
                warn!("{} ignored, face is {:?}", event, phase);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Malformation;
    use crate::message::{MessageKey, WireValue};
    use crate::surface::MockSurface;
    use chrono::{NaiveDate, NaiveDateTime};

    fn started() -> (WatchFace<MockSurface>, MockSurface) {
        let surface = MockSurface::new();
        let probe = surface.clone();
        let mut face = WatchFace::new(surface, &FaceLayout::reference());
        face.on_start().unwrap();
        (face, probe)
    }

    fn march_7(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap().and_hms_opt(hour, min, 0).unwrap()
    }

    #[test]
    fn test_tick_both_styles() {
        let (mut face, probe) = started();
        face.on_tick(&march_7(7, 5), ClockStyle::TwentyFourHour).unwrap();
        assert_eq!(probe.state().text(TextRegion::Date), "March 7");
        assert_eq!(probe.state().text(TextRegion::Time), "07:05");

        face.on_tick(&march_7(7, 5), ClockStyle::TwelveHour).unwrap();
        assert_eq!(probe.state().text(TextRegion::Time), "7:05");
        assert_eq!(probe.state().writes(TextRegion::Date), 2);
    }

    #[test]
    fn test_icon_then_invalid_icon() {
        let (mut face, probe) = started();
        let first = face.on_message(&Payload::new().with(MessageKey::IconId, WireValue::Int(3)));
        assert_eq!(first.icon, Some(Ok(3)));
        assert_eq!(face.icon_state(), IconState::Showing(3));
        assert_eq!(probe.state().attach_count, 1);

        let second = face.on_message(&Payload::new().with(MessageKey::IconId, WireValue::Int(99)));
        assert_eq!(second.icon, Some(Err(IconError::InvalidIconId(99))));
        assert_eq!(face.icon_state(), IconState::Showing(3));
        assert_eq!(face.state().current_icon(), Some(3));
        assert_eq!(probe.state().attach_count, 1);
    }

    #[test]
    fn test_temperature_only_leaves_icon_alone() {
        let (mut face, probe) = started();
        face.on_message(&Payload::new().with(MessageKey::IconId, WireValue::Int(0)));
        let outcome = face.on_message(
            &Payload::new().with(MessageKey::TemperatureDisplay, WireValue::CString("72°".into())),
        );
        assert!(outcome.temperature_updated);
        assert_eq!(outcome.icon, None);
        assert_eq!(face.state().temperature_text(), "72°");
        assert_eq!(face.icon_state(), IconState::Showing(0));

        let s = probe.state();
        assert_eq!(s.text(TextRegion::Temperature), "72°");
        assert_eq!(s.resources_acquired, 1);
    }

    #[test]
    fn test_bad_icon_field_keeps_temperature() {
        let (mut face, _probe) = started();
        let outcome = face.on_message(
            &Payload::new()
                .with(MessageKey::TemperatureDisplay, WireValue::CString("61°".into()))
                .with(MessageKey::IconId, WireValue::Int(1000)),
        );
        assert!(outcome.temperature_updated);
        assert_eq!(outcome.icon, None);
        assert_eq!(outcome.malformed.len(), 1);
        assert_eq!(outcome.malformed[0].reason, Malformation::OutOfRange(1000));
        assert_eq!(face.icon_state(), IconState::Empty);
    }

    #[test]
    fn test_report_collects_diagnostics() {
        let (mut face, _probe) = started();
        face.on_message(
            &Payload::new()
                .with(MessageKey::TemperatureCelsius, WireValue::CString("22".into()))
                .with(MessageKey::ErrorCode, WireValue::Int(7))
                .with(MessageKey::Location, WireValue::CString("Dunedin".into())),
        );
        let report = face.report();
        assert_eq!(report.temperature_celsius, Some(22));
        assert_eq!(report.error_code, Some(7));
        assert_eq!(report.location.as_ref().map(|l| l.as_str()), Some("Dunedin"));
    }

    #[test]
    fn test_temperature_persists_across_ticks() {
        let (mut face, probe) = started();
        face.on_message(&Payload::new().with(MessageKey::TemperatureDisplay, WireValue::CString("5°".into())));
        face.on_tick(&march_7(8, 0), ClockStyle::TwentyFourHour).unwrap();
        face.on_tick(&march_7(8, 1), ClockStyle::TwentyFourHour).unwrap();
        assert_eq!(face.state().temperature_text(), "5°");
        assert_eq!(probe.state().writes(TextRegion::Temperature), 2);
    }

    #[test]
    fn test_stop_releases_everything() {
        let (mut face, probe) = started();
        face.on_message(&Payload::new().with(MessageKey::IconId, WireValue::Int(8)));
        face.on_stop();
        face.on_stop();
        assert_eq!(face.icon_state(), IconState::Released);
        assert_eq!(face.state().current_icon(), None);

        let s = probe.state();
        assert!(s.live_resources.is_empty());
        assert!(s.live_visuals.is_empty());
        assert_eq!(s.resources_released, 1);
        assert!(s.violations.is_empty(), "{:?}", s.violations);
    }

    #[test]
    fn test_events_outside_running_are_ignored() {
        let surface = MockSurface::new();
        let probe = surface.clone();
        let mut face = WatchFace::new(surface, &FaceLayout::reference());
        face.on_tick(&march_7(9, 0), ClockStyle::TwentyFourHour).unwrap();
        assert_eq!(probe.state().writes(TextRegion::Time), 0);

        face.on_start().unwrap();
        face.on_stop();
        let outcome = face.on_message(&Payload::new().with(MessageKey::IconId, WireValue::Int(2)));
        assert_eq!(outcome, MessageOutcome::default());
        assert_eq!(probe.state().resources_acquired, 0);
    }
}
