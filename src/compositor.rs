/*
 *  compositor.rs
 *
 *  wxface - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Projects display state onto the surface
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
use embedded_graphics::primitives::Rectangle;
use log::trace;

use crate::error::{IconError, SurfaceError};
use crate::icon_manager::{IconManager, IconState};
use crate::icons::IconId;
use crate::message::TEMPERATURE_TEXT_CAP;
use crate::state::DisplayState;
use crate::surface::{DisplaySurface, TextRegion};

// temperature has the widest region buffer
type ShownText = ArrayString<TEMPERATURE_TEXT_CAP>;

/// Thin projector from display state to the surface.
///
/// Writes content only, never geometry. Remembers what each text region
/// holds so unchanged text is not pushed again.
pub struct Compositor<S: DisplaySurface> {
    shown: [Option<ShownText>; 3],
    icons: IconManager<S>,
}

impl<S: DisplaySurface> Compositor<S> {
    pub fn new(icon_frame: Rectangle) -> Self {
        Self {
            shown: Default::default(),
            icons: IconManager::new(icon_frame),
        }
    }

    /// Push every text region of `state`
    pub fn apply(&mut self, surface: &mut S, state: &DisplayState) -> Result<(), SurfaceError> {
        for region in TextRegion::ALL {
            self.apply_region(surface, region, state.text(region))?;
        }
        Ok(())
    }

    pub fn apply_region(&mut self, surface: &mut S, region: TextRegion, text: &str) -> Result<(), SurfaceError> {
        let shown = &mut self.shown[region.index()];
        if shown.as_deref() == Some(text) {
            return Ok(());
        }
        trace!("{:?} <- {:?}", region, text);
        surface.set_text(region, text)?;
        // text too long to remember is simply written every time
        *shown = ShownText::from(text).ok();
        Ok(())
    }

    /// Hand an icon update to the icon manager
    pub fn apply_icon(&mut self, surface: &mut S, id: i32) -> Result<IconId, IconError> {
        self.icons.set(surface, id)
    }

    pub fn icon_state(&self) -> IconState {
        self.icons.state()
    }

    pub fn current_icon(&self) -> Option<IconId> {
        self.icons.current()
    }

    pub fn teardown(&mut self, surface: &mut S) {
        self.icons.teardown(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::TemperatureText;
    use crate::surface::MockSurface;
    use embedded_graphics::prelude::*;

    fn compositor() -> Compositor<MockSurface> {
        Compositor::new(Rectangle::new(Point::new(10, 92), Size::new(60, 60)))
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut comp = compositor();
        let mut surface = MockSurface::new();
        let mut state = DisplayState::new();
        state.apply_temperature(TemperatureText::from("18°").unwrap());

        comp.apply(&mut surface, &state).unwrap();
        comp.apply(&mut surface, &state).unwrap();
        comp.apply(&mut surface, &state).unwrap();

        let s = surface.state();
        assert_eq!(s.text(TextRegion::Temperature), "18°");
        for region in TextRegion::ALL {
            assert_eq!(s.writes(region), 1);
        }
    }

    #[test]
    fn test_only_changed_regions_are_written() {
        let mut comp = compositor();
        let mut surface = MockSurface::new();
        let mut state = DisplayState::new();
        comp.apply(&mut surface, &state).unwrap();

        state.apply_temperature(TemperatureText::from("19°").unwrap());
        comp.apply(&mut surface, &state).unwrap();

        let s = surface.state();
        assert_eq!(s.writes(TextRegion::Temperature), 2);
        assert_eq!(s.writes(TextRegion::Time), 1);
        assert_eq!(s.writes(TextRegion::Date), 1);
    }

    #[test]
    fn test_text_beyond_cache_is_always_written() {
        let mut comp = compositor();
        let mut surface = MockSurface::new();
        let long = "x".repeat(TEMPERATURE_TEXT_CAP + 1);
        comp.apply_region(&mut surface, TextRegion::Date, &long).unwrap();
        comp.apply_region(&mut surface, TextRegion::Date, &long).unwrap();
        comp.apply_region(&mut surface, TextRegion::Date, "March 7").unwrap();
        comp.apply_region(&mut surface, TextRegion::Date, "March 7").unwrap();

        let s = surface.state();
        assert_eq!(s.writes(TextRegion::Date), 3);
        assert_eq!(s.text(TextRegion::Date), "March 7");
    }

    #[test]
    fn test_icon_delegation() {
        let mut comp = compositor();
        let mut surface = MockSurface::new();
        assert_eq!(comp.apply_icon(&mut surface, 6), Ok(6));
        assert_eq!(comp.icon_state(), IconState::Showing(6));
        assert!(comp.apply_icon(&mut surface, 42).is_err());
        assert_eq!(comp.current_icon(), Some(6));
        comp.teardown(&mut surface);
        assert_eq!(comp.icon_state(), IconState::Released);
    }
}
