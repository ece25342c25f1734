/*
 *  surface/mock.rs
 *
 *  wxface - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock display surface for testing without a display
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

use embedded_graphics::primitives::Rectangle;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{DisplaySurface, TextRegion};
use crate::error::SurfaceError;
use crate::icons::WeatherIcon;

/// Mock display surface for testing
///
/// Records every resource operation and keeps the bookkeeping in shared
/// state so a test can inspect it after handing the surface to a face.
/// Any call that would be undefined on a real host (releasing an attached
/// visual, releasing a bitmap a visual still points at, double attach) is
/// recorded as a violation instead of crashing.
#[derive(Debug, Clone, Default)]
pub struct MockSurface {
    state: Arc<Mutex<MockSurfaceState>>,
}

/// Internal state for the mock surface (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockSurfaceState {
    /// Number of set_text() calls per region
    pub text_writes: HashMap<TextRegion, usize>,

    /// Current content of each text region
    pub texts: HashMap<TextRegion, String>,

    pub resources_acquired: usize,
    pub resources_released: usize,
    pub visuals_created: usize,
    pub visuals_released: usize,
    pub attach_count: usize,
    pub detach_count: usize,

    /// Live resources by serial
    pub live_resources: BTreeMap<u32, WeatherIcon>,

    /// Live visuals by serial, mapped to the resource serial they show
    pub live_visuals: BTreeMap<u32, u32>,

    /// Serial of the attached visual
    pub attached: Option<u32>,

    /// Frame of the last created visual
    pub last_frame: Option<Rectangle>,

    /// Largest number of resources alive at once
    pub peak_live_resources: usize,

    /// Contract violations observed
    pub violations: Vec<String>,

    /// Every call, in order, for sequencing checks
    pub journal: Vec<String>,

    /// Simulate failures (for error testing)
    pub fail_next_acquires: usize,
    pub fail_next_visuals: usize,

    next_serial: u32,
}

impl MockSurfaceState {
    /// Icon shown by the attached visual
    pub fn attached_icon(&self) -> Option<WeatherIcon> {
        let resource = self.live_visuals.get(&self.attached?)?;
        self.live_resources.get(resource).copied()
    }

    pub fn text(&self, region: TextRegion) -> &str {
        self.texts.get(&region).map(String::as_str).unwrap_or("")
    }

    pub fn writes(&self, region: TextRegion) -> usize {
        self.text_writes.get(&region).copied().unwrap_or(0)
    }

    fn serial(&mut self) -> u32 {
        self.next_serial += 1;
        self.next_serial
    }
}

/// Resource handle handed out by the mock
#[derive(Debug)]
pub struct MockResource {
    serial: u32,
}

/// Visual handle handed out by the mock
#[derive(Debug)]
pub struct MockVisual {
    serial: u32,
}

impl MockSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the shared state for inspection or to arm failures
    pub fn state(&self) -> MutexGuard<'_, MockSurfaceState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl DisplaySurface for MockSurface {
    type Resource = MockResource;
    type Visual = MockVisual;

    fn set_text(&mut self, region: TextRegion, text: &str) -> Result<(), SurfaceError> {
        let mut s = self.state();
        *s.text_writes.entry(region).or_default() += 1;
        s.texts.insert(region, text.to_string());
        s.journal.push(format!("text {:?} {:?}", region, text));
        Ok(())
    }

    fn acquire_resource(&mut self, icon: WeatherIcon) -> Result<MockResource, SurfaceError> {
        let mut s = self.state();
        if s.fail_next_acquires > 0 {
            s.fail_next_acquires -= 1;
            s.journal.push(format!("acquire {} failed", icon.condition()));
            return Err(SurfaceError::OutOfMemory("bitmap"));
        }
        let serial = s.serial();
        s.resources_acquired += 1;
        s.live_resources.insert(serial, icon);
        s.peak_live_resources = s.peak_live_resources.max(s.live_resources.len());
        s.journal.push(format!("acquire {} #{}", icon.condition(), serial));
        Ok(MockResource { serial })
    }

    fn create_visual(&mut self, resource: &MockResource, frame: Rectangle) -> Result<MockVisual, SurfaceError> {
        let mut s = self.state();
        if !s.live_resources.contains_key(&resource.serial) {
            s.violations.push(format!("visual created from dead resource #{}", resource.serial));
        }
        if s.fail_next_visuals > 0 {
            s.fail_next_visuals -= 1;
            s.journal.push("create failed".to_string());
            return Err(SurfaceError::OutOfMemory("bitmap layer"));
        }
        let serial = s.serial();
        s.visuals_created += 1;
        s.live_visuals.insert(serial, resource.serial);
        s.last_frame = Some(frame);
        s.journal.push(format!("create #{} from #{}", serial, resource.serial));
        Ok(MockVisual { serial })
    }

    fn attach_visual(&mut self, visual: &MockVisual) {
        let mut s = self.state();
        if let Some(current) = s.attached {
            s.violations.push(format!("attach #{} while #{} attached", visual.serial, current));
        }
        if !s.live_visuals.contains_key(&visual.serial) {
            s.violations.push(format!("attach of dead visual #{}", visual.serial));
        }
        s.attach_count += 1;
        s.attached = Some(visual.serial);
        s.journal.push(format!("attach #{}", visual.serial));
    }

    fn detach_visual(&mut self, visual: &MockVisual) {
        let mut s = self.state();
        if s.attached != Some(visual.serial) {
            s.violations.push(format!("detach of unattached visual #{}", visual.serial));
        }
        s.detach_count += 1;
        s.attached = None;
        s.journal.push(format!("detach #{}", visual.serial));
    }

    fn release_visual(&mut self, visual: MockVisual) {
        let mut s = self.state();
        if s.attached == Some(visual.serial) {
            s.violations.push(format!("visual #{} released while attached", visual.serial));
        }
        if s.live_visuals.remove(&visual.serial).is_none() {
            s.violations.push(format!("visual #{} released twice", visual.serial));
        }
        s.visuals_released += 1;
        s.journal.push(format!("release visual #{}", visual.serial));
    }

    fn release_resource(&mut self, resource: MockResource) {
        let mut s = self.state();
        if s.live_visuals.values().any(|r| *r == resource.serial) {
            s.violations.push(format!("resource #{} released under a live visual", resource.serial));
        }
        if s.live_resources.remove(&resource.serial).is_none() {
            s.violations.push(format!("resource #{} released twice", resource.serial));
        }
        s.resources_released += 1;
        s.journal.push(format!("release resource #{}", resource.serial));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::*;

    #[test]
    fn test_mock_records_lifecycle() {
        let mut surface = MockSurface::new();
        let probe = surface.clone();
        let frame = Rectangle::new(Point::new(10, 92), Size::new(60, 60));

        let r = surface.acquire_resource(WeatherIcon::Snow).unwrap();
        let v = surface.create_visual(&r, frame).unwrap();
        surface.attach_visual(&v);
        assert_eq!(probe.state().attached_icon(), Some(WeatherIcon::Snow));

        surface.detach_visual(&v);
        surface.release_visual(v);
        surface.release_resource(r);

        let s = probe.state();
        assert!(s.violations.is_empty(), "{:?}", s.violations);
        assert!(s.live_resources.is_empty());
        assert_eq!(s.last_frame, Some(frame));
        assert_eq!(s.peak_live_resources, 1);
    }

    #[test]
    fn test_mock_flags_release_under_visual() {
        let mut surface = MockSurface::new();
        let frame = Rectangle::new(Point::zero(), Size::new(4, 4));
        let r = surface.acquire_resource(WeatherIcon::Fog).unwrap();
        let v = surface.create_visual(&r, frame).unwrap();
        surface.attach_visual(&v);
        surface.release_resource(r);
        surface.release_visual(v);
        assert_eq!(surface.state().violations.len(), 2);
    }

    #[test]
    fn test_mock_simulated_failures() {
        let mut surface = MockSurface::new();
        surface.state().fail_next_acquires = 1;
        assert_eq!(
            surface.acquire_resource(WeatherIcon::Rain).unwrap_err(),
            SurfaceError::OutOfMemory("bitmap")
        );
        assert!(surface.acquire_resource(WeatherIcon::Rain).is_ok());
    }

    #[test]
    fn test_mock_text_writes() {
        let mut surface = MockSurface::new();
        surface.set_text(TextRegion::Date, "March 7").unwrap();
        surface.set_text(TextRegion::Date, "March 8").unwrap();
        let s = surface.state();
        assert_eq!(s.text(TextRegion::Date), "March 8");
        assert_eq!(s.writes(TextRegion::Date), 2);
        assert_eq!(s.writes(TextRegion::Time), 0);
    }
}
