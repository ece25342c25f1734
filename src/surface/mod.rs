/*
 *  surface/mod.rs
 *
 *  wxface - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Outbound display surface abstraction
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

use crate::error::SurfaceError;
use crate::icons::WeatherIcon;

pub mod framebuf;
pub mod layout;
pub mod mock;

pub use framebuf::FrameSurface;
pub use layout::FaceLayout;
pub use mock::MockSurface;

/// The three persistent text regions of the face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextRegion {
    Time,
    Date,
    Temperature,
}

impl TextRegion {
    pub const ALL: [TextRegion; 3] = [TextRegion::Time, TextRegion::Date, TextRegion::Temperature];

    pub fn index(self) -> usize {
        match self {
            TextRegion::Time => 0,
            TextRegion::Date => 1,
            TextRegion::Temperature => 2,
        }
    }
}

/// What the face needs from the host display.
///
/// Text regions have fixed geometry and styling; only their content can be
/// changed. The icon region takes one image visual at a time. Resource and
/// visual handles are owned values: releasing one consumes it, so a handle
/// can never be released twice.
///
/// A visual refers to the resource it was created from. Callers must detach
/// a visual before releasing it, and release the visual before its resource.
pub trait DisplaySurface {
    /// Loaded image resource (a bitmap)
    type Resource;

    /// Image visual (a bitmap layer) showing a resource
    type Visual;

    /// Replace the content of a text region
    fn set_text(&mut self, region: TextRegion, text: &str) -> Result<(), SurfaceError>;

    /// Load the image for a catalog entry
    fn acquire_resource(&mut self, icon: WeatherIcon) -> Result<Self::Resource, SurfaceError>;

    /// Create a visual for `resource` at a fixed frame, not yet on screen
    fn create_visual(&mut self, resource: &Self::Resource, frame: Rectangle) -> Result<Self::Visual, SurfaceError>;

    /// Add the visual to the window
    fn attach_visual(&mut self, visual: &Self::Visual);

    /// Remove the visual from the window
    fn detach_visual(&mut self, visual: &Self::Visual);

    fn release_visual(&mut self, visual: Self::Visual);

    fn release_resource(&mut self, resource: Self::Resource);
}
