/*
 *  surface/layout.rs
 *
 *  wxface - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Fixed region geometry and styling for the face
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

use embedded_graphics::mono_font::iso_8859_1::{FONT_10X20, FONT_9X15, FONT_9X18_BOLD};
use embedded_graphics::mono_font::MonoFont;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use super::TextRegion;

/// Reference face the geometry below was drawn for
pub const REFERENCE_WIDTH: u32 = 144;
pub const REFERENCE_HEIGHT: u32 = 168;

/// Text field definition - a fixed region plus its styling
///
/// Only the content of a field ever changes at runtime.
#[derive(Debug, Clone)]
pub struct Field {
    /// Field identifier (e.g., "time", "date", "temperature")
    pub name: &'static str,

    /// Bounding rectangle (x, y, width, height)
    pub bounds: Rectangle,

    /// Font for text rendering
    pub font: &'static MonoFont<'static>,

    /// Foreground color
    pub fg_color: BinaryColor,

    /// Background color, None for clear
    pub bg_color: Option<BinaryColor>,
}

impl Field {
    /// Create a new text field, white on clear
    pub fn new_text(name: &'static str, bounds: Rectangle, font: &'static MonoFont<'static>) -> Self {
        Self {
            name,
            bounds,
            font,
            fg_color: BinaryColor::On,
            bg_color: None,
        }
    }

    pub fn position(&self) -> Point {
        self.bounds.top_left
    }
}

/// Geometry of the whole face
#[derive(Debug, Clone)]
pub struct FaceLayout {
    /// Display width in pixels
    pub width: u32,

    /// Display height in pixels
    pub height: u32,

    /// Window background
    pub background: BinaryColor,

    pub time: Field,
    pub date: Field,
    pub temperature: Field,

    /// Where the weather icon visual sits
    pub icon: Rectangle,
}

impl Default for FaceLayout {
    fn default() -> Self {
        Self::reference()
    }
}

impl FaceLayout {
    /// The 144x168 face
    pub fn reference() -> Self {
        Self {
            width: REFERENCE_WIDTH,
            height: REFERENCE_HEIGHT,
            background: BinaryColor::Off,
            time: Field::new_text("time", rect(7, 0, 144 - 7, 168 - 92), &FONT_10X20),
            date: Field::new_text("date", rect(8, 60, 144 - 8, 168 - 68), &FONT_9X15),
            temperature: Field::new_text("temperature", rect(80, 108, 144 - 80, 168 - 108), &FONT_9X18_BOLD),
            icon: rect(10, 92, 60, 60),
        }
    }

    /// Reference geometry scaled onto a display of another size
    pub fn for_display(width: u32, height: u32) -> Self {
        let mut layout = Self::reference();
        if width == REFERENCE_WIDTH && height == REFERENCE_HEIGHT {
            return layout;
        }
        let scale = |r: Rectangle| {
            Rectangle::new(
                Point::new(
                    scale_axis(r.top_left.x, width, REFERENCE_WIDTH),
                    scale_axis(r.top_left.y, height, REFERENCE_HEIGHT),
                ),
                Size::new(
                    scale_extent(r.size.width, width, REFERENCE_WIDTH),
                    scale_extent(r.size.height, height, REFERENCE_HEIGHT),
                ),
            )
        };
        layout.width = width;
        layout.height = height;
        layout.time.bounds = scale(layout.time.bounds);
        layout.date.bounds = scale(layout.date.bounds);
        layout.temperature.bounds = scale(layout.temperature.bounds);
        layout.icon = scale(layout.icon);
        layout
    }

    pub fn field(&self, region: TextRegion) -> &Field {
        match region {
            TextRegion::Time => &self.time,
            TextRegion::Date => &self.date,
            TextRegion::Temperature => &self.temperature,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

fn rect(x: i32, y: i32, w: u32, h: u32) -> Rectangle {
    Rectangle::new(Point::new(x, y), Size::new(w, h))
}

fn scale_axis(v: i32, target: u32, reference: u32) -> i32 {
    let scaled = (i64::from(v) * i64::from(target)) / i64::from(reference);
    i32::try_from(scaled).unwrap_or(i32::MAX)
}

fn scale_extent(v: u32, target: u32, reference: u32) -> u32 {
    let scaled = (u64::from(v) * u64::from(target)) / u64::from(reference);
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_geometry() {
        let layout = FaceLayout::reference();
        assert_eq!(layout.size(), Size::new(144, 168));
        assert_eq!(layout.time.bounds, rect(7, 0, 137, 76));
        assert_eq!(layout.date.bounds, rect(8, 60, 136, 100));
        assert_eq!(layout.temperature.bounds, rect(80, 108, 64, 60));
        assert_eq!(layout.icon, rect(10, 92, 60, 60));
    }

    #[test]
    fn test_text_is_white_on_clear() {
        let layout = FaceLayout::reference();
        for region in TextRegion::ALL {
            let field = layout.field(region);
            assert_eq!(field.fg_color, BinaryColor::On);
            assert_eq!(field.bg_color, None);
        }
        assert_eq!(layout.background, BinaryColor::Off);
    }

    #[test]
    fn test_double_size() {
        let layout = FaceLayout::for_display(288, 336);
        assert_eq!(layout.icon, rect(20, 184, 120, 120));
        assert_eq!(layout.temperature.position(), Point::new(160, 216));
    }

    #[test]
    fn test_reference_size_is_unscaled() {
        let layout = FaceLayout::for_display(144, 168);
        assert_eq!(layout.time.bounds, FaceLayout::reference().time.bounds);
    }

    #[test]
    fn test_oversized_display_scales_without_overflow() {
        let layout = FaceLayout::for_display(40_000_000, 168);
        assert_eq!(layout.icon.size, Size::new(16_666_666, 60));
        assert_eq!(layout.icon.top_left, Point::new(2_777_777, 92));
    }
}
