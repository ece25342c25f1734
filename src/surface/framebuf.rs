/*
 *  surface/framebuf.rs
 *
 *  wxface - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Framebuffer backed display surface
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

use core::convert::Infallible;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::{BinaryColor, PixelColor};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use log::{debug, error, warn};
use std::collections::HashMap;

use super::layout::FaceLayout;
use super::{DisplaySurface, TextRegion};
use crate::error::SurfaceError;
use crate::icons::WeatherIcon;

/// A runtime-sized framebuffer for embedded-graphics.
#[derive(Debug, Clone)]
pub struct VarFrameBuf<C: PixelColor> {
    buf: Vec<C>,
    w: usize,
    h: usize,
}

impl<C: PixelColor> VarFrameBuf<C> {
    pub fn new(width: u32, height: u32, fill: C) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self { buf: vec![fill; w * h], w, h }
    }

    pub fn width(&self) -> usize { self.w }
    pub fn height(&self) -> usize { self.h }

    /// Immutable raw access
    pub fn as_slice(&self) -> &[C] { &self.buf }

    pub fn pixel(&self, p: Point) -> Option<C> {
        self.idx(p).map(|i| self.buf[i])
    }

    /// Every pixel, offset by `origin`
    pub fn pixels(&self, origin: Point) -> impl Iterator<Item = Pixel<C>> + '_ {
        let w = self.w;
        self.buf.iter().enumerate().map(move |(i, c)| {
            Pixel(origin + Point::new((i % w) as i32, (i / w) as i32), *c)
        })
    }

    /// Map (x,y) to linear index; returns None if out of bounds
    #[inline]
    fn idx(&self, p: Point) -> Option<usize> {
        if p.x >= 0 && p.y >= 0 {
            let (x, y) = (p.x as usize, p.y as usize);
            if x < self.w && y < self.h {
                return Some(y * self.w + x);
            }
        }
        None
    }
}

impl<C: PixelColor> OriginDimensions for VarFrameBuf<C> {
    fn size(&self) -> Size {
        Size::new(self.w as u32, self.h as u32)
    }
}

impl<C: PixelColor> DrawTarget for VarFrameBuf<C> {
    type Color = C;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, c) in pixels {
            if let Some(i) = self.idx(p) {
                self.buf[i] = c;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.buf.fill(color);
        Ok(())
    }
}

fn infallible<T>(r: Result<T, Infallible>) -> T {
    match r {
        Ok(v) => v,
        Err(never) => match never {},
    }
}

/// Loaded icon bitmap
#[derive(Debug)]
pub struct Bitmap {
    serial: u32,
    icon: WeatherIcon,
}

impl Bitmap {
    pub fn icon(&self) -> WeatherIcon {
        self.icon
    }
}

/// Bitmap layer showing a [`Bitmap`]
#[derive(Debug)]
pub struct BitmapLayer {
    serial: u32,
    bitmap: u32,
}

#[derive(Debug)]
struct LayerSlot {
    bitmap: u32,
    frame: Rectangle,
}

/// Display surface rendering into an in-memory monochrome framebuffer.
///
/// Bitmap memory is limited to `max_bitmaps` live bitmaps, acquisitions past
/// that fail the way a host heap would.
pub struct FrameSurface {
    layout: FaceLayout,
    frame: VarFrameBuf<BinaryColor>,
    texts: [String; 3],
    bitmaps: HashMap<u32, (WeatherIcon, VarFrameBuf<BinaryColor>)>,
    layers: HashMap<u32, LayerSlot>,
    attached: Option<u32>,
    max_bitmaps: usize,
    next_serial: u32,
}

impl FrameSurface {
    pub fn new(layout: FaceLayout, max_bitmaps: usize) -> Self {
        let frame = VarFrameBuf::new(layout.width, layout.height, layout.background);
        Self {
            layout,
            frame,
            texts: Default::default(),
            bitmaps: HashMap::new(),
            layers: HashMap::new(),
            attached: None,
            max_bitmaps,
            next_serial: 1,
        }
    }

    pub fn layout(&self) -> &FaceLayout {
        &self.layout
    }

    pub fn framebuffer(&self) -> &VarFrameBuf<BinaryColor> {
        &self.frame
    }

    pub fn text(&self, region: TextRegion) -> &str {
        &self.texts[region.index()]
    }

    pub fn live_bitmaps(&self) -> usize {
        self.bitmaps.len()
    }

    pub fn live_layers(&self) -> usize {
        self.layers.len()
    }

    /// Icon currently on screen, if any
    pub fn attached_icon(&self) -> Option<WeatherIcon> {
        let slot = self.layers.get(&self.attached?)?;
        self.bitmaps.get(&slot.bitmap).map(|(icon, _)| *icon)
    }

    /// Framebuffer as text, one line per row
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.frame.width() + 1) * self.frame.height());
        for row in self.frame.as_slice().chunks(self.frame.width().max(1)) {
            out.extend(row.iter().map(|c| if c.is_on() { '#' } else { '.' }));
            out.push('\n');
        }
        out
    }

    fn serial(&mut self) -> u32 {
        let s = self.next_serial;
        self.next_serial = self.next_serial.wrapping_add(1);
        s
    }

    fn rasterise(&self, icon: WeatherIcon) -> VarFrameBuf<BinaryColor> {
        let size = self.layout.icon.size;
        let mut bmp = VarFrameBuf::new(size.width, size.height, BinaryColor::Off);
        let diameter = size.width.min(size.height).saturating_sub(2);
        let centre = Point::new(size.width as i32 / 2, size.height as i32 / 2);
        infallible(
            Circle::with_center(centre, diameter)
                .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 2))
                .draw(&mut bmp),
        );
        let label = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let centred = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Middle)
            .build();
        infallible(Text::with_text_style(icon.label(), centre, label, centred).draw(&mut bmp));
        bmp
    }

    fn redraw(&mut self) {
        infallible(self.frame.clear(self.layout.background));

        for region in TextRegion::ALL {
            let field = self.layout.field(region);
            let mut style = MonoTextStyleBuilder::new()
                .font(field.font)
                .text_color(field.fg_color);
            if let Some(bg) = field.bg_color {
                style = style.background_color(bg);
            }
            let text = &self.texts[region.index()];
            let mut clipped = self.frame.clipped(&field.bounds);
            infallible(
                Text::with_baseline(text, field.position(), style.build(), Baseline::Top).draw(&mut clipped),
            );
        }

        if let Some(slot) = self.attached.and_then(|serial| self.layers.get(&serial)) {
            if let Some((_, bmp)) = self.bitmaps.get(&slot.bitmap) {
                let on = bmp.pixels(slot.frame.top_left).filter(|Pixel(_, c)| c.is_on());
                let mut clipped = self.frame.clipped(&slot.frame);
                infallible(clipped.draw_iter(on));
            }
        }
    }
}

impl DisplaySurface for FrameSurface {
    type Resource = Bitmap;
    type Visual = BitmapLayer;

    fn set_text(&mut self, region: TextRegion, text: &str) -> Result<(), SurfaceError> {
        let slot = &mut self.texts[region.index()];
        slot.clear();
        slot.push_str(text);
        self.redraw();
        Ok(())
    }

    fn acquire_resource(&mut self, icon: WeatherIcon) -> Result<Bitmap, SurfaceError> {
        if self.bitmaps.len() >= self.max_bitmaps {
            return Err(SurfaceError::OutOfMemory("bitmap"));
        }
        let pixels = self.rasterise(icon);
        let serial = self.serial();
        self.bitmaps.insert(serial, (icon, pixels));
        debug!("bitmap #{} loaded for {}", serial, icon);
        Ok(Bitmap { serial, icon })
    }

    fn create_visual(&mut self, resource: &Bitmap, frame: Rectangle) -> Result<BitmapLayer, SurfaceError> {
        if !self.bitmaps.contains_key(&resource.serial) {
            return Err(SurfaceError::UnknownHandle { kind: "bitmap", serial: resource.serial });
        }
        let serial = self.serial();
        self.layers.insert(serial, LayerSlot { bitmap: resource.serial, frame });
        Ok(BitmapLayer { serial, bitmap: resource.serial })
    }

    fn attach_visual(&mut self, visual: &BitmapLayer) {
        if let Some(current) = self.attached {
            if current != visual.serial {
                error!("attaching layer #{} over attached layer #{}", visual.serial, current);
            }
        }
        self.attached = Some(visual.serial);
        self.redraw();
    }

    fn detach_visual(&mut self, visual: &BitmapLayer) {
        if self.attached == Some(visual.serial) {
            self.attached = None;
            self.redraw();
        } else {
            warn!("detaching layer #{} which is not attached", visual.serial);
        }
    }

    fn release_visual(&mut self, visual: BitmapLayer) {
        if self.attached == Some(visual.serial) {
            error!("layer #{} released while attached", visual.serial);
            self.attached = None;
            self.redraw();
        }
        self.layers.remove(&visual.serial);
        debug!("layer #{} on bitmap #{} released", visual.serial, visual.bitmap);
    }

    fn release_resource(&mut self, resource: Bitmap) {
        if self.layers.values().any(|slot| slot.bitmap == resource.serial) {
            // keep the pixels, a live layer still points at them
            error!("bitmap #{} released while a layer still uses it", resource.serial);
            return;
        }
        self.bitmaps.remove(&resource.serial);
        debug!("bitmap #{} released", resource.serial);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_pixels(surface: &FrameSurface, area: Rectangle) -> usize {
        area.points()
            .filter(|p| surface.framebuffer().pixel(*p) == Some(BinaryColor::On))
            .count()
    }

    #[test]
    fn test_text_draws_inside_region() {
        let mut surface = FrameSurface::new(FaceLayout::reference(), 1);
        surface.set_text(TextRegion::Temperature, "72°").unwrap();
        let temp = surface.layout().temperature.bounds;
        assert!(lit_pixels(&surface, temp) > 0);
        assert_eq!(surface.text(TextRegion::Temperature), "72°");

        surface.set_text(TextRegion::Temperature, "").unwrap();
        assert_eq!(lit_pixels(&surface, temp), 0);
    }

    #[test]
    fn test_icon_shown_only_while_attached() {
        let mut surface = FrameSurface::new(FaceLayout::reference(), 1);
        let frame = surface.layout().icon;
        let bmp = surface.acquire_resource(WeatherIcon::Rain).unwrap();
        assert_eq!(bmp.icon(), WeatherIcon::Rain);
        let layer = surface.create_visual(&bmp, frame).unwrap();
        assert_eq!(lit_pixels(&surface, frame), 0);

        surface.attach_visual(&layer);
        assert!(lit_pixels(&surface, frame) > 0);
        assert_eq!(surface.attached_icon(), Some(WeatherIcon::Rain));

        surface.detach_visual(&layer);
        surface.release_visual(layer);
        surface.release_resource(bmp);
        assert_eq!(lit_pixels(&surface, frame), 0);
        assert_eq!(surface.live_bitmaps(), 0);
        assert_eq!(surface.live_layers(), 0);
    }

    #[test]
    fn test_bitmap_budget() {
        let mut surface = FrameSurface::new(FaceLayout::reference(), 1);
        let first = surface.acquire_resource(WeatherIcon::Fog).unwrap();
        assert_eq!(
            surface.acquire_resource(WeatherIcon::Snow).unwrap_err(),
            SurfaceError::OutOfMemory("bitmap")
        );
        surface.release_resource(first);
        assert!(surface.acquire_resource(WeatherIcon::Snow).is_ok());
    }

    #[test]
    fn test_refuses_to_free_bitmap_under_a_layer() {
        let mut surface = FrameSurface::new(FaceLayout::reference(), 2);
        let frame = surface.layout().icon;
        let bmp = surface.acquire_resource(WeatherIcon::Wind).unwrap();
        let _layer = surface.create_visual(&bmp, frame).unwrap();
        surface.release_resource(bmp);
        assert_eq!(surface.live_bitmaps(), 1);
    }

    #[test]
    fn test_ascii_dump_shape() {
        let surface = FrameSurface::new(FaceLayout::reference(), 1);
        let dump = surface.to_ascii();
        assert_eq!(dump.lines().count(), 168);
        assert!(dump.lines().all(|l| l.len() == 144));
    }
}
