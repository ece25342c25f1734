/*
 *  icon_manager.rs
 *
 *  wxface - weather on the wrist
 *  (c) 2020-26 Stuart Hunter
 *
 *  Ownership of the single weather icon bitmap and its layer
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
use log::{debug, info, warn};
use std::mem;

use crate::error::IconError;
use crate::icons::{self, IconId, WeatherIcon};
use crate::surface::DisplaySurface;

/// Observable state of the icon slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconState {
    /// No icon shown yet
    Empty,
    /// Resource and visual for this id are live and attached
    Showing(IconId),
    /// Torn down at shutdown, accepts nothing further
    Released,
}

enum Slot<R, V> {
    Empty,
    Showing { icon: WeatherIcon, resource: R, visual: V },
    Released,
}

/// Owner of the one icon resource/visual pair.
///
/// The pair is only ever created and destroyed together, through `set` and
/// `teardown`. Swapping always runs detach, release visual, release resource
/// and only then acquire, create, attach, so at most one pair is alive.
pub struct IconManager<S: DisplaySurface> {
    slot: Slot<S::Resource, S::Visual>,
    frame: Rectangle,
}

impl<S: DisplaySurface> IconManager<S> {
    /// `frame` is the fixed position and size of the icon visual
    pub fn new(frame: Rectangle) -> Self {
        Self { slot: Slot::Empty, frame }
    }

    pub fn state(&self) -> IconState {
        match &self.slot {
            Slot::Empty => IconState::Empty,
            Slot::Showing { icon, .. } => IconState::Showing(icon.id()),
            Slot::Released => IconState::Released,
        }
    }

    pub fn current(&self) -> Option<IconId> {
        match self.state() {
            IconState::Showing(id) => Some(id),
            _ => None,
        }
    }

    /// Show the icon with catalog id `id`.
    ///
    /// An invalid id leaves whatever is on screen untouched. If the host
    /// cannot allocate the new icon the previous one is put back.
    pub fn set(&mut self, surface: &mut S, id: i32) -> Result<IconId, IconError> {
        if matches!(self.slot, Slot::Released) {
            return Err(IconError::Released);
        }
        let icon = icons::resolve(id)?;

        if let Slot::Showing { icon: shown, .. } = &self.slot {
            if *shown == icon {
                debug!("icon {} already showing", icon);
                return Ok(icon.id());
            }
        }

        let previous = self.release_current(surface);
        match self.show(surface, icon) {
            Ok(()) => {
                info!("weather icon now {}", icon);
                Ok(icon.id())
            }
            Err(e) => {
                warn!("could not show icon {}: {}", icon, e);
                if let Some(prev) = previous {
                    match self.show(surface, prev) {
                        Ok(()) => debug!("restored icon {}", prev),
                        Err(e) => warn!("could not restore icon {}: {}", prev, e),
                    }
                }
                Err(e)
            }
        }
    }

    /// Release the pair for good. Safe to call more than once.
    pub fn teardown(&mut self, surface: &mut S) {
        if let Some(icon) = self.release_current(surface) {
            debug!("icon {} torn down", icon);
        }
        self.slot = Slot::Released;
    }

    fn show(&mut self, surface: &mut S, icon: WeatherIcon) -> Result<(), IconError> {
        let resource = surface.acquire_resource(icon)?;
        let visual = match surface.create_visual(&resource, self.frame) {
            Ok(visual) => visual,
            Err(e) => {
                surface.release_resource(resource);
                return Err(e.into());
            }
        };
        surface.attach_visual(&visual);
        self.slot = Slot::Showing { icon, resource, visual };
        Ok(())
    }

    /// Detach and free the current pair, leaving the slot Empty
    fn release_current(&mut self, surface: &mut S) -> Option<WeatherIcon> {
        match mem::replace(&mut self.slot, Slot::Empty) {
            Slot::Showing { icon, resource, visual } => {
                surface.detach_visual(&visual);
                surface.release_visual(visual);
                surface.release_resource(resource);
                Some(icon)
            }
            other => {
                self.slot = other;
                None
            }
        }
    }
}

impl<S: DisplaySurface> Drop for IconManager<S> {
    fn drop(&mut self) {
        if let Slot::Showing { icon, .. } = &self.slot {
            warn!("icon manager dropped while showing {}, host resources leak", icon);
        }
    }
}
