//! Maps raw input signals onto the single motion value read by the warp.
//!
//! The motion value lives in a [`MotionCell`]: one `Rc<Cell<f32>>` shared
//! between the controller (the only writer) and the frame state (the reader).
//! It is deliberately `!Send` and `!Sync`. Signal handlers and the frame
//! render run as separate turns of one cooperative thread; a handler must not
//! be invoked from inside a frame render, and vice versa.

use std::cell::Cell;
use std::rc::Rc;

use glassconfig::{EffectConfig, InteractionMode};

use crate::types::{ContainerRect, PointerSample, Viewport};

/// Value at which the warp phase is centred.
pub const RESTING_MOTION: f32 = 0.5;
/// Full-range scroll contribution before the motion factor is applied.
pub const SCROLL_MAX_MOVEMENT: f32 = 0.2;

/// Shared single-threaded slot holding the current motion value.
#[derive(Debug, Clone)]
pub struct MotionCell(Rc<Cell<f32>>);

impl MotionCell {
    pub fn new(value: f32) -> Self {
        Self(Rc::new(Cell::new(value)))
    }

    pub fn get(&self) -> f32 {
        self.0.get()
    }

    pub fn set(&self, value: f32) {
        self.0.set(value);
    }
}

impl Default for MotionCell {
    fn default() -> Self {
        Self::new(RESTING_MOTION)
    }
}

/// One interaction mode's reaction to each kind of input signal.
///
/// `None` means "leave the motion value untouched".
trait MotionSource {
    fn pointer_moved(
        &self,
        _pointer: PointerSample,
        _container: &ContainerRect,
        _viewport: Viewport,
    ) -> Option<f32> {
        None
    }

    fn scrolled(&self, _container: &ContainerRect, _viewport: Viewport) -> Option<f32> {
        None
    }
}

#[derive(Debug, Clone, Copy)]
struct StaticMotion;

impl MotionSource for StaticMotion {}

#[derive(Debug, Clone, Copy)]
struct PointerMotion {
    /// Motion factor with the pointer attenuation already folded in.
    factor: f32,
}

impl MotionSource for PointerMotion {
    fn pointer_moved(
        &self,
        pointer: PointerSample,
        container: &ContainerRect,
        viewport: Viewport,
    ) -> Option<f32> {
        if !container.contains(pointer.x, pointer.y) {
            return None;
        }
        if !(viewport.width.is_finite() && viewport.width > 0.0) {
            tracing::trace!(width = viewport.width, "pointer update skipped: empty viewport");
            return None;
        }
        let normalized_x = pointer.x / viewport.width;
        finite(RESTING_MOTION + normalized_x * self.factor)
    }
}

#[derive(Debug, Clone, Copy)]
struct ScrollMotion {
    factor: f32,
}

impl MotionSource for ScrollMotion {
    fn scrolled(&self, container: &ContainerRect, viewport: Viewport) -> Option<f32> {
        if container.height <= 0.0 || !container.intersects_vertically(viewport) {
            return None;
        }
        let total = viewport.height + container.height;
        if !(total.is_finite() && total > 0.0) {
            tracing::trace!(total, "scroll update skipped: degenerate geometry");
            return None;
        }
        // Left unclamped: slightly outside [0, 1] while entering or leaving.
        let progress = (viewport.height - container.top) / total;
        finite(RESTING_MOTION + progress * SCROLL_MAX_MOVEMENT * self.factor)
    }
}

fn finite(value: f32) -> Option<f32> {
    value.is_finite().then_some(value)
}

#[derive(Debug, Clone, Copy)]
enum MotionStrategy {
    Static(StaticMotion),
    Pointer(PointerMotion),
    Scroll(ScrollMotion),
}

impl MotionStrategy {
    fn for_config(config: &EffectConfig) -> Self {
        match config.interaction_mode() {
            InteractionMode::Static => Self::Static(StaticMotion),
            InteractionMode::Pointer => Self::Pointer(PointerMotion {
                factor: config.motion_factor() * config.pointer_attenuation(),
            }),
            InteractionMode::Scroll => Self::Scroll(ScrollMotion {
                factor: config.motion_factor(),
            }),
        }
    }

    fn pointer_moved(
        &self,
        pointer: PointerSample,
        container: &ContainerRect,
        viewport: Viewport,
    ) -> Option<f32> {
        match self {
            Self::Static(source) => source.pointer_moved(pointer, container, viewport),
            Self::Pointer(source) => source.pointer_moved(pointer, container, viewport),
            Self::Scroll(source) => source.pointer_moved(pointer, container, viewport),
        }
    }

    fn scrolled(&self, container: &ContainerRect, viewport: Viewport) -> Option<f32> {
        match self {
            Self::Static(source) => source.scrolled(container, viewport),
            Self::Pointer(source) => source.scrolled(container, viewport),
            Self::Scroll(source) => source.scrolled(container, viewport),
        }
    }
}

/// Owns updates of the motion value under exactly one interaction mode.
#[derive(Debug, Clone)]
pub struct MotionController {
    strategy: MotionStrategy,
    mode: InteractionMode,
    cell: MotionCell,
}

impl MotionController {
    /// Selects the strategy once and resets the value to [`RESTING_MOTION`].
    pub fn new(config: &EffectConfig, cell: MotionCell) -> Self {
        cell.set(RESTING_MOTION);
        Self {
            strategy: MotionStrategy::for_config(config),
            mode: config.interaction_mode(),
            cell,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn value(&self) -> f32 {
        self.cell.get()
    }

    /// Eager update performed once at setup; only scroll mode reacts.
    pub fn prime(&mut self, container: &ContainerRect, viewport: Viewport) -> bool {
        self.on_scroll(container, viewport)
    }

    /// Returns whether the motion value was written.
    pub fn on_pointer_move(
        &mut self,
        pointer: PointerSample,
        container: &ContainerRect,
        viewport: Viewport,
    ) -> bool {
        let next = self.strategy.pointer_moved(pointer, container, viewport);
        self.store(next)
    }

    pub fn on_scroll(&mut self, container: &ContainerRect, viewport: Viewport) -> bool {
        let next = self.strategy.scrolled(container, viewport);
        self.store(next)
    }

    fn store(&self, next: Option<f32>) -> bool {
        match next {
            Some(value) => {
                self.cell.set(value);
                true
            }
            None => false,
        }
    }
}
