use crate::motion::MotionCell;
use crate::types::SurfaceSize;

/// Mutable per-surface state read by every frame.
#[derive(Debug, Clone)]
pub struct FrameState {
    surface_size: SurfaceSize,
    motion: MotionCell,
}

impl FrameState {
    pub fn new(surface_size: SurfaceSize, motion: MotionCell) -> Self {
        Self {
            surface_size,
            motion,
        }
    }

    pub fn surface_size(&self) -> SurfaceSize {
        self.surface_size
    }

    pub fn motion_value(&self) -> f32 {
        self.motion.get()
    }

    /// Overrides the motion value, bypassing the controller.
    pub fn set_motion_value(&self, value: f32) {
        self.motion.set(value);
    }

    /// Applies a container resize. Degenerate sizes are ignored so the
    /// aspect math never sees a zero height.
    pub fn resize(&mut self, new_size: SurfaceSize) -> bool {
        if new_size.is_degenerate() {
            tracing::trace!(
                width = new_size.width,
                height = new_size.height,
                "ignoring degenerate resize"
            );
            return false;
        }
        self.surface_size = new_size;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_updates_size() {
        let mut frame = FrameState::new(SurfaceSize::new(100.0, 50.0), MotionCell::default());
        assert!(frame.resize(SurfaceSize::new(300.0, 200.0)));
        assert_eq!(frame.surface_size(), SurfaceSize::new(300.0, 200.0));
        assert!((frame.surface_size().aspect() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn zero_height_resize_is_skipped() {
        let mut frame = FrameState::new(SurfaceSize::new(100.0, 50.0), MotionCell::default());
        assert!(!frame.resize(SurfaceSize::new(300.0, 0.0)));
        assert_eq!(frame.surface_size(), SurfaceSize::new(100.0, 50.0));
    }

    #[test]
    fn motion_value_is_shared_with_cell() {
        let cell = MotionCell::default();
        let frame = FrameState::new(SurfaceSize::new(1.0, 1.0), cell.clone());
        cell.set(0.9);
        assert_eq!(frame.motion_value(), 0.9);
        frame.set_motion_value(0.1);
        assert_eq!(cell.get(), 0.1);
    }
}
