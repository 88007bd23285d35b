use std::collections::VecDeque;

use renderer::{ContainerRect, GlassSurface, PointerSample, SurfaceSize, Viewport};

/// Input delivered to a surface between frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    Resize(SurfaceSize),
    PointerMove {
        pointer: PointerSample,
        container: ContainerRect,
        viewport: Viewport,
    },
    /// Carries geometry re-queried at the time of the scroll.
    Scroll {
        container: ContainerRect,
        viewport: Viewport,
    },
    Teardown,
}

/// Destination for rendered frames.
pub trait FrameHost {
    type Error;

    fn draw(&mut self, surface: &GlassSurface) -> Result<(), Self::Error>;
}

/// Cooperative driver for one surface: queued signals are applied in
/// arrival order, then exactly one frame is drawn.
pub struct FrameLoop<H> {
    surface: GlassSurface,
    host: H,
    pending: VecDeque<Signal>,
    frames: u64,
}

impl<H: FrameHost> FrameLoop<H> {
    pub fn new(surface: GlassSurface, host: H) -> Self {
        Self {
            surface,
            host,
            pending: VecDeque::new(),
            frames: 0,
        }
    }

    pub fn push(&mut self, signal: Signal) {
        self.pending.push_back(signal);
    }

    /// Runs one turn. Returns whether another turn should be scheduled;
    /// after teardown nothing is drawn and the answer is always `false`.
    pub fn tick(&mut self) -> Result<bool, H::Error> {
        while let Some(signal) = self.pending.pop_front() {
            self.apply(signal);
        }
        if !self.surface.is_active() {
            return Ok(false);
        }
        self.host.draw(&self.surface)?;
        self.frames += 1;
        Ok(true)
    }

    fn apply(&mut self, signal: Signal) {
        match signal {
            Signal::Resize(size) => {
                self.surface.resize(size);
            }
            Signal::PointerMove {
                pointer,
                container,
                viewport,
            } => {
                self.surface.pointer_move(pointer, &container, viewport);
            }
            Signal::Scroll {
                container,
                viewport,
            } => {
                self.surface.scroll(&container, viewport);
            }
            Signal::Teardown => {
                self.surface.deactivate();
                let dropped = self.pending.len();
                self.pending.clear();
                tracing::debug!(dropped, "frame loop torn down");
            }
        }
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn surface(&self) -> &GlassSurface {
        &self.surface
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}
