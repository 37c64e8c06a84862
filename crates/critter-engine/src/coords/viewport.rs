/// Active viewport rectangle in physical pixels.
///
/// The origin is the top-left corner of the surface.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport covering a whole `width` x `height` surface: `(0, 0, width, height)`.
    #[inline]
    pub const fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Viewport after the surface was resized to `width` x `height`.
    ///
    /// Returns `None` for a zero-area size (minimized window); the caller
    /// keeps its previous viewport in that case.
    #[inline]
    pub fn after_resize(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then(|| Self::full(width, height))
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Arguments for `wgpu::RenderPass::set_viewport` (depth range 0..1).
    #[inline]
    pub fn as_pass_args(self) -> (f32, f32, f32, f32, f32, f32) {
        (
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
            0.0,
            1.0,
        )
    }
}
