//! Attachment declarations and their resolved, concrete counterparts.

/// What kind of image an attachment backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Depth,
    /// The single sink attachment every schedule ends at.
    Swapchain,
}

/// How an attachment's pixel extent is determined when it isn't simply
/// "whatever this pass's own viewport resolves to".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentExtent {
    Fixed(u32, u32),
    MatchSwapchain,
}

/// One attachment a pass produces.
#[derive(Debug, Clone)]
pub struct AttachmentDecl {
    pub name: String,
    pub kind: AttachmentKind,
    /// `None` for `Swapchain`, whose format is always the surface format
    /// supplied to [`crate::graph::GraphBuilder::build`]; `None` for `Depth`
    /// defers to the engine's default depth format.
    pub format: Option<wgpu::TextureFormat>,
    pub clear_color: Option<wgpu::Color>,
    pub blend_state: Option<wgpu::BlendState>,
    pub extent: AttachmentExtent,
}

impl AttachmentDecl {
    #[must_use]
    pub fn image(name: impl Into<String>, format: wgpu::TextureFormat) -> Self {
        Self {
            name: name.into(),
            kind: AttachmentKind::Image,
            format: Some(format),
            clear_color: Some(wgpu::Color::TRANSPARENT),
            blend_state: None,
            extent: AttachmentExtent::MatchSwapchain,
        }
    }

    #[must_use]
    pub fn depth(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttachmentKind::Depth,
            format: None,
            clear_color: None,
            blend_state: None,
            extent: AttachmentExtent::MatchSwapchain,
        }
    }

    #[must_use]
    pub fn swapchain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: AttachmentKind::Swapchain,
            format: None,
            clear_color: Some(wgpu::Color::BLACK),
            blend_state: None,
            extent: AttachmentExtent::MatchSwapchain,
        }
    }

    #[must_use]
    pub fn with_clear_color(mut self, color: wgpu::Color) -> Self {
        self.clear_color = Some(color);
        self
    }

    #[must_use]
    pub fn with_blend_state(mut self, blend: wgpu::BlendState) -> Self {
        self.blend_state = Some(blend);
        self
    }

    #[must_use]
    pub fn with_extent(mut self, extent: AttachmentExtent) -> Self {
        self.extent = extent;
        self
    }
}

/// A pass's viewport declaration, resolved at build time against the
/// swapchain extent and (for `Dynamic`) its own produced attachments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Viewport {
    Fixed { width: u32, height: u32 },
    /// Fraction of the swapchain extent.
    Window { scale_x: f32, scale_y: f32 },
    /// The extent of the first produced non-swapchain attachment.
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedViewport {
    pub width: u32,
    pub height: u32,
}

/// An [`AttachmentDecl`] with every field resolved to a concrete value.
#[derive(Debug, Clone)]
pub struct ResolvedAttachment {
    pub name: String,
    pub kind: AttachmentKind,
    pub format: wgpu::TextureFormat,
    pub clear_color: Option<wgpu::Color>,
    pub blend_state: Option<wgpu::BlendState>,
    pub width: u32,
    pub height: u32,
}
