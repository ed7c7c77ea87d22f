//! Pipeline stage / memory access bitmasks and image layouts.
//!
//! These mirror the Vulkan-flavoured vocabulary the frame-graph core reasons
//! about without pulling in a concrete graphics API crate.

bitflags::bitflags! {
    #[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
    pub struct PipelineStage: u32 {
        const TOP_OF_PIPE            = 1 << 0;
        const DRAW_INDIRECT          = 1 << 1;
        const VERTEX_INPUT           = 1 << 2;
        const VERTEX_SHADER          = 1 << 3;
        const FRAGMENT_SHADER        = 1 << 4;
        const EARLY_FRAGMENT_TESTS   = 1 << 5;
        const LATE_FRAGMENT_TESTS    = 1 << 6;
        const COLOR_ATTACHMENT_OUTPUT = 1 << 7;
        const COMPUTE_SHADER         = 1 << 8;
        const TRANSFER               = 1 << 9;
        const HOST                   = 1 << 10;
        const BOTTOM_OF_PIPE         = 1 << 11;

        const ALL_GRAPHICS = Self::DRAW_INDIRECT.bits()
            | Self::VERTEX_INPUT.bits()
            | Self::VERTEX_SHADER.bits()
            | Self::FRAGMENT_SHADER.bits()
            | Self::EARLY_FRAGMENT_TESTS.bits()
            | Self::LATE_FRAGMENT_TESTS.bits()
            | Self::COLOR_ATTACHMENT_OUTPUT.bits();
        const ALL_TRANSFER = Self::TRANSFER.bits();
        const ALL = Self::ALL_GRAPHICS.bits()
            | Self::COMPUTE_SHADER.bits()
            | Self::ALL_TRANSFER.bits()
            | Self::HOST.bits()
            | Self::TOP_OF_PIPE.bits()
            | Self::BOTTOM_OF_PIPE.bits();
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Eq, PartialEq, Debug, Default)]
    pub struct MemoryAccess: u32 {
        const INDIRECT_COMMAND_READ          = 1 << 0;
        const INDEX_READ                     = 1 << 1;
        const VERTEX_ATTRIBUTE_READ          = 1 << 2;
        const UNIFORM_READ                   = 1 << 3;
        const SHADER_READ                    = 1 << 4;
        const SHADER_WRITE                   = 1 << 5;
        const COLOR_ATTACHMENT_READ          = 1 << 6;
        const COLOR_ATTACHMENT_WRITE         = 1 << 7;
        const DEPTH_STENCIL_ATTACHMENT_READ  = 1 << 8;
        const DEPTH_STENCIL_ATTACHMENT_WRITE = 1 << 9;
        const TRANSFER_READ                  = 1 << 10;
        const TRANSFER_WRITE                 = 1 << 11;
        const HOST_READ                      = 1 << 12;
        const HOST_WRITE                     = 1 << 13;

        const ALL_READS = Self::INDIRECT_COMMAND_READ.bits()
            | Self::INDEX_READ.bits()
            | Self::VERTEX_ATTRIBUTE_READ.bits()
            | Self::UNIFORM_READ.bits()
            | Self::SHADER_READ.bits()
            | Self::COLOR_ATTACHMENT_READ.bits()
            | Self::DEPTH_STENCIL_ATTACHMENT_READ.bits()
            | Self::TRANSFER_READ.bits()
            | Self::HOST_READ.bits();
        const ALL_WRITES = Self::SHADER_WRITE.bits()
            | Self::COLOR_ATTACHMENT_WRITE.bits()
            | Self::DEPTH_STENCIL_ATTACHMENT_WRITE.bits()
            | Self::TRANSFER_WRITE.bits()
            | Self::HOST_WRITE.bits();
    }
}

/// Image layout. Mirrors the original engine's `get_access_mask_for_layout`
/// table: each layout implies a fixed memory-access mask when no explicit
/// hint is supplied to the task builder.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum ImageLayout {
    Undefined,
    General,
    ColorAttachment,
    DepthStencilAttachment,
    DepthStencilReadOnly,
    Depth,
    DepthReadOnly,
    Stencil,
    StencilReadOnly,
    ShaderReadOnly,
    TransferSrc,
    TransferDst,
    Present,
}

impl ImageLayout {
    pub fn implied_access(self) -> MemoryAccess {
        use ImageLayout::*;
        match self {
            Undefined | Present => MemoryAccess::empty(),
            General => MemoryAccess::SHADER_READ | MemoryAccess::SHADER_WRITE,
            ColorAttachment => MemoryAccess::COLOR_ATTACHMENT_READ | MemoryAccess::COLOR_ATTACHMENT_WRITE,
            DepthStencilAttachment | Depth | Stencil => {
                MemoryAccess::DEPTH_STENCIL_ATTACHMENT_READ | MemoryAccess::DEPTH_STENCIL_ATTACHMENT_WRITE
            }
            DepthStencilReadOnly | DepthReadOnly | StencilReadOnly => {
                MemoryAccess::DEPTH_STENCIL_ATTACHMENT_READ
            }
            ShaderReadOnly => MemoryAccess::SHADER_READ,
            TransferSrc => MemoryAccess::TRANSFER_READ,
            TransferDst => MemoryAccess::TRANSFER_WRITE,
        }
    }
}
