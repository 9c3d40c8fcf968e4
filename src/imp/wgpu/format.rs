// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use wgpu::{TextureFormat, TextureFormatFeatureFlags, TextureUsages};

use crate::format::Format;
use crate::imp::FormatSupport;

/// `None` for formats wgpu can't express.
pub(crate) fn to_wgpu(format: Format) -> Option<TextureFormat> {
    use Format::*;
    Some(match format {
        Undefined | RGB32UInt | RGB32Int | RGB32Float => return None,
        R8UNorm => TextureFormat::R8Unorm,
        R8Norm => TextureFormat::R8Snorm,
        R8UInt => TextureFormat::R8Uint,
        R8Int => TextureFormat::R8Sint,
        RG8UNorm => TextureFormat::Rg8Unorm,
        RG8Norm => TextureFormat::Rg8Snorm,
        RG8UInt => TextureFormat::Rg8Uint,
        RG8Int => TextureFormat::Rg8Sint,
        RGBA8UNorm => TextureFormat::Rgba8Unorm,
        RGBA8Norm => TextureFormat::Rgba8Snorm,
        RGBA8UInt => TextureFormat::Rgba8Uint,
        RGBA8Int => TextureFormat::Rgba8Sint,
        RGBA8sRGB => TextureFormat::Rgba8UnormSrgb,
        BGRA8UNorm => TextureFormat::Bgra8Unorm,
        BGRA8sRGB => TextureFormat::Bgra8UnormSrgb,
        RGB10A2UNorm => TextureFormat::Rgb10a2Unorm,
        RGB10A2UInt => TextureFormat::Rgb10a2Uint,
        R16UNorm => TextureFormat::R16Unorm,
        R16Norm => TextureFormat::R16Snorm,
        R16UInt => TextureFormat::R16Uint,
        R16Int => TextureFormat::R16Sint,
        R16Float => TextureFormat::R16Float,
        RG16UNorm => TextureFormat::Rg16Unorm,
        RG16Norm => TextureFormat::Rg16Snorm,
        RG16UInt => TextureFormat::Rg16Uint,
        RG16Int => TextureFormat::Rg16Sint,
        RG16Float => TextureFormat::Rg16Float,
        RGBA16UNorm => TextureFormat::Rgba16Unorm,
        RGBA16Norm => TextureFormat::Rgba16Snorm,
        RGBA16UInt => TextureFormat::Rgba16Uint,
        RGBA16Int => TextureFormat::Rgba16Sint,
        RGBA16Float => TextureFormat::Rgba16Float,
        R32UInt => TextureFormat::R32Uint,
        R32Int => TextureFormat::R32Sint,
        R32Float => TextureFormat::R32Float,
        RG32UInt => TextureFormat::Rg32Uint,
        RG32Int => TextureFormat::Rg32Sint,
        RG32Float => TextureFormat::Rg32Float,
        RGBA32UInt => TextureFormat::Rgba32Uint,
        RGBA32Int => TextureFormat::Rgba32Sint,
        RGBA32Float => TextureFormat::Rgba32Float,
        D16UNorm => TextureFormat::Depth16Unorm,
        D24UNormS8UInt => TextureFormat::Depth24PlusStencil8,
        D32Float => TextureFormat::Depth32Float,
        D32FloatS8X24UInt => TextureFormat::Depth32FloatStencil8,
    })
}

pub(crate) fn from_wgpu(format: TextureFormat) -> Option<Format> {
    Format::ALL
        .iter()
        .copied()
        .find(|candidate| to_wgpu(*candidate) == Some(format))
}

/// Projects wgpu's format features onto the raw support descriptor.
pub(crate) fn format_support(adapter: &wgpu::Adapter, format: Format) -> FormatSupport {
    let Some(wgpu_format) = to_wgpu(format) else {
        return FormatSupport::default();
    };
    if !adapter.features().contains(wgpu_format.required_features()) {
        return FormatSupport::default();
    }
    let features = adapter.get_texture_format_features(wgpu_format);
    let usages = features.allowed_usages;
    let flags = features.flags;
    let depth = wgpu_format.is_depth_stencil_format();
    let any = !usages.is_empty();
    let level = |flag: TextureFormatFeatureFlags| u32::from(flags.contains(flag));
    FormatSupport {
        transfer: usages.contains(TextureUsages::COPY_SRC | TextureUsages::COPY_DST),
        sample: usages.contains(TextureUsages::TEXTURE_BINDING),
        storage: usages.contains(TextureUsages::STORAGE_BINDING),
        render_target: !depth && usages.contains(TextureUsages::RENDER_ATTACHMENT),
        depth_stencil: depth && usages.contains(TextureUsages::RENDER_ATTACHMENT),
        texture_1d: any && !depth,
        texture_2d: any,
        texture_3d: any && !depth,
        quality_levels: [
            u32::from(any),
            level(TextureFormatFeatureFlags::MULTISAMPLE_X2),
            level(TextureFormatFeatureFlags::MULTISAMPLE_X4),
            level(TextureFormatFeatureFlags::MULTISAMPLE_X8),
            level(TextureFormatFeatureFlags::MULTISAMPLE_X16),
            0,
        ],
    }
}
