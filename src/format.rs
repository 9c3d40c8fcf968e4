// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Texel formats.

Component suffixes follow the usual convention:

* `UNorm`: unsigned integer read as a float in `[0, 1]`
* `Norm`: signed integer read as a float in `[-1, 1]`
* `UInt` / `Int`: integers
* `Float`: floating point
* `sRGB`: unsigned normalized with sRGB encoding
*/

closed_enum! {
    /// The layout of a single texel.
    #[allow(non_camel_case_types)]
    pub enum Format {
        Undefined = 0,

        R8UNorm = 1,
        R8Norm = 2,
        R8UInt = 3,
        R8Int = 4,

        RG8UNorm = 5,
        RG8Norm = 6,
        RG8UInt = 7,
        RG8Int = 8,

        RGBA8UNorm = 9,
        RGBA8Norm = 10,
        RGBA8UInt = 11,
        RGBA8Int = 12,
        RGBA8sRGB = 13,

        BGRA8UNorm = 14,
        BGRA8sRGB = 15,

        RGB10A2UNorm = 16,
        RGB10A2UInt = 17,

        R16UNorm = 18,
        R16Norm = 19,
        R16UInt = 20,
        R16Int = 21,
        R16Float = 22,

        RG16UNorm = 23,
        RG16Norm = 24,
        RG16UInt = 25,
        RG16Int = 26,
        RG16Float = 27,

        RGBA16UNorm = 28,
        RGBA16Norm = 29,
        RGBA16UInt = 30,
        RGBA16Int = 31,
        RGBA16Float = 32,

        R32UInt = 33,
        R32Int = 34,
        R32Float = 35,

        RG32UInt = 36,
        RG32Int = 37,
        RG32Float = 38,

        RGB32UInt = 39,
        RGB32Int = 40,
        RGB32Float = 41,

        RGBA32UInt = 42,
        RGBA32Int = 43,
        RGBA32Float = 44,

        D16UNorm = 45,
        D24UNormS8UInt = 46,
        D32Float = 47,
        D32FloatS8X24UInt = 48,
    }
}

impl Format {
    /// True for formats with a depth aspect.
    pub const fn is_depth(self) -> bool {
        matches!(
            self,
            Format::D16UNorm | Format::D24UNormS8UInt | Format::D32Float | Format::D32FloatS8X24UInt
        )
    }

    /// True for formats with a stencil aspect.
    pub const fn has_stencil(self) -> bool {
        matches!(self, Format::D24UNormS8UInt | Format::D32FloatS8X24UInt)
    }

    /// True for the sRGB-encoded formats.
    pub const fn is_srgb(self) -> bool {
        matches!(self, Format::RGBA8sRGB | Format::BGRA8sRGB)
    }

    /// Size of one texel in bytes.  `0` for [Format::Undefined].
    pub const fn bytes_per_texel(self) -> u32 {
        use Format::*;
        match self {
            Undefined => 0,
            R8UNorm | R8Norm | R8UInt | R8Int => 1,
            RG8UNorm | RG8Norm | RG8UInt | RG8Int => 2,
            RGBA8UNorm | RGBA8Norm | RGBA8UInt | RGBA8Int | RGBA8sRGB | BGRA8UNorm | BGRA8sRGB
            | RGB10A2UNorm | RGB10A2UInt => 4,
            R16UNorm | R16Norm | R16UInt | R16Int | R16Float => 2,
            RG16UNorm | RG16Norm | RG16UInt | RG16Int | RG16Float => 4,
            RGBA16UNorm | RGBA16Norm | RGBA16UInt | RGBA16Int | RGBA16Float => 8,
            R32UInt | R32Int | R32Float => 4,
            RG32UInt | RG32Int | RG32Float => 8,
            RGB32UInt | RGB32Int | RGB32Float => 12,
            RGBA32UInt | RGBA32Int | RGBA32Float => 16,
            D16UNorm => 2,
            D24UNormS8UInt | D32Float => 4,
            D32FloatS8X24UInt => 8,
        }
    }
}
