// MIT/Apache2 License

/// Features that are enabled on a [`Surface`](super::Surface).
///
/// Drawing with a source the target does not support fails with
/// [`Error::NotSupported`](crate::Error::NotSupported) before the backend is
/// reached.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SurfaceFeatures {
    /// Linear and radial gradients can be used as sources and masks.
    pub gradients: bool,
    /// Other surfaces can be used as sources and masks.
    pub surface_patterns: bool,
    /// Mesh gradients can be used as sources and masks.
    pub mesh_patterns: bool,
    /// Raster sources can be used as sources and masks.
    pub raster_sources: bool,
    /// The separable and non-separable blend mode operators are available.
    pub blend_modes: bool,
    /// Coverage is computed per sub-pixel, rather than only at pixel centers.
    pub antialiasing: bool,
}

impl SurfaceFeatures {
    /// Every feature is supported.
    #[inline]
    pub const fn all() -> SurfaceFeatures {
        SurfaceFeatures {
            gradients: true,
            surface_patterns: true,
            mesh_patterns: true,
            raster_sources: true,
            blend_modes: true,
            antialiasing: true,
        }
    }
}

/// What a surface stores for each pixel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Content {
    /// Only color; every pixel is opaque.
    Color,
    /// Only alpha.
    Alpha,
    /// Both color and alpha.
    ColorAlpha,
}

impl Default for Content {
    #[inline]
    fn default() -> Content {
        Content::ColorAlpha
    }
}

impl Content {
    #[inline]
    pub fn has_alpha(self) -> bool {
        !matches!(self, Content::Color)
    }

    #[inline]
    pub fn has_color(self) -> bool {
        !matches!(self, Content::Alpha)
    }
}
