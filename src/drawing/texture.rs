//! CPU-side texture wrapper
//!
//! Holds the pixel data an atlas or fallback image resolves to. GPU
//! upload is a backend concern; painters read pixels (or the image)
//! directly from here.

use crate::drawing::geometry::Size;
use image::RgbaImage;

pub struct Texture {
    image: RgbaImage,
    smooth: bool,
}

impl Texture {
    pub fn new(image: RgbaImage) -> Self {
        Texture {
            image,
            smooth: false,
        }
    }

    /// Linear-filtered sampling hint for backends. Whole-string fallback
    /// textures are drawn smooth; atlas tiles are not.
    pub fn set_smooth(&mut self, smooth: bool) {
        self.smooth = smooth;
    }

    pub fn smooth(&self) -> bool {
        self.smooth
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn size(&self) -> Size {
        Size::new(self.image.width() as i32, self.image.height() as i32)
    }
}

impl std::fmt::Debug for Texture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Texture")
            .field("size", &self.size())
            .field("smooth", &self.smooth)
            .finish()
    }
}
