//! Screen ⇄ image coordinate mapping.
//!
//! The canvas shows the image shrunk to fit the space the host layout
//! offers (never enlarged). Annotations are stored in image space; pointer
//! positions arrive in screen space. Everything that crosses between the two
//! goes through [`Viewport`].

use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::model::{Extent, Point, Rect};

/// Smallest extent used for fitting when the layout reports nothing usable.
pub const MIN_AVAILABLE_EXTENT: f64 = 1.0;

/// Natural size of the loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn extent(&self) -> Extent {
        Extent::new(f64::from(self.width), f64::from(self.height))
    }
}

/// Display scale for one loaded image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    image: ImageSize,
    scale: f64,
}

impl Viewport {
    /// Fit `image` into the available space, capped at `max_canvas`.
    ///
    /// Fails for images with a zero dimension.
    pub fn fit(image: ImageSize, available: Extent, max_canvas: Extent) -> Result<Self, SessionError> {
        if image.is_degenerate() {
            return Err(SessionError::DegenerateImage {
                width: image.width,
                height: image.height,
            });
        }
        Ok(Self {
            image,
            scale: fit_scale(image, available, max_canvas),
        })
    }

    /// Recompute the scale after the container changed size. Returns the new
    /// scale.
    pub fn resize(&mut self, available: Extent, max_canvas: Extent) -> f64 {
        self.scale = fit_scale(self.image, available, max_canvas);
        self.scale
    }

    /// Ratio of canvas size to natural image size; always in `(0, 1]`.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn image(&self) -> ImageSize {
        self.image
    }

    /// Size of the canvas the image is drawn into.
    pub fn canvas_size(&self) -> Extent {
        let natural = self.image.extent();
        Extent::new(natural.width * self.scale, natural.height * self.scale)
    }

    /// Rectangle the background image is drawn into.
    pub fn canvas_rect(&self) -> Rect {
        Rect::from_extent(self.canvas_size())
    }

    /// Convert a screen-space point to image space.
    #[inline]
    pub fn to_image(&self, screen: Point) -> Point {
        Point::new(screen.x / self.scale, screen.y / self.scale)
    }

    /// Convert an image-space point to screen space.
    #[inline]
    pub fn to_screen(&self, image: Point) -> Point {
        image.scaled(self.scale)
    }

    /// Convert a sequence of image-space points to screen space.
    pub fn path_to_screen(&self, points: &[Point]) -> Vec<Point> {
        points.iter().map(|p| self.to_screen(*p)).collect()
    }
}

/// `min(1, avail_w / img_w, avail_h / img_h)` with the available extent
/// capped at `max_canvas` and clamped to at least one pixel.
fn fit_scale(image: ImageSize, available: Extent, max_canvas: Extent) -> f64 {
    let natural = image.extent();
    let max_width = usable(available.width.min(max_canvas.width), "width");
    let max_height = usable(available.height.min(max_canvas.height), "height");

    let scale = (max_width / natural.width).min(max_height / natural.height).min(1.0);
    log::debug!(
        "Fit {}x{} image into {:.0}x{:.0}: scale {:.4}",
        image.width,
        image.height,
        max_width,
        max_height,
        scale
    );
    scale
}

fn usable(value: f64, axis: &str) -> f64 {
    // NaN fails the comparison and falls through to the clamp.
    if value >= MIN_AVAILABLE_EXTENT && value.is_finite() {
        value
    } else {
        log::warn!(
            "Available {} {} is unusable, clamping to {}px",
            axis,
            value,
            MIN_AVAILABLE_EXTENT
        );
        MIN_AVAILABLE_EXTENT
    }
}
