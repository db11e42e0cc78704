// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Pixel and image layouts.
//!
//! A layout only describes where bytes are, it never owns them. The [`PixelLayout`] is the color
//! info of an image, a sample kind and a channel count. The [`ImageLayout`] adds the dimensions and the row stride, and validates that every row can be
//! addressed and reinterpreted as samples.
use core::fmt;

use crate::texel::SampleKind;

/// The row alignment used when allocating images without an explicit stride.
pub const DEFAULT_ROW_ALIGNMENT: usize = 4;

/// The interpretation of a single pixel: sample kind and number of interleaved channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelLayout {
    kind: SampleKind,
    channels: u8,
}

/// A rectangle of pixels, for sub-views and work partitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A validated layout of a rectangular, row-major matrix of pixels.
///
/// The invariants are that the whole layout fits into memory, that each row is at least as long as
/// its pixels, and that the stride is a multiple of the sample size. Together with an aligned
/// start of the first row this ensures that every row can be viewed as a slice of samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ImageLayout {
    pixel: PixelLayout,
    width: u32,
    height: u32,
    /// The number of bytes from the start of one row to the start of the next.
    stride: usize,
    /// The total number of bytes, as proof of calculation basically.
    total: usize,
}

/// Error that occurs when a layout or a view can not be constructed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("a pixel needs at least one channel")]
    ZeroChannels,
    #[error("stride of {stride} bytes is shorter than a row of {row} bytes")]
    StrideTooSmall { stride: usize, row: usize },
    #[error("stride of {stride} bytes is not a multiple of the {kind} sample size")]
    UnalignedStride { stride: usize, kind: SampleKind },
    #[error("row alignment must be a non-zero power of two, got {0}")]
    BadAlignment(usize),
    #[error("layout does not fit into the address space")]
    OutOfMemory,
    #[error("rectangle {rect:?} is not contained in a {width}x{height} image")]
    RectOutOfBounds { rect: Rect, width: u32, height: u32 },
    #[error("buffer of {len} bytes is too small for a layout of {required} bytes")]
    BufferTooSmall { len: usize, required: usize },
    #[error("expected {required} samples, got {len}")]
    SampleCount { len: usize, required: usize },
    #[error("buffer is not aligned for {0} samples")]
    UnalignedBuffer(SampleKind),
    #[error("expected a view of {expected} pixels with equal size, got {actual} pixels")]
    Mismatch {
        expected: PixelLayout,
        actual: PixelLayout,
    },
    #[error("image holds {actual} samples but {requested} samples were requested")]
    SampleMismatch {
        actual: SampleKind,
        requested: SampleKind,
    },
}

impl PixelLayout {
    /// Describe a pixel of `channels` samples of the given kind.
    pub fn new(kind: SampleKind, channels: u8) -> Result<Self, LayoutError> {
        if channels == 0 {
            return Err(LayoutError::ZeroChannels);
        }

        Ok(PixelLayout { kind, channels })
    }

    /// A single channel pixel, such as a gray value or a mask.
    pub const fn gray(kind: SampleKind) -> Self {
        PixelLayout { kind, channels: 1 }
    }

    /// The layout of an operation mask.
    pub const fn mask() -> Self {
        Self::gray(SampleKind::U8)
    }

    pub const fn kind(self) -> SampleKind {
        self.kind
    }

    pub const fn channels(self) -> u8 {
        self.channels
    }

    /// The number of bytes of one pixel.
    pub const fn size(self) -> usize {
        self.channels as usize * self.kind.size()
    }
}

impl fmt::Display for PixelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.kind, self.channels)
    }
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    /// A rectangle at the origin.
    pub const fn with_size(width: u32, height: u32) -> Self {
        Rect::new(0, 0, width, height)
    }

    /// The number of pixels covered.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// One past the last column, without overflow.
    pub fn right(&self) -> u64 {
        u64::from(self.x) + u64::from(self.width)
    }

    /// One past the last row, without overflow.
    pub fn bottom(&self) -> u64 {
        u64::from(self.y) + u64::from(self.height)
    }

    /// Check if the pixel at `(x, y)` lies within.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && u64::from(x) < self.right() && y >= self.y && u64::from(y) < self.bottom()
    }

    /// Check if two rectangles share at least one pixel.
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && u64::from(self.x) < other.right()
            && u64::from(other.x) < self.right()
            && u64::from(self.y) < other.bottom()
            && u64::from(other.y) < self.bottom()
    }

    /// Check if `other` lies completely within this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

impl ImageLayout {
    /// Create a layout with an explicit row stride in bytes.
    pub fn with_stride(
        pixel: PixelLayout,
        width: u32,
        height: u32,
        stride: usize,
    ) -> Result<Self, LayoutError> {
        let row = Self::row_len(pixel, width)?;

        if stride < row {
            return Err(LayoutError::StrideTooSmall { stride, row });
        }

        if stride % pixel.kind().size() != 0 {
            return Err(LayoutError::UnalignedStride {
                stride,
                kind: pixel.kind(),
            });
        }

        let total = if width == 0 || height == 0 {
            0
        } else {
            // The last row need not be padded, a view may end right after its last pixel.
            (height as usize - 1)
                .checked_mul(stride)
                .and_then(|rows| rows.checked_add(row))
                .ok_or(LayoutError::OutOfMemory)?
        };

        Ok(ImageLayout {
            pixel,
            width,
            height,
            stride,
            total,
        })
    }

    /// Create a layout whose rows are padded to a multiple of `alignment` bytes.
    ///
    /// The stride is additionally rounded to the sample size so that the layout stays valid for
    /// samples larger than the alignment.
    pub fn with_row_alignment(
        pixel: PixelLayout,
        width: u32,
        height: u32,
        alignment: usize,
    ) -> Result<Self, LayoutError> {
        if alignment == 0 || !alignment.is_power_of_two() {
            return Err(LayoutError::BadAlignment(alignment));
        }

        let row = Self::row_len(pixel, width)?;
        let align = alignment.max(pixel.kind().size());
        let stride = row
            .checked_add(align - 1)
            .ok_or(LayoutError::OutOfMemory)?
            / align
            * align;

        Self::with_stride(pixel, width, height, stride)
    }

    /// Create a layout with the default row alignment of [`DEFAULT_ROW_ALIGNMENT`].
    pub fn new(pixel: PixelLayout, width: u32, height: u32) -> Result<Self, LayoutError> {
        Self::with_row_alignment(pixel, width, height, DEFAULT_ROW_ALIGNMENT)
    }

    /// Create a layout without any row padding.
    pub fn packed(pixel: PixelLayout, width: u32, height: u32) -> Result<Self, LayoutError> {
        let row = Self::row_len(pixel, width)?;
        Self::with_stride(pixel, width, height, row)
    }

    fn row_len(pixel: PixelLayout, width: u32) -> Result<usize, LayoutError> {
        (width as usize)
            .checked_mul(pixel.size())
            .ok_or(LayoutError::OutOfMemory)
    }

    pub fn pixel(&self) -> PixelLayout {
        self.pixel
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The bytes from one row to the next.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The bytes of pixel data in each row.
    pub fn row_bytes(&self) -> usize {
        // No overflow, validated on construction.
        self.width as usize * self.pixel.size()
    }

    /// The padding bytes skipped at the end of each row.
    pub fn row_padding(&self) -> usize {
        self.stride - self.row_bytes()
    }

    /// The number of samples in each row.
    pub fn row_samples(&self) -> usize {
        self.width as usize * usize::from(self.pixel.channels())
    }

    /// The number of bytes required to hold the image.
    pub fn byte_len(&self) -> usize {
        self.total
    }

    /// The full extent of the image.
    pub fn rect(&self) -> Rect {
        Rect::with_size(self.width, self.height)
    }

    /// Check if another layout has the same pixel interpretation and the same size.
    ///
    /// Strides are not compared, operands may be padded differently.
    pub fn matches(&self, other: &ImageLayout) -> bool {
        self.pixel == other.pixel && self.width == other.width && self.height == other.height
    }

    /// The byte range of a row's pixel data, relative to the first pixel.
    pub(crate) fn row_range(&self, row: u32) -> core::ops::Range<usize> {
        if self.row_bytes() == 0 {
            return 0..0;
        }

        let start = row as usize * self.stride;
        start..start + self.row_bytes()
    }

    /// The byte offset of a pixel, relative to the first pixel.
    pub(crate) fn pixel_offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.stride + x as usize * self.pixel.size()
    }

    /// The layout of a sub-rectangle, which keeps the stride.
    ///
    /// Returns the byte offset of the sub-rectangle's first pixel alongside its layout.
    pub fn sub_rect(&self, rect: Rect) -> Result<(usize, ImageLayout), LayoutError> {
        if !self.rect().contains_rect(&rect) {
            return Err(LayoutError::RectOutOfBounds {
                rect,
                width: self.width,
                height: self.height,
            });
        }

        let layout = ImageLayout::with_stride(self.pixel, rect.width, rect.height, self.stride)?;
        let offset = if layout.total == 0 {
            0
        } else {
            self.pixel_offset(rect.x, rect.y)
        };

        Ok((offset, layout))
    }

    /// The same layout restricted to fewer rows.
    pub(crate) fn with_height(&self, height: u32) -> ImageLayout {
        debug_assert!(height <= self.height);
        let total = if self.width == 0 || height == 0 {
            0
        } else {
            (height as usize - 1) * self.stride + self.row_bytes()
        };

        ImageLayout {
            height,
            total,
            ..*self
        }
    }
}
