// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Defines the `Image` container, an owned buffer with a strided layout.
//!
//! The image is the owner of the bytes that views borrow. Operations are expected to work on the
//! views, the image only offers the allocation and some conveniences to get data in and out.
use alloc::vec::Vec;
use core::fmt;

use crate::buf::Buffer;
use crate::layout::{ImageLayout, LayoutError, PixelLayout, Rect};
use crate::stride::{ImageMut, ImageRef};
use crate::texel::Sample;

/// A container of allocated bytes with a strided pixel layout.
///
/// The buffer is aligned to the maximum alignment of any sample and always large enough for its
/// layout. Rows may be padded, see [`ImageLayout`].
///
/// ## Examples
///
/// ```
/// use strided_texel::{Image, PixelLayout, SampleKind};
///
/// let pixel = PixelLayout::new(SampleKind::F32, 3).unwrap();
/// let mut image = Image::new(pixel, 4, 4).unwrap();
/// image.fill(&[0.0f32, 0.5, 1.0]).unwrap();
///
/// assert_eq!(image.get::<f32>(3, 3), Some(&[0.0, 0.5, 1.0][..]));
/// ```
#[derive(Clone)]
pub struct Image {
    layout: ImageLayout,
    buffer: Buffer,
}

impl Image {
    /// Allocate a zeroed image of the default row alignment.
    ///
    /// # Panics
    /// When allocation of memory fails.
    pub fn new(pixel: PixelLayout, width: u32, height: u32) -> Result<Self, LayoutError> {
        Ok(Self::with_layout(ImageLayout::new(pixel, width, height)?))
    }

    /// Allocate a zeroed image with a specific layout.
    ///
    /// # Panics
    /// When allocation of memory fails.
    pub fn with_layout(layout: ImageLayout) -> Self {
        let buffer = Buffer::new(layout.byte_len());
        Image { layout, buffer }
    }

    /// Allocate an image where every pixel has the same value.
    ///
    /// The number of channels is the length of `value`.
    pub fn with_value<T: Sample>(width: u32, height: u32, value: &[T]) -> Result<Self, LayoutError> {
        let channels = u8::try_from(value.len()).map_err(|_| LayoutError::SampleCount {
            len: value.len(),
            required: usize::from(u8::MAX),
        })?;

        let pixel = PixelLayout::new(T::KIND, channels)?;
        let mut image = Image::new(pixel, width, height)?;
        image.fill(value)?;
        Ok(image)
    }

    /// Allocate an image from tightly packed, row-major samples.
    pub fn from_samples<T: Sample>(
        width: u32,
        height: u32,
        channels: u8,
        samples: &[T],
    ) -> Result<Self, LayoutError> {
        let pixel = PixelLayout::new(T::KIND, channels)?;
        let packed = ImageLayout::packed(pixel, width, height)?;

        let required = packed.byte_len() / T::KIND.size();
        if samples.len() != required {
            return Err(LayoutError::SampleCount {
                len: samples.len(),
                required,
            });
        }

        let source = ImageRef::with_bytes(packed, bytemuck::cast_slice(samples))?;
        Image::from_view(source, ImageLayout::new(pixel, width, height)?)
    }

    /// Copy a view into a newly allocated image of a compatible layout.
    pub fn from_view(view: ImageRef<'_>, layout: ImageLayout) -> Result<Self, LayoutError> {
        let mut image = Image::with_layout(layout);
        image.as_mut().copy_from(view)?;
        Ok(image)
    }

    pub fn layout(&self) -> &ImageLayout {
        &self.layout
    }

    pub fn pixel(&self) -> PixelLayout {
        self.layout.pixel()
    }

    pub fn width(&self) -> u32 {
        self.layout.width()
    }

    pub fn height(&self) -> u32 {
        self.layout.height()
    }

    pub fn stride(&self) -> usize {
        self.layout.stride()
    }

    /// The bytes described by the layout, including row padding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer.as_bytes()[..self.layout.byte_len()]
    }

    pub fn as_ref(&self) -> ImageRef<'_> {
        // Panics: the buffer was allocated for the layout and is maximally aligned.
        match ImageRef::with_bytes(self.layout, self.buffer.as_bytes()) {
            Ok(view) => view,
            Err(err) => unreachable!("image buffer does not fit its layout: {}", err),
        }
    }

    pub fn as_mut(&mut self) -> ImageMut<'_> {
        // Panics: the buffer was allocated for the layout and is maximally aligned.
        match ImageMut::with_bytes(self.layout, self.buffer.as_bytes_mut()) {
            Ok(view) => view,
            Err(err) => unreachable!("image buffer does not fit its layout: {}", err),
        }
    }

    /// A view of a rectangle within this image, sharing the memory.
    pub fn sub_rect(&self, rect: Rect) -> Result<ImageRef<'_>, LayoutError> {
        self.as_ref().sub_rect(rect)
    }

    /// A mutable view of a rectangle within this image, sharing the memory.
    pub fn sub_rect_mut(&mut self, rect: Rect) -> Result<ImageMut<'_>, LayoutError> {
        self.as_mut().into_sub_rect(rect)
    }

    /// A zeroed image with the same layout.
    pub fn copy_blank(&self) -> Self {
        Image::with_layout(self.layout)
    }

    /// A copy of this image without any row padding.
    pub fn to_packed(&self) -> Result<Self, LayoutError> {
        let layout = ImageLayout::packed(self.pixel(), self.width(), self.height())?;
        Image::from_view(self.as_ref(), layout)
    }

    /// Set every pixel to the same value, one sample per channel.
    pub fn fill<T: Sample>(&mut self, value: &[T]) -> Result<(), LayoutError> {
        self.as_mut().fill(value)
    }

    /// The samples of one pixel, if in bounds and of the right type.
    pub fn get<T: Sample>(&self, x: u32, y: u32) -> Option<&[T]> {
        if !self.layout.rect().contains(x, y) {
            return None;
        }

        let samples = self.as_ref().samples::<T>().ok()?;
        Some(samples.pixel(x, y))
    }

    /// The mutable samples of one pixel, if in bounds and of the right type.
    pub fn get_mut<T: Sample>(&mut self, x: u32, y: u32) -> Option<&mut [T]> {
        if !self.layout.rect().contains(x, y) || self.pixel().kind() != T::KIND {
            return None;
        }

        let start = self.layout.pixel_offset(x, y);
        let end = start + self.pixel().size();
        Some(bytemuck::cast_slice_mut(&mut self.buffer.as_bytes_mut()[start..end]))
    }

    /// Copy out all samples, tightly packed in row-major order.
    pub fn to_samples<T: Sample>(&self) -> Result<Vec<T>, LayoutError> {
        let samples = self.as_ref().samples::<T>()?;
        let mut out = Vec::with_capacity(self.layout.row_samples() * self.height() as usize);
        for y in 0..self.height() {
            out.extend_from_slice(samples.row(y));
        }

        Ok(out)
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("layout", &self.layout)
            .field("buffer", &self.buffer)
            .finish()
    }
}
