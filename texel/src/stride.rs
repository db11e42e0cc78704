// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! Byte-based, strided views of an image.
//!
//! This is the most general, uniform source of pixel data. The views do not need to rely on the
//! owning container and can be constructed from (suitably aligned) byte data, which makes it
//! possible to operate on memory provided by another library. A view always starts at its first
//! pixel and advances by its stride from one row to the next, so a sub-rectangle of a larger
//! image is a view like any other.
use core::marker::PhantomData;

use crate::layout::{ImageLayout, LayoutError, PixelLayout, Rect};
use crate::texel::Sample;

/// A reference to the bytes of a strided image.
///
/// Cheap to copy; many references to the same memory may exist at once.
#[derive(Clone, Copy)]
pub struct ImageRef<'data> {
    layout: ImageLayout,
    data: &'data [u8],
}

/// A reference to mutable bytes of a strided image.
///
/// This can be constructed from a mutably borrowed [`Image`](crate::Image), or directly from a
/// mutable reference to raw bytes. It can be split into disjoint row bands which can then be
/// written from different threads.
///
/// # Usage
///
/// Here is an example of filling the middle of an image with a constant value.
///
/// ```
/// use strided_texel::{Image, PixelLayout, Rect, SampleKind};
///
/// let pixel = PixelLayout::gray(SampleKind::U8);
/// let mut image = Image::new(pixel, 4, 4).unwrap();
///
/// let mut view = image.as_mut();
/// let mut center = view.sub_rect_mut(Rect::new(1, 1, 2, 2)).unwrap();
/// center.fill(&[7u8]).unwrap();
///
/// assert_eq!(image.get::<u8>(1, 1), Some(&[7u8][..]));
/// assert_eq!(image.get::<u8>(0, 0), Some(&[0u8][..]));
/// ```
pub struct ImageMut<'data> {
    layout: ImageLayout,
    data: &'data mut [u8],
}

/// A view whose rows are typed samples.
#[derive(Clone, Copy)]
pub struct SamplesRef<'data, T> {
    inner: ImageRef<'data>,
    sample: PhantomData<&'data [T]>,
}

/// A mutable view whose rows are typed samples.
pub struct SamplesMut<'data, T> {
    inner: ImageMut<'data>,
    sample: PhantomData<&'data mut [T]>,
}

fn check_bytes(layout: &ImageLayout, data: &[u8]) -> Result<(), LayoutError> {
    let required = layout.byte_len();
    if data.len() < required {
        return Err(LayoutError::BufferTooSmall {
            len: data.len(),
            required,
        });
    }

    // An empty view never reads a sample.
    let kind = layout.pixel().kind();
    if required > 0 && data.as_ptr() as usize % kind.align() != 0 {
        return Err(LayoutError::UnalignedBuffer(kind));
    }

    Ok(())
}

fn check_sample<T: Sample>(layout: &ImageLayout) -> Result<(), LayoutError> {
    let actual = layout.pixel().kind();
    if actual != T::KIND {
        return Err(LayoutError::SampleMismatch {
            actual,
            requested: T::KIND,
        });
    }

    Ok(())
}

impl<'data> ImageRef<'data> {
    /// View bytes under a certain strided layout.
    ///
    /// Unlike an owned image, the data need only be aligned to the sample kind mentioned in the
    /// layout and not to the maximum alignment. The first byte is the first pixel.
    pub fn with_bytes(layout: ImageLayout, data: &'data [u8]) -> Result<Self, LayoutError> {
        check_bytes(&layout, data)?;
        let data = &data[..layout.byte_len()];
        Ok(ImageRef { layout, data })
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

    /// All bytes of the view, including the padding between rows.
    pub fn as_bytes(&self) -> &'data [u8] {
        self.data
    }

    /// The pixel bytes of one row, without padding.
    ///
    /// # Panics
    /// When the row is out of bounds.
    pub fn row(&self, y: u32) -> &'data [u8] {
        assert!(y < self.height(), "row {} out of bounds", y);
        &self.data[self.layout.row_range(y)]
    }

    /// A view of a rectangle within this view, sharing the memory.
    pub fn sub_rect(&self, rect: Rect) -> Result<ImageRef<'data>, LayoutError> {
        let (offset, layout) = self.layout.sub_rect(rect)?;
        let data = &self.data[offset..offset + layout.byte_len()];
        Ok(ImageRef { layout, data })
    }

    /// Interpret the rows as samples of type `T`.
    pub fn samples<T: Sample>(self) -> Result<SamplesRef<'data, T>, LayoutError> {
        check_sample::<T>(&self.layout)?;
        Ok(SamplesRef {
            inner: self,
            sample: PhantomData,
        })
    }
}

impl<'data> ImageMut<'data> {
    /// View bytes mutably under a certain strided layout.
    ///
    /// Unlike an owned image, the data need only be aligned to the sample kind mentioned in the
    /// layout and not to the maximum alignment. The first byte is the first pixel.
    pub fn with_bytes(layout: ImageLayout, data: &'data mut [u8]) -> Result<Self, LayoutError> {
        check_bytes(&layout, data)?;
        let data = &mut data[..layout.byte_len()];
        Ok(ImageMut { layout, data })
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

    /// Borrow this as a reference to an immutable view.
    pub fn as_ref(&self) -> ImageRef<'_> {
        ImageRef {
            layout: self.layout,
            data: &*self.data,
        }
    }

    /// Convert this into a reference to an immutable view.
    pub fn into_ref(self) -> ImageRef<'data> {
        ImageRef {
            layout: self.layout,
            data: self.data,
        }
    }

    /// Reborrow for a shorter lifetime, to pass the view on without giving it up.
    pub fn reborrow(&mut self) -> ImageMut<'_> {
        ImageMut {
            layout: self.layout,
            data: &mut *self.data,
        }
    }

    /// The pixel bytes of one row, without padding.
    ///
    /// # Panics
    /// When the row is out of bounds.
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(y < self.height(), "row {} out of bounds", y);
        &mut self.data[self.layout.row_range(y)]
    }

    /// A mutable view of a rectangle within this view.
    pub fn sub_rect_mut(&mut self, rect: Rect) -> Result<ImageMut<'_>, LayoutError> {
        self.reborrow().into_sub_rect(rect)
    }

    /// Convert into a view of a rectangle within this view.
    pub fn into_sub_rect(self, rect: Rect) -> Result<ImageMut<'data>, LayoutError> {
        let (offset, layout) = self.layout.sub_rect(rect)?;
        let data = &mut self.data[offset..offset + layout.byte_len()];
        Ok(ImageMut { layout, data })
    }

    /// Split into the rows `0..y` and the rows `y..height`.
    ///
    /// The two views do not overlap, not even in their padding bytes, and can be used
    /// independently. A `y` past the end is clamped to the height.
    pub fn split_at_row(self, y: u32) -> (ImageMut<'data>, ImageMut<'data>) {
        let y = y.min(self.height());
        // The last row may be shorter than the stride, in which case the head takes all bytes.
        let split = (y as usize * self.layout.stride()).min(self.data.len());
        let (head, tail) = self.data.split_at_mut(split);

        let head = ImageMut {
            layout: self.layout.with_height(y),
            data: head,
        };

        let tail = ImageMut {
            layout: self.layout.with_height(self.layout.height() - y),
            data: tail,
        };

        (head, tail)
    }

    /// Copy the pixels from another view.
    ///
    /// The source must have the same pixel layout, width and height. Bytes between rows are left
    /// untouched, they may belong to pixels outside of a sub-rectangle.
    pub fn copy_from(&mut self, source: ImageRef<'_>) -> Result<(), LayoutError> {
        if !self.layout.matches(source.layout()) {
            return Err(LayoutError::Mismatch {
                expected: self.pixel(),
                actual: source.pixel(),
            });
        }

        if self.layout.row_padding() == 0 && source.layout().row_padding() == 0 {
            // Both contiguous, copy everything at once.
            let len = self.layout.byte_len();
            self.data[..len].copy_from_slice(&source.data[..len]);
            return Ok(());
        }

        for y in 0..self.height() {
            self.row_mut(y).copy_from_slice(source.row(y));
        }

        Ok(())
    }

    /// Set every pixel to the same value, given as its samples.
    ///
    /// `value` must have exactly one sample per channel.
    pub fn fill<T: Sample>(&mut self, value: &[T]) -> Result<(), LayoutError> {
        let mut samples = self.reborrow().samples::<T>()?;
        let channels = usize::from(samples.channels());
        if value.len() != channels {
            return Err(LayoutError::SampleCount {
                len: value.len(),
                required: channels,
            });
        }

        for y in 0..samples.height() {
            for pixel in samples.row_mut(y).chunks_exact_mut(channels) {
                pixel.copy_from_slice(value);
            }
        }

        Ok(())
    }

    /// Interpret the rows as samples of type `T`.
    pub fn samples<T: Sample>(self) -> Result<SamplesMut<'data, T>, LayoutError> {
        check_sample::<T>(&self.layout)?;
        Ok(SamplesMut {
            inner: self,
            sample: PhantomData,
        })
    }
}

impl<'data, T: Sample> SamplesRef<'data, T> {
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    pub fn channels(&self) -> u8 {
        self.inner.pixel().channels()
    }

    /// The samples of one row, `width * channels` of them.
    pub fn row(&self, y: u32) -> &'data [T] {
        // Panics: the layout guarantees sample aligned row starts and whole samples per row.
        bytemuck::cast_slice(self.inner.row(y))
    }

    /// The samples of one pixel.
    pub fn pixel(&self, x: u32, y: u32) -> &'data [T] {
        let channels = usize::from(self.channels());
        let start = x as usize * channels;
        &self.row(y)[start..start + channels]
    }

    pub fn as_bytes(&self) -> ImageRef<'data> {
        self.inner
    }
}

impl<'data, T: Sample> SamplesMut<'data, T> {
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    pub fn channels(&self) -> u8 {
        self.inner.pixel().channels()
    }

    /// The samples of one row, `width * channels` of them.
    pub fn row_mut(&mut self, y: u32) -> &mut [T] {
        // Panics: the layout guarantees sample aligned row starts and whole samples per row.
        bytemuck::cast_slice_mut(self.inner.row_mut(y))
    }

    pub fn into_bytes(self) -> ImageMut<'data> {
        self.inner
    }
}

impl core::fmt::Debug for ImageRef<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ImageRef")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl core::fmt::Debug for ImageMut<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ImageMut")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texel::SampleKind;

    fn gray_u8(width: u32, height: u32, stride: usize) -> ImageLayout {
        ImageLayout::with_stride(PixelLayout::gray(SampleKind::U8), width, height, stride).unwrap()
    }

    #[test]
    fn rows_skip_padding() {
        let layout = gray_u8(2, 3, 4);
        let data = [0u8, 1, 0xff, 0xff, 2, 3, 0xff, 0xff, 4, 5];
        let view = ImageRef::with_bytes(layout, &data).unwrap();

        assert_eq!(view.row(0), &[0, 1]);
        assert_eq!(view.row(1), &[2, 3]);
        assert_eq!(view.row(2), &[4, 5]);
    }

    #[test]
    fn short_buffer_rejected() {
        let layout = gray_u8(2, 3, 4);
        assert!(matches!(
            ImageRef::with_bytes(layout, &[0u8; 9]),
            Err(LayoutError::BufferTooSmall { len: 9, required: 10 })
        ));
    }

    #[test]
    fn unaligned_buffer_rejected() {
        let layout =
            ImageLayout::packed(PixelLayout::gray(SampleKind::I32), 2, 1).unwrap();
        let storage = [0u32; 4];
        let bytes: &[u8] = bytemuck::cast_slice(&storage);
        assert!(ImageRef::with_bytes(layout, &bytes[..8]).is_ok());
        assert_eq!(
            ImageRef::with_bytes(layout, &bytes[1..9]).unwrap_err(),
            LayoutError::UnalignedBuffer(SampleKind::I32)
        );
    }

    #[test]
    fn empty_foreign_buffer_accepted() {
        let layout = ImageLayout::packed(PixelLayout::gray(SampleKind::I32), 0, 3).unwrap();
        let mut data: [u8; 0] = [];
        let view = ImageMut::with_bytes(layout, &mut data).unwrap();
        assert_eq!(view.height(), 3);
        assert!(view.into_ref().as_bytes().is_empty());
    }

    #[test]
    fn fill_needs_one_value_per_channel() {
        let layout = ImageLayout::packed(PixelLayout::new(SampleKind::U8, 3).unwrap(), 2, 1).unwrap();
        let mut data = [0u8; 6];
        let mut view = ImageMut::with_bytes(layout, &mut data).unwrap();

        assert_eq!(
            view.fill(&[1u8, 2]),
            Err(LayoutError::SampleCount { len: 2, required: 3 })
        );
        view.fill(&[1u8, 2, 3]).unwrap();
        assert_eq!(data, [1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn typed_views_give_back_bytes() {
        let layout = gray_u8(2, 2, 3);
        let mut data = [0u8; 5];
        let view = ImageMut::with_bytes(layout, &mut data).unwrap();

        let mut samples = view.samples::<u8>().unwrap();
        samples.row_mut(1).copy_from_slice(&[7, 8]);
        let view = samples.into_bytes().into_ref();

        let samples = view.samples::<u8>().unwrap();
        assert_eq!(samples.as_bytes().layout(), &layout);
        assert_eq!(samples.as_bytes().row(1), &[7, 8]);
    }

    #[test]
    fn split_rows_are_disjoint() {
        let layout = gray_u8(2, 4, 3);
        let mut data = [0u8; 11];
        let view = ImageMut::with_bytes(layout, &mut data).unwrap();

        let (mut head, mut tail) = view.split_at_row(1);
        assert_eq!(head.height(), 1);
        assert_eq!(tail.height(), 3);
        head.fill(&[1u8]).unwrap();
        tail.fill(&[2u8]).unwrap();

        assert_eq!(data, [1, 1, 0, 2, 2, 0, 2, 2, 0, 2, 2]);
    }

    #[test]
    fn split_past_end_is_clamped() {
        let layout = gray_u8(2, 2, 4);
        let mut data = [0u8; 6];
        let view = ImageMut::with_bytes(layout, &mut data).unwrap();

        let (head, tail) = view.split_at_row(5);
        assert_eq!(head.height(), 2);
        assert_eq!(tail.height(), 0);
        assert_eq!(tail.layout().byte_len(), 0);
    }

    #[test]
    fn typed_rows() {
        let layout = ImageLayout::packed(
            PixelLayout::new(SampleKind::I16, 2).unwrap(),
            2,
            2,
        )
        .unwrap();
        let storage = [1i16, 2, 3, 4, 5, 6, 7, 8];
        let view = ImageRef::with_bytes(layout, bytemuck::cast_slice(&storage)).unwrap();

        let samples = view.samples::<i16>().unwrap();
        assert_eq!(samples.row(1), &[5, 6, 7, 8]);
        assert_eq!(samples.pixel(1, 0), &[3, 4]);
        assert!(matches!(
            view.samples::<f32>(),
            Err(LayoutError::SampleMismatch { .. })
        ));
    }

    #[test]
    fn copy_between_strides() {
        let source = [1u8, 2, 3, 4];
        let source = ImageRef::with_bytes(gray_u8(2, 2, 2), &source).unwrap();

        let mut target = [9u8; 8];
        let mut view = ImageMut::with_bytes(gray_u8(2, 2, 4), &mut target).unwrap();
        view.copy_from(source).unwrap();

        assert_eq!(target, [1, 2, 9, 9, 3, 4, 9, 9]);
    }
}
