// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
//! # Strided texel images
//!
//! Images of numeric samples with an arbitrary row stride.
//!
//! This library is strictly `no_std`, and offers the data model shared by image operations: a
//! closed set of sample kinds, a pixel layout of interleaved channels, a validated strided image
//! layout, and views that can be created from an owned [`Image`] or from foreign bytes. Views of
//! sub-rectangles are ordinary views that keep the stride of their parent, and mutable views can
//! be split into disjoint row bands to be written concurrently.
//!
//! ## Usage
//!
//! ```
//! use strided_texel::{Image, PixelLayout, Rect, SampleKind};
//!
//! let pixel = PixelLayout::new(SampleKind::U8, 3).unwrap();
//! let mut image = Image::new(pixel, 5, 2).unwrap();
//!
//! // Rows of five RGB pixels are padded to 16 bytes.
//! assert_eq!(image.stride(), 16);
//!
//! let mut corner = image.sub_rect_mut(Rect::new(3, 0, 2, 2)).unwrap();
//! corner.fill(&[0xffu8, 0x00, 0x00]).unwrap();
//!
//! assert_eq!(image.get::<u8>(4, 1), Some(&[0xff, 0x00, 0x00][..]));
//! assert_eq!(image.get::<u8>(2, 1), Some(&[0x00, 0x00, 0x00][..]));
//! ```
// Be std for doctests, avoids a weird warning about missing allocator.
#![cfg_attr(not(doctest), no_std)]
// The only module allowed to be `unsafe` is `texel`. We need it for the maximally aligned
// allocation unit, which must be `Pod`.
#![deny(unsafe_code)]
extern crate alloc;

mod buf;
mod image;
mod layout;
mod stride;
mod texel;

pub use self::buf::Buffer;
pub use self::image::Image;
pub use self::layout::{ImageLayout, LayoutError, PixelLayout, Rect, DEFAULT_ROW_ALIGNMENT};
pub use self::stride::{ImageMut, ImageRef, SamplesMut, SamplesRef};
pub use self::texel::{Sample, SampleKind};
