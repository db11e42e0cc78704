// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019 The `image-rs` developers
use core::mem;

use alloc::vec::Vec;

use crate::texel::{MaxAligned, MAX_ALIGN};

/// Allocates and manages raw bytes.
///
/// Provides a utility to allocate a slice of bytes aligned to the maximally required alignment.
/// Since the elements are much larger than single bytes the inner storage will **not** have exact
/// sizes as one would be used from by using a `Vec` as an allocator. Keeping track of the exact,
/// wanted logical length of the requested byte slice is the obligation of the user. The image
/// container does this with its layout.
///
/// The start of the bytes is always aligned to [`Buffer::ALIGNMENT`], which is at least the
/// alignment of every sample type. Any row whose byte offset is a multiple of the sample size can
/// therefore be reinterpreted as a slice of samples.
#[derive(Clone, Default)]
pub struct Buffer {
    /// The backing memory.
    inner: Vec<MaxAligned>,
}

impl Buffer {
    /// The guaranteed alignment of [`Buffer::as_bytes`].
    pub const ALIGNMENT: usize = MAX_ALIGN;

    /// Allocate a new, zeroed buffer with a number of bytes.
    ///
    /// # Panics
    /// When allocation of memory fails.
    pub fn new(length: usize) -> Self {
        let alloc_len = Self::alloc_len(length);
        let inner = alloc::vec![MaxAligned::ZERO; alloc_len];

        Buffer { inner }
    }

    /// Retrieve the byte capacity of the allocated storage.
    pub fn capacity(&self) -> usize {
        self.inner.len() * mem::size_of::<MaxAligned>()
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.inner.as_slice())
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(self.inner.as_mut_slice())
    }

    /// Calculates the number of elements to have a byte buffer of requested length.
    fn alloc_len(length: usize) -> usize {
        const CHUNK_SIZE: usize = mem::size_of::<MaxAligned>();
        assert!(CHUNK_SIZE > 1);

        // We allocated enough chunks for at least the length. This can never overflow.
        length / CHUNK_SIZE + usize::from(length % CHUNK_SIZE != 0)
    }
}

impl core::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Buffer")
            .field("capacity", &self.capacity())
            .finish()
    }
}
