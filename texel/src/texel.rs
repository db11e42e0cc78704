// Distributed under The MIT License (MIT)
//
// Copyright (c) 2019, 2020 The `image-rs` developers
#![allow(unsafe_code)]

use core::fmt;

/// The numeric type of a single channel value.
///
/// This is the runtime tag of the element type stored in an image. Every pixel consists of some
/// number of channels, all of which share this kind. The set of kinds is closed: operations
/// dispatch on it through tables sized by [`SampleKind::COUNT`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SampleKind {
    U8,
    I16,
    I32,
    F32,
    F64,
}

/// Describes a primitive that can be stored as the channel value of an image.
///
/// The trait is sealed: exactly the five primitives named by [`SampleKind`] implement it. All of
/// them are plain old data, so rows of image bytes can be reinterpreted as slices of samples with
/// `bytemuck` once the alignment invariants of the layout hold.
pub trait Sample:
    bytemuck::Pod + PartialEq + fmt::Debug + Send + Sync + sealed::Sealed + 'static
{
    /// The runtime tag of this type.
    const KIND: SampleKind;

    /// Convert a broadcast value into this sample type.
    ///
    /// Uses the semantics of an `as` cast, i.e. integers saturate and NaN becomes zero.
    fn from_f64(value: f64) -> Self;
}

mod sealed {
    pub trait Sealed {}
}

macro_rules! def_max_align {
    (
        $($($arch:literal),* = $num:literal),*
    ) => {
        $(
            /// A byte-like-type that is aligned to the required max alignment.
            ///
            /// This type does not contain padding and implements `Pod`. Generally, the alignment and size
            /// requirement is kept small to avoid overhead.
            #[derive(Clone, Copy)]
            #[cfg(
                any($(target_arch = $arch),*),
            )]
            #[repr(align($num))]
            #[repr(C)]
            pub struct MaxAligned(pub(crate) [u8; $num]);

            #[cfg(
                any($(target_arch = $arch),*),
            )]
            pub(crate) const MAX_ALIGN: usize = $num;
        )*


        #[cfg(
            not(any(
                $(any($(target_arch = $arch),*)),*
            )),
        )]
        #[derive(Clone, Copy)]
        #[repr(align(8))]
        #[repr(C)]
        pub struct MaxAligned(pub(crate) [u8; 8]);

        #[cfg(
            not(any(
                $(any($(target_arch = $arch),*)),*
            )),
        )]
        pub(crate) const MAX_ALIGN: usize = 8;
    }
}

def_max_align! {
    "x86", "x86_64" = 32,
    "arm" = 16,
    "aarch64" = 16,
    "wasm32" = 16
}

// SAFETY: a byte array with an alignment equal to its size has no padding and no invariants.
unsafe impl bytemuck::Zeroable for MaxAligned {}
unsafe impl bytemuck::Pod for MaxAligned {}

impl MaxAligned {
    pub(crate) const ZERO: Self = MaxAligned([0; MAX_ALIGN]);
}

macro_rules! builtin_sample {
    ($(($kind:ident, $type:ty)),*) => {
        $(
            impl sealed::Sealed for $type {}

            impl Sample for $type {
                const KIND: SampleKind = {
                    // Every sample must fit the buffer alignment, otherwise row casts can fail.
                    assert!(core::mem::align_of::<$type>() <= MAX_ALIGN);
                    SampleKind::$kind
                };

                #[inline]
                fn from_f64(value: f64) -> Self {
                    value as $type
                }
            }
        )*
    }
}

builtin_sample!((U8, u8), (I16, i16), (I32, i32), (F32, f32), (F64, f64));

impl SampleKind {
    /// The number of distinct sample kinds.
    pub const COUNT: usize = 5;

    /// All kinds, in the order of [`SampleKind::index`].
    pub const ALL: [SampleKind; Self::COUNT] = [
        SampleKind::U8,
        SampleKind::I16,
        SampleKind::I32,
        SampleKind::F32,
        SampleKind::F64,
    ];

    /// The number of bytes of one sample.
    pub const fn size(self) -> usize {
        match self {
            SampleKind::U8 => 1,
            SampleKind::I16 => 2,
            SampleKind::I32 | SampleKind::F32 => 4,
            SampleKind::F64 => 8,
        }
    }

    /// The required alignment of one sample.
    ///
    /// For all supported kinds this equals the size, which lets a layout only check strides for
    /// being a multiple of the sample size.
    pub const fn align(self) -> usize {
        match self {
            SampleKind::U8 => core::mem::align_of::<u8>(),
            SampleKind::I16 => core::mem::align_of::<i16>(),
            SampleKind::I32 => core::mem::align_of::<i32>(),
            SampleKind::F32 => core::mem::align_of::<f32>(),
            SampleKind::F64 => core::mem::align_of::<f64>(),
        }
    }

    /// A dense index in `0..COUNT`, for table lookups.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// True for the kinds with integer bit patterns.
    pub const fn is_integer(self) -> bool {
        matches!(self, SampleKind::U8 | SampleKind::I16 | SampleKind::I32)
    }

    /// The name of the corresponding Rust primitive.
    pub const fn name(self) -> &'static str {
        match self {
            SampleKind::U8 => "u8",
            SampleKind::I16 => "i16",
            SampleKind::I32 => "i32",
            SampleKind::F32 => "f32",
            SampleKind::F64 => "f64",
        }
    }
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
