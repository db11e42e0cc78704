//! Elementwise kernels over a single region.
//!
//! A kernel sees views that already start at the region's first pixel. It walks every row by the
//! stride of each view, so sources, destination and mask may all be padded differently or be
//! sub-rectangles of larger images. There is one generic body per operation family, the
//! registry instantiates it for each sample type.
use strided_texel::{ImageMut, ImageRef, Sample};

use crate::error::KernelError;

/// The views of one kernel invocation.
///
/// All views have the same width and height. `rhs` and `dst` (and `lhs` when present) have the
/// same pixel layout, the mask is a single channel of `u8`.
pub struct Operands<'a> {
    /// The left operand, or `None` to read it from the destination itself.
    pub lhs: Option<ImageRef<'a>>,
    pub rhs: ImageRef<'a>,
    /// A zero skips all channels of the pixel, which then keeps its prior value.
    pub mask: ImageRef<'a>,
    pub dst: ImageMut<'a>,
}

/// A kernel for one combination of operation and sample type.
pub type KernelFn = for<'a> fn(Operands<'a>) -> Result<(), KernelError>;

/// Arithmetic with the native semantics of a sample type.
///
/// Integers wrap on overflow and truncate on division. Floats follow IEEE 754.
pub trait Arithmetic: Sample {
    fn add(self, rhs: Self) -> Self;
    fn sub(self, rhs: Self) -> Self;
    fn mul(self, rhs: Self) -> Self;
    /// `None` if the quotient is undefined, which is only integer division by zero.
    fn div(self, rhs: Self) -> Option<Self>;
}

/// Operations on the bit pattern of integer samples.
pub trait Bitwise: Sample {
    fn and(self, rhs: Self) -> Self;
    fn or(self, rhs: Self) -> Self;
    fn xor(self, rhs: Self) -> Self;
}

macro_rules! integer_ops {
    ($($ty:ty),*) => {
        $(
            impl Arithmetic for $ty {
                #[inline]
                fn add(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }

                #[inline]
                fn sub(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }

                #[inline]
                fn mul(self, rhs: Self) -> Self {
                    self.wrapping_mul(rhs)
                }

                #[inline]
                fn div(self, rhs: Self) -> Option<Self> {
                    // `MIN / -1` wraps to `MIN`, unlike `checked_div`.
                    if rhs == 0 {
                        None
                    } else {
                        Some(self.wrapping_div(rhs))
                    }
                }
            }

            impl Bitwise for $ty {
                #[inline]
                fn and(self, rhs: Self) -> Self {
                    self & rhs
                }

                #[inline]
                fn or(self, rhs: Self) -> Self {
                    self | rhs
                }

                #[inline]
                fn xor(self, rhs: Self) -> Self {
                    self ^ rhs
                }
            }
        )*
    }
}

macro_rules! float_ops {
    ($($ty:ty),*) => {
        $(
            impl Arithmetic for $ty {
                #[inline]
                fn add(self, rhs: Self) -> Self {
                    self + rhs
                }

                #[inline]
                fn sub(self, rhs: Self) -> Self {
                    self - rhs
                }

                #[inline]
                fn mul(self, rhs: Self) -> Self {
                    self * rhs
                }

                #[inline]
                fn div(self, rhs: Self) -> Option<Self> {
                    Some(self / rhs)
                }
            }
        )*
    }
}

integer_ops!(u8, i16, i32);
float_ops!(f32, f64);

pub fn add<T: Arithmetic>(operands: Operands<'_>) -> Result<(), KernelError> {
    binary(operands, |a: T, b: T| Some(a.add(b)))
}

pub fn sub<T: Arithmetic>(operands: Operands<'_>) -> Result<(), KernelError> {
    binary(operands, |a: T, b: T| Some(a.sub(b)))
}

pub fn mul<T: Arithmetic>(operands: Operands<'_>) -> Result<(), KernelError> {
    binary(operands, |a: T, b: T| Some(a.mul(b)))
}

pub fn div<T: Arithmetic>(operands: Operands<'_>) -> Result<(), KernelError> {
    binary(operands, <T as Arithmetic>::div)
}

pub fn and<T: Bitwise>(operands: Operands<'_>) -> Result<(), KernelError> {
    binary(operands, |a: T, b: T| Some(a.and(b)))
}

pub fn or<T: Bitwise>(operands: Operands<'_>) -> Result<(), KernelError> {
    binary(operands, |a: T, b: T| Some(a.or(b)))
}

pub fn xor<T: Bitwise>(operands: Operands<'_>) -> Result<(), KernelError> {
    binary(operands, |a: T, b: T| Some(a.xor(b)))
}

/// The masked row loop shared by all operations.
///
/// # Panics
/// When the views differ in size.
fn binary<T: Sample>(
    operands: Operands<'_>,
    op: impl Fn(T, T) -> Option<T>,
) -> Result<(), KernelError> {
    let Operands {
        lhs,
        rhs,
        mask,
        dst,
    } = operands;

    let channels = usize::from(dst.pixel().channels());
    let lhs = lhs.map(|view| view.samples::<T>()).transpose()?;
    let rhs = rhs.samples::<T>()?;
    let mask = mask.samples::<u8>()?;
    let mut dst = dst.samples::<T>()?;

    for y in 0..dst.height() {
        let lhs_row = lhs.map(|lhs| lhs.row(y));
        let rhs_row = rhs.row(y);
        let mask_row = mask.row(y);
        let dst_row = dst.row_mut(y);

        let pixels = dst_row
            .chunks_exact_mut(channels)
            .zip(rhs_row.chunks_exact(channels))
            .zip(mask_row);

        for (x, ((dst_px, rhs_px), &keep)) in pixels.enumerate() {
            if keep == 0 {
                continue;
            }

            let lhs_px = lhs_row.map(|row| &row[x * channels..][..channels]);
            for (c, &b) in rhs_px.iter().enumerate() {
                let a = match lhs_px {
                    Some(px) => px[c],
                    None => dst_px[c],
                };

                dst_px[c] = op(a, b).ok_or(KernelError::DivisionByZero {
                    x: x as u32,
                    y,
                    channel: c as u8,
                })?;
            }
        }
    }

    Ok(())
}

/// Write the same pixel to every position the mask keeps, or to all of them without a mask.
///
/// `pixel` holds the bytes of exactly one pixel of the destination layout.
pub(crate) fn fill(
    mut dst: ImageMut<'_>,
    pixel: &[u8],
    mask: Option<ImageRef<'_>>,
) -> Result<(), KernelError> {
    let size = dst.pixel().size();
    debug_assert_eq!(pixel.len(), size);
    let mask = mask.map(|view| view.samples::<u8>()).transpose()?;

    for y in 0..dst.height() {
        let row = dst.row_mut(y).chunks_exact_mut(size);
        match mask {
            None => row.for_each(|px| px.copy_from_slice(pixel)),
            Some(mask) => {
                for (px, &keep) in row.zip(mask.row(y)) {
                    if keep != 0 {
                        px.copy_from_slice(pixel);
                    }
                }
            }
        }
    }

    Ok(())
}
