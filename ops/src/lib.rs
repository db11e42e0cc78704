//! Masked elementwise operations over strided images.
//!
//! Combines two images of the same layout pixel by pixel, with arithmetic (`add`, `sub`, `mul`,
//! `div`) on all sample kinds and bitwise operations (`and`, `or`, `xor`) on integer samples. Any
//! operand may be a padded buffer or a sub-rectangle of a larger image. An optional single channel
//! `u8` mask selects the pixels to compute, skipped pixels keep their value.
//!
//! Large images are cut into bands of rows that are processed in parallel on a `rayon` pool.
//!
//! # Usage
//!
//! ```
//! use strided_ops::MathOp;
//! use strided_texel::{Image, Rect};
//!
//! let a = Image::with_value(4, 4, &[200u8, 10, 0])?;
//! let b = Image::with_value(4, 4, &[100u8, 20, 0])?;
//!
//! // Only the upper left pixel is computed.
//! let mut mask = Image::with_value(4, 4, &[0u8])?;
//! mask.sub_rect_mut(Rect::new(0, 0, 1, 1))?.fill(&[255u8])?;
//!
//! let sum = strided_ops::apply(MathOp::Add, &a, &b, Some(&mask))?;
//! // Samples wrap around.
//! assert_eq!(sum.get::<u8>(0, 0), Some(&[44, 30, 0][..]));
//! assert_eq!(sum.get::<u8>(1, 0), Some(&[0, 0, 0][..]));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![deny(unsafe_code)]

mod engine;
mod error;
pub mod kernel;
mod op;
mod options;
mod patch;
mod registry;
mod scalar;

pub use self::engine::Engine;
pub use self::error::{KernelError, OpError, OpResult};
pub use self::kernel::{KernelFn, Operands};
pub use self::op::MathOp;
pub use self::options::ParallelOptions;
pub use self::patch::partition;
pub use self::registry::KernelRegistry;
pub use self::scalar::Scalar;

use strided_texel::Image;

/// Combine two images into a new one, see [`Engine::apply`].
pub fn apply(op: MathOp, lhs: &Image, rhs: &Image, mask: Option<&Image>) -> OpResult<Image> {
    Engine::default().apply(op, lhs, rhs, mask)
}

/// Combine `rhs` into `lhs`, see [`Engine::apply_in_place`].
pub fn apply_in_place<'i>(
    op: MathOp,
    lhs: &'i mut Image,
    rhs: &Image,
    mask: Option<&Image>,
) -> OpResult<&'i mut Image> {
    Engine::default().apply_in_place(op, lhs, rhs, mask)
}

/// Combine an image with a constant, see [`Engine::apply_scalar`].
pub fn apply_scalar(
    op: MathOp,
    lhs: &Image,
    value: impl Into<Scalar>,
    mask: Option<&Image>,
) -> OpResult<Image> {
    Engine::default().apply_scalar(op, lhs, value, mask)
}

macro_rules! shorthand {
    ($($name:ident => $op:ident),*) => {
        $(
            #[doc = concat!("The `", stringify!($name), "` of two images, without a mask.")]
            pub fn $name(lhs: &Image, rhs: &Image) -> OpResult<Image> {
                apply(MathOp::$op, lhs, rhs, None)
            }
        )*
    }
}

shorthand! {
    add => Add,
    sub => Sub,
    mul => Mul,
    div => Div,
    and => And,
    or => Or,
    xor => Xor
}
