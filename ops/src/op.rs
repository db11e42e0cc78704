use core::fmt;

use strided_texel::SampleKind;

/// An elementwise operation between two operands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MathOp {
    And,
    Or,
    Xor,
    Add,
    Sub,
    Mul,
    Div,
}

impl MathOp {
    /// The number of distinct operations.
    pub const COUNT: usize = 7;

    /// All operations, in the order of [`MathOp::index`].
    pub const ALL: [MathOp; Self::COUNT] = [
        MathOp::And,
        MathOp::Or,
        MathOp::Xor,
        MathOp::Add,
        MathOp::Sub,
        MathOp::Mul,
        MathOp::Div,
    ];

    /// A dense index in `0..COUNT`, for table lookups.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// True for operations on the bit pattern of samples.
    pub const fn is_bitwise(self) -> bool {
        matches!(self, MathOp::And | MathOp::Or | MathOp::Xor)
    }

    /// Whether the built-in kernels define this operation for a sample kind.
    ///
    /// Arithmetic is defined for every kind, bitwise operations only for integers. Floating point
    /// samples have no meaningful bitwise operation.
    pub const fn is_defined_for(self, kind: SampleKind) -> bool {
        !self.is_bitwise() || kind.is_integer()
    }

    pub const fn name(self) -> &'static str {
        match self {
            MathOp::And => "and",
            MathOp::Or => "or",
            MathOp::Xor => "xor",
            MathOp::Add => "add",
            MathOp::Sub => "sub",
            MathOp::Mul => "mul",
            MathOp::Div => "div",
        }
    }
}

impl fmt::Display for MathOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_dense() {
        for (idx, op) in MathOp::ALL.into_iter().enumerate() {
            assert_eq!(op.index(), idx);
        }

        assert!(MathOp::Div.is_defined_for(SampleKind::F64));
        assert!(MathOp::Xor.is_defined_for(SampleKind::I16));
        assert!(!MathOp::Xor.is_defined_for(SampleKind::F32));
    }
}
