use strided_texel::{LayoutError, Rect, SampleKind};

use crate::op::MathOp;

pub type OpResult<T> = Result<T, OpError>;

/// The failure of one operation call.
///
/// Every error is terminal for the call. When a region fails the destination may have been
/// partially written and its contents are unspecified.
#[derive(Debug, thiserror::Error)]
pub enum OpError {
    #[error("math operation {op} can not be executed on an image of type {kind}")]
    UnsupportedOperationForType { op: MathOp, kind: SampleKind },

    #[error("mismatched operands: {0}")]
    MismatchedOperands(String),

    #[error("region {region:?} failed: {source}")]
    RegionExecution {
        region: Rect,
        #[source]
        source: KernelError,
    },

    #[error("thread pool error: {0}")]
    ThreadPool(String),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// An error raised by a kernel for the data of one region.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum KernelError {
    /// Integer division by zero. The position is relative to the views the kernel received.
    #[error("integer division by zero at pixel ({x}, {y}), channel {channel}")]
    DivisionByZero { x: u32, y: u32, channel: u8 },

    /// The views do not hold the samples the kernel was instantiated for.
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

impl OpError {
    pub fn mismatched(msg: impl Into<String>) -> Self {
        Self::MismatchedOperands(msg.into())
    }

    pub fn thread_pool(msg: impl Into<String>) -> Self {
        Self::ThreadPool(msg.into())
    }

    /// Wrap the error of a kernel that ran on `region`, moving its position into the coordinates
    /// of the whole destination.
    pub(crate) fn region(region: Rect, source: KernelError) -> Self {
        OpError::RegionExecution {
            region,
            source: source.offset(region.x, region.y),
        }
    }
}

impl KernelError {
    fn offset(self, dx: u32, dy: u32) -> Self {
        match self {
            KernelError::DivisionByZero { x, y, channel } => KernelError::DivisionByZero {
                x: x + dx,
                y: y + dy,
                channel,
            },
            other => other,
        }
    }
}
