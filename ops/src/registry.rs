use core::fmt;
use std::sync::OnceLock;

use strided_texel::{Sample, SampleKind};

use crate::error::{OpError, OpResult};
use crate::kernel::{self, KernelFn};
use crate::op::MathOp;

/// A table of kernels, indexed by operation and sample kind.
///
/// The built-in table is created once and then only read, so it is shared freely between threads.
/// Custom tables can restrict or replace entries before being handed to an
/// [`Engine`](crate::Engine).
#[derive(Clone)]
pub struct KernelRegistry {
    table: [[Option<KernelFn>; SampleKind::COUNT]; MathOp::COUNT],
}

static GLOBAL: OnceLock<KernelRegistry> = OnceLock::new();

impl KernelRegistry {
    /// A table without any kernel.
    pub const fn empty() -> Self {
        KernelRegistry {
            table: [[None; SampleKind::COUNT]; MathOp::COUNT],
        }
    }

    /// The table of all built-in kernels.
    ///
    /// Arithmetic for every sample kind, bitwise operations for the integer kinds.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();

        macro_rules! arithmetic {
            ($($ty:ty),*) => {
                $(
                    registry.register(MathOp::Add, <$ty as Sample>::KIND, kernel::add::<$ty>);
                    registry.register(MathOp::Sub, <$ty as Sample>::KIND, kernel::sub::<$ty>);
                    registry.register(MathOp::Mul, <$ty as Sample>::KIND, kernel::mul::<$ty>);
                    registry.register(MathOp::Div, <$ty as Sample>::KIND, kernel::div::<$ty>);
                )*
            }
        }

        macro_rules! bitwise {
            ($($ty:ty),*) => {
                $(
                    registry.register(MathOp::And, <$ty as Sample>::KIND, kernel::and::<$ty>);
                    registry.register(MathOp::Or, <$ty as Sample>::KIND, kernel::or::<$ty>);
                    registry.register(MathOp::Xor, <$ty as Sample>::KIND, kernel::xor::<$ty>);
                )*
            }
        }

        arithmetic!(u8, i16, i32, f32, f64);
        bitwise!(u8, i16, i32);

        registry
    }

    /// The process-wide built-in table, initialized on first use.
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(|| {
            let registry = Self::builtin();
            tracing::trace!(kernels = registry.len(), "built kernel registry");
            registry
        })
    }

    /// Set the kernel of an entry, returning the kernel it replaces.
    ///
    /// The kernel must be instantiated for the sample type of `kind`. A mismatch is reported by
    /// the kernel when it runs.
    pub fn register(&mut self, op: MathOp, kind: SampleKind, kernel: KernelFn) -> Option<KernelFn> {
        self.table[op.index()][kind.index()].replace(kernel)
    }

    /// Remove the kernel of an entry.
    pub fn unregister(&mut self, op: MathOp, kind: SampleKind) -> Option<KernelFn> {
        self.table[op.index()][kind.index()].take()
    }

    /// Find the kernel for an operation on samples of a kind.
    pub fn resolve(&self, op: MathOp, kind: SampleKind) -> OpResult<KernelFn> {
        self.table[op.index()][kind.index()]
            .ok_or(OpError::UnsupportedOperationForType { op, kind })
    }

    pub fn supports(&self, op: MathOp, kind: SampleKind) -> bool {
        self.table[op.index()][kind.index()].is_some()
    }

    /// The number of registered kernels.
    pub fn len(&self) -> usize {
        self.keys().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All pairs with a registered kernel, ordered by operation and then by kind.
    pub fn keys(&self) -> impl Iterator<Item = (MathOp, SampleKind)> + '_ {
        MathOp::ALL.into_iter().flat_map(move |op| {
            SampleKind::ALL
                .into_iter()
                .filter(move |&kind| self.supports(op, kind))
                .map(move |kind| (op, kind))
        })
    }
}

impl Default for KernelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for KernelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}
