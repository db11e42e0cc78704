use rayon::ThreadPool;
use strided_texel::{Image, ImageLayout, ImageMut, ImageRef, PixelLayout, Rect};

use crate::error::{OpError, OpResult};
use crate::kernel::{self, Operands};
use crate::op::MathOp;
use crate::options::ParallelOptions;
use crate::patch::{self, Executor};
use crate::registry::KernelRegistry;
use crate::scalar::Scalar;

/// Runs elementwise operations.
///
/// Each call validates its operands before any pixel is written, resolves the kernel for the
/// operation and sample kind, and then runs the kernel over the regions of the destination. The
/// call returns once all regions are done. There is no state carried between calls.
///
/// # Usage
///
/// ```
/// use strided_ops::{Engine, MathOp, ParallelOptions};
/// use strided_texel::Image;
///
/// let engine = Engine::new(ParallelOptions::default().with_threads(2))?;
///
/// let a = Image::with_value(64, 64, &[1.5f32, 2.0])?;
/// let b = Image::with_value(64, 64, &[0.5f32, 2.0])?;
/// let sum = engine.apply(MathOp::Add, &a, &b, None)?;
///
/// assert_eq!(sum.get::<f32>(63, 63), Some(&[2.0, 4.0][..]));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct Engine<'r> {
    registry: &'r KernelRegistry,
    options: ParallelOptions,
    pool: Option<ThreadPool>,
}

impl Engine<'static> {
    /// An engine with the built-in kernels.
    ///
    /// Builds a dedicated thread pool if the options ask for a number of threads.
    pub fn new(options: ParallelOptions) -> OpResult<Self> {
        Self::with_registry(KernelRegistry::global(), options)
    }
}

impl Default for Engine<'static> {
    fn default() -> Self {
        Engine {
            registry: KernelRegistry::global(),
            options: ParallelOptions::default(),
            pool: None,
        }
    }
}

impl<'r> Engine<'r> {
    /// An engine that looks up kernels in a custom table.
    pub fn with_registry(registry: &'r KernelRegistry, options: ParallelOptions) -> OpResult<Self> {
        let pool = match options.threads {
            Some(_) => Some(patch::build_thread_pool(options.threads)?),
            None => None,
        };

        Ok(Engine {
            registry,
            options,
            pool,
        })
    }

    pub fn registry(&self) -> &'r KernelRegistry {
        self.registry
    }

    pub fn options(&self) -> &ParallelOptions {
        &self.options
    }

    /// Combine two images into a new one.
    ///
    /// The result has the layout of `lhs`. Pixels skipped by the mask are zero.
    #[tracing::instrument(level = "debug", skip_all, fields(op = %op))]
    pub fn apply(
        &self,
        op: MathOp,
        lhs: &Image,
        rhs: &Image,
        mask: Option<&Image>,
    ) -> OpResult<Image> {
        let mut dst = lhs.copy_blank();
        self.run(
            op,
            Some(lhs.as_ref()),
            rhs.as_ref(),
            dst.as_mut(),
            mask.map(Image::as_ref),
        )?;
        Ok(dst)
    }

    /// Combine `rhs` into `lhs`, overwriting it.
    ///
    /// Pixels skipped by the mask keep their value.
    #[tracing::instrument(level = "debug", skip_all, fields(op = %op))]
    pub fn apply_in_place<'i>(
        &self,
        op: MathOp,
        lhs: &'i mut Image,
        rhs: &Image,
        mask: Option<&Image>,
    ) -> OpResult<&'i mut Image> {
        self.run(op, None, rhs.as_ref(), lhs.as_mut(), mask.map(Image::as_ref))?;
        Ok(lhs)
    }

    /// Combine two views into a destination view of the caller.
    ///
    /// Any of the views may be a sub-rectangle of a larger image. Pixels skipped by the mask keep
    /// their value.
    #[tracing::instrument(level = "debug", skip_all, fields(op = %op))]
    pub fn apply_into(
        &self,
        op: MathOp,
        lhs: ImageRef<'_>,
        rhs: ImageRef<'_>,
        dst: ImageMut<'_>,
        mask: Option<ImageRef<'_>>,
    ) -> OpResult<()> {
        self.run(op, Some(lhs), rhs, dst, mask)
    }

    /// Combine `rhs` into a view, overwriting it.
    #[tracing::instrument(level = "debug", skip_all, fields(op = %op))]
    pub fn apply_view_in_place(
        &self,
        op: MathOp,
        dst: ImageMut<'_>,
        rhs: ImageRef<'_>,
        mask: Option<ImageRef<'_>>,
    ) -> OpResult<()> {
        self.run(op, None, rhs, dst, mask)
    }

    /// Combine an image with a constant into a new image.
    #[tracing::instrument(level = "debug", skip_all, fields(op = %op))]
    pub fn apply_scalar(
        &self,
        op: MathOp,
        lhs: &Image,
        value: impl Into<Scalar>,
        mask: Option<&Image>,
    ) -> OpResult<Image> {
        let rhs = self.scalar_operand(lhs, &value.into())?;
        self.apply(op, lhs, &rhs, mask)
    }

    /// Combine a constant into an image, overwriting it.
    #[tracing::instrument(level = "debug", skip_all, fields(op = %op))]
    pub fn apply_scalar_in_place<'i>(
        &self,
        op: MathOp,
        lhs: &'i mut Image,
        value: impl Into<Scalar>,
        mask: Option<&Image>,
    ) -> OpResult<&'i mut Image> {
        let rhs = self.scalar_operand(lhs, &value.into())?;
        self.apply_in_place(op, lhs, &rhs, mask)
    }

    /// Set the pixels of a view to a constant, where the mask is not zero.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn set_value(
        &self,
        dst: ImageMut<'_>,
        value: impl Into<Scalar>,
        mask: Option<ImageRef<'_>>,
    ) -> OpResult<()> {
        self.fill(dst, &value.into(), mask)
    }

    fn scalar_operand(&self, like: &Image, value: &Scalar) -> OpResult<Image> {
        let mut operand = like.copy_blank();
        self.fill(operand.as_mut(), value, None)?;
        Ok(operand)
    }

    fn fill(&self, dst: ImageMut<'_>, value: &Scalar, mask: Option<ImageRef<'_>>) -> OpResult<()> {
        let layout = *dst.layout();
        if let Some(mask) = mask {
            check_mask(&layout, mask.layout())?;
        }

        let pixel = value.to_pixel(layout.pixel())?;
        let regions = self.partition(&layout);

        self.executor().run(dst, &regions, |region, band| {
            let mask = mask.map(|mask| mask.sub_rect(region)).transpose()?;
            kernel::fill(band, &pixel, mask)
        })
    }

    fn run(
        &self,
        op: MathOp,
        lhs: Option<ImageRef<'_>>,
        rhs: ImageRef<'_>,
        dst: ImageMut<'_>,
        mask: Option<ImageRef<'_>>,
    ) -> OpResult<()> {
        let layout = *dst.layout();
        let lhs_layout = lhs.map_or(layout, |lhs| *lhs.layout());

        check_operand("second operand", &lhs_layout, rhs.layout())?;
        check_operand("destination", &lhs_layout, &layout)?;
        if let Some(mask) = mask {
            check_mask(&layout, mask.layout())?;
        }

        let kernel = self.registry.resolve(op, layout.pixel().kind())?;

        // Synthesized once for the whole call, never per region.
        let implicit;
        let mask = match mask {
            Some(mask) => mask,
            None => {
                implicit = Image::with_value(layout.width(), layout.height(), &[u8::MAX])?;
                implicit.as_ref()
            }
        };

        let regions = self.partition(&layout);

        self.executor().run(dst, &regions, |region, band| {
            kernel(Operands {
                lhs: lhs.map(|lhs| lhs.sub_rect(region)).transpose()?,
                rhs: rhs.sub_rect(region)?,
                mask: mask.sub_rect(region)?,
                dst: band,
            })
        })
    }

    fn partition(&self, layout: &ImageLayout) -> Vec<Rect> {
        let workers = self.executor().workers();
        let regions = patch::partition(layout.width(), layout.height(), &self.options, workers);
        tracing::debug!(
            width = layout.width(),
            height = layout.height(),
            regions = regions.len(),
            workers,
            "partitioned destination"
        );
        regions
    }

    fn executor(&self) -> Executor<'_> {
        Executor::new(self.pool.as_ref())
    }
}

fn describe(layout: &ImageLayout) -> String {
    format!(
        "{}x{} pixels of {}",
        layout.width(),
        layout.height(),
        layout.pixel()
    )
}

fn check_operand(what: &str, expected: &ImageLayout, actual: &ImageLayout) -> OpResult<()> {
    if expected.matches(actual) {
        return Ok(());
    }

    Err(OpError::mismatched(format!(
        "{what} has {}, expected {}",
        describe(actual),
        describe(expected)
    )))
}

fn check_mask(dst: &ImageLayout, mask: &ImageLayout) -> OpResult<()> {
    if mask.pixel() == PixelLayout::mask()
        && mask.width() == dst.width()
        && mask.height() == dst.height()
    {
        return Ok(());
    }

    Err(OpError::mismatched(format!(
        "mask has {}, expected {}x{} pixels of {}",
        describe(mask),
        dst.width(),
        dst.height(),
        PixelLayout::mask()
    )))
}
