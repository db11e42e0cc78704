//! Partitioning a destination into regions and running a kernel over each of them.
//!
//! Regions are full-width bands of rows. A band of rows is contiguous in a strided image, so
//! the destination can be split into disjoint mutable views with
//! [`ImageMut::split_at_row`], one per band, which the workers then own exclusively.
use rayon::prelude::*;
use rayon::ThreadPool;
use strided_texel::{ImageMut, Rect};

use crate::error::{KernelError, OpError, OpResult};
use crate::options::ParallelOptions;

/// Split an image of the given size into bands for `workers` threads.
///
/// The bands are disjoint, cover the image in row order, and all span the full width. An image
/// without pixels has no bands, a small image or sequential options give a single band.
pub fn partition(width: u32, height: u32, options: &ParallelOptions, workers: usize) -> Vec<Rect> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    if !options.should_process_parallel(width, height) {
        return vec![Rect::with_size(width, height)];
    }

    let target = options
        .patches_per_thread
        .max(1)
        .saturating_mul(workers.max(1));
    let target = u32::try_from(target).unwrap_or(u32::MAX);
    let band = (height / target).max(1).max(options.min_patch_height);

    let mut bands = Vec::with_capacity((height / band) as usize + 1);
    let mut y = 0;
    while y < height {
        let rows = band.min(height - y);
        bands.push(Rect::new(0, y, width, rows));
        y += rows;
    }

    // A short remainder is merged into the band before it.
    if let [.., previous, last] = bands.as_mut_slice() {
        if last.height < band {
            previous.height += last.height;
            bands.pop();
        }
    }

    bands
}

/// Runs a region callback over bands of a destination.
pub(crate) struct Executor<'p> {
    pool: Option<&'p ThreadPool>,
}

impl<'p> Executor<'p> {
    pub(crate) fn new(pool: Option<&'p ThreadPool>) -> Self {
        Executor { pool }
    }

    /// The number of threads work is spread over.
    pub(crate) fn workers(&self) -> usize {
        match self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Call `kernel` once for each region, with the part of `dst` it covers.
    ///
    /// Blocks until every region has finished. If regions fail, one of their errors is returned
    /// with its position in the coordinates of `dst`.
    ///
    /// The regions must be full-width bands in row order starting at the first row, as returned
    /// by [`partition`].
    pub(crate) fn run<F>(&self, dst: ImageMut<'_>, regions: &[Rect], kernel: F) -> OpResult<()>
    where
        F: Fn(Rect, ImageMut<'_>) -> Result<(), KernelError> + Sync,
    {
        let bands = split_bands(dst, regions);

        if bands.len() <= 1 {
            return bands
                .into_iter()
                .try_for_each(|(region, band)| run_band(&kernel, region, band));
        }

        match self.pool {
            Some(pool) => pool.install(|| {
                bands
                    .into_par_iter()
                    .try_for_each(|(region, band)| run_band(&kernel, region, band))
            }),
            None => bands
                .into_par_iter()
                .try_for_each(|(region, band)| run_band(&kernel, region, band)),
        }
    }
}

fn run_band<F>(kernel: &F, region: Rect, band: ImageMut<'_>) -> OpResult<()>
where
    F: Fn(Rect, ImageMut<'_>) -> Result<(), KernelError>,
{
    kernel(region, band).map_err(|source| OpError::region(region, source))
}

fn split_bands<'d>(dst: ImageMut<'d>, regions: &[Rect]) -> Vec<(Rect, ImageMut<'d>)> {
    let mut bands = Vec::with_capacity(regions.len());
    let mut rest = dst;

    for &region in regions {
        debug_assert_eq!(region.x, 0);
        debug_assert_eq!(region.width, rest.width());
        let (band, tail) = rest.split_at_row(region.height);
        bands.push((region, band));
        rest = tail;
    }

    bands
}

/// Build a dedicated pool, rejecting a count of zero threads.
pub(crate) fn build_thread_pool(threads: Option<usize>) -> OpResult<ThreadPool> {
    if threads == Some(0) {
        return Err(OpError::thread_pool(
            "parallel options 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    let pool = builder
        .build()
        .map_err(|e| OpError::thread_pool(format!("failed to build rayon thread pool: {e}")))?;

    tracing::debug!(threads = pool.current_num_threads(), "built dedicated thread pool");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strided_texel::{Image, PixelLayout, SampleKind};

    fn parallel() -> ParallelOptions {
        ParallelOptions::default().with_parallel_threshold(0)
    }

    fn assert_covers(width: u32, height: u32, regions: &[Rect]) {
        let mut next = 0;
        for region in regions {
            assert_eq!(region.x, 0);
            assert_eq!(region.width, width);
            assert_eq!(region.y, next, "bands must be contiguous");
            assert!(region.height > 0);
            next += region.height;
        }
        assert_eq!(next, height);

        for (i, a) in regions.iter().enumerate() {
            for b in &regions[i + 1..] {
                assert!(!a.intersects(b));
            }
        }
    }

    #[test]
    fn small_images_are_one_region() {
        let options = ParallelOptions::default();
        assert_eq!(
            partition(100, 100, &options, 8),
            [Rect::with_size(100, 100)]
        );
        assert_eq!(
            partition(4000, 4000, &ParallelOptions::sequential(), 8),
            [Rect::with_size(4000, 4000)]
        );
        assert!(partition(0, 100, &options, 8).is_empty());
        assert!(partition(100, 0, &parallel(), 8).is_empty());
    }

    #[test]
    fn bands_per_worker() {
        // 2 bands for each of 4 workers, 100 rows each.
        let regions = partition(640, 800, &parallel(), 4);
        assert_eq!(regions.len(), 8);
        assert!(regions.iter().all(|r| r.height == 100));
        assert_covers(640, 800, &regions);
    }

    #[test]
    fn short_remainder_is_merged() {
        // 10 rows per band, the last 3 rows join the band before them.
        let regions = partition(16, 103, &parallel().with_patches_per_thread(1), 10);
        assert_eq!(regions.len(), 10);
        assert_eq!(regions.last(), Some(&Rect::new(0, 90, 16, 13)));
        assert_covers(16, 103, &regions);
    }

    #[test]
    fn minimum_height_is_kept() {
        let regions = partition(16, 64, &parallel().with_min_patch_height(20), 16);
        assert_eq!(regions.len(), 3);
        assert_eq!(regions.last(), Some(&Rect::new(0, 40, 16, 24)));
        assert_covers(16, 64, &regions);
    }

    #[test]
    fn always_covering() {
        for height in 1..40 {
            for workers in 1..9 {
                for min in [0, 1, 3, 50] {
                    let options = parallel().with_min_patch_height(min);
                    let regions = partition(7, height, &options, workers);
                    assert_covers(7, height, &regions);
                }
            }
        }
    }

    #[test]
    fn errors_report_global_position() {
        let mut image = Image::new(PixelLayout::gray(SampleKind::U8), 4, 8).unwrap();
        let regions = partition(4, 8, &parallel(), 2);
        assert_eq!(regions.len(), 4);

        let executor = Executor::new(None);
        let err = executor
            .run(image.as_mut(), &regions, |region, _band| {
                if region.y == 4 {
                    Err(KernelError::DivisionByZero {
                        x: 1,
                        y: 1,
                        channel: 0,
                    })
                } else {
                    Ok(())
                }
            })
            .unwrap_err();

        match err {
            OpError::RegionExecution { region, source } => {
                assert_eq!(region, Rect::new(0, 4, 4, 2));
                assert_eq!(
                    source,
                    KernelError::DivisionByZero {
                        x: 1,
                        y: 5,
                        channel: 0
                    }
                );
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn bands_are_written_independently() {
        let mut image = Image::new(PixelLayout::gray(SampleKind::I32), 3, 9).unwrap();
        let regions = partition(3, 9, &parallel(), 2);

        let pool = build_thread_pool(Some(3)).unwrap();
        let executor = Executor::new(Some(&pool));
        assert_eq!(executor.workers(), 3);

        executor
            .run(image.as_mut(), &regions, |region, mut band| {
                band.fill(&[region.y as i32])?;
                Ok(())
            })
            .unwrap();

        let rows: Vec<i32> = image
            .to_samples::<i32>()
            .unwrap()
            .chunks(3)
            .map(|row| row[0])
            .collect();
        assert_eq!(rows, [0, 0, 2, 2, 4, 4, 6, 6, 6]);
    }

    #[test]
    fn zero_threads_rejected() {
        assert!(matches!(
            build_thread_pool(Some(0)),
            Err(OpError::ThreadPool(_))
        ));
    }
}
