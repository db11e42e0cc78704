/// Controls how an operation is split into regions and where the regions run.
///
/// An image is processed in parallel when it has more than `parallel_threshold` pixels. It is
/// then cut into full-width bands of rows, aiming for `patches_per_thread` bands per worker
/// thread.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ParallelOptions {
    /// Always process the image as one region on the calling thread.
    pub force_sequential: bool,
    /// Images with at most this many pixels are processed as one region.
    pub parallel_threshold: u64,
    /// The smallest number of rows in a band.
    pub min_patch_height: u32,
    /// How many bands to create for each worker thread.
    pub patches_per_thread: usize,
    /// Run on a dedicated pool with this many threads instead of the global rayon pool.
    pub threads: Option<usize>,
}

impl ParallelOptions {
    /// The default pixel count above which images are processed in parallel, a 100 by 100 image.
    pub const DEFAULT_PARALLEL_THRESHOLD: u64 = 100 * 100;

    /// Options that never split an image.
    pub fn sequential() -> Self {
        ParallelOptions {
            force_sequential: true,
            ..Self::default()
        }
    }

    pub fn with_force_sequential(mut self, force_sequential: bool) -> Self {
        self.force_sequential = force_sequential;
        self
    }

    pub fn with_parallel_threshold(mut self, pixels: u64) -> Self {
        self.parallel_threshold = pixels;
        self
    }

    pub fn with_min_patch_height(mut self, rows: u32) -> Self {
        self.min_patch_height = rows;
        self
    }

    pub fn with_patches_per_thread(mut self, patches: usize) -> Self {
        self.patches_per_thread = patches;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Whether an image of this size is split into several regions.
    pub fn should_process_parallel(&self, width: u32, height: u32) -> bool {
        !self.force_sequential && u64::from(width) * u64::from(height) > self.parallel_threshold
    }
}

impl Default for ParallelOptions {
    fn default() -> Self {
        ParallelOptions {
            force_sequential: false,
            parallel_threshold: Self::DEFAULT_PARALLEL_THRESHOLD,
            min_patch_height: 1,
            patches_per_thread: 2,
            threads: None,
        }
    }
}
