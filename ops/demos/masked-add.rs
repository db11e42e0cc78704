//! Adds a constant to a circular area in the middle of a padded image.
//!
//! Run with `RUST_LOG=debug` to see how the image is cut into regions.
use strided_ops::{Engine, MathOp, OpResult, ParallelOptions};
use strided_texel::{Image, ImageLayout, PixelLayout, SampleKind};

const SIZE: u32 = 256;

fn main() -> OpResult<()> {
    tracing_subscriber::fmt::init();

    let engine = Engine::new(ParallelOptions::default().with_threads(4))?;

    let pixel = PixelLayout::new(SampleKind::U8, 3)?;
    let layout = ImageLayout::with_row_alignment(pixel, SIZE, SIZE, 64)?;
    let mut image = Image::with_layout(layout);
    engine.set_value(image.as_mut(), [16.0, 32.0, 64.0], None)?;

    let mut mask = Image::new(PixelLayout::mask(), SIZE, SIZE)?;
    let center = f64::from(SIZE) / 2.0;
    for y in 0..SIZE {
        for x in 0..SIZE {
            let (dx, dy) = (f64::from(x) - center, f64::from(y) - center);
            if dx.hypot(dy) < center / 2.0 {
                if let Some(px) = mask.get_mut::<u8>(x, y) {
                    px[0] = 255;
                }
            }
        }
    }

    engine.apply_scalar_in_place(MathOp::Add, &mut image, 100.0, Some(&mask))?;

    for (x, y) in [(0, 0), (SIZE / 2, SIZE / 2), (SIZE / 4, SIZE / 2)] {
        println!("pixel ({x}, {y}): {:?}", image.get::<u8>(x, y));
    }

    Ok(())
}
