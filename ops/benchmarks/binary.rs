//! Benchmarks binary operations over padded and masked images.
use brunch::Bench;

use strided_ops::{Engine, MathOp, OpError, ParallelOptions};
use strided_texel::{Image, ImageLayout, PixelLayout, SampleKind};

struct Binary {
    op: MathOp,
    kind: SampleKind,
    channels: u8,
    masked: bool,
    sequential: bool,
    sz: u32,
}

impl Binary {
    fn name(&self) -> String {
        format!(
            "binary({}, {}x{}, {}{}, {})",
            self.op,
            self.kind,
            self.channels,
            if self.masked { "masked" } else { "unmasked" },
            if self.sequential { ", sequential" } else { "" },
            self.sz
        )
    }

    fn prepare(self) -> Result<impl FnMut(), OpError> {
        let pixel = PixelLayout::new(self.kind, self.channels)?;
        // Pad every row by a few pixels, as a sub-rectangle of a larger image would be.
        let stride = (self.sz as usize + 3) * pixel.size();
        let layout = ImageLayout::with_stride(pixel, self.sz, self.sz, stride)?;

        let mut lhs = Image::with_layout(layout);
        let mut rhs = Image::with_layout(layout);
        let options = if self.sequential {
            ParallelOptions::sequential()
        } else {
            ParallelOptions::default()
        };
        let engine = Engine::new(options)?;
        engine.set_value(lhs.as_mut(), 3.0, None)?;
        engine.set_value(rhs.as_mut(), 1.0, None)?;

        let mut mask = Image::with_value(self.sz, self.sz, &[255u8])?;
        let mask = if self.masked {
            engine.set_value(
                mask.sub_rect_mut(strided_texel::Rect::new(0, 0, self.sz / 2, self.sz))?,
                0.0,
                None,
            )?;
            Some(mask)
        } else {
            None
        };

        let op = self.op;
        Ok(move || {
            engine
                .apply_in_place(op, &mut lhs, &rhs, mask.as_ref())
                .map(|_| ())
                .unwrap()
        })
    }
}

fn main() {
    let tests = [
        Binary {
            op: MathOp::Add,
            kind: SampleKind::U8,
            channels: 3,
            masked: false,
            sequential: true,
            sz: 512,
        },
        Binary {
            op: MathOp::Add,
            kind: SampleKind::U8,
            channels: 3,
            masked: false,
            sequential: false,
            sz: 512,
        },
        Binary {
            op: MathOp::Add,
            kind: SampleKind::U8,
            channels: 3,
            masked: true,
            sequential: false,
            sz: 512,
        },
        Binary {
            op: MathOp::Xor,
            kind: SampleKind::I16,
            channels: 1,
            masked: false,
            sequential: false,
            sz: 1024,
        },
        Binary {
            op: MathOp::Mul,
            kind: SampleKind::F32,
            channels: 4,
            masked: false,
            sequential: false,
            sz: 512,
        },
        Binary {
            op: MathOp::Div,
            kind: SampleKind::F64,
            channels: 1,
            masked: true,
            sequential: false,
            sz: 1024,
        },
    ];

    let mut benches = brunch::Benches::default();
    benches.extend(tests.map(|binary| {
        Bench::new(format!("ops::binary::main::{}", binary.name()))
            .run(binary.prepare().expect("Failed to setup benchmark"))
    }));
    benches.finish();
}
