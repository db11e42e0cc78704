//! Every supported operation against a naive loop over packed samples.
use strided_ops::{MathOp, OpError};
use strided_texel::{Image, PixelLayout, Sample, SampleKind};

const WIDTH: u32 = 4;
const HEIGHT: u32 = 4;
const CHANNELS: u8 = 3;
const SAMPLES: usize = (WIDTH * HEIGHT) as usize * CHANNELS as usize;

fn check_all<T: Sample>(lhs: &[T], rhs: &[T], reference: impl Fn(MathOp, T, T) -> T) {
    let a = Image::from_samples(WIDTH, HEIGHT, CHANNELS, lhs).unwrap();
    let b = Image::from_samples(WIDTH, HEIGHT, CHANNELS, rhs).unwrap();

    for op in MathOp::ALL {
        if !op.is_defined_for(T::KIND) {
            continue;
        }

        let out = strided_ops::apply(op, &a, &b, None).unwrap();
        let expected: Vec<T> = lhs
            .iter()
            .zip(rhs)
            .map(|(&x, &y)| reference(op, x, y))
            .collect();

        assert_eq!(out.to_samples::<T>().unwrap(), expected, "{op} on {}", T::KIND);
    }
}

macro_rules! integer_reference {
    ($ty:ty) => {
        |op: MathOp, a: $ty, b: $ty| -> $ty {
            match op {
                MathOp::And => a & b,
                MathOp::Or => a | b,
                MathOp::Xor => a ^ b,
                MathOp::Add => a.wrapping_add(b),
                MathOp::Sub => a.wrapping_sub(b),
                MathOp::Mul => a.wrapping_mul(b),
                MathOp::Div => a.wrapping_div(b),
            }
        }
    };
}

macro_rules! float_reference {
    ($ty:ty) => {
        |op: MathOp, a: $ty, b: $ty| -> $ty {
            match op {
                MathOp::Add => a + b,
                MathOp::Sub => a - b,
                MathOp::Mul => a * b,
                MathOp::Div => a / b,
                other => panic!("{other} is not defined for floats"),
            }
        }
    };
}

#[test]
fn u8_operations() {
    let lhs: Vec<u8> = (0..SAMPLES).map(|i| (i * 37 + 11) as u8).collect();
    let rhs: Vec<u8> = (0..SAMPLES).map(|i| (i * 53 + 1) as u8 | 1).collect();
    check_all(&lhs, &rhs, integer_reference!(u8));
}

#[test]
fn i16_operations() {
    let lhs: Vec<i16> = (0..SAMPLES)
        .map(|i| (i as i16).wrapping_mul(7919).wrapping_sub(20000))
        .collect();
    let rhs: Vec<i16> = (0..SAMPLES)
        .map(|i| (i as i16).wrapping_mul(-313) | 1)
        .collect();
    check_all(&lhs, &rhs, integer_reference!(i16));
}

#[test]
fn i32_operations() {
    let lhs: Vec<i32> = (0..SAMPLES)
        .map(|i| (i as i32).wrapping_mul(1_000_003).wrapping_sub(1 << 30))
        .collect();
    let rhs: Vec<i32> = (0..SAMPLES)
        .map(|i| (i as i32 - 20).wrapping_mul(65_537) | 1)
        .collect();
    check_all(&lhs, &rhs, integer_reference!(i32));
}

#[test]
fn f32_operations() {
    let lhs: Vec<f32> = (0..SAMPLES).map(|i| i as f32 * 0.75 - 10.0).collect();
    let rhs: Vec<f32> = (0..SAMPLES).map(|i| (i + 1) as f32 * -0.5).collect();
    check_all(&lhs, &rhs, float_reference!(f32));
}

#[test]
fn f64_operations() {
    let lhs: Vec<f64> = (0..SAMPLES).map(|i| (i as f64).sqrt() - 3.0).collect();
    let rhs: Vec<f64> = (0..SAMPLES).map(|i| 1.0 / (i + 2) as f64).collect();
    check_all(&lhs, &rhs, float_reference!(f64));
}

#[test]
fn undefined_pairs_are_unsupported() {
    for kind in SampleKind::ALL {
        let pixel = PixelLayout::new(kind, CHANNELS).unwrap();
        let image = Image::new(pixel, WIDTH, HEIGHT).unwrap();

        for op in MathOp::ALL {
            let result = strided_ops::apply(op, &image, &image, None);
            if op.is_defined_for(kind) {
                // Zeros everywhere, only integer division fails.
                if op == MathOp::Div && kind.is_integer() {
                    assert!(matches!(result, Err(OpError::RegionExecution { .. })));
                } else {
                    assert!(result.is_ok(), "{op} on {kind}");
                }
            } else {
                assert!(
                    matches!(
                        result,
                        Err(OpError::UnsupportedOperationForType { op: o, kind: k })
                            if o == op && k == kind
                    ),
                    "{op} on {kind}"
                );
            }
        }
    }
}
