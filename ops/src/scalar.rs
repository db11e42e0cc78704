use strided_texel::{PixelLayout, Sample, SampleKind};

use crate::error::{OpError, OpResult};

/// A constant pixel value, given per channel.
///
/// Values are converted to the sample type of the image they are used with, with the semantics
/// of an `as` cast: integers saturate and NaN becomes zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Scalar {
    repr: Repr,
}

#[derive(Clone, Debug, PartialEq)]
enum Repr {
    Splat(f64),
    PerChannel(Vec<f64>),
}

impl Scalar {
    /// The same value in every channel.
    pub fn splat(value: f64) -> Self {
        Scalar {
            repr: Repr::Splat(value),
        }
    }

    /// Explicit values for the leading channels, remaining channels are zero.
    pub fn per_channel(values: impl Into<Vec<f64>>) -> Self {
        Scalar {
            repr: Repr::PerChannel(values.into()),
        }
    }

    /// The value of each of `channels` channels.
    pub fn channels(&self, channels: u8) -> OpResult<Vec<f64>> {
        let channels = usize::from(channels);
        match &self.repr {
            Repr::Splat(value) => Ok(vec![*value; channels]),
            Repr::PerChannel(values) if values.len() > channels => Err(OpError::mismatched(
                format!(
                    "scalar has {} channel values but the image has {} channels",
                    values.len(),
                    channels
                ),
            )),
            Repr::PerChannel(values) => {
                let mut all = values.clone();
                all.resize(channels, 0.0);
                Ok(all)
            }
        }
    }

    /// The bytes of one pixel holding this value.
    pub(crate) fn to_pixel(&self, pixel: PixelLayout) -> OpResult<Vec<u8>> {
        let values = self.channels(pixel.channels())?;
        Ok(match pixel.kind() {
            SampleKind::U8 => encode::<u8>(&values),
            SampleKind::I16 => encode::<i16>(&values),
            SampleKind::I32 => encode::<i32>(&values),
            SampleKind::F32 => encode::<f32>(&values),
            SampleKind::F64 => encode::<f64>(&values),
        })
    }
}

fn encode<T: Sample>(values: &[f64]) -> Vec<u8> {
    let samples: Vec<T> = values.iter().map(|&v| T::from_f64(v)).collect();
    bytemuck::cast_slice(samples.as_slice()).to_vec()
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::splat(value)
    }
}

impl From<&[f64]> for Scalar {
    fn from(values: &[f64]) -> Self {
        Scalar::per_channel(values)
    }
}

impl<const N: usize> From<[f64; N]> for Scalar {
    fn from(values: [f64; N]) -> Self {
        Scalar::per_channel(values)
    }
}

impl From<Vec<f64>> for Scalar {
    fn from(values: Vec<f64>) -> Self {
        Scalar::per_channel(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splat_fills_every_channel() {
        assert_eq!(Scalar::from(2.5).channels(3).unwrap(), [2.5, 2.5, 2.5]);
    }

    #[test]
    fn missing_channels_are_zero() {
        assert_eq!(
            Scalar::from([1.0, 2.0]).channels(4).unwrap(),
            [1.0, 2.0, 0.0, 0.0]
        );
        assert!(matches!(
            Scalar::from([1.0, 2.0, 3.0]).channels(2),
            Err(OpError::MismatchedOperands(_))
        ));
    }

    #[test]
    fn pixel_bytes_use_cast_semantics() {
        let pixel = PixelLayout::new(SampleKind::U8, 3).unwrap();
        let bytes = Scalar::from([300.0, -4.0, 7.9]).to_pixel(pixel).unwrap();
        assert_eq!(bytes, [255, 0, 7]);

        let pixel = PixelLayout::gray(SampleKind::I16);
        let bytes = Scalar::splat(-2.0).to_pixel(pixel).unwrap();
        assert_eq!(bytes, (-2i16).to_ne_bytes());
    }
}
