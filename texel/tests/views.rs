use strided_texel::{
    Image, ImageLayout, ImageMut, ImageRef, LayoutError, PixelLayout, Rect, SampleKind,
};

#[test]
fn foreign_bytes_with_padding() {
    let pixel = PixelLayout::new(SampleKind::I16, 2).unwrap();
    let layout = ImageLayout::with_stride(pixel, 2, 3, 12).unwrap();

    // Three rows of two pixels, each row followed by two padding samples.
    let storage: [i16; 18] = [
        1, 2, 3, 4, -1, -1, //
        5, 6, 7, 8, -1, -1, //
        9, 10, 11, 12, -1, -1,
    ];
    let view = ImageRef::with_bytes(layout, bytemuck::cast_slice(&storage)).unwrap();

    let owned = Image::from_view(view, ImageLayout::packed(pixel, 2, 3).unwrap()).unwrap();
    assert_eq!(
        owned.to_samples::<i16>().unwrap(),
        [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]
    );
}

#[test]
fn nested_sub_rects() {
    let samples: Vec<f32> = (0..36).map(|v| v as f32).collect();
    let image = Image::from_samples(6, 6, 1, &samples).unwrap();

    let outer = image.sub_rect(Rect::new(1, 1, 4, 4)).unwrap();
    let inner = outer.sub_rect(Rect::new(1, 2, 2, 2)).unwrap();

    let inner = inner.samples::<f32>().unwrap();
    assert_eq!(inner.row(0), &[20.0, 21.0]);
    assert_eq!(inner.row(1), &[26.0, 27.0]);

    assert!(matches!(
        outer.sub_rect(Rect::new(3, 0, 2, 1)),
        Err(LayoutError::RectOutOfBounds { width: 4, height: 4, .. })
    ));
}

#[test]
fn bands_cover_the_image() {
    let mut image = Image::new(PixelLayout::gray(SampleKind::I32), 3, 7).unwrap();

    let mut rest: ImageMut<'_> = image.as_mut();
    let mut band_index = 0i32;
    while rest.height() > 0 {
        let (mut band, tail) = rest.split_at_row(2);
        band.fill(&[band_index]).unwrap();
        band_index += 1;
        rest = tail;
    }

    assert_eq!(band_index, 4);
    let rows: Vec<i32> = image.to_samples::<i32>().unwrap();
    let firsts: Vec<i32> = rows.chunks(3).map(|row| row[0]).collect();
    assert_eq!(firsts, [0, 0, 1, 1, 2, 2, 3]);
}

#[test]
fn padding_outside_sub_rect_untouched() {
    let mut image = Image::with_value(4, 2, &[9u8]).unwrap();
    let source = Image::from_samples(2, 2, 1, &[1u8, 2, 3, 4]).unwrap();

    image
        .sub_rect_mut(Rect::new(1, 0, 2, 2))
        .unwrap()
        .copy_from(source.as_ref())
        .unwrap();

    assert_eq!(image.to_samples::<u8>().unwrap(), [9, 1, 2, 9, 9, 3, 4, 9]);
}

#[test]
fn mismatched_copy_rejected() {
    let mut target = Image::new(PixelLayout::gray(SampleKind::U8), 2, 2).unwrap();
    let source = Image::new(PixelLayout::gray(SampleKind::U8), 3, 2).unwrap();

    assert!(matches!(
        target.as_mut().copy_from(source.as_ref()),
        Err(LayoutError::Mismatch { .. })
    ));
}
