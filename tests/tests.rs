use binoblur::*;

/// Straightforward per-pixel version of the two truncating 1-D passes
fn reference_blur(planar: &mut [u8], width: usize, height: usize, radius: usize, vertical_first: bool) {
    fn pass(src: &[u8], dst: &mut [u8], width: usize, height: usize, weights: &[u64], vertical: bool) {
        let radius = (weights.len() / 2) as isize;
        let sum: u64 = weights.iter().sum();
        for y in 0..height {
            for x in 0..width {
                let mut acc = 0u64;
                for (t, w) in weights.iter().enumerate() {
                    let offset = t as isize - radius;
                    let (nx, ny) = if vertical { (x as isize, y as isize + offset) } else { (x as isize + offset, y as isize) };
                    if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                        continue;
                    }
                    acc += u64::from(src[ny as usize * width + nx as usize]) * w;
                }
                dst[y * width + x] = (acc / sum) as u8;
            }
        }
    }

    let n = 2 * radius as u32;
    let weights: Vec<u64> = (0..=n).map(|i| binomial_coefficient(n, i).unwrap()).collect();
    let mut tmp = vec![0u8; width * height];
    for plane in planar.chunks_exact_mut(width * height) {
        pass(plane, &mut tmp, width, height, &weights, vertical_first);
        pass(&tmp, plane, width, height, &weights, !vertical_first);
    }
}

fn noise(len: usize, mut seed: u32) -> Vec<u8> {
    (0..len).map(|_| {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        (seed >> 24) as u8
    }).collect()
}

#[test]
fn matches_reference() {
    let (width, height) = (53, 41);
    let orig = noise(width * height * 3, 0x1234_5678);
    for radius in 0..=DEFAULT_MAX_RADIUS {
        let mut expected = orig.clone();
        reference_blur(&mut expected, width, height, radius.into(), true);

        let mut buf = orig.clone();
        blur(&mut buf, width, height, radius).unwrap();
        assert!(buf == expected, "radius {radius}");
    }
}

#[test]
fn matches_reference_horizontal_first() {
    let (width, height) = (17, 64);
    let orig = noise(width * height * 3, 99);
    let mut attr = new();
    attr.set_pass_order(PassOrder::HorizontalFirst);
    for radius in [1, 4, 8] {
        let mut expected = orig.clone();
        reference_blur(&mut expected, width, height, radius.into(), false);

        let mut buf = orig.clone();
        let mut img = attr.new_image(&mut buf, width, height).unwrap();
        attr.blur(&mut img, radius).unwrap();
        drop(img);
        assert!(buf == expected, "radius {radius}");
    }
}

#[test]
fn five_by_five_white() {
    let mut buf = vec![255u8; 5 * 5 * 3];
    blur(&mut buf, 5, 5, 1).unwrap();
    let expected_plane = [
        143, 191, 191, 191, 143,
        191, 255, 255, 255, 191,
        191, 255, 255, 255, 191,
        191, 255, 255, 255, 191,
        143, 191, 191, 191, 143,
    ];
    for plane in buf.chunks_exact(25) {
        assert_eq!(&expected_plane[..], plane);
    }
}

#[test]
fn constant_interior_is_preserved() {
    let (width, height) = (40, 37);
    for v in [1u8, 77, 128, 254, 255] {
        for radius in 1..=DEFAULT_MAX_RADIUS {
            let mut buf = vec![v; width * height * 3];
            blur(&mut buf, width, height, radius).unwrap();
            let img = Image::new_copy(&new(), &buf, width, height).unwrap();
            let r = usize::from(radius);
            for y in 0..height {
                for x in 0..width {
                    let px = img.pixel(x, y).unwrap();
                    let interior = x >= r && y >= r && x + r < width && y + r < height;
                    if interior {
                        assert_eq!(RGB8::new(v, v, v), px, "v={v} r={radius} {x},{y}");
                    } else {
                        assert!(px.r <= v && px.g <= v && px.b <= v);
                    }
                }
            }
        }
    }
}

#[test]
fn white_borders_get_darker() {
    let (width, height) = (23, 19);
    for radius in 1..=DEFAULT_MAX_RADIUS {
        let mut buf = vec![255u8; width * height * 3];
        blur(&mut buf, width, height, radius).unwrap();
        let img = Image::new_copy(&new(), &buf, width, height).unwrap();
        for c in 0..CHANNELS {
            let plane = img.plane(c);
            for x in 0..width {
                assert!(plane[x] < 255);
                assert!(plane[(height - 1) * width + x] < 255);
            }
            for y in 0..height {
                assert!(plane[y * width] < 255);
                assert!(plane[y * width + width - 1] < 255);
            }
        }
        let r = usize::from(radius);
        for y in r..height - r {
            for x in r..width - r {
                assert_eq!(Some(RGB8::new(255, 255, 255)), img.pixel(x, y));
            }
        }
    }
}

#[test]
fn refuses_above_limit() {
    let (width, height) = (12, 9);
    let orig = noise(width * height * 3, 7);
    let mut buf = orig.clone();
    assert_eq!(Err(RadiusTooLarge), blur(&mut buf, width, height, DEFAULT_MAX_RADIUS + 1));
    assert_eq!(orig, buf);

    let mut attr = new();
    attr.set_max_radius(MAX_SAFE_RADIUS).unwrap();
    let mut img = attr.new_image(&mut buf, width, height).unwrap();
    assert_eq!(Err(RadiusTooLarge), attr.blur(&mut img, MAX_SAFE_RADIUS + 1));
    drop(img);
    assert_eq!(orig, buf);
}

#[test]
fn channels_are_independent() {
    let (width, height) = (9, 9);
    let mut buf = vec![0u8; width * height * 3];
    // single bright dot in green only
    buf[width * height + 4 * width + 4] = 200;
    blur(&mut buf, width, height, 2).unwrap();
    let img = Image::new_copy(&new(), &buf, width, height).unwrap();
    assert!(img.plane(0).iter().all(|&v| v == 0));
    assert!(img.plane(2).iter().all(|&v| v == 0));
    let green = img.plane(1);
    assert!(green[4 * width + 4] > 0);
    assert_eq!(0, green[0]);
    // symmetric spread
    for d in 1..=2 {
        assert_eq!(green[4 * width + 4 - d], green[4 * width + 4 + d]);
        assert_eq!(green[(4 - d) * width + 4], green[(4 + d) * width + 4]);
        assert_eq!(green[4 * width + 4 - d], green[(4 - d) * width + 4]);
    }
}

#[test]
fn thin_images() {
    for (width, height) in [(1, 1), (1, 30), (30, 1), (2, 3)] {
        let orig = noise(width * height * 3, 42);
        for radius in [1, 3, 8] {
            let mut expected = orig.clone();
            reference_blur(&mut expected, width, height, radius.into(), true);
            let mut buf = orig.clone();
            blur(&mut buf, width, height, radius).unwrap();
            assert_eq!(expected, buf, "{width}×{height} r={radius}");
        }
    }
}

#[test]
fn interleaved_round_trip() {
    let (width, height) = (31, 20);
    let planar = noise(width * height * 3, 5);
    let attr = new();

    let rgb = Image::new_copy(&attr, &planar, width, height).unwrap().to_rgb();
    let mut img = attr.new_image_rgb(&rgb, width, height).unwrap();
    assert_eq!(&planar[..], img.as_slice());
    attr.blur(&mut img, 3).unwrap();

    let mut expected = planar.clone();
    blur(&mut expected, width, height, 3).unwrap();
    assert_eq!(&expected[..], img.as_slice());

    let out = img.to_rgb();
    lodepng::encode24_file(std::env::temp_dir().join("binoblur-noise-r3.png"), &out, width, height).unwrap();
}
