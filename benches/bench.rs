#![feature(test)]

extern crate test;
use test::Bencher;

use binoblur::*;

fn gradient(width: usize, height: usize) -> Vec<u8> {
    (0..3).flat_map(|c| {
        (0..height).flat_map(move |y| (0..width).map(move |x| ((x * 7 + y * 3 + c * 50) % 256) as u8))
    }).collect()
}

#[bench]
fn blur_r1(b: &mut Bencher) {
    let mut buf = gradient(1920, 1080);
    b.iter(move || {
        blur(&mut buf, 1920, 1080, 1).unwrap();
    });
}

#[bench]
fn blur_r5(b: &mut Bencher) {
    let mut buf = gradient(1920, 1080);
    b.iter(move || {
        blur(&mut buf, 1920, 1080, 5).unwrap();
    });
}

#[bench]
fn blur_r8_horizontal_first(b: &mut Bencher) {
    let mut buf = gradient(1920, 1080);
    let mut attr = new();
    attr.set_pass_order(PassOrder::HorizontalFirst);
    b.iter(move || {
        let mut img = attr.new_image(&mut buf, 1920, 1080).unwrap();
        attr.blur(&mut img, 8).unwrap();
    });
}

#[bench]
fn kernel(b: &mut Bencher) {
    b.iter(|| {
        for r in 0..=Kernel::MAX_RADIUS {
            test::black_box(Kernel::binomial(r).unwrap());
        }
    });
}
