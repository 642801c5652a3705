use super::*;

use image::Rgba;

#[test]
fn zero_radius_is_identity() {
    let img = RgbaImage::from_pixel(8, 8, Rgba([10, 200, 30, 255]));
    assert_eq!(gaussian_blur(&img, 0), img);
}

#[test]
fn uniform_image_is_a_fixed_point() {
    let img = RgbaImage::from_pixel(16, 16, Rgba([90, 120, 200, 255]));
    let blurred = gaussian_blur(&img, 3);
    for px in blurred.pixels() {
        for c in 0..4 {
            assert!((px.0[c] as i32 - img.get_pixel(0, 0).0[c] as i32).abs() <= 1);
        }
    }
}

#[test]
fn impulse_spreads_to_neighbors() {
    let mut img = RgbaImage::from_pixel(31, 31, Rgba([0, 0, 0, 255]));
    img.put_pixel(15, 15, Rgba([255, 255, 255, 255]));
    let blurred = gaussian_blur(&img, 3);

    let center = blurred.get_pixel(15, 15).0[0];
    assert!(center < 255);
    assert!(blurred.get_pixel(17, 15).0[0] > 0);
    assert!(blurred.get_pixel(15, 18).0[0] > 0);
    // Symmetric around the impulse.
    assert_eq!(blurred.get_pixel(13, 15).0[0], blurred.get_pixel(17, 15).0[0]);
    assert_eq!(blurred.get_pixel(15, 12).0[0], blurred.get_pixel(15, 18).0[0]);
}
