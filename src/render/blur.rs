use image::RgbaImage;

/// Separable two-pass Gaussian blur with clamp-to-edge sampling.
///
/// `radius` is the standard deviation in pixels; the kernel extends three
/// deviations to each side. Operates on straight-alpha RGBA8 and blurs all
/// four channels.
pub(crate) fn gaussian_blur(src: &RgbaImage, radius: u32) -> RgbaImage {
    if radius == 0 {
        return src.clone();
    }
    let kernel = gaussian_kernel(radius);
    let (width, height) = src.dimensions();
    let mut tmp = RgbaImage::new(width, height);
    let mut out = RgbaImage::new(width, height);
    horizontal_pass(src, &mut tmp, &kernel);
    vertical_pass(&tmp, &mut out, &kernel);
    out
}

fn gaussian_kernel(radius: u32) -> Vec<f32> {
    let sigma = radius as f32;
    let half = (3 * radius) as i32;
    let denom = 2.0 * sigma * sigma;
    let mut weights = Vec::with_capacity((2 * half + 1) as usize);
    let mut sum = 0.0f32;
    for i in -half..=half {
        let x = i as f32;
        let w = (-x * x / denom).exp();
        weights.push(w);
        sum += w;
    }
    for w in &mut weights {
        *w /= sum;
    }
    weights
}

fn horizontal_pass(src: &RgbaImage, dst: &mut RgbaImage, kernel: &[f32]) {
    let (width, height) = src.dimensions();
    let half = (kernel.len() / 2) as i64;
    for y in 0..height {
        for x in 0..width {
            let mut acc = [0.0f32; 4];
            for (ki, &kw) in kernel.iter().enumerate() {
                let sx = (i64::from(x) + ki as i64 - half).clamp(0, i64::from(width) - 1) as u32;
                let px = src.get_pixel(sx, y);
                for c in 0..4 {
                    acc[c] += kw * px.0[c] as f32;
                }
            }
            let px = dst.get_pixel_mut(x, y);
            for c in 0..4 {
                px.0[c] = acc[c].round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

fn vertical_pass(src: &RgbaImage, dst: &mut RgbaImage, kernel: &[f32]) {
    let (width, height) = src.dimensions();
    let half = (kernel.len() / 2) as i64;
    for y in 0..height {
        for x in 0..width {
            let mut acc = [0.0f32; 4];
            for (ki, &kw) in kernel.iter().enumerate() {
                let sy = (i64::from(y) + ki as i64 - half).clamp(0, i64::from(height) - 1) as u32;
                let px = src.get_pixel(x, sy);
                for c in 0..4 {
                    acc[c] += kw * px.0[c] as f32;
                }
            }
            let px = dst.get_pixel_mut(x, y);
            for c in 0..4 {
                px.0[c] = acc[c].round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
