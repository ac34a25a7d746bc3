//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that can be rendered
//! independently and in parallel using rayon.

use crate::integrator::RadianceSample;
use crate::Sampler;
use tern_math::Vec2;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self { x, y, width, height, index }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 16;

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Buckets closer to the center come first so the most important part of
/// the image converges earliest.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    debug_assert!(bucket_size > 0);
    let mut buckets = Vec::new();
    let mut index = 0;

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, index));
            index += 1;
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_spiral(&mut buckets, width, height);

    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    let distance = |b: &Bucket| {
        let bx = b.x as f32 + b.width as f32 / 2.0;
        let by = b.y as f32 + b.height as f32 / 2.0;
        (bx - center_x).powi(2) + (by - center_y).powi(2)
    };

    buckets.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

/// Take `samples_per_pixel` jittered samples for every pixel of a bucket.
///
/// `per_sample` receives film coordinates in `[0, 1]²`. Returns per-pixel
/// sums in row-major order within the bucket.
pub fn render_bucket<F>(
    bucket: &Bucket,
    image_width: u32,
    image_height: u32,
    samples_per_pixel: u32,
    sampler: &mut Sampler,
    per_sample: &F,
) -> BucketResult
where
    F: Fn(Vec2, &mut Sampler) -> RadianceSample + ?Sized,
{
    let inv_size = Vec2::new(1.0 / image_width as f32, 1.0 / image_height as f32);
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let pixel = Vec2::new((bucket.x + local_x) as f32, (bucket.y + local_y) as f32);
            let mut sum = RadianceSample::default();

            for _ in 0..samples_per_pixel {
                let film = (pixel + sampler.rand_vec2()) * inv_size;
                let s = per_sample(film, sampler);
                sum.radiance += s.radiance;
                sum.albedo += s.albedo;
                sum.normal += s.normal;
            }

            pixels.push(sum);
        }
    }

    BucketResult {
        bucket: *bucket,
        pixels,
        samples_per_pixel,
    }
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Per-pixel sample sums in row-major order
    pub pixels: Vec<RadianceSample>,
    /// Number of samples summed into each pixel
    pub samples_per_pixel: u32,
}
