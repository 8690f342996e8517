//! Image preprocessing for text recognition
//!
//! Card scans arrive with uneven lighting and low-contrast print, so each
//! text region is enhanced before recognition: grayscale conversion,
//! tile-wise contrast-limited histogram equalization, then a global Otsu
//! binarization.

use image::{GrayImage, RgbImage};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

/// Tile grid used for local contrast enhancement (8x8 tiles)
const TILE_GRID: u32 = 8;
/// Histogram clip limit, as a multiple of the uniform bin height
const CLIP_LIMIT: f64 = 2.0;
/// Minimum tile edge; the grid shrinks on small regions so every tile
/// keeps enough pixels for a meaningful histogram
const MIN_TILE_SIZE: u32 = 16;

/// Full preprocessing pipeline: grayscale, CLAHE, Otsu binarization.
///
/// The output contains only 0 and 255 intensities.
pub fn prepare_for_recognition(region: &RgbImage) -> GrayImage {
    let gray = image::imageops::grayscale(region);
    let enhanced = clahe(&gray, TILE_GRID, CLIP_LIMIT);
    let level = otsu_level(&enhanced);
    threshold(&enhanced, level, ThresholdType::Binary)
}

/// Contrast-limited adaptive histogram equalization.
///
/// The image is partitioned into a `grid`x`grid` tile layout (fewer tiles
/// for tiny images). Each tile gets a clipped-histogram equalization
/// lookup table; per-pixel output bilinearly blends the tables of the four
/// surrounding tile centers, which avoids the blocky seams of naive
/// per-tile equalization.
pub fn clahe(image: &GrayImage, grid: u32, clip_limit: f64) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let tiles_x = grid.min(width / MIN_TILE_SIZE).max(1);
    let tiles_y = grid.min(height / MIN_TILE_SIZE).max(1);

    // Tile boundaries partition the image exactly
    let tile_x0 = |tx: u32| (tx as u64 * width as u64 / tiles_x as u64) as u32;
    let tile_y0 = |ty: u32| (ty as u64 * height as u64 / tiles_y as u64) as u32;

    // One equalization table per tile
    let mut tables: Vec<[u8; 256]> = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let (x0, x1) = (tile_x0(tx), tile_x0(tx + 1));
            let (y0, y1) = (tile_y0(ty), tile_y0(ty + 1));

            let mut histogram = [0u32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    histogram[image.get_pixel(x, y).0[0] as usize] += 1;
                }
            }

            let pixels = ((x1 - x0) * (y1 - y0)) as u32;
            tables.push(equalization_table(&mut histogram, pixels, clip_limit));
        }
    }

    let table_at = |tx: u32, ty: u32| &tables[(ty * tiles_x + tx) as usize];

    let mut output = GrayImage::new(width, height);
    for y in 0..height {
        // Position in tile-center coordinate space
        let gy = ((y as f64 + 0.5) * tiles_y as f64 / height as f64 - 0.5)
            .clamp(0.0, (tiles_y - 1) as f64);
        let ty0 = gy.floor() as u32;
        let ty1 = (ty0 + 1).min(tiles_y - 1);
        let fy = gy - ty0 as f64;

        for x in 0..width {
            let gx = ((x as f64 + 0.5) * tiles_x as f64 / width as f64 - 0.5)
                .clamp(0.0, (tiles_x - 1) as f64);
            let tx0 = gx.floor() as u32;
            let tx1 = (tx0 + 1).min(tiles_x - 1);
            let fx = gx - tx0 as f64;

            let value = image.get_pixel(x, y).0[0] as usize;
            let v00 = table_at(tx0, ty0)[value] as f64;
            let v10 = table_at(tx1, ty0)[value] as f64;
            let v01 = table_at(tx0, ty1)[value] as f64;
            let v11 = table_at(tx1, ty1)[value] as f64;

            let top = v00 * (1.0 - fx) + v10 * fx;
            let bottom = v01 * (1.0 - fx) + v11 * fx;
            let blended = top * (1.0 - fy) + bottom * fy;

            output.put_pixel(x, y, image::Luma([blended.round().clamp(0.0, 255.0) as u8]));
        }
    }

    output
}

/// Build the clipped-histogram equalization lookup table for one tile.
///
/// Bins above the clip limit are truncated and the excess is redistributed
/// evenly, which bounds how much any single intensity can be amplified.
fn equalization_table(histogram: &mut [u32; 256], pixels: u32, clip_limit: f64) -> [u8; 256] {
    let mut table = [0u8; 256];
    if pixels == 0 {
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = i as u8;
        }
        return table;
    }

    let limit = ((clip_limit * pixels as f64 / 256.0).max(1.0)) as u32;

    let mut excess: u64 = 0;
    for bin in histogram.iter_mut() {
        if *bin > limit {
            excess += u64::from(*bin - limit);
            *bin = limit;
        }
    }

    let share = (excess / 256) as u32;
    let mut remainder = (excess % 256) as usize;
    for bin in histogram.iter_mut() {
        *bin += share;
        if remainder > 0 {
            *bin += 1;
            remainder -= 1;
        }
    }

    let mut cumulative: u64 = 0;
    for (i, bin) in histogram.iter().enumerate() {
        cumulative += u64::from(*bin);
        table[i] = ((cumulative * 255) / u64::from(pixels)).min(255) as u8;
    }

    table
}
