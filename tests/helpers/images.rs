// ABOUTME: Synthetic image payloads for upload tests
// ABOUTME: Encodes small solid-color images with the image crate

#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

fn encode(width: u32, height: u32, color: [u8; 3], format: ImageFormat) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)));
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, format)
        .expect("Failed to encode synthetic image");
    out.into_inner()
}

/// A small valid PNG
pub fn png(color: [u8; 3]) -> Vec<u8> {
    encode(8, 8, color, ImageFormat::Png)
}

/// A small valid JPEG
pub fn jpeg(color: [u8; 3]) -> Vec<u8> {
    encode(8, 8, color, ImageFormat::Jpeg)
}

/// A PNG filled with pseudo-random pixels, which defeats compression
pub fn noisy_png(width: u32, height: u32) -> Vec<u8> {
    let mut state: u32 = 0x9E37_79B9;
    let image = RgbImage::from_fn(width, height, |_, _| {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        Rgb([state as u8, (state >> 8) as u8, (state >> 16) as u8])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut out, ImageFormat::Png)
        .expect("Failed to encode synthetic image");
    out.into_inner()
}
