//! Visual audit overlay: pane rectangles, index labels and sample points
//!
//! Labels use a seven-segment digit renderer so no font file is needed.

use crate::types::{AnnotationConfig, PaneRect};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

/// Sample points on the initiating pane (yellow)
pub const SAMPLE_COLOR_A: Rgb<u8> = Rgb([255, 255, 0]);
/// Sample points on the neighbouring pane (blue)
pub const SAMPLE_COLOR_B: Rgb<u8> = Rgb([0, 0, 255]);

// Segment bits: a b c d e f g
const SEGMENTS: [u8; 10] = [
    0b1111110, // 0
    0b0110000, // 1
    0b1101101, // 2
    0b1111001, // 3
    0b0110011, // 4
    0b1011011, // 5
    0b1011111, // 6
    0b1110000, // 7
    0b1111111, // 8
    0b1111011, // 9
];

fn fill(canvas: &mut RgbImage, x: i64, y: i64, width: i64, height: i64, color: Rgb<u8>) {
    if width <= 0 || height <= 0 {
        return;
    }
    let rect = Rect::at(x as i32, y as i32).of_size(width as u32, height as u32);
    draw_filled_rect_mut(canvas, rect, color);
}

/// Draw a rectangle outline of `thickness` centered on the box edges
pub fn draw_pane_box(canvas: &mut RgbImage, rect: &PaneRect, color: Rgb<u8>, thickness: u32) {
    if rect.is_empty() {
        return;
    }
    let t = thickness.max(1) as i64;
    let half = t / 2;
    let (x, y) = (rect.x as i64, rect.y as i64);
    let (w, h) = (rect.width as i64, rect.height as i64);

    fill(canvas, x - half, y - half, w + t, t, color);
    fill(canvas, x - half, y + h - half, w + t, t, color);
    fill(canvas, x - half, y - half, t, h + t, color);
    fill(canvas, x + w - half, y - half, t, h + t, color);
}

fn draw_digit(canvas: &mut RgbImage, digit: usize, x: i64, y: i64, height: i64, color: Rgb<u8>) {
    let w = height / 2;
    let s = (height / 10).max(1);
    let mid = height / 2;
    let segments: [(i64, i64, i64, i64); 7] = [
        (0, 0, w, s),             // a: top
        (w - s, 0, s, mid),       // b: upper right
        (w - s, mid, s, mid),     // c: lower right
        (0, height - s, w, s),    // d: bottom
        (0, mid, s, mid),         // e: lower left
        (0, 0, s, mid),           // f: upper left
        (0, mid - s / 2, w, s),   // g: middle
    ];

    let bits = SEGMENTS[digit % 10];
    for (i, &(sx, sy, sw, sh)) in segments.iter().enumerate() {
        if bits & (1 << (6 - i)) != 0 {
            fill(canvas, x + sx, y + sy, sw, sh, color);
        }
    }
}

/// Draw `index` centered on `center`
pub fn draw_label(canvas: &mut RgbImage, index: usize, center: (u32, u32), color: Rgb<u8>, height: u32) {
    let height = height.max(10) as i64;
    let digit_width = height / 2;
    let gap = (height / 5).max(1);
    let digits: Vec<usize> = index
        .to_string()
        .bytes()
        .map(|b| (b - b'0') as usize)
        .collect();

    let n = digits.len() as i64;
    let total_width = n * digit_width + (n - 1) * gap;
    let mut x = center.0 as i64 - total_width / 2;
    let y = center.1 as i64 - height / 2;
    for digit in digits {
        draw_digit(canvas, digit, x, y, height, color);
        x += digit_width + gap;
    }
}

/// Mark an evaluated pane with its outline and index
pub fn draw_pane(canvas: &mut RgbImage, index: usize, rect: &PaneRect, config: &AnnotationConfig) {
    let color = Rgb(config.color);
    draw_pane_box(canvas, rect, color, config.thickness);
    draw_label(canvas, index, rect.center(), color, config.label_height);
}

/// Draw pane-local sample points as filled circles
pub fn draw_samples(
    canvas: &mut RgbImage,
    rect: &PaneRect,
    points: &[(u32, u32)],
    color: Rgb<u8>,
    radius: u32,
) {
    for &(px, py) in points {
        let center = ((rect.x + px) as i32, (rect.y + py) as i32);
        draw_filled_circle_mut(canvas, center, radius as i32, color);
    }
}
