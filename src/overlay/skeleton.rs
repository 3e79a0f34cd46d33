//! Hand skeleton rasterization
//!
//! Draws connector lines and landmark markers for the 21-point hand topology
//! directly into an RGBA buffer.

use crate::detect::HandLandmarks;

/// Landmark index pairs joined by connector lines: four bones per finger
/// chain plus the palm arc between finger bases.
pub const HAND_CONNECTIONS: &[(usize, usize)] = &[
    // Thumb
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    // Index finger
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    // Middle finger
    (0, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    // Ring finger
    (0, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    // Pinky
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
    // Palm
    (5, 9),
    (9, 13),
    (13, 17),
];

pub const CONNECTOR_COLOR: [u8; 4] = [0, 255, 0, 255];
pub const LANDMARK_COLOR: [u8; 4] = [255, 0, 0, 255];
pub const CONNECTOR_THICKNESS: i32 = 5;
pub const LANDMARK_RADIUS: i32 = 4;

/// Draw one hand's skeleton over an RGBA buffer
///
/// Landmark coordinates are normalized to `[0, 1]` and scaled to the buffer's
/// pixel space here.
pub fn draw_hand(buffer: &mut [u8], width: u32, height: u32, hand: &HandLandmarks) {
    let pixels: Vec<(f32, f32)> = hand
        .points
        .iter()
        .map(|p| (p.x * width as f32, p.y * height as f32))
        .collect();

    for &(a, b) in HAND_CONNECTIONS {
        if let (Some(&from), Some(&to)) = (pixels.get(a), pixels.get(b)) {
            draw_line(
                buffer,
                width,
                height,
                from,
                to,
                CONNECTOR_COLOR,
                CONNECTOR_THICKNESS,
            );
        }
    }

    for &(x, y) in &pixels {
        put_disc(
            buffer,
            width,
            height,
            x.round() as i32,
            y.round() as i32,
            LANDMARK_RADIUS,
            LANDMARK_COLOR,
        );
    }
}

fn draw_line(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    from: (f32, f32),
    to: (f32, f32),
    color: [u8; 4],
    thickness: i32,
) {
    let (mut x, mut y) = (from.0.round() as i32, from.1.round() as i32);
    let (end_x, end_y) = (to.0.round() as i32, to.1.round() as i32);
    let radius = (thickness.max(1) - 1) / 2;

    let dx = (end_x - x).abs();
    let dy = -(end_y - y).abs();
    let step_x = if x < end_x { 1 } else { -1 };
    let step_y = if y < end_y { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        put_disc(buffer, width, height, x, y, radius, color);
        if x == end_x && y == end_y {
            break;
        }
        let doubled = 2 * err;
        if doubled >= dy {
            err += dy;
            x += step_x;
        }
        if doubled <= dx {
            err += dx;
            y += step_y;
        }
    }
}

fn put_disc(buffer: &mut [u8], width: u32, height: u32, cx: i32, cy: i32, radius: i32, color: [u8; 4]) {
    if radius <= 0 {
        put_pixel(buffer, width, height, cx, cy, color);
        return;
    }
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel(buffer, width, height, cx + dx, cy + dy, color);
            }
        }
    }
}

fn put_pixel(buffer: &mut [u8], width: u32, height: u32, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x >= width || y >= height {
        return;
    }
    let idx = ((y * width + x) as usize) * 4;
    if idx + 4 <= buffer.len() {
        buffer[idx..idx + 4].copy_from_slice(&color);
    }
}
