use serde::{Deserialize, Serialize};

/// Landmark count produced per hand by the detector
pub const LANDMARKS_PER_HAND: usize = 21;

/// Coordinates serialized per landmark point
///
/// The classifier's input width is keyed to this: it accepts one or two hands
/// of 21 points at 3 coordinates each. Changing this constant changes the
/// wire contract and must move in lockstep with the inference service.
pub const COORDS_PER_POINT: usize = 3;

/// One landmark in normalized frame coordinates
///
/// `x` and `y` are in `[0, 1]` relative to frame width and height; `z` is
/// the detector's relative depth estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl LandmarkPoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Ordered landmark list for a single detected hand
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HandLandmarks {
    pub points: Vec<LandmarkPoint>,
}

impl HandLandmarks {
    pub fn new(points: Vec<LandmarkPoint>) -> Self {
        Self { points }
    }
}

/// Output of one detection pass over a single frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Hands in the order the detector reported them
    pub hands: Vec<HandLandmarks>,
}

impl DetectionResult {
    pub fn new(hands: Vec<HandLandmarks>) -> Self {
        Self { hands }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_hands(&self) -> bool {
        self.hands.iter().any(|hand| !hand.points.is_empty())
    }

    pub fn hand_count(&self) -> usize {
        self.hands.len()
    }
}

/// Flatten a detection result into the classifier's input vector
///
/// Hands in detected order, points in landmark order, `x, y, z` per point.
pub fn flatten_landmarks(result: &DetectionResult) -> Vec<f32> {
    let mut flat = Vec::with_capacity(result.hands.len() * LANDMARKS_PER_HAND * COORDS_PER_POINT);
    for hand in &result.hands {
        for point in &hand.points {
            flat.push(point.x);
            flat.push(point.y);
            flat.push(point.z);
        }
    }
    flat
}
