//! Hardcoded critter geometry, in normalized device coordinates.

use critter_engine::render::{MeshData, Position};

pub const HEAD_POSITIONS: [Position; 4] = [
    [0.2, 0.8, 0.0],
    [0.2, 0.45, 0.0],
    [-0.2, 0.45, 0.0],
    [-0.2, 0.8, 0.0],
];

/// Two triangles sharing the 1-3 diagonal.
pub const HEAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// Drawn without an index buffer: two triangles spelled out.
pub const BODY_POSITIONS: [Position; 6] = [
    [-0.3, 0.4, 0.0],
    [0.3, 0.4, 0.0],
    [0.3, -0.3, 0.0],
    [-0.3, 0.4, 0.0],
    [0.3, -0.3, 0.0],
    [-0.3, -0.3, 0.0],
];

pub const LEG_POSITIONS: [Position; 8] = [
    // left leg
    [-0.1, -0.35, 0.0],
    [-0.1, -0.85, 0.0],
    [-0.25, -0.85, 0.0],
    [-0.25, -0.35, 0.0],
    // right leg
    [0.25, -0.35, 0.0],
    [0.25, -0.85, 0.0],
    [0.1, -0.85, 0.0],
    [0.1, -0.35, 0.0],
];

pub const LEG_INDICES: [u32; 12] = [
    0, 1, 3, 1, 2, 3, //
    4, 5, 7, 5, 6, 7,
];

/// Head, body, legs, in draw order.
pub const CRITTER: [MeshData<'static>; 3] = [
    MeshData::indexed("head", &HEAD_POSITIONS, &HEAD_INDICES),
    MeshData::direct("body", &BODY_POSITIONS),
    MeshData::indexed("legs", &LEG_POSITIONS, &LEG_INDICES),
];
