//! Fixed face palette used by the renderer for flat-shaded meshes

/// The five grays faces are painted with, indexed by a face's color ID.
pub const GRAYSCALE_PALETTE: [[u8; 3]; 5] = [
    [0x33, 0x33, 0x33],
    [0x99, 0x99, 0x99],
    [0x66, 0x66, 0x66],
    [0xCC, 0xCC, 0xCC],
    [0x11, 0x11, 0x11],
];

/// Number of color slots in [`GRAYSCALE_PALETTE`].
pub const PALETTE_SIZE: usize = GRAYSCALE_PALETTE.len();
