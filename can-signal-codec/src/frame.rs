//! Frame buffer helpers

/// Largest payload of a classic CAN frame
pub const CLASSIC_FRAME_LEN: usize = 8;

/// Lowercase hex rendering, two digits per byte
pub fn hex_string(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Binary rendering, eight digits per byte separated by spaces
pub fn binary_string(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:08b}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// True if a payload of `len` bytes fits one classic CAN frame
pub fn is_single_frame(len: usize) -> bool {
    len <= CLASSIC_FRAME_LEN
}

/// Zero a whole frame
pub fn clear(data: &mut [u8]) {
    data.fill(0);
}
