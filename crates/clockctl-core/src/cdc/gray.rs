/// Binary to reflected Gray code.
#[must_use]
pub const fn gray_encode(binary: u32) -> u32 {
    binary ^ (binary >> 1)
}

/// Reflected Gray code back to binary.
#[must_use]
pub const fn gray_decode(gray: u32) -> u32 {
    let mut binary = gray;
    let mut shift = 1;
    while shift < u32::BITS {
        binary ^= binary >> shift;
        shift <<= 1;
    }
    binary
}

/// Number of bits that differ between two words.
#[must_use]
pub const fn hamming_distance(a: u32, b: u32) -> u32 {
    (a ^ b).count_ones()
}
