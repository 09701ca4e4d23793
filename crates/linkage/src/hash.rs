//! MurmurHash3, x86 32-bit variant.
//!
//! A fast, non-cryptographic hash with good avalanche behaviour. The Bloom
//! filter derives its k hash functions by re-seeding this one hash with the
//! round number.

const C1: u32 = 0xcc9e2d51;
const C2: u32 = 0x1b873593;

/// Hash `key` with the given seed.
pub fn murmur3_32(key: &[u8], seed: u32) -> u32 {
    let mut h1 = seed;

    // body: 4-byte little endian blocks
    let mut blocks = key.chunks_exact(4);
    for block in &mut blocks {
        let k1 = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h1 ^= mix_k1(k1);
        h1 = h1.rotate_left(13);
        h1 = h1.wrapping_mul(5).wrapping_add(0xe6546b64);
    }

    // tail
    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut buf = [0u8; 4];
        buf[..tail.len()].copy_from_slice(tail);
        h1 ^= mix_k1(u32::from_le_bytes(buf));
    }

    h1 ^= key.len() as u32;
    fmix32(h1)
}

#[inline]
fn mix_k1(mut k1: u32) -> u32 {
    k1 = k1.wrapping_mul(C1);
    k1 = k1.rotate_left(15);
    k1.wrapping_mul(C2)
}

/// Finalization mix: force all bits of a hash block to avalanche.
#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^ (h >> 16)
}
