//! A hasher that hands back the integer a key writes into it, so a key type
//! decides its own hash code and therefore its bucket in a
//! [`ChainedHashMap`](crate::ChainedHashMap).

use core::hash::{BuildHasherDefault, Hasher};

/// Passes integers through unchanged.
///
/// Writes of 32 bits and wider replace the state, so a `Hash` impl should
/// write exactly one such integer. Narrower integers and byte slices (strings,
/// for example) are shifted in little-endian order, keeping the last eight bytes.
///
/// # Examples
///
/// ```
/// use core::hash::{Hash, Hasher};
/// use chainbst::hasher::PassThroughHasher;
///
/// let mut hasher = PassThroughHasher::default();
/// 0xdead_beef_u32.hash(&mut hasher);
/// assert_eq!(hasher.finish(), 0xdead_beef);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThroughHasher(u64);

impl Hasher for PassThroughHasher {
    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes.iter().rev() {
            self.0 = (self.0 << 8) | u64::from(*byte);
        }
    }

    fn write_u32(&mut self, i: u32) {
        self.0 = u64::from(i);
    }

    fn write_u64(&mut self, i: u64) {
        self.0 = i;
    }

    fn write_usize(&mut self, i: usize) {
        self.0 = i as u64;
    }

    // Signed writes keep their two's complement bits at their own width, so
    // `-1i32` hashes to `0xffff_ffff` rather than sign-extending.
    #[allow(clippy::cast_sign_loss)]
    fn write_i32(&mut self, i: i32) {
        self.write_u32(i as u32);
    }

    #[allow(clippy::cast_sign_loss)]
    fn write_i64(&mut self, i: i64) {
        self.write_u64(i as u64);
    }

    fn finish(&self) -> u64 {
        self.0
    }
}

/// Builds [`PassThroughHasher`]s for a [`ChainedHashMap`](crate::ChainedHashMap).
pub type BuildPassThroughHasher = BuildHasherDefault<PassThroughHasher>;
