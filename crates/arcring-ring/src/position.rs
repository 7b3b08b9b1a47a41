//! Angular positions on the ring.
//!
//! The ring is a circle of [`RING_DEGREES`] whole degrees. Positions are
//! integers in `[0, 360)`; moving clockwise increases the position until it
//! wraps from 359 back to 0.

use rand::Rng;

use crate::error::{Result, RingError};

/// Circumference of the ring in degrees.
pub const RING_DEGREES: u16 = 360;

/// A point on the ring, in whole degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u16", into = "u16"))]
pub struct RingPosition(u16);

impl RingPosition {
    /// The top of the ring.
    pub const ZERO: Self = Self(0);

    /// The largest representable position.
    pub const MAX: Self = Self(RING_DEGREES - 1);

    /// Create a position, rejecting values outside `[0, 360)`.
    pub fn new(degrees: u32) -> Result<Self> {
        if degrees < u32::from(RING_DEGREES) {
            Ok(Self(degrees as u16))
        } else {
            Err(RingError::PositionOutOfRange(degrees))
        }
    }

    /// Create a position by reducing any value modulo 360.
    #[inline]
    pub const fn wrapping(degrees: u64) -> Self {
        Self((degrees % RING_DEGREES as u64) as u16)
    }

    /// Draw a uniformly random position.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(0..RING_DEGREES))
    }

    /// Place arbitrary bytes on the ring.
    ///
    /// Hashes with Blake3 and reduces the first eight bytes
    /// (little-endian) modulo 360.
    pub fn from_bytes(data: &[u8]) -> Self {
        let hash = blake3::hash(data);
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&hash.as_bytes()[..8]);
        Self::wrapping(u64::from_le_bytes(prefix))
    }

    /// Raw degree value.
    #[inline]
    pub const fn degrees(&self) -> u16 {
        self.0
    }

    /// Degrees travelled moving clockwise from `self` to `other`.
    ///
    /// Zero when the positions coincide, never 360.
    #[inline]
    pub const fn clockwise_to(&self, other: Self) -> u16 {
        (other.0 + RING_DEGREES - self.0) % RING_DEGREES
    }
}

impl TryFrom<u16> for RingPosition {
    type Error = RingError;

    fn try_from(degrees: u16) -> Result<Self> {
        Self::new(u32::from(degrees))
    }
}

impl From<RingPosition> for u16 {
    fn from(position: RingPosition) -> Self {
        position.0
    }
}

impl std::fmt::Display for RingPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(RingPosition::new(0).unwrap(), RingPosition::ZERO);
        assert_eq!(RingPosition::new(359).unwrap(), RingPosition::MAX);
        assert_eq!(RingPosition::new(360), Err(RingError::PositionOutOfRange(360)));
        assert!(RingPosition::try_from(1000u16).is_err());
    }

    #[test]
    fn wrapping_reduces_modulo() {
        assert_eq!(RingPosition::wrapping(360).degrees(), 0);
        assert_eq!(RingPosition::wrapping(725).degrees(), 5);
        assert_eq!(RingPosition::wrapping(u64::MAX).degrees(), (u64::MAX % 360) as u16);
    }

    #[test]
    fn clockwise_distance_wraps() {
        let a = RingPosition::wrapping(350);
        let b = RingPosition::wrapping(10);

        assert_eq!(a.clockwise_to(b), 20);
        assert_eq!(b.clockwise_to(a), 340);
        assert_eq!(a.clockwise_to(a), 0);
    }

    #[test]
    fn random_positions_stay_on_ring() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            assert!(RingPosition::random(&mut rng).degrees() < RING_DEGREES);
        }
    }

    #[test]
    fn random_is_reproducible_under_seed() {
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        for _ in 0..16 {
            assert_eq!(RingPosition::random(&mut a), RingPosition::random(&mut b));
        }
    }

    #[test]
    fn hashed_placement_is_deterministic() {
        let first = RingPosition::from_bytes(b"user:42");
        assert_eq!(first, RingPosition::from_bytes(b"user:42"));
        assert!(first.degrees() < RING_DEGREES);
    }

    #[test]
    fn display_uses_degrees() {
        assert_eq!(RingPosition::wrapping(120).to_string(), "120°");
    }
}
