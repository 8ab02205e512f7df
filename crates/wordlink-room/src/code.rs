//! Room code allocation.

use rand::Rng;
use wordlink_protocol::RoomCode;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a code of `len` characters from `A-Z0-9` that `in_use` rejects.
///
/// Uniqueness is only checked against the codes currently in use, so a code
/// may come back after its room is gone. The caller must hold whatever lock
/// guards the set `in_use` reads, through to inserting the new room.
pub fn allocate<R, F>(rng: &mut R, len: usize, in_use: F) -> RoomCode
where
    R: Rng + ?Sized,
    F: Fn(&RoomCode) -> bool,
{
    loop {
        let candidate: String = (0..len)
            .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
            .collect();
        let code = RoomCode::new(&candidate);
        if !in_use(&code) {
            return code;
        }
        tracing::trace!(%code, "room code collision, retrying");
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_code_has_requested_length_and_alphabet() {
        let code = allocate(&mut rand::rng(), 6, |_| false);
        assert_eq!(code.as_str().len(), 6);
        assert!(
            code.as_str()
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[test]
    fn test_skips_codes_in_use() {
        // Replay the same seed to learn the first candidate, then mark it
        // taken and check the allocator moves past it.
        let first = allocate(&mut StdRng::seed_from_u64(7), 4, |_| false);
        let second = allocate(&mut StdRng::seed_from_u64(7), 4, |c| *c == first);
        assert_ne!(first, second);
    }

    #[test]
    fn test_never_returns_an_active_code() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut active = HashSet::new();
        // Two-character codes collide constantly, which is the point.
        for _ in 0..500 {
            let code = allocate(&mut rng, 2, |c| active.contains(c));
            assert!(active.insert(code), "allocator returned an active code");
        }
    }
}
