//! Public identifier generation for new locations.

use crate::model::location::PublicId;
use crate::repo::RepoResult;
use uuid::Uuid;

/// URL-safe alphabet, 64 symbols so every byte maps through a 6-bit mask.
const ALPHABET: &[u8; 64] = b"_-0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const PUBLIC_ID_LEN: usize = 21;
/// Byte offsets carrying the UUID version and variant bits.
const NON_RANDOM_BYTES: [usize; 2] = [6, 8];

/// Source of unique, immutable public ids.
pub trait PublicIdGenerator {
    fn generate(&self) -> RepoResult<PublicId>;
}

impl<T: PublicIdGenerator + ?Sized> PublicIdGenerator for &T {
    fn generate(&self) -> RepoResult<PublicId> {
        (**self).generate()
    }
}

/// Generates 21-character ids from the random bits of two v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPublicIdGenerator;

impl PublicIdGenerator for RandomPublicIdGenerator {
    fn generate(&self) -> RepoResult<PublicId> {
        let id = [Uuid::new_v4(), Uuid::new_v4()]
            .iter()
            .flat_map(|uuid| {
                uuid.as_bytes()
                    .iter()
                    .enumerate()
                    .filter(|(index, _)| !NON_RANDOM_BYTES.contains(index))
                    .map(|(_, byte)| *byte)
                    .collect::<Vec<_>>()
            })
            .take(PUBLIC_ID_LEN)
            .map(|byte| char::from(ALPHABET[usize::from(byte & 0x3f)]))
            .collect();
        Ok(id)
    }
}
