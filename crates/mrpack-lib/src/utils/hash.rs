use sha1::{Digest, Sha1};
use sha2::Sha512;

/// Lowercase hex SHA-1 and SHA-512 digests of `bytes`.
pub fn sha1_and_sha512(bytes: &[u8]) -> (String, String) {
    let mut sha1 = Sha1::new();
    let mut sha512 = Sha512::new();
    sha1.update(bytes);
    sha512.update(bytes);

    (
        format!("{:x}", sha1.finalize()),
        format!("{:x}", sha512.finalize()),
    )
}

pub fn hashes_match(computed: &str, expected: &str) -> bool {
    computed.eq_ignore_ascii_case(expected.trim())
}
