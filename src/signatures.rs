use near_sdk::env;

use crate::errors::LeakSwapError;

/// Compressed Ed25519 base point, i.e. the nonce point `R = 1·B`.
pub const NONCE_POINT: [u8; 32] = [
    0x58, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
    0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66,
    0x66, 0x66,
];

pub const SIGNATURE_LEN: usize = 64;
pub const PUBLIC_KEY_LEN: usize = 32;
const LENGTH_FIELD_LEN: usize = 2;

pub const SIGNATURE_BLOB_LEN: usize = LENGTH_FIELD_LEN + SIGNATURE_LEN;
pub const PUBLIC_KEY_BLOB_LEN: usize = LENGTH_FIELD_LEN + PUBLIC_KEY_LEN;

/// Length field (64, big-endian) followed by the nonce point. Every leaky
/// signature blob must start with exactly these bytes.
pub const LEAKY_SIGNATURE_PREFIX: [u8; LENGTH_FIELD_LEN + 32] = leaky_prefix();

const fn leaky_prefix() -> [u8; LENGTH_FIELD_LEN + 32] {
    let mut prefix = [0u8; LENGTH_FIELD_LEN + 32];
    let len = (SIGNATURE_LEN as u16).to_be_bytes();
    prefix[0] = len[0];
    prefix[1] = len[1];
    let mut i = 0;
    while i < 32 {
        prefix[LENGTH_FIELD_LEN + i] = NONCE_POINT[i];
        i += 1;
    }
    prefix
}

/// Wraps a raw `R || S` signature into its length-prefixed wire blob.
pub fn encode_signature_blob(signature: &[u8; SIGNATURE_LEN]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(SIGNATURE_BLOB_LEN);
    blob.extend_from_slice(&(SIGNATURE_LEN as u16).to_be_bytes());
    blob.extend_from_slice(signature);
    blob
}

/// Wraps a raw Ed25519 public key into its length-prefixed wire blob.
pub fn encode_public_key_blob(public_key: &[u8; PUBLIC_KEY_LEN]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(PUBLIC_KEY_BLOB_LEN);
    blob.extend_from_slice(&(PUBLIC_KEY_LEN as u16).to_be_bytes());
    blob.extend_from_slice(public_key);
    blob
}

/// Strips the length field from a signature blob. Does not look at the nonce.
pub fn decode_signature_blob(blob: &[u8]) -> Result<[u8; SIGNATURE_LEN], LeakSwapError> {
    decode_blob(blob).ok_or(LeakSwapError::MalformedSignature)
}

/// Strips the length field from a public key blob.
pub fn decode_public_key_blob(blob: &[u8]) -> Result<[u8; PUBLIC_KEY_LEN], LeakSwapError> {
    decode_blob(blob).ok_or(LeakSwapError::MalformedPublicKey)
}

fn decode_blob<const N: usize>(blob: &[u8]) -> Option<[u8; N]> {
    if blob.len() != LENGTH_FIELD_LEN + N {
        return None;
    }
    let declared = u16::from_be_bytes([blob[0], blob[1]]) as usize;
    if declared != N {
        return None;
    }
    blob[LENGTH_FIELD_LEN..].try_into().ok()
}

/// Compares without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Checks that `signature_blob` is a valid Ed25519 signature by the key in
/// `public_key_blob` over `message`, made with the nonce fixed to one.
///
/// The nonce check is a raw byte comparison of the blob prefix. It is not
/// a decode-and-compare, so any alternative encoding of the base point is
/// refused. Publishing a signature that passes lets anyone solve
/// `s = 1 + H(R, A, m)·a` for the private scalar `a`.
pub fn check_leaky(
    signature_blob: &[u8],
    public_key_blob: &[u8],
    message: &[u8],
) -> Result<(), LeakSwapError> {
    let prefix_matches = signature_blob.len() >= LEAKY_SIGNATURE_PREFIX.len()
        && constant_time_eq(
            &signature_blob[..LEAKY_SIGNATURE_PREFIX.len()],
            &LEAKY_SIGNATURE_PREFIX,
        );
    if !prefix_matches {
        return Err(LeakSwapError::NonceNotFixed);
    }

    let signature = decode_signature_blob(signature_blob)?;
    let public_key = decode_public_key_blob(public_key_blob)?;

    if env::ed25519_verify(&signature, message, &public_key) {
        Ok(())
    } else {
        Err(LeakSwapError::VerificationFailed)
    }
}

/// Boolean form of [`check_leaky`].
pub fn verify_leaky(signature_blob: &[u8], public_key_blob: &[u8], message: &[u8]) -> bool {
    check_leaky(signature_blob, public_key_blob, message).is_ok()
}
