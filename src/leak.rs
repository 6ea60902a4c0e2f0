//! Off-chain side of the protocol: producing leaky signatures and recovering
//! the signer's secret scalar once one is published.
//!
//! With the nonce fixed to one, an Ed25519 signature satisfies
//! `s = 1 + c·a (mod ℓ)` where `c = SHA-512(R || A || m)`. Anyone who sees
//! `s` can therefore compute `a = (s - 1)·c⁻¹`.

use curve25519_dalek::constants::ED25519_BASEPOINT_POINT;
use curve25519_dalek::scalar::Scalar;
use sha2::{Digest, Sha512};
use thiserror::Error;

use crate::signatures::{self, NONCE_POINT, SIGNATURE_LEN};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LeakError {
    #[error("signature R is not the base point, nothing leaks")]
    NonceNotFixed,
    #[error("signature scalar is not canonical")]
    NonCanonicalScalar,
    #[error("malformed length-prefixed blob")]
    MalformedBlob,
    #[error("challenge hash reduced to zero")]
    DegenerateChallenge,
    #[error("recovered scalar does not match the public key")]
    PublicKeyMismatch,
}

/// `(scalar mod ℓ)·B`, compressed.
pub fn public_key_from_scalar(scalar: &[u8; 32]) -> [u8; 32] {
    let a = Scalar::from_bytes_mod_order(*scalar);
    (ED25519_BASEPOINT_POINT * a).compress().to_bytes()
}

fn challenge(public_key: &[u8; 32], message: &[u8]) -> Scalar {
    let mut hasher = Sha512::new();
    hasher.update(NONCE_POINT);
    hasher.update(public_key);
    hasher.update(message);
    let mut wide = [0u8; 64];
    wide.copy_from_slice(&hasher.finalize());
    Scalar::from_bytes_mod_order_wide(&wide)
}

/// Signs `message` with nonce `r = 1`. The output verifies as a normal
/// Ed25519 signature and gives away `scalar`.
pub fn leaky_sign(message: &[u8], scalar: &[u8; 32]) -> [u8; SIGNATURE_LEN] {
    let a = Scalar::from_bytes_mod_order(*scalar);
    let public_key = (ED25519_BASEPOINT_POINT * a).compress().to_bytes();
    let s = Scalar::ONE + challenge(&public_key, message) * a;

    let mut signature = [0u8; SIGNATURE_LEN];
    signature[..32].copy_from_slice(&NONCE_POINT);
    signature[32..].copy_from_slice(s.as_bytes());
    signature
}

/// Recovers the secret scalar behind a published leaky signature.
pub fn extract_secret_scalar(
    signature: &[u8; SIGNATURE_LEN],
    message: &[u8],
    public_key: &[u8; 32],
) -> Result<[u8; 32], LeakError> {
    if signature[..32] != NONCE_POINT {
        return Err(LeakError::NonceNotFixed);
    }
    let mut s_bytes = [0u8; 32];
    s_bytes.copy_from_slice(&signature[32..]);
    let s = Option::<Scalar>::from(Scalar::from_canonical_bytes(s_bytes))
        .ok_or(LeakError::NonCanonicalScalar)?;

    let c = challenge(public_key, message);
    if c == Scalar::ZERO {
        return Err(LeakError::DegenerateChallenge);
    }
    let a = (s - Scalar::ONE) * c.invert();

    if (ED25519_BASEPOINT_POINT * a).compress().to_bytes() != *public_key {
        return Err(LeakError::PublicKeyMismatch);
    }
    Ok(a.to_bytes())
}

/// Same as [`extract_secret_scalar`], over the contract's wire blobs.
pub fn extract_from_blobs(
    signature_blob: &[u8],
    public_key_blob: &[u8],
    message: &[u8],
) -> Result<[u8; 32], LeakError> {
    let signature =
        signatures::decode_signature_blob(signature_blob).map_err(|_| LeakError::MalformedBlob)?;
    let public_key = signatures::decode_public_key_blob(public_key_blob)
        .map_err(|_| LeakError::MalformedBlob)?;
    extract_secret_scalar(&signature, message, &public_key)
}
