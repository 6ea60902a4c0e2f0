use thiserror::Error;

const NONCE_NOT_FIXED: &str =
    "R-point encoding not 0x58666... Signature R must be the base point so the secret key leaks";
const MALFORMED_SIGNATURE: &str = "Signature blob must be 2-byte length 64 followed by 64 bytes";
const MALFORMED_PUBLIC_KEY: &str = "Public key blob must be 2-byte length 32 followed by 32 bytes";
const VERIFICATION_FAILED: &str = "Signature verification failed";
const ALREADY_DISBURSED: &str = "Swap funds have already been disbursed";

/// Every way a swap call can be rejected. Returning one of these from a
/// `#[handle_result]` method aborts the receipt, so no state is written.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LeakSwapError {
    /// Caller is not the party the action is reserved for.
    #[error("{0}")]
    Unauthorized(&'static str),
    /// Action invoked outside of its time/flag window.
    #[error("{0}")]
    PhaseViolation(&'static str),
    /// The first 34 bytes of the signature blob are not the fixed nonce prefix.
    #[error("{}", NONCE_NOT_FIXED)]
    NonceNotFixed,
    #[error("{}", MALFORMED_SIGNATURE)]
    MalformedSignature,
    #[error("{}", MALFORMED_PUBLIC_KEY)]
    MalformedPublicKey,
    /// Layout is fine but the Ed25519 equation does not hold.
    #[error("{}", VERIFICATION_FAILED)]
    VerificationFailed,
    #[error("{0}")]
    InvalidTimestamps(&'static str),
    #[error("{}", ALREADY_DISBURSED)]
    AlreadyDisbursed,
}

// Makes the error a `near_sdk::FunctionError`, which panics with this text.
impl AsRef<str> for LeakSwapError {
    fn as_ref(&self) -> &str {
        match self {
            Self::Unauthorized(msg) | Self::PhaseViolation(msg) | Self::InvalidTimestamps(msg) => {
                msg
            }
            Self::NonceNotFixed => NONCE_NOT_FIXED,
            Self::MalformedSignature => MALFORMED_SIGNATURE,
            Self::MalformedPublicKey => MALFORMED_PUBLIC_KEY,
            Self::VerificationFailed => VERIFICATION_FAILED,
            Self::AlreadyDisbursed => ALREADY_DISBURSED,
        }
    }
}
