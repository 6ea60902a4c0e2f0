use near_sdk::{bs58, env, AccountId, NearToken};

// Helper for consistent logging
pub fn log_swap_event(event: &str, actor: &AccountId, amount: NearToken) {
    env::log_str(&format!(
        "LEAKSWAP_{}: actor='{}', amount='{}'",
        event,
        actor,
        amount.as_yoctonear()
    ));
}

// Published so the counterparty can pull the leaked key straight from the logs
pub fn log_leaked_signature(event: &str, signer: &AccountId, signature_blob: &[u8]) {
    env::log_str(&format!(
        "LEAKSWAP_{}_SIGNATURE: signer='{}', signature='{}'",
        event,
        signer,
        bs58::encode(signature_blob).into_string()
    ));
}
