use near_sdk::json_types::Base64VecU8;
use near_sdk::{
    bs58, env, ext_contract, log, near, AccountId, NearToken, PanicOnDefault, Promise,
    PromiseError,
};

mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod leak;
mod policy;
mod signatures;
mod state;
mod utils;

pub use errors::LeakSwapError;
pub use policy::SwapAction;
pub use signatures::{
    encode_public_key_blob, encode_signature_blob, verify_leaky, LEAKY_SIGNATURE_PREFIX,
    NONCE_POINT,
};
pub use state::{Party, Phase, Role, SwapState};

use state::now_seconds;
use utils::{log_leaked_signature, log_swap_event};

#[ext_contract(ext_self)]
pub trait SelfCallbacks {
    fn on_disbursed(&mut self, recipient: AccountId, amount: NearToken);
}

/// One deployed account is one swap. The account balance is the locked value.
#[near(contract_state)]
#[derive(PanicOnDefault)]
pub struct LeakSwap {
    pub swap: SwapState,
}

/// Read model returned by `get_swap`.
#[near(serializers = [json])]
pub struct SwapView {
    pub ali: AccountId,
    pub ali_foreign_pk: Base64VecU8,
    pub xin: AccountId,
    pub xin_foreign_pk: Base64VecU8,
    pub t0: u64,
    pub t1: u64,
    pub ready: bool,
    pub disbursed: bool,
    pub phase: Phase,
    pub domain_separator: Base64VecU8,
}

#[near]
impl LeakSwap {
    /// Sets up the swap. Timestamps are unix seconds; public keys are the
    /// length-prefixed blobs (`0x0020 || key`). Any attached deposit becomes
    /// part of the swapped balance.
    #[init]
    #[payable]
    #[handle_result]
    pub fn create(
        ali: AccountId,
        ali_foreign_pk: Base64VecU8,
        xin: AccountId,
        xin_foreign_pk: Base64VecU8,
        t0: u64,
        t1: u64,
    ) -> Result<Self, LeakSwapError> {
        let swap = SwapState::new(
            Party {
                account_id: ali,
                foreign_public_key: ali_foreign_pk.0,
            },
            Party {
                account_id: xin,
                foreign_public_key: xin_foreign_pk.0,
            },
            t0,
            t1,
            now_seconds(),
            env::current_account_id().as_str().as_bytes().to_vec(),
        )?;

        log_swap_event("CREATED", &swap.ali.account_id, env::attached_deposit());
        Ok(Self { swap })
    }

    /// Ali confirms that Xin has locked the foreign funds.
    /// (If Ali never does, the swap is ready anyway once t0 passes.)
    #[handle_result]
    pub fn set_ready(&mut self) -> Result<(), LeakSwapError> {
        self.execute(SwapAction::SetReady).map(|_| ())
    }

    /// 0 = awaiting confirmation, 1 = ready (explicit), 2 = ready (t0 passed),
    /// 3 = punish window (t1 passed).
    pub fn get_contract_state(&self) -> u64 {
        self.swap.current_phase(now_seconds()).code()
    }

    /// Ali takes her funds back before the swap is ready, leaking her
    /// foreign key in case Xin locked funds in the meantime.
    #[handle_result]
    pub fn leaky_refund(&mut self, signature: Base64VecU8) -> Result<Promise, LeakSwapError> {
        self.execute_payout(SwapAction::LeakyRefund {
            signature: signature.0,
        })
    }

    /// Xin claims the balance once the swap is ready, leaking the foreign
    /// key that lets Ali take the foreign funds.
    #[handle_result]
    pub fn leaky_claim(&mut self, signature: Base64VecU8) -> Result<Promise, LeakSwapError> {
        self.execute_payout(SwapAction::LeakyClaim {
            signature: signature.0,
        })
    }

    /// Xin did not claim before t1: Ali takes everything without leaking.
    #[handle_result]
    pub fn punish_refund(&mut self) -> Result<Promise, LeakSwapError> {
        self.execute_payout(SwapAction::PunishRefund)
    }

    pub fn get_swap(&self) -> SwapView {
        let swap = &self.swap;
        SwapView {
            ali: swap.ali.account_id.clone(),
            ali_foreign_pk: Base64VecU8(swap.ali.foreign_public_key.clone()),
            xin: swap.xin.account_id.clone(),
            xin_foreign_pk: Base64VecU8(swap.xin.foreign_public_key.clone()),
            t0: swap.t0,
            t1: swap.t1,
            ready: swap.ready,
            disbursed: swap.disbursed,
            phase: swap.current_phase(now_seconds()),
            domain_separator: Base64VecU8(swap.domain_separator.clone()),
        }
    }

    /// Dry run of the leak check against `party`'s key, for tooling that
    /// wants to validate a blob before submitting it.
    pub fn check_leaky_signature(&self, party: Role, signature: Base64VecU8) -> bool {
        verify_leaky(
            &signature.0,
            &self.swap.party(party).foreign_public_key,
            &self.swap.domain_separator,
        )
    }

    // --- PRIVATE CALLBACKS ---
    #[private]
    pub fn on_disbursed(
        &mut self,
        #[callback_result] result: Result<(), PromiseError>,
        recipient: AccountId,
        amount: NearToken,
    ) {
        if result.is_ok() {
            env::log_str(&format!(
                "LEAKSWAP_SETTLED: recipient='{}', amount='{}', swap='{}'",
                recipient,
                amount.as_yoctonear(),
                bs58::encode(&self.swap.domain_separator).into_string()
            ));
        } else {
            // The runtime refunds a failed transfer, so the swap can pay out again.
            self.swap.disbursed = false;
            log!(
                "LEAKSWAP_SETTLEMENT_FAILED: transfer to {} failed, swap re-opened",
                recipient
            );
        }
    }
}

impl LeakSwap {
    /// Single entry point for every state-changing action: authorize, check
    /// the leak if one is required, then apply.
    fn execute(&mut self, action: SwapAction) -> Result<Option<Promise>, LeakSwapError> {
        let caller = env::predecessor_account_id();
        let auth = policy::authorize(&self.swap, &caller, now_seconds(), &action)?;

        if let Some(role) = auth.leak {
            let signature = action.signature().unwrap_or_default();
            signatures::check_leaky(
                signature,
                &self.swap.party(role).foreign_public_key,
                &self.swap.domain_separator,
            )?;
            log_leaked_signature(action.event(), &caller, signature);
        }

        if action == SwapAction::SetReady {
            self.swap.set_ready(&caller)?;
            log_swap_event(action.event(), &caller, NearToken::from_yoctonear(0));
        }

        Ok(auth.payout.map(|role| self.disburse(action.event(), role)))
    }

    fn execute_payout(&mut self, action: SwapAction) -> Result<Promise, LeakSwapError> {
        self.execute(action)?
            .ok_or(LeakSwapError::PhaseViolation("Action does not pay out"))
    }

    /// Sends everything not needed for storage to the recipient. The
    /// `disbursed` flag stays set unless the transfer callback reports failure.
    fn disburse(&mut self, event: &str, role: Role) -> Promise {
        self.swap.disbursed = true;

        let recipient = self.swap.party(role).account_id.clone();
        let storage_locked = env::storage_byte_cost().saturating_mul(env::storage_usage() as u128);
        let amount = env::account_balance().saturating_sub(storage_locked);

        log_swap_event(event, &recipient, amount);

        Promise::new(recipient.clone())
            .transfer(amount)
            .then(ext_self::ext(env::current_account_id()).on_disbursed(recipient, amount))
    }
}
