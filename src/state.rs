use near_sdk::{env, near, AccountId};

use crate::errors::LeakSwapError;

const NANOS_IN_SEC: u64 = 1_000_000_000;

/// Current block time in unix seconds, the unit `t0`/`t1` are given in.
pub fn now_seconds() -> u64 {
    env::block_timestamp() / NANOS_IN_SEC
}

/// Ali holds NEAR and wants the foreign asset; Xin holds the foreign asset.
#[near(serializers = [json, borsh])]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Ali,
    Xin,
}

#[near(serializers = [json, borsh])]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Party {
    pub account_id: AccountId,
    // Length-prefixed blob exactly as supplied at creation
    pub foreign_public_key: Vec<u8>,
}

/// Ordered by priority of derivation, see [`SwapState::current_phase`].
#[near(serializers = [json, borsh])]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    AwaitingConfirmation,
    ReadyExplicit,
    ReadyByTimeout,
    PunishWindow,
}

impl Phase {
    /// Numeric code exposed by `get_contract_state`.
    pub fn code(self) -> u64 {
        match self {
            Phase::AwaitingConfirmation => 0,
            Phase::ReadyExplicit => 1,
            Phase::ReadyByTimeout => 2,
            Phase::PunishWindow => 3,
        }
    }

    pub fn is_ready(self) -> bool {
        matches!(self, Phase::ReadyExplicit | Phase::ReadyByTimeout)
    }
}

/// All parameters of the swap. Only `ready` and `disbursed` ever change
/// after creation.
#[near(serializers = [json, borsh])]
#[derive(Clone, Debug)]
pub struct SwapState {
    pub ali: Party,
    pub xin: Party,
    pub t0: u64,
    pub t1: u64,
    pub ready: bool,
    pub domain_separator: Vec<u8>,
    pub disbursed: bool,
}

impl SwapState {
    /// Validates the timestamp ordering against `created_at` and builds the
    /// initial state.
    pub fn new(
        ali: Party,
        xin: Party,
        t0: u64,
        t1: u64,
        created_at: u64,
        domain_separator: Vec<u8>,
    ) -> Result<Self, LeakSwapError> {
        if t0 <= created_at {
            return Err(LeakSwapError::InvalidTimestamps("t0 must be in the future"));
        }
        if t1 <= t0 {
            return Err(LeakSwapError::InvalidTimestamps("t1 must be greater than t0"));
        }
        Ok(Self {
            ali,
            xin,
            t0,
            t1,
            ready: false,
            domain_separator,
            disbursed: false,
        })
    }

    pub fn party(&self, role: Role) -> &Party {
        match role {
            Role::Ali => &self.ali,
            Role::Xin => &self.xin,
        }
    }

    /// The t1 check comes first: a ready flag must never shadow the punish
    /// window.
    pub fn current_phase(&self, now: u64) -> Phase {
        if now > self.t1 {
            Phase::PunishWindow
        } else if self.ready {
            Phase::ReadyExplicit
        } else if now > self.t0 {
            Phase::ReadyByTimeout
        } else {
            Phase::AwaitingConfirmation
        }
    }

    /// One-way flip, allowed at any time but only for Ali.
    pub fn set_ready(&mut self, caller: &AccountId) -> Result<(), LeakSwapError> {
        if *caller != self.ali.account_id {
            return Err(LeakSwapError::Unauthorized(
                "Only Ali can set the contract to ready",
            ));
        }
        self.ready = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use near_sdk::test_utils::accounts;

    fn party(index: usize) -> Party {
        Party {
            account_id: accounts(index),
            foreign_public_key: vec![0, 32],
        }
    }

    fn swap() -> SwapState {
        SwapState::new(party(0), party(1), 100, 200, 10, b"swap.near".to_vec()).unwrap()
    }

    #[test]
    fn rejects_bad_timestamps() {
        assert!(matches!(
            SwapState::new(party(0), party(1), 10, 200, 10, vec![]),
            Err(LeakSwapError::InvalidTimestamps(_))
        ));
        assert!(matches!(
            SwapState::new(party(0), party(1), 100, 100, 10, vec![]),
            Err(LeakSwapError::InvalidTimestamps(_))
        ));
    }

    #[test]
    fn starts_awaiting_confirmation() {
        let swap = swap();
        assert!(!swap.ready);
        assert!(!swap.disbursed);
        assert_eq!(swap.current_phase(10), Phase::AwaitingConfirmation);
        assert_eq!(swap.current_phase(100), Phase::AwaitingConfirmation);
    }

    #[test]
    fn phase_boundaries() {
        let mut swap = swap();
        assert_eq!(swap.current_phase(101), Phase::ReadyByTimeout);
        assert_eq!(swap.current_phase(200), Phase::ReadyByTimeout);
        assert_eq!(swap.current_phase(201), Phase::PunishWindow);

        swap.set_ready(&accounts(0)).unwrap();
        assert_eq!(swap.current_phase(50), Phase::ReadyExplicit);
        assert_eq!(swap.current_phase(150), Phase::ReadyExplicit);
        assert_eq!(swap.current_phase(200), Phase::ReadyExplicit);
    }

    #[test]
    fn punish_window_wins_over_ready_flag() {
        let mut swap = swap();
        swap.set_ready(&accounts(0)).unwrap();
        for now in [201, 250, u64::MAX] {
            assert_eq!(swap.current_phase(now), Phase::PunishWindow);
        }
    }

    #[test]
    fn only_ali_sets_ready() {
        let mut swap = swap();
        assert!(matches!(
            swap.set_ready(&accounts(1)),
            Err(LeakSwapError::Unauthorized(_))
        ));
        assert!(swap.set_ready(&accounts(2)).is_err());
        assert!(!swap.ready);

        swap.set_ready(&accounts(0)).unwrap();
        swap.set_ready(&accounts(0)).unwrap();
        assert!(swap.ready);
    }

    #[test]
    fn phase_codes() {
        assert_eq!(Phase::AwaitingConfirmation.code(), 0);
        assert_eq!(Phase::ReadyExplicit.code(), 1);
        assert_eq!(Phase::ReadyByTimeout.code(), 2);
        assert_eq!(Phase::PunishWindow.code(), 3);
    }

    #[test]
    fn resolves_parties_by_role() {
        let swap = swap();
        assert_eq!(swap.party(Role::Ali).account_id, accounts(0));
        assert_eq!(swap.party(Role::Xin).account_id, accounts(1));
    }
}
