use near_sdk::AccountId;

use crate::errors::LeakSwapError;
use crate::state::{Phase, Role, SwapState};

/// Every state-changing request the contract understands. Contract methods
/// only build one of these; all role and phase rules live in [`authorize`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SwapAction {
    SetReady,
    LeakyRefund { signature: Vec<u8> },
    LeakyClaim { signature: Vec<u8> },
    PunishRefund,
}

impl SwapAction {
    pub fn signature(&self) -> Option<&[u8]> {
        match self {
            SwapAction::LeakyRefund { signature } | SwapAction::LeakyClaim { signature } => {
                Some(signature)
            }
            _ => None,
        }
    }

    /// Tag used in event logs.
    pub fn event(&self) -> &'static str {
        match self {
            SwapAction::SetReady => "READY",
            SwapAction::LeakyRefund { .. } => "LEAKY_REFUND",
            SwapAction::LeakyClaim { .. } => "LEAKY_CLAIM",
            SwapAction::PunishRefund => "PUNISH_REFUND",
        }
    }
}

/// What an authorized action is allowed to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Authorization {
    pub phase: Phase,
    /// Whose foreign key the submitted signature must leak.
    pub leak: Option<Role>,
    /// Who receives the whole balance.
    pub payout: Option<Role>,
}

fn require_caller(
    state: &SwapState,
    caller: &AccountId,
    role: Role,
    msg: &'static str,
) -> Result<(), LeakSwapError> {
    if state.party(role).account_id == *caller {
        Ok(())
    } else {
        Err(LeakSwapError::Unauthorized(msg))
    }
}

fn require_window(ok: bool, msg: &'static str) -> Result<(), LeakSwapError> {
    if ok {
        Ok(())
    } else {
        Err(LeakSwapError::PhaseViolation(msg))
    }
}

/// Decides whether `caller` may perform `action` at `now`.
///
/// Does not verify signatures; the returned [`Authorization::leak`] says
/// which key the caller has to leak before the payout may happen.
pub fn authorize(
    state: &SwapState,
    caller: &AccountId,
    now: u64,
    action: &SwapAction,
) -> Result<Authorization, LeakSwapError> {
    let phase = state.current_phase(now);
    let granted = |leak, payout| Authorization {
        phase,
        leak,
        payout,
    };

    match action {
        SwapAction::SetReady => {
            require_caller(state, caller, Role::Ali, "Only Ali can set the contract to ready")?;
            Ok(granted(None, None))
        }
        _ if state.disbursed => Err(LeakSwapError::AlreadyDisbursed),
        SwapAction::LeakyRefund { .. } => {
            require_caller(state, caller, Role::Ali, "Only Ali can do leaky refund")?;
            require_window(now <= state.t0, "Cannot refund after t0")?;
            require_window(!state.ready, "Cannot refund after set ready")?;
            Ok(granted(Some(Role::Ali), Some(Role::Ali)))
        }
        SwapAction::LeakyClaim { .. } => {
            require_caller(state, caller, Role::Xin, "Only Xin can do leaky claim")?;
            require_window(
                phase.is_ready(),
                "Cannot claim: time must be past t0 or Ali must have set ready",
            )?;
            require_window(now <= state.t1, "Cannot claim after t1")?;
            Ok(granted(Some(Role::Xin), Some(Role::Xin)))
        }
        SwapAction::PunishRefund => {
            require_caller(state, caller, Role::Ali, "Only Ali can do punish refund")?;
            require_window(
                phase == Phase::PunishWindow,
                "Cannot punish refund before t1",
            )?;
            Ok(granted(None, Some(Role::Ali)))
        }
    }
}
