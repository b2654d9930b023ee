//! Canonical engine settings used across tests.

use crate::application::{
    EmptyWinningSide, EngineSettings, ResolutionPolicy, StaleValuePolicy, TieBreak,
};

/// Default settings: 150 bp fee, ties to YES, forfeit, fail on stale values.
pub fn settings() -> EngineSettings {
    EngineSettings::default()
}

/// Default policy with a different fee.
pub fn with_fee(fee_bps: u32) -> EngineSettings {
    EngineSettings {
        fee_bps,
        ..EngineSettings::default()
    }
}

/// Settings with an explicit resolution policy and the default fee.
pub fn with_policy(policy: ResolutionPolicy) -> EngineSettings {
    EngineSettings {
        resolution: policy,
        ..EngineSettings::default()
    }
}

/// Refund stakes when nobody holds the winning side.
pub fn refund_policy() -> ResolutionPolicy {
    ResolutionPolicy {
        empty_winning_side: EmptyWinningSide::Refund,
        ..ResolutionPolicy::default()
    }
}

/// Resolve ties to NO.
pub fn ties_to_no() -> ResolutionPolicy {
    ResolutionPolicy {
        tie_break: TieBreak::No,
        ..ResolutionPolicy::default()
    }
}

/// Void markets whose value stays unavailable `grace_secs` past the deadline.
pub fn void_after(grace_secs: u64) -> ResolutionPolicy {
    ResolutionPolicy {
        stale_value: StaleValuePolicy::Void { grace_secs },
        ..ResolutionPolicy::default()
    }
}
