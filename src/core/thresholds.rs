// Author: Dustin Pilgrim
// License: MIT

use std::collections::BTreeMap;

use crate::core::status::{DurationMap, StatusKey};

/// Soft limit for a status, in seconds. Display only.
pub fn limit(status: StatusKey) -> Option<u64> {
    match status {
        StatusKey::Break => Some(20 * 60),
        StatusKey::LunchTime => Some(40 * 60),
        StatusKey::Offline => Some(16 * 60 * 60),
        StatusKey::Online | StatusKey::OnCall | StatusKey::Evaluation => None,
    }
}

/// True once the bucket is strictly past its limit.
pub fn exceeded(status: StatusKey, durations: &DurationMap) -> bool {
    limit(status).is_some_and(|max| durations.get(status) > max)
}

/// Exceeded flag for every status.
pub fn evaluate(durations: &DurationMap) -> BTreeMap<StatusKey, bool> {
    StatusKey::ALL
        .into_iter()
        .map(|s| (s, exceeded(s, durations)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(status: StatusKey, secs: u64) -> DurationMap {
        DurationMap::from([(status, secs)])
    }

    #[test]
    fn limits_are_strict() {
        for (status, max) in [
            (StatusKey::Break, 1200),
            (StatusKey::LunchTime, 2400),
            (StatusKey::Offline, 57600),
        ] {
            assert!(!exceeded(status, &at(status, max)), "{status} at limit");
            assert!(exceeded(status, &at(status, max + 1)), "{status} past limit");
        }
    }

    #[test]
    fn unlimited_statuses_never_exceed() {
        for status in [StatusKey::Online, StatusKey::OnCall, StatusKey::Evaluation] {
            assert!(!exceeded(status, &at(status, u64::MAX)));
        }
    }

    #[test]
    fn evaluate_flags_only_the_overrun_bucket() {
        let durations = DurationMap::from([(StatusKey::Break, 1500), (StatusKey::LunchTime, 100)]);
        let flags = evaluate(&durations);

        assert_eq!(flags.len(), 6);
        assert!(flags[&StatusKey::Break]);
        assert!(!flags[&StatusKey::LunchTime]);
        assert!(!flags[&StatusKey::Offline]);
    }
}
