//! Timer index enumeration and table (spec §6 "Timers").
//!
//! All values are in milliseconds; `-1` disables a timer, matching the
//! source engine's convention exactly (spec §3 "Controller ... current
//! timer table (index -> milliseconds, -1 = disabled)").

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerIndex {
    N200,
    N202,
    K,
    T200,
    T201,
    T202,
    T203,
    T300,
    T301,
    T302,
    T303,
    T304,
    T305,
    T306,
    T307,
    T308,
    T309,
    T310,
    T312,
    T313,
    T314,
    T316,
    T318,
    T319,
    T320,
    T321,
    T322,
    THold,
    TRetrieve,
    TResponse,
    TStatus,
    TActivate,
    TDeactivate,
    TInterrogate,
    TRetention,
    TCcbs1,
    TCcbs2,
    TCcbs3,
    TCcbs4,
    TCcbs5,
    TCcbs6,
    TCcnr2,
    TCcnr5,
    TCcnr6,
    QsigCcT1,
    QsigCcT2,
    QsigCcT3,
}

/// Value in milliseconds, or disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerValue {
    Disabled,
    Millis(u32),
}

impl TimerValue {
    pub fn millis(self) -> Option<u32> {
        match self {
            TimerValue::Disabled => None,
            TimerValue::Millis(m) => Some(m),
        }
    }

    pub fn from_raw(raw: i64) -> Self {
        if raw < 0 { TimerValue::Disabled } else { TimerValue::Millis(raw as u32) }
    }
}

/// The controller's per-index timer table, with standard Q.931 defaults.
#[derive(Debug, Clone)]
pub struct TimerTable {
    values: HashMap<TimerIndex, TimerValue>,
}

impl TimerTable {
    pub fn get(&self, idx: TimerIndex) -> TimerValue {
        self.values.get(&idx).copied().unwrap_or(TimerValue::Disabled)
    }

    /// Set a timer value. Setting it to its current value is a no-op
    /// (spec §8 "Setting a timer to its current value is a no-op") — this
    /// is naturally true here since we simply overwrite with an identical
    /// value, but callers that care about "did this actually change
    /// anything" can compare the return value.
    pub fn set(&mut self, idx: TimerIndex, value: TimerValue) -> bool {
        let changed = self.values.get(&idx).copied() != Some(value);
        self.values.insert(idx, value);
        changed
    }
}

impl Default for TimerTable {
    fn default() -> Self {
        use TimerIndex::*;
        let mut values = HashMap::new();
        values.insert(N200, TimerValue::Millis(3));
        values.insert(N202, TimerValue::Millis(3));
        values.insert(K, TimerValue::Millis(7));
        values.insert(T200, TimerValue::Millis(1000));
        values.insert(T201, TimerValue::Millis(1000));
        values.insert(T202, TimerValue::Millis(2000));
        values.insert(T203, TimerValue::Millis(10000));
        values.insert(T303, TimerValue::Millis(4000));
        values.insert(T305, TimerValue::Millis(30000));
        values.insert(T308, TimerValue::Millis(4000));
        values.insert(T309, TimerValue::Millis(6000));
        values.insert(T310, TimerValue::Millis(30000));
        values.insert(T312, TimerValue::Millis(4000 + 2000));
        values.insert(T313, TimerValue::Millis(4000));
        values.insert(THold, TimerValue::Millis(4000));
        values.insert(TRetrieve, TimerValue::Millis(4000));
        values.insert(TResponse, TimerValue::Millis(4000));
        values.insert(TStatus, TimerValue::Millis(4000));
        TimerTable { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_value_is_noop() {
        let mut t = TimerTable::default();
        let cur = t.get(TimerIndex::T303);
        assert!(!t.set(TimerIndex::T303, cur));
    }

    #[test]
    fn negative_disables() {
        assert_eq!(TimerValue::from_raw(-1), TimerValue::Disabled);
        assert_eq!(TimerValue::from_raw(0), TimerValue::Millis(0));
    }
}
