// Battery models

use std::fmt;

use serde::{Deserialize, Serialize};

/// Estimated runtime left on battery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecondsLeft {
    Seconds(u64),
    /// Running on external power.
    Unlimited,
    Unknown,
}

impl fmt::Display for SecondsLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecondsLeft::Seconds(s) => write!(f, "{s}"),
            SecondsLeft::Unlimited => f.write_str("unlimited"),
            SecondsLeft::Unknown => f.write_str("unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryReading {
    pub percent: f64,
    pub secs_left: SecondsLeft,
    pub power_plugged: bool,
}

impl fmt::Display for BatteryReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Battery {:.0}% secsleft={} is_plugged={}>",
            self.percent, self.secs_left, self.power_plugged
        )
    }
}
