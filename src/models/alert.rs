use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertDirection {
    Above,
    Below,
}

impl AlertDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertDirection::Above => "above",
            AlertDirection::Below => "below",
        }
    }

    pub fn from_str(value: &str) -> Option<AlertDirection> {
        match value {
            "above" => Some(AlertDirection::Above),
            "below" => Some(AlertDirection::Below),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertMetric {
    Price,
    #[serde(rename = "percent_change_24h")]
    PercentChange24h,
}

impl AlertMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertMetric::Price => "price",
            AlertMetric::PercentChange24h => "percent_change_24h",
        }
    }

    pub fn from_str(value: &str) -> Option<AlertMetric> {
        match value {
            "price" => Some(AlertMetric::Price),
            "percent_change_24h" => Some(AlertMetric::PercentChange24h),
            _ => None,
        }
    }

    /// Notification-facing rendering of a value in this metric.
    pub fn format(&self, value: f64) -> String {
        match self {
            AlertMetric::Price => format!("${value:.2}"),
            AlertMetric::PercentChange24h => format!("{value:.2}%"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertRepeatMode {
    OnceUntilReset,
    RepeatWithCooldown,
}

impl AlertRepeatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertRepeatMode::OnceUntilReset => "once_until_reset",
            AlertRepeatMode::RepeatWithCooldown => "repeat_with_cooldown",
        }
    }

    pub fn from_str(value: &str) -> Option<AlertRepeatMode> {
        match value {
            "once_until_reset" => Some(AlertRepeatMode::OnceUntilReset),
            "repeat_with_cooldown" => Some(AlertRepeatMode::RepeatWithCooldown),
            _ => None,
        }
    }
}

/// A user-defined price or percent-change alert.
///
/// `is_armed` gates `OnceUntilReset` alerts: once triggered they stay
/// disarmed until the monitored condition is observed false again.
/// `cooldown_minutes == 0` means "use the checker default".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAlert {
    pub id: String,
    pub coin_id: String,
    pub symbol: String,
    pub name: String,
    pub target_value: f64,
    pub metric: AlertMetric,
    pub direction: AlertDirection,
    pub repeat_mode: AlertRepeatMode,
    pub cooldown_minutes: i32,
    pub is_enabled: bool,
    pub is_armed: bool,
    pub created_at: DateTime<Utc>,
    pub last_triggered_at: Option<DateTime<Utc>>,
}

/// Ephemeral per-coin view of the latest cached market row; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertMarketSnapshot {
    pub price: f64,
    pub percent_change_24h: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceAlertTrigger {
    pub alert: PriceAlert,
    pub current_value: f64,
}
