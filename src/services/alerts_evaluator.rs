use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::models::alert::{
    AlertDirection, AlertMarketSnapshot, AlertMetric, AlertRepeatMode, PriceAlert,
    PriceAlertTrigger,
};

#[derive(Debug, Default)]
pub struct EvaluationOutcome {
    pub triggers: Vec<PriceAlertTrigger>,
    pub rearm_ids: Vec<String>,
}

/// Pure evaluation of alerts against the latest market snapshots.
///
/// `OnceUntilReset` alerts fire only while armed; once the condition is
/// observed false again they are reported for re-arming. Cooldown gates
/// every trigger; an alert-level cooldown of zero falls back to
/// `default_cooldown_minutes`.
pub struct AlertsEvaluator {
    pub default_cooldown_minutes: i32,
}

impl AlertsEvaluator {
    pub fn new(default_cooldown_minutes: i32) -> Self {
        Self {
            default_cooldown_minutes,
        }
    }

    pub fn evaluate(
        &self,
        alerts: &[PriceAlert],
        snapshots: &HashMap<String, AlertMarketSnapshot>,
        now: DateTime<Utc>,
    ) -> EvaluationOutcome {
        let mut outcome = EvaluationOutcome::default();

        for alert in alerts {
            if !alert.is_enabled {
                continue;
            }
            let Some(snapshot) = snapshots.get(&alert.coin_id) else {
                continue;
            };

            let cooldown_minutes = if alert.cooldown_minutes > 0 {
                alert.cooldown_minutes
            } else {
                self.default_cooldown_minutes
            };
            let cooldown = Duration::seconds(i64::from(cooldown_minutes) * 60);

            let current_value = match alert.metric {
                AlertMetric::Price => snapshot.price,
                AlertMetric::PercentChange24h => snapshot.percent_change_24h,
            };

            let is_beyond = match alert.direction {
                AlertDirection::Above => current_value >= alert.target_value,
                AlertDirection::Below => current_value <= alert.target_value,
            };

            let can_trigger = match alert.last_triggered_at {
                Some(last) => now.signed_duration_since(last) >= cooldown,
                None => true,
            };

            if is_beyond {
                let fires = match alert.repeat_mode {
                    AlertRepeatMode::OnceUntilReset => alert.is_armed && can_trigger,
                    AlertRepeatMode::RepeatWithCooldown => can_trigger,
                };
                if fires {
                    outcome.triggers.push(PriceAlertTrigger {
                        alert: alert.clone(),
                        current_value,
                    });
                }
            } else if !alert.is_armed {
                outcome.rearm_ids.push(alert.id.clone());
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(overrides: impl FnOnce(&mut PriceAlert)) -> PriceAlert {
        let mut alert = PriceAlert {
            id: "1".to_string(),
            coin_id: "bitcoin".to_string(),
            symbol: "BTC".to_string(),
            name: "Bitcoin".to_string(),
            target_value: 100.0,
            metric: AlertMetric::Price,
            direction: AlertDirection::Above,
            repeat_mode: AlertRepeatMode::OnceUntilReset,
            cooldown_minutes: 30,
            is_enabled: true,
            is_armed: true,
            created_at: Utc::now(),
            last_triggered_at: None,
        };
        overrides(&mut alert);
        alert
    }

    fn snapshots(price: f64, percent_change_24h: f64) -> HashMap<String, AlertMarketSnapshot> {
        HashMap::from([(
            "bitcoin".to_string(),
            AlertMarketSnapshot {
                price,
                percent_change_24h,
            },
        )])
    }

    #[test]
    fn above_price_triggers() {
        let evaluator = AlertsEvaluator::new(30);
        let outcome = evaluator.evaluate(&[alert(|_| {})], &snapshots(120.0, 3.0), Utc::now());
        assert_eq!(outcome.triggers.len(), 1);
        assert_eq!(outcome.triggers[0].current_value, 120.0);
        assert!(outcome.rearm_ids.is_empty());
    }

    #[test]
    fn below_price_triggers() {
        let evaluator = AlertsEvaluator::new(30);
        let alerts = [alert(|a| a.direction = AlertDirection::Below)];
        let outcome = evaluator.evaluate(&alerts, &snapshots(80.0, -2.0), Utc::now());
        assert_eq!(outcome.triggers.len(), 1);
    }

    #[test]
    fn cooldown_suppresses_repeat() {
        let evaluator = AlertsEvaluator::new(30);
        let alerts = [alert(|a| {
            a.repeat_mode = AlertRepeatMode::RepeatWithCooldown;
            a.last_triggered_at = Some(Utc::now() - Duration::minutes(10));
        })];
        let outcome = evaluator.evaluate(&alerts, &snapshots(120.0, 4.0), Utc::now());
        assert!(outcome.triggers.is_empty());
    }

    #[test]
    fn repeat_fires_again_after_cooldown() {
        let evaluator = AlertsEvaluator::new(30);
        let alerts = [alert(|a| {
            a.repeat_mode = AlertRepeatMode::RepeatWithCooldown;
            a.is_armed = false;
            a.last_triggered_at = Some(Utc::now() - Duration::minutes(31));
        })];
        let outcome = evaluator.evaluate(&alerts, &snapshots(120.0, 4.0), Utc::now());
        // Arming is irrelevant for this mode; only the cooldown gates.
        assert_eq!(outcome.triggers.len(), 1);
    }

    #[test]
    fn percent_change_metric_triggers() {
        let evaluator = AlertsEvaluator::new(30);
        let alerts = [alert(|a| {
            a.metric = AlertMetric::PercentChange24h;
            a.target_value = 5.0;
        })];
        let outcome = evaluator.evaluate(&alerts, &snapshots(100.0, 6.0), Utc::now());
        assert_eq!(outcome.triggers.len(), 1);
        assert_eq!(outcome.triggers[0].current_value, 6.0);
    }

    #[test]
    fn disarmed_once_alert_does_not_fire() {
        let evaluator = AlertsEvaluator::new(30);
        let alerts = [alert(|a| a.is_armed = false)];
        let outcome = evaluator.evaluate(&alerts, &snapshots(120.0, 3.0), Utc::now());
        assert!(outcome.triggers.is_empty());
        assert!(outcome.rearm_ids.is_empty());
    }

    #[test]
    fn cleared_condition_rearms_disarmed_alert() {
        let evaluator = AlertsEvaluator::new(30);
        let alerts = [alert(|a| a.is_armed = false)];
        let outcome = evaluator.evaluate(&alerts, &snapshots(90.0, 1.0), Utc::now());
        assert!(outcome.triggers.is_empty());
        assert_eq!(outcome.rearm_ids, vec!["1".to_string()]);
    }

    #[test]
    fn disabled_alert_is_skipped() {
        let evaluator = AlertsEvaluator::new(30);
        let alerts = [alert(|a| a.is_enabled = false)];
        let outcome = evaluator.evaluate(&alerts, &snapshots(120.0, 3.0), Utc::now());
        assert!(outcome.triggers.is_empty());
        assert!(outcome.rearm_ids.is_empty());
    }

    #[test]
    fn missing_snapshot_is_skipped() {
        let evaluator = AlertsEvaluator::new(30);
        let outcome = evaluator.evaluate(&[alert(|_| {})], &HashMap::new(), Utc::now());
        assert!(outcome.triggers.is_empty());
    }

    #[test]
    fn zero_cooldown_uses_the_default() {
        let evaluator = AlertsEvaluator::new(30);
        let alerts = [alert(|a| {
            a.repeat_mode = AlertRepeatMode::RepeatWithCooldown;
            a.cooldown_minutes = 0;
            a.last_triggered_at = Some(Utc::now() - Duration::minutes(10));
        })];
        // 10 minutes elapsed < 30 minute default: suppressed.
        let outcome = evaluator.evaluate(&alerts, &snapshots(120.0, 4.0), Utc::now());
        assert!(outcome.triggers.is_empty());
    }

    #[test]
    fn target_value_boundary_is_inclusive() {
        let evaluator = AlertsEvaluator::new(30);
        let outcome = evaluator.evaluate(&[alert(|_| {})], &snapshots(100.0, 0.0), Utc::now());
        assert_eq!(outcome.triggers.len(), 1);
    }
}
