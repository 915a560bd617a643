use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::models::alert::{AlertDirection, AlertMarketSnapshot, AlertMetric, AlertRepeatMode};
use crate::models::market::MarketSort;
use crate::repositories::alerts::AlertsRepository;
use crate::repositories::market::MarketRepository;
use crate::services::alerts_evaluator::AlertsEvaluator;
use crate::services::notifier::Notifier;

/// Evaluates the persisted alerts against the cached market snapshot and
/// dispatches notifications.
///
/// Persistence failures are already isolated per call in the repository
/// (logged and swallowed), so one bad write never stops the remaining
/// alerts from being processed.
pub struct AlertsChecker {
    alerts_repository: AlertsRepository,
    market_repository: MarketRepository,
    evaluator: AlertsEvaluator,
    notifier: Arc<dyn Notifier>,
}

impl AlertsChecker {
    pub fn new(
        alerts_repository: AlertsRepository,
        market_repository: MarketRepository,
        notifier: Arc<dyn Notifier>,
        default_cooldown_minutes: i32,
    ) -> Self {
        Self {
            alerts_repository,
            market_repository,
            evaluator: AlertsEvaluator::new(default_cooldown_minutes),
            notifier,
        }
    }

    pub async fn check_and_notify(&self) {
        let alerts = self.alerts_repository.alerts().await;
        if alerts.is_empty() {
            return;
        }

        let markets = self
            .market_repository
            .cached_markets(MarketSort::MarketCapDesc)
            .await;
        let snapshots: HashMap<String, AlertMarketSnapshot> = markets
            .iter()
            .map(|market| {
                (
                    market.id.clone(),
                    AlertMarketSnapshot {
                        price: market.current_price,
                        percent_change_24h: market.price_change_percentage_24h,
                    },
                )
            })
            .collect();

        let outcome = self.evaluator.evaluate(&alerts, &snapshots, Utc::now());
        if !outcome.triggers.is_empty() {
            tracing::info!("{} alert(s) triggered", outcome.triggers.len());
        }

        for trigger in outcome.triggers {
            let direction_text = match trigger.alert.direction {
                AlertDirection::Above => "above",
                AlertDirection::Below => "below",
            };
            let metric_title = match trigger.alert.metric {
                AlertMetric::Price => "price alert",
                AlertMetric::PercentChange24h => "change alert",
            };
            let title = format!("{} {metric_title}", trigger.alert.name);
            let body = format!(
                "{} is {direction_text} {}. Current: {}",
                trigger.alert.symbol,
                trigger.alert.metric.format(trigger.alert.target_value),
                trigger.alert.metric.format(trigger.current_value),
            );
            self.notifier.send(&title, &body).await;

            self.alerts_repository
                .mark_triggered(&trigger.alert.id, Utc::now())
                .await;
            // Arming is not consulted for repeat alerts; the flag is kept
            // true so the stored row reads as active.
            if trigger.alert.repeat_mode == AlertRepeatMode::RepeatWithCooldown {
                self.alerts_repository
                    .set_armed(&trigger.alert.id, true)
                    .await;
            }
        }

        for id in outcome.rearm_ids {
            self.alerts_repository.set_armed(&id, true).await;
        }
    }
}
