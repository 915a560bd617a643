use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{DatabaseConnection, EntityTrait, Order, QueryOrder, Set};

use crate::entities::{prelude::*, price_alerts};
use crate::models::alert::{AlertDirection, AlertMetric, AlertRepeatMode, PriceAlert};

/// Persistence for user-defined price alerts.
///
/// Reads degrade to empty on store failure; writes log and swallow errors
/// so a bad row never takes down the caller or the checker loop.
#[derive(Clone)]
pub struct AlertsRepository {
    db: DatabaseConnection,
}

impl AlertsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn alerts(&self) -> Vec<PriceAlert> {
        match PriceAlerts::find()
            .order_by(price_alerts::Column::CreatedAt, Order::Desc)
            .all(&self.db)
            .await
        {
            Ok(rows) => rows.into_iter().map(alert_to_domain).collect(),
            Err(error) => {
                tracing::warn!("Failed to read alerts: {error}");
                Vec::new()
            }
        }
    }

    pub async fn alert(&self, id: &str) -> Option<PriceAlert> {
        match PriceAlerts::find_by_id(id).one(&self.db).await {
            Ok(row) => row.map(alert_to_domain),
            Err(_) => None,
        }
    }

    pub async fn upsert_alert(&self, alert: &PriceAlert) {
        let row = price_alerts::ActiveModel {
            id: Set(alert.id.clone()),
            coin_id: Set(alert.coin_id.clone()),
            symbol: Set(alert.symbol.clone()),
            name: Set(alert.name.clone()),
            target_value: Set(alert.target_value),
            metric: Set(alert.metric.as_str().to_string()),
            direction: Set(alert.direction.as_str().to_string()),
            repeat_mode: Set(alert.repeat_mode.as_str().to_string()),
            cooldown_minutes: Set(alert.cooldown_minutes),
            is_enabled: Set(alert.is_enabled),
            is_armed: Set(alert.is_armed),
            created_at: Set(alert.created_at),
            last_triggered_at: Set(alert.last_triggered_at),
        };
        let result = PriceAlerts::insert(row)
            .on_conflict(
                OnConflict::column(price_alerts::Column::Id)
                    .update_columns([
                        price_alerts::Column::CoinId,
                        price_alerts::Column::Symbol,
                        price_alerts::Column::Name,
                        price_alerts::Column::TargetValue,
                        price_alerts::Column::Metric,
                        price_alerts::Column::Direction,
                        price_alerts::Column::RepeatMode,
                        price_alerts::Column::CooldownMinutes,
                        price_alerts::Column::IsEnabled,
                        price_alerts::Column::IsArmed,
                        price_alerts::Column::CreatedAt,
                        price_alerts::Column::LastTriggeredAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await;
        if let Err(error) = result {
            tracing::warn!("Failed to upsert alert: {error}");
        }
    }

    pub async fn delete_alert(&self, id: &str) {
        if let Err(error) = PriceAlerts::delete_by_id(id).exec(&self.db).await {
            tracing::warn!("Failed to delete alert: {error}");
        }
    }

    /// Records a trigger: stamps `last_triggered_at` and disarms.
    pub async fn mark_triggered(&self, id: &str, at: DateTime<Utc>) {
        match PriceAlerts::find_by_id(id).one(&self.db).await {
            Ok(Some(row)) => {
                let mut active: price_alerts::ActiveModel = row.into();
                active.last_triggered_at = Set(Some(at));
                active.is_armed = Set(false);
                if let Err(error) = PriceAlerts::update(active).exec(&self.db).await {
                    tracing::warn!("Failed to mark alert triggered: {error}");
                }
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!("Failed to mark alert triggered: {error}");
            }
        }
    }

    pub async fn set_armed(&self, id: &str, is_armed: bool) {
        match PriceAlerts::find_by_id(id).one(&self.db).await {
            Ok(Some(row)) => {
                let mut active: price_alerts::ActiveModel = row.into();
                active.is_armed = Set(is_armed);
                if let Err(error) = PriceAlerts::update(active).exec(&self.db).await {
                    tracing::warn!("Failed to update alert armed state: {error}");
                }
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!("Failed to update alert armed state: {error}");
            }
        }
    }
}

fn alert_to_domain(model: price_alerts::Model) -> PriceAlert {
    PriceAlert {
        id: model.id,
        coin_id: model.coin_id,
        symbol: model.symbol,
        name: model.name,
        target_value: model.target_value,
        metric: AlertMetric::from_str(&model.metric).unwrap_or(AlertMetric::Price),
        direction: AlertDirection::from_str(&model.direction).unwrap_or(AlertDirection::Above),
        repeat_mode: AlertRepeatMode::from_str(&model.repeat_mode)
            .unwrap_or(AlertRepeatMode::OnceUntilReset),
        cooldown_minutes: model.cooldown_minutes,
        is_enabled: model.is_enabled,
        is_armed: model.is_armed,
        created_at: model.created_at,
        last_triggered_at: model.last_triggered_at,
    }
}
