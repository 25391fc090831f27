use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, Statement, Value};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, TransactionKind, TransactionStatus};

use super::Engine;

/// Bucket width for time-series summaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Month,
    Year,
}

impl Granularity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// The strftime pattern producing the bucket label.
    fn time_format(self) -> &'static str {
        match self {
            Self::Day => "%Y-%m-%d",
            Self::Month => "%Y-%m",
            Self::Year => "%Y",
        }
    }
}

impl TryFrom<&str> for Granularity {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "day" => Ok(Self::Day),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(EngineError::Validation(format!(
                "invalid granularity: {other}"
            ))),
        }
    }
}

impl Engine {
    /// Sum a family's valid transactions of one kind per category name
    /// over `[start, end]`, both endpoints included.
    ///
    /// Categories without a matching transaction do not appear; a deleted
    /// category keeps its name in the output as long as deleted
    /// transactions' rows still reference it.
    pub async fn summary_by_category(
        &self,
        family_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        kind: TransactionKind,
    ) -> ResultEngine<HashMap<String, i64>> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT categories.name AS name, \
                    COALESCE(SUM(transactions.amount_minor), 0) AS total \
             FROM transactions \
             LEFT JOIN categories ON transactions.category_id = categories.id \
             WHERE transactions.family_id = ? \
               AND transactions.status = ? \
               AND transactions.kind = ? \
               AND transactions.occurred_at BETWEEN ? AND ? \
             GROUP BY categories.name",
            [
                family_id.to_string().into(),
                TransactionStatus::Valid.as_str().into(),
                kind.as_str().into(),
                start.into(),
                end.into(),
            ],
        );

        let rows = self.database.query_all(stmt).await?;
        let mut totals = HashMap::with_capacity(rows.len());
        for row in rows {
            let Ok(name) = row.try_get::<String>("", "name") else {
                continue;
            };
            let total: i64 = row.try_get("", "total").unwrap_or(0);
            totals.insert(name, total);
        }
        Ok(totals)
    }

    /// Sum a family's valid transactions per time bucket over
    /// `[start, end]`, both endpoints included. Both kinds are counted;
    /// buckets without transactions are absent rather than zero.
    pub async fn summary_by_time(
        &self,
        family_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> ResultEngine<HashMap<String, i64>> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(
            backend,
            "SELECT strftime(?, occurred_at) AS bucket, \
                    COALESCE(SUM(amount_minor), 0) AS total \
             FROM transactions \
             WHERE family_id = ? \
               AND status = ? \
               AND occurred_at BETWEEN ? AND ? \
             GROUP BY bucket",
            [
                Value::from(granularity.time_format()),
                family_id.to_string().into(),
                TransactionStatus::Valid.as_str().into(),
                start.into(),
                end.into(),
            ],
        );

        let rows = self.database.query_all(stmt).await?;
        let mut totals = HashMap::with_capacity(rows.len());
        for row in rows {
            let Ok(bucket) = row.try_get::<String>("", "bucket") else {
                continue;
            };
            let total: i64 = row.try_get("", "total").unwrap_or(0);
            totals.insert(bucket, total);
        }
        Ok(totals)
    }
}
