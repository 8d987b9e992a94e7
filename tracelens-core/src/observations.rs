//! Project-scoped, read-only queries over traces and observations.
//!
//! Every query joins through `traces` and pins `traces.project_id` to the
//! caller's project, so an observation is only ever returned together with a
//! trace the caller may see.

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::models::{Observation, ObservationType, Trace, TraceWithObservations};

const OBSERVATION_COLUMNS: &str = r#"
    o.id, o.trace_id, o.project_id, o.type, o.name, o.start_time, o.end_time,
    o.completion_start_time, o.model, o.model_parameters, o.input, o.output,
    o.metadata, o.level, o.status_message, o.parent_observation_id, o.version,
    o.prompt_tokens, o.completion_tokens, o.total_tokens
"#;

const SCOPED_FILTER: &str = r#"
    FROM observations o
    JOIN traces t ON t.id = o.trace_id
    WHERE t.project_id = $1
      AND o.project_id = $1
      AND ($2::observation_type IS NULL OR o.type = $2)
      AND ($3::text IS NULL OR o.trace_id = $3)
      AND ($4::text IS NULL OR o.name = $4)
      AND ($5::text IS NULL OR t.user_id = $5)
"#;

/// Optional filters for the observation list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservationFilter {
    pub observation_type: Option<ObservationType>,
    pub trace_id: Option<String>,
    pub name: Option<String>,
    pub user_id: Option<String>,
}

/// One-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub limit: u32,
}

impl Page {
    /// Resolve requested paging against configured limits. Zero or missing
    /// values fall back to defaults; `limit` is clamped to `max_limit`.
    pub fn resolve(page: Option<u32>, limit: Option<u32>, api: &ApiConfig) -> Self {
        let max = api.max_limit.max(1);
        let limit = match limit {
            Some(l) if l > 0 => l.min(max),
            _ => api.default_limit.clamp(1, max),
        };
        let page = page.filter(|p| *p > 0).unwrap_or(1);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.saturating_sub(1)) * i64::from(self.limit)
    }
}

/// List observations visible to `project_id`, newest first.
///
/// Returns the requested page and the total number of matching rows.
pub async fn list_observations(
    pool: &PgPool,
    project_id: &str,
    filter: &ObservationFilter,
    page: Page,
) -> Result<(Vec<Observation>, u64), sqlx::Error> {
    let list_sql = format!(
        "SELECT {OBSERVATION_COLUMNS} {SCOPED_FILTER} ORDER BY o.start_time DESC, o.id ASC LIMIT $6 OFFSET $7"
    );
    let rows = sqlx::query_as::<_, Observation>(&list_sql)
        .bind(project_id)
        .bind(filter.observation_type)
        .bind(filter.trace_id.as_deref())
        .bind(filter.name.as_deref())
        .bind(filter.user_id.as_deref())
        .bind(i64::from(page.limit))
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

    let count_sql = format!("SELECT COUNT(*) {SCOPED_FILTER}");
    let (total,): (i64,) = sqlx::query_as(&count_sql)
        .bind(project_id)
        .bind(filter.observation_type)
        .bind(filter.trace_id.as_deref())
        .bind(filter.name.as_deref())
        .bind(filter.user_id.as_deref())
        .fetch_one(pool)
        .await?;

    tracing::debug!(
        project_id = project_id,
        returned = rows.len(),
        total = total,
        "Listed observations"
    );

    Ok((rows, u64::try_from(total).unwrap_or(0)))
}

/// Fetch a single observation if it belongs to `project_id`.
pub async fn get_observation(
    pool: &PgPool,
    project_id: &str,
    observation_id: &str,
) -> Result<Option<Observation>, sqlx::Error> {
    let sql = format!(
        r#"SELECT {OBSERVATION_COLUMNS}
        FROM observations o
        JOIN traces t ON t.id = o.trace_id
        WHERE t.project_id = $1 AND o.project_id = $1 AND o.id = $2"#
    );
    sqlx::query_as::<_, Observation>(&sql)
        .bind(project_id)
        .bind(observation_id)
        .fetch_optional(pool)
        .await
}

/// Fetch a trace and all of its observations (oldest first).
pub async fn get_trace_with_observations(
    pool: &PgPool,
    project_id: &str,
    trace_id: &str,
) -> Result<Option<TraceWithObservations>, sqlx::Error> {
    let trace = sqlx::query_as::<_, Trace>(
        r#"
        SELECT id, timestamp, name, user_id, project_id, metadata, release, version
        FROM traces
        WHERE project_id = $1 AND id = $2
        "#,
    )
    .bind(project_id)
    .bind(trace_id)
    .fetch_optional(pool)
    .await?;

    let Some(trace) = trace else {
        return Ok(None);
    };

    let sql = format!(
        r#"SELECT {OBSERVATION_COLUMNS}
        FROM observations o
        WHERE o.project_id = $1 AND o.trace_id = $2
        ORDER BY o.start_time ASC, o.id ASC"#
    );
    let observations = sqlx::query_as::<_, Observation>(&sql)
        .bind(project_id)
        .bind(trace_id)
        .fetch_all(pool)
        .await?;

    Ok(Some(TraceWithObservations {
        trace,
        observations,
    }))
}
