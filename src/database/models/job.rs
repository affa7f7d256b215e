use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use super::{check_handle, check_payload, FieldKind, UpdatableField};
use crate::database::manager::DatabaseError;
use crate::database::partial_update::{sql_for_partial_update, FieldAliases, UpdatePayload};
use crate::database::query_builder::{bind_param_query_as, like_pattern, WhereBuilder};
use crate::error::ApiError;

const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle AS company";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl NewJob {
    fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::bad_request("title is required"));
        }
        if self.salary.is_some_and(|n| n < 0) {
            return Err(ApiError::bad_request("salary must be a non-negative integer"));
        }
        if self.equity.is_some_and(|e| e < Decimal::ZERO || e > Decimal::ONE) {
            return Err(ApiError::bad_request("equity must be a number between 0 and 1"));
        }
        check_handle("companyHandle", &self.company_handle)
    }
}

/// Query-string filters for listing jobs
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    pub min_salary: Option<i32>,
    /// `true` keeps only jobs with non-zero equity; `false` is no filter
    pub has_equity: Option<bool>,
}

impl JobFilter {
    pub fn to_where(&self) -> WhereBuilder {
        let mut w = WhereBuilder::new();
        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            w.push("title ILIKE {}", like_pattern(title));
        }
        if let Some(min_salary) = self.min_salary {
            w.push("salary >= {}", min_salary);
        }
        if self.has_equity == Some(true) {
            w.push_raw("equity > 0");
        }
        w
    }
}

impl Job {
    pub const JS_TO_SQL: &'static FieldAliases = &[("companyHandle", "company_handle")];

    pub const UPDATABLE: &'static [UpdatableField] = &[
        UpdatableField::required("title", FieldKind::Text),
        UpdatableField::nullable("salary", FieldKind::NonNegativeInteger),
        UpdatableField::nullable("equity", FieldKind::Fraction),
    ];

    /// Insert a job. A job with the same title at the same company is a `Conflict`.
    pub async fn create(pool: &PgPool, data: NewJob) -> Result<Job, ApiError> {
        data.validate()?;

        let duplicate: Option<(i32,)> = sqlx::query_as(
            "SELECT id
             FROM jobs
             WHERE title = $1 AND company_handle = $2",
        )
        .bind(&data.title)
        .bind(&data.company_handle)
        .fetch_optional(pool)
        .await?;

        if duplicate.is_some() {
            return Err(ApiError::conflict(format!(
                "Duplicate job: {} {}",
                data.title, data.company_handle
            )));
        }

        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            JOB_COLUMNS
        );
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(&data.title)
            .bind(data.salary)
            .bind(data.equity)
            .bind(&data.company_handle)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                DatabaseError::classify(e, || {
                    format!("Duplicate job: {} {}", data.title, data.company_handle)
                })
            })?;

        tracing::info!("Created job {} for {}", job.id, job.company);
        Ok(job)
    }

    /// All jobs matching `filter`, ordered by id
    pub async fn find_all(pool: &PgPool, filter: &JobFilter) -> Result<Vec<Job>, ApiError> {
        let (where_sql, params) = filter.to_where().into_parts();
        let sql = format!("SELECT {} FROM jobs {} ORDER BY id", JOB_COLUMNS, where_sql);

        let mut q = sqlx::query_as::<_, Job>(&sql);
        for p in params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_all(pool).await?)
    }

    pub async fn get(pool: &PgPool, id: i32) -> Result<Job, ApiError> {
        let sql = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
        sqlx::query_as::<_, Job>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No job with id: {}", id)))
    }

    /// Jobs posted by one company, ordered by id
    pub async fn for_company(pool: &PgPool, handle: &str) -> Result<Vec<Job>, ApiError> {
        let sql = format!(
            "SELECT {} FROM jobs WHERE company_handle = $1 ORDER BY id",
            JOB_COLUMNS
        );
        Ok(sqlx::query_as::<_, Job>(&sql)
            .bind(handle)
            .fetch_all(pool)
            .await?)
    }

    /// Partial update: only the fields present in `data` change.
    ///
    /// Accepts `title`, `salary` and `equity`; an empty payload is a `BadRequest`.
    pub async fn update(pool: &PgPool, id: i32, data: UpdatePayload) -> Result<Job, ApiError> {
        check_payload(&data, Self::UPDATABLE)?;
        let clause = sql_for_partial_update(data, Self::JS_TO_SQL)?;

        let sql = format!(
            "UPDATE jobs
             SET {}
             WHERE id = {}
             RETURNING {}",
            clause.set_cols(),
            clause.next_placeholder(),
            JOB_COLUMNS
        );

        let mut q = sqlx::query_as::<_, Job>(&sql);
        for v in clause.values.iter() {
            q = bind_param_query_as(q, v);
        }
        let job = q
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(|e| DatabaseError::classify(e, || format!("Duplicate job: {}", id)))?
            .ok_or_else(|| ApiError::not_found(format!("No job with id: {}", id)))?;

        tracing::info!("Updated job {}", id);
        Ok(job)
    }

    pub async fn remove(pool: &PgPool, id: i32) -> Result<(), ApiError> {
        let deleted: Option<(i32,)> = sqlx::query_as(
            "DELETE
             FROM jobs
             WHERE id = $1
             RETURNING id",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        match deleted {
            Some(_) => {
                tracing::info!("Removed job {}", id);
                Ok(())
            }
            None => Err(ApiError::not_found(format!("No job with id: {}", id))),
        }
    }
}
