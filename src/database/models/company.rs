use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use super::{check_handle, check_payload, is_absolute_url, FieldKind, Job, UpdatableField};
use crate::database::manager::DatabaseError;
use crate::database::partial_update::{sql_for_partial_update, FieldAliases, UpdatePayload};
use crate::database::query_builder::{bind_param_query_as, like_pattern, WhereBuilder};
use crate::error::ApiError;

const COMPANY_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// A company together with the jobs it has posted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl NewCompany {
    fn validate(&self) -> Result<(), ApiError> {
        check_handle("handle", &self.handle)?;
        if self.name.trim().is_empty() {
            return Err(ApiError::bad_request("name is required"));
        }
        if self.num_employees.is_some_and(|n| n < 0) {
            return Err(ApiError::bad_request("numEmployees must be a non-negative integer"));
        }
        if let Some(logo_url) = &self.logo_url {
            if !is_absolute_url(logo_url) {
                return Err(ApiError::bad_request("logoUrl must be an absolute URL"));
            }
        }
        Ok(())
    }
}

/// Query-string filters for listing companies
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    pub name_like: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

impl CompanyFilter {
    pub fn to_where(&self) -> Result<WhereBuilder, ApiError> {
        if let (Some(min), Some(max)) = (self.min_employees, self.max_employees) {
            if min > max {
                return Err(ApiError::bad_request(
                    "minEmployees cannot be greater than maxEmployees",
                ));
            }
        }

        let mut w = WhereBuilder::new();
        if let Some(name) = self.name_like.as_deref().filter(|n| !n.is_empty()) {
            w.push("name ILIKE {}", like_pattern(name));
        }
        if let Some(min) = self.min_employees {
            w.push("num_employees >= {}", min);
        }
        if let Some(max) = self.max_employees {
            w.push("num_employees <= {}", max);
        }
        Ok(w)
    }
}

impl Company {
    pub const JS_TO_SQL: &'static FieldAliases = &[
        ("numEmployees", "num_employees"),
        ("logoUrl", "logo_url"),
    ];

    pub const UPDATABLE: &'static [UpdatableField] = &[
        UpdatableField::required("name", FieldKind::Text),
        UpdatableField::required("description", FieldKind::Text),
        UpdatableField::nullable("numEmployees", FieldKind::NonNegativeInteger),
        UpdatableField::nullable("logoUrl", FieldKind::Url),
    ];

    /// Insert a company. An existing handle or name is a `Conflict`.
    pub async fn create(pool: &PgPool, data: NewCompany) -> Result<Company, ApiError> {
        data.validate()?;

        let duplicate: Option<(String,)> =
            sqlx::query_as("SELECT handle FROM companies WHERE handle = $1")
                .bind(&data.handle)
                .fetch_optional(pool)
                .await?;

        if duplicate.is_some() {
            return Err(ApiError::conflict(format!("Duplicate company: {}", data.handle)));
        }

        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            COMPANY_COLUMNS
        );
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(&data.handle)
            .bind(&data.name)
            .bind(&data.description)
            .bind(data.num_employees)
            .bind(&data.logo_url)
            .fetch_one(pool)
            .await
            .map_err(|e| {
                DatabaseError::classify(e, || format!("Duplicate company: {}", data.name))
            })?;

        tracing::info!("Created company {}", company.handle);
        Ok(company)
    }

    /// All companies matching `filter`, ordered by name
    pub async fn find_all(pool: &PgPool, filter: &CompanyFilter) -> Result<Vec<Company>, ApiError> {
        let (where_sql, params) = filter.to_where()?.into_parts();
        let sql = format!(
            "SELECT {} FROM companies {} ORDER BY name",
            COMPANY_COLUMNS, where_sql
        );

        let mut q = sqlx::query_as::<_, Company>(&sql);
        for p in params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_all(pool).await?)
    }

    /// A company and its jobs
    pub async fn get(pool: &PgPool, handle: &str) -> Result<CompanyDetail, ApiError> {
        let sql = format!("SELECT {} FROM companies WHERE handle = $1", COMPANY_COLUMNS);
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(handle)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No company: {}", handle)))?;

        let jobs = Job::for_company(pool, handle).await?;
        Ok(CompanyDetail { company, jobs })
    }

    /// Partial update of `name`, `description`, `numEmployees` and `logoUrl`
    pub async fn update(
        pool: &PgPool,
        handle: &str,
        data: UpdatePayload,
    ) -> Result<Company, ApiError> {
        check_payload(&data, Self::UPDATABLE)?;
        let new_name = data.get("name").and_then(|v| v.as_str()).map(str::to_string);
        let clause = sql_for_partial_update(data, Self::JS_TO_SQL)?;

        let sql = format!(
            "UPDATE companies
             SET {}
             WHERE handle = {}
             RETURNING {}",
            clause.set_cols(),
            clause.next_placeholder(),
            COMPANY_COLUMNS
        );

        let mut q = sqlx::query_as::<_, Company>(&sql);
        for v in clause.values.iter() {
            q = bind_param_query_as(q, v);
        }
        let company = q
            .bind(handle)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                DatabaseError::classify(e, || {
                    format!("Duplicate company: {}", new_name.as_deref().unwrap_or(handle))
                })
            })?
            .ok_or_else(|| ApiError::not_found(format!("No company: {}", handle)))?;

        tracing::info!("Updated company {}", handle);
        Ok(company)
    }

    /// Delete a company; its jobs go with it
    pub async fn remove(pool: &PgPool, handle: &str) -> Result<(), ApiError> {
        let deleted: Option<(String,)> =
            sqlx::query_as("DELETE FROM companies WHERE handle = $1 RETURNING handle")
                .bind(handle)
                .fetch_optional(pool)
                .await?;

        match deleted {
            Some(_) => {
                tracing::info!("Removed company {}", handle);
                Ok(())
            }
            None => Err(ApiError::not_found(format!("No company: {}", handle))),
        }
    }
}
