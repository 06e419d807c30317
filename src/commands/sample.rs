//! Sample CRUD commands.

use chrono::DateTime;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use super::Context;
use crate::output::{self, OutputFormat};
use sample_core::error::AppError;
use sample_core::traits::entity::ID;
use sample_core::traits::repository::{ReadOnlyRepository, Repository};
use sample_core::types::expression::{Predicate, build_equals};
use sample_core::types::pagination::PaginationQuery;
use sample_core::types::sorting::{SortDirection, SortField};
use sample_entity::sample::{CreateSample, Sample, UpdateSample};

/// Arguments for `create`
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Display name
    pub name: String,
    /// Optional description
    #[arg(short, long)]
    pub description: Option<String>,
}

/// Arguments for commands addressing one sample
#[derive(Debug, Args)]
pub struct GetArgs {
    /// Sample id
    pub id: Uuid,
}

/// Arguments for `list`
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Page number (1-based)
    #[arg(short, long, default_value_t = 1)]
    pub page: u64,
    /// Items per page (1-100)
    #[arg(short, long, default_value_t = 25)]
    pub limit: u64,
    /// Return every sample in one page
    #[arg(long)]
    pub all: bool,
    /// Field to sort by
    #[arg(long)]
    pub sort: Option<String>,
    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,
    /// Only samples with exactly this name
    #[arg(long)]
    pub name: Option<String>,
}

/// Arguments for `update`
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Sample id
    pub id: Uuid,
    /// New display name
    #[arg(short, long)]
    pub name: Option<String>,
    /// New description
    #[arg(short, long)]
    pub description: Option<String>,
}

/// Arguments for `purge`
#[derive(Debug, Args)]
pub struct PurgeArgs {
    /// Remove only this sample, live or deleted. Without it every
    /// soft-deleted sample is removed.
    pub id: Option<Uuid>,
}

/// Sample display row for table output
#[derive(Debug, Serialize, Tabled)]
struct SampleRow {
    /// Sample ID
    id: String,
    /// Name
    name: String,
    /// Description
    description: String,
    /// Created at
    created_at: String,
    /// Updated at
    updated_at: String,
}

impl From<&Sample> for SampleRow {
    fn from(s: &Sample) -> Self {
        Self {
            id: s.id.to_string(),
            name: s.name.clone().unwrap_or_default(),
            description: s.description.clone().unwrap_or_default(),
            created_at: format_ts(Some(s.created_at)),
            updated_at: format_ts(s.updated_at),
        }
    }
}

fn format_ts(ts: Option<i64>) -> String {
    ts.and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn print_sample(sample: &Sample, format: OutputFormat) {
    match format {
        OutputFormat::Table => output::print_item(&SampleRow::from(sample), format),
        OutputFormat::Json => output::print_json(sample),
    }
}

/// Create a sample
pub async fn create(ctx: &Context, args: &CreateArgs, format: OutputFormat) -> Result<(), AppError> {
    let input = CreateSample {
        name: args.name.clone(),
        description: args.description.clone(),
    };
    let sample = ctx.repository.add(input.into()).await?;
    print_sample(&sample, format);
    output::print_success(&format!("Sample '{}' created", sample.id));
    Ok(())
}

/// Show one sample
pub async fn get(ctx: &Context, args: &GetArgs, format: OutputFormat) -> Result<(), AppError> {
    let sample = ctx.repository.get_by_id(args.id, &[]).await?;
    print_sample(&sample, format);
    Ok(())
}

/// List samples
pub async fn list(ctx: &Context, args: &ListArgs, format: OutputFormat) -> Result<(), AppError> {
    let mut query = if args.all {
        PaginationQuery::unpaginated()
    } else {
        PaginationQuery::new(args.page, args.limit)
    };
    if let Some(field) = &args.sort {
        let direction = if args.desc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        query = query.with_sort(SortField::new(field.clone(), direction));
    }

    let page = match &args.name {
        Some(name) => {
            let filter = build_equals::<Sample>("name", name.as_str())?;
            ctx.repository
                .get_all_by_parameters_paginated(&query, &filter, &[])
                .await?
        }
        None => ctx.repository.get_all(&query, &[]).await?,
    };

    match format {
        OutputFormat::Table => output::print_page(&page.map(|s| SampleRow::from(&s)), format),
        OutputFormat::Json => output::print_json(&page),
    }
    Ok(())
}

/// Update a sample
pub async fn update(ctx: &Context, args: &UpdateArgs, format: OutputFormat) -> Result<(), AppError> {
    if args.name.is_none() && args.description.is_none() {
        return Err(AppError::validation("Nothing to update: pass --name or --description"));
    }
    let input = UpdateSample {
        id: args.id,
        name: args.name.clone(),
        description: args.description.clone(),
    };
    let sample = ctx.repository.update(input.into()).await?;
    print_sample(&sample, format);
    output::print_success(&format!("Sample '{}' updated", sample.id));
    Ok(())
}

/// Soft-delete a sample
pub async fn delete(ctx: &Context, args: &GetArgs, format: OutputFormat) -> Result<(), AppError> {
    let sample = ctx.repository.delete(args.id).await?;
    if format == OutputFormat::Json {
        print_sample(&sample, format);
    }
    output::print_success(&format!("Sample '{}' deleted", sample.id));
    Ok(())
}

/// Permanently remove samples
pub async fn purge(ctx: &Context, args: &PurgeArgs) -> Result<(), AppError> {
    let filter = match args.id {
        Some(id) => build_equals::<Sample>(ID, id)?,
        None => Predicate::<Sample>::live().not(),
    };
    let removed = ctx.repository.delete_hard(&filter).await?;
    if removed == 0 {
        output::print_warning("No samples matched");
    } else {
        output::print_success(&format!("{removed} sample(s) permanently removed"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_formats_timestamps() {
        let mut sample = Sample::new("gear");
        sample.created_at = 0;
        sample.updated_at = None;
        let row = SampleRow::from(&sample);
        assert_eq!(row.created_at, "1970-01-01 00:00");
        assert_eq!(row.updated_at, "");
        assert_eq!(row.description, "");
    }
}
