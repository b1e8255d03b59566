//! Job execution history entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

/// Job outcome as stored in the `outcome` column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum JobOutcome {
    #[sea_orm(string_value = "success")]
    Success,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "skipped")]
    Skipped,
}

impl From<JobOutcome> for newsroom_core::domain::JobOutcome {
    fn from(outcome: JobOutcome) -> Self {
        match outcome {
            JobOutcome::Success => Self::Success,
            JobOutcome::Failed => Self::Failed,
            JobOutcome::Skipped => Self::Skipped,
        }
    }
}

impl From<newsroom_core::domain::JobOutcome> for JobOutcome {
    fn from(outcome: newsroom_core::domain::JobOutcome) -> Self {
        match outcome {
            newsroom_core::domain::JobOutcome::Success => Self::Success,
            newsroom_core::domain::JobOutcome::Failed => Self::Failed,
            newsroom_core::domain::JobOutcome::Skipped => Self::Skipped,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "job_executions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub job_name: String,
    pub started_at: DateTimeWithTimeZone,
    pub finished_at: DateTimeWithTimeZone,
    pub outcome: JobOutcome,
    pub detail: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for newsroom_core::domain::JobExecution {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            job_name: model.job_name,
            started_at: model.started_at.into(),
            finished_at: model.finished_at.into(),
            outcome: model.outcome.into(),
            detail: model.detail,
        }
    }
}

impl From<newsroom_core::domain::JobExecution> for ActiveModel {
    fn from(execution: newsroom_core::domain::JobExecution) -> Self {
        Self {
            id: Set(execution.id),
            job_name: Set(execution.job_name),
            started_at: Set(execution.started_at.into()),
            finished_at: Set(execution.finished_at.into()),
            outcome: Set(execution.outcome.into()),
            detail: Set(execution.detail),
        }
    }
}
