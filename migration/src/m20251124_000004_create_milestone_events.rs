use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum MilestoneEvents {
    Table,
    Id,
    MilestoneType,
    ThresholdValue,
    TotalStepsAtTrigger,
    TriggeredByParticipantId,
    TriggeredByLogId,
    AnnouncedAt,
}

#[derive(DeriveIden)]
enum Participants {
    Table,
    Id,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// One row per org-wide milestone, written exactly once. The unique index on
/// `milestone_type` is the announcement mutex: concurrent writers race on a
/// plain INSERT and exactly one succeeds.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MilestoneEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MilestoneEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MilestoneEvents::MilestoneType)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MilestoneEvents::ThresholdValue)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MilestoneEvents::TotalStepsAtTrigger)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MilestoneEvents::TriggeredByParticipantId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(MilestoneEvents::TriggeredByLogId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(MilestoneEvents::AnnouncedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_milestone_events_type_unique")
                    .table(MilestoneEvents::Table)
                    .col(MilestoneEvents::MilestoneType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(MilestoneEvents::Table)
                    .add_foreign_key(
                        TableForeignKey::new()
                            .name("fk_milestone_event_participant")
                            .from_tbl(MilestoneEvents::Table)
                            .from_col(MilestoneEvents::TriggeredByParticipantId)
                            .to_tbl(Participants::Table)
                            .to_col(Participants::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(MilestoneEvents::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
