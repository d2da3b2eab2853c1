use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum ActivityLogs {
    Table,
    Id,
    ParticipantId,
    StepCount,
    DateLogged,
    ActivityType,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Participants {
    Table,
    Id,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Append-only step facts. `date_logged` is a civil date in the challenge
/// time zone, not a timestamp: it decides which daily/weekly bucket a log
/// counts toward.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActivityLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActivityLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ActivityLogs::ParticipantId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ActivityLogs::StepCount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ActivityLogs::DateLogged).date().not_null())
                    .col(
                        ColumnDef::new(ActivityLogs::ActivityType)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ActivityLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // Aggregate queries are always per participant and/or per date range.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_activity_logs_participant_date")
                    .table(ActivityLogs::Table)
                    .col(ActivityLogs::ParticipantId)
                    .col(ActivityLogs::DateLogged)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_activity_logs_date")
                    .table(ActivityLogs::Table)
                    .col(ActivityLogs::DateLogged)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(ActivityLogs::Table)
                    .add_foreign_key(
                        TableForeignKey::new()
                            .name("fk_activity_log_participant")
                            .from_tbl(ActivityLogs::Table)
                            .from_col(ActivityLogs::ParticipantId)
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
                    .table(ActivityLogs::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
