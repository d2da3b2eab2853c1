use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

#[derive(DeriveIden)]
enum Prizes {
    Table,
    Id,
    WeekNumber,
    PrizeType,
    Title,
    Description,
    Emoji,
    WinnerParticipantId,
    DrawnAt,
}

#[derive(DeriveIden)]
enum PrizeEntries {
    Table,
    Id,
    ParticipantId,
    PrizeId,
    WeekNumber,
    OptedIn,
    Qualified,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Participants {
    Table,
    Id,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Prize definitions (one per challenge week plus the grand prize) and the
/// per-participant entry records. A prize's winner columns start NULL and are
/// written exactly once by the draw's conditional update.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Prizes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Prizes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Prizes::WeekNumber).integer().null())
                    .col(ColumnDef::new(Prizes::PrizeType).string_len(32).not_null())
                    .col(ColumnDef::new(Prizes::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Prizes::Description).text().null())
                    .col(ColumnDef::new(Prizes::Emoji).string_len(64).null())
                    .col(
                        ColumnDef::new(Prizes::WinnerParticipantId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Prizes::DrawnAt).timestamp_with_time_zone().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_prizes_week_type_unique")
                    .table(Prizes::Table)
                    .col(Prizes::WeekNumber)
                    .col(Prizes::PrizeType)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Prizes::Table)
                    .add_foreign_key(
                        TableForeignKey::new()
                            .name("fk_prize_winner_participant")
                            .from_tbl(Prizes::Table)
                            .from_col(Prizes::WinnerParticipantId)
                            .to_tbl(Participants::Table)
                            .to_col(Participants::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PrizeEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PrizeEntries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PrizeEntries::ParticipantId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PrizeEntries::PrizeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PrizeEntries::WeekNumber).integer().null())
                    .col(
                        ColumnDef::new(PrizeEntries::OptedIn)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(PrizeEntries::Qualified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(PrizeEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        // One entry per (participant, prize); the qualification upsert relies
        // on this conflict target.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_prize_entries_participant_prize_unique")
                    .table(PrizeEntries::Table)
                    .col(PrizeEntries::ParticipantId)
                    .col(PrizeEntries::PrizeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(PrizeEntries::Table)
                    .add_foreign_key(
                        TableForeignKey::new()
                            .name("fk_prize_entry_prize")
                            .from_tbl(PrizeEntries::Table)
                            .from_col(PrizeEntries::PrizeId)
                            .to_tbl(Prizes::Table)
                            .to_col(Prizes::Id),
                    )
                    .add_foreign_key(
                        TableForeignKey::new()
                            .name("fk_prize_entry_participant")
                            .from_tbl(PrizeEntries::Table)
                            .from_col(PrizeEntries::ParticipantId)
                            .to_tbl(Participants::Table)
                            .to_col(Participants::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Seed the December prize lineup.
        let conn = manager.get_connection();
        let seed_prizes = r#"
INSERT INTO prizes (week_number, prize_type, title, description, emoji)
VALUES
 (1, 'weekly', 'Hume Body Pod',
  'Advanced smart body composition analyzer with 45+ health metrics including body fat %, muscle mass, bone density & heart health. Syncs with Apple, Fitbit & Garmin. HSA/FSA eligible!',
  '⚡'),
 (2, 'weekly', '3-Month Personal Training with HipTrain',
  'Live one-on-one video training with certified fitness professionals (2 sessions/week for 12 weeks = 24 sessions total!). Train anywhere with flexible scheduling. HSA/FSA eligible!',
  '💪'),
 (3, 'weekly', 'Sleep & Meditation Ultimate Bundle',
  'Annual meditation app subscription (Headspace or Calm) with 1,000+ guided meditations, PLUS award-winning NodPod weighted sleep mask and premium soft foam earplugs for perfect sleep!',
  '🧘'),
 (4, 'weekly', 'Bob & Brad C2 Massage Gun',
  'Professional deep-tissue percussion massager designed by physical therapists. 5 speeds, 45+ lbs stall force, whisper-quiet and TSA-approved for travel. Perfect post-workout recovery!',
  '🔫'),
 (NULL, 'grand', 'BowFlex SelectTech 552 Dumbbells OR 3 Premium Massages',
  'CHOICE OF: (A) BowFlex SelectTech 552 Adjustable Dumbbells - replace 15 sets of weights with the 5-52.5 lbs dial system. OR (B) Gift card for THREE 60-minute premium massage sessions at your favorite spa!',
  '🏆')
ON CONFLICT (week_number, prize_type) DO NOTHING;
"#;
        conn.execute_raw(Statement::from_string(
            manager.get_database_backend(),
            seed_prizes.to_string(),
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(PrizeEntries::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Prizes::Table).to_owned())
            .await?;

        Ok(())
    }
}
