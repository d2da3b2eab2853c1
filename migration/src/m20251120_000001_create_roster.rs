use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

#[derive(DeriveIden)]
enum Teams {
    Table,
    Id,
    Name,
    ColorHex,
    Icon,
}

#[derive(DeriveIden)]
enum Participants {
    Table,
    Id,
    Username,
    SlackUsername,
    SlackUserId,
    TeamId,
    AvatarEmoji,
    BankedSteps,
    GrandPrizeEntry,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Teams and participants are fixed reference data for a challenge run:
/// the roster is seeded here and never mutated except for team reassignment.
/// `banked_steps` is a denormalized cache of the participant's activity-log
/// sum, maintained alongside every log insert/update/delete.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Teams::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Teams::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Teams::ColorHex).string_len(255).null())
                    .col(ColumnDef::new(Teams::Icon).string_len(64).null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Participants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Participants::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Participants::Username)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Participants::SlackUsername)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Participants::SlackUserId)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Participants::TeamId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Participants::AvatarEmoji)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Participants::BankedSteps)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Participants::GrandPrizeEntry)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Participants::CreatedAt)
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
                    .name("idx_participants_username_unique")
                    .table(Participants::Table)
                    .col(Participants::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_participants_team")
                    .table(Participants::Table)
                    .col(Participants::TeamId)
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Participants::Table)
                    .add_foreign_key(
                        TableForeignKey::new()
                            .name("fk_participant_team")
                            .from_tbl(Participants::Table)
                            .from_col(Participants::TeamId)
                            .to_tbl(Teams::Table)
                            .to_col(Teams::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Seed the roster. Re-runnable: conflicts are ignored.
        let conn = manager.get_connection();
        let seed_teams = r#"
INSERT INTO teams (id, name, color_hex, icon)
VALUES
 (1, 'The Cloud Walkers', 'from-cyan-400 to-blue-500', '☁️'),
 (2, 'The Mood Lifters', 'from-orange-300 to-pink-400', '✨')
ON CONFLICT (id) DO NOTHING;
"#;
        conn.execute_raw(Statement::from_string(
            manager.get_database_backend(),
            seed_teams.to_string(),
        ))
        .await?;

        let seed_participants = r#"
INSERT INTO participants (id, username, slack_username, slack_user_id, team_id, avatar_emoji)
VALUES
 (1, 'Pam', 'pam', 'U05UC7E564F', 1, '🧘‍♀️'),
 (2, 'Victoria', 'victoria newton', 'U06UWNKATU7', 1, '🏃‍♀️'),
 (3, 'Jack', 'jackshannon', 'U06FBCJUU', 1, '🧗‍♂️'),
 (4, 'Francisco', 'francisco cazes', 'U09MF1GDBV4', 1, '🚴‍♂️'),
 (9, 'Andy Cooper', 'andy', 'U09JL7ML316', 1, '⚡'),
 (5, 'Claire', 'claire', 'U06P34GBSAC', 2, '🤸‍♀️'),
 (6, 'Deuce', 'deuce', 'U06FDAS93', 2, '🧢'),
 (7, 'Courtney', 'courtney cook', 'U09NCCX1KMZ', 2, '🏄‍♀️'),
 (8, 'Arb', 'arb', 'UCHB3H37B', 2, '🕶️'),
 (10, 'Anderson Camargo', 'anderson', 'U023CK0NK63', 2, '🎯')
ON CONFLICT (id) DO NOTHING;
"#;
        conn.execute_raw(Statement::from_string(
            manager.get_database_backend(),
            seed_participants.to_string(),
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(Participants::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Teams::Table).to_owned())
            .await?;

        Ok(())
    }
}
