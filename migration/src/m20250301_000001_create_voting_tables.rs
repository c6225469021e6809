use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::Expr;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Votes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Votes::VoteId)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Votes::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Votes::Description).text().not_null())
                    .col(ColumnDef::new(Votes::Deadline).date().not_null())
                    .col(
                        ColumnDef::new(Votes::MinimumAge)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Votes::Status).string_len(16).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Citizens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Citizens::CitizenId)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Citizens::FirstName).string_len(128).not_null())
                    .col(ColumnDef::new(Citizens::LastName).string_len(128).not_null())
                    .col(ColumnDef::new(Citizens::Birthdate).date().not_null())
                    .col(ColumnDef::new(Citizens::Address).string_len(256).not_null())
                    .col(ColumnDef::new(Citizens::PostalCode).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Citizens::Email)
                            .string_len(254)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Citizens::PasswordHash).text().not_null())
                    .col(ColumnDef::new(Citizens::Role).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Citizens::Verification)
                            .string_len(32)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Ballots outlive their vote; removing a vote never cascades.
        manager
            .create_table(
                Table::create()
                    .table(Ballots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ballots::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Ballots::VoteId).string_len(64).not_null())
                    .col(ColumnDef::new(Ballots::CitizenId).string_len(64).not_null())
                    .col(ColumnDef::new(Ballots::Choice).string_len(8).not_null())
                    .col(
                        ColumnDef::new(Ballots::CastAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ballots_vote")
                    .table(Ballots::Table)
                    .col(Ballots::VoteId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ballots_citizen")
                    .table(Ballots::Table)
                    .col(Ballots::CitizenId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ballots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Citizens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Votes::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Votes {
    Table,
    VoteId,
    Title,
    Description,
    Deadline,
    MinimumAge,
    Status,
}

#[derive(DeriveIden)]
enum Citizens {
    Table,
    CitizenId,
    FirstName,
    LastName,
    Birthdate,
    Address,
    PostalCode,
    Email,
    PasswordHash,
    Role,
    Verification,
}

#[derive(DeriveIden)]
enum Ballots {
    Table,
    Id,
    VoteId,
    CitizenId,
    Choice,
    CastAt,
}
