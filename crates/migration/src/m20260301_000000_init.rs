//! Initial schema migration - creates all tables from scratch.
//!
//! One table per entity collection, all scoped by `user_id`:
//!
//! - `users`: authentication
//! - `freights`: loads with revenue components, derived figures and nested
//!   expense/comment arrays as JSON
//! - `assets`: trucks and business cars
//! - `drivers`: drivers and their pay rates
//! - `expenses`: standalone expenses with an optional driver/asset link
//! - `home_transactions`: household income/expense records
//! - `categories`: per-user custom expense categories

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Freights {
    Table,
    Id,
    UserId,
    Label,
    Origin,
    Destination,
    DistanceMiles,
    WeightLbs,
    Date,
    DriverId,
    DriverName,
    AssetId,
    AssetName,
    LineHaulCents,
    FuelSurchargeCents,
    LoadingCents,
    UnloadingCents,
    AccessorialsCents,
    OwnerPercentage,
    RevenueCents,
    OwnerAmountCents,
    TotalExpensesCents,
    NetProfitCents,
    Status,
    Expenses,
    Comments,
    IsDeleted,
    DeletedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Assets {
    Table,
    Id,
    UserId,
    Kind,
    Identifier,
    Description,
    Images,
    Comments,
    IsDeleted,
    DeletedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Drivers {
    Table,
    Id,
    UserId,
    Name,
    PayType,
    PayRate,
    Images,
    Comments,
    IsDeleted,
    DeletedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    UserId,
    Category,
    Description,
    AmountCents,
    Date,
    LinkKind,
    LinkId,
    LinkName,
    Comments,
    IsDeleted,
    DeletedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum HomeTransactions {
    Table,
    Id,
    UserId,
    Kind,
    AmountCents,
    Category,
    Description,
    Date,
    UpdatedAt,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    UserId,
    Name,
    NameNorm,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Freights
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Freights::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Freights::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Freights::UserId).string().not_null())
                    .col(ColumnDef::new(Freights::Label).string().not_null())
                    .col(ColumnDef::new(Freights::Origin).string().not_null())
                    .col(ColumnDef::new(Freights::Destination).string().not_null())
                    .col(
                        ColumnDef::new(Freights::DistanceMiles)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Freights::WeightLbs).double().not_null())
                    .col(ColumnDef::new(Freights::Date).date().not_null())
                    .col(ColumnDef::new(Freights::DriverId).string())
                    .col(ColumnDef::new(Freights::DriverName).string())
                    .col(ColumnDef::new(Freights::AssetId).string())
                    .col(ColumnDef::new(Freights::AssetName).string())
                    .col(
                        ColumnDef::new(Freights::LineHaulCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Freights::FuelSurchargeCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Freights::LoadingCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Freights::UnloadingCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Freights::AccessorialsCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Freights::OwnerPercentage)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Freights::RevenueCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Freights::OwnerAmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Freights::TotalExpensesCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Freights::NetProfitCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Freights::Status).string().not_null())
                    .col(ColumnDef::new(Freights::Expenses).json().not_null())
                    .col(ColumnDef::new(Freights::Comments).json().not_null())
                    .col(ColumnDef::new(Freights::IsDeleted).boolean().not_null())
                    .col(ColumnDef::new(Freights::DeletedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Freights::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-freights-user_id")
                            .from(Freights::Table, Freights::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-freights-user_id-date")
                    .table(Freights::Table)
                    .col(Freights::UserId)
                    .col(Freights::Date)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Assets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Assets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Assets::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Assets::UserId).string().not_null())
                    .col(ColumnDef::new(Assets::Kind).string().not_null())
                    .col(ColumnDef::new(Assets::Identifier).string().not_null())
                    .col(ColumnDef::new(Assets::Description).string())
                    .col(ColumnDef::new(Assets::Images).json().not_null())
                    .col(ColumnDef::new(Assets::Comments).json().not_null())
                    .col(ColumnDef::new(Assets::IsDeleted).boolean().not_null())
                    .col(ColumnDef::new(Assets::DeletedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Assets::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assets-user_id")
                            .from(Assets::Table, Assets::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Drivers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Drivers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Drivers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Drivers::UserId).string().not_null())
                    .col(ColumnDef::new(Drivers::Name).string().not_null())
                    .col(ColumnDef::new(Drivers::PayType).string().not_null())
                    .col(ColumnDef::new(Drivers::PayRate).big_integer().not_null())
                    .col(ColumnDef::new(Drivers::Images).json().not_null())
                    .col(ColumnDef::new(Drivers::Comments).json().not_null())
                    .col(ColumnDef::new(Drivers::IsDeleted).boolean().not_null())
                    .col(ColumnDef::new(Drivers::DeletedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Drivers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-drivers-user_id")
                            .from(Drivers::Table, Drivers::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Standalone expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::UserId).string().not_null())
                    .col(ColumnDef::new(Expenses::Category).string().not_null())
                    .col(ColumnDef::new(Expenses::Description).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::Date).date().not_null())
                    .col(ColumnDef::new(Expenses::LinkKind).string().not_null())
                    .col(ColumnDef::new(Expenses::LinkId).string())
                    .col(ColumnDef::new(Expenses::LinkName).string())
                    .col(ColumnDef::new(Expenses::Comments).json().not_null())
                    .col(ColumnDef::new(Expenses::IsDeleted).boolean().not_null())
                    .col(ColumnDef::new(Expenses::DeletedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Expenses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-user_id")
                            .from(Expenses::Table, Expenses::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Home transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(HomeTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HomeTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HomeTransactions::UserId).string().not_null())
                    .col(ColumnDef::new(HomeTransactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(HomeTransactions::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HomeTransactions::Category)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HomeTransactions::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(HomeTransactions::Date).date().not_null())
                    .col(
                        ColumnDef::new(HomeTransactions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-home_transactions-user_id")
                            .from(HomeTransactions::Table, HomeTransactions::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Custom categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::UserId).string().not_null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::NameNorm).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-user_id")
                            .from(Categories::Table, Categories::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-user_id-name_norm-unique")
                    .table(Categories::Table)
                    .col(Categories::UserId)
                    .col(Categories::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HomeTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Drivers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Freights::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
