//! Initial schema:
//!
//! - `users`: authentication for the HTTP API
//! - `cars`: vehicles owned by users, unique name per owner
//! - `fuel_records`: refuels, one row per visit to the pump

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum Cars {
    Table,
    Id,
    UserId,
    Name,
    NameNorm,
    CreatedAt,
}

#[derive(Iden)]
enum FuelRecords {
    Table,
    Id,
    UserId,
    CarId,
    CarName,
    Date,
    Mileage,
    LitersCenti,
    PricePerLiterMinor,
    TotalPriceMinor,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
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

        manager
            .create_table(
                Table::create()
                    .table(Cars::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Cars::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Cars::UserId).string().not_null())
                    .col(ColumnDef::new(Cars::Name).string().not_null())
                    .col(ColumnDef::new(Cars::NameNorm).string().not_null())
                    .col(
                        ColumnDef::new(Cars::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cars-user_id")
                            .from(Cars::Table, Cars::UserId)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Case-insensitive uniqueness of car names per owner.
        manager
            .create_index(
                Index::create()
                    .name("idx-cars-user_id-name_norm")
                    .table(Cars::Table)
                    .col(Cars::UserId)
                    .col(Cars::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FuelRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FuelRecords::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FuelRecords::UserId).string().not_null())
                    .col(ColumnDef::new(FuelRecords::CarId).uuid())
                    .col(ColumnDef::new(FuelRecords::CarName).string())
                    .col(ColumnDef::new(FuelRecords::Date).date().not_null())
                    .col(ColumnDef::new(FuelRecords::Mileage).double().not_null())
                    .col(
                        ColumnDef::new(FuelRecords::LitersCenti)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FuelRecords::PricePerLiterMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FuelRecords::TotalPriceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FuelRecords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-fuel_records-car_id")
                            .from(FuelRecords::Table, FuelRecords::CarId)
                            .to(Cars::Table, Cars::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-fuel_records-user_id-date")
                    .table(FuelRecords::Table)
                    .col(FuelRecords::UserId)
                    .col(FuelRecords::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-fuel_records-car_id")
                    .table(FuelRecords::Table)
                    .col(FuelRecords::CarId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FuelRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cars::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
