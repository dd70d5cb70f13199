use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    cli::run_cli(edemy_marketplace_migration::Migrator).await;
}
