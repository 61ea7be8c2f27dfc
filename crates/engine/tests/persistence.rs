use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Engine, ExpenseCategory, FreightNew, FreightStatus, LoadExpenseNew, MoneyCents,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (username, password) VALUES (?, ?)",
        vec!["carol".into(), "password".into()],
    ))
    .await
    .unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn freight_cmd(label: &str) -> FreightNew {
    FreightNew {
        label: label.to_string(),
        origin: "Columbus, OH".to_string(),
        destination: "Nashville, TN".to_string(),
        distance_miles: 380.0,
        weight_lbs: 42_000.0,
        date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        driver_id: None,
        asset_id: None,
        line_haul: MoneyCents::new(100_000),
        fuel_surcharge: MoneyCents::new(10_000),
        loading: MoneyCents::ZERO,
        unloading: MoneyCents::ZERO,
        accessorials: MoneyCents::ZERO,
        owner_percentage: None,
        status: FreightStatus::Delivered,
        comment: Some("booked".to_string()),
        author: "dispatch".to_string(),
    }
}

#[tokio::test]
async fn freights_survive_an_engine_restart() {
    let (mut engine, db) = engine_with_db().await;
    let id = engine.new_freight("carol", freight_cmd("L-100")).await.unwrap();
    engine
        .add_load_expense(
            "carol",
            id,
            LoadExpenseNew {
                category: ExpenseCategory::from("fuel"),
                description: "fill up".to_string(),
                amount: MoneyCents::new(5_000),
                date: None,
            },
        )
        .await
        .unwrap();

    // A fresh engine over the same database hydrates the full freight,
    // nested arrays included.
    let rebuilt = Engine::builder().database(db).build().await.unwrap();
    let freight = rebuilt.freight("carol", id).unwrap();
    assert_eq!(freight.label, "L-100");
    assert_eq!(freight.revenue.cents(), 110_000);
    assert_eq!(freight.expenses.len(), 1);
    assert_eq!(freight.comments.len(), 1);
    assert_eq!(freight.total_expenses.cents(), 5_000);
}

#[tokio::test]
async fn soft_delete_state_survives_an_engine_restart() {
    let (mut engine, db) = engine_with_db().await;
    let id = engine.new_freight("carol", freight_cmd("L-200")).await.unwrap();
    engine.delete_freight("carol", id).await.unwrap();
    let deleted_at = engine.freight("carol", id).unwrap().deleted_at;

    let rebuilt = Engine::builder().database(db).build().await.unwrap();
    let freight = rebuilt.freight("carol", id).unwrap();
    assert!(freight.is_deleted);
    assert_eq!(freight.deleted_at, deleted_at);
    assert!(rebuilt.list_freights("carol", 50, None).unwrap().freights.is_empty());
}

#[tokio::test]
async fn purge_removes_the_row() {
    let (mut engine, db) = engine_with_db().await;
    let id = engine.new_freight("carol", freight_cmd("L-300")).await.unwrap();
    engine.purge_freight("carol", id).await.unwrap();

    let rebuilt = Engine::builder().database(db).build().await.unwrap();
    assert!(rebuilt.freight("carol", id).is_err());
}
