//! Driver operations and the payroll projection.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    Engine, EngineError, MoneyCents, ResultEngine,
    commands::{DriverNew, DriverPatch},
    drivers::{self, Driver},
    ledger::{self, Tombstone},
    util,
};

impl Engine {
    pub async fn new_driver(&mut self, user_id: &str, cmd: DriverNew) -> ResultEngine<Uuid> {
        let name = util::normalize_required_text(&cmd.name, "driver name")?;
        let driver = Driver {
            id: Uuid::new_v4(),
            name,
            pay: cmd.pay,
            images: cmd.images,
            comments: Vec::new(),
            is_deleted: false,
            deleted_at: None,
            updated_at: Utc::now(),
        };
        let driver_id = driver.id;

        self.ledger_mut(user_id).drivers.insert(0, driver);
        self.persist_driver(user_id, driver_id).await;
        Ok(driver_id)
    }

    pub fn driver(&self, user_id: &str, driver_id: Uuid) -> ResultEngine<Driver> {
        self.ledger(user_id)
            .and_then(|ledger| ledger::find(&ledger.drivers, driver_id))
            .cloned()
            .ok_or_else(|| EngineError::KeyNotFound("driver not exists".to_string()))
    }

    /// Live drivers, newest first.
    pub fn list_drivers(&self, user_id: &str) -> Vec<Driver> {
        self.ledger(user_id)
            .map(|ledger| {
                ledger
                    .drivers
                    .iter()
                    .filter(|d| !d.is_deleted())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Renaming a driver never rewrites the name snapshots already taken on
    /// freights or expense links.
    pub async fn update_driver(
        &mut self,
        user_id: &str,
        driver_id: Uuid,
        patch: DriverPatch,
    ) -> ResultEngine<()> {
        let name = patch
            .name
            .map(|n| util::normalize_required_text(&n, "driver name"))
            .transpose()?;

        let ledger = self.ledger_mut(user_id);
        let driver = ledger::find_mut(&mut ledger.drivers, driver_id)
            .filter(|d| !d.is_deleted())
            .ok_or_else(|| EngineError::KeyNotFound("driver not exists".to_string()))?;
        if let Some(name) = name {
            driver.name = name;
        }
        if let Some(pay) = patch.pay {
            driver.pay = pay;
        }
        if let Some(images) = patch.images {
            driver.images = images;
        }
        driver.updated_at = Utc::now();

        self.persist_driver(user_id, driver_id).await;
        Ok(())
    }

    pub async fn delete_driver(&mut self, user_id: &str, driver_id: Uuid) -> ResultEngine<()> {
        let ledger = self.ledger_mut(user_id);
        ledger::soft_delete(&mut ledger.drivers, driver_id, Utc::now())
            .ok_or_else(|| EngineError::KeyNotFound("driver not exists".to_string()))?;
        self.persist_driver(user_id, driver_id).await;
        Ok(())
    }

    pub async fn restore_driver(&mut self, user_id: &str, driver_id: Uuid) -> ResultEngine<()> {
        let ledger = self.ledger_mut(user_id);
        ledger::restore(&mut ledger.drivers, driver_id)
            .ok_or_else(|| EngineError::KeyNotFound("driver not exists".to_string()))?;
        self.persist_driver(user_id, driver_id).await;
        Ok(())
    }

    pub async fn purge_driver(&mut self, user_id: &str, driver_id: Uuid) -> ResultEngine<()> {
        let ledger = self.ledger_mut(user_id);
        if ledger::purge(&mut ledger.drivers, driver_id).is_some() {
            self.persist_driver(user_id, driver_id).await;
        }
        Ok(())
    }

    /// Total pay for a driver over a chosen subset of their freights.
    /// A read-only projection; nothing is stored. Ids that do not belong to
    /// the driver or are deleted are skipped, not errors.
    pub fn payroll(
        &self,
        user_id: &str,
        driver_id: Uuid,
        freight_ids: &[Uuid],
    ) -> ResultEngine<MoneyCents> {
        let driver = self
            .ledger(user_id)
            .and_then(|ledger| ledger::find(&ledger.drivers, driver_id))
            .ok_or_else(|| EngineError::KeyNotFound("driver not exists".to_string()))?;

        let Some(ledger) = self.ledger(user_id) else {
            return Ok(MoneyCents::ZERO);
        };
        let selected: Vec<_> = ledger
            .freights
            .iter()
            .filter(|f| {
                !f.is_deleted() && f.driver_id == Some(driver_id) && freight_ids.contains(&f.id)
            })
            .collect();
        Ok(drivers::payroll(driver.pay, &selected))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::{
        PayRate,
        commands::DriverNew,
        ops::freights::tests::new_cmd,
        test_support,
    };

    #[tokio::test]
    async fn payroll_covers_only_the_selected_loads_of_that_driver() {
        let (mut engine, _dir) = test_support::engine().await;
        let driver_id = engine
            .new_driver(
                "carol",
                DriverNew {
                    name: "Alice".to_string(),
                    pay: PayRate::PerMile { cents_per_mile: 55 },
                    images: Vec::new(),
                },
            )
            .await
            .unwrap();

        let mut cmd = new_cmd("L-100", NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(), 100_000);
        cmd.driver_id = Some(driver_id);
        let a = engine.new_freight("carol", cmd).await.unwrap();

        let mut cmd = new_cmd("L-101", NaiveDate::from_ymd_opt(2026, 3, 3).unwrap(), 80_000);
        cmd.driver_id = Some(driver_id);
        let b = engine.new_freight("carol", cmd).await.unwrap();

        // 380 miles at 55¢/mile per load.
        let one = engine.payroll("carol", driver_id, &[a]).unwrap();
        assert_eq!(one.cents(), 20_900);
        let both = engine.payroll("carol", driver_id, &[a, b]).unwrap();
        assert_eq!(both.cents(), 41_800);
    }

    #[tokio::test]
    async fn freight_snapshot_survives_a_rename() {
        let (mut engine, _dir) = test_support::engine().await;
        let driver_id = engine
            .new_driver(
                "carol",
                DriverNew {
                    name: "Alice".to_string(),
                    pay: PayRate::Percentage { percent: 25 },
                    images: Vec::new(),
                },
            )
            .await
            .unwrap();
        let mut cmd = new_cmd("L-100", NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(), 100_000);
        cmd.driver_id = Some(driver_id);
        let freight_id = engine.new_freight("carol", cmd).await.unwrap();

        engine
            .update_driver(
                "carol",
                driver_id,
                crate::commands::DriverPatch {
                    name: Some("Alice B.".to_string()),
                    ..crate::commands::DriverPatch::default()
                },
            )
            .await
            .unwrap();

        let freight = engine.freight("carol", freight_id).unwrap();
        assert_eq!(freight.driver_name.as_deref(), Some("Alice"));
    }
}
