//! Asset operations.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    Engine, EngineError, ResultEngine,
    assets::Asset,
    commands::{AssetNew, AssetPatch},
    ledger::{self, Tombstone},
    util,
};

impl Engine {
    pub async fn new_asset(&mut self, user_id: &str, cmd: AssetNew) -> ResultEngine<Uuid> {
        let identifier = util::normalize_required_text(&cmd.identifier, "asset identifier")?;
        let asset = Asset {
            id: Uuid::new_v4(),
            kind: cmd.kind,
            identifier,
            description: util::normalize_optional_text(cmd.description),
            images: cmd.images,
            comments: Vec::new(),
            is_deleted: false,
            deleted_at: None,
            updated_at: Utc::now(),
        };
        let asset_id = asset.id;

        self.ledger_mut(user_id).assets.insert(0, asset);
        self.persist_asset(user_id, asset_id).await;
        Ok(asset_id)
    }

    pub fn asset(&self, user_id: &str, asset_id: Uuid) -> ResultEngine<Asset> {
        self.ledger(user_id)
            .and_then(|ledger| ledger::find(&ledger.assets, asset_id))
            .cloned()
            .ok_or_else(|| EngineError::KeyNotFound("asset not exists".to_string()))
    }

    /// Live assets, newest first.
    pub fn list_assets(&self, user_id: &str) -> Vec<Asset> {
        self.ledger(user_id)
            .map(|ledger| {
                ledger
                    .assets
                    .iter()
                    .filter(|a| !a.is_deleted())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub async fn update_asset(
        &mut self,
        user_id: &str,
        asset_id: Uuid,
        patch: AssetPatch,
    ) -> ResultEngine<()> {
        let identifier = patch
            .identifier
            .map(|i| util::normalize_required_text(&i, "asset identifier"))
            .transpose()?;

        let ledger = self.ledger_mut(user_id);
        let asset = ledger::find_mut(&mut ledger.assets, asset_id)
            .filter(|a| !a.is_deleted())
            .ok_or_else(|| EngineError::KeyNotFound("asset not exists".to_string()))?;
        if let Some(kind) = patch.kind {
            asset.kind = kind;
        }
        if let Some(identifier) = identifier {
            asset.identifier = identifier;
        }
        if let Some(description) = patch.description {
            asset.description = util::normalize_optional_text(description);
        }
        if let Some(images) = patch.images {
            asset.images = images;
        }
        asset.updated_at = Utc::now();

        self.persist_asset(user_id, asset_id).await;
        Ok(())
    }

    pub async fn delete_asset(&mut self, user_id: &str, asset_id: Uuid) -> ResultEngine<()> {
        let ledger = self.ledger_mut(user_id);
        ledger::soft_delete(&mut ledger.assets, asset_id, Utc::now())
            .ok_or_else(|| EngineError::KeyNotFound("asset not exists".to_string()))?;
        self.persist_asset(user_id, asset_id).await;
        Ok(())
    }

    pub async fn restore_asset(&mut self, user_id: &str, asset_id: Uuid) -> ResultEngine<()> {
        let ledger = self.ledger_mut(user_id);
        ledger::restore(&mut ledger.assets, asset_id)
            .ok_or_else(|| EngineError::KeyNotFound("asset not exists".to_string()))?;
        self.persist_asset(user_id, asset_id).await;
        Ok(())
    }

    pub async fn purge_asset(&mut self, user_id: &str, asset_id: Uuid) -> ResultEngine<()> {
        let ledger = self.ledger_mut(user_id);
        if ledger::purge(&mut ledger.assets, asset_id).is_some() {
            self.persist_asset(user_id, asset_id).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        AssetKind,
        commands::{AssetNew, AssetPatch},
        test_support,
    };

    #[tokio::test]
    async fn lifecycle_hides_and_recovers_the_asset() {
        let (mut engine, _dir) = test_support::engine().await;
        let id = engine
            .new_asset(
                "carol",
                AssetNew {
                    kind: AssetKind::Truck,
                    identifier: "Unit 12".to_string(),
                    description: None,
                    images: Vec::new(),
                },
            )
            .await
            .unwrap();
        assert_eq!(engine.list_assets("carol").len(), 1);

        engine.delete_asset("carol", id).await.unwrap();
        assert!(engine.list_assets("carol").is_empty());
        assert!(engine.asset("carol", id).unwrap().is_deleted);

        engine.restore_asset("carol", id).await.unwrap();
        assert_eq!(engine.list_assets("carol").len(), 1);

        engine.purge_asset("carol", id).await.unwrap();
        assert!(engine.asset("carol", id).is_err());
    }

    #[tokio::test]
    async fn blank_identifier_is_rejected_before_any_change() {
        let (mut engine, _dir) = test_support::engine().await;
        let id = engine
            .new_asset(
                "carol",
                AssetNew {
                    kind: AssetKind::BusinessCar,
                    identifier: "OH-PLT-1".to_string(),
                    description: None,
                    images: Vec::new(),
                },
            )
            .await
            .unwrap();

        let patch = AssetPatch {
            identifier: Some("   ".to_string()),
            ..AssetPatch::default()
        };
        assert!(engine.update_asset("carol", id, patch).await.is_err());
        assert_eq!(engine.asset("carol", id).unwrap().identifier, "OH-PLT-1");
    }
}
