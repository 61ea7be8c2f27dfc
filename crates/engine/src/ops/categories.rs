//! Category operations: the predefined list merged with per-user custom
//! entries.

use uuid::Uuid;

use crate::{
    Engine, EngineError, ResultEngine,
    categories::{CustomCategory, PredefinedCategory, normalize_category},
    util,
};

impl Engine {
    /// Registers a custom category. The normalized name must collide with
    /// neither the predefined set nor an existing custom entry.
    pub async fn add_category(&mut self, user_id: &str, name: &str) -> ResultEngine<Uuid> {
        let name = util::normalize_required_text(name, "category name")?;
        let norm = normalize_category(&name);
        if PredefinedCategory::ALL.iter().any(|c| c.as_str() == norm) {
            return Err(EngineError::ExistingKey(name));
        }
        if self
            .ledger(user_id)
            .is_some_and(|ledger| ledger.categories.iter().any(|c| c.name_norm == norm))
        {
            return Err(EngineError::ExistingKey(name));
        }

        let category = CustomCategory::new(&name);
        let category_id = category.id;
        self.ledger_mut(user_id).categories.push(category);
        self.persist_category(user_id, category_id).await;
        Ok(category_id)
    }

    /// The predefined names followed by the user's custom names.
    pub fn list_categories(&self, user_id: &str) -> Vec<String> {
        let mut names: Vec<String> = PredefinedCategory::ALL
            .iter()
            .map(|c| c.as_str().to_string())
            .collect();
        if let Some(ledger) = self.ledger(user_id) {
            names.extend(ledger.categories.iter().map(|c| c.name.clone()));
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support;

    #[tokio::test]
    async fn custom_category_dedupes_against_predefined_and_custom() {
        let (mut engine, _dir) = test_support::engine().await;
        assert!(engine.add_category("carol", " Fuel ").await.is_err());

        engine.add_category("carol", "Scale tickets").await.unwrap();
        assert!(engine.add_category("carol", "scale TICKETS").await.is_err());

        let names = engine.list_categories("carol");
        assert_eq!(names.first().map(String::as_str), Some("fuel"));
        assert!(names.contains(&"Scale tickets".to_string()));
    }
}
