//! Item field validation
//!
//! [`ItemMutationValidator`] never looks at who is asking; it only sees the
//! fields the access policy already let through.

use super::config::ValidationConfig;
use super::{filters, validators};
use crate::core::entity::{Item, NewItem};
use crate::core::error::{AppError, ConflictError, ValidationError};
use crate::core::field::ProposedFields;
use crate::core::mutation::fields;
use crate::core::price::Price;
use crate::core::service::ItemLookup;
use serde_json::Value;

/// Whether the fields describe a new item or changes to an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemMode {
    Create,
    Update { id: i64, current_name: String },
}

/// Normalized item fields
///
/// On create every field is filled (defaults applied); on update only the
/// supplied ones are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i32>,
    pub price: Option<Price>,
}

impl ItemChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.quantity.is_none()
            && self.price.is_none()
    }

    /// Back to raw fields; validating the result yields `self` again
    pub fn to_fields(&self) -> ProposedFields {
        let mut out = ProposedFields::new();
        if let Some(name) = &self.name {
            out.insert(fields::NAME, name.as_str());
        }
        if let Some(description) = &self.description {
            out.insert(fields::DESCRIPTION, description.as_str());
        }
        if let Some(quantity) = self.quantity {
            out.insert(fields::QUANTITY, quantity);
        }
        if let Some(price) = self.price {
            out.insert(fields::PRICE, price.as_f64());
        }
        out
    }

    pub fn apply_to(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(price) = self.price {
            item.price = price;
        }
    }

    /// Build an insertable item; only `name` is mandatory
    pub fn into_new_item(self) -> Result<NewItem, ValidationError> {
        let name = self
            .name
            .ok_or_else(|| ValidationError::single(fields::NAME, "name is required"))?;
        Ok(NewItem {
            name,
            description: self.description.unwrap_or_default(),
            quantity: self.quantity.unwrap_or(0),
            price: self.price.unwrap_or(Price::ZERO),
        })
    }
}

/// Validates and normalizes proposed item fields
pub struct ItemMutationValidator {
    create: ValidationConfig,
    update: ValidationConfig,
}

impl Default for ItemMutationValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemMutationValidator {
    pub fn new() -> Self {
        Self {
            create: Self::config(true),
            update: Self::config(false),
        }
    }

    fn config(create: bool) -> ValidationConfig {
        let mut config = ValidationConfig::new();

        if create {
            config.require(fields::NAME);
        }
        config.add_filter(fields::NAME, filters::trim());
        config.add_validator(fields::NAME, validators::required());
        config.add_validator(fields::NAME, validators::string());
        config.add_validator(fields::NAME, validators::string_length(2, 100));

        config.add_validator(fields::DESCRIPTION, validators::string());

        config.add_filter(fields::QUANTITY, filters::numeric_string());
        config.add_filter(fields::QUANTITY, filters::integral());
        config.add_validator(fields::QUANTITY, validators::non_negative_integer());

        config.add_filter(fields::PRICE, filters::numeric_string());
        config.add_filter(fields::PRICE, filters::round_decimals(2));
        config.add_validator(fields::PRICE, validators::non_negative_number());
        config.add_validator(fields::PRICE, validators::max_value(Price::MAX.as_f64()));

        config
    }

    /// Type, range and presence checks; no lookups
    pub fn validate_fields(
        &self,
        proposed: &ProposedFields,
        mode: &ItemMode,
    ) -> Result<ItemChanges, ValidationError> {
        let config = match mode {
            ItemMode::Create => &self.create,
            ItemMode::Update { .. } => &self.update,
        };

        let clean = config
            .validate_and_filter(proposed)
            .map_err(ValidationError::FieldErrors)?;

        let mut changes = ItemChanges {
            name: clean.get(fields::NAME).and_then(Value::as_str).map(str::to_string),
            description: clean
                .get(fields::DESCRIPTION)
                .and_then(Value::as_str)
                .map(str::to_string),
            quantity: clean
                .get(fields::QUANTITY)
                .and_then(Value::as_i64)
                .and_then(|q| i32::try_from(q).ok()),
            price: clean
                .get(fields::PRICE)
                .and_then(Value::as_f64)
                .and_then(Price::from_f64),
        };

        match mode {
            ItemMode::Create => {
                changes.description.get_or_insert_with(String::new);
                changes.quantity.get_or_insert(0);
                changes.price.get_or_insert(Price::ZERO);
            }
            ItemMode::Update { .. } if changes.is_empty() => {
                return Err(ValidationError::single("fields", "no field to update"));
            }
            ItemMode::Update { .. } => {}
        }

        Ok(changes)
    }

    /// Full validation including the duplicate-name pre-check
    ///
    /// The store still enforces uniqueness on write; this only produces the
    /// friendlier error in the common case.
    pub async fn validate<L>(
        &self,
        proposed: &ProposedFields,
        mode: &ItemMode,
        lookup: &L,
    ) -> Result<ItemChanges, AppError>
    where
        L: ItemLookup + ?Sized,
    {
        let changes = self.validate_fields(proposed, mode)?;

        if let Some(name) = changes.name.as_deref() {
            let (own_id, unchanged) = match mode {
                ItemMode::Create => (None, false),
                ItemMode::Update { id, current_name } => (Some(*id), name == current_name),
            };
            if !name.is_empty() && !unchanged {
                let existing = lookup.find_item_by_name(name).await?;
                if existing.is_some_and(|other| Some(other) != own_id) {
                    return Err(ConflictError::duplicate("item", fields::NAME, name).into());
                }
            }
        }

        Ok(changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct Names(Vec<(i64, &'static str)>);

    #[async_trait]
    impl ItemLookup for Names {
        async fn find_item_by_name(&self, name: &str) -> Result<Option<i64>, AppError> {
            Ok(self.0.iter().find(|(_, n)| *n == name).map(|(id, _)| *id))
        }
    }

    fn update(id: i64, current: &str) -> ItemMode {
        ItemMode::Update {
            id,
            current_name: current.to_string(),
        }
    }

    fn messages(err: ValidationError) -> Vec<String> {
        match err {
            ValidationError::FieldErrors(errors) => errors.into_iter().map(|e| e.message).collect(),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_name_length_boundaries() {
        let validator = ItemMutationValidator::new();
        let mode = update(1, "Widget");

        assert!(validator
            .validate_fields(&ProposedFields::new().with("name", "ab"), &mode)
            .is_ok());

        let err = validator
            .validate_fields(&ProposedFields::new().with("name", "a"), &mode)
            .unwrap_err();
        assert_eq!(messages(err), vec!["name must be between 2 and 100 characters"]);

        let long = "x".repeat(101);
        assert!(validator
            .validate_fields(&ProposedFields::new().with("name", long), &mode)
            .is_err());
    }

    #[test]
    fn test_name_is_trimmed_before_length_check() {
        let changes = ItemMutationValidator::new()
            .validate_fields(&ProposedFields::new().with("name", "  Bolt  "), &ItemMode::Create)
            .unwrap();
        assert_eq!(changes.name.as_deref(), Some("Bolt"));

        let err = ItemMutationValidator::new()
            .validate_fields(&ProposedFields::new().with("name", "  a "), &ItemMode::Create)
            .unwrap_err();
        assert_eq!(messages(err), vec!["name must be between 2 and 100 characters"]);
    }

    #[test]
    fn test_quantity_rules() {
        let validator = ItemMutationValidator::new();
        let mode = update(1, "Widget");
        let check = |value: Value| {
            validator.validate_fields(&ProposedFields::new().with("quantity", value), &mode)
        };

        assert_eq!(check(json!(0)).unwrap().quantity, Some(0));
        assert_eq!(check(json!("7")).unwrap().quantity, Some(7));
        assert_eq!(check(json!(3.0)).unwrap().quantity, Some(3));
        for bad in [json!(-1), json!(2.5), json!("lots"), json!(true)] {
            assert_eq!(messages(check(bad).unwrap_err()), vec!["invalid quantity"]);
        }
    }

    #[test]
    fn test_price_rules() {
        let validator = ItemMutationValidator::new();
        let mode = update(1, "Widget");
        let check = |value: Value| {
            validator.validate_fields(&ProposedFields::new().with("price", value), &mode)
        };

        assert_eq!(check(json!(9.999)).unwrap().price, Price::from_cents(1000));
        assert_eq!(check(json!("4.5")).unwrap().price, Price::from_cents(450));
        assert_eq!(check(json!(0)).unwrap().price, Some(Price::ZERO));
        assert_eq!(messages(check(json!(-1)).unwrap_err()), vec!["invalid price"]);
        assert_eq!(messages(check(json!("free")).unwrap_err()), vec!["invalid price"]);
    }

    #[test]
    fn test_tiny_negative_price_is_not_rounded_to_zero() {
        let validator = ItemMutationValidator::new();
        let check = |value: Value| {
            validator.validate_fields(
                &ProposedFields::new().with("name", "Widget").with("price", value),
                &ItemMode::Create,
            )
        };

        for bad in [json!(-0.001), json!("-0.004")] {
            assert_eq!(messages(check(bad).unwrap_err()), vec!["invalid price"]);
        }
        assert_eq!(check(json!(0.004)).unwrap().price, Some(Price::ZERO));
    }

    #[test]
    fn test_create_requires_name_and_applies_defaults() {
        let validator = ItemMutationValidator::new();

        let err = validator
            .validate_fields(&ProposedFields::new().with("quantity", 1), &ItemMode::Create)
            .unwrap_err();
        assert_eq!(messages(err), vec!["name is required"]);

        let changes = validator
            .validate_fields(&ProposedFields::new().with("name", "Widget"), &ItemMode::Create)
            .unwrap();
        let item = changes.into_new_item().unwrap();
        assert_eq!(item.description, "");
        assert_eq!(item.quantity, 0);
        assert_eq!(item.price, Price::ZERO);
    }

    #[test]
    fn test_empty_update_is_rejected() {
        let err = ItemMutationValidator::new()
            .validate_fields(&ProposedFields::new(), &update(1, "Widget"))
            .unwrap_err();
        assert_eq!(messages(err), vec!["no field to update"]);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let validator = ItemMutationValidator::new();
        let proposed = ProposedFields::new()
            .with("name", " Widget ")
            .with("quantity", "5")
            .with("price", 9.994);

        let first = validator.validate_fields(&proposed, &ItemMode::Create).unwrap();
        let second = validator
            .validate_fields(&first.to_fields(), &ItemMode::Create)
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_duplicate_name_on_create() {
        let lookup = Names(vec![(1, "Widget")]);
        let err = ItemMutationValidator::new()
            .validate(&ProposedFields::new().with("name", "Widget"), &ItemMode::Create, &lookup)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.to_string(), "duplicate name");
    }

    #[tokio::test]
    async fn test_renaming_to_own_name_is_not_a_conflict() {
        let lookup = Names(vec![(1, "Widget"), (2, "Gadget")]);
        let validator = ItemMutationValidator::new();

        let same = validator
            .validate(&ProposedFields::new().with("name", "Widget"), &update(1, "Widget"), &lookup)
            .await;
        assert!(same.is_ok());

        let taken = validator
            .validate(&ProposedFields::new().with("name", "Gadget"), &update(1, "Widget"), &lookup)
            .await;
        assert!(matches!(taken, Err(AppError::Conflict(_))));
    }
}
