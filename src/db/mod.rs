use std::collections::HashMap;

use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{Item, ItemPatch};

/// Thin adapter over the items table. Built once at startup and shared
/// across requests; holds no mutable state of its own.
#[derive(Clone)]
pub struct ItemStore {
    client: Client,
    table: String,
}

impl ItemStore {
    /// Connect using the default AWS provider chain. A configured
    /// DYNAMODB_ENDPOINT is applied as an endpoint override on the same
    /// loader; there is no separate code path for local stores.
    pub async fn connect(config: &Config) -> Self {
        let region = aws_config::Region::new(config.aws_region.clone());
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);
        if let Some(endpoint) = &config.dynamodb_endpoint {
            loader = loader.endpoint_url(endpoint.clone());
        }
        let sdk_config = loader.load().await;
        Self {
            client: Client::new(&sdk_config),
            table: config.table_name.clone(),
        }
    }

    /// Health probe: the table must be describable.
    pub async fn ping(&self) -> AppResult<()> {
        self.client
            .describe_table()
            .table_name(&self.table)
            .send()
            .await
            .map_err(store_err)?;
        Ok(())
    }

    /// Full scan, drained through the paginator.
    pub async fn scan_items(&self) -> AppResult<Vec<Item>> {
        let attrs = self
            .client
            .scan()
            .table_name(&self.table)
            .into_paginator()
            .items()
            .send()
            .collect::<Result<Vec<_>, _>>()
            .await
            .map_err(store_err)?;
        Ok(attrs.iter().map(Item::from_attrs).collect())
    }

    pub async fn get(&self, id: &str) -> AppResult<Item> {
        let resp = self
            .client
            .get_item()
            .table_name(&self.table)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(store_err)?;
        resp.item().map(Item::from_attrs).ok_or(AppError::NotFound)
    }

    pub async fn put(&self, item: &Item) -> AppResult<()> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(item.to_attrs()))
            .send()
            .await
            .map_err(store_err)?;
        Ok(())
    }

    /// Partial update driven by the change-set. updated_at is always
    /// refreshed, created_at is never touched. Returns the full
    /// post-update record.
    pub async fn update(&self, id: &str, patch: &ItemPatch, updated_at: &str) -> AppResult<Item> {
        let expr = build_update_expression(patch, updated_at);
        let resp = self
            .client
            .update_item()
            .table_name(&self.table)
            .key("id", AttributeValue::S(id.to_string()))
            .update_expression(expr.expression)
            .set_expression_attribute_names(Some(expr.names))
            .set_expression_attribute_values(Some(expr.values))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(store_err)?;
        resp.attributes()
            .map(Item::from_attrs)
            .ok_or_else(|| AppError::Store("update returned no attributes".to_string()))
    }

    /// Unconditional delete; removing an absent id succeeds.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(store_err)?;
        Ok(())
    }
}

fn store_err<E>(err: SdkError<E>) -> AppError
where
    E: std::error::Error + Send + Sync + 'static,
{
    AppError::Store(DisplayErrorContext(err).to_string())
}

struct UpdateExpression {
    expression: String,
    names: HashMap<String, String>,
    values: HashMap<String, AttributeValue>,
}

/// One SET clause per present field plus the unconditional updated_at.
/// Every attribute goes through an expression name, so reserved words
/// (`name`, `status`) need no special casing.
fn build_update_expression(patch: &ItemPatch, updated_at: &str) -> UpdateExpression {
    let mut clauses = vec!["#updated_at = :updated_at".to_string()];
    let mut names = HashMap::from([("#updated_at".to_string(), "updated_at".to_string())]);
    let mut values = HashMap::from([(
        ":updated_at".to_string(),
        AttributeValue::S(updated_at.to_string()),
    )]);

    for (attr, value) in patch.fields() {
        clauses.push(format!("#{attr} = :{attr}"));
        names.insert(format!("#{attr}"), attr.to_string());
        values.insert(format!(":{attr}"), AttributeValue::S(value.to_string()));
    }

    UpdateExpression {
        expression: format!("SET {}", clauses.join(", ")),
        names,
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_touches_only_updated_at() {
        let expr = build_update_expression(&ItemPatch::default(), "2025-01-01T00:00:00.000000Z");
        assert_eq!(expr.expression, "SET #updated_at = :updated_at");
        assert_eq!(expr.names.len(), 1);
        assert_eq!(
            expr.values.get(":updated_at"),
            Some(&AttributeValue::S("2025-01-01T00:00:00.000000Z".to_string()))
        );
    }

    #[test]
    fn full_patch_emits_one_clause_per_field() {
        let patch = ItemPatch {
            name: Some("Widget".into()),
            description: Some(String::new()),
            status: Some("inactive".into()),
        };
        let expr = build_update_expression(&patch, "t");
        assert_eq!(
            expr.expression,
            "SET #updated_at = :updated_at, #name = :name, #description = :description, #status = :status"
        );
        assert_eq!(expr.names.get("#name").map(String::as_str), Some("name"));
        assert_eq!(
            expr.values.get(":description"),
            Some(&AttributeValue::S(String::new()))
        );
        assert_eq!(
            expr.values.get(":status"),
            Some(&AttributeValue::S("inactive".to_string()))
        );
    }

    #[test]
    fn partial_patch_skips_absent_fields() {
        let patch = ItemPatch {
            status: Some("archived".into()),
            ..ItemPatch::default()
        };
        let expr = build_update_expression(&patch, "t");
        assert_eq!(
            expr.expression,
            "SET #updated_at = :updated_at, #status = :status"
        );
        assert!(!expr.names.contains_key("#name"));
        assert!(!expr.values.contains_key(":description"));
    }

    #[test]
    fn created_at_is_never_assigned() {
        let patch = ItemPatch {
            name: Some("n".into()),
            description: Some("d".into()),
            status: Some("s".into()),
        };
        let expr = build_update_expression(&patch, "t");
        assert!(!expr.expression.contains("created_at"));
    }
}
