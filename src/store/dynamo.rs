//! AWS DynamoDB record store.
//!
//! Products are stored in a single table keyed by `id`. Records cross
//! the SDK boundary as attribute-value maps converted through
//! `serde_json::Value`, so the stored shape matches the wire JSON.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use serde_json::Value;
use tracing::{debug, info};

use super::{RecordStore, Result, StoreError};
use crate::config::DynamoConfig;
use crate::product::Product;

/// Partition key attribute name.
const KEY_ATTR: &str = "id";

/// DynamoDB implementation of [`RecordStore`].
pub struct DynamoRecordStore {
    client: DynamoClient,
    table: String,
}

impl DynamoRecordStore {
    /// Create a store against the configured table.
    ///
    /// Region and endpoint fall back to the default AWS provider chain
    /// when not set; a custom endpoint supports LocalStack.
    pub async fn new(config: &DynamoConfig) -> Self {
        let mut aws_config_builder = aws_config::defaults(BehaviorVersion::latest());

        if let Some(ref region) = config.region {
            aws_config_builder =
                aws_config_builder.region(aws_config::Region::new(region.clone()));
        }

        if let Some(ref endpoint) = config.endpoint_url {
            aws_config_builder = aws_config_builder.endpoint_url(endpoint);
        }

        let aws_config = aws_config_builder.load().await;
        let client = DynamoClient::new(&aws_config);

        info!(
            table = %config.table,
            region = ?config.region,
            endpoint = ?config.endpoint_url,
            "Connected to DynamoDB"
        );

        Self {
            client,
            table: config.table.clone(),
        }
    }
}

#[async_trait]
impl RecordStore for DynamoRecordStore {
    async fn get(&self, id: &str) -> Result<Option<Product>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(KEY_ATTR, AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("DynamoDB get_item failed: {}", e)))?;

        output.item.map(item_to_product).transpose()
    }

    async fn put(&self, product: &Product) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(product_to_item(product)?))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("DynamoDB put_item failed: {}", e)))?;

        debug!(id = %product.id, "Persisted product record");
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<Product>> {
        // Drain every page; a single Scan call returns at most 1 MB.
        let mut products = Vec::new();
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| StoreError::Backend(format!("DynamoDB scan failed: {}", e)))?;

            for item in output.items.unwrap_or_default() {
                products.push(item_to_product(item)?);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(products)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        // DeleteItem succeeds whether or not the item exists.
        self.client
            .delete_item()
            .table_name(&self.table)
            .key(KEY_ATTR, AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Backend(format!("DynamoDB delete_item failed: {}", e)))?;

        Ok(())
    }
}

/// Serialize a product to a DynamoDB item.
fn product_to_item(product: &Product) -> Result<HashMap<String, AttributeValue>> {
    let value = serde_json::to_value(product)
        .map_err(|e| StoreError::Serde(format!("Failed to serialize product: {}", e)))?;

    match value {
        Value::Object(map) => Ok(map
            .into_iter()
            .map(|(k, v)| (k, value_to_attr(v)))
            .collect()),
        _ => Err(StoreError::Serde("Product did not serialize to a map".to_string())),
    }
}

/// Deserialize a DynamoDB item back into a product.
fn item_to_product(item: HashMap<String, AttributeValue>) -> Result<Product> {
    let map: serde_json::Map<String, Value> = item
        .into_iter()
        .map(|(k, v)| (k, attr_to_value(v)))
        .collect();

    serde_json::from_value(Value::Object(map))
        .map_err(|e| StoreError::Serde(format!("Failed to deserialize product: {}", e)))
}

fn value_to_attr(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(items) => {
            AttributeValue::L(items.into_iter().map(value_to_attr).collect())
        }
        Value::Object(map) => AttributeValue::M(
            map.into_iter().map(|(k, v)| (k, value_to_attr(v))).collect(),
        ),
    }
}

fn attr_to_value(attr: AttributeValue) -> Value {
    match attr {
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::Bool(b) => Value::Bool(b),
        AttributeValue::N(n) => n
            .parse::<i64>()
            .map(Value::from)
            .or_else(|_| n.parse::<f64>().map(Value::from))
            .unwrap_or(Value::Null),
        AttributeValue::S(s) => Value::String(s),
        AttributeValue::L(items) => {
            Value::Array(items.into_iter().map(attr_to_value).collect())
        }
        AttributeValue::M(map) => Value::Object(
            map.into_iter().map(|(k, v)| (k, attr_to_value(v))).collect(),
        ),
        // Set and binary types never appear in product records.
        _ => Value::Null,
    }
}
