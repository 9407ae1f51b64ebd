//! 数据库基础设施：MongoDB 挂牌集合

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    bson::{self, doc, oid::ObjectId, Bson, Document},
    options::ClientOptions,
    Client, Collection,
};
use serde::Serialize;
use serde_json::{Map, Number, Value};
use tracing::{error, info};

use crate::app::products::{
    model::NewProduct,
    store::{ProductStore, StoreError},
};
use crate::config::DatabaseConfig;

/// 挂牌集合名
pub const PRODUCTS_COLLECTION: &str = "products";

/// 写入集合的文档结构
///
/// 读取时不使用这个结构：集合没有模式约束，其它客户端写入的文档也要原样返回。
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    product_name: Option<Bson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    product_description: Option<Bson>,
    product_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    contact_info: Option<Bson>,
    created_at: bson::DateTime,
}

impl ProductDocument {
    fn encode(id: ObjectId, product: &NewProduct) -> Result<Self, StoreError> {
        Ok(Self {
            id,
            product_name: to_bson(product.product_name.as_ref())?,
            product_description: to_bson(product.product_description.as_ref())?,
            product_price: product.product_price,
            contact_info: to_bson(product.contact_info.as_ref())?,
            created_at: bson::DateTime::from_millis(product.created_at.timestamp_millis()),
        })
    }
}

fn to_bson(value: Option<&Value>) -> Result<Option<Bson>, StoreError> {
    value.map(bson::to_bson).transpose().map_err(StoreError::from)
}

/// 把存储中的文档转换成响应 JSON
///
/// 与创建接口的输出保持一致：ObjectId 输出为十六进制字符串，日期输出为 RFC 3339，
/// 非有限浮点数输出为 `null`；其余值按 relaxed extended JSON 转换，未知字段原样保留。
pub fn document_to_json(document: Document) -> Value {
    Value::Object(
        document
            .into_iter()
            .map(|(key, value)| (key, bson_to_json(value)))
            .collect::<Map<_, _>>(),
    )
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(id) => Value::String(id.to_hex()),
        Bson::DateTime(dt) => match Utc.timestamp_millis_opt(dt.timestamp_millis()).single() {
            Some(at) => serde_json::to_value(at).unwrap_or(Value::Null),
            None => Bson::DateTime(dt).into_relaxed_extjson(),
        },
        Bson::Double(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        Bson::Document(inner) => document_to_json(inner),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

/// 解析连接串，得到客户端选项和数据库名
///
/// 库名取自连接串路径并由驱动完成解码与合法性检查；路径为空时使用 `fallback`。
pub async fn resolve_options(
    uri: &str,
    fallback: &str,
) -> Result<(ClientOptions, String), StoreError> {
    let options = ClientOptions::parse(uri).await?;
    let database_name = options
        .default_database
        .clone()
        .unwrap_or_else(|| fallback.to_string());
    Ok((options, database_name))
}

/// MongoDB 挂牌存储
///
/// 进程内只建立一个客户端，驱动自身负责连接池。
pub struct MongoProductStore {
    client: Client,
    products: Collection<Document>,
}

impl MongoProductStore {
    /// 连接数据库并执行 ping 健康检查
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let uri = config
            .uri
            .as_deref()
            .ok_or_else(|| StoreError::Rejected("missing connection string".to_string()))?;

        let (options, database_name) = resolve_options(uri, &config.fallback_name)
            .await
            .map_err(|e| {
                error!("解析 MongoDB 连接串失败: {}", e);
                e
            })?;

        let client = Client::with_options(options).map_err(|e| {
            error!("创建 MongoDB 客户端失败: {}", e);
            e
        })?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| {
                error!("MongoDB ping 失败: {}", e);
                e
            })?;

        let products = client
            .database(&database_name)
            .collection::<Document>(PRODUCTS_COLLECTION);

        info!(
            "✅ 已连接 MongoDB，数据库: {}，集合: {}",
            database_name, PRODUCTS_COLLECTION
        );

        Ok(Self { client, products })
    }
}

#[async_trait]
impl ProductStore for MongoProductStore {
    async fn insert(&self, product: &NewProduct) -> Result<String, StoreError> {
        let document = ProductDocument::encode(ObjectId::new(), product)?;
        let result = self
            .products
            .clone_with_type::<ProductDocument>()
            .insert_one(document)
            .await?;

        match result.inserted_id {
            Bson::ObjectId(id) => Ok(id.to_hex()),
            other => Err(StoreError::UnexpectedId(other.to_string())),
        }
    }

    async fn find_newest_first(&self) -> Result<Vec<Value>, StoreError> {
        let cursor = self
            .products
            .find(doc! {})
            .sort(doc! { "createdAt": -1, "_id": -1 })
            .await?;

        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(document_to_json).collect())
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        info!("MongoDB 连接已关闭");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::products::model::CreateProductRequest;
    use chrono::SubsecRound;
    use serde_json::json;

    #[tokio::test]
    async fn test_database_name_from_uri_path() {
        let (_, name) = resolve_options("mongodb://localhost:27017/shop", "marketplace")
            .await
            .unwrap();
        assert_eq!(name, "shop");

        let (_, name) = resolve_options(
            "mongodb://localhost:27017/farm?retryWrites=true&w=majority",
            "marketplace",
        )
        .await
        .unwrap();
        assert_eq!(name, "farm");
    }

    #[tokio::test]
    async fn test_database_name_falls_back() {
        let (_, name) = resolve_options("mongodb://localhost:27017", "marketplace")
            .await
            .unwrap();
        assert_eq!(name, "marketplace");

        let (_, name) = resolve_options("mongodb://localhost:27017/?replicaSet=rs0", "marketplace")
            .await
            .unwrap();
        assert_eq!(name, "marketplace");
    }

    #[tokio::test]
    async fn test_illegal_database_name_is_rejected() {
        // 解码后含空格
        assert!(resolve_options("mongodb://localhost:27017/my%20db", "marketplace")
            .await
            .is_err());
        assert!(resolve_options("mongodb://localhost:27017/a/b", "marketplace")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_connect_fails_before_touching_the_network() {
        let config = DatabaseConfig {
            uri: Some("mongodb://localhost:27017/a/b".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            MongoProductStore::connect(&config).await,
            Err(StoreError::Driver(_))
        ));

        let config = DatabaseConfig::default();
        assert!(matches!(
            MongoProductStore::connect(&config).await,
            Err(StoreError::Rejected(_))
        ));
    }

    #[test]
    fn test_written_document_round_trips_to_json() {
        let request = CreateProductRequest {
            product_name: Some(json!("Tomatoes")),
            product_price: Some(json!("abc")),
            contact_info: Some(json!({ "phone": "555-1234" })),
            ..Default::default()
        };
        let new_product = NewProduct::stamped(request, Utc::now().trunc_subsecs(3));
        let id = ObjectId::new();

        let document =
            bson::to_document(&ProductDocument::encode(id, &new_product).unwrap()).unwrap();
        assert!(document.get("productDescription").is_none());
        assert!(document.get_f64("productPrice").unwrap().is_nan());
        assert!(document.get_datetime("createdAt").is_ok());

        // 与创建接口返回的 product 完全一致
        let expected = serde_json::to_value(new_product.with_id(id.to_hex())).unwrap();
        assert_eq!(document_to_json(document), expected);
    }

    #[test]
    fn test_foreign_documents_are_returned_verbatim() {
        let missing_price = doc! {
            "_id": ObjectId::new(),
            "productName": "Jam",
            "createdAt": bson::DateTime::from_millis(1_700_000_000_000),
        };
        let json = document_to_json(missing_price);
        assert_eq!(json["productName"], "Jam");
        assert!(json.get("productPrice").is_none());
        assert_eq!(json["createdAt"], "2023-11-14T22:13:20Z");

        let string_price = doc! { "_id": "legacy-1", "productPrice": "9.99", "qty": 3_i32 };
        assert_eq!(
            document_to_json(string_price),
            json!({ "_id": "legacy-1", "productPrice": "9.99", "qty": 3 })
        );

        let extra_field = doc! {
            "_id": ObjectId::new(),
            "productPrice": 4.0,
            "extra": "kept?",
            "tags": ["a", { "at": bson::DateTime::from_millis(0) }],
        };
        let json = document_to_json(extra_field);
        assert_eq!(json["extra"], "kept?");
        assert_eq!(json["productPrice"], 4.0);
        assert_eq!(json["tags"], json!(["a", { "at": "1970-01-01T00:00:00Z" }]));
    }
}
