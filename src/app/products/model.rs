//! 商品挂牌数据模型

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 创建挂牌的请求体
///
/// 字段按原样转存，不做类型或必填校验。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[serde(default)]
    pub product_name: Option<Value>,
    #[serde(default)]
    pub product_description: Option<Value>,
    #[serde(default)]
    pub product_price: Option<Value>,
    #[serde(default)]
    pub contact_info: Option<Value>,
}

/// 已盖上服务器时间、尚未分配标识的挂牌记录
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_description: Option<Value>,
    /// NaN 表示输入不是数字，JSON 中序列化为 `null`
    pub product_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// 已持久化的挂牌记录
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_description: Option<Value>,
    pub product_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// 创建成功的响应体
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreated {
    pub message: &'static str,
    pub inserted_id: String,
    pub product: Product,
}

impl NewProduct {
    /// 以当前服务器时间盖戳，精度截断到毫秒以与存储精度一致
    pub fn from_request(request: CreateProductRequest) -> Self {
        Self::stamped(request, Utc::now().trunc_subsecs(3))
    }

    pub fn stamped(request: CreateProductRequest, created_at: DateTime<Utc>) -> Self {
        let product_price = coerce_price(request.product_price.as_ref());
        Self {
            product_name: request.product_name,
            product_description: request.product_description,
            product_price,
            contact_info: request.contact_info,
            created_at,
        }
    }

    pub fn with_id(self, id: String) -> Product {
        Product {
            id,
            product_name: self.product_name,
            product_description: self.product_description,
            product_price: self.product_price,
            contact_info: self.contact_info,
            created_at: self.created_at,
        }
    }
}

/// 把任意输入转换成价格
///
/// 数字原样保留；字符串取开头最长的十进制数字面量；数组先按逗号拼接成字符串再解析，
/// 因此 `["3.5"]` 得到 3.5、`[]` 得到 NaN；其它情况一律为 NaN，不拒绝请求。
pub fn coerce_price(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => parse_leading_float(s),
        Some(array @ Value::Array(_)) => parse_leading_float(&stringify(array)),
        _ => f64::NAN,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// 解析字符串开头的十进制数，例如 `" 12.5kg"` 得到 12.5，`"abc"` 得到 NaN
pub fn parse_leading_float(input: &str) -> f64 {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        // 单独的 "." 不算数字
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return f64::NAN;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_parse_leading_float() {
        assert_eq!(parse_leading_float("3.50"), 3.5);
        assert_eq!(parse_leading_float("  7"), 7.0);
        assert_eq!(parse_leading_float("12abc"), 12.0);
        assert_eq!(parse_leading_float("-.5"), -0.5);
        assert_eq!(parse_leading_float("5."), 5.0);
        assert_eq!(parse_leading_float("1e3"), 1000.0);
        assert_eq!(parse_leading_float("2e"), 2.0);
        assert_eq!(parse_leading_float("4.5E-1 each"), 0.45);
        assert_eq!(parse_leading_float("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_leading_float("abc").is_nan());
        assert!(parse_leading_float("").is_nan());
        assert!(parse_leading_float(".").is_nan());
        assert!(parse_leading_float("-").is_nan());
        assert!(parse_leading_float("$3").is_nan());
    }

    #[test]
    fn test_coerce_price() {
        assert_eq!(coerce_price(Some(&json!(4.25))), 4.25);
        assert_eq!(coerce_price(Some(&json!(10))), 10.0);
        assert_eq!(coerce_price(Some(&json!("3.50"))), 3.5);
        assert!(coerce_price(Some(&json!("abc"))).is_nan());
        assert!(coerce_price(Some(&json!(true))).is_nan());
        assert!(coerce_price(Some(&json!({ "amount": 3 }))).is_nan());
        assert!(coerce_price(None).is_nan());
    }

    #[test]
    fn test_coerce_price_from_array() {
        assert_eq!(coerce_price(Some(&json!(["3.5"]))), 3.5);
        assert_eq!(coerce_price(Some(&json!([7]))), 7.0);
        assert_eq!(coerce_price(Some(&json!([["2.25"], "x"]))), 2.25);
        assert_eq!(coerce_price(Some(&json!(["4", "5"]))), 4.0);
        assert!(coerce_price(Some(&json!([]))).is_nan());
        assert!(coerce_price(Some(&json!([null, 1]))).is_nan());
        assert!(coerce_price(Some(&json!([{ "p": 1 }]))).is_nan());
    }

    #[test]
    fn test_fields_copied_verbatim() {
        let request: CreateProductRequest = serde_json::from_value(json!({
            "productName": "Tomatoes",
            "productPrice": "3.50",
            "contactInfo": 5551234
        }))
        .unwrap();
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        let product = NewProduct::stamped(request, created_at).with_id("abc123".to_string());

        let body = serde_json::to_value(&product).unwrap();
        assert_eq!(body["_id"], "abc123");
        assert_eq!(body["productName"], "Tomatoes");
        assert_eq!(body["productPrice"], 3.5);
        assert_eq!(body["contactInfo"], 5551234);
        assert_eq!(body["createdAt"], "2024-05-01T08:30:00Z");
        // 未提供的字段不会出现在记录中
        assert!(body.get("productDescription").is_none());
    }

    #[test]
    fn test_nan_price_serializes_as_null() {
        let request = CreateProductRequest {
            product_price: Some(json!("abc")),
            ..Default::default()
        };
        let product = NewProduct::from_request(request).with_id("x".to_string());
        assert!(product.product_price.is_nan());

        let body = serde_json::to_value(&product).unwrap();
        assert!(body["productPrice"].is_null());
    }

    #[test]
    fn test_created_at_has_millisecond_precision() {
        let product = NewProduct::from_request(CreateProductRequest::default());
        assert_eq!(product.created_at.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
