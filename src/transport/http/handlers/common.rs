use crate::app::inventory_service::{CreateItemInput, ServiceError, UpdateItemInput};
use crate::domain::{ItemStatus, ManualStatus, StatusWrite};
use crate::transport::http::types::{
    ApiResponse, CreateItemRequest, ReduceStockRequest, UpdateItemRequest,
};
use axum::extract::OriginalUri;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub expected: String,
    pub got: String,
    pub value: JsonValue,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Validation/coercion failed")]
    Validation(Vec<FieldError>),
    #[error("Item not found")]
    NotFound,
    #[error("Database error: {message}")]
    Store { message: String, details: String },
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(msg) => ApiError::BadRequest(msg),
            ServiceError::NotFound => ApiError::NotFound,
            ServiceError::Store { source, hint } => ApiError::Store {
                message: source.to_string(),
                details: hint.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, data, error) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, None, msg),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Some(serde_json::json!({ "errors": errors })),
                "Validation/coercion failed".to_string(),
            ),
            ApiError::NotFound => (StatusCode::NOT_FOUND, None, "Item not found".to_string()),
            ApiError::Store { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Some(serde_json::json!({ "message": message, "details": details })),
                "Database error".to_string(),
            ),
        };
        (
            status,
            Json(ApiResponse {
                success: false,
                data,
                error: Some(error),
            }),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

pub async fn api_not_found_handler(OriginalUri(uri): OriginalUri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(format!("No API route for {}", uri.path())),
        }),
    )
        .into_response()
}

/// Parses the `{id}` path segment. Anything that is not an integer cannot name an item.
pub fn parse_item_id(raw: &str) -> ApiResult<i32> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| ApiError::BadRequest(format!("Invalid item id '{}'", raw)))
}

pub fn json_kind(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::String(_) => "string",
        JsonValue::Number(_) => "number",
        JsonValue::Bool(_) => "bool",
        JsonValue::Null => "null",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

pub fn coerce_int(v: &JsonValue) -> Result<i32, String> {
    let n = if let Some(n) = v.as_i64() {
        n
    } else if let Some(f) = v.as_f64().filter(|f| f.fract() == 0.0) {
        f as i64
    } else if let Some(s) = v.as_str() {
        s.trim().parse::<i64>().map_err(|_| "expected int".to_string())?
    } else {
        return Err("expected int".to_string());
    };
    i32::try_from(n).map_err(|_| format!("out of range for int: {}", n))
}

pub fn coerce_number(v: &JsonValue) -> Result<f64, String> {
    let n = if let Some(n) = v.as_f64() {
        n
    } else if let Some(s) = v.as_str() {
        s.trim()
            .parse::<f64>()
            .map_err(|_| "expected number".to_string())?
    } else {
        return Err("expected number".to_string());
    };
    if n.is_finite() {
        Ok(n)
    } else {
        Err("expected finite number".to_string())
    }
}

pub fn coerce_text(v: &JsonValue) -> Result<String, String> {
    match v {
        JsonValue::String(s) => Ok(s.clone()),
        // allow numbers/bools to stringify for text columns
        JsonValue::Number(_) | JsonValue::Bool(_) => Ok(v.to_string()),
        _ => Err("expected text".to_string()),
    }
}

/// Collects coercion failures across all fields of one request.
#[derive(Default)]
struct FieldCoercer {
    errors: Vec<FieldError>,
}

impl FieldCoercer {
    fn coerce<T>(
        &mut self,
        field: &str,
        expected: &str,
        value: Option<JsonValue>,
        convert: impl Fn(&JsonValue) -> Result<T, String>,
    ) -> Option<T> {
        let value = value?;
        match convert(&value) {
            Ok(v) => Some(v),
            Err(_) => {
                self.errors.push(FieldError {
                    field: field.to_string(),
                    expected: expected.to_string(),
                    got: json_kind(&value).to_string(),
                    value,
                });
                None
            }
        }
    }

    /// Like [`Self::coerce`], but an explicit `null` means "clear".
    fn nullable<T>(
        &mut self,
        field: &str,
        expected: &str,
        value: Option<JsonValue>,
        convert: impl Fn(&JsonValue) -> Result<T, String>,
    ) -> Option<Option<T>> {
        match value {
            Some(JsonValue::Null) => Some(None),
            other => self.coerce(field, expected, other, convert).map(Some),
        }
    }

    fn status_write(
        &mut self,
        status: Option<JsonValue>,
        status_override: Option<JsonValue>,
    ) -> StatusWrite {
        let status = self
            .nullable("status", "item status", status, |v| {
                v.as_str()
                    .ok_or_else(|| "expected string".to_string())?
                    .parse::<ItemStatus>()
                    .map_err(|e| e.to_string())
            })
            .flatten();
        let manual = self
            .nullable(
                "status_override",
                "'Phased Out' or 'Restocking'",
                status_override,
                |v| {
                    v.as_str()
                        .ok_or_else(|| "expected string".to_string())?
                        .parse::<ManualStatus>()
                        .map_err(|e| e.to_string())
                },
            )
            .flatten();
        StatusWrite::from_request(manual, status)
    }

    fn finish<T>(self, value: T) -> ApiResult<T> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

impl TryFrom<CreateItemRequest> for CreateItemInput {
    type Error = ApiError;

    fn try_from(req: CreateItemRequest) -> Result<Self, Self::Error> {
        let mut c = FieldCoercer::default();
        let input = CreateItemInput {
            item_type_id: c.coerce("item_type_id", "int", req.item_type_id, coerce_int),
            item_variant: c.coerce("item_variant", "text", req.item_variant, coerce_text),
            stock: c.coerce("stock", "number", req.stock, coerce_number),
            stock_unit_id: c.coerce("stock_unit_id", "int", req.stock_unit_id, coerce_int),
            supplier_id: c.coerce("supplier_id", "int", req.supplier_id, coerce_int),
            reorder_point: c
                .nullable("reorder_point", "int or null", req.reorder_point, coerce_int)
                .flatten(),
            status: c.status_write(req.status, req.status_override),
        };
        c.finish(input)
    }
}

impl TryFrom<UpdateItemRequest> for UpdateItemInput {
    type Error = ApiError;

    fn try_from(req: UpdateItemRequest) -> Result<Self, Self::Error> {
        let mut c = FieldCoercer::default();
        let input = UpdateItemInput {
            item_type_id: c.coerce("item_type_id", "int", req.item_type_id, coerce_int),
            item_variant: c.coerce("item_variant", "text", req.item_variant, coerce_text),
            stock: c.coerce("stock", "number", req.stock, coerce_number),
            stock_unit_id: c.coerce("stock_unit_id", "int", req.stock_unit_id, coerce_int),
            supplier_id: c.coerce("supplier_id", "int", req.supplier_id, coerce_int),
            reorder_point: c.nullable("reorder_point", "int or null", req.reorder_point, coerce_int),
            status: c.status_write(req.status, req.status_override),
        };
        c.finish(input)
    }
}

impl ReduceStockRequest {
    /// Any missing, non-numeric or non-positive amount is rejected the same way.
    pub fn amount(&self) -> ApiResult<f64> {
        self.reduce_amount
            .as_ref()
            .and_then(|v| coerce_number(v).ok())
            .filter(|n| *n > 0.0)
            .ok_or_else(|| ApiError::BadRequest("Invalid reduce amount".to_string()))
    }
}
