//! Tool catalog and dispatch for the card limit operations.
//!
//! Each tool takes named arguments (a JSON object) and produces a structured
//! result. Rejected inputs come back as a normal result flagged `isError`,
//! while storage faults become JSON-RPC errors.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use service::card_limits::repository::CardLimitsRepository;
use service::card_limits::CardLimitsService;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, info};

use crate::metrics::{TOOL_CALLS_TOTAL, TOOL_ERRORS_TOTAL};
use crate::rpc::JsonRpcError;

pub const GET_PAYMENT_INSTRUMENTS: &str = "get_payment_instruments";
pub const GET_CURRENT_LIMITS: &str = "get_current_limits";
pub const CHANGE_LIMIT: &str = "change_limit";
pub const CREATE_TEMPORARY_LIMIT: &str = "create_temporary_limit";

const LIMIT_TYPE_HELP: &str = "Must be one of:\n\
    - \"pos\": POS / Point of Sale / in-store payment limit\n\
    - \"atm\": ATM / cash withdrawal limit\n\
    - \"ecom\": E-commerce / online payment limit";

#[derive(Debug, Clone, Serialize)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

/// `tools/call` result: the structured payload plus a text rendering of it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
    #[serde(rename = "structuredContent")]
    pub structured_content: Value,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolCallResult {
    fn from_payload<T: Serialize>(payload: &T, is_error: bool) -> Result<Self, ToolError> {
        let structured_content = serde_json::to_value(payload)?;
        let text = serde_json::to_string(&structured_content)?;
        Ok(Self {
            content: vec![ToolContent { kind: "text".into(), text }],
            structured_content,
            is_error,
        })
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: &'static str, message: String },
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("result encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<ToolError> for JsonRpcError {
    fn from(e: ToolError) -> Self {
        match e {
            ToolError::UnknownTool(name) => {
                JsonRpcError::new(crate::rpc::METHOD_NOT_FOUND, format!("unknown tool: {name}"))
            }
            ToolError::InvalidArguments { .. } => JsonRpcError::invalid_params(e),
            ToolError::Service(_) | ToolError::Encode(_) => JsonRpcError::internal(e),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChangeLimitArgs {
    limit_type: String,
    limit: i64,
}

#[derive(Debug, Deserialize)]
struct CreateTemporaryLimitArgs {
    limit_type: String,
    limit: i64,
    start_date: String,
    end_date: String,
}

fn limit_type_schema() -> Value {
    json!({"type": "string", "enum": ["pos", "atm", "ecom"]})
}

/// Descriptors advertised by `tools/list`.
pub fn catalog() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: GET_PAYMENT_INSTRUMENTS,
            description: "Retrieve all user accounts and associated debit cards with their current limits.".into(),
            input_schema: json!({"type": "object", "properties": {}}),
        },
        ToolDescriptor {
            name: GET_CURRENT_LIMITS,
            description: "Get current limits for the default card.".into(),
            input_schema: json!({"type": "object", "properties": {}}),
        },
        ToolDescriptor {
            name: CHANGE_LIMIT,
            description: format!(
                "Change a card transaction limit.\n\nArgs:\n    limit_type: Type of limit to change. {LIMIT_TYPE_HELP}\n    limit: New limit amount in dollars"
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "limit_type": limit_type_schema(),
                    "limit": {"type": "integer"}
                },
                "required": ["limit_type", "limit"]
            }),
        },
        ToolDescriptor {
            name: CREATE_TEMPORARY_LIMIT,
            description: format!(
                "Create a temporary card transaction limit override.\n\nArgs:\n    limit_type: Type of limit to override. {LIMIT_TYPE_HELP}\n    limit: Temporary limit amount in dollars\n    start_date: Start date in YYYY-MM-DD format\n    end_date: End date in YYYY-MM-DD format"
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "limit_type": limit_type_schema(),
                    "limit": {"type": "integer"},
                    "start_date": {"type": "string"},
                    "end_date": {"type": "string"}
                },
                "required": ["limit_type", "limit", "start_date", "end_date"]
            }),
        },
    ]
}

fn parse_args<T: serde::de::DeserializeOwned>(tool: &'static str, arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|e| ToolError::InvalidArguments { tool, message: e.to_string() })
}

/// Run one tool against the service.
pub async fn call_tool<R: CardLimitsRepository + ?Sized>(
    svc: &CardLimitsService<R>,
    name: &str,
    arguments: Option<Value>,
) -> Result<ToolCallResult, ToolError> {
    let arguments = arguments.unwrap_or_else(|| json!({}));
    let label = catalog().iter().find(|t| t.name == name).map(|t| t.name).unwrap_or("unknown");
    TOOL_CALLS_TOTAL.with_label_values(&[label]).inc();

    let outcome = dispatch(svc, name, arguments).await;
    match &outcome {
        Ok(result) if result.is_error => {
            TOOL_ERRORS_TOTAL.with_label_values(&[label]).inc();
            info!(tool = name, "tool_call_rejected");
        }
        Ok(_) => info!(tool = name, "tool_call_ok"),
        Err(e) => {
            TOOL_ERRORS_TOTAL.with_label_values(&[label]).inc();
            error!(tool = name, error = %e, "tool_call_failed");
        }
    }
    outcome
}

async fn dispatch<R: CardLimitsRepository + ?Sized>(
    svc: &CardLimitsService<R>,
    name: &str,
    arguments: Value,
) -> Result<ToolCallResult, ToolError> {
    match name {
        GET_PAYMENT_INSTRUMENTS => ToolCallResult::from_payload(&svc.payment_instruments().await?, false),
        GET_CURRENT_LIMITS => ToolCallResult::from_payload(&svc.current_limits().await?, false),
        CHANGE_LIMIT => {
            let args: ChangeLimitArgs = parse_args(CHANGE_LIMIT, arguments)?;
            let change = svc.change_limit(&args.limit_type, args.limit).await?;
            ToolCallResult::from_payload(&change, change.is_rejected())
        }
        CREATE_TEMPORARY_LIMIT => {
            let args: CreateTemporaryLimitArgs = parse_args(CREATE_TEMPORARY_LIMIT, arguments)?;
            let created = svc
                .create_temporary_limit(&args.limit_type, args.limit, &args.start_date, &args.end_date)
                .await?;
            ToolCallResult::from_payload(&created, created.is_rejected())
        }
        other => Err(ToolError::UnknownTool(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use service::card_limits::repository::mock::InMemoryCardLimitsRepository;
    use service::test_support;

    fn seeded() -> CardLimitsService<InMemoryCardLimitsRepository> {
        let (a, l, t) = test_support::seed_documents();
        CardLimitsService::new(Arc::new(InMemoryCardLimitsRepository::with_documents(a, l, t)), "CARD-001")
    }

    #[test]
    fn catalog_lists_four_tools() {
        let names: Vec<_> = catalog().iter().map(|t| t.name).collect();
        assert_eq!(names, vec![GET_PAYMENT_INSTRUMENTS, GET_CURRENT_LIMITS, CHANGE_LIMIT, CREATE_TEMPORARY_LIMIT]);
        assert!(catalog()[2].description.contains("cash withdrawal"));
    }

    #[tokio::test]
    async fn change_limit_result_matches_wire_shape() {
        let svc = seeded();
        let result = call_tool(&svc, CHANGE_LIMIT, Some(json!({"limit_type": "pos", "limit": 500}))).await.unwrap();
        assert!(!result.is_error);
        assert_eq!(result.structured_content, json!({"cardId": "CARD-001", "type": "pos", "old": 300, "new": 500}));
        let text: Value = serde_json::from_str(&result.content[0].text).unwrap();
        assert_eq!(text, result.structured_content);
    }

    #[tokio::test]
    async fn rejected_limit_type_is_flagged_not_failed() {
        let svc = seeded();
        let result = call_tool(&svc, CHANGE_LIMIT, Some(json!({"limit_type": "bogus", "limit": 100}))).await.unwrap();
        assert!(result.is_error);
        assert_eq!(
            result.structured_content,
            json!({"error": "Invalid limit_type: bogus. Must be pos, atm, or ecom"})
        );
    }

    #[tokio::test]
    async fn missing_arguments_are_invalid_params() {
        let svc = seeded();
        let err = call_tool(&svc, CREATE_TEMPORARY_LIMIT, Some(json!({"limit_type": "atm"}))).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { tool: CREATE_TEMPORARY_LIMIT, .. }));
        assert_eq!(JsonRpcError::from(err).code, crate::rpc::INVALID_PARAMS);

        let err = call_tool(&svc, CHANGE_LIMIT, Some(json!({"limit_type": "atm", "limit": "lots"}))).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn unknown_tool_maps_to_method_not_found() {
        let svc = seeded();
        let err = call_tool(&svc, "freeze_card", None).await.unwrap_err();
        assert_eq!(JsonRpcError::from(err).code, crate::rpc::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn zero_argument_tools_ignore_arguments() {
        let svc = seeded();
        let result = call_tool(&svc, GET_CURRENT_LIMITS, Some(json!({"ignored": true}))).await.unwrap();
        assert_eq!(
            result.structured_content,
            json!({"cardId": "CARD-001", "limits": {"pos": 300, "atm": 500, "ecom": 1000}, "temporaryLimits": []})
        );
    }
}
