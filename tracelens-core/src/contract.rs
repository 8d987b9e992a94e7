//! Response contract for the public observation list endpoint.
//!
//! Clients must not trust a body just because it parsed as JSON: every
//! element of `data` has to carry the documented keys before it is treated
//! as an observation. Values may be `null`; the keys may not be missing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Observation;

/// Keys every observation on the wire must carry.
pub const REQUIRED_OBSERVATION_KEYS: [&str; 10] = [
    "id",
    "traceId",
    "name",
    "startTime",
    "endTime",
    "model",
    "input",
    "output",
    "metadata",
    "version",
];

/// Paging metadata attached to list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total_items: u64,
    pub total_pages: u64,
}

impl PageMeta {
    pub fn new(page: u32, limit: u32, total_items: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total_items.div_ceil(u64::from(limit))
        };
        Self {
            page,
            limit,
            total_items,
            total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationList {
    pub data: Vec<Observation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("response body is not a JSON object")]
    NotAnObject,

    #[error("response body has no `data` array")]
    MissingData,

    #[error("data[{index}] is not an object")]
    ElementNotObject { index: usize },

    #[error("data[{index}] is missing key `{key}`")]
    MissingKey { index: usize, key: &'static str },

    #[error("data[{index}] does not match the observation schema: {message}")]
    Malformed { index: usize, message: String },

    #[error("`meta` does not match the paging schema: {0}")]
    MalformedMeta(String),
}

/// Validate a response body against the observation list contract.
pub fn validate_observation_list(body: &serde_json::Value) -> Result<ObservationList, ContractError> {
    let obj = body.as_object().ok_or(ContractError::NotAnObject)?;
    let data = obj
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or(ContractError::MissingData)?;

    let mut observations = Vec::with_capacity(data.len());
    for (index, element) in data.iter().enumerate() {
        observations.push(validate_observation_at(element, index)?);
    }

    let meta = match obj.get("meta") {
        None | Some(serde_json::Value::Null) => None,
        Some(m) => Some(
            serde_json::from_value(m.clone())
                .map_err(|e| ContractError::MalformedMeta(e.to_string()))?,
        ),
    };

    Ok(ObservationList {
        data: observations,
        meta,
    })
}

/// Validate a single observation body (e.g. from `GET /observations/:id`).
pub fn validate_observation(body: &serde_json::Value) -> Result<Observation, ContractError> {
    validate_observation_at(body, 0)
}

fn validate_observation_at(element: &serde_json::Value, index: usize) -> Result<Observation, ContractError> {
    let fields = element
        .as_object()
        .ok_or(ContractError::ElementNotObject { index })?;

    if let Some(key) = REQUIRED_OBSERVATION_KEYS
        .into_iter()
        .find(|key| !fields.contains_key(*key))
    {
        return Err(ContractError::MissingKey { index, key });
    }

    serde_json::from_value(element.clone()).map_err(|e| ContractError::Malformed {
        index,
        message: e.to_string(),
    })
}
