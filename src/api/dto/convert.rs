//! DTOs for conversion reporting.

use serde::Deserialize;
use validator::Validate;

/// Query parameters of `POST /links/{alias}/convert`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConvertQuery {
    #[validate(length(max = 128))]
    pub variant_id: Option<String>,
}
