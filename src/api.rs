use serde::{Deserialize, Serialize};

/// Body of `POST /run_check/{lab}`.
///
/// # Serialized Example
/// ```
/// # let ser = r#"
/// {
///     "students": ["ivanov", "petrova"]
/// }
/// # "#;
/// # let deser: labcheck_api::api::RunChecksRequest
/// #    = serde_json::from_str(ser).expect("failed parsing");
/// # assert_eq!(deser.students.as_deref().map(<[String]>::len), Some(2));
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct RunChecksRequest {
    /// The students to check, by directory name.
    ///
    /// Leaving this out (or `null`) checks every student found under the
    /// lab's data directory, in sorted order. Names without a matching
    /// directory are dropped silently.
    #[serde(default)]
    pub students: Option<Vec<String>>,
}

/// Response of `GET /`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LabsResponse {
    /// Lab names, sorted lexicographically.
    pub labs: Vec<String>,
}

/// Response of `GET /check/{lab}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StudentsResponse {
    pub lab: String,
    /// Student directory names under the lab, sorted lexicographically.
    pub students: Vec<String>,
}

/// Error body accompanying every non-2xx json response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
