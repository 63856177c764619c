use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Deployment target every deployment is created for
pub const DEPLOYMENT_TARGET: &str = "production";

/// One deployed file, addressed by the digest it was uploaded under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path inside the deployment, never with a leading `/`
    pub file: String,
    pub sha: String,
    pub size: u64,
}

impl ManifestEntry {
    pub fn new(file: &str, sha: String, size: u64) -> Self {
        Self {
            file: strip_leading_slashes(file).to_string(),
            sha,
            size,
        }
    }
}

/// A manifest entry as forwarded upstream. Built from untrusted input, so
/// `size` stays a loose JSON value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamFile {
    pub file: String,
    pub sha: String,
    pub size: Value,
}

impl UpstreamFile {
    /// Normalize an untrusted manifest entry.
    ///
    /// `file` and `sha` are coerced to strings (missing / null / false -> ""),
    /// leading slashes are stripped from `file`, and `size` is coerced to a
    /// number (missing / null / false -> 0, unparsable strings -> null).
    pub fn from_value(value: &Value) -> Self {
        let file = coerce_string(value.get("file"));
        let sha = coerce_string(value.get("sha"));
        let size = coerce_number(value.get("size"));

        Self {
            file: strip_leading_slashes(&file).to_string(),
            sha,
            size,
        }
    }

    pub fn size_bytes(&self) -> Option<u64> {
        self.size.as_u64()
    }
}

impl From<ManifestEntry> for UpstreamFile {
    fn from(entry: ManifestEntry) -> Self {
        Self {
            file: entry.file,
            sha: entry.sha,
            size: Value::Number(Number::from(entry.size)),
        }
    }
}

/// Body of a deployment creation request, as sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDeploymentRequest {
    pub name: String,
    pub files: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    pub framework: Option<String>,
}

/// Body forwarded to the hosting provider's deployment endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamDeployment {
    pub name: String,
    pub files: Vec<UpstreamFile>,
    pub project_settings: ProjectSettings,
    pub target: String,
}

impl UpstreamDeployment {
    pub fn new(name: String, files: Vec<UpstreamFile>) -> Self {
        Self {
            name,
            files,
            project_settings: ProjectSettings { framework: None },
            target: DEPLOYMENT_TARGET.to_string(),
        }
    }
}

/// Provider response to deployment creation. Only `url` is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeploymentResult {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DeploymentResult {
    /// The deployment URL with an `https://` scheme added when missing
    pub fn display_url(&self) -> Option<String> {
        self.url
            .as_deref()
            .filter(|u| !u.is_empty())
            .map(normalize_url)
    }
}

/// Prefix `https://` unless the URL already starts with `http`
pub fn normalize_url(url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

pub fn strip_leading_slashes(path: &str) -> &str {
    path.trim_start_matches('/')
}

fn coerce_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => String::new(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(true)) => "true".to_string(),
        Some(other) => other.to_string(),
    }
}

fn coerce_number(value: Option<&Value>) -> Value {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Value::from(0),
        Some(Value::Bool(true)) => Value::from(1),
        Some(Value::Number(n)) => Value::Number(n.clone()),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Value::from(0);
            }
            if let Ok(n) = trimmed.parse::<u64>() {
                return Value::from(n);
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        }
        Some(_) => Value::Null,
    }
}
