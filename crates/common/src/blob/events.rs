use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Events posted to the upload proxy, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum HandleUploadBody {
    #[serde(rename = "blob.generate-client-token")]
    GenerateClientToken(GenerateClientTokenPayload),
    #[serde(rename = "blob.upload-completed")]
    UploadCompleted(UploadCompletedPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateClientTokenPayload {
    pub pathname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    /// Opaque caller data, handed back untouched as the token payload
    #[serde(default)]
    pub client_payload: Option<Value>,
    #[serde(default)]
    pub multipart: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCompletedPayload {
    pub blob: PutBlobResult,
    #[serde(default)]
    pub token_payload: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HandleUploadResponse {
    #[serde(rename = "blob.generate-client-token")]
    GenerateClientToken {
        #[serde(rename = "clientToken")]
        client_token: String,
    },
    #[serde(rename = "blob.upload-completed")]
    UploadCompleted { response: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnUploadCompleted {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    /// The client payload the token was requested with, unchanged
    pub token_payload: Option<Value>,
}

/// A stored blob, as reported by the blob store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutBlobResult {
    pub url: String,
    #[serde(default)]
    pub download_url: Option<String>,
    pub pathname: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub content_disposition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipartUpload {
    pub key: String,
    pub upload_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipartPart {
    pub etag: String,
    pub part_number: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_generate_client_token_event() {
        let body: HandleUploadBody = serde_json::from_value(json!({
            "type": "blob.generate-client-token",
            "payload": {
                "pathname": "logo.png",
                "clientPayload": { "site": "demo" },
                "multipart": true
            }
        }))
        .unwrap();

        match body {
            HandleUploadBody::GenerateClientToken(payload) => {
                assert_eq!(payload.pathname, "logo.png");
                assert_eq!(payload.callback_url, None);
                assert_eq!(payload.client_payload, Some(json!({ "site": "demo" })));
                assert!(payload.multipart);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        let result: Result<HandleUploadBody, _> =
            serde_json::from_value(json!({ "type": "blob.delete", "payload": {} }));
        assert!(result.is_err());

        let result: Result<HandleUploadBody, _> = serde_json::from_value(json!({}));
        assert!(result.is_err());
    }

    #[test]
    fn test_response_shape() {
        let value = serde_json::to_value(HandleUploadResponse::GenerateClientToken {
            client_token: "tok".into(),
        })
        .unwrap();
        assert_eq!(
            value,
            json!({ "type": "blob.generate-client-token", "clientToken": "tok" })
        );

        let value = serde_json::to_value(HandleUploadResponse::UploadCompleted {
            response: "ok".into(),
        })
        .unwrap();
        assert_eq!(value, json!({ "type": "blob.upload-completed", "response": "ok" }));
    }
}
