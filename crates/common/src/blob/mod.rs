//! Blob store client-upload protocol.
//!
//! Media files never pass through our server. The client asks the upload
//! proxy for a short-lived, signed client token scoped to one pathname and
//! then talks to the blob store directly with it:
//!
//! 1. client -> proxy: [`HandleUploadBody::GenerateClientToken`]
//! 2. proxy -> client: [`HandleUploadResponse::GenerateClientToken`]
//! 3. client -> blob store: `PUT` (or multipart `create`/`upload`/`complete`)
//!    authorized with the client token, answered with a [`PutBlobResult`]
//! 4. blob store -> proxy (optional): [`HandleUploadBody::UploadCompleted`],
//!    signed with the store's read-write token

mod events;
mod token;

pub use events::{
    GenerateClientTokenPayload, HandleUploadBody, HandleUploadResponse, MultipartPart,
    MultipartUpload, OnUploadCompleted, PutBlobResult, UploadCompletedPayload,
};
pub use token::{
    generate_client_token, sign_payload, verify_client_token, verify_signature,
    ClientTokenOptions, ReadWriteToken, TokenError, CLIENT_TOKEN_PREFIX,
    DEFAULT_TOKEN_VALIDITY,
};
