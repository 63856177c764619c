/**
 * Blob store client-upload protocol: the
 *  event bodies exchanged with the upload
 *  proxy and the signed client tokens it issues.
 */
pub mod blob;
/**
 * Media / text classification by file extension.
 */
pub mod classify;
/**
 * Content digests used by the
 *  content-addressed file store.
 */
pub mod digest;
/**
 * Deployment manifest entries and the
 *  request/response shapes of deployment creation.
 */
pub mod manifest;
/**
 * Literal rewriting of media references
 *  inside text assets.
 */
pub mod rewrite;
/**
 * Collecting the files a user picked,
 *  either by walking a directory or from
 *  a flat list of paths.
 */
pub mod selection;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::blob::{ClientTokenOptions, HandleUploadBody, PutBlobResult, ReadWriteToken};
    pub use crate::classify::{AssetKind, MEDIA_EXTENSIONS, TEXT_EXTENSIONS};
    pub use crate::digest::sha1_hex;
    pub use crate::manifest::{
        CreateDeploymentRequest, DeploymentResult, ManifestEntry, UpstreamDeployment, UpstreamFile,
    };
    pub use crate::rewrite::{rewrite_text, BlobUrlMap, RewrittenText};
    pub use crate::selection::{FileSelection, PickedFile, SelectionError};
    pub use crate::version::build_info;
}
