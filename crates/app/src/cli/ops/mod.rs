pub mod deploy;
pub mod health;
pub mod serve;
pub mod version;

pub use deploy::Deploy;
pub use health::Health;
pub use serve::Serve;
pub use version::Version;
