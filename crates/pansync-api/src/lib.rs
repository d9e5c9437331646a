// pansync-api: Async Rust client for the Panorama management API
//
// Two API surfaces are involved: the XML API for key generation and the
// REST API for everything else. `PanoramaClient` owns the REST transport;
// key generation is an associated function since it runs before a key exists.

pub mod auth;
pub mod client;
pub mod devices;
pub mod error;
pub mod models;
pub mod policies;
pub mod transport;

pub use auth::{ApiKey, DEFAULT_API_VERSION};
pub use client::{PanoramaClient, base_url_from_host};
pub use error::Error;
pub use models::{DeviceGroupEntry, MemberList, ProfileSetting, Rulebase, SecurityRuleEntry};
pub use transport::{TlsMode, TransportConfig};
