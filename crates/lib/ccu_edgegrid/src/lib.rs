//! Akamai EdgeGrid (`EG1-HMAC-SHA256`) authentication for `reqwest` requests.
//!
//! see https://techdocs.akamai.com/developer/docs/authenticate-with-edgegrid

mod credentials;
mod edgerc;
mod signer;

pub use credentials::EdgeGridCredentials;
pub use edgerc::{Edgerc, EdgercSection};
pub use signer::EdgeGridSigner;
