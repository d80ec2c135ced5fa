//! Block storage API transport
//!
//! # Module Structure
//!
//! - [`client`] - Session holding endpoint, project and token
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use block_store::openstack::client::Session;
//!
//! async fn example() -> block_store::Result<()> {
//!     let session = Session::new("https://evs.example.com", "project-id", Some(token))?;
//!     let url = session.project_url("/volumes");
//!     let volumes = session.get(&url, &Default::default()).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
