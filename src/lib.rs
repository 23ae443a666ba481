//! Request descriptors and authorization artifacts for Aliyun OSS.
//!
//! This crate builds the values an object-storage client hands to others:
//! not-yet-executed [`Operation`]s for a transport layer to run, and
//! self-contained authorization artifacts — presigned URLs, post policies
//! with embedded signatures, and upload-callback envelopes — that a third
//! party (e.g. a browser) can use without ever holding the secret key.
//!
//! Everything here is a pure, synchronous computation: no network I/O, no
//! shared mutable state. Executing requests, retrying on failure and
//! storing credentials are the caller's concern.
//!
//! # Example
//!
//! ```no_run
//! use oss_presign::{Config, FileObject, PresignOptions, Signer};
//!
//! fn main() -> oss_presign::Result<()> {
//!     // Credentials load from the environment unless set explicitly.
//!     let mut config = Config::default().from_env();
//!     config.endpoint = Some("oss-cn-hangzhou.aliyuncs.com".to_string());
//!     let signer = Signer::builder().config(config).build()?;
//!
//!     let object = FileObject::new("my-bucket", "photos/cat.jpg");
//!     let url = signer.presigned_url(
//!         http::Method::GET,
//!         &object,
//!         &PresignOptions::default(),
//!     )?;
//!     println!("{url}");
//!     Ok(())
//! }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;

mod constants;

mod error;
pub use error::Error;
pub use error::ErrorKind;
pub use error::Result;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod object;
pub use object::delete_object;
pub use object::head_object;
pub use object::put_object;
pub use object::FileObject;
pub use object::Operation;

mod signer;
pub use signer::Builder;
pub use signer::SignRequest;
pub use signer::SignedOutput;
pub use signer::Signer;

mod presign;
pub use presign::PresignOptions;

mod post_object;
pub use post_object::PolicyCondition;
pub use post_object::PolicyOptions;

mod callback;
pub use callback::Callback;
