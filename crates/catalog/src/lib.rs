//! Remote catalog access for sdkup.
//!
//! [`HttpCatalog`] implements [`sdkup_core::Catalog`] against an
//! sdkman-compatible broker API:
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | candidates | `GET {base}/candidates/all` |
//! | versions | `GET {base}/candidates/{candidate}/{platform}/versions/all` |
//! | default version | `GET {base}/candidates/default/{candidate}` |
//! | download | `GET {base}/broker/download/{candidate}/{version}/{platform}` |
//!
//! List endpoints answer with comma-separated plain text.

mod client;
mod platform;

pub use client::HttpCatalog;
pub use platform::{Arch, Os, Platform};
