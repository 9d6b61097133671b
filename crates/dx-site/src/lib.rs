//! Document site state and refresh coordination for DX.
//!
//! [`Site`] ties the pieces together: it scans the document root into a
//! sorted tree, indexes every document for search, renders documents through
//! a per-generation render cache, and republishes all of it as one unit when
//! content changes.
//!
//! Collaborators are traits so they can be swapped in tests or deployments:
//!
//! - [`DocumentSource`]: raw document text ([`FsDocumentSource`])
//! - [`ContentUpdater`]: fetches new content ([`CommandUpdater`], [`NoopUpdater`])
//! - [`Alerter`]: failure notifications ([`TracingAlerter`])
//! - [`dx_cache::Converter`]: markup conversion ([`MarkdownConverter`])

mod alert;
mod convert;
mod site;
mod source;
mod state;
mod update;

pub use alert::{Alerter, TracingAlerter};
pub use convert::{DocumentFormat, MarkdownConverter, plain_text};
pub use site::{DocumentError, RefreshError, RenderedDocument, Site, SiteBuilder, SiteConfig};
pub use source::{DocumentSource, FsDocumentSource};
pub use state::SiteState;
pub use update::{CommandUpdater, ContentUpdater, NoopUpdater, UpdateError};
