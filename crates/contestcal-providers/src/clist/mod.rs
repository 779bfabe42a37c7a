//! clist.by contest source.
//!
//! Queries `/api/v2/contest/` for contests starting inside a window and
//! keeps the ones hosted on a favorite site.

mod config;
mod response;
mod source;

pub use config::ClistConfig;
pub use response::ListMeta;
pub use source::ClistSource;
