//! Bulk notification dispatch engine.
//!
//! Pipeline: build read-only indexes over the auxiliary record collections
//! (`join`), render one message per work item (`render`), group items into
//! backend-sized batches and batches into bounded concurrent waves (`chunk`),
//! then push every wave through the backend with a barrier between waves
//! (`dispatch`).

pub mod backend;
pub mod chunk;
pub mod dispatch;
pub mod join;
pub mod render;

pub use backend::MailBackend;
pub use chunk::chunk;
pub use dispatch::{DispatchReport, Dispatcher};
pub use join::RecordIndex;
pub use render::VacationRenderer;
