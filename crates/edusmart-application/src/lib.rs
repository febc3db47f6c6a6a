//! Application services of the EduSmart client.
//!
//! - [`SessionStore`]: sign-in lifecycle and the persisted credential
//! - [`AcademicContextResolver`]: active campus and academic year
//! - [`ScopedFetcher`]: reads that follow the active context
//! - [`ContextBinding`]: re-resolves the context whenever the session changes
//! - [`AcademicYearAdmin`]: year creation and the institution's current year

pub mod academic_context;
pub mod bootstrap;
pub mod context_binding;
pub mod notification;
pub mod scoped_fetch;
pub mod session_store;
pub mod year_admin;

pub use academic_context::{AcademicContextResolver, ContextSnapshot, ContextStatus};
pub use bootstrap::{AppServices, BootstrapOptions};
pub use context_binding::ContextBinding;
pub use notification::{Notification, NotificationLevel, Notifier};
pub use scoped_fetch::{FetchHandle, FetchOptions, FetchState, ScopedFetcher};
pub use session_store::SessionStore;
pub use year_admin::AcademicYearAdmin;
