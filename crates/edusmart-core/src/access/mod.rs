//! Access control: route guard and permission matrix.

pub mod guard;
pub mod permission;

pub use guard::{Access, GuardDecision, RouteGuard, RouteRule, RouteTable, login_return_target};
pub use permission::{Permission, has_permission};
