pub mod resolve;
pub mod types;

pub use resolve::{amount_column, require_role, resolve, resolve_role};
pub use types::{ColumnRole, RoleSpec, ROLE_SPECS};
