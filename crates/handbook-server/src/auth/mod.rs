mod middleware;
mod password;
mod session;
mod users;

pub use middleware::{auth_middleware, bearer_token, AuthUser};
pub use password::{hash_password, verify_password};
pub use session::{issue_token, purge_expired, revoke, verify_token};
pub use users::{authenticate, create_user, ensure_admin};
