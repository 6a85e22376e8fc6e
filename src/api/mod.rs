//! REST API layer.
//!
//! Routes are nested under `/api/`. CRUD and workflow endpoints require a
//! bearer token (issued by `/api/auth/login` or `/api/auth/register`);
//! handlers then enforce the role capability: `lab` for mutations and
//! report sending, `doctor` for the inbox.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod types;

pub use router::api_router;
pub use types::ApiContext;
