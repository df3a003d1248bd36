//! Policy-driven user management core.
//!
//! Three subsystems: the entity manager ([`manager::UserManager`]), the
//! view-based serializer ([`serialize::UserSerializer`]), and the filter
//! parser ([`filter::UserFilterParser`]). Persistence sits behind the store
//! traits in [`domain::repository`]; transport is the caller's concern.

pub mod context;
pub mod domain;
pub mod error;
pub mod filter;
pub mod infra;
pub mod manager;
pub mod serialize;
