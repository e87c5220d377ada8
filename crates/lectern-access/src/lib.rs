//! # Lectern Access
//!
//! The access scoping layer every academic read and write goes through.
//!
//! - [`Caller`] is the authenticated identity plus its role.
//! - A [`ScopeStrategy`] per role turns `(entity, caller)` into a
//!   [`Predicate`].
//! - A predicate renders into a SQL `WHERE` fragment with bound parameters,
//!   or evaluates in memory against a [`Facts`] source.
//! - [`authorize_mutation`] checks direct ownership for writes.
//!
//! Reads never fail on scoping: a hidden record looks exactly like an absent
//! one, so callers map "no row" to `NotFound`.
//!
//! ```ignore
//! let mut qb = QueryBuilder::new("SELECT a.* FROM assignments a WHERE ");
//! lectern_access::visibility(&caller, Entity::Assignment).push_sql(&mut qb);
//! ```

pub mod caller;
pub mod policy;
pub mod predicate;
pub mod records;
pub mod strategy;

pub use caller::Caller;
pub use policy::{Owned, Ownership, authorize_mutation, can_mutate};
pub use predicate::{Column, Entity, Facts, Predicate, RecordView, Value};
pub use records::{Scoped, is_visible};
pub use strategy::{
    AdminScope, AlumniScope, DenyAll, ScopeStrategy, StudentScope, TutorScope, strategy_for,
    visibility,
};
