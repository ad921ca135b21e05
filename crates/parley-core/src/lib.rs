//! Business logic and store trait definitions for Parley.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements, the consistency guard and chat service built on them,
//! and the lifecycle manager that supervises background workers. It depends
//! only on `parley-types` -- never on `parley-infra` or any database crate.

pub mod chat;
pub mod lifecycle;
pub mod repository;

#[cfg(test)]
pub(crate) mod test_support;
