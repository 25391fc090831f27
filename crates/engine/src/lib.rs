//! Core domain engine: families, members, category hierarchies, tags,
//! transactions and aggregation reports over a SQL store.
//!
//! The engine owns no HTTP concerns; callers construct it with
//! [`Engine::builder`] around an existing database connection and drive
//! it through the operation methods.

pub use categories::{Category, CategoryKind, build_tree};
pub use commands::{
    NewCategory, NewMember, NewTag, NewTransaction, UpdateCategory, UpdateMember, UpdateTag,
    UpdateTransaction,
};
pub use error::EngineError;
pub use families::Family;
pub use members::{Member, MemberRole};
pub use ops::{Engine, EngineBuilder, Granularity, TransactionFilter};
pub use tags::Tag;
pub use transactions::{Transaction, TransactionKind, TransactionStatus};

mod categories;
mod commands;
mod error;
mod families;
mod members;
mod ops;
mod tags;
mod transaction_tags;
mod transactions;
mod util;
mod validate;

type ResultEngine<T> = Result<T, EngineError>;
