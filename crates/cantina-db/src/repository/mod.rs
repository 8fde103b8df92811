//! # Repository Implementations
//!
//! One repository per local table. Instance methods run on the pool;
//! `*_in` associated functions take a `&mut SqliteConnection` so domain
//! services can compose them inside a single transaction (stock update +
//! ledger row + queue entry must commit or fail together).

pub mod movement;
pub mod pending;
pub mod product;
pub mod setting;
pub mod workday;
