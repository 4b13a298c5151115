//! Provision Vault dynamic database credentials for SQL Server.
//!
//! From a YAML config listing databases and permission levels, render the
//! `CREATE LOGIN` / `GRANT` templates, register them as a Vault database role,
//! then create the matching ACL policy, token role and a token.

pub mod apply;
pub mod cli;
pub mod config;
pub mod connection;
pub mod gen;
pub mod inspect;
pub mod merge;
pub mod provision;
pub mod render;
pub mod statement;
pub mod validate;
