//! A small line-oriented shell: pipelines of up to four stages, `<` and `>`
//! redirection, a single background job, and the `cd`, `pwd` and `exit`
//! builtins.

#[macro_use]
extern crate tracing;

pub mod builtins;
pub mod cmd;
pub mod config;
pub mod input;
pub mod job;
pub mod parse;
pub mod prelude;
pub mod process;
pub mod state;
