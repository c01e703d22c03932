pub mod auth;
pub mod config;
pub mod craps;
pub mod events;
pub mod ledger;
pub mod money;
pub mod poker;
pub mod rng;
pub mod runtime;
pub mod server;
pub mod wallet;
