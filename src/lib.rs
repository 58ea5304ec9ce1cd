//! Transfer window simulator: squad in, deterministic sell/buy decisions out.
//!
//! The interesting part lives in `rules` (sell and buy phases), `market`
//! (candidate pool), and `kpi` (age progression + before/after metrics).
//! Everything else is plumbing: fetching squads from a Transfermarkt JSON
//! API, caching them on disk, and optional Gemini commentary on a finished
//! result.

pub mod analyst;
pub mod clubs;
pub mod engine;
pub mod fetch;
pub mod http;
pub mod kpi;
pub mod market;
pub mod model;
pub mod position;
pub mod report;
pub mod rules;
pub mod store;
