//! Public transport journey planner server.
//!
//! Computes Pareto-optimal journeys (latest departure, earliest arrival,
//! fewest changes) with a backward connection scan, and serves them over
//! HTTP.

pub mod bits;
pub mod cache;
pub mod config;
pub mod domain;
pub mod profile;
pub mod timetable;
pub mod web;

#[cfg(test)]
mod test_support;
