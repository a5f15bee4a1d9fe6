//! Pure simulation logic for Broodsim.
//!
//! This crate contains all colony logic that is independent of any world
//! storage, engine, or random stream. Functions take plain data and return
//! results, making them unit-testable and portable between the headless
//! harness and the full engine.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`terrain`] | Closed cell-kind variant set and capability predicates |
//! | [`genome`] | Fixed-length parameter vector and clamp range |
//! | [`network`] | Feed-forward policy network (24 → 10 tanh → 10) |
//! | [`observation`] | 24-dimensional observation vector assembly |
//! | [`sampling`] | Temperature-scaled masked softmax sampling |
//! | [`decision`] | Actions, directions, heuristic overrides, feasibility masks |
//! | [`fitness`] | Generation-end fitness scoring for queen and workers |

pub mod decision;
pub mod fitness;
pub mod genome;
pub mod network;
pub mod observation;
pub mod sampling;
pub mod terrain;
