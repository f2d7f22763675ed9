//! Intersection Simulation Library
//!
//! A discrete-tick traffic simulation of a signalized intersection grid.

pub mod simulation;
