//! # AggRex Core
//!
//! This crate is the planning core of the AggRex distributed aggregation
//! engine. Its central export is the exchange-eligibility planner: the logic
//! which decides whether the merging half of a sharded aggregation can be
//! split back across the shards as a range-routed exchange instead of
//! converging on a single coordinating node.
//!
//! The planner is pure computation over immutable inputs. Its only external
//! collaborator is a [`catalog::RoutingProvider`], injected by the caller,
//! which resolves the chunk distribution of the pipeline's output collection.

#[macro_use]
extern crate tracing;

pub mod catalog;
pub mod err;
pub mod exchange;
pub mod expr;
pub mod val;
