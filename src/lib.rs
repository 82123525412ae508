//! Reactive LTL motion planning core.
//!
//! A two-stage motion planner for a mobile robot operating under a global
//! linear-temporal-logic mission over statically labeled regions, with a
//! reactive local planner that services transiently sensed requests
//! (priority-ordered) without ever violating the global mission.
//!
//! The off-line [`global_planner::RrgPlanner`] grows a transition system
//! together with an [`product::IncrementalProduct`] automaton until it finds
//! a lasso (prefix + cyclic suffix) satisfying the mission. The on-line
//! [`local_planner::LocalPlanner`] then tracks that lasso, detouring into a
//! short-horizon random tree whenever a request is in range, guarded by a
//! Buchi half-monitor so detours can never step outside the mission.

pub mod buchi;
pub mod config;
pub mod demos;
pub mod error;
pub mod geometry;
pub mod global_planner;
pub mod instrumentation;
pub mod io;
pub mod local_planner;
pub mod product;
pub mod robot;
pub mod ts;
pub mod workspace;

pub use buchi::Buchi;
pub use config::Config;
pub use error::PlannerError;
pub use geometry::{Point2, Region};
pub use global_planner::RrgPlanner;
pub use local_planner::LocalPlanner;
pub use product::IncrementalProduct;
pub use robot::Robot;
pub use ts::TransitionSystem;
pub use workspace::{Request, Workspace};
