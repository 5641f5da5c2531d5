pub mod dependencies;

pub use dependencies::{DependencyGraph, GoldPlan};
