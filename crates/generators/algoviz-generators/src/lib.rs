//! Algoviz Generators
//!
//! Pure functions that run a textbook algorithm on a working copy of their
//! input and return a [`FrameSequence`] narrating the run, one frame per
//! learner-visible step. Generators never touch the caller's data, never read
//! the clock, and take any randomness as an explicit seed.
//!
//! Invalid input is rejected up front with a [`GenerateError`]; no partial
//! sequence is ever returned.

pub mod dynamic_programming;
pub mod error;
pub mod expression;
pub mod graph;
pub mod grid;
pub mod hash_table;
pub mod heap;
pub mod limits;
pub mod linked_list;
pub mod searching;
pub mod sorting;
pub mod tree;

pub use algoviz_player_core::{Frame, FrameRecorder, FrameSequence};
pub use error::GenerateError;
pub use limits::GeneratorLimits;

pub use dynamic_programming::TableSnapshot;
pub use expression::StackSnapshot;
pub use graph::{Graph, GraphSnapshot};
pub use grid::{Grid, GridSnapshot, PathAlgorithm, Pos};
pub use hash_table::{HashSnapshot, HashTable, Strategy};
pub use heap::{HeapKind, HeapSnapshot};
pub use linked_list::ListSnapshot;
pub use searching::SearchSnapshot;
pub use sorting::{ArraySnapshot, SortAction, SortAlgorithm};
pub use tree::{NodeMark, TreeSnapshot};

/// Generator result type
pub type Result<T> = core::result::Result<T, GenerateError>;
