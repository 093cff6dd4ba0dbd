//! Errors that can occur while building a [`BindingPlan`](super::BindingPlan).
use std::fmt::{self, Display};

use smallvec::SmallVec;

use super::{RegionKind, tag::TagError};

/// A collection of [`PlanError`]s raised while building the binding plan for a request shape.
///
/// All the problems in a shape are collected before giving up, so that a misconfigured
/// shape can be fixed in one go.
/// It is never empty.
#[derive(Debug)]
pub struct PlanErrors {
    shape: &'static str,
    items: SmallVec<[PlanError; 2]>,
}

/// A single problem with the declaration of a request shape.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum PlanError {
    #[error("There can be at most one {kind} region, but both `{first}` and `{second}` are tagged as {kind} regions")]
    /// More than one field is tagged with the same region kind.
    DuplicateRegion {
        kind: RegionKind,
        first: &'static str,
        second: &'static str,
    },
    #[error("The binding tag on `{region}.{field}` is invalid: {source}")]
    /// The binding tag on a parameter doesn't follow the tag grammar.
    InvalidTag {
        region: &'static str,
        field: &'static str,
        source: TagError,
    },
    #[error("`{region}.{field}` is a sequence (`{type_name}`), but {kind} parameters take a single value")]
    /// The declared type of a parameter can never be bound from its region.
    UnsupportedParamType {
        kind: RegionKind,
        region: &'static str,
        field: &'static str,
        type_name: &'static str,
    },
    #[error("`{region}.{field}` (`{type_name}`) is bound without coercion, which only context values support, not {kind} parameters")]
    /// A parameter that is bound without coercion is declared outside a context region.
    TypedOutsideContext {
        kind: RegionKind,
        region: &'static str,
        field: &'static str,
        type_name: &'static str,
    },
    #[error("`{region}.{field}` is optional, but a missing `{type_name}` has nothing to fall back to. Declare the field as an `Option<{type_name}>`")]
    /// A parameter bound without coercion is optional, but it isn't stored in an `Option`.
    OptionalTypedParam {
        region: &'static str,
        field: &'static str,
        type_name: &'static str,
    },
}

impl PlanErrors {
    pub(super) fn new(shape: &'static str, items: SmallVec<[PlanError; 2]>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self { shape, items })
        }
    }

    /// The name of the request shape that failed to produce a plan.
    pub fn shape(&self) -> &'static str {
        self.shape
    }

    /// The number of problems that have been found.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always `false`: a [`PlanErrors`] holds at least one error.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over the problems, in the order they were found.
    pub fn iter(&self) -> impl Iterator<Item = &PlanError> + ExactSizeIterator {
        self.items.iter()
    }
}

impl Display for PlanErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Failed to build the binding plan for `{}`:",
            self.shape
        )?;
        for e in self.items.iter() {
            writeln!(f, "- {e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for PlanErrors {}
