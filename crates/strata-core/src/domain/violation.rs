//! Dependency-rule violations and their aggregated list.
//!
//! The validator never stops at the first problem. Every violation is
//! collected so a user can fix the whole configuration in one pass.

use thiserror::Error;

use crate::domain::value_objects::Layer;

/// One broken dependency rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum Violation {
    /// `from` declares a dependency the policy does not allow.
    #[error("VIOLATION: {from} layer may not depend on {to}")]
    InvalidDependency { from: Layer, to: Layer },

    /// `from` declares an allowed dependency on a layer that is not selected.
    #[error("VIOLATION: {from} layer depends on {to}, which is not selected")]
    UnselectedDependency { from: Layer, to: Layer },

    /// A zero-dependency layer declares dependencies at all.
    #[error(
        "VIOLATION: {layer} layer must not have dependencies, but found: {}",
        join(.targets, ", ")
    )]
    ForbiddenDependency { layer: Layer, targets: Vec<Layer> },

    /// The graph contains at least one cycle.
    #[error("VIOLATION: Circular dependencies detected!")]
    CycleDetected,
}

/// Every violation found by one validation pass, in discovery order.
///
/// Displays one violation per line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", join(.0, "\n"))]
pub struct ViolationList(Vec<Violation>);

fn join<T: ToString>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

impl ViolationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.0.push(violation);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, violation: &Violation) -> bool {
        self.0.contains(violation)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ViolationList> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl IntoIterator for ViolationList {
    type Item = Violation;
    type IntoIter = std::vec::IntoIter<Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_every_violation_on_its_own_line() {
        let mut list = ViolationList::new();
        list.push(Violation::InvalidDependency {
            from: Layer::Domain,
            to: Layer::Application,
        });
        list.push(Violation::CycleDetected);

        let text = list.to_string();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Domain layer may not depend on Application"));
        assert!(text.contains("Circular"));
    }

    #[test]
    fn forbidden_dependency_names_every_target() {
        let violation = Violation::ForbiddenDependency {
            layer: Layer::Domain,
            targets: vec![Layer::Application, Layer::Api],
        };
        assert_eq!(
            violation.to_string(),
            "VIOLATION: Domain layer must not have dependencies, but found: Application, API"
        );
    }

    #[test]
    fn list_is_a_std_error() {
        let mut list = ViolationList::new();
        list.push(Violation::CycleDetected);
        let err: Box<dyn std::error::Error> = Box::new(list);
        assert_eq!(err.to_string(), "VIOLATION: Circular dependencies detected!");
    }

    #[test]
    fn empty_list_is_ok() {
        assert!(ViolationList::new().into_result().is_ok());
    }
}
