use super::IntegerVariable;
use crate::engine::Assignments;

/// Tracks the values removed from a variable since the last time the owner consumed them.
///
/// The monitor remembers a position in the domain trail. Values removed after that position are
/// reported by [`DeltaMonitor::removed_values`] until [`DeltaMonitor::consume`] moves the
/// position to the end of the trail. After backtracking, the owner should call
/// [`DeltaMonitor::synchronise`], otherwise the position may point past the restored trail.
#[derive(Clone, Debug)]
pub struct DeltaMonitor<Var> {
    variable: Var,
    trail_position: usize,
}

impl<Var: IntegerVariable> DeltaMonitor<Var> {
    /// Create a monitor which reports removals happening from now on.
    pub fn new(variable: Var, assignments: &Assignments) -> Self {
        DeltaMonitor {
            variable,
            trail_position: assignments.num_trail_entries(),
        }
    }

    pub fn variable(&self) -> &Var {
        &self.variable
    }

    /// The values removed since the monitor was created or last consumed.
    pub fn removed_values<'a>(
        &'a self,
        assignments: &'a Assignments,
    ) -> impl Iterator<Item = i32> + 'a {
        self.variable
            .removed_values_since(assignments, self.trail_position)
    }

    /// Mark all removals up to now as seen.
    pub fn consume(&mut self, assignments: &Assignments) {
        self.trail_position = assignments.num_trail_entries();
    }

    /// Clamp the position to the trail after a restore.
    pub fn synchronise(&mut self, assignments: &Assignments) {
        self.trail_position = self.trail_position.min(assignments.num_trail_entries());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Cause;

    #[test]
    fn consumed_removals_are_not_reported_again() {
        let mut assignments = Assignments::default();
        let domain = assignments.create_new_integer_variable_sparse(vec![1, 2, 3, 4, 5]);
        let mut monitor = DeltaMonitor::new(domain, &assignments);

        let _ = assignments
            .remove_value_from_domain(domain, 3, Cause::Decision)
            .expect("non-empty");
        assert_eq!(
            monitor.removed_values(&assignments).collect::<Vec<_>>(),
            vec![3]
        );

        monitor.consume(&assignments);
        let _ = assignments
            .tighten_upper_bound(domain, 4, Cause::Decision)
            .expect("non-empty");
        assert_eq!(
            monitor.removed_values(&assignments).collect::<Vec<_>>(),
            vec![5]
        );
    }

    #[test]
    fn synchronise_after_restore() {
        let mut assignments = Assignments::default();
        let domain = assignments.create_new_integer_variable_sparse(vec![1, 2, 3, 4, 5]);
        assignments.new_checkpoint();
        let _ = assignments
            .remove_value_from_domain(domain, 2, Cause::Decision)
            .expect("non-empty");
        let mut monitor = DeltaMonitor::new(domain, &assignments);

        assignments.synchronise(0);
        monitor.synchronise(&assignments);
        let _ = assignments
            .remove_value_from_domain(domain, 4, Cause::Decision)
            .expect("non-empty");

        assert_eq!(
            monitor.removed_values(&assignments).collect::<Vec<_>>(),
            vec![4]
        );
    }
}
