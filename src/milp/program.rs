//! Solver-independent integer program.
//!
//! Variables live in an arena indexed by [`VarId`]; each carries a typed
//! [`AssignmentKey`] and a lookup table maps keys back to ids. Every
//! constraint is a 0/1-coefficient sum over variables compared to a
//! right-hand side, which is all the timetabling model needs.

use std::collections::HashMap;
use std::fmt;

use crate::models::TimeSlot;

/// Index of a decision variable in the program arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

/// Identity of an assignment variable: (section, room, slot).
///
/// `section` and `room` index the slices the model was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssignmentKey {
    /// Section index.
    pub section: usize,
    /// Room index.
    pub room: usize,
    /// Time slot.
    pub slot: TimeSlot,
}

impl AssignmentKey {
    /// Creates a key.
    pub fn new(section: usize, room: usize, slot: TimeSlot) -> Self {
        Self { section, room, slot }
    }
}

/// Comparison sense of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// `sum == rhs`
    Eq,
    /// `sum <= rhs`
    Le,
}

/// Which model rule a constraint encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintFamily {
    /// Each section assigned exactly once.
    ExactlyOnce,
    /// At most one section per room and slot.
    RoomExclusive,
    /// At most one section per instructor and slot.
    InstructorExclusive,
    /// At most one section per student and slot.
    StudentExclusive,
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ExactlyOnce => "exactly_once",
            Self::RoomExclusive => "room_exclusive",
            Self::InstructorExclusive => "instructor_exclusive",
            Self::StudentExclusive => "student_exclusive",
        };
        f.write_str(s)
    }
}

/// A unit-coefficient linear constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    /// Rule encoded by this constraint.
    pub family: ConstraintFamily,
    /// Variables summed on the left-hand side.
    pub terms: Vec<VarId>,
    /// Comparison sense.
    pub sense: Sense,
    /// Right-hand side.
    pub rhs: f64,
}

/// A minimization program over binary assignment variables.
#[derive(Debug, Clone, Default)]
pub struct IntegerProgram {
    keys: Vec<AssignmentKey>,
    costs: Vec<f64>,
    index: HashMap<AssignmentKey, VarId>,
    constraints: Vec<LinearConstraint>,
}

impl IntegerProgram {
    /// Creates an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a variable, or returns the existing one for the same key.
    pub fn add_variable(&mut self, key: AssignmentKey, cost: f64) -> VarId {
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = VarId(self.keys.len());
        self.keys.push(key);
        self.costs.push(cost);
        self.index.insert(key, id);
        id
    }

    /// Adds a constraint.
    pub fn add_constraint(
        &mut self,
        family: ConstraintFamily,
        terms: Vec<VarId>,
        sense: Sense,
        rhs: f64,
    ) {
        self.constraints.push(LinearConstraint {
            family,
            terms,
            sense,
            rhs,
        });
    }

    /// Variable for a key.
    pub fn var(&self, key: &AssignmentKey) -> Option<VarId> {
        self.index.get(key).copied()
    }

    /// Key of a variable.
    pub fn key(&self, var: VarId) -> Option<&AssignmentKey> {
        self.keys.get(var.0)
    }

    /// All keys in arena order.
    pub fn keys(&self) -> &[AssignmentKey] {
        &self.keys
    }

    /// Objective coefficients in arena order.
    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    /// All constraints.
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Number of variables.
    pub fn num_variables(&self) -> usize {
        self.keys.len()
    }

    /// Number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Number of constraints of one family.
    pub fn count_family(&self, family: ConstraintFamily) -> usize {
        self.constraints.iter().filter(|c| c.family == family).count()
    }

    /// Objective value of an assignment (`values` in arena order).
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.costs.iter().zip(values).map(|(c, v)| c * v).sum()
    }

    /// Whether `values` satisfies every constraint within `tolerance`.
    pub fn is_satisfied_by(&self, values: &[f64], tolerance: f64) -> bool {
        if values.len() != self.keys.len() {
            return false;
        }
        self.constraints.iter().all(|c| {
            let lhs: f64 = c.terms.iter().map(|v| values[v.0]).sum();
            match c.sense {
                Sense::Eq => (lhs - c.rhs).abs() <= tolerance,
                Sense::Le => lhs <= c.rhs + tolerance,
            }
        })
    }
}
