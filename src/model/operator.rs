use super::{Formula, OperatorId, VariableId};

/// A parametrized action schema.
///
/// Operators are built through [LiftedProblem::new_operator](crate::model::LiftedProblem::new_operator),
/// which allocates their parameters as fresh variables.
/// Preconditions and effects are added afterwards.
#[derive(Debug, Clone)]
pub struct Operator {
    id: OperatorId,
    name: String,
    parameters: Vec<VariableId>,
    precondition: Formula,
    effect: Formula,
}

impl Operator {
    pub(crate) fn new(id: OperatorId, name: String, parameters: Vec<VariableId>) -> Self {
        Self {
            id,
            name,
            parameters,
            precondition: Formula::default(),
            effect: Formula::default(),
        }
    }

    /// Returns the handle of this operator.
    pub fn id(&self) -> OperatorId {
        self.id
    }

    /// Returns the name of this operator.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parameters of this operator, in declaration order.
    pub fn parameters(&self) -> &[VariableId] {
        &self.parameters
    }

    /// Returns the number of parameters of this operator.
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// Returns the position of a variable in the parameter list, if any.
    pub fn parameter_position(&self, v: VariableId) -> Option<usize> {
        self.parameters.iter().position(|p| *p == v)
    }

    /// Returns the precondition of this operator.
    pub fn precondition(&self) -> &Formula {
        &self.precondition
    }

    /// Returns the effect of this operator.
    pub fn effect(&self) -> &Formula {
        &self.effect
    }

    pub(crate) fn add_precondition(&mut self, f: Formula) {
        self.precondition = std::mem::take(&mut self.precondition).and(f);
    }

    pub(crate) fn add_effect(&mut self, f: Formula) {
        self.effect = std::mem::take(&mut self.effect).and(f);
    }
}
