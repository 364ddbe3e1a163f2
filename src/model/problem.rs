use super::{
    Condition, ConstantId, Formula, GroundAtom, Operator, OperatorId, PredicateId, Term,
    TypeHierarchy, TypeId, VariableId,
};
use crate::utils::NameTable;
use anyhow::{anyhow, Context, Result};

/// A lifted planning problem: types, constants, predicates, operators, initial state and goal.
///
/// Every element is registered through a dedicated method which checks its consistency with the ones already defined
/// (names must be unique, referenced names must exist, condition arities must match their predicate, ...).
/// Elements are referred to by handles given at registration time.
///
/// The initial state is a set of positive ground atoms (closed world assumption).
/// The goal is a conjunction of ground conditions, which may be negative.
///
/// # Example
///
/// ```
/// # use liftsat::model::{Condition, Formula, LiftedProblem, Term};
/// let mut problem = LiftedProblem::default();
/// problem.new_type("loc", &[]).unwrap();
/// let a = problem.new_constant("a", "loc").unwrap();
/// let b = problem.new_constant("b", "loc").unwrap();
/// let at = problem.new_predicate("at", &["loc"]).unwrap();
/// let mv = problem.new_operator("move", &[("from", "loc"), ("to", "loc")]).unwrap();
/// let from = Term::Variable(problem.operator_variable(mv, "from").unwrap());
/// let to = Term::Variable(problem.operator_variable(mv, "to").unwrap());
/// problem.add_precondition(mv, Formula::Literal(Condition::positive(at, vec![from]))).unwrap();
/// problem.add_effect(mv, Formula::conjunction(vec![
///     Condition::negative(at, vec![from]),
///     Condition::positive(at, vec![to]),
/// ])).unwrap();
/// problem.add_initial_atom(Condition::positive(at, vec![Term::Constant(a)])).unwrap();
/// problem.add_goal(Condition::positive(at, vec![Term::Constant(b)])).unwrap();
/// assert_eq!(1, problem.n_operators());
/// ```
#[derive(Debug, Clone)]
pub struct LiftedProblem {
    types: TypeHierarchy,
    constants: NameTable,
    constant_types: Vec<TypeId>,
    predicates: NameTable,
    predicate_signatures: Vec<Vec<TypeId>>,
    variables: Vec<(String, TypeId)>,
    operator_names: NameTable,
    operators: Vec<Operator>,
    init: Vec<GroundAtom>,
    goal: Vec<Condition>,
}

impl Default for LiftedProblem {
    fn default() -> Self {
        Self {
            types: TypeHierarchy::default(),
            constants: NameTable::new("constant"),
            constant_types: Vec::new(),
            predicates: NameTable::new("predicate"),
            predicate_signatures: Vec::new(),
            variables: Vec::new(),
            operator_names: NameTable::new("operator"),
            operators: Vec::new(),
            init: Vec::new(),
            goal: Vec::new(),
        }
    }
}

impl LiftedProblem {
    /// Adds a new type given the names of its direct supertypes.
    pub fn new_type(&mut self, name: &str, supertypes: &[&str]) -> Result<TypeId> {
        let supertypes = supertypes
            .iter()
            .map(|s| self.types.get_type(s))
            .collect::<Result<Vec<TypeId>>>()
            .with_context(|| format!("while defining type {}", name))?;
        self.types.new_type(name, &supertypes)
    }

    /// Returns the type hierarchy of this problem.
    pub fn types(&self) -> &TypeHierarchy {
        &self.types
    }

    /// Adds a new constant given the name of its type.
    pub fn new_constant(&mut self, name: &str, type_name: &str) -> Result<ConstantId> {
        let t = self
            .types
            .get_type(type_name)
            .with_context(|| format!("while defining constant {}", name))?;
        let id = self.constants.register(name)?;
        self.constant_types.push(t);
        Ok(ConstantId::new(id))
    }

    /// Returns the constant with the given name.
    pub fn get_constant(&self, name: &str) -> Result<ConstantId> {
        self.constants.get_id(name).map(ConstantId::new)
    }

    /// Returns the name of a constant.
    pub fn constant_name(&self, c: ConstantId) -> &str {
        self.constants.name_of(c.index())
    }

    /// Returns the type of a constant.
    pub fn constant_type(&self, c: ConstantId) -> TypeId {
        self.constant_types[c.index()]
    }

    /// Returns the number of constants.
    pub fn n_constants(&self) -> usize {
        self.constant_types.len()
    }

    /// Iterates over the constants, in declaration order.
    pub fn iter_constants(&self) -> impl Iterator<Item = ConstantId> {
        (0..self.n_constants()).map(ConstantId::new)
    }

    /// Adds a new predicate given the names of the types of its parameters.
    pub fn new_predicate(&mut self, name: &str, signature: &[&str]) -> Result<PredicateId> {
        let signature = signature
            .iter()
            .map(|s| self.types.get_type(s))
            .collect::<Result<Vec<TypeId>>>()
            .with_context(|| format!("while defining predicate {}", name))?;
        let id = self.predicates.register(name)?;
        self.predicate_signatures.push(signature);
        Ok(PredicateId::new(id))
    }

    /// Returns the predicate with the given name.
    pub fn get_predicate(&self, name: &str) -> Result<PredicateId> {
        self.predicates.get_id(name).map(PredicateId::new)
    }

    /// Returns the name of a predicate.
    pub fn predicate_name(&self, p: PredicateId) -> &str {
        self.predicates.name_of(p.index())
    }

    /// Returns the types of the parameters of a predicate.
    pub fn predicate_signature(&self, p: PredicateId) -> &[TypeId] {
        &self.predicate_signatures[p.index()]
    }

    /// Returns the number of predicates.
    pub fn n_predicates(&self) -> usize {
        self.predicate_signatures.len()
    }

    /// Adds a new operator given its parameters, as a list of (variable name, type name) couples.
    ///
    /// Each parameter is allocated as a new variable scoped to the operator.
    /// The precondition and the effect are empty; see [add_precondition](Self::add_precondition) and [add_effect](Self::add_effect).
    pub fn new_operator(&mut self, name: &str, parameters: &[(&str, &str)]) -> Result<OperatorId> {
        let context = || format!("while defining operator {}", name);
        let mut variables = Vec::with_capacity(parameters.len());
        for (i, (var_name, type_name)) in parameters.iter().enumerate() {
            if parameters[..i].iter().any(|(n, _)| n == var_name) {
                return Err(anyhow!("parameter {} is defined twice", var_name)).with_context(context);
            }
            variables.push((var_name.to_string(), self.types.get_type(type_name).with_context(context)?));
        }
        let id = OperatorId::new(self.operator_names.register(name)?);
        let first_var = self.variables.len();
        self.variables.append(&mut variables);
        let parameters = (first_var..self.variables.len()).map(VariableId::new).collect();
        self.operators.push(Operator::new(id, name.to_string(), parameters));
        Ok(id)
    }

    /// Returns the parameter of an operator with the given name.
    pub fn operator_variable(&self, op: OperatorId, name: &str) -> Result<VariableId> {
        self.operators[op.index()]
            .parameters()
            .iter()
            .find(|v| self.variable_name(**v) == name)
            .copied()
            .ok_or_else(|| {
                anyhow!(
                    "no parameter {} in operator {}",
                    name,
                    self.operators[op.index()].name()
                )
            })
    }

    /// Returns the name of a variable.
    pub fn variable_name(&self, v: VariableId) -> &str {
        &self.variables[v.index()].0
    }

    /// Returns the type of a variable.
    pub fn variable_type(&self, v: VariableId) -> TypeId {
        self.variables[v.index()].1
    }

    /// Adds a formula to the precondition of an operator.
    pub fn add_precondition(&mut self, op: OperatorId, f: Formula) -> Result<()> {
        self.check_formula(&f).with_context(|| {
            format!("while adding a precondition to operator {}", self.operators[op.index()].name())
        })?;
        self.operators[op.index()].add_precondition(f);
        Ok(())
    }

    /// Adds a formula to the effect of an operator.
    pub fn add_effect(&mut self, op: OperatorId, f: Formula) -> Result<()> {
        self.check_formula(&f).with_context(|| {
            format!("while adding an effect to operator {}", self.operators[op.index()].name())
        })?;
        self.operators[op.index()].add_effect(f);
        Ok(())
    }

    /// Returns the operator with the given name.
    pub fn get_operator(&self, name: &str) -> Result<OperatorId> {
        self.operator_names.get_id(name).map(OperatorId::new)
    }

    /// Returns an operator given its handle.
    pub fn operator(&self, op: OperatorId) -> &Operator {
        &self.operators[op.index()]
    }

    /// Returns the operators, in declaration order.
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// Returns the number of operators.
    pub fn n_operators(&self) -> usize {
        self.operators.len()
    }

    /// Adds an atom to the initial state.
    ///
    /// The condition must be ground and positive.
    /// Returns `false` if the atom was already part of the initial state.
    pub fn add_initial_atom(&mut self, c: Condition) -> Result<bool> {
        self.check_condition(&c)?;
        if c.is_negated() {
            return Err(anyhow!("initial state cannot contain negative atoms"));
        }
        let atom = c
            .to_ground_atom()
            .ok_or_else(|| anyhow!("initial state atoms must be ground"))?;
        if self.init.contains(&atom) {
            return Ok(false);
        }
        self.init.push(atom);
        Ok(true)
    }

    /// Returns the atoms of the initial state.
    pub fn init(&self) -> &[GroundAtom] {
        &self.init
    }

    /// Adds a condition to the goal.
    ///
    /// The condition must be ground.
    pub fn add_goal(&mut self, c: Condition) -> Result<()> {
        self.check_condition(&c)?;
        if !c.is_ground() {
            return Err(anyhow!("goal conditions must be ground"));
        }
        self.goal.push(c);
        Ok(())
    }

    /// Returns the goal conditions.
    pub fn goal(&self) -> &[Condition] {
        &self.goal
    }

    /// Checks the consistency of the whole problem.
    ///
    /// Every condition must match the signature of its predicate,
    /// the variables of an operator condition must be parameters of this operator,
    /// initial atoms must be ground and positive, and goal conditions must be ground.
    pub fn validate(&self) -> Result<()> {
        for op in self.operators.iter() {
            let context = || format!("while validating operator {}", op.name());
            for f in [op.precondition(), op.effect()] {
                self.check_formula(f).with_context(context)?;
                self.check_formula_scope(op, f).with_context(context)?;
            }
        }
        for atom in self.init.iter() {
            let c = Condition::positive(
                atom.predicate(),
                atom.args().iter().map(|k| Term::Constant(*k)).collect(),
            );
            self.check_condition(&c)
                .context("while validating the initial state")?;
        }
        for c in self.goal.iter() {
            self.check_condition(c).context("while validating the goal")?;
            if !c.is_ground() {
                return Err(anyhow!("goal conditions must be ground"));
            }
        }
        Ok(())
    }

    fn check_formula_scope(&self, op: &Operator, f: &Formula) -> Result<()> {
        match f {
            Formula::Literal(c) => match c.variables().find(|v| op.parameter_position(*v).is_none()) {
                Some(v) => Err(anyhow!(
                    "variable ?{} of condition {} is not a parameter",
                    self.variable_name(v),
                    self.condition_to_string(c)
                )),
                None => Ok(()),
            },
            Formula::And(v) | Formula::Or(v) => v.iter().try_for_each(|g| self.check_formula_scope(op, g)),
        }
    }

    fn check_formula(&self, f: &Formula) -> Result<()> {
        match f {
            Formula::Literal(c) => self.check_condition(c),
            Formula::And(v) | Formula::Or(v) => v.iter().try_for_each(|g| self.check_formula(g)),
        }
    }

    fn check_condition(&self, c: &Condition) -> Result<()> {
        let signature = self.predicate_signature(c.predicate());
        if signature.len() != c.args().len() {
            return Err(anyhow!(
                "predicate {} expects {} argument(s), got {}",
                self.predicate_name(c.predicate()),
                signature.len(),
                c.args().len()
            ));
        }
        for (i, (term, expected)) in c.args().iter().zip(signature.iter()).enumerate() {
            let actual = match term {
                Term::Constant(k) => self.constant_type(*k),
                Term::Variable(v) => self.variable_type(*v),
            };
            if !self.types.are_related(*expected, actual) {
                return Err(anyhow!(
                    "argument {} of predicate {} must be of type {}, got type {}",
                    i + 1,
                    self.predicate_name(c.predicate()),
                    self.types.name_of(*expected),
                    self.types.name_of(actual)
                ));
            }
        }
        Ok(())
    }

    /// Returns a textual representation of a ground atom, like `at(a)`.
    pub fn atom_to_string(&self, atom: &GroundAtom) -> String {
        let args = atom
            .args()
            .iter()
            .map(|c| self.constant_name(*c))
            .collect::<Vec<&str>>();
        format!("{}({})", self.predicate_name(atom.predicate()), args.join(", "))
    }

    /// Returns a textual representation of a condition, like `-at(?from)`.
    pub fn condition_to_string(&self, c: &Condition) -> String {
        let args = c
            .args()
            .iter()
            .map(|t| match t {
                Term::Constant(k) => self.constant_name(*k).to_string(),
                Term::Variable(v) => format!("?{}", self.variable_name(*v)),
            })
            .collect::<Vec<String>>();
        format!(
            "{}{}({})",
            if c.is_negated() { "-" } else { "" },
            self.predicate_name(c.predicate()),
            args.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locations() -> LiftedProblem {
        let mut problem = LiftedProblem::default();
        problem.new_type("loc", &[]).unwrap();
        problem.new_type("city", &["loc"]).unwrap();
        problem.new_type("truck", &[]).unwrap();
        problem.new_constant("a", "city").unwrap();
        problem.new_constant("t", "truck").unwrap();
        problem.new_predicate("at", &["loc"]).unwrap();
        problem
    }

    #[test]
    fn test_operator_variables() {
        let mut problem = locations();
        let op = problem
            .new_operator("move", &[("from", "loc"), ("to", "loc")])
            .unwrap();
        let from = problem.operator_variable(op, "from").unwrap();
        let to = problem.operator_variable(op, "to").unwrap();
        assert_eq!(&[from, to], problem.operator(op).parameters());
        assert_eq!("to", problem.variable_name(to));
        assert!(problem.operator_variable(op, "x").is_err());
        assert_eq!(Some(1), problem.operator(op).parameter_position(to));
    }

    #[test]
    fn test_duplicate_parameter() {
        let mut problem = locations();
        assert!(problem
            .new_operator("move", &[("from", "loc"), ("from", "loc")])
            .is_err());
        assert_eq!(0, problem.n_operators());
    }

    #[test]
    fn test_condition_type_check() {
        let mut problem = locations();
        let at = problem.get_predicate("at").unwrap();
        let a = problem.get_constant("a").unwrap();
        let t = problem.get_constant("t").unwrap();
        assert!(problem
            .add_initial_atom(Condition::positive(at, vec![Term::Constant(a)]))
            .unwrap());
        assert!(!problem
            .add_initial_atom(Condition::positive(at, vec![Term::Constant(a)]))
            .unwrap());
        assert!(problem
            .add_initial_atom(Condition::positive(at, vec![Term::Constant(t)]))
            .is_err());
        assert!(problem
            .add_initial_atom(Condition::positive(at, vec![]))
            .is_err());
        assert!(problem
            .add_initial_atom(Condition::negative(at, vec![Term::Constant(a)]))
            .is_err());
        assert_eq!(1, problem.init().len());
        assert_eq!("at(a)", problem.atom_to_string(&problem.init()[0]));
    }

    #[test]
    fn test_goal_must_be_ground() {
        let mut problem = locations();
        let op = problem.new_operator("wait", &[("x", "loc")]).unwrap();
        let x = problem.operator_variable(op, "x").unwrap();
        let at = problem.get_predicate("at").unwrap();
        assert!(problem
            .add_goal(Condition::positive(at, vec![Term::Variable(x)]))
            .is_err());
        problem
            .add_precondition(op, Formula::Literal(Condition::negative(at, vec![Term::Variable(x)])))
            .unwrap();
        let (flat, _) = crate::model::split_condition(problem.operator(op).precondition());
        assert_eq!("-at(?x)", problem.condition_to_string(&flat[0]));
        problem.validate().unwrap();
    }

    #[test]
    fn test_validate_variable_scope() {
        let mut problem = locations();
        let first = problem.new_operator("first", &[("x", "loc")]).unwrap();
        let second = problem.new_operator("second", &[("y", "loc")]).unwrap();
        let x = problem.operator_variable(first, "x").unwrap();
        let at = problem.get_predicate("at").unwrap();
        problem
            .add_effect(second, Formula::Literal(Condition::positive(at, vec![Term::Variable(x)])))
            .unwrap();
        let err = problem.validate().unwrap_err();
        assert_eq!("while validating operator second", err.to_string());
    }
}
