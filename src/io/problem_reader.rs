use crate::model::{Condition, Formula, LiftedProblem, OperatorId, Term};
use anyhow::{anyhow, Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::io::{BufRead, BufReader, Read};

/// The type of callback functions to call when warnings are raised while reading a problem.
///
/// The arguments are the (1-based) line number and the warning message.
pub type WarningHandler = Box<dyn Fn(usize, String)>;

const NAME_PATTERN: &str = r"[_[:alpha:]][_[:alpha:]\d\-]*";

lazy_static! {
    static ref DECLARATION_PATTERN: Regex = Regex::new(r"^([a-z]+)\s*\((.*)\)\s*\.$").unwrap();
    static ref NAME: Regex = Regex::new(&format!(r"^{}$", NAME_PATTERN)).unwrap();
    static ref PARAMETER: Regex =
        Regex::new(&format!(r"^\?({})\s*:\s*({})$", NAME_PATTERN, NAME_PATTERN)).unwrap();
    static ref VARIABLE: Regex = Regex::new(&format!(r"^\?({})$", NAME_PATTERN)).unwrap();
    static ref LITERAL: Regex = Regex::new(&format!(
        r"^(-)?\s*({})\s*(?:\((.*)\))?$",
        NAME_PATTERN
    ))
    .unwrap();
}

fn split_args(s: &str) -> Vec<&str> {
    if s.trim().is_empty() {
        return vec![];
    }
    s.split(',').map(|a| a.trim()).collect()
}

fn check_name(name: &str) -> Result<&str> {
    if NAME.is_match(name) {
        Ok(name)
    } else {
        Err(anyhow!(r#"invalid name "{}""#, name))
    }
}

fn check_names<'a>(names: &[&'a str]) -> Result<Vec<&'a str>> {
    names.iter().map(|n| check_name(n)).collect()
}

/// A reader for lifted planning problems.
///
/// # Format
///
/// The format is line-based: each non-empty line is a declaration ending with a dot.
/// Comments begin with a `%` and end with the line.
///
/// ```text
/// % types, with their supertypes
/// type(loc).
/// type(city, loc).
/// % constants, with their type
/// const(a, b, loc).
/// const(c, city).
/// % predicates, with the types of their parameters
/// pred(at, loc).
/// % operators, with their parameters
/// op(move, ?from:loc, ?to:loc).
/// % preconditions and effects; a minus denotes a negative literal, a pipe a disjunction
/// pre(move, at(?from)).
/// eff(move, -at(?from)).
/// eff(move, at(?to)).
/// % initial state (positive atoms only) and goal
/// init(at(a)).
/// goal(at(c)).
/// ```
///
/// Names must be declared before they are used.
/// Duplicated initial atoms raise warnings.
///
/// # Example
///
/// ```
/// # use liftsat::io::ProblemReader;
/// let problem = ProblemReader::default()
///     .read(&mut "type(loc).\nconst(a, loc).\npred(at, loc).\ninit(at(a)).\ngoal(at(a)).".as_bytes())
///     .unwrap();
/// assert_eq!(1, problem.n_constants());
/// ```
#[derive(Default)]
pub struct ProblemReader {
    warning_handlers: Vec<WarningHandler>,
}

impl ProblemReader {
    /// Reads a problem.
    ///
    /// In case warnings are raised, the callback functions registered by [add_warning_handler](Self::add_warning_handler) are triggered.
    pub fn read(&self, reader: &mut dyn Read) -> Result<LiftedProblem> {
        let mut problem = LiftedProblem::default();
        let br = BufReader::new(reader);
        for (i, line) in br.lines().enumerate() {
            let context = || format!("while reading line {}", i + 1);
            let line = line.with_context(context)?;
            let content = match line.find('%') {
                Some(index) => &line[..index],
                None => line.as_str(),
            }
            .trim();
            if content.is_empty() {
                continue;
            }
            if let Some(w) = self
                .read_declaration(&mut problem, content)
                .with_context(context)?
            {
                self.warning_handlers.iter().for_each(|h| (h)(i + 1, w.clone()));
            }
        }
        Ok(problem)
    }

    /// Adds a callback function to call when warnings are raised while reading a problem.
    pub fn add_warning_handler(&mut self, h: WarningHandler) {
        self.warning_handlers.push(h);
    }

    fn read_declaration(&self, problem: &mut LiftedProblem, line: &str) -> Result<Option<String>> {
        let captures = DECLARATION_PATTERN
            .captures(line)
            .ok_or_else(|| anyhow!(r#"syntax error in "{}""#, line))?;
        let keyword = &captures[1];
        let body = &captures[2];
        match keyword {
            "type" => {
                let names = check_names(&split_args(body))?;
                if names.is_empty() {
                    return Err(anyhow!("missing type name"));
                }
                problem.new_type(names[0], &names[1..])?;
            }
            "const" => {
                let names = check_names(&split_args(body))?;
                if names.len() < 2 {
                    return Err(anyhow!("expected at least a constant name and a type name"));
                }
                let type_name = names[names.len() - 1];
                for name in &names[..names.len() - 1] {
                    problem.new_constant(name, type_name)?;
                }
            }
            "pred" => {
                let names = check_names(&split_args(body))?;
                if names.is_empty() {
                    return Err(anyhow!("missing predicate name"));
                }
                problem.new_predicate(names[0], &names[1..])?;
            }
            "op" => {
                let args = split_args(body);
                if args.is_empty() {
                    return Err(anyhow!("missing operator name"));
                }
                let parameters = args[1..]
                    .iter()
                    .map(|p| {
                        PARAMETER
                            .captures(p)
                            .map(|c| (c.get(1).map_or("", |m| m.as_str()), c.get(2).map_or("", |m| m.as_str())))
                            .ok_or_else(|| anyhow!(r#"invalid parameter "{}""#, p))
                    })
                    .collect::<Result<Vec<(&str, &str)>>>()?;
                problem.new_operator(check_name(args[0])?, &parameters)?;
            }
            "pre" | "eff" => {
                let (op_name, formula) = body
                    .split_once(',')
                    .ok_or_else(|| anyhow!("expected an operator name and a condition"))?;
                let op = problem.get_operator(op_name.trim())?;
                let formula = read_formula(problem, Some(op), formula.trim())?;
                if keyword == "pre" {
                    problem.add_precondition(op, formula)?;
                } else {
                    problem.add_effect(op, formula)?;
                }
            }
            "init" => {
                let condition = read_literal(problem, None, body.trim())?;
                let atom = problem.condition_to_string(&condition);
                if !problem.add_initial_atom(condition)? {
                    return Ok(Some(format!("initial atom {} is defined twice", atom)));
                }
            }
            "goal" => {
                let condition = read_literal(problem, None, body.trim())?;
                problem.add_goal(condition)?;
            }
            _ => return Err(anyhow!(r#"unknown declaration "{}""#, keyword)),
        }
        Ok(None)
    }
}

fn read_formula(problem: &LiftedProblem, op: Option<OperatorId>, s: &str) -> Result<Formula> {
    let literals = s
        .split('|')
        .map(|l| read_literal(problem, op, l.trim()).map(Formula::Literal))
        .collect::<Result<Vec<Formula>>>()?;
    if literals.len() == 1 {
        Ok(literals.into_iter().next().unwrap_or_default())
    } else {
        Ok(Formula::Or(literals))
    }
}

fn read_literal(problem: &LiftedProblem, op: Option<OperatorId>, s: &str) -> Result<Condition> {
    let captures = LITERAL
        .captures(s)
        .ok_or_else(|| anyhow!(r#"invalid literal "{}""#, s))?;
    let negated = captures.get(1).is_some();
    let predicate = problem.get_predicate(&captures[2])?;
    let args = split_args(captures.get(3).map_or("", |m| m.as_str()))
        .iter()
        .map(|a| read_term(problem, op, a))
        .collect::<Result<Vec<Term>>>()?;
    Ok(Condition::new(predicate, args, negated))
}

fn read_term(problem: &LiftedProblem, op: Option<OperatorId>, s: &str) -> Result<Term> {
    match VARIABLE.captures(s) {
        Some(c) => match op {
            Some(op) => Ok(Term::Variable(problem.operator_variable(op, &c[1])?)),
            None => Err(anyhow!("variable {} is not allowed here", s)),
        },
        None => Ok(Term::Constant(problem.get_constant(check_name(s)?)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    fn read(s: &str) -> Result<LiftedProblem> {
        ProblemReader::default().read(&mut s.as_bytes())
    }

    #[test]
    fn test_declaration_pattern() {
        assert!(DECLARATION_PATTERN.is_match("type(loc)."));
        assert!(DECLARATION_PATTERN.is_match("pre(move, at(?x))."));
        assert!(DECLARATION_PATTERN.is_match("op (stay) ."));
        assert!(!DECLARATION_PATTERN.is_match("type(loc)"));
        assert!(!DECLARATION_PATTERN.is_match("type loc."));
        assert!(!DECLARATION_PATTERN.is_match("Type(loc)."));
    }

    #[test]
    fn test_read_ok() {
        let problem = read(
            r#"
            % a comment
            type(loc).
            type(city, loc). % a subtype
            const(a, b, loc).
            const(c, city).
            pred(at, loc).
            pred(road, loc, loc).
            pred(sunny).
            op(move, ?from:loc, ?to : city).
            pre(move, at(?from)).
            pre(move, road(?from, ?to) | sunny).
            eff(move, -at(?from)).
            eff(move, at(?to)).
            init(at(a)).
            init(sunny()).
            goal(at(c)).
            goal(-at(a)).
            "#,
        )
        .unwrap();
        assert_eq!(3, problem.n_constants());
        assert_eq!(3, problem.n_predicates());
        let mv = problem.get_operator("move").unwrap();
        let op = problem.operator(mv);
        assert_eq!(2, op.arity());
        let (flat, residual) = crate::model::split_condition(op.precondition());
        assert_eq!(1, flat.len());
        assert!(residual.is_some());
        let (flat, residual) = crate::model::split_condition(op.effect());
        assert_eq!(
            vec!["-at(?from)", "at(?to)"],
            flat.iter()
                .map(|c| problem.condition_to_string(c))
                .collect::<Vec<String>>()
        );
        assert!(residual.is_none());
        assert_eq!(2, problem.init().len());
        assert_eq!(2, problem.goal().len());
        assert!(problem.goal()[1].is_negated());
    }

    #[test]
    fn test_errors_have_line_numbers() {
        let err = read("type(loc).\nconst(a, loc).\npred(at, loc).\ninit(at(b)).").unwrap_err();
        assert_eq!("while reading line 4", err.to_string());
        assert!(format!("{:#}", err).contains("no such constant: b"));
    }

    #[test]
    fn test_syntax_errors() {
        assert!(read("type(loc)").is_err());
        assert!(read("foo(loc).").is_err());
        assert!(read("type(loc).\nconst(a).").is_err());
        assert!(read("type(loc).\nop(move, from:loc).").is_err());
        assert!(read("type(loc).\npred(at, loc).\nop(o).\npre(o, at(?x)).").is_err());
        assert!(read("type(loc).\nconst(a, loc).\npred(at, loc).\nop(o, ?x:loc).\npre(o).").is_err());
        assert!(read("type(loc).\npred(at, loc).\ngoal(at(?x)).").is_err());
        assert!(read("type(loc).\nconst(a, loc).\npred(at, loc).\ninit(at(a) | at(a)).").is_err());
        assert!(read("type(1loc).").is_err());
    }

    #[test]
    fn test_undeclared_names() {
        assert!(read("type(city, loc).").is_err());
        assert!(read("type(loc).\nconst(a, city).").is_err());
        assert!(read("type(loc).\nconst(a, loc).\ninit(at(a)).").is_err());
        assert!(read("type(loc).\npre(move, at(?x)).").is_err());
    }

    #[test]
    fn test_duplicate_init_warning() {
        let warnings = Rc::new(RefCell::new(vec![]));
        let warnings_clone = Rc::clone(&warnings);
        let mut reader = ProblemReader::default();
        reader.add_warning_handler(Box::new(move |line, w| {
            warnings_clone.borrow_mut().push((line, w))
        }));
        let problem = reader
            .read(&mut "type(loc).\nconst(a, loc).\npred(at, loc).\ninit(at(a)).\n\ninit(at(a)).".as_bytes())
            .unwrap();
        assert_eq!(1, problem.init().len());
        assert_eq!(
            vec![(6, "initial atom at(a) is defined twice".to_string())],
            *warnings.borrow()
        );
    }
}
