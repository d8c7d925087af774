//! Bottom-up evaluation of a loaded program.
//!
//! Rules are split three ways by what they depend on:
//! - static rules read neither `true` nor `does` and are evaluated once
//! - state rules read `true` and are evaluated per position
//! - move rules read `does` and are evaluated per transition
//!
//! Within each group rules run stratum by stratum, each stratum to a
//! fixpoint, on top of the already complete lower layers.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::trace;

use super::rules::{Expr, Ground, Literal, Program, RelKey, Rule, VarId};
use crate::error::{GdlError, Result};

pub(crate) type Tuple = Box<[Ground]>;

/// Ground facts grouped by relation.
#[derive(Clone, Debug, Default)]
pub(crate) struct Facts {
    map: FxHashMap<RelKey, FxHashSet<Tuple>>,
}

impl Facts {
    pub(crate) fn insert(&mut self, key: RelKey, tuple: Tuple) -> bool {
        self.map.entry(key).or_default().insert(tuple)
    }

    pub(crate) fn get(&self, key: RelKey) -> Option<&FxHashSet<Tuple>> {
        self.map.get(&key)
    }

    pub(crate) fn contains(&self, key: RelKey, tuple: &[Ground]) -> bool {
        self.map.get(&key).is_some_and(|set| set.contains(tuple))
    }

    #[cfg(test)]
    pub(crate) fn len_of(&self, key: RelKey) -> usize {
        self.map.get(&key).map_or(0, FxHashSet::len)
    }

    fn iter_sizes(&self) -> impl Iterator<Item = (RelKey, usize)> + '_ {
        self.map.iter().map(|(k, v)| (*k, v.len()))
    }
}

/// Every tuple of `key` across the layers.
pub(crate) fn tuples<'a>(layers: &[&'a Facts], key: RelKey) -> impl Iterator<Item = &'a Tuple> + 'a {
    let sets: SmallVec<[&'a FxHashSet<Tuple>; 4]> =
        layers.iter().filter_map(|facts| facts.get(key)).collect();
    sets.into_iter().flatten()
}

/// Rule indices grouped by ascending stratum.
pub(crate) type Strata = Vec<Vec<usize>>;

/// Evaluation plan derived from a program.
#[derive(Clone, Debug, Default)]
pub(crate) struct Plan {
    pub static_rules: Strata,
    pub state_rules: Strata,
    pub move_rules: Strata,
    /// Relations whose value depends on `does`.
    pub move_dependent: FxHashSet<RelKey>,
}

impl Plan {
    pub(crate) fn new(program: &Program) -> Result<Self> {
        let strata = stratify(&program.rules)?;
        let on_true = dependents(&program.rules, program.keywords.true_);
        let on_does = dependents(&program.rules, program.keywords.does);

        let mut plan = Plan {
            move_dependent: on_does.clone(),
            ..Plan::default()
        };
        let height = strata.values().copied().max().unwrap_or(0) as usize + 1;
        plan.static_rules = vec![Vec::new(); height];
        plan.state_rules = vec![Vec::new(); height];
        plan.move_rules = vec![Vec::new(); height];

        for (i, rule) in program.rules.iter().enumerate() {
            let level = strata.get(&rule.head.key).copied().unwrap_or(0) as usize;
            let group = if on_does.contains(&rule.head.key) {
                &mut plan.move_rules
            } else if on_true.contains(&rule.head.key) {
                &mut plan.state_rules
            } else {
                &mut plan.static_rules
            };
            group[level].push(i);
        }
        for strata in [&mut plan.static_rules, &mut plan.state_rules, &mut plan.move_rules] {
            strata.retain(|s| !s.is_empty());
        }
        trace!(
            strata = height,
            static_rules = plan.static_rules.iter().map(Vec::len).sum::<usize>(),
            state_rules = plan.state_rules.iter().map(Vec::len).sum::<usize>(),
            move_rules = plan.move_rules.iter().map(Vec::len).sum::<usize>(),
            "evaluation plan"
        );
        Ok(plan)
    }
}

/// Assign each defined relation a stratum so that positive dependencies
/// stay at or below and negative dependencies strictly below.
fn stratify(rules: &[Rule]) -> Result<FxHashMap<RelKey, u32>> {
    let mut strata: FxHashMap<RelKey, u32> = FxHashMap::default();
    let mut relations: FxHashSet<RelKey> = FxHashSet::default();
    for rule in rules {
        relations.insert(rule.head.key);
        relations.extend(rule.body.iter().filter_map(|l| l.atom()).map(|a| a.key));
    }
    let limit = relations.len() as u32;

    let mut pass = 0;
    loop {
        let mut changed = false;
        for rule in rules {
            for lit in &rule.body {
                let (key, offset) = match lit {
                    Literal::Pos(atom) => (atom.key, 0),
                    Literal::Neg(atom) => (atom.key, 1),
                    Literal::Distinct { .. } => continue,
                };
                let needed = strata.get(&key).copied().unwrap_or(0) + offset;
                let current = strata.entry(rule.head.key).or_insert(0);
                if *current < needed {
                    if needed > limit {
                        return Err(GdlError::InvalidRules(format!(
                            "negation through recursion in {rule}"
                        )));
                    }
                    *current = needed;
                    changed = true;
                }
            }
        }
        pass += 1;
        trace!(pass, "stratification pass");
        if !changed {
            return Ok(strata);
        }
    }
}

/// Relations that depend, directly or transitively, on `root`.
fn dependents(rules: &[Rule], root: RelKey) -> FxHashSet<RelKey> {
    let mut found: FxHashSet<RelKey> = FxHashSet::default();
    found.insert(root);
    loop {
        let mut changed = false;
        for rule in rules {
            if found.contains(&rule.head.key) {
                continue;
            }
            let hit = rule
                .body
                .iter()
                .filter_map(Literal::atom)
                .any(|a| found.contains(&a.key));
            if hit {
                found.insert(rule.head.key);
                changed = true;
            }
        }
        if !changed {
            return found;
        }
    }
}

/// Runs rules to a fixpoint on top of complete lower layers.
pub(crate) struct Evaluator<'p> {
    rules: &'p [Rule],
    /// Skip negative literals (over-approximation).
    relaxed: bool,
    /// Fail once a relation in the top layer exceeds this many tuples.
    limit: Option<usize>,
}

impl<'p> Evaluator<'p> {
    pub(crate) fn new(rules: &'p [Rule]) -> Self {
        Self {
            rules,
            relaxed: false,
            limit: None,
        }
    }

    pub(crate) fn relaxed(mut self, limit: usize) -> Self {
        self.relaxed = true;
        self.limit = Some(limit);
        self
    }

    /// Evaluate `strata` in order, adding derived facts to `top`.
    pub(crate) fn run(&self, strata: &Strata, lower: &[&Facts], top: &mut Facts) -> Result<()> {
        let mut derived = Vec::new();
        for stratum in strata {
            let mut iteration = 0u32;
            loop {
                derived.clear();
                for &index in stratum {
                    self.fire(&self.rules[index], lower, top, &mut derived);
                }
                let mut changed = false;
                for (key, tuple) in derived.drain(..) {
                    if lower.iter().any(|f| f.contains(key, &tuple)) {
                        continue;
                    }
                    changed |= top.insert(key, tuple);
                }
                iteration += 1;
                if let Some(limit) = self.limit {
                    if let Some((key, size)) = top.iter_sizes().find(|(_, n)| *n > limit) {
                        return Err(GdlError::EngineFailure(format!(
                            "relation of arity {} grew to {size} ground tuples (limit {limit})",
                            key.arity
                        )));
                    }
                }
                if !changed {
                    break;
                }
            }
            trace!(rules = stratum.len(), iterations = iteration, "stratum fixpoint");
        }
        Ok(())
    }

    fn fire(&self, rule: &Rule, lower: &[&Facts], top: &Facts, out: &mut Vec<(RelKey, Tuple)>) {
        let mut bindings: Vec<Option<Ground>> = vec![None; rule.num_vars];
        let mut layers: SmallVec<[&Facts; 4]> = lower.iter().copied().collect();
        layers.push(top);
        self.search(rule, 0, &mut bindings, &layers, out);
    }

    fn search(
        &self,
        rule: &Rule,
        position: usize,
        bindings: &mut [Option<Ground>],
        layers: &[&Facts],
        out: &mut Vec<(RelKey, Tuple)>,
    ) {
        let Some(literal) = rule.body.get(position) else {
            if let Some(tuple) = instantiate_all(&rule.head.args, bindings) {
                out.push((rule.head.key, tuple));
            }
            return;
        };

        match literal {
            Literal::Pos(atom) => {
                let mut trail: SmallVec<[VarId; 8]> = SmallVec::new();
                for tuple in tuples(layers, atom.key) {
                    let matched = atom
                        .args
                        .iter()
                        .zip(tuple.iter())
                        .all(|(pattern, value)| unify(pattern, value, bindings, &mut trail));
                    if matched {
                        self.search(rule, position + 1, bindings, layers, out);
                    }
                    for var in trail.drain(..) {
                        bindings[var as usize] = None;
                    }
                }
            }
            Literal::Neg(atom) => {
                if self.relaxed {
                    self.search(rule, position + 1, bindings, layers, out);
                    return;
                }
                let Some(tuple) = instantiate_all(&atom.args, bindings) else {
                    return;
                };
                if !layers.iter().any(|f| f.contains(atom.key, &tuple)) {
                    self.search(rule, position + 1, bindings, layers, out);
                }
            }
            Literal::Distinct {
                left,
                right,
                negated,
            } => {
                let (Some(l), Some(r)) = (instantiate(left, bindings), instantiate(right, bindings))
                else {
                    return;
                };
                if (l != r) != *negated {
                    self.search(rule, position + 1, bindings, layers, out);
                }
            }
        }
    }
}

/// Match `pattern` against `value`, recording new bindings on `trail`.
fn unify(
    pattern: &Expr,
    value: &Ground,
    bindings: &mut [Option<Ground>],
    trail: &mut SmallVec<[VarId; 8]>,
) -> bool {
    match (pattern, value) {
        (Expr::Var(var), _) => match &bindings[*var as usize] {
            Some(bound) => bound == value,
            None => {
                bindings[*var as usize] = Some(value.clone());
                trail.push(*var);
                true
            }
        },
        (Expr::Const(c), Ground::Sym(s)) => c == s,
        (Expr::Fn(f, args), Ground::App(g, values)) => {
            f == g
                && args.len() == values.len()
                && args
                    .iter()
                    .zip(values.iter())
                    .all(|(p, v)| unify(p, v, bindings, trail))
        }
        _ => false,
    }
}

fn instantiate(expr: &Expr, bindings: &[Option<Ground>]) -> Option<Ground> {
    match expr {
        Expr::Var(var) => bindings[*var as usize].clone(),
        Expr::Const(c) => Some(Ground::Sym(*c)),
        Expr::Fn(f, args) => {
            let args = args
                .iter()
                .map(|a| instantiate(a, bindings))
                .collect::<Option<Vec<_>>>()?;
            Some(Ground::App(*f, args.into()))
        }
    }
}

fn instantiate_all(args: &[Expr], bindings: &[Option<Ground>]) -> Option<Tuple> {
    args.iter()
        .map(|a| instantiate(a, bindings))
        .collect::<Option<Vec<_>>>()
        .map(Vec::into_boxed_slice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gdl::rules::ProgramBuilder;
    use crate::term::parse_sexprs;

    fn program(text: &str) -> Program {
        ProgramBuilder::new(true)
            .build(&parse_sexprs(text).unwrap())
            .unwrap()
    }

    fn static_model(program: &Program) -> Facts {
        let plan = Plan::new(program).unwrap();
        let mut facts = Facts::default();
        Evaluator::new(&program.rules)
            .run(&plan.static_rules, &[], &mut facts)
            .unwrap();
        facts
    }

    fn key(program: &Program, name: &str, arity: u32) -> RelKey {
        RelKey {
            name: program.symbols.get(name).unwrap(),
            arity,
        }
    }

    #[test]
    fn test_transitive_closure() {
        let p = program(
            "(role r) (edge a b) (edge b c) (edge c d)
             (<= (path ?x ?y) (edge ?x ?y))
             (<= (path ?x ?z) (edge ?x ?y) (path ?y ?z))",
        );
        let facts = static_model(&p);
        assert_eq!(facts.len_of(key(&p, "path", 2)), 6);
    }

    #[test]
    fn test_stratified_negation() {
        let p = program(
            "(role r) (num 1) (num 2) (num 3) (even 2)
             (<= (odd ?x) (num ?x) (not (even ?x)))",
        );
        let facts = static_model(&p);
        assert_eq!(facts.len_of(key(&p, "odd", 1)), 2);
    }

    #[test]
    fn test_distinct_and_function_terms() {
        let p = program(
            "(role r) (num 1) (num 2)
             (<= (pair (p ?x ?y)) (num ?x) (num ?y) (distinct ?x ?y))",
        );
        let facts = static_model(&p);
        assert_eq!(facts.len_of(key(&p, "pair", 1)), 2);
    }

    #[test]
    fn test_negation_through_recursion_rejected() {
        let p = program("(role r) (q a) (<= (p ?x) (q ?x) (not (p ?x)))");
        assert!(matches!(Plan::new(&p), Err(GdlError::InvalidRules(_))));
    }

    #[test]
    fn test_rule_classification() {
        let p = program(
            "(role r) (succ 1 2)
             (<= (open) (true (cell b)))
             (<= (next (cell x)) (does r go))
             (<= (legal r go) (open))",
        );
        let plan = Plan::new(&p).unwrap();
        let count = |s: &Strata| s.iter().map(Vec::len).sum::<usize>();
        // role + succ
        assert_eq!(count(&plan.static_rules), 2);
        // open + legal
        assert_eq!(count(&plan.state_rules), 2);
        assert_eq!(count(&plan.move_rules), 1);
        assert!(plan.move_dependent.contains(&key(&p, "next", 1)));
    }

    #[test]
    fn test_relaxed_limit() {
        let p = program("(role r) (n 0) (<= (n (s ?x)) (n ?x))");
        let all: Strata = vec![(0..p.rules.len()).collect()];
        let mut facts = Facts::default();
        let result = Evaluator::new(&p.rules).relaxed(10).run(&all, &[], &mut facts);
        assert!(matches!(result, Err(GdlError::EngineFailure(_))));
    }
}
