//! GDL program representation and loading.
//!
//! Sentences are converted into Datalog-style rules over interned symbols:
//! - `or`/`and` in rule bodies are expanded into disjunctive normal form
//! - a `not` over a conjunction or disjunction is lifted into an auxiliary
//!   relation and negated as a whole
//! - each body is scheduled so that negations and `distinct` only run once
//!   their variables are bound; rules where that is impossible are unsafe

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use crate::error::{GdlError, Result};
use crate::term::Term;

/// Interned symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Sym(u32);

/// Symbol interner. Complete once the program is loaded.
#[derive(Clone, Debug, Default)]
pub(crate) struct Symbols {
    names: Vec<Arc<str>>,
    index: FxHashMap<Arc<str>, Sym>,
}

impl Symbols {
    pub(crate) fn intern(&mut self, name: &str) -> Sym {
        if let Some(&sym) = self.index.get(name) {
            return sym;
        }
        let sym = Sym(self.names.len() as u32);
        let name: Arc<str> = Arc::from(name);
        self.names.push(Arc::clone(&name));
        self.index.insert(name, sym);
        sym
    }

    #[cfg(test)]
    pub(crate) fn get(&self, name: &str) -> Option<Sym> {
        self.index.get(name).copied()
    }

    pub(crate) fn name(&self, sym: Sym) -> &str {
        &self.names[sym.0 as usize]
    }

    /// Render a ground term as canonical S-expression text.
    pub(crate) fn render(&self, ground: &Ground) -> String {
        let mut out = String::new();
        self.render_into(ground, &mut out);
        out
    }

    fn render_into(&self, ground: &Ground, out: &mut String) {
        match ground {
            Ground::Sym(sym) => out.push_str(self.name(*sym)),
            Ground::App(head, args) => {
                out.push('(');
                out.push_str(self.name(*head));
                for arg in args.iter() {
                    out.push(' ');
                    self.render_into(arg, out);
                }
                out.push(')');
            }
        }
    }
}

/// A variable-free term.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum Ground {
    Sym(Sym),
    App(Sym, Arc<[Ground]>),
}

impl Ground {
    /// Relation name and arity when this term is used as a fact.
    pub(crate) fn signature(&self) -> (Sym, usize) {
        match self {
            Ground::Sym(sym) => (*sym, 0),
            Ground::App(head, args) => (*head, args.len()),
        }
    }
}

/// Relation identity: name and arity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct RelKey {
    pub name: Sym,
    pub arity: u32,
}

/// Rule-local variable index.
pub(crate) type VarId = u16;

/// A possibly non-ground argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Expr {
    Var(VarId),
    Const(Sym),
    Fn(Sym, Box<[Expr]>),
}

impl Expr {
    fn collect_vars(&self, out: &mut SmallVec<[VarId; 8]>) {
        match self {
            Expr::Var(v) => {
                if !out.contains(v) {
                    out.push(*v);
                }
            }
            Expr::Const(_) => {}
            Expr::Fn(_, args) => args.iter().for_each(|a| a.collect_vars(out)),
        }
    }
}

/// A relation applied to arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Atom {
    pub key: RelKey,
    pub args: Box<[Expr]>,
}

impl Atom {
    fn vars(&self) -> SmallVec<[VarId; 8]> {
        let mut out = SmallVec::new();
        self.args.iter().for_each(|a| a.collect_vars(&mut out));
        out
    }
}

/// A body literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Literal {
    Pos(Atom),
    Neg(Atom),
    /// `(distinct a b)`, or `(not (distinct a b))` when `negated`.
    Distinct {
        left: Expr,
        right: Expr,
        negated: bool,
    },
}

impl Literal {
    fn vars(&self) -> SmallVec<[VarId; 8]> {
        match self {
            Literal::Pos(atom) | Literal::Neg(atom) => atom.vars(),
            Literal::Distinct { left, right, .. } => {
                let mut out = SmallVec::new();
                left.collect_vars(&mut out);
                right.collect_vars(&mut out);
                out
            }
        }
    }

    pub(crate) fn atom(&self) -> Option<&Atom> {
        match self {
            Literal::Pos(atom) | Literal::Neg(atom) => Some(atom),
            Literal::Distinct { .. } => None,
        }
    }
}

/// A Horn clause with stratified negation. Facts have an empty body.
#[derive(Clone, Debug)]
pub(crate) struct Rule {
    pub head: Atom,
    pub body: Vec<Literal>,
    pub num_vars: usize,
    /// Source text, for diagnostics.
    pub source: Arc<str>,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Relations the engine gives meaning to.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Keywords {
    pub init: RelKey,
    pub true_: RelKey,
    pub next: RelKey,
    pub legal: RelKey,
    pub does: RelKey,
    pub goal: RelKey,
    pub terminal: RelKey,
}

impl Keywords {
    fn intern(symbols: &mut Symbols) -> Self {
        let mut key = |name: &str, arity: u32| RelKey {
            name: symbols.intern(name),
            arity,
        };
        Self {
            init: key("init", 1),
            true_: key("true", 1),
            next: key("next", 1),
            legal: key("legal", 2),
            does: key("does", 2),
            goal: key("goal", 2),
            terminal: key("terminal", 0),
        }
    }
}

/// A loaded GDL program.
#[derive(Clone, Debug)]
pub(crate) struct Program {
    pub symbols: Symbols,
    pub keywords: Keywords,
    pub rules: Vec<Rule>,
    /// Role names in source order.
    pub roles: Vec<Sym>,
}

/// Boolean structure of a rule body before normalisation.
enum Formula {
    Lit(Literal),
    And(Vec<Formula>),
    Or(Vec<Formula>),
}

/// Expand a formula into a disjunction of conjunctions.
fn dnf(formula: Formula) -> Vec<Vec<Literal>> {
    match formula {
        Formula::Lit(lit) => vec![vec![lit]],
        Formula::Or(parts) => parts.into_iter().flat_map(dnf).collect(),
        Formula::And(parts) => {
            let mut acc: Vec<Vec<Literal>> = vec![Vec::new()];
            for part in parts {
                let alternatives = dnf(part);
                let mut next = Vec::with_capacity(acc.len() * alternatives.len());
                for prefix in &acc {
                    for alt in &alternatives {
                        let mut conj = prefix.clone();
                        conj.extend(alt.iter().cloned());
                        next.push(conj);
                    }
                }
                acc = next;
            }
            acc
        }
    }
}

fn is_var(label: &str) -> bool {
    label.starts_with('?')
}

fn term_vars<'t>(term: &'t Term, out: &mut Vec<&'t str>) {
    match term {
        Term::Atom(label) if is_var(label) => {
            if !out.contains(&label.as_str()) {
                out.push(label);
            }
        }
        Term::Atom(_) => {}
        Term::Compound(children) => children.iter().for_each(|c| term_vars(c, out)),
    }
}

fn invalid(message: impl fmt::Display, sentence: &Term) -> GdlError {
    GdlError::InvalidRules(format!("{message} in {sentence}"))
}

/// Builds a [`Program`] sentence by sentence.
pub(crate) struct ProgramBuilder {
    symbols: Symbols,
    keywords: Keywords,
    rules: Vec<Rule>,
    roles: Vec<Sym>,
    order_rules: bool,
    aux_count: usize,
}

impl ProgramBuilder {
    pub(crate) fn new(order_rules: bool) -> Self {
        let mut symbols = Symbols::default();
        let keywords = Keywords::intern(&mut symbols);
        Self {
            symbols,
            keywords,
            rules: Vec::new(),
            roles: Vec::new(),
            order_rules,
            aux_count: 0,
        }
    }

    /// Load keyword-normalised sentences.
    pub(crate) fn build(mut self, sentences: &[Term]) -> Result<Program> {
        for sentence in sentences {
            self.add_sentence(sentence)?;
        }
        if self.roles.is_empty() {
            return Err(GdlError::InvalidRules("the rules define no roles".into()));
        }
        Ok(Program {
            symbols: self.symbols,
            keywords: self.keywords,
            rules: self.rules,
            roles: self.roles,
        })
    }

    fn add_sentence(&mut self, sentence: &Term) -> Result<()> {
        if sentence.head() == Some("<=") {
            let children = sentence.children();
            let Some(head) = children.get(1) else {
                return Err(invalid("rule without a head", sentence));
            };
            return self.add_rule(sentence, head, &children[2..]);
        }

        if sentence.head() == Some("role") && sentence.arity() == 1 {
            if let Some(name) = sentence.args()[0].as_atom().filter(|n| !is_var(n)) {
                let sym = self.symbols.intern(name);
                if self.roles.contains(&sym) {
                    return Err(invalid(format!("duplicate role {name}"), sentence));
                }
                self.roles.push(sym);
            }
        }
        self.add_rule(sentence, sentence, &[])
    }

    fn add_rule(&mut self, sentence: &Term, head: &Term, body: &[Term]) -> Result<()> {
        // Variables visible outside each top-level body literal.
        let mut lifted = Vec::with_capacity(body.len());
        for (i, literal) in body.iter().enumerate() {
            let mut outer = Vec::new();
            term_vars(head, &mut outer);
            for (j, other) in body.iter().enumerate() {
                if i != j {
                    term_vars(other, &mut outer);
                }
            }
            lifted.push(self.lift_negations(literal, &outer, sentence)?);
        }

        let mut vars: FxHashMap<String, VarId> = FxHashMap::default();
        let head_atom = self.atom(head, &mut vars, sentence)?;
        let formula = Formula::And(
            lifted
                .iter()
                .map(|t| self.formula(t, &mut vars, sentence))
                .collect::<Result<_>>()?,
        );
        let source: Arc<str> = Arc::from(sentence.to_string());

        for body in dnf(formula) {
            let body = self.schedule(&head_atom, body, sentence)?;
            self.rules.push(Rule {
                head: head_atom.clone(),
                body,
                num_vars: vars.len(),
                source: Arc::clone(&source),
            });
        }
        Ok(())
    }

    /// Replace `(not <and/or>)` by `(not (aux vars...))` plus an auxiliary
    /// rule, recursing through `and`/`or`.
    fn lift_negations(&mut self, term: &Term, outer: &[&str], sentence: &Term) -> Result<Term> {
        match term.head() {
            Some("and" | "or") if !term.is_atom() => {
                let mut children = vec![term.children()[0].clone()];
                for arg in term.args() {
                    children.push(self.lift_negations(arg, outer, sentence)?);
                }
                Ok(Term::Compound(children))
            }
            Some("not") if term.arity() == 1 => {
                let inner = &term.args()[0];
                if !matches!(inner.head(), Some("and" | "or")) || inner.is_atom() {
                    return Ok(term.clone());
                }
                let mut inner_vars = Vec::new();
                term_vars(inner, &mut inner_vars);
                let shared: Vec<Term> = inner_vars
                    .into_iter()
                    .filter(|v| outer.contains(v))
                    .map(Term::atom)
                    .collect();
                self.aux_count += 1;
                let aux_head = Term::relation(format!("__not_{}", self.aux_count), shared);
                let aux_rule = Term::compound(vec![
                    Term::atom("<="),
                    aux_head.clone(),
                    inner.clone(),
                ]);
                self.add_rule(&aux_rule, &aux_head, std::slice::from_ref(inner))
                    .map_err(|e| match e {
                        GdlError::InvalidRules(msg) => {
                            GdlError::InvalidRules(format!("{msg} (lifted from {sentence})"))
                        }
                        other => other,
                    })?;
                Ok(Term::relation("not", [aux_head]))
            }
            _ => Ok(term.clone()),
        }
    }

    fn formula(
        &mut self,
        term: &Term,
        vars: &mut FxHashMap<String, VarId>,
        sentence: &Term,
    ) -> Result<Formula> {
        match (term.head(), term.arity(), term.is_atom()) {
            (Some("and"), n, false) if n >= 1 => Ok(Formula::And(
                term.args()
                    .iter()
                    .map(|t| self.formula(t, vars, sentence))
                    .collect::<Result<_>>()?,
            )),
            (Some("or"), n, false) if n >= 1 => Ok(Formula::Or(
                term.args()
                    .iter()
                    .map(|t| self.formula(t, vars, sentence))
                    .collect::<Result<_>>()?,
            )),
            (Some("distinct"), 2, false) => Ok(Formula::Lit(Literal::Distinct {
                left: self.expr(&term.args()[0], vars, sentence)?,
                right: self.expr(&term.args()[1], vars, sentence)?,
                negated: false,
            })),
            (Some("not"), 1, false) => match self.formula(&term.args()[0], vars, sentence)? {
                Formula::Lit(Literal::Pos(atom)) => Ok(Formula::Lit(Literal::Neg(atom))),
                Formula::Lit(Literal::Neg(atom)) => Ok(Formula::Lit(Literal::Pos(atom))),
                Formula::Lit(Literal::Distinct {
                    left,
                    right,
                    negated,
                }) => Ok(Formula::Lit(Literal::Distinct {
                    left,
                    right,
                    negated: !negated,
                })),
                Formula::And(_) | Formula::Or(_) => {
                    Err(invalid("unsupported negated connective", sentence))
                }
            },
            (Some("<="), _, _) => Err(invalid("nested rule", sentence)),
            _ => Ok(Formula::Lit(Literal::Pos(self.atom(term, vars, sentence)?))),
        }
    }

    fn atom(
        &mut self,
        term: &Term,
        vars: &mut FxHashMap<String, VarId>,
        sentence: &Term,
    ) -> Result<Atom> {
        let Some(name) = term.head() else {
            return Err(invalid("relation without an atomic name", sentence));
        };
        if is_var(name) {
            return Err(invalid(format!("variable {name} used as a relation"), sentence));
        }
        let key = RelKey {
            name: self.symbols.intern(name),
            arity: term.arity() as u32,
        };
        let args = term
            .args()
            .iter()
            .map(|a| self.expr(a, vars, sentence))
            .collect::<Result<Vec<_>>>()?;
        Ok(Atom {
            key,
            args: args.into_boxed_slice(),
        })
    }

    fn expr(
        &mut self,
        term: &Term,
        vars: &mut FxHashMap<String, VarId>,
        sentence: &Term,
    ) -> Result<Expr> {
        match term {
            Term::Atom(label) if is_var(label) => {
                let next = vars.len() as VarId;
                Ok(Expr::Var(*vars.entry(label.clone()).or_insert(next)))
            }
            Term::Atom(label) => Ok(Expr::Const(self.symbols.intern(label))),
            Term::Compound(children) => {
                let Some((head, args)) = children.split_first() else {
                    return Err(invalid("empty term", sentence));
                };
                let Some(name) = head.as_atom().filter(|n| !is_var(n)) else {
                    return Err(invalid("function without an atomic name", sentence));
                };
                let name = self.symbols.intern(name);
                if args.is_empty() {
                    return Ok(Expr::Const(name));
                }
                let args = args
                    .iter()
                    .map(|a| self.expr(a, vars, sentence))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Expr::Fn(name, args.into_boxed_slice()))
            }
        }
    }

    /// Order a conjunction for left-to-right evaluation and check safety.
    fn schedule(&self, head: &Atom, body: Vec<Literal>, sentence: &Term) -> Result<Vec<Literal>> {
        let mut bound: FxHashSet<VarId> = FxHashSet::default();
        let mut positives: Vec<Literal> = Vec::new();
        let mut filters: Vec<Literal> = Vec::new();
        for lit in body {
            match lit {
                Literal::Pos(_) => positives.push(lit),
                _ => filters.push(lit),
            }
        }

        let mut ordered = Vec::with_capacity(positives.len() + filters.len());
        let flush = |bound: &FxHashSet<VarId>, filters: &mut Vec<Literal>, out: &mut Vec<Literal>| {
            let mut i = 0;
            while i < filters.len() {
                if filters[i].vars().iter().all(|v| bound.contains(v)) {
                    out.push(filters.remove(i));
                } else {
                    i += 1;
                }
            }
        };

        flush(&bound, &mut filters, &mut ordered);
        while !positives.is_empty() {
            let pick = if self.order_rules {
                // Fewest unbound variables first; earliest on ties.
                positives
                    .iter()
                    .enumerate()
                    .min_by_key(|(i, lit)| {
                        let unbound = lit.vars().iter().filter(|v| !bound.contains(v)).count();
                        (unbound, *i)
                    })
                    .map_or(0, |(i, _)| i)
            } else {
                0
            };
            let lit = positives.remove(pick);
            bound.extend(lit.vars());
            ordered.push(lit);
            flush(&bound, &mut filters, &mut ordered);
        }

        if let Some(lit) = filters.first() {
            let unbound: Vec<VarId> = lit.vars().into_iter().filter(|v| !bound.contains(v)).collect();
            return Err(invalid(
                format!("unsafe rule: {} variable(s) only occur in negations or distinct", unbound.len()),
                sentence,
            ));
        }
        if head.vars().iter().any(|v| !bound.contains(v)) {
            return Err(invalid("unsafe rule: head variable not bound by the body", sentence));
        }
        Ok(ordered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::parse_sexprs;

    fn load(text: &str) -> Result<Program> {
        ProgramBuilder::new(true).build(&parse_sexprs(text)?)
    }

    #[test]
    fn test_roles_in_source_order() {
        let program = load("(role white) (role black) (init (cell a))").unwrap();
        let names: Vec<_> = program.roles.iter().map(|r| program.symbols.name(*r)).collect();
        assert_eq!(names, vec!["white", "black"]);
        assert_eq!(program.rules.len(), 3);
    }

    #[test]
    fn test_no_roles_rejected() {
        assert!(matches!(load("(init a)"), Err(GdlError::InvalidRules(_))));
    }

    #[test]
    fn test_duplicate_role_rejected() {
        assert!(matches!(load("(role a) (role a)"), Err(GdlError::InvalidRules(_))));
    }

    #[test]
    fn test_disjunction_expands() {
        let program = load("(role r) (<= (p ?x) (q ?x) (or (s ?x) (t ?x)))").unwrap();
        let p = program.symbols.get("p").unwrap();
        assert_eq!(program.rules.iter().filter(|r| r.head.key.name == p).count(), 2);
    }

    #[test]
    fn test_negation_scheduled_after_binding() {
        let program = load("(role r) (<= (p ?x) (not (s ?x)) (q ?x))").unwrap();
        let rule = program.rules.last().unwrap();
        assert!(matches!(rule.body[0], Literal::Pos(_)));
        assert!(matches!(rule.body[1], Literal::Neg(_)));
    }

    #[test]
    fn test_unsafe_rules_rejected() {
        assert!(load("(role r) (<= (p ?x) (not (q ?x)))").is_err());
        assert!(load("(role r) (<= (p ?y) (q ?x))").is_err());
        assert!(load("(role r) (<= (p ?x) (q ?x) (distinct ?x ?z))").is_err());
        assert!(load("(role r) (p ?x)").is_err());
    }

    #[test]
    fn test_negated_conjunction_lifted() {
        let program = load("(role r) (<= (p ?x) (q ?x) (not (and (s ?x ?y) (t ?y))))").unwrap();
        assert!(program
            .rules
            .iter()
            .any(|r| program.symbols.name(r.head.key.name).starts_with("__not_")));
        let p = program.symbols.get("p").unwrap();
        let rule = program.rules.iter().find(|r| r.head.key.name == p).unwrap();
        let aux = rule.body[1].atom().unwrap();
        // ?y is local to the negation and does not become an argument.
        assert_eq!(aux.key.arity, 1);
    }

    #[test]
    fn test_render_ground() {
        let mut symbols = Symbols::default();
        let cell = symbols.intern("cell");
        let one = symbols.intern("1");
        let b = symbols.intern("b");
        let g = Ground::App(cell, Arc::from(vec![Ground::Sym(one), Ground::Sym(b)]));
        assert_eq!(symbols.render(&g), "(cell 1 b)");
        assert_eq!(g.signature(), (cell, 2));
    }
}
