//! Fluent and move domain of a program.
//!
//! The domain is a finite over-approximation of every fluent that can ever
//! be true and every move that can ever be legal, found by evaluating the
//! rules with negation dropped and feeding `init`/`next` back into `true`
//! and `legal` into `does` until nothing new appears.
//!
//! Identities are assigned from rule text alone: relations are sorted by
//! name and arity, tuples within a relation by canonical text. Compiling
//! byte-identical rules therefore always yields the same [`FactId`]s.

use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::trace;

use super::eval::{tuples, Evaluator, Facts};
use super::rules::{Atom, Expr, Ground, Literal, Program, Rule};
use crate::engine::FactId;
use crate::error::{GdlError, Result};

/// One ground instance in the domain.
#[derive(Clone, Debug)]
pub(crate) struct Entry {
    /// Fluent term, or the move term for the `does` relation.
    pub ground: Ground,
    /// Canonical text of `ground`.
    pub text: Arc<str>,
    /// Mover, for the `does` relation.
    pub role: Option<usize>,
}

#[derive(Clone, Debug)]
pub(crate) struct Relation {
    pub name: Arc<str>,
    pub arity: usize,
    pub is_move: bool,
    pub entries: Vec<Entry>,
}

/// Relation table plus lookup indices.
#[derive(Clone, Debug)]
pub(crate) struct Domain {
    pub relations: Vec<Relation>,
    fluents: FxHashMap<Ground, FactId>,
    /// Per role: move term to identity.
    moves: Vec<FxHashMap<Ground, FactId>>,
    /// Per role: canonical move text to identity.
    moves_by_text: Vec<FxHashMap<Arc<str>, FactId>>,
}

/// Rules that close the relaxed program over time and moves.
fn bridge_rules(program: &Program) -> Vec<Rule> {
    let k = program.keywords;
    let copy = |head, body, arity: u16, source: &str| Rule {
        head: Atom {
            key: head,
            args: (0..arity).map(Expr::Var).collect(),
        },
        body: vec![Literal::Pos(Atom {
            key: body,
            args: (0..arity).map(Expr::Var).collect(),
        })],
        num_vars: arity as usize,
        source: Arc::from(source),
    };
    vec![
        copy(k.true_, k.init, 1, "(<= (true ?x) (init ?x))"),
        copy(k.true_, k.next, 1, "(<= (true ?x) (next ?x))"),
        copy(k.does, k.legal, 2, "(<= (does ?r ?m) (legal ?r ?m))"),
    ]
}

impl Domain {
    pub(crate) fn build(program: &Program, max_relation_size: usize) -> Result<Self> {
        let mut rules = program.rules.clone();
        rules.extend(bridge_rules(program));
        let all = vec![(0..rules.len()).collect()];
        let mut relaxed = Facts::default();
        Evaluator::new(&rules)
            .relaxed(max_relation_size)
            .run(&all, &[], &mut relaxed)?;

        let symbols = &program.symbols;
        let role_of = |g: &Ground| match g {
            Ground::Sym(sym) => program.roles.iter().position(|r| r == sym),
            Ground::App(..) => None,
        };

        // (name, arity, is_move) -> entries
        let mut grouped: FxHashMap<(Arc<str>, usize, bool), Vec<Entry>> = FxHashMap::default();
        for tuple in tuples(&[&relaxed], program.keywords.true_) {
            let ground = tuple[0].clone();
            let (name, arity) = ground.signature();
            grouped
                .entry((Arc::from(symbols.name(name)), arity, false))
                .or_default()
                .push(Entry {
                    text: Arc::from(symbols.render(&ground)),
                    ground,
                    role: None,
                });
        }
        let mut move_count = 0;
        for tuple in tuples(&[&relaxed], program.keywords.legal) {
            let Some(role) = role_of(&tuple[0]) else {
                continue;
            };
            move_count += 1;
            grouped
                .entry((Arc::from("does"), 2, true))
                .or_default()
                .push(Entry {
                    text: Arc::from(symbols.render(&tuple[1])),
                    ground: tuple[1].clone(),
                    role: Some(role),
                });
        }
        if move_count == 0 {
            return Err(GdlError::InvalidRules("the rules define no legal moves".into()));
        }

        let mut relations: Vec<Relation> = grouped
            .into_iter()
            .map(|((name, arity, is_move), mut entries)| {
                if is_move {
                    entries.sort_by(|a, b| {
                        let role = |e: &Entry| e.role.map_or("", |r| symbols.name(program.roles[r]));
                        (role(a), &a.text).cmp(&(role(b), &b.text))
                    });
                } else {
                    entries.sort_by(|a, b| a.text.cmp(&b.text));
                }
                Relation {
                    name,
                    arity,
                    is_move,
                    entries,
                }
            })
            .collect();
        relations.sort_by(|a, b| (&a.name, a.arity, a.is_move).cmp(&(&b.name, b.arity, b.is_move)));

        let mut domain = Domain {
            relations,
            fluents: FxHashMap::default(),
            moves: vec![FxHashMap::default(); program.roles.len()],
            moves_by_text: vec![FxHashMap::default(); program.roles.len()],
        };
        for (r, relation) in domain.relations.iter().enumerate() {
            for (t, entry) in relation.entries.iter().enumerate() {
                let id = FactId::new(r as u32, t as u32);
                match entry.role {
                    Some(role) => {
                        domain.moves[role].insert(entry.ground.clone(), id);
                        domain.moves_by_text[role].insert(Arc::clone(&entry.text), id);
                    }
                    None => {
                        domain.fluents.insert(entry.ground.clone(), id);
                    }
                }
            }
            trace!(
                relation = %relation.name,
                arity = relation.arity,
                tuples = relation.entries.len(),
                "domain relation"
            );
        }
        Ok(domain)
    }

    pub(crate) fn entry(&self, id: FactId) -> Option<&Entry> {
        self.relations
            .get(id.relation as usize)
            .and_then(|r| r.entries.get(id.tuple as usize))
    }

    pub(crate) fn fluent_id(&self, ground: &Ground) -> Option<FactId> {
        self.fluents.get(ground).copied()
    }

    /// Fluent entry for `id`; `None` for unknown ids and move ids.
    pub(crate) fn fluent(&self, id: FactId) -> Option<&Entry> {
        self.entry(id).filter(|e| e.role.is_none())
    }

    /// Move entry for `id`; `None` for unknown ids and fluent ids.
    pub(crate) fn move_entry(&self, id: FactId) -> Option<&Entry> {
        self.entry(id).filter(|e| e.role.is_some())
    }

    pub(crate) fn move_id(&self, role: usize, ground: &Ground) -> Option<FactId> {
        self.moves.get(role)?.get(ground).copied()
    }

    pub(crate) fn move_by_text(&self, role: usize, text: &str) -> Option<FactId> {
        self.moves_by_text.get(role)?.get(text).copied()
    }

    pub(crate) fn num_fluents(&self) -> usize {
        self.fluents.len()
    }

    pub(crate) fn num_moves(&self) -> usize {
        self.moves.iter().map(FxHashMap::len).sum()
    }
}
