//! The built-in GDL interpreter behind the [`Engine`] trait.

use std::sync::Arc;
use tracing::{debug, info, warn};

use super::domain::Domain;
use super::eval::{tuples, Evaluator, Facts, Plan};
use super::rules::{Ground, Program, ProgramBuilder};
use crate::core::GameRng;
use crate::engine::{Engine, EngineParameters, FactId, LegalMove, StateData};
use crate::error::{GdlError, Result};
use crate::term::{canonical_sexpr, normalize_sentence, parse_sexprs, strip_comments};

/// Step value of a state found terminal.
const STEP_TERMINAL: u32 = 1;
/// Step value of a state whose legal moves are evaluated.
const STEP_LEGALS: u32 = 2;

/// Derived view of one position: everything the protocol may ask for.
#[derive(Debug)]
struct Evaluation {
    /// `true` facts plus everything the state rules derive from them.
    model: Facts,
    terminal: bool,
    legals: Vec<LegalMove>,
    goals: Vec<Option<i64>>,
}

/// Engine state: the true fluents plus their evaluation.
///
/// The evaluation is computed eagerly whenever the fluents change and is
/// shared between clones.
#[derive(Clone, Debug)]
pub struct GdlState {
    facts: Arc<[FactId]>,
    round: u32,
    step: u32,
    eval: Arc<Evaluation>,
}

impl GdlState {
    /// True fluents, ascending.
    #[must_use]
    pub fn facts(&self) -> &[FactId] {
        &self.facts
    }
}

/// A compiled GDL rule set.
///
/// ```
/// use gdl_play::engine::{Engine, EngineParameters};
/// use gdl_play::gdl::GdlEngine;
/// use gdl_play::games::TICTACTOE;
///
/// let engine = GdlEngine::compile(TICTACTOE, &EngineParameters::default()).unwrap();
/// assert_eq!(engine.num_roles(), 2);
/// assert_eq!(engine.role_name(0), "white");
/// ```
#[derive(Debug)]
pub struct GdlEngine {
    program: Program,
    plan: Plan,
    domain: Domain,
    /// Facts derived by the static rules.
    rigid: Facts,
    /// Initial fluents, ascending.
    init: Arc<[FactId]>,
    role_names: Vec<Arc<str>>,
    params: EngineParameters,
}

impl GdlEngine {
    /// Compile rule text.
    pub fn compile(text: &str, params: &EngineParameters) -> Result<Self> {
        let sentences: Vec<_> = parse_sexprs(&strip_comments(text))?
            .iter()
            .map(normalize_sentence)
            .collect();
        let program = ProgramBuilder::new(params.order_rules).build(&sentences)?;
        let plan = Plan::new(&program)?;

        let k = program.keywords;
        for (key, name) in [(k.legal, "legal"), (k.goal, "goal"), (k.terminal, "terminal")] {
            if plan.move_dependent.contains(&key) {
                return Err(GdlError::InvalidRules(format!("{name} depends on does")));
            }
        }

        let mut rigid = Facts::default();
        Evaluator::new(&program.rules).run(&plan.static_rules, &[], &mut rigid)?;
        let domain = Domain::build(&program, params.max_relation_size)?;

        let role_names = program
            .roles
            .iter()
            .map(|r| Arc::from(program.symbols.name(*r)))
            .collect();

        let mut engine = Self {
            program,
            plan,
            domain,
            rigid,
            init: Arc::from(Vec::new()),
            role_names,
            params: params.clone(),
        };

        // `init` may read state-dependent relations; evaluate it on the
        // empty position.
        let empty = engine.state_model(&[])?;
        let mut init = Vec::new();
        for tuple in tuples(&[&engine.rigid, &empty], k.init) {
            let id = engine.domain.fluent_id(&tuple[0]).ok_or_else(|| {
                GdlError::InternalInconsistency(format!(
                    "initial fact {} outside the fluent domain",
                    engine.program.symbols.render(&tuple[0])
                ))
            })?;
            init.push(id);
        }
        init.sort_unstable();
        init.dedup();
        engine.init = Arc::from(init);

        info!(
            roles = ?engine.role_names,
            rules = engine.program.rules.len(),
            fluents = engine.domain.num_fluents(),
            moves = engine.domain.num_moves(),
            "compiled GDL rules"
        );
        Ok(engine)
    }

    /// Parameters the rules were compiled with.
    #[must_use]
    pub fn params(&self) -> &EngineParameters {
        &self.params
    }

    /// Initial fluents.
    #[must_use]
    pub fn initial_facts(&self) -> &[FactId] {
        &self.init
    }

    /// Evaluate the state rules on a set of fluents.
    fn state_model(&self, facts: &[FactId]) -> Result<Facts> {
        let mut model = Facts::default();
        for &id in facts {
            let entry = self.domain.fluent(id).ok_or_else(|| {
                GdlError::IncompatibleSnapshot(format!("unknown fluent identity {id}"))
            })?;
            model.insert(self.program.keywords.true_, Box::new([entry.ground.clone()]));
        }
        Evaluator::new(&self.program.rules).run(&self.plan.state_rules, &[&self.rigid], &mut model)?;
        Ok(model)
    }

    fn evaluate(&self, facts: &[FactId]) -> Result<Evaluation> {
        let model = self.state_model(facts)?;
        let k = self.program.keywords;
        let layers = [&self.rigid, &model];

        let terminal = tuples(&layers, k.terminal).next().is_some();

        let mut legals = Vec::new();
        for tuple in tuples(&layers, k.legal) {
            let Some(role) = self.role_index(&tuple[0]) else {
                continue;
            };
            let fact = self.domain.move_id(role, &tuple[1]).ok_or_else(|| {
                GdlError::InternalInconsistency(format!(
                    "legal move {} outside the move domain",
                    self.program.symbols.render(&tuple[1])
                ))
            })?;
            legals.push(self.legal_move(role, fact)?);
        }
        legals.sort_by_key(|m| (m.role, m.fact));

        let mut goals: Vec<Option<i64>> = vec![None; self.num_roles()];
        for tuple in tuples(&layers, k.goal) {
            let Some(role) = self.role_index(&tuple[0]) else {
                continue;
            };
            let value = match &tuple[1] {
                Ground::Sym(sym) => self.program.symbols.name(*sym).parse::<i64>().ok(),
                Ground::App(..) => None,
            };
            let Some(value) = value else { continue };
            match goals[role] {
                Some(previous) if previous != value => {
                    warn!(
                        role = %self.role_names[role],
                        previous, value,
                        "several goal values for one role, keeping the lowest"
                    );
                    goals[role] = Some(previous.min(value));
                }
                _ => goals[role] = Some(value),
            }
        }

        Ok(Evaluation {
            model,
            terminal,
            legals,
            goals,
        })
    }

    fn role_index(&self, ground: &Ground) -> Option<usize> {
        match ground {
            Ground::Sym(sym) => self.program.roles.iter().position(|r| r == sym),
            Ground::App(..) => None,
        }
    }

    fn legal_move(&self, role: usize, fact: FactId) -> Result<LegalMove> {
        let entry = self.domain.move_entry(fact).ok_or_else(|| {
            GdlError::InternalInconsistency(format!("unknown move identity {fact}"))
        })?;
        Ok(LegalMove {
            role,
            fact,
            text: Arc::clone(&entry.text),
        })
    }

    fn refresh(&self, state: &mut GdlState, facts: Arc<[FactId]>, round: u32) -> Result<()> {
        let eval = self.evaluate(&facts)?;
        state.step = if eval.terminal { STEP_TERMINAL } else { STEP_LEGALS };
        state.facts = facts;
        state.round = round;
        state.eval = Arc::new(eval);
        Ok(())
    }
}

impl Engine for GdlEngine {
    type State = GdlState;

    fn num_roles(&self) -> usize {
        self.role_names.len()
    }

    fn role_name(&self, role: usize) -> &str {
        &self.role_names[role]
    }

    fn create_state(&self) -> Result<GdlState> {
        let eval = self.evaluate(&[])?;
        Ok(GdlState {
            facts: Arc::from(Vec::new()),
            round: 0,
            step: 0,
            eval: Arc::new(eval),
        })
    }

    fn set_initial_state(&self, state: &mut GdlState) -> Result<()> {
        self.refresh(state, Arc::clone(&self.init), 0)
    }

    fn legal_moves(&self, state: &GdlState) -> Result<Vec<LegalMove>> {
        Ok(state.eval.legals.clone())
    }

    fn do_move(&self, state: &mut GdlState, moves: &[LegalMove]) -> Result<()> {
        let k = self.program.keywords;
        let mut does = Facts::default();
        for mv in moves {
            let entry = self.domain.move_entry(mv.fact).ok_or_else(|| {
                GdlError::InternalInconsistency(format!("unknown move identity {}", mv.fact))
            })?;
            let role = Ground::Sym(self.program.roles[mv.role]);
            does.insert(k.does, Box::new([role, entry.ground.clone()]));
        }
        Evaluator::new(&self.program.rules).run(
            &self.plan.move_rules,
            &[&self.rigid, &state.eval.model],
            &mut does,
        )?;

        let mut next = Vec::new();
        for tuple in tuples(&[&self.rigid, &state.eval.model, &does], k.next) {
            let id = self.domain.fluent_id(&tuple[0]).ok_or_else(|| {
                GdlError::InternalInconsistency(format!(
                    "next fact {} outside the fluent domain",
                    self.program.symbols.render(&tuple[0])
                ))
            })?;
            next.push(id);
        }
        next.sort_unstable();
        next.dedup();

        let round = state.round + 1;
        self.refresh(state, Arc::from(next), round)?;
        debug!(round, moves = moves.len(), terminal = state.eval.terminal, "applied joint move");
        Ok(())
    }

    fn is_terminal(&self, state: &GdlState) -> bool {
        state.eval.terminal
    }

    fn goal_values(&self, state: &GdlState) -> Vec<Option<i64>> {
        state.eval.goals.clone()
    }

    fn play_out(&self, state: &mut GdlState, rng: &mut GameRng) -> Result<()> {
        let start = state.round;
        let mut joint: Vec<LegalMove> = Vec::with_capacity(self.num_roles());
        while !state.eval.terminal {
            if let Some(cap) = self.params.max_playout_rounds {
                if state.round - start >= cap {
                    debug!(rounds = cap, "playout stopped at the round cap");
                    return Ok(());
                }
            }
            joint.clear();
            let legals = &state.eval.legals;
            for role in 0..self.num_roles() {
                let lo = legals.partition_point(|m| m.role < role);
                let hi = legals.partition_point(|m| m.role <= role);
                let choice = rng.choose(&legals[lo..hi]).ok_or_else(|| {
                    GdlError::InternalInconsistency(format!(
                        "role {} has no legal move during playout",
                        self.role_names[role]
                    ))
                })?;
                joint.push(choice.clone());
            }
            self.do_move(state, &joint)?;
        }
        debug!(rounds = state.round - start, goals = ?state.eval.goals, "playout finished");
        Ok(())
    }

    fn state_data(&self, state: &GdlState) -> StateData {
        StateData {
            round: state.round,
            step: state.step,
            facts: state.facts.to_vec(),
        }
    }

    fn round(&self, state: &GdlState) -> u32 {
        state.round
    }

    fn step(&self, state: &GdlState) -> u32 {
        state.step
    }

    fn set_state_data(&self, state: &mut GdlState, data: &StateData) -> Result<()> {
        let mut facts = data.facts.clone();
        facts.sort_unstable();
        facts.dedup();
        self.refresh(state, Arc::from(facts), data.round)?;
        state.step = data.step;
        Ok(())
    }

    fn find_move(&self, role: usize, text: &str) -> Option<LegalMove> {
        let canonical = canonical_sexpr(text).ok()?;
        let fact = self.domain.move_by_text(role, &canonical)?;
        self.legal_move(role, fact).ok()
    }

    fn fact_text(&self, fact: FactId) -> Option<&str> {
        self.domain.fluent(fact).map(|e| &*e.text)
    }
}
