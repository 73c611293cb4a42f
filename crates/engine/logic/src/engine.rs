//! Rule evaluation
//!
//! The engine never touches engine state directly: operands are read
//! through [`RuleContext`] and actions run through [`ActionDispatch`], so the
//! same rules can be driven by the world, a test double or the authoring
//! tool.

use crate::action::ActionDispatch;
use crate::{FlagId, FlagOp, FlagStore, Operand, Rule, Timer};
use tracing::{trace, warn};

/// Read access to the state rule operands are evaluated against
pub trait RuleContext {
    /// Get a flag
    fn flag(&self, id: FlagId) -> bool;

    /// Get the plot number
    fn plot_number(&self) -> u16;

    /// Check whether the map timer with this index has expired
    fn timer_expired(&self, index: u16) -> bool;

    /// Evaluate a caller-defined predicate
    fn predicate(&self, id: u16) -> bool {
        let _ = id;
        false
    }

    /// Evaluate one operand
    fn operand(&self, operand: Operand) -> bool {
        match operand {
            Operand::Flag(id) => self.flag(id),
            Operand::Plot(threshold) => self.plot_number() > threshold,
            Operand::Timer(index) => self.timer_expired(index),
            Operand::Predicate(id) => self.predicate(id),
        }
    }
}

/// Write access used by the basic actions
pub trait RuleExecutor: RuleContext {
    /// Apply an operation to a flag
    fn set_flag(&mut self, id: FlagId, op: FlagOp);

    /// Add to the plot number, wrapping on overflow
    fn increase_plot(&mut self, amount: u16);

    /// Overwrite the plot number
    fn set_plot(&mut self, value: u16);

    /// Start a map timer at the current time
    fn start_timer(&mut self, index: u16);

    /// Stop a map timer
    fn stop_timer(&mut self, index: u16);
}

/// Source of `Predicate` operand values
pub trait Predicate {
    /// Evaluate predicate `id`
    fn test(&self, id: u16) -> bool;
}

impl<F: Fn(u16) -> bool> Predicate for F {
    fn test(&self, id: u16) -> bool {
        self(id)
    }
}

/// Predicate source for maps without one; every predicate is false
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPredicate;

impl Predicate for NoPredicate {
    fn test(&self, _id: u16) -> bool {
        false
    }
}

/// Engine-wide logic state shared by all maps
#[derive(Debug, Clone)]
pub struct LogicState {
    pub flags: FlagStore,
    pub plot: u16,
    /// Current time in seconds, as seen by timers
    pub now: f64,
}

impl LogicState {
    /// Create a state with `global_flags` persistent flags
    pub fn new(global_flags: u16) -> Self {
        LogicState {
            flags: FlagStore::new(global_flags),
            plot: 0,
            now: 0.0,
        }
    }

    /// Create a state around an existing flag store
    pub fn with_flags(flags: FlagStore) -> Self {
        LogicState {
            flags,
            plot: 0,
            now: 0.0,
        }
    }

    /// Borrow the state together with one map's timers and predicate
    pub fn frame<'a, P: Predicate + ?Sized>(
        &'a mut self,
        timers: &'a mut [Timer],
        predicate: &'a P,
    ) -> LogicFrame<'a, P> {
        LogicFrame {
            state: self,
            timers,
            predicate,
        }
    }
}

/// Everything one map's rules can read and write during a tick
pub struct LogicFrame<'a, P: Predicate + ?Sized> {
    pub state: &'a mut LogicState,
    pub timers: &'a mut [Timer],
    pub predicate: &'a P,
}

impl<P: Predicate + ?Sized> RuleContext for LogicFrame<'_, P> {
    fn flag(&self, id: FlagId) -> bool {
        self.state.flags.get(id)
    }

    fn plot_number(&self) -> u16 {
        self.state.plot
    }

    fn timer_expired(&self, index: u16) -> bool {
        match self.timers.get(index as usize) {
            Some(timer) => timer.is_expired(self.state.now),
            None => {
                warn!(index, timers = self.timers.len(), "Rule reads missing timer");
                false
            }
        }
    }

    fn predicate(&self, id: u16) -> bool {
        self.predicate.test(id)
    }
}

impl<P: Predicate + ?Sized> RuleExecutor for LogicFrame<'_, P> {
    fn set_flag(&mut self, id: FlagId, op: FlagOp) {
        self.state.flags.set(id, op);
    }

    fn increase_plot(&mut self, amount: u16) {
        self.state.plot = self.state.plot.wrapping_add(amount);
    }

    fn set_plot(&mut self, value: u16) {
        self.state.plot = value;
    }

    fn start_timer(&mut self, index: u16) {
        let now = self.state.now;
        match self.timers.get_mut(index as usize) {
            Some(timer) => timer.start(now),
            None => warn!(index, "Start of missing timer ignored"),
        }
    }

    fn stop_timer(&mut self, index: u16) {
        match self.timers.get_mut(index as usize) {
            Some(timer) => timer.stop(),
            None => warn!(index, "Stop of missing timer ignored"),
        }
    }
}

/// Decides rules and dispatches the actions of those that fire
#[derive(Debug, Clone, Copy)]
pub struct RuleEngine {
    early_exit: bool,
}

impl Default for RuleEngine {
    fn default() -> Self {
        RuleEngine { early_exit: true }
    }
}

impl RuleEngine {
    /// Create an engine that stops reading operands as soon as the result
    /// is known
    pub fn new() -> Self {
        RuleEngine::default()
    }

    /// Create an engine that always reads every operand
    pub fn without_early_exit() -> Self {
        RuleEngine { early_exit: false }
    }

    /// Enable or disable early exit (builder pattern)
    pub fn with_early_exit(mut self, early_exit: bool) -> Self {
        self.early_exit = early_exit;
        self
    }

    /// Check whether early exit is enabled
    pub fn early_exit(&self) -> bool {
        self.early_exit
    }

    /// Decide whether a rule fires
    ///
    /// Operands are read most significant first. After each one the
    /// results still reachable form an aligned block of the table; if that
    /// block is all true or all false the remaining operands are skipped.
    pub fn decide<C: RuleContext + ?Sized>(&self, rule: &Rule, ctx: &C) -> bool {
        if !self.early_exit {
            return self.decide_full(rule, ctx);
        }

        let table = rule.table();
        let count = rule.operands().len();
        let mut index = 0usize;

        for (i, operand) in rule.operands().iter().enumerate() {
            let remaining = count - 1 - i;
            if ctx.operand(*operand) {
                index |= 1 << remaining;
            }
            if let Some(result) = table.uniform(index, 1 << remaining) {
                return result;
            }
        }
        table.get(index)
    }

    /// Decide whether a rule fires by reading every operand
    pub fn decide_full<C: RuleContext + ?Sized>(&self, rule: &Rule, ctx: &C) -> bool {
        let count = rule.operands().len();
        let index = rule
            .operands()
            .iter()
            .enumerate()
            .filter(|(_, operand)| ctx.operand(**operand))
            .fold(0usize, |index, (i, _)| index | (1 << (count - 1 - i)));
        rule.table().get(index)
    }

    /// Run rules in order, dispatching each firing rule's actions before
    /// the next rule is decided. Returns the number of rules that fired.
    pub fn process<C, D>(&self, rules: &[Rule], ctx: &mut C, actions: &mut D) -> usize
    where
        C: RuleContext + ?Sized,
        D: ActionDispatch<C> + ?Sized,
    {
        let mut fired = 0;
        for (n, rule) in rules.iter().enumerate() {
            if !self.decide(rule, ctx) {
                continue;
            }
            trace!(rule = n, actions = rule.action_count(), "Rule fired");
            for (id, args) in rule.actions() {
                actions.dispatch(id, args, ctx);
            }
            fired += 1;
        }
        fired
    }
}
