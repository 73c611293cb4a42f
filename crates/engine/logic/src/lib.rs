//! Logic crate - Truth-table rules for Tessera maps
//!
//! Map logic is written as boolean expressions over flags, the plot number,
//! timers and caller-defined predicates. Expressions are compiled ahead of
//! time into bit-packed truth tables, so deciding a rule at runtime is a
//! handful of operand reads and one table lookup.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Authoring                                               │
//! │  ├── RuleSource (expression + operand bindings)         │
//! │  └── compile() -> TruthTable + dictionary               │
//! ├─────────────────────────────────────────────────────────┤
//! │  Rules                                                   │
//! │  ├── Operands (flag / plot / timer / predicate)         │
//! │  ├── TruthTable (u64 words, 2^k bits)                   │
//! │  └── Actions (IDs + packed argument bytes)              │
//! ├─────────────────────────────────────────────────────────┤
//! │  RuleEngine                                              │
//! │  ├── Operand reads with early exit                      │
//! │  └── ActionDispatch (ActionTable, basic actions)        │
//! ├─────────────────────────────────────────────────────────┤
//! │  State                                                   │
//! │  ├── FlagStore (global bits + pooled map contexts)      │
//! │  └── LogicState / LogicFrame                            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use logic::{ActionTable, BasicAction, LogicState, NoPredicate, Operand, RuleEngine, RuleSource};
//!
//! // Raise the plot number once flag 3 is set and flag 4 is not
//! let rule = RuleSource::new("a & !b")
//!     .bind('a', Operand::Flag(3))
//!     .bind('b', Operand::Flag(4))
//!     .then(BasicAction::IncreasePlot.id(), &1u16.to_le_bytes())
//!     .compile()
//!     .unwrap();
//!
//! let mut state = LogicState::new(1024);
//! state.flags.set(3, logic::FlagOp::Enable);
//!
//! let mut actions = ActionTable::with_basic_actions();
//! let mut timers: [logic::Timer; 0] = [];
//! let mut frame = state.frame(&mut timers, &NoPredicate);
//! RuleEngine::new().process(&[rule], &mut frame, &mut actions);
//!
//! assert_eq!(state.plot, 1);
//! ```

mod action;
pub mod authoring;
mod compiler;
mod engine;
mod error;
mod flags;
pub mod io;
mod operand;
mod rule;
mod timer;
mod truth_table;

pub use action::{
    read_u16_arg, ActionDispatch, ActionFn, ActionTable, BasicAction, BASIC_ACTION_COUNT,
    DEFAULT_ALLOCATION_STEP,
};
pub use authoring::{ActionSource, RuleFile, RuleSource};
pub use compiler::{compile, CompiledExpression};
pub use engine::{
    LogicFrame, LogicState, NoPredicate, Predicate, RuleContext, RuleEngine, RuleExecutor,
};
pub use error::{CompileError, Error, Result};
pub use flags::{FlagId, FlagOp, FlagStore, TemporaryFlags, FLAG_ID_SPACE};
pub use io::{decode_rules, encode_rules};
pub use operand::Operand;
pub use rule::{Rule, MAX_ACTIONS, MAX_OPERANDS};
pub use timer::Timer;
pub use truth_table::{BinaryOp, TruthTable, MAX_VARIABLES};
