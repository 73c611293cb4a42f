//! Actions dispatched by firing rules
//!
//! A rule stores action IDs and raw argument bytes; what an ID means is up
//! to the [`ActionDispatch`] implementation. [`ActionTable`] is the usual
//! one: a registry of handlers indexed by ID, with the low IDs holding the
//! built-in flag, plot and timer actions.

use crate::engine::RuleExecutor;
use crate::{Error, FlagOp, Result};
use std::fmt;
use tracing::{debug, warn};

/// Number of action IDs reserved for built-in actions
pub const BASIC_ACTION_COUNT: u32 = 16;

/// Default number of handler slots added when the table grows
pub const DEFAULT_ALLOCATION_STEP: usize = 64;

/// Built-in actions; each takes one little-endian `u16` argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicAction {
    /// Set the flag with the given ID
    EnableFlag,
    /// Clear the flag with the given ID
    DisableFlag,
    /// Invert the flag with the given ID
    ToggleFlag,
    /// Add to the plot number (wrapping)
    IncreasePlot,
    /// Overwrite the plot number
    SetPlot,
    /// Start the map timer with the given index
    StartTimer,
    /// Stop the map timer with the given index
    StopTimer,
}

impl BasicAction {
    /// All built-in actions in ID order
    pub const ALL: [BasicAction; 7] = [
        BasicAction::EnableFlag,
        BasicAction::DisableFlag,
        BasicAction::ToggleFlag,
        BasicAction::IncreasePlot,
        BasicAction::SetPlot,
        BasicAction::StartTimer,
        BasicAction::StopTimer,
    ];

    /// Action ID
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Look up a built-in action by ID
    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    /// Apply the action to an executor
    pub fn apply<E: RuleExecutor + ?Sized>(self, arg: u16, executor: &mut E) {
        match self {
            BasicAction::EnableFlag => executor.set_flag(arg, FlagOp::Enable),
            BasicAction::DisableFlag => executor.set_flag(arg, FlagOp::Disable),
            BasicAction::ToggleFlag => executor.set_flag(arg, FlagOp::Toggle),
            BasicAction::IncreasePlot => executor.increase_plot(arg),
            BasicAction::SetPlot => executor.set_plot(arg),
            BasicAction::StartTimer => executor.start_timer(arg),
            BasicAction::StopTimer => executor.stop_timer(arg),
        }
    }
}

/// Read the `u16` argument of a basic action
pub fn read_u16_arg(args: &[u8]) -> Option<u16> {
    match args {
        [lo, hi, ..] => Some(u16::from_le_bytes([*lo, *hi])),
        _ => None,
    }
}

/// Runs the actions of firing rules
pub trait ActionDispatch<C: ?Sized> {
    /// Run action `id` with its argument bytes
    fn dispatch(&mut self, id: u32, args: &[u8], ctx: &mut C);
}

/// Boxed action handler
pub type ActionFn = Box<dyn FnMut(&mut dyn RuleExecutor, &[u8])>;

/// Registry of action handlers indexed by action ID
pub struct ActionTable {
    handlers: Vec<Option<ActionFn>>,
    allocation_step: usize,
    basic_installed: bool,
}

impl Default for ActionTable {
    fn default() -> Self {
        Self::with_allocation_step(DEFAULT_ALLOCATION_STEP)
    }
}

impl fmt::Debug for ActionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionTable")
            .field("registered", &self.len())
            .field("capacity", &self.handlers.len())
            .field("basic_installed", &self.basic_installed)
            .finish()
    }
}

impl ActionTable {
    /// Create an empty table
    pub fn new() -> Self {
        ActionTable::default()
    }

    /// Create an empty table that grows by `step` slots at a time
    pub fn with_allocation_step(step: usize) -> Self {
        let step = step.max(1);
        let mut handlers = Vec::new();
        handlers.resize_with(BASIC_ACTION_COUNT as usize + step, || None);
        ActionTable {
            handlers,
            allocation_step: step,
            basic_installed: false,
        }
    }

    /// Create a table with the basic actions installed
    pub fn with_basic_actions() -> Self {
        let mut table = ActionTable::new();
        table.install_basic_actions();
        table
    }

    /// Install the built-in flag, plot and timer actions
    pub fn install_basic_actions(&mut self) {
        for action in BasicAction::ALL {
            self.insert(
                action.id(),
                Box::new(move |ctx: &mut dyn RuleExecutor, args: &[u8]| {
                    match read_u16_arg(args) {
                        Some(arg) => action.apply(arg, ctx),
                        None => warn!(?action, len = args.len(), "Basic action argument too short"),
                    }
                }),
            );
        }
        self.basic_installed = true;
    }

    /// Register a handler for a custom action ID
    ///
    /// Fails with [`Error::ReservedAction`] for IDs below
    /// [`BASIC_ACTION_COUNT`] once the basic actions are installed.
    pub fn register<F>(&mut self, id: u32, handler: F) -> Result<()>
    where
        F: FnMut(&mut dyn RuleExecutor, &[u8]) + 'static,
    {
        if self.basic_installed && id < BASIC_ACTION_COUNT {
            return Err(Error::ReservedAction(id));
        }
        self.insert(id, Box::new(handler));
        Ok(())
    }

    /// Remove a custom handler; returns whether one was registered
    pub fn unregister(&mut self, id: u32) -> Result<bool> {
        if self.basic_installed && id < BASIC_ACTION_COUNT {
            return Err(Error::ReservedAction(id));
        }
        Ok(self
            .handlers
            .get_mut(id as usize)
            .and_then(Option::take)
            .is_some())
    }

    /// Check whether an ID has a handler
    pub fn contains(&self, id: u32) -> bool {
        matches!(self.handlers.get(id as usize), Some(Some(_)))
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.iter().filter(|h| h.is_some()).count()
    }

    /// Check if no handler is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of handler slots currently allocated
    pub fn capacity(&self) -> usize {
        self.handlers.len()
    }

    /// Run action `id`; unknown IDs are skipped
    pub fn run(&mut self, id: u32, args: &[u8], ctx: &mut dyn RuleExecutor) {
        match self.handlers.get_mut(id as usize).and_then(Option::as_mut) {
            Some(handler) => handler(ctx, args),
            None => warn!(id, "No handler for action, skipped"),
        }
    }

    fn insert(&mut self, id: u32, handler: ActionFn) {
        let index = id as usize;
        if index >= self.handlers.len() {
            let len = (index / self.allocation_step + 1) * self.allocation_step;
            self.handlers.resize_with(len, || None);
            debug!(capacity = len, "Action table grown");
        }
        self.handlers[index] = Some(handler);
    }
}

impl<C: RuleExecutor> ActionDispatch<C> for ActionTable {
    fn dispatch(&mut self, id: u32, args: &[u8], ctx: &mut C) {
        self.run(id, args, ctx);
    }
}
