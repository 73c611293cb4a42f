//! The engine context

use crate::{ActiveMap, Error, MapData, Result};
use logic::{ActionTable, FlagStore, LogicState, RuleEngine, RuleExecutor};
use pool::{ubo_pool, TexturePool, TextureUploader, UboPool, UniformBlock};
use system::{EngineConfig, LogicScope, ResourcePaths, TickSource};
use tracing::{debug, warn};

/// What one call to [`World::update`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub contexts_cleared: usize,
    pub uniform_blocks_cleared: usize,
    pub texture_layers_freed: usize,
    pub textures_uploaded: usize,
}

/// Engine-wide state shared by every map
///
/// Owns the flags, the plot number and the clock seen by timers, the
/// action table, and the uniform block and texture pools.
pub struct World {
    config: EngineConfig,
    paths: ResourcePaths,
    logic: LogicState,
    engine: RuleEngine,
    actions: ActionTable,
    ubos: UboPool,
    textures: TexturePool,
}

impl World {
    /// Create a world from a configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let step = config.allocation_step;
        let flags = FlagStore::with_block_size(config.global_flags, step);
        let mut actions = ActionTable::with_allocation_step(step);
        actions.install_basic_actions();

        debug!(
            global_flags = config.global_flags,
            allocation_step = step,
            scope = ?config.logic_scope,
            "World created"
        );
        Ok(Self {
            paths: config.paths(),
            logic: LogicState::with_flags(flags),
            engine: RuleEngine::new().with_early_exit(config.early_exit),
            actions,
            ubos: ubo_pool(step),
            textures: TexturePool::new(step),
            config,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the resource paths
    pub fn paths(&self) -> &ResourcePaths {
        &self.paths
    }

    /// Get the flags
    pub fn flags(&self) -> &FlagStore {
        &self.logic.flags
    }

    /// Get mutable flags
    pub fn flags_mut(&mut self) -> &mut FlagStore {
        &mut self.logic.flags
    }

    /// Get the plot number
    pub fn plot(&self) -> u16 {
        self.logic.plot
    }

    /// Overwrite the plot number
    pub fn set_plot(&mut self, plot: u16) {
        self.logic.plot = plot;
    }

    /// Current time in seconds, as seen by map timers
    pub fn now(&self) -> f64 {
        self.logic.now
    }

    /// Get the texture pool
    pub fn textures(&self) -> &TexturePool {
        &self.textures
    }

    /// Get a map's uniform block
    pub fn uniform_block(&self, map: &ActiveMap) -> Option<&UniformBlock> {
        self.ubos.get(map.ubo)
    }

    /// Get a map's uniform block for writing
    pub fn uniform_block_mut(&mut self, map: &ActiveMap) -> Option<&mut UniformBlock> {
        self.ubos.get_mut(map.ubo)
    }

    /// Register a custom action handler
    pub fn register_action<F>(&mut self, id: u32, handler: F) -> Result<()>
    where
        F: FnMut(&mut dyn RuleExecutor, &[u8]) + 'static,
    {
        self.actions.register(id, handler)?;
        Ok(())
    }

    /// Remove a custom action handler; returns whether one was registered
    pub fn unregister_action(&mut self, id: u32) -> Result<bool> {
        Ok(self.actions.unregister(id)?)
    }

    /// Give a map its temporary flag context, uniform block and texture
    /// layers
    ///
    /// The first activated map does not become current on its own; call
    /// [`World::make_current`].
    pub fn activate_map(&mut self, data: MapData) -> ActiveMap {
        let context = self.logic.flags.acquire_context();
        let ubo = self.ubos.acquire();
        let texture_layers = data
            .textures
            .iter()
            .filter_map(|&key| self.textures.acquire(key))
            .collect::<Vec<_>>();

        debug!(
            map = data.id,
            %context,
            %ubo,
            textures = texture_layers.len(),
            "Map activated"
        );
        ActiveMap {
            data,
            context,
            ubo,
            texture_layers,
        }
    }

    /// Return a map's resources; they are cleared on the next update
    ///
    /// Hands the map data back so the map can be activated again later.
    /// Every resource is released even if one of them fails; the first
    /// failure is returned.
    pub fn deactivate_map(&mut self, map: ActiveMap) -> Result<MapData> {
        let ActiveMap {
            data,
            context,
            ubo,
            texture_layers,
        } = map;

        let mut first_error: Option<Error> = None;
        let mut note = |result: Result<()>| {
            if let Err(err) = result {
                warn!(map = data.id, error = %err, "Failed to release map resource");
                first_error.get_or_insert(err);
            }
        };

        note(self.logic.flags.release_context(context).map_err(Error::from));
        note(self.ubos.release(ubo).map_err(Error::from));
        for layer in texture_layers {
            note(self.textures.release(layer).map_err(Error::from));
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                debug!(map = data.id, "Map deactivated");
                Ok(data)
            }
        }
    }

    /// Make temporary flag IDs resolve to a map's context
    pub fn make_current(&mut self, map: &ActiveMap) -> Result<()> {
        self.logic.flags.set_current_context(map.context)?;
        Ok(())
    }

    /// Run a map's rules once; returns the number of rules that fired
    ///
    /// The map becomes current.
    pub fn process_logic(&mut self, map: &mut ActiveMap) -> Result<usize> {
        self.make_current(map)?;
        let data = &mut map.data;
        let mut frame = self.logic.frame(&mut data.timers, &data.collision);
        Ok(self
            .engine
            .process(&data.rules, &mut frame, &mut self.actions))
    }

    /// Run rules for the maps selected by the configured [`LogicScope`]
    ///
    /// `main` is the map the player is on, `others` its loaded neighbours
    /// and `nearest` the index of the closest neighbour. `main` is current
    /// afterwards. Returns the number of rules that fired across all maps.
    pub fn process_scope(
        &mut self,
        main: &mut ActiveMap,
        others: &mut [ActiveMap],
        nearest: Option<usize>,
    ) -> Result<usize> {
        let mut fired = self.process_logic(main)?;
        match self.config.logic_scope {
            LogicScope::Current => return Ok(fired),
            LogicScope::Closest => match nearest {
                Some(index) if index < others.len() => {
                    fired += self.process_logic(&mut others[index])?;
                }
                Some(index) => warn!(index, maps = others.len(), "Nearest map out of range"),
                None => {}
            },
            LogicScope::All => {
                for map in others.iter_mut() {
                    fired += self.process_logic(map)?;
                }
            }
        }
        self.make_current(main)?;
        Ok(fired)
    }

    /// Advance the clock by `dt` seconds and run resource upkeep
    ///
    /// Released contexts and uniform blocks are cleared, unused texture
    /// layers freed and newly bound textures uploaded.
    pub fn update(&mut self, dt: f64, uploader: &mut dyn TextureUploader) -> UpdateReport {
        self.logic.now += dt;
        self.maintain(uploader)
    }

    /// Take the time from a tick source and run resource upkeep
    pub fn tick(
        &mut self,
        clock: &mut dyn TickSource,
        uploader: &mut dyn TextureUploader,
    ) -> UpdateReport {
        clock.tick();
        self.logic.now = clock.now();
        self.maintain(uploader)
    }

    fn maintain(&mut self, uploader: &mut dyn TextureUploader) -> UpdateReport {
        let mut report = UpdateReport::default();
        if self.logic.flags.contexts_dirty() {
            report.contexts_cleared = self.logic.flags.sweep_contexts();
        }
        if self.ubos.is_dirty() {
            report.uniform_blocks_cleared = self.ubos.sweep();
        }
        report.texture_layers_freed = self.textures.sweep();
        report.textures_uploaded = self.textures.flush(uploader);
        report
    }
}
