//! Multi-map scenarios

use logic::{BasicAction, FlagOp, Operand, RuleSource, Timer};
use physics::{Aabb, CollisionMap, CollisionRule, ElementGroup};
use pool::{SlotHandle, SlotState, TextureKey, TextureUploader};
use std::fs;
use system::{EngineConfig, LogicScope, ManualClock};
use tempfile::TempDir;
use world::{MapData, World};

#[derive(Default)]
struct RecordingUploader {
    layers: usize,
    uploads: Vec<(SlotHandle, TextureKey)>,
}

impl TextureUploader for RecordingUploader {
    fn resize(&mut self, layers: usize) {
        self.layers = layers;
    }

    fn upload(&mut self, layer: SlotHandle, key: TextureKey) {
        self.uploads.push((layer, key));
    }
}

fn world_with_scope(scope: LogicScope) -> World {
    World::new(EngineConfig {
        global_flags: 64,
        allocation_step: 2,
        logic_scope: scope,
        ..EngineConfig::default()
    })
    .unwrap()
}

/// Map whose single rule counts its own ticks in plot units of `step`
fn counting_map(id: u16, step: u16) -> MapData {
    let rule = RuleSource::new("a | !a")
        .bind('a', Operand::Flag(0))
        .then(BasicAction::IncreasePlot.id(), &step.to_le_bytes())
        .compile()
        .unwrap();
    MapData::new(id).with_rules(vec![rule])
}

#[test]
fn test_temporary_flags_follow_current_map() {
    let mut world = world_with_scope(LogicScope::Current);
    let a = world.activate_map(MapData::new(1));
    let b = world.activate_map(MapData::new(2));

    world.make_current(&a).unwrap();
    world.flags_mut().set(70, FlagOp::Enable);
    world.flags_mut().set(3, FlagOp::Enable);

    world.make_current(&b).unwrap();
    assert!(!world.flags().get(70));
    assert!(world.flags().get(3));

    world.make_current(&a).unwrap();
    assert!(world.flags().get(70));
}

#[test]
fn test_reactivated_map_gets_clean_context() {
    let mut world = world_with_scope(LogicScope::Current);
    let mut uploader = RecordingUploader::default();

    let a = world.activate_map(MapData::new(1));
    world.make_current(&a).unwrap();
    world.flags_mut().set(80, FlagOp::Enable);
    let data = world.deactivate_map(a).unwrap();
    assert_eq!(world.flags().current_context(), None);

    // Same tick: the released context is handed out again, already cleared
    let a = world.activate_map(data);
    world.make_current(&a).unwrap();
    assert!(!world.flags().get(80));

    world.flags_mut().set(80, FlagOp::Enable);
    let data = world.deactivate_map(a).unwrap();
    world.update(0.1, &mut uploader);
    let a = world.activate_map(data);
    world.make_current(&a).unwrap();
    assert!(!world.flags().get(80));
}

#[test]
fn test_scope_current_runs_main_only() {
    let mut world = world_with_scope(LogicScope::Current);
    let mut main = world.activate_map(counting_map(1, 1));
    let mut others = vec![world.activate_map(counting_map(2, 10))];

    let fired = world.process_scope(&mut main, &mut others, Some(0)).unwrap();
    assert_eq!(fired, 1);
    assert_eq!(world.plot(), 1);
}

#[test]
fn test_scope_closest_runs_nearest_neighbour() {
    let mut world = world_with_scope(LogicScope::Closest);
    let mut main = world.activate_map(counting_map(1, 1));
    let mut others = vec![
        world.activate_map(counting_map(2, 10)),
        world.activate_map(counting_map(3, 100)),
    ];

    world.process_scope(&mut main, &mut others, Some(1)).unwrap();
    assert_eq!(world.plot(), 101);
    assert_eq!(world.flags().current_context(), Some(main.context()));

    // Unknown neighbour index only runs the main map
    world.process_scope(&mut main, &mut others, Some(5)).unwrap();
    assert_eq!(world.plot(), 102);
}

#[test]
fn test_scope_all_runs_every_map() {
    let mut world = world_with_scope(LogicScope::All);
    let mut main = world.activate_map(counting_map(1, 1));
    let mut others = vec![
        world.activate_map(counting_map(2, 10)),
        world.activate_map(counting_map(3, 100)),
    ];

    let fired = world.process_scope(&mut main, &mut others, None).unwrap();
    assert_eq!(fired, 3);
    assert_eq!(world.plot(), 111);
    assert_eq!(world.flags().current_context(), Some(main.context()));
}

#[test]
fn test_timer_started_by_rule_expires_with_clock() {
    let mut world = world_with_scope(LogicScope::Current);
    let mut uploader = RecordingUploader::default();
    let mut clock = ManualClock::new(0.5);

    // Start timer 0 once (guarded by flag 1); when it expires set plot to 7
    let start = RuleSource::new("!g")
        .bind('g', Operand::Flag(1))
        .then(BasicAction::EnableFlag.id(), &1u16.to_le_bytes())
        .then(BasicAction::StartTimer.id(), &0u16.to_le_bytes())
        .compile()
        .unwrap();
    let expire = RuleSource::new("t")
        .bind('t', Operand::Timer(0))
        .then(BasicAction::SetPlot.id(), &7u16.to_le_bytes())
        .compile()
        .unwrap();
    let data = MapData::new(1)
        .with_rules(vec![start, expire])
        .with_timers(vec![Timer::new(1.0)]);
    let mut map = world.activate_map(data);

    world.tick(&mut clock, &mut uploader);
    world.process_logic(&mut map).unwrap();
    assert!(map.timers()[0].is_started());
    assert_eq!(world.plot(), 0);

    world.tick(&mut clock, &mut uploader);
    world.process_logic(&mut map).unwrap();
    assert_eq!(world.plot(), 0);

    world.tick(&mut clock, &mut uploader);
    world.process_logic(&mut map).unwrap();
    assert_eq!(world.now(), 1.5);
    assert_eq!(world.plot(), 7);
}

#[test]
fn test_shared_textures_are_uploaded_once() {
    let mut world = world_with_scope(LogicScope::Current);
    let mut uploader = RecordingUploader::default();

    let a = world.activate_map(MapData::new(1).with_textures(vec![10, 11, 12]));
    let b = world.activate_map(MapData::new(2).with_textures(vec![11, 13]));
    assert_eq!(a.texture_layers()[1], b.texture_layers()[0]);

    let report = world.update(0.0, &mut uploader);
    assert_eq!(report.textures_uploaded, 4);
    assert!(uploader.layers >= 4);

    let shared = b.texture_layers()[0];
    world.deactivate_map(a).unwrap();
    assert_eq!(world.textures().refcount(shared), Some(1));
    assert_eq!(world.textures().state(shared), Some(SlotState::InUse));

    let report = world.update(0.0, &mut uploader);
    assert_eq!(report.texture_layers_freed, 2);
    assert_eq!(report.textures_uploaded, 0);
}

#[test]
fn test_collision_predicate_reaches_rules() {
    let mut world = world_with_scope(LogicScope::Current);
    let collision = CollisionMap::new()
        .with_colliders(vec![Aabb::from_rect(0, 0, 1, 1), Aabb::from_rect(5, 0, 1, 1)])
        .with_groups(vec![ElementGroup::new([0]), ElementGroup::new([1])])
        .with_rules(vec![CollisionRule::new(0, 1)]);
    let rule = RuleSource::new("c")
        .bind('c', Operand::Predicate(0))
        .then(BasicAction::ToggleFlag.id(), &9u16.to_le_bytes())
        .compile()
        .unwrap();
    let mut map = world.activate_map(MapData::new(1).with_rules(vec![rule]).with_collision(collision));

    world.process_logic(&mut map).unwrap();
    assert!(!world.flags().get(9));

    map.collision_mut()
        .collider_mut(0)
        .unwrap()
        .translate(physics::glam::IVec2::new(4, 0));
    world.process_logic(&mut map).unwrap();
    assert!(world.flags().get(9));
}

#[test]
fn test_map_from_sections() {
    let rule = RuleSource::new("c & !d")
        .bind('c', Operand::Predicate(0))
        .bind('d', Operand::Flag(2))
        .then(BasicAction::EnableFlag.id(), &2u16.to_le_bytes())
        .compile()
        .unwrap();
    let rules = logic::encode_rules(&[rule]).unwrap();
    let groups = physics::encode_groups(&[ElementGroup::new([0]), ElementGroup::new([1])]).unwrap();
    let collision_rules = physics::encode_collision_rules(&[CollisionRule::new(0, 1)]).unwrap();

    let data = MapData::from_sections(
        4,
        vec![Aabb::from_rect(0, 0, 3, 3), Aabb::from_rect(3, 3, 3, 3)],
        &rules,
        &groups,
        &collision_rules,
    )
    .unwrap();
    assert_eq!(data.rules.len(), 1);
    assert_eq!(data.collision.groups().len(), 2);

    let mut world = world_with_scope(LogicScope::Current);
    let mut map = world.activate_map(data);
    assert_eq!(world.process_logic(&mut map).unwrap(), 1);
    assert!(world.flags().get(2));
}

#[test]
fn test_corrupt_sections_are_rejected() {
    let result = MapData::from_sections(1, vec![], &[1], &[0, 0], &[0, 0]);
    assert!(matches!(result, Err(world::Error::Logic(_))));

    let result = MapData::from_sections(1, vec![], &[0], &[1, 0, 5], &[0, 0]);
    assert!(matches!(result, Err(world::Error::Physics(_))));
}

#[test]
fn test_map_sections_from_resource_dir() {
    let dir = TempDir::new().unwrap();
    let mut world = World::new(EngineConfig {
        resource_path: Some(dir.path().to_path_buf()),
        ..EngineConfig::default()
    })
    .unwrap();
    world.paths().ensure_dirs().unwrap();

    let rule = RuleSource::new("c")
        .bind('c', Operand::Predicate(0))
        .then(BasicAction::SetPlot.id(), &3u16.to_le_bytes())
        .compile()
        .unwrap();
    let maps = world.paths().maps_dir();
    fs::write(maps.join("7.rules"), logic::encode_rules(&[rule]).unwrap()).unwrap();
    fs::write(
        maps.join("7.groups"),
        physics::encode_groups(&[ElementGroup::new([0, 1])]).unwrap(),
    )
    .unwrap();
    fs::write(
        maps.join("7.collision"),
        physics::encode_collision_rules(&[CollisionRule::new(0, 0)]).unwrap(),
    )
    .unwrap();

    let data = MapData::from_sections(
        7,
        vec![Aabb::from_rect(0, 0, 4, 4), Aabb::from_rect(2, 2, 4, 4)],
        &fs::read(maps.join("7.rules")).unwrap(),
        &fs::read(maps.join("7.groups")).unwrap(),
        &fs::read(maps.join("7.collision")).unwrap(),
    )
    .unwrap();

    let mut map = world.activate_map(data);
    assert_eq!(world.process_logic(&mut map).unwrap(), 1);
    assert_eq!(world.plot(), 3);

    // No texture files were written, so lookups fall back to the dummy
    assert_eq!(
        world.paths().texture_or_dummy(12),
        dir.path().join("textures").join("img_dummy.png")
    );
}
