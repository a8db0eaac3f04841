mod common;

use atlas::data::loader::load_region;
use atlas::data::{EntityKind, MasterSnapshot, Region};
use atlas::hydrate::{
    get_entity, HydratedEntity, ReverseContext, ReverseData, ReverseDepth, ReverseSlot,
};
use atlas::EngineError;

use common::{descendants, fixture_dir, fixture_snapshot, ids};

fn nice(
    snapshot: &MasterSnapshot,
    kind: EntityKind,
    id: i64,
    depth: ReverseDepth,
) -> HydratedEntity {
    get_entity(
        snapshot,
        kind,
        id,
        ReverseData::Nice,
        ReverseContext::new(true, depth, ReverseData::Nice),
    )
    .expect("hydration should succeed")
}

fn list(entity: &HydratedEntity, kind: EntityKind) -> &[HydratedEntity] {
    entity
        .reverse
        .as_ref()
        .and_then(|slot| slot.list(kind))
        .unwrap_or_else(|| panic!("{} {} has no {kind} list", entity.kind(), entity.id()))
}

#[test]
fn buff_reaches_servants_through_functions_and_skills() {
    let snapshot = fixture_snapshot();
    let buff = nice(&snapshot, EntityKind::Buff, 101, ReverseDepth::Servant);

    let functions = list(&buff, EntityKind::Function);
    assert_eq!(ids(functions), vec![201]);

    let function = &functions[0];
    assert_eq!(ids(list(function, EntityKind::Skill)), vec![301, 302, 303]);
    assert_eq!(ids(list(function, EntityKind::NoblePhantasm)), vec![401]);

    let skill = &list(function, EntityKind::Skill)[0];
    assert_eq!(ids(list(skill, EntityKind::Servant)), vec![100100]);
    assert!(list(skill, EntityKind::MysticCode).is_empty());
    assert!(list(skill, EntityKind::CommandCode).is_empty());

    let np = &list(function, EntityKind::NoblePhantasm)[0];
    let servants = list(np, EntityKind::Servant);
    assert_eq!(ids(servants), vec![100100]);
    assert!(servants[0].reverse.is_none());
}

#[test]
fn depth_bounds_every_path() {
    let snapshot = fixture_snapshot();
    for depth in [
        ReverseDepth::Function,
        ReverseDepth::SkillNp,
        ReverseDepth::Servant,
    ] {
        let buff = nice(&snapshot, EntityKind::Buff, 101, depth);
        assert!(
            buff.deepest_level() <= depth.ordinal(),
            "depth {depth} expanded level {}",
            buff.deepest_level()
        );
        for entity in descendants(&buff) {
            if entity.reverse.is_some() {
                assert!(entity.level().ordinal() <= depth.ordinal());
            }
        }
    }

    let shallow = nice(&snapshot, EntityKind::Buff, 101, ReverseDepth::Function);
    assert!(list(&shallow, EntityKind::Function)[0].reverse.is_none());
    assert_eq!(shallow.node_count(), 2);
}

#[test]
fn reverse_flag_off_means_no_reverse_anywhere() {
    let snapshot = fixture_snapshot();
    let buff = get_entity(
        &snapshot,
        EntityKind::Buff,
        101,
        ReverseData::Nice,
        ReverseContext::new(false, ReverseDepth::Servant, ReverseData::Nice),
    )
    .expect("hydration should succeed");
    assert!(buff.reverse.is_none());
    assert_eq!(buff.deepest_level(), 0);
}

#[test]
fn basic_reverse_data_stops_after_one_level() {
    let snapshot = fixture_snapshot();
    let buff = get_entity(
        &snapshot,
        EntityKind::Buff,
        101,
        ReverseData::Nice,
        ReverseContext::new(true, ReverseDepth::Servant, ReverseData::Basic),
    )
    .expect("hydration should succeed");

    assert!(!buff.body.is_basic());
    let functions = list(&buff, EntityKind::Function);
    assert_eq!(ids(functions), vec![201]);
    assert!(functions[0].body.is_basic());
    assert!(functions[0].reverse.is_none());
}

#[test]
fn basic_entities_are_leaves_at_every_depth() {
    let snapshot = fixture_snapshot();
    for (kind, id) in [
        (EntityKind::Buff, 101),
        (EntityKind::Function, 201),
        (EntityKind::Skill, 302),
        (EntityKind::NoblePhantasm, 401),
    ] {
        let root = get_entity(
            &snapshot,
            kind,
            id,
            ReverseData::Nice,
            ReverseContext::new(true, ReverseDepth::Servant, ReverseData::Basic),
        )
        .expect("hydration should succeed");
        let below = descendants(&root);
        assert!(!below.is_empty(), "{kind} {id} should have reverse references");
        for entity in below {
            assert!(entity.body.is_basic());
            assert!(entity.reverse.as_ref().map_or(true, ReverseSlot::is_empty));
        }
    }
}

#[test]
fn basic_root_forces_basic_children() {
    let snapshot = fixture_snapshot();
    let skill = get_entity(
        &snapshot,
        EntityKind::Skill,
        301,
        ReverseData::Basic,
        ReverseContext::new(true, ReverseDepth::Servant, ReverseData::Nice),
    )
    .expect("hydration should succeed");

    assert!(skill.body.is_basic());
    let servants = list(&skill, EntityKind::Servant);
    assert_eq!(ids(servants), vec![100100]);
    assert!(servants.iter().all(|servant| servant.body.is_basic()));
}

#[test]
fn active_and_passive_owners_are_merged() {
    let snapshot = fixture_snapshot();
    let skill = nice(&snapshot, EntityKind::Skill, 302, ReverseDepth::Servant);
    assert_eq!(ids(list(&skill, EntityKind::Servant)), vec![100200]);
}

#[test]
fn mystic_code_and_command_code_owners() {
    let snapshot = fixture_snapshot();
    let mystic = nice(&snapshot, EntityKind::Skill, 303, ReverseDepth::Servant);
    assert_eq!(ids(list(&mystic, EntityKind::MysticCode)), vec![1]);
    assert!(list(&mystic, EntityKind::Servant).is_empty());

    let command = nice(&snapshot, EntityKind::Skill, 304, ReverseDepth::Servant);
    assert_eq!(ids(list(&command, EntityKind::CommandCode)), vec![5001]);
}

#[test]
fn function_root_at_function_depth_has_nothing_to_expand() {
    let snapshot = fixture_snapshot();
    let function = nice(&snapshot, EntityKind::Function, 201, ReverseDepth::Function);
    assert!(function.reverse.is_none());
}

#[test]
fn unknown_id_is_not_found() {
    let snapshot = fixture_snapshot();
    let err = get_entity(
        &snapshot,
        EntityKind::Buff,
        999,
        ReverseData::Nice,
        ReverseContext::none(EntityKind::Buff),
    )
    .expect_err("buff 999 does not exist");
    assert!(matches!(
        err,
        EngineError::NotFound {
            kind: EntityKind::Buff,
            id: 999
        }
    ));
}

#[test]
fn overcharge_series_are_omitted_when_empty() {
    let snapshot = fixture_snapshot();
    let np = get_entity(
        &snapshot,
        EntityKind::NoblePhantasm,
        401,
        ReverseData::Nice,
        ReverseContext::none(EntityKind::NoblePhantasm),
    )
    .expect("hydration should succeed");
    let value = serde_json::to_value(&np).expect("serialize");

    assert_eq!(value["npGauge"], serde_json::json!([100, 100]));
    let damage = &value["functions"][0];
    assert_eq!(damage["funcType"], "damageNp");
    assert_eq!(damage["svals"][1]["Value"], 5000);
    assert_eq!(damage["svals2"][0]["Value"], 4000);
    assert!(damage.get("svals3").is_none());
    assert!(value.get("reverse").is_none());
}

#[test]
fn skill_levels_decode_in_order() {
    let snapshot = fixture_snapshot();
    let skill = get_entity(
        &snapshot,
        EntityKind::Skill,
        301,
        ReverseData::Nice,
        ReverseContext::none(EntityKind::Skill),
    )
    .expect("hydration should succeed");
    let value = serde_json::to_value(&skill).expect("serialize");

    assert_eq!(value["coolDown"], serde_json::json!([7, 6]));
    let function = &value["functions"][0];
    assert_eq!(function["buffs"][0]["id"], 101);
    assert_eq!(function["svals"][0]["Value"], 100);
    assert_eq!(function["svals"][1]["Value"], 200);
}

#[test]
fn dangling_index_source_is_a_data_defect() {
    let mut tables = load_region(&fixture_dir(), Region::Jp).expect("fixture tables should load");
    tables.skills.retain(|skill| skill.id != 301);
    let snapshot = MasterSnapshot::from_tables(Region::Jp, tables);

    let err = get_entity(
        &snapshot,
        EntityKind::Function,
        201,
        ReverseData::Nice,
        ReverseContext::new(true, ReverseDepth::SkillNp, ReverseData::Nice),
    )
    .expect_err("skill 301 is indexed but missing");
    assert!(matches!(
        err,
        EngineError::MissingSource {
            kind: EntityKind::Skill,
            id: 301
        }
    ));
}

#[test]
fn short_level_row_keeps_overcharge_series_aligned() {
    let mut tables = load_region(&fixture_dir(), Region::Jp).expect("fixture tables should load");
    for level in &mut tables.noble_phantasm_levels {
        if level.lv == 1 {
            level.svals.truncate(1);
        }
    }
    let snapshot = MasterSnapshot::from_tables(Region::Jp, tables);

    let np = get_entity(
        &snapshot,
        EntityKind::NoblePhantasm,
        401,
        ReverseData::Nice,
        ReverseContext::none(EntityKind::NoblePhantasm),
    )
    .expect("hydration should succeed");
    let value = serde_json::to_value(&np).expect("serialize");

    assert_eq!(value["npGauge"], serde_json::json!([100, 100]));
    let attack_up = &value["functions"][1];
    assert_eq!(attack_up["funcId"], 201);
    assert_eq!(
        attack_up["svals"],
        serde_json::json!([{}, {"Rate": 1000, "Turn": 3, "Count": -1, "Value": 100}])
    );
    assert_eq!(attack_up["svals2"][0]["Value"], 150);
    assert_eq!(attack_up["svals2"][1]["Value"], 150);
    assert!(attack_up.get("svals3").is_none());
}
