// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for scoreparts
//!
//! These tests verify that the store, the mutation engine, the
//! notification router and the catalog work together correctly.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use scoreparts::command::{dispatch, order_choices, PartsAction};
use scoreparts::config::{CatalogFile, ScoreFile};
use scoreparts::model::{Instrument, StaffType, VOICES};
use scoreparts::{
    EntityStore, FileInstrumentsRepository, InsertMode, InstrumentsMeta, InstrumentsRepository,
    NotationParts, PartId, PartInstrument, PartsError, Staff, StaffId, StaticInstrumentsRepository,
    UndoHistory,
};

fn demo_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

fn demo_meta() -> InstrumentsMeta {
    CatalogFile::load(demo_path("catalog.yaml")).unwrap().to_meta()
}

fn instrument(meta: &InstrumentsMeta, id: &str) -> Instrument {
    meta.instrument(id).unwrap().clone()
}

/// Roster built from catalog instruments, in the given order
fn roster(meta: &InstrumentsMeta, ids: &[&str]) -> (EntityStore, Vec<PartId>) {
    let mut store = EntityStore::new();
    let mut part_ids = Vec::new();
    for id in ids {
        let (part, staves) = scoreparts::Part::from_instrument(instrument(meta, id));
        part_ids.push(store.insert_part(part, staves).unwrap());
    }
    (store, part_ids)
}

fn ids<U: scoreparts::UndoStack>(parts: &NotationParts<U>) -> Vec<PartId> {
    parts.part_list().iter().map(|p| p.id()).collect()
}

/// Test the pinned orchestral fixture: strings rank violins above cellos
#[test]
fn test_orchestral_fixture() {
    let meta = demo_meta();
    let repository = StaticInstrumentsRepository::new(meta.clone());
    let (store, part_ids) = roster(&meta, &["violoncello", "violin"]);
    let (cello, violin) = (part_ids[0], part_ids[1]);

    let mut parts = NotationParts::new(store);
    parts.set_part_name(violin, "Violin I").unwrap();
    parts.set_score_order_by_id(&repository, "orchestral").unwrap();
    assert_eq!(ids(&parts), vec![violin, cello]);

    // Already in order: no structural delta and no events
    let structure = parts.subscribe_structure();
    parts.set_score_order_by_id(&repository, "orchestral").unwrap();
    assert_eq!(ids(&parts), vec![violin, cello]);
    assert!(structure.try_recv().is_none());
}

/// Test that setScoreOrder applied twice records one transaction
#[test]
fn test_score_order_idempotent() {
    let meta = demo_meta();
    let (store, _) = roster(&meta, &["contrabass", "flute", "piano", "violin", "horn"]);
    let order = meta.score_order("orchestral").unwrap().clone();
    let mut parts = NotationParts::with_history(store);

    parts.set_score_order(order.clone()).unwrap();
    let snapshot = parts.store().clone();
    let roster_events = parts.subscribe_part_list();
    parts.set_score_order(order).unwrap();

    assert_eq!(parts.store(), &snapshot);
    assert!(roster_events.try_recv().is_none());
    assert_eq!(parts.undo_stack().undo_depth(), 1);

    let names: Vec<&str> = parts.part_list().iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["Flute", "Horn in F", "Piano", "Violin", "Contrabass"]);
}

/// Test unknown families keep their prior relative position at the end
#[test]
fn test_unknown_families_trail() {
    let meta = demo_meta();
    let (mut store, _) = roster(&meta, &["violin", "flute"]);
    let kazoo = Instrument::new("kazoo", "Kazoo").with_family("novelty");
    let (kazoo, staves) = scoreparts::Part::from_instrument(kazoo);
    let kazoo = store.insert_part(kazoo, staves).unwrap();
    let theremin = Instrument::new("theremin", "Theremin").with_family("electronic");
    let (theremin, staves) = scoreparts::Part::from_instrument(theremin);
    let theremin = store.insert_part(theremin, staves).unwrap();

    let mut parts = NotationParts::new(store);
    parts.move_parts(&[theremin], kazoo, InsertMode::Before).unwrap();
    parts
        .set_score_order(meta.score_order("marching-band").unwrap().clone())
        .unwrap();

    let order = ids(&parts);
    assert_eq!(&order[2..], &[theremin, kazoo]);
}

/// Test removeParts with an unknown id commits once and signals once
#[test]
fn test_remove_parts_soft_skip() {
    let meta = demo_meta();
    let (store, part_ids) = roster(&meta, &["violin", "viola"]);
    let mut parts = NotationParts::with_history(store);
    let structure = parts.subscribe_structure();

    let removed = parts.remove_parts(&[part_ids[0], PartId::from_raw(u64::MAX)]);
    assert_eq!(removed, vec![part_ids[0]]);
    assert_eq!(ids(&parts), vec![part_ids[1]]);
    assert_eq!(parts.undo_stack().undo_depth(), 1);
    assert_eq!(structure.recv_all().len(), 1);
}

/// Test removeParts then setParts with an equivalent roster rebuilds an equivalent tree
#[test]
fn test_remove_then_set_parts_reconstructs() {
    let meta = demo_meta();
    let (store, part_ids) = roster(&meta, &["flute", "piano", "violoncello"]);
    let mut parts = NotationParts::new(store);

    let shape = |parts: &NotationParts| -> Vec<(String, usize, Vec<StaffType>)> {
        parts
            .part_list()
            .iter()
            .map(|p| {
                let types = parts
                    .staff_list(p.id())
                    .unwrap()
                    .iter()
                    .map(|s| s.staff_type())
                    .collect();
                (p.name().to_string(), p.staves().len(), types)
            })
            .collect()
    };
    let before = shape(&parts);
    let entries: Vec<PartInstrument> = parts
        .part_list()
        .iter()
        .map(|p| PartInstrument::new(p.primary_instrument().unwrap().clone()))
        .collect();

    parts.remove_parts(&part_ids);
    assert!(parts.part_list().is_empty());
    parts.set_parts(entries).unwrap();

    assert_eq!(shape(&parts), before);
    assert!(ids(&parts).iter().all(|id| !part_ids.contains(id)));
    assert!(parts.store().check_invariants().is_ok());
}

/// Test moveParts Before then After flips position and keeps relative order
#[test]
fn test_move_before_after_law() {
    let meta = demo_meta();
    let (store, p) = roster(&meta, &["flute", "oboe", "clarinet", "horn", "trumpet", "violin"]);
    let mut parts = NotationParts::new(store);
    let moved = [p[4], p[0]];
    let destination = p[2];

    parts.move_parts(&moved, destination, InsertMode::Before).unwrap();
    assert_eq!(ids(&parts), vec![p[1], p[0], p[4], p[2], p[3], p[5]]);

    parts.move_parts(&moved, destination, InsertMode::After).unwrap();
    assert_eq!(ids(&parts), vec![p[1], p[2], p[0], p[4], p[3], p[5]]);
}

/// Test a removed staff's scope cannot be subscribed again
#[test]
fn test_removed_staff_scope() {
    let meta = demo_meta();
    let (store, part_ids) = roster(&meta, &["piano"]);
    let mut parts = NotationParts::new(store);
    let staff_id = parts.part(part_ids[0]).unwrap().staves()[1];
    let subscription = parts.subscribe_staff(staff_id).unwrap();

    parts.remove_staves(&[staff_id]);
    assert!(subscription.is_closed());
    assert_eq!(
        parts.subscribe_staff(staff_id).unwrap_err(),
        PartsError::StaffNotFound(staff_id)
    );
}

/// Test appendStaff followed by cloneStaff
#[test]
fn test_append_and_clone_staff() {
    let meta = demo_meta();
    let (store, part_ids) = roster(&meta, &["piano"]);
    let piano = part_ids[0];
    let mut parts = NotationParts::new(store);
    let second = parts.part(piano).unwrap().staves()[1];

    let detached = Staff::new()
        .with_type(StaffType::Tab4Simple)
        .with_cutaway(true)
        .with_visible(false);
    let detached_id = detached.id();
    assert_eq!(parts.append_staff(detached, piano).unwrap(), detached_id);
    parts.clone_staff(detached_id, second).unwrap();

    let staff = parts.staff(second).unwrap();
    assert_eq!(staff.id(), second);
    assert_eq!(staff.staff_type(), StaffType::Tab4Simple);
    assert!(staff.config().cutaway);
    assert!(!staff.is_visible());
    assert_eq!(parts.part(piano).unwrap().staves().last(), Some(&detached_id));
}

/// Test notification delivery runs innermost to outermost
#[test]
fn test_notification_scopes() {
    let meta = demo_meta();
    let (store, part_ids) = roster(&meta, &["violin", "piano"]);
    let violin = part_ids[0];
    let mut parts = NotationParts::new(store);
    let staff_id = parts.part(violin).unwrap().staves()[0];

    let staff = parts.subscribe_staff(staff_id).unwrap();
    let staves = parts.subscribe_staff_list(violin, "violin").unwrap();
    let instruments = parts.subscribe_instrument_list(violin).unwrap();
    let roster_events = parts.subscribe_part_list();
    let structure = parts.subscribe_structure();

    parts.set_voice_visible(staff_id, 0, false).unwrap();
    assert_eq!(staff.recv_all().len(), 1);
    assert_eq!(staves.recv_all().len(), 1);
    assert!(instruments.try_recv().is_none());
    assert!(roster_events.try_recv().is_none());
    assert_eq!(structure.recv_all().len(), 1);

    parts
        .set_instrument_name(violin, &"violin".into(), "Violin I")
        .unwrap();
    assert_eq!(instruments.try_recv().unwrap()[0].1.name(), "Violin I");
    assert_eq!(roster_events.try_recv().unwrap()[0].name(), "Violin I");
    assert_eq!(structure.recv_all().len(), 1);

    drop(staff);
    parts.set_staff_visible(staff_id, false).unwrap();
    assert_eq!(staves.recv_all().len(), 1);
}

/// Test undo and redo across several kinds of edits
#[test]
fn test_undo_redo_roundtrip() {
    let meta = demo_meta();
    let (store, part_ids) = roster(&meta, &["violoncello", "violin", "snare-drum"]);
    let original = store.clone();
    let mut parts: NotationParts<UndoHistory> = NotationParts::with_history(store);

    parts.set_score_order(meta.score_order("orchestral").unwrap().clone()).unwrap();
    parts.remove_parts(&[part_ids[2]]);
    let staff_id = parts.part(part_ids[0]).unwrap().staves()[0];
    parts.set_staff_type(staff_id, StaffType::Tab6Simple).unwrap();
    let edited = parts.store().clone();

    assert_eq!(parts.undo_stack().undo_depth(), 3);
    while parts.undo() {}
    assert_eq!(parts.store(), &original);
    while parts.redo() {}
    assert_eq!(parts.store(), &edited);
}

/// Test ownership invariants hold after every commit of a random edit run
#[test]
fn test_random_edits_keep_ownership() {
    let meta = demo_meta();
    let pool = ["flute", "oboe", "horn", "piano", "harp", "violin", "viola", "snare-drum"];
    let (store, _) = roster(&meta, &pool);
    let mut parts = NotationParts::with_history(store);
    let orders: Vec<_> = meta.score_orders.clone();
    let mut rng = StdRng::seed_from_u64(0x5c0e);

    for step in 0..400 {
        let part_ids = ids(&parts);
        let staff_ids: Vec<StaffId> = parts.store().staff_ids();
        let pick_part = |rng: &mut StdRng| {
            if part_ids.is_empty() || rng.gen_bool(0.05) {
                PartId::from_raw(u64::MAX)
            } else {
                part_ids[rng.gen_range(0..part_ids.len())]
            }
        };
        let pick_staff = |rng: &mut StdRng| {
            if staff_ids.is_empty() || rng.gen_bool(0.05) {
                StaffId::from_raw(u64::MAX)
            } else {
                staff_ids[rng.gen_range(0..staff_ids.len())]
            }
        };

        match rng.gen_range(0..10) {
            0 => {
                let id = pool[rng.gen_range(0..pool.len())];
                let mut entries: Vec<PartInstrument> = parts
                    .part_list()
                    .iter()
                    .filter(|_| rng.gen_bool(0.8))
                    .map(|p| {
                        let primary = p.primary_instrument().unwrap().clone();
                        PartInstrument::existing(p.id(), primary)
                    })
                    .collect();
                entries.push(PartInstrument::new(instrument(&meta, id)));
                parts.set_parts(entries).unwrap();
            }
            1 => {
                let order = orders[rng.gen_range(0..orders.len())].clone();
                parts.set_score_order(order).unwrap();
            }
            2 => {
                let victim = pick_part(&mut rng);
                parts.remove_parts(&[victim]);
            }
            3 => {
                let selection = [pick_part(&mut rng), pick_part(&mut rng)];
                let mode = if rng.gen_bool(0.5) { InsertMode::Before } else { InsertMode::After };
                let _ = parts.move_parts(&selection, pick_part(&mut rng), mode);
            }
            4 => {
                let selection = [pick_staff(&mut rng)];
                let mode = if rng.gen_bool(0.5) { InsertMode::Before } else { InsertMode::After };
                let _ = parts.move_staves(&selection, pick_staff(&mut rng), mode);
            }
            5 => {
                parts.remove_staves(&[pick_staff(&mut rng)]);
            }
            6 => {
                let _ = parts.append_staff(Staff::new(), pick_part(&mut rng));
            }
            7 => {
                let _ = parts.clone_staff(pick_staff(&mut rng), pick_staff(&mut rng));
            }
            8 => {
                let voice = rng.gen_range(0..VOICES);
                let _ = parts.set_voice_visible(pick_staff(&mut rng), voice, rng.gen_bool(0.5));
            }
            _ => {
                let _ = parts.set_part_visible(pick_part(&mut rng), rng.gen_bool(0.5));
            }
        }

        if let Err(problem) = parts.store().check_invariants() {
            panic!("step {}: {}", step, problem);
        }
        for staff_id in parts.store().staff_ids() {
            let owner = parts.staff(staff_id).unwrap().part().unwrap();
            let listed = parts
                .part_list()
                .iter()
                .filter(|p| p.staves().contains(&staff_id))
                .count();
            assert_eq!(listed, 1);
            assert!(parts.part(owner).unwrap().staves().contains(&staff_id));
        }
        for staff_id in parts.store().staff_ids() {
            let staff = parts.staff(staff_id).unwrap();
            if !staff.config().voices_visible.iter().any(|v| *v) {
                assert!(!staff.is_visible());
            }
        }
    }

    while parts.undo() {
        assert!(parts.store().check_invariants().is_ok());
    }
}

/// Test a score file builds a store that the parts manager can edit
#[test]
fn test_demo_score_loads() {
    let meta = demo_meta();
    let score = ScoreFile::load(demo_path("score.yaml")).unwrap();
    let store = score.build_store(&meta).unwrap();
    let mut parts = NotationParts::new(store);

    let names: Vec<&str> = parts.part_list().iter().map(|p| p.name()).collect();
    assert_eq!(
        names,
        vec!["Violoncello", "Violin I", "Violin II", "Flute & Oboe", "Piano", "Snare Drum"]
    );
    assert_eq!(parts.store().excerpts()[0].name(), "Strings");

    parts.set_active_excerpt(Some(0)).unwrap();
    assert_eq!(parts.available_parts().len(), 3);
    parts.set_active_excerpt(None).unwrap();

    let repository = StaticInstrumentsRepository::new(meta);
    parts.set_score_order_by_id(&repository, "orchestral").unwrap();
    let names: Vec<&str> = parts.part_list().iter().map(|p| p.name()).collect();
    assert_eq!(
        names,
        vec!["Flute & Oboe", "Snare Drum", "Piano", "Violin I", "Violin II", "Violoncello"]
    );
}

/// Test commands flow through the file-backed repository
#[test]
fn test_commands_with_file_repository() {
    let repository = FileInstrumentsRepository::new(demo_path("catalog.yaml"));
    let meta = repository.instruments_meta().unwrap();
    let (store, part_ids) = roster(&meta, &["violoncello", "violin", "flute"]);
    let mut parts = NotationParts::new(store);

    let action = PartsAction::parse("set-order", &["orchestral"]).unwrap();
    dispatch(&mut parts, &repository, &action).unwrap();
    assert_eq!(ids(&parts), vec![part_ids[2], part_ids[1], part_ids[0]]);

    let choices = order_choices(&repository, parts.store().score_order());
    let checked: Vec<&str> = choices.iter().filter(|c| c.checked).map(|c| c.id.as_str()).collect();
    assert_eq!(checked, vec!["orchestral"]);

    let flute = part_ids[2].to_string();
    let action = PartsAction::parse("remove-parts", &[flute.as_str()]).unwrap();
    dispatch(&mut parts, &repository, &action).unwrap();
    assert_eq!(parts.part_list().len(), 2);
}
