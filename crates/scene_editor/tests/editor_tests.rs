//! End-to-end editing scenarios for scene_editor

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use scene_editor::*;
use scene_graph::{NodeFragment, NodeId, SceneTree};

fn document() -> SceneDocument {
    SceneDocument::new_untitled(scene_schema::builtin()).unwrap()
}

fn mesh(name: &str) -> Payload {
    Payload::from(NodeFragment::new("bitBox:MeshNode").with_attribute("name", name))
}

fn editable_names(context: &SceneEditingContext) -> Vec<String> {
    let graph = context.graph().unwrap();
    graph
        .subtree(context.root().unwrap())
        .filter(|id| graph.is_editable(*id))
        .filter_map(|id| graph.name(id).map(str::to_string))
        .collect()
}

/// SCENARIO: new document, one pasted mesh
#[test]
fn scenario_new_document() {
    let mut doc = document();
    doc.context_mut().insert(&mesh("Cube")).unwrap();

    let ctx = doc.context();
    let items = ctx.items();
    assert_eq!(items.len(), 1);
    assert_eq!(ctx.graph().unwrap().node_type(items[0]).unwrap().short_name(), "MeshNode");
    assert_eq!(ctx.label(items[0]), Some("Cube"));
}

/// SCENARIO: copy then paste collides and gets a suffix
#[test]
fn scenario_name_collision_on_paste() {
    let mut doc = document();
    let ctx = doc.context_mut();
    let cube = ctx.insert(&mesh("Cube")).unwrap()[0];

    ctx.set_selection([cube]);
    let payload = ctx.copy().unwrap();
    let pasted = ctx.insert(&payload).unwrap()[0];

    assert_eq!(ctx.label(cube), Some("Cube"));
    assert_eq!(ctx.label(pasted), Some("Cube1"));
    assert_eq!(ctx.selection().nodes(), &[pasted]);
}

/// SCENARIO: the text export omits default attributes
#[test]
fn scenario_export_skips_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let mut doc = document();
    let cube = doc.context_mut().insert(&mesh("Cube")).unwrap()[0];
    doc.context_mut().set_attribute(cube, "material", "metal").unwrap();

    let path = dir.path().join("level.scene");
    doc.export_to(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();

    assert!(text.contains("@MeshNode Cube\n"));
    assert!(text.contains("$material \"metal\"\n"));
    assert!(!text.contains("$scale"));
}

/// SCENARIO: delete removes every selected node and clears the selection
#[test]
fn scenario_delete_clears_selection() {
    let mut doc = document();
    let ctx = doc.context_mut();
    let a = ctx.insert(&mesh("a")).unwrap()[0];
    let b = ctx.insert(&mesh("b")).unwrap()[0];
    let c = ctx.insert(&mesh("c")).unwrap()[0];

    ctx.set_selection([a, c]);
    ctx.delete().unwrap();

    assert_eq!(ctx.items(), &[b]);
    assert!(ctx.selection().is_empty());
}

/// INVARIANT: reported view indices match the children projection
#[test]
fn invariant_event_index_fidelity() {
    let mut doc = document();
    let ctx = doc.context_mut();
    let root = ctx.root().unwrap();
    let a = ctx.insert(&mesh("a")).unwrap()[0];
    ctx.insert(&mesh("b")).unwrap();

    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    ctx.observe(move |e| sink.borrow_mut().push(e.clone()));

    let inserted = ctx.insert_between(root, Some(a), &mesh("middle")).unwrap()[0];
    assert_eq!(ctx.items()[1], inserted);
    assert_eq!(
        events.borrow()[0],
        ContextEvent::ItemInserted {
            index: 1,
            item: inserted,
            parent: root
        }
    );
}

/// INVARIANT: editable names stay unique across pastes, drops and renames
#[test]
fn invariant_unique_names() {
    let mut doc = document();
    let explorer = SceneExplorer::new();
    let mut palette = NodePalette::new(scene_schema::builtin());
    let mesh_item = palette.items()[2].clone();

    let parent = explorer
        .drag_drop(&mut doc, DropTarget::Root, &mesh("Cube"))
        .unwrap()[0];
    for _ in 0..3 {
        let payload = palette.convert(&mesh_item);
        explorer.drag_drop(&mut doc, DropTarget::Under(parent), &payload).unwrap();
        explorer.drag_drop(&mut doc, DropTarget::Root, &mesh("Cube")).unwrap();
    }

    let ctx = doc.context_mut();
    let items: Vec<NodeId> = ctx.items().to_vec();
    ctx.set_selection(items);
    let payload = ctx.copy().unwrap();
    ctx.insert(&payload).unwrap();

    let last = *ctx.items().last().unwrap();
    ctx.set_attribute(last, "name", "Cube").unwrap();

    let names = editable_names(ctx);
    let unique: HashSet<_> = names.iter().collect();
    assert_eq!(unique.len(), names.len(), "duplicate names in {:?}", names);
}

/// ROUND TRIP: save, reopen, compare
#[test]
fn round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("level.source_scene");

    let mut doc = document();
    let ctx = doc.context_mut();
    let pivot = ctx
        .insert(&Payload::from(
            NodeFragment::new("bitBox:LocatorNode")
                .with_attribute("name", "Pivot")
                .with_attribute("pos", vec![1.0f32, 2.0, 3.5])
                .with_child(NodeFragment::new("bitBox:MeshNode").with_attribute("name", "Body"))
                .with_child(
                    NodeFragment::new("bitBox:MeshNode")
                        .with_attribute("name", "Shadow")
                        .with_attribute("cast_shadows", false),
                ),
        ))
        .unwrap()[0];
    ctx.insert(&mesh("Ground")).unwrap();
    doc.save_as(&path).unwrap();

    let reopened = SceneDocument::open(scene_schema::builtin(), &path).unwrap();
    let original = doc.context().graph().unwrap();
    let read = reopened.context().graph().unwrap();
    assert_eq!(
        read.snapshot(reopened.context().root().unwrap()).unwrap(),
        original.snapshot(doc.context().root().unwrap()).unwrap()
    );
    assert_eq!(doc.context().children(pivot).len(), 2);
}

/// SCENARIO: undo and redo a paste and a rename
#[test]
fn scenario_undo_redo() {
    let mut doc = document();
    let cube = doc
        .do_transaction("Paste", |ctx| ctx.insert(&mesh("Cube")))
        .unwrap()[0];
    doc.do_transaction("Rename", |ctx| ctx.set_attribute(cube, "name", "Box"))
        .unwrap();

    assert!(doc.undo().unwrap());
    assert_eq!(doc.context().label(cube), Some("Cube"));
    assert_eq!(doc.history().redo_description(), Some("Rename"));

    assert!(doc.undo().unwrap());
    assert!(doc.context().items().is_empty());
    assert!(!doc.undo().unwrap());

    assert!(doc.redo().unwrap());
    assert!(doc.redo().unwrap());
    assert_eq!(doc.context().items(), &[cube]);
    assert_eq!(doc.context().label(cube), Some("Box"));
}

/// SCENARIO: Export Level writes one file per open scene
#[test]
fn scenario_export_level() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = DocumentRegistry::new();

    for name in ["first", "second"] {
        let mut doc = document();
        doc.context_mut().insert(&mesh(name)).unwrap();
        doc.save_as(dir.path().join(format!("{}.source_scene", name))).unwrap();
        registry.add(OpenDocument::Scene(doc));
    }
    registry.add(OpenDocument::Foreign {
        uri: dir.path().join("notes.txt"),
        type_name: "Text".into(),
    });

    assert!(!SceneCommand::ExportScene.can_do(&registry));
    let written = SceneCommand::ExportLevel.do_command(&registry).unwrap();
    assert_eq!(
        written,
        [dir.path().join("first.scene"), dir.path().join("second.scene")]
    );
    let second = std::fs::read_to_string(&written[1]).unwrap();
    assert_eq!(second, "\n@MeshNode second\n");
}

/// SCENARIO: rebinding replaces the tree and resets naming
#[test]
fn scenario_rebind() {
    let mut ctx = SceneEditingContext::new();
    let reloads = Rc::new(RefCell::new(0));
    let sink = reloads.clone();
    ctx.observe(move |e| {
        if *e == ContextEvent::Reloaded {
            *sink.borrow_mut() += 1;
        }
    });

    ctx.set_root(Some(SceneTree::new(scene_schema::builtin(), "One").unwrap()));
    ctx.insert(&mesh("Cube")).unwrap();
    let old = ctx
        .set_root(Some(SceneTree::new(scene_schema::builtin(), "Two").unwrap()))
        .unwrap();

    assert_eq!(old.graph.name(old.root), Some("One"));
    assert!(ctx.items().is_empty());
    assert_eq!(*reloads.borrow(), 2);

    ctx.insert(&mesh("Cube")).unwrap();
    // Names reserved in the first tree are forgotten
    assert_eq!(ctx.label(ctx.items()[0]), Some("Cube"));
}
