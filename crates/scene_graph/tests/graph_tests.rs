//! Structural invariant tests for scene_graph
//!
//! Every failed mutation must leave the tree exactly as it was.

use scene_graph::*;
use scene_schema::AttributeValue;

fn tree() -> SceneTree {
    SceneTree::new(scene_schema::builtin(), "Scene").unwrap()
}

fn node(tree: &mut SceneTree, ty: &str, name: &str) -> NodeId {
    let id = tree.graph.create_node_by_name(ty).unwrap();
    tree.graph.set_attribute(id, "name", name).unwrap();
    id
}

fn shape(graph: &SceneGraph, root: NodeId) -> Vec<(Option<String>, Option<NodeId>)> {
    graph
        .subtree(root)
        .map(|id| (graph.name(id).map(str::to_string), graph.parent(id)))
        .collect()
}

/// INVARIANT: a node can never be inserted into its own subtree
#[test]
fn invariant_no_cycles() {
    let mut t = tree();
    let a = node(&mut t, "LocatorNode", "a");
    let b = node(&mut t, "LocatorNode", "b");
    let c = node(&mut t, "MeshNode", "c");
    t.graph.append_child(t.root, a).unwrap();
    t.graph.append_child(a, b).unwrap();
    t.graph.append_child(b, c).unwrap();

    let before = shape(&t.graph, t.root);

    assert_eq!(
        t.graph.insert_child(a, "node", 0, a),
        Err(GraphError::Cycle { parent: a, child: a })
    );
    assert_eq!(
        t.graph.insert_child(c, "node", 0, a),
        Err(GraphError::Cycle { parent: c, child: a })
    );
    assert!(matches!(
        t.graph.insert_child(b, "node", 0, a),
        Err(GraphError::Cycle { .. })
    ));

    assert_eq!(shape(&t.graph, t.root), before);
}

/// INVARIANT: the child list reports the requested insertion index
#[test]
fn invariant_index_fidelity() {
    let mut t = tree();
    for name in ["a", "b", "c"] {
        let id = node(&mut t, "MeshNode", name);
        t.graph.append_child(t.root, id).unwrap();
    }

    let inserted = node(&mut t, "LocatorNode", "inserted");
    assert_eq!(t.graph.insert_child(t.root, "node", 2, inserted).unwrap(), 2);

    let names: Vec<_> = t
        .graph
        .children(t.root)
        .iter()
        .filter_map(|id| t.graph.name(*id))
        .collect();
    assert_eq!(names, ["a", "b", "inserted", "c"]);
}

/// INVARIANT: a node has at most one parent
#[test]
fn invariant_single_parent() {
    let mut t = tree();
    let a = node(&mut t, "LocatorNode", "a");
    let b = node(&mut t, "LocatorNode", "b");
    let moved = node(&mut t, "MeshNode", "moved");
    t.graph.append_child(t.root, a).unwrap();
    t.graph.append_child(t.root, b).unwrap();
    t.graph.append_child(a, moved).unwrap();

    t.graph.append_child(b, moved).unwrap();

    assert!(t.graph.children(a).is_empty());
    assert_eq!(t.graph.children(b), &[moved]);
    assert_eq!(t.graph.parent(moved), Some(b));
    let occurrences = t.graph.subtree(t.root).filter(|id| *id == moved).count();
    assert_eq!(occurrences, 1);
}

/// INVARIANT: clones never share state with their source
#[test]
fn invariant_clone_isolation() {
    let mut t = tree();
    let original = node(&mut t, "MeshNode", "Cube");
    t.graph.set_attribute(original, "pos", [1.0, 2.0, 3.0]).unwrap();
    t.graph.append_child(t.root, original).unwrap();

    let copy = t.graph.clone_subtree(original).unwrap();
    t.graph.set_attribute(copy, "pos", [9.0, 9.0, 9.0]).unwrap();
    t.graph.set_attribute(copy, "name", "Copy").unwrap();

    assert_eq!(
        t.graph.attribute(original, "pos").unwrap(),
        &AttributeValue::from([1.0, 2.0, 3.0])
    );
    assert_eq!(t.graph.name(original), Some("Cube"));
    assert_eq!(t.graph.children(t.root), &[original]);

    // Fragments cross graphs without touching the source
    let fragment = t.graph.snapshot(original).unwrap();
    let mut other = tree();
    let pasted = other.graph.instantiate(&fragment).unwrap();
    other.graph.set_attribute(pasted, "material", "stone").unwrap();
    assert_eq!(
        t.graph.attribute(original, "material").unwrap(),
        &AttributeValue::from("")
    );
}

/// INVARIANT: listeners observe events in mutation order
#[test]
fn invariant_events_in_order() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let mut t = tree();
    let a = node(&mut t, "MeshNode", "a");
    let log = Rc::new(RefCell::new(Vec::new()));

    let first = log.clone();
    t.graph.subscribe(move |_, e| first.borrow_mut().push(("first", e.target())));
    let second = log.clone();
    t.graph.subscribe(move |_, e| second.borrow_mut().push(("second", e.target())));

    t.graph.append_child(t.root, a).unwrap();
    t.graph.set_attribute(a, "lod", 3).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            ("first", t.root),
            ("second", t.root),
            ("first", a),
            ("second", a),
        ]
    );
}

/// INVARIANT: unique names survive any sequence of reservations
#[test]
fn invariant_namer_uniqueness() {
    let mut namer = UniqueNamer::new();
    let candidates = ["Cube", "Cube1", "Cube", "Cube2", "Light", "Cube1", "7", "7"];
    let mut seen = std::collections::HashSet::new();
    for candidate in candidates.iter().cycle().take(200) {
        assert!(seen.insert(namer.reserve(candidate)));
    }
}
