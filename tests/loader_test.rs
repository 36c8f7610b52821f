use crate::common::test_utils::box_object;
use flow_showroom::{
    catalog::AssetDescriptor,
    loader::{Completion, SelectionLoader},
    resources::LoadError,
};

mod common;

fn descriptors(names: &[&str]) -> Vec<AssetDescriptor> {
    names
        .iter()
        .map(|name| AssetDescriptor::obj_pair(name, name))
        .collect()
}

fn fetch_error(path: &str) -> LoadError {
    LoadError::Fetch {
        path: path.to_string(),
        reason: "not found".to_string(),
    }
}

#[test]
fn should_tag_requests_with_generation_and_slot() {
    let mut loader = SelectionLoader::new();
    let requests = loader.begin(descriptors(&["a", "b"]));
    assert_eq!(loader.generation(), 1);
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].generation, 1);
    assert_eq!(requests[1].slot, 1);
    assert_eq!(requests[1].descriptor.display_name, "b");
    assert_eq!(loader.remaining(), 2);
}

#[test]
fn should_deliver_in_request_order_when_completed_out_of_order() {
    let mut loader = SelectionLoader::new();
    loader.begin(descriptors(&["first", "second", "third"]));

    let unit = [1.0, 1.0, 1.0];
    assert!(matches!(
        loader.complete(1, 2, Ok(box_object("third", [0.0; 3], unit))),
        Completion::Pending { remaining: 2 }
    ));
    assert!(matches!(
        loader.complete(1, 0, Ok(box_object("first", [0.0; 3], unit))),
        Completion::Pending { remaining: 1 }
    ));
    match loader.complete(1, 1, Ok(box_object("second", [0.0; 3], unit))) {
        Completion::Ready {
            generation,
            objects,
            failures,
        } => {
            assert_eq!(generation, 1);
            assert_eq!(failures, 0);
            let names: Vec<&str> = objects.iter().map(|o| o.name.as_str()).collect();
            assert_eq!(names, ["first", "second", "third"]);
        }
        other => panic!("expected a finished selection, got {other:?}"),
    }
}

#[test]
fn should_count_failures_and_skip_their_slots() {
    let mut loader = SelectionLoader::new();
    loader.begin(descriptors(&["ok", "broken"]));
    loader.complete(1, 1, Err(fetch_error("broken.obj")));
    match loader.complete(1, 0, Ok(box_object("ok", [0.0; 3], [1.0; 3]))) {
        Completion::Ready {
            objects, failures, ..
        } => {
            assert_eq!(objects.len(), 1);
            assert_eq!(failures, 1);
        }
        other => panic!("expected a finished selection, got {other:?}"),
    }
}

#[test]
fn should_finish_with_no_objects_when_everything_fails() {
    let mut loader = SelectionLoader::new();
    loader.begin(descriptors(&["gone"]));
    match loader.complete(1, 0, Err(fetch_error("gone.obj"))) {
        Completion::Ready {
            objects, failures, ..
        } => {
            assert!(objects.is_empty());
            assert_eq!(failures, 1);
        }
        other => panic!("expected a finished selection, got {other:?}"),
    }
}

#[test]
fn should_discard_completions_of_superseded_selection() {
    let mut loader = SelectionLoader::new();
    loader.begin(descriptors(&["old"]));
    loader.begin(descriptors(&["new"]));
    assert_eq!(loader.generation(), 2);

    assert!(matches!(
        loader.complete(1, 0, Ok(box_object("old", [0.0; 3], [1.0; 3]))),
        Completion::Stale
    ));
    assert_eq!(loader.remaining(), 1);
    assert!(matches!(
        loader.complete(2, 0, Ok(box_object("new", [0.0; 3], [1.0; 3]))),
        Completion::Ready { generation: 2, .. }
    ));
}

#[test]
fn should_ignore_duplicate_and_unknown_slots() {
    let mut loader = SelectionLoader::new();
    loader.begin(descriptors(&["a", "b"]));
    loader.complete(1, 0, Err(fetch_error("a.obj")));
    assert!(matches!(
        loader.complete(1, 0, Ok(box_object("a", [0.0; 3], [1.0; 3]))),
        Completion::Duplicate
    ));
    assert!(matches!(
        loader.complete(1, 9, Ok(box_object("z", [0.0; 3], [1.0; 3]))),
        Completion::Duplicate
    ));
    assert_eq!(loader.remaining(), 1);
}

#[test]
fn should_deliver_a_selection_only_once() {
    let mut loader = SelectionLoader::new();
    loader.begin(descriptors(&["a"]));
    assert!(matches!(
        loader.complete(1, 0, Ok(box_object("a", [0.0; 3], [1.0; 3]))),
        Completion::Ready { .. }
    ));
    assert!(matches!(
        loader.complete(1, 0, Ok(box_object("a", [0.0; 3], [1.0; 3]))),
        Completion::Stale
    ));
}

#[test]
fn should_report_empty_selection_as_ready_once() {
    let mut loader = SelectionLoader::new();
    assert!(loader.poll_empty().is_none());
    let requests = loader.begin(Vec::new());
    assert!(requests.is_empty());
    assert!(matches!(
        loader.poll_empty(),
        Some(Completion::Ready { generation: 1, ref objects, failures: 0 }) if objects.is_empty()
    ));
    assert!(loader.poll_empty().is_none());
}
