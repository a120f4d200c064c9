//! Integration tests for the file-level tool operations.

use std::fs;

use drawkit::{
    DiagramStore, DiagramTools, DrawkitError, LayoutRequest, NewEdge, NewNode, NodeEdit,
    ShapeKind,
    config::{AppConfig, BatchMode, EditingConfig, LayoutConfig},
};
use drawkit_codec::from_xml;
use drawkit_core::Id;
use tempfile::tempdir;

fn xml_of(tools: &DiagramTools, path: &str) -> String {
    let output = tools.get_diagram_info(path).expect("diagram info");
    output
        .message()
        .strip_prefix("Graph xml representation: \n")
        .expect("info prefix")
        .to_string()
}

#[test]
fn test_new_add_link_info() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("e2e.drawio.svg").display().to_string();
    let mut tools = DiagramTools::default();

    tools.new_diagram(&path).unwrap();
    tools
        .add_nodes(
            &path,
            &[
                NewNode::new("a").with_kind(ShapeKind::Rectangle).at(0.0, 0.0),
                NewNode::new("b").with_kind(ShapeKind::Rectangle).at(200.0, 0.0),
            ],
            None,
        )
        .unwrap();
    tools.link_nodes(&path, &[NewEdge::new("a", "b")]).unwrap();

    let xml = xml_of(&tools, &path);
    assert_eq!(xml.matches("vertex=\"1\"").count(), 2);
    assert_eq!(xml.matches("edge=\"1\"").count(), 1);
    assert!(xml.contains("source=\"a\" target=\"b\""));

    let graph = from_xml(&xml).unwrap();
    let edge = graph.cell(Id::new("a-2-b")).and_then(|cell| cell.as_edge()).unwrap();
    assert_eq!(edge.source(), Id::new("a"));
    assert_eq!(edge.target(), Id::new("b"));
}

#[test]
fn test_file_is_an_svg_image() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("image.drawio.svg").display().to_string();
    let mut tools = DiagramTools::default();

    tools.new_diagram(&path).unwrap();
    tools
        .add_nodes(&path, &[NewNode::new("a").with_size(100.0, 50.0)], None)
        .unwrap();

    let svg = fs::read_to_string(&path).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("content=\""));
    assert!(svg.contains("viewBox=\"9.5 9.5 101 51\""));
}

#[test]
fn test_edit_missing_leaves_file_untouched() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("edit.drawio.svg").display().to_string();
    let mut tools = DiagramTools::default();
    tools.new_diagram(&path).unwrap();
    tools.add_nodes(&path, &[NewNode::new("a")], None).unwrap();
    let before = fs::read_to_string(&path).unwrap();

    let err = tools
        .edit_nodes(&path, &[NodeEdit::new("missing-id").with_label("x")])
        .unwrap_err();

    assert!(matches!(err, DrawkitError::NotFound(_)));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_removing_edge_keeps_its_endpoints() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("remove.drawio.svg").display().to_string();
    let mut tools = DiagramTools::default();
    tools.new_diagram(&path).unwrap();
    tools
        .add_nodes(&path, &[NewNode::new("n1"), NewNode::new("n2")], None)
        .unwrap();
    tools.link_nodes(&path, &[NewEdge::new("n1", "n2")]).unwrap();

    tools.remove_nodes(&path, &["n1-2-n2"]).unwrap();

    let stats = tools.diagram_stats(&path);
    assert_eq!((stats.node_count, stats.edge_count), (2, 0));
}

#[test]
fn test_cascade_policy_from_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cascade.drawio.svg").display().to_string();
    let mut tools = DiagramTools::new(&AppConfig::new(
        LayoutConfig::default(),
        EditingConfig::new(BatchMode::AllOrNothing, true),
    ));
    tools.new_diagram(&path).unwrap();
    tools
        .add_nodes(&path, &[NewNode::new("a"), NewNode::new("b")], None)
        .unwrap();
    tools.link_nodes(&path, &[NewEdge::new("a", "b")]).unwrap();

    tools.remove_nodes(&path, &["a"]).unwrap();

    let graph = DiagramStore::load(&path).unwrap();
    assert_eq!(graph.vertex_count(), 1);
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_layout_every_algorithm_on_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("layout.drawio.svg").display().to_string();
    let mut tools = DiagramTools::default();
    tools.new_diagram(&path).unwrap();
    tools
        .add_nodes(
            &path,
            &[NewNode::new("a"), NewNode::new("b"), NewNode::new("c")],
            None,
        )
        .unwrap();
    tools
        .link_nodes(&path, &[NewEdge::new("a", "b"), NewEdge::new("a", "c")])
        .unwrap();

    for algorithm in drawkit::Algorithm::ALL {
        let output = tools
            .apply_layout(&path, &LayoutRequest::new(algorithm.name()))
            .unwrap();
        assert!(
            output.message().contains("to 3 nodes"),
            "{algorithm}: {output}"
        );
        assert_eq!(tools.diagram_stats(&path).node_count, 3);
    }
}

#[test]
fn test_unknown_algorithm_lists_supported_ones() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("unknown.drawio.svg").display().to_string();
    let mut tools = DiagramTools::default();
    tools.new_diagram(&path).unwrap();

    let err = tools
        .apply_layout(&path, &LayoutRequest::new("spiral"))
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("spiral"));
    assert!(message.contains("radial-tree"));
}

#[test]
fn test_corrupt_file_is_malformed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corrupt.drawio.svg");
    fs::write(&path, r#"<svg content="&lt;mxfile&gt;&lt;diagram&gt;!!!&lt;/diagram&gt;&lt;/mxfile&gt;"/>"#)
        .unwrap();

    let err = DiagramTools::default()
        .get_diagram_info(&path.display().to_string())
        .unwrap_err();
    assert!(matches!(err, DrawkitError::MalformedDocument(_)));
}
