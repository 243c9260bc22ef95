//! Integration tests for the DiagramBuilder API

use trellis::{
    DiagramBuilder, TrellisError,
    config::{AppConfig, Settings},
    directive::DirectiveKey,
    model::AssociationKind,
    style::Direction,
};
use trellis_parser::error::ErrorKind;

#[test]
fn test_render_single_edge() {
    let builder = DiagramBuilder::default();
    let diagram = builder.parse("[A]->[B]").expect("Failed to parse diagram");

    let graph = diagram.graph();
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.edge_count(), 1);
    let (_, edge) = graph.edges().next().unwrap();
    assert_eq!(edge.relation().kind(), AssociationKind::Association);

    let svg = builder.render_svg(&diagram);
    assert!(svg.contains("<svg"), "Output should contain SVG tag");
    assert!(svg.contains("</svg>"), "Output should be complete SVG");
    assert_eq!(svg.matches("class=\"node\"").count(), 2);
    assert_eq!(svg.matches("<path").count(), 1);
}

#[test]
fn test_dangling_relation_is_reference_error() {
    let builder = DiagramBuilder::default();
    let result = builder.render("[A]->");

    match result {
        Err(err @ TrellisError::Parse { .. }) => {
            assert_eq!(err.kind(), Some(ErrorKind::Reference));
            assert!(err.location().is_some());
        }
        other => panic!("Expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_nested_box_inside_container() {
    let builder = DiagramBuilder::default();
    let diagram = builder.parse("[A|[B]]").expect("Failed to parse diagram");
    let layout = builder.layout(&diagram);

    let graph = diagram.graph();
    let outer = layout.node(graph.find("A").unwrap()).bounds();
    let inner = layout.node(graph.find("B").unwrap()).bounds();
    assert!(
        outer.inflate(0.01).contains(&inner),
        "{inner:?} should lie inside {outer:?}"
    );
}

#[test]
fn test_rendering_is_deterministic() {
    let source = "\
#direction: right
[<abstract> Shape|+ area(): f64]
[Circle] -:> [Shape]
[Square] -:> [Shape]
[Canvas] +-> 0..* [Shape]
[Canvas|[Layer]->[Layer2]]
";
    let builder = DiagramBuilder::default();
    let first = builder.render(source).expect("Failed to render");
    let second = builder.render(source).expect("Failed to render");
    assert_eq!(first, second);
}

#[test]
fn test_document_overrides_globals() {
    let settings = Settings::default().merged([("direction", "down")]);
    let builder = DiagramBuilder::new(AppConfig::new(settings));

    let diagram = builder
        .parse("#direction: right\n[A]->[B]")
        .expect("Failed to parse diagram");
    assert_eq!(diagram.style().direction(), Direction::Right);
    assert_eq!(diagram.directives().get_key(DirectiveKey::Direction), Some("right"));
}

#[test]
fn test_empty_value_does_not_override() {
    let settings = Settings::default().merged([("stroke", "#333")]);
    let builder = DiagramBuilder::new(AppConfig::new(settings));

    let diagram = builder
        .parse("#stroke:\n[A]")
        .expect("Failed to parse diagram");
    assert_eq!(diagram.directives().get_key(DirectiveKey::Stroke), Some("#333"));
}

#[test]
fn test_default_config_applies_plugin_defaults() {
    let builder = DiagramBuilder::default();
    let diagram = builder.parse("[A]").expect("Failed to parse diagram");

    assert!(diagram.style().background().is_some());
    assert_eq!(diagram.directives().get_key(DirectiveKey::Ranker), Some("network-simplex"));
}

#[test]
fn test_oversized_directives_still_render() {
    let builder = DiagramBuilder::default();
    let diagram = builder
        .parse("#gutter: 3e38\n#fontSize: 1e30\n#leading: 1e30\n[A]->[B]")
        .expect("Failed to parse diagram");
    assert_eq!(diagram.style().gutter(), 20.0);
    assert_eq!(diagram.style().font().size(), 12.0);

    let layout = builder.layout(&diagram);
    assert!(layout.size().width().is_finite());
    assert!(layout.size().height().is_finite());

    let svg = builder.render_svg(&diagram);
    assert_eq!(svg.matches("class=\"node\"").count(), 2);
    assert!(!svg.contains("inf"));
}
