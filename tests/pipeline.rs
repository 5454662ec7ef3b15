//! End-to-end runs of the benchmark pipeline against fixture graphs.

mod common;

use std::fs;

use graph_harness::algorithm::{AlgorithmKind, Parameters};
use graph_harness::config::HarnessConfig;
use graph_harness::graph::load;
use graph_harness::harness;
use graph_harness::output::read_partition;
use graph_harness::probe::ResourceProbe;
use graph_harness::quality::modularity;
use graph_harness::report::ReportLog;

use common::{graph_fixture, run_captured, write_graph, FixedPartition};

#[test]
fn path_partition_is_written_line_per_node() {
    let dir = tempfile::tempdir().unwrap();
    let graph = write_graph(dir.path(), "path.elist", &[(1, 2), (2, 3), (3, 4)]);
    let out = dir.path().join("path.part");
    let config = HarnessConfig::new(&graph, AlgorithmKind::Plp).with_output(&out);

    let mut log = ReportLog::new(Vec::new(), "<memory>");
    let summary = harness::run_with(&config, &mut log, &ResourceProbe::unavailable(), || {
        Box::new(FixedPartition(vec![0, 0, 1, 1]))
    })
    .unwrap();

    assert_eq!(fs::read_to_string(&out).unwrap(), "0 0\n1 0\n2 1\n3 1\n");
    assert_eq!(summary.subsets, Some(2));
    // 2 * (1/3 - (3/6)^2)
    assert!((summary.modularity.unwrap() - 1.0 / 6.0).abs() < 1e-12);
}

#[test]
fn missized_partition_fails_before_evaluation() {
    let dir = tempfile::tempdir().unwrap();
    let graph = write_graph(dir.path(), "path.elist", &[(1, 2), (2, 3), (3, 4)]);
    let out = dir.path().join("path.part");
    let config = HarnessConfig::new(&graph, AlgorithmKind::Plp).with_output(&out);

    for slots in [vec![0, 0, 1], vec![0, 0, 1, 1, 7, 9]] {
        let expected = format!("partition has {} slots for 4 nodes", slots.len());
        let mut log = ReportLog::new(Vec::new(), "<memory>");
        let err = harness::run_with(&config, &mut log, &ResourceProbe::unavailable(), || {
            Box::new(FixedPartition(slots.clone()))
        })
        .unwrap_err();

        assert_eq!(err.stage(), "run");
        assert!(err.to_string().contains(&expected), "{}", err);
        assert!(!out.exists());
        let text = String::from_utf8(log.into_inner()).unwrap();
        assert!(!text.contains("Subsets"));
        assert!(!text.contains("Total time"));
    }
}

#[test]
fn unavailable_probe_still_completes() {
    let config = HarnessConfig::new(graph_fixture("two-triangles.elist"), AlgorithmKind::Leiden)
        .with_probe(true);
    let (summary, text) = run_captured(&config, &ResourceProbe::unavailable());

    assert!(summary.snapshots.is_empty());
    assert_eq!(summary.peak_resident_bytes(), None);
    assert!(summary.modularity.is_some());
    assert_eq!(text.matches("Memory").count(), 1);
    assert!(text.contains("Memory: unavailable ("));
    assert!(text.lines().last().unwrap().starts_with("Total time: "));
}

#[test]
fn karate_communities_score_well() {
    for kind in [AlgorithmKind::Louvain, AlgorithmKind::Leiden] {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("karate.part");
        let config = HarnessConfig::new(graph_fixture("karate.elist"), kind).with_output(&out);
        let (summary, text) = run_captured(&config, &ResourceProbe::unavailable());

        assert_eq!(summary.stats.nodes, 34);
        assert_eq!(summary.stats.edges, 78);
        let q = summary.modularity.unwrap();
        assert!(q > 0.35, "{}: q = {}", kind, q);
        assert!(text.contains(&format!("{}: Runtime: ", kind.name())));
        assert!(text.contains("Phases: "));

        // The dump re-evaluates to the reported modularity.
        let graph = load(graph_fixture("karate.elist").to_str().unwrap()).unwrap();
        let persisted = read_partition(&out).unwrap();
        assert_eq!(persisted.len(), 34);
        assert_eq!(modularity(&graph, &persisted).unwrap(), q);
    }
}

#[test]
fn plp_without_output_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let graph = dir.path().join("karate.elist");
    fs::copy(graph_fixture("karate.elist"), &graph).unwrap();
    let config = HarnessConfig::new(&graph, AlgorithmKind::Plp);
    let (summary, text) = run_captured(&config, &ResourceProbe::unavailable());

    let q = summary.modularity.unwrap();
    assert!((-0.5..=1.0).contains(&q));
    assert!(text.contains("PLP: Runtime: "));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn pagerank_reports_runtime_only() {
    let config = HarnessConfig::new(graph_fixture("karate.elist"), AlgorithmKind::PageRank);
    let (summary, text) = run_captured(&config, &ResourceProbe::unavailable());
    assert_eq!(summary.modularity, None);
    assert_eq!(summary.subsets, None);
    assert!(text.contains("PageRank: Runtime: "));
    assert!(!text.contains("Modularity"));
}

#[test]
fn pagerank_iteration_cap_is_a_run_error() {
    let config = HarnessConfig::new(graph_fixture("karate.elist"), AlgorithmKind::PageRank)
        .with_parameters(Parameters { max_iterations: Some(1), tolerance: Some(1e-12) });
    let mut log = ReportLog::new(Vec::new(), "<memory>");
    let err = harness::run(&config, &mut log, &ResourceProbe::unavailable()).unwrap_err();
    assert_eq!(err.stage(), "run");
    assert!(err.to_string().contains("PageRank"));
}

#[test]
fn weighted_fixture_is_reported_weighted() {
    let config = HarnessConfig::new(graph_fixture("weighted-path.elist"), AlgorithmKind::Louvain);
    let (summary, text) = run_captured(&config, &ResourceProbe::unavailable());
    assert!(summary.stats.weighted);
    assert!(text.contains("Directed: false, Weighted: true\n"));
    assert_eq!(summary.subsets, Some(2));
}

#[cfg(target_os = "linux")]
#[test]
fn linux_probe_reports_every_checkpoint() {
    let config = HarnessConfig::new(graph_fixture("two-triangles.elist"), AlgorithmKind::Plp)
        .with_probe(true);
    let (summary, text) = run_captured(&config, &ResourceProbe::new());
    assert_eq!(summary.snapshots.len(), 4);
    assert!(summary.peak_resident_bytes().unwrap() > 0);
    assert!(text.contains("Memory [after-result-extraction]: rss="));
}
