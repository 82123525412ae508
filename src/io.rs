//! Persisted artifacts: the transition system as a keyed
//! document, per-`execute` local-plan dumps, and the global (prefix,
//! suffix) solution. All three are plain `serde_yaml` documents, following
//! the teacher's pattern of deriving `Serialize`/`Deserialize` on small DTOs
//! rather than hand-writing a format.

use crate::error::{PlannerError, Result};
use crate::geometry::Point2;
use crate::ts::TransitionSystem;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
struct NodeDoc {
    conf: Point2,
    propositions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EdgeDoc {
    from: Point2,
    to: Point2,
}

#[derive(Debug, Serialize, Deserialize)]
struct TsDocument {
    initial: Option<Point2>,
    nodes: Vec<NodeDoc>,
    edges: Vec<EdgeDoc>,
}

fn to_yaml_err(e: serde_yaml::Error) -> PlannerError {
    PlannerError::GeometryInvalid(format!("yaml error: {e}"))
}

fn io_err(e: std::io::Error) -> PlannerError {
    PlannerError::GeometryInvalid(format!("io error: {e}"))
}

pub fn ts_to_yaml_string(ts: &TransitionSystem) -> Result<String> {
    let mut nodes: Vec<NodeDoc> = ts
        .nodes()
        .map(|c| {
            let mut props: Vec<String> = ts
                .propositions_of(&c)
                .map(|s| s.iter().cloned().collect())
                .unwrap_or_default();
            props.sort();
            NodeDoc {
                conf: c,
                propositions: props,
            }
        })
        .collect();
    nodes.sort_by(|a, b| a.conf.cmp(&b.conf));

    let mut edges: Vec<EdgeDoc> = ts
        .edges()
        .map(|(from, to)| EdgeDoc { from, to })
        .collect();
    edges.sort_by(|a, b| a.from.cmp(&b.from).then_with(|| a.to.cmp(&b.to)));

    let doc = TsDocument {
        initial: ts.init(),
        nodes,
        edges,
    };
    serde_yaml::to_string(&doc).map_err(to_yaml_err)
}

pub fn ts_from_yaml_string(s: &str) -> Result<TransitionSystem> {
    let doc: TsDocument = serde_yaml::from_str(s).map_err(to_yaml_err)?;
    let mut ts = TransitionSystem::new();
    for n in &doc.nodes {
        let is_init = doc.initial == Some(n.conf);
        let props: HashSet<String> = n.propositions.iter().cloned().collect();
        ts.add_state(n.conf, props, is_init);
    }
    for e in &doc.edges {
        ts.add_transition(e.from, e.to);
    }
    Ok(ts)
}

pub fn write_ts(path: impl AsRef<Path>, ts: &TransitionSystem) -> Result<()> {
    std::fs::write(path, ts_to_yaml_string(ts)?).map_err(io_err)
}

pub fn read_ts(path: impl AsRef<Path>) -> Result<TransitionSystem> {
    let s = std::fs::read_to_string(path).map_err(io_err)?;
    ts_from_yaml_string(&s)
}

#[derive(Debug, Serialize, Deserialize)]
struct GlobalSolutionDoc {
    prefix: Vec<Point2>,
    suffix: Vec<Point2>,
}

pub fn write_global_solution(
    path: impl AsRef<Path>,
    prefix: &[Point2],
    suffix: &[Point2],
) -> Result<()> {
    let doc = GlobalSolutionDoc {
        prefix: prefix.to_vec(),
        suffix: suffix.to_vec(),
    };
    let s = serde_yaml::to_string(&doc).map_err(to_yaml_err)?;
    std::fs::write(path, s).map_err(io_err)
}

pub fn read_global_solution(path: impl AsRef<Path>) -> Result<(Vec<Point2>, Vec<Point2>)> {
    let s = std::fs::read_to_string(path).map_err(io_err)?;
    let doc: GlobalSolutionDoc = serde_yaml::from_str(&s).map_err(to_yaml_err)?;
    Ok((doc.prefix, doc.suffix))
}

/// Per-`execute` local-plan dump, numbered sequentially as
/// `lts_<step, zero-padded to 4 digits>.yaml`.
pub fn write_local_plan_dump(
    output_dir: impl AsRef<Path>,
    step: u32,
    local_plan: &[Point2],
) -> Result<()> {
    let doc = GlobalSolutionDoc {
        prefix: local_plan.to_vec(),
        suffix: Vec::new(),
    };
    let s = serde_yaml::to_string(&doc).map_err(to_yaml_err)?;
    let path = output_dir.as_ref().join(format!("lts_{step:0>4}.yaml"));
    std::fs::write(path, s).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ts_round_trips_bit_identical_coordinates() {
        let mut ts = TransitionSystem::new();
        let a = Point2::new(0.125, -3.5);
        let b = Point2::new(1.0, 2.0);
        ts.add_state(a, ["r1".to_string()].into_iter().collect(), true);
        ts.add_state(b, HashSet::new(), false);
        ts.add_transition(a, b);

        let yaml = ts_to_yaml_string(&ts).unwrap();
        let back = ts_from_yaml_string(&yaml).unwrap();

        assert_eq!(back.size(), ts.size());
        assert_eq!(back.init(), Some(a));
        assert_eq!(back.neighbors(&a), vec![b]);
        assert_eq!(
            back.propositions_of(&a).cloned().unwrap_or_default(),
            ["r1".to_string()].into_iter().collect::<HashSet<_>>()
        );
    }

    #[test]
    fn global_solution_round_trips_through_string_document() {
        let prefix = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)];
        let suffix = vec![Point2::new(1.0, 0.0), Point2::new(1.0, 1.0), Point2::new(1.0, 0.0)];
        let doc = GlobalSolutionDoc {
            prefix: prefix.clone(),
            suffix: suffix.clone(),
        };
        let s = serde_yaml::to_string(&doc).unwrap();
        let back: GlobalSolutionDoc = serde_yaml::from_str(&s).unwrap();
        assert_eq!(back.prefix, prefix);
        assert_eq!(back.suffix, suffix);
    }
}
