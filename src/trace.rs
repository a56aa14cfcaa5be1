//! Search-tree recording.
//!
//! The alpha-beta search reports what it does to a [`Recorder`]: every node
//! it enters (with the alpha/beta window at entry), the value each node
//! backs up, and every sibling skipped by a cutoff. The search never reads
//! anything back, so swapping [`TreeRecorder`] for [`NoopRecorder`] cannot
//! change a decision.
//!
//! Depth in the trace counts from the decision's root node (depth 0), so a
//! node entered by the search at search depth `d` is recorded at `d + 1`.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::board::{Board, Move};
use crate::constants::{DEFAULT_RENDER_DEPTH, INFINITY, Score};

/// Handle to a recorded node.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

/// What a node shows.
#[derive(Copy, Clone, Debug)]
pub enum NodeState<'a> {
    /// A searched position.
    Board(&'a Board),
    /// A sibling that was never searched because of a cutoff.
    Pruned(Move),
    /// Free-form label, for hand-built trees.
    Label(&'a str),
}

/// Observer of search events.
pub trait Recorder {
    fn add_node(
        &mut self,
        state: NodeState<'_>,
        depth: u32,
        maximizing: bool,
        alpha: Score,
        beta: Score,
        parent: Option<NodeId>,
    ) -> NodeId;

    fn set_node_value(&mut self, node: NodeId, value: Score);

    fn mark_pruned(&mut self, parent: NodeId, child: NodeId);

    /// Forget everything recorded so far.
    fn reset(&mut self);

    /// Text rendering of the recorded tree, if this recorder keeps one.
    fn render(&self, _title: &str) -> Option<String> {
        None
    }
}

impl<R: Recorder + ?Sized> Recorder for &mut R {
    fn add_node(
        &mut self,
        state: NodeState<'_>,
        depth: u32,
        maximizing: bool,
        alpha: Score,
        beta: Score,
        parent: Option<NodeId>,
    ) -> NodeId {
        (**self).add_node(state, depth, maximizing, alpha, beta, parent)
    }

    fn set_node_value(&mut self, node: NodeId, value: Score) {
        (**self).set_node_value(node, value)
    }

    fn mark_pruned(&mut self, parent: NodeId, child: NodeId) {
        (**self).mark_pruned(parent, child)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn render(&self, title: &str) -> Option<String> {
        (**self).render(title)
    }
}

/// Recorder that drops every event.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopRecorder;

impl Recorder for NoopRecorder {
    #[inline]
    fn add_node(
        &mut self,
        _state: NodeState<'_>,
        _depth: u32,
        _maximizing: bool,
        _alpha: Score,
        _beta: Score,
        _parent: Option<NodeId>,
    ) -> NodeId {
        NodeId(0)
    }

    #[inline]
    fn set_node_value(&mut self, _node: NodeId, _value: Score) {}

    #[inline]
    fn mark_pruned(&mut self, _parent: NodeId, _child: NodeId) {}

    #[inline]
    fn reset(&mut self) {}
}

/// A recorded node.
#[derive(Clone, Debug)]
pub struct TraceNode {
    pub label: String,
    pub depth: u32,
    pub maximizing: bool,
    pub alpha: Score,
    pub beta: Score,
    pub value: Option<Score>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Summary numbers for a recorded tree.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TraceStats {
    pub nodes: usize,
    pub edges: usize,
    pub pruned: usize,
}

impl TraceStats {
    /// Pruned edges as a percentage of all edges.
    pub fn pruning_efficiency(&self) -> f64 {
        if self.edges == 0 {
            0.0
        } else {
            self.pruned as f64 / self.edges as f64 * 100.0
        }
    }
}

/// Recorder that keeps the whole tree in memory.
#[derive(Clone, Debug)]
pub struct TreeRecorder {
    nodes: Vec<TraceNode>,
    pruned: BTreeSet<(NodeId, NodeId)>,
    render_depth: u32,
}

impl Default for TreeRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeRecorder {
    pub fn new() -> Self {
        Self::with_render_depth(DEFAULT_RENDER_DEPTH)
    }

    /// Limit [`Recorder::render`] to nodes at most `depth` below the root.
    pub fn with_render_depth(depth: u32) -> Self {
        Self {
            nodes: Vec::new(),
            pruned: BTreeSet::new(),
            render_depth: depth,
        }
    }

    pub fn nodes(&self) -> &[TraceNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&TraceNode> {
        self.nodes.get(id.0)
    }

    pub fn is_pruned(&self, parent: NodeId, child: NodeId) -> bool {
        self.pruned.contains(&(parent, child))
    }

    pub fn stats(&self) -> TraceStats {
        TraceStats {
            nodes: self.nodes.len(),
            edges: self.nodes.iter().filter(|n| n.parent.is_some()).count(),
            pruned: self.pruned.len(),
        }
    }

    fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.parent.is_none())
            .map(|(i, _)| NodeId(i))
    }

    fn header(node: &TraceNode) -> String {
        let mut s = format!("α={}, β={}", bound(node.alpha), bound(node.beta));
        if let Some(v) = node.value {
            let _ = write!(s, ", value={v}");
        }
        s
    }

    fn render_node(&self, out: &mut String, id: NodeId, indent: usize) {
        let node = &self.nodes[id.0];
        let role = if node.maximizing { "MAX" } else { "MIN" };
        let pruned = if node.parent.is_some_and(|p| self.is_pruned(p, id)) {
            " [pruned]"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "{:indent$}{role} {} {}{pruned}",
            "",
            Self::header(node),
            node.label,
            indent = indent * 2
        );
        if node.depth >= self.render_depth {
            if !node.children.is_empty() {
                let _ = writeln!(
                    out,
                    "{:indent$}... {} children",
                    "",
                    node.children.len(),
                    indent = (indent + 1) * 2
                );
            }
            return;
        }
        for &child in &node.children {
            self.render_node(out, child, indent + 1);
        }
    }

    /// Graphviz DOT export. Pruned edges are drawn red and dashed.
    pub fn to_dot(&self, title: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "digraph search {{");
        let _ = writeln!(out, "  label=\"{}\";", escape(title));
        let _ = writeln!(out, "  node [shape=box, style=\"rounded,filled\"];");
        for (i, node) in self.nodes.iter().enumerate() {
            let color = if node.maximizing { "lightblue" } else { "lightgreen" };
            let label = format!("{}\n{}", Self::header(node), node.label.replace('/', "\n"));
            let _ = writeln!(
                out,
                "  n{i} [label=\"{}\", fillcolor={color}];",
                escape(&label)
            );
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(parent) = node.parent {
                let style = if self.is_pruned(parent, NodeId(i)) {
                    " [color=red, style=dashed]"
                } else {
                    ""
                };
                let _ = writeln!(out, "  n{} -> n{i}{style};", parent.0);
            }
        }
        let _ = writeln!(out, "}}");
        out
    }
}

impl Recorder for TreeRecorder {
    fn add_node(
        &mut self,
        state: NodeState<'_>,
        depth: u32,
        maximizing: bool,
        alpha: Score,
        beta: Score,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let label = match state {
            NodeState::Board(board) => board.compact(),
            NodeState::Pruned(mv) => format!("Pruned (move {mv})"),
            NodeState::Label(text) => text.to_string(),
        };
        self.nodes.push(TraceNode {
            label,
            depth,
            maximizing,
            alpha,
            beta,
            value: None,
            parent,
            children: Vec::new(),
        });
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(p.0)) {
            p.children.push(id);
        }
        id
    }

    fn set_node_value(&mut self, node: NodeId, value: Score) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.value = Some(value);
        }
    }

    fn mark_pruned(&mut self, parent: NodeId, child: NodeId) {
        self.pruned.insert((parent, child));
    }

    fn reset(&mut self) {
        self.nodes.clear();
        self.pruned.clear();
    }

    fn render(&self, title: &str) -> Option<String> {
        let mut out = String::new();
        let _ = writeln!(out, "{title}");
        if self.nodes.is_empty() {
            let _ = writeln!(out, "No nodes recorded");
            return Some(out);
        }
        for root in self.roots() {
            self.render_node(&mut out, root, 0);
        }
        let stats = self.stats();
        let _ = writeln!(out, "Total nodes: {}", stats.nodes);
        let _ = writeln!(out, "Pruned branches: {}", stats.pruned);
        let _ = writeln!(out, "Pruning efficiency: {:.1}%", stats.pruning_efficiency());
        Some(out)
    }
}

/// A small hand-built tree with one cutoff: three MIN replies under a MAX
/// root, where the second reply is abandoned after its first leaf.
pub fn demo_tree() -> TreeRecorder {
    let mut rec = TreeRecorder::new();
    let root = rec.add_node(NodeState::Label("Root"), 0, true, -INFINITY, INFINITY, None);

    let child1 = rec.add_node(NodeState::Label("Child 1"), 1, false, -INFINITY, INFINITY, Some(root));
    let leaf1 = rec.add_node(NodeState::Label("Leaf 1"), 2, true, -INFINITY, 10, Some(child1));
    rec.set_node_value(leaf1, 5);
    let leaf2 = rec.add_node(NodeState::Label("Leaf 2"), 2, true, 5, 10, Some(child1));
    rec.set_node_value(leaf2, 6);
    rec.set_node_value(child1, 5);

    // 3 < alpha once Leaf 3 is in, so Child 2's second reply is skipped
    let child2 = rec.add_node(NodeState::Label("Child 2"), 1, false, 5, INFINITY, Some(root));
    let leaf3 = rec.add_node(NodeState::Label("Leaf 3"), 2, true, 5, INFINITY, Some(child2));
    rec.set_node_value(leaf3, 3);
    let skipped = rec.add_node(NodeState::Label("Pruned"), 2, true, 5, 3, Some(child2));
    rec.mark_pruned(child2, skipped);
    rec.set_node_value(child2, 3);

    let child3 = rec.add_node(NodeState::Label("Child 3"), 1, false, 5, INFINITY, Some(root));
    let leaf5 = rec.add_node(NodeState::Label("Leaf 5"), 2, true, 5, INFINITY, Some(child3));
    rec.set_node_value(leaf5, 7);
    let leaf6 = rec.add_node(NodeState::Label("Leaf 6"), 2, true, 7, INFINITY, Some(child3));
    rec.set_node_value(leaf6, 4);
    rec.set_node_value(child3, 4);

    rec.set_node_value(root, 5);
    rec
}

/// Format a bound, showing the unbounded window as ±inf.
fn bound(v: Score) -> String {
    if v >= INFINITY {
        "inf".to_string()
    } else if v <= -INFINITY {
        "-inf".to_string()
    } else {
        v.to_string()
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
