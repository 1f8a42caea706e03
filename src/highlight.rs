//! The five-node computation graph and which parts of it light up per step.

use serde::Serialize;

use crate::model::ScalarModel;
use crate::steps::{Highlight, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
    Ai,
    Wij,
    Zj,
    Aj,
    L,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeRole {
    Forward,
    Backward,
    Neutral,
    Dim,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub label: &'static str,
}

pub const NODES: [NodeId; 5] = [NodeId::Ai, NodeId::Wij, NodeId::Zj, NodeId::Aj, NodeId::L];

pub const EDGES: [Edge; 4] = [
    Edge {
        from: NodeId::Ai,
        to: NodeId::Zj,
        label: "× wᵢⱼ",
    },
    Edge {
        from: NodeId::Wij,
        to: NodeId::Zj,
        label: "",
    },
    Edge {
        from: NodeId::Zj,
        to: NodeId::Aj,
        label: "σ(·)",
    },
    Edge {
        from: NodeId::Aj,
        to: NodeId::L,
        label: "MSE",
    },
];

impl NodeId {
    pub fn label(self) -> &'static str {
        match self {
            NodeId::Ai => "aᵢ",
            NodeId::Wij => "wᵢⱼ",
            NodeId::Zj => "zⱼ",
            NodeId::Aj => "aⱼ",
            NodeId::L => "L",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Value printed under a node, rounded the way the diagram shows it.
pub fn node_sublabel(node: NodeId, model: &ScalarModel) -> String {
    match node {
        NodeId::Ai => format!("{:.1}", model.inputs().a_i),
        NodeId::Wij => format!("{:.1}", model.inputs().w_ij),
        NodeId::Zj => format!("{:.2}", model.z_j()),
        NodeId::Aj => format!("{:.3}", model.a_j()),
        NodeId::L => format!("{:.4}", model.loss()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphHighlight {
    nodes: [bool; 5],
    edges: [EdgeRole; 4],
}

impl GraphHighlight {
    pub fn is_active(&self, node: NodeId) -> bool {
        self.nodes[node.slot()]
    }

    /// Role of edge `index` in `EDGES`. Out of range edges are dim.
    pub fn edge_role(&self, index: usize) -> EdgeRole {
        self.edges.get(index).copied().unwrap_or(EdgeRole::Dim)
    }

    pub fn edges(&self) -> impl Iterator<Item = (&'static Edge, EdgeRole)> + '_ {
        EDGES.iter().zip(self.edges.iter().copied())
    }

    /// Edge label, hidden while the edge is dim.
    pub fn edge_label(&self, index: usize) -> Option<&'static str> {
        let edge = EDGES.get(index)?;
        if edge.label.is_empty() || self.edge_role(index) == EdgeRole::Dim {
            None
        } else {
            Some(edge.label)
        }
    }
}

/// Maps a step's highlight tag onto the graph.
pub fn highlight(tag: Highlight) -> GraphHighlight {
    match tag {
        Highlight::All | Highlight::Chain | Highlight::Update => GraphHighlight {
            nodes: [true; 5],
            edges: [EdgeRole::Neutral; 4],
        },
        Highlight::Z => lit(
            &[NodeId::Ai, NodeId::Wij, NodeId::Zj],
            EdgeRole::Forward,
            |e| e.to == NodeId::Zj,
        ),
        Highlight::A => lit(&[NodeId::Zj, NodeId::Aj], EdgeRole::Forward, |e| {
            e.from == NodeId::Zj && e.to == NodeId::Aj
        }),
        Highlight::Loss => lit(&[NodeId::Aj, NodeId::L], EdgeRole::Forward, |e| {
            e.from == NodeId::Aj && e.to == NodeId::L
        }),
        Highlight::DlDa => lit(&[NodeId::Aj, NodeId::L], EdgeRole::Backward, |e| {
            e.from == NodeId::Aj && e.to == NodeId::L
        }),
        Highlight::DaDz => lit(&[NodeId::Zj, NodeId::Aj], EdgeRole::Backward, |e| {
            e.from == NodeId::Zj && e.to == NodeId::Aj
        }),
        Highlight::DzDw => lit(
            &[NodeId::Ai, NodeId::Wij, NodeId::Zj],
            EdgeRole::Backward,
            |e| e.to == NodeId::Zj,
        ),
    }
}

// Lights `active`, gives `role` to the edges matching `on`, dims the rest.
fn lit(active: &[NodeId], role: EdgeRole, on: fn(&Edge) -> bool) -> GraphHighlight {
    let mut out = GraphHighlight {
        nodes: [false; 5],
        edges: [EdgeRole::Dim; 4],
    };
    for node in active {
        out.nodes[node.slot()] = true;
    }
    for (slot, edge) in EDGES.iter().enumerate() {
        if on(edge) {
            out.edges[slot] = role;
        }
    }
    out
}

/// Banner under the graph telling which way values are flowing.
pub fn direction_banner(step_index: usize, phase: Phase) -> Option<&'static str> {
    match phase {
        Phase::Forward if step_index > 0 => Some("→ Forward →"),
        Phase::Backward | Phase::Update => Some("← Backward ←"),
        _ => None,
    }
}
