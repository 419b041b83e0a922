//! Timeline tree
//!
//! Every executed step is a [`Node`] in an arena-backed tree. The tree has two
//! orders over the same nodes:
//!
//! - **hierarchical** (`parent` / `first_child` / `last_child` / `prev` /
//!   `next`), used to group sub-steps under the step that scheduled them;
//! - **chronological** ([`Timeline::before`] / [`Timeline::after`]), the
//!   threaded pre-order walk that matches the execution sequence.
//!
//! ```text
//! root ("")
//! ├── 1            after(1)   = 2
//! ├── 2            after(2)   = 2.1
//! │   ├── 2.1      after(2.2) = 3
//! │   └── 2.2      before(3)  = 2.2
//! └── 3
//! ```
//!
//! Nodes are only ever appended (`adopt`) or spliced in right after an
//! existing sibling (`duplicate`); nothing is deleted.

use crate::controller::Program;
use crate::error::{EngineError, Result};
use crate::snapshot::SnapshotState;
use rustc_hash::FxHashMap;
use std::fmt;
use tracing::trace;

/// Index of a node in its [`Timeline`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    /// Created by a scheduling call, not yet executed
    Scheduled,
    /// Its program is executing
    Running,
    /// Executed, state converted to plain data
    Archived,
}

/// One step of the procedure
#[derive(Debug)]
pub struct Node {
    name: String,
    label: String,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    pub(crate) program: Program,
    pub(crate) hook: Option<Program>,
    pub(crate) repeat: bool,
    pub(crate) status: NodeStatus,
    pub(crate) state: SnapshotState,
}

impl Node {
    fn new(program: Program) -> Self {
        Node {
            name: String::new(),
            label: String::new(),
            parent: None,
            first_child: None,
            last_child: None,
            prev: None,
            next: None,
            program,
            hook: None,
            repeat: false,
            status: NodeStatus::Scheduled,
            state: SnapshotState::Pending,
        }
    }

    /// Display name set by the step's program (empty if it never named itself)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Position label such as `2.1.3`; empty for the root
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    pub fn last_child(&self) -> Option<NodeId> {
        self.last_child
    }

    pub fn prev(&self) -> Option<NodeId> {
        self.prev
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn has_hook(&self) -> bool {
        self.hook.is_some()
    }

    pub fn state(&self) -> &SnapshotState {
        &self.state
    }
}

/// Arena of nodes rooted at [`Timeline::root`]
#[derive(Debug)]
pub struct Timeline {
    nodes: Vec<Node>,
    labels: FxHashMap<String, NodeId>,
}

impl Timeline {
    /// Create a timeline holding only a root node running `program` on `initial`
    pub(crate) fn new(program: Program, initial: SnapshotState) -> Self {
        let mut root = Node::new(program);
        root.state = initial;
        Timeline {
            nodes: vec![root],
            labels: FxHashMap::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes, the root included; never zero
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id.0).ok_or(EngineError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(EngineError::UnknownNode(id))
    }

    /// Create a detached node and append it as `parent`'s last child
    pub(crate) fn adopt(&mut self, parent: NodeId, program: Program) -> Result<NodeId> {
        self.node(parent)?;
        let child = NodeId(self.nodes.len());
        self.nodes.push(Node::new(program));
        self.link_last_child(parent, child);
        Ok(child)
    }

    /// Insert a fresh node running the same program right after `id`
    pub(crate) fn duplicate(&mut self, id: NodeId) -> Result<NodeId> {
        let (parent, next, program) = {
            let node = self.node(id)?;
            (node.parent, node.next, node.program.clone())
        };
        let parent = parent.ok_or(EngineError::DuplicateRoot)?;

        let copy = NodeId(self.nodes.len());
        self.nodes.push(Node::new(program));

        match next {
            Some(next) => {
                let node = &mut self.nodes[copy.0];
                node.parent = Some(parent);
                node.prev = Some(id);
                node.next = Some(next);
                self.nodes[id.0].next = Some(copy);
                self.nodes[next.0].prev = Some(copy);
            }
            None => self.link_last_child(parent, copy),
        }
        trace!(source = %id, copy = %copy, "duplicated step");
        Ok(copy)
    }

    fn link_last_child(&mut self, parent: NodeId, child: NodeId) {
        match self.nodes[parent.0].last_child {
            Some(last) => {
                self.nodes[last.0].next = Some(child);
                self.nodes[child.0].prev = Some(last);
            }
            None => self.nodes[parent.0].first_child = Some(child),
        }
        self.nodes[parent.0].last_child = Some(child);
        self.nodes[child.0].parent = Some(parent);
    }

    /// Node executed right before `id`
    pub fn before(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        match node.prev {
            Some(mut point) => {
                while let Some(last) = self.nodes[point.0].last_child {
                    point = last;
                }
                Some(point)
            }
            None => node.parent,
        }
    }

    /// Node executed right after `id`
    pub fn after(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get(id)?;
        if node.first_child.is_some() {
            return node.first_child;
        }
        let mut point = node;
        loop {
            if point.next.is_some() {
                return point.next;
            }
            point = &self.nodes[point.parent?.0];
        }
    }

    /// Derive `id`'s label from its chronological predecessor
    ///
    /// A node with a previous sibling increments the sibling's last component;
    /// a first child extends its parent's label (`1` right under the root).
    pub(crate) fn compute_label(&mut self, id: NodeId) -> Result<&str> {
        let node = self.node(id)?;
        let label = match (node.prev, node.parent) {
            (Some(prev), _) => increment_label(&self.nodes[prev.0].label),
            (None, Some(parent)) => {
                let parent = &self.nodes[parent.0].label;
                if parent.is_empty() {
                    "1".to_string()
                } else {
                    format!("{}.1", parent)
                }
            }
            (None, None) => String::new(),
        };
        if !label.is_empty() {
            self.labels.insert(label.clone(), id);
        }
        let node = &mut self.nodes[id.0];
        node.label = label;
        Ok(&node.label)
    }

    pub fn find_by_label(&self, label: &str) -> Option<NodeId> {
        self.labels.get(label).copied()
    }

    /// Direct children of `id` in execution order
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            timeline: self,
            next: self.get(id).and_then(|node| node.first_child),
        }
    }

    /// Number of ancestors (0 for the root)
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut point = self.get(id).and_then(|node| node.parent);
        while let Some(parent) = point {
            depth += 1;
            point = self.nodes[parent.0].parent;
        }
        depth
    }

    /// Every node in execution order, starting with the root
    pub fn chronological(&self) -> Chronological<'_> {
        Chronological {
            timeline: self,
            next: Some(self.root()),
        }
    }
}

fn increment_label(label: &str) -> String {
    match label.rsplit_once('.') {
        Some((head, last)) => format!("{}.{}", head, last.parse::<u64>().unwrap_or(0) + 1),
        None => (label.parse::<u64>().unwrap_or(0) + 1).to_string(),
    }
}

pub struct Children<'a> {
    timeline: &'a Timeline,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.timeline.nodes[current.0].next;
        Some(current)
    }
}

pub struct Chronological<'a> {
    timeline: &'a Timeline,
    next: Option<NodeId>,
}

impl Iterator for Chronological<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.timeline.after(current);
        Some(current)
    }
}
