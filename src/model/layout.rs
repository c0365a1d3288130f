//! Reading-order layout tree.
//!
//! Regions live in an arena and refer to their children by [`RegionId`],
//! so the tree can be cloned, compared and serialized without shared
//! references.

use serde::{Deserialize, Serialize};

use super::BBox;

/// Stable index of a region inside its [`LayoutTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(pub usize);

/// Where a region came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// The whole page (tree root)
    Page,
    /// A full-width column detection
    FullColumn,
    /// A sub-column detection
    SubColumn,
    /// Page area between detected columns
    Filler,
}

/// A node of the layout tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutRegion {
    /// Region extent
    pub bbox: BBox,
    /// Region origin
    pub kind: RegionKind,
    /// Detector confidence, when the region came from a detection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Position in reading order (pre-order index in the tree)
    pub rank: u32,
    /// Child regions, already in reading order
    pub children: Vec<RegionId>,
}

impl LayoutRegion {
    /// Create a region with no children.
    pub fn new(bbox: BBox, kind: RegionKind, score: Option<f64>) -> Self {
        Self {
            bbox,
            kind,
            score,
            rank: 0,
            children: Vec::new(),
        }
    }

    /// Whether spans are assigned directly to this region.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Column / reading-order tree of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutTree {
    nodes: Vec<LayoutRegion>,
}

impl LayoutTree {
    /// Create a tree holding only the page root.
    pub fn new(page: BBox) -> Self {
        Self {
            nodes: vec![LayoutRegion::new(page, RegionKind::Page, None)],
        }
    }

    /// Id of the page root.
    pub fn root(&self) -> RegionId {
        RegionId(0)
    }

    /// Look up a region.
    pub fn get(&self, id: RegionId) -> Option<&LayoutRegion> {
        self.nodes.get(id.0)
    }

    /// All regions in arena order.
    pub fn regions(&self) -> &[LayoutRegion] {
        &self.nodes
    }

    /// Number of regions including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a child under `parent`, returning the new id.
    ///
    /// Children keep insertion order; call [`LayoutTree::assign_ranks`]
    /// once the order is final.
    pub fn add_child(&mut self, parent: RegionId, region: LayoutRegion) -> RegionId {
        let id = RegionId(self.nodes.len());
        self.nodes.push(region);
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Replace the children of `parent` with an explicit order.
    pub fn set_children(&mut self, parent: RegionId, children: Vec<RegionId>) {
        self.nodes[parent.0].children = children;
    }

    /// Region ids in pre-order: each node before its children, children
    /// in their stored order.
    pub fn preorder(&self) -> Vec<RegionId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            for child in self.nodes[id.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        order
    }

    /// Number every region by its pre-order position.
    pub fn assign_ranks(&mut self) {
        for (rank, id) in self.preorder().into_iter().enumerate() {
            self.nodes[id.0].rank = rank as u32;
        }
    }

    /// Leaf regions in reading order.
    pub fn leaves(&self) -> Vec<RegionId> {
        self.preorder()
            .into_iter()
            .filter(|id| self.nodes[id.0].is_leaf())
            .collect()
    }

    /// Leaf bounding boxes in reading order.
    pub fn leaf_bboxes(&self) -> Vec<BBox> {
        self.leaves()
            .into_iter()
            .map(|id| self.nodes[id.0].bbox)
            .collect()
    }
}
