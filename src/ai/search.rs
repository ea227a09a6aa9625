//! Search tree grown during route expansion
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. A node's
//! parent link is a back-reference; the parent's child list is what keeps a
//! node in the tree. Detached nodes stay in the arena until the tree is
//! dropped, so ids held elsewhere remain valid.

use glam::IVec2;
use smallvec::SmallVec;

use super::route::Route;
use crate::world::Direction;

/// Cost of a horizontal or vertical step
pub const ORTHOGONAL_COST: u32 = 5;

/// Cost of a diagonal step
pub const DIAGONAL_COST: u32 = 7;

/// Cost of taking one step in `direction`
#[must_use]
pub const fn movement_cost(direction: Direction) -> u32 {
    match direction {
        Direction::Zero => 0,
        d if d.is_diagonal() => DIAGONAL_COST,
        _ => ORTHOGONAL_COST,
    }
}

/// Index of a node within its [`SearchTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// One grid cell reached along a specific path
#[derive(Debug, Clone)]
pub struct SearchNode {
    location: IVec2,
    parent: Option<NodeId>,
    direction: Direction,
    children: SmallVec<[NodeId; 8]>,
}

impl SearchNode {
    /// Grid location
    #[must_use]
    pub fn location(&self) -> IVec2 {
        self.location
    }

    /// Node this one was expanded from
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Step taken from the parent
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Cost of the step taken from the parent
    #[must_use]
    pub fn movement_cost(&self) -> u32 {
        movement_cost(self.direction)
    }
}

/// Arena of search nodes rooted at a start tile
#[derive(Debug, Clone)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    /// The root node of every tree
    pub const ROOT: NodeId = NodeId(0);

    /// Create a tree holding only the root
    #[must_use]
    pub fn new(root: IVec2) -> Self {
        Self {
            nodes: vec![SearchNode {
                location: root,
                parent: None,
                direction: Direction::Zero,
                children: SmallVec::new(),
            }],
        }
    }

    /// Number of nodes ever created, detached ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its root
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Borrow a node
    #[must_use]
    pub fn node(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0]
    }

    /// Read-only view of a node and its surroundings
    #[must_use]
    pub fn get(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { tree: self, id }
    }

    /// Grid location of a node
    #[must_use]
    pub fn location(&self, id: NodeId) -> IVec2 {
        self.node(id).location
    }

    /// Location one step from a node, clamped at the edge of the grid
    #[must_use]
    pub fn location_toward(&self, id: NodeId, direction: Direction) -> IVec2 {
        self.location(id).saturating_add(direction.vector())
    }

    /// Step taken to reach a node
    #[must_use]
    pub fn direction(&self, id: NodeId) -> Direction {
        self.node(id).direction
    }

    /// Parent of a node
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Current children of a node
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Child reached by stepping in `direction`
    #[must_use]
    pub fn child(&self, id: NodeId, direction: Direction) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.direction(child) == direction)
    }

    /// Add (or find) the child reached by stepping in `direction`
    ///
    /// If the parent already reaches the new location in one orthogonal step,
    /// the cheaper of the two single steps is kept: a dearer sibling is
    /// detached and the node added here, otherwise the sibling is returned.
    /// Nothing above the parent is reconsidered.
    pub fn add_node(&mut self, id: NodeId, direction: Direction) -> NodeId {
        if let Some(existing) = self.child(id, direction) {
            return existing;
        }

        let location = self.location_toward(id, direction);
        let Some(parent) = self.parent(id) else {
            return self.push_child(id, direction, location);
        };

        let parent_relative = location - self.location(parent);
        let from_parent = Direction::from_vector(parent_relative.as_vec2());
        let sibling = self.child(parent, from_parent);

        match sibling {
            Some(sibling) if parent_relative.as_vec2().length() <= 1.0 => {
                if self.node(sibling).movement_cost() > movement_cost(direction) {
                    self.remove_node(parent, from_parent);
                    self.add_node(id, direction)
                } else {
                    sibling
                }
            }
            _ => self.push_child(id, direction, location),
        }
    }

    /// Detach the child reached by stepping in `direction`
    pub fn remove_node(&mut self, id: NodeId, direction: Direction) {
        if let Some(child) = self.child(id, direction) {
            self.nodes[id.0].children.retain(|c| *c != child);
        }
    }

    fn push_child(&mut self, parent: NodeId, direction: Direction, location: IVec2) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SearchNode {
            location,
            parent: Some(parent),
            direction,
            children: SmallVec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Walk from a node up to the root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), |&node| self.parent(node))
    }

    /// Nodes on the path from the root to `id`, the root included
    #[must_use]
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// Sum of step costs from the root
    #[must_use]
    pub fn cost_to_reach(&self, id: NodeId) -> u64 {
        self.ancestors(id)
            .map(|node| u64::from(self.node(node).movement_cost()))
            .sum()
    }

    /// Manhattan estimate of the remaining cost to `target`
    ///
    /// Computed in 64 bits so any pair of `i32` tiles fits.
    #[must_use]
    pub fn heuristic_cost(&self, id: NodeId, target: IVec2) -> u64 {
        let delta = target.as_i64vec2() - self.location(id).as_i64vec2();
        (delta.x.unsigned_abs() + delta.y.unsigned_abs()) * u64::from(ORTHOGONAL_COST)
    }

    /// Total A* cost of a node
    #[must_use]
    pub fn cost(&self, id: NodeId, target: IVec2) -> u64 {
        self.heuristic_cost(id, target)
            .saturating_add(self.cost_to_reach(id))
    }

    /// Whether stepping in `direction` revisits a tile already on the path
    #[must_use]
    pub fn is_ineffective(&self, id: NodeId, direction: Direction) -> bool {
        let resultant = self.location_toward(id, direction);
        self.ancestors(id)
            .any(|node| self.location(node) == resultant)
    }

    /// Waypoints from the root to `id`
    #[must_use]
    pub fn route(&self, id: NodeId) -> Route {
        let mut locations: Vec<_> = self
            .ancestors(id)
            .map(|node| self.location(node).as_vec2())
            .collect();
        locations.reverse();
        locations.into_iter().collect()
    }
}

/// A node together with the tree it belongs to
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a SearchTree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    /// The node's id
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The tree the node lives in
    #[must_use]
    pub fn tree(&self) -> &'a SearchTree {
        self.tree
    }

    /// Grid location
    #[must_use]
    pub fn location(&self) -> IVec2 {
        self.tree.location(self.id)
    }

    /// Location one step away
    #[must_use]
    pub fn location_toward(&self, direction: Direction) -> IVec2 {
        self.tree.location_toward(self.id, direction)
    }

    /// Whether stepping in `direction` revisits the path
    #[must_use]
    pub fn is_ineffective(&self, direction: Direction) -> bool {
        self.tree.is_ineffective(self.id, direction)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    #[test]
    fn test_costs() {
        let mut tree = SearchTree::new(IVec2::ZERO);
        let a = tree.add_node(SearchTree::ROOT, Direction::XPlus);
        let b = tree.add_node(a, Direction::XYPlus);

        assert_eq!(tree.cost_to_reach(SearchTree::ROOT), 0);
        assert_eq!(tree.cost_to_reach(b), 12);
        assert_eq!(tree.heuristic_cost(b, IVec2::new(5, -1)), (3 + 2) * 5);
        assert_eq!(tree.cost(b, IVec2::new(2, 1)), 12);
    }

    #[test]
    fn test_costs_at_grid_extremes() {
        let mut tree = SearchTree::new(IVec2::MIN);
        let span = u64::from(u32::MAX);

        assert_eq!(tree.heuristic_cost(SearchTree::ROOT, IVec2::MAX), span * 2 * 5);
        assert_eq!(tree.location_toward(SearchTree::ROOT, Direction::XYMinus), IVec2::MIN);
        assert!(tree.is_ineffective(SearchTree::ROOT, Direction::XMinus));

        let next = tree.add_node(SearchTree::ROOT, Direction::XYPlus);
        assert_eq!(tree.cost(next, IVec2::MAX), (span - 1) * 2 * 5 + 7);
    }

    #[test]
    fn test_location_invariant() {
        let mut tree = SearchTree::new(IVec2::new(3, 3));
        let mut id = SearchTree::ROOT;
        for dir in [Direction::XMinus, Direction::XYMinus, Direction::YPlus] {
            let next = tree.add_node(id, dir);
            assert_eq!(tree.parent(next), Some(id));
            assert_eq!(tree.location(next), tree.location(id) + dir.vector());
            id = next;
        }
        assert_eq!(tree.depth(id), 4);
    }

    #[test]
    fn test_add_node_reuses_child() {
        let mut tree = SearchTree::new(IVec2::ZERO);
        let a = tree.add_node(SearchTree::ROOT, Direction::YPlus);

        assert_eq!(tree.add_node(SearchTree::ROOT, Direction::YPlus), a);
        assert_eq!(tree.children(SearchTree::ROOT).len(), 1);
    }

    #[test]
    fn test_relaxation_prefers_cheaper_sibling() {
        let mut tree = SearchTree::new(IVec2::ZERO);
        let sibling = tree.add_node(SearchTree::ROOT, Direction::XPlus);
        let up = tree.add_node(SearchTree::ROOT, Direction::YPlus);

        // (0,1) -> (1,0) is a diagonal; the root reaches (1,0) in one cheaper step
        assert_eq!(tree.add_node(up, Direction::XYPlusMinus), sibling);
        assert!(tree.child(up, Direction::XYPlusMinus).is_none());

        let diag = tree.add_node(SearchTree::ROOT, Direction::XYPlus);
        assert_eq!(tree.add_node(diag, Direction::YMinus), sibling);
    }

    #[test]
    fn test_relaxation_ignores_distant_parent() {
        let mut tree = SearchTree::new(IVec2::ZERO);
        let a = tree.add_node(SearchTree::ROOT, Direction::XPlus);
        let diag = tree.add_node(SearchTree::ROOT, Direction::XYPlus);

        // (1,1) is a diagonal away from the root, so a fresh node is added
        let via_a = tree.add_node(a, Direction::YPlus);
        assert_ne!(via_a, diag);
        assert_eq!(tree.parent(via_a), Some(a));
        assert_eq!(tree.location(via_a), tree.location(diag));
        assert_eq!(tree.children(SearchTree::ROOT).len(), 2);
    }

    #[test]
    fn test_remove_node_detaches() {
        let mut tree = SearchTree::new(IVec2::ZERO);
        let a = tree.add_node(SearchTree::ROOT, Direction::XMinus);

        tree.remove_node(SearchTree::ROOT, Direction::XMinus);
        assert!(tree.children(SearchTree::ROOT).is_empty());
        assert_eq!(tree.parent(a), Some(SearchTree::ROOT));
        assert_ne!(tree.add_node(SearchTree::ROOT, Direction::XMinus), a);
    }

    #[test]
    fn test_is_ineffective() {
        let mut tree = SearchTree::new(IVec2::ZERO);
        let a = tree.add_node(SearchTree::ROOT, Direction::XPlus);
        let b = tree.add_node(a, Direction::YPlus);

        assert!(tree.is_ineffective(b, Direction::XYMinus));
        assert!(tree.is_ineffective(b, Direction::YMinus));
        assert!(tree.is_ineffective(b, Direction::Zero));
        assert!(!tree.is_ineffective(b, Direction::YPlus));
    }

    #[test]
    fn test_route_from_root() {
        let mut tree = SearchTree::new(IVec2::new(1, 1));
        let a = tree.add_node(SearchTree::ROOT, Direction::XPlus);
        let b = tree.add_node(a, Direction::XPlus);

        let route: Vec<_> = tree.route(b).waypoints().copied().collect();
        assert_eq!(
            route,
            vec![Vec2::new(1.0, 1.0), Vec2::new(2.0, 1.0), Vec2::new(3.0, 1.0)]
        );
    }
}
