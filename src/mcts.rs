//! Monte Carlo Tree Search (MCTS) implementation with UCB1.
//!
//! This module implements plain UCT:
//! - UCB1 for node selection, unvisited children first
//! - Lazy expansion once a node has been visited
//! - Uniform random playouts for value estimation
//! - Backpropagation with the value inverted at every level
//!
//! Nodes live in an arena owned by [`Tree`] and refer to each other by
//! [`NodeId`]. The whole tree is dropped when a search returns.
//!
//! A node's `mean` is the expected occupation of the player who moved *into*
//! the node, so a parent picks the child with the best mean for itself.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::board::{Board, Player};
use crate::constants::{EXPLORATION_CONST, MIN_VISITS_TO_EXPAND};
use crate::playout::{RandomSource, simulate};

/// Index of a node in the tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A node in the MCTS search tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// The position at this node, canonical for `player`
    pub board: Board,
    /// Absolute color to move at this node, relative to the search root
    pub player: Player,
    /// Set on expansion when the side to move has no legal move
    pub is_pass: bool,
    /// Number of playouts backed up through this node
    pub games: u32,
    /// Running mean of backed-up values, only meaningful once `games > 0`
    pub mean: f32,
    /// Parent node, `None` for the root
    pub parent: Option<NodeId>,
    /// Children, empty until expanded
    pub children: Vec<NodeId>,
}

impl TreeNode {
    fn new(board: Board, player: Player, parent: Option<NodeId>) -> Self {
        Self {
            board,
            player,
            is_pass: false,
            games: 0,
            mean: 0.0,
            parent,
            children: Vec::new(),
        }
    }

    /// Expected final occupation for the side to move at this node.
    #[inline]
    pub fn expected_occupation(&self) -> f32 {
        1.0 - self.mean
    }
}

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    /// Create a tree whose root is `board` with Black to move.
    pub fn new(board: &Board) -> Self {
        Self {
            nodes: vec![TreeNode::new(*board, Player::Black, None)],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.0]
    }

    /// Total number of nodes in the tree. Never 0: the root always exists.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    fn allocate(&mut self, node: TreeNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn parent_is_pass(&self, id: NodeId) -> bool {
        self.node(id)
            .parent
            .is_some_and(|parent| self.node(parent).is_pass)
    }

    /// Whether the search should stop descending at this node.
    ///
    /// True for unexpanded nodes, full boards, and a pass answered by a pass.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        let node = self.node(id);
        node.children.is_empty()
            || node.board.is_filled()
            || (node.is_pass && self.parent_is_pass(id))
    }

    /// Expand a node by generating one child per legal move.
    ///
    /// Does nothing until the node has `MIN_VISITS_TO_EXPAND` visits, or if
    /// it already has children. A node without legal moves becomes a pass
    /// node with a single color-swapped child, unless its parent was a pass
    /// too, in which case the game is over and nothing is added.
    pub fn expand(&mut self, id: NodeId) {
        let parent_is_pass = self.parent_is_pass(id);
        let node = self.node(id);
        if node.is_pass && parent_is_pass {
            return;
        }
        if !node.children.is_empty() || node.games < MIN_VISITS_TO_EXPAND {
            return;
        }

        let board = node.board;
        let next_player = node.player.opponent();
        let boards = board.next_states();
        let is_pass = boards.is_empty();
        self.node_mut(id).is_pass = is_pass;

        if is_pass {
            if parent_is_pass {
                trace!(node = id.0, "second pass, game over");
                return;
            }
            trace!(node = id.0, "no legal move, adding pass child");
            let child = self.allocate(TreeNode::new(board.flipped(), next_player, Some(id)));
            self.node_mut(id).children.push(child);
        } else {
            let children: Vec<NodeId> = boards
                .into_iter()
                .map(|b| self.allocate(TreeNode::new(b, next_player, Some(id))))
                .collect();
            trace!(node = id.0, children = children.len(), "expanded");
            self.node_mut(id).children = children;
        }
    }

    /// UCB1 score of `child` under a parent with `parent_games` visits.
    fn ucb(parent_games: u32, child: &TreeNode) -> f32 {
        if child.games == 0 {
            return f32::INFINITY;
        }
        debug_assert!(child.games <= parent_games);
        let bias = EXPLORATION_CONST * ((parent_games as f32).ln() / child.games as f32).sqrt();
        child.mean + bias
    }

    /// Select the child with the highest UCB1 score.
    ///
    /// Unvisited children score infinity. Ties go to the first child.
    pub fn select_by_ucb(&self, id: NodeId) -> Option<NodeId> {
        let parent_games = self.node(id).games;
        self.first_max_child(id, |child| Self::ucb(parent_games, child))
    }

    /// Select the most visited child (the "robust child").
    pub fn select_by_visits(&self, id: NodeId) -> Option<NodeId> {
        self.first_max_child(id, |child| child.games)
    }

    fn first_max_child<T, F>(&self, id: NodeId, score: F) -> Option<NodeId>
    where
        T: PartialOrd,
        F: Fn(&TreeNode) -> T,
    {
        let mut best: Option<(NodeId, T)> = None;
        for &child in &self.node(id).children {
            let value = score(self.node(child));
            let better = match &best {
                Some((_, best_value)) => value > *best_value,
                None => true,
            };
            if better {
                best = Some((child, value));
            }
        }
        best.map(|(child, _)| child)
    }

    /// Run one random playout from `id` and back the result up to the root.
    pub fn playout(&mut self, id: NodeId, rng: &mut RandomSource) {
        let node = self.node(id);
        let result = simulate(&node.board, node.is_pass, rng);
        self.propagate_result(id, result.value());
    }

    /// Fold `value` into the running mean of `id` and every ancestor.
    ///
    /// The value is inverted at each step up since parent and child are
    /// scored for opposite players.
    pub fn propagate_result(&mut self, id: NodeId, value: f32) {
        let mut value = value;
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node_mut(node_id);
            node.mean = (node.games as f32 * node.mean + value) / (node.games as f32 + 1.0);
            node.games += 1;
            value = 1.0 - value;
            current = node.parent;
        }
    }

    /// Descend from the root along UCB1 choices until a leaf is reached.
    fn descend(&self) -> NodeId {
        let mut current = self.root();
        while !self.is_leaf(current) {
            match self.select_by_ucb(current) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Run one select / playout / expand iteration.
    pub fn iterate(&mut self, rng: &mut RandomSource) {
        let leaf = self.descend();
        self.playout(leaf, rng);
        self.expand(leaf);
    }

    /// Log statistics for the root's children.
    pub fn dump_children(&self) {
        for &child in &self.node(self.root()).children {
            let node = self.node(child);
            debug!(
                node = child.0,
                games = node.games,
                mean = node.mean,
                "root child"
            );
        }
    }
}

/// Result of a move search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Chosen position, canonical for the opponent of the searching side
    pub board: Board,
    /// Playouts backed up through the root (0 when no search was needed)
    pub games: u32,
    /// Expected final occupation for the searching side, if a search ran
    pub expected_occupation: Option<f32>,
}

impl SearchResult {
    fn forced(board: Board) -> Self {
        Self {
            board,
            games: 0,
            expected_occupation: None,
        }
    }
}

/// Choose a reply for the side to move on `board`.
///
/// With no legal move the result is the color-swapped board (a pass); with
/// exactly one it is returned without searching. Otherwise MCTS runs until
/// `budget` has elapsed and the most visited root child is returned. The
/// time check happens between iterations, and at least one iteration always
/// runs so the root is expanded.
pub fn search_with_stats(board: &Board, budget: Duration, rng: &mut RandomSource) -> SearchResult {
    let mut boards = board.next_states();
    match boards.len() {
        0 => return SearchResult::forced(board.flipped()),
        1 => return SearchResult::forced(boards.swap_remove(0)),
        _ => {}
    }

    let mut tree = Tree::new(board);
    let root = tree.root();
    tree.expand(root);

    let start = Instant::now();
    while start.elapsed() < budget || tree.node(root).children.is_empty() {
        tree.iterate(rng);
    }

    tree.dump_children();
    let best = tree
        .select_by_visits(root)
        .expect("root has children after the first iteration");
    let root_node = tree.node(root);
    debug!(
        games = root_node.games,
        nodes = tree.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "search finished"
    );

    SearchResult {
        board: tree.node(best).board,
        games: root_node.games,
        expected_occupation: Some(root_node.expected_occupation()),
    }
}

/// Choose a reply for the side to move on `board`; see [`search_with_stats`].
pub fn search_move(board: &Board, budget: Duration, rng: &mut RandomSource) -> Board {
    search_with_stats(board, budget, rng).board
}
