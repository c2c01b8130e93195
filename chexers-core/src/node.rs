//! Search tree nodes in an arena
//!
//! Nodes refer to each other by [`NodeId`] instead of pointers, so a whole
//! tree is dropped at once when its owner is done with it.

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::game::Game;
use crate::state::{Action, State};

/// Node identifier (index into arena)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);
}

/// A state reached by a sequence of actions from the root
#[derive(Clone, Debug)]
pub struct SearchNode {
    pub state: State,
    /// Parent node (None for root)
    pub parent: Option<NodeId>,
    /// Action that led here from the parent (None for root)
    pub action: Option<Action>,
    /// Number of actions from the root
    pub path_cost: u32,
    /// Children already derived, by action
    children: FxHashMap<Action, NodeId>,
}

impl SearchNode {
    fn new(state: State, parent: Option<NodeId>, action: Option<Action>, path_cost: u32) -> Self {
        Self {
            state,
            parent,
            action,
            path_cost,
            children: FxHashMap::default(),
        }
    }

    /// Child already derived for `action`, if any
    pub fn child(&self, action: &Action) -> Option<NodeId> {
        self.children.get(action).copied()
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

/// Arena of search nodes rooted at [`NodeId::ROOT`]
#[derive(Clone, Debug)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
}

impl SearchTree {
    /// Create a new tree with the given root state
    pub fn new(root_state: State) -> Self {
        Self {
            nodes: vec![SearchNode::new(root_state, None, None, 0)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn get(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0]
    }

    pub fn state(&self, id: NodeId) -> &State {
        &self.nodes[id.0].state
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ========================================================================
    // EXPANSION
    // ========================================================================

    /// Child of `id` under the game's transition, derived at most once
    pub fn child(&mut self, game: &Game, id: NodeId, action: Action) -> Result<NodeId> {
        self.child_by(id, action, |state, action| game.result(state, action))
    }

    /// Child of `id` under a caller-supplied transition, derived at most once
    pub fn child_by<F>(&mut self, id: NodeId, action: Action, transition: F) -> Result<NodeId>
    where
        F: FnOnce(&State, Action) -> Result<State>,
    {
        if let Some(existing) = self.get(id).child(&action) {
            return Ok(existing);
        }
        let parent = self.get(id);
        let state = transition(&parent.state, action)?;
        let path_cost = parent.path_cost + 1;

        let child_id = NodeId(self.nodes.len());
        self.nodes
            .push(SearchNode::new(state, Some(id), Some(action), path_cost));
        self.nodes[id.0].children.insert(action, child_id);
        Ok(child_id)
    }

    /// All children of `id`, in the order the rules list the actions
    pub fn expand(&mut self, game: &Game, id: NodeId) -> Result<Vec<NodeId>> {
        let actions = game.actions(self.state(id));
        actions
            .into_iter()
            .map(|action| self.child(game, id, action))
            .collect()
    }

    // ========================================================================
    // PATHS
    // ========================================================================

    /// Nodes from the root down to `id`
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            path.push(node_id);
            current = self.get(node_id).parent;
        }
        path.reverse();
        path
    }

    /// Actions leading from the root to `id`
    pub fn solution(&self, id: NodeId) -> Vec<Action> {
        self.path(id)
            .into_iter()
            .filter_map(|node_id| self.get(node_id).action)
            .collect()
    }
}
