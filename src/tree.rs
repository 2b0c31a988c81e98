use crate::position::{Position, SanError};
use cozy_chess::Board;

/// Index of a node inside a [`MoveTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// One ply of the merged tree. The root carries no move and has ply -1.
#[derive(Debug, Clone)]
pub struct MoveNode<M> {
    mv: Option<M>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    ply: i32,
}

impl<M: Copy> MoveNode<M> {
    pub fn mv(&self) -> Option<M> {
        self.mv
    }
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
    /// Variations in insertion order; the first one is the mainline.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
    pub fn ply(&self) -> i32 {
        self.ply
    }
    pub fn is_root(&self) -> bool {
        self.mv.is_none()
    }
}

/// Where a line stopped merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Position of the offending token in the line.
    pub index: usize,
    pub token: String,
    pub error: SanError,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    /// Deepest node reached by the line.
    pub leaf: NodeId,
    /// Tokens that ended up on the path, reused or created.
    pub merged: usize,
    pub created: usize,
    pub rejected: Option<Rejection>,
}

/// Append-only game tree merging move sequences on shared prefixes.
///
/// Nodes live in an arena owned by the tree; parents list their children by
/// id and children point back at their parent by id. Among the children of
/// one node no move appears twice.
#[derive(Debug, Clone)]
pub struct MoveTree<P: Position> {
    start: P,
    nodes: Vec<MoveNode<P::Move>>,
}

/// Tree over standard chess from the initial position.
pub type ChessTree = MoveTree<Board>;

impl Default for MoveTree<Board> {
    fn default() -> Self {
        Self::new(Board::default())
    }
}

impl<P: Position> MoveTree<P> {
    pub fn new(start: P) -> Self {
        let root = MoveNode {
            mv: None,
            parent: None,
            children: Vec::new(),
            ply: -1,
        };
        Self {
            start,
            nodes: vec![root],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn start(&self) -> &P {
        &self.start
    }

    /// Panics if `id` was not handed out by this tree.
    pub fn node(&self, id: NodeId) -> &MoveNode<P::Move> {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Number of nodes holding a move (the root is not counted).
    pub fn move_count(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Every node id in creation order, root first.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn find_child(&self, parent: NodeId, mv: P::Move) -> Option<NodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c.0].mv == Some(mv))
    }

    /// Returns the child of `parent` holding `mv`, creating it if needed.
    /// The flag is true when a node was created.
    pub fn child_or_insert(&mut self, parent: NodeId, mv: P::Move) -> (NodeId, bool) {
        if let Some(existing) = self.find_child(parent, mv) {
            return (existing, false);
        }
        let id = NodeId(self.nodes.len());
        let ply = self.nodes[parent.0].ply + 1;
        self.nodes.push(MoveNode {
            mv: Some(mv),
            parent: Some(parent),
            children: Vec::new(),
            ply,
        });
        self.nodes[parent.0].children.push(id);
        (id, true)
    }

    /// Moves from the root down to `id`, root excluded.
    pub fn path(&self, id: NodeId) -> Vec<P::Move> {
        let mut moves = Vec::new();
        let mut cur = Some(id);
        while let Some(n) = cur {
            let node = &self.nodes[n.0];
            if let Some(mv) = node.mv {
                moves.push(mv);
            }
            cur = node.parent;
        }
        moves.reverse();
        moves
    }

    /// Board after the move at `id`, rebuilt by replaying from the start.
    pub fn position_at(&self, id: NodeId) -> P {
        let mut pos = self.start.clone();
        for mv in self.path(id) {
            pos.play_move(mv);
        }
        pos
    }

    /// Canonical notation of the move at `id`, read in the parent's position.
    pub fn notation(&self, id: NodeId) -> Option<String> {
        let node = &self.nodes[id.0];
        let mv = node.mv?;
        let before = self.position_at(node.parent?);
        Some(before.notation(mv).unwrap_or_else(|| P::move_text(mv)))
    }

    /// Threads one tokenized line through the tree.
    ///
    /// Existing children are reused, missing ones appended. The first token
    /// that does not parse in its position stops the line; nodes merged
    /// before it are kept.
    pub fn insert_line<S: AsRef<str>>(&mut self, tokens: &[S]) -> Insertion {
        let mut node = self.root();
        let mut pos = self.start.clone();
        let mut created = 0;
        let mut rejected = None;
        let mut merged = 0;

        for (index, token) in tokens.iter().enumerate() {
            let token = token.as_ref();
            let mv = match pos.parse_move(token) {
                Ok(mv) => mv,
                Err(error) => {
                    rejected = Some(Rejection {
                        index,
                        token: token.to_string(),
                        error,
                    });
                    break;
                }
            };
            let (next, fresh) = self.child_or_insert(node, mv);
            if fresh {
                created += 1;
            }
            pos.play_move(mv);
            node = next;
            merged += 1;
        }

        Insertion {
            leaf: node,
            merged,
            created,
            rejected,
        }
    }

    /// Follows a sequence of tokens without modifying the tree.
    pub fn lookup<S: AsRef<str>>(&self, tokens: &[S]) -> Option<NodeId> {
        let mut node = self.root();
        let mut pos = self.start.clone();
        for token in tokens {
            let mv = pos.parse_move(token.as_ref()).ok()?;
            node = self.find_child(node, mv)?;
            pos.play_move(mv);
        }
        Some(node)
    }
}
