//! Arena scene store
//!
//! Nodes live in a flat vector and are addressed by [`NodeId`], a slot index
//! paired with a generation counter. Removing a node bumps its slot's
//! generation, so a handle kept across a removal is reported as stale
//! instead of silently pointing at whatever reuses the slot.
//!
//! The motion loop never touches the store directly; it goes through
//! [`SceneAccess`], which the store implements and which the Bevy host
//! implements over ECS entities.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::math::Transform;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("Unknown node: {0}")]
    UnknownNode(String),
    #[error("Stale node handle: {0}")]
    StaleNode(String),
}

/// Stable handle to a node in a [`SceneStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Host-side view of a scene that the motion loop can drive
pub trait SceneAccess {
    type Handle: Copy + std::fmt::Debug;

    /// Replace a node's local transform
    fn set_local(&mut self, node: Self::Handle, transform: Transform) -> Result<(), SceneError>;

    /// Mutate a node's local transform in place
    fn modify_local<F>(&mut self, node: Self::Handle, f: F) -> Result<(), SceneError>
    where
        F: FnOnce(&mut Transform);

    /// Current world transform, reflecting every local change made so far
    /// in this frame
    fn world_transform(&mut self, node: Self::Handle) -> Result<Transform, SceneError>;

    /// Feed elapsed time to the noise post-process
    fn set_noise_time(&mut self, time: f32);
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    tag: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: Transform,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Generational arena of scene nodes
#[derive(Debug, Clone, Default)]
pub struct SceneStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    noise_time: f32,
}

impl SceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Add a node, optionally under `parent`
    pub fn spawn(
        &mut self,
        name: impl Into<String>,
        parent: Option<NodeId>,
        local: Transform,
    ) -> Result<NodeId, SceneError> {
        if let Some(parent) = parent {
            self.node(parent)?;
        }

        let node = Node {
            name: name.into(),
            tag: None,
            parent,
            children: Vec::new(),
            local,
        };

        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId { index, generation: 0 }
            }
        };

        if let Some(parent) = parent {
            self.node_mut(parent)?.children.push(id);
        }
        Ok(id)
    }

    /// Tag a node (the equivalent of glTF `userData.name`)
    pub fn set_tag(&mut self, id: NodeId, tag: impl Into<String>) -> Result<(), SceneError> {
        self.node_mut(id)?.tag = Some(tag.into());
        Ok(())
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, SceneError> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], SceneError> {
        Ok(&self.node(id)?.children)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    /// Remove a node and its whole subtree
    pub fn remove(&mut self, id: NodeId) -> Result<(), SceneError> {
        let parent = self.node(id)?.parent;
        if let Some(parent) = parent {
            if let Ok(p) = self.node_mut(parent) {
                p.children.retain(|c| *c != id);
            }
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let slot = &mut self.slots[current.index as usize];
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
            }
        }
        Ok(())
    }

    pub fn local(&self, id: NodeId) -> Result<&Transform, SceneError> {
        Ok(&self.node(id)?.local)
    }

    pub fn local_mut(&mut self, id: NodeId) -> Result<&mut Transform, SceneError> {
        Ok(&mut self.node_mut(id)?.local)
    }

    /// Compose local transforms from the root down to `id`
    pub fn world(&self, id: NodeId) -> Result<Transform, SceneError> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current)?;
            chain.push(node.local);
            cursor = node.parent;
        }

        Ok(chain
            .iter()
            .rev()
            .fold(Transform::IDENTITY, |acc, local| acc.mul_transform(local)))
    }

    /// Depth-first, pre-order search of the subtree under `root` for the
    /// first node carrying `tag`
    pub fn find_by_tag(&self, root: NodeId, tag: &str) -> Result<Option<NodeId>, SceneError> {
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            let node = self.node(current)?;
            if node.tag.as_deref() == Some(tag) {
                debug!(node = %current, name = %node.name, tag, "Found tagged node");
                return Ok(Some(current));
            }
            stack.extend(node.children.iter().rev().copied());
        }
        Ok(None)
    }

    /// Last value written by the motion loop for the noise pass
    pub fn noise_time(&self) -> f32 {
        self.noise_time
    }

    fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        let slot = self
            .slots
            .get(id.index as usize)
            .ok_or_else(|| SceneError::UnknownNode(id.to_string()))?;
        if slot.generation != id.generation {
            return Err(SceneError::StaleNode(id.to_string()));
        }
        slot.node
            .as_ref()
            .ok_or_else(|| SceneError::StaleNode(id.to_string()))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .ok_or_else(|| SceneError::UnknownNode(id.to_string()))?;
        if slot.generation != id.generation {
            return Err(SceneError::StaleNode(id.to_string()));
        }
        slot.node
            .as_mut()
            .ok_or_else(|| SceneError::StaleNode(id.to_string()))
    }
}

impl SceneAccess for SceneStore {
    type Handle = NodeId;

    fn set_local(&mut self, node: NodeId, transform: Transform) -> Result<(), SceneError> {
        *self.local_mut(node)? = transform;
        Ok(())
    }

    fn modify_local<F>(&mut self, node: NodeId, f: F) -> Result<(), SceneError>
    where
        F: FnOnce(&mut Transform),
    {
        f(self.local_mut(node)?);
        Ok(())
    }

    fn world_transform(&mut self, node: NodeId) -> Result<Transform, SceneError> {
        self.world(node)
    }

    fn set_noise_time(&mut self, time: f32) {
        self.noise_time = time;
    }
}
