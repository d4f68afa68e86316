// Navigable view over the command tree.
//
// A `Namespace` is one level of the discovered tree. Child namespaces and
// commands are materialized on first access and cached on the node that
// owns them; resolving the same name twice yields an equivalent handle
// whether or not the cache was hit. Addressing a name that was not
// discovered fails before any network activity.

use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

use crate::client::Dispatcher;
use crate::command::Command;
use crate::errors::{Result, RpcError};
use crate::tree::{CommandTree, Segment};

pub struct Namespace {
    path: Vec<Segment>,
    children: CommandTree,
    dispatcher: Arc<Dispatcher>,
    namespaces: DashMap<Segment, Arc<Namespace>>,
    commands: DashMap<String, Command>,
}

impl Namespace {
    pub(crate) fn root(children: CommandTree, dispatcher: Arc<Dispatcher>) -> Self {
        Self::new(Vec::new(), children, dispatcher)
    }

    fn new(path: Vec<Segment>, children: CommandTree, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            path,
            children,
            dispatcher,
            namespaces: DashMap::new(),
            commands: DashMap::new(),
        }
    }

    /// Last path segment; `None` for the root
    pub fn name(&self) -> Option<&Segment> {
        self.path.last()
    }

    pub fn path(&self) -> &[Segment] {
        &self.path
    }

    /// Dotted path from the root; empty for the root itself
    pub fn full_name(&self) -> String {
        self.path
            .iter()
            .map(Segment::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Commands and namespaces below this level
    pub fn children(&self) -> &CommandTree {
        &self.children
    }

    pub fn has_namespace(&self, name: impl Into<Segment>) -> bool {
        self.children.namespace(&name.into()).is_some()
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.children.has_command(name)
    }

    pub fn resolve_namespace(&self, name: impl Into<Segment>) -> Result<Arc<Namespace>> {
        let key = name.into();
        let subtree = self
            .children
            .namespace(&key)
            .ok_or_else(|| RpcError::unknown_namespace(&key, &self.full_name()))?;

        if let Some(cached) = self.namespaces.get(&key) {
            return Ok(Arc::clone(cached.value()));
        }

        let mut path = self.path.clone();
        path.push(key.clone());
        let child = self
            .namespaces
            .entry(key)
            .or_insert_with(|| {
                Arc::new(Namespace::new(path, subtree.clone(), Arc::clone(&self.dispatcher)))
            });
        Ok(Arc::clone(child.value()))
    }

    /// Bound command `name` at this level, without invoking it
    pub fn command(&self, name: &str) -> Result<Command> {
        if !self.children.has_command(name) {
            return Err(RpcError::unknown_command(name, &self.full_name()));
        }

        let command = self
            .commands
            .entry(name.to_string())
            .or_insert_with(|| {
                Command::new(name, self.path.clone(), Arc::clone(&self.dispatcher))
            });
        Ok(command.value().clone())
    }

    /// Resolve command `name` at this level and invoke it with `arguments`
    pub async fn call(&self, name: &str, arguments: Vec<Value>) -> Result<Value> {
        self.command(name)?
            .with_arguments(arguments)
            .execute()
            .await
    }

    /// Resolve a dotted path (`"label.set_torrent"`) relative to this namespace
    pub fn resolve(&self, method: &str) -> Result<Command> {
        let mut segments: Vec<&str> = method.split('.').collect();
        let command = segments.pop().unwrap_or_default();

        let mut current: Option<Arc<Namespace>> = None;
        for segment in segments {
            let next = match &current {
                Some(namespace) => namespace.resolve_namespace(segment)?,
                None => self.resolve_namespace(segment)?,
            };
            current = Some(next);
        }

        match current {
            Some(namespace) => namespace.command(command),
            None => self.command(command),
        }
    }
}

impl std::fmt::Debug for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Namespace")
            .field("path", &self.full_name())
            .field("commands", &self.children.commands().collect::<Vec<_>>())
            .finish()
    }
}
