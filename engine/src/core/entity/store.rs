//! Ordered, type-erased component store with deferred start
//!
//! The store owns every component instance. Lookups by (kind, owner) are a
//! linear scan over the insertion-ordered full set; derived views list the
//! live components that are updatable, renderable or point lights.

use super::component::{short_type_name, Component, Shared, StartContext, StopContext};
use super::EntityId;
use crate::error::EngineError;
use crate::physics::PhysicsWorld;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, error, trace, warn};

/// One registered component, viewed both as `Any` (for typed lookup) and as
/// `dyn Component` (for lifecycle hooks). Both handles share one allocation.
#[derive(Clone)]
pub struct ComponentEntry {
    owner: EntityId,
    type_id: TypeId,
    kind: &'static str,
    any: Rc<dyn Any>,
    behaviour: Rc<RefCell<dyn Component>>,
}

impl ComponentEntry {
    /// Owning entity
    pub fn owner(&self) -> EntityId {
        self.owner
    }

    /// Kind name of the component
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Whether this entry holds a component of type `T`
    pub fn is<T: Component>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Typed handle if this entry holds a `T`
    pub fn get<T: Component>(&self) -> Option<Shared<T>> {
        if !self.is::<T>() {
            return None;
        }
        self.any.clone().downcast::<RefCell<T>>().ok()
    }

    /// Type-erased handle for lifecycle calls
    pub fn component(&self) -> &Rc<RefCell<dyn Component>> {
        &self.behaviour
    }
}

impl std::fmt::Debug for ComponentEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentEntry")
            .field("owner", &self.owner)
            .field("kind", &self.kind)
            .finish()
    }
}

/// An entity whose construction was aborted because a start hook failed
#[derive(Debug)]
pub struct StartFailure {
    /// Entity that was torn down
    pub owner: EntityId,
    /// Kind of the component whose start failed
    pub kind: &'static str,
    /// Reason reported by the start hook
    pub error: EngineError,
}

/// Owner of all component instances
#[derive(Default)]
pub struct ComponentStore {
    components: Vec<ComponentEntry>,
    pending: Vec<ComponentEntry>,
    updatables: Vec<ComponentEntry>,
    renderables: Vec<ComponentEntry>,
    point_lights: Vec<ComponentEntry>,
}

impl ComponentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component.
    ///
    /// The component is appended to the full set right away, so it can be
    /// found by start hooks running in the next pass, but it joins the
    /// derived views only after its own `start` has run.
    pub fn add<T: Component>(&mut self, component: T) -> Shared<T> {
        let owner = component.owner();
        let handle: Shared<T> = Rc::new(RefCell::new(component));

        let kind = short_type_name(std::any::type_name::<T>());
        let entry = ComponentEntry {
            owner,
            type_id: TypeId::of::<T>(),
            kind,
            any: handle.clone(),
            behaviour: handle.clone(),
        };

        debug!(owner = %owner, kind, "Component added");
        self.components.push(entry.clone());
        self.pending.push(entry);

        handle
    }

    /// Find the component of kind `T` owned by `owner`.
    ///
    /// Scans the full set in insertion order; if an owner has several
    /// components of the same kind, the first one added wins.
    pub fn find<T: Component>(&self, owner: EntityId) -> Option<Shared<T>> {
        let type_id = TypeId::of::<T>();
        self.components
            .iter()
            .find(|entry| entry.type_id == type_id && entry.owner == owner)
            .and_then(|entry| entry.get::<T>())
    }

    /// Remove every component owned by `owner`. Returns how many were removed.
    ///
    /// Each removed component's stop hook runs, and bodies it releases are
    /// unregistered from `physics` right away.
    pub fn remove(&mut self, owner: EntityId, physics: &mut PhysicsWorld) -> usize {
        self.remove_where(physics, |entry| entry.owner == owner)
    }

    /// Remove only the components of kind `T` owned by `owner`
    pub fn remove_component<T: Component>(
        &mut self,
        owner: EntityId,
        physics: &mut PhysicsWorld,
    ) -> usize {
        let type_id = TypeId::of::<T>();
        self.remove_where(physics, |entry| {
            entry.owner == owner && entry.type_id == type_id
        })
    }

    fn remove_where(
        &mut self,
        physics: &mut PhysicsWorld,
        predicate: impl Fn(&ComponentEntry) -> bool,
    ) -> usize {
        let (removed, kept): (Vec<ComponentEntry>, Vec<ComponentEntry>) =
            std::mem::take(&mut self.components)
                .into_iter()
                .partition(|e| predicate(e));
        self.components = kept;
        self.pending.retain(|e| !predicate(e));
        self.updatables.retain(|e| !predicate(e));
        self.renderables.retain(|e| !predicate(e));
        self.point_lights.retain(|e| !predicate(e));

        for entry in &removed {
            let mut ctx = StopContext::new(entry.any.clone());
            match entry.behaviour.try_borrow_mut() {
                Ok(mut component) => component.stop(&mut ctx),
                Err(_) => {
                    warn!(
                        owner = %entry.owner,
                        kind = entry.kind,
                        "Component borrowed during removal, stop hook skipped"
                    );
                }
            }
            for body in ctx.into_bodies() {
                physics.remove_body(&body);
            }
            debug!(owner = %entry.owner, kind = entry.kind, "Component removed");
        }

        removed.len()
    }

    /// Run every pending start hook exactly once, in insertion order.
    ///
    /// Components whose start succeeds become live and join their derived
    /// views; bodies they registered are handed to `physics`. When a start
    /// hook fails, the whole owning entity is removed.
    pub fn run_starts(&mut self, physics: &mut PhysicsWorld) -> Vec<StartFailure> {
        let pending = std::mem::take(&mut self.pending);
        let mut failures: Vec<StartFailure> = Vec::new();

        for entry in pending {
            if failures.iter().any(|f| f.owner == entry.owner) {
                continue;
            }

            let mut ctx = StartContext::new(self, entry.any.clone());
            let result = entry.behaviour.borrow_mut().start(&mut ctx);
            let new_bodies = ctx.into_bodies();

            match result {
                Ok(()) => {
                    for body in new_bodies {
                        physics.add_body(body);
                    }
                    self.register_views(&entry);
                    trace!(owner = %entry.owner, kind = entry.kind, "Component started");
                }
                Err(error) => {
                    error!(
                        owner = %entry.owner,
                        kind = entry.kind,
                        %error,
                        "Component start failed, aborting entity"
                    );
                    failures.push(StartFailure {
                        owner: entry.owner,
                        kind: entry.kind,
                        error,
                    });
                }
            }
        }

        for failure in &failures {
            self.remove(failure.owner, physics);
        }

        failures
    }

    fn register_views(&mut self, entry: &ComponentEntry) {
        let capabilities = entry.behaviour.borrow().capabilities();
        if capabilities.updatable {
            self.updatables.push(entry.clone());
        }
        if capabilities.renderable {
            self.renderables.push(entry.clone());
        }
        if capabilities.point_light {
            self.point_lights.push(entry.clone());
        }
    }

    /// Update pass over the live updatable components
    pub fn update(&self, dt: f32) {
        for entry in &self.updatables {
            entry.behaviour.borrow_mut().update(dt);
        }
    }

    /// Full set, in insertion order
    pub fn components(&self) -> &[ComponentEntry] {
        &self.components
    }

    /// All components owned by `owner`, in insertion order
    pub fn components_of(&self, owner: EntityId) -> impl Iterator<Item = &ComponentEntry> {
        self.components.iter().filter(move |e| e.owner == owner)
    }

    /// Live components updated every frame
    pub fn updatables(&self) -> &[ComponentEntry] {
        &self.updatables
    }

    /// Live components walked by the render pass
    pub fn renderables(&self) -> &[ComponentEntry] {
        &self.renderables
    }

    /// Live point lights
    pub fn point_lights(&self) -> &[ComponentEntry] {
        &self.point_lights
    }

    /// Number of components in the full set
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True when the store holds no components
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Number of components still waiting for their start hook
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
