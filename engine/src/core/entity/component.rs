//! Component trait and the context handed to deferred start hooks

use super::store::ComponentStore;
use super::EntityId;
use crate::error::Result;
use crate::physics::Body;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to a component owned by the [`ComponentStore`]
pub type Shared<T> = Rc<RefCell<T>>;

/// Views a component wants to be listed in once it is live
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Receives `update(dt)` every frame
    pub updatable: bool,
    /// Walked by the external render pass
    pub renderable: bool,
    /// Contributes a point light to the render pass
    pub point_light: bool,
}

impl Capabilities {
    /// No derived views
    pub const NONE: Self = Self {
        updatable: false,
        renderable: false,
        point_light: false,
    };

    /// Only the update view
    pub const UPDATABLE: Self = Self {
        updatable: true,
        renderable: false,
        point_light: false,
    };

    /// Only the render view
    pub const RENDERABLE: Self = Self {
        updatable: false,
        renderable: true,
        point_light: false,
    };

    /// Only the point-light view
    pub const POINT_LIGHT: Self = Self {
        updatable: false,
        renderable: false,
        point_light: true,
    };
}

/// A data + behaviour unit attached to exactly one entity.
///
/// Components are constructed by the caller, handed to
/// [`ComponentStore::add`], and become live after the next
/// [`ComponentStore::run_starts`] pass has invoked [`Component::start`].
pub trait Component: Any {
    /// Entity that owns this component
    fn owner(&self) -> EntityId;

    /// Deferred initialization, invoked exactly once before the first update.
    ///
    /// Cross-component lookups belong here: everything added in the same
    /// frame is already visible through [`StartContext::find`]. Returning an
    /// error aborts construction of the owning entity.
    fn start(&mut self, _ctx: &mut StartContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Per-frame update for components that report `updatable`
    fn update(&mut self, _dt: f32) {}

    /// Teardown, invoked once when the component leaves the store.
    ///
    /// Also runs for components that never started, so implementations
    /// must tolerate unresolved dependencies.
    fn stop(&mut self, _ctx: &mut StopContext) {}

    /// Derived views this component belongs to
    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE
    }

    /// Human readable kind name used in logs and errors
    fn kind(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Strip the module path from a type name
pub(crate) fn short_type_name(name: &'static str) -> &'static str {
    name.rsplit("::").next().unwrap_or(name)
}

/// Context available to [`Component::start`]
pub struct StartContext<'a> {
    store: &'a ComponentStore,
    this: Rc<dyn Any>,
    new_bodies: Vec<Shared<Body>>,
}

impl<'a> StartContext<'a> {
    pub(crate) fn new(store: &'a ComponentStore, this: Rc<dyn Any>) -> Self {
        Self {
            store,
            this,
            new_bodies: Vec::new(),
        }
    }

    /// Look up a sibling (or any other) component by kind and owner
    pub fn find<T: Component>(&self, owner: EntityId) -> Option<Shared<T>> {
        self.store.find::<T>(owner)
    }

    /// Shared handle of the component being started.
    ///
    /// The component itself is mutably borrowed while `start` runs, so the
    /// handle may be stored elsewhere but must not be borrowed here.
    pub fn this<T: Component>(&self) -> Option<Shared<T>> {
        self.this.clone().downcast::<RefCell<T>>().ok()
    }

    /// Queue a body for registration with the physics world once the
    /// running start hook has returned successfully
    pub fn register_body(&mut self, body: Shared<Body>) {
        self.new_bodies.push(body);
    }

    pub(crate) fn into_bodies(self) -> Vec<Shared<Body>> {
        self.new_bodies
    }
}

/// Context available to [`Component::stop`]
pub struct StopContext {
    this: Rc<dyn Any>,
    released_bodies: Vec<Shared<Body>>,
}

impl StopContext {
    pub(crate) fn new(this: Rc<dyn Any>) -> Self {
        Self {
            this,
            released_bodies: Vec::new(),
        }
    }

    /// Shared handle of the component being stopped
    pub fn this<T: Component>(&self) -> Option<Shared<T>> {
        self.this.clone().downcast::<RefCell<T>>().ok()
    }

    /// Queue a body for removal from the physics world once the running
    /// stop hook has returned
    pub fn unregister_body(&mut self, body: Shared<Body>) {
        self.released_bodies.push(body);
    }

    pub(crate) fn into_bodies(self) -> Vec<Shared<Body>> {
        self.released_bodies
    }
}
