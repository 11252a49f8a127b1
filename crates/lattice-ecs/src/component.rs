use std::any::Any;
use std::fmt;

use lattice_core::Kind;

/// Upcast helper so boxed components can be downcast to their concrete type.
///
/// Implemented for every sized `'static` type; never implement it by hand.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A data fragment that can be attached to an entity.
///
/// A component reports the [`Kind`] bit(s) identifying its type. Each concrete
/// component type should use its own disjoint bit so that entity masks can be
/// combined and queried with plain bitwise operations.
///
/// # Example
/// ```
/// use lattice_core::Kind;
/// use lattice_ecs::Component;
///
/// const POSITION: Kind = Kind::bit(0);
///
/// struct Position { x: f32, y: f32 }
///
/// impl Component for Position {
///     fn mask(&self) -> Kind {
///         POSITION
///     }
/// }
/// ```
pub trait Component: AsAny + Send + Sync {
    /// The kind bit(s) this component occupies on an entity.
    fn mask(&self) -> Kind;

    /// Optional display name, used by [`EntityStore::filter_by_name`](crate::EntityStore::filter_by_name).
    fn name(&self) -> Option<&str> {
        None
    }
}

impl dyn Component {
    /// Downcast to the concrete component type.
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutably downcast to the concrete component type.
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Whether the component is of type `T`.
    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

impl fmt::Debug for dyn Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("mask", &self.mask())
            .field("name", &self.name())
            .finish()
    }
}
