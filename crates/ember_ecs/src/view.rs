//! Multi-storage intersection views.
//!
//! Grounded in `libsbx-ecs/libsbx/ecs/view.hpp`'s `basic_common_view`: the
//! pool with the fewest alive entities drives iteration, and every other
//! pool is only ever probed with `contains`, never walked. Ties are broken
//! by the queried type's position in the tuple rather than by comparing
//! `TypeId` ordering (which carries no meaning beyond being a stable key) —
//! both give a deterministic choice, and position is simpler to reason
//! about from the call site.

use crate::entity::Entity;
use crate::registry::Registry;

/// A tuple of component types that can be queried together. Implemented for
/// 2-, 3-, and 4-tuples; add an arity if a wider query is ever needed.
pub trait ComponentQuery<'a> {
    type Item;

    /// The entities of the smallest-populated pool among the queried types,
    /// or an empty slice if any queried type has no storage yet.
    fn driver(registry: &'a Registry) -> &'a [Entity];

    fn fetch(registry: &'a Registry, entity: Entity) -> Option<Self::Item>;

    fn contains(registry: &'a Registry, entity: Entity) -> bool;
}

fn smallest_pool<'a>(pools: &[Option<(usize, &'a [Entity])>]) -> &'a [Entity] {
    let mut resolved = Vec::with_capacity(pools.len());
    for pool in pools {
        match pool {
            Some(p) => resolved.push(*p),
            None => return &[],
        }
    }
    resolved
        .into_iter()
        .min_by_key(|(size, _)| *size)
        .map_or(&[], |(_, entities)| entities)
}

macro_rules! impl_component_query {
    ($($t:ident),+) => {
        impl<'a, $($t: 'static),+> ComponentQuery<'a> for ($($t,)+) {
            type Item = ($(&'a $t,)+);

            fn driver(registry: &'a Registry) -> &'a [Entity] {
                let pools = [
                    $(registry.storage::<$t>().map(|s| (s.len(), s.entities())),)+
                ];
                smallest_pool(&pools)
            }

            fn fetch(registry: &'a Registry, entity: Entity) -> Option<Self::Item> {
                Some(($(registry.get_component::<$t>(entity).ok()?,)+))
            }

            fn contains(registry: &'a Registry, entity: Entity) -> bool {
                $(registry.has_component::<$t>(entity))&&+
            }
        }
    };
}

impl_component_query!(A, B);
impl_component_query!(A, B, C);
impl_component_query!(A, B, C, D);

/// A view over every entity carrying every component type in `Q`.
pub struct View<'a, Q> {
    registry: &'a Registry,
    _marker: std::marker::PhantomData<Q>,
}

impl<'a, Q: ComponentQuery<'a>> View<'a, Q> {
    #[must_use]
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            _marker: std::marker::PhantomData,
        }
    }

    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        Q::contains(self.registry, entity)
    }

    /// Returns the queried components for `entity` if it matches the view.
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<Q::Item> {
        if !self.contains(entity) {
            return None;
        }
        Q::fetch(self.registry, entity)
    }

    /// The first matching entity in driver order, if any.
    #[must_use]
    pub fn find_first(&self) -> Option<Entity> {
        self.iter_entities().next()
    }

    fn iter_entities(&self) -> impl Iterator<Item = Entity> + 'a {
        let registry = self.registry;
        Q::driver(registry).iter().copied().filter(move |&e| Q::contains(registry, e))
    }

    /// Iterates every entity that has all of `Q`, along with its components.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, Q::Item)> + 'a {
        let registry = self.registry;
        Q::driver(registry).iter().copied().filter_map(move |e| {
            if Q::contains(registry, e) {
                Q::fetch(registry, e).map(|item| (e, item))
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_intersects_two_storages() {
        let mut registry = Registry::new();
        let a = registry.create();
        let b = registry.create();
        let c = registry.create();

        registry.add_component(a, 1u32).unwrap();
        registry.add_component(b, 2u32).unwrap();
        registry.add_component(c, 3u32).unwrap();

        registry.add_component(a, "has-both").unwrap();
        registry.add_component(c, "has-both").unwrap();

        let view: View<'_, (u32, &'static str)> = View::new(&registry);
        let mut seen: Vec<_> = view.iter().map(|(e, _)| e).collect();
        seen.sort();
        let mut expected = vec![a, c];
        expected.sort();
        assert_eq!(seen, expected);
        assert!(!view.contains(b));
    }

    #[test]
    fn view_over_unused_component_type_is_empty() {
        let mut registry = Registry::new();
        let a = registry.create();
        registry.add_component(a, 1u32).unwrap();

        let view: View<'_, (u32, f32)> = View::new(&registry);
        assert_eq!(view.iter().count(), 0);
    }
}
