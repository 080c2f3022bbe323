//! Ahead-of-time dependency graph resolution.
//!
//! [`GraphBuilder`] walks the constructors reachable from a set of entry points
//! and produces a [`BindingModel`]: one [`Binding`] per distinct type, with
//! redirects applied and constructor shapes and cycles checked. It never
//! creates instances.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{DiError, DiResult};
use crate::inspector::TypeInspector;
use crate::key::TypeKey;

pub mod export;
pub mod model;

pub use export::ExportFormat;
pub use model::{Binding, BindingModel, RedirectMap};

/// Breadth-first binding graph builder.
///
/// # Examples
///
/// ```
/// use dictor::{injectable, key_of, DiError, GraphBuilder, RedirectMap, TypeRegistry};
/// use std::sync::Arc;
///
/// pub struct Engine;
/// pub struct Wheels;
/// pub struct Auto { engine: Arc<Engine>, wheels: Arc<Wheels> }
/// injectable!(transient Engine {});
/// injectable!(transient Wheels {});
/// injectable!(transient Auto { engine: Engine, wheels: Wheels });
///
/// let mut registry = TypeRegistry::new();
/// registry.register::<Engine>().register::<Wheels>().register::<Auto>();
///
/// let model = GraphBuilder::new(&registry)
///     .build(&[key_of::<Auto>()], &RedirectMap::new())
///     .unwrap();
///
/// let order: Vec<_> = model.bindings().iter().map(|b| b.ty()).collect();
/// assert_eq!(order, vec![key_of::<Auto>(), key_of::<Engine>(), key_of::<Wheels>()]);
/// ```
pub struct GraphBuilder<'a> {
    inspector: &'a dyn TypeInspector,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(inspector: &'a dyn TypeInspector) -> Self {
        Self { inspector }
    }

    /// Builds the binding model for `entry_points` under `redirects`.
    ///
    /// The work queue is seeded with the entry points (redirected) followed by
    /// every redirect target, and each type is expanded exactly once. Fails
    /// with a constructor-shape error for the first offending type, or with
    /// [`DiError::Circular`] if the provided-dependency graph has a cycle.
    pub fn build(&self, entry_points: &[TypeKey], redirects: &RedirectMap) -> DiResult<BindingModel> {
        let mut queue: VecDeque<TypeKey> = entry_points
            .iter()
            .map(|ty| redirects.resolve(ty))
            .chain(redirects.values())
            .collect();
        let mut visited: HashSet<TypeKey> = HashSet::new();
        let mut bindings = Vec::new();

        while let Some(ty) = queue.pop_front() {
            if visited.contains(&ty) {
                continue;
            }

            let constructor = self.inspector.inspect(&ty)?;
            tracing::trace!(ty = ty.name(), deps = constructor.dependencies().len(), "expanding");

            for dep in constructor.dependencies() {
                let provided = redirects.resolve(dep);
                if provided == ty {
                    return Err(DiError::Circular(vec![ty.name(), ty.name()]));
                }
                queue.push_back(provided);
            }

            visited.insert(ty);
            bindings.push(Binding::new(
                ty,
                constructor.dependencies().to_vec(),
                constructor.lifetime(),
            ));
        }

        let model = BindingModel::new(entry_points.to_vec(), bindings, redirects.clone());
        detect_cycle(&model)?;

        tracing::debug!(
            entry_points = entry_points.len(),
            bindings = model.len(),
            singletons = model.singletons().count(),
            redirects = redirects.len(),
            "binding graph resolved"
        );
        Ok(model)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Depth-first walk over provided-dependency edges with an in-progress set.
/// Uses an explicit stack so deep graphs cannot overflow.
fn detect_cycle(model: &BindingModel) -> DiResult<()> {
    let edges: HashMap<TypeKey, Vec<TypeKey>> = model
        .bindings()
        .iter()
        .map(|b| (b.ty(), model.provided_dependencies(b)))
        .collect();
    let mut marks: HashMap<TypeKey, Mark> = HashMap::with_capacity(edges.len());

    for root in model.bindings().iter().map(|b| b.ty()) {
        if marks.contains_key(&root) {
            continue;
        }

        // (type, index of the next dependency to visit)
        let mut stack: Vec<(TypeKey, usize)> = vec![(root, 0)];
        marks.insert(root, Mark::InProgress);

        while let Some((ty, next)) = stack.last().copied() {
            let deps = edges.get(&ty).map(Vec::as_slice).unwrap_or(&[]);
            if next == deps.len() {
                marks.insert(ty, Mark::Done);
                stack.pop();
                continue;
            }
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            let dep = deps[next];
            match marks.get(&dep) {
                Some(Mark::Done) => {}
                Some(Mark::InProgress) => {
                    let start = stack.iter().position(|(t, _)| *t == dep).unwrap_or(0);
                    let mut path: Vec<&'static str> =
                        stack[start..].iter().map(|(t, _)| t.name()).collect();
                    path.push(dep.name());
                    return Err(DiError::Circular(path));
                }
                None => {
                    marks.insert(dep, Mark::InProgress);
                    stack.push((dep, 0));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspector::{Arguments, InjectConstructor, TypeRegistry};
    use crate::key::key_of;
    use crate::lifetime::Lifetime;
    use crate::traits::AnyArc;
    use std::sync::Arc;

    struct A;
    struct B;
    struct C;
    struct D;
    trait Port {}

    fn ctor(ty: TypeKey, deps: Vec<TypeKey>, lifetime: Lifetime) -> InjectConstructor {
        InjectConstructor::new(ty, deps, lifetime, |_args: &mut Arguments| {
            Ok(Arc::new(()) as AnyArc)
        })
    }

    fn registry(edges: &[(TypeKey, Vec<TypeKey>)]) -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        for (ty, deps) in edges {
            registry.register_constructor(ctor(*ty, deps.clone(), Lifetime::Transient));
        }
        registry
    }

    #[test]
    fn test_shared_dependency_expanded_once() {
        let registry = registry(&[
            (key_of::<A>(), vec![key_of::<B>(), key_of::<C>()]),
            (key_of::<B>(), vec![key_of::<D>()]),
            (key_of::<C>(), vec![key_of::<D>()]),
            (key_of::<D>(), vec![]),
        ]);

        let model = GraphBuilder::new(&registry)
            .build(&[key_of::<A>(), key_of::<D>()], &RedirectMap::new())
            .unwrap();

        let order: Vec<_> = model.bindings().iter().map(|b| b.ty()).collect();
        assert_eq!(order, vec![key_of::<A>(), key_of::<D>(), key_of::<B>(), key_of::<C>()]);
        assert!(model.binding(&key_of::<D>()).unwrap().dependencies().is_empty());
    }

    #[test]
    fn test_self_dependency_is_circular() {
        let registry = registry(&[(key_of::<A>(), vec![key_of::<A>()])]);

        let err = GraphBuilder::new(&registry)
            .build(&[key_of::<A>()], &RedirectMap::new())
            .unwrap_err();
        assert_eq!(err, DiError::Circular(vec![key_of::<A>().name(), key_of::<A>().name()]));
    }

    #[test]
    fn test_three_node_cycle_reports_path() {
        let registry = registry(&[
            (key_of::<A>(), vec![key_of::<B>()]),
            (key_of::<B>(), vec![key_of::<C>()]),
            (key_of::<C>(), vec![key_of::<A>()]),
        ]);

        let err = GraphBuilder::new(&registry)
            .build(&[key_of::<A>()], &RedirectMap::new())
            .unwrap_err();
        let names = |keys: &[TypeKey]| keys.iter().map(|k| k.name()).collect::<Vec<_>>();
        assert_eq!(
            err,
            DiError::Circular(names(&[key_of::<A>(), key_of::<B>(), key_of::<C>(), key_of::<A>()]))
        );
    }

    #[test]
    fn test_cycle_through_redirect() {
        let registry = registry(&[
            (key_of::<A>(), vec![key_of::<dyn Port>()]),
            (key_of::<B>(), vec![key_of::<A>()]),
        ]);
        let redirects: RedirectMap = [(key_of::<dyn Port>(), key_of::<B>())].into_iter().collect();

        let err = GraphBuilder::new(&registry)
            .build(&[key_of::<A>()], &redirects)
            .unwrap_err();
        assert!(matches!(err, DiError::Circular(_)));
    }

    #[test]
    fn test_redirect_key_is_not_expanded() {
        let registry = registry(&[
            (key_of::<A>(), vec![key_of::<dyn Port>()]),
            (key_of::<B>(), vec![]),
        ]);
        let redirects: RedirectMap = [(key_of::<dyn Port>(), key_of::<B>())].into_iter().collect();

        let model = GraphBuilder::new(&registry)
            .build(&[key_of::<A>()], &redirects)
            .unwrap();

        assert!(!model.contains(&key_of::<dyn Port>()));
        assert!(model.contains(&key_of::<B>()));
        let a = model.binding(&key_of::<A>()).unwrap();
        assert_eq!(a.dependencies(), &[key_of::<dyn Port>()]);
        assert_eq!(model.provided_dependencies(a), vec![key_of::<B>()]);
    }

    #[test]
    fn test_unreferenced_redirect_target_is_still_expanded() {
        let registry = registry(&[(key_of::<A>(), vec![]), (key_of::<B>(), vec![])]);
        let redirects: RedirectMap = [(key_of::<dyn Port>(), key_of::<B>())].into_iter().collect();

        let model = GraphBuilder::new(&registry)
            .build(&[key_of::<A>()], &redirects)
            .unwrap();
        assert_eq!(model.len(), 2);
        assert_eq!(model.entry_points(), &[key_of::<A>()]);
    }

    #[test]
    fn test_missing_constructor_fails_build() {
        let registry = registry(&[(key_of::<A>(), vec![key_of::<B>()])]);

        let err = GraphBuilder::new(&registry)
            .build(&[key_of::<A>()], &RedirectMap::new())
            .unwrap_err();
        assert_eq!(err, DiError::NoEligibleConstructor(key_of::<B>().name()));
    }

    #[test]
    fn test_ambiguous_constructor_fails_build() {
        let mut registry = registry(&[(key_of::<A>(), vec![key_of::<B>()]), (key_of::<B>(), vec![])]);
        registry.register_constructor(ctor(key_of::<B>(), vec![], Lifetime::Singleton));

        let err = GraphBuilder::new(&registry)
            .build(&[key_of::<A>()], &RedirectMap::new())
            .unwrap_err();
        assert_eq!(err, DiError::MultipleEligibleConstructors(key_of::<B>().name(), 2));
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let registry = registry(&[
            (key_of::<A>(), vec![key_of::<B>(), key_of::<C>()]),
            (key_of::<B>(), vec![key_of::<D>()]),
            (key_of::<C>(), vec![key_of::<D>(), key_of::<B>()]),
            (key_of::<D>(), vec![]),
        ]);

        assert!(GraphBuilder::new(&registry)
            .build(&[key_of::<A>()], &RedirectMap::new())
            .is_ok());
    }
}
