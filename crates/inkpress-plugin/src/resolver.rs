//! Dependency resolver: computes the plugin initialization order.
//!
//! Topological sort over the dependency graph. Among plugins whose
//! dependencies are all placed, the earliest registered goes first, so an
//! unchanged registry always resolves to the same order.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::descriptor::PluginDescriptor;
use crate::error::PluginError;

/// Orders `plugins` (given in registration order) so that every plugin
/// comes after all of its dependencies.
///
/// # Errors
///
/// [`PluginError::MissingDependency`] if a dependency is not among
/// `plugins`, [`PluginError::CyclicDependency`] if the graph has a cycle.
pub fn resolve_order(plugins: &[PluginDescriptor]) -> Result<Vec<String>, PluginError> {
    let index: HashMap<&str, usize> = plugins
        .iter()
        .enumerate()
        .map(|(i, p)| (p.name.as_str(), i))
        .collect();

    // deps[i] holds the registration indices plugin i depends on.
    let mut deps: Vec<Vec<usize>> = Vec::with_capacity(plugins.len());
    for plugin in plugins {
        let mut seen = HashSet::new();
        let mut resolved = Vec::new();
        for dependency in &plugin.dependencies {
            let &j = index
                .get(dependency.as_str())
                .ok_or_else(|| PluginError::MissingDependency {
                    plugin: plugin.name.clone(),
                    dependency: dependency.clone(),
                })?;
            if seen.insert(j) {
                resolved.push(j);
            }
        }
        deps.push(resolved);
    }

    let mut pending: Vec<usize> = deps.iter().map(Vec::len).collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); plugins.len()];
    for (i, ds) in deps.iter().enumerate() {
        for &j in ds {
            dependents[j].push(i);
        }
    }

    let mut ready: BTreeSet<usize> = (0..plugins.len()).filter(|&i| pending[i] == 0).collect();
    let mut order = Vec::with_capacity(plugins.len());

    while let Some(i) = ready.pop_first() {
        order.push(i);
        for &d in &dependents[i] {
            pending[d] -= 1;
            if pending[d] == 0 {
                ready.insert(d);
            }
        }
    }

    if order.len() < plugins.len() {
        let cycle = find_cycle(&deps, &pending);
        return Err(PluginError::CyclicDependency {
            cycle: cycle.into_iter().map(|i| plugins[i].name.clone()).collect(),
        });
    }

    Ok(order.into_iter().map(|i| plugins[i].name.clone()).collect())
}

/// Walks unplaced plugins along unplaced dependencies until a plugin
/// repeats. Every unplaced plugin has at least one unplaced dependency,
/// so the walk cannot dead-end.
fn find_cycle(deps: &[Vec<usize>], pending: &[usize]) -> Vec<usize> {
    let Some(start) = (0..pending.len()).find(|&i| pending[i] > 0) else {
        return Vec::new();
    };

    let mut path = vec![start];
    let mut position: HashMap<usize, usize> = HashMap::from([(start, 0)]);
    let mut current = start;

    loop {
        let Some(&next) = deps[current].iter().find(|&&j| pending[j] > 0) else {
            return path;
        };
        if let Some(&at) = position.get(&next) {
            return path.split_off(at);
        }
        position.insert(next, path.len());
        path.push(next);
        current = next;
    }
}
