//! Plugin dependency resolution using topological sort.
//!
//! Orders plugins so that dependencies come before dependents.
//! Uses Kahn's algorithm with cycle detection.

use std::collections::{BTreeMap, HashMap, VecDeque};

use super::error::PluginError;
use super::info_parser::PluginInfo;

/// Resolve plugin order based on dependencies.
///
/// Returns plugin names sorted so that dependencies come before dependents.
/// Ties are broken alphabetically so the order is deterministic.
///
/// # Errors
/// Returns error if:
/// - A plugin declares a dependency that isn't registered
/// - There is a circular dependency
pub fn resolve_load_order(plugins: &HashMap<String, PluginInfo>) -> Result<Vec<String>, PluginError> {
    // in_degree[p] = number of plugins that p depends on
    let mut in_degree: BTreeMap<&str, usize> = BTreeMap::new();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for name in plugins.keys() {
        in_degree.insert(name.as_str(), 0);
    }

    for (name, info) in plugins {
        for dep in &info.dependencies {
            if !plugins.contains_key(dep) {
                return Err(PluginError::MissingDependency {
                    plugin: name.clone(),
                    dependency: dep.clone(),
                });
            }

            if let Some(degree) = in_degree.get_mut(name.as_str()) {
                *degree += 1;
            }
            dependents.entry(dep.as_str()).or_default().push(name.as_str());
        }
    }

    let mut result = Vec::with_capacity(plugins.len());
    let mut queue: VecDeque<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(name, _)| *name)
        .collect();

    while let Some(plugin) = queue.pop_front() {
        result.push(plugin.to_string());

        if let Some(deps) = dependents.get_mut(plugin) {
            deps.sort_unstable();
            for dependent in deps.iter() {
                if let Some(degree) = in_degree.get_mut(*dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(*dependent);
                    }
                }
            }
        }
    }

    if result.len() != plugins.len() {
        let mut in_cycle: Vec<_> = plugins
            .keys()
            .filter(|k| !result.contains(*k))
            .cloned()
            .collect();
        in_cycle.sort();

        return Err(PluginError::CircularDependency {
            cycle: in_cycle.join(", "),
        });
    }

    Ok(result)
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::plugin::info_parser::TapConfig;

    fn make_plugin(name: &str, deps: Vec<&str>) -> PluginInfo {
        PluginInfo {
            name: name.to_string(),
            description: format!("{name} plugin"),
            version: "1.0.0".to_string(),
            dependencies: deps.into_iter().map(String::from).collect(),
            taps: TapConfig::default(),
        }
    }

    fn plugins(list: Vec<PluginInfo>) -> HashMap<String, PluginInfo> {
        list.into_iter().map(|p| (p.name.clone(), p)).collect()
    }

    #[test]
    fn no_dependencies_is_alphabetical() {
        let order = resolve_load_order(&plugins(vec![
            make_plugin("c", vec![]),
            make_plugin("a", vec![]),
            make_plugin("b", vec![]),
        ]))
        .unwrap();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn simple_chain() {
        let order = resolve_load_order(&plugins(vec![
            make_plugin("a", vec!["b"]),
            make_plugin("b", vec!["c"]),
            make_plugin("c", vec![]),
        ]))
        .unwrap();
        assert_eq!(order, vec!["c", "b", "a"]);
    }

    #[test]
    fn diamond_dependency() {
        let order = resolve_load_order(&plugins(vec![
            make_plugin("d", vec![]),
            make_plugin("b", vec!["d"]),
            make_plugin("c", vec!["d"]),
            make_plugin("a", vec!["b", "c"]),
        ]))
        .unwrap();

        let pos = |n: &str| order.iter().position(|x| x == n).unwrap();
        assert!(pos("d") < pos("b"));
        assert!(pos("d") < pos("c"));
        assert!(pos("b") < pos("a"));
        assert!(pos("c") < pos("a"));
    }

    #[test]
    fn missing_dependency() {
        let err = resolve_load_order(&plugins(vec![make_plugin("a", vec!["missing"])])).unwrap_err();
        assert!(matches!(err, PluginError::MissingDependency { .. }));
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn circular_dependency() {
        let err = resolve_load_order(&plugins(vec![
            make_plugin("a", vec!["b"]),
            make_plugin("b", vec!["c"]),
            make_plugin("c", vec!["a"]),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("circular"));
        assert!(err.to_string().contains("a, b, c"));
    }
}
