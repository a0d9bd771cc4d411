//! Canonical Task Definition
//!
//! `TaskDef` is what every document shape (v1, v2, dynamic) resolves to.
//! A tree is built once and handed to the execution layer read-only.

use std::sync::Arc;

use crate::step::Step;

use super::input::InputConfig;

/// A task: leaf (runs steps) or composite (groups child tasks)
#[derive(Debug, Clone, Default)]
pub struct TaskDef {
    pub name: String,
    pub description: String,
    pub inputs: Vec<InputConfig>,
    pub tasks: Vec<TaskDef>,
    pub steps: Vec<Arc<dyn Step>>,
    /// Script text as written (lines already joined), kept for debugging
    pub script: String,
    pub autoenv: bool,
    pub autodir: bool,
    pub interactive: bool,
}

impl TaskDef {
    pub fn is_leaf(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn is_composite(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Set the name when none was declared (v2 roots have no `name`)
    pub fn or_named(mut self, name: impl Into<String>) -> Self {
        if self.name.is_empty() {
            self.name = name.into();
        }
        self
    }

    /// Same body under another name
    pub fn renamed(self, name: impl Into<String>) -> Self {
        TaskDef {
            name: name.into(),
            ..self
        }
    }

    /// Descend through child names; an empty path is `self`
    pub fn find(&self, path: &[&str]) -> Option<&TaskDef> {
        path.iter().try_fold(self, |task, segment| {
            task.tasks.iter().find(|child| child.name == *segment)
        })
    }

    /// Depth-first, pre-order visit of this task and all descendants
    ///
    /// The callback gets the name path from `self` down to the visited task.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&[&str], &TaskDef),
    {
        let mut path = Vec::new();
        self.walk_inner(&mut path, &mut visit);
    }

    fn walk_inner<'a, F>(&'a self, path: &mut Vec<&'a str>, visit: &mut F)
    where
        F: FnMut(&[&str], &TaskDef),
    {
        path.push(&self.name);
        visit(path.as_slice(), self);
        for child in &self.tasks {
            child.walk_inner(path, visit);
        }
        path.pop();
    }

    /// Number of tasks in this tree, `self` included
    pub fn task_count(&self) -> usize {
        1 + self.tasks.iter().map(TaskDef::task_count).sum::<usize>()
    }

    /// Number of top-level steps in this tree
    pub fn step_count(&self) -> usize {
        self.steps.len() + self.tasks.iter().map(TaskDef::step_count).sum::<usize>()
    }

    pub fn positional_inputs(&self) -> impl Iterator<Item = &InputConfig> {
        self.inputs.iter().filter(|i| i.is_positional())
    }

    pub fn named_inputs(&self) -> impl Iterator<Item = &InputConfig> {
        self.inputs.iter().filter(|i| !i.is_positional())
    }
}

/// Turn `name → body` pairs into named tasks
///
/// Each body keeps its fields; only the name comes from the key.
pub fn named_tasks_to_array<I>(tasks: I) -> Vec<TaskDef>
where
    I: IntoIterator<Item = (String, TaskDef)>,
{
    tasks
        .into_iter()
        .map(|(name, body)| body.renamed(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashMap};

    fn task(name: &str, children: Vec<TaskDef>) -> TaskDef {
        TaskDef {
            name: name.to_string(),
            tasks: children,
            ..Default::default()
        }
    }

    #[test]
    fn test_leaf_and_composite() {
        let leaf = task("compile", vec![]);
        let root = task("build", vec![leaf.clone()]);
        assert!(leaf.is_leaf());
        assert!(root.is_composite());
        assert!(!root.is_leaf());
    }

    #[test]
    fn test_find_by_path() {
        let root = task(
            "root",
            vec![task("test", vec![task("unit", vec![]), task("e2e", vec![])])],
        );
        assert_eq!(root.find(&["test", "e2e"]).unwrap().name, "e2e");
        assert_eq!(root.find(&[]).unwrap().name, "root");
        assert!(root.find(&["test", "missing"]).is_none());
    }

    #[test]
    fn test_walk_visits_in_pre_order_with_paths() {
        let root = task(
            "root",
            vec![task("a", vec![task("a1", vec![])]), task("b", vec![])],
        );
        let mut seen = Vec::new();
        root.walk(|path, _| seen.push(path.join(".")));
        assert_eq!(seen, vec!["root", "root.a", "root.a.a1", "root.b"]);
        assert_eq!(root.task_count(), 4);
    }

    #[test]
    fn test_named_tasks_to_array_uses_keys_as_names() {
        let mut map = HashMap::new();
        for key in ["deploy", "build", "test"] {
            let body = TaskDef {
                name: "ignored".to_string(),
                description: format!("{key} body"),
                autoenv: true,
                ..Default::default()
            };
            map.insert(key.to_string(), body);
        }

        let tasks = named_tasks_to_array(map.clone());
        assert_eq!(tasks.len(), map.len());
        let names: BTreeSet<_> = tasks.iter().map(|t| t.name.clone()).collect();
        let keys: BTreeSet<_> = map.keys().cloned().collect();
        assert_eq!(names, keys);
        for t in &tasks {
            assert_eq!(t.description, format!("{} body", t.name));
            assert!(t.autoenv);
        }
    }

    #[test]
    fn test_or_named_keeps_declared_name() {
        assert_eq!(task("", vec![]).or_named("file").name, "file");
        assert_eq!(task("build", vec![]).or_named("file").name, "build");
    }
}
