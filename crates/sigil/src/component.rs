// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Stateful components built on compiled templates.
//!
//! A [`Component`] owns a [`StateStore`], a compiled template and a
//! [`Surface`] to render into. State only changes through
//! [`Component::set_state`], which overlays a patch, runs the observers
//! registered for the fields that changed, and re-renders once.
//!
//! ```rust,ignore
//! use sigil::component::{Component, NoopHooks, StringSurface};
//! use sigil::{Data, Engine};
//!
//! let mut counter = Component::new(
//!     Data::new().with("count", 0),
//!     StringSurface::new(),
//!     NoopHooks,
//! );
//! counter.watch("count", |old, new| println!("{old:?} -> {new}"));
//! counter.mount(&Engine::new(), "Count: @{count}")?;
//! counter.set_state(Data::new().with("count", 1))?;
//!
//! assert_eq!(counter.surface().content(), "Count: 1");
//! ```

use crate::engine::Engine;
use crate::error::Result;
use crate::safe_string::SafeString;
use crate::template::CompiledTemplate;
use crate::value::{Data, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Callback invoked with `(old, new)` when a watched field changes.
///
/// `old` is `None` when the field did not exist before.
pub type Observer = Box<dyn FnMut(Option<&Value>, &Value) + Send>;

/// One field changed by a state patch.
#[derive(Debug, Clone, PartialEq)]
pub struct Change {
    /// Field name.
    pub key: String,
    /// Previous value, if the field existed.
    pub old: Option<Value>,
    /// Value after the patch.
    pub new: Value,
}

/// Component state with per-field observers.
#[derive(Default)]
pub struct StateStore {
    state: Data,
    observers: BTreeMap<String, Vec<Observer>>,
}

impl StateStore {
    /// Creates a store holding `initial`.
    pub fn new(initial: Data) -> Self {
        Self {
            state: initial,
            observers: BTreeMap::new(),
        }
    }

    /// The current state.
    pub fn state(&self) -> &Data {
        &self.state
    }

    /// Reads one field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    /// Registers an observer for `key`. Observers of one field run in
    /// registration order.
    pub fn observe<F>(&mut self, key: impl Into<String>, callback: F)
    where
        F: FnMut(Option<&Value>, &Value) + Send + 'static,
    {
        self.observers
            .entry(key.into())
            .or_default()
            .push(Box::new(callback));
    }

    /// Applies a patch and returns the fields whose value changed, in patch
    /// order. Fields set to their current value are skipped.
    pub fn overlay(&mut self, patch: Data) -> Vec<Change> {
        let mut changes = Vec::new();
        for (key, new) in patch {
            if self.state.get(&key) == Some(&new) {
                continue;
            }
            let old = self.state.insert(key.clone(), new.clone());
            changes.push(Change { key, old, new });
        }
        changes
    }

    /// Runs the observers of every changed field.
    pub fn notify(&mut self, changes: &[Change]) {
        for change in changes {
            if let Some(observers) = self.observers.get_mut(&change.key) {
                for observer in observers.iter_mut() {
                    observer(change.old.as_ref(), &change.new);
                }
            }
        }
    }
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let observed: Vec<(&str, usize)> = self
            .observers
            .iter()
            .map(|(key, list)| (key.as_str(), list.len()))
            .collect();
        f.debug_struct("StateStore")
            .field("state", &self.state)
            .field("observers", &observed)
            .finish()
    }
}

/// Rendering target of a component.
pub trait Surface {
    /// Replaces everything shown with `content`.
    fn replace_content(&mut self, content: &SafeString);
    /// Removes everything shown.
    fn clear(&mut self);
}

/// A surface that keeps the last rendered output in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringSurface {
    content: String,
    renders: usize,
}

impl StringSurface {
    /// Creates an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// How many times content was replaced.
    pub fn renders(&self) -> usize {
        self.renders
    }
}

impl Surface for StringSurface {
    fn replace_content(&mut self, content: &SafeString) {
        self.content.clear();
        self.content.push_str(content.as_str());
        self.renders += 1;
    }

    fn clear(&mut self) {
        self.content.clear();
    }
}

/// Component lifecycle hooks. Every hook defaults to doing nothing.
pub trait Lifecycle {
    /// Runs once per mount, before the template is compiled.
    fn on_init(&mut self, _state: &Data) {}
    /// Runs before each render.
    fn on_before_render(&mut self, _state: &Data) {}
    /// Runs after each successful render.
    fn on_after_render(&mut self, _state: &Data) {}
    /// Runs on unmount, before the surface is cleared.
    fn on_cleanup(&mut self) {}
}

/// Lifecycle with no hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl Lifecycle for NoopHooks {}

/// A template bound to explicit state and a rendering surface.
#[derive(Debug)]
pub struct Component<S, H = NoopHooks> {
    store: StateStore,
    template: Option<CompiledTemplate>,
    surface: S,
    hooks: H,
    mounted: bool,
}

impl<S: Surface, H: Lifecycle> Component<S, H> {
    /// Creates an unmounted component.
    pub fn new(initial: Data, surface: S, hooks: H) -> Self {
        Self {
            store: StateStore::new(initial),
            template: None,
            surface,
            hooks,
            mounted: false,
        }
    }

    /// Registers an observer for a state field.
    ///
    /// Observers only run for changes made while the component is mounted.
    pub fn watch<F>(&mut self, key: impl Into<String>, callback: F)
    where
        F: FnMut(Option<&Value>, &Value) + Send + 'static,
    {
        self.store.observe(key, callback);
    }

    /// Compiles `source` and renders it into the surface.
    ///
    /// Mounting an already mounted component replaces its template.
    pub fn mount(&mut self, engine: &Engine, source: &str) -> Result<()> {
        self.hooks.on_init(self.store.state());
        self.template = Some(engine.create_template(source)?);
        self.mounted = true;
        tracing::debug!("component mounted");
        self.render()
    }

    /// Overlays a patch on the state.
    ///
    /// When mounted and at least one field changed, the observers of the
    /// changed fields run, then the component re-renders once. Returns the
    /// changes that were applied.
    pub fn set_state(&mut self, patch: Data) -> Result<Vec<Change>> {
        let changes = self.store.overlay(patch);
        tracing::trace!(changed = changes.len(), mounted = self.mounted, "state patched");
        if self.mounted && !changes.is_empty() {
            self.store.notify(&changes);
            self.render()?;
        }
        Ok(changes)
    }

    /// Runs the cleanup hook and clears the surface. Does nothing when not
    /// mounted.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.hooks.on_cleanup();
        self.surface.clear();
        self.template = None;
        self.mounted = false;
        tracing::debug!("component unmounted");
    }

    fn render(&mut self) -> Result<()> {
        let Some(template) = &self.template else {
            return Ok(());
        };
        self.hooks.on_before_render(self.store.state());
        let content = template.render(self.store.state())?;
        self.surface.replace_content(&content);
        self.hooks.on_after_render(self.store.state());
        Ok(())
    }

    /// The current state.
    pub fn state(&self) -> &Data {
        self.store.state()
    }

    /// The rendering surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The lifecycle hooks.
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Whether the component is mounted.
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RenderError, SigilError};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl Lifecycle for Recorder {
        fn on_init(&mut self, _state: &Data) {
            self.events.push("init".into());
        }
        fn on_before_render(&mut self, _state: &Data) {
            self.events.push("before".into());
        }
        fn on_after_render(&mut self, state: &Data) {
            let count = state.get("count").map(|v| v.to_string()).unwrap_or_default();
            self.events.push(format!("after:{count}"));
        }
        fn on_cleanup(&mut self) {
            self.events.push("cleanup".into());
        }
    }

    fn counter() -> Component<StringSurface, Recorder> {
        Component::new(
            Data::new().with("count", 0),
            StringSurface::new(),
            Recorder::default(),
        )
    }

    #[test]
    fn test_overlay_reports_only_changes() {
        let mut store = StateStore::new(Data::new().with("a", 1).with("b", "x"));
        let changes = store.overlay(Data::new().with("a", 1).with("b", "y").with("c", true));

        assert_eq!(
            changes,
            vec![
                Change {
                    key: "b".into(),
                    old: Some(Value::from("x")),
                    new: Value::from("y"),
                },
                Change {
                    key: "c".into(),
                    old: None,
                    new: Value::from(true),
                },
            ]
        );
        assert_eq!(store.get("b"), Some(&Value::from("y")));
    }

    #[test]
    fn test_notify_runs_observers_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut store = StateStore::new(Data::new().with("n", 1));

        for tag in ["first", "second"] {
            let log = Arc::clone(&log);
            store.observe("n", move |old, new| {
                log.lock().unwrap().push(format!("{tag}:{:?}->{new}", old.map(|v| v.to_string())));
            });
        }

        let changes = store.overlay(Data::new().with("n", 2));
        store.notify(&changes);

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                "first:Some(\"1\")->2".to_string(),
                "second:Some(\"1\")->2".to_string(),
            ]
        );
    }

    #[test]
    fn test_mount_render_and_lifecycle_order() {
        let mut component = counter();
        component.mount(&Engine::new(), "Count: @{count}").unwrap();

        assert!(component.is_mounted());
        assert_eq!(component.surface().content(), "Count: 0");

        component.set_state(Data::new().with("count", 1)).unwrap();
        assert_eq!(component.surface().content(), "Count: 1");

        component.unmount();
        assert!(!component.is_mounted());
        assert_eq!(component.surface().content(), "");
        assert_eq!(
            component.hooks().events,
            vec!["init", "before", "after:0", "before", "after:1", "cleanup"]
        );
    }

    #[test]
    fn test_set_state_before_mount_does_not_notify_or_render() {
        let fired = Arc::new(Mutex::new(0));
        let mut component = counter();
        let counter_ref = Arc::clone(&fired);
        component.watch("count", move |_, _| *counter_ref.lock().unwrap() += 1);

        component.set_state(Data::new().with("count", 5)).unwrap();
        assert_eq!(*fired.lock().unwrap(), 0);
        assert_eq!(component.surface().renders(), 0);

        component.mount(&Engine::new(), "@{count}").unwrap();
        assert_eq!(component.surface().content(), "5");

        component.set_state(Data::new().with("count", 6)).unwrap();
        assert_eq!(*fired.lock().unwrap(), 1);
    }

    #[test]
    fn test_unchanged_patch_skips_render() {
        let mut component = counter();
        component.mount(&Engine::new(), "@{count}").unwrap();
        let changes = component.set_state(Data::new().with("count", 0)).unwrap();

        assert!(changes.is_empty());
        assert_eq!(component.surface().renders(), 1);
    }

    #[test]
    fn test_failed_render_keeps_previous_content() {
        let mut component = counter();
        component.mount(&Engine::new(), "@{count}").unwrap();

        let err = component
            .set_state(Data::new().with("extra", true))
            .unwrap_err();
        assert!(matches!(
            err,
            SigilError::Render(RenderError::UnexpectedKey(ref key)) if key == "extra"
        ));
        assert_eq!(component.surface().content(), "0");
        assert_eq!(component.state().get("extra"), Some(&Value::from(true)));
    }

    #[test]
    fn test_unmount_when_not_mounted_is_noop() {
        let mut component = counter();
        component.unmount();
        assert!(component.hooks().events.is_empty());
    }
}
