// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A cached view together with its lifecycle state and data store.

use std::any::Any;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use stagehand_core::view::{View, ViewDataStore, ViewState};
use stagehand_core::LoadError;

/// Type-erased access to a user view.
pub(crate) trait AnyView: Send {
    fn hooks(&mut self) -> &mut dyn View;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<V: View> AnyView for V {
    fn hooks(&mut self) -> &mut dyn View {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

struct InstanceInner {
    state: ViewState,
    view: Box<dyn AnyView>,
    store: ViewDataStore,
}

/// One instantiated view, shared between the view cache, the open stack and
/// the caller.
///
/// The lifecycle runs `Created → Initialized → Shown ⇄ Hidden → Destroyed`.
/// `on_init` fires once, on the first attach. Once destroyed, every data
/// access fails with [`LoadError::CacheMiss`].
///
/// Hooks run while the instance is locked: a hook must use the store it is
/// handed and must not call back into this instance or into the
/// [`UiAgent`](crate::UiAgent) for the same view.
pub struct ViewInstance {
    name: String,
    key: String,
    inner: Mutex<InstanceInner>,
}

impl ViewInstance {
    pub(crate) fn new(name: impl Into<String>, key: impl Into<String>, view: Box<dyn AnyView>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            inner: Mutex::new(InstanceInner {
                state: ViewState::Created,
                view,
                store: ViewDataStore::new(),
            }),
        }
    }

    /// The name the view was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The view cache key, `package/view_path`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The current lifecycle state.
    pub fn state(&self) -> ViewState {
        self.lock().state
    }

    /// Runs `f` on the user view if it is a `V`. Returns `None` on a type
    /// mismatch or once the instance is destroyed.
    pub fn with_view<V: View, R>(&self, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        let mut inner = self.lock();
        if inner.state == ViewState::Destroyed {
            return None;
        }
        inner.view.as_any_mut().downcast_mut::<V>().map(f)
    }

    /// Stores `value` under `key`.
    pub fn set_data<T: Send + Sync + 'static>(
        &self,
        key: impl Into<String>,
        value: T,
    ) -> Result<(), LoadError> {
        let mut inner = self.live()?;
        inner.store.set(key, value);
        Ok(())
    }

    /// A clone of the value under `key`, if present with type `T`.
    pub fn get_data<T: Clone + Send + Sync + 'static>(&self, key: &str) -> Result<Option<T>, LoadError> {
        Ok(self.live()?.store.get(key))
    }

    /// Removes `key`. Returns `Ok(false)` if it was absent.
    pub fn delete_data(&self, key: &str) -> Result<bool, LoadError> {
        Ok(self.live()?.store.remove(key))
    }

    /// Removes every stored value.
    pub fn clear_data(&self) -> Result<(), LoadError> {
        self.live()?.store.clear();
        Ok(())
    }

    /// Shows the view, initializing it first if this is its first attach.
    pub(crate) fn attach(&self) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        match inner.state {
            ViewState::Destroyed => {
                log::warn!("View '{}' is destroyed and cannot be shown", self.key);
                return;
            }
            ViewState::Shown => return,
            ViewState::Created => {
                inner.view.hooks().on_init(&mut inner.store);
                inner.state = ViewState::Initialized;
            }
            ViewState::Initialized | ViewState::Hidden => {}
        }
        inner.view.hooks().on_show(&mut inner.store);
        inner.state = ViewState::Shown;
        log::trace!("View '{}' shown", self.key);
    }

    /// Hides a shown view. Any other state is left untouched.
    pub(crate) fn detach(&self) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if inner.state == ViewState::Shown {
            inner.view.hooks().on_hide(&mut inner.store);
            inner.state = ViewState::Hidden;
            log::trace!("View '{}' hidden", self.key);
        }
    }

    /// Destroys the view and clears its store. Terminal.
    pub(crate) fn destroy(&self) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        match inner.state {
            ViewState::Destroyed => return,
            ViewState::Shown => inner.view.hooks().on_hide(&mut inner.store),
            _ => {}
        }
        inner.view.hooks().on_destroy();
        inner.store.clear();
        inner.state = ViewState::Destroyed;
        log::trace!("View '{}' destroyed", self.key);
    }

    fn live(&self) -> Result<MutexGuard<'_, InstanceInner>, LoadError> {
        let inner = self.lock();
        if inner.state == ViewState::Destroyed {
            return Err(LoadError::cache_miss(self.key.as_str()));
        }
        Ok(inner)
    }

    fn lock(&self) -> MutexGuard<'_, InstanceInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ViewInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewInstance")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Default)]
    struct Journal {
        events: Arc<Mutex<Vec<&'static str>>>,
        opened: u32,
    }

    impl View for Journal {
        fn on_init(&mut self, store: &mut ViewDataStore) {
            self.events.lock().unwrap().push("init");
            store.set("page", 1u32);
        }
        fn on_show(&mut self, _store: &mut ViewDataStore) {
            self.opened += 1;
            self.events.lock().unwrap().push("show");
        }
        fn on_hide(&mut self, _store: &mut ViewDataStore) {
            self.events.lock().unwrap().push("hide");
        }
        fn on_destroy(&mut self) {
            self.events.lock().unwrap().push("destroy");
        }
    }

    fn journal() -> (ViewInstance, Arc<Mutex<Vec<&'static str>>>) {
        let view = Journal::default();
        let events = view.events.clone();
        (ViewInstance::new("Journal", "hud/Journal", Box::new(view)), events)
    }

    #[test]
    fn test_init_fires_once_across_show_hide_cycles() {
        let (instance, events) = journal();
        assert_eq!(instance.state(), ViewState::Created);

        instance.attach();
        instance.detach();
        instance.attach();
        instance.attach();

        assert_eq!(instance.state(), ViewState::Shown);
        assert_eq!(*events.lock().unwrap(), vec!["init", "show", "hide", "show"]);
        assert_eq!(instance.with_view(|view: &mut Journal| view.opened), Some(2));
        assert_eq!(instance.get_data::<u32>("page"), Ok(Some(1)));
    }

    #[test]
    fn test_destroy_is_terminal() {
        let (instance, events) = journal();
        instance.attach();
        instance.set_data("title", "Quests".to_string()).unwrap();

        instance.destroy();
        instance.attach();

        assert_eq!(instance.state(), ViewState::Destroyed);
        assert_eq!(*events.lock().unwrap(), vec!["init", "show", "hide", "destroy"]);
        assert_eq!(
            instance.set_data("title", "Again".to_string()),
            Err(LoadError::cache_miss("hud/Journal"))
        );
        assert!(instance.get_data::<String>("title").is_err());
        assert!(instance.with_view(|view: &mut Journal| view.opened).is_none());
    }

    #[test]
    fn test_data_accessors() {
        let (instance, _) = journal();
        instance.set_data("gold", 50u64).unwrap();
        instance.set_data("name", "Ayla".to_string()).unwrap();

        assert_eq!(instance.get_data::<u64>("gold"), Ok(Some(50)));
        assert_eq!(instance.get_data::<u32>("gold"), Ok(None));
        assert_eq!(instance.delete_data("gold"), Ok(true));
        assert_eq!(instance.delete_data("gold"), Ok(false));
        instance.clear_data().unwrap();
        assert_eq!(instance.get_data::<String>("name"), Ok(None));
    }

    #[test]
    fn test_detach_before_attach_is_noop() {
        let (instance, events) = journal();
        instance.detach();
        assert_eq!(instance.state(), ViewState::Created);
        assert!(events.lock().unwrap().is_empty());
    }
}
