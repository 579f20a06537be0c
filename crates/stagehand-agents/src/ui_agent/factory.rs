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

//! A registry mapping view names to the factories that build them.

use std::collections::HashMap;
use std::sync::Arc;

use stagehand_core::asset::{Asset, AssetHandle};
use stagehand_core::view::{View, ViewDescriptor};
use stagehand_core::ViewContractError;

use super::instance::AnyView;

type ViewFactory = Box<dyn Fn(&AssetHandle) -> Result<Box<dyn AnyView>, String> + Send + Sync>;

/// One registered view type: its name, its descriptor, and its factory.
pub struct ViewRegistration {
    name: String,
    package: &'static str,
    view_path: &'static str,
    factory: ViewFactory,
}

impl ViewRegistration {
    /// The name the view was registered under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The package that owns the view's template.
    pub fn package(&self) -> &str {
        self.package
    }

    /// The template's path inside the package.
    pub fn view_path(&self) -> &str {
        self.view_path
    }

    /// The view cache key, `package/view_path`.
    pub fn cache_key(&self) -> String {
        format!("{}/{}", self.package, self.view_path)
    }

    /// Checks that the descriptor names both a package and a view path.
    pub fn validate(&self) -> Result<(), ViewContractError> {
        if self.package.is_empty() || self.view_path.is_empty() {
            return Err(ViewContractError::IncompleteDescriptor {
                name: self.name.clone(),
                package: self.package.to_string(),
                view_path: self.view_path.to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn instantiate(&self, template: &AssetHandle) -> Result<Box<dyn AnyView>, ViewContractError> {
        (self.factory)(template).map_err(|reason| ViewContractError::NotInstantiable {
            name: self.name.clone(),
            reason,
        })
    }
}

/// The set of view types that can be shown, populated at startup.
#[derive(Default)]
pub struct ViewFactoryRegistry {
    registrations: HashMap<String, Arc<ViewRegistration>>,
}

impl ViewFactoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a view type under `name`.
    ///
    /// `factory` receives the loaded template and builds the view from it,
    /// or explains why it cannot. Registering a name twice replaces the
    /// earlier registration. Views are cached by `package/view_path`, so a
    /// registration whose cache key is already taken by another name is
    /// rejected and `false` is returned.
    pub fn register<V, F>(&mut self, name: &str, factory: F) -> bool
    where
        V: View + ViewDescriptor,
        F: Fn(&AssetHandle) -> Result<V, String> + Send + Sync + 'static,
    {
        let factory: ViewFactory =
            Box::new(move |template| factory(template).map(|view| Box::new(view) as Box<dyn AnyView>));
        let registration = ViewRegistration {
            name: name.to_string(),
            package: V::package(),
            view_path: V::view_path(),
            factory,
        };
        let cache_key = registration.cache_key();
        if let Some(owner) = self
            .registrations
            .values()
            .find(|other| other.name != name && other.cache_key() == cache_key)
        {
            log::error!(
                "View '{name}' shares the cache key '{cache_key}' with view '{}'; registration rejected",
                owner.name
            );
            return false;
        }
        if self
            .registrations
            .insert(name.to_string(), Arc::new(registration))
            .is_some()
        {
            log::warn!("View '{name}' was registered twice; the last registration wins");
        }
        true
    }

    /// Registers a view type built from a template asset of type `T`.
    ///
    /// A template of any other type makes the view not instantiable.
    pub fn register_template<V, T, F>(&mut self, name: &str, build: F) -> bool
    where
        V: View + ViewDescriptor,
        T: Asset,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.register::<V, _>(name, move |template: &AssetHandle| {
            template
                .downcast_ref::<T>()
                .map(&build)
                .ok_or_else(|| format!("template is not a {}", std::any::type_name::<T>()))
        })
    }

    /// The registration for `name`.
    pub fn get(&self, name: &str) -> Option<Arc<ViewRegistration>> {
        self.registrations.get(name).cloned()
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.registrations.contains_key(name)
    }

    /// The number of registered views.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
