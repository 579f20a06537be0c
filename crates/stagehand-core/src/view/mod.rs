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

//! Contracts for cacheable UI views.
//!
//! A view type declares where its template lives through [`ViewDescriptor`],
//! reacts to lifecycle transitions through [`View`], and keeps per-instance
//! state in a [`ViewDataStore`]. The display hierarchy it is attached to is
//! abstracted by [`DisplayRoot`].

mod display;
mod store;

pub use display::DisplayRoot;
pub use store::ViewDataStore;

/// Declares the template location of a view type.
///
/// The two accessors replace runtime property probing: a type that does not
/// provide them cannot be registered.
///
/// # Examples
///
/// ```
/// use stagehand_core::view::ViewDescriptor;
///
/// struct BagWindow;
///
/// impl ViewDescriptor for BagWindow {
///     fn package() -> &'static str {
///         "SubGame_003"
///     }
///     fn view_path() -> &'static str {
///         "Bag"
///     }
/// }
///
/// assert_eq!(BagWindow::cache_key(), "SubGame_003/Bag");
/// ```
pub trait ViewDescriptor {
    /// The package that owns the view's template.
    fn package() -> &'static str;

    /// The template's path inside the package.
    fn view_path() -> &'static str;

    /// The view cache key, `package/view_path`.
    fn cache_key() -> String {
        format!("{}/{}", Self::package(), Self::view_path())
    }
}

/// Lifecycle hooks of a view.
///
/// Every hook has an empty default. The store passed to the hooks is the
/// view's own data store.
pub trait View: Send + 'static {
    /// Runs once, the first time the view is attached.
    fn on_init(&mut self, _store: &mut ViewDataStore) {}

    /// Runs every time the view is attached to the display.
    fn on_show(&mut self, _store: &mut ViewDataStore) {}

    /// Runs every time the view is detached from the display.
    fn on_hide(&mut self, _store: &mut ViewDataStore) {}

    /// Runs once when the view is disposed, before its store is cleared.
    fn on_destroy(&mut self) {}
}

/// The lifecycle state of a cached view instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewState {
    /// Instantiated, never attached.
    Created,
    /// `on_init` has run.
    Initialized,
    /// Attached to the display.
    Shown,
    /// Detached but still cached.
    Hidden,
    /// Disposed. Terminal.
    Destroyed,
}
