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

use crate::error::DisplayError;

/// The display hierarchy views are attached to.
///
/// Views are identified by their cache key. Implementations attach a view on
/// top of its siblings; detaching keeps the view's node alive so it can be
/// attached again, while destroying releases it for good.
pub trait DisplayRoot: Send + Sync {
    /// Attaches the view on top of the display root.
    fn attach(&self, key: &str) -> Result<(), DisplayError>;

    /// Detaches the view from the display root. Detaching a view that is not
    /// attached is a no-op.
    fn detach(&self, key: &str);

    /// Destroys the view's node.
    fn destroy(&self, key: &str) {
        self.detach(key);
    }
}
