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

//! Progress and completion reporting.
//!
//! Callbacks are boxed so they can outlive the call that registered them: the
//! zero-asset progress event, for instance, is delivered from a later task.

use crate::error::LoadError;

/// Package-level aggregate progress, as a fraction in `[0, 1]`.
pub type FractionProgress = Box<dyn FnMut(f32) + Send + 'static>;

/// Asset and directory progress, as `(completed, total)`.
pub type CountProgress = Box<dyn FnMut(usize, usize) + Send + 'static>;

/// Completion callback receiving either the error or the result.
///
/// Being `FnOnce`, it cannot be invoked twice.
pub type Completion<T> = Box<dyn FnOnce(Option<&LoadError>, Option<&T>) + Send + 'static>;

/// One item of a progress stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadProgress {
    /// Aggregate fraction of a package prefetch.
    Fraction(f32),
    /// Count of settled assets of an asset or directory load.
    Count {
        /// Assets loaded so far.
        completed: usize,
        /// Assets requested.
        total: usize,
    },
}

impl LoadProgress {
    /// The progress as a fraction in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        match *self {
            LoadProgress::Fraction(value) => value,
            LoadProgress::Count { total: 0, .. } => 1.0,
            LoadProgress::Count { completed, total } => completed as f32 / total as f32,
        }
    }

    /// Returns `true` for the terminal event of a load.
    pub fn is_complete(&self) -> bool {
        self.fraction() >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction() {
        assert_eq!(LoadProgress::Fraction(0.25).fraction(), 0.25);
        assert_eq!(
            LoadProgress::Count {
                completed: 1,
                total: 4
            }
            .fraction(),
            0.25
        );
        assert!(LoadProgress::Count {
            completed: 0,
            total: 0
        }
        .is_complete());
        assert!(!LoadProgress::Fraction(0.5).is_complete());
    }
}
