// Copyright 2026 the Conform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolved context capabilities and the gating queries built on them.

use std::collections::BTreeSet;

use crate::context::{ApiVersion, ContextApi, Profile};
use crate::driver::RunContext;
use crate::result::{HarnessResult, Terminate};

/// The supported version, profile and extension set of the live context.
///
/// Resolved once right after context creation; every later query is
/// read-only, so gates are idempotent and callable any number of times.
#[derive(Clone, Debug)]
pub struct CapabilitySet {
    version: ApiVersion,
    profile: Profile,
    extensions: BTreeSet<String>,
}

impl CapabilitySet {
    pub fn new(
        version: ApiVersion,
        profile: Profile,
        extensions: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            version,
            profile,
            extensions: extensions.into_iter().collect(),
        }
    }

    /// Samples the context's capabilities. The one place the context is
    /// asked about itself.
    pub fn resolve(context: &impl ContextApi) -> Self {
        Self::new(context.version(), context.profile(), context.extensions())
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    pub fn supports_extension(&self, name: &str) -> bool {
        self.extensions.contains(name)
    }

    pub fn meets_version(&self, required: ApiVersion) -> bool {
        self.version >= required
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

/// Capability gates, callable from `init` or anywhere in a test body.
impl<C: ContextApi> RunContext<C> {
    /// Skips the test unless the context supports `name`.
    pub fn require_extension(&self, name: &str) -> HarnessResult<()> {
        if self.capabilities().supports_extension(name) {
            Ok(())
        } else {
            Err(Terminate::skip(format!("extension {name} not supported")))
        }
    }

    /// Skips the test unless the context version is at least `required`.
    pub fn require_version(&self, required: ApiVersion) -> HarnessResult<()> {
        let caps = self.capabilities();
        if caps.meets_version(required) {
            Ok(())
        } else {
            Err(Terminate::skip(format!(
                "version {required} required, context has {}",
                caps.version()
            )))
        }
    }

    /// Pure query for optional-feature branching; never skips.
    pub fn is_extension_supported(&self, name: &str) -> bool {
        self.capabilities().supports_extension(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps() -> CapabilitySet {
        CapabilitySet::new(
            ApiVersion::new(3, 3),
            Profile::Core,
            ["clear-texture".to_string(), "shader-f16".to_string()],
        )
    }

    #[test]
    fn extension_lookup() {
        let caps = caps();
        assert!(caps.supports_extension("clear-texture"));
        assert!(!caps.supports_extension("clear"));
        assert!(!caps.supports_extension("timestamp-query"));
    }

    #[test]
    fn version_gate_is_inclusive() {
        let caps = caps();
        assert!(caps.meets_version(ApiVersion::new(3, 3)));
        assert!(caps.meets_version(ApiVersion::new(2, 0)));
        assert!(!caps.meets_version(ApiVersion::new(3, 4)));
        assert!(!caps.meets_version(ApiVersion::new(4, 0)));
    }

    #[test]
    fn extensions_iterate_sorted() {
        let caps = caps();
        let names: Vec<&str> = caps.extensions().collect();
        assert_eq!(names, ["clear-texture", "shader-f16"]);
    }
}
