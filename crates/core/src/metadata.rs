// SPDX-License-Identifier: MIT

//! Opaque metadata bag attached to logs, toasts, and notifications.
//!
//! spec.md treats `metadata: map<string,any>` as an opaque JSON object at
//! the edges (§9's "Dynamic map values" note); we represent it directly as
//! a `serde_json::Map` rather than inventing a typed sum, since nothing in
//! this workspace needs to branch on its keys.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

pub fn empty() -> Metadata {
    Metadata::new()
}
