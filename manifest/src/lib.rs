//! Declarative route manifests for command-router registries.
//!
//! A [`Manifest`] describes a program tree in YAML or JSON: the root
//! program's commands with their options, and nested programs. It can be
//! validated as a whole ([`Manifest::validate`]) and turned into a
//! [`Registry`](command_router_core::Registry) with
//! [`Manifest::build_registry`].
//!
//! # Quick start
//!
//! ```
//! use std::sync::Arc;
//!
//! use command_router_core::{Dispatcher, NoopAction, Outcome};
//! use command_router_manifest::Manifest;
//!
//! let manifest = Manifest::from_yaml_str(
//!     r#"
//! name: cli
//! commands:
//!   - name: test
//! programs:
//!   - name: test1
//!     commands:
//!       - name: test
//!         options:
//!           - { name: test, aliases: [t], type: boolean }
//! "#,
//! )
//! .unwrap();
//!
//! let registry = manifest.build_registry(Arc::new(NoopAction)).unwrap();
//! let outcome = Dispatcher::new(&registry).dispatch(&["test", "-t"]).unwrap();
//! match outcome {
//!     Outcome::Ran(inv) => assert_eq!(inv.path, vec!["test1", "test"]),
//!     Outcome::Help(_) => unreachable!(),
//! }
//! ```

mod error;
mod manifest;

pub use error::{ManifestError, Result};
pub use manifest::{CommandManifest, Manifest, ManifestIssue};
