//! JSON fixtures shared by the motion crates' tests, resolved through
//! `fixtures/manifest.json` at the workspace root.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../../../fixtures/manifest.json"))
        .expect("fixtures manifest should parse")
});

/// Fixture name to path relative to `fixtures/`, per kind.
#[derive(Debug, Deserialize)]
struct Manifest {
    armatures: HashMap<String, String>,
    poses: HashMap<String, String>,
    configs: HashMap<String, String>,
}

#[derive(Copy, Clone, Debug)]
enum Kind {
    Armature,
    Pose,
    Config,
}

impl Kind {
    fn entries(self) -> &'static HashMap<String, String> {
        match self {
            Kind::Armature => &MANIFEST.armatures,
            Kind::Pose => &MANIFEST.poses,
            Kind::Config => &MANIFEST.configs,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Kind::Armature => "armature",
            Kind::Pose => "pose",
            Kind::Config => "config",
        }
    }

    fn locate(self, name: &str) -> Result<PathBuf> {
        let rel = self
            .entries()
            .get(name)
            .ok_or_else(|| anyhow!("no {} fixture named '{name}'", self.label()))?;
        Ok(Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(rel))
    }

    fn text(self, name: &str) -> Result<String> {
        let path = self.locate(name)?;
        fs::read_to_string(&path)
            .with_context(|| format!("reading {} fixture {}", self.label(), path.display()))
    }

    fn parse<T: DeserializeOwned>(self, name: &str) -> Result<T> {
        let text = self.text(name)?;
        serde_json::from_str(&text)
            .with_context(|| format!("decoding {} fixture '{name}'", self.label()))
    }
}

macro_rules! fixture_group {
    ($module:ident, $kind:expr) => {
        pub mod $module {
            use super::*;

            /// Raw JSON text of the named fixture.
            pub fn json(name: &str) -> Result<String> {
                $kind.text(name)
            }

            /// Deserialize the named fixture.
            pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
                $kind.parse(name)
            }
        }
    };
}

fixture_group!(armatures, Kind::Armature);
fixture_group!(poses, Kind::Pose);
fixture_group!(configs, Kind::Config);
