//! On-disk fixtures: an application home with a standard library, a user
//! home with a cache repository, and a project directory.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use reqm::{ComposeConfig, ComposeContext, ComposeError, ComposedModel, Composer};
use tempfile::TempDir;

/// Context shared by every integration test.
pub static CONTEXT: Lazy<ComposeContext> =
    Lazy::new(|| ComposeContext::new(ComposeConfig::default().with_default_domain("sample")));

/// Standard library documents present in every workspace.
pub const STANDARD_LIBRARY: &[(&str, &str)] = &[
    (
        "core/application.reqm",
        r#"
        domain reqm;

        application Application {
            title: String;
            version: String optional;
            events {
                onError = reportError;
            }
        }

        module Reporting;

        action reportError {
            call log;
        }

        action log;
        "#,
    ),
    (
        "model/base.reqm",
        r#"
        domain reqm;

        class Base {
            id: Uuid mandatory;
            name: String mandatory;
        }

        entity Persistent from Base {
            version: Long;
        }

        feature Auditing {
            createdAt: DateTime;
            createdBy: String;
        }
        "#,
    ),
    (
        "ui/views.reqm",
        r#"
        domain reqm;

        view Header {
            logo: Image;
        }

        view Page {
            title: String;
            layout {
                Header;
            }
        }
        "#,
    ),
];

pub struct Workspace {
    temp_dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let workspace = Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        };
        for (name, content) in STANDARD_LIBRARY {
            write(&workspace.stdlib(), name, content);
        }
        fs::create_dir_all(workspace.user_home()).expect("Failed to create user home");
        fs::create_dir_all(workspace.project()).expect("Failed to create project");
        workspace
    }

    pub fn app_home(&self) -> PathBuf {
        self.temp_dir.path().join("app")
    }

    pub fn stdlib(&self) -> PathBuf {
        self.app_home().join("stdlib")
    }

    pub fn user_home(&self) -> PathBuf {
        self.temp_dir.path().join("home")
    }

    pub fn user_cache(&self) -> PathBuf {
        self.user_home().join(".reqm/cache")
    }

    pub fn project(&self) -> PathBuf {
        self.temp_dir.path().join("project")
    }

    pub fn with_project(self, files: &[(&str, &str)]) -> Self {
        for (name, content) in files {
            write(&self.project(), name, content);
        }
        self
    }

    pub fn with_user_cache(self, files: &[(&str, &str)]) -> Self {
        for (name, content) in files {
            write(&self.user_cache(), name, content);
        }
        self
    }

    pub fn composer(&self) -> Composer {
        let mut composer = Composer::new(CONTEXT.clone());
        composer
            .connect(&self.app_home(), &self.user_home())
            .expect("connect should succeed");
        composer
    }

    /// Connect a fresh composer and compose the project directory.
    pub fn compose(&self) -> Result<ComposedModel, ComposeError> {
        self.composer().compose_directory(&self.project())
    }
}

pub fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create directory");
    }
    fs::write(path, content).expect("Failed to write document");
}
