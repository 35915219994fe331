//! Application registry for the stratum engine.
//!
//! This module provides the [`AppConfig`] trait and [`AppRegistry`], which
//! together manage the lifecycle of installed applications. Applications
//! declare their models during [`ready`](AppConfig::ready); once every app
//! has been loaded, the schema layer runs its linking pass to resolve
//! cross-app model references.

use std::collections::HashMap;

/// Configuration for an installed application.
///
/// Implement this trait for each application that contributes models to the
/// project. The [`ready`](AppConfig::ready) method is called after all
/// applications have been registered, in registration order.
///
/// # Examples
///
/// ```
/// use stratum_core::apps::AppConfig;
///
/// struct Blog;
///
/// impl AppConfig for Blog {
///     fn name(&self) -> &str { "acme.blog" }
///     fn verbose_name(&self) -> &str { "Acme Blog" }
/// }
/// ```
pub trait AppConfig: Send + Sync {
    /// Returns the full dotted path of the application.
    fn name(&self) -> &str;

    /// Returns the short label derived from the name (the last component).
    ///
    /// For example, `"acme.blog"` yields `"blog"`. App labels are
    /// case-sensitive tokens and are used verbatim as the first segment of
    /// model references.
    fn label(&self) -> &str {
        self.name().rsplit('.').next().unwrap_or_else(|| self.name())
    }

    /// Returns a human-readable name for the application.
    fn verbose_name(&self) -> &str {
        self.name()
    }

    /// Called after all apps have been registered.
    ///
    /// Override this to declare models or perform one-time initialization.
    fn ready(&self) {}
}

/// The central registry of installed applications.
///
/// Applications are registered via [`register`](AppRegistry::register) and
/// then [`populate`](AppRegistry::populate) is called once to finalize
/// initialization (calling each app's `ready()` method). Registration after
/// populate is an error: the two phases are strictly ordered so that lazy
/// model references have a well-defined point at which they must resolve.
pub struct AppRegistry {
    apps: Vec<Box<dyn AppConfig>>,
    app_labels: HashMap<String, usize>,
    ready: bool,
}

impl Default for AppRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AppRegistry {
    /// Creates a new, empty `AppRegistry`.
    pub fn new() -> Self {
        Self {
            apps: Vec::new(),
            app_labels: HashMap::new(),
            ready: false,
        }
    }

    /// Registers an application.
    ///
    /// # Panics
    ///
    /// Panics if an application with the same label is already registered,
    /// or if [`populate`](AppRegistry::populate) has already been called.
    pub fn register(&mut self, app: Box<dyn AppConfig>) {
        assert!(
            !self.ready,
            "Cannot register apps after the registry has been populated"
        );

        let label = app.label().to_string();
        assert!(
            !self.app_labels.contains_key(&label),
            "Application with label '{label}' is already registered"
        );

        let index = self.apps.len();
        self.app_labels.insert(label, index);
        self.apps.push(app);
    }

    /// Returns the configuration for the app with the given label.
    ///
    /// Labels are matched case-sensitively.
    pub fn get_app_config(&self, label: &str) -> Option<&dyn AppConfig> {
        self.app_labels
            .get(label)
            .map(|&idx| self.apps[idx].as_ref())
    }

    /// Returns `true` if an app with the given label is registered.
    pub fn has_app(&self, label: &str) -> bool {
        self.app_labels.contains_key(label)
    }

    /// Returns a slice of all registered app configurations.
    pub fn get_app_configs(&self) -> &[Box<dyn AppConfig>] {
        &self.apps
    }

    /// Finalizes the registry by calling `ready()` on each app in
    /// registration order.
    ///
    /// # Panics
    ///
    /// Panics if `populate` has already been called.
    pub fn populate(&mut self) {
        assert!(!self.ready, "AppRegistry has already been populated");

        for app in &self.apps {
            tracing::debug!(app = app.label(), "initializing app");
            app.ready();
        }

        self.ready = true;
    }

    /// Returns `true` if the registry has been populated.
    pub const fn is_ready(&self) -> bool {
        self.ready
    }
}
