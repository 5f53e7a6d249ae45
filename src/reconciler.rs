//! Parameter reconciliation engine.
//!
//! This module implements the core decision logic that computes the new
//! local parameter tree from the template tree, the existing tree, the
//! rename map, environment overrides, and the interactivity policy. The
//! engine never touches the filesystem or a file format; it talks to the
//! outside world only through the injected [`Console`] and [`EnvSource`]
//! collaborators.
//!
//! The algorithm runs in a fixed order: baseline, rename resolution,
//! outdated pruning, environment overrides, fill/prompt, assembly.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::codec::inline;
use crate::console::Console;
use crate::error::{ConfigError, FormatError, Result};
use crate::tree::{DEFAULT_PARAMETER_KEY, EnvMap, ParameterMap, ParameterNode, RenameMap};

/// Source of environment variables, injected so reconciliation stays
/// deterministic under test.
pub trait EnvSource {
    /// Reads the named variable, `None` when unset.
    fn var(&self, name: &str) -> Option<String>;
}

/// Environment source backed by the process environment.
#[derive(Debug, Default)]
pub struct SystemEnv;

impl EnvSource for SystemEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Policy knobs for one reconciliation run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcilePolicy {
    /// Keep parameters the template no longer declares.
    pub keep_outdated: bool,
    /// Prompt for missing parameters instead of default-filling them.
    pub interactive: bool,
}

/// Result of a reconciliation run: the new document plus the prompts
/// that were actually issued, in order.
#[derive(Debug)]
pub struct ReconcileOutcome {
    /// The reconciled document, ready for serialization.
    pub document: ParameterNode,
    /// Ordered `(dot-path, decoded answer)` pairs asked of the user.
    pub prompts: Vec<(String, ParameterNode)>,
}

/// The reconciliation engine.
///
/// Holds the policy and the collaborators for one run; [`reconcile`]
/// itself is value-in/value-out and can be called repeatedly.
///
/// [`reconcile`]: Reconciler::reconcile
pub struct Reconciler<'a> {
    /// Top-level key under which parameters live.
    parameter_key: String,
    /// Run policy.
    policy: ReconcilePolicy,
    /// Current-to-previous key renames, top level only.
    rename_map: RenameMap,
    /// Dot-path to environment variable name overrides.
    env_map: EnvMap,
    /// Interactive transport.
    console: &'a dyn Console,
    /// Environment variable source.
    env: &'a dyn EnvSource,
    /// Template file path, for error messages.
    dist_path: PathBuf,
    /// Target file path, for error messages.
    file_path: PathBuf,
}

/// Prompt bookkeeping threaded through the fill recursion.
#[derive(Default)]
struct PromptSession {
    started: bool,
    prompts: Vec<(String, ParameterNode)>,
}

impl<'a> Reconciler<'a> {
    /// Creates an engine with the default parameter key and empty rename
    /// and environment maps.
    #[must_use]
    pub fn new(policy: ReconcilePolicy, console: &'a dyn Console, env: &'a dyn EnvSource) -> Self {
        Self {
            parameter_key: String::from(DEFAULT_PARAMETER_KEY),
            policy,
            rename_map: RenameMap::new(),
            env_map: EnvMap::new(),
            console,
            env,
            dist_path: PathBuf::new(),
            file_path: PathBuf::new(),
        }
    }

    /// Sets the top-level parameter key.
    #[must_use]
    pub fn with_parameter_key(mut self, key: impl Into<String>) -> Self {
        self.parameter_key = key.into();
        self
    }

    /// Sets the rename map.
    #[must_use]
    pub fn with_rename_map(mut self, rename_map: RenameMap) -> Self {
        self.rename_map = rename_map;
        self
    }

    /// Sets the environment override map.
    #[must_use]
    pub fn with_env_map(mut self, env_map: EnvMap) -> Self {
        self.env_map = env_map;
        self
    }

    /// Sets the file paths used in error messages.
    #[must_use]
    pub fn with_paths(mut self, dist: impl Into<PathBuf>, file: impl Into<PathBuf>) -> Self {
        self.dist_path = dist.into();
        self.file_path = file.into();
        self
    }

    /// Computes the new parameter document.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the template has no entry under the
    /// parameter key, and a [`FormatError`] when the template or an
    /// existing document is not map-shaped.
    pub fn reconcile(
        &self,
        template: &ParameterNode,
        existing: Option<&ParameterNode>,
    ) -> Result<ReconcileOutcome> {
        let template_map = template.as_map().ok_or_else(|| FormatError::DistNotAMapping {
            path: self.dist_path.clone(),
        })?;

        let expected = template_map.get(&self.parameter_key).ok_or_else(|| {
            ConfigError::ParameterKeyMissing {
                key: self.parameter_key.clone(),
                path: self.dist_path.clone(),
            }
        })?;
        let expected_params = expected.as_map().ok_or_else(|| FormatError::DistNotAMapping {
            path: self.dist_path.clone(),
        })?;

        let existing_map = match existing {
            None => None,
            Some(doc) => Some(doc.as_map().ok_or_else(|| FormatError::NotAMapping {
                path: self.file_path.clone(),
            })?),
        };

        // Baseline: the existing parameter subtree, or empty.
        let mut actual: ParameterMap = existing_map
            .and_then(|map| map.get(&self.parameter_key))
            .and_then(ParameterNode::as_map)
            .cloned()
            .unwrap_or_default();

        self.resolve_renames(&mut actual);

        if self.policy.keep_outdated {
            debug!("Keeping outdated parameters");
        } else {
            prune_outdated(&mut actual, expected_params);
        }

        let actual = self.apply_env_overrides(actual);

        let mut session = PromptSession::default();
        let filled = self.fill(expected_params, actual, "", &mut session)?;

        // Assembly: template top-level order; preserved settings take the
        // existing document's value when it defines the same key.
        let mut document = ParameterMap::new();
        for (key, template_value) in template_map {
            if *key == self.parameter_key {
                document.insert(key.clone(), ParameterNode::Map(filled.clone()));
            } else {
                let value = existing_map
                    .and_then(|map| map.get(key))
                    .unwrap_or(template_value);
                document.insert(key.clone(), value.clone());
            }
        }

        info!(
            "Reconciled {} parameters ({} prompted)",
            expected_params.len(),
            session.prompts.len()
        );

        Ok(ReconcileOutcome {
            document: ParameterNode::Map(document),
            prompts: session.prompts,
        })
    }

    /// Copies values from previous key names to their current names.
    ///
    /// The old entry is left in place; pruning removes it when the
    /// template no longer declares it.
    fn resolve_renames(&self, actual: &mut ParameterMap) {
        for (new_key, old_key) in &self.rename_map {
            if actual.contains_key(new_key) {
                continue;
            }
            if let Some(value) = actual.get(old_key).cloned() {
                debug!("Renaming parameter \"{old_key}\" to \"{new_key}\"");
                actual.insert(new_key.clone(), value);
            }
        }
    }

    /// Applies environment overrides: a set, non-empty variable is
    /// decoded and written at its dot-path unconditionally.
    fn apply_env_overrides(&self, actual: ParameterMap) -> ParameterMap {
        let mut node = ParameterNode::Map(actual);
        for (param_path, env_name) in &self.env_map {
            if let Some(value) = self.env.var(env_name) {
                if !value.is_empty() {
                    debug!("Overriding \"{param_path}\" from ${env_name}");
                    node.set_path(param_path, inline::decode(&value));
                }
            }
        }
        into_map(node).unwrap_or_default()
    }

    /// Walks the template subtree depth-first, keeping present values,
    /// recursing into nested maps, and filling or prompting for missing
    /// leaves. Returns a new map ordered template-first, with surviving
    /// non-template entries appended.
    fn fill(
        &self,
        expected: &ParameterMap,
        mut actual: ParameterMap,
        prefix: &str,
        session: &mut PromptSession,
    ) -> Result<ParameterMap> {
        let mut out = ParameterMap::with_capacity(expected.len());

        for (key, template_value) in expected {
            let path = join_path(prefix, key);

            if let Some(template_map) = template_value.as_map() {
                // Inner maps are never prompted for as a whole.
                let sub_actual = actual
                    .shift_remove(key)
                    .and_then(into_map)
                    .unwrap_or_default();
                let sub = self.fill(template_map, sub_actual, &path, session)?;
                out.insert(key.clone(), ParameterNode::Map(sub));
            } else if let Some(present) = actual.shift_remove(key) {
                out.insert(key.clone(), present);
            } else if self.policy.interactive {
                out.insert(key.clone(), self.prompt(&path, template_value, session)?);
            } else {
                out.insert(key.clone(), template_value.clone());
            }
        }

        // Entries kept by keep-outdated or injected by env overrides.
        for (key, value) in actual {
            out.insert(key, value);
        }
        Ok(out)
    }

    /// Prompts for one missing leaf, emitting the one-time notice before
    /// the first question of the run.
    fn prompt(
        &self,
        path: &str,
        template_value: &ParameterNode,
        session: &mut PromptSession,
    ) -> Result<ParameterNode> {
        if !session.started {
            session.started = true;
            self.console
                .write("Some parameters are missing. Please provide them.");
        }

        let default = inline::encode(template_value);
        let answer = self.console.ask(path, &default)?;
        let value = inline::decode(&answer);
        session.prompts.push((path.to_string(), value.clone()));
        Ok(value)
    }
}

/// Removes every key that does not appear at the same path in the
/// template subtree, recursing into nested maps.
fn prune_outdated(actual: &mut ParameterMap, expected: &ParameterMap) {
    actual.retain(|key, _| expected.contains_key(key));
    for (key, value) in actual.iter_mut() {
        if let (Some(sub_actual), Some(sub_expected)) = (
            value.as_map_mut(),
            expected.get(key).and_then(ParameterNode::as_map),
        ) {
            prune_outdated(sub_actual, sub_expected);
        }
    }
}

/// Converts a node into its map, discarding non-map values.
fn into_map(node: ParameterNode) -> Option<ParameterMap> {
    match node {
        ParameterNode::Map(map) => Some(map),
        _ => None,
    }
}

/// Joins a dot path with a key.
fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::FileCodec;
    use crate::console::MockConsole;

    /// Environment source backed by a fixed table.
    #[derive(Default)]
    struct MapEnv(Vec<(&'static str, &'static str)>);

    impl EnvSource for MapEnv {
        fn var(&self, name: &str) -> Option<String> {
            self.0
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| (*v).to_string())
        }
    }

    fn doc(source: &str) -> ParameterNode {
        crate::codec::YamlCodec.parse(source).unwrap()
    }

    fn quiet_console() -> MockConsole {
        let mut console = MockConsole::new();
        console.expect_write().return_const(());
        console.expect_is_interactive().return_const(false);
        console
    }

    fn non_interactive() -> ReconcilePolicy {
        ReconcilePolicy {
            keep_outdated: false,
            interactive: false,
        }
    }

    #[test]
    fn test_scenario_a_no_existing_file_copies_template() {
        let template = doc("parameters:\n  db_host: localhost\n  db_port: 5432\n");
        let console = quiet_console();
        let env = MapEnv::default();

        let outcome = Reconciler::new(non_interactive(), &console, &env)
            .reconcile(&template, None)
            .unwrap();

        assert_eq!(outcome.document, template);
        assert!(outcome.prompts.is_empty());
    }

    #[test]
    fn test_scenario_b_prune_and_fill() {
        let template = doc("parameters:\n  db_host: localhost\n  db_port: 5432\n");
        let existing = doc("parameters:\n  db_host: prod\n  old_key: x\n");
        let console = quiet_console();
        let env = MapEnv::default();

        let outcome = Reconciler::new(non_interactive(), &console, &env)
            .reconcile(&template, Some(&existing))
            .unwrap();

        let expected = doc("parameters:\n  db_host: prod\n  db_port: 5432\n");
        assert_eq!(outcome.document, expected);
    }

    #[test]
    fn test_scenario_c_rename_carries_value() {
        let template = doc("parameters:\n  db_host: localhost\n");
        let existing = doc("parameters:\n  legacy_host: prod\n");
        let console = quiet_console();
        let env = MapEnv::default();
        let mut renames = RenameMap::new();
        renames.insert(String::from("db_host"), String::from("legacy_host"));

        let outcome = Reconciler::new(non_interactive(), &console, &env)
            .with_rename_map(renames)
            .reconcile(&template, Some(&existing))
            .unwrap();

        assert_eq!(
            outcome.document.get_path("parameters.db_host"),
            Some(&ParameterNode::from("prod"))
        );
        // The old key is gone: the template no longer declares it.
        assert_eq!(outcome.document.get_path("parameters.legacy_host"), None);
    }

    #[test]
    fn test_scenario_d_env_override_is_typed() {
        let template = doc("parameters:\n  db_port: 5432\n");
        let existing = doc("parameters:\n  db_port: 5432\n");
        let console = quiet_console();
        let env = MapEnv(vec![("APP_DB_PORT", "6543")]);
        let mut env_map = EnvMap::new();
        env_map.insert(String::from("db_port"), String::from("APP_DB_PORT"));

        let outcome = Reconciler::new(non_interactive(), &console, &env)
            .with_env_map(env_map)
            .reconcile(&template, Some(&existing))
            .unwrap();

        assert_eq!(
            outcome.document.get_path("parameters.db_port"),
            Some(&ParameterNode::Int(6543))
        );
    }

    #[test]
    fn test_env_override_beats_existing_and_template() {
        let template = doc("parameters:\n  secret: default\n");
        let existing = doc("parameters:\n  secret: old\n");
        let console = quiet_console();
        let env = MapEnv(vec![("APP_SECRET", "from-env")]);
        let mut env_map = EnvMap::new();
        env_map.insert(String::from("secret"), String::from("APP_SECRET"));

        let outcome = Reconciler::new(non_interactive(), &console, &env)
            .with_env_map(env_map)
            .reconcile(&template, Some(&existing))
            .unwrap();

        assert_eq!(
            outcome.document.get_path("parameters.secret"),
            Some(&ParameterNode::from("from-env"))
        );
    }

    #[test]
    fn test_env_override_ignored_when_unset_or_empty() {
        let template = doc("parameters:\n  a: keep\n  b: keep\n");
        let console = quiet_console();
        let env = MapEnv(vec![("EMPTY_VAR", "")]);
        let mut env_map = EnvMap::new();
        env_map.insert(String::from("a"), String::from("UNSET_VAR"));
        env_map.insert(String::from("b"), String::from("EMPTY_VAR"));

        let outcome = Reconciler::new(non_interactive(), &console, &env)
            .with_env_map(env_map)
            .reconcile(&template, None)
            .unwrap();

        assert_eq!(
            outcome.document.get_path("parameters.a"),
            Some(&ParameterNode::from("keep"))
        );
        assert_eq!(
            outcome.document.get_path("parameters.b"),
            Some(&ParameterNode::from("keep"))
        );
    }

    #[test]
    fn test_env_override_at_nested_path() {
        let template = doc("parameters:\n  db:\n    port: 5432\n");
        let console = quiet_console();
        let env = MapEnv(vec![("DB_PORT", "6543")]);
        let mut env_map = EnvMap::new();
        env_map.insert(String::from("db.port"), String::from("DB_PORT"));

        let outcome = Reconciler::new(non_interactive(), &console, &env)
            .with_env_map(env_map)
            .reconcile(&template, None)
            .unwrap();

        assert_eq!(
            outcome.document.get_path("parameters.db.port"),
            Some(&ParameterNode::Int(6543))
        );
    }

    #[test]
    fn test_pruning_recurses_into_nested_maps() {
        let template = doc("parameters:\n  db:\n    host: localhost\n");
        let existing = doc("parameters:\n  db:\n    host: prod\n    legacy: x\n");
        let console = quiet_console();
        let env = MapEnv::default();

        let outcome = Reconciler::new(non_interactive(), &console, &env)
            .reconcile(&template, Some(&existing))
            .unwrap();

        assert_eq!(outcome.document.get_path("parameters.db.legacy"), None);
        assert_eq!(
            outcome.document.get_path("parameters.db.host"),
            Some(&ParameterNode::from("prod"))
        );
    }

    #[test]
    fn test_keep_outdated_retains_undeclared_keys() {
        let template = doc("parameters:\n  db_host: localhost\n");
        let existing = doc("parameters:\n  db_host: prod\n  old_key: x\n");
        let console = quiet_console();
        let env = MapEnv::default();
        let policy = ReconcilePolicy {
            keep_outdated: true,
            interactive: false,
        };

        let outcome = Reconciler::new(policy, &console, &env)
            .reconcile(&template, Some(&existing))
            .unwrap();

        assert_eq!(
            outcome.document.get_path("parameters.old_key"),
            Some(&ParameterNode::from("x"))
        );
    }

    #[test]
    fn test_idempotent_in_non_interactive_mode() {
        let template =
            doc("parameters:\n  db:\n    host: localhost\n    port: 5432\n  debug: false\n");
        let existing = doc("parameters:\n  db:\n    host: prod\n");
        let console = quiet_console();
        let env = MapEnv::default();

        let reconciler = Reconciler::new(non_interactive(), &console, &env);
        let first = reconciler.reconcile(&template, Some(&existing)).unwrap();
        let second = reconciler
            .reconcile(&template, Some(&first.document))
            .unwrap();

        assert_eq!(first.document, second.document);
    }

    #[test]
    fn test_preserved_settings_follow_template_with_existing_winning() {
        let template = doc("imports: dist-imports\nparameters:\n  a: 1\ntwig: dist-twig\n");
        let existing = doc("parameters: {}\ntwig: local-twig\nstray: dropped\n");
        let console = quiet_console();
        let env = MapEnv::default();

        let outcome = Reconciler::new(non_interactive(), &console, &env)
            .reconcile(&template, Some(&existing))
            .unwrap();

        // Template supplies the key set and the order; the existing
        // document supplies the values it defines.
        assert_eq!(
            outcome.document.get_path("imports"),
            Some(&ParameterNode::from("dist-imports"))
        );
        assert_eq!(
            outcome.document.get_path("twig"),
            Some(&ParameterNode::from("local-twig"))
        );
        assert_eq!(outcome.document.get_path("stray"), None);

        let keys: Vec<&str> = outcome
            .document
            .as_map()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["imports", "parameters", "twig"]);
    }

    #[test]
    fn test_missing_parameter_key_is_config_error() {
        let template = doc("settings:\n  a: 1\n");
        let console = quiet_console();
        let env = MapEnv::default();

        let err = Reconciler::new(non_interactive(), &console, &env)
            .reconcile(&template, None)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::ParamsyncError::Config(ConfigError::ParameterKeyMissing { .. })
        ));
    }

    #[test]
    fn test_non_mapping_existing_is_format_error() {
        let template = doc("parameters:\n  a: 1\n");
        let existing = ParameterNode::from("just a string");
        let console = quiet_console();
        let env = MapEnv::default();

        let err = Reconciler::new(non_interactive(), &console, &env)
            .reconcile(&template, Some(&existing))
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::ParamsyncError::Format(FormatError::NotAMapping { .. })
        ));
    }

    #[test]
    fn test_custom_parameter_key() {
        let template = doc("settings:\n  a: 1\n");
        let console = quiet_console();
        let env = MapEnv::default();

        let outcome = Reconciler::new(non_interactive(), &console, &env)
            .with_parameter_key("settings")
            .reconcile(&template, None)
            .unwrap();
        assert_eq!(
            outcome.document.get_path("settings.a"),
            Some(&ParameterNode::Int(1))
        );
    }

    #[test]
    fn test_interactive_prompts_for_missing_leaves_only() {
        let template = doc("parameters:\n  db_host: localhost\n  db_port: 5432\n");
        let existing = doc("parameters:\n  db_host: prod\n");
        let env = MapEnv::default();

        let mut console = MockConsole::new();
        console
            .expect_write()
            .withf(|msg| msg.contains("parameters are missing"))
            .times(1)
            .return_const(());
        console
            .expect_ask()
            .withf(|label, default| label == "db_port" && default == "5432")
            .times(1)
            .returning(|_, _| Ok(String::from("6543")));

        let policy = ReconcilePolicy {
            keep_outdated: false,
            interactive: true,
        };
        let outcome = Reconciler::new(policy, &console, &env)
            .reconcile(&template, Some(&existing))
            .unwrap();

        assert_eq!(
            outcome.document.get_path("parameters.db_port"),
            Some(&ParameterNode::Int(6543))
        );
        assert_eq!(
            outcome.prompts,
            vec![(String::from("db_port"), ParameterNode::Int(6543))]
        );
    }

    #[test]
    fn test_interactive_prompt_labels_use_dot_paths() {
        let template = doc("parameters:\n  db:\n    host: localhost\n");
        let env = MapEnv::default();

        let mut console = MockConsole::new();
        console.expect_write().times(1).return_const(());
        console
            .expect_ask()
            .withf(|label, _| label == "db.host")
            .times(1)
            .returning(|_, default| Ok(default.to_string()));

        let policy = ReconcilePolicy {
            keep_outdated: false,
            interactive: true,
        };
        let outcome = Reconciler::new(policy, &console, &env)
            .reconcile(&template, None)
            .unwrap();

        assert_eq!(
            outcome.document.get_path("parameters.db.host"),
            Some(&ParameterNode::from("localhost"))
        );
    }

    #[test]
    fn test_interactive_with_nothing_missing_asks_nothing() {
        let template = doc("parameters:\n  a: 1\n");
        let existing = doc("parameters:\n  a: 2\n");
        let env = MapEnv::default();

        // No expectations registered: any write or ask would panic.
        let console = MockConsole::new();

        let policy = ReconcilePolicy {
            keep_outdated: false,
            interactive: true,
        };
        let outcome = Reconciler::new(policy, &console, &env)
            .reconcile(&template, Some(&existing))
            .unwrap();
        assert!(outcome.prompts.is_empty());
    }

    #[test]
    fn test_list_leaf_is_opaque() {
        let template = doc("parameters:\n  hosts: [a, b]\n");
        let existing = doc("parameters:\n  hosts: [c]\n");
        let console = quiet_console();
        let env = MapEnv::default();

        let outcome = Reconciler::new(non_interactive(), &console, &env)
            .reconcile(&template, Some(&existing))
            .unwrap();

        // The existing list wins wholesale; no element-wise merging.
        assert_eq!(
            outcome.document.get_path("parameters.hosts"),
            Some(&ParameterNode::List(vec![ParameterNode::from("c")]))
        );
    }

    #[test]
    fn test_null_existing_value_counts_as_present() {
        let template = doc("parameters:\n  secret: change-me\n");
        let existing = doc("parameters:\n  secret: null\n");
        let console = quiet_console();
        let env = MapEnv::default();

        let outcome = Reconciler::new(non_interactive(), &console, &env)
            .reconcile(&template, Some(&existing))
            .unwrap();

        assert_eq!(
            outcome.document.get_path("parameters.secret"),
            Some(&ParameterNode::Null)
        );
    }
}
