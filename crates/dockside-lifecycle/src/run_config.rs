//! Declarative run configuration.
//!
//! A run configuration maps container names to parameter sets:
//!
//! ```yaml
//! web:
//!   properties:
//!     image: httpd
//!     ports:
//!       - 8080: 80
//!     command: httpd-foreground
//! ```
//!
//! Each port entry is written `host: container`. JSON bodies of the same
//! shape parse too, since JSON is valid YAML.

use std::collections::BTreeMap;
use std::fmt;

use dockside_daemon::RunSpec;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Unexpected, Visitor};
use serde::Deserialize;

use crate::error::{LifecycleError, Result};

/// Name → parameters, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    entries: Vec<(String, RunEntry)>,
}

impl RunConfig {
    /// Parse a YAML or JSON request body.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::Parse` if the body is not a mapping of the
    /// expected shape.
    pub fn parse(body: &[u8]) -> Result<Self> {
        Ok(serde_yaml::from_slice(body)?)
    }

    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a container entry.
    #[must_use]
    pub fn with_container(mut self, name: impl Into<String>, params: RunParams) -> Self {
        self.entries.push((
            name.into(),
            RunEntry {
                properties: Some(params),
            },
        ));
        self
    }

    /// All entries in document order.
    #[must_use]
    pub fn entries(&self) -> &[(String, RunEntry)] {
        &self.entries
    }

    /// Entries whose `properties` mapping has at least one key, in document order.
    pub fn runnable(&self) -> impl Iterator<Item = (&str, &RunParams)> {
        self.entries.iter().filter_map(|(name, entry)| {
            entry
                .properties
                .as_ref()
                .map(|params| (name.as_str(), params))
        })
    }
}

impl<'de> Deserialize<'de> for RunConfig {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct RunConfigVisitor;

        impl<'de> Visitor<'de> for RunConfigVisitor {
            type Value = RunConfig;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of container names to run parameters")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<RunConfig, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some((name, entry)) = map.next_entry::<String, Option<RunEntry>>()? {
                    entries.push((name, entry.unwrap_or_default()));
                }
                Ok(RunConfig { entries })
            }
        }

        deserializer.deserialize_map(RunConfigVisitor)
    }
}

/// One named entry of a run configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawEntry")]
pub struct RunEntry {
    /// The parameter set; `None` when `properties` is missing, null or `{}`.
    pub properties: Option<RunParams>,
}

/// An entry as written. Whether `properties` has any keys at all decides if
/// the entry is runnable, so it is read as a plain mapping first.
#[derive(Deserialize)]
struct RawEntry {
    #[serde(default)]
    properties: Option<serde_yaml::Mapping>,
}

impl TryFrom<RawEntry> for RunEntry {
    type Error = serde_yaml::Error;

    fn try_from(raw: RawEntry) -> std::result::Result<Self, Self::Error> {
        let properties = match raw.properties {
            Some(mapping) if !mapping.is_empty() => {
                Some(serde_yaml::from_value(serde_yaml::Value::Mapping(mapping))?)
            }
            _ => None,
        };
        Ok(Self { properties })
    }
}

/// Parameters for one container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunParams {
    /// Image reference; `:latest` is implied when no tag is given.
    pub image: Option<String>,
    /// Published ports. Takes precedence over `port_bindings`.
    pub ports: Option<Vec<PortMapping>>,
    /// Alternate spelling of `ports`.
    pub port_bindings: Option<Vec<PortMapping>>,
    /// Arguments for the image entrypoint.
    pub command: Option<Command>,
}

impl RunParams {
    /// Parameters for the given image.
    #[must_use]
    pub fn for_image(image: impl Into<String>) -> Self {
        Self {
            image: Some(image.into()),
            ..Default::default()
        }
    }

    /// Add a published port.
    #[must_use]
    pub fn with_port(mut self, host: impl Into<String>, container: impl Into<String>) -> Self {
        self.ports
            .get_or_insert_with(Vec::new)
            .push(PortMapping::new(host, container));
        self
    }

    /// Set the command.
    #[must_use]
    pub fn with_command(mut self, command: Command) -> Self {
        self.command = Some(command);
        self
    }

    /// The port list in effect: `ports` if non-empty, else `port_bindings`.
    #[must_use]
    pub fn port_mappings(&self) -> &[PortMapping] {
        match &self.ports {
            Some(ports) if !ports.is_empty() => ports,
            _ => self.port_bindings.as_deref().unwrap_or_default(),
        }
    }

    /// Flatten the port list into container port → host port.
    ///
    /// A container port listed more than once keeps its last host port.
    #[must_use]
    pub fn published_ports(&self) -> BTreeMap<String, String> {
        self.port_mappings()
            .iter()
            .map(|mapping| (mapping.container_key(), mapping.host.clone()))
            .collect()
    }

    /// Build the daemon request for a container called `name`.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::InvalidConfig` if no image is given or the
    /// command line cannot be split.
    pub fn to_spec(&self, name: &str) -> Result<RunSpec> {
        let image = self
            .image
            .as_deref()
            .map(str::trim)
            .filter(|image| !image.is_empty())
            .ok_or_else(|| {
                LifecycleError::InvalidConfig(format!("container {name}: image is required"))
            })?;

        let command = self.command.as_ref().map(Command::to_args).transpose()?;

        Ok(RunSpec {
            name: name.to_string(),
            image: normalize_image(image),
            ports: self.published_ports(),
            command,
        })
    }
}

/// One published port, `host: container`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortMapping {
    /// Host port.
    pub host: String,
    /// Container port, optionally with a `/protocol` suffix.
    pub container: String,
}

impl PortMapping {
    /// Create a mapping.
    #[must_use]
    pub fn new(host: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            container: container.into(),
        }
    }

    /// Container port as the daemon keys it, `tcp` unless stated.
    #[must_use]
    pub fn container_key(&self) -> String {
        if self.container.contains('/') {
            self.container.clone()
        } else {
            format!("{}/tcp", self.container)
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortValue {
    Number(u64),
    Text(String),
}

impl PortValue {
    fn into_port(self) -> String {
        match self {
            Self::Number(port) => port.to_string(),
            Self::Text(port) => port.trim().to_string(),
        }
    }
}

impl<'de> Deserialize<'de> for PortMapping {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PortMappingVisitor;

        impl<'de> Visitor<'de> for PortMappingVisitor {
            type Value = PortMapping;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a single `host: container` port mapping")
            }

            fn visit_map<A>(self, mut map: A) -> std::result::Result<PortMapping, A::Error>
            where
                A: MapAccess<'de>,
            {
                let Some((host, container)) = map.next_entry::<PortValue, PortValue>()? else {
                    return Err(de::Error::invalid_length(0, &self));
                };
                while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
                Ok(PortMapping::new(host.into_port(), container.into_port()))
            }

            fn visit_str<E>(self, value: &str) -> std::result::Result<PortMapping, E>
            where
                E: de::Error,
            {
                value
                    .split_once(':')
                    .map(|(host, container)| PortMapping::new(host.trim(), container.trim()))
                    .ok_or_else(|| de::Error::invalid_value(Unexpected::Str(value), &self))
            }
        }

        deserializer.deserialize_any(PortMappingVisitor)
    }
}

/// Entrypoint arguments, as a shell-style line or an explicit list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Command {
    /// A single line, split on whitespace honoring quotes.
    Line(String),
    /// Arguments passed as given.
    Args(Vec<String>),
}

impl Command {
    /// The argument vector handed to the daemon.
    ///
    /// # Errors
    ///
    /// Returns `LifecycleError::InvalidConfig` for an unterminated quote or
    /// a trailing escape.
    pub fn to_args(&self) -> Result<Vec<String>> {
        match self {
            Self::Line(line) => split_command_line(line),
            Self::Args(args) => Ok(args.clone()),
        }
    }
}

fn split_command_line(line: &str) -> Result<Vec<String>> {
    let malformed = || LifecycleError::InvalidConfig(format!("malformed command: {line}"));

    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(ch) => current.push(ch),
                        None => return Err(malformed()),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(ch @ ('"' | '\\' | '$' | '`')) => current.push(ch),
                            Some(ch) => {
                                current.push('\\');
                                current.push(ch);
                            }
                            None => return Err(malformed()),
                        },
                        Some(ch) => current.push(ch),
                        None => return Err(malformed()),
                    }
                }
            }
            '\\' => {
                in_word = true;
                current.push(chars.next().ok_or_else(malformed)?);
            }
            c if c.is_whitespace() => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        args.push(current);
    }

    Ok(args)
}

/// Append `:latest` to an image reference that carries no tag or digest.
///
/// A colon before the last `/` belongs to a registry port, not a tag.
#[must_use]
pub fn normalize_image(image: &str) -> String {
    let last_segment = image.rsplit_once('/').map_or(image, |(_, last)| last);

    if image.contains('@') || last_segment.contains(':') {
        image.to_string()
    } else {
        format!("{image}:latest")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEB_YAML: &str = "\
web:
  properties:
    image: httpd
    ports:
      - 8080: 80
    command: null
";

    #[test]
    fn parses_yaml() {
        let config = RunConfig::parse(WEB_YAML.as_bytes()).unwrap();
        let (name, params) = config.runnable().next().unwrap();

        assert_eq!(name, "web");
        assert_eq!(params.image.as_deref(), Some("httpd"));
        assert_eq!(params.port_mappings(), &[PortMapping::new("8080", "80")]);
        assert!(params.command.is_none());
    }

    #[test]
    fn parses_json() {
        let body = br#"{"web": {"properties": {"image": "httpd", "ports": [{"8080": 80}]}}}"#;
        let config = RunConfig::parse(body).unwrap();
        let (_, params) = config.runnable().next().unwrap();

        let spec = params.to_spec("web").unwrap();
        assert_eq!(spec.image, "httpd:latest");
        assert_eq!(spec.ports["80/tcp"], "8080");
    }

    #[test]
    fn rejects_malformed_bodies() {
        for body in ["web: [unclosed", "- just\n- a list\n", "plain string"] {
            let result = RunConfig::parse(body.as_bytes());
            assert!(
                matches!(result, Err(LifecycleError::Parse(_))),
                "body {body:?} should not parse"
            );
        }
    }

    #[test]
    fn preserves_document_order_and_skips_empty_entries() {
        let body = "\
zeta:
alpha:
  properties: {}
beta:
  properties:
    image: redis
gamma:
  properties:
    image: httpd
";
        let config = RunConfig::parse(body.as_bytes()).unwrap();

        assert_eq!(config.entries().len(), 4);
        assert_eq!(config.entries()[0].0, "zeta");

        let runnable: Vec<_> = config.runnable().map(|(name, _)| name).collect();
        assert_eq!(runnable, vec!["beta", "gamma"]);
    }

    #[test]
    fn properties_with_only_null_values_are_runnable() {
        let body = "web:\n  properties:\n    command: null\n";
        let config = RunConfig::parse(body.as_bytes()).unwrap();

        let (name, params) = config.runnable().next().unwrap();
        assert_eq!(name, "web");
        assert_eq!(params, &RunParams::default());

        let err = params.to_spec(name).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid run configuration: container web: image is required"
        );
    }

    #[test]
    fn last_occurrence_of_container_port_wins() {
        let params = RunParams::for_image("httpd")
            .with_port("8080", "80")
            .with_port("9090", "80/tcp")
            .with_port("8443", "443");

        let ports = params.published_ports();
        assert_eq!(ports.len(), 2);
        assert_eq!(ports["80/tcp"], "9090");
        assert_eq!(ports["443/tcp"], "8443");
    }

    #[test]
    fn port_bindings_used_when_ports_empty() {
        let body = "\
web:
  properties:
    image: httpd
    ports: []
    port_bindings:
      - 8080: 80
      - \"5353:53/udp\"
";
        let config = RunConfig::parse(body.as_bytes()).unwrap();
        let (_, params) = config.runnable().next().unwrap();

        let ports = params.published_ports();
        assert_eq!(ports["80/tcp"], "8080");
        assert_eq!(ports["53/udp"], "5353");
    }

    #[test]
    fn image_is_required() {
        let params = RunParams {
            command: Some(Command::Line("sleep 10".to_string())),
            ..Default::default()
        };

        let result = params.to_spec("web");
        assert!(matches!(result, Err(LifecycleError::InvalidConfig(_))));
    }

    #[test]
    fn image_tag_normalization() {
        assert_eq!(normalize_image("httpd"), "httpd:latest");
        assert_eq!(normalize_image("httpd:latest"), "httpd:latest");
        assert_eq!(normalize_image("httpd:2.4"), "httpd:2.4");
        assert_eq!(
            normalize_image("localhost:5000/team/httpd"),
            "localhost:5000/team/httpd:latest"
        );
        assert_eq!(
            normalize_image("localhost:5000/httpd:2.4"),
            "localhost:5000/httpd:2.4"
        );
        assert_eq!(
            normalize_image("httpd@sha256:abcdef"),
            "httpd@sha256:abcdef"
        );
    }

    #[test]
    fn command_line_splitting() {
        let args = Command::Line(r#"sh -c 'echo "hi there"' --flag="a b" x\ y"#.to_string())
            .to_args()
            .unwrap();
        assert_eq!(args, vec!["sh", "-c", "echo \"hi there\"", "--flag=a b", "x y"]);

        let args = Command::Args(vec!["echo".to_string(), "a b".to_string()])
            .to_args()
            .unwrap();
        assert_eq!(args, vec!["echo", "a b"]);

        assert!(Command::Line("echo 'oops".to_string()).to_args().is_err());
        assert!(Command::Line("echo oops\\".to_string()).to_args().is_err());
    }

    #[test]
    fn command_list_from_yaml() {
        let body = "\
job:
  properties:
    image: busybox:1.36
    command: [\"sh\", \"-c\", \"sleep 5\"]
";
        let config = RunConfig::parse(body.as_bytes()).unwrap();
        let (_, params) = config.runnable().next().unwrap();

        let spec = params.to_spec("job").unwrap();
        assert_eq!(spec.image, "busybox:1.36");
        assert_eq!(
            spec.command,
            Some(vec!["sh".to_string(), "-c".to_string(), "sleep 5".to_string()])
        );
    }
}
