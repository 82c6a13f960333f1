use std::collections::HashMap;

use opentelemetry::{Key, KeyValue, Value};
use opentelemetry_sdk::Resource;

use crate::config::Config;
use crate::error::TelemetryError;

const SERVICE_NAME: &str = "service.name";
const SERVICE_NAMESPACE: &str = "service.namespace";
const SERVICE_VERSION: &str = "service.version";

/// Extra attributes describing the environment the service runs in.
#[derive(Debug, Clone)]
pub enum ResourceOption {
    /// Arbitrary attributes, e.g. `deployment.environment`.
    Attributes(Vec<KeyValue>),
    /// Semantic conventions schema URL for the resource.
    SchemaUrl(String),
    /// `os.type`.
    Os,
    /// `process.pid`, `process.executable.name` and `process.runtime.name`.
    Process,
}

/// Build the [`Resource`] shared by every provider.
///
/// `service.name`, `service.namespace` and `service.version` are always
/// present. Caller options may add attributes but may not redefine those
/// three, and may not give one key two different values.
pub(crate) fn build_resource(config: &Config) -> Result<Resource, TelemetryError> {
    let mandatory = [
        KeyValue::new(SERVICE_NAME, config.service.name.clone()),
        KeyValue::new(SERVICE_NAMESPACE, config.service.namespace.clone()),
        KeyValue::new(SERVICE_VERSION, config.service.version.clone()),
    ];

    let mut declared: HashMap<Key, Value> = mandatory
        .iter()
        .map(|kv| (kv.key.clone(), kv.value.clone()))
        .collect();
    let mut kvs: Vec<KeyValue> = mandatory.to_vec();
    let mut schema_url: Option<String> = None;

    for option in &config.resource_options {
        match option {
            ResourceOption::SchemaUrl(url) => match &schema_url {
                Some(existing) if existing != url => {
                    return Err(TelemetryError::Resource(format!(
                        "conflicting schema URLs `{existing}` and `{url}`"
                    )));
                }
                _ => schema_url = Some(url.clone()),
            },
            other => {
                for kv in option_attributes(other) {
                    if let Some(previous) = declared.get(&kv.key) {
                        if previous != &kv.value {
                            return Err(TelemetryError::Resource(format!(
                                "attribute `{}` declared twice with different values",
                                kv.key
                            )));
                        }
                        continue;
                    }
                    declared.insert(kv.key.clone(), kv.value.clone());
                    kvs.push(kv);
                }
            }
        }
    }

    let builder = Resource::builder();
    let resource = match schema_url {
        Some(url) => builder.with_schema_url(kvs, url),
        None => builder.with_attributes(kvs),
    };

    Ok(resource.build())
}

fn option_attributes(option: &ResourceOption) -> Vec<KeyValue> {
    match option {
        ResourceOption::Attributes(kvs) => kvs.clone(),
        ResourceOption::SchemaUrl(_) => Vec::new(),
        ResourceOption::Os => vec![KeyValue::new("os.type", std::env::consts::OS)],
        ResourceOption::Process => {
            let mut kvs = vec![
                KeyValue::new("process.pid", i64::from(std::process::id())),
                KeyValue::new("process.runtime.name", "rust"),
            ];
            let executable = std::env::current_exe().ok().and_then(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
            });
            if let Some(name) = executable {
                kvs.push(KeyValue::new("process.executable.name", name));
            }
            kvs
        }
    }
}
