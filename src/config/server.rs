use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// How to launch the MCP server that provides the tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub name: String,
    pub command: PathBuf,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub workdir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawServer {
    #[serde(default)]
    name: Option<String>,
    command: String,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: HashMap<String, String>,
    workdir: Option<String>,
}

/// Expands `~` and `${VAR}`; leaves the input untouched if a variable is unset.
pub(crate) fn expand(value: &str) -> String {
    shellexpand::full(value)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

impl From<RawServer> for ServerConfig {
    fn from(raw: RawServer) -> Self {
        let command = PathBuf::from(expand(&raw.command));
        let name = raw.name.unwrap_or_else(|| {
            command
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "tools".to_string())
        });

        Self {
            name,
            command,
            args: raw.args.iter().map(|arg| expand(arg)).collect(),
            env: raw
                .env
                .into_iter()
                .map(|(key, value)| {
                    let value = expand(&value);
                    (key, value)
                })
                .collect(),
            workdir: raw.workdir.map(|dir| PathBuf::from(expand(&dir))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    #[test]
    #[serial]
    fn expands_env_vars_in_command_args_and_env() {
        unsafe {
            env::set_var("TEST_MCP_ROOT", "/path/to/mcp");
            env::set_var("TEST_ARG", "example-arg");
        }

        let raw = RawServer {
            name: Some("math".to_string()),
            command: "${TEST_MCP_ROOT}/server".to_string(),
            args: vec!["--flag".to_string(), "${TEST_ARG}".to_string()],
            env: HashMap::from([("DATA".to_string(), "${TEST_MCP_ROOT}/data".to_string())]),
            workdir: Some("${TEST_MCP_ROOT}/work".to_string()),
        };

        let config = ServerConfig::from(raw);

        assert_eq!(config.command, PathBuf::from("/path/to/mcp/server"));
        assert_eq!(config.args, ["--flag", "example-arg"]);
        assert_eq!(config.env["DATA"], "/path/to/mcp/data");
        assert_eq!(config.workdir, Some(PathBuf::from("/path/to/mcp/work")));

        unsafe {
            env::remove_var("TEST_MCP_ROOT");
            env::remove_var("TEST_ARG");
        }
    }

    #[test]
    fn name_defaults_to_command_stem() {
        let raw = RawServer {
            name: None,
            command: "python3".to_string(),
            args: vec!["example2.py".to_string()],
            env: HashMap::new(),
            workdir: None,
        };

        let config = ServerConfig::from(raw);
        assert_eq!(config.name, "python3");
    }
}
