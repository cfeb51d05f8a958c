pub const DEFAULT_MAX_LINE_LEN: usize = 4096;
pub const DEFAULT_MAX_BUFFER_LEN: usize = 10240;

const MAX_LINE_VAR: &str = "MISH_MAX_LINE";
const MAX_BUFFER_VAR: &str = "MISH_MAX_BUFFER";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Longest accepted input line in bytes, newline excluded.
    pub max_line_len: usize,
    /// Most characters a single insert-mode session can hold.
    pub max_buffer_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE_LEN,
            max_buffer_len: DEFAULT_MAX_BUFFER_LEN,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            max_line_len: limit(&lookup, MAX_LINE_VAR, DEFAULT_MAX_LINE_LEN),
            max_buffer_len: limit(&lookup, MAX_BUFFER_VAR, DEFAULT_MAX_BUFFER_LEN),
        }
    }
}

fn limit(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: usize) -> usize {
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<usize>() {
        Ok(n) if n > 0 => n,
        _ => {
            log::warn!("ignoring {key}={raw:?}, using {default}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Config::from_lookup(|_| None), Config::default());
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(|key| match key {
            "MISH_MAX_LINE" => Some("80".to_string()),
            "MISH_MAX_BUFFER" => Some(" 16 ".to_string()),
            _ => None,
        });
        assert_eq!(config.max_line_len, 80);
        assert_eq!(config.max_buffer_len, 16);
    }

    #[test]
    fn bad_values_fall_back() {
        let config = Config::from_lookup(|key| match key {
            "MISH_MAX_LINE" => Some("0".to_string()),
            "MISH_MAX_BUFFER" => Some("lots".to_string()),
            _ => None,
        });
        assert_eq!(config, Config::default());
    }
}
