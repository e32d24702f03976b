use std::env;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl OutputConfig {
    pub fn from_env() -> Self {
        Self::from_vars(
            env::var("HERB_OUTPUT_FORMAT").ok().as_deref(),
            env::var("HERB_OUTPUT_PRETTY").ok().as_deref(),
        )
    }

    // Envelopes are only emitted under --json, so JSON is the default format.
    fn from_vars(format: Option<&str>, pretty: Option<&str>) -> Self {
        let format = match format {
            Some("text") => OutputFormat::Text,
            _ => OutputFormat::Json,
        };
        let pretty = match pretty {
            Some(v) if v.eq_ignore_ascii_case("1") || v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes") => true,
            _ => false,
        };
        OutputConfig { format, pretty }
    }
}
