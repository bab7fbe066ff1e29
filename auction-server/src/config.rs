use {
    crate::{
        auction::service,
        ingest::DEFAULT_INGEST_TOPIC,
        kernel::backoff::BackoffPolicy,
        publisher,
    },
    anyhow::Result,
    clap::{
        crate_authors,
        crate_description,
        crate_name,
        crate_version,
        Args,
        Parser,
    },
    std::fs,
};

mod server;

// `Options` is a structup definition to provide clean command-line args for the auction server.
#[derive(Parser, Debug)]
#[command(name = crate_name!())]
#[command(author = crate_authors!())]
#[command(about = crate_description!())]
#[command(version = crate_version!())]
#[allow(clippy::large_enum_variant)]
pub enum Options {
    /// Run the auction server service.
    Run(RunOptions),
}

#[derive(Args, Clone, Debug)]
pub struct RunOptions {
    /// Server Options
    #[command(flatten)]
    pub server: server::Options,

    #[command(flatten)]
    pub config: ConfigOptions,
}

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Config Options")]
#[group(id = "Config")]
pub struct ConfigOptions {
    /// Path to a configuration file with the auction, consumer and publisher settings
    #[arg(long = "config")]
    #[arg(env = "AUCTION_CONFIG")]
    #[arg(default_value = "config.yaml")]
    pub config: String,
}

const DEFAULT_GROUP_ID: &str = "auction";

fn default_group_id() -> String {
    DEFAULT_GROUP_ID.to_string()
}

fn default_topics() -> Vec<String> {
    vec![DEFAULT_INGEST_TOPIC.to_string()]
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConsumerConfig {
    #[serde(default = "default_group_id")]
    pub group_id: String,
    /// Topics carrying expired-package events.
    #[serde(default = "default_topics")]
    pub topics:   Vec<String>,
    #[serde(default)]
    pub backoff:  BackoffPolicy,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            group_id: default_group_id(),
            topics:   default_topics(),
            backoff:  BackoffPolicy::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub auction:   service::Config,
    #[serde(default)]
    pub consumer:  ConsumerConfig,
    #[serde(default)]
    pub publisher: publisher::Config,
}

impl Config {
    pub fn load(path: &str) -> Result<Config> {
        // Open and read the YAML file
        // TODO: the default serde deserialization doesn't enforce unique keys
        let yaml_content = fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&yaml_content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        std::time::Duration,
    };

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.consumer.topics, vec!["expired-packages".to_string()]);
        assert_eq!(config.consumer.backoff, BackoffPolicy::default());
    }

    #[test]
    fn test_sample_config_parses() {
        let config: Config =
            serde_yaml::from_str(include_str!("../config.sample.yaml")).unwrap();
        assert_eq!(config.auction.duration, Duration::from_secs(120));
        assert_eq!(config.consumer.group_id, "auction");
        assert_eq!(config.consumer.backoff.max_delay, Duration::from_secs(60));
        assert!(matches!(config.publisher, publisher::Config::Broker { .. }));
    }

    #[test]
    fn test_http_publisher_config() {
        let config: Config = serde_yaml::from_str(
            "publisher:\n  type: http\n  payment_url: http://payment:8080/v1/payments\n  notification_url: http://telegram:8080/v1/notifications\n  timeout: 5s\n",
        )
        .unwrap();
        match config.publisher {
            publisher::Config::Http { timeout, .. } => assert_eq!(timeout, Duration::from_secs(5)),
            other => panic!("unexpected publisher config {:?}", other),
        }
    }
}
