//! fcm-send: send one message through Firebase Cloud Messaging.
//!
//! Client settings come from `FCM_*` (see [`FcmConfig`]). Every message flag
//! has an `FCM_SEND_*` default, so the tool also runs from the environment
//! alone:
//!
//! | Flag                       | Default from              |
//! |----------------------------|---------------------------|
//! | `-t`, `--topic`            | `FCM_SEND_TOPIC`          |
//! | `-k`, `--token`            | `FCM_SEND_TOKEN`          |
//! | `-c`, `--condition`        | `FCM_SEND_CONDITION`      |
//! | `--title`                  | `FCM_SEND_TITLE`          |
//! | `--body`                   | `FCM_SEND_BODY`           |
//! | `--validate-only`          | `FCM_SEND_VALIDATE_ONLY`  |
//! | `--project-id`             | `PROJECT_ID`, then `FCM_PROJECT_ID` |
//! | `--credentials-location`   | `CREDENTIALS_LOCATION`, then `FCM_CREDENTIALS_*` |

use anyhow::{anyhow, Context, Result};
use nova_fcm_client::{FCMClient, FCMError, FcmConfig, Message, Notification, SendRequest};
use serde::Deserialize;
use tracing::{error, info};

const USAGE: &str = "\
fcm-send

Send one message through Firebase Cloud Messaging.

Usage:
  fcm-send (--topic <name> | --token <token> | --condition <expr>) [OPTIONS]

Options:
  -t, --topic <name>                 topic to send to
  -k, --token <token>                device registration token
  -c, --condition <expr>             e.g. \"'foo' in topics && 'bar' in topics\"
      --title <text>                 notification title
      --body <text>                  notification body
      --validate-only                validate without delivering
      --project-id <id>              Firebase project (PROJECT_ID)
      --credentials-location <path>  service account key (CREDENTIALS_LOCATION)
  -h, --help                         show this help
";

#[derive(Debug, Default, Deserialize)]
struct SendArgs {
    #[serde(default)]
    topic: String,
    #[serde(default)]
    token: String,
    #[serde(default)]
    condition: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
    #[serde(default)]
    validate_only: bool,
    #[serde(skip)]
    project_id: Option<String>,
    #[serde(skip)]
    credentials_location: Option<String>,
}

impl SendArgs {
    fn into_request(self) -> SendRequest {
        let notification = if self.title.is_empty() && self.body.is_empty() {
            None
        } else {
            Some(Notification {
                title: self.title,
                body: self.body,
            })
        };

        SendRequest {
            validate_only: self.validate_only,
            message: Some(Message {
                topic: self.topic,
                token: self.token,
                condition: self.condition,
                notification,
                ..Default::default()
            }),
        }
    }
}

/// Applies command line flags on top of `args`. `None` means help was asked for.
fn parse_flags<I>(mut args: SendArgs, argv: I) -> Result<Option<SendArgs>>
where
    I: IntoIterator<Item = String>,
{
    let mut it = argv.into_iter();

    while let Some(arg) = it.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => {
                (flag.to_string(), Some(value.to_string()))
            }
            _ => (arg.clone(), None),
        };

        let mut value = |name: &str| -> Result<String> {
            match &inline {
                Some(v) => Ok(v.clone()),
                None => it.next().ok_or_else(|| anyhow!("{name} requires a value")),
            }
        };

        match flag.as_str() {
            "-t" | "--topic" => args.topic = value("--topic")?,
            "-k" | "--token" => args.token = value("--token")?,
            "-c" | "--condition" => args.condition = value("--condition")?,
            "--title" => args.title = value("--title")?,
            "--body" => args.body = value("--body")?,
            "--project-id" => args.project_id = Some(value("--project-id")?),
            "--credentials-location" => {
                args.credentials_location = Some(value("--credentials-location")?)
            }
            "--validate-only" => {
                args.validate_only = match inline.as_deref() {
                    None => true,
                    Some(v) => v
                        .parse()
                        .with_context(|| format!("invalid --validate-only value: {v}"))?,
                }
            }
            "-h" | "--help" => return Ok(None),
            other => return Err(anyhow!("Unknown arg: {other}")),
        }
    }

    Ok(Some(args))
}

/// Client configuration: flags first, then `PROJECT_ID` / `CREDENTIALS_LOCATION`,
/// then the `FCM_*` variables
fn client_config<I>(args: &SendArgs, vars: I) -> Result<FcmConfig>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut vars: Vec<(String, String)> = vars.into_iter().collect();
    let lookup = |key: &str| {
        vars.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    let project_id = args.project_id.clone().or_else(|| lookup("PROJECT_ID"));
    let credentials_location = args
        .credentials_location
        .clone()
        .or_else(|| lookup("CREDENTIALS_LOCATION"));

    if let Some(project_id) = project_id {
        vars.retain(|(k, _)| k != "FCM_PROJECT_ID");
        vars.push(("FCM_PROJECT_ID".to_string(), project_id));
    }
    if let Some(location) = credentials_location {
        // An explicit path replaces inline JSON, which would otherwise win.
        vars.retain(|(k, _)| k != "FCM_CREDENTIALS_LOCATION" && k != "FCM_CREDENTIALS_JSON");
        vars.push(("FCM_CREDENTIALS_LOCATION".to_string(), location));
    }

    FcmConfig::from_vars(vars).context("Failed to load FCM configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fcm_send=info,nova_fcm_client=info".into()),
        )
        .init();

    // The only .env load on this path; FcmConfig::from_env is not used here.
    dotenv::dotenv().ok();

    let defaults: SendArgs = envy::prefixed("FCM_SEND_")
        .from_env()
        .context("Failed to read FCM_SEND_* variables")?;
    let Some(args) = parse_flags(defaults, std::env::args().skip(1))? else {
        print!("{USAGE}");
        return Ok(());
    };

    let config = client_config(&args, std::env::vars())?;
    let client = FCMClient::from_config(&config).context("Failed to create FCM client")?;
    let request = args.into_request();

    match client.send(&request).await {
        Ok(message) => {
            info!(message_id = %message.message_id(), "Message accepted");
            println!("{}", serde_json::to_string_pretty(&message)?);
            Ok(())
        }
        Err(FCMError::Http(http_err)) => {
            error!(status = http_err.status.as_u16(), "FCM rejected the message");
            eprintln!("{}", http_err.response_dump);
            Err(http_err.into())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_args_from_env_vars() {
        let args: SendArgs = envy::prefixed("FCM_SEND_")
            .from_iter(vars(&[
                ("FCM_SEND_TOPIC", "cats"),
                ("FCM_SEND_TITLE", "Hello"),
                ("FCM_SEND_VALIDATE_ONLY", "true"),
            ]))
            .unwrap();

        let request = args.into_request();
        assert!(request.validate_only);

        let message = request.message.unwrap();
        assert_eq!(message.topic, "cats");
        assert_eq!(message.notification.as_ref().unwrap().title, "Hello");
        assert!(message.validate().is_ok());
    }

    #[test]
    fn test_flags_override_env_defaults() {
        let defaults: SendArgs = envy::prefixed("FCM_SEND_")
            .from_iter(vars(&[("FCM_SEND_TOPIC", "dogs"), ("FCM_SEND_BODY", "Woof")]))
            .unwrap();

        let args = parse_flags(
            defaults,
            argv(&["--topic", "cats", "--title", "Hello", "--validate-only"]),
        )
        .unwrap()
        .unwrap();

        let request = args.into_request();
        assert!(request.validate_only);

        let message = request.message.unwrap();
        assert_eq!(message.topic, "cats");
        let notification = message.notification.as_ref().unwrap();
        assert_eq!(notification.title, "Hello");
        assert_eq!(notification.body, "Woof");
        assert!(message.validate().is_ok());
    }

    #[test]
    fn test_short_flags_and_inline_values() {
        let args = parse_flags(
            SendArgs::default(),
            argv(&[
                "-k",
                "12345678",
                "-c",
                "'foo' in topics",
                "--body=Hi there",
                "--validate-only=false",
                "--project-id=my-project",
            ]),
        )
        .unwrap()
        .unwrap();

        assert_eq!(args.token, "12345678");
        assert_eq!(args.condition, "'foo' in topics");
        assert_eq!(args.body, "Hi there");
        assert!(!args.validate_only);
        assert_eq!(args.project_id.as_deref(), Some("my-project"));

        let message = args.into_request().message.unwrap();
        assert!(message.validate().is_err());
    }

    #[test]
    fn test_bad_flags_are_rejected() {
        let err = parse_flags(SendArgs::default(), argv(&["--topic"])).unwrap_err();
        assert!(err.to_string().contains("--topic requires a value"));

        let err = parse_flags(SendArgs::default(), argv(&["--topics", "cats"])).unwrap_err();
        assert!(err.to_string().contains("Unknown arg: --topics"));

        assert!(parse_flags(SendArgs::default(), argv(&["--validate-only=maybe"])).is_err());
    }

    #[test]
    fn test_help_flag() {
        assert!(parse_flags(SendArgs::default(), argv(&["-t", "cats", "--help"]))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_client_config_precedence() {
        let env = vars(&[
            ("FCM_PROJECT_ID", "fcm-project"),
            ("FCM_CREDENTIALS_JSON", "{}"),
            ("PROJECT_ID", "plain-project"),
        ]);

        let config = client_config(&SendArgs::default(), env.clone()).unwrap();
        assert_eq!(config.project_id, "plain-project");
        assert_eq!(config.credentials_json.as_deref(), Some("{}"));

        let args = SendArgs {
            project_id: Some("flag-project".to_string()),
            credentials_location: Some("secrets/sa.json".to_string()),
            ..Default::default()
        };
        let config = client_config(&args, env).unwrap();
        assert_eq!(config.project_id, "flag-project");
        assert_eq!(config.credentials_location.as_deref(), Some("secrets/sa.json"));
        assert!(config.credentials_json.is_none());
    }

    #[test]
    fn test_client_config_needs_a_project() {
        assert!(client_config(&SendArgs::default(), vars(&[("CREDENTIALS_LOCATION", "sa.json")]))
            .is_err());
    }

    #[test]
    fn test_no_notification_without_title_or_body() {
        let request = SendArgs {
            token: "12345678".to_string(),
            ..Default::default()
        }
        .into_request();

        assert!(request.message.unwrap().notification.is_none());
    }
}
