use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time;

use crate::errors::SamplerError;

// Positions of the light and proximity values in the script's quote-delimited
// output. The format belongs to the enviro script; any change there corrupts
// the reading, so the bounds are checked but the indices stay fixed.
const LIGHT_TOKEN: usize = 3;
const PROXIMITY_TOKEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LightProximity {
    pub light: String,
    pub proximity: String,
}

#[async_trait]
pub trait LightProximitySource {
    async fn sample(&mut self) -> Result<LightProximity, SamplerError>;
}

/// Runs the enviro light/proximity script as a subprocess and parses its
/// stdout. Without a configured timeout the call waits indefinitely.
pub struct ScriptSampler {
    command: String,
    script: String,
    timeout: Option<Duration>,
}

impl ScriptSampler {
    pub fn new(command: &str, script: &str, timeout: Option<Duration>) -> Self {
        Self {
            command: command.to_string(),
            script: script.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl LightProximitySource for ScriptSampler {
    async fn sample(&mut self) -> Result<LightProximity, SamplerError> {
        let run = Command::new(&self.command)
            .arg(&self.script)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match self.timeout {
            Some(limit) => time::timeout(limit, run)
                .await
                .map_err(|_| SamplerError::Timeout(limit))?,
            None => run.await,
        }
        .map_err(|source| SamplerError::Launch {
            command: self.command.clone(),
            script: self.script.clone(),
            source,
        })?;

        let text = String::from_utf8(output.stdout)?;

        parse_tokens(&text)
    }
}

pub fn parse_tokens(text: &str) -> Result<LightProximity, SamplerError> {
    let tokens: Vec<&str> = text.split('\'').collect();

    if tokens.len() <= PROXIMITY_TOKEN {
        return Err(SamplerError::MalformedOutput(tokens.len()));
    }

    Ok(LightProximity {
        light: tokens[LIGHT_TOKEN].to_string(),
        proximity: tokens[PROXIMITY_TOKEN].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_extracts_fourth_and_eighth_tokens() {
        let text = "{'lux': '250.04', 'prox': '0'}";

        let sample = parse_tokens(text).unwrap();

        assert_eq!(sample.light, "250.04");
        assert_eq!(sample.proximity, "0");
    }

    #[test]
    fn parse_rejects_short_token_streams() {
        let text = "{'lux': '250.04'}";

        match parse_tokens(text) {
            Err(SamplerError::MalformedOutput(count)) => assert_eq!(count, 5),
            other => panic!("expected MalformedOutput, got {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_empty_output() {
        assert!(matches!(
            parse_tokens(""),
            Err(SamplerError::MalformedOutput(1))
        ));
    }

    #[tokio::test]
    async fn sample_captures_script_stdout() {
        let mut sampler = ScriptSampler::new("echo", "{'lux': '250.04', 'prox': '0'}", None);

        let sample = sampler.sample().await.unwrap();

        assert_eq!(sample.light, "250.04");
        assert_eq!(sample.proximity, "0");
    }

    #[tokio::test]
    async fn sample_fails_when_command_cannot_start() {
        let mut sampler = ScriptSampler::new("/nonexistent/python", "singlelight.py", None);

        assert!(matches!(
            sampler.sample().await,
            Err(SamplerError::Launch { .. })
        ));
    }

    #[tokio::test]
    async fn sample_times_out_instead_of_hanging() {
        let mut sampler = ScriptSampler::new("sleep", "5", Some(Duration::from_millis(50)));

        match sampler.sample().await {
            Err(SamplerError::Timeout(limit)) => assert_eq!(limit, Duration::from_millis(50)),
            other => panic!("expected Timeout, got {other:?}"),
        }
    }
}
