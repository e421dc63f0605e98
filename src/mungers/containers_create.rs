//! `POST /containers/create`: translate bind-mount host paths.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::munger::{
    read_json, replace_json, BindSpec, MungeError, Munger, RequestContext, Result, TemplateParams,
};
use crate::translate::{BindClassifier, PathTranslator};

/// Context key holding the number of binds rewritten for this request.
pub const BINDS_TRANSLATED: &str = "binds_translated";

/// Container creation payload. Only `HostConfig.Binds` is interpreted; every
/// other field is carried through as-is.
///
/// The daemon matches JSON keys case-insensitively, so `hostConfig` and
/// `binds` are accepted too. Re-encoding always writes `HostConfig`/`Binds`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerCreateBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_config: Option<HostConfig>,

    /// Container config fields, `NetworkingConfig` and anything unknown.
    #[serde(flatten)]
    pub passthrough: Map<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binds: Option<Vec<String>>,

    #[serde(flatten)]
    pub passthrough: Map<String, Value>,
}

impl<'de> Deserialize<'de> for ContainerCreateBody {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut passthrough = Map::deserialize(deserializer)?;
        let host_config = take_field(&mut passthrough, "HostConfig")
            .map(Option::<HostConfig>::deserialize)
            .transpose()
            .map_err(<D::Error as de::Error>::custom)?
            .flatten();
        Ok(Self {
            host_config,
            passthrough,
        })
    }
}

impl<'de> Deserialize<'de> for HostConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut passthrough = Map::deserialize(deserializer)?;
        let binds = take_field(&mut passthrough, "Binds")
            .map(Option::<Vec<String>>::deserialize)
            .transpose()
            .map_err(<D::Error as de::Error>::custom)?
            .flatten();
        Ok(Self {
            binds,
            passthrough,
        })
    }
}

/// Remove every key matching `name` regardless of case. An exact match wins
/// over other spellings.
fn take_field(map: &mut Map<String, Value>, name: &str) -> Option<Value> {
    let keys: Vec<String> = map
        .keys()
        .filter(|key| key.eq_ignore_ascii_case(name))
        .cloned()
        .collect();

    let mut exact = None;
    let mut folded = None;
    for key in keys {
        let value = map.remove(&key);
        if key == name {
            exact = value;
        } else if folded.is_none() {
            folded = value;
        }
    }
    exact.or(folded)
}

/// Rewrites path-style binds into the daemon's namespace.
pub struct ContainersCreate {
    classifier: Arc<dyn BindClassifier>,
    translator: Arc<dyn PathTranslator>,
    max_body_bytes: usize,
}

impl ContainersCreate {
    pub fn new(
        classifier: Arc<dyn BindClassifier>,
        translator: Arc<dyn PathTranslator>,
        max_body_bytes: usize,
    ) -> Self {
        Self {
            classifier,
            translator,
            max_body_bytes,
        }
    }

    /// Translate every path-style bind in `binds`.
    ///
    /// The list is only updated once every entry has been processed; on error
    /// it is left untouched. Returns the number of entries that changed.
    fn rewrite_binds(&self, binds: &mut Vec<String>, request_id: &str) -> Result<usize> {
        let mut rewritten = Vec::with_capacity(binds.len());
        let mut translated = 0;

        for (index, raw) in binds.iter().enumerate() {
            tracing::debug!(request_id = %request_id, bind_index = index, bind = %raw, "Got bind");

            let mut bind = BindSpec::parse(raw, self.classifier.as_ref()).map_err(|e| {
                MungeError::InvalidBind {
                    index,
                    bind: raw.clone(),
                    reason: e.reason(),
                }
            })?;
            if !bind.is_path_mount() {
                rewritten.push(raw.clone());
                continue;
            }

            let host = self.translator.translate(&bind.host).map_err(|source| {
                MungeError::PathTranslation {
                    index,
                    path: bind.host.clone(),
                    source,
                }
            })?;
            if host == bind.host {
                rewritten.push(raw.clone());
                continue;
            }

            tracing::debug!(
                request_id = %request_id,
                bind_index = index,
                from = %bind.host,
                to = %host,
                "Translated bind host path"
            );
            bind.host = host;
            rewritten.push(bind.format());
            translated += 1;
        }

        if translated > 0 {
            *binds = rewritten;
        }
        Ok(translated)
    }
}

#[async_trait]
impl Munger<Request<Body>> for ContainersCreate {
    fn name(&self) -> &'static str {
        "containers_create"
    }

    async fn munge(
        &self,
        req: &mut Request<Body>,
        context: &mut RequestContext,
        _params: &TemplateParams,
    ) -> Result<()> {
        let (mut body, raw): (ContainerCreateBody, _) = read_json(req, self.max_body_bytes).await?;
        tracing::debug!(
            request_id = %context.request_id(),
            body_len = raw.len(),
            "Read container create body"
        );

        let Some(binds) = body
            .host_config
            .as_mut()
            .and_then(|host_config| host_config.binds.as_mut())
        else {
            return Ok(());
        };

        let translated = self.rewrite_binds(binds, context.request_id())?;
        context.insert(BINDS_TRANSLATED, translated.to_string());
        if translated == 0 {
            return Ok(());
        }

        let len = replace_json(req, &body)?;
        metrics::counter!("docker_proxy_binds_translated_total").increment(translated as u64);
        tracing::debug!(
            request_id = %context.request_id(),
            translated,
            content_length = len,
            "Rewrote container create body"
        );
        Ok(())
    }
}
