//! Protocol dispatcher
//!
//! Routes a protocol tag to the matching parser, validator and renderer. The
//! façade never fails: unknown protocols yield a single diagnostic, an empty
//! rendered mapping or an empty record.

use std::sync::Arc;

use log::debug;
use rand::Rng;
use serde_json::{Map, Value};

use crate::error::{ParseError, RenderError};
use crate::generator::{self, to_share_link};
use crate::i18n::{Identity, Translator};
use crate::models::{Protocol, ServerRecord};
use crate::parser::{explode, explode_conf_content, parse_subscription};
use crate::settings::Settings;
use crate::validators::{NameRegistry, NoNames, ServerValidator};

/// Entry point bundling the settings, name registry and translator used by
/// the parse, validate and render operations.
pub struct ServerConfigHelper<'a> {
    settings: Arc<Settings>,
    names: &'a dyn NameRegistry,
    translator: &'a dyn Translator,
}

impl Default for ServerConfigHelper<'_> {
    fn default() -> Self {
        ServerConfigHelper::new(Settings::current())
    }
}

impl<'a> ServerConfigHelper<'a> {
    pub fn new(settings: Arc<Settings>) -> Self {
        ServerConfigHelper {
            settings,
            names: &NoNames,
            translator: &Identity,
        }
    }

    /// Use `names` to check that server names are unique.
    pub fn with_names(mut self, names: &'a dyn NameRegistry) -> Self {
        self.names = names;
        self
    }

    pub fn with_translator(mut self, translator: &'a dyn Translator) -> Self {
        self.translator = translator;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Lists every diagnostic for `record`; empty when it may be stored.
    pub fn validate(
        &self,
        protocol: Protocol,
        record: &ServerRecord,
        old_name: Option<&str>,
    ) -> Vec<String> {
        ServerValidator::new(self.names)
            .with_translator(self.translator)
            .with_settings(&self.settings)
            .validate(protocol, record, old_name)
    }

    /// Renders `record` into the engine dialect using the thread-local RNG.
    pub fn render(&self, protocol: Protocol, record: &ServerRecord) -> Map<String, Value> {
        self.render_with_rng(protocol, record, &mut rand::thread_rng())
    }

    pub fn render_with_rng<R: Rng + ?Sized>(
        &self,
        protocol: Protocol,
        record: &ServerRecord,
        rng: &mut R,
    ) -> Map<String, Value> {
        generator::render(protocol, record, &self.settings, rng)
    }

    /// Renders a batch of records into a `proxies:` YAML document.
    pub fn render_proxies(&self, servers: &[(Protocol, ServerRecord)]) -> Result<String, RenderError> {
        generator::render_proxies(servers, &self.settings, &mut rand::thread_rng())
    }

    /// Parses a share link; malformed links yield an empty record.
    pub fn parse_share_link(
        &self,
        protocol: Protocol,
        url: &str,
        subscription_url: &str,
    ) -> ServerRecord {
        match explode(protocol, url, subscription_url, &self.settings) {
            Ok(record) => record,
            Err(e) => {
                debug!("Failed to parse {} share link: {}", protocol, e);
                ServerRecord::new()
            }
        }
    }

    /// Serializes `record` back into a share link when its protocol has one.
    pub fn to_share_link(&self, protocol: Protocol, record: &ServerRecord) -> Option<String> {
        to_share_link(protocol, record)
    }

    /// Imports an engine configuration or Shadowsocks GUI document.
    pub fn import_document(&self, content: &str) -> Result<(Protocol, Vec<ServerRecord>), ParseError> {
        explode_conf_content(content)
    }

    pub fn parse_subscription(
        &self,
        body: &str,
        subscription_url: &str,
    ) -> Vec<(Protocol, ServerRecord)> {
        parse_subscription(body, subscription_url, &self.settings)
    }
}

/// Validates `record` with the process-wide settings and English diagnostics.
pub fn validate(
    protocol: Protocol,
    record: &ServerRecord,
    old_name: Option<&str>,
    names: &dyn NameRegistry,
) -> Vec<String> {
    ServerConfigHelper::default()
        .with_names(names)
        .validate(protocol, record, old_name)
}

/// Renders `record` with the process-wide settings.
pub fn render(protocol: Protocol, record: &ServerRecord) -> Map<String, Value> {
    ServerConfigHelper::default().render(protocol, record)
}

/// Parses a share link with the process-wide settings.
pub fn parse_share_link(protocol: Protocol, url: &str, subscription_url: &str) -> ServerRecord {
    ServerConfigHelper::default().parse_share_link(protocol, url, subscription_url)
}
