use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tandem_core::IceServerConfig;
use webrtc::api::setting_engine::SettingEngine;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::peer_connection::configuration::RTCConfiguration;

pub const DEFAULT_STUN: &str = "stun:stun.l.google.com:19302";
pub const DEFAULT_LINK_BASE: &str = "https://tandem.local/join";
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;
pub const DEFAULT_HIGH_WATER_MARK: usize = 1024 * 1024;
pub const DEFAULT_GATHERING_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds a fresh `SettingEngine` for every connection the session opens.
pub type SettingEngineFactory = Arc<dyn Fn() -> SettingEngine + Send + Sync>;

#[derive(Clone)]
pub struct PeerConfig {
    pub ice_servers: Vec<IceServerConfig>,
    /// Base address of the relay; room operations fail without it.
    pub relay_url: Option<String>,
    pub link_base: String,
    pub chunk_size: usize,
    pub high_water_mark: usize,
    pub backpressure_poll: Duration,
    pub gathering_timeout: Duration,
    pub setting_engine: Option<SettingEngineFactory>,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::stun(DEFAULT_STUN)],
            relay_url: None,
            link_base: DEFAULT_LINK_BASE.to_owned(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
            backpressure_poll: Duration::from_millis(10),
            gathering_timeout: DEFAULT_GATHERING_TIMEOUT,
            setting_engine: None,
        }
    }
}

impl PeerConfig {
    pub fn with_relay(mut self, url: impl Into<String>) -> Self {
        self.relay_url = Some(url.into());
        self
    }

    pub fn with_ice_servers(mut self, ice_servers: Vec<IceServerConfig>) -> Self {
        self.ice_servers = ice_servers;
        self
    }

    pub fn with_setting_engine<F>(mut self, factory: F) -> Self
    where
        F: Fn() -> SettingEngine + Send + Sync + 'static,
    {
        self.setting_engine = Some(Arc::new(factory));
        self
    }

    pub(crate) fn rtc_configuration(&self) -> RTCConfiguration {
        let ice_servers = self
            .ice_servers
            .iter()
            .map(|server| RTCIceServer {
                urls: server.urls.clone(),
                username: server.username.clone().unwrap_or_default(),
                credential: server.credential.clone().unwrap_or_default(),
                ..Default::default()
            })
            .collect();

        RTCConfiguration {
            ice_servers,
            ..Default::default()
        }
    }

    pub(crate) fn build_setting_engine(&self) -> SettingEngine {
        match &self.setting_engine {
            Some(factory) => factory(),
            None => SettingEngine::default(),
        }
    }
}

impl fmt::Debug for PeerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeerConfig")
            .field("ice_servers", &self.ice_servers)
            .field("relay_url", &self.relay_url)
            .field("link_base", &self.link_base)
            .field("chunk_size", &self.chunk_size)
            .field("high_water_mark", &self.high_water_mark)
            .field("backpressure_poll", &self.backpressure_poll)
            .field("gathering_timeout", &self.gathering_timeout)
            .field("setting_engine", &self.setting_engine.is_some())
            .finish()
    }
}
