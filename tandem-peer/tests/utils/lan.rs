use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tandem_peer::PeerConfig;
use tokio::sync::Mutex;
use webrtc::api::setting_engine::SettingEngine;
use webrtc::ice::mdns::MulticastDnsMode;
use webrtc::util::vnet::net::{Net, NetConfig};
use webrtc::util::vnet::router::{Router, RouterConfig};

/// Virtual network so peers connect without OS networking. Keep it alive for the whole test.
pub struct VirtualLan {
    _router: Arc<Mutex<Router>>,
}

impl VirtualLan {
    /// Starts a LAN with `peers` hosts and returns one config per host.
    pub async fn start(peers: usize) -> Result<(Self, Vec<PeerConfig>)> {
        let router = Arc::new(Mutex::new(
            Router::new(RouterConfig {
                cidr: "10.0.0.0/24".to_owned(),
                ..Default::default()
            })
            .context("Failed to create virtual router")?,
        ));

        let mut configs = Vec::with_capacity(peers);
        for host in 0..peers {
            let net = Arc::new(Net::new(Some(NetConfig {
                static_ips: vec![format!("10.0.0.{}", host + 2)],
                ..Default::default()
            })));
            attach(&net, &router).await?;
            configs.push(config_for(net));
        }

        router
            .lock()
            .await
            .start()
            .await
            .context("Failed to start virtual router")?;

        Ok((Self { _router: router }, configs))
    }
}

async fn attach(net: &Arc<Net>, router: &Arc<Mutex<Router>>) -> Result<()> {
    let nic = net.get_nic().context("Virtual net has no NIC")?;
    router
        .lock()
        .await
        .add_net(Arc::clone(&nic))
        .await
        .context("Failed to add net to router")?;
    nic.lock()
        .await
        .set_router(Arc::clone(router))
        .await
        .context("Failed to set router on NIC")?;
    Ok(())
}

fn config_for(net: Arc<Net>) -> PeerConfig {
    let mut config = PeerConfig::default()
        .with_ice_servers(vec![])
        .with_setting_engine(move || {
            let mut setting = SettingEngine::default();
            setting.set_vnet(Some(net.clone()));
            setting.set_ice_multicast_dns_mode(MulticastDnsMode::Disabled);
            setting.set_ice_timeouts(
                Some(Duration::from_secs(3)),
                Some(Duration::from_secs(6)),
                Some(Duration::from_millis(200)),
            );
            setting
        });
    config.gathering_timeout = Duration::from_secs(2);
    config
}
