use crate::channel::{CHAT_LABEL, ChannelRole, FILES_LABEL};
use crate::error::PeerError;
use crate::ice::{CandidateCollector, DeliveryStrategy, IceCoordinator};
use crate::negotiation::NegotiationEngine;
use crate::session::event::{EventSink, LinkEvent};
use crate::session::{PeerLink, Session};
use std::sync::Arc;
use tandem_core::CandidateRecord;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::RTCIceCandidate;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;

impl Session {
    /// Creates a fresh connection and makes it the current link. The offering side also opens
    /// both data channels; the answering side receives them through `on_data_channel`.
    pub(super) async fn open_link(
        &mut self,
        strategy: DeliveryStrategy,
        offering: bool,
    ) -> Result<(), PeerError> {
        self.epoch += 1;
        let epoch = self.epoch;
        let sink = self.sink(epoch);

        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_setting_engine(self.config.build_setting_engine())
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let pc = Arc::new(
            api.new_peer_connection(self.config.rtc_configuration())
                .await?,
        );
        let ice = IceCoordinator::new(strategy, self.config.gathering_timeout);
        Self::register_callbacks(&pc, ice.collector(), &sink);

        let (chat, files) = if offering {
            let chat = pc.create_data_channel(CHAT_LABEL, None).await?;
            Self::wire_channel(&chat, ChannelRole::Chat, &sink);

            let files = pc
                .create_data_channel(
                    FILES_LABEL,
                    Some(RTCDataChannelInit {
                        ordered: Some(true),
                        ..Default::default()
                    }),
                )
                .await?;
            Self::wire_channel(&files, ChannelRole::Files, &sink);
            (Some(chat), Some(files))
        } else {
            (None, None)
        };

        info!("Opened connection #{} ({:?}, offering: {})", epoch, strategy, offering);
        self.link = Some(PeerLink {
            epoch,
            engine: NegotiationEngine::new(pc.clone()),
            pc,
            ice,
            chat,
            files,
            pending_chat: Vec::new(),
            room: None,
            media: Vec::new(),
            file_sender: None,
        });
        Ok(())
    }

    fn register_callbacks(pc: &Arc<RTCPeerConnection>, collector: CandidateCollector, sink: &EventSink) {
        let state_sink = sink.clone();
        pc.on_peer_connection_state_change(Box::new(move |state| {
            debug!("Peer connection state: {}", state);
            state_sink.emit(LinkEvent::PeerState(state));
            Box::pin(async {})
        }));

        let candidate_sink = sink.clone();
        pc.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            match candidate {
                Some(candidate) => match candidate.to_json() {
                    Ok(init) => {
                        let record = CandidateRecord {
                            candidate: init.candidate,
                            sdp_mid: init.sdp_mid,
                            sdp_m_line_index: init.sdp_mline_index,
                            username_fragment: init.username_fragment,
                        };
                        collector.push(record.clone());
                        candidate_sink.emit(LinkEvent::LocalCandidate(record));
                    }
                    Err(e) => warn!("Unusable local candidate: {}", e),
                },
                None => {
                    debug!("Local candidate gathering finished");
                    collector.finish();
                }
            }
            Box::pin(async {})
        }));

        let channel_sink = sink.clone();
        pc.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            match ChannelRole::from_label(dc.label()) {
                Some(role) => {
                    info!("Received data channel: {}", dc.label());
                    Self::wire_channel(&dc, role, &channel_sink);
                    channel_sink.emit(LinkEvent::IncomingChannel(role, dc));
                }
                None => warn!("Ignoring data channel with unknown label {}", dc.label()),
            }
            Box::pin(async {})
        }));

        let negotiation_sink = sink.clone();
        pc.on_negotiation_needed(Box::new(move || {
            negotiation_sink.emit(LinkEvent::NegotiationNeeded);
            Box::pin(async {})
        }));

        let track_sink = sink.clone();
        pc.on_track(Box::new(move |track, _receiver, _transceiver| {
            track_sink.emit(LinkEvent::RemoteTrack {
                id: track.id(),
                kind: track.kind().to_string(),
            });
            Box::pin(async {})
        }));
    }

    fn wire_channel(dc: &Arc<RTCDataChannel>, role: ChannelRole, sink: &EventSink) {
        let open_sink = sink.clone();
        dc.on_open(Box::new(move || {
            open_sink.emit(LinkEvent::ChannelOpened(role));
            Box::pin(async {})
        }));

        let message_sink = sink.clone();
        dc.on_message(Box::new(move |msg: DataChannelMessage| {
            let event = match (role, msg.is_string) {
                (ChannelRole::Chat, _) => {
                    LinkEvent::ChatText(String::from_utf8_lossy(&msg.data).into_owned())
                }
                (ChannelRole::Files, true) => {
                    LinkEvent::FileText(String::from_utf8_lossy(&msg.data).into_owned())
                }
                (ChannelRole::Files, false) => LinkEvent::FileData(msg.data),
            };
            message_sink.emit(event);
            Box::pin(async {})
        }));

        let close_sink = sink.clone();
        dc.on_close(Box::new(move || {
            close_sink.emit(LinkEvent::ChannelClosed(role));
            Box::pin(async {})
        }));
    }
}
