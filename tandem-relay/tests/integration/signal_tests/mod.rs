mod test_backlog_flushed_on_subscribe;
mod test_connected_ack;
mod test_peer_left_notification;
